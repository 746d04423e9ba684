//! Console configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > bothub.toml > defaults

use serde::Deserialize;

/// Start a builder carrying every default, with no external sources attached.
pub fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("api.base_url", "http://localhost:8000")?
        .set_default("api.timeout_secs", 30)?
        .set_default("console.origin", "http://localhost:3000")?
        .set_default("feishu.app_id", "")?
        .set_default("feishu.authorize_host", "open.feishu.cn")
}

impl AppConfig {
    /// Load configuration from `.env`, `bothub.toml` and `BOTHUB__*` variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        let cfg = defaults()?
            .add_source(config::File::with_name("bothub").required(false))
            // Environment variables (BOTHUB__API__BASE_URL, BOTHUB__FEISHU__APP_ID, etc.)
            .add_source(
                config::Environment::with_prefix("BOTHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = cfg.try_deserialize()?;
        tracing::debug!(api = %app_config.api.base_url, "configuration loaded");
        Ok(app_config)
    }

    /// Parse a TOML document layered over the defaults.
    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        defaults()?
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub console: ConsoleConfig,
    pub feishu: FeishuConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Registry origin, without the `/api/v1` suffix.
    pub base_url: String,
    /// Bearer token sent with every request, if any.
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConsoleConfig {
    /// Public origin of the console (e.g. "https://bothub.example.com").
    /// The identity-provider callback lives under it.
    pub origin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeishuConfig {
    /// Application identifier registered with the identity provider.
    pub app_id: String,
    pub authorize_host: String,
}

impl ConsoleConfig {
    pub fn callback_url(&self) -> String {
        format!("{}/oauth/feishu/callback", self.origin.trim_end_matches('/'))
    }
}
