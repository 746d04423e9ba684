//! Async REST client for the BotHub registry.

use std::time::Duration;

use async_trait::async_trait;
use bothub_common::config::ApiConfig;
use bothub_common::models::{
    AvatarUploaded, Bot, ClaimApproval, ClaimReceipt, ClaimRequest, RosterPage,
};
use bothub_common::{ConsoleError, ConsoleResult};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::registry::{BotRegistry, ClaimService};

/// Async BotHub REST client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone, Debug)]
pub struct RestClient {
    client: Client,
    base: Url,
}

/// Why a single HTTP exchange did not produce a value.
#[derive(Debug)]
enum Failure {
    /// Connection, TLS or timeout problem; no response was read.
    Transport(reqwest::Error),
    /// The registry answered with a non-2xx status.
    Status { status: StatusCode, detail: Option<String> },
    /// A 2xx body that did not match the expected shape.
    Decode(reqwest::Error),
}

impl Failure {
    fn into_network(self) -> ConsoleError {
        match self {
            Failure::Transport(e) => ConsoleError::network(e.to_string()),
            Failure::Status { status, detail } => ConsoleError::Network {
                status: Some(status.as_u16()),
                message: detail.unwrap_or_else(|| status.to_string()),
            },
            Failure::Decode(e) => ConsoleError::Decode { message: e.to_string() },
        }
    }

    fn into_claim_rejected(self) -> ConsoleError {
        match self {
            Failure::Status { detail, .. } => ConsoleError::ClaimRejected { detail },
            Failure::Transport(e) => {
                tracing::warn!("claim exchange did not reach the registry: {e}");
                ConsoleError::ClaimRejected { detail: None }
            }
            Failure::Decode(e) => ConsoleError::Decode { message: e.to_string() },
        }
    }
}

impl RestClient {
    pub fn new(base_url: &str, token: Option<&str>, timeout_secs: u64) -> ConsoleResult<Self> {
        let base = Url::parse(base_url.trim_end_matches('/')).map_err(|e| ConsoleError::Config {
            message: format!("invalid api.base_url '{base_url}': {e}"),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConsoleError::Config {
                message: format!("api.base_url '{base_url}' cannot carry a path"),
            });
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let bearer = format!("Bearer {token}");
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&bearer).map_err(|e| ConsoleError::Config {
                    message: format!("invalid api.token: {e}"),
                })?,
            );
        }
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("bothub-console/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConsoleError::Config { message: e.to_string() })?;

        Ok(Self { client, base })
    }

    pub fn from_config(api: &ApiConfig) -> ConsoleResult<Self> {
        Self::new(&api.base_url, api.token.as_deref(), api.timeout_secs)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // ── Internal ──────────────────────────────────────────────────────────────

    /// `{base}/api/v1/{segments...}` with every segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, Failure> {
        let resp = req.send().await.map_err(Failure::Transport)?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.json::<Value>().await.ok().and_then(|v| error_detail(&v));
            tracing::debug!(%status, ?detail, "registry returned an error");
            return Err(Failure::Status { status, detail });
        }
        resp.json::<T>().await.map_err(Failure::Decode)
    }

    async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<T, Failure> {
        let url = self.endpoint(segments);
        tracing::debug!(%method, %url, "registry request");
        let mut req = self.client.request(method, url);
        if let Some(b) = body {
            req = req.json(b);
        }
        self.send(req).await
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Failure> {
        self.request::<T, ()>(Method::GET, segments, None).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, Failure> {
        self.request(Method::POST, segments, Some(body)).await
    }
}

/// Pull a human-readable reason out of an error body.
///
/// Understands `{"detail": "..."}`, validation lists
/// `{"detail": [{"msg": "..."}]}` and `{"error": "..."}`.
fn error_detail(body: &Value) -> Option<String> {
    match body.get("detail") {
        Some(Value::String(s)) => return Some(s.clone()),
        Some(Value::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|i| i.get("msg").and_then(Value::as_str))
                .collect();
            if !msgs.is_empty() {
                return Some(msgs.join("; "));
            }
        }
        _ => {}
    }
    body.get("error").and_then(Value::as_str).map(str::to_owned)
}

#[async_trait]
impl BotRegistry for RestClient {
    async fn list_bots(&self) -> ConsoleResult<Vec<Bot>> {
        let page: RosterPage = self.get(&["bots"]).await.map_err(Failure::into_network)?;
        Ok(page.into_bots())
    }

    async fn get_bot(&self, bot_id: &str) -> ConsoleResult<Bot> {
        match self.get(&["bots", bot_id]).await {
            Ok(bot) => Ok(bot),
            Err(Failure::Status { status: StatusCode::NOT_FOUND, .. }) => {
                Err(ConsoleError::NotFound { bot_id: bot_id.to_owned() })
            }
            Err(other) => Err(other.into_network()),
        }
    }
}

#[async_trait]
impl ClaimService for RestClient {
    async fn submit_claim(&self, request: &ClaimRequest) -> ConsoleResult<ClaimReceipt> {
        self.post(&["claim", "request"], request)
            .await
            .map_err(Failure::into_claim_rejected)
    }

    async fn approve_claim(&self, approval: &ClaimApproval) -> ConsoleResult<ClaimReceipt> {
        self.post(&["claim", "approve"], approval)
            .await
            .map_err(Failure::into_claim_rejected)
    }

    async fn upload_avatar(
        &self,
        bot_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ConsoleResult<AvatarUploaded> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_owned());
        let form = reqwest::multipart::Form::new().part("file", part);
        let url = self.endpoint(&["claim", "bots", bot_id, "avatar"]);
        tracing::debug!(%url, "uploading avatar");
        match self.send(self.client.post(url).multipart(form)).await {
            Ok(uploaded) => Ok(uploaded),
            Err(Failure::Status { status: StatusCode::NOT_FOUND, .. }) => {
                Err(ConsoleError::NotFound { bot_id: bot_id.to_owned() })
            }
            Err(Failure::Status { status: StatusCode::FORBIDDEN, .. }) => Err(ConsoleError::Forbidden),
            Err(other) => Err(other.into_network()),
        }
    }
}
