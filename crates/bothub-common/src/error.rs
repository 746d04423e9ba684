//! Error taxonomy for the console.
//!
//! Every view recovers these at its own boundary, so none of them is fatal to the
//! process. The type is `Clone` because a coalesced roster fetch hands the same
//! failure to every waiter.

/// Message shown when a claim exchange fails without a server-provided reason.
pub const CLAIM_FAILED: &str = "claim failed";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    // === Registry lookups ===
    #[error("Bot '{bot_id}' does not exist")]
    NotFound { bot_id: String },

    #[error("Request failed: {message}")]
    Network { status: Option<u16>, message: String },

    // === Claim flow ===
    #[error("Missing claim code")]
    MissingClaimCode,

    #[error("{}", .detail.as_deref().unwrap_or(CLAIM_FAILED))]
    ClaimRejected { detail: Option<String> },

    #[error("Invalid claim callback: {message}")]
    InvalidState { message: String },

    #[error("Only the bot owner can do that")]
    Forbidden,

    // === Local ===
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Malformed response: {message}")]
    Decode { message: String },
}

impl ConsoleError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { status: None, message: message.into() }
    }

    /// Stable code string for scripting against the CLI output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Network { .. } => "NETWORK_FAILURE",
            Self::MissingClaimCode => "MISSING_CLAIM_CODE",
            Self::ClaimRejected { .. } => "CLAIM_REJECTED",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::Forbidden => "FORBIDDEN",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Decode { .. } => "DECODE_ERROR",
        }
    }

    /// Whether the roster query may retry after this failure: transport
    /// errors and 5xx answers. Other statuses would fail the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { status: None, .. } => true,
            Self::Network { status: Some(code), .. } => (500..600).contains(code),
            _ => false,
        }
    }
}

impl From<config::ConfigError> for ConsoleError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config { message: e.to_string() }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode { message: e.to_string() }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
