//! Claim flow: claim code → identity-provider authorization → server-side claim.
//!
//! The hand-off to the identity provider is a full-page navigation, so nothing
//! in memory survives it. Everything needed to resume (the claim code and the
//! page to come back to) travels in the authorization request's `state`
//! parameter and is decoded again on the callback location.

use bothub_client::{BotRegistry, ClaimService};
use bothub_common::config::AppConfig;
use bothub_common::models::{Bot, BotSummary, ClaimReceipt, ClaimRequest};
use bothub_common::{ConsoleError, ConsoleResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::actions::{ClaimAction, claim_actions};

/// Query parameter holding the claim code on the claim page, and the
/// authorization code on the callback.
const CODE_PARAM: &str = "code";
const STATE_PARAM: &str = "state";
/// Optional bot id used to pre-fetch the bot panel.
const BOT_PARAM: &str = "bot";

const AUTHORIZE_PATH: &str = "/open-apis/authen/v1/authorize";

/// Identity-provider settings, read once when the flow is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimConfig {
    pub app_id: String,
    pub authorize_host: String,
    pub callback_url: String,
}

impl ClaimConfig {
    pub fn from_app_config(cfg: &AppConfig) -> Self {
        Self {
            app_id: cfg.feishu.app_id.clone(),
            authorize_host: cfg.feishu.authorize_host.clone(),
            callback_url: cfg.console.callback_url(),
        }
    }

    /// The provider authorization URL carrying `payload` as its state.
    pub fn authorize_url(&self, payload: &ClaimStatePayload) -> ConsoleResult<Url> {
        if self.app_id.trim().is_empty() {
            return Err(ConsoleError::Config {
                message: "feishu.app_id is not set".to_owned(),
            });
        }
        let base = format!("https://{}{AUTHORIZE_PATH}", self.authorize_host);
        Url::parse_with_params(
            &base,
            &[
                ("app_id", self.app_id.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                (STATE_PARAM, payload.encode()?.as_str()),
            ],
        )
        .map_err(|e| ConsoleError::Config {
            message: format!("invalid feishu.authorize_host '{}': {e}", self.authorize_host),
        })
    }
}

/// Context carried through the identity-provider round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatePayload {
    pub claim_code: String,
    pub return_url: String,
}

impl ClaimStatePayload {
    pub fn encode(&self) -> ConsoleResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> ConsoleResult<Self> {
        serde_json::from_str(raw).map_err(|e| ConsoleError::InvalidState {
            message: format!("undecodable state: {e}"),
        })
    }
}

/// Where the claim flow stands.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimPhase {
    /// The location carried no claim code. Only "return home" is offered.
    NoCode,
    /// Ready to hand off. `bot` is the optional pre-fetched panel, `error`
    /// the reason the previous attempt failed, if any.
    AwaitingAction {
        claim_code: String,
        bot: Option<BotSummary>,
        error: Option<String>,
    },
    /// Navigation to the identity provider has been issued.
    Redirecting { claim_code: String, target: Url },
    /// Back from the identity provider; the claim exchange is pending.
    AwaitingConfirmation {
        claim_code: String,
        return_url: String,
        provider_code: String,
    },
    Claimed(ClaimReceipt),
    /// The exchange was refused or did not complete. Claiming may be retried.
    Failed { claim_code: String, reason: String },
}

impl ClaimPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoCode => "no_code",
            Self::AwaitingAction { .. } => "awaiting_action",
            Self::Redirecting { .. } => "redirecting",
            Self::AwaitingConfirmation { .. } => "awaiting_confirmation",
            Self::Claimed(_) => "claimed",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoCode | Self::Claimed(_) | Self::Failed { .. })
    }
}

fn query_param(location: &Url, name: &str) -> Option<String> {
    location
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// One claim session, alive for as long as the claim page is.
#[derive(Debug)]
pub struct ClaimFlow {
    config: ClaimConfig,
    return_url: String,
    phase: ClaimPhase,
}

impl ClaimFlow {
    /// Enter the flow from the claim page location.
    ///
    /// Without a `code` parameter this settles in [`ClaimPhase::NoCode`] and
    /// touches nothing remote. With one, the bot panel is pre-fetched when the
    /// location names the bot; that lookup is best-effort.
    pub async fn mount(location: &Url, config: ClaimConfig, registry: &dyn BotRegistry) -> Self {
        let return_url = location.path().to_owned();
        let Some(claim_code) = query_param(location, CODE_PARAM) else {
            info!("claim page opened without a claim code");
            return Self { config, return_url, phase: ClaimPhase::NoCode };
        };

        let bot = match query_param(location, BOT_PARAM) {
            Some(bot_id) => match registry.get_bot(&bot_id).await {
                Ok(bot) => Some(bot.summary()),
                Err(e) => {
                    warn!(%bot_id, "bot info pre-fetch failed: {e}");
                    None
                }
            },
            None => None,
        };

        Self {
            config,
            return_url,
            phase: ClaimPhase::AwaitingAction { claim_code, bot, error: None },
        }
    }

    /// Re-enter the flow on the identity-provider callback location.
    ///
    /// The callback carries the provider's authorization `code` and the
    /// `state` issued by [`Self::begin_claim`].
    pub fn resume(callback: &Url, config: ClaimConfig) -> ConsoleResult<Self> {
        let provider_code = query_param(callback, CODE_PARAM).ok_or_else(|| ConsoleError::InvalidState {
            message: "callback carries no authorization code".to_owned(),
        })?;
        let raw_state = query_param(callback, STATE_PARAM).ok_or_else(|| ConsoleError::InvalidState {
            message: "callback carries no state".to_owned(),
        })?;
        let payload = ClaimStatePayload::decode(&raw_state)?;
        if payload.claim_code.is_empty() {
            return Err(ConsoleError::MissingClaimCode);
        }

        info!(return_url = %payload.return_url, "resuming claim after identity-provider redirect");
        Ok(Self {
            config,
            return_url: payload.return_url.clone(),
            phase: ClaimPhase::AwaitingConfirmation {
                claim_code: payload.claim_code,
                return_url: payload.return_url,
                provider_code,
            },
        })
    }

    pub fn phase(&self) -> &ClaimPhase {
        &self.phase
    }

    pub fn return_url(&self) -> &str {
        &self.return_url
    }

    pub fn claim_code(&self) -> Option<&str> {
        match &self.phase {
            ClaimPhase::NoCode | ClaimPhase::Claimed(_) => None,
            ClaimPhase::AwaitingAction { claim_code, .. }
            | ClaimPhase::Redirecting { claim_code, .. }
            | ClaimPhase::AwaitingConfirmation { claim_code, .. }
            | ClaimPhase::Failed { claim_code, .. } => Some(claim_code),
        }
    }

    /// Pre-fetched bot panel, if any.
    pub fn bot(&self) -> Option<&BotSummary> {
        match &self.phase {
            ClaimPhase::AwaitingAction { bot, .. } => bot.as_ref(),
            _ => None,
        }
    }

    /// Message to show next to the claim button.
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            ClaimPhase::AwaitingAction { error, .. } => error.as_deref(),
            ClaimPhase::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Whether the claim button is enabled.
    pub fn can_claim(&self) -> bool {
        matches!(self.phase, ClaimPhase::AwaitingAction { .. } | ClaimPhase::Failed { .. })
    }

    /// Start the identity-provider hand-off and return where to navigate.
    ///
    /// Fails locally with [`ConsoleError::MissingClaimCode`] when there is no
    /// claim code. A configuration problem leaves the button enabled with the
    /// error shown. Pressing again while redirecting yields the same target.
    pub fn begin_claim(&mut self) -> ConsoleResult<Url> {
        let (claim_code, bot) = match &self.phase {
            ClaimPhase::NoCode => return Err(ConsoleError::MissingClaimCode),
            ClaimPhase::Redirecting { target, .. } => return Ok(target.clone()),
            ClaimPhase::AwaitingAction { claim_code, bot, .. } => (claim_code.clone(), bot.clone()),
            ClaimPhase::Failed { claim_code, .. } => (claim_code.clone(), None),
            ClaimPhase::AwaitingConfirmation { .. } | ClaimPhase::Claimed(_) => {
                return Err(ConsoleError::InvalidState {
                    message: format!("cannot start a claim while {}", self.phase.name()),
                });
            }
        };

        let payload = ClaimStatePayload { claim_code: claim_code.clone(), return_url: self.return_url.clone() };
        match self.config.authorize_url(&payload) {
            Ok(target) => {
                info!(host = %self.config.authorize_host, "redirecting to identity provider");
                self.phase = ClaimPhase::Redirecting { claim_code, target: target.clone() };
                Ok(target)
            }
            Err(e) => {
                warn!("claim hand-off not possible: {e}");
                self.phase = ClaimPhase::AwaitingAction { claim_code, bot, error: Some(e.to_string()) };
                Err(e)
            }
        }
    }

    /// Exchange the provider code plus claim code for ownership.
    pub async fn confirm(&mut self, service: &dyn ClaimService) -> &ClaimPhase {
        let ClaimPhase::AwaitingConfirmation { claim_code, provider_code, .. } = &self.phase else {
            warn!(phase = self.phase.name(), "claim confirmation requested outside the callback");
            return &self.phase;
        };

        let request = ClaimRequest::owner(claim_code.clone(), provider_code.clone());
        let claim_code = claim_code.clone();
        self.phase = match service.submit_claim(&request).await {
            Ok(receipt) => {
                info!(bot = %receipt.bot_name, status = ?receipt.status, "bot claimed");
                ClaimPhase::Claimed(receipt)
            }
            Err(e) => {
                warn!("claim rejected: {e}");
                ClaimPhase::Failed { claim_code, reason: rejection_reason(e) }
            }
        };
        &self.phase
    }
}

/// User-visible reason for a failed exchange: the server's detail when it
/// gave one, the generic message otherwise.
fn rejection_reason(err: ConsoleError) -> String {
    match err {
        rejected @ ConsoleError::ClaimRejected { detail: Some(_) } => rejected.to_string(),
        _ => ConsoleError::ClaimRejected { detail: None }.to_string(),
    }
}

/// Ask for hire/share access to an already-owned bot.
///
/// Ownership claims need a claim code and go through [`ClaimFlow`] instead.
pub async fn request_access(
    service: &dyn ClaimService,
    bot: &Bot,
    action: ClaimAction,
    provider_code: &str,
    message: Option<String>,
) -> ConsoleResult<ClaimReceipt> {
    if action == ClaimAction::ClaimAsOwner {
        return Err(ConsoleError::MissingClaimCode);
    }
    if !claim_actions(bot).contains(&action) {
        return Err(ConsoleError::Forbidden);
    }
    let request = ClaimRequest::access(bot.bot_id.clone(), action.claim_type(), provider_code, message);
    info!(bot_id = %bot.bot_id, claim_type = ?request.claim_type, "requesting access");
    service.submit_claim(&request).await
}
