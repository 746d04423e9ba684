//! Bot records as the registry reports them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::timestamp;

/// Lifecycle status reported by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotStatus {
    Online,
    Offline,
    Error,
    Busy,
    Unclaimed,
    Claimed,
}

impl BotStatus {
    pub const ALL: [BotStatus; 6] = [
        Self::Online,
        Self::Offline,
        Self::Error,
        Self::Busy,
        Self::Unclaimed,
        Self::Claimed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Error => "error",
            Self::Busy => "busy",
            Self::Unclaimed => "unclaimed",
            Self::Claimed => "claimed",
        }
    }

    /// Human-readable badge text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::Offline => "Offline",
            Self::Error => "Error",
            Self::Busy => "Busy",
            Self::Unclaimed => "Unclaimed",
            Self::Claimed => "Claimed",
        }
    }
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bot status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for BotStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_owned()))
    }
}

/// Capabilities come either as a list of names or as a name → enabled map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Capabilities {
    List(Vec<String>),
    Flags(BTreeMap<String, bool>),
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Capabilities {
    /// Names of the capabilities that are switched on.
    pub fn enabled(&self) -> Vec<&str> {
        match self {
            Self::List(names) => names.iter().map(String::as_str).collect(),
            Self::Flags(flags) => flags
                .iter()
                .filter(|(_, on)| **on)
                .map(|(name, _)| name.as_str())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled().is_empty()
    }

    fn deserialize_nullable<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Self>::deserialize(deserializer).map(Option::unwrap_or_default)
    }
}

/// Denormalized owner display info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotOwner {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A bot snapshot as the console sees it. Read-only; the registry owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    /// Opaque registry row id, only used as a rendering key.
    pub id: String,
    pub bot_id: String,
    pub bot_name: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub status: BotStatus,
    #[serde(default, deserialize_with = "Capabilities::deserialize_nullable")]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub last_heartbeat_at: Option<DateTime<Utc>>,

    // Claim-related
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub feishu_app_id: Option<String>,
    #[serde(default)]
    pub owner: Option<BotOwner>,
    #[serde(default)]
    pub can_claim: bool,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub claimed_at: Option<DateTime<Utc>>,
}

impl Bot {
    pub fn is_claimed(&self) -> bool {
        self.status != BotStatus::Unclaimed
    }

    /// Whether the bot is bound to an identity-provider application.
    pub fn has_identity_binding(&self) -> bool {
        self.feishu_app_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn summary(&self) -> BotSummary {
        BotSummary {
            bot_id: self.bot_id.clone(),
            bot_name: self.bot_name.clone(),
            description: self.description.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// The subset of a bot shown on the claim page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotSummary {
    pub bot_id: String,
    pub bot_name: String,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
}

impl BotSummary {
    /// Placeholder glyph for bots without an avatar.
    pub fn initial(&self) -> Option<char> {
        self.bot_name.chars().next().map(|c| c.to_uppercase().next().unwrap_or(c))
    }
}

/// `GET /api/v1/bots` answers with either a bare array or a paginated envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RosterPage {
    Items(Vec<Bot>),
    Page {
        items: Vec<Bot>,
        #[serde(default)]
        total: Option<u64>,
    },
}

impl RosterPage {
    pub fn into_bots(self) -> Vec<Bot> {
        match self {
            Self::Items(bots) | Self::Page { items: bots, .. } => bots,
        }
    }
}
