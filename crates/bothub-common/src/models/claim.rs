//! Claim exchange wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timestamp;

/// How the requester wants to relate to the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Owner,
    Hire,
    Share,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimRequestStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

/// Body of `POST /api/v1/claim/request`.
///
/// Owner claims carry the one-time `claim_code`; hire/share requests carry `bot_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    pub claim_type: ClaimType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Authorization code issued by the identity provider.
    pub feishu_code: String,
}

impl ClaimRequest {
    pub fn owner(claim_code: impl Into<String>, feishu_code: impl Into<String>) -> Self {
        Self {
            claim_code: Some(claim_code.into()),
            bot_id: None,
            claim_type: ClaimType::Owner,
            message: None,
            feishu_code: feishu_code.into(),
        }
    }

    pub fn access(
        bot_id: impl Into<String>,
        claim_type: ClaimType,
        feishu_code: impl Into<String>,
        message: Option<String>,
    ) -> Self {
        Self {
            claim_code: None,
            bot_id: Some(bot_id.into()),
            claim_type,
            message,
            feishu_code: feishu_code.into(),
        }
    }
}

/// A user as the claim endpoints report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimUser {
    pub id: Uuid,
    pub feishu_user_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

/// Response of the claim request and approval endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub id: Uuid,
    pub bot_id: Uuid,
    pub bot_name: String,
    pub requester: ClaimUser,
    pub claim_type: ClaimType,
    pub status: ClaimRequestStatus,
    #[serde(default)]
    pub message: Option<String>,
    pub feishu_verified: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

/// Owner decision on a pending hire/share request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimApproval {
    pub request_id: Uuid,
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarUploaded {
    pub avatar_url: String,
}
