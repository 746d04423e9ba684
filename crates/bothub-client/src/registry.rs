//! Seams to the remote collaborators.
//!
//! The console core only talks to these traits; [`crate::RestClient`] is the
//! production implementation and tests substitute in-memory fakes.

use async_trait::async_trait;
use bothub_common::ConsoleResult;
use bothub_common::models::{AvatarUploaded, Bot, ClaimApproval, ClaimReceipt, ClaimRequest};

/// Read-only access to the bot registry.
#[async_trait]
pub trait BotRegistry: Send + Sync {
    /// The full roster, in registry order. An empty list is a valid answer.
    async fn list_bots(&self) -> ConsoleResult<Vec<Bot>>;

    /// A single bot, or [`bothub_common::ConsoleError::NotFound`].
    async fn get_bot(&self, bot_id: &str) -> ConsoleResult<Bot>;
}

/// Claim exchange and owner-only mutations.
#[async_trait]
pub trait ClaimService: Send + Sync {
    async fn submit_claim(&self, request: &ClaimRequest) -> ConsoleResult<ClaimReceipt>;

    async fn approve_claim(&self, approval: &ClaimApproval) -> ConsoleResult<ClaimReceipt>;

    async fn upload_avatar(
        &self,
        bot_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ConsoleResult<AvatarUploaded>;
}
