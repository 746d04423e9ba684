//! In-memory registry and claim fakes for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bothub_client::{BotRegistry, ClaimService};
use bothub_common::models::{
    AvatarUploaded, Bot, BotStatus, Capabilities, ClaimApproval, ClaimReceipt, ClaimRequest,
    ClaimRequestStatus, ClaimType, ClaimUser,
};
use bothub_common::{ConsoleError, ConsoleResult};
use tokio::sync::Semaphore;

pub fn bot(bot_id: &str, name: &str, status: BotStatus, description: Option<&str>) -> Bot {
    Bot {
        id: format!("row-{bot_id}"),
        bot_id: bot_id.to_owned(),
        bot_name: name.to_owned(),
        owner_id: (status != BotStatus::Unclaimed).then(|| "owner-1".to_owned()),
        description: description.map(str::to_owned),
        status,
        capabilities: Capabilities::default(),
        endpoint: None,
        version: None,
        created_at: chrono::Utc::now(),
        updated_at: None,
        last_heartbeat_at: None,
        avatar_url: None,
        feishu_app_id: None,
        owner: None,
        can_claim: true,
        is_owner: false,
        claimed_at: None,
    }
}

pub fn network(message: &str) -> ConsoleError {
    ConsoleError::Network { status: Some(503), message: message.to_owned() }
}

/// Registry fake answering `list_bots` from a script.
///
/// When built with [`FakeRegistry::gated`], each call parks until the test
/// releases a permit, which keeps a fetch in flight on demand.
#[derive(Default)]
pub struct FakeRegistry {
    roster: Mutex<VecDeque<ConsoleResult<Vec<Bot>>>>,
    bots: Vec<Bot>,
    get_error: Option<ConsoleError>,
    gate: Option<Semaphore>,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl FakeRegistry {
    pub fn scripted(answers: Vec<ConsoleResult<Vec<Bot>>>) -> Self {
        Self { roster: Mutex::new(answers.into()), ..Self::default() }
    }

    pub fn gated(answers: Vec<ConsoleResult<Vec<Bot>>>) -> Self {
        Self { gate: Some(Semaphore::new(0)), ..Self::scripted(answers) }
    }

    pub fn with_bots(bots: Vec<Bot>) -> Self {
        Self { bots, ..Self::default() }
    }

    /// Every `get_bot` fails with `err`.
    pub fn failing_get(err: ConsoleError) -> Self {
        Self { get_error: Some(err), ..Self::default() }
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BotRegistry for FakeRegistry {
    async fn list_bots(&self) -> ConsoleResult<Vec<Bot>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        self.roster
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get_bot(&self, bot_id: &str) -> ConsoleResult<Bot> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.get_error {
            return Err(err.clone());
        }
        self.bots
            .iter()
            .find(|b| b.bot_id == bot_id)
            .cloned()
            .ok_or_else(|| ConsoleError::NotFound { bot_id: bot_id.to_owned() })
    }
}

pub fn receipt(claim_type: ClaimType, status: ClaimRequestStatus) -> ClaimReceipt {
    ClaimReceipt {
        id: uuid::Uuid::new_v4(),
        bot_id: uuid::Uuid::new_v4(),
        bot_name: "Helper".into(),
        requester: ClaimUser {
            id: uuid::Uuid::new_v4(),
            feishu_user_id: "ou_123".into(),
            name: "Ada".into(),
            email: None,
            avatar_url: None,
            created_at: chrono::Utc::now(),
        },
        claim_type,
        status,
        message: None,
        feishu_verified: true,
        created_at: chrono::Utc::now(),
    }
}

/// Claim service fake that records submissions and answers with one canned result.
pub struct FakeClaims {
    answer: ConsoleResult<ClaimReceipt>,
    pub submitted: Mutex<Vec<ClaimRequest>>,
    pub uploads: Mutex<Vec<(String, String, usize)>>,
}

impl FakeClaims {
    pub fn answering(answer: ConsoleResult<ClaimReceipt>) -> Self {
        Self { answer, submitted: Mutex::default(), uploads: Mutex::default() }
    }
}

#[async_trait]
impl ClaimService for FakeClaims {
    async fn submit_claim(&self, request: &ClaimRequest) -> ConsoleResult<ClaimReceipt> {
        self.submitted.lock().unwrap().push(request.clone());
        self.answer.clone()
    }

    async fn approve_claim(&self, _approval: &ClaimApproval) -> ConsoleResult<ClaimReceipt> {
        self.answer.clone()
    }

    async fn upload_avatar(
        &self,
        bot_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ConsoleResult<AvatarUploaded> {
        self.uploads
            .lock()
            .unwrap()
            .push((bot_id.to_owned(), file_name.to_owned(), bytes.len()));
        Ok(AvatarUploaded { avatar_url: format!("https://cdn.example.com/avatars/{file_name}") })
    }
}
