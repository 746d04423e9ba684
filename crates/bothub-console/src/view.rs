//! Per-view state for the roster and bot detail pages.
//!
//! A view owns a [`ViewScope`]. Once the scope is disposed (the user navigated
//! away), completions of requests the view issued are dropped instead of being
//! applied to it.

use std::sync::Arc;

use bothub_client::BotRegistry;
use bothub_common::models::Bot;
use bothub_common::{ConsoleError, ConsoleResult};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::actions::{ClaimAction, can_upload_avatar, claim_actions};
use crate::filter::RosterFilter;
use crate::roster::RosterQuery;

/// Lifetime of one mounted view. Clones share the same lifetime.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the view as gone. Pending completions will be discarded.
    pub fn dispose(&self) {
        self.token.cancel();
    }

    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Run `fut` unless the view is disposed first. `None` means the result
    /// must not be applied.
    pub async fn guard<T>(&self, fut: impl Future<Output = T>) -> Option<T> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            out = fut => self.is_live().then_some(out),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterState {
    Loading,
    Failed { error: ConsoleError },
    Ready,
}

/// The bot hall: roster snapshot plus search box and status selector.
#[derive(Debug)]
pub struct RosterView {
    scope: ViewScope,
    state: RosterState,
    bots: Option<Arc<Vec<Bot>>>,
    pub filter: RosterFilter,
}

impl RosterView {
    pub fn new(scope: ViewScope) -> Self {
        Self { scope, state: RosterState::Loading, bots: None, filter: RosterFilter::default() }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn state(&self) -> &RosterState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == RosterState::Loading
    }

    pub fn error(&self) -> Option<&ConsoleError> {
        match &self.state {
            RosterState::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Fetch through `query` and apply the outcome if the view is still mounted.
    ///
    /// Returns whether the outcome was applied. Also serves as the manual retry.
    pub async fn load<R>(&mut self, query: &RosterQuery<R>) -> bool
    where
        R: BotRegistry + ?Sized + 'static,
    {
        self.state = RosterState::Loading;
        match self.scope.guard(query.fetch()).await {
            Some(result) => {
                self.apply(result);
                true
            }
            None => {
                debug!("roster view disposed; dropping fetch result");
                false
            }
        }
    }

    /// Apply a fetch outcome. A failure keeps the previous snapshot on display.
    pub fn apply(&mut self, result: ConsoleResult<Arc<Vec<Bot>>>) {
        if !self.scope.is_live() {
            return;
        }
        match result {
            Ok(bots) => {
                self.bots = Some(bots);
                self.state = RosterState::Ready;
            }
            Err(error) => {
                self.state = RosterState::Failed { error };
            }
        }
    }

    /// Bots passing the current filter, in roster order.
    pub fn visible(&self) -> Vec<&Bot> {
        self.bots.as_deref().map(|bots| self.filter.apply(bots)).unwrap_or_default()
    }

    /// Loaded, but nothing passes the filter.
    pub fn shows_empty_notice(&self) -> bool {
        self.bots.is_some() && self.visible().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    NotFound { bot_id: String },
    Failed { error: ConsoleError },
    Ready(Box<Bot>),
}

/// A single bot's page.
#[derive(Debug)]
pub struct DetailView {
    scope: ViewScope,
    bot_id: String,
    state: DetailState,
}

impl DetailView {
    pub fn new(scope: ViewScope, bot_id: impl Into<String>) -> Self {
        Self { scope, bot_id: bot_id.into(), state: DetailState::Loading }
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn bot(&self) -> Option<&Bot> {
        match &self.state {
            DetailState::Ready(bot) => Some(bot.as_ref()),
            _ => None,
        }
    }

    pub async fn load(&mut self, registry: &dyn BotRegistry) -> bool {
        self.state = DetailState::Loading;
        let Some(result) = self.scope.guard(registry.get_bot(&self.bot_id)).await else {
            debug!(bot_id = %self.bot_id, "detail view disposed; dropping fetch result");
            return false;
        };
        self.state = match result {
            Ok(bot) => DetailState::Ready(Box::new(bot)),
            Err(ConsoleError::NotFound { bot_id }) => DetailState::NotFound { bot_id },
            Err(error) => DetailState::Failed { error },
        };
        true
    }

    pub fn claim_actions(&self) -> Vec<ClaimAction> {
        self.bot().map(claim_actions).unwrap_or_default()
    }

    pub fn can_upload_avatar(&self) -> bool {
        self.bot().is_some_and(can_upload_avatar)
    }
}
