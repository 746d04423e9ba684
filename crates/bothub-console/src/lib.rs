//! # bothub-console
//!
//! Headless core of the BotHub console:
//! - [`roster`]: coalescing read-through cache over the registry's bot list
//! - [`filter`]: the search/status reducer that picks the visible bots
//! - [`actions`]: which claim actions a bot offers
//! - [`claim`]: the claim-code → identity provider → confirmation flow
//! - [`view`]: per-view state that discards completions after disposal

pub mod actions;
pub mod claim;
pub mod filter;
pub mod roster;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::{ClaimAction, ClaimMenu, claim_actions, can_upload_avatar};
pub use claim::{ClaimConfig, ClaimFlow, ClaimPhase, ClaimStatePayload};
pub use filter::{RosterFilter, StatusFilter, visible};
pub use roster::RosterQuery;
pub use view::{DetailState, DetailView, RosterState, RosterView, ViewScope};
