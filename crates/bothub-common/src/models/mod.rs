//! Data models shared across the console.

pub mod bot;
pub mod claim;

pub use bot::*;
pub use claim::*;
