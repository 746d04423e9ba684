//! # bothub-common
//!
//! Shared types, configuration and the error taxonomy used across the BotHub console crates.
//! No I/O beyond reading configuration lives here.

pub mod config;
pub mod error;
pub mod models;
pub mod timestamp;

pub use error::{ConsoleError, ConsoleResult};
