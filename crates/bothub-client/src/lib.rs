//! BotHub registry client.
//!
//! ```rust,no_run
//! use bothub_client::{BotRegistry, RestClient};
//!
//! #[tokio::main]
//! async fn main() -> bothub_common::ConsoleResult<()> {
//!     let rest = RestClient::new("http://localhost:8000", None, 30)?;
//!     for bot in rest.list_bots().await? {
//!         println!("{} ({})", bot.bot_name, bot.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod registry;
pub mod rest;

pub use registry::{BotRegistry, ClaimService};
pub use rest::RestClient;
