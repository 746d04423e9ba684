//! Command-line surface.

use std::path::PathBuf;

use bothub_console::{ClaimAction, StatusFilter};
use clap::{Parser, Subcommand, ValueEnum};
use url::Url;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "bothub", version, about = "Browse the BotHub registry and claim bots")]
pub struct Cli {
    /// Registry origin, overriding `api.base_url`.
    #[arg(long, env = "BOTHUB_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token, overriding `api.token`.
    #[arg(long, env = "BOTHUB_API_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List registered bots.
    List {
        /// Case-insensitive match on name or description.
        #[arg(long, short, default_value = "")]
        search: String,
        /// `all` or one of online, offline, error, busy, unclaimed, claimed.
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Show one bot.
    Show { bot_id: String },
    /// Start a claim from a claim link (…/claim?code=…).
    Claim { location: Url },
    /// Finish a claim from the identity-provider callback location.
    Callback { location: Url },
    /// Ask for hire/share access to a claimed bot.
    Request {
        bot_id: String,
        #[arg(long = "as", value_enum)]
        kind: AccessKind,
        /// Authorization code issued by the identity provider.
        #[arg(long)]
        feishu_code: String,
        #[arg(long)]
        message: Option<String>,
    },
    /// Approve (default) or reject a pending access request.
    Approve {
        request_id: Uuid,
        #[arg(long)]
        reject: bool,
        #[arg(long)]
        message: Option<String>,
    },
    /// Replace a bot's avatar. Owner only.
    Avatar { bot_id: String, file: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AccessKind {
    Hire,
    Share,
}

impl From<AccessKind> for ClaimAction {
    fn from(kind: AccessKind) -> Self {
        match kind {
            AccessKind::Hire => ClaimAction::Hire,
            AccessKind::Share => ClaimAction::Share,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bothub_common::models::BotStatus;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bothub").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn list_defaults_to_everything() {
        let cli = parse(&["list"]);
        let Command::List { search, status } = cli.command else { panic!("not list") };
        assert!(search.is_empty());
        assert_eq!(status, StatusFilter::All);
    }

    #[test]
    fn list_takes_search_and_status() {
        let cli = parse(&["list", "-s", "help", "--status", "online", "--json"]);
        assert!(cli.json);
        let Command::List { search, status } = cli.command else { panic!("not list") };
        assert_eq!(search, "help");
        assert_eq!(status, StatusFilter::Only(BotStatus::Online));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(Cli::try_parse_from(["bothub", "list", "--status", "asleep"]).is_err());
    }

    #[test]
    fn claim_takes_a_location() {
        let cli = parse(&["claim", "https://console.example.com/claim?code=abc"]);
        let Command::Claim { location } = cli.command else { panic!("not claim") };
        assert_eq!(location.query(), Some("code=abc"));
    }

    #[test]
    fn request_maps_kind_to_action() {
        let cli = parse(&["request", "helper-01", "--as", "share", "--feishu-code", "fs"]);
        let Command::Request { kind, .. } = cli.command else { panic!("not request") };
        assert_eq!(ClaimAction::from(kind), ClaimAction::Share);
    }
}
