//! Plain-text rendering of console state.

use std::fmt::Write;

use bothub_common::models::{Bot, BotSummary, ClaimReceipt};
use bothub_console::actions::{claim_actions, claim_button_label};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// One line per bot for the roster table.
pub fn roster_line(bot: &Bot) -> String {
    let mut line = format!("{:<24} {:<10} {}", bot.bot_id, bot.status.label(), bot.bot_name);
    if let Some(description) = bot.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(line, " · {description}");
    }
    line
}

/// The detail page of a bot.
pub fn bot_card(bot: &Bot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", bot.bot_name, bot.status.label());
    let _ = writeln!(out, "ID: {}", bot.bot_id);
    let _ = writeln!(out, "Description: {}", bot.description.as_deref().unwrap_or("No description"));

    let caps = bot.capabilities.enabled();
    if !caps.is_empty() {
        let _ = writeln!(out, "Capabilities: {}", caps.join(", "));
    }
    if let Some(endpoint) = &bot.endpoint {
        let _ = writeln!(out, "Endpoint: {endpoint}");
    }
    if let Some(version) = &bot.version {
        let _ = writeln!(out, "Version: {version}");
    }
    if bot.has_identity_binding() {
        let _ = writeln!(out, "Feishu: bound");
    }
    if let Some(at) = bot.last_heartbeat_at {
        let _ = writeln!(out, "Last heartbeat: {}", at.format(TIME_FORMAT));
    }
    if let Some(owner) = &bot.owner {
        let _ = writeln!(out, "Owner: {}", owner.name);
    }
    if let Some(at) = bot.claimed_at {
        let _ = writeln!(out, "Claimed at: {}", at.format(TIME_FORMAT));
    }

    let actions = claim_actions(bot);
    if let Some(label) = claim_button_label(bot) {
        let names: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let _ = writeln!(out, "{label}: {}", names.join(" / "));
    }
    if bot.is_owner {
        let _ = writeln!(out, "You own this bot; `bothub avatar {} <file>` replaces its avatar.", bot.bot_id);
    }
    out
}

/// The bot panel on the claim page.
pub fn claim_panel(bot: &BotSummary) -> String {
    let mut out = String::new();
    match (&bot.avatar_url, bot.initial()) {
        (Some(url), _) => {
            let _ = writeln!(out, "{} ({})  avatar: {url}", bot.bot_name, bot.bot_id);
        }
        (None, Some(initial)) => {
            let _ = writeln!(out, "[{initial}] {} ({})", bot.bot_name, bot.bot_id);
        }
        (None, None) => {
            let _ = writeln!(out, "{}", bot.bot_id);
        }
    }
    if let Some(description) = &bot.description {
        let _ = writeln!(out, "{description}");
    }
    out
}

pub fn receipt(receipt: &ClaimReceipt) -> String {
    format!(
        "{:?} request for {} by {}: {:?}{}",
        receipt.claim_type,
        receipt.bot_name,
        receipt.requester.name,
        receipt.status,
        if receipt.feishu_verified { " (identity verified)" } else { "" }
    )
}
