//! Command handlers. Console failures surface as [`ConsoleError`]; local I/O
//! failures carry their own context.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use bothub_client::{BotRegistry, ClaimService, RestClient};
use bothub_common::config::AppConfig;
use bothub_common::models::{Bot, ClaimApproval};
use bothub_common::{ConsoleError, ConsoleResult};
use bothub_console::claim::request_access;
use bothub_console::view::{DetailState, RosterState};
use bothub_console::{
    ClaimConfig, ClaimFlow, ClaimPhase, DetailView, RosterFilter, RosterQuery, RosterView, ViewScope,
    actions,
};
use serde_json::json;

use crate::cli::{Cli, Command};
use crate::render;

pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    let rest = RestClient::from_config(&config.api)?;
    let json = cli.json;

    match cli.command {
        Command::List { search, status } => {
            let query = RosterQuery::new(Arc::new(rest));
            let mut view = RosterView::new(ViewScope::new());
            view.filter = RosterFilter::new(search, status);
            view.load(&query).await;
            if let RosterState::Failed { error } = view.state() {
                return Err(error.clone().into());
            }
            let bots = view.visible();
            if json {
                print_json(&bots)?;
            } else if view.shows_empty_notice() {
                println!("No bots");
            } else {
                bots.iter().for_each(|bot| println!("{}", render::roster_line(bot)));
            }
        }

        Command::Show { bot_id } => {
            let bot = load_bot(&rest, &bot_id).await?;
            if json {
                print_json(&bot)?;
            } else {
                print!("{}", render::bot_card(&bot));
            }
        }

        Command::Claim { location } => {
            let mut flow = ClaimFlow::mount(&location, ClaimConfig::from_app_config(config), &rest).await;
            if matches!(flow.phase(), ClaimPhase::NoCode) {
                eprintln!("Return home: {}", config.console.origin);
                return Err(ConsoleError::MissingClaimCode.into());
            }
            let target = flow.begin_claim()?;
            if json {
                print_json(&json!({ "bot": flow_bot(&flow), "redirect": target.as_str() }))?;
            } else {
                if let Some(bot) = flow.bot() {
                    print!("{}", render::claim_panel(bot));
                }
                println!("Open this link to verify your identity with Feishu:");
                println!("{target}");
            }
        }

        Command::Callback { location } => {
            let mut flow = ClaimFlow::resume(&location, ClaimConfig::from_app_config(config))?;
            match flow.confirm(&rest).await {
                ClaimPhase::Claimed(receipt) => {
                    if json {
                        print_json(receipt)?;
                    } else {
                        println!("{}", render::receipt(receipt));
                    }
                }
                ClaimPhase::Failed { reason, .. } => {
                    return Err(ConsoleError::ClaimRejected { detail: Some(reason.clone()) }.into());
                }
                other => {
                    return Err(ConsoleError::InvalidState {
                        message: format!("claim ended in {}", other.name()),
                    }
                    .into());
                }
            }
        }

        Command::Request { bot_id, kind, feishu_code, message } => {
            let bot = load_bot(&rest, &bot_id).await?;
            let receipt = request_access(&rest, &bot, kind.into(), &feishu_code, message).await?;
            if json {
                print_json(&receipt)?;
            } else {
                println!("{}", render::receipt(&receipt));
            }
        }

        Command::Approve { request_id, reject, message } => {
            let approval = ClaimApproval { request_id, approved: !reject, message };
            let receipt = rest.approve_claim(&approval).await?;
            if json {
                print_json(&receipt)?;
            } else {
                println!("{}", render::receipt(&receipt));
            }
        }

        Command::Avatar { bot_id, file } => {
            let (file_name, bytes) = read_avatar(&file).await?;
            let bot = load_bot(&rest, &bot_id).await?;
            let uploaded = actions::upload_avatar(&rest, &bot, &file_name, bytes).await?;
            if json {
                print_json(&uploaded)?;
            } else {
                println!("Avatar updated: {}", uploaded.avatar_url);
            }
        }
    }
    Ok(())
}

/// Load one bot through the detail view, keeping "does not exist" distinct.
async fn load_bot(registry: &dyn BotRegistry, bot_id: &str) -> ConsoleResult<Bot> {
    let mut view = DetailView::new(ViewScope::new(), bot_id);
    view.load(registry).await;
    match view.state() {
        DetailState::Ready(bot) => Ok(bot.as_ref().clone()),
        DetailState::NotFound { bot_id } => Err(ConsoleError::NotFound { bot_id: bot_id.clone() }),
        DetailState::Failed { error } => Err(error.clone()),
        DetailState::Loading => Err(ConsoleError::network("request abandoned")),
    }
}

/// File name and contents of a local avatar image.
async fn read_avatar(path: &Path) -> anyhow::Result<(String, Vec<u8>)> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "avatar".to_owned());
    Ok((file_name, bytes))
}

fn flow_bot(flow: &ClaimFlow) -> serde_json::Value {
    flow.bot()
        .and_then(|b| serde_json::to_value(b).ok())
        .unwrap_or(serde_json::Value::Null)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> ConsoleResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
