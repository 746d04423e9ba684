//! # bothub
//!
//! Command-line console for the BotHub registry: browse the roster, inspect a
//! bot, and run the claim flow through the identity provider.

mod cli;
mod commands;
mod render;

use std::process::ExitCode;

use bothub_common::config::AppConfig;
use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bothub=info".into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load()?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(token) = &cli.token {
        config.api.token = Some(token.clone());
    }
    tracing::debug!("bothub v{} against {}", env!("CARGO_PKG_VERSION"), config.api.base_url);

    match commands::run(cli, &config).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            if let Some(console) = e.downcast_ref::<bothub_common::ConsoleError>() {
                tracing::debug!(code = console.error_code(), "command failed");
            }
            eprintln!("error: {e:#}");
            Ok(ExitCode::FAILURE)
        }
    }
}
