//! Catalogue - command-line client for the Service Catalogue Manager API
//!
//! Imports service documents, runs exports and manages catalogue entries
//! over the REST API.

mod auth;
mod cli;
mod commands;
mod config;
mod error;
mod services;
mod store;
mod types;
mod workflow;

#[cfg(test)]
mod test_support;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::AppContext;
use crate::services::api_client::ApiClient;
use crate::store::{ui_slice, Store};
use crate::types::{Notification, NotificationKind};

fn init_logging(logs_dir: &str) -> WorkerGuard {
    std::fs::create_dir_all(logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, logs_dir, "catalogue.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // stderr keeps stdout free for command output
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,catalogue=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    guard
}

fn print_notification(notification: &Notification) {
    let label = match notification.kind {
        NotificationKind::Error => "error",
        NotificationKind::Warning => "warning",
        NotificationKind::Info => "info",
        NotificationKind::Success => "success",
    };
    eprintln!("[{}] {}: {}", label, notification.title, notification.message);
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();

    let config = config::Config::from_env().context("Failed to load configuration")?;
    let _guard = init_logging(&config.logs_dir);
    info!("Using catalogue API at {}", config.api_base_url);

    let auth = auth::provider_from_config(&config);
    info!("Auth provider: {}", auth.name());
    let client = ApiClient::from_config(&config, auth).context("Failed to build HTTP client")?;

    let ctx = AppContext {
        config,
        client,
        store: Store::with_default_middleware(),
    };

    let result = commands::run(cli.command, &ctx).await;

    for notification in ui_slice::drain_notifications(&ctx.store) {
        print_notification(&notification);
    }

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!("{:#}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
