//! Command handlers
//!
//! Each handler drives one workflow or thunk against the live API and
//! prints its result to stdout. Notifications raised along the way stay
//! in the store for the caller to print.

mod export;
mod import;
mod services;

use anyhow::Result;

use crate::cli::Command;
use crate::config::Config;
use crate::services::api_client::ApiClient;
use crate::store::Store;

/// Everything a command needs
pub struct AppContext {
    pub config: Config,
    pub client: ApiClient,
    pub store: Store,
}

pub async fn run(command: Command, ctx: &AppContext) -> Result<()> {
    match command {
        Command::Health => import::health(ctx).await,
        Command::Validate { file } => import::validate(ctx, &file).await,
        Command::Import { file, yes } => import::import(ctx, &file, yes).await,
        Command::BulkImport { file } => import::bulk_import(ctx, &file).await,
        Command::Export(args) => export::export(ctx, &args).await,
        Command::ExportStatus { operation_id, format } => export::status(ctx, &operation_id, format).await,
        Command::ExportCancel { operation_id } => export::cancel(ctx, &operation_id).await,
        Command::ExportHistory { page, page_size, format } => {
            export::history(ctx, page, page_size, format).await
        }
        Command::Services(command) => services::run(ctx, command).await,
    }
}
