//! export, export-status, export-cancel and export-history

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::ExportArgs;
use crate::commands::AppContext;
use crate::services::export_client::{ExportApi, HttpExportApi};
use crate::services::export_poller::{ExportPoller, PollOutcome, PollSettings};
use crate::store::export_slice::{cancel_export, check_export_status, load_export_history, start_export};
use crate::types::{ExportFormat, ExportHistoryParams, ExportStatus, ExportStatusResponse};

fn default_file_name(operation_id: &str, format: ExportFormat) -> String {
    let extension = match format {
        ExportFormat::Pdf => "pdf",
        ExportFormat::Markdown => "md",
    };
    format!("export-{}.{}", operation_id, extension)
}

/// Where to save a finished export. A server-supplied file name only
/// contributes its final component.
fn output_path(
    output: Option<&Path>,
    server_file_name: Option<&str>,
    operation_id: &str,
    format: ExportFormat,
) -> PathBuf {
    if let Some(output) = output {
        return output.to_path_buf();
    }
    server_file_name
        .and_then(|name| Path::new(name).file_name())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default_file_name(operation_id, format)))
}

fn print_status(operation_id: &str, status: &ExportStatusResponse) {
    println!("{}: {} ({}%)", operation_id, status.status, status.progress);
    if let Some(message) = &status.message {
        println!("  {}", message);
    }
    if let Some(url) = &status.download_url {
        println!("  download: {}", url);
    }
    if let Some(error) = &status.error {
        println!("  error: {}", error);
    }
}

pub async fn export(ctx: &AppContext, args: &ExportArgs) -> Result<()> {
    let api = HttpExportApi::new(&ctx.client);
    let request = args.to_request();

    let started = start_export(&ctx.store, &api, &request).await?;
    println!("Export {} started ({})", started.operation_id, started.status);

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let token = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        })
    };

    let poller = ExportPoller::new(&ctx.store, &api, PollSettings::from_config(&ctx.config));
    let outcome = poller.run(&started.operation_id, request.format, &cancel).await;
    ctrl_c.abort();

    let response = match outcome? {
        PollOutcome::Stopped => {
            warn!("Interrupted, cancelling export {}", started.operation_id);
            cancel_export(&ctx.store, &api, &started.operation_id).await?;
            println!("Export {} cancelled", started.operation_id);
            return Ok(());
        }
        PollOutcome::Finished(response) => response,
    };

    print_status(&started.operation_id, &response);
    match response.status {
        ExportStatus::Completed => {}
        ExportStatus::Cancelled => return Ok(()),
        _ => bail!(
            "Export {} failed: {}",
            started.operation_id,
            response.error.as_deref().unwrap_or("no reason given")
        ),
    }

    let output = output_path(
        args.output.as_deref(),
        response.file_name.as_deref(),
        &started.operation_id,
        request.format,
    );
    let bytes = api.download(&started.operation_id, request.format).await?;
    tokio::fs::write(&output, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Saved export {} to {}", started.operation_id, output.display());
    println!("Saved {} bytes to {}", bytes.len(), output.display());
    Ok(())
}

pub async fn status(ctx: &AppContext, operation_id: &str, format: ExportFormat) -> Result<()> {
    let api = HttpExportApi::new(&ctx.client);
    let response = check_export_status(&ctx.store, &api, operation_id, format).await?;
    print_status(operation_id, &response);
    Ok(())
}

pub async fn cancel(ctx: &AppContext, operation_id: &str) -> Result<()> {
    let api = HttpExportApi::new(&ctx.client);
    cancel_export(&ctx.store, &api, operation_id).await?;
    println!("Cancel requested for {}", operation_id);
    Ok(())
}

pub async fn history(
    ctx: &AppContext,
    page: Option<u32>,
    page_size: Option<u32>,
    format: Option<ExportFormat>,
) -> Result<()> {
    let api = HttpExportApi::new(&ctx.client);
    let params = ExportHistoryParams {
        page,
        page_size,
        format,
        status: None,
    };
    let response = load_export_history(&ctx.store, &api, &params).await?;

    for item in &response.items {
        println!(
            "{}  {:<8} {:<10} {} services  {}",
            item.created_at.format("%Y-%m-%d %H:%M"),
            item.format,
            item.status,
            item.service_count,
            item.operation_id
        );
    }
    println!(
        "Page {} ({} per page), {} exports in total",
        response.page, response.page_size, response.total_count
    );
    Ok(())
}
