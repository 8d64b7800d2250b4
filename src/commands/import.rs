//! health, validate, import and bulk-import

use std::path::Path;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::commands::AppContext;
use crate::services::import_client::{HttpImportApi, ImportApi};
use crate::types::{group_by_field, ImportFile, ImportResult, ValidationError};
use crate::workflow::{BulkImportSession, ImportSession, ImportStep, ImportWorkflow};

async fn load(path: &Path) -> Result<ImportFile> {
    let file = ImportFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    debug!("Loaded {} ({} bytes)", file.name, file.size_bytes());
    Ok(file)
}

fn print_validation_errors(errors: &[ValidationError]) {
    for (field, items) in group_by_field(errors) {
        println!("  {}:", field);
        for error in items {
            if error.code.is_empty() {
                println!("    - {}", error.message);
            } else {
                println!("    - {} [{}]", error.message, error.code);
            }
        }
    }
}

fn print_import_result(result: &ImportResult) {
    if result.success {
        println!(
            "Imported {} (id {})",
            result.service_code.as_deref().unwrap_or("service"),
            result.service_id.map_or("?".to_string(), |id| id.to_string())
        );
    } else {
        println!("Import failed: {}", result.message.as_deref().unwrap_or("no details"));
    }
    if let Some(errors) = &result.errors {
        print_validation_errors(errors);
    }
}

/// Bail with the workflow's error if it fell back to `Upload`
fn ensure_validated(workflow: &ImportWorkflow) -> Result<()> {
    if workflow.step == ImportStep::Validated {
        return Ok(());
    }
    print_validation_errors(&workflow.validation_errors);
    bail!(
        "{}",
        workflow.last_error.as_deref().unwrap_or("Validation did not complete")
    )
}

async fn confirm(prompt: &str) -> Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("{} [y/N] ", prompt).as_bytes()).await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut answer).await?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

pub async fn health(ctx: &AppContext) -> Result<()> {
    let health = HttpImportApi::new(&ctx.client).check_health().await?;
    println!("{} {} ({})", health.service, health.status, health.timestamp);
    Ok(())
}

pub async fn validate(ctx: &AppContext, path: &Path) -> Result<()> {
    let mut session = ImportSession::new(HttpImportApi::new(&ctx.client));
    session.select_file(load(path).await?)?;
    session.submit().await?;

    ensure_validated(session.workflow())?;
    println!("{} is valid", path.display());
    Ok(())
}

pub async fn import(ctx: &AppContext, path: &Path, assume_yes: bool) -> Result<()> {
    let mut session = ImportSession::new(HttpImportApi::new(&ctx.client));
    session.select_file(load(path).await?)?;
    session.submit().await?;
    ensure_validated(session.workflow())?;
    println!("{} passed validation", path.display());

    if !assume_yes && !confirm("Import this service?").await? {
        session.reset();
        println!("Import skipped");
        return Ok(());
    }

    if session.confirm_import().await? != ImportStep::Complete {
        bail!(
            "{}",
            session.workflow().last_error.as_deref().unwrap_or("Import request failed")
        );
    }

    let workflow = session.workflow();
    let Some(result) = workflow.import_result.as_ref() else {
        bail!("Import finished without a result");
    };
    print_import_result(result);
    if !result.success {
        bail!(
            "{}",
            workflow.last_error.as_deref().unwrap_or("Import failed")
        );
    }
    Ok(())
}

pub async fn bulk_import(ctx: &AppContext, path: &Path) -> Result<()> {
    let mut session = BulkImportSession::new(HttpImportApi::new(&ctx.client));
    session.select_file(load(path).await?);

    let sent = session.submit().await;
    let state = session.state();
    if let Some(error) = &state.error {
        bail!("{}", error);
    }
    let Some(result) = &state.result else {
        bail!("Bulk import finished without a result");
    };

    info!("Sent {} documents from {}", sent.unwrap_or(0), path.display());
    println!(
        "Imported {} of {} services ({} failed)",
        result.success_count, result.total_count, result.fail_count
    );
    for (index, item) in result.results.iter().enumerate() {
        if !item.success {
            print!("#{} ", index + 1);
            print_import_result(item);
        }
    }

    if result.fail_count > 0 {
        bail!("{} of {} services failed to import", result.fail_count, result.total_count);
    }
    Ok(())
}
