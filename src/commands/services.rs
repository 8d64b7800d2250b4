//! services list|get|create|update|delete|duplicate|bulk-delete

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::{ListArgs, ServicesCommand};
use crate::commands::AppContext;
use crate::services::service_client::HttpServiceApi;
use crate::store::service_slice::{
    bulk_delete_services, create_service, delete_service, duplicate_service, fetch_service_by_id,
    fetch_services, update_service,
};
use crate::store::{Action, ServiceAction};
use crate::types::{ServiceDetail, ServiceUpsertRequest};

async fn read_request(path: &Path) -> Result<ServiceUpsertRequest> {
    let contents = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&contents).with_context(|| format!("{} is not a valid service document", path.display()))
}

fn print_detail(detail: &ServiceDetail) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(detail)?);
    Ok(())
}

async fn list(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let store = &ctx.store;
    // Filters first: changing them resets the page
    store.dispatch(Action::Service(ServiceAction::SetFilters(args.filters())));
    if let Some(size) = args.page_size {
        store.dispatch(Action::Service(ServiceAction::SetPageSize(size)));
    }
    if let Some(page) = args.page {
        store.dispatch(Action::Service(ServiceAction::SetPage(page)));
    }

    fetch_services(store, &HttpServiceApi::new(&ctx.client)).await?;

    let state = store.select(|s| s.services.clone());
    for item in &state.list {
        println!(
            "{:>6}  {:<14} {:<40} {:<8} {}",
            item.service_id,
            item.service_code,
            item.service_name,
            item.version,
            if item.is_active { "active" } else { "inactive" }
        );
    }
    println!(
        "Page {} of {} ({} services)",
        state.page, state.total_pages, state.total_count
    );
    Ok(())
}

pub async fn run(ctx: &AppContext, command: ServicesCommand) -> Result<()> {
    let api = HttpServiceApi::new(&ctx.client);
    let store = &ctx.store;

    match command {
        ServicesCommand::List(args) => list(ctx, &args).await,
        ServicesCommand::Get { id } => {
            let detail = fetch_service_by_id(store, &api, id).await?;
            print_detail(&detail)
        }
        ServicesCommand::Create { file } => {
            let request = read_request(&file).await?;
            let created = create_service(store, &api, &request).await?;
            println!("Created service {} ({})", created.service_id, created.service_code);
            Ok(())
        }
        ServicesCommand::Update { id, file } => {
            let request = read_request(&file).await?;
            let updated = update_service(store, &api, id, &request).await?;
            print_detail(&updated)
        }
        ServicesCommand::Delete { id } => {
            delete_service(store, &api, id).await?;
            println!("Deleted service {}", id);
            Ok(())
        }
        ServicesCommand::Duplicate { id } => {
            let copy = duplicate_service(store, &api, id).await?;
            println!("Duplicated service {} as {} ({})", id, copy.service_id, copy.service_code);
            Ok(())
        }
        ServicesCommand::BulkDelete { ids } => {
            let outcome = bulk_delete_services(store, &api, &ids).await?;
            println!(
                "Deleted {} of {} services",
                outcome.response.deleted_count,
                outcome.requested_ids.len()
            );
            for failure in &outcome.response.errors {
                println!("  {}: {}", failure.id, failure.message);
            }
            Ok(())
        }
    }
}
