//! Export slice: the tracked export job plus export history

use chrono::Utc;
use tracing::debug;

use crate::error::ApiError;
use crate::services::export_client::ExportApi;
use crate::store::action::{Action, AsyncPhase, ExportAction, Rejection};
use crate::store::Store;
use crate::types::{
    ExportFormat, ExportHistoryItem, ExportHistoryParams, ExportHistoryResponse, ExportOperation,
    ExportRequest, ExportStatus, ExportStatusResponse, StartedExport,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportState {
    pub current_operation: Option<ExportOperation>,
    pub history: Vec<ExportHistoryItem>,
    pub history_total_count: u64,
    pub is_loading: bool,
    pub is_loading_history: bool,
    pub is_polling: bool,
    pub error: Option<String>,
}

fn clamp_progress(progress: u32) -> u8 {
    progress.min(100) as u8
}

pub fn reduce(state: &mut ExportState, action: &ExportAction) {
    match action {
        ExportAction::Start(AsyncPhase::Pending) => {
            state.is_loading = true;
            state.error = None;
        }
        ExportAction::Start(AsyncPhase::Fulfilled(started)) => {
            state.is_loading = false;
            state.current_operation = Some(ExportOperation {
                operation_id: started.operation_id.clone(),
                status: started.status,
                format: started.format,
                progress: 0,
                message: None,
                download_url: None,
                file_name: None,
                file_size: None,
                started_at: started.started_at,
                completed_at: None,
                error: None,
            });
        }
        ExportAction::Start(AsyncPhase::Rejected(rejection)) => {
            state.is_loading = false;
            state.error = Some(rejection.message.clone());
        }

        ExportAction::CheckStatus(AsyncPhase::Pending) => {
            state.is_polling = true;
            state.error = None;
        }
        ExportAction::CheckStatus(AsyncPhase::Fulfilled(response)) => {
            state.is_polling = false;
            let Some(operation) = state.current_operation.as_mut() else {
                return;
            };
            if let Some(id) = &response.operation_id {
                if *id != operation.operation_id {
                    debug!("Ignoring status for {} while tracking {}", id, operation.operation_id);
                    return;
                }
            }
            // Latest poll wins, field by field
            operation.status = response.status;
            operation.progress = clamp_progress(response.progress);
            operation.message = response.message.clone();
            operation.download_url = response.download_url.clone();
            operation.file_name = response.file_name.clone();
            operation.file_size = response.file_size;
            operation.completed_at = response.completed_at;
            operation.error = response.error.clone();
        }
        ExportAction::CheckStatus(AsyncPhase::Rejected(rejection)) => {
            state.is_polling = false;
            state.error = Some(rejection.message.clone());
        }

        ExportAction::LoadHistory(AsyncPhase::Pending) => {
            state.is_loading_history = true;
            state.error = None;
        }
        ExportAction::LoadHistory(AsyncPhase::Fulfilled(response)) => {
            state.is_loading_history = false;
            state.history = response.items.clone();
            state.history_total_count = response.total_count;
        }
        ExportAction::LoadHistory(AsyncPhase::Rejected(rejection)) => {
            state.is_loading_history = false;
            state.error = Some(rejection.message.clone());
        }

        ExportAction::Cancel(AsyncPhase::Pending) => {
            state.error = None;
        }
        ExportAction::Cancel(AsyncPhase::Fulfilled(operation_id)) => {
            if let Some(operation) = state.current_operation.as_mut() {
                if operation.operation_id == *operation_id && operation.status.is_cancellable() {
                    operation.status = ExportStatus::Cancelled;
                }
            }
        }
        ExportAction::Cancel(AsyncPhase::Rejected(rejection)) => {
            state.error = Some(rejection.message.clone());
        }

        ExportAction::ClearCurrentOperation => {
            state.current_operation = None;
        }
        ExportAction::StopPolling => {
            state.is_polling = false;
        }
        ExportAction::UpdateProgress { progress, message } => {
            if let Some(operation) = state.current_operation.as_mut() {
                operation.progress = (*progress).min(100);
                if message.is_some() {
                    operation.message = message.clone();
                }
            }
        }
        ExportAction::ClearError => {
            state.error = None;
        }
    }
}

fn dispatch(store: &Store, action: ExportAction) {
    store.dispatch(Action::Export(action));
}

fn rejected<T>(store: &Store, err: ApiError, wrap: fn(AsyncPhase<T>) -> ExportAction) -> Rejection {
    let rejection = Rejection::from(err);
    dispatch(store, wrap(AsyncPhase::Rejected(rejection.clone())));
    rejection
}

// ==========================================================================
// Thunks
// ==========================================================================

pub async fn start_export(
    store: &Store,
    api: &dyn ExportApi,
    request: &ExportRequest,
) -> Result<StartedExport, Rejection> {
    dispatch(store, ExportAction::Start(AsyncPhase::Pending));
    match api.start(request).await {
        Ok(response) => {
            let started = StartedExport {
                operation_id: response.operation_id,
                status: response.status,
                format: request.format,
                started_at: Utc::now(),
            };
            dispatch(store, ExportAction::Start(AsyncPhase::Fulfilled(started.clone())));
            Ok(started)
        }
        Err(e) => Err(rejected(store, e, ExportAction::Start)),
    }
}

/// Poll once. The response is stamped with `operation_id` when the
/// server leaves it out.
pub async fn check_export_status(
    store: &Store,
    api: &dyn ExportApi,
    operation_id: &str,
    format: ExportFormat,
) -> Result<ExportStatusResponse, Rejection> {
    dispatch(store, ExportAction::CheckStatus(AsyncPhase::Pending));
    match api.status(operation_id, format).await {
        Ok(mut response) => {
            response
                .operation_id
                .get_or_insert_with(|| operation_id.to_string());
            dispatch(store, ExportAction::CheckStatus(AsyncPhase::Fulfilled(response.clone())));
            Ok(response)
        }
        Err(e) => Err(rejected(store, e, ExportAction::CheckStatus)),
    }
}

pub async fn load_export_history(
    store: &Store,
    api: &dyn ExportApi,
    params: &ExportHistoryParams,
) -> Result<ExportHistoryResponse, Rejection> {
    dispatch(store, ExportAction::LoadHistory(AsyncPhase::Pending));
    match api.history(params).await {
        Ok(response) => {
            dispatch(store, ExportAction::LoadHistory(AsyncPhase::Fulfilled(response.clone())));
            Ok(response)
        }
        Err(e) => Err(rejected(store, e, ExportAction::LoadHistory)),
    }
}

/// Advisory: the job may still finish on its own before the server
/// honours the cancel
pub async fn cancel_export(store: &Store, api: &dyn ExportApi, operation_id: &str) -> Result<(), Rejection> {
    dispatch(store, ExportAction::Cancel(AsyncPhase::Pending));
    match api.cancel(operation_id).await {
        Ok(()) => {
            dispatch(
                store,
                ExportAction::Cancel(AsyncPhase::Fulfilled(operation_id.to_string())),
            );
            Ok(())
        }
        Err(e) => Err(rejected(store, e, ExportAction::Cancel)),
    }
}
