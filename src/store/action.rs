//! Actions understood by the store
//!
//! Every async operation is one variant carrying an [`AsyncPhase`]; the
//! reducers match on these exhaustively.

use uuid::Uuid;

use crate::error::ApiError;
use crate::types::{
    BulkDeleteOutcome, ExportHistoryResponse, ExportStatusResponse, Notification, ServiceDetail,
    ServiceFilters, ServiceListResponse, StartedExport,
};

/// Transport failure as stored in state: a message plus the HTTP status
/// used for notification classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub message: String,
    pub status: Option<u16>,
}

impl Rejection {
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }
}

impl From<&ApiError> for Rejection {
    fn from(err: &ApiError) -> Self {
        Self::new(err.to_string(), err.status())
    }
}

impl From<ApiError> for Rejection {
    fn from(err: ApiError) -> Self {
        Self::from(&err)
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Rejection {}

#[derive(Debug, Clone, PartialEq)]
pub enum AsyncPhase<T> {
    Pending,
    Fulfilled(T),
    Rejected(Rejection),
}

impl<T> AsyncPhase<T> {
    fn suffix(&self) -> &'static str {
        match self {
            AsyncPhase::Pending => "pending",
            AsyncPhase::Fulfilled(_) => "fulfilled",
            AsyncPhase::Rejected(_) => "rejected",
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            AsyncPhase::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportAction {
    Start(AsyncPhase<StartedExport>),
    CheckStatus(AsyncPhase<ExportStatusResponse>),
    LoadHistory(AsyncPhase<ExportHistoryResponse>),
    /// Payload is the cancelled operation id
    Cancel(AsyncPhase<String>),
    ClearCurrentOperation,
    /// The poll loop gave up on an in-flight status check
    StopPolling,
    UpdateProgress { progress: u8, message: Option<String> },
    ClearError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceAction {
    FetchList(AsyncPhase<ServiceListResponse>),
    FetchById(AsyncPhase<ServiceDetail>),
    Create(AsyncPhase<ServiceDetail>),
    Update(AsyncPhase<ServiceDetail>),
    /// Payload is the deleted id
    Delete(AsyncPhase<i64>),
    Duplicate(AsyncPhase<ServiceDetail>),
    BulkDelete(AsyncPhase<BulkDeleteOutcome>),
    SetFilters(ServiceFilters),
    ClearFilters,
    SetPage(u32),
    SetPageSize(u32),
    ClearCurrentService,
    ClearError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    AddNotification(Notification),
    RemoveNotification(Uuid),
    ClearNotifications,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Export(ExportAction),
    Service(ServiceAction),
    Ui(UiAction),
}

impl Action {
    /// Stable name, e.g. `export/start/pending`
    pub fn name(&self) -> String {
        fn phased<T>(base: &str, phase: &AsyncPhase<T>) -> String {
            format!("{}/{}", base, phase.suffix())
        }

        match self {
            Action::Export(action) => match action {
                ExportAction::Start(p) => phased("export/start", p),
                ExportAction::CheckStatus(p) => phased("export/checkStatus", p),
                ExportAction::LoadHistory(p) => phased("export/loadHistory", p),
                ExportAction::Cancel(p) => phased("export/cancel", p),
                ExportAction::ClearCurrentOperation => "export/clearCurrentOperation".to_string(),
                ExportAction::StopPolling => "export/stopPolling".to_string(),
                ExportAction::UpdateProgress { .. } => "export/updateProgress".to_string(),
                ExportAction::ClearError => "export/clearError".to_string(),
            },
            Action::Service(action) => match action {
                ServiceAction::FetchList(p) => phased("services/fetchList", p),
                ServiceAction::FetchById(p) => phased("services/fetchById", p),
                ServiceAction::Create(p) => phased("services/create", p),
                ServiceAction::Update(p) => phased("services/update", p),
                ServiceAction::Delete(p) => phased("services/delete", p),
                ServiceAction::Duplicate(p) => phased("services/duplicate", p),
                ServiceAction::BulkDelete(p) => phased("services/bulkDelete", p),
                ServiceAction::SetFilters(_) => "services/setFilters".to_string(),
                ServiceAction::ClearFilters => "services/clearFilters".to_string(),
                ServiceAction::SetPage(_) => "services/setPage".to_string(),
                ServiceAction::SetPageSize(_) => "services/setPageSize".to_string(),
                ServiceAction::ClearCurrentService => "services/clearCurrentService".to_string(),
                ServiceAction::ClearError => "services/clearError".to_string(),
            },
            Action::Ui(action) => match action {
                UiAction::AddNotification(_) => "ui/addNotification".to_string(),
                UiAction::RemoveNotification(_) => "ui/removeNotification".to_string(),
                UiAction::ClearNotifications => "ui/clearNotifications".to_string(),
            },
        }
    }

    /// The rejection carried by a failed async action, if any
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Action::Export(action) => match action {
                ExportAction::Start(p) => p.rejection(),
                ExportAction::CheckStatus(p) => p.rejection(),
                ExportAction::LoadHistory(p) => p.rejection(),
                ExportAction::Cancel(p) => p.rejection(),
                _ => None,
            },
            Action::Service(action) => match action {
                ServiceAction::FetchList(p) => p.rejection(),
                ServiceAction::FetchById(p) => p.rejection(),
                ServiceAction::Create(p) => p.rejection(),
                ServiceAction::Update(p) => p.rejection(),
                ServiceAction::Delete(p) => p.rejection(),
                ServiceAction::Duplicate(p) => p.rejection(),
                ServiceAction::BulkDelete(p) => p.rejection(),
                _ => None,
            },
            Action::Ui(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_include_phase() {
        let action = Action::Export(ExportAction::Start(AsyncPhase::Pending));
        assert_eq!(action.name(), "export/start/pending");

        let action = Action::Service(ServiceAction::Delete(AsyncPhase::Fulfilled(3)));
        assert_eq!(action.name(), "services/delete/fulfilled");
    }

    #[test]
    fn test_rejection_only_on_rejected_phase() {
        let rejected = Action::Service(ServiceAction::FetchList(AsyncPhase::Rejected(Rejection::new(
            "boom",
            Some(500),
        ))));
        assert_eq!(rejected.rejection().unwrap().status, Some(500));

        let pending = Action::Service(ServiceAction::FetchList(AsyncPhase::Pending));
        assert!(pending.rejection().is_none());
        assert!(Action::Ui(UiAction::ClearNotifications).rejection().is_none());
    }

    #[test]
    fn test_rejection_from_api_error_keeps_status() {
        assert_eq!(Rejection::from(ApiError::Timeout), Rejection::new("Request timeout", Some(408)));
        assert_eq!(Rejection::from(ApiError::Cancelled).message, "Request cancelled");
        assert_eq!(Rejection::from(ApiError::Network("refused".into())).status, None);
    }
}
