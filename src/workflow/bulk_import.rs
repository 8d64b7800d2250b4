//! Bulk import: one file holding a document or a list of documents

use tracing::{info, warn};

use crate::error::ParseError;
use crate::services::import_client::{normalize_bulk, parse_document, ImportApi};
use crate::types::{BulkImportResult, ImportFile};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkImportState {
    pub file: Option<ImportFile>,
    pub importing: bool,
    pub result: Option<BulkImportResult>,
    pub error: Option<String>,
}

pub struct BulkImportSession<A: ImportApi> {
    api: A,
    state: BulkImportState,
}

impl<A: ImportApi> BulkImportSession<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: BulkImportState::default(),
        }
    }

    pub fn state(&self) -> &BulkImportState {
        &self.state
    }

    pub fn select_file(&mut self, file: ImportFile) {
        self.state.result = None;
        if file.is_json() {
            self.state.file = Some(file);
            self.state.error = None;
        } else {
            self.state.file = None;
            self.state.error = Some(ParseError::NotJson.to_string());
        }
    }

    /// Parse, normalize to a list and submit. Returns the number of
    /// documents sent, or `None` when nothing was sent.
    pub async fn submit(&mut self) -> Option<usize> {
        let Some(file) = self.state.file.as_ref() else {
            self.state.error = Some(ParseError::NotJson.to_string());
            return None;
        };

        let documents = match parse_document(file) {
            Ok(document) => normalize_bulk(document),
            Err(e) => {
                self.state.error = Some(e.to_string());
                return None;
            }
        };

        self.state.importing = true;
        self.state.error = None;
        self.state.result = None;

        match self.api.import_bulk(&documents).await {
            Ok(result) => {
                info!(
                    "Bulk import finished: {}/{} succeeded",
                    result.success_count, result.total_count
                );
                self.state.result = Some(result);
            }
            Err(e) => {
                warn!(code = e.code(), "Bulk import failed: {}", e);
                self.state.error = Some(e.to_string());
            }
        }
        self.state.importing = false;

        Some(documents.len())
    }

    pub fn reset(&mut self) {
        self.state = BulkImportState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::test_support::MockImportApi;

    fn json_file(contents: &str) -> ImportFile {
        ImportFile::new("bulk.json", None, contents.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_single_object_is_sent_as_list() {
        let api = MockImportApi::new();
        let mut session = BulkImportSession::new(api.clone());

        session.select_file(json_file(r#"{"serviceCode":"A"}"#));
        let sent = session.submit().await;

        assert_eq!(sent, Some(1));
        assert_eq!(api.bulk_sizes(), vec![1]);
        assert!(session.state().result.is_some());
        assert!(!session.state().importing);
    }

    #[tokio::test]
    async fn test_array_is_sent_as_is() {
        let api = MockImportApi::new();
        let mut session = BulkImportSession::new(api.clone());

        session.select_file(json_file(r#"[{"serviceCode":"A"},{"serviceCode":"B"},{"serviceCode":"C"}]"#));
        session.submit().await;

        assert_eq!(api.bulk_sizes(), vec![3]);
    }

    #[tokio::test]
    async fn test_invalid_json_never_reaches_server() {
        let api = MockImportApi::new();
        let mut session = BulkImportSession::new(api.clone());

        session.select_file(json_file("[{"));
        assert_eq!(session.submit().await, None);

        assert_eq!(session.state().error.as_deref(), Some("Invalid JSON file"));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_non_json_selection_rejected() {
        let api = MockImportApi::new();
        let mut session = BulkImportSession::new(api.clone());

        session.select_file(ImportFile::new("list.txt", None, b"[]".to_vec()));

        assert_eq!(session.state().error.as_deref(), Some("Please select a JSON file"));
        assert_eq!(session.submit().await, None);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_stored_and_reset_clears() {
        let api = MockImportApi::new().with_bulk(Err(ApiError::Status {
            status: 503,
            message: "unavailable".to_string(),
            code: None,
        }));
        let mut session = BulkImportSession::new(api);

        session.select_file(json_file("[]"));
        session.submit().await;
        assert_eq!(session.state().error.as_deref(), Some("unavailable"));

        session.reset();
        assert_eq!(*session.state(), BulkImportState::default());
    }
}
