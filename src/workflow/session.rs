//! Async driver for [`ImportWorkflow`]
//!
//! Every operation that issues a request takes `&mut self`, so one
//! session never has two requests in flight.

use tracing::{debug, info, warn};

use crate::error::ParseError;
use crate::services::import_client::{parse_document, ImportApi};
use crate::types::ImportFile;
use crate::workflow::import_workflow::{ImportStep, ImportWorkflow, WorkflowError, WorkflowEvent};

pub struct ImportSession<A: ImportApi> {
    api: A,
    workflow: ImportWorkflow,
}

impl<A: ImportApi> ImportSession<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            workflow: ImportWorkflow::new(),
        }
    }

    pub fn workflow(&self) -> &ImportWorkflow {
        &self.workflow
    }

    pub fn step(&self) -> ImportStep {
        self.workflow.step
    }

    /// Stage a file. Non-JSON files are rejected without any request.
    pub fn select_file(&mut self, file: ImportFile) -> Result<ImportStep, WorkflowError> {
        if !file.is_json() {
            debug!("Rejected non-JSON file {}", file.name);
            return self
                .workflow
                .apply(WorkflowEvent::FileRejected(ParseError::NotJson.to_string()));
        }
        self.workflow.apply(WorkflowEvent::FileSelected(file))
    }

    /// Parse the staged file locally, then ask the server to validate it
    pub async fn submit(&mut self) -> Result<ImportStep, WorkflowError> {
        self.workflow.apply(WorkflowEvent::SubmitStarted)?;

        let parsed = match self.workflow.raw_file.as_ref() {
            Some(file) => parse_document(file),
            None => return Err(WorkflowError::NoFileStaged),
        };
        let document = match parsed {
            Ok(document) => document,
            Err(e) => return self.workflow.apply(WorkflowEvent::ParseFailed(e.to_string())),
        };

        let event = match self.api.validate(&document).await {
            Ok(outcome) if outcome.is_valid => WorkflowEvent::ValidationPassed(document),
            Ok(outcome) => {
                info!("Validation rejected document with {} errors", outcome.errors.len());
                WorkflowEvent::ValidationFailed {
                    document,
                    errors: outcome.errors,
                }
            }
            Err(e) => {
                warn!(code = e.code(), "Validation request failed: {}", e);
                WorkflowEvent::ValidationTransportFailed(e.to_string())
            }
        };
        self.workflow.apply(event)
    }

    /// Import the document that passed validation
    pub async fn confirm_import(&mut self) -> Result<ImportStep, WorkflowError> {
        self.workflow.apply(WorkflowEvent::ImportStarted)?;

        let Some(document) = self.workflow.parsed_payload.clone() else {
            return Err(WorkflowError::NothingToImport);
        };

        let event = match self.api.import_one(&document).await {
            Ok(result) => {
                if result.success {
                    info!(
                        "Imported service {} (id {:?})",
                        result.service_code.as_deref().unwrap_or("?"),
                        result.service_id
                    );
                } else {
                    info!("Import rejected: {}", result.message.as_deref().unwrap_or("no message"));
                }
                WorkflowEvent::ImportFinished(result)
            }
            Err(e) => {
                warn!(code = e.code(), "Import request failed: {}", e);
                WorkflowEvent::ImportTransportFailed(e.to_string())
            }
        };
        self.workflow.apply(event)
    }

    pub fn reset(&mut self) {
        // Reset is accepted from every step
        let _ = self.workflow.apply(WorkflowEvent::Reset);
    }
}
