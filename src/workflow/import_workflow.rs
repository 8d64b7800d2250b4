//! Import workflow state machine
//!
//! Upload -> Validating -> Validated -> Importing -> Complete
//!
//! `Validating` and `Importing` are transient: they last exactly as long
//! as the corresponding network call. Failures return to the nearest
//! point the user can retry from: `Upload` after parse or validation
//! failures, `Validated` after an import transport failure. A business
//! failure reported inside an import result still lands in `Complete`.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::types::{ImportFile, ImportResult, ValidationError};

pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed. Please fix the errors below.";
pub const IMPORT_FAILED_MESSAGE: &str = "Import failed. See details below.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    Upload,
    Validating,
    Validated,
    Importing,
    Complete,
}

impl fmt::Display for ImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStep::Upload => "upload",
            ImportStep::Validating => "validating",
            ImportStep::Validated => "validated",
            ImportStep::Importing => "importing",
            ImportStep::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Everything that can happen to a workflow
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    /// User picked a JSON file
    FileSelected(ImportFile),
    /// User picked something that is not JSON
    FileRejected(String),
    /// Parse + validate is about to run
    SubmitStarted,
    ParseFailed(String),
    ValidationPassed(Value),
    ValidationFailed {
        document: Value,
        errors: Vec<ValidationError>,
    },
    /// Validate call failed below the business layer
    ValidationTransportFailed(String),
    /// User confirmed the import
    ImportStarted,
    /// Server answered the import call, successfully or not
    ImportFinished(ImportResult),
    ImportTransportFailed(String),
    Reset,
}

impl WorkflowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowEvent::FileSelected(_) => "file_selected",
            WorkflowEvent::FileRejected(_) => "file_rejected",
            WorkflowEvent::SubmitStarted => "submit_started",
            WorkflowEvent::ParseFailed(_) => "parse_failed",
            WorkflowEvent::ValidationPassed(_) => "validation_passed",
            WorkflowEvent::ValidationFailed { .. } => "validation_failed",
            WorkflowEvent::ValidationTransportFailed(_) => "validation_transport_failed",
            WorkflowEvent::ImportStarted => "import_started",
            WorkflowEvent::ImportFinished(_) => "import_finished",
            WorkflowEvent::ImportTransportFailed(_) => "import_transport_failed",
            WorkflowEvent::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("cannot apply '{event}' while in step '{from}'")]
    InvalidTransition { from: ImportStep, event: &'static str },

    #[error("no file selected")]
    NoFileStaged,

    #[error("no validated document to import")]
    NothingToImport,
}

/// State of one import, owned by the session that drives it
#[derive(Debug, Clone, PartialEq)]
pub struct ImportWorkflow {
    pub step: ImportStep,
    pub raw_file: Option<ImportFile>,
    pub parsed_payload: Option<Value>,
    pub validation_errors: Vec<ValidationError>,
    pub import_result: Option<ImportResult>,
    pub last_error: Option<String>,
}

impl Default for ImportWorkflow {
    fn default() -> Self {
        Self {
            step: ImportStep::Upload,
            raw_file: None,
            parsed_payload: None,
            validation_errors: Vec::new(),
            import_result: None,
            last_error: None,
        }
    }
}

impl ImportWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Invalid combinations leave the state untouched.
    pub fn apply(&mut self, event: WorkflowEvent) -> Result<ImportStep, WorkflowError> {
        use ImportStep::*;

        let invalid = |from: ImportStep, event: &WorkflowEvent| WorkflowError::InvalidTransition {
            from,
            event: event.name(),
        };

        match (self.step, event) {
            (_, WorkflowEvent::Reset) => {
                *self = Self::default();
            }

            (Upload, WorkflowEvent::FileSelected(file)) => {
                self.raw_file = Some(file);
                self.parsed_payload = None;
                self.validation_errors.clear();
                self.last_error = None;
            }
            (Upload, WorkflowEvent::FileRejected(message)) => {
                self.raw_file = None;
                self.parsed_payload = None;
                self.last_error = Some(message);
            }

            (Upload, WorkflowEvent::SubmitStarted) => {
                if self.raw_file.is_none() {
                    return Err(WorkflowError::NoFileStaged);
                }
                self.step = Validating;
                self.last_error = None;
            }

            (Validating, WorkflowEvent::ParseFailed(message)) => {
                self.step = Upload;
                self.parsed_payload = None;
                self.last_error = Some(message);
            }
            (Validating, WorkflowEvent::ValidationPassed(document)) => {
                self.step = Validated;
                self.parsed_payload = Some(document);
                self.validation_errors.clear();
            }
            (Validating, WorkflowEvent::ValidationFailed { document, errors }) => {
                self.step = Upload;
                self.parsed_payload = Some(document);
                self.validation_errors = errors;
                self.last_error = Some(VALIDATION_FAILED_MESSAGE.to_string());
            }
            (Validating, WorkflowEvent::ValidationTransportFailed(message)) => {
                self.step = Upload;
                self.last_error = Some(message);
            }

            (Validated, WorkflowEvent::ImportStarted) => {
                if self.parsed_payload.is_none() {
                    return Err(WorkflowError::NothingToImport);
                }
                self.step = Importing;
                self.last_error = None;
            }

            (Importing, WorkflowEvent::ImportFinished(result)) => {
                self.step = Complete;
                if !result.success {
                    self.last_error = Some(IMPORT_FAILED_MESSAGE.to_string());
                }
                self.import_result = Some(result);
            }
            (Importing, WorkflowEvent::ImportTransportFailed(message)) => {
                self.step = Validated;
                self.last_error = Some(message);
            }

            (from, event) => return Err(invalid(from, &event)),
        }

        Ok(self.step)
    }
}
