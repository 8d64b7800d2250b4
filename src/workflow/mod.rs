//! Import workflows driven from the command line

pub mod bulk_import;
pub mod import_workflow;
pub mod session;

pub use bulk_import::{BulkImportSession, BulkImportState};
pub use import_workflow::{ImportStep, ImportWorkflow, WorkflowError, WorkflowEvent};
pub use session::ImportSession;
