//! CLI argument parsing for the catalogue binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::{ExportFormat, ExportOptions, ExportRequest, ServiceFilters, SortOrder};

#[derive(Parser)]
#[command(name = "catalogue", about = "Service Catalogue Manager client", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check that the import endpoints are up
    Health,
    /// Validate a service document without importing it
    Validate {
        file: PathBuf,
    },
    /// Validate, confirm and import a single service document
    Import {
        file: PathBuf,
        /// Import without asking for confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Import a JSON file holding one document or a list of documents
    BulkImport {
        file: PathBuf,
    },
    /// Export services to PDF or Markdown and wait for the result
    Export(ExportArgs),
    /// Show the status of an export job
    ExportStatus {
        operation_id: String,
        #[arg(long, value_enum)]
        format: ExportFormat,
    },
    /// Ask the server to cancel an export job
    ExportCancel {
        operation_id: String,
    },
    /// List previous exports
    ExportHistory {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,
    },
    /// Manage catalogue services
    #[command(subcommand)]
    Services(ServicesCommand),
}

/// Optional document sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportSection {
    UsageScenarios,
    Dependencies,
    Scope,
    Timeline,
    Team,
    Effort,
    Licenses,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(long, value_enum)]
    pub format: ExportFormat,

    /// Service to include (repeatable)
    #[arg(long = "service-id", required = true, num_args = 1..)]
    pub service_ids: Vec<i64>,

    /// Only include these sections (default: server decides)
    #[arg(long = "include", value_enum)]
    pub sections: Vec<ExportSection>,

    #[arg(long)]
    pub template_id: Option<String>,

    /// Where to write the exported file
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn to_request(&self) -> ExportRequest {
        let options = if self.sections.is_empty() && self.template_id.is_none() {
            None
        } else {
            let has = |section: ExportSection| self.sections.contains(&section).then_some(true);
            Some(ExportOptions {
                include_usage_scenarios: has(ExportSection::UsageScenarios),
                include_dependencies: has(ExportSection::Dependencies),
                include_scope: has(ExportSection::Scope),
                include_timeline: has(ExportSection::Timeline),
                include_team: has(ExportSection::Team),
                include_effort: has(ExportSection::Effort),
                include_licenses: has(ExportSection::Licenses),
                template_id: self.template_id.clone(),
            })
        };

        ExportRequest {
            service_ids: self.service_ids.clone(),
            format: self.format,
            options,
        }
    }
}

#[derive(Subcommand)]
pub enum ServicesCommand {
    /// List services, one page at a time
    List(ListArgs),
    /// Show one service
    Get { id: i64 },
    /// Create a service from a JSON file
    Create { file: PathBuf },
    /// Replace a service with the contents of a JSON file
    Update { id: i64, file: PathBuf },
    Delete { id: i64 },
    /// Copy a service under a new id
    Duplicate { id: i64 },
    /// Delete several services in one request
    BulkDelete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,
    },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub page_size: Option<u32>,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub category_id: Option<i64>,
    #[arg(long)]
    pub subcategory_id: Option<i64>,
    /// Only active (true) or inactive (false) services
    #[arg(long)]
    pub active: Option<bool>,
    #[arg(long)]
    pub sort_by: Option<String>,
    #[arg(long, value_enum)]
    pub sort_order: Option<SortOrder>,
}

impl ListArgs {
    pub fn filters(&self) -> ServiceFilters {
        ServiceFilters {
            search: self.search.clone(),
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
            is_active: self.active,
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order,
        }
    }
}
