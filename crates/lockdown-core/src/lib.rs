//! Lockdown Core - Domain types, error handling, configuration and the
//! concurrent engine that collects projects and applies bulk changes to them.
//!
//! # Overview
//!
//! - [`paging`] - concurrent retrieval of a complete paged listing
//! - [`batch`] - fan-out of a remote operation over consecutive batches
//! - [`progress`] - shared progress counter and its background monitor
//! - [`report`] - reporting of calls that completed with a failing status
//! - [`orchestrator`] - the collect / privatize / apply-template run

pub mod batch;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod paging;
pub mod progress;
pub mod report;
pub mod service;

pub use batch::{partition, Batch, BatchedExecutor, PhaseSummary};
pub use config::{HttpConfig, RunConfig, MAX_BATCH_SIZE, MAX_PAGE_SIZE};
pub use error::AppError;
pub use models::{
    OperationOutcome, Page, Paging, PermissionTemplate, Project, TemplateSearch, Visibility,
};
pub use orchestrator::{Orchestrator, RunState, RunSummary};
pub use paging::{collect_pages, Collection};
pub use progress::{ProgressCounter, ProgressMonitor, ProgressReporter, StderrReporter};
pub use report::report_failures;
pub use service::{resolve_template, ProjectService};
