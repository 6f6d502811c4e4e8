//! Full run: collect every project, make each private, apply a template.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{error, info};

use crate::batch::{BatchedExecutor, PhaseSummary};
use crate::config::RunConfig;
use crate::error::AppError;
use crate::models::Visibility;
use crate::paging::collect_pages;
use crate::progress::{ProgressReporter, StderrReporter};
use crate::service::ProjectService;

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Collecting,
    PrivatizingAll,
    ApplyingTemplate,
    Done,
    Fatal,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Init => "init",
            RunState::Collecting => "collecting projects",
            RunState::PrivatizingAll => "privatizing projects",
            RunState::ApplyingTemplate => "applying permission template",
            RunState::Done => "done",
            RunState::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub projects: usize,
    pub pages: u32,
    /// `None` on a dry run.
    pub privatized: Option<PhaseSummary>,
    /// `None` on a dry run.
    pub template: Option<PhaseSummary>,
}

/// Drives a run against a [`ProjectService`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use lockdown_core::{resolve_template, Orchestrator, ProjectService, RunConfig};
///
/// # async fn example<S: ProjectService>(service: Arc<S>) -> Result<(), lockdown_core::AppError> {
/// let template_id = resolve_template(service.as_ref(), "tpl-1").await?;
/// let orchestrator = Orchestrator::new(service, RunConfig::default());
/// let summary = orchestrator.run(&template_id).await?;
/// println!("{} projects processed", summary.projects);
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator<S: ?Sized> {
    service: Arc<S>,
    config: RunConfig,
    executor: BatchedExecutor,
    state: Mutex<RunState>,
}

impl<S> Orchestrator<S>
where
    S: ProjectService + ?Sized,
{
    pub fn new(service: Arc<S>, config: RunConfig) -> Self {
        Self::with_reporter(service, config, Arc::new(StderrReporter))
    }

    pub fn with_reporter(
        service: Arc<S>,
        config: RunConfig,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        let executor = BatchedExecutor::new(reporter)
            .with_progress_interval(config.progress_interval)
            .with_concurrency(config.concurrency);
        Self {
            service,
            config,
            executor,
            state: Mutex::new(RunState::Init),
        }
    }

    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn transition(&self, next: RunState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        info!("Run state: {} -> {}", *state, next);
        *state = next;
    }

    /// Runs every phase with an already validated `template_id`.
    ///
    /// Soft failures are reported and the run carries on. The first hard
    /// failure moves the run to [`RunState::Fatal`] and is returned.
    pub async fn run(&self, template_id: &str) -> Result<RunSummary, AppError> {
        match self.run_phases(template_id).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                error!("Run aborted while {}: {}", self.state(), e);
                self.transition(RunState::Fatal);
                Err(e)
            }
        }
    }

    async fn run_phases(&self, template_id: &str) -> Result<RunSummary, AppError> {
        self.config.validate()?;

        self.transition(RunState::Collecting);
        let service = self.service.as_ref();
        let collection = collect_pages(self.config.page_size, self.config.concurrency, |index| {
            service.list_projects(self.config.page_size, index)
        })
        .await?;
        info!(
            "Collected {} projects across {} pages",
            collection.projects.len(),
            collection.pages
        );

        let keys: Vec<String> = collection.projects.iter().map(|p| p.key.clone()).collect();
        let mut summary = RunSummary {
            projects: keys.len(),
            pages: collection.pages,
            ..RunSummary::default()
        };

        if self.config.dry_run {
            info!(
                "Dry run: would privatize {} projects and apply template {} in {} batches",
                keys.len(),
                template_id,
                keys.len().div_ceil(self.config.max_batch_size)
            );
            self.transition(RunState::Done);
            return Ok(summary);
        }

        self.transition(RunState::PrivatizingAll);
        let privatized = self
            .executor
            .run(
                &keys,
                1,
                |batch| async move {
                    service
                        .update_visibility(&batch.keys[0], Visibility::Private)
                        .await
                },
                |status, key| {
                    format!(
                        "Failed to make project {} private: HTTP {}",
                        key, status
                    )
                },
            )
            .await?;
        info!(
            "Privatized {} of {} projects",
            privatized.total - privatized.failed,
            privatized.total
        );
        summary.privatized = Some(privatized);

        self.transition(RunState::ApplyingTemplate);
        let applied = self
            .executor
            .run(
                &keys,
                self.config.max_batch_size,
                |batch| async move { service.bulk_apply_template(template_id, &batch.keys).await },
                |status, index| {
                    format!(
                        "Failed to apply template {} to batch {}: HTTP {}",
                        template_id, index, status
                    )
                },
            )
            .await?;
        info!(
            "Applied template {} in {} batches ({} failed)",
            template_id, applied.batches, applied.failed
        );
        summary.template = Some(applied);

        self.transition(RunState::Done);
        Ok(summary)
    }
}
