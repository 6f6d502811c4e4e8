//! Concurrent execution of a remote operation over consecutive batches.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::config::DEFAULT_PROGRESS_INTERVAL;
use crate::error::AppError;
use crate::models::OperationOutcome;
use crate::progress::{ProgressCounter, ProgressMonitor, ProgressReporter, StderrReporter};
use crate::report::report_failures;

/// A consecutive run of item keys submitted to one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 1-based position of the batch.
    pub index: usize,
    pub keys: Vec<String>,
    /// Name used in failure messages: the key itself for singleton batches,
    /// the batch index otherwise.
    pub identifier: String,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Splits `keys` into consecutive batches of at most `batch_size` keys.
///
/// Every key lands in exactly one batch and original order is kept.
///
/// # Panics
///
/// Panics if `batch_size` is zero.
///
/// # Examples
///
/// ```
/// use lockdown_core::batch::partition;
///
/// let keys: Vec<String> = (1..=7).map(|i| format!("p{}", i)).collect();
/// let sizes: Vec<usize> = partition(&keys, 3).iter().map(|b| b.len()).collect();
/// assert_eq!(sizes, vec![3, 3, 1]);
/// ```
pub fn partition(keys: &[String], batch_size: usize) -> Vec<Batch> {
    keys.chunks(batch_size)
        .enumerate()
        .map(|(i, chunk)| {
            let index = i + 1;
            let identifier = if batch_size == 1 {
                chunk[0].clone()
            } else {
                index.to_string()
            };
            Batch {
                index,
                keys: chunk.to_vec(),
                identifier,
            }
        })
        .collect()
}

/// What happened during one phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseSummary {
    /// Items submitted.
    pub total: usize,
    /// Batches launched.
    pub batches: usize,
    /// Final value of the progress counter.
    pub completed: usize,
    /// Outcomes reported as failures.
    pub failed: usize,
    pub outcomes: Vec<OperationOutcome>,
}

/// Runs a remote operation over batches of keys, all batches in flight at once
/// unless a concurrency ceiling is set.
///
/// A progress monitor runs for the duration of each [`run`](Self::run) and is
/// stopped and joined before failures are reported or errors returned.
#[derive(Clone)]
pub struct BatchedExecutor {
    progress_interval: Duration,
    concurrency: Option<usize>,
    reporter: Arc<dyn ProgressReporter>,
}

impl Default for BatchedExecutor {
    fn default() -> Self {
        Self::new(Arc::new(StderrReporter))
    }
}

impl BatchedExecutor {
    pub fn new(reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            concurrency: None,
            reporter,
        }
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_concurrency(mut self, concurrency: Option<usize>) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Submits every batch of `keys` to `operation` concurrently.
    ///
    /// `operation` returns the HTTP status of its call. A status of 300 or
    /// above is a soft failure: it is collected, and once every batch has
    /// finished each one is reported through `message`. An `Err` from
    /// `operation` is a hard failure: in-flight batches are dropped and the
    /// error is returned.
    pub async fn run<F, Fut, M>(
        &self,
        keys: &[String],
        batch_size: usize,
        operation: F,
        message: M,
    ) -> Result<PhaseSummary, AppError>
    where
        F: Fn(Batch) -> Fut,
        Fut: Future<Output = Result<u16, AppError>>,
        M: Fn(u16, &str) -> String,
    {
        if batch_size == 0 {
            return Err(AppError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }

        let batches = partition(keys, batch_size);
        let batch_count = batches.len();
        let limit = self.concurrency.unwrap_or(batch_count).max(1);
        debug!(
            "Launching {} batches of up to {} items ({} in flight)",
            batch_count, batch_size, limit
        );

        let counter = ProgressCounter::new();
        let monitor = ProgressMonitor::start(
            counter.clone(),
            keys.len(),
            self.progress_interval,
            self.reporter.clone(),
        );

        let result: Result<Vec<OperationOutcome>, AppError> = stream::iter(batches)
            .map(|batch| {
                let counter = counter.clone();
                let len = batch.len();
                let identifier = batch.identifier.clone();
                let call = operation(batch);
                async move {
                    let status = call.await?;
                    counter.add(len);
                    Ok::<_, AppError>(OperationOutcome::new(status, identifier))
                }
            })
            .buffer_unordered(limit)
            .try_collect()
            .await;

        let stopped = monitor.stop().await;
        let outcomes = result?;
        stopped?;

        let failed = report_failures(&outcomes, message);

        Ok(PhaseSummary {
            total: keys.len(),
            batches: batch_count,
            completed: counter.get(),
            failed,
            outcomes,
        })
    }
}
