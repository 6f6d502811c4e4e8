//! Shared progress counter and the background monitor that prints it.
//!
//! The monitor only observes: cancelling it late or never starting it changes
//! what gets printed, never what gets done.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::AppError;

/// Count of items completed in the current phase.
///
/// Clones share the same underlying value.
#[derive(Debug, Clone, Default)]
pub struct ProgressCounter(Arc<AtomicUsize>);

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `n` completed items and returns the new total.
    pub fn add(&self, n: usize) -> usize {
        self.0.fetch_add(n, Ordering::AcqRel) + n
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

/// Sink for the monitor's output.
pub trait ProgressReporter: Send + Sync + 'static {
    /// The counter moved since the previous sample.
    fn progress(&self, current: usize, target: usize);

    /// The counter did not move since the previous sample.
    fn still_working(&self);

    /// The monitor stopped; terminate the current line.
    fn finish(&self);
}

/// Writes progress to stderr: `current/target` on a fresh line, `.` otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrReporter;

impl ProgressReporter for StderrReporter {
    fn progress(&self, current: usize, target: usize) {
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\n{}/{} ", current, target);
        let _ = err.flush();
    }

    fn still_working(&self) {
        let mut err = std::io::stderr().lock();
        let _ = write!(err, ".");
        let _ = err.flush();
    }

    fn finish(&self) {
        let _ = writeln!(std::io::stderr());
    }
}

/// Handle to a running progress monitor.
///
/// Call [`stop`](ProgressMonitor::stop) and await it before printing anything
/// else, otherwise output from the two sides can interleave. Dropping the
/// handle cancels the monitor without waiting for it.
pub struct ProgressMonitor {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ProgressMonitor {
    /// Spawns a monitor sampling `counter` every `interval` until stopped.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use lockdown_core::progress::{ProgressCounter, ProgressMonitor, StderrReporter};
    ///
    /// # async fn example() -> Result<(), lockdown_core::AppError> {
    /// let counter = ProgressCounter::new();
    /// let monitor = ProgressMonitor::start(
    ///     counter.clone(),
    ///     10,
    ///     Duration::from_secs(2),
    ///     Arc::new(StderrReporter),
    /// );
    /// counter.add(10);
    /// monitor.stop().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn start(
        counter: ProgressCounter,
        target: usize,
        interval: Duration,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut last_seen: Option<usize> = None;

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
                if token.is_cancelled() {
                    break;
                }

                let current = counter.get();
                if last_seen == Some(current) {
                    reporter.still_working();
                } else {
                    reporter.progress(current, target);
                    last_seen = Some(current);
                }
            }

            reporter.finish();
            debug!("Progress monitor stopped at {}/{}", counter.get(), target);
        });

        Self { cancel, handle }
    }

    /// Cancels the monitor and waits until it has written its last output.
    pub async fn stop(mut self) -> Result<(), AppError> {
        self.cancel.cancel();
        (&mut self.handle)
            .await
            .map_err(|e| AppError::TaskFailed(format!("progress monitor: {}", e)))
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
