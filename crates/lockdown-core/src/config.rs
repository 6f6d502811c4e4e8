//! Configuration types for Lockdown components.
//!
//! The limits here mirror what the remote service accepts: larger pages or
//! batches are rejected server-side, so they are refused before any call is made.

use std::time::Duration;

use crate::error::AppError;

/// Largest page the listing endpoint will serve.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Largest number of project keys accepted by a single bulk template call.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Default read timeout for every HTTP call, in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 120_000;

/// How often the progress monitor samples the counter.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

/// HTTP client configuration for the remote service.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Longest wait for the next chunk of a response. A response that keeps
    /// arriving is never cut off, however long it takes in total.
    pub read_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
        }
    }
}

impl HttpConfig {
    pub fn with_read_timeout_ms(ms: u64) -> Self {
        Self {
            read_timeout: Duration::from_millis(ms),
        }
    }
}

/// Options for a full collect / privatize / apply-template run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Projects requested per listing page.
    pub page_size: u32,
    /// Project keys per bulk template call.
    pub max_batch_size: usize,
    /// Sampling interval of the progress monitor.
    pub progress_interval: Duration,
    /// Ceiling on in-flight calls per phase. `None` launches everything at once.
    pub concurrency: Option<usize>,
    /// Collect and plan only; skip both mutation phases.
    pub dry_run: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_batch_size: MAX_BATCH_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            concurrency: None,
            dry_run: false,
        }
    }
}

impl RunConfig {
    /// Checks every option against the service ceilings.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(AppError::InvalidConfig(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        if self.max_batch_size == 0 || self.max_batch_size > MAX_BATCH_SIZE {
            return Err(AppError::InvalidConfig(format!(
                "max batch size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.max_batch_size
            )));
        }
        if self.concurrency == Some(0) {
            return Err(AppError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.progress_interval.is_zero() {
            return Err(AppError::InvalidConfig(
                "progress interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
