//! Timeout and cancellation utilities for long-running blocking work.
//!
//! Pattern scanning is bounded by the sample window and needs neither. The
//! delegated unpacker subprocess and artifact writes are the operations that
//! honour a [`TimeoutConfig`] and a [`CancelToken`].

use crate::error::{FwError, Result};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, warn};

/// Default timeout duration in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300; // 5 minutes

/// How often a pending operation re-checks its cancel token.
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Timeout configuration for analysis operations
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Maximum duration for the operation
    pub duration: Duration,
    /// Whether to log timeout warnings
    pub log_warnings: bool,
    /// Operation name for logging
    pub operation_name: String,
}

impl TimeoutConfig {
    /// Create a new timeout configuration
    pub fn new(seconds: u64, operation: impl Into<String>) -> Self {
        Self {
            duration: Duration::from_secs(seconds),
            log_warnings: true,
            operation_name: operation.into(),
        }
    }
}

/// Shared cancellation flag.
///
/// Clones observe the same flag. Cancelling is sticky.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            tokio::time::sleep(CANCEL_POLL_INTERVAL).await;
        }
    }
}

/// Execute an async operation with a timeout
pub async fn with_timeout<T, F>(config: TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    debug!(
        "Starting operation '{}' with timeout of {}s",
        config.operation_name,
        config.duration.as_secs()
    );

    match timeout(config.duration, future).await {
        Ok(result) => {
            debug!(
                "Operation '{}' completed successfully",
                config.operation_name
            );
            result
        }
        Err(_) => {
            if config.log_warnings {
                error!(
                    "Operation '{}' timed out after {}s",
                    config.operation_name,
                    config.duration.as_secs()
                );
            }

            Err(FwError::Timeout {
                seconds: config.duration.as_secs(),
            })
        }
    }
}

/// Execute an async operation bounded by both a timeout and a cancel token.
///
/// The future is dropped as soon as either fires, so callers that own a
/// resource borrowed by the future (a child process) can clean it up after
/// this returns.
pub async fn with_timeout_cancellable<T, F>(
    config: TimeoutConfig,
    cancel: &CancelToken,
    future: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        result = with_timeout(config.clone(), future) => result,
        _ = cancel.cancelled() => {
            if config.log_warnings {
                warn!("Operation '{}' cancelled", config.operation_name);
            }
            Err(FwError::Cancelled)
        }
    }
}
