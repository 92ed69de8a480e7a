//! Bounded worker pool on the tokio runtime.
//!
//! A pool is a semaphore shared by every task submitted to it. It is created
//! once per stage and reused across retrieve calls. Each task runs on its
//! own tokio task so a panic or a timeout only affects that task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::AbortHandle;

/// Why a pooled task produced no value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("{pool} task timed out after {timeout_ms}ms")]
    TimedOut { pool: &'static str, timeout_ms: u64 },

    #[error("{pool} task panicked: {message}")]
    Panicked { pool: &'static str, message: String },

    #[error("{pool} task was cancelled")]
    Cancelled { pool: &'static str },
}

/// A fixed number of permits shared by all tasks submitted to the pool.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    name: &'static str,
    size: usize,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(name: &'static str, size: usize) -> Self {
        let size = size.max(1);
        Self {
            name,
            size,
            permits: Arc::new(Semaphore::new(size)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Permits not currently held by a running task.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `task` once a permit is free. The timeout covers queueing and
    /// execution. The spawned task is aborted when it times out or when the
    /// returned future is dropped.
    pub async fn run<F, T>(&self, timeout: Duration, task: F) -> Result<T, PoolError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let handle = tokio::spawn(async move {
            // The semaphore is never closed, so acquire only fails if it were.
            let _permit = permits.acquire_owned().await.ok()?;
            Some(task.await)
        });
        let _guard = AbortOnDrop(handle.abort_handle());

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(Some(value))) => Ok(value),
            Ok(Ok(None)) => Err(PoolError::Cancelled { pool: self.name }),
            Ok(Err(join_error)) if join_error.is_panic() => Err(PoolError::Panicked {
                pool: self.name,
                message: panic_message(join_error.into_panic()),
            }),
            Ok(Err(_)) => Err(PoolError::Cancelled { pool: self.name }),
            Err(_) => Err(PoolError::TimedOut {
                pool: self.name,
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
