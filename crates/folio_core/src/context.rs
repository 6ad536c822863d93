use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{StoreError, StoreResult};

/// Per-call execution context carried into every backend call.
#[derive(Clone, Debug, Default)]
pub struct ExecContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl ExecContext {
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_done(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|at| Instant::now() >= at)
    }

    pub fn check(&self) -> StoreResult<()> {
        if self.is_done() {
            Err(StoreError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Drives `fut` unless the context is cancelled or its deadline passes first.
    ///
    /// Only for reads. A write that may commit must not be dropped halfway, so
    /// writes call [`ExecContext::check`] once before they start instead.
    pub async fn run<F, T>(&self, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        self.check()?;
        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StoreError::Cancelled),
            _ = deadline => Err(StoreError::Cancelled),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::ExecContext;
    use crate::StoreError;

    #[tokio::test]
    async fn background_context_runs_future() {
        let ctx = ExecContext::background();
        let value = ctx
            .run(async { Ok::<_, StoreError>(7) })
            .await
            .expect("run");
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn cancelled_context_never_polls_future() {
        let ctx = ExecContext::background();
        ctx.cancel();
        let polled = Cell::new(false);
        let result = ctx
            .run(async {
                polled.set(true);
                Ok::<_, StoreError>(())
            })
            .await;
        assert!(matches!(result, Err(StoreError::Cancelled)));
        assert!(!polled.get());
    }

    #[tokio::test]
    async fn deadline_aborts_slow_future() {
        let ctx = ExecContext::background().with_timeout(Duration::from_millis(10));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, StoreError>(())
            })
            .await;
        assert!(matches!(result, Err(StoreError::Cancelled)));
    }
}
