//! Cancellation scopes for workflow teardown.
//!
//! Every workflow instance owns a scope; tearing the workflow down
//! cancels the scope, which releases every call still in flight under
//! it. A cancelled call resolves to [`ApiError::Cancelled`] and is
//! silent by contract, so no orphaned future ever mutates state or
//! surfaces an error after the owning screen is gone.

use std::future::Future;

use ft_core::ApiError;
use tokio_util::sync::CancellationToken;

/// Hierarchical cancellation scope.
///
/// Child scopes die with their parent but can also be cancelled on
/// their own, which maps one-to-one onto engine -> workflow -> call
/// lifetimes.
#[derive(Debug, Clone, Default)]
pub struct CancelScope {
    token: CancellationToken,
}

impl CancelScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope that is cancelled when `self` is, but can be cancelled
    /// independently.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run `fut` under this scope. Cancellation drops the future, which
    /// aborts any in-flight request, and resolves to
    /// [`ApiError::Cancelled`]. An already-cancelled scope never polls
    /// `fut` at all.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ApiError::Cancelled),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_passes_through_when_not_cancelled() {
        let scope = CancelScope::new();
        let result = scope.run(async { Ok::<_, ApiError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_cancelled_scope_never_polls_the_future() {
        let scope = CancelScope::new();
        scope.cancel();
        let result = scope
            .run::<(), _>(async { panic!("future must not be polled under a cancelled scope") })
            .await;
        assert_eq!(result, Err(ApiError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_releases_in_flight_call() {
        let scope = CancelScope::new();
        let inner = scope.clone();
        let handle = tokio::spawn(async move {
            inner
                .run(async {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok::<_, ApiError>(())
                })
                .await
        });
        tokio::task::yield_now().await;
        scope.cancel();
        let result = handle.await.unwrap();
        assert_eq!(result, Err(ApiError::Cancelled));
    }

    #[tokio::test]
    async fn test_child_dies_with_parent_but_not_vice_versa() {
        let parent = CancelScope::new();
        let child = parent.child();

        let sibling = parent.child();
        sibling.cancel();
        assert!(sibling.is_cancelled());
        assert!(!parent.is_cancelled());
        assert!(!child.is_cancelled());

        parent.cancel();
        assert!(child.is_cancelled());
    }
}
