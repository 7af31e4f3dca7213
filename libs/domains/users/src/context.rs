//! Per-call context carrying cancellation and an optional deadline.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{UserError, UserResult};

/// Call context passed down through every layer.
///
/// Cancellation is advisory: operations check it on entry and while they
/// wait (for a lock or the network), never in the middle of a mutation.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that never expires on its own.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn check(&self) -> UserResult<()> {
        if self.is_canceled() {
            Err(UserError::Canceled)
        } else {
            Ok(())
        }
    }

    /// Drive `fut` until it completes, the context is cancelled, or the
    /// deadline passes. `fut` is dropped on cancellation, so it must be
    /// cancel-safe.
    pub async fn run<F>(&self, fut: F) -> UserResult<F::Output>
    where
        F: Future,
    {
        self.check()?;

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(UserError::Canceled),
            _ = expired => Err(UserError::Canceled),
            output = fut => Ok(output),
        }
    }
}
