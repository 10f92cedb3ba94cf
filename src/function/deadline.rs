//! # Invocation Deadline
//!
//! Cooperative cancellation for one invocation. The orchestrator checks the
//! deadline at every stage boundary and every cloud or secret call races it.

use crate::error::{FunctionError, Stage};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Point in time after which the invocation is abandoned
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Deadline `timeout` from now
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
        }
    }

    /// Fail with a timeout if the deadline has already passed
    pub fn check(&self, stage: Stage) -> Result<(), FunctionError> {
        if Instant::now() >= self.at {
            return Err(FunctionError::DeadlineExceeded { stage });
        }
        Ok(())
    }

    /// Await `call`, giving up once the deadline expires
    ///
    /// The outer result carries the timeout, the inner one the call's own outcome,
    /// so callers can still treat per-candidate failures as recoverable.
    pub async fn call<T, E, F>(&self, stage: Stage, call: F) -> Result<Result<T, E>, FunctionError>
    where
        F: Future<Output = Result<T, E>>,
    {
        tokio::time::timeout_at(self.at, call)
            .await
            .map_err(|_elapsed| FunctionError::DeadlineExceeded { stage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_call_completes_before_deadline() {
        let deadline = Deadline::after(Duration::from_secs(5));
        let result = deadline
            .call(Stage::DiscoverHostedZone, async { Ok::<_, ()>(7) })
            .await
            .unwrap();
        assert_eq!(result, Ok(7));
        assert!(deadline.check(Stage::PatchResults).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_times_out() {
        let deadline = Deadline::after(Duration::from_millis(10));
        let err = deadline
            .call(Stage::ImportDistribution, async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, ()>(())
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.stage(), Some(Stage::ImportDistribution));
        assert!(deadline.check(Stage::PatchResults).is_err());
    }
}
