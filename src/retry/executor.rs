use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::retry::cancel::CancelToken;
use crate::retry::classify::{CodeListClassifier, TransientClassifier};
use crate::retry::policy::RetryPolicy;

/// Runs operations and retries them while failures classify as transient.
///
/// The executor owns no knowledge of any storage engine; the classifier it
/// was built with decides transience from the error value alone. Errors are
/// returned to the caller exactly as the operation produced them, whether
/// retries were exhausted or the failure was permanent from the start.
#[derive(Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    classifier: Arc<dyn TransientClassifier>,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy, classifier: Arc<dyn TransientClassifier>) -> Self {
        Self { policy, classifier }
    }

    /// Executor over the configured code list, for data-access call sites.
    pub fn from_config(cfg: &crate::config::RetryConfig) -> Self {
        Self::new(
            RetryPolicy::from_config(cfg),
            Arc::new(CodeListClassifier::new(
                cfg.transient_error_codes.iter().copied(),
            )),
        )
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run a synchronous operation with retries.
    ///
    /// Blocks the current thread between attempts; inside the runtime use
    /// [`execute_async`](Self::execute_async) instead.
    pub fn execute<T, F>(&self, mut operation: F, operation_name: &str) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt: u32 = 0;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !self.classifier.is_transient(&err) || attempt >= self.policy.max_retries {
                        return Err(err);
                    }
                    attempt += 1;
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        "Transient failure in {} (retry {}/{}), waiting {}ms: {}",
                        operation_name,
                        attempt,
                        self.policy.max_retries,
                        delay.as_millis(),
                        err
                    );
                    std::thread::sleep(delay);
                }
            }
        }
    }

    /// Run an async operation with retries, sleeping without blocking the
    /// runtime between attempts.
    pub async fn execute_async<T, F, Fut>(&self, mut operation: F, operation_name: &str) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !self.classifier.is_transient(&err) || attempt >= self.policy.max_retries {
                        return Err(err);
                    }
                    attempt += 1;
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        "Transient failure in {} (retry {}/{}), waiting {}ms: {}",
                        operation_name,
                        attempt,
                        self.policy.max_retries,
                        delay.as_millis(),
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Like [`execute_async`](Self::execute_async), but abandons both the
    /// in-flight operation and any pending backoff wait once `cancel` fires,
    /// returning [`ContactListError::Cancelled`].
    ///
    /// [`ContactListError::Cancelled`]: crate::error::ContactListError::Cancelled
    pub async fn execute_async_cancellable<T, F, Fut>(
        &self,
        mut operation: F,
        operation_name: &str,
        cancel: &CancelToken,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(crate::error::ContactListError::Cancelled);
            }

            let outcome = tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(crate::error::ContactListError::Cancelled);
                }
                outcome = operation() => outcome,
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !self.classifier.is_transient(&err) || attempt >= self.policy.max_retries {
                        return Err(err);
                    }
                    attempt += 1;
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        "Transient failure in {} (retry {}/{}), waiting {}ms: {}",
                        operation_name,
                        attempt,
                        self.policy.max_retries,
                        delay.as_millis(),
                        err
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            return Err(crate::error::ContactListError::Cancelled);
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}
