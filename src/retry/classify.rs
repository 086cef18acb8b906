use std::collections::HashSet;

use crate::error::ContactListError;

/// Engine error codes that signal a transient SQL failure: lost connections,
/// timeouts, deadlocks and server-side throttling. Everything else is
/// considered permanent and not worth retrying.
pub const SQL_TRANSIENT_ERROR_CODES: &[i32] = &[
    -2, 20, 64, 233, 10053, 10054, 10060, 10928, 10929, 40143, 40197, 40501, 40613, 41301, 41302,
    41305, 41325, 41839, 49918, 49919, 49920, 1205,
];

/// Decides whether a failed operation is worth retrying.
///
/// Implementations must be pure with respect to the error value: the same
/// error always yields the same verdict.
pub trait TransientClassifier: Send + Sync {
    fn is_transient(&self, err: &ContactListError) -> bool;
}

/// Classifies data-access failures by their engine error code against a
/// configured allow-list.
#[derive(Debug, Clone)]
pub struct CodeListClassifier {
    codes: HashSet<i32>,
}

impl CodeListClassifier {
    pub fn new(codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    pub fn contains(&self, code: i32) -> bool {
        self.codes.contains(&code)
    }
}

impl Default for CodeListClassifier {
    fn default() -> Self {
        Self::new(SQL_TRANSIENT_ERROR_CODES.iter().copied())
    }
}

impl TransientClassifier for CodeListClassifier {
    fn is_transient(&self, err: &ContactListError) -> bool {
        match err.data_error_code() {
            Some(code) => self.codes.contains(&code),
            None => false,
        }
    }
}

/// Classifies upstream HTTP failures for the gateway: request timeout,
/// throttling and server errors are retryable.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransientClassifier;

impl HttpTransientClassifier {
    pub fn retryable_status(status: u16) -> bool {
        matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
    }
}

impl TransientClassifier for HttpTransientClassifier {
    fn is_transient(&self, err: &ContactListError) -> bool {
        match err {
            ContactListError::Upstream { status } => Self::retryable_status(*status),
            _ => false,
        }
    }
}
