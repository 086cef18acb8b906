//! Retry support for operations that can fail transiently.
//!
//! The executor reruns an operation while a pluggable classifier judges its
//! failures transient, waiting between attempts according to the configured
//! policy. Classification is driven by error values, so the executor knows
//! nothing about any particular storage engine or protocol.

pub mod cancel;
pub mod classify;
pub mod executor;
pub mod policy;

pub use cancel::{CancelHandle, CancelToken, cancel_pair};
pub use classify::{CodeListClassifier, HttpTransientClassifier, TransientClassifier};
pub use executor::RetryExecutor;
pub use policy::{Backoff, RetryPolicy};
