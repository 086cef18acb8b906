use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::RetryConfig;

/// How the wait between attempts evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backoff {
    /// Every wait is the base delay.
    Constant,
    /// Waits double on each retry: base, 2x base, 4x base, ...
    Exponential,
}

/// Retry policy: how many retries and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt. Zero disables retrying entirely.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            backoff: Backoff::Constant,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            backoff: Backoff::Constant,
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            base_delay: cfg.base_delay(),
            backoff: if cfg.exponential {
                Backoff::Exponential
            } else {
                Backoff::Constant
            },
        }
    }

    /// Wait before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Constant => self.base_delay,
            Backoff::Exponential => {
                // Cap the shift so pathological attempt counts cannot overflow
                let exponent = attempt.saturating_sub(1).min(20);
                self.base_delay.saturating_mul(1u32 << exponent)
            }
        }
    }
}
