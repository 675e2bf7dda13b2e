use std::time::Duration;

use taskweave_core::api::RetryStrategy;

/// `base * (attempt + 1)`, optionally capped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearRetry {
    base: Duration,
    max_delay: Option<Duration>,
}

impl LinearRetry {
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            max_delay: None,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }
}

impl RetryStrategy for LinearRetry {
    fn name(&self) -> &str {
        "linear"
    }

    fn next_delay(&self, attempt: u32) -> Duration {
        let delay = self.base.saturating_mul(attempt.saturating_add(1));
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }
}
