// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use super::Strategy;
use crate::OutcomeArgs;
use crate::constants::DEFAULT_DELAY_ON_SUCCESS;

/// Waits the same amount of time after every failure.
///
/// **Example with a `2s` failure delay:** `2s, 2s, 2s, 2s, ...`
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use backoff_policy::Constant;
///
/// let strategy = Constant::new(Duration::from_secs(2)).delay_on_success(Duration::from_millis(100));
/// assert_eq!(strategy.failure_delay(), Duration::from_secs(2));
/// assert_eq!(strategy.success_delay(), Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constant {
    delay_on_failure: Duration,
    delay_on_success: Duration,
}

impl Constant {
    /// Creates a strategy that waits `delay_on_failure` after each failure and nothing after a success.
    #[must_use]
    pub fn new(delay_on_failure: Duration) -> Self {
        Self {
            delay_on_failure,
            delay_on_success: DEFAULT_DELAY_ON_SUCCESS,
        }
    }

    /// Sets the delay applied after a success.
    #[must_use]
    pub fn delay_on_success(self, delay: Duration) -> Self {
        Self {
            delay_on_success: delay,
            ..self
        }
    }

    /// Returns the delay applied after each failure.
    #[must_use]
    pub fn failure_delay(&self) -> Duration {
        self.delay_on_failure
    }

    /// Returns the delay applied after each success.
    #[must_use]
    pub fn success_delay(&self) -> Duration {
        self.delay_on_success
    }
}

impl Strategy for Constant {
    fn on_success(&mut self, _args: &OutcomeArgs) -> Duration {
        self.delay_on_success
    }

    fn on_failure(&mut self, _args: &OutcomeArgs) -> Duration {
        self.delay_on_failure
    }
}
