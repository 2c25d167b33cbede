// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use super::Strategy;
use crate::constants::{DEFAULT_DELAY_ON_SUCCESS, DEFAULT_EXPONENT_BASE};
use crate::utils::secs_to_duration_saturating;
use crate::{ConfigError, OutcomeArgs};

/// Multiplies the delay by a constant base after each consecutive failure.
///
/// The n-th consecutive failure waits `initial_delay * exponent_base^(n - 1)`.
/// Overflow saturates to [`Duration::MAX`]; pair this strategy with a maximum
/// delay on the policy.
///
/// **Example with a `1s` initial delay and base `2`:** `1s, 2s, 4s, 8s, 16s, ...`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exponential {
    initial_delay: Duration,
    exponent_base: f64,
    delay_on_success: Duration,
}

impl Exponential {
    /// Creates a strategy that starts at `initial_delay` and doubles on every consecutive failure.
    #[must_use]
    pub fn new(initial_delay: Duration) -> Self {
        Self {
            initial_delay,
            exponent_base: DEFAULT_EXPONENT_BASE,
            delay_on_success: DEFAULT_DELAY_ON_SUCCESS,
        }
    }

    /// Sets the growth factor. Must be at least `1.0`.
    #[must_use]
    pub fn exponent_base(self, base: f64) -> Self {
        Self {
            exponent_base: base,
            ..self
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

    fn delay_for(&self, consecutive_failures: u32) -> Duration {
        let exponent = i32::try_from(consecutive_failures.saturating_sub(1)).unwrap_or(i32::MAX);
        secs_to_duration_saturating(self.initial_delay.as_secs_f64() * self.exponent_base.powi(exponent))
    }
}

impl Strategy for Exponential {
    fn on_success(&mut self, _args: &OutcomeArgs) -> Duration {
        self.delay_on_success
    }

    fn on_failure(&mut self, args: &OutcomeArgs) -> Duration {
        self.delay_for(args.consecutive_failures())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.exponent_base.is_finite() && self.exponent_base >= 1.0 {
            Ok(())
        } else {
            Err(ConfigError::invalid(
                "exponentBase",
                format!("must be a finite number of at least 1.0, got {}", self.exponent_base),
            ))
        }
    }
}
