// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use super::Strategy;
use crate::utils::secs_to_duration_saturating;
use crate::{ConfigError, OutcomeArgs};

/// How an [`Adaptive`] strategy moves its previous delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Adds the given number of seconds. Negative values shrink the delay.
    Add(f64),

    /// Multiplies by the given factor. Must be greater than zero.
    Mul(f64),
}

impl Step {
    fn apply(self, delay: Duration) -> Duration {
        match self {
            Self::Add(secs) => secs_to_duration_saturating(delay.as_secs_f64() + secs),
            Self::Mul(factor) => secs_to_duration_saturating(delay.as_secs_f64() * factor),
        }
    }

    fn validate(self, option: &'static str) -> Result<(), ConfigError> {
        match self {
            Self::Add(secs) if !secs.is_finite() => Err(ConfigError::invalid(
                option,
                format!("additive step must be a finite number of seconds, got {secs}"),
            )),
            Self::Mul(factor) if !factor.is_finite() || factor <= 0.0 => Err(ConfigError::invalid(
                option,
                format!("multiplicative step must be a finite factor greater than zero, got {factor}"),
            )),
            _ => Ok(()),
        }
    }
}

/// Grows the delay on failures and shrinks it on successes, starting from the previous delay.
///
/// Unlike the other built-in strategies, this one ignores the failure count
/// and remembers the delay it computed last:
///
/// - The first failure, before any delay was computed, yields `initial_delay`.
/// - Any other failure applies the failure [`Step`] to the previous delay.
/// - A success applies the success [`Step`] to the previous delay, never
///   going below `min_delay`. A success before any delay was computed starts
///   from zero.
///
/// Mixing additive and multiplicative steps gives the classic increase/decrease
/// family, for example additive increase with multiplicative decrease.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use backoff_policy::{Adaptive, Step};
///
/// // +2s per failure, halve on success, never below 500ms after a success.
/// let strategy = Adaptive::new(Duration::from_secs(1), Step::Add(2.0), Step::Mul(0.5))
///     .min_delay(Duration::from_millis(500));
/// # let _ = strategy;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Adaptive {
    initial_delay: Duration,
    on_failure: Step,
    on_success: Step,
    min_delay: Duration,
    previous_delay: Option<Duration>,
}

impl Adaptive {
    /// Creates an adaptive strategy.
    #[must_use]
    pub fn new(initial_delay: Duration, on_failure: Step, on_success: Step) -> Self {
        Self {
            initial_delay,
            on_failure,
            on_success,
            min_delay: Duration::ZERO,
            previous_delay: None,
        }
    }

    /// Sets the floor applied after a success.
    #[must_use]
    pub fn min_delay(self, min_delay: Duration) -> Self {
        Self { min_delay, ..self }
    }

    /// Returns the delay computed by the last hook, or `None` before the first one.
    #[must_use]
    pub fn previous_delay(&self) -> Option<Duration> {
        self.previous_delay
    }
}

impl Strategy for Adaptive {
    fn on_success(&mut self, _args: &OutcomeArgs) -> Duration {
        let delay = self
            .on_success
            .apply(self.previous_delay.unwrap_or_default())
            .max(self.min_delay);
        *self.previous_delay.insert(delay)
    }

    fn on_failure(&mut self, _args: &OutcomeArgs) -> Duration {
        let delay = self
            .previous_delay
            .map_or(self.initial_delay, |previous| self.on_failure.apply(previous));
        *self.previous_delay.insert(delay)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.on_failure.validate("failureStep")?;
        self.on_success.validate("successStep")
    }

    fn reset(&mut self) {
        self.previous_delay = None;
    }
}
