// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::time::Duration;

use tick::Clock;

use super::RetryPolicy;
use super::telemetry::PolicyTelemetry;
use crate::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLICY_NAME, MAX_JITTER_FACTOR};
use crate::rnd::Rnd;
use crate::state::PolicyState;
use crate::{ConfigError, Strategy};

/// Configures and validates a [`RetryPolicy`].
///
/// Created by [`RetryPolicy::builder`]. Nothing is validated until
/// [`build`][Self::build], which either returns a fully configured policy or
/// the first [`ConfigError`] it encounters.
#[derive(Debug)]
#[must_use]
pub struct PolicyBuilder<S> {
    clock: Clock,
    strategy: S,
    max_attempts: u32,
    jitter_factor: Option<f64>,
    max_delay: Option<Duration>,
    name: Cow<'static, str>,
    telemetry: PolicyTelemetry,
}

impl<S: Strategy> PolicyBuilder<S> {
    pub(super) fn new(clock: &Clock, strategy: S) -> Self {
        Self {
            clock: clock.clone(),
            strategy,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            jitter_factor: None,
            max_delay: None,
            name: Cow::Borrowed(DEFAULT_POLICY_NAME),
            telemetry: PolicyTelemetry::default(),
        }
    }

    /// Gives up once this many consecutive failures have been reported.
    ///
    /// With `max_attempts = 3`, the first two failures produce a delay and the
    /// third one produces [`Decision::GiveUp`][crate::Decision::GiveUp]. Zero
    /// means the policy never gives up.
    ///
    /// **Default**: 0 (unlimited)
    pub fn max_attempts(self, max_attempts: u32) -> Self {
        Self { max_attempts, ..self }
    }

    /// Never gives up. Same as `max_attempts(0)`.
    pub fn infinite_attempts(self) -> Self {
        self.max_attempts(0)
    }

    /// Randomizes every nonzero delay within `[delay * (1 - factor), delay * (1 + factor)]`.
    ///
    /// Must be within `[0.0, 0.5]`; zero disables jitter.
    ///
    /// **Default**: no jitter
    pub fn jitter_factor(self, factor: f64) -> Self {
        Self {
            jitter_factor: Some(factor),
            ..self
        }
    }

    /// Caps every returned delay.
    ///
    /// **Default**: no cap
    pub fn max_delay(self, max_delay: Duration) -> Self {
        Self {
            max_delay: Some(max_delay),
            ..self
        }
    }

    /// Names the policy in log records. Prefer `snake_case`.
    ///
    /// **Default**: `"default"`
    pub fn name(self, name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into(), ..self }
    }

    /// Emits a log record for every scheduled delay and for giving up.
    #[cfg(any(feature = "logs", test))]
    pub fn use_logs(self) -> Self {
        Self {
            telemetry: PolicyTelemetry { logs_enabled: true },
            ..self
        }
    }

    /// Validates the configuration and creates the policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the jitter factor is not a finite number
    /// within `[0.0, 0.5]` or when [`Strategy::validate`] rejects the strategy.
    pub fn build(self) -> Result<RetryPolicy<S>, ConfigError> {
        if let Some(factor) = self.jitter_factor {
            validate_jitter_factor(factor)?;
        }

        self.strategy.validate()?;

        Ok(RetryPolicy {
            clock: self.clock,
            strategy: self.strategy,
            state: PolicyState::default(),
            max_attempts: self.max_attempts,
            jitter_factor: self.jitter_factor.filter(|factor| *factor > 0.0),
            max_delay: self.max_delay,
            name: self.name,
            rnd: Rnd::default(),
            telemetry: self.telemetry,
        })
    }
}

fn validate_jitter_factor(factor: f64) -> Result<(), ConfigError> {
    if factor.is_finite() && (0.0..=MAX_JITTER_FACTOR).contains(&factor) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            "jitterFactor",
            format!("must be a finite number within [0.0, {MAX_JITTER_FACTOR}], got {factor}"),
        ))
    }
}
