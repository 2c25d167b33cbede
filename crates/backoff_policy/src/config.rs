// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Building policies from configuration maps.
//!
//! [`PolicyConfig`] is a plain `serde` structure, so any data format with a
//! `serde` deserializer (JSON, TOML, YAML, environment maps, ...) can describe
//! a policy. Keys are camelCase and durations are expressed in (fractional)
//! seconds.
//!
//! | Key | Strategies | Default |
//! |-----|------------|---------|
//! | `strategy` | all: `constant`, `exponential`, `fibonacci`, `additive`, `multiplicative` | `constant` |
//! | `maxAttempts` | all | `0` (unlimited) |
//! | `jitterFactor` | all | none |
//! | `maxDelay` | all | none |
//! | `delayOnFailure` | all | **required** |
//! | `name` | all | `"default"` |
//! | `delayOnSuccess` | constant, exponential, fibonacci | `0` |
//! | `exponentBase` | exponential | `2` |
//! | `secondDelay` | fibonacci | `delayOnFailure` |
//! | `failureStep` | additive, multiplicative | **required** |
//! | `successStep` | additive, multiplicative | **required** |
//! | `minDelay` | additive, multiplicative | `0` |
//!
//! Unrecognized keys are rejected, and so are keys that belong to a strategy
//! other than the selected one.
//!
//! # Examples
//!
//! ```
//! use backoff_policy::{PolicyConfig, RetryPolicy};
//! use tick::Clock;
//!
//! # fn example(clock: &Clock) -> Result<(), Box<dyn std::error::Error>> {
//! let json = r#"{ "strategy": "exponential", "delayOnFailure": 0.5, "maxDelay": 30, "maxAttempts": 6 }"#;
//! # let json: serde_json::Value = serde_json::from_str(json)?;
//! let config = PolicyConfig::from_deserializer(json)?;
//! let mut policy = RetryPolicy::from_config(clock, config)?;
//! # let _ = policy.failure()?;
//! # Ok(())
//! # }
//! ```

use std::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use tick::Clock;

use crate::constants::{DEFAULT_DELAY_ON_SUCCESS, DEFAULT_EXPONENT_BASE};
use crate::{Adaptive, BuiltinStrategy, ConfigError, Constant, Exponential, Fibonacci, PolicyBuilder, RetryPolicy, Step};

/// Names one of the built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum StrategyKind {
    /// [`Constant`] delays.
    #[default]
    Constant,

    /// [`Exponential`] growth.
    Exponential,

    /// [`Fibonacci`] growth.
    Fibonacci,

    /// [`Adaptive`] with additive steps.
    Additive,

    /// [`Adaptive`] with multiplicative steps.
    Multiplicative,
}

impl StrategyKind {
    /// Returns the name used in configuration maps.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Exponential => "exponential",
            Self::Fibonacci => "fibonacci",
            Self::Additive => "additive",
            Self::Multiplicative => "multiplicative",
        }
    }

    fn accepts(self, key: &str) -> bool {
        match self {
            Self::Constant => key == "delayOnSuccess",
            Self::Exponential => matches!(key, "delayOnSuccess" | "exponentBase"),
            Self::Fibonacci => matches!(key, "delayOnSuccess" | "secondDelay"),
            Self::Additive | Self::Multiplicative => matches!(key, "failureStep" | "successStep" | "minDelay"),
        }
    }
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A retry policy described as a configuration map.
///
/// See the [module documentation][self] for the recognized keys. Values are
/// only checked by [`RetryPolicy::from_config`] and
/// [`into_builder`][Self::into_builder]; deserialization alone accepts any
/// well-formed map.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[non_exhaustive]
pub struct PolicyConfig {
    /// Which built-in strategy computes raw delays.
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Consecutive failures after which the policy gives up; zero is unlimited.
    #[serde(default)]
    pub max_attempts: u32,

    /// Jitter factor within `[0.0, 0.5]`.
    pub jitter_factor: Option<f64>,

    /// Cap on every delay, in seconds.
    pub max_delay: Option<f64>,

    /// Failure delay, or the first failure delay for growing strategies, in seconds.
    pub delay_on_failure: Option<f64>,

    /// Success delay in seconds.
    pub delay_on_success: Option<f64>,

    /// Growth factor of the exponential strategy.
    pub exponent_base: Option<f64>,

    /// Second seed of the Fibonacci strategy, in seconds.
    pub second_delay: Option<f64>,

    /// Seconds added, or factor applied, after a failure.
    pub failure_step: Option<f64>,

    /// Seconds added, or factor applied, after a success.
    pub success_step: Option<f64>,

    /// Floor applied after a success by the adaptive strategies, in seconds.
    pub min_delay: Option<f64>,

    /// Name used in log records.
    pub name: Option<String>,
}

impl PolicyConfig {
    /// Reads a configuration from any `serde` deserializer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] carrying the deserializer's error when the
    /// input is not a map of recognized keys with values of the right type.
    pub fn from_deserializer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, ConfigError> {
        Self::deserialize(deserializer).map_err(|error| ConfigError::malformed(error.to_string()))
    }

    /// Validates the configuration and turns it into a builder.
    ///
    /// Useful to adjust what a configuration map cannot express, such as
    /// enabling logs, before building the policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a missing required key, a key the selected
    /// strategy does not recognize, or an out-of-range value.
    pub fn into_builder(self, clock: impl AsRef<Clock>) -> Result<PolicyBuilder<BuiltinStrategy>, ConfigError> {
        self.reject_foreign_keys()?;

        let strategy = self.build_strategy()?;
        let mut builder = RetryPolicy::builder(clock, strategy).max_attempts(self.max_attempts);

        if let Some(factor) = self.jitter_factor {
            builder = builder.jitter_factor(factor);
        }

        if let Some(max_delay) = self.max_delay {
            builder = builder.max_delay(secs_to_duration("maxDelay", max_delay)?);
        }

        if let Some(name) = self.name {
            builder = builder.name(name);
        }

        Ok(builder)
    }

    fn strategy_keys(&self) -> [(&'static str, bool); 6] {
        [
            ("delayOnSuccess", self.delay_on_success.is_some()),
            ("exponentBase", self.exponent_base.is_some()),
            ("secondDelay", self.second_delay.is_some()),
            ("failureStep", self.failure_step.is_some()),
            ("successStep", self.success_step.is_some()),
            ("minDelay", self.min_delay.is_some()),
        ]
    }

    fn reject_foreign_keys(&self) -> Result<(), ConfigError> {
        match self
            .strategy_keys()
            .into_iter()
            .find(|(key, present)| *present && !self.strategy.accepts(key))
        {
            Some((key, _)) => Err(ConfigError::unknown(key)),
            None => Ok(()),
        }
    }

    fn build_strategy(&self) -> Result<BuiltinStrategy, ConfigError> {
        let delay_on_failure = required_secs("delayOnFailure", self.delay_on_failure)?;
        let delay_on_success = optional_secs("delayOnSuccess", self.delay_on_success)?.unwrap_or(DEFAULT_DELAY_ON_SUCCESS);

        let strategy = match self.strategy {
            StrategyKind::Constant => Constant::new(delay_on_failure).delay_on_success(delay_on_success).into(),
            StrategyKind::Exponential => Exponential::new(delay_on_failure)
                .exponent_base(self.exponent_base.unwrap_or(DEFAULT_EXPONENT_BASE))
                .delay_on_success(delay_on_success)
                .into(),
            StrategyKind::Fibonacci => {
                let second_delay = optional_secs("secondDelay", self.second_delay)?.unwrap_or(delay_on_failure);
                Fibonacci::with_seeds(delay_on_failure, second_delay)
                    .delay_on_success(delay_on_success)
                    .into()
            }
            StrategyKind::Additive => self.adaptive(delay_on_failure, Step::Add)?.into(),
            StrategyKind::Multiplicative => self.adaptive(delay_on_failure, Step::Mul)?.into(),
        };

        Ok(strategy)
    }

    fn adaptive(&self, initial_delay: Duration, step: fn(f64) -> Step) -> Result<Adaptive, ConfigError> {
        let on_failure = step(required("failureStep", self.failure_step)?);
        let on_success = step(required("successStep", self.success_step)?);
        let min_delay = optional_secs("minDelay", self.min_delay)?.unwrap_or(Duration::ZERO);

        Ok(Adaptive::new(initial_delay, on_failure, on_success).min_delay(min_delay))
    }
}

impl RetryPolicy<BuiltinStrategy> {
    /// Creates a policy from a configuration map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a missing required key, a key the selected
    /// strategy does not recognize, or an out-of-range value.
    pub fn from_config(clock: impl AsRef<Clock>, config: PolicyConfig) -> Result<Self, ConfigError> {
        config.into_builder(clock)?.build()
    }
}

fn required(option: &'static str, value: Option<f64>) -> Result<f64, ConfigError> {
    value.ok_or_else(|| ConfigError::missing(option))
}

fn required_secs(option: &'static str, secs: Option<f64>) -> Result<Duration, ConfigError> {
    secs_to_duration(option, required(option, secs)?)
}

fn optional_secs(option: &'static str, secs: Option<f64>) -> Result<Option<Duration>, ConfigError> {
    secs.map(|secs| secs_to_duration(option, secs)).transpose()
}

fn secs_to_duration(option: &'static str, secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|error| {
        ConfigError::invalid(
            option,
            format!("must be a finite, non-negative number of seconds, got {secs} ({error})"),
        )
    })
}
