// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Strategies compute the raw delay for each reported outcome.
//!
//! A [`RetryPolicy`][crate::RetryPolicy] owns exactly one [`Strategy`] and
//! asks it for a raw delay whenever an outcome is reported. Everything that
//! happens afterwards (ceiling clamp, elapsed-time correction, jitter) is the
//! policy's business, so a strategy only has to answer "how long, before any
//! adjustment?".
//!
//! The built-in strategies are:
//!
//! | Strategy | Failure delays with a `1s` base | Keeps state |
//! |----------|---------------------------------|-------------|
//! | [`Constant`] | `1s, 1s, 1s, 1s, ...` | no |
//! | [`Exponential`] | `1s, 2s, 4s, 8s, ...` | no |
//! | [`Fibonacci`] | `1s, 1s, 2s, 3s, 5s, ...` | no |
//! | [`Adaptive`] | depends on the [`Step`]s, see its docs | yes |
//!
//! [`BuiltinStrategy`] wraps all of them in a closed enum; it is what
//! [`PolicyConfig`][crate::PolicyConfig] produces.

mod adaptive;
mod builtin;
mod constant;
mod exponential;
mod fibonacci;

use std::fmt::Debug;
use std::time::Duration;

pub use adaptive::{Adaptive, Step};
pub use builtin::BuiltinStrategy;
pub use constant::Constant;
pub use exponential::Exponential;
pub use fibonacci::Fibonacci;

use crate::{ConfigError, OutcomeArgs};

/// Computes raw delays for a [`RetryPolicy`][crate::RetryPolicy].
///
/// The returned durations are raw: the policy clamps them to its maximum
/// delay, corrects them for how long the caller actually waited since the
/// previous report and applies jitter. Hooks take `&mut self` because the policy owns its strategy
/// exclusively, which lets strategies such as [`Adaptive`] remember previous
/// delays.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use backoff_policy::{OutcomeArgs, RetryPolicy, Strategy};
///
/// #[derive(Debug)]
/// struct Linear(Duration);
///
/// impl Strategy for Linear {
///     fn on_success(&mut self, _args: &OutcomeArgs) -> Duration {
///         Duration::ZERO
///     }
///
///     fn on_failure(&mut self, args: &OutcomeArgs) -> Duration {
///         self.0.saturating_mul(args.consecutive_failures())
///     }
/// }
///
/// # fn example(clock: &tick::Clock) -> Result<(), Box<dyn std::error::Error>> {
/// let mut policy = RetryPolicy::builder(clock, Linear(Duration::from_secs(1))).build()?;
/// # let _ = policy.failure()?;
/// # Ok(())
/// # }
/// ```
pub trait Strategy: Debug {
    /// Returns the raw delay to apply after a success.
    fn on_success(&mut self, args: &OutcomeArgs) -> Duration;

    /// Returns the raw delay to apply after a failure that did not exhaust the attempt budget.
    fn on_failure(&mut self, args: &OutcomeArgs) -> Duration;

    /// Checks the strategy's own parameters; called once when the policy is built.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the offending parameter.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Forgets any state accumulated from previous reports.
    fn reset(&mut self) {}
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn on_success(&mut self, args: &OutcomeArgs) -> Duration {
        (**self).on_success(args)
    }

    fn on_failure(&mut self, args: &OutcomeArgs) -> Duration {
        (**self).on_failure(args)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        (**self).validate()
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}
