// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Retry delay calculation from a running history of successes and failures.
//!
//! A caller that repeatedly attempts an operation reports every outcome to a
//! [`RetryPolicy`] and gets back a [`Decision`]: how long to wait before the
//! next attempt, or that it is time to give up. The policy does not sleep or
//! schedule anything itself, which makes it usable from synchronous code, any
//! async runtime, or a state machine driven by external events.
//!
//! # Core Types
//!
//! - [`RetryPolicy`]: Tracks consecutive failures and the last report time,
//!   and turns raw delays into the delay the caller should actually wait.
//! - [`Strategy`]: Computes raw delays. Implement it for custom behavior, or
//!   pick one of [`Constant`], [`Exponential`], [`Fibonacci`] and [`Adaptive`].
//! - [`Decision`]: Either [`Decision::Wait`] with a delay or [`Decision::GiveUp`].
//! - [`PolicyConfig`]: Describes a policy as a `serde` configuration map.
//!
//! # How delays are computed
//!
//! For every reported outcome the policy:
//!
//! 1. Rejects timestamps older than the previously reported one with [`OrderError`].
//! 2. Gives up when a failure reaches the configured attempt budget.
//! 3. Asks the strategy for a raw delay and caps it at the maximum delay.
//! 4. Credits back the previous delay and subtracts the time that passed since
//!    the previous report, so only lateness shortens the wait.
//! 5. Applies jitter, if configured, and caps the result again.
//!
//! Time is read from a [`tick::Clock`], so tests can drive the policy with a
//! controlled clock. Every report also has a `*_at` variant taking an explicit
//! timestamp.
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//!
//! use backoff_policy::{Decision, Exponential, RetryPolicy};
//! use tick::Clock;
//!
//! # fn call_service() -> Result<(), ()> { Ok(()) }
//! # async fn example(clock: &Clock) -> Result<(), Box<dyn std::error::Error>> {
//! let mut policy = RetryPolicy::builder(clock, Exponential::new(Duration::from_millis(100)))
//!     .max_attempts(5)
//!     .max_delay(Duration::from_secs(10))
//!     .jitter_factor(0.1)
//!     .build()?;
//!
//! loop {
//!     let decision = match call_service() {
//!         Ok(()) => {
//!             policy.success()?;
//!             break;
//!         }
//!         Err(()) => policy.failure()?,
//!     };
//!
//!     match decision {
//!         Decision::Wait(delay) => clock.delay(delay).await,
//!         Decision::GiveUp => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `logs`: Enables `PolicyBuilder::use_logs`, which emits a `tracing`
//!   event for every scheduled delay (`backoff_policy.wait`, DEBUG) and for
//!   giving up (`backoff_policy.give_up`, WARN).

mod config;
mod constants;
mod decision;
mod error;
mod jitter;
mod outcome;
mod policy;
mod rnd;
mod state;
mod strategy;
mod utils;

#[cfg(test)]
mod testing;

pub use config::{PolicyConfig, StrategyKind};
pub use decision::{Decision, GIVE_UP_SENTINEL};
pub use error::{ConfigError, OrderError};
pub use outcome::{Outcome, OutcomeArgs};
pub use policy::{PolicyBuilder, RetryPolicy};
pub use strategy::{Adaptive, BuiltinStrategy, Constant, Exponential, Fibonacci, Step, Strategy};
