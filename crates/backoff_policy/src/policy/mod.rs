// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The retry policy and its builder.

mod builder;
mod telemetry;

use std::borrow::Cow;
use std::time::{Duration, SystemTime};

pub use builder::PolicyBuilder;
use telemetry::PolicyTelemetry;
use tick::Clock;

use crate::jitter::apply_jitter;
use crate::rnd::Rnd;
use crate::state::PolicyState;
use crate::utils::clamp_to_max;
use crate::{Decision, OrderError, Outcome, Strategy};

/// Computes how long to wait before the next attempt from a history of outcomes.
///
/// Report every attempt's outcome with [`success`][Self::success] or
/// [`failure`][Self::failure]; each call returns a [`Decision`]: either the
/// delay to wait before trying again, or [`Decision::GiveUp`] once the
/// configured number of consecutive failures is reached.
///
/// Every report goes through the same steps:
///
/// 1. The timestamp is checked against the previous one; reported time must
///    never go backwards.
/// 2. The [`Strategy`] produces a raw delay.
/// 3. The raw delay is capped at the maximum delay.
/// 4. The delay handed out by the previous report is credited back and the
///    time that passed since that report is subtracted. A caller that slept
///    the previous delay gets the capped delay unchanged; one that was slow
///    to report does not wait twice.
/// 5. Jitter is applied, and the result is capped again.
///
/// The policy never sleeps, blocks or performs I/O. Reading the [`Clock`] is
/// its only side effect, and [`success_at`][Self::success_at] /
/// [`failure_at`][Self::failure_at] avoid even that.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use backoff_policy::{Constant, Decision, RetryPolicy};
/// use tick::Clock;
///
/// # fn example(clock: &Clock) -> Result<(), Box<dyn std::error::Error>> {
/// let mut policy = RetryPolicy::builder(clock, Constant::new(Duration::from_secs(2)))
///     .max_attempts(3)
///     .build()?;
///
/// let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
///
/// assert_eq!(policy.failure_at(start)?, Decision::Wait(Duration::from_secs(2)));
/// // slept the whole two seconds
/// assert_eq!(policy.failure_at(start + Duration::from_secs(2))?, Decision::Wait(Duration::from_secs(2)));
/// // reported one second late
/// assert_eq!(policy.success_at(start + Duration::from_secs(5))?, Decision::Wait(Duration::ZERO));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RetryPolicy<S> {
    clock: Clock,
    strategy: S,
    state: PolicyState,
    max_attempts: u32,
    jitter_factor: Option<f64>,
    max_delay: Option<Duration>,
    name: Cow<'static, str>,
    rnd: Rnd,
    telemetry: PolicyTelemetry,
}

impl<S: Strategy> RetryPolicy<S> {
    /// Starts configuring a policy that reads time from `clock` and computes delays with `strategy`.
    pub fn builder(clock: impl AsRef<Clock>, strategy: S) -> PolicyBuilder<S> {
        PolicyBuilder::new(clock.as_ref(), strategy)
    }

    /// Reports a success at the clock's current time.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] when the clock reads earlier than the previously
    /// reported timestamp. The policy is left unchanged.
    pub fn success(&mut self) -> Result<Decision, OrderError> {
        self.success_at(self.clock.system_time())
    }

    /// Reports a success that happened at `timestamp`.
    ///
    /// Resets the consecutive failure count, so a policy that gave up becomes
    /// usable again. Never returns [`Decision::GiveUp`].
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] when `timestamp` is earlier than the previously
    /// reported one. The policy is left unchanged.
    pub fn success_at(&mut self, timestamp: SystemTime) -> Result<Decision, OrderError> {
        let elapsed = self.state.elapsed_until(timestamp)?;

        self.state.record_success();
        let args = self.state.outcome_args(Outcome::Success, timestamp);
        let raw = self.strategy.on_success(&args);

        Ok(self.schedule(Outcome::Success, raw, elapsed, timestamp))
    }

    /// Reports a failure at the clock's current time.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] when the clock reads earlier than the previously
    /// reported timestamp. The policy is left unchanged.
    pub fn failure(&mut self) -> Result<Decision, OrderError> {
        self.failure_at(self.clock.system_time())
    }

    /// Reports a failure that happened at `timestamp`.
    ///
    /// Returns [`Decision::GiveUp`] when this failure reaches the attempt
    /// budget. Giving up consults neither the strategy nor the timestamp, so
    /// the next report still measures elapsed time from the last delay that
    /// was handed out.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] when `timestamp` is earlier than the previously
    /// reported one. The policy is left unchanged.
    pub fn failure_at(&mut self, timestamp: SystemTime) -> Result<Decision, OrderError> {
        let elapsed = self.state.elapsed_until(timestamp)?;

        let failures = self.state.record_failure();
        if self.max_attempts > 0 && failures >= self.max_attempts {
            self.telemetry.emit_give_up(&self.name, failures, self.max_attempts);
            return Ok(Decision::GiveUp);
        }

        let args = self.state.outcome_args(Outcome::Failure, timestamp);
        let raw = self.strategy.on_failure(&args);

        Ok(self.schedule(Outcome::Failure, raw, elapsed, timestamp))
    }

    /// Forgets all reported outcomes, including any state kept by the strategy.
    pub fn reset(&mut self) {
        self.state.reset();
        self.strategy.reset();
    }

    fn schedule(&mut self, outcome: Outcome, raw: Duration, elapsed: Duration, timestamp: SystemTime) -> Decision {
        let capped = clamp_to_max(raw, self.max_delay);
        let outstanding = capped.saturating_add(self.state.last_delay());

        let delay = outstanding.checked_sub(elapsed).map_or(Duration::ZERO, |remaining| {
            clamp_to_max(apply_jitter(remaining, self.jitter_factor, self.rnd), self.max_delay)
        });
        self.state.advance(timestamp, delay);

        self.telemetry
            .emit_wait(&self.name, outcome, self.state.consecutive_failures(), delay);

        Decision::Wait(delay)
    }
}

impl<S> RetryPolicy<S> {
    /// Returns the number of failures reported since the last success or reset.
    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.state.consecutive_failures()
    }

    /// Returns the timestamp of the last report that produced a delay.
    #[must_use]
    pub fn last_timestamp(&self) -> Option<SystemTime> {
        self.state.last_timestamp()
    }

    /// Returns the delay handed out by the last report that did not give up.
    ///
    /// The next report credits it back before subtracting the time that
    /// passed, so sleeping exactly this long does not shorten the next delay.
    #[must_use]
    pub fn last_delay(&self) -> Duration {
        self.state.last_delay()
    }

    /// Returns `true` once the attempt budget is used up.
    ///
    /// Further failures keep returning [`Decision::GiveUp`] until a success is
    /// reported or the policy is [reset][Self::reset].
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.max_attempts > 0 && self.state.consecutive_failures() >= self.max_attempts
    }

    /// Returns the attempt budget; zero means unlimited.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the jitter factor, or `None` when delays are not randomized.
    #[must_use]
    pub fn jitter_factor(&self) -> Option<f64> {
        self.jitter_factor
    }

    /// Returns the cap applied to every delay, if any.
    #[must_use]
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Returns the name used in log records.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the strategy that computes raw delays.
    #[must_use]
    pub fn strategy(&self) -> &S {
        &self.strategy
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use tick::ClockControl;
    use tracing_subscriber::util::SubscriberInitExt;

    use super::*;
    use crate::testing::LogCapture;
    use crate::{Adaptive, Constant, OutcomeArgs, Step};

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn wait(secs: u64) -> Decision {
        Decision::Wait(Duration::from_secs(secs))
    }

    fn constant(secs: u64) -> PolicyBuilder<Constant> {
        RetryPolicy::builder(Clock::new_frozen(), Constant::new(Duration::from_secs(secs)))
    }

    #[derive(Debug, Default)]
    struct Recording {
        calls: Vec<OutcomeArgs>,
    }

    impl Strategy for Recording {
        fn on_success(&mut self, args: &OutcomeArgs) -> Duration {
            self.calls.push(*args);
            Duration::ZERO
        }

        fn on_failure(&mut self, args: &OutcomeArgs) -> Duration {
            self.calls.push(*args);
            Duration::from_secs(10)
        }
    }

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(RetryPolicy<Constant>: Send, Sync, std::fmt::Debug);
        static_assertions::assert_impl_all!(PolicyBuilder<Constant>: Send, Sync, std::fmt::Debug);
    }

    #[test]
    fn sleeping_previous_delay_keeps_raw_delay() {
        let mut policy = constant(2).build().unwrap();

        assert_eq!(policy.failure_at(at(1_000)).unwrap(), wait(2));
        assert_eq!(policy.failure_at(at(1_002)).unwrap(), wait(2));
        assert_eq!(policy.success_at(at(1_004)).unwrap(), wait(0));
        assert_eq!(policy.consecutive_failures(), 0);
        assert_eq!(policy.last_timestamp(), Some(at(1_004)));
        assert_eq!(policy.last_delay(), Duration::ZERO);
    }

    #[test]
    fn late_report_shortens_delay() {
        let mut policy = constant(2).build().unwrap();

        policy.failure_at(at(1_000)).unwrap();

        // slept 2s, then spent another second before reporting
        assert_eq!(policy.failure_at(at(1_003)).unwrap(), wait(1));
        assert_eq!(policy.last_delay(), Duration::from_secs(1));
    }

    #[test]
    fn early_report_keeps_outstanding_delay() {
        let mut policy = constant(2).build().unwrap();

        policy.failure_at(at(1_000)).unwrap();

        assert_eq!(policy.failure_at(at(1_001)).unwrap(), wait(3));
    }

    #[test]
    fn elapsed_beyond_delay_yields_zero() {
        let mut policy = constant(2).jitter_factor(0.5).build().unwrap();
        policy.rnd = Rnd::new_fixed(1.0);

        policy.failure_at(at(0)).unwrap();

        assert_eq!(policy.failure_at(at(60)).unwrap(), wait(0));
    }

    #[test]
    fn give_up_skips_strategy_and_timestamp() {
        let mut policy = RetryPolicy::builder(Clock::new_frozen(), Recording::default())
            .max_attempts(2)
            .build()
            .unwrap();

        assert_eq!(policy.failure_at(at(100)).unwrap(), wait(10));
        assert_eq!(policy.failure_at(at(101)).unwrap(), Decision::GiveUp);

        assert!(policy.is_exhausted());
        assert_eq!(policy.consecutive_failures(), 2);
        assert_eq!(policy.last_timestamp(), Some(at(100)));
        assert_eq!(policy.last_delay(), Duration::from_secs(10));
        assert_eq!(policy.strategy().calls.len(), 1);
    }

    #[test]
    fn success_rearms_exhausted_policy() {
        let mut policy = constant(1).max_attempts(2).build().unwrap();

        policy.failure_at(at(10)).unwrap();
        assert_eq!(policy.failure_at(at(11)).unwrap(), Decision::GiveUp);
        assert_eq!(policy.failure_at(at(12)).unwrap(), Decision::GiveUp);

        assert!(!policy.success_at(at(13)).unwrap().is_give_up());
        assert!(!policy.is_exhausted());

        assert_eq!(policy.failure_at(at(13)).unwrap(), wait(1));
        assert_eq!(policy.consecutive_failures(), 1);
    }

    #[test]
    fn decreasing_timestamp_leaves_state_untouched() {
        let mut policy = constant(2).max_attempts(2).build().unwrap();
        policy.failure_at(at(1_000)).unwrap();

        let error = policy.success_at(at(999)).unwrap_err();
        assert_eq!(error.previous(), at(1_000));
        assert_eq!(error.current(), at(999));

        // rejected before the give-up check
        policy.failure_at(at(998)).unwrap_err();

        assert_eq!(policy.consecutive_failures(), 1);
        assert_eq!(policy.last_timestamp(), Some(at(1_000)));
        assert!(!policy.is_exhausted());
    }

    #[test]
    fn equal_timestamps_accepted() {
        let mut policy = constant(2).build().unwrap();

        assert_eq!(policy.failure_at(at(5)).unwrap(), wait(2));
        // nothing slept yet, so the first delay is still outstanding
        assert_eq!(policy.failure_at(at(5)).unwrap(), wait(4));
    }

    #[test]
    fn max_delay_caps_raw_delay() {
        let mut policy = constant(10).max_delay(Duration::from_secs(5)).build().unwrap();

        assert_eq!(policy.failure_at(at(0)).unwrap(), wait(5));
    }

    #[test]
    fn cap_applies_before_elapsed_correction() {
        let mut policy = constant(10).max_delay(Duration::from_secs(5)).build().unwrap();

        assert_eq!(policy.failure_at(at(0)).unwrap(), wait(5));

        // 5s capped + 5s outstanding - 7s elapsed; capping after the correction would give 5s
        assert_eq!(policy.failure_at(at(7)).unwrap(), wait(3));
    }

    #[test]
    fn early_report_still_capped() {
        let mut policy = constant(4).max_delay(Duration::from_secs(5)).build().unwrap();

        policy.failure_at(at(0)).unwrap();

        assert_eq!(policy.failure_at(at(1)).unwrap(), wait(5));
    }

    #[test]
    fn jitter_band_edges() {
        let mut policy = constant(4).jitter_factor(0.25).build().unwrap();

        policy.rnd = Rnd::new_fixed(0.0);
        assert_eq!(policy.failure_at(at(0)).unwrap(), wait(3));

        policy.rnd = Rnd::new_fixed(1.0);
        assert_eq!(policy.failure_at(at(3)).unwrap(), wait(5));
    }

    #[test]
    fn jittered_delay_stays_under_max_delay() {
        let mut policy = constant(8)
            .jitter_factor(0.5)
            .max_delay(Duration::from_secs(5))
            .build()
            .unwrap();
        policy.rnd = Rnd::new_fixed(1.0);

        assert_eq!(policy.failure_at(at(0)).unwrap(), wait(5));
    }

    #[test]
    fn hooks_receive_outcome_args() {
        let mut policy = RetryPolicy::builder(Clock::new_frozen(), Recording::default())
            .build()
            .unwrap();

        policy.failure_at(at(100)).unwrap();
        policy.failure_at(at(104)).unwrap();
        policy.success_at(at(110)).unwrap();

        let calls = &policy.strategy().calls;
        assert_eq!(calls.len(), 3);

        assert_eq!(calls[0].outcome(), Outcome::Failure);
        assert_eq!(calls[0].consecutive_failures(), 1);
        assert_eq!(calls[0].previous_timestamp(), None);

        assert_eq!(calls[1].consecutive_failures(), 2);
        assert_eq!(calls[1].previous_timestamp(), Some(at(100)));
        assert_eq!(calls[1].elapsed(), Duration::from_secs(4));

        assert_eq!(calls[2].outcome(), Outcome::Success);
        assert_eq!(calls[2].consecutive_failures(), 0);
        assert_eq!(calls[2].timestamp(), at(110));
    }

    #[test]
    fn reads_clock_when_no_timestamp_given() {
        let control = ClockControl::new_at(at(1_000));
        let mut policy = RetryPolicy::builder(control.to_clock(), Constant::new(Duration::from_secs(2)))
            .build()
            .unwrap();

        assert_eq!(policy.failure().unwrap(), wait(2));
        assert_eq!(policy.last_timestamp(), Some(at(1_000)));

        control.advance(Duration::from_secs(2));
        assert_eq!(policy.failure().unwrap(), wait(2));

        control.advance(Duration::from_secs(3));
        assert_eq!(policy.success().unwrap(), wait(0));
        assert_eq!(policy.last_timestamp(), Some(at(1_005)));
    }

    #[test]
    fn reset_restores_initial_state() {
        let strategy = Adaptive::new(Duration::from_secs(1), Step::Mul(2.0), Step::Mul(0.5));
        let mut policy = RetryPolicy::builder(Clock::new_frozen(), strategy)
            .max_attempts(3)
            .build()
            .unwrap();

        policy.failure_at(at(100)).unwrap();
        policy.failure_at(at(100)).unwrap();
        assert_eq!(policy.strategy().previous_delay(), Some(Duration::from_secs(2)));

        policy.reset();

        assert_eq!(policy.consecutive_failures(), 0);
        assert_eq!(policy.last_timestamp(), None);
        assert_eq!(policy.last_delay(), Duration::ZERO);
        assert_eq!(policy.strategy().previous_delay(), None);

        // no baseline left to compare against
        assert_eq!(policy.failure_at(at(50)).unwrap(), wait(1));
    }

    #[test]
    fn logs_wait_and_give_up() {
        let log_capture = LogCapture::default();
        let _guard = log_capture.subscriber().set_default();

        let mut policy = constant(2).max_attempts(2).name("log_test_policy").use_logs().build().unwrap();
        policy.failure_at(at(0)).unwrap();
        policy.failure_at(at(1)).unwrap();

        log_capture.assert_contains("backoff_policy::policy");
        log_capture.assert_contains("log_test_policy");
        log_capture.assert_contains("policy.delay=2");
        log_capture.assert_contains("policy.max_attempts=2");
    }

    #[test]
    fn no_logs_unless_enabled() {
        let log_capture = LogCapture::default();
        let _guard = log_capture.subscriber().set_default();

        let mut policy = constant(2).max_attempts(1).build().unwrap();
        policy.failure_at(at(0)).unwrap();

        assert_eq!(log_capture.output(), "");
    }
}
