// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, SystemTime};

use crate::error::OrderError;
use crate::outcome::{Outcome, OutcomeArgs};

/// Mutable run state of a single policy instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PolicyState {
    consecutive_failures: u32,
    last_timestamp: Option<SystemTime>,
    last_delay: Duration,
}

impl PolicyState {
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_timestamp(&self) -> Option<SystemTime> {
        self.last_timestamp
    }

    /// The delay handed out by the last report; the caller is expected to be waiting it out.
    pub fn last_delay(&self) -> Duration {
        self.last_delay
    }

    /// Returns the time elapsed since the last recorded timestamp without mutating anything.
    ///
    /// The first report has nothing to compare against and yields zero.
    pub fn elapsed_until(&self, timestamp: SystemTime) -> Result<Duration, OrderError> {
        match self.last_timestamp {
            None => Ok(Duration::ZERO),
            Some(previous) => timestamp
                .duration_since(previous)
                .map_err(|_regression| OrderError::new(previous, timestamp)),
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }

    /// Snapshot handed to strategy hooks; taken before [`advance`][Self::advance].
    pub fn outcome_args(&self, outcome: Outcome, timestamp: SystemTime) -> OutcomeArgs {
        OutcomeArgs {
            outcome,
            timestamp,
            previous_timestamp: self.last_timestamp,
            consecutive_failures: self.consecutive_failures,
        }
    }

    pub fn advance(&mut self, timestamp: SystemTime, delay: Duration) {
        self.last_timestamp = Some(timestamp);
        self.last_delay = delay;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
