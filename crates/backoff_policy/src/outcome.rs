// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Display;
use std::time::{Duration, SystemTime};

/// The kind of outcome reported to a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The guarded operation succeeded.
    Success,

    /// The guarded operation failed.
    Failure,
}

impl Outcome {
    /// Returns the lowercase name of the outcome.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments passed to the [`Strategy`][crate::Strategy] hooks.
///
/// Provides the reported timestamp together with the run state the policy
/// tracked before this report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeArgs {
    pub(crate) outcome: Outcome,
    pub(crate) timestamp: SystemTime,
    pub(crate) previous_timestamp: Option<SystemTime>,
    pub(crate) consecutive_failures: u32,
}

impl OutcomeArgs {
    /// Returns the kind of outcome being reported.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns the timestamp of this report.
    #[must_use]
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Returns the timestamp of the previous accepted report, if any.
    #[must_use]
    pub fn previous_timestamp(&self) -> Option<SystemTime> {
        self.previous_timestamp
    }

    /// Returns the number of consecutive failures, including the one being reported.
    ///
    /// Always zero for a success.
    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Returns the time elapsed since the previous report, zero for the first one.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.previous_timestamp
            .and_then(|previous| self.timestamp.duration_since(previous).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl OutcomeArgs {
    pub(crate) fn failure(consecutive_failures: u32) -> Self {
        Self {
            outcome: Outcome::Failure,
            timestamp: SystemTime::UNIX_EPOCH,
            previous_timestamp: None,
            consecutive_failures,
        }
    }

    pub(crate) fn success() -> Self {
        Self {
            outcome: Outcome::Success,
            timestamp: SystemTime::UNIX_EPOCH,
            previous_timestamp: None,
            consecutive_failures: 0,
        }
    }
}
