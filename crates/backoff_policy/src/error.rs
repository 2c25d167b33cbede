// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, SystemTime};

/// A retry policy was configured with an unknown, missing, or out-of-range option.
///
/// Returned when a policy is built, never later: a policy that was built
/// successfully is fully validated. The offending option is available through
/// [`option`][Self::option]; when the configuration came from a deserializer,
/// the deserializer's error is kept as the source.
///
/// # Examples
///
/// ```
/// use backoff_policy::ConfigError;
///
/// let error = ConfigError::invalid("exponentBase", "must be at least 1.0");
/// assert_eq!(error.option(), "exponentBase");
/// ```
#[ohno::error]
#[display("invalid retry policy option '{option}': {reason}")]
pub struct ConfigError {
    option: String,
    reason: String,
}

impl ConfigError {
    /// Creates an error for an option that holds an unacceptable value.
    ///
    /// Custom [`Strategy`][crate::Strategy] implementations use this from
    /// [`Strategy::validate`][crate::Strategy::validate].
    pub fn invalid(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(option, reason)
    }

    pub(crate) fn unknown(option: impl Into<String>) -> Self {
        Self::new(option, "unknown option")
    }

    pub(crate) fn missing(option: impl Into<String>) -> Self {
        Self::new(option, "missing required option")
    }

    pub(crate) fn malformed(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by("<configuration>", "malformed configuration", error)
    }

    /// Returns the name of the option that was rejected.
    #[must_use]
    pub fn option(&self) -> &str {
        &self.option
    }

    /// Returns why the option was rejected.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// An outcome was reported with a timestamp older than the previously recorded one.
///
/// Reported timestamps must never decrease. The policy state is left untouched
/// by the call that fails with this error.
#[ohno::error]
#[display("decreasing timestamp: {current:?} is earlier than the last recorded {previous:?}")]
pub struct OrderError {
    previous: SystemTime,
    current: SystemTime,
}

impl OrderError {
    /// Returns the last timestamp recorded by the policy.
    #[must_use]
    pub fn previous(&self) -> SystemTime {
        self.previous
    }

    /// Returns the rejected timestamp.
    #[must_use]
    pub fn current(&self) -> SystemTime {
        self.current
    }

    /// Returns how far the rejected timestamp went back in time.
    #[must_use]
    pub fn regression(&self) -> Duration {
        self.previous.duration_since(self.current).unwrap_or_default()
    }
}
