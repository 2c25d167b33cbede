// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Display;
use std::time::Duration;

/// Float rendering of [`Decision::GiveUp`] for callers that exchange delays as plain seconds.
pub const GIVE_UP_SENTINEL: f64 = -1.0;

/// What the caller should do after reporting an outcome.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use backoff_policy::Decision;
///
/// let decision = Decision::Wait(Duration::from_millis(1500));
/// assert_eq!(decision.delay(), Some(Duration::from_millis(1500)));
/// assert!((decision.as_secs_f64() - 1.5).abs() < f64::EPSILON);
///
/// assert!(Decision::GiveUp.is_give_up());
/// assert!((Decision::GiveUp.as_secs_f64() + 1.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Wait this long before the next attempt. Zero means "go ahead now".
    Wait(Duration),

    /// The attempt budget is exhausted; stop retrying.
    GiveUp,
}

impl Decision {
    /// Returns the delay to wait, or `None` when the policy gave up.
    #[must_use]
    pub fn delay(self) -> Option<Duration> {
        match self {
            Self::Wait(delay) => Some(delay),
            Self::GiveUp => None,
        }
    }

    /// Returns `true` when the attempt budget is exhausted.
    #[must_use]
    pub fn is_give_up(self) -> bool {
        matches!(self, Self::GiveUp)
    }

    /// Returns the delay in seconds, or [`GIVE_UP_SENTINEL`] when the policy gave up.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.delay().map_or(GIVE_UP_SENTINEL, |delay| delay.as_secs_f64())
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wait(delay) => write!(f, "wait {delay:?}"),
            Self::GiveUp => write!(f, "give up"),
        }
    }
}
