// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cmp::min;
use std::time::Duration;

/// Caps `delay` at `max` when a ceiling is configured.
pub(crate) fn clamp_to_max(delay: Duration, max: Option<Duration>) -> Duration {
    max.map_or(delay, |m| min(delay, m))
}

/// Converts float seconds into a [`Duration`], clamping negatives (and NaN) to zero and saturating on overflow.
pub(crate) fn secs_to_duration_saturating(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }

    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
