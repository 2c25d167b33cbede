// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::rnd::Rnd;
use crate::utils::secs_to_duration_saturating;

/// Spreads `delay` uniformly over the symmetric band `[delay * (1 - factor), delay * (1 + factor)]`.
///
/// A zero delay or a missing/zero factor passes through unchanged. The band is
/// centered on `delay`, so the expected value of the result equals `delay`.
pub(crate) fn apply_jitter(delay: Duration, factor: Option<f64>, rnd: Rnd) -> Duration {
    let Some(factor) = factor.filter(|f| *f > 0.0) else {
        return delay;
    };

    if delay.is_zero() {
        return delay;
    }

    let secs = delay.as_secs_f64();
    secs_to_duration_saturating(rnd.in_band(secs * (1.0 - factor), secs * (1.0 + factor)))
}
