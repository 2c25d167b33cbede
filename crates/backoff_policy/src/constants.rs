// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// Default attempt budget: zero, meaning the policy never gives up.
pub(crate) const DEFAULT_MAX_ATTEMPTS: u32 = 0;

/// Upper bound of the jitter factor.
///
/// At 0.5 the jitter band spans `[0.5 * delay, 1.5 * delay]`; anything wider
/// would let a jittered delay collapse to (almost) nothing.
pub(crate) const MAX_JITTER_FACTOR: f64 = 0.5;

/// Name used in log records when the policy has not been named.
pub(crate) const DEFAULT_POLICY_NAME: &str = "default";

/// Delay returned after a success unless a strategy is told otherwise.
pub(crate) const DEFAULT_DELAY_ON_SUCCESS: Duration = Duration::ZERO;

/// Growth factor of the exponential strategy.
pub(crate) const DEFAULT_EXPONENT_BASE: f64 = 2.0;
