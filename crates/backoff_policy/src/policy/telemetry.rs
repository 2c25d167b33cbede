// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::Outcome;

/// Log switches of a single policy instance.
#[derive(Debug, Clone, Default)]
pub(crate) struct PolicyTelemetry {
    #[cfg(any(feature = "logs", test))]
    pub(crate) logs_enabled: bool,
}

impl PolicyTelemetry {
    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when logs feature not used")
    )]
    pub fn emit_wait(&self, name: &str, outcome: Outcome, consecutive_failures: u32, delay: Duration) {
        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            tracing::event!(
                name: "backoff_policy.wait",
                tracing::Level::DEBUG,
                policy.name = name,
                policy.outcome = outcome.as_str(),
                policy.consecutive_failures = consecutive_failures,
                policy.delay = delay.as_secs_f64(),
            );
        }
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when logs feature not used")
    )]
    pub fn emit_give_up(&self, name: &str, consecutive_failures: u32, max_attempts: u32) {
        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            tracing::event!(
                name: "backoff_policy.give_up",
                tracing::Level::WARN,
                policy.name = name,
                policy.consecutive_failures = consecutive_failures,
                policy.max_attempts = max_attempts,
            );
        }
    }
}
