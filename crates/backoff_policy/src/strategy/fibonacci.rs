// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use super::Strategy;
use crate::OutcomeArgs;
use crate::constants::DEFAULT_DELAY_ON_SUCCESS;

/// Follows the Fibonacci sequence: each delay is the sum of the two before it.
///
/// The first consecutive failure waits `first_delay`, the second waits
/// `second_delay`, and every later one waits the sum of the previous two.
/// Growth is gentler than [`Exponential`][super::Exponential] with base 2.
///
/// **Example with `1s` for both seeds:** `1s, 1s, 2s, 3s, 5s, 8s, ...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fibonacci {
    first_delay: Duration,
    second_delay: Duration,
    delay_on_success: Duration,
}

impl Fibonacci {
    /// Creates a strategy seeded with `delay` for both the first and the second failure.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self::with_seeds(delay, delay)
    }

    /// Creates a strategy with distinct seeds for the first and second failure.
    #[must_use]
    pub fn with_seeds(first_delay: Duration, second_delay: Duration) -> Self {
        Self {
            first_delay,
            second_delay,
            delay_on_success: DEFAULT_DELAY_ON_SUCCESS,
        }
    }

    /// Sets the delay applied after a success.
    #[must_use]
    pub fn delay_on_success(self, delay: Duration) -> Self {
        Self {
            delay_on_success: delay,
            ..self
        }
    }

    #[cfg_attr(test, mutants::skip)] // Mutating the early exit only makes the loop run to the end.
    fn delay_for(&self, consecutive_failures: u32) -> Duration {
        match consecutive_failures {
            0 | 1 => self.first_delay,
            2 => self.second_delay,
            n => {
                let (mut previous, mut current) = (self.first_delay, self.second_delay);
                for _ in 2..n {
                    if current == Duration::MAX || (previous.is_zero() && current.is_zero()) {
                        break;
                    }

                    (previous, current) = (current, previous.saturating_add(current));
                }

                current
            }
        }
    }
}

impl Strategy for Fibonacci {
    fn on_success(&mut self, _args: &OutcomeArgs) -> Duration {
        self.delay_on_success
    }

    fn on_failure(&mut self, args: &OutcomeArgs) -> Duration {
        self.delay_for(args.consecutive_failures())
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    fn failure_delays(strategy: &mut Fibonacci, count: u32) -> Vec<u64> {
        (1..=count)
            .map(|n| strategy.on_failure(&OutcomeArgs::failure(n)).as_secs())
            .collect()
    }

    #[test]
    fn classic_sequence() {
        let mut strategy = Fibonacci::new(Duration::from_secs(1));

        assert_eq!(failure_delays(&mut strategy, 7), vec![1, 1, 2, 3, 5, 8, 13]);
    }

    #[test]
    fn distinct_seeds() {
        let mut strategy = Fibonacci::with_seeds(Duration::from_secs(2), Duration::from_secs(3));

        assert_eq!(failure_delays(&mut strategy, 5), vec![2, 3, 5, 8, 13]);
    }

    #[test]
    fn saturates_quickly() {
        let mut strategy = Fibonacci::new(Duration::from_secs(1));

        assert_eq!(strategy.on_failure(&OutcomeArgs::failure(u32::MAX)), Duration::MAX);
    }

    #[test]
    fn zero_seeds_stay_zero() {
        let mut strategy = Fibonacci::new(Duration::ZERO);

        assert_eq!(strategy.on_failure(&OutcomeArgs::failure(u32::MAX)), Duration::ZERO);
    }

    #[test]
    fn success_delay() {
        let mut strategy = Fibonacci::new(Duration::from_secs(1)).delay_on_success(Duration::from_secs(4));

        assert_eq!(strategy.on_success(&OutcomeArgs::success()), Duration::from_secs(4));
    }
}
