// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Drives a flaky operation with an exponential policy and logs every decision.
//!
//! Run with `cargo run --example retry_loop --features logs`.

use std::io::Error;
use std::time::Duration;

use backoff_policy::{Decision, Exponential, RetryPolicy};
use ohno::AppError;
use tick::Clock;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(LevelFilter::DEBUG)
        .init();

    let clock = Clock::new_tokio();
    let mut policy = RetryPolicy::builder(&clock, Exponential::new(Duration::from_millis(50)))
        .name("flaky_operation")
        .max_attempts(6)
        .max_delay(Duration::from_millis(500))
        .jitter_factor(0.2)
        .use_logs()
        .build()?;

    for round in 1..=3 {
        policy.reset();

        loop {
            let decision = match execute_operation() {
                Ok(()) => {
                    let failures = policy.consecutive_failures();
                    policy.success()?;
                    println!("round {round}: succeeded after {failures} failures");
                    break;
                }
                Err(e) => {
                    println!("round {round}: {e}");
                    policy.failure()?
                }
            };

            match decision {
                Decision::Wait(delay) => clock.delay(delay).await,
                Decision::GiveUp => {
                    println!("round {round}: giving up");
                    break;
                }
            }
        }
    }

    Ok(())
}

// 60% chance of failing with a transient error
fn execute_operation() -> Result<(), Error> {
    if fastrand::u8(0..10) < 6 {
        Err(Error::other("transient execution error"))
    } else {
        Ok(())
    }
}
