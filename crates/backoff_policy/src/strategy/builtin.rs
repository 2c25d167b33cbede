// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use super::{Adaptive, Constant, Exponential, Fibonacci, Strategy};
use crate::{ConfigError, OutcomeArgs};

/// Any of the strategies shipped with this crate.
///
/// Produced by [`PolicyConfig`][crate::PolicyConfig] so that a policy built
/// from a configuration map has a single concrete type regardless of the
/// strategy it names.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BuiltinStrategy {
    /// See [`Constant`].
    Constant(Constant),

    /// See [`Exponential`].
    Exponential(Exponential),

    /// See [`Fibonacci`].
    Fibonacci(Fibonacci),

    /// See [`Adaptive`].
    Adaptive(Adaptive),
}

impl BuiltinStrategy {
    fn as_dyn(&self) -> &dyn Strategy {
        match self {
            Self::Constant(s) => s,
            Self::Exponential(s) => s,
            Self::Fibonacci(s) => s,
            Self::Adaptive(s) => s,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn Strategy {
        match self {
            Self::Constant(s) => s,
            Self::Exponential(s) => s,
            Self::Fibonacci(s) => s,
            Self::Adaptive(s) => s,
        }
    }
}

impl Strategy for BuiltinStrategy {
    fn on_success(&mut self, args: &OutcomeArgs) -> Duration {
        self.as_dyn_mut().on_success(args)
    }

    fn on_failure(&mut self, args: &OutcomeArgs) -> Duration {
        self.as_dyn_mut().on_failure(args)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.as_dyn().validate()
    }

    fn reset(&mut self) {
        self.as_dyn_mut().reset();
    }
}

impl From<Constant> for BuiltinStrategy {
    fn from(strategy: Constant) -> Self {
        Self::Constant(strategy)
    }
}

impl From<Exponential> for BuiltinStrategy {
    fn from(strategy: Exponential) -> Self {
        Self::Exponential(strategy)
    }
}

impl From<Fibonacci> for BuiltinStrategy {
    fn from(strategy: Fibonacci) -> Self {
        Self::Fibonacci(strategy)
    }
}

impl From<Adaptive> for BuiltinStrategy {
    fn from(strategy: Adaptive) -> Self {
        Self::Adaptive(strategy)
    }
}
