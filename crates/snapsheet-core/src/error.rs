#![forbid(unsafe_code)]

//! Contract violations reported by the panel state machine.
//!
//! An [`SheetError::InvalidState`] means the caller drove the engine out of
//! order. It is returned and logged at `warn`; the engine is left untouched.

use thiserror::Error;

use crate::animation::EngineState;
use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, SheetError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SheetError {
    #[error("`{operation}` is not valid while the transition engine is {state}")]
    InvalidState {
        operation: &'static str,
        state: EngineState,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl SheetError {
    #[must_use]
    pub fn invalid(operation: &'static str, state: EngineState) -> Self {
        Self::InvalidState { operation, state }
    }

    /// True for out-of-order engine calls, as opposed to bad configuration.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}
