//! Input subsystem errors

use thiserror::Error;

/// Recoverable contract violations and backend failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Learning mode needs a baseline to tell drift from activation
    #[error("resting input values must be recorded before learning mode starts")]
    RestingValuesNotRecorded,

    /// Gamepad backend could not be initialized
    #[error("gamepad backend unavailable: {0}")]
    Backend(String),
}
