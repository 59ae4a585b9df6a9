//! Input subsystem
//!
//! Maps raw gamepad buttons, axes and keyboard keys to named game actions.
//! Ranges are learned interactively against recorded resting values, then
//! resolved into normalized intensities for listeners and status queries.

pub mod error;
#[cfg(feature = "gamepad")]
pub mod gamepad;
pub mod keyboard;
pub mod learning;
pub mod listeners;
pub mod manager;
pub mod range;
pub mod source;
pub mod types;

pub use error::InputError;
#[cfg(feature = "gamepad")]
pub use gamepad::GilrsGamepads;
pub use learning::{AutoStopMode, LearningOptions};
pub use listeners::{ActionListeners, ListenerId, Unsubscribe};
pub use manager::InputManager;
pub use source::{GamepadSnapshot, GamepadSource, StaticGamepads};
pub use types::{
    ActionStatus, ActivationRange, GameAction, InputConfiguration, InputType, RestingValues,
};
