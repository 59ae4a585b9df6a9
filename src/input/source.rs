//! Raw gamepad sources
//!
//! A source returns a snapshot of every connected gamepad once per frame.
//! Buttons and axes are ordered arrays; their position is the input index
//! used in mappings.

use parking_lot::RwLock;
use std::sync::Arc;

/// State of one connected gamepad at a point in time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamepadSnapshot {
    /// Button values (0.0 released .. 1.0 fully pressed)
    pub buttons: Vec<f32>,
    /// Axis values (typically -1.0 .. 1.0)
    pub axes: Vec<f32>,
}

impl GamepadSnapshot {
    pub fn new(buttons: Vec<f32>, axes: Vec<f32>) -> Self {
        Self { buttons, axes }
    }

    /// Gamepad with every button released and every axis centered
    pub fn idle(button_count: usize, axis_count: usize) -> Self {
        Self {
            buttons: vec![0.0; button_count],
            axes: vec![0.0; axis_count],
        }
    }
}

/// Provider of connected gamepad snapshots
pub trait GamepadSource {
    /// Snapshot every connected gamepad. Disconnected devices are omitted.
    fn connected_gamepads(&mut self) -> Vec<GamepadSnapshot>;
}

/// In-memory gamepad source
///
/// Clones share the same state, so a test or a headless driver can keep one
/// handle to move sticks while the frame loop polls another.
#[derive(Debug, Clone, Default)]
pub struct StaticGamepads {
    gamepads: Arc<RwLock<Vec<GamepadSnapshot>>>,
}

impl StaticGamepads {
    pub fn new(gamepads: Vec<GamepadSnapshot>) -> Self {
        Self {
            gamepads: Arc::new(RwLock::new(gamepads)),
        }
    }

    pub fn set(&self, gamepads: Vec<GamepadSnapshot>) {
        *self.gamepads.write() = gamepads;
    }

    /// Set an axis value; ignored if the gamepad or axis does not exist
    pub fn set_axis(&self, gamepad: usize, axis: usize, value: f32) {
        if let Some(slot) = self.gamepads.write().get_mut(gamepad).and_then(|g| g.axes.get_mut(axis)) {
            *slot = value;
        }
    }

    /// Set a button value; ignored if the gamepad or button does not exist
    pub fn set_button(&self, gamepad: usize, button: usize, value: f32) {
        if let Some(slot) = self.gamepads.write().get_mut(gamepad).and_then(|g| g.buttons.get_mut(button)) {
            *slot = value;
        }
    }

    pub fn disconnect_all(&self) {
        self.gamepads.write().clear();
    }
}

impl GamepadSource for StaticGamepads {
    fn connected_gamepads(&mut self) -> Vec<GamepadSnapshot> {
        self.gamepads.read().clone()
    }
}
