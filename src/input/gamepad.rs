//! GilRs gamepad source
//!
//! Reads connected controllers through gilrs and exposes them as ordered
//! button/axis arrays. Buttons follow the W3C "standard gamepad" order so
//! indices stay stable across backends:
//!
//! ```text
//!  0 South   1 East    2 West    3 North
//!  4 LB      5 RB      6 LT      7 RT
//!  8 Select  9 Start  10 L3     11 R3
//! 12 Up     13 Down   14 Left   15 Right
//! 16 Mode
//! ```

use super::error::InputError;
use super::source::{GamepadSnapshot, GamepadSource};
use gilrs::{Axis, Button, Event, EventType, Gilrs};
use tracing::{info, trace};

/// Buttons in standard gamepad order
pub const STANDARD_BUTTONS: [Button; 17] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

/// Axes in standard gamepad order, followed by the analog triggers
pub const STANDARD_AXES: [Axis; 6] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::LeftZ,
    Axis::RightZ,
];

/// Gamepad source backed by gilrs
pub struct GilrsGamepads {
    gilrs: Gilrs,
}

impl GilrsGamepads {
    /// Initialize gilrs
    ///
    /// # Errors
    /// Returns [`InputError::Backend`] if the platform backend is unavailable
    pub fn new() -> Result<Self, InputError> {
        let gilrs = Gilrs::new().map_err(|e| InputError::Backend(e.to_string()))?;
        info!("GilRs initialized");

        for (id, gamepad) in gilrs.gamepads() {
            info!("Gamepad {:?} connected: \"{}\"", id, gamepad.name());
        }

        Ok(Self { gilrs })
    }

    /// Drain pending events so gilrs updates its cached state
    fn pump_events(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => {
                    let name = self.gilrs.gamepad(id).name().to_string();
                    info!("Gamepad connected: {:?} \"{}\"", id, name);
                }
                EventType::Disconnected => {
                    info!("Gamepad disconnected: {:?}", id);
                }
                _ => {}
            }
        }
    }

    fn snapshot(gamepad: &gilrs::Gamepad<'_>) -> GamepadSnapshot {
        let buttons = STANDARD_BUTTONS
            .iter()
            .map(|b| gamepad.button_data(*b).map(|d| d.value()).unwrap_or(0.0))
            .collect();
        let axes = STANDARD_AXES.iter().map(|a| gamepad.value(*a)).collect();
        GamepadSnapshot { buttons, axes }
    }
}

impl GamepadSource for GilrsGamepads {
    fn connected_gamepads(&mut self) -> Vec<GamepadSnapshot> {
        self.pump_events();

        let snapshots: Vec<GamepadSnapshot> = self
            .gilrs
            .gamepads()
            .filter(|(_, gp)| gp.is_connected())
            .map(|(_, gp)| Self::snapshot(&gp))
            .collect();

        trace!("Polled {} gamepad(s)", snapshots.len());
        snapshots
    }
}
