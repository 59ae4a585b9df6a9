//! Movement behaviors for game objects
//!
//! Behaviors are a closed set of variants. Only [`MovementBehavior::Linear`]
//! exposes a velocity; player ships read their direction from the
//! [`InputManager`] every update.

use glam::Vec2;
use tracing::trace;

use crate::input::{GameAction, InputManager};

/// Distance a fully actuated input moves the player per second
pub const DEFAULT_MOVEMENT_AMOUNT: f32 = 500.0;

/// How a game object moves each frame
#[derive(Debug, Clone, PartialEq)]
pub enum MovementBehavior {
    /// Never moves
    Stationary { position: Vec2 },
    /// Constant velocity in units per second
    Linear { position: Vec2, velocity: Vec2 },
    /// Moved by the directional actions, clamped to `[0, bounds]`
    UserInputDriven { position: Vec2, bounds: Vec2 },
}

impl MovementBehavior {
    pub fn stationary(position: Vec2) -> Self {
        Self::Stationary { position }
    }

    pub fn linear(position: Vec2, velocity: Vec2) -> Self {
        Self::Linear { position, velocity }
    }

    pub fn user_input_driven(position: Vec2, bounds: Vec2) -> Self {
        Self::UserInputDriven { position, bounds }
    }

    pub fn position(&self) -> Vec2 {
        match self {
            Self::Stationary { position }
            | Self::Linear { position, .. }
            | Self::UserInputDriven { position, .. } => *position,
        }
    }

    pub fn set_position(&mut self, new_position: Vec2) {
        match self {
            Self::Stationary { position }
            | Self::Linear { position, .. }
            | Self::UserInputDriven { position, .. } => *position = new_position,
        }
    }

    /// Velocity in units per second, for behaviors that have one
    pub fn velocity(&self) -> Option<Vec2> {
        match self {
            Self::Linear { velocity, .. } => Some(*velocity),
            _ => None,
        }
    }

    /// Advance by `dt_secs`
    ///
    /// # Arguments
    /// * `input` - Read only by [`MovementBehavior::UserInputDriven`]
    /// * `dt_secs` - Frame delta in seconds
    pub fn update(&mut self, input: &InputManager, dt_secs: f32) {
        match self {
            Self::Stationary { .. } => {}
            Self::Linear { position, velocity } => *position += *velocity * dt_secs,
            Self::UserInputDriven { position, bounds } => {
                let amount = DEFAULT_MOVEMENT_AMOUNT * dt_secs;
                let delta = input_direction(input) * amount;
                *position = (*position + delta).clamp(Vec2::ZERO, *bounds);
                trace!("Player moved by {:?} to {:?}", delta, position);
            }
        }
    }
}

/// Sum of the active directional intensities; screen y grows downwards
fn input_direction(input: &InputManager) -> Vec2 {
    let scale = input.settings().keyboard_scale_factor;
    let level = |action: GameAction| {
        let status = input.get_action_status(action.as_str(), scale);
        if status.is_active {
            status.value
        } else {
            0.0
        }
    };

    Vec2::new(
        level(GameAction::Right) - level(GameAction::Left),
        level(GameAction::Down) - level(GameAction::Up),
    )
}
