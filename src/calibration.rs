//! Controls configurator
//!
//! Logic behind the calibration screen: one button per action starts a
//! learning session, and a feedback line tells the player what happened.
//! Rendering is left to the caller; it reads [`ControlsConfigurator::feedback`].

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

use crate::input::{GamepadSnapshot, InputError, InputManager, InputType};
use crate::storage::{KeyValueStore, StorageError};

/// Feedback line of the calibration screen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CalibrationFeedback {
    #[default]
    Idle,
    /// Waiting for the player to press something for the action
    AwaitingInput(String),
    /// First input of the session was observed
    InputReceived { input_type: InputType, index_or_key: String },
    /// Session finished for the action
    Done(String),
    ClearedAll,
}

impl std::fmt::Display for CalibrationFeedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "-"),
            Self::AwaitingInput(_) => write!(f, "Press any key or button"),
            Self::InputReceived { input_type, index_or_key } => write!(f, "{} {}", input_type, index_or_key),
            Self::Done(action) => write!(f, "Done mapping: {}", action),
            Self::ClearedAll => write!(f, "Cleared all control mappings"),
        }
    }
}

/// Headless calibration screen
#[derive(Debug, Clone, Default)]
pub struct ControlsConfigurator {
    feedback: Arc<Mutex<CalibrationFeedback>>,
}

impl ControlsConfigurator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feedback(&self) -> CalibrationFeedback {
        self.feedback.lock().clone()
    }

    /// Start mapping `action_name` from the player's next input
    ///
    /// Stops any running session and re-records resting values from
    /// `gamepads` before learning starts.
    pub fn start_mapping_action(
        &self,
        manager: &mut InputManager,
        gamepads: &[GamepadSnapshot],
        action_name: &str,
    ) -> Result<(), InputError> {
        info!("Mapping action '{}'", action_name);
        manager.stop_learning_mode();
        manager.record_all_resting_input_values(gamepads);
        *self.feedback.lock() = CalibrationFeedback::AwaitingInput(action_name.to_string());

        let on_first = Arc::clone(&self.feedback);
        let on_done = Arc::clone(&self.feedback);
        let options = manager
            .default_learning_options()
            .on_first_input(move |input_type, index_or_key| {
                debug!("First mapped input {}:{}", input_type, index_or_key);
                *on_first.lock() = CalibrationFeedback::InputReceived {
                    input_type,
                    index_or_key: index_or_key.to_string(),
                };
            })
            .on_done(move |name| {
                *on_done.lock() = CalibrationFeedback::Done(name.to_string());
            });

        manager.start_learning_mode(action_name, options)
    }

    pub fn clear_all(&self, manager: &mut InputManager) {
        manager.clear_all_mappings();
        *self.feedback.lock() = CalibrationFeedback::ClearedAll;
    }

    /// Leave the screen: stop learning and persist mappings
    pub fn unload(&self, manager: &mut InputManager, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        manager.stop_learning_mode();
        manager.save_mappings_to_storage(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::types::GameAction;
    use crate::storage::{MemoryStore, MappingSnapshot};
    use std::time::{Duration, Instant};

    fn idle() -> Vec<GamepadSnapshot> {
        vec![GamepadSnapshot::idle(4, 2)]
    }

    #[test]
    fn test_feedback_follows_learning_session() {
        let configurator = ControlsConfigurator::new();
        let mut manager = InputManager::new();

        configurator
            .start_mapping_action(&mut manager, &idle(), GameAction::Fire.as_str())
            .unwrap();
        assert_eq!(configurator.feedback(), CalibrationFeedback::AwaitingInput("fire".to_string()));

        let start = Instant::now();
        let mut pressed = GamepadSnapshot::idle(4, 2);
        pressed.buttons[1] = 1.0;
        manager.poll_frame_at(&[pressed], start);
        assert_eq!(
            configurator.feedback(),
            CalibrationFeedback::InputReceived {
                input_type: InputType::Button,
                index_or_key: "1".to_string()
            }
        );
        assert_eq!(configurator.feedback().to_string(), "button 1");

        manager.tick(start + Duration::from_millis(2000));
        assert_eq!(configurator.feedback(), CalibrationFeedback::Done("fire".to_string()));
        assert_eq!(manager.get_mapping_summary_for_action("fire"), vec!["button:1, 1 - 1"]);
    }

    #[test]
    fn test_remapping_stops_current_session() {
        let configurator = ControlsConfigurator::new();
        let mut manager = InputManager::new();

        configurator.start_mapping_action(&mut manager, &idle(), "moveUp").unwrap();
        configurator.start_mapping_action(&mut manager, &idle(), "moveDown").unwrap();

        assert_eq!(manager.action_being_learned(), Some("moveDown"));
        assert_eq!(configurator.feedback(), CalibrationFeedback::AwaitingInput("moveDown".to_string()));
    }

    #[test]
    fn test_clear_all_and_unload_persist() {
        let configurator = ControlsConfigurator::new();
        let mut manager = InputManager::new();
        manager.initialize_wasd();

        configurator.clear_all(&mut manager);
        assert_eq!(configurator.feedback(), CalibrationFeedback::ClearedAll);
        assert!(manager.configurations().is_empty());

        configurator.start_mapping_action(&mut manager, &idle(), "pause").unwrap();
        manager.handle_key_down("Escape");

        let store = MemoryStore::new();
        configurator.unload(&mut manager, &store).unwrap();
        assert!(!manager.is_learning());
        assert_eq!(configurator.feedback(), CalibrationFeedback::Done("pause".to_string()));

        let saved = MappingSnapshot::read_from(&store);
        assert_eq!(saved.configurations.map(|c| c.len()), Some(1));
    }
}
