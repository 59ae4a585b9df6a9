//! InputManager - maps physical inputs to actions
//!
//! Owns the mapping table, the resting-value table, the keyboard state and
//! the listener registry. Driven once per frame by [`InputManager::poll_frame`]
//! and by keyboard events; either learns ranges (learning mode) or dispatches
//! intensities to listeners.

use std::time::Instant;
use tracing::{debug, info, trace, warn};

use super::error::InputError;
use super::keyboard::KeyboardState;
use super::learning::{AutoStopMode, DoneCallback, LearningOptions, LearningSession, Observation};
use super::listeners::{ActionListeners, Unsubscribe};
use super::range::{intensity, refine_range};
use super::source::{GamepadSnapshot, GamepadSource};
use super::types::{
    ActionStatus, InputConfiguration, InputType, RestingValues, KEY_DOWN_VALUE,
};
use crate::config::InputSettings;
use crate::storage::{KeyValueStore, MappingSnapshot, StorageError};


/// Input mapping and action resolution
pub struct InputManager {
    settings: InputSettings,
    configurations: Vec<InputConfiguration>,
    resting_values: RestingValues,
    has_recorded_resting_values: bool,
    keyboard: KeyboardState,
    listeners: ActionListeners,
    learning: Option<LearningSession>,
    /// Done callback of the last session, fired again by idle stops
    on_learning_finished: Option<DoneCallback>,
    /// Gamepads as seen by the last poll, read by [`get_action_status`](Self::get_action_status)
    gamepads: Vec<GamepadSnapshot>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Create a manager with default settings and no mappings
    pub fn new() -> Self {
        Self::with_settings(InputSettings::default())
    }

    pub fn with_settings(settings: InputSettings) -> Self {
        Self {
            settings,
            configurations: Vec::new(),
            resting_values: RestingValues::new(),
            has_recorded_resting_values: false,
            keyboard: KeyboardState::new(),
            listeners: ActionListeners::new(),
            learning: None,
            on_learning_finished: None,
            gamepads: Vec::new(),
        }
    }

    pub fn settings(&self) -> &InputSettings {
        &self.settings
    }

    pub fn configurations(&self) -> &[InputConfiguration] {
        &self.configurations
    }

    pub fn resting_values(&self) -> &RestingValues {
        &self.resting_values
    }

    pub fn has_recorded_resting_values(&self) -> bool {
        self.has_recorded_resting_values
    }

    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    // ===== Mappings =====

    /// Bind a keyboard key to an action
    pub fn add_key_mapping(&mut self, key: &str, action_name: &str) {
        self.configurations.push(InputConfiguration::key(key, action_name));
    }

    /// Append the configured default key bindings (WASD, `p` and space by default)
    pub fn initialize_wasd(&mut self) {
        let bindings = self.settings.default_bindings.clone();
        for binding in &bindings {
            self.add_key_mapping(&binding.key, &binding.action);
        }
        debug!("Installed {} default key bindings", bindings.len());
    }

    pub fn clear_all_mappings(&mut self) {
        self.configurations.clear();
    }

    /// Remove every mapping of one action so it can be learned again
    pub fn clear_action_mapping(&mut self, action_name: &str) {
        self.configurations.retain(|c| c.action_name != action_name);
    }

    /// One line per configuration of the action: `type:id, start - end`
    pub fn get_mapping_summary_for_action(&self, action_name: &str) -> Vec<String> {
        self.configurations
            .iter()
            .filter(|c| c.action_name == action_name)
            .map(InputConfiguration::summary)
            .collect()
    }

    // ===== Resting values =====

    pub fn clear_resting_input_values(&mut self) {
        self.resting_values.clear();
    }

    /// Record the current value of every button and axis as its resting value
    ///
    /// Many controllers do not rest at zero, so this must run before learning.
    pub fn record_all_resting_input_values(&mut self, gamepads: &[GamepadSnapshot]) {
        info!("Recording resting values for {} gamepad(s)", gamepads.len());
        self.clear_resting_input_values();
        for gamepad in gamepads {
            for (index, value) in gamepad.buttons.iter().enumerate() {
                self.resting_values.set(InputType::Button, &index.to_string(), *value);
            }
            for (index, value) in gamepad.axes.iter().enumerate() {
                self.resting_values.set(InputType::Axis, &index.to_string(), *value);
            }
        }
        self.gamepads = gamepads.to_vec();
        self.has_recorded_resting_values = true;
    }

    /// [`record_all_resting_input_values`](Self::record_all_resting_input_values) reading from a source
    pub fn record_resting_values_from(&mut self, source: &mut dyn GamepadSource) {
        let gamepads = source.connected_gamepads();
        self.record_all_resting_input_values(&gamepads);
    }

    // ===== Learning mode =====

    /// Learning options built from the settings (delayed stop, exclusivity)
    pub fn default_learning_options(&self) -> LearningOptions {
        LearningOptions::new()
            .auto_stop(AutoStopMode::Delayed(self.settings.learning_timeout()))
            .exclusive(self.settings.exclusive_learning)
    }

    /// Start learning the range of inputs for `action_name`
    ///
    /// An active session is stopped first.
    ///
    /// # Errors
    /// [`InputError::RestingValuesNotRecorded`] if resting values were never
    /// recorded; no session is started.
    pub fn start_learning_mode(&mut self, action_name: &str, options: LearningOptions) -> Result<(), InputError> {
        if !self.has_recorded_resting_values {
            warn!("Call record_all_resting_input_values before starting learning mode");
            return Err(InputError::RestingValuesNotRecorded);
        }

        if let Some(active) = self.learning.as_ref() {
            warn!("Learning mode was already active for '{}', stopping it", active.action());
            self.stop_learning_mode();
        }

        info!("Learning mode started for '{}' ({:?})", action_name, options.auto_stop);
        self.on_learning_finished = None;
        self.learning = Some(LearningSession::new(action_name, options));
        Ok(())
    }

    /// Stop learning mode and notify the done callback. Safe to call when idle.
    ///
    /// When idle, the done callback of the last session is called with an
    /// empty action name.
    pub fn stop_learning_mode(&mut self) {
        match self.learning.take() {
            Some(session) => {
                let (action, on_done) = session.finish();
                info!("Learning mode stopped for '{}'", action);
                self.on_learning_finished = on_done;
            }
            None => {
                debug!("Stop learning mode requested while idle");
                if let Some(callback) = self.on_learning_finished.as_mut() {
                    callback("");
                }
            }
        }
    }

    pub fn is_learning(&self) -> bool {
        self.learning.is_some()
    }

    pub fn action_being_learned(&self) -> Option<&str> {
        self.learning.as_ref().map(LearningSession::action)
    }

    pub fn learning_session(&self) -> Option<&LearningSession> {
        self.learning.as_ref()
    }

    /// Stop learning mode if its auto-stop delay has elapsed
    pub fn tick(&mut self, now: Instant) {
        if self.learning.as_ref().is_some_and(|s| s.is_due(now)) {
            debug!("Learning mode auto-stop delay elapsed");
            self.stop_learning_mode();
        }
    }

    // ===== Listeners =====

    /// Register a listener for an action
    ///
    /// # Returns
    /// Handle whose `unsubscribe()` removes exactly this listener
    pub fn add_event_listener<F>(&self, action_name: &str, callback: F) -> Unsubscribe
    where
        F: Fn(f32) + Send + Sync + 'static,
    {
        if !self.configurations.iter().any(|c| c.action_name == action_name) {
            debug!("Listener added for '{}' which has no mapping yet", action_name);
        }
        self.listeners.subscribe(action_name, callback)
    }

    pub fn listeners(&self) -> &ActionListeners {
        &self.listeners
    }

    // ===== Input events =====

    /// Keyboard key pressed (OS event)
    pub fn handle_key_down(&mut self, key: &str) {
        self.handle_key_down_at(key, Instant::now());
    }

    pub fn handle_key_down_at(&mut self, key: &str, now: Instant) {
        self.tick(now);
        self.keyboard.press(key);
        self.process_input(InputType::Key, KEY_DOWN_VALUE, key, now);
    }

    /// Keyboard key released (OS event)
    pub fn handle_key_up(&mut self, key: &str) {
        self.keyboard.release(key);
    }

    /// Gamepad connected (OS event)
    pub fn handle_gamepad_connected(&mut self, name: &str) {
        info!("Gamepad connected: \"{}\"", name);
    }

    /// Process one frame of gamepad state plus held keys
    pub fn poll_frame(&mut self, gamepads: &[GamepadSnapshot]) {
        self.poll_frame_at(gamepads, Instant::now());
    }

    pub fn poll_frame_at(&mut self, gamepads: &[GamepadSnapshot], now: Instant) {
        self.tick(now);
        self.gamepads = gamepads.to_vec();

        for gamepad in gamepads {
            for (index, value) in gamepad.buttons.iter().enumerate() {
                self.process_gamepad_value(InputType::Button, index, *value, now);
            }
            for (index, value) in gamepad.axes.iter().enumerate() {
                self.process_gamepad_value(InputType::Axis, index, *value, now);
            }
        }

        let held: Vec<String> = self.keyboard.held_keys().to_vec();
        for key in &held {
            self.process_input(InputType::Key, KEY_DOWN_VALUE, key, now);
        }
    }

    /// [`poll_frame`](Self::poll_frame) reading from a source
    pub fn poll(&mut self, source: &mut dyn GamepadSource) {
        let gamepads = source.connected_gamepads();
        self.poll_frame(&gamepads);
    }

    fn process_gamepad_value(&mut self, input_type: InputType, index: usize, value: f32, now: Instant) {
        let id = index.to_string();
        if value != self.resting_values.get(input_type, &id) {
            self.process_input(input_type, value, &id, now);
        }
    }

    fn process_input(&mut self, input_type: InputType, value: f32, index_or_key: &str, now: Instant) {
        let Some(session) = self.learning.as_mut() else {
            self.trigger_all_satisfied_actions(input_type, value, index_or_key);
            return;
        };

        let action = session.action().to_string();
        match session.observe(input_type, index_or_key, now) {
            Observation::Record => self.record_input_range(&action, input_type, value, index_or_key),
            Observation::RecordAndStop => {
                self.record_input_range(&action, input_type, value, index_or_key);
                self.stop_learning_mode();
            }
            Observation::Ignore => {
                trace!("Ignoring {}:{} while learning '{}'", input_type, index_or_key, action);
            }
        }
    }

    /// Create or grow the range of the configuration for this input and action
    fn record_input_range(&mut self, action_name: &str, input_type: InputType, value: f32, index_or_key: &str) {
        debug!("Recording input range: {} = {} ({}:{})", action_name, value, input_type, index_or_key);

        let matching: Vec<usize> = self
            .configurations
            .iter()
            .enumerate()
            .filter(|(_, c)| c.reads(input_type, index_or_key) && c.action_name == action_name)
            .map(|(idx, _)| idx)
            .collect();

        match matching.first() {
            Some(&idx) => {
                if matching.len() > 1 {
                    warn!(
                        "More than one configuration for {}:{} -> '{}'",
                        input_type, index_or_key, action_name
                    );
                }
                refine_range(&mut self.configurations[idx], value);
            }
            None => self
                .configurations
                .push(InputConfiguration::observed(input_type, index_or_key, action_name, value)),
        }
    }

    fn trigger_all_satisfied_actions(&self, input_type: InputType, value: f32, index_or_key: &str) {
        let resting = self.resting_values.get(input_type, index_or_key);
        if value == resting {
            return;
        }

        let triggered: Vec<(String, f32)> = self
            .configurations
            .iter()
            .filter(|c| c.reads(input_type, index_or_key) && c.activation_range.contains(value))
            .map(|c| (c.action_name.clone(), intensity(value, &c.activation_range)))
            .collect();

        for (action, level) in triggered {
            self.listeners.dispatch(&action, level);
        }
    }

    // ===== Queries =====

    /// Whether an action is active and its intensity
    ///
    /// Zero-width ranges (keys, digital buttons) report
    /// `MAXIMUM_INTENSITY * scale_factor_for_no_range`; real ranges ignore the
    /// scale factor. The first satisfied configuration wins.
    pub fn get_action_status(&self, action_name: &str, scale_factor_for_no_range: f32) -> ActionStatus {
        for config in self.configurations.iter().filter(|c| c.action_name == action_name) {
            let value = self.current_input_value(config.input_type, &config.input_index_or_key);
            let range = &config.activation_range;
            let resting = self.resting_values.get(config.input_type, &config.input_index_or_key);

            if range.contains(value) && value != resting {
                let mut level = intensity(value, range);
                if range.is_degenerate() {
                    level *= scale_factor_for_no_range;
                }
                return ActionStatus::active(level);
            }
        }
        ActionStatus::INACTIVE
    }

    /// Current raw value of a physical input
    ///
    /// Axes are read from the first gamepad that has the index, buttons from
    /// the first connected gamepad.
    pub fn current_input_value(&self, input_type: InputType, index_or_key: &str) -> f32 {
        match input_type {
            InputType::Key => self.keyboard.value(index_or_key),
            InputType::Axis => {
                let Ok(index) = index_or_key.parse::<usize>() else {
                    return 0.0;
                };
                self.gamepads
                    .iter()
                    .find_map(|g| g.axes.get(index).copied())
                    .unwrap_or(0.0)
            }
            InputType::Button => {
                let Ok(index) = index_or_key.parse::<usize>() else {
                    return 0.0;
                };
                self.gamepads
                    .first()
                    .and_then(|g| g.buttons.get(index).copied())
                    .unwrap_or(0.0)
            }
        }
    }

    // ===== Persistence =====

    /// Save configurations and resting values under their storage keys
    pub fn save_mappings_to_storage(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        MappingSnapshot::new(self.configurations.clone(), self.resting_values.clone()).write_to(store)?;
        info!(
            "Saved {} mapping(s) and {} resting value(s)",
            self.configurations.len(),
            self.resting_values.len()
        );
        Ok(())
    }

    /// Replace in-memory mappings with stored ones
    ///
    /// Missing or corrupt configurations fall back to the default key
    /// bindings; missing or corrupt resting values leave the table untouched.
    pub fn load_mappings_from_storage(&mut self, store: &dyn KeyValueStore) {
        let snapshot = MappingSnapshot::read_from(store);

        if let Some(resting_values) = snapshot.resting_values {
            debug!("Restored {} resting value(s)", resting_values.len());
            self.resting_values = resting_values;
        }

        match snapshot.configurations {
            Some(configurations) => {
                info!("Loaded {} input mapping(s) from storage", configurations.len());
                self.configurations = configurations;
            }
            None => {
                info!("No input configurations found in storage, using default key bindings");
                self.configurations.clear();
                self.initialize_wasd();
            }
        }
    }
}
