//! Input mapping type definitions
//!
//! Defines the physical input kinds, activation ranges, resting values and the
//! persisted configuration shape that binds a physical input to an action.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Value reported for a keyboard key that is held down
pub const KEY_DOWN_VALUE: f32 = 1.0;
/// Value reported for a keyboard key that is not held down
pub const KEY_NOT_DOWN_VALUE: f32 = 0.0;
/// Resting value assumed for any input that was never recorded
pub const DEFAULT_RESTING_INPUT_VALUE: f32 = 0.0;
/// Lower bound of the normalized intensity range
pub const MINIMUM_INTENSITY: f32 = 0.1;
/// Upper bound of the normalized intensity range
pub const MAXIMUM_INTENSITY: f32 = 1.0;
/// Default delay before learning mode stops after the first input
pub const DEFAULT_LEARNING_MODE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Kind of physical input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Gamepad button (digital or pressure sensitive)
    Button,
    /// Gamepad axis (stick, trigger)
    Axis,
    /// Keyboard key
    Key,
}

impl InputType {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Button => "button",
            InputType::Axis => "axis",
            InputType::Key => "key",
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Constructs the lookup id of a physical input (e.g. `button:0`, `axis:1`, `key:a`)
pub fn input_guid(input_type: InputType, index_or_key: &str) -> String {
    format!("{}:{}", input_type, index_or_key)
}

/// Built-in game actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    Fire,
    Up,
    Down,
    Left,
    Right,
    Pause,
    Start,
}

impl GameAction {
    /// All built-in actions
    pub fn all() -> &'static [GameAction] {
        &[
            GameAction::Fire,
            GameAction::Up,
            GameAction::Down,
            GameAction::Left,
            GameAction::Right,
            GameAction::Pause,
            GameAction::Start,
        ]
    }

    /// Action name as used in mappings and listeners
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Fire => "fire",
            GameAction::Up => "moveUp",
            GameAction::Down => "moveDown",
            GameAction::Left => "moveLeft",
            GameAction::Right => "moveRight",
            GameAction::Pause => "pause",
            GameAction::Start => "start",
        }
    }

    /// Parse from an action name
    pub fn from_name(name: &str) -> Option<Self> {
        GameAction::all().iter().copied().find(|a| a.as_str() == name)
    }
}

impl std::fmt::Display for GameAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive range of raw values that activates an action.
///
/// `start` and `end` are kept in the order they were learned. For flipped
/// ranges `start > end`, so containment always goes through [`min`](Self::min)
/// and [`max`](Self::max).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivationRange {
    pub start: f32,
    pub end: f32,
}

impl ActivationRange {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Range covering a single value (buttons, keys, first observation)
    pub fn point(value: f32) -> Self {
        Self { start: value, end: value }
    }

    pub fn min(&self) -> f32 {
        self.start.min(self.end)
    }

    pub fn max(&self) -> f32 {
        self.start.max(self.end)
    }

    /// Whether `value` lies within the range regardless of bound order
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min() && value <= self.max()
    }

    /// A range with no width; activation then maps to full intensity
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

/// Binding of one physical input to one action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputConfiguration {
    #[serde(rename = "type")]
    pub input_type: InputType,
    pub action_name: String,
    pub input_index_or_key: String,
    pub activation_range: ActivationRange,
    /// Start is the less negative bound and end the more negative one
    #[serde(default)]
    pub range_is_flipped: bool,
}

impl InputConfiguration {
    /// Configuration for a keyboard key, active while the key is down
    pub fn key(key: &str, action_name: &str) -> Self {
        Self::key_with_range(key, action_name, KEY_DOWN_VALUE, KEY_DOWN_VALUE)
    }

    /// Configuration for a keyboard key with an explicit range
    pub fn key_with_range(key: &str, action_name: &str, min: f32, max: f32) -> Self {
        Self {
            input_type: InputType::Key,
            action_name: action_name.to_string(),
            input_index_or_key: key.to_string(),
            activation_range: ActivationRange::new(min.min(max), min.max(max)),
            range_is_flipped: false,
        }
    }

    /// Configuration created by the first learning observation
    pub fn observed(input_type: InputType, index_or_key: &str, action_name: &str, value: f32) -> Self {
        Self {
            input_type,
            action_name: action_name.to_string(),
            input_index_or_key: index_or_key.to_string(),
            activation_range: ActivationRange::point(value),
            range_is_flipped: false,
        }
    }

    /// Whether this configuration reads the given physical input
    pub fn reads(&self, input_type: InputType, index_or_key: &str) -> bool {
        self.input_type == input_type && self.input_index_or_key == index_or_key
    }

    /// Human readable form used by the calibration screen
    pub fn summary(&self) -> String {
        format!(
            "{}:{}, {} - {}",
            self.input_type,
            self.input_index_or_key,
            self.activation_range.start,
            self.activation_range.end
        )
    }
}

/// Idle values per physical input, keyed by [`input_guid`].
///
/// Kept in first-recorded order and serialized as a list of `[guid, value]`
/// pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(String, f32)>", into = "Vec<(String, f32)>")]
pub struct RestingValues {
    values: Vec<(String, f32)>,
}

impl RestingValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resting value of an input, falling back to [`DEFAULT_RESTING_INPUT_VALUE`]
    pub fn get(&self, input_type: InputType, index_or_key: &str) -> f32 {
        let guid = input_guid(input_type, index_or_key);
        self.values
            .iter()
            .find(|(key, _)| *key == guid)
            .map_or(DEFAULT_RESTING_INPUT_VALUE, |(_, value)| *value)
    }

    pub fn set(&mut self, input_type: InputType, index_or_key: &str, value: f32) {
        self.insert(input_guid(input_type, index_or_key), value);
    }

    fn insert(&mut self, guid: String, value: f32) {
        match self.values.iter_mut().find(|(key, _)| *key == guid) {
            Some(entry) => entry.1 = value,
            None => self.values.push((guid, value)),
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<(String, f32)>> for RestingValues {
    fn from(entries: Vec<(String, f32)>) -> Self {
        let mut resting = Self::new();
        for (guid, value) in entries {
            resting.insert(guid, value);
        }
        resting
    }
}

impl From<RestingValues> for Vec<(String, f32)> {
    fn from(resting: RestingValues) -> Self {
        resting.values
    }
}

/// Result of a pull-based action query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionStatus {
    pub is_active: bool,
    /// Intensity when active, [`DEFAULT_RESTING_INPUT_VALUE`] otherwise
    pub value: f32,
}

impl ActionStatus {
    pub const INACTIVE: ActionStatus = ActionStatus {
        is_active: false,
        value: DEFAULT_RESTING_INPUT_VALUE,
    };

    pub fn active(value: f32) -> Self {
        Self { is_active: true, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_guid_format() {
        assert_eq!(input_guid(InputType::Button, "0"), "button:0");
        assert_eq!(input_guid(InputType::Axis, "1"), "axis:1");
        assert_eq!(input_guid(InputType::Key, " "), "key: ");
    }

    #[test]
    fn test_flipped_range_containment() {
        let range = ActivationRange::new(-0.2, -0.9);
        assert!(range.contains(-0.5));
        assert!(range.contains(-0.2));
        assert!(range.contains(-0.9));
        assert!(!range.contains(0.0));
        assert!(!range.contains(-1.0));
    }

    #[test]
    fn test_key_config_orders_bounds() {
        let config = InputConfiguration::key_with_range("x", "fire", 1.0, 0.5);
        assert_eq!(config.activation_range, ActivationRange::new(0.5, 1.0));
        assert_eq!(config.input_type, InputType::Key);
    }

    #[test]
    fn test_configuration_json_field_names() {
        let config = InputConfiguration {
            input_type: InputType::Axis,
            action_name: "moveUp".to_string(),
            input_index_or_key: "1".to_string(),
            activation_range: ActivationRange::new(-0.2, -0.6),
            range_is_flipped: true,
        };

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["type"], "axis");
        assert_eq!(json["actionName"], "moveUp");
        assert_eq!(json["inputIndexOrKey"], "1");
        assert_eq!(json["rangeIsFlipped"], true);
        assert!(json["activationRange"]["start"].is_number());
    }

    #[test]
    fn test_missing_flip_flag_defaults_to_false() {
        let json = r#"{"type":"key","actionName":"fire","inputIndexOrKey":"p","activationRange":{"start":1,"end":1}}"#;
        let config: InputConfiguration = serde_json::from_str(json).unwrap();
        assert!(!config.range_is_flipped);
        assert_eq!(config.activation_range, ActivationRange::point(1.0));
    }

    #[test]
    fn test_resting_values_serialize_as_pairs() {
        let mut resting = RestingValues::new();
        resting.set(InputType::Axis, "1", -0.25);
        resting.set(InputType::Button, "0", 0.0);

        let json = serde_json::to_string(&resting).unwrap();
        assert_eq!(json, r#"[["axis:1",-0.25],["button:0",0.0]]"#);

        let restored: RestingValues = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, resting);
        assert_eq!(restored.get(InputType::Axis, "1"), -0.25);
        assert_eq!(restored.get(InputType::Key, "w"), DEFAULT_RESTING_INPUT_VALUE);
    }

    #[test]
    fn test_resting_values_keep_recording_order() {
        let mut resting = RestingValues::new();
        resting.set(InputType::Button, "2", 0.0);
        resting.set(InputType::Button, "10", 0.0);
        resting.set(InputType::Button, "2", 0.5);

        let json = serde_json::to_string(&resting).unwrap();
        assert_eq!(json, r#"[["button:2",0.5],["button:10",0.0]]"#);

        let restored: RestingValues =
            serde_json::from_str(r#"[["axis:0",0.1],["axis:0",0.2]]"#).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.get(InputType::Axis, "0"), 0.2);
    }

    #[test]
    fn test_summary_format() {
        let config = InputConfiguration::observed(InputType::Axis, "1", "moveUp", 0.5);
        assert_eq!(config.summary(), "axis:1, 0.5 - 0.5");
        assert_eq!(InputConfiguration::key("w", "moveUp").summary(), "key:w, 1 - 1");
    }

    #[test]
    fn test_game_action_names() {
        assert_eq!(GameAction::Up.as_str(), "moveUp");
        assert_eq!(GameAction::from_name("fire"), Some(GameAction::Fire));
        assert_eq!(GameAction::from_name("jump"), None);
    }
}
