//! Keyboard key-down tracking
//!
//! The OS only reports transitions; this keeps the set of held keys so the
//! frame loop can re-submit them every frame.

use super::types::{KEY_DOWN_VALUE, KEY_NOT_DOWN_VALUE};

/// Keys currently held down, in press order
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    active_keys: Vec<String>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as down; returns false if it was already held (auto-repeat)
    pub fn press(&mut self, key: &str) -> bool {
        if self.is_down(key) {
            return false;
        }
        self.active_keys.push(key.to_string());
        true
    }

    /// Mark a key as released; returns false if it was not held
    pub fn release(&mut self, key: &str) -> bool {
        let before = self.active_keys.len();
        self.active_keys.retain(|k| k != key);
        self.active_keys.len() != before
    }

    pub fn is_down(&self, key: &str) -> bool {
        self.active_keys.iter().any(|k| k == key)
    }

    /// Raw value of a key as seen by range checks
    pub fn value(&self, key: &str) -> f32 {
        if self.is_down(key) {
            KEY_DOWN_VALUE
        } else {
            KEY_NOT_DOWN_VALUE
        }
    }

    pub fn held_keys(&self) -> &[String] {
        &self.active_keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut keyboard = KeyboardState::new();
        assert!(keyboard.press("w"));
        assert!(!keyboard.press("w"));
        assert!(keyboard.press(" "));
        assert_eq!(keyboard.held_keys(), &["w".to_string(), " ".to_string()]);
        assert_eq!(keyboard.value("w"), KEY_DOWN_VALUE);

        assert!(keyboard.release("w"));
        assert!(!keyboard.release("w"));
        assert_eq!(keyboard.value("w"), KEY_NOT_DOWN_VALUE);
        assert!(keyboard.is_down(" "));
    }
}
