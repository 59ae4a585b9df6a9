//! Learning mode session state
//!
//! A session observes raw inputs for one action. It owns the auto-stop timer
//! and the client callbacks; dropping the session destroys both.

use super::types::{InputType, DEFAULT_LEARNING_MODE_TIMEOUT};
use std::time::{Duration, Instant};
use tracing::debug;

/// Called once with the first observed input of a session
pub type FirstInputCallback = Box<dyn FnMut(InputType, &str) + Send>;
/// Called when the session stops, with the learned action name
pub type DoneCallback = Box<dyn FnMut(&str) + Send>;

/// When a learning session stops on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoStopMode {
    /// Stop right after the first observed input
    Immediate,
    /// Stop after the delay, counted from the first observed input
    Delayed(Duration),
    /// Stop only through an explicit stop call
    Never,
}

impl Default for AutoStopMode {
    fn default() -> Self {
        AutoStopMode::Delayed(DEFAULT_LEARNING_MODE_TIMEOUT)
    }
}

/// Options for a learning session
#[derive(Default)]
pub struct LearningOptions {
    pub auto_stop: AutoStopMode,
    /// Ignore every control except the first one observed
    pub exclusive: bool,
    pub on_first_input: Option<FirstInputCallback>,
    pub on_done: Option<DoneCallback>,
}

impl LearningOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_stop(mut self, mode: AutoStopMode) -> Self {
        self.auto_stop = mode;
        self
    }

    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    pub fn on_first_input<F>(mut self, callback: F) -> Self
    where
        F: FnMut(InputType, &str) + Send + 'static,
    {
        self.on_first_input = Some(Box::new(callback));
        self
    }

    pub fn on_done<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_done = Some(Box::new(callback));
        self
    }
}

impl std::fmt::Debug for LearningOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearningOptions")
            .field("auto_stop", &self.auto_stop)
            .field("exclusive", &self.exclusive)
            .field("on_first_input", &self.on_first_input.is_some())
            .field("on_done", &self.on_done.is_some())
            .finish()
    }
}

/// One-shot deadline, checked by the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoStopTimer {
    deadline: Instant,
}

impl AutoStopTimer {
    pub fn arm(now: Instant, delay: Duration) -> Self {
        Self { deadline: now + delay }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// What the manager should do with an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Refine the range of the observed input
    Record,
    /// Refine the range, then stop the session
    RecordAndStop,
    /// Drop the sample (exclusive session, other control)
    Ignore,
}

/// Active learning session for one action
pub struct LearningSession {
    action: String,
    auto_stop: AutoStopMode,
    exclusive: bool,
    first_input: Option<(InputType, String)>,
    timer: Option<AutoStopTimer>,
    on_first_input: Option<FirstInputCallback>,
    on_done: Option<DoneCallback>,
}

impl LearningSession {
    pub fn new(action: &str, options: LearningOptions) -> Self {
        Self {
            action: action.to_string(),
            auto_stop: options.auto_stop,
            exclusive: options.exclusive,
            first_input: None,
            timer: None,
            on_first_input: options.on_first_input,
            on_done: options.on_done,
        }
    }

    /// Action being learned
    pub fn action(&self) -> &str {
        &self.action
    }

    /// First physical input observed, if any
    pub fn first_input(&self) -> Option<(InputType, &str)> {
        self.first_input.as_ref().map(|(t, k)| (*t, k.as_str()))
    }

    pub fn timer(&self) -> Option<&AutoStopTimer> {
        self.timer.as_ref()
    }

    /// Register an observation of a non-resting input
    ///
    /// The first observation fires the first-input callback and applies the
    /// auto-stop policy.
    pub fn observe(&mut self, input_type: InputType, index_or_key: &str, now: Instant) -> Observation {
        if self.first_input.is_none() {
            return self.accept_first_input(input_type, index_or_key, now);
        }

        let is_first_control = self
            .first_input
            .as_ref()
            .is_some_and(|(t, k)| *t == input_type && k == index_or_key);

        if self.exclusive && !is_first_control {
            Observation::Ignore
        } else {
            Observation::Record
        }
    }

    fn accept_first_input(&mut self, input_type: InputType, index_or_key: &str, now: Instant) -> Observation {
        debug!("First input for '{}': {}:{}", self.action, input_type, index_or_key);
        self.first_input = Some((input_type, index_or_key.to_string()));
        if let Some(callback) = self.on_first_input.as_mut() {
            callback(input_type, index_or_key);
        }

        match self.auto_stop {
            AutoStopMode::Immediate => Observation::RecordAndStop,
            AutoStopMode::Delayed(delay) => {
                self.timer = Some(AutoStopTimer::arm(now, delay));
                Observation::Record
            }
            AutoStopMode::Never => Observation::Record,
        }
    }

    /// Whether the auto-stop delay has elapsed
    pub fn is_due(&self, now: Instant) -> bool {
        self.timer.is_some_and(|t| t.is_due(now))
    }

    /// End the session, cancelling the timer and notifying the done callback
    ///
    /// # Returns
    /// The learned action and the done callback, which outlives the session
    pub fn finish(mut self) -> (String, Option<DoneCallback>) {
        self.timer = None;
        if let Some(callback) = self.on_done.as_mut() {
            callback(&self.action);
        }
        (self.action, self.on_done)
    }
}

impl std::fmt::Debug for LearningSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearningSession")
            .field("action", &self.action)
            .field("auto_stop", &self.auto_stop)
            .field("exclusive", &self.exclusive)
            .field("first_input", &self.first_input)
            .field("timer", &self.timer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_default_policy_is_delayed_two_seconds() {
        assert_eq!(
            AutoStopMode::default(),
            AutoStopMode::Delayed(Duration::from_millis(2000))
        );
    }

    #[test]
    fn test_first_input_callback_fires_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let options = LearningOptions::new()
            .auto_stop(AutoStopMode::Never)
            .on_first_input(move |t, k| seen_clone.lock().unwrap().push((t, k.to_string())));

        let mut session = LearningSession::new("fire", options);
        let now = Instant::now();
        assert_eq!(session.observe(InputType::Button, "0", now), Observation::Record);
        assert_eq!(session.observe(InputType::Button, "0", now), Observation::Record);
        assert_eq!(session.observe(InputType::Axis, "2", now), Observation::Record);

        assert_eq!(*seen.lock().unwrap(), vec![(InputType::Button, "0".to_string())]);
        assert!(session.timer().is_none());
    }

    #[test]
    fn test_immediate_stops_after_first_observation() {
        let mut session = LearningSession::new("fire", LearningOptions::new().auto_stop(AutoStopMode::Immediate));
        assert_eq!(
            session.observe(InputType::Key, "p", Instant::now()),
            Observation::RecordAndStop
        );
    }

    #[test]
    fn test_delayed_timer_armed_from_first_input() {
        let delay = Duration::from_millis(500);
        let mut session = LearningSession::new("moveUp", LearningOptions::new().auto_stop(AutoStopMode::Delayed(delay)));
        let start = Instant::now();

        assert!(!session.is_due(start + Duration::from_secs(10)));

        let first = start + Duration::from_millis(100);
        session.observe(InputType::Axis, "1", first);
        assert!(!session.is_due(first + Duration::from_millis(499)));
        assert!(session.is_due(first + delay));
    }

    #[test]
    fn test_exclusive_ignores_other_controls() {
        let mut session = LearningSession::new(
            "moveLeft",
            LearningOptions::new().auto_stop(AutoStopMode::Never).exclusive(true),
        );
        let now = Instant::now();
        assert_eq!(session.observe(InputType::Axis, "0", now), Observation::Record);
        assert_eq!(session.observe(InputType::Axis, "1", now), Observation::Ignore);
        assert_eq!(session.observe(InputType::Button, "0", now), Observation::Ignore);
        assert_eq!(session.observe(InputType::Axis, "0", now), Observation::Record);
    }

    #[test]
    fn test_finish_calls_done_with_action() {
        let done = Arc::new(Mutex::new(None));
        let done_clone = done.clone();
        let session = LearningSession::new(
            "pause",
            LearningOptions::new().on_done(move |a| *done_clone.lock().unwrap() = Some(a.to_string())),
        );

        let (action, callback) = session.finish();
        assert_eq!(action, "pause");
        assert_eq!(done.lock().unwrap().as_deref(), Some("pause"));
        assert!(callback.is_some());
    }
}
