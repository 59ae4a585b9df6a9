//! Per-frame driver for the input manager
//!
//! Stands in for the host's animation-frame callback: a tokio interval polls
//! the gamepad source, OS events arrive on a channel and are applied between
//! frames. A frame always completes before the next one starts.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::input::{GamepadSource, InputManager};

/// OS-level input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    GamepadConnected(String),
}

/// Counters reported when the loop exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub events: u64,
}

/// Fixed-rate frame loop
#[derive(Debug, Clone, Copy)]
pub struct FrameLoop {
    period: Duration,
}

impl FrameLoop {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn from_rate(frame_rate_hz: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / f64::from(frame_rate_hz.max(1))))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run frames until `on_frame` breaks
    ///
    /// # Arguments
    /// * `events` - OS events; the loop keeps ticking after the sender is dropped
    /// * `on_frame` - Called after each poll with the frame delta in seconds
    pub async fn run<F>(
        &self,
        manager: &mut InputManager,
        source: &mut dyn GamepadSource,
        mut events: mpsc::Receiver<InputEvent>,
        mut on_frame: F,
    ) -> FrameStats
    where
        F: FnMut(&mut InputManager, f32) -> ControlFlow<()>,
    {
        info!("Frame loop started ({:?} per frame)", self.period);

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut stats = FrameStats::default();
        let mut events_open = true;
        let mut last_frame = Instant::now();

        loop {
            tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(event) => {
                        stats.events += 1;
                        apply_event(manager, event);
                    }
                    None => {
                        debug!("Input event channel closed");
                        events_open = false;
                    }
                },
                _ = ticker.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_frame).as_secs_f32();
                    last_frame = now;

                    let gamepads = source.connected_gamepads();
                    manager.poll_frame_at(&gamepads, now);
                    stats.frames += 1;
                    trace!("Frame {} ({} gamepad(s))", stats.frames, gamepads.len());

                    if on_frame(manager, dt).is_break() {
                        break;
                    }
                }
            }
        }

        info!("Frame loop stopped after {} frame(s)", stats.frames);
        stats
    }
}

fn apply_event(manager: &mut InputManager, event: InputEvent) {
    match event {
        InputEvent::KeyDown(key) => manager.handle_key_down(&key),
        InputEvent::KeyUp(key) => manager.handle_key_up(&key),
        InputEvent::GamepadConnected(name) => manager.handle_gamepad_connected(&name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{GamepadSnapshot, StaticGamepads};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_from_rate() {
        assert_eq!(FrameLoop::from_rate(50).period(), Duration::from_millis(20));
        assert_eq!(FrameLoop::from_rate(0).period(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_runs_until_break() {
        let mut manager = InputManager::new();
        let mut source = StaticGamepads::new(vec![GamepadSnapshot::idle(2, 2)]);
        let (_tx, rx) = mpsc::channel(8);

        let mut remaining = 3;
        let stats = FrameLoop::new(Duration::from_millis(1))
            .run(&mut manager, &mut source, rx, |_, _| {
                remaining -= 1;
                if remaining == 0 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await;

        assert_eq!(stats.frames, 3);
    }

    #[tokio::test]
    async fn test_held_key_dispatches_every_frame() {
        let mut manager = InputManager::new();
        manager.initialize_wasd();
        let seen = Arc::new(Mutex::new(0));
        let seen_clone = seen.clone();
        let _handle = manager.add_event_listener("fire", move |_| *seen_clone.lock().unwrap() += 1);

        let (tx, rx) = mpsc::channel(8);
        tx.send(InputEvent::KeyDown("p".to_string())).await.unwrap();
        drop(tx);

        let mut source = StaticGamepads::default();
        let stats = FrameLoop::new(Duration::from_millis(1))
            .run(&mut manager, &mut source, rx, |m, _| {
                if m.keyboard().is_down("p") && *seen.lock().unwrap() >= 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await;

        assert_eq!(stats.events, 1);
        assert!(*seen.lock().unwrap() >= 3);
    }
}
