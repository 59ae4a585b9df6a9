//! Vidshooter input layer
//!
//! Gamepad and keyboard mapping for the arcade shooter: calibration of
//! activation ranges, action resolution, movement behaviors and persistence.

pub mod calibration;
pub mod config;
pub mod frame_loop;
pub mod input;
pub mod movement;
pub mod paths;
pub mod storage;
