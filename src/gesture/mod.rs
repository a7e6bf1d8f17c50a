//! Touchpad gesture recognition. Raw per-contact touch samples go in, relative
//! mouse motion, scroll and synthesized button clicks come out.

pub mod client;
pub mod contact;
pub mod engine;
pub mod event;
pub mod service;
pub mod state;
pub mod timer;
#[cfg(test)]
pub mod timer_test;

use thiserror::Error;

use self::timer::TimerError;

/// Possible errors raised by the gesture engine
#[derive(Error, Debug)]
pub enum GestureError {
    #[error("invalid touch input: {0}")]
    InvalidInput(String),
    #[error("unable to create tap timer: {0}")]
    Timer(#[from] TimerError),
}
