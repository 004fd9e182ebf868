//! Algoviz Playback
//!
//! Drains step traces at a live-adjustable cadence and reports a single
//! terminal status per run.
//!
//! # Features
//!
//! - **Controller**: one active run at a time, cooperative cancellation at
//!   step boundaries, injectable delay for deterministic tests
//! - **Speed**: shared steps-per-second setting read before every wait
//! - **Timeline**: seek and step through a buffered recording
//! - **Sessions**: a model, a controller and a renderer bound together, with
//!   text input parsing and cancel-before-edit commands
//! - **Config**: JSON gallery settings with validated defaults

mod ascii;
mod config;
mod controller;
mod error;
mod session;
mod speed;
mod timeline;

pub use ascii::render_grid;
pub use config::GalleryConfig;
pub use controller::{
    Canceller, Completion, Immediate, PlaybackController, PlaybackHandle, PlaybackState,
    RunState, Sleeper, TokioSleeper,
};
pub use error::{Error, ErrorKind, Result};
pub use session::{PlaybackEvent, Renderer, Session};
pub use speed::{
    validate_speed, IntervalProvider, SpeedControl, DEFAULT_SPEED, MAX_SPEED, MIN_SPEED,
};
pub use timeline::{Timeline, TimelineState, TimelineStatus};
