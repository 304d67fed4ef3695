#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

//! Adaptive streaming playback controller.
//!
//! A [`PlaybackController`] owns one playback element binding: it decides
//! whether a [`MediaSource`](reel_core::MediaSource) needs an adaptive engine
//! or plays natively, attaches and tears down that engine, pins a good
//! starting rendition, detects the first painted frame and publishes a small
//! state machine on the [`EventBus`](reel_events::EventBus).
//!
//! Controllers sharing a [`PlaybackRegistry`] form a single-flight group:
//! a user-initiated play on one pauses whichever other one was playing.
//!
//! The host forwards element, engine and visibility callbacks into the
//! controller; timers run as Tokio tasks, so controllers must be created and
//! driven inside a Tokio runtime.

mod capabilities;
mod config;
mod controller;
mod dispose;
mod env;
mod error;
mod loop_guard;
mod policy;
mod registry;

pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use capabilities::{PlaybackPath, RuntimeCapabilities};
pub use config::EngineConfig;
pub use controller::PlaybackController;
pub use env::PlaybackEnv;
pub use error::{EngineError, PlayError, SurfaceError};
pub use policy::{ControllerTiming, PlaybackPolicy};
pub use registry::{PlaybackRegistry, Preemptible};
pub use traits::{
    engine::{EngineEvent, EngineFactory, StreamingEngine},
    surface::{MediaSurface, Preload, ReadyState, SurfaceEvent, SurfaceSetup},
};
