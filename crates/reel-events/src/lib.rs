#![forbid(unsafe_code)]

//! Event bus for playback controllers.
//!
//! Controllers publish [`PlaybackEvent`]s (the only outputs a UI needs to
//! render poster, play icon and error affordances) and [`QualityEvent`]s
//! (starting-level diagnostics) onto a shared [`EventBus`].

mod bus;
mod event;
mod playback;
mod quality;

pub use bus::EventBus;
pub use event::Event;
pub use playback::{ErrorKind, PlaybackEvent};
pub use quality::QualityEvent;
