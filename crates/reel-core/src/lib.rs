#![forbid(unsafe_code)]

//! Shared vocabulary for the reel playback crates.
//!
//! Everything here is a plain value type: a [`MediaSource`] with its
//! detected [`SourceKind`], the [`PlaybackState`] machine states and the
//! [`ControllerId`] used to identify controllers inside a registry.

mod error;
mod source;
mod state;

pub use error::{CoreError, CoreResult};
pub use source::{MediaSource, SourceKind, is_stream_host};
pub use state::{ControllerId, PlaybackState};
