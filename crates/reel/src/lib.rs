#![forbid(unsafe_code)]

//! # Reel
//!
//! Facade crate for adaptive video playback in media galleries.
//!
//! ## Quick start
//!
//! ```ignore
//! use reel::prelude::*;
//!
//! let env = PlaybackEnv::default()
//!     .with_capabilities(host_capabilities())
//!     .with_engines(engine_factory)
//!     .with_registry(PlaybackRegistry::new());
//!
//! let source = MediaSource::new("https://example.com/intro/master.m3u8")?;
//! let hero = PlaybackController::new(surface, Some(source), PlaybackPolicy::default().with_hero_like(true), env);
//! hero.request_play(true).await?;
//! ```

// ── Re-export sub-crates ────────────────────────────────────────────────

pub mod media {
    pub use reel_core::*;
}

pub mod abr {
    pub use reel_abr::*;
}

pub mod events {
    pub use reel_events::*;
}

pub mod thumb {
    pub use reel_thumb::*;
}

pub mod play {
    pub use reel_play::*;
}

// ── Tracing ─────────────────────────────────────────────────────────────

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,reel_play=debug";

/// Install a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_LOG_FILTER`].
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_line_number(false)
        .with_file(false)
        .try_init()
        .is_ok()
}

// ── Prelude ─────────────────────────────────────────────────────────────

pub mod prelude {
    pub use reel_abr::{PinOptions, QualityLevel, StartupOptions, StartupTarget};
    pub use reel_core::{ControllerId, CoreError, MediaSource, PlaybackState, SourceKind};
    pub use reel_events::{Event, EventBus, PlaybackEvent, QualityEvent};
    pub use reel_play::{
        ControllerTiming, EngineConfig, EngineError, EngineEvent, EngineFactory, MediaSurface,
        PlayError, PlaybackController, PlaybackEnv, PlaybackPath, PlaybackPolicy,
        PlaybackRegistry, ReadyState, RuntimeCapabilities, StreamingEngine, SurfaceError,
        SurfaceEvent,
    };
    pub use reel_thumb::{ThumbnailRequest, ThumbnailResolver};

    pub use crate::init_tracing;
}
