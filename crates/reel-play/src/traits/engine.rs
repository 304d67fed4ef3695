use std::time::Duration;

use reel_abr::QualityLevel;

use crate::{config::EngineConfig, error::EngineError};

/// Engine callbacks the host forwards into
/// [`PlaybackController::on_engine_event`](crate::PlaybackController::on_engine_event).
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// Manifest parsed; renditions known.
    ManifestParsed { levels: Vec<QualityLevel> },
    /// A fragment was appended to the buffer.
    FragmentBuffered { buffered_ahead: Duration },
    /// The engine switched renditions.
    LevelSwitched { level: usize },
    /// Non-fatal errors are retried by the engine itself.
    Error { fatal: bool, details: String },
}

/// Adaptive streaming engine bound to the host's playback element.
///
/// The factory that created it already knows which element to use;
/// [`attach`](Self::attach) performs the binding.
pub trait StreamingEngine: Send {
    fn attach(&mut self) -> Result<(), EngineError>;

    fn load_source(&mut self, url: &str) -> Result<(), EngineError>;

    /// Restart fragment loading from the beginning of the stream.
    fn restart_load(&mut self);

    fn set_start_level(&mut self, level: usize);

    fn set_current_level(&mut self, level: usize);

    /// Enable or suspend automatic rendition switching.
    fn set_auto_level(&mut self, enabled: bool);

    /// Detach from the element and release every engine resource.
    fn destroy(&mut self);
}

pub trait EngineFactory: Send + Sync {
    fn create(&self, config: &EngineConfig) -> Result<Box<dyn StreamingEngine>, EngineError>;
}
