use crate::{PlaybackEvent, QualityEvent};

/// Unified event carried by the [`EventBus`](crate::EventBus).
#[derive(Clone, Debug)]
pub enum Event {
    /// Controller lifecycle event.
    Playback(PlaybackEvent),
    /// Starting-quality diagnostics.
    Quality(QualityEvent),
}

impl Event {
    /// Controller that emitted this event.
    pub fn controller(&self) -> reel_core::ControllerId {
        match self {
            Self::Playback(e) => e.controller(),
            Self::Quality(e) => e.controller(),
        }
    }
}

impl From<PlaybackEvent> for Event {
    fn from(e: PlaybackEvent) -> Self {
        Self::Playback(e)
    }
}

impl From<QualityEvent> for Event {
    fn from(e: QualityEvent) -> Self {
        Self::Quality(e)
    }
}
