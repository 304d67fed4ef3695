use reel_core::{CoreError, PlaybackState};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PlayError {
    #[error("attachment failed: {reason}")]
    AttachmentFailed { reason: String },

    #[error("playback rejected: {reason}")]
    PlaybackRejected { reason: String },

    #[error("fatal stream error: {reason}")]
    FatalStream { reason: String },

    #[error("autoplay is not allowed for this controller")]
    AutoplayNotAllowed,

    #[error("operation not valid in state {state}")]
    InvalidState { state: PlaybackState },

    #[error("media source changed while the request was pending")]
    SourceChanged,

    #[error("no media source bound")]
    NoSource,

    #[error("controller disposed")]
    Disposed,

    #[error(transparent)]
    Source(#[from] CoreError),
}

impl PlayError {
    /// Recoverable errors leave the binding usable; the caller may retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PlaybackRejected { .. } | Self::AutoplayNotAllowed | Self::SourceChanged
        )
    }
}

/// Failures reported by a [`StreamingEngine`](crate::StreamingEngine) or its factory.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("adaptive engine is not supported by this runtime")]
    Unsupported,

    #[error("engine could not attach to the media element: {0}")]
    Attach(String),

    #[error("engine could not load source: {0}")]
    Load(String),
}

/// Failures reported by a [`MediaSurface`](crate::MediaSurface).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// Playback declined by the runtime, typically a user-gesture policy.
    #[error("play request not allowed: {0}")]
    NotAllowed(String),

    /// Play request interrupted by a pause or source reload.
    #[error("play request aborted: {0}")]
    Aborted(String),
}
