use reel_core::{ControllerId, PlaybackState};

/// Category of a fatal controller error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Engine or native path could not bind to the element or source.
    AttachmentFailed,
    /// Adaptive engine reported an unrecoverable decode or network failure.
    FatalStream,
    /// The playback element itself reported a media error.
    Media,
}

/// Caller-facing controller events.
#[derive(Clone, Debug)]
pub enum PlaybackEvent {
    StateChanged {
        controller: ControllerId,
        from: PlaybackState,
        state: PlaybackState,
    },
    /// First decoded frame is visible; the poster can be hidden.
    FirstFramePainted { controller: ControllerId },
    /// Emitted once per binding when it enters `Errored`.
    Errored {
        controller: ControllerId,
        kind: ErrorKind,
        reason: String,
    },
}

impl PlaybackEvent {
    pub fn controller(&self) -> ControllerId {
        match self {
            Self::StateChanged { controller, .. }
            | Self::FirstFramePainted { controller }
            | Self::Errored { controller, .. } => *controller,
        }
    }
}
