use std::time::Duration;

use async_trait::async_trait;

use crate::{capabilities::PlaybackPath, error::SurfaceError, policy::PlaybackPolicy};

/// Media readiness as reported by the playback element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    #[default]
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Preload {
    None,
    #[default]
    Metadata,
    Auto,
}

/// Element attributes applied before a source is assigned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SurfaceSetup {
    pub preload: Preload,
    pub muted: bool,
    pub plays_inline: bool,
    pub disable_picture_in_picture: bool,
    pub disable_remote_playback: bool,
}

impl SurfaceSetup {
    pub fn for_policy(policy: &PlaybackPolicy, path: PlaybackPath) -> Self {
        let preload = match (policy.hero_like, path) {
            (true, _) => Preload::Auto,
            (false, PlaybackPath::Engine) => Preload::None,
            (false, _) => Preload::Metadata,
        };
        Self {
            preload,
            muted: policy.muted,
            plays_inline: true,
            disable_picture_in_picture: true,
            disable_remote_playback: true,
        }
    }
}

/// Element callbacks the host forwards into
/// [`PlaybackController::on_surface_event`](crate::PlaybackController::on_surface_event).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    Play,
    Pause,
    Playing,
    Ended,
    LoadedData,
    TimeUpdate,
    Error { details: String },
}

/// The playback element a controller drives.
#[async_trait]
pub trait MediaSurface: Send + Sync + 'static {
    fn configure(&self, setup: &SurfaceSetup);

    /// Assign (`Some`) or clear (`None`) the element's source URL.
    fn set_source(&self, url: Option<&str>);

    fn load(&self);

    /// Resolves once the runtime accepted playback.
    async fn play(&self) -> Result<(), SurfaceError>;

    fn pause(&self);

    fn seek(&self, position: Duration);

    fn current_time(&self) -> Duration;

    /// `None` until metadata is known, or for unbounded streams.
    fn duration(&self) -> Option<Duration>;

    fn ready_state(&self) -> ReadyState;

    /// Rendered element height in CSS pixels, if laid out.
    fn measured_height(&self) -> Option<u32>;

    /// Ask for a one-shot frame presentation callback. Returns `false` when
    /// the element could not register one.
    fn request_frame_callback(&self) -> bool;

    fn cancel_frame_callback(&self);
}
