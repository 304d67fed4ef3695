mod binding;
mod inner;

use std::{sync::Arc, time::Duration};

use reel_abr::QualityLevel;
use reel_core::{ControllerId, MediaSource, PlaybackState};
use reel_events::Event;
use tokio::sync::{broadcast, watch};

use self::inner::Inner;
use crate::{
    capabilities::PlaybackPath,
    env::PlaybackEnv,
    error::PlayError,
    policy::PlaybackPolicy,
    traits::{
        engine::EngineEvent,
        surface::{MediaSurface, SurfaceEvent},
    },
};

/// Drives one playback element through its lifecycle.
///
/// Cheap to clone; clones share the binding. The binding is torn down when
/// [`dispose`](Self::dispose) is called or the last clone is dropped.
///
/// Must be created inside a Tokio runtime: activation may spawn timers.
pub struct PlaybackController<S: MediaSurface> {
    inner: Arc<Inner<S>>,
}

impl<S: MediaSurface> Clone for PlaybackController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: MediaSurface> PlaybackController<S> {
    /// Bind `surface` to `source`. Eager policies attach immediately.
    pub fn new(
        surface: Arc<S>,
        source: Option<MediaSource>,
        policy: PlaybackPolicy,
        env: PlaybackEnv,
    ) -> Self {
        let eager = policy.is_eager();
        let inner = Inner::new(surface, source, policy, env);
        if eager {
            inner.activate("eager");
        }
        Self { inner }
    }

    /// Attach the current source if not attached yet. Idempotent.
    pub fn activate(&self) {
        self.inner.activate("activate");
    }

    /// Pointer-down hint: start attaching before the click lands.
    pub fn prime(&self) {
        self.inner.activate("prime");
    }

    /// The element is about to enter the viewport. Remembered across
    /// source changes.
    pub fn on_near_viewport(&self) {
        self.inner.on_near_viewport();
    }

    /// Ask for playback.
    ///
    /// Waits for attachment when the binding is not ready yet, then resolves
    /// with the state reached after `Starting` (normally `Playing`). A
    /// user-initiated request pauses whichever other controller of the
    /// registry was playing. On rejection the state reverts to `Ready` or
    /// `Paused`.
    pub async fn request_play(&self, user_initiated: bool) -> Result<PlaybackState, PlayError> {
        self.inner.request_play(user_initiated).await
    }

    /// Pause on behalf of the user. Autoplay media cannot be paused this way.
    pub fn request_pause(&self) {
        if self.inner.policy.autoplay_allowed {
            tracing::trace!(controller = %self.inner.id, "pause ignored for autoplay media");
            return;
        }
        self.inner.pause_now("request");
    }

    /// Click handler: pause while playing, otherwise start a user play.
    pub async fn toggle(&self) -> Result<PlaybackState, PlayError> {
        if self.state().is_active() {
            self.request_pause();
            Ok(self.state())
        } else {
            self.request_play(true).await
        }
    }

    /// Pause regardless of policy.
    pub fn force_pause(&self) {
        self.inner.pause_now("force");
    }

    /// Replace the media source. Tears the old binding down first.
    pub fn on_source_changed(&self, source: Option<MediaSource>) {
        self.inner.on_source_changed(source);
    }

    /// Tear down and refuse further requests with [`PlayError::Disposed`].
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    pub fn on_engine_event(&self, event: EngineEvent) {
        self.inner.on_engine_event(event);
    }

    pub fn on_surface_event(&self, event: SurfaceEvent) {
        self.inner.on_surface_event(event);
    }

    /// A frame requested through
    /// [`MediaSurface::request_frame_callback`] was presented.
    pub fn on_frame_presented(&self, media_time: Duration) {
        self.inner.on_frame_presented(media_time);
    }

    /// Run one loop-restart check. Returns `true` when a restart started.
    pub fn check_loop_position(&self) -> bool {
        self.inner.check_loop_position()
    }

    /// Explicit poster, else a thumbnail synthesized from the source.
    pub fn poster_url(&self) -> Option<String> {
        self.inner.poster_url()
    }

    pub fn id(&self) -> ControllerId {
        self.inner.id
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.state()
    }

    pub fn has_ever_rendered_frame(&self) -> bool {
        self.inner.binding.lock().has_ever_rendered_frame
    }

    pub fn source(&self) -> Option<MediaSource> {
        self.inner.binding.lock().source.clone()
    }

    pub fn path(&self) -> Option<PlaybackPath> {
        self.inner.binding.lock().path
    }

    pub fn policy(&self) -> &PlaybackPolicy {
        &self.inner.policy
    }

    pub fn surface(&self) -> &Arc<S> {
        &self.inner.surface
    }

    /// Renditions reported by the engine for the current source.
    pub fn levels(&self) -> Vec<QualityLevel> {
        self.inner.binding.lock().levels.clone()
    }

    pub fn current_quality_level(&self) -> Option<QualityLevel> {
        let b = self.inner.binding.lock();
        let index = b.current_level?;
        b.levels.iter().find(|level| level.index == index).copied()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.binding.lock().disposed
    }

    /// Events of every controller sharing this controller's bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.env.bus.subscribe()
    }

    pub fn state_watch(&self) -> watch::Receiver<PlaybackState> {
        self.inner.state_tx.subscribe()
    }
}

impl<S: MediaSurface> std::fmt::Debug for PlaybackController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
