use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use reel_abr::{QualityLevel, QualityPin};
use reel_core::{MediaSource, PlaybackState};
use tokio_util::sync::CancellationToken;
use web_time::Instant;

use crate::{
    capabilities::PlaybackPath, dispose::Disposer, error::PlayError, loop_guard::LoopRestartGuard,
    traits::engine::StreamingEngine,
};

pub(super) type SharedEngine = Arc<Mutex<Box<dyn StreamingEngine>>>;

/// Mutable state of one controller, guarded by a single lock.
///
/// Everything below `generation` belongs to the current media source and is
/// reset by [`Binding::rebind`].
pub(super) struct Binding {
    pub(super) source: Option<MediaSource>,
    pub(super) near_viewport: bool,
    pub(super) disposed: bool,

    /// Bumped on every source change; stale timers compare against it.
    pub(super) generation: u64,
    pub(super) disposer: Disposer,
    pub(super) path: Option<PlaybackPath>,
    pub(super) engine: Option<SharedEngine>,
    pub(super) levels: Vec<QualityLevel>,
    pub(super) current_level: Option<usize>,
    pub(super) pin: Option<QualityPin>,
    pub(super) has_ever_rendered_frame: bool,
    pub(super) first_frame_wait: Option<CancellationToken>,
    pub(super) frame_callback_pending: bool,
    /// State restored when a play request is rejected.
    pub(super) resume_state: PlaybackState,
    pub(super) play_requested_at: Option<Instant>,
    pub(super) loop_guard: LoopRestartGuard,
    pub(super) last_error: Option<PlayError>,
}

impl Binding {
    pub(super) fn new(source: Option<MediaSource>, loop_epsilon: Duration) -> Self {
        Self {
            source,
            near_viewport: false,
            disposed: false,
            generation: 0,
            disposer: Disposer::new(),
            path: None,
            engine: None,
            levels: Vec::new(),
            current_level: None,
            pin: None,
            has_ever_rendered_frame: false,
            first_frame_wait: None,
            frame_callback_pending: false,
            resume_state: PlaybackState::Ready,
            play_requested_at: None,
            loop_guard: LoopRestartGuard::new(loop_epsilon),
            last_error: None,
        }
    }

    /// Replace the source and forget everything learned about the old one.
    /// Must run after teardown.
    pub(super) fn rebind(&mut self, source: Option<MediaSource>, loop_epsilon: Duration) {
        let near_viewport = self.near_viewport;
        let disposed = self.disposed;
        let generation = self.generation.wrapping_add(1);

        *self = Self::new(source, loop_epsilon);
        self.near_viewport = near_viewport;
        self.disposed = disposed;
        self.generation = generation;
    }
}
