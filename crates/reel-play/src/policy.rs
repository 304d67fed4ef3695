//! Per-controller playback policy.

use std::time::Duration;

use derivative::Derivative;
use derive_setters::Setters;
use reel_abr::{PinOptions, StartupOptions, StartupTarget};

/// Timer settings of a controller.
#[derive(Clone, Debug, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
pub struct ControllerTiming {
    /// Force `Starting -> Playing` when no frame signal arrives. Default: 1.5 s.
    #[derivative(Default(value = "Duration::from_millis(1500)"))]
    pub first_frame_timeout: Duration,
    /// Delay before measuring the element for starting-level selection, so
    /// layout has settled. Zero measures synchronously. Default: one 60 Hz frame.
    #[derivative(Default(value = "Duration::from_millis(16)"))]
    pub layout_settle_delay: Duration,
    /// Period of the loop-restart position watcher. Default: 250 ms.
    #[derivative(Default(value = "Duration::from_millis(250)"))]
    pub loop_watch_interval: Duration,
    /// Distance from the end at which a looping clip restarts. Default: 250 ms.
    #[derivative(Default(value = "Duration::from_millis(250)"))]
    pub loop_end_epsilon: Duration,
}

/// How one media item is loaded and played.
#[derive(Clone, Debug, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_", strip_option)]
pub struct PlaybackPolicy {
    /// Primary above-the-fold media: eager load, no player-size capping,
    /// starting level targeted at the hero floor.
    pub hero_like: bool,
    /// Actively choose the starting level instead of the engine default.
    pub prefer_hd: bool,
    /// Defer attachment until the element nears the viewport or is primed.
    pub lazy: bool,
    pub loop_playback: bool,
    pub muted: bool,
    /// Media may start without a user gesture and is never user-pausable.
    pub autoplay_allowed: bool,
    pub startup_target: StartupTarget,
    /// Explicit poster; overrides the thumbnail resolver.
    pub poster: Option<String>,
    /// Default: 1280.
    #[derivative(Default(value = "1280"))]
    pub thumbnail_width: u32,
    pub thumbnail_time: Duration,
    /// Label attached to every log record of the controller.
    pub debug_tag: Option<String>,
    pub timing: ControllerTiming,
    pub startup: StartupOptions,
    pub pin: PinOptions,
}

impl PlaybackPolicy {
    /// Hero media is always attached eagerly.
    pub fn is_eager(&self) -> bool {
        !self.lazy || self.hero_like
    }

    /// Hero media implies active starting-level selection.
    pub fn selects_start_level(&self) -> bool {
        self.prefer_hd || self.hero_like
    }
}
