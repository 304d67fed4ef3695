use reel_abr::{PinRelease, QualityLevel, StartupReason};
use reel_core::ControllerId;

/// Starting-quality events of the adaptive path.
#[derive(Clone, Debug)]
pub enum QualityEvent {
    /// Manifest parsed and renditions discovered.
    LevelsDiscovered {
        controller: ControllerId,
        levels: Vec<QualityLevel>,
    },
    /// Starting level chosen and automatic switching suspended.
    LevelPinned {
        controller: ControllerId,
        level: usize,
        height: u32,
        target_height: u32,
        reason: StartupReason,
    },
    /// Pin handed back to automatic switching.
    PinReleased {
        controller: ControllerId,
        level: usize,
        reason: PinRelease,
    },
}

impl QualityEvent {
    pub fn controller(&self) -> ControllerId {
        match self {
            Self::LevelsDiscovered { controller, .. }
            | Self::LevelPinned { controller, .. }
            | Self::PinReleased { controller, .. } => *controller,
        }
    }
}
