//! Starting-quality selection for adaptive video streams.
//!
//! Adaptive engines start on a low rendition to minimise time-to-first-frame,
//! which shows up as a blurry flash on hero media. This crate picks a better
//! starting level from the parsed manifest and holds it with a one-shot
//! [`QualityPin`] until enough media is buffered (or a timeout passes), then
//! hands control back to the engine's own adaptation.
//!
//! It is engine-agnostic: renditions are read through the [`LevelSource`]
//! trait.
//!
//! ## Example
//!
//! ```rust
//! use reel_abr::{QualityLevel, StartupOptions, StartupTarget, select_start_level, target_height};
//!
//! let levels = vec![
//!     QualityLevel::new(0, 360, 800_000),
//!     QualityLevel::new(1, 720, 2_500_000),
//!     QualityLevel::new(2, 1080, 5_000_000),
//! ];
//! let opts = StartupOptions::default();
//!
//! let target = target_height(&opts, false, StartupTarget::MatchElement, Some(540));
//! let decision = select_start_level(&levels, target, &opts).unwrap();
//! assert_eq!(decision.level_index, 1);
//! ```

#![forbid(unsafe_code)]

mod pin;
mod startup;
mod types;

pub use pin::{PinOptions, PinRelease, QualityPin};
pub use startup::{StartupDecision, StartupReason, select_start_level, target_height};
pub use types::{LevelSource, QualityLevel, StartupOptions, StartupTarget};
