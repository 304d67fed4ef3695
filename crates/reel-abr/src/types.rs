/// One rendition reported by the engine after the manifest is parsed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QualityLevel {
    /// Engine-side level index.
    pub index: usize,
    /// Frame height in pixels.
    pub height: u32,
    /// Peak bitrate in bits per second.
    pub bitrate: u64,
}

impl QualityLevel {
    #[must_use]
    pub fn new(index: usize, height: u32, bitrate: u64) -> Self {
        Self {
            index,
            height,
            bitrate,
        }
    }
}

/// Source of rendition information for starting-level selection.
///
/// Keeps the selection logic independent of any particular engine's level
/// list representation.
pub trait LevelSource {
    /// Returns the number of available levels.
    fn level_count(&self) -> usize;

    /// Returns the level at the given position, if any.
    fn level_at(&self, position: usize) -> Option<QualityLevel>;
}

impl LevelSource for [QualityLevel] {
    fn level_count(&self) -> usize {
        self.len()
    }

    fn level_at(&self, position: usize) -> Option<QualityLevel> {
        self.get(position).copied()
    }
}

impl LevelSource for Vec<QualityLevel> {
    fn level_count(&self) -> usize {
        self.as_slice().level_count()
    }

    fn level_at(&self, position: usize) -> Option<QualityLevel> {
        self.as_slice().level_at(position)
    }
}

/// Desired minimum rendition height at start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StartupTarget {
    /// Fixed height in pixels.
    Height(u32),
    /// Follow the measured height of the playback element.
    #[default]
    MatchElement,
}

/// Thresholds for starting-level selection.
#[derive(Clone, Debug)]
pub struct StartupOptions {
    /// Target height for hero media regardless of element size.
    pub hero_floor_height: u32,
    /// Lower bound applied to element-relative targets.
    pub min_target_height: u32,
    /// Levels above this height are only considered when nothing else exists.
    pub max_start_height: Option<u32>,
}

impl Default for StartupOptions {
    fn default() -> Self {
        Self {
            hero_floor_height: 720,
            min_target_height: 360,
            max_start_height: Some(1080),
        }
    }
}
