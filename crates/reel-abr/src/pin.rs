use std::time::Duration;

use web_time::Instant;

/// When a pinned starting level is handed back to automatic switching.
#[derive(Clone, Debug)]
pub struct PinOptions {
    /// Buffered media ahead of the playhead required for release.
    pub min_buffer_ahead: Duration,
    /// Fragments that must have been buffered since pinning.
    pub min_buffered_fragments: usize,
    /// Release unconditionally after this long.
    pub timeout: Duration,
}

impl Default for PinOptions {
    fn default() -> Self {
        Self {
            min_buffer_ahead: Duration::from_secs(6),
            min_buffered_fragments: 2,
            timeout: Duration::from_secs(4),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PinRelease {
    BufferSatisfied,
    Timeout,
    /// Released without meeting a condition (source change, teardown).
    Cancelled,
}

/// One-shot hold on a starting level.
///
/// Exactly one of the release paths wins; every later call is a no-op
/// returning `None`.
#[derive(Debug)]
pub struct QualityPin {
    level_index: usize,
    opts: PinOptions,
    fragments: usize,
    pinned_at: Instant,
    released: Option<PinRelease>,
}

impl QualityPin {
    #[must_use]
    pub fn new(level_index: usize, opts: PinOptions) -> Self {
        Self {
            level_index,
            opts,
            fragments: 0,
            pinned_at: Instant::now(),
            released: None,
        }
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn timeout(&self) -> Duration {
        self.opts.timeout
    }

    pub fn fragments(&self) -> usize {
        self.fragments
    }

    pub fn released(&self) -> Option<PinRelease> {
        self.released
    }

    pub fn is_released(&self) -> bool {
        self.released.is_some()
    }

    /// Record a buffered fragment; releases once both thresholds are met.
    pub fn on_fragment_buffered(&mut self, buffered_ahead: Duration) -> Option<PinRelease> {
        if self.is_released() {
            return None;
        }
        self.fragments += 1;

        let buffer_ok = buffered_ahead >= self.opts.min_buffer_ahead;
        let fragments_ok = self.fragments >= self.opts.min_buffered_fragments;
        if buffer_ok && fragments_ok {
            self.release(PinRelease::BufferSatisfied)
        } else {
            None
        }
    }

    pub fn on_timeout(&mut self) -> Option<PinRelease> {
        self.release(PinRelease::Timeout)
    }

    pub fn cancel(&mut self) -> Option<PinRelease> {
        self.release(PinRelease::Cancelled)
    }

    fn release(&mut self, reason: PinRelease) -> Option<PinRelease> {
        if self.is_released() {
            return None;
        }
        self.released = Some(reason);
        let held_ms = u64::try_from(self.pinned_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::debug!(
            level = self.level_index,
            fragments = self.fragments,
            held_ms,
            ?reason,
            "quality pin released"
        );
        Some(reason)
    }
}
