//! Runtime capability query.
//!
//! The host answers these once at startup (feature detection, not
//! user-agent sniffing). The controller branches only on these booleans.

use derive_setters::Setters;
use reel_core::SourceKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Setters)]
#[setters(prefix = "with_")]
pub struct RuntimeCapabilities {
    /// The playback element can play adaptive manifests on its own.
    pub native_adaptive_playback: bool,
    /// An adaptive streaming engine can run in this runtime.
    pub adaptive_engine: bool,
    /// The element offers per-frame presentation callbacks.
    pub frame_callbacks: bool,
    /// Use native playback whenever available, even if the engine could run.
    pub prefer_native: bool,
}

/// How a source ends up on the playback element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackPath {
    /// Source URL assigned to the element directly.
    Direct,
    /// Adaptive manifest played by the element itself; no level control.
    Native,
    /// Adaptive engine attached to the element.
    Engine,
}

impl RuntimeCapabilities {
    /// Choose the playback path for a source.
    ///
    /// Adaptive sources use the engine when it can run (it is the only path
    /// with starting-level control), native playback when the engine cannot
    /// run or `prefer_native` is set, and a direct assignment as last resort.
    pub fn resolve_path(&self, kind: SourceKind, engine_available: bool) -> PlaybackPath {
        match kind {
            SourceKind::Direct => PlaybackPath::Direct,
            SourceKind::Adaptive => {
                let engine = self.adaptive_engine && engine_available;
                if self.native_adaptive_playback && (self.prefer_native || !engine) {
                    PlaybackPath::Native
                } else if engine {
                    PlaybackPath::Engine
                } else {
                    PlaybackPath::Direct
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("direct_source", SourceKind::Direct, true, true, false, true, PlaybackPath::Direct)]
    #[case("engine_only", SourceKind::Adaptive, false, true, false, true, PlaybackPath::Engine)]
    #[case("both_prefers_engine", SourceKind::Adaptive, true, true, false, true, PlaybackPath::Engine)]
    #[case("both_prefer_native", SourceKind::Adaptive, true, true, true, true, PlaybackPath::Native)]
    #[case("native_only", SourceKind::Adaptive, true, false, false, true, PlaybackPath::Native)]
    #[case("no_factory", SourceKind::Adaptive, true, true, false, false, PlaybackPath::Native)]
    #[case("nothing", SourceKind::Adaptive, false, false, false, false, PlaybackPath::Direct)]
    fn path_resolution(
        #[case] _name: &str,
        #[case] kind: SourceKind,
        #[case] native: bool,
        #[case] engine: bool,
        #[case] prefer_native: bool,
        #[case] factory: bool,
        #[case] expected: PlaybackPath,
    ) {
        let caps = RuntimeCapabilities::default()
            .with_native_adaptive_playback(native)
            .with_adaptive_engine(engine)
            .with_prefer_native(prefer_native);
        assert_eq!(caps.resolve_path(kind, factory), expected);
    }
}
