use std::sync::Arc;

use derivative::Derivative;
use derive_setters::Setters;
use reel_events::EventBus;
use reel_thumb::ThumbnailResolver;

use crate::{capabilities::RuntimeCapabilities, registry::PlaybackRegistry, traits::engine::EngineFactory};

/// Shared collaborators handed to every controller of a page.
///
/// Cloning shares the bus, the registry and the engine factory.
#[derive(Clone, Default, Derivative, Setters)]
#[derivative(Debug)]
#[setters(prefix = "with_", strip_option)]
pub struct PlaybackEnv {
    pub capabilities: RuntimeCapabilities,
    #[derivative(Debug = "ignore")]
    pub engines: Option<Arc<dyn EngineFactory>>,
    /// Controllers without a registry never preempt each other.
    pub registry: Option<PlaybackRegistry>,
    pub bus: EventBus,
    pub thumbnails: ThumbnailResolver,
}

impl PlaybackEnv {
    pub fn has_engine(&self) -> bool {
        self.engines.is_some()
    }
}
