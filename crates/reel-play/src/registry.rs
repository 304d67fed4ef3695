use std::{
    fmt,
    sync::{Arc, Weak},
};

use parking_lot::Mutex;
use reel_core::ControllerId;
use tracing::debug;

/// Something the registry can pause when another member starts playing.
pub trait Preemptible: Send + Sync {
    fn controller_id(&self) -> ControllerId;

    /// Stop playback because another member of the group took over.
    fn preempt(&self);
}

struct Claim {
    id: ControllerId,
    holder: Weak<dyn Preemptible>,
}

/// Single-flight playback group.
///
/// Holds a non-owning reference to at most one playing member. Cloning
/// shares the slot; separate registries form independent groups.
#[derive(Clone, Default)]
pub struct PlaybackRegistry {
    current: Arc<Mutex<Option<Claim>>>,
}

impl PlaybackRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `member` current, preempting the previous holder.
    ///
    /// The previous holder is preempted after the slot lock is dropped, so
    /// its pause handler may call back into the registry. Returns the id of
    /// the preempted member.
    pub fn claim(&self, member: &Arc<dyn Preemptible>) -> Option<ControllerId> {
        let id = member.controller_id();
        let previous = self.current.lock().replace(Claim {
            id,
            holder: Arc::downgrade(member),
        });

        let previous = previous.filter(|claim| claim.id != id)?;
        debug!(claimed = %id, preempted = %previous.id, "registry claim");
        if let Some(holder) = previous.holder.upgrade() {
            holder.preempt();
        }
        Some(previous.id)
    }

    /// Clear the slot if `id` holds it.
    pub fn release(&self, id: ControllerId) -> bool {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|claim| claim.id == id) {
            *current = None;
            debug!(released = %id, "registry release");
            true
        } else {
            false
        }
    }

    /// Id of the current holder. A holder that has been dropped is cleared.
    pub fn current(&self) -> Option<ControllerId> {
        let mut current = self.current.lock();
        match current.as_ref() {
            Some(claim) if claim.holder.strong_count() > 0 => Some(claim.id),
            Some(_) => {
                *current = None;
                None
            }
            None => None,
        }
    }

    pub fn is_current(&self, id: ControllerId) -> bool {
        self.current() == Some(id)
    }
}

impl fmt::Debug for PlaybackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackRegistry")
            .field("current", &self.current())
            .finish()
    }
}
