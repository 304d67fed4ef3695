use std::time::Duration;

/// Deduplicates loop restarts near the end of a clip.
///
/// The position watcher may fire several times inside the end window before
/// the seek back to zero lands. The guard fires once per entry into the
/// window and re-arms only after a position outside it is observed. A natural
/// end is only suppressed while a restart is still in flight.
#[derive(Clone, Debug)]
pub(crate) struct LoopRestartGuard {
    armed: bool,
    restarting: bool,
    epsilon: Duration,
}

impl LoopRestartGuard {
    pub(crate) fn new(epsilon: Duration) -> Self {
        Self {
            armed: true,
            restarting: false,
            epsilon,
        }
    }

    /// Returns `true` when a restart should happen now.
    pub(crate) fn observe(&mut self, position: Duration, duration: Option<Duration>) -> bool {
        let Some(duration) = duration.filter(|d| !d.is_zero()) else {
            return false;
        };

        let in_window = position >= duration.saturating_sub(self.epsilon);
        if !in_window {
            self.armed = true;
            return false;
        }

        if self.restarting || !std::mem::replace(&mut self.armed, false) {
            return false;
        }
        self.restarting = true;
        true
    }

    /// A natural end event. Ignored while a restart is in flight.
    pub(crate) fn on_natural_end(&mut self) -> bool {
        if self.restarting {
            return false;
        }
        self.armed = false;
        self.restarting = true;
        true
    }

    /// The restart's play request resolved, either way.
    pub(crate) fn restart_finished(&mut self) {
        self.restarting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: Duration = Duration::from_millis(250);
    const DURATION: Option<Duration> = Some(Duration::from_secs(10));

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn fires_once_inside_window() {
        let mut guard = LoopRestartGuard::new(EPS);
        assert!(!guard.observe(ms(5_000), DURATION));
        assert!(guard.observe(ms(9_800), DURATION));
        assert!(!guard.observe(ms(9_850), DURATION));
        assert!(!guard.observe(ms(10_000), DURATION));
    }

    #[test]
    fn rearms_after_leaving_window() {
        let mut guard = LoopRestartGuard::new(EPS);
        assert!(guard.observe(ms(9_900), DURATION));
        guard.restart_finished();
        assert!(!guard.observe(ms(0), DURATION));
        assert!(guard.observe(ms(9_900), DURATION));
    }

    #[test]
    fn unknown_duration_never_fires() {
        let mut guard = LoopRestartGuard::new(EPS);
        assert!(!guard.observe(ms(9_900), None));
        assert!(!guard.observe(ms(0), Some(Duration::ZERO)));
    }

    #[test]
    fn natural_end_after_watcher_restart_is_ignored() {
        let mut guard = LoopRestartGuard::new(EPS);
        assert!(guard.observe(ms(9_900), DURATION));
        assert!(!guard.on_natural_end());
        guard.restart_finished();
        assert!(!guard.observe(ms(100), DURATION));
        assert!(guard.on_natural_end());
    }

    #[test]
    fn every_natural_end_loops_once_restart_finishes() {
        let mut guard = LoopRestartGuard::new(EPS);
        for _ in 0..3 {
            assert!(guard.on_natural_end());
            assert!(!guard.on_natural_end());
            guard.restart_finished();
        }
    }

    #[test]
    fn watcher_stays_quiet_until_position_leaves_window() {
        let mut guard = LoopRestartGuard::new(EPS);
        assert!(guard.on_natural_end());
        guard.restart_finished();
        assert!(!guard.observe(ms(9_900), DURATION));
        assert!(!guard.observe(ms(200), DURATION));
        assert!(guard.observe(ms(9_900), DURATION));
    }
}
