//! Per-attach teardown.

use tokio_util::sync::CancellationToken;
use tracing::trace;

type Action = Box<dyn FnOnce() + Send>;

/// Owns everything one attach cycle acquired.
///
/// Timers observe [`token`](Self::token); acquired resources register an
/// undo action with [`defer`](Self::defer). [`dispose`](Self::dispose)
/// cancels the token and runs the actions in reverse order, exactly once.
pub(crate) struct Disposer {
    token: CancellationToken,
    actions: Vec<Action>,
    disposed: bool,
}

impl Disposer {
    pub(crate) fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            actions: Vec::new(),
            disposed: false,
        }
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Register an undo action. Runs immediately when already disposed.
    pub(crate) fn defer(&mut self, action: impl FnOnce() + Send + 'static) {
        if self.disposed {
            action();
        } else {
            self.actions.push(Box::new(action));
        }
    }

    /// Returns the number of actions run; zero on repeated calls.
    pub(crate) fn dispose(&mut self) -> usize {
        if self.disposed {
            return 0;
        }
        self.disposed = true;
        self.token.cancel();

        let count = self.actions.len();
        while let Some(action) = self.actions.pop() {
            action();
        }
        trace!(count, "disposer ran");
        count
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.dispose();
    }
}
