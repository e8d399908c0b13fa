//! Teardown state shared by the view and its background work.

use std::sync::atomic::{AtomicU8, Ordering};

use tokio_util::sync::CancellationToken;

/// Phase of the owning view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecyclePhase {
    Live = 0,
    TearingDown = 1,
    Dead = 2,
}

impl LifecyclePhase {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Live,
            1 => Self::TearingDown,
            _ => Self::Dead,
        }
    }
}

/// `Live → TearingDown → Dead`, checked atomically.
///
/// Every deferred continuation (fetch completion, animation settle, timer
/// tick) checks [`Lifecycle::is_live`] before touching view state. The
/// cancellation token is the parent of every fetch task's token, so
/// beginning teardown aborts all of them at once.
#[derive(Debug)]
pub struct Lifecycle {
    phase: AtomicU8,
    token: CancellationToken,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(LifecyclePhase::Live as u8),
            token: CancellationToken::new(),
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        LifecyclePhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn is_live(&self) -> bool {
        self.phase() == LifecyclePhase::Live
    }

    /// Token for a new piece of background work.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Move from `Live` to `TearingDown`. Only the first caller gets `true`;
    /// every later or concurrent call is a no-op.
    pub fn begin_teardown(&self) -> bool {
        let won = self
            .phase
            .compare_exchange(
                LifecyclePhase::Live as u8,
                LifecyclePhase::TearingDown as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if won {
            self.token.cancel();
        }
        won
    }

    /// Final state once teardown has released everything.
    pub fn finish_teardown(&self) {
        self.phase
            .store(LifecyclePhase::Dead as u8, Ordering::Release);
    }
}
