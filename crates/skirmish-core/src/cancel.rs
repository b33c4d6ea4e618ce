//! Cooperative cancellation for presentation waits.
//!
//! Waits hold a clone of the battle's [`CancellationToken`]. Cancelling the
//! token reaches every clone; bound waits report [`WaitStatus::Cancelled`] on
//! their next tick and the caller abandons the step it was waiting for.
//!
//! ```
//! use skirmish_core::cancel::{CancellationToken, PresentationWait, WaitStatus};
//!
//! let token = CancellationToken::new();
//! let mut wait = PresentationWait::new(0.5, token.clone());
//!
//! assert_eq!(wait.tick(0.2), WaitStatus::Pending);
//! token.cancel();
//! assert_eq!(wait.tick(0.2), WaitStatus::Cancelled);
//! ```

pub use tokio_util::sync::CancellationToken;

/// Progress of a [`PresentationWait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    /// Time remains.
    Pending,
    /// The full duration elapsed.
    Finished,
    /// The scope was cancelled first.
    Cancelled,
}

/// Countdown timer advanced by frame time.
#[derive(Debug, Clone)]
pub struct PresentationWait {
    remaining: f32,
    token: CancellationToken,
}

impl PresentationWait {
    /// Creates a wait of `seconds` bound to `token`.
    #[must_use]
    pub fn new(seconds: f32, token: CancellationToken) -> Self {
        Self {
            remaining: seconds.max(0.0),
            token,
        }
    }

    /// Advances by `dt` seconds. Cancellation wins over completion.
    pub fn tick(&mut self, dt: f32) -> WaitStatus {
        if self.token.is_cancelled() {
            return WaitStatus::Cancelled;
        }
        self.remaining = (self.remaining - dt.max(0.0)).max(0.0);
        if self.remaining <= 0.0 {
            WaitStatus::Finished
        } else {
            WaitStatus::Pending
        }
    }

    /// Seconds left.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }
}
