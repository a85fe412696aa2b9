//! Cross-view refresh signal.
//!
//! Every successful mutation of a visit payment, an expense or a manual
//! deposit bumps a generation counter. Views holding a
//! [`RefreshSubscription`] notice the bump and re-fetch their data; the new
//! data itself is never pushed through the channel.
//!
//! One coordinator lives for one operator session. It starts at generation 0
//! and is never persisted, so a restart behaves like a fresh session.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Which mutation source fired the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    VisitPayment,
    Expense,
    ManualDeposit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSignal {
    pub generation: u64,
    pub reason: Option<RefreshReason>,
}

#[derive(Clone)]
pub struct RefreshCoordinator {
    sender: Arc<watch::Sender<RefreshSignal>>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(RefreshSignal {
            generation: 0,
            reason: None,
        });
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Announce a completed mutation and return the new generation
    pub fn notify(&self, reason: RefreshReason) -> u64 {
        let mut generation = 0;
        // send_modify succeeds even when no view is subscribed yet
        self.sender.send_modify(|signal| {
            signal.generation = signal.generation.wrapping_add(1);
            signal.reason = Some(reason);
            generation = signal.generation;
        });
        debug!("Refresh signal {} fired by {:?}", generation, reason);
        generation
    }

    pub fn generation(&self) -> u64 {
        self.sender.borrow().generation
    }

    /// Subscribe a view. The current generation counts as already seen.
    pub fn subscribe(&self) -> RefreshSubscription {
        RefreshSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// A view's handle on the refresh signal
pub struct RefreshSubscription {
    receiver: watch::Receiver<RefreshSignal>,
}

impl RefreshSubscription {
    /// True when a mutation happened since the last `mark_seen`/`changed`
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    pub fn mark_seen(&mut self) -> RefreshSignal {
        *self.receiver.borrow_and_update()
    }

    /// Wait for the next mutation. Returns `None` once the coordinator is gone.
    pub async fn changed(&mut self) -> Option<RefreshSignal> {
        self.receiver.changed().await.ok()?;
        Some(*self.receiver.borrow_and_update())
    }
}
