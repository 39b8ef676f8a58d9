//! Defines a cloneable cancellation signal shared between a running task and its owner.

use std::sync::Arc;

use tokio::sync::watch;

/// A cloneable token used to request a long-running operation (such as a sweep) to stop.
///
/// All clones observe the same signal: cancelling one cancels them all. Cancellation is
/// permanent.
#[derive(Clone, Debug)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation: wakes up every task waiting on [`Self::cancelled()`].
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Checks whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Waits until cancellation is requested (returns right away if it already was).
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        // The sender lives as long as `self`: waiting cannot fail on a closed channel.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}
