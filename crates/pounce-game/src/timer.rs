//! Cancellable timer handles.
//!
//! Every background delay in a room — the turn timeout and its warning —
//! is owned through a [`TimerHandle`] stored on the game, so each schedule
//! has exactly one cancel path. The spawned task holds the paired
//! [`CancelSignal`] and must exit without effect once it resolves.
//!
//! Cancellation is dropping: replacing the stored handle (re-arming the
//! timer) or dropping the whole game cancels the old task. There is no way
//! to leak a stale timer.

use tokio::sync::oneshot;

/// Owner side of a scheduled timer. Dropping it cancels the timer task.
#[derive(Debug)]
pub struct TimerHandle {
    cancel: Option<oneshot::Sender<()>>,
}

impl TimerHandle {
    /// Creates a linked handle/signal pair.
    pub fn pair() -> (TimerHandle, CancelSignal) {
        let (tx, rx) = oneshot::channel();
        (TimerHandle { cancel: Some(tx) }, CancelSignal { rx })
    }

    /// Cancels the paired task explicitly. Equivalent to dropping.
    pub fn cancel(self) {
        // Drop impl does the work.
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.cancel.take() {
            // The task may already have finished; either way is fine.
            let _ = tx.send(());
        }
    }
}

/// Task side of a scheduled timer.
#[derive(Debug)]
pub struct CancelSignal {
    rx: oneshot::Receiver<()>,
}

impl CancelSignal {
    /// Resolves when the paired [`TimerHandle`] is cancelled or dropped.
    ///
    /// Cancel-safe: intended for repeated use across `tokio::select!`
    /// stages (warning, then timeout). Must not be polled again after it
    /// has resolved.
    pub async fn cancelled(&mut self) {
        // Err means the sender was dropped without an explicit send —
        // same meaning for us.
        let _ = (&mut self.rx).await;
    }

    /// Non-blocking cancellation check, for the timeout task to re-check
    /// after it has acquired the room lock: a play that squeaked in while
    /// the task was waiting on the lock has already cancelled it.
    pub fn is_cancelled(&mut self) -> bool {
        use tokio::sync::oneshot::error::TryRecvError;
        !matches!(self.rx.try_recv(), Err(TryRecvError::Empty))
    }
}
