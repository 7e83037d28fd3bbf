//! Registry of running cancellable effects.
//!
//! Every task spawned under an [`EffectId`] is tracked here until it finishes.
//! Cancelling an id aborts all of its tasks; dropping an aborted task drops
//! the future or stream it was driving, which releases whatever resource that
//! future held (an open WebSocket, for instance).

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tasksync_core::effect::EffectId;
use tokio::task::{AbortHandle, JoinHandle};

type Entries = HashMap<EffectId, Vec<(u64, AbortHandle)>>;

#[derive(Debug, Default)]
pub(crate) struct CancellationRegistry {
    tasks: Mutex<Entries>,
    next_key: AtomicU64,
}

impl CancellationRegistry {
    /// Spawn a task and register it under `id`.
    ///
    /// The lock is held across the spawn so the task cannot deregister
    /// itself before it has been registered. `spawn` receives the key the
    /// task must pass to [`Self::finish`] when it completes.
    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    pub(crate) fn spawn_registered<F>(&self, id: &EffectId, spawn: F)
    where
        F: FnOnce(u64) -> JoinHandle<()>,
    {
        let key = self.next_key.fetch_add(1, Ordering::Relaxed);
        let mut tasks = self.tasks.lock().unwrap();
        let handle = spawn(key);
        tasks
            .entry(id.clone())
            .or_default()
            .push((key, handle.abort_handle()));
    }

    /// Deregister a task that ran to completion.
    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    pub(crate) fn finish(&self, id: &EffectId, key: u64) {
        let mut tasks = self.tasks.lock().unwrap();
        if let Some(entries) = tasks.get_mut(id) {
            entries.retain(|(k, _)| *k != key);
            if entries.is_empty() {
                tasks.remove(id);
            }
        }
    }

    /// Abort every task registered under `id`. Returns how many were aborted.
    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    pub(crate) fn cancel(&self, id: &EffectId) -> usize {
        let entries = self.tasks.lock().unwrap().remove(id).unwrap_or_default();
        for (_, handle) in &entries {
            handle.abort();
        }
        entries.len()
    }

    /// Abort everything. Returns how many tasks were aborted.
    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    pub(crate) fn cancel_all(&self) -> usize {
        let drained: Entries = std::mem::take(&mut *self.tasks.lock().unwrap());
        let mut count = 0;
        for (_, handle) in drained.values().flatten() {
            handle.abort();
            count += 1;
        }
        count
    }

    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    pub(crate) fn is_active(&self, id: &EffectId) -> bool {
        self.tasks.lock().unwrap().contains_key(id)
    }
}
