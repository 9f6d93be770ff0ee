use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

/// Observable state holder shared between a state machine and its renderers.
///
/// Writers may be bound to an epoch: once [`StateCell::begin_epoch`] has been
/// called again, writes tagged with an older epoch are dropped. The epoch
/// check and the write happen under one lock, so after `begin_epoch` returns
/// no stale writer can publish.
pub struct StateCell<T> {
    tx: watch::Sender<T>,
    epoch: Mutex<u64>,
}

impl<T> StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            tx,
            epoch: Mutex::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Invalidates every writer bound to an earlier epoch.
    pub fn begin_epoch(&self) -> u64 {
        let mut epoch = self.lock_epoch();
        *epoch += 1;
        *epoch
    }

    /// Publishes `value` if `epoch` is still current. Returns whether it was published.
    pub fn set_in_epoch(&self, epoch: u64, value: T) -> bool {
        let current = self.lock_epoch();
        if *current != epoch {
            return false;
        }
        self.tx.send_replace(value);
        true
    }

    pub fn set(&self, value: T) {
        let _guard = self.lock_epoch();
        self.tx.send_replace(value);
    }

    /// Applies `modify` atomically; observers are only notified when it returns `true`.
    pub fn update(&self, modify: impl FnOnce(&mut T) -> bool) -> bool {
        let _guard = self.lock_epoch();
        self.tx.send_if_modified(modify)
    }

    fn lock_epoch(&self) -> MutexGuard<'_, u64> {
        self.epoch.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for StateCell<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}
