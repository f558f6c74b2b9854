//! Per-entity serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

type LockTable = Arc<StdMutex<HashMap<Uuid, Arc<Mutex<()>>>>>;

/// One async mutex per entity id.
///
/// Payroll operations key it by period id, attendance operations by record
/// id. Whoever holds an id's guard is the only operation in flight for that
/// id. Entries are removed once the last holder or waiter lets go, so the
/// table only grows with the number of ids in use at the same time.
#[derive(Debug, Clone, Default)]
pub struct KeyedLocks {
    locks: LockTable,
}

/// Held while an operation owns its key. Dropping it releases the key.
#[derive(Debug)]
pub struct KeyGuard {
    key: Uuid,
    locks: LockTable,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and returns the guard for `key`.
    pub async fn acquire(&self, key: Uuid) -> KeyGuard {
        let lock = Arc::clone(table(&self.locks).entry(key).or_default());
        let guard = lock.lock_owned().await;
        KeyGuard {
            key,
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or waited on.
    pub fn len(&self) -> usize {
        table(&self.locks).len()
    }

    /// Whether no key is held or waited on.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = table(&self.locks);
        // Only the table still references the mutex: nobody holds or awaits it.
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.key);
        }
    }
}

// The table is only touched in short synchronous sections that cannot leave
// it half-updated, so a poisoned lock is still usable.
fn table(locks: &LockTable) -> MutexGuard<'_, HashMap<Uuid, Arc<Mutex<()>>>> {
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}
