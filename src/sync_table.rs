//! SyncTable: a `Table` behind one table-wide mutex.
//!
//! Every wrapped operation holds the lock for its whole duration. Batches
//! and traversals go through `lock`, whose guard derefs to the table and
//! releases the lock when dropped; iterators borrow the guard and so cannot
//! outlive it.

use crate::error::TableError;
use crate::policy::{BinaryEq, Djb2, KeyEq, KeyHash};
use crate::reentrancy::{LockOwner, OwnerClaim};
use crate::table::Table;
use core::ops::{Deref, DerefMut};
use parking_lot::{Mutex, MutexGuard};

pub struct SyncTable<'k, V, H = Djb2, E = BinaryEq> {
    table: Mutex<Table<'k, V, H, E>>,
    owner: LockOwner,
}

/// Exclusive access to the table of a `SyncTable`.
pub struct TableGuard<'a, 'k, V, H, E> {
    // Released before the mutex so the owner slot is clear by the time
    // another thread can get in.
    _claim: OwnerClaim<'a>,
    table: MutexGuard<'a, Table<'k, V, H, E>>,
}

impl<'a, 'k, V, H, E> TableGuard<'a, 'k, V, H, E> {
    /// Releases the lock; same as dropping the guard.
    pub fn unlock(self) {}
}

impl<'a, 'k, V, H, E> Deref for TableGuard<'a, 'k, V, H, E> {
    type Target = Table<'k, V, H, E>;

    fn deref(&self) -> &Self::Target {
        &self.table
    }
}

impl<'a, 'k, V, H, E> DerefMut for TableGuard<'a, 'k, V, H, E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.table
    }
}

impl<'k, V> SyncTable<'k, V> {
    pub fn new() -> Self {
        Self::from_table(Table::new())
    }
}

impl<'k, V> Default for SyncTable<'k, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'k, V, H, E> SyncTable<'k, V, H, E> {
    pub fn from_table(table: Table<'k, V, H, E>) -> Self {
        Self {
            table: Mutex::new(table),
            owner: LockOwner::new(),
        }
    }

    /// Blocks until the table is free and returns a guard over it.
    ///
    /// The lock is not reentrant: locking again on the same thread while a
    /// guard is alive deadlocks (and panics in debug builds).
    pub fn lock(&self) -> TableGuard<'_, 'k, V, H, E> {
        self.owner.ensure_not_held();
        let table = self.table.lock();
        TableGuard {
            _claim: self.owner.claim(),
            table,
        }
    }

    pub fn into_inner(self) -> Table<'k, V, H, E> {
        self.table.into_inner()
    }

    pub fn key_count(&self) -> u32 {
        self.lock().key_count()
    }

    pub fn bucket_count(&self) -> u32 {
        self.lock().bucket_count()
    }
}

impl<'k, V, H, E> SyncTable<'k, V, H, E>
where
    H: KeyHash,
    E: KeyEq,
{
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        Q: AsRef<[u8]> + ?Sized,
        V: Clone,
    {
        self.lock().get(key).cloned()
    }

    /// Runs `f` on the value under the lock.
    pub fn get_with<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        Q: AsRef<[u8]> + ?Sized,
        F: FnOnce(&V) -> R,
    {
        self.lock().get(key).map(f)
    }

    pub fn has_key<Q>(&self, key: &Q) -> bool
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        self.lock().has_key(key)
    }

    pub fn put<Q>(&self, key: &'k Q, value: V) -> Result<(), TableError>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        self.lock().put(key, value)
    }

    pub fn replace<Q>(&self, key: &'k Q, value: V) -> Result<Option<V>, TableError>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        self.lock().replace(key, value)
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        self.lock().remove(key)
    }

    pub fn resize(&self, requested: u32) -> Result<(), TableError> {
        self.lock().resize(requested)
    }
}
