//! Debug-only detection of nested locking.
//!
//! `SyncTable` guards its table with a non-reentrant mutex, so a thread
//! that locks it twice (directly, or from inside a hash or equality policy
//! running under the lock) would deadlock. In debug builds the owning
//! thread is recorded and a nested attempt panics instead. In release
//! builds, this compiles to a zero-cost no-op.

#[cfg(not(debug_assertions))]
use core::marker::PhantomData;
#[cfg(debug_assertions)]
use parking_lot::Mutex;
#[cfg(debug_assertions)]
use std::thread::{self, ThreadId};

/// Per-lock owner tracker. Check with `ensure_not_held` before blocking on
/// the guarded mutex, then `claim` once it is acquired.
#[derive(Debug, Default)]
pub(crate) struct LockOwner {
    #[cfg(debug_assertions)]
    thread: Mutex<Option<ThreadId>>,
}

impl LockOwner {
    pub(crate) fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            thread: Mutex::new(None),
        }
    }

    /// Panics in debug builds if the current thread already owns the lock.
    #[inline]
    pub(crate) fn ensure_not_held(&self) {
        #[cfg(debug_assertions)]
        {
            let owner = *self.thread.lock();
            assert!(
                owner != Some(thread::current().id()),
                "nested lock on a SyncTable by the thread already holding it"
            );
        }
    }

    /// Records the current thread as owner until the claim is dropped.
    #[inline]
    pub(crate) fn claim(&self) -> OwnerClaim<'_> {
        #[cfg(debug_assertions)]
        {
            *self.thread.lock() = Some(thread::current().id());
            return OwnerClaim { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return OwnerClaim { _z: PhantomData };
        }
    }
}

/// RAII claim returned by `LockOwner::claim`.
pub(crate) struct OwnerClaim<'a> {
    #[cfg(debug_assertions)]
    owner: &'a LockOwner,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for OwnerClaim<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            *self.owner.thread.lock() = None;
        }
    }
}
