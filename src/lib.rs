//! chain-table: a separate-chaining hash table over borrowed byte keys,
//! sized along a fixed schedule of primes.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small associative table whose keys are caller-owned byte
//!   strings, with pluggable hashing and equality and a predictable
//!   growth schedule.
//! - Layers:
//!   - `policy`: `KeyHash`/`KeyEq` traits plus the defaults (djb2 and
//!     strict byte equality).
//!   - `schedule`: the 26 scheduled primes (53 .. 1_610_612_741) and the
//!     load-factor threshold arithmetic.
//!   - `Table<'k, V, H, E>`: bucket array of chains, nodes in a `SlotMap`
//!     arena, get/put/replace/remove/resize.
//!   - `Cursor`/`Iter`: forward traversal, slot by slot, chain by chain.
//!   - `SyncTable<'k, V, H, E>`: the same table behind one mutex, with a
//!     scoped `TableGuard` for batches and iteration.
//!
//! Constraints
//! - Keys are `&'k [u8]`; the table never copies them. Values are moved
//!   in as `V`, so `V = &'v T` keeps them borrowed too.
//! - Bucket counts only ever take values from the prime schedule.
//! - `resize_count = floor(bucket_count * load_factor)`, recomputed after
//!   every resize. `put` grows by one schedule step when the key count
//!   equals it.
//! - No background work: every operation runs to completion on the
//!   calling thread.
//!
//! Duplicate keys
//! - `put` appends to the tail of the chain without checking for an equal
//!   key, so the same key may be stored more than once. `get`, `has_key`
//!   and `remove` always resolve to the oldest such entry. `replace` is
//!   the overwrite-in-place alternative.
//!
//! Hasher and rehashing invariants
//! - Each bucket stores its `u32` hash; lookups compare it before calling
//!   `KeyEq`, and resizing reuses it, so `KeyHash` runs once per put and
//!   once per lookup, never during a resize.
//! - Resizing relinks existing nodes into a freshly allocated bucket
//!   array, tail-appending so that entries sharing a chain keep their
//!   order. The new array is reserved before anything is touched; if
//!   that fails the table is unchanged.
//!
//! Capacity ceiling
//! - Once at 1_610_612_741 buckets further growth is refused with
//!   `TableError::CapacityExhausted`. Automatic growth in `put` treats
//!   this as non-fatal: the table keeps accepting keys and chains simply
//!   get longer.
//!
//! Locking
//! - `SyncTable` holds one coarse, non-reentrant lock per operation.
//!   Iteration requires `lock()`; the iterator borrows the guard, so it
//!   cannot be used after the lock is released. Debug builds turn a nested
//!   lock from the owning thread into a panic instead of a deadlock.
//!
//! Logging
//! - Resizes are reported through the `log` facade at debug level; table
//!   creation at trace level. The crate installs no logger.

mod config;
mod cursor;
mod error;
pub mod policy;
mod reentrancy;
pub mod schedule;
mod sync_table;
mod table;
mod table_proptest;

// Public surface
pub use config::{TableConfig, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR};
pub use cursor::{Cursor, Iter};
pub use error::TableError;
pub use policy::{djb2, BinaryEq, Djb2, KeyEq, KeyHash};
pub use sync_table::{SyncTable, TableGuard};
pub use table::Table;
