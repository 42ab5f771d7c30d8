//! Capacity schedule: bucket counts are always drawn from a fixed list of
//! primes, roughly doubling from one step to the next.

use crate::error::TableError;

/// Every bucket count a table may have, ascending.
pub const PRIMES: [u32; 26] = [
    53, 97, 193, 389, 769, 1543, 3079, 6151, 12289, 24593, 49157, 98317, 196613, 393241, 786433,
    1572869, 3145739, 6291469, 12582917, 25165843, 50331653, 100663319, 201326611, 402653189,
    805306457, 1610612741,
];

/// Largest capacity on the schedule.
pub const MAX_CAPACITY: u32 = PRIMES[PRIMES.len() - 1];

/// Smallest scheduled prime `>= requested`, or the ceiling if none is.
pub fn capacity_for(requested: u32) -> u32 {
    PRIMES
        .iter()
        .copied()
        .find(|&p| requested <= p)
        .unwrap_or(MAX_CAPACITY)
}

/// Schedule successor of `current`, `None` at the ceiling.
pub fn next_capacity(current: u32) -> Option<u32> {
    PRIMES.iter().copied().find(|&p| p > current)
}

/// Live-key count at which the next insertion grows the table.
pub fn resize_threshold(bucket_count: u32, load_factor: f32) -> u32 {
    (f64::from(bucket_count) * f64::from(load_factor)).floor() as u32
}

/// Picks the bucket count a resize from `current` to `requested` lands on.
///
/// Once a table sits at the ceiling, any request that maps back onto the
/// ceiling is refused.
pub fn plan_resize(current: u32, requested: u32) -> Result<u32, TableError> {
    let target = capacity_for(requested);
    if target == MAX_CAPACITY && current == MAX_CAPACITY {
        return Err(TableError::CapacityExhausted { capacity: current });
    }
    Ok(target)
}
