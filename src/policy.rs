//! Hash and equality policies over raw key bytes.
//!
//! A table is parameterized by one `KeyHash` and one `KeyEq`, fixed at
//! construction. Plain functions with the right signature implement both
//! traits, so `fn(&[u8]) -> u32` can be handed in directly.

/// Computes the 32-bit hash code cached in every bucket.
pub trait KeyHash {
    fn hash(&self, key: &[u8]) -> u32;
}

/// Decides whether a stored key and a query key name the same entry.
///
/// Only consulted for buckets whose cached hash already matches the query.
pub trait KeyEq {
    fn eq(&self, stored: &[u8], query: &[u8]) -> bool;
}

/// The djb2 byte hash: `h = 5381; h = h * 33 + b` over wrapping `u32`.
#[inline]
pub fn djb2(bytes: &[u8]) -> u32 {
    bytes.iter().fold(5381u32, |h, &b| {
        (h << 5).wrapping_add(h).wrapping_add(u32::from(b))
    })
}

/// Default hash policy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Djb2;

impl KeyHash for Djb2 {
    #[inline]
    fn hash(&self, key: &[u8]) -> u32 {
        djb2(key)
    }
}

/// Default equality policy: same length and same bytes.
#[derive(Copy, Clone, Debug, Default)]
pub struct BinaryEq;

impl KeyEq for BinaryEq {
    #[inline]
    fn eq(&self, stored: &[u8], query: &[u8]) -> bool {
        stored == query
    }
}

impl KeyHash for fn(&[u8]) -> u32 {
    #[inline]
    fn hash(&self, key: &[u8]) -> u32 {
        self(key)
    }
}

impl KeyEq for fn(&[u8], &[u8]) -> bool {
    #[inline]
    fn eq(&self, stored: &[u8], query: &[u8]) -> bool {
        self(stored, query)
    }
}
