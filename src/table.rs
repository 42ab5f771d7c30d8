//! Table: separate-chaining storage over borrowed byte keys.
//!
//! Chains are singly linked lists of buckets kept in a `SlotMap` arena;
//! each slot of the bucket array records the head and tail of its chain.

use crate::config::{TableConfig, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR};
use crate::cursor::{Cursor, Iter};
use crate::error::TableError;
use crate::policy::{BinaryEq, Djb2, KeyEq, KeyHash};
use crate::schedule;
use core::fmt;
use core::mem;
use slotmap::{DefaultKey, SlotMap};

/// One stored entry.
#[derive(Debug)]
pub(crate) struct Bucket<'k, V> {
    pub(crate) key: &'k [u8],
    pub(crate) value: V,
    pub(crate) hash: u32,
    pub(crate) next: Option<DefaultKey>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Chain {
    pub(crate) head: Option<DefaultKey>,
    pub(crate) tail: Option<DefaultKey>,
}

/// Position of a matching bucket inside its chain.
struct Found {
    slot: usize,
    prev: Option<DefaultKey>,
    node: DefaultKey,
}

/// Hash table keyed by borrowed byte strings.
///
/// Keys are held as `&'k [u8]` and never copied. Values are moved in; use
/// `V = &'v T` to keep them borrowed as well.
///
/// `put` appends without looking for an existing equal key, so a key put
/// twice occupies two buckets. Lookups and removals always hit the oldest
/// of them first. `replace` gives overwrite semantics instead.
pub struct Table<'k, V, H = Djb2, E = BinaryEq> {
    pub(crate) chains: Vec<Chain>,
    pub(crate) nodes: SlotMap<DefaultKey, Bucket<'k, V>>,
    hash: H,
    eq: E,
    key_count: u32,
    load_factor: f32,
    resize_count: u32,
}

impl<'k, V> Table<'k, V> {
    /// Default table: 53 buckets, load factor 0.75, djb2, byte equality.
    pub fn new() -> Self {
        Self {
            chains: vec![Chain::default(); DEFAULT_CAPACITY as usize],
            nodes: SlotMap::with_key(),
            hash: Djb2,
            eq: BinaryEq,
            key_count: 0,
            load_factor: DEFAULT_LOAD_FACTOR,
            resize_count: schedule::resize_threshold(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR),
        }
    }
}

impl<'k, V> Default for Table<'k, V> {
    fn default() -> Self {
        Self::new()
    }
}

fn alloc_chains(count: u32) -> Result<Vec<Chain>, TableError> {
    let mut chains = Vec::new();
    chains.try_reserve_exact(count as usize)?;
    chains.resize(count as usize, Chain::default());
    Ok(chains)
}

fn link_tail<V>(
    chains: &mut [Chain],
    nodes: &mut SlotMap<DefaultKey, Bucket<'_, V>>,
    slot: usize,
    node: DefaultKey,
) {
    let chain = &mut chains[slot];
    match chain.tail {
        Some(tail) => nodes[tail].next = Some(node),
        None => chain.head = Some(node),
    }
    chain.tail = Some(node);
}

impl<'k, V, H, E> Table<'k, V, H, E> {
    pub fn key_count(&self) -> u32 {
        self.key_count
    }

    pub fn is_empty(&self) -> bool {
        self.key_count == 0
    }

    pub fn bucket_count(&self) -> u32 {
        self.chains.len() as u32
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Key count at which the next `put` first grows the table.
    pub fn resize_count(&self) -> u32 {
        self.resize_count
    }

    /// Drops every entry and keeps the current bucket count.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.chains.fill(Chain::default());
        self.key_count = 0;
    }

    /// Length of the longest chain.
    pub fn longest_chain(&self) -> usize {
        self.chains
            .iter()
            .map(|chain| {
                let mut len = 0;
                let mut cur = chain.head;
                while let Some(node) = cur {
                    len += 1;
                    cur = self.nodes[node].next;
                }
                len
            })
            .max()
            .unwrap_or(0)
    }

    /// Cursor positioned before the first bucket.
    pub fn cursor(&self) -> Cursor<'_, 'k, V, H, E> {
        Cursor::new(self)
    }

    pub fn iter(&self) -> Iter<'_, 'k, V, H, E> {
        Iter::new(self.cursor(), self.key_count as usize)
    }
}

impl<'k, V, H, E> Table<'k, V, H, E>
where
    H: KeyHash,
    E: KeyEq,
{
    pub fn with_policies(config: TableConfig, hash: H, eq: E) -> Result<Self, TableError> {
        config.validate()?;
        let bucket_count = schedule::capacity_for(config.capacity);
        let chains = alloc_chains(bucket_count)?;
        log::trace!(
            "table created: {bucket_count} buckets, load factor {}",
            config.load_factor
        );
        Ok(Self {
            chains,
            nodes: SlotMap::with_key(),
            hash,
            eq,
            key_count: 0,
            load_factor: config.load_factor,
            resize_count: schedule::resize_threshold(bucket_count, config.load_factor),
        })
    }

    #[inline]
    fn slot(&self, hash: u32) -> usize {
        (hash % self.bucket_count()) as usize
    }

    fn locate(&self, query: &[u8]) -> Option<Found> {
        let hash = self.hash.hash(query);
        let slot = self.slot(hash);
        let mut prev = None;
        let mut cur = self.chains[slot].head;
        while let Some(node) = cur {
            let bucket = &self.nodes[node];
            if bucket.hash == hash && self.eq.eq(bucket.key, query) {
                return Some(Found { slot, prev, node });
            }
            prev = cur;
            cur = bucket.next;
        }
        None
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let found = self.locate(key.as_ref())?;
        Some(&self.nodes[found.node].value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let found = self.locate(key.as_ref())?;
        Some(&mut self.nodes[found.node].value)
    }

    pub fn has_key<Q>(&self, key: &Q) -> bool
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        self.locate(key.as_ref()).is_some()
    }

    /// Appends `key -> value` to the tail of its chain.
    ///
    /// When the key count has reached the resize threshold the table first
    /// tries to grow by one schedule step; a refused growth is not an error
    /// and the entry is stored regardless.
    pub fn put<Q>(&mut self, key: &'k Q, value: V) -> Result<(), TableError>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let key = key.as_ref();
        if self.key_count == self.resize_count {
            self.grow();
        }
        let hash = self.hash.hash(key);
        self.reserve_node()?;
        let node = self.nodes.insert(Bucket {
            key,
            value,
            hash,
            next: None,
        });
        let slot = self.slot(hash);
        link_tail(&mut self.chains, &mut self.nodes, slot, node);
        self.key_count += 1;
        Ok(())
    }

    /// Overwrites the value of the first equal key, or puts a new entry.
    ///
    /// The stored key reference is kept on overwrite.
    pub fn replace<Q>(&mut self, key: &'k Q, value: V) -> Result<Option<V>, TableError>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        if let Some(found) = self.locate(key.as_ref()) {
            let old = mem::replace(&mut self.nodes[found.node].value, value);
            return Ok(Some(old));
        }
        self.put(key, value).map(|()| None)
    }

    /// Unlinks the first bucket matching `key` and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let Found { slot, prev, node } = self.locate(key.as_ref())?;
        let bucket = self.nodes.remove(node)?;
        match prev {
            Some(p) => self.nodes[p].next = bucket.next,
            None => self.chains[slot].head = bucket.next,
        }
        if self.chains[slot].tail == Some(node) {
            self.chains[slot].tail = prev;
        }
        self.key_count -= 1;
        Some(bucket.value)
    }

    /// Rehashes every entry into the scheduled capacity nearest `requested`.
    ///
    /// Entries keep their cached hash and their relative order within a
    /// chain; nodes are relinked, not reallocated. On error the table is
    /// left exactly as it was.
    pub fn resize(&mut self, requested: u32) -> Result<(), TableError> {
        let old_count = self.bucket_count();
        let new_count = schedule::plan_resize(old_count, requested)?;
        let mut chains = alloc_chains(new_count)?;
        for chain in &self.chains {
            let mut cur = chain.head;
            while let Some(node) = cur {
                let bucket = &mut self.nodes[node];
                cur = bucket.next.take();
                let slot = (bucket.hash % new_count) as usize;
                link_tail(&mut chains, &mut self.nodes, slot, node);
            }
        }
        self.chains = chains;
        self.resize_count = schedule::resize_threshold(new_count, self.load_factor);
        log::debug!(
            "table resized: {old_count} -> {new_count} buckets, {} keys",
            self.key_count
        );
        Ok(())
    }

    fn grow(&mut self) {
        let requested = self.bucket_count().saturating_add(1);
        if let Err(e) = self.resize(requested) {
            log::debug!(
                "automatic resize at {} keys refused: {e}",
                self.key_count
            );
        }
    }

    // SlotMap has no fallible reserve, so probe the allocator before letting
    // the arena grow. Best effort only: the arena's slots carry a version
    // word on top of each bucket and its growth may round up, so the probe
    // is sized with a margin rather than to the exact allocation.
    fn reserve_node(&mut self) -> Result<(), TableError> {
        if self.nodes.len() < self.nodes.capacity() {
            return Ok(());
        }
        let additional = self.nodes.capacity().max(16);
        let target = self.nodes.capacity() + additional;
        let mut probe: Vec<(Bucket<'k, V>, u32)> = Vec::new();
        probe.try_reserve_exact(target + target / 8)?;
        drop(probe);
        self.nodes.reserve(additional);
        Ok(())
    }
}

impl<'t, 'k, V, H, E> IntoIterator for &'t Table<'k, V, H, E> {
    type Item = (&'k [u8], &'t V);
    type IntoIter = Iter<'t, 'k, V, H, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

struct KeyBytes<'a>(&'a [u8]);

impl fmt::Debug for KeyBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b\"{}\"", self.0.escape_ascii())
    }
}

impl<'k, V: fmt::Debug, H, E> fmt::Debug for Table<'k, V, H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k, v)| (KeyBytes(k), v)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn zero_hash(_: &[u8]) -> u32 {
        0
    }

    fn colliding<'k>() -> Table<'k, i32, fn(&[u8]) -> u32> {
        TableConfig::new()
            .build_with(zero_hash as fn(&[u8]) -> u32, BinaryEq)
            .unwrap()
    }

    /// Invariant: a fresh table is empty and sized by the defaults.
    #[test]
    fn new_table_defaults() {
        let t: Table<'_, i32> = Table::new();
        assert!(t.is_empty());
        assert_eq!(t.key_count(), 0);
        assert_eq!(t.bucket_count(), 53);
        assert_eq!(t.resize_count(), 39);
        assert_eq!(t.load_factor(), 0.75);
        assert_eq!(t.longest_chain(), 0);
    }

    /// Invariant: `put` then `get` returns the stored value; absent keys miss.
    #[test]
    fn put_get_roundtrip() {
        let mut t = Table::new();
        t.put("alpha", 1).unwrap();
        t.put(b"beta".as_slice(), 2).unwrap();
        assert_eq!(t.get("alpha"), Some(&1));
        assert_eq!(t.get(b"beta"), Some(&2));
        assert_eq!(t.get("gamma"), None);
        assert!(t.has_key("alpha"));
        assert!(!t.has_key("gamma"));
        assert_eq!(t.key_count(), 2);
    }

    /// Invariant: a key that is a strict prefix of a stored key does not match it.
    #[test]
    fn prefix_is_not_equal_under_collision() {
        let mut t = colliding();
        t.put("Key", 1).unwrap();
        t.put("Key1", 2).unwrap();
        assert_eq!(t.get("Key"), Some(&1));
        assert_eq!(t.get("Key1"), Some(&2));
        assert_eq!(t.get("Ke"), None);
        assert_eq!(t.longest_chain(), 2);
    }

    /// Invariant: duplicate puts stack up; the oldest is found and removed first.
    #[test]
    fn duplicate_put_is_first_match_wins() {
        let mut t = Table::new();
        t.put("K", "V1").unwrap();
        t.put("K", "V2").unwrap();
        assert_eq!(t.key_count(), 2);
        assert_eq!(t.get("K"), Some(&"V1"));
        assert_eq!(t.remove("K"), Some("V1"));
        assert_eq!(t.get("K"), Some(&"V2"));
        assert_eq!(t.remove("K"), Some("V2"));
        assert_eq!(t.get("K"), None);
        assert_eq!(t.remove("K"), None);
        assert!(t.is_empty());
    }

    /// Invariant: `replace` overwrites the first match and never adds a bucket.
    #[test]
    fn replace_overwrites() {
        let mut t = Table::new();
        assert_eq!(t.replace("k", 1).unwrap(), None);
        assert_eq!(t.replace("k", 2).unwrap(), Some(1));
        assert_eq!(t.key_count(), 1);
        assert_eq!(t.get("k"), Some(&2));
    }

    /// Invariant: `get_mut` edits are visible to later lookups.
    #[test]
    fn get_mut_updates_value() {
        let mut t = Table::new();
        t.put("k", 10).unwrap();
        *t.get_mut("k").unwrap() += 5;
        assert_eq!(t.get("k"), Some(&15));
        assert!(t.get_mut("missing").is_none());
    }

    /// Invariant: removing from the head, middle and tail of one chain keeps
    /// the rest of the chain reachable and appends still land at the tail.
    #[test]
    fn remove_relinks_chain() {
        let mut t = colliding();
        for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
            t.put(*k, i as i32).unwrap();
        }
        assert_eq!(t.remove("b"), Some(1));
        assert_eq!(t.remove("d"), Some(3));
        t.put("e", 4).unwrap();
        assert_eq!(t.remove("a"), Some(0));
        let order: Vec<&[u8]> = t.iter().map(|(k, _)| k).collect();
        assert_eq!(order, [b"c".as_slice(), b"e".as_slice()]);
        assert_eq!(t.key_count(), 2);
    }

    /// Invariant: explicit resizes walk the prime schedule and keep every entry.
    #[test]
    fn resize_walks_schedule() {
        let keys: Vec<String> = (1..=9).map(|i| format!("Key{i}")).collect();
        let mut t = Table::new();
        for (i, k) in keys.iter().enumerate() {
            t.put(k, i).unwrap();
        }
        for expected in [97, 193, 389, 769, 1543, 3079] {
            t.resize(t.bucket_count() + 1).unwrap();
            assert_eq!(t.bucket_count(), expected);
            for (i, k) in keys.iter().enumerate() {
                assert_eq!(t.get(k), Some(&i));
            }
        }
        assert_eq!(t.resize_count(), 2309);
    }

    /// Invariant: resize keeps the relative order of entries sharing a chain.
    #[test]
    fn resize_preserves_chain_order() {
        let mut t = colliding();
        for (i, k) in ["x", "y", "z"].iter().enumerate() {
            t.put(*k, i as i32).unwrap();
        }
        t.put("x", 9).unwrap();
        t.resize(400).unwrap();
        assert_eq!(t.bucket_count(), 769);
        let order: Vec<(&[u8], i32)> = t.iter().map(|(k, v)| (k, *v)).collect();
        assert_eq!(
            order,
            [
                (b"x".as_slice(), 0),
                (b"y".as_slice(), 1),
                (b"z".as_slice(), 2),
                (b"x".as_slice(), 9)
            ]
        );
        assert_eq!(t.get("x"), Some(&0));
    }

    /// Invariant: resize may shrink onto a smaller prime.
    #[test]
    fn resize_can_shrink() {
        let mut t: Table<'_, u8> = TableConfig::new().capacity(1000).build().unwrap();
        assert_eq!(t.bucket_count(), 1543);
        t.put("k", 1).unwrap();
        t.resize(10).unwrap();
        assert_eq!(t.bucket_count(), 53);
        assert_eq!(t.resize_count(), 39);
        assert_eq!(t.get("k"), Some(&1));
    }

    /// Invariant: reaching the threshold grows the table before the next put.
    #[test]
    fn put_grows_at_threshold() {
        let keys: Vec<String> = (0..40).map(|i| format!("k{i}")).collect();
        let mut t = Table::new();
        for k in &keys[..39] {
            t.put(k, ()).unwrap();
        }
        assert_eq!(t.bucket_count(), 53);
        t.put(&keys[39], ()).unwrap();
        assert_eq!(t.bucket_count(), 97);
        assert_eq!(t.resize_count(), 72);
        assert_eq!(t.key_count(), 40);
        assert!(keys.iter().all(|k| t.has_key(k)));
    }

    /// Invariant: `clear` drops every entry and keeps the capacity.
    #[test]
    fn clear_keeps_capacity() {
        let keys: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        let mut t = Table::new();
        for k in &keys {
            t.put(k, 1u8).unwrap();
        }
        let cap = t.bucket_count();
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.bucket_count(), cap);
        assert_eq!(t.iter().count(), 0);
        assert!(!t.has_key("5"));
        t.put("5", 2).unwrap();
        assert_eq!(t.get("5"), Some(&2));
    }

    /// Invariant: after `reserve_node` the arena has room for one more bucket
    /// without growing again.
    #[test]
    fn reserve_node_leaves_room() {
        let keys: Vec<String> = (0..100).map(|i| format!("r{i}")).collect();
        let mut t = Table::new();
        for (i, k) in keys.iter().enumerate() {
            t.reserve_node().unwrap();
            assert!(t.nodes.len() < t.nodes.capacity());
            t.put(k, i).unwrap();
        }
        assert_eq!(t.key_count(), 100);
    }

    /// Invariant: values are dropped exactly once, whether removed, cleared or
    /// dropped with the table.
    #[test]
    fn values_drop_once() {
        use std::rc::Rc;
        let marker = Rc::new(());
        {
            let mut t = Table::new();
            t.put("a", Rc::clone(&marker)).unwrap();
            t.put("b", Rc::clone(&marker)).unwrap();
            t.put("c", Rc::clone(&marker)).unwrap();
            assert_eq!(Rc::strong_count(&marker), 4);
            drop(t.remove("a"));
            assert_eq!(Rc::strong_count(&marker), 3);
            t.resize(100).unwrap();
            assert_eq!(Rc::strong_count(&marker), 3);
        }
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    /// Invariant: `iter` and `IntoIterator` visit each live entry once.
    #[test]
    fn iteration_visits_all() {
        let keys: Vec<String> = (0..200).map(|i| format!("key-{i}")).collect();
        let mut t = Table::new();
        for (i, k) in keys.iter().enumerate() {
            t.put(k, i).unwrap();
        }
        let mut seen = BTreeSet::new();
        for (k, v) in &t {
            assert_eq!(keys[*v].as_bytes(), k);
            assert!(seen.insert(*v));
        }
        assert_eq!(seen.len(), 200);
        assert_eq!(t.iter().len(), 200);
    }

    /// Invariant: Debug renders entries as a map with escaped byte keys.
    #[test]
    fn debug_renders_map() {
        let mut t = Table::new();
        t.put("k", 1).unwrap();
        assert_eq!(format!("{t:?}"), "{b\"k\": 1}");
    }
}
