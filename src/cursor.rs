//! Forward traversal over every bucket of a `Table`.

use crate::table::Table;
use core::iter::FusedIterator;
use slotmap::DefaultKey;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Position {
    Before,
    At { slot: usize, node: DefaultKey },
    Done,
}

/// Step-wise cursor over all chains, slot by slot.
///
/// `key`/`value` are `None` until the first successful `advance` and again
/// once `advance` has returned `false`. The shared borrow of the table rules
/// out mutation for as long as the cursor lives.
pub struct Cursor<'t, 'k, V, H, E> {
    table: &'t Table<'k, V, H, E>,
    pos: Position,
}

impl<'t, 'k, V, H, E> Cursor<'t, 'k, V, H, E> {
    pub(crate) fn new(table: &'t Table<'k, V, H, E>) -> Self {
        Self {
            table,
            pos: Position::Before,
        }
    }

    fn scan_from(&self, first_slot: usize) -> Position {
        self.table.chains[first_slot.min(self.table.chains.len())..]
            .iter()
            .enumerate()
            .find_map(|(offset, chain)| {
                chain.head.map(|node| Position::At {
                    slot: first_slot + offset,
                    node,
                })
            })
            .unwrap_or(Position::Done)
    }

    /// Moves to the next bucket; `false` once every chain is exhausted.
    pub fn advance(&mut self) -> bool {
        self.pos = match self.pos {
            Position::Before => self.scan_from(0),
            Position::At { slot, node } => match self.table.nodes[node].next {
                Some(next) => Position::At { slot, node: next },
                None => self.scan_from(slot + 1),
            },
            Position::Done => Position::Done,
        };
        self.pos != Position::Done
    }

    pub fn key(&self) -> Option<&'k [u8]> {
        match self.pos {
            Position::At { node, .. } => Some(self.table.nodes[node].key),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&'t V> {
        let table = self.table;
        match self.pos {
            Position::At { node, .. } => Some(&table.nodes[node].value),
            _ => None,
        }
    }

    /// Index of the chain the cursor currently sits in.
    pub fn slot(&self) -> Option<usize> {
        match self.pos {
            Position::At { slot, .. } => Some(slot),
            _ => None,
        }
    }
}

/// Iterator over `(key, value)` pairs in chain order.
pub struct Iter<'t, 'k, V, H, E> {
    cursor: Cursor<'t, 'k, V, H, E>,
    remaining: usize,
}

impl<'t, 'k, V, H, E> Iter<'t, 'k, V, H, E> {
    pub(crate) fn new(cursor: Cursor<'t, 'k, V, H, E>, remaining: usize) -> Self {
        Self { cursor, remaining }
    }
}

impl<'t, 'k, V, H, E> Iterator for Iter<'t, 'k, V, H, E> {
    type Item = (&'k [u8], &'t V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if !self.cursor.advance() {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        Some((self.cursor.key()?, self.cursor.value()?))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V, H, E> ExactSizeIterator for Iter<'_, '_, V, H, E> {}

impl<V, H, E> FusedIterator for Iter<'_, '_, V, H, E> {}
