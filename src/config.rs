//! Construction parameters for `Table` and `SyncTable`.

use crate::error::TableError;
use crate::policy::{BinaryEq, Djb2, KeyEq, KeyHash};
use crate::sync_table::SyncTable;
use crate::table::Table;

pub const DEFAULT_CAPACITY: u32 = 53;
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Initial capacity request and growth threshold of a table.
///
/// The capacity is a request: the table rounds it up onto the prime
/// schedule. The load factor must lie in `(0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TableConfig {
    pub capacity: u32,
    pub load_factor: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn validate(&self) -> Result<(), TableError> {
        let lf = self.load_factor;
        if lf.is_finite() && lf > 0.0 && lf <= 1.0 {
            Ok(())
        } else {
            Err(TableError::InvalidLoadFactor(lf))
        }
    }

    pub fn build<'k, V>(self) -> Result<Table<'k, V>, TableError> {
        Table::with_policies(self, Djb2, BinaryEq)
    }

    pub fn build_with<'k, V, H, E>(self, hash: H, eq: E) -> Result<Table<'k, V, H, E>, TableError>
    where
        H: KeyHash,
        E: KeyEq,
    {
        Table::with_policies(self, hash, eq)
    }

    pub fn build_sync<'k, V>(self) -> Result<SyncTable<'k, V>, TableError> {
        self.build().map(SyncTable::from_table)
    }

    pub fn build_sync_with<'k, V, H, E>(
        self,
        hash: H,
        eq: E,
    ) -> Result<SyncTable<'k, V, H, E>, TableError>
    where
        H: KeyHash,
        E: KeyEq,
    {
        self.build_with(hash, eq).map(SyncTable::from_table)
    }
}
