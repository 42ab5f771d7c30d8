//! Error type shared by every fallible table operation.

use std::collections::TryReserveError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// The bucket array (or the node arena) could not be grown.
    Alloc(TryReserveError),
    /// The table already sits at the last prime of the capacity schedule.
    CapacityExhausted { capacity: u32 },
    /// Load factors must be finite and lie in `(0, 1]`.
    InvalidLoadFactor(f32),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Alloc(e) => write!(f, "table allocation failed: {e}"),
            TableError::CapacityExhausted { capacity } => {
                write!(f, "capacity schedule exhausted at {capacity} buckets")
            }
            TableError::InvalidLoadFactor(lf) => {
                write!(f, "load factor {lf} is outside (0, 1]")
            }
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TableError::Alloc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TryReserveError> for TableError {
    fn from(e: TryReserveError) -> Self {
        TableError::Alloc(e)
    }
}
