//! Identifier types.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Unique identifier for an item instance.
///
/// Ids are process-unique; occupancy grids store them in place of references
/// to the item itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ItemId(pub u64);

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

impl ItemId {
    /// Allocate a fresh id.
    #[inline]
    pub fn next() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = ItemId::next();
        let b = ItemId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn display_uses_hash_prefix() {
        assert_eq!(ItemId(7).to_string(), "#7");
    }
}
