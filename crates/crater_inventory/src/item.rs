//! Item identifiers and snapshots

use crater_core::NamedId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names an item archetype, e.g. `Weapon.Sword`.
///
/// Equipped entries are reconciled against storage by this id, never by
/// storage index.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(NamedId);

impl ItemId {
    /// Create an item id
    pub fn new(name: &str) -> Self {
        Self(NamedId::new(name))
    }

    /// The empty id carried by reset slot entries
    pub fn none() -> Self {
        Self(NamedId::empty())
    }

    /// Check whether this is the empty id
    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    /// Id as text
    pub fn as_str(&self) -> &str {
        self.0.name()
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.as_str())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// An identifier and a quantity, as held by storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemInfo {
    pub id: ItemId,
    pub quantity: u32,
}

impl ItemInfo {
    /// Create a snapshot
    pub fn new(id: impl Into<ItemId>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            quantity,
        }
    }

    /// A single item
    pub fn single(id: impl Into<ItemId>) -> Self {
        Self::new(id, 1)
    }

    /// Check if this snapshot holds nothing
    pub fn is_empty(&self) -> bool {
        self.id.is_none() || self.quantity == 0
    }
}

impl fmt::Display for ItemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.id, self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_info() {
        let sword = ItemInfo::single("Weapon.Sword");

        assert_eq!(sword.quantity, 1);
        assert_eq!(sword.id, ItemId::new("Weapon.Sword"));
        assert!(!sword.is_empty());
        assert_eq!(sword.to_string(), "Weapon.Sword x1");
    }

    #[test]
    fn test_default_is_empty() {
        let info = ItemInfo::default();
        assert!(info.is_empty());
        assert!(info.id.is_none());
        assert!(ItemInfo::new("Ammo", 0).is_empty());
    }
}
