//! Events emitted by the inventory manager

use crate::item::ItemInfo;

/// Inventory manager events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    /// Bound to storage; emitted once
    Initialized,
    /// Storage changed, or the slot table was replicated
    Changed,
    /// An item went into an equipment slot
    ItemEquipped { slot: usize, item: ItemInfo },
    /// An item left an equipment slot
    ItemUnequipped { slot: usize, item: ItemInfo },
}

impl InventoryEvent {
    /// Equipment slot this event concerns, if any
    pub fn slot(&self) -> Option<usize> {
        match self {
            Self::ItemEquipped { slot, .. } | Self::ItemUnequipped { slot, .. } => Some(*slot),
            Self::Initialized | Self::Changed => None,
        }
    }
}
