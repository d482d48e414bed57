//! Error and result types for inventory operations

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Outcome of equip validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipResult {
    Success,
    /// Storage index or equipment slot out of range
    InvalidSlot,
    /// No integration data, or the item is not flagged equippable
    ItemNotEquippable,
    /// Auto slot selection found nothing
    NoAvailableSlots,
    /// Explicit slot differs from the fragment's required slot
    SlotMismatch,
    /// Owner tags fail the fragment's required/blocking tags
    TagRequirementsFailed,
    StorageNotReady,
    /// The item id is already in some equipment slot
    AlreadyEquipped,
}

impl EquipResult {
    /// Check for `Success`
    pub fn is_success(&self) -> bool {
        *self == Self::Success
    }
}

impl fmt::Display for EquipResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::InvalidSlot => write!(f, "Invalid slot"),
            Self::ItemNotEquippable => write!(f, "Item is not equippable"),
            Self::NoAvailableSlots => write!(f, "No available equipment slots"),
            Self::SlotMismatch => write!(f, "Item requires a different equipment slot"),
            Self::TagRequirementsFailed => write!(f, "Owner tags do not allow equipping"),
            Self::StorageNotReady => write!(f, "Storage not ready"),
            Self::AlreadyEquipped => write!(f, "Item already equipped"),
        }
    }
}

/// Inventory transaction errors
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Mutations only run on the authoritative side
    #[error("Operation requires authority")]
    NotAuthority,

    #[error("Storage not ready")]
    StorageNotReady,

    #[error("Invalid inventory slot index: {index} (size: {len})")]
    InvalidStorageIndex { index: usize, len: usize },

    #[error("Invalid equipment slot {slot} (slots: {max})")]
    InvalidEquipmentSlot { slot: usize, max: usize },

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    /// Equipped items must be unequipped before they can be discarded
    #[error("Item at index {index} is equipped")]
    ItemEquipped { index: usize },

    #[error("Equip rejected: {0}")]
    EquipRejected(EquipResult),

    /// Client requests are only accepted from the owning connection
    #[error("Request did not come from the owning connection")]
    NotOwningConnection,

    /// Replicated slot table does not match the local table length
    #[error("Replicated slot table has {received} slots, expected {expected}")]
    ReplicatedSlotCount { received: usize, expected: usize },

    #[error("Replication payload error: {0}")]
    Replication(#[from] bincode::Error),
}

/// Result type for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid inventory config: {0}")]
    Parse(#[from] serde_json::Error),
}
