//! Client-to-server inventory requests

use crate::error::Result;
use crate::item::ItemId;
use serde::{Deserialize, Serialize};

/// A mutation a client asks the server to perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryRequest {
    AddItem { item: ItemId, quantity: u32 },
    RemoveItem { item: ItemId, quantity: u32 },
    DiscardItem { index: usize, quantity: u32 },
    SwapItems { from: usize, to: usize },
    /// `slot: None` lets the server pick
    EquipItem { index: usize, slot: Option<usize> },
    UnequipItem { slot: usize },
}

impl InventoryRequest {
    /// Encode for the wire
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from the wire
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddItem { .. } => "AddItem",
            Self::RemoveItem { .. } => "RemoveItem",
            Self::DiscardItem { .. } => "DiscardItem",
            Self::SwapItems { .. } => "SwapItems",
            Self::EquipItem { .. } => "EquipItem",
            Self::UnequipItem { .. } => "UnequipItem",
        }
    }
}
