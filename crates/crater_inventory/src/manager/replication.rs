//! Owner-only replication of the slot table

use super::InventoryManager;
use crate::equipment::SlotEntry;
use crate::error::{InventoryError, Result};
use crate::events::InventoryEvent;
use crate::item::ItemInfo;
use crater_ability::TagContainer;
use crater_core::ConnectionId;
use serde::{Deserialize, Serialize};

/// Replicated form of one slot. Grant handles stay on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicatedSlot {
    pub storage_index: Option<usize>,
    pub item: ItemInfo,
    pub granted_tags: TagContainer,
}

impl From<&SlotEntry> for ReplicatedSlot {
    fn from(entry: &SlotEntry) -> Self {
        Self {
            storage_index: entry.storage_index,
            item: entry.item.clone(),
            granted_tags: entry.granted_tags.clone(),
        }
    }
}

impl InventoryManager {
    /// Encoded slot table for a connection. Only the owning connection
    /// receives it; everyone else gets `None`.
    pub fn replicated_state_for(&self, connection: ConnectionId) -> Result<Option<Vec<u8>>> {
        if !self.has_authority() || self.owner.owning_connection() != Some(connection) {
            return Ok(None);
        }

        let slots: Vec<ReplicatedSlot> = self.slots.entries().iter().map(Into::into).collect();
        Ok(Some(bincode::serialize(&slots)?))
    }

    /// Apply a slot table received from the server.
    ///
    /// Instances are rebuilt locally, reusing the current one when the same
    /// item stays in a slot. A table of the wrong length is rejected and the
    /// local table is left as it was.
    pub fn on_replicated(&mut self, bytes: &[u8]) -> Result<()> {
        if self.has_authority() {
            log::warn!("Ignoring replicated slot table on the authority");
            return Ok(());
        }

        let replicated: Vec<ReplicatedSlot> = bincode::deserialize(bytes)?;
        if replicated.len() != self.slots.len() {
            log::warn!(
                "Rejecting replicated slot table with {} slots, expected {}",
                replicated.len(),
                self.slots.len()
            );
            return Err(InventoryError::ReplicatedSlotCount {
                received: replicated.len(),
                expected: self.slots.len(),
            });
        }

        let entries = replicated
            .into_iter()
            .enumerate()
            .map(|(slot, state)| {
                let instance = state.storage_index.and_then(|_| {
                    self.slots
                        .get(slot)
                        .filter(|current| current.item.id == state.item.id)
                        .and_then(|current| current.instance.clone())
                        .or_else(|| self.definitions.new_instance(&state.item.id))
                });

                SlotEntry {
                    storage_index: state.storage_index,
                    item: state.item,
                    instance,
                    granted_abilities: Vec::new(),
                    applied_effects: Vec::new(),
                    granted_tags: state.granted_tags,
                }
            })
            .collect();

        self.slots.replace_entries(entries);
        log::debug!("Equipped items replicated");

        self.events.broadcast(InventoryEvent::Changed);
        Ok(())
    }
}
