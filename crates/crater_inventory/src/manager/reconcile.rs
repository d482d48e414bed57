//! Slot table reconciliation after storage changes
//!
//! Storage may reorder or drop entries on any mutation, so equipped slots
//! are re-bound by item id rather than by the index they were equipped at.

use super::InventoryManager;
use crate::events::InventoryEvent;
use crate::item::ItemId;
use std::collections::HashMap;

impl InventoryManager {
    /// Drain pending storage notifications and reconcile once if any
    /// arrived. Returns whether a reconciliation ran.
    ///
    /// The manager calls this after its own transactions. Hosts whose other
    /// systems write to the same storage call it once per frame.
    pub fn poll_storage_updates(&mut self) -> bool {
        let Some(updates) = &self.storage_updates else {
            return false;
        };

        let pending = updates.drain();
        let Some(latest) = pending.last() else {
            return false;
        };

        log::trace!(
            "{} storage update(s) pending, latest revision {}",
            pending.len(),
            latest.revision
        );
        self.handle_storage_update();
        true
    }

    /// Re-bind slots to storage, rebuild missing instances and announce
    /// the change. Ignored while a reconciliation is already running.
    pub fn handle_storage_update(&mut self) {
        if self.processing_update {
            return;
        }
        self.processing_update = true;

        log::trace!("Storage updated, synchronizing equipped items");

        if self.has_authority() {
            self.validate_equipped_items();
            self.sync_instances();
        }

        self.events.broadcast(InventoryEvent::Changed);

        self.processing_update = false;
    }

    fn validate_equipped_items(&mut self) {
        let Some(storage) = self.storage.clone() else {
            return;
        };

        let mut vanished = Vec::new();
        {
            let storage = storage.read();
            let items = storage.items();

            let mut first_index: HashMap<&ItemId, usize> = HashMap::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                first_index.entry(&item.id).or_insert(index);
            }

            for (slot, entry) in self.slots.entries_mut().iter_mut().enumerate() {
                if !entry.is_valid() {
                    continue;
                }

                match first_index.get(&entry.item.id) {
                    Some(&index) => {
                        if entry.storage_index != Some(index) {
                            log::debug!(
                                "Equipped item {} moved from index {:?} to {}",
                                entry.item.id,
                                entry.storage_index,
                                index
                            );
                            entry.storage_index = Some(index);
                        }
                        entry.item = items[index].clone();
                    }
                    None => vanished.push(slot),
                }
            }
        }

        for slot in vanished {
            if let Some(entry) = self.slots.get(slot) {
                log::warn!(
                    "Equipped item {} no longer in inventory, auto-unequipping",
                    entry.item.id
                );
            }
            self.clear_slot(slot);
        }
    }

    fn sync_instances(&mut self) {
        let definitions = &self.definitions;
        for entry in self.slots.entries_mut() {
            if entry.is_valid() && entry.instance.is_none() {
                entry.instance = definitions.new_instance(&entry.item.id);
            }
        }
    }
}
