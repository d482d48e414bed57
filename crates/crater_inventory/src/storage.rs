//! Item storage seam and the reference store

use crate::item::{ItemId, ItemInfo};
use crater_event::{Multicast, SubscriberId, Subscription};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Storage shared between the manager and any other writers
pub type SharedStorage = Arc<RwLock<dyn InventoryStorage>>;

/// Broadcast after every mutating storage operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageUpdate {
    /// Storage revision after the mutation
    pub revision: u64,
}

/// Per-actor item list.
///
/// Owns stacking and capacity rules. Implementations must broadcast a
/// `StorageUpdate` to every subscriber after each mutation.
///
/// Subscribers receive updates by polling. The inventory manager drains its
/// own subscription after each of its transactions; writes from any other
/// system are only reconciled once the host calls
/// `InventoryManager::poll_storage_updates`, which it should do once per
/// frame.
pub trait InventoryStorage: Send + Sync {
    /// Current entries in order
    fn items(&self) -> &[ItemInfo];

    /// Add each entry, stacking as the storage sees fit
    fn add_items(&mut self, items: &[ItemInfo]);

    /// Remove each identifier/quantity pair
    fn discard_items(&mut self, items: &[ItemInfo]);

    /// Subscribe to update broadcasts
    fn subscribe(&mut self) -> Subscription<StorageUpdate>;

    /// Stop receiving update broadcasts
    fn unsubscribe(&mut self, id: SubscriberId);
}

/// Dense, ordered item store.
///
/// Adding stacks onto the first entry with the same id (up to the item's
/// registered max stack) and appends the overflow. Discarding takes
/// quantity front-to-back and drops emptied entries, shifting later ones.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: Vec<ItemInfo>,
    max_stacks: HashMap<ItemId, u32>,
    on_update: Multicast<StorageUpdate>,
    revision: u64,
}

impl ItemStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given entries
    pub fn with_items(items: impl IntoIterator<Item = ItemInfo>) -> Self {
        Self {
            items: items.into_iter().filter(|item| !item.is_empty()).collect(),
            ..Self::default()
        }
    }

    /// Wrap into the shared form the manager binds to
    pub fn into_shared(self) -> SharedStorage {
        Arc::new(RwLock::new(self))
    }

    /// Limit how many of an item one entry may hold
    pub fn register_item(&mut self, id: impl Into<ItemId>, max_stack: u32) {
        self.max_stacks.insert(id.into(), max_stack.max(1));
    }

    fn max_stack(&self, id: &ItemId) -> u32 {
        self.max_stacks.get(id).copied().unwrap_or(u32::MAX)
    }

    /// Index of the first entry with an id
    pub fn find_item(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Total quantity of an item across entries
    pub fn count_item(&self, id: &ItemId) -> u64 {
        self.items
            .iter()
            .filter(|item| &item.id == id)
            .map(|item| item.quantity as u64)
            .sum()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the store holds nothing
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Revision counter, bumped by every mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn add_one(&mut self, item: &ItemInfo) {
        if item.is_empty() {
            return;
        }
        let max_stack = self.max_stack(&item.id);
        let mut remaining = item.quantity;

        for existing in self.items.iter_mut().filter(|e| e.id == item.id) {
            let space = max_stack.saturating_sub(existing.quantity);
            let moved = remaining.min(space);
            existing.quantity += moved;
            remaining -= moved;
            if remaining == 0 {
                return;
            }
        }

        while remaining > 0 {
            let amount = remaining.min(max_stack);
            self.items.push(ItemInfo::new(item.id.clone(), amount));
            remaining -= amount;
        }
    }

    fn discard_one(&mut self, item: &ItemInfo) -> u32 {
        let mut remaining = item.quantity;
        for existing in self.items.iter_mut().filter(|e| e.id == item.id) {
            if remaining == 0 {
                break;
            }
            let taken = remaining.min(existing.quantity);
            existing.quantity -= taken;
            remaining -= taken;
        }
        self.items.retain(|e| e.quantity > 0);
        item.quantity - remaining
    }

    fn notify(&mut self) {
        self.revision += 1;
        self.on_update.broadcast(StorageUpdate {
            revision: self.revision,
        });
    }
}

impl InventoryStorage for ItemStore {
    fn items(&self) -> &[ItemInfo] {
        &self.items
    }

    fn add_items(&mut self, items: &[ItemInfo]) {
        for item in items {
            self.add_one(item);
        }
        self.notify();
    }

    fn discard_items(&mut self, items: &[ItemInfo]) {
        for item in items {
            let removed = self.discard_one(item);
            if removed < item.quantity {
                log::debug!(
                    "Discarded only {} of {} requested {}",
                    removed,
                    item.quantity,
                    item.id
                );
            }
        }
        self.notify();
    }

    fn subscribe(&mut self) -> Subscription<StorageUpdate> {
        self.on_update.subscribe()
    }

    fn unsubscribe(&mut self, id: SubscriberId) {
        self.on_update.unsubscribe(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_stacks_onto_existing_entry() {
        let mut store = ItemStore::new();

        store.add_items(&[ItemInfo::new("Gold", 50)]);
        store.add_items(&[ItemInfo::new("Gold", 30), ItemInfo::single("Sword")]);

        assert_eq!(store.items(), &[ItemInfo::new("Gold", 80), ItemInfo::single("Sword")]);
    }

    #[test]
    fn test_max_stack_overflow_appends() {
        let mut store = ItemStore::new();
        store.register_item("Arrow", 50);

        store.add_items(&[ItemInfo::new("Arrow", 120)]);

        assert_eq!(store.len(), 3);
        assert_eq!(store.count_item(&"Arrow".into()), 120);
        assert_eq!(store.items()[2].quantity, 20);
    }

    #[test]
    fn test_discard_removes_emptied_entries() {
        let mut store = ItemStore::with_items([
            ItemInfo::single("Sword"),
            ItemInfo::new("Arrow", 10),
            ItemInfo::single("Shield"),
        ]);

        store.discard_items(&[ItemInfo::single("Sword"), ItemInfo::new("Arrow", 4)]);

        assert_eq!(store.items(), &[ItemInfo::new("Arrow", 6), ItemInfo::single("Shield")]);
        assert_eq!(store.find_item(&"Shield".into()), Some(1));
    }

    #[test]
    fn test_discard_more_than_present() {
        let mut store = ItemStore::with_items([ItemInfo::new("Arrow", 3)]);
        store.discard_items(&[ItemInfo::new("Arrow", 10)]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_mutations_broadcast_updates() {
        let mut store = ItemStore::new();
        let sub = store.subscribe();

        store.add_items(&[ItemInfo::single("Sword")]);
        store.discard_items(&[ItemInfo::single("Sword")]);

        let updates = sub.drain();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].revision, 2);

        store.unsubscribe(sub.id());
        store.add_items(&[ItemInfo::single("Sword")]);
        assert!(!sub.has_pending());
    }
}
