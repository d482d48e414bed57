//! Equipment slot table

use crate::definition::ItemInstance;
use crate::item::{ItemId, ItemInfo};
use crater_ability::{AbilitySpecHandle, ActiveEffectHandle, TagContainer};
use std::sync::Arc;

/// One equipment slot.
///
/// Valid while it points at a storage index. The three grant lists hold
/// exactly what was granted for this entry so it can all be revoked.
#[derive(Debug, Clone, Default)]
pub struct SlotEntry {
    pub(crate) storage_index: Option<usize>,
    pub(crate) item: ItemInfo,
    pub(crate) instance: Option<Arc<ItemInstance>>,
    pub(crate) granted_abilities: Vec<AbilitySpecHandle>,
    pub(crate) applied_effects: Vec<ActiveEffectHandle>,
    pub(crate) granted_tags: TagContainer,
}

impl SlotEntry {
    /// Check whether an item is equipped here
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.storage_index.is_some()
    }

    /// Storage index of the equipped item
    pub fn storage_index(&self) -> Option<usize> {
        self.storage_index
    }

    /// Cached snapshot of the equipped item
    pub fn item(&self) -> &ItemInfo {
        &self.item
    }

    /// Live definition instance, if one could be created
    pub fn instance(&self) -> Option<&Arc<ItemInstance>> {
        self.instance.as_ref()
    }

    /// Abilities granted for this entry
    pub fn granted_ability_handles(&self) -> &[AbilitySpecHandle] {
        &self.granted_abilities
    }

    /// Effects applied for this entry
    pub fn applied_effect_handles(&self) -> &[ActiveEffectHandle] {
        &self.applied_effects
    }

    /// Loose tags added for this entry
    pub fn granted_tags(&self) -> &TagContainer {
        &self.granted_tags
    }

    /// Check whether any grant is still recorded
    pub fn has_grants(&self) -> bool {
        !self.granted_abilities.is_empty()
            || !self.applied_effects.is_empty()
            || !self.granted_tags.is_empty()
    }

    pub(crate) fn populate(
        &mut self,
        storage_index: usize,
        item: ItemInfo,
        instance: Option<Arc<ItemInstance>>,
    ) {
        self.storage_index = Some(storage_index);
        self.item = item;
        self.instance = instance;
    }

    /// Return to the empty state. Grants must already be revoked.
    pub(crate) fn reset(&mut self) {
        debug_assert!(!self.has_grants(), "slot entry reset with live grants");
        *self = Self::default();
    }
}

/// Fixed-length table of equipment slots
#[derive(Debug, Clone, Default)]
pub struct SlotTable {
    entries: Vec<SlotEntry>,
}

impl SlotTable {
    /// Create a table of empty slots
    pub fn new(slots: usize) -> Self {
        Self {
            entries: vec![SlotEntry::default(); slots],
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no slots (only before initialization)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a slot index exists
    pub fn is_valid_slot(&self, slot: usize) -> bool {
        slot < self.entries.len()
    }

    /// Get a slot
    pub fn get(&self, slot: usize) -> Option<&SlotEntry> {
        self.entries.get(slot)
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut SlotEntry> {
        self.entries.get_mut(slot)
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [SlotEntry] {
        &mut self.entries
    }

    /// Check if a slot holds an item
    pub fn is_occupied(&self, slot: usize) -> bool {
        self.get(slot).map(SlotEntry::is_valid).unwrap_or(false)
    }

    /// First slot holding nothing
    pub fn first_empty(&self) -> Option<usize> {
        self.entries.iter().position(|entry| !entry.is_valid())
    }

    /// Slot holding an item id
    pub fn find_by_item(&self, id: &ItemId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.is_valid() && &entry.item.id == id)
    }

    /// Slot referencing a storage index
    pub fn find_by_storage_index(&self, index: usize) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.storage_index == Some(index))
    }

    /// All slots in order
    pub fn entries(&self) -> &[SlotEntry] {
        &self.entries
    }

    /// Occupied slots with their indices
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &SlotEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_valid())
    }

    /// Number of occupied slots
    pub fn equipped_count(&self) -> usize {
        self.occupied().count()
    }

    /// Exchange storage back-references after storage indices `from` and
    /// `to` traded places
    pub(crate) fn remap_after_swap(&mut self, from: usize, to: usize) {
        for entry in self.entries.iter_mut().filter(|e| e.is_valid()) {
            if entry.storage_index == Some(from) {
                entry.storage_index = Some(to);
                log::debug!("Updated equipped item index from {} to {}", from, to);
            } else if entry.storage_index == Some(to) {
                entry.storage_index = Some(from);
                log::debug!("Updated equipped item index from {} to {}", to, from);
            }
        }
    }

    pub(crate) fn replace_entries(&mut self, entries: Vec<SlotEntry>) {
        self.entries = entries;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equip(table: &mut SlotTable, slot: usize, index: usize, id: &str) {
        table
            .get_mut(slot)
            .unwrap()
            .populate(index, ItemInfo::single(id), None);
    }

    #[test]
    fn test_table_creation() {
        let table = SlotTable::new(3);

        assert_eq!(table.len(), 3);
        assert_eq!(table.equipped_count(), 0);
        assert_eq!(table.first_empty(), Some(0));
        assert!(table.is_valid_slot(2));
        assert!(!table.is_valid_slot(3));
    }

    #[test]
    fn test_lookup() {
        let mut table = SlotTable::new(3);
        equip(&mut table, 1, 4, "Weapon.Sword");

        assert!(table.is_occupied(1));
        assert!(!table.is_occupied(0));
        assert!(!table.is_occupied(9));
        assert_eq!(table.find_by_item(&"Weapon.Sword".into()), Some(1));
        assert_eq!(table.find_by_storage_index(4), Some(1));
        assert_eq!(table.find_by_storage_index(0), None);
        assert_eq!(table.first_empty(), Some(0));
    }

    #[test]
    fn test_remap_after_swap() {
        let mut table = SlotTable::new(3);
        equip(&mut table, 0, 0, "Weapon.Sword");
        equip(&mut table, 1, 1, "Armor.Shield");
        equip(&mut table, 2, 5, "Ring");

        table.remap_after_swap(0, 1);

        assert_eq!(table.get(0).unwrap().storage_index(), Some(1));
        assert_eq!(table.get(1).unwrap().storage_index(), Some(0));
        assert_eq!(table.get(2).unwrap().storage_index(), Some(5));
    }

    #[test]
    fn test_reset() {
        let mut table = SlotTable::new(1);
        equip(&mut table, 0, 2, "Weapon.Sword");

        table.get_mut(0).unwrap().reset();

        let entry = table.get(0).unwrap();
        assert!(!entry.is_valid());
        assert!(entry.item().is_empty());
        assert!(table.first_empty().is_some());
    }
}
