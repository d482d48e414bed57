//! Inventory manager
//!
//! Sits between the owner's item storage and its ability system. Storage
//! owns the item list; the manager owns the equipment slot table and every
//! grant made on behalf of an equipped item.
//!
//! All mutators run on the authority only. Clients queue requests (see
//! `request`) and receive the slot table through replication.
//!
//! Storage changes made by the manager are reconciled before the mutator
//! returns. Hosts with other storage writers must call
//! `poll_storage_updates` once per frame to pick those changes up.

mod dispatch;
mod grant;
mod reconcile;
mod replication;

use crate::config::InventoryConfig;
use crate::definition::{DefinitionAdapter, ItemInstance, ItemTemplate};
use crate::equipment::{SlotEntry, SlotTable};
use crate::error::{EquipResult, InventoryError, Result};
use crate::events::InventoryEvent;
use crate::fragment::EquippableFragment;
use crate::item::{ItemId, ItemInfo};
use crate::owner::InventoryOwner;
use crate::request::InventoryRequest;
use crate::storage::{SharedStorage, StorageUpdate};
use crater_ability::{SharedAbilitySystem, TagContainer, WeakAbilitySystem};
use crater_event::{Multicast, SubscriberId, Subscription};
use std::fmt;
use std::sync::Arc;

pub use replication::ReplicatedSlot;

/// What a successful equip check decided
struct EquipPlan {
    target: usize,
    item: ItemInfo,
    fragment: Option<EquippableFragment>,
}

/// Server-authoritative inventory and equipment manager
///
/// Call `poll_storage_updates` once per frame when anything besides the
/// manager writes to the owner's storage.
pub struct InventoryManager {
    config: InventoryConfig,
    owner: Arc<dyn InventoryOwner>,
    definitions: Arc<DefinitionAdapter>,
    storage: Option<SharedStorage>,
    storage_updates: Option<Subscription<StorageUpdate>>,
    ability_system: Option<WeakAbilitySystem>,
    slots: SlotTable,
    events: Multicast<InventoryEvent>,
    outbox: Vec<InventoryRequest>,
    processing_update: bool,
    initialized: bool,
}

impl InventoryManager {
    /// Create a manager for an owner. Call `begin_play` before use.
    pub fn new(owner: Arc<dyn InventoryOwner>, definitions: Arc<DefinitionAdapter>) -> Self {
        Self {
            config: InventoryConfig::default(),
            owner,
            definitions,
            storage: None,
            storage_updates: None,
            ability_system: None,
            slots: SlotTable::default(),
            events: Multicast::new(),
            outbox: Vec::new(),
            processing_update: false,
            initialized: false,
        }
    }

    /// Set the configuration. Has no effect on slot count after `begin_play`.
    pub fn with_config(mut self, config: InventoryConfig) -> Self {
        self.config = config.validated();
        self
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Size the slot table and bind to the owner's storage
    pub fn begin_play(&mut self) {
        if self.initialized {
            log::warn!("Inventory manager for {} already initialized", self.owner.actor_id());
            return;
        }

        self.slots = SlotTable::new(self.config.max_equipment_slots);

        let Some(storage) = self.owner.find_storage() else {
            log::error!(
                "No item storage on owner {}. Inventory operations will fail",
                self.owner.actor_id()
            );
            return;
        };

        self.storage_updates = Some(storage.write().subscribe());
        self.storage = Some(storage);
        self.initialized = true;

        log::info!(
            "Inventory manager bound to storage on {} ({} equipment slots)",
            self.owner.actor_id(),
            self.slots.len()
        );

        self.events.broadcast(InventoryEvent::Initialized);
    }

    /// Revoke every grant (authority only) and detach from storage
    pub fn end_play(&mut self) {
        if self.has_authority() {
            for slot in 0..self.slots.len() {
                if !self.slots.is_occupied(slot) {
                    continue;
                }
                self.revoke(slot);
                if let Some(entry) = self.slots.get_mut(slot) {
                    entry.reset();
                }
            }
        }

        if let (Some(storage), Some(updates)) = (&self.storage, self.storage_updates.take()) {
            storage.write().unsubscribe(updates.id());
        }

        log::debug!("Inventory manager for {} shut down", self.owner.actor_id());
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Receive manager events
    pub fn subscribe(&mut self) -> Subscription<InventoryEvent> {
        self.events.subscribe()
    }

    /// Stop receiving manager events
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.events.unsubscribe(id)
    }

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------

    /// Add items to storage
    pub fn add_item(&mut self, id: impl Into<ItemId>, quantity: u32) -> Result<()> {
        let id = id.into();
        self.require_authority("add_item")?;
        let storage = self.ready_storage()?;
        Self::require_quantity(quantity)?;

        log::info!("Transaction: adding {} (x{})", id, quantity);
        storage.write().add_items(&[ItemInfo::new(id, quantity)]);

        self.poll_storage_updates();
        Ok(())
    }

    /// Remove items from storage by id. Which stack loses quantity is up to
    /// the storage.
    pub fn remove_item(&mut self, id: impl Into<ItemId>, quantity: u32) -> Result<()> {
        let id = id.into();
        self.require_authority("remove_item")?;
        let storage = self.ready_storage()?;
        Self::require_quantity(quantity)?;

        if self.config.protect_equipped_on_remove {
            if let Some(index) = self
                .slots
                .occupied()
                .find(|(_, entry)| entry.item.id == id)
                .and_then(|(_, entry)| entry.storage_index)
            {
                log::warn!("Cannot remove equipped item {}. Unequip it first", id);
                return Err(InventoryError::ItemEquipped { index });
            }
        }

        log::info!("Transaction: removing {} (x{})", id, quantity);
        storage.write().discard_items(&[ItemInfo::new(id, quantity)]);

        self.poll_storage_updates();
        Ok(())
    }

    /// Discard up to `quantity` of the entry at a storage index.
    ///
    /// Equipped entries cannot be discarded.
    pub fn discard_item(&mut self, index: usize, quantity: u32) -> Result<()> {
        self.require_authority("discard_item")?;
        let storage = self.ready_storage()?;
        Self::require_quantity(quantity)?;

        {
            let mut storage = storage.write();
            let entry = Self::storage_entry(storage.items(), index)?;

            if self.slots.find_by_storage_index(index).is_some() {
                log::warn!("Cannot discard equipped item at index {}. Unequip it first", index);
                return Err(InventoryError::ItemEquipped { index });
            }

            let quantity = quantity.min(entry.quantity);
            log::info!(
                "Transaction: discarding {} of {} at index {}",
                quantity,
                entry.id,
                index
            );
            storage.discard_items(&[ItemInfo::new(entry.id, quantity)]);
        }

        self.poll_storage_updates();
        Ok(())
    }

    /// Exchange two storage entries, keeping equipped back-references
    pub fn swap_items(&mut self, from: usize, to: usize) -> Result<()> {
        self.require_authority("swap_items")?;
        if from == to {
            log::trace!("Swap of index {} with itself ignored", from);
            return Ok(());
        }
        let storage = self.ready_storage()?;

        {
            let mut storage = storage.write();
            let (from_item, to_item) = match (storage.items().get(from), storage.items().get(to)) {
                (Some(a), Some(b)) => (a.clone(), b.clone()),
                _ => {
                    let len = storage.items().len();
                    log::warn!(
                        "Swap failed: invalid indices from={} to={} (size: {})",
                        from,
                        to,
                        len
                    );
                    return Err(InventoryError::InvalidStorageIndex {
                        index: if from >= len { from } else { to },
                        len,
                    });
                }
            };

            log::info!(
                "Transaction: swapping {} ({}) <-> {} ({})",
                from,
                from_item.id,
                to,
                to_item.id
            );

            // Storage has no positional swap; remove both and re-add reversed
            storage.discard_items(&[from_item.clone(), to_item.clone()]);
            storage.add_items(&[to_item, from_item]);
        }

        self.slots.remap_after_swap(from, to);
        log::trace!("Swap complete, equipped indices updated");

        self.poll_storage_updates();
        Ok(())
    }

    /// Validate an equip without changing anything
    pub fn can_equip(&self, index: usize, slot: Option<usize>) -> EquipResult {
        match self.plan_equip(index, slot) {
            Ok(_) => EquipResult::Success,
            Err(result) => result,
        }
    }

    /// Equip the item at a storage index. `None` picks a slot.
    ///
    /// An item already in the target slot is unequipped first. Returns the
    /// slot used.
    pub fn equip_item(&mut self, index: usize, slot: Option<usize>) -> Result<usize> {
        self.require_authority("equip_item")?;

        let plan = self.plan_equip(index, slot).map_err(|result| {
            log::warn!("Cannot equip item at index {}: {}", index, result);
            InventoryError::EquipRejected(result)
        })?;
        let EquipPlan {
            target,
            item,
            fragment,
        } = plan;

        if self.slots.is_occupied(target) {
            log::trace!("Unequipping existing item in slot {}", target);
            self.clear_slot(target);
        }

        let instance = self.definitions.new_instance(&item.id);
        if let Some(entry) = self.slots.get_mut(target) {
            entry.populate(index, item.clone(), instance);
        }

        self.grant(target, &item, fragment.as_ref());

        log::info!("Equipped {} to slot {}", item.id, target);
        self.events
            .broadcast(InventoryEvent::ItemEquipped { slot: target, item });

        Ok(target)
    }

    /// Empty an equipment slot. Returns the item that was there.
    pub fn unequip_item(&mut self, slot: usize) -> Result<Option<ItemInfo>> {
        self.require_authority("unequip_item")?;

        if !self.slots.is_valid_slot(slot) {
            log::warn!("Invalid equipment slot {}", slot);
            return Err(InventoryError::InvalidEquipmentSlot {
                slot,
                max: self.slots.len(),
            });
        }

        if !self.slots.is_occupied(slot) {
            log::trace!("Equipment slot {} is already empty", slot);
            return Ok(None);
        }

        Ok(self.clear_slot(slot))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Check write permission
    pub fn has_authority(&self) -> bool {
        self.owner.role().has_authority()
    }

    /// Check whether storage is bound
    pub fn is_storage_ready(&self) -> bool {
        self.storage.is_some()
    }

    /// Snapshot of the storage entries
    pub fn inventory_items(&self) -> Vec<ItemInfo> {
        self.storage
            .as_ref()
            .map(|storage| storage.read().items().to_vec())
            .unwrap_or_default()
    }

    /// Storage entry at an index
    pub fn item_at(&self, index: usize) -> Option<ItemInfo> {
        self.storage
            .as_ref()
            .and_then(|storage| storage.read().items().get(index).cloned())
    }

    /// Every slot, empty ones included
    pub fn equipped_items(&self) -> &[SlotEntry] {
        self.slots.entries()
    }

    /// Occupied slot entry
    pub fn equipped_at(&self, slot: usize) -> Option<&SlotEntry> {
        self.slots.get(slot).filter(|entry| entry.is_valid())
    }

    /// The slot table
    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    /// Check if a storage index is referenced by any slot
    pub fn is_item_equipped(&self, index: usize) -> bool {
        self.slots.find_by_storage_index(index).is_some()
    }

    /// Check if the entry at a storage index could ever be equipped
    pub fn is_slot_item_equippable(&self, index: usize) -> bool {
        self.item_at(index)
            .and_then(|item| self.definitions.resolve(&item.id))
            .map(|definition| definition.equippable)
            .unwrap_or(false)
    }

    /// Configured slot count
    pub fn max_equipment_slots(&self) -> usize {
        self.config.max_equipment_slots
    }

    /// Active configuration
    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    /// Definition instance of the item in a slot
    pub fn instance_at_slot(&self, slot: usize) -> Option<Arc<ItemInstance>> {
        self.slots.get(slot)?.instance().cloned()
    }

    /// Load the gameplay template for an item id
    pub fn load_definition_for_item(&self, id: &ItemId) -> Option<Arc<ItemTemplate>> {
        let definition = self.definitions.resolve(id)?;
        self.definitions.load_template_sync(&definition)
    }

    /// First empty equipment slot
    pub fn first_available_equipment_slot(&self) -> Option<usize> {
        self.slots.first_empty()
    }

    /// Tags the owner currently has, empty without an ability system
    pub fn owner_tags(&self) -> TagContainer {
        let system = self
            .ability_system
            .as_ref()
            .and_then(|weak| weak.upgrade())
            .or_else(|| self.owner.find_ability_system());

        system
            .map(|system| system.lock().owned_tags())
            .unwrap_or_default()
    }

    /// Definition adapter in use
    pub fn definitions(&self) -> &Arc<DefinitionAdapter> {
        &self.definitions
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn require_authority(&self, operation: &str) -> Result<()> {
        if self.has_authority() {
            return Ok(());
        }
        log::trace!("{} ignored without authority", operation);
        Err(InventoryError::NotAuthority)
    }

    fn ready_storage(&self) -> Result<SharedStorage> {
        match &self.storage {
            Some(storage) => Ok(Arc::clone(storage)),
            None => {
                log::warn!("Storage not ready");
                Err(InventoryError::StorageNotReady)
            }
        }
    }

    fn require_quantity(quantity: u32) -> Result<()> {
        if quantity == 0 {
            log::warn!("Quantity must be at least 1");
            return Err(InventoryError::InvalidQuantity);
        }
        Ok(())
    }

    fn storage_entry(items: &[ItemInfo], index: usize) -> Result<ItemInfo> {
        items.get(index).cloned().ok_or_else(|| {
            log::warn!(
                "Invalid inventory slot index: {} (size: {})",
                index,
                items.len()
            );
            InventoryError::InvalidStorageIndex {
                index,
                len: items.len(),
            }
        })
    }

    /// Equip checks, in order. The first failure wins.
    fn plan_equip(
        &self,
        index: usize,
        slot: Option<usize>,
    ) -> std::result::Result<EquipPlan, EquipResult> {
        let storage = self.storage.as_ref().ok_or(EquipResult::StorageNotReady)?;

        let item = Self::storage_entry(storage.read().items(), index)
            .map_err(|_| EquipResult::InvalidSlot)?;

        if self.slots.find_by_item(&item.id).is_some() {
            return Err(EquipResult::AlreadyEquipped);
        }

        let definition = self
            .definitions
            .resolve(&item.id)
            .filter(|definition| definition.equippable)
            .ok_or(EquipResult::ItemNotEquippable)?;
        let fragment = self
            .definitions
            .find_fragment::<EquippableFragment>(&definition);

        let target = match slot {
            Some(slot) => slot,
            None => self
                .select_slot(fragment.as_ref(), definition.preferred_slot)
                .ok_or(EquipResult::NoAvailableSlots)?,
        };

        if !self.slots.is_valid_slot(target) {
            return Err(EquipResult::InvalidSlot);
        }

        if let (Some(required), Some(explicit)) =
            (fragment.as_ref().and_then(|f| f.required_slot), slot)
        {
            if explicit != required {
                return Err(EquipResult::SlotMismatch);
            }
        }

        if let Some(fragment) = &fragment {
            if !fragment.can_be_equipped_by(&self.owner_tags()) {
                return Err(EquipResult::TagRequirementsFailed);
            }
        }

        Ok(EquipPlan {
            target,
            item,
            fragment,
        })
    }

    /// Pick a slot for an auto-equip.
    ///
    /// A required slot wins regardless of occupancy (the caller unequips
    /// whatever is there). Otherwise the preferred slot is used only when
    /// empty.
    fn select_slot(
        &self,
        fragment: Option<&EquippableFragment>,
        preferred: Option<usize>,
    ) -> Option<usize> {
        if let Some(required) = fragment.and_then(|f| f.required_slot) {
            return self.slots.is_valid_slot(required).then_some(required);
        }

        if let Some(preferred) = preferred {
            if self.slots.is_valid_slot(preferred) && !self.slots.is_occupied(preferred) {
                return Some(preferred);
            }
        }

        if self.config.fallback_to_first_free_slot {
            return self.slots.first_empty();
        }

        None
    }

    /// Revoke, reset and announce. The slot must be occupied.
    fn clear_slot(&mut self, slot: usize) -> Option<ItemInfo> {
        let item = self.slots.get(slot)?.item.clone();

        self.revoke(slot);
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.reset();
        }

        log::info!("Unequipped {} from slot {}", item.id, slot);
        self.events.broadcast(InventoryEvent::ItemUnequipped {
            slot,
            item: item.clone(),
        });

        Some(item)
    }

    /// Owner's ability system, cached weakly on first use
    fn ability_system(&mut self) -> Option<SharedAbilitySystem> {
        if let Some(system) = self.ability_system.as_ref().and_then(|weak| weak.upgrade()) {
            return Some(system);
        }

        let system = self.owner.find_ability_system()?;
        self.ability_system = Some(Arc::downgrade(&system));
        log::trace!("Cached ability system for owner {}", self.owner.actor_id());
        Some(system)
    }
}

impl fmt::Debug for InventoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryManager")
            .field("owner", &self.owner.actor_id())
            .field("role", &self.owner.role())
            .field("storage_ready", &self.is_storage_ready())
            .field("equipped", &self.slots.equipped_count())
            .field("slots", &self.slots.len())
            .finish()
    }
}
