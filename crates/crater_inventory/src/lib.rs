//! Crater Inventory - Server-Authoritative Inventory and Equipment
//!
//! Bridges an item storage (which owns the item list) and an ability system
//! (which owns abilities, effects and tags). The manager adds an equipment
//! slot table on top of storage and keeps every ability grant tied to the
//! slot that caused it.
//!
//! # Features
//!
//! - Authority-gated add / remove / discard / swap / equip / unequip
//! - Ordered equip validation with a typed result
//! - Required-slot and preferred-slot auto selection
//! - Symmetric grant and revoke of abilities, effects and loose tags
//! - Id-based reconciliation after any storage change
//! - Owner-only slot table replication and client request queueing
//!
//! # Example
//!
//! ```ignore
//! use crater_inventory::prelude::*;
//!
//! let mut manager = InventoryManager::new(owner, definitions)
//!     .with_config(InventoryConfig::default().with_max_equipment_slots(4));
//! manager.begin_play();
//!
//! manager.add_item("Weapon.Sword", 1)?;
//! let slot = manager.equip_item(0, AUTO_EQUIP_SLOT)?;
//! ```

pub mod config;
pub mod definition;
pub mod equipment;
pub mod error;
pub mod events;
pub mod fragment;
pub mod item;
pub mod manager;
pub mod owner;
pub mod request;
pub mod storage;

pub mod prelude {
    pub use crate::config::{InventoryConfig, AUTO_EQUIP_SLOT};
    pub use crate::definition::{
        BasicItemData, DefinitionAdapter, ItemCatalog, ItemData, ItemDataSource, ItemDefinition,
        ItemFragment, ItemInstance, ItemTemplate, TemplateRef,
    };
    pub use crate::equipment::{SlotEntry, SlotTable};
    pub use crate::error::{ConfigError, EquipResult, InventoryError};
    pub use crate::events::InventoryEvent;
    pub use crate::fragment::EquippableFragment;
    pub use crate::item::{ItemId, ItemInfo};
    pub use crate::manager::{InventoryManager, ReplicatedSlot};
    pub use crate::owner::{InventoryOwner, NetRole};
    pub use crate::request::InventoryRequest;
    pub use crate::storage::{InventoryStorage, ItemStore, SharedStorage, StorageUpdate};
}

pub use prelude::*;
