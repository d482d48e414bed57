//! Inventory manager configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Fewest equipment slots a manager may have
pub const MIN_EQUIPMENT_SLOTS: usize = 1;

/// Most equipment slots a manager may have
pub const MAX_EQUIPMENT_SLOTS: usize = 10;

/// Equipment slot argument meaning "pick a slot for me"
pub const AUTO_EQUIP_SLOT: Option<usize> = None;

/// Inventory manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Number of equipment slots (1-10)
    pub max_equipment_slots: usize,

    /// When auto-equipping and neither the required nor the preferred
    /// slot applies, fall back to the first empty slot
    pub fallback_to_first_free_slot: bool,

    /// Reject removal by id while that id is equipped, like discard does
    pub protect_equipped_on_remove: bool,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            max_equipment_slots: 3,
            fallback_to_first_free_slot: false,
            protect_equipped_on_remove: false,
        }
    }
}

impl InventoryConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Set the number of equipment slots
    pub fn with_max_equipment_slots(mut self, slots: usize) -> Self {
        self.max_equipment_slots = slots;
        self
    }

    /// Enable the first-free-slot fallback for auto-equip
    pub fn with_first_free_slot_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_first_free_slot = enabled;
        self
    }

    /// Protect equipped items from removal by id
    pub fn with_equipped_remove_protection(mut self, enabled: bool) -> Self {
        self.protect_equipped_on_remove = enabled;
        self
    }

    /// Clamp out-of-range values
    pub fn validated(mut self) -> Self {
        let clamped = self
            .max_equipment_slots
            .clamp(MIN_EQUIPMENT_SLOTS, MAX_EQUIPMENT_SLOTS);
        if clamped != self.max_equipment_slots {
            log::warn!(
                "max_equipment_slots {} out of range, clamped to {}",
                self.max_equipment_slots,
                clamped
            );
            self.max_equipment_slots = clamped;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InventoryConfig::default();
        assert_eq!(config.max_equipment_slots, 3);
        assert!(!config.fallback_to_first_free_slot);
        assert!(!config.protect_equipped_on_remove);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(
            InventoryConfig::default().with_max_equipment_slots(0).validated().max_equipment_slots,
            1
        );
        assert_eq!(
            InventoryConfig::default().with_max_equipment_slots(42).validated().max_equipment_slots,
            10
        );
        assert_eq!(
            InventoryConfig::default().with_max_equipment_slots(10).validated().max_equipment_slots,
            10
        );
    }

    #[test]
    fn test_from_json() {
        let config = InventoryConfig::from_json_str(
            r#"{ "max_equipment_slots": 12, "protect_equipped_on_remove": true }"#,
        )
        .unwrap();

        assert_eq!(config.max_equipment_slots, 10);
        assert!(config.protect_equipped_on_remove);
        assert!(!config.fallback_to_first_free_slot);

        assert!(InventoryConfig::from_json_str("{ not json").is_err());
    }
}
