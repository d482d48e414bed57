//! Equippable fragment

use crate::definition::{ItemFragment, ItemInstance, DATA_TARGET};
use crater_ability::{AbilityClass, EffectClass, TagContainer};
use std::any::Any;

/// Makes an item equippable and lists what equipping it grants.
///
/// Abilities and effects are granted in declaration order so revocation
/// mirrors the grant exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquippableFragment {
    /// Abilities granted while equipped
    pub abilities: Vec<AbilityClass>,
    /// Effects applied to the owner while equipped
    pub effects: Vec<EffectClass>,
    /// Loose tags added to the owner while equipped
    pub equipped_tags: TagContainer,
    /// The owner must have all of these to equip
    pub required_tags: TagContainer,
    /// The owner must have none of these to equip
    pub blocking_tags: TagContainer,
    /// Slot this item always goes into, if any
    pub required_slot: Option<usize>,
}

impl EquippableFragment {
    /// Create a fragment that grants nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant an ability
    pub fn with_ability(mut self, class: impl Into<AbilityClass>) -> Self {
        self.abilities.push(class.into());
        self
    }

    /// Apply an effect
    pub fn with_effect(mut self, class: impl Into<EffectClass>) -> Self {
        self.effects.push(class.into());
        self
    }

    /// Set the loose tags added while equipped
    pub fn with_equipped_tags(mut self, tags: TagContainer) -> Self {
        self.equipped_tags = tags;
        self
    }

    /// Set the tags required to equip
    pub fn with_required_tags(mut self, tags: TagContainer) -> Self {
        self.required_tags = tags;
        self
    }

    /// Set the tags that block equipping
    pub fn with_blocking_tags(mut self, tags: TagContainer) -> Self {
        self.blocking_tags = tags;
        self
    }

    /// Pin the item to one slot
    pub fn with_required_slot(mut self, slot: usize) -> Self {
        self.required_slot = Some(slot);
        self
    }

    /// Required tags all present and no blocking tag present
    pub fn can_be_equipped_by(&self, owner_tags: &TagContainer) -> bool {
        if !self.required_tags.is_empty() && !owner_tags.has_all(&self.required_tags) {
            return false;
        }
        if !self.blocking_tags.is_empty() && owner_tags.has_any(&self.blocking_tags) {
            return false;
        }
        true
    }

    /// Number of abilities granted
    pub fn num_abilities(&self) -> usize {
        self.abilities.len()
    }

    /// Number of effects applied
    pub fn num_effects(&self) -> usize {
        self.effects.len()
    }
}

impl ItemFragment for EquippableFragment {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn on_instance_created(&self, instance: &mut ItemInstance) {
        log::debug!(
            target: DATA_TARGET,
            "Equippable fragment initialized for {}. Grants {} abilities, {} effects",
            instance.item(),
            self.num_abilities(),
            self.num_effects()
        );
    }
}
