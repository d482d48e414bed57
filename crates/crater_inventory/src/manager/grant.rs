//! Grant and revoke of equipped-item abilities, effects and tags

use super::InventoryManager;
use crate::fragment::EquippableFragment;
use crate::item::ItemInfo;
use crater_ability::AbilitySpec;

impl InventoryManager {
    /// Grant everything the fragment lists to the owner and record the
    /// handles on the slot. Without an ability system the equip stands
    /// with nothing granted.
    pub(super) fn grant(
        &mut self,
        slot: usize,
        item: &ItemInfo,
        fragment: Option<&EquippableFragment>,
    ) {
        let Some(system) = self.ability_system() else {
            log::trace!("No ability system on owner, skipping grants for {}", item.id);
            return;
        };
        let Some(fragment) = fragment else {
            log::trace!("Item {} has no equippable fragment", item.id);
            return;
        };

        let source = self.owner.actor_id();
        let Some(entry) = self.slots.get_mut(slot) else {
            return;
        };
        let mut system = system.lock();

        for class in fragment.abilities.iter().filter(|class| !class.is_null()) {
            let handle = system.give_ability(AbilitySpec::new(class.clone(), 1, source));
            entry.granted_abilities.push(handle);
            log::debug!("Granted ability {} from item {}", class, item.id);
        }

        for class in fragment.effects.iter().filter(|class| !class.is_null()) {
            let mut context = system.make_effect_context();
            context.add_source_object(source);

            let Some(spec) = system.make_outgoing_spec(class, 1, context) else {
                continue;
            };

            let handle = system.apply_effect_spec_to_self(&spec);
            if handle.is_valid() {
                entry.applied_effects.push(handle);
                log::debug!("Applied effect {} from item {}", class, item.id);
            }
        }

        if !fragment.equipped_tags.is_empty() {
            system.add_loose_tags(&fragment.equipped_tags);
            entry.granted_tags = fragment.equipped_tags.clone();
            log::debug!(
                "Applied {} equipped tags from item {}",
                fragment.equipped_tags.len(),
                item.id
            );
        }

        log::info!(
            "Granted {} abilities, {} effects, {} tags from item {}",
            entry.granted_abilities.len(),
            entry.applied_effects.len(),
            entry.granted_tags.len(),
            item.id
        );
    }

    /// Undo every recorded grant on a slot. Safe to call repeatedly; the
    /// handle lists are always cleared.
    pub(super) fn revoke(&mut self, slot: usize) {
        if !self.slots.is_valid_slot(slot) {
            return;
        }

        let system = self.ability_system();
        let Some(entry) = self.slots.get_mut(slot) else {
            return;
        };

        let Some(system) = system else {
            entry.granted_abilities.clear();
            entry.applied_effects.clear();
            entry.granted_tags.reset();
            return;
        };
        let mut system = system.lock();

        if !entry.granted_abilities.is_empty() {
            let count = entry.granted_abilities.len();
            for handle in entry.granted_abilities.drain(..) {
                system.clear_ability(handle);
            }
            log::debug!("Revoked {} abilities from equipment slot {}", count, slot);
        }

        if !entry.applied_effects.is_empty() {
            let count = entry.applied_effects.len();
            for handle in entry.applied_effects.drain(..) {
                system.remove_active_effect(handle);
            }
            log::debug!("Removed {} effects from equipment slot {}", count, slot);
        }

        if !entry.granted_tags.is_empty() {
            system.remove_loose_tags(&entry.granted_tags);
            log::debug!(
                "Removed {} tags from equipment slot {}",
                entry.granted_tags.len(),
                slot
            );
            entry.granted_tags.reset();
        }
    }
}
