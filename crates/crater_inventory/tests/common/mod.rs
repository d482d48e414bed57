//! Shared fixture: an actor carrying storage, an ability system and a
//! small item catalog

#![allow(dead_code)]

use crater_ability::prelude::*;
use crater_core::ConnectionId;
use crater_event::Subscription;
use crater_inventory::prelude::*;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

pub const OWNER: ActorId = ActorId(7);
pub const OWNER_CONNECTION: ConnectionId = ConnectionId(1);

pub struct TestActor {
    pub role: NetRole,
    pub storage: Option<Arc<RwLock<ItemStore>>>,
    pub abilities: Option<Arc<Mutex<LocalAbilitySystem>>>,
}

impl InventoryOwner for TestActor {
    fn actor_id(&self) -> ActorId {
        OWNER
    }

    fn role(&self) -> NetRole {
        self.role
    }

    fn owning_connection(&self) -> Option<ConnectionId> {
        Some(OWNER_CONNECTION)
    }

    fn find_storage(&self) -> Option<SharedStorage> {
        self.storage.clone().map(|storage| storage as SharedStorage)
    }

    fn find_ability_system(&self) -> Option<SharedAbilitySystem> {
        self.abilities
            .clone()
            .map(|abilities| abilities as SharedAbilitySystem)
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Items used across tests:
///
/// | id              | slot rule      | grants                                  |
/// |-----------------|----------------|-----------------------------------------|
/// | `Weapon.Sword`  | required 0     | `GA.Slash`, tag `Equipped.Sword`        |
/// | `Weapon.Axe`    | required 0     | `GA.Chop`                               |
/// | `Armor.Shield`  | preferred 1    | `GA.Block`, effect `GE.Armor`           |
/// | `Ring.Gated`    | preferred 2    | needs `Combat.Ready`                    |
/// | `Ring.Cursed`   | preferred 2    | blocked by `Status.Blessed`             |
/// | `Trinket.Plain` | preferred 2    | nothing (no template)                   |
/// | `Misc.Rock`     | -              | not equippable                          |
/// | `Misc.Stick`    | -              | basic data only                         |
pub fn catalog() -> ItemCatalog {
    ItemCatalog::new()
        .with_definition(
            ItemDefinition::new("Weapon.Sword", "Sword")
                .with_template(TemplateRef::new("/Items/Sword"))
                .equippable(),
        )
        .with_template(
            ItemTemplate::new(TemplateRef::new("/Items/Sword"), "Iron Sword").with_fragment(
                EquippableFragment::new()
                    .with_required_slot(0)
                    .with_ability("GA.Slash")
                    .with_equipped_tags(TagContainer::from_names(["Equipped.Sword"])),
            ),
        )
        .with_definition(
            ItemDefinition::new("Weapon.Axe", "Axe")
                .with_template(TemplateRef::new("/Items/Axe"))
                .equippable(),
        )
        .with_template(
            ItemTemplate::new(TemplateRef::new("/Items/Axe"), "Axe").with_fragment(
                EquippableFragment::new()
                    .with_required_slot(0)
                    .with_ability("GA.Chop"),
            ),
        )
        .with_definition(
            ItemDefinition::new("Armor.Shield", "Shield")
                .with_template(TemplateRef::new("/Items/Shield"))
                .with_preferred_slot(1)
                .equippable(),
        )
        .with_template(
            ItemTemplate::new(TemplateRef::new("/Items/Shield"), "Shield").with_fragment(
                EquippableFragment::new()
                    .with_ability("GA.Block")
                    .with_effect("GE.Armor"),
            ),
        )
        .with_definition(
            ItemDefinition::new("Ring.Gated", "Gated Ring")
                .with_template(TemplateRef::new("/Items/GatedRing"))
                .with_preferred_slot(2)
                .equippable(),
        )
        .with_template(
            ItemTemplate::new(TemplateRef::new("/Items/GatedRing"), "Gated Ring").with_fragment(
                EquippableFragment::new()
                    .with_required_tags(TagContainer::from_names(["Combat.Ready"])),
            ),
        )
        .with_definition(
            ItemDefinition::new("Ring.Cursed", "Cursed Ring")
                .with_template(TemplateRef::new("/Items/CursedRing"))
                .with_preferred_slot(2)
                .equippable(),
        )
        .with_template(
            ItemTemplate::new(TemplateRef::new("/Items/CursedRing"), "Cursed Ring").with_fragment(
                EquippableFragment::new()
                    .with_blocking_tags(TagContainer::from_names(["Status.Blessed"])),
            ),
        )
        .with_definition(
            ItemDefinition::new("Trinket.Plain", "Trinket")
                .with_preferred_slot(2)
                .equippable(),
        )
        .with_definition(ItemDefinition::new("Misc.Rock", "Rock"))
        .with_basic("Misc.Stick", "Stick")
}

pub struct Harness {
    pub manager: InventoryManager,
    pub storage: Arc<RwLock<ItemStore>>,
    pub abilities: Arc<Mutex<LocalAbilitySystem>>,
    pub events: Subscription<InventoryEvent>,
}

impl Harness {
    pub fn new(items: &[(&str, u32)]) -> Self {
        Self::build(items, InventoryConfig::default(), NetRole::Authority)
    }

    pub fn build(items: &[(&str, u32)], config: InventoryConfig, role: NetRole) -> Self {
        init_logging();

        let storage = Arc::new(RwLock::new(ItemStore::with_items(
            items.iter().map(|(id, quantity)| ItemInfo::new(*id, *quantity)),
        )));
        let abilities = Arc::new(Mutex::new(
            LocalAbilitySystem::new(OWNER).with_effect("GE.Armor", EffectDefinition::lasting()),
        ));

        let owner = Arc::new(TestActor {
            role,
            storage: Some(Arc::clone(&storage)),
            abilities: Some(Arc::clone(&abilities)),
        });
        let definitions = Arc::new(DefinitionAdapter::new(Arc::new(catalog())));

        let mut manager = InventoryManager::new(owner, definitions).with_config(config);
        let events = manager.subscribe();
        manager.begin_play();
        events.drain();

        Self {
            manager,
            storage,
            abilities,
            events,
        }
    }

    /// Storage contents as (id, quantity) pairs
    pub fn contents(&self) -> Vec<(String, u32)> {
        self.storage
            .read()
            .items()
            .iter()
            .map(|item| (item.id.as_str().to_string(), item.quantity))
            .collect()
    }

    /// Mutate storage behind the manager's back and let it catch up
    pub fn external_discard(&mut self, id: &str, quantity: u32) {
        self.storage
            .write()
            .discard_items(&[ItemInfo::new(id, quantity)]);
        self.manager.poll_storage_updates();
    }

    pub fn ability_count(&self) -> usize {
        self.abilities.lock().ability_count()
    }

    pub fn has_loose_tag(&self, tag: &str) -> bool {
        self.abilities.lock().loose_tag_count(&GameplayTag::new(tag)) > 0
    }

    /// Check every structural invariant of the slot table against storage
    /// and the ability system
    pub fn assert_consistent(&self) {
        let slots = self.manager.equipped_items();
        assert_eq!(slots.len(), self.manager.max_equipment_slots());

        let storage = self.storage.read();
        let mut seen_indices = Vec::new();
        let mut held_abilities = Vec::new();
        let mut held_effects = Vec::new();

        for entry in slots.iter().filter(|entry| entry.is_valid()) {
            let index = entry.storage_index().unwrap();
            assert!(!seen_indices.contains(&index), "two slots reference index {}", index);
            seen_indices.push(index);

            assert!(
                storage.items().iter().any(|item| item.id == entry.item().id),
                "equipped {} missing from storage",
                entry.item().id
            );
            held_abilities.extend_from_slice(entry.granted_ability_handles());
            held_effects.extend_from_slice(entry.applied_effect_handles());
        }

        for entry in slots.iter().filter(|entry| !entry.is_valid()) {
            assert!(!entry.has_grants());
        }

        let abilities = self.abilities.lock();
        held_abilities.sort();
        held_effects.sort();
        assert_eq!(held_abilities, abilities.ability_handles());
        assert_eq!(held_effects, abilities.active_effect_handles());
    }
}
