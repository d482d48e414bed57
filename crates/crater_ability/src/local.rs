//! In-process ability system

use crate::spec::{
    AbilityClass, AbilitySpec, AbilitySpecHandle, ActiveEffectHandle, EffectClass, EffectContext,
    EffectSpec,
};
use crate::system::{AbilitySystem, SharedAbilitySystem};
use crate::tag::{GameplayTag, TagContainer};
use crater_core::{ActorId, IdGenerator};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// How an effect class behaves when applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectDefinition {
    /// Instant effects execute once and never become active
    pub instant: bool,
    /// Tags granted to the owner while the effect is active
    pub granted_tags: TagContainer,
}

impl EffectDefinition {
    /// A duration effect granting no tags
    pub fn lasting() -> Self {
        Self::default()
    }

    /// An instant effect
    pub fn instant() -> Self {
        Self {
            instant: true,
            granted_tags: TagContainer::new(),
        }
    }

    /// Grant tags while active
    pub fn with_granted_tags(mut self, tags: TagContainer) -> Self {
        self.granted_tags = tags;
        self
    }
}

/// Ability system kept entirely in memory.
///
/// Effect classes must be registered before specs can be made for them.
#[derive(Debug)]
pub struct LocalAbilitySystem {
    owner: ActorId,
    handles: IdGenerator,
    abilities: BTreeMap<AbilitySpecHandle, AbilitySpec>,
    effect_definitions: HashMap<EffectClass, EffectDefinition>,
    active_effects: BTreeMap<ActiveEffectHandle, EffectSpec>,
    executed_instant_effects: u32,
    owned_tags: TagContainer,
    loose_tag_counts: BTreeMap<GameplayTag, u32>,
}

impl LocalAbilitySystem {
    /// Create an ability system for an owner
    pub fn new(owner: ActorId) -> Self {
        Self {
            owner,
            handles: IdGenerator::new(),
            abilities: BTreeMap::new(),
            effect_definitions: HashMap::new(),
            active_effects: BTreeMap::new(),
            executed_instant_effects: 0,
            owned_tags: TagContainer::new(),
            loose_tag_counts: BTreeMap::new(),
        }
    }

    /// Wrap into the shared form the inventory manager locates
    pub fn into_shared(self) -> SharedAbilitySystem {
        Arc::new(Mutex::new(self))
    }

    /// Register an effect class
    pub fn register_effect(&mut self, class: impl Into<EffectClass>, definition: EffectDefinition) {
        self.effect_definitions.insert(class.into(), definition);
    }

    /// Register an effect class (builder form)
    pub fn with_effect(mut self, class: impl Into<EffectClass>, definition: EffectDefinition) -> Self {
        self.register_effect(class, definition);
        self
    }

    /// Give the owner a tag that is not loose (e.g. from its archetype)
    pub fn add_owned_tag(&mut self, tag: GameplayTag) {
        self.owned_tags.add(tag);
    }

    /// Remove a tag added with `add_owned_tag`
    pub fn remove_owned_tag(&mut self, tag: &GameplayTag) {
        self.owned_tags.remove(tag);
    }

    /// Owner this system belongs to
    pub fn owner(&self) -> ActorId {
        self.owner
    }

    /// Look up a granted ability
    pub fn ability(&self, handle: AbilitySpecHandle) -> Option<&AbilitySpec> {
        self.abilities.get(&handle)
    }

    /// Handles of all granted abilities
    pub fn ability_handles(&self) -> Vec<AbilitySpecHandle> {
        self.abilities.keys().copied().collect()
    }

    /// Number of granted abilities
    pub fn ability_count(&self) -> usize {
        self.abilities.len()
    }

    /// Number of granted abilities of a class
    pub fn ability_count_of(&self, class: &AbilityClass) -> usize {
        self.abilities.values().filter(|spec| &spec.class == class).count()
    }

    /// Handles of all active effects
    pub fn active_effect_handles(&self) -> Vec<ActiveEffectHandle> {
        self.active_effects.keys().copied().collect()
    }

    /// Number of active effects
    pub fn active_effect_count(&self) -> usize {
        self.active_effects.len()
    }

    /// Number of instant effects executed so far
    pub fn executed_instant_effects(&self) -> u32 {
        self.executed_instant_effects
    }

    /// Reference count of a loose tag
    pub fn loose_tag_count(&self, tag: &GameplayTag) -> u32 {
        self.loose_tag_counts.get(tag).copied().unwrap_or(0)
    }
}

impl AbilitySystem for LocalAbilitySystem {
    fn give_ability(&mut self, spec: AbilitySpec) -> AbilitySpecHandle {
        if spec.class.is_null() {
            return AbilitySpecHandle::INVALID;
        }
        let handle = AbilitySpecHandle(self.handles.next());
        log::trace!("Granted ability {} as {:?}", spec.class, handle);
        self.abilities.insert(handle, spec);
        handle
    }

    fn clear_ability(&mut self, handle: AbilitySpecHandle) {
        if self.abilities.remove(&handle).is_none() {
            log::trace!("Ignoring clear of unknown ability {:?}", handle);
        }
    }

    fn make_effect_context(&self) -> EffectContext {
        EffectContext::new(self.owner)
    }

    fn make_outgoing_spec(
        &self,
        class: &EffectClass,
        level: i32,
        context: EffectContext,
    ) -> Option<EffectSpec> {
        if !self.effect_definitions.contains_key(class) {
            log::debug!("No effect definition registered for {}", class);
            return None;
        }
        Some(EffectSpec {
            class: class.clone(),
            level,
            context,
        })
    }

    fn apply_effect_spec_to_self(&mut self, spec: &EffectSpec) -> ActiveEffectHandle {
        let Some(definition) = self.effect_definitions.get(&spec.class) else {
            return ActiveEffectHandle::INVALID;
        };
        if definition.instant {
            self.executed_instant_effects += 1;
            return ActiveEffectHandle::INVALID;
        }
        let handle = ActiveEffectHandle(self.handles.next());
        self.active_effects.insert(handle, spec.clone());
        handle
    }

    fn remove_active_effect(&mut self, handle: ActiveEffectHandle) -> bool {
        self.active_effects.remove(&handle).is_some()
    }

    fn add_loose_tags(&mut self, tags: &TagContainer) {
        for tag in tags {
            *self.loose_tag_counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }

    fn remove_loose_tags(&mut self, tags: &TagContainer) {
        for tag in tags {
            if let Some(count) = self.loose_tag_counts.get_mut(tag) {
                *count -= 1;
                if *count == 0 {
                    self.loose_tag_counts.remove(tag);
                }
            }
        }
    }

    fn owned_tags(&self) -> TagContainer {
        let mut tags = self.owned_tags.clone();
        for tag in self.loose_tag_counts.keys() {
            tags.add(tag.clone());
        }
        for spec in self.active_effects.values() {
            if let Some(definition) = self.effect_definitions.get(&spec.class) {
                tags.append(&definition.granted_tags);
            }
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asc() -> LocalAbilitySystem {
        LocalAbilitySystem::new(ActorId(1))
            .with_effect("GE.Armor", EffectDefinition::lasting().with_granted_tags(
                TagContainer::from_names(["Status.Armored"]),
            ))
            .with_effect("GE.Heal", EffectDefinition::instant())
    }

    #[test]
    fn test_give_and_clear_ability() {
        let mut asc = asc();

        let handle = asc.give_ability(AbilitySpec::new("GA.Slash", 1, ActorId(1)));
        assert!(handle.is_valid());
        assert_eq!(asc.ability_count(), 1);
        assert_eq!(asc.ability(handle).map(|s| s.level), Some(1));

        asc.clear_ability(handle);
        asc.clear_ability(handle);
        assert_eq!(asc.ability_count(), 0);
    }

    #[test]
    fn test_null_ability_is_not_granted() {
        let mut asc = asc();
        let handle = asc.give_ability(AbilitySpec::new(AbilityClass::null(), 1, ActorId(1)));
        assert!(!handle.is_valid());
        assert_eq!(asc.ability_count(), 0);
    }

    #[test]
    fn test_effects() {
        let mut asc = asc();
        let ctx = asc.make_effect_context();

        assert!(asc.make_outgoing_spec(&"GE.Unknown".into(), 1, ctx.clone()).is_none());

        let heal = asc.make_outgoing_spec(&"GE.Heal".into(), 1, ctx.clone()).unwrap();
        assert!(!asc.apply_effect_spec_to_self(&heal).is_valid());
        assert_eq!(asc.executed_instant_effects(), 1);

        let armor = asc.make_outgoing_spec(&"GE.Armor".into(), 1, ctx).unwrap();
        let handle = asc.apply_effect_spec_to_self(&armor);
        assert!(handle.is_valid());
        assert!(asc.owned_tags().has_tag(&GameplayTag::new("Status.Armored")));

        assert!(asc.remove_active_effect(handle));
        assert!(!asc.remove_active_effect(handle));
        assert!(!asc.owned_tags().has_tag(&GameplayTag::new("Status.Armored")));
    }

    #[test]
    fn test_loose_tags_are_counted() {
        let mut asc = asc();
        let tags = TagContainer::from_names(["Equipped.Sword"]);
        let tag = GameplayTag::new("Equipped.Sword");

        asc.add_loose_tags(&tags);
        asc.add_loose_tags(&tags);
        assert_eq!(asc.loose_tag_count(&tag), 2);

        asc.remove_loose_tags(&tags);
        assert!(asc.owned_tags().has_tag(&tag));

        asc.remove_loose_tags(&tags);
        asc.remove_loose_tags(&tags);
        assert_eq!(asc.loose_tag_count(&tag), 0);
        assert!(!asc.owned_tags().has_tag(&tag));
    }

    #[test]
    fn test_owned_tags_include_base_tags() {
        let mut asc = asc();
        asc.add_owned_tag(GameplayTag::new("Combat.Ready"));
        assert!(asc.owned_tags().has_tag(&GameplayTag::new("Combat")));

        asc.remove_owned_tag(&GameplayTag::new("Combat.Ready"));
        assert!(asc.owned_tags().is_empty());
    }
}
