//! The ability-system seam

use crate::spec::{
    AbilitySpec, AbilitySpecHandle, ActiveEffectHandle, EffectClass, EffectContext, EffectSpec,
};
use crate::tag::TagContainer;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Ability system shared between gameplay subsystems
pub type SharedAbilitySystem = Arc<Mutex<dyn AbilitySystem>>;

/// Non-owning reference to a shared ability system
pub type WeakAbilitySystem = Weak<Mutex<dyn AbilitySystem>>;

/// Owns an actor's abilities, active effects and loose tags.
///
/// Callers must only clear or remove handles they produced themselves;
/// the system is shared with other gameplay code.
pub trait AbilitySystem: Send {
    /// Grant an ability and return its handle
    fn give_ability(&mut self, spec: AbilitySpec) -> AbilitySpecHandle;

    /// Remove a previously granted ability. Unknown handles are ignored.
    fn clear_ability(&mut self, handle: AbilitySpecHandle);

    /// Create a context for outgoing effects
    fn make_effect_context(&self) -> EffectContext;

    /// Build an outgoing effect spec, or `None` if the class cannot be applied
    fn make_outgoing_spec(
        &self,
        class: &EffectClass,
        level: i32,
        context: EffectContext,
    ) -> Option<EffectSpec>;

    /// Apply a spec to the owner. Instant effects return an invalid handle.
    fn apply_effect_spec_to_self(&mut self, spec: &EffectSpec) -> ActiveEffectHandle;

    /// Remove an active effect. Returns false if it was not active.
    fn remove_active_effect(&mut self, handle: ActiveEffectHandle) -> bool;

    /// Add loose tags (reference counted per tag)
    fn add_loose_tags(&mut self, tags: &TagContainer);

    /// Remove one reference of each loose tag
    fn remove_loose_tags(&mut self, tags: &TagContainer);

    /// All tags the owner currently has
    fn owned_tags(&self) -> TagContainer;
}
