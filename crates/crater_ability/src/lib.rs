//! Crater Ability - Gameplay Tags and Ability-System Seam
//!
//! The inventory manager grants abilities, applies effects and adds loose
//! tags through the `AbilitySystem` trait. Hosts plug in their own ability
//! system; `LocalAbilitySystem` is a complete in-process implementation.
//!
//! # Features
//!
//! - Hierarchical gameplay tags (`Combat.Ready` matches `Combat`)
//! - Tag containers with `has_all` / `has_any` queries
//! - Typed handles for granted abilities and active effects
//! - Reference-counted loose tags
//!
//! # Example
//!
//! ```ignore
//! use crater_ability::prelude::*;
//!
//! let mut asc = LocalAbilitySystem::new(ActorId(1));
//! let handle = asc.give_ability(AbilitySpec::new("GA.Slash", 1, ActorId(1)));
//! asc.add_loose_tags(&TagContainer::from_names(["Equipped.Sword"]));
//! assert!(asc.owned_tags().has_tag(&GameplayTag::new("Equipped")));
//! ```

pub mod local;
pub mod spec;
pub mod system;
pub mod tag;

pub mod prelude {
    pub use crate::local::{EffectDefinition, LocalAbilitySystem};
    pub use crate::spec::{
        AbilityClass, AbilitySpec, AbilitySpecHandle, ActiveEffectHandle, EffectClass,
        EffectContext, EffectSpec,
    };
    pub use crate::system::{AbilitySystem, SharedAbilitySystem, WeakAbilitySystem};
    pub use crate::tag::{GameplayTag, TagContainer};
    pub use crater_core::ActorId;
}

pub use prelude::*;
