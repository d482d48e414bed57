//! Ability/effect classes, specs and handles

use crater_core::{ActorId, NamedId};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! class_ref {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NamedId);

        impl $name {
            /// Create a class reference from its path
            pub fn new(path: &str) -> Self {
                Self(NamedId::new(path))
            }

            /// An unset reference
            pub fn null() -> Self {
                Self(NamedId::empty())
            }

            /// Check whether the reference is unset
            pub fn is_null(&self) -> bool {
                self.0.is_empty()
            }

            /// Class path
            pub fn path(&self) -> &str {
                self.0.name()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.path())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

class_ref!(
    /// Reference to a gameplay ability class
    AbilityClass
);

class_ref!(
    /// Reference to a gameplay effect class
    EffectClass
);

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            /// The invalid handle
            pub const INVALID: Self = Self(0);

            /// Check whether the handle refers to something
            #[inline]
            pub const fn is_valid(&self) -> bool {
                self.0 != 0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

handle!(
    /// Handle to a granted ability spec
    AbilitySpecHandle
);

handle!(
    /// Handle to an active gameplay effect
    ActiveEffectHandle
);

/// Description of an ability to grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbilitySpec {
    pub class: AbilityClass,
    pub level: i32,
    pub input_id: Option<i32>,
    /// Object that caused the grant
    pub source: ActorId,
}

impl AbilitySpec {
    /// Create a spec with no input binding
    pub fn new(class: impl Into<AbilityClass>, level: i32, source: ActorId) -> Self {
        Self {
            class: class.into(),
            level,
            input_id: None,
            source,
        }
    }

    /// Bind the ability to an input id
    pub fn with_input_id(mut self, input_id: i32) -> Self {
        self.input_id = Some(input_id);
        self
    }
}

/// Context carried by an outgoing effect spec
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectContext {
    pub instigator: ActorId,
    pub source_objects: Vec<ActorId>,
}

impl EffectContext {
    /// Create a context for an instigator
    pub fn new(instigator: ActorId) -> Self {
        Self {
            instigator,
            source_objects: Vec::new(),
        }
    }

    /// Record a source object
    pub fn add_source_object(&mut self, source: ActorId) {
        if !self.source_objects.contains(&source) {
            self.source_objects.push(source);
        }
    }
}

/// An effect ready to be applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectSpec {
    pub class: EffectClass,
    pub level: i32,
    pub context: EffectContext,
}
