//! Crater Features - Component Injection for Feature Activation
//!
//! A feature that brings the inventory manager to a game does not edit
//! actor classes. It registers "actor class X gets component Y" requests
//! with a component manager when activated, and drops them again when
//! deactivated.
//!
//! # Example
//!
//! ```ignore
//! use crater_features::prelude::*;
//!
//! let mut action = AddComponentsAction::new()
//!     .with_entry(ComponentEntry::new("Character.Hero", "Crater.InventoryManager"));
//! action.is_data_valid()?;
//!
//! let components = ComponentManager::new();
//! let world = WorldContext::game(NetMode::ListenServer, Some(components.clone()));
//!
//! action.on_activating(FeatureContext(1));
//! action.add_to_world(&world, FeatureContext(1));
//! ```

pub mod action;
pub mod components;
pub mod error;

pub mod prelude {
    pub use crate::action::{AddComponentsAction, ComponentEntry, FeatureContext, NetMode, WorldContext};
    pub use crate::components::{ComponentManager, ComponentRequestHandle};
    pub use crate::error::ValidationError;
}

pub use prelude::*;
