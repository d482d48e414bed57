//! The "add components" feature action

use crate::components::{ComponentManager, ComponentRequestHandle};
use crate::error::ValidationError;
use crater_core::NamedId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Identifies one activation of a feature (one per world/game instance)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureContext(pub u64);

/// Network mode of a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetMode {
    Standalone,
    DedicatedServer,
    ListenServer,
    Client,
}

impl NetMode {
    /// Worlds that run server logic
    pub fn is_server(&self) -> bool {
        *self != Self::Client
    }

    /// Worlds that run client logic
    pub fn is_client(&self) -> bool {
        *self != Self::DedicatedServer
    }
}

/// A world the feature is being added to
#[derive(Debug, Clone)]
pub struct WorldContext {
    pub net_mode: NetMode,
    /// Editor preview and inactive worlds are not game worlds
    pub is_game_world: bool,
    pub components: Option<Arc<ComponentManager>>,
}

impl WorldContext {
    /// A game world
    pub fn game(net_mode: NetMode, components: Option<Arc<ComponentManager>>) -> Self {
        Self {
            net_mode,
            is_game_world: true,
            components,
        }
    }
}

fn default_true() -> bool {
    true
}

/// One actor class / component class pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEntry {
    pub actor_class: NamedId,
    pub component_class: NamedId,
    /// Add the component on clients
    #[serde(default = "default_true")]
    pub client_component: bool,
    /// Add the component on servers
    #[serde(default = "default_true")]
    pub server_component: bool,
}

impl ComponentEntry {
    /// Create an entry targeting both sides
    pub fn new(actor_class: &str, component_class: &str) -> Self {
        Self {
            actor_class: NamedId::new(actor_class),
            component_class: NamedId::new(component_class),
            client_component: true,
            server_component: true,
        }
    }

    /// Only add on servers
    pub fn server_only(mut self) -> Self {
        self.client_component = false;
        self.server_component = true;
        self
    }

    /// Only add on clients
    pub fn client_only(mut self) -> Self {
        self.client_component = true;
        self.server_component = false;
        self
    }

    fn targets(&self, net_mode: NetMode) -> bool {
        (net_mode.is_server() && self.server_component)
            || (net_mode.is_client() && self.client_component)
    }
}

/// Adds components to actor classes while a feature is active
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AddComponentsAction {
    pub component_list: Vec<ComponentEntry>,
    #[serde(skip)]
    context_data: HashMap<FeatureContext, Vec<ComponentRequestHandle>>,
}

impl AddComponentsAction {
    /// Create an action with no entries
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an action from JSON
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add an entry
    pub fn with_entry(mut self, entry: ComponentEntry) -> Self {
        self.component_list.push(entry);
        self
    }

    /// Check every entry, reporting all problems found
    pub fn is_data_valid(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (index, entry) in self.component_list.iter().enumerate() {
            if entry.actor_class.is_empty() {
                errors.push(ValidationError::NullActorClass(index));
            }
            if entry.component_class.is_empty() {
                errors.push(ValidationError::NullComponentClass(index));
            }
            if !entry.client_component && !entry.server_component {
                errors.push(ValidationError::NoTarget(index));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Prepare a context. Requests left over from a previous activation
    /// are released.
    pub fn on_activating(&mut self, context: FeatureContext) {
        let requests = self.context_data.entry(context).or_default();
        if !requests.is_empty() {
            log::warn!(
                "Feature context {:?} activated with {} stale component requests",
                context,
                requests.len()
            );
            requests.clear();
        }
    }

    /// Register requests for every entry that applies to this world
    pub fn add_to_world(&mut self, world: &WorldContext, context: FeatureContext) {
        let requests = self.context_data.entry(context).or_default();

        if !world.is_game_world {
            return;
        }

        let Some(components) = &world.components else {
            log::error!("Component manager not available for feature component requests");
            return;
        };

        for entry in &self.component_list {
            if entry.actor_class.is_empty() || entry.component_class.is_empty() {
                continue;
            }
            if !entry.targets(world.net_mode) {
                continue;
            }

            requests.push(components.add_component_request(
                entry.actor_class.clone(),
                entry.component_class.clone(),
            ));
            log::info!(
                "Feature registered component request: {} -> {}",
                entry.actor_class,
                entry.component_class
            );
        }
    }

    /// Release every request made for a context
    pub fn on_deactivating(&mut self, context: FeatureContext) {
        match self.context_data.remove(&context) {
            Some(requests) => {
                log::debug!(
                    "Releasing {} component requests for {:?}",
                    requests.len(),
                    context
                );
            }
            None => log::warn!("Feature context {:?} deactivated but never activated", context),
        }
    }

    /// Live requests held for a context
    pub fn active_requests(&self, context: FeatureContext) -> usize {
        self.context_data
            .get(&context)
            .map(Vec::len)
            .unwrap_or(0)
    }
}
