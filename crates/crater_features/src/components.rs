//! Component manager with reference-counted requests

use crater_core::NamedId;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

type RequestKey = (NamedId, NamedId);

/// Tracks which component classes are attached to which actor classes.
///
/// An association lives while at least one `ComponentRequestHandle` for it
/// is alive.
#[derive(Default)]
pub struct ComponentManager {
    requests: Mutex<BTreeMap<RequestKey, u32>>,
}

impl ComponentManager {
    /// Create a shared manager
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Request that actors of `actor_class` receive `component_class`
    pub fn add_component_request(
        self: &Arc<Self>,
        actor_class: NamedId,
        component_class: NamedId,
    ) -> ComponentRequestHandle {
        let key = (actor_class, component_class);
        let mut requests = self.requests.lock();
        let count = requests.entry(key.clone()).or_insert(0);
        *count += 1;

        if *count == 1 {
            log::debug!("Component {} now added to {}", key.1, key.0);
        }

        ComponentRequestHandle {
            manager: Arc::downgrade(self),
            key,
        }
    }

    /// Component classes currently requested for an actor class
    pub fn components_for(&self, actor_class: &NamedId) -> Vec<NamedId> {
        self.requests
            .lock()
            .keys()
            .filter(|(actor, _)| actor == actor_class)
            .map(|(_, component)| component.clone())
            .collect()
    }

    /// Live handles for one association
    pub fn request_count(&self, actor_class: &NamedId, component_class: &NamedId) -> u32 {
        self.requests
            .lock()
            .get(&(actor_class.clone(), component_class.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Check if an association is active
    pub fn has_request(&self, actor_class: &NamedId, component_class: &NamedId) -> bool {
        self.request_count(actor_class, component_class) > 0
    }

    /// Number of active associations
    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    /// Check if nothing is requested
    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }

    fn release(&self, key: &RequestKey) {
        let mut requests = self.requests.lock();
        if let Some(count) = requests.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                requests.remove(key);
                log::debug!("Component {} no longer added to {}", key.1, key.0);
            }
        }
    }
}

impl fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentManager")
            .field("associations", &self.len())
            .finish()
    }
}

/// Keeps one component request alive. Dropping it releases the request.
pub struct ComponentRequestHandle {
    manager: Weak<ComponentManager>,
    key: RequestKey,
}

impl ComponentRequestHandle {
    /// Actor class of the request
    pub fn actor_class(&self) -> &NamedId {
        &self.key.0
    }

    /// Component class of the request
    pub fn component_class(&self) -> &NamedId {
        &self.key.1
    }
}

impl fmt::Debug for ComponentRequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentRequestHandle({} -> {})", self.key.0, self.key.1)
    }
}

impl Drop for ComponentRequestHandle {
    fn drop(&mut self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.release(&self.key);
        }
    }
}
