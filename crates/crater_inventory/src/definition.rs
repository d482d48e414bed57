//! Item-definition adapter
//!
//! Storage only knows `ItemId`s. Gameplay behavior lives on templates that
//! the definition side loads on demand:
//!
//! ```text
//! ItemId ──resolve──▶ ItemDefinition ──load_template_sync──▶ ItemTemplate
//!                                                              │
//!                                          find_fragment::<F>()┘
//! ```

use crate::item::ItemId;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Log target for definition-side messages
pub(crate) const DATA_TARGET: &str = "crater_inventory::data";

/// Soft reference to a gameplay template asset
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateRef(pub String);

impl TemplateRef {
    /// Create a reference from an asset path
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Asset path
    pub fn path(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage-side item data without gameplay integration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicItemData {
    pub id: ItemId,
    pub name: String,
}

/// Item data that bridges to a gameplay template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDefinition {
    pub id: ItemId,
    /// Storage-side display name
    pub name: String,
    pub template: Option<TemplateRef>,
    pub equippable: bool,
    /// Slot hint used when equipping without an explicit slot
    pub preferred_slot: Option<usize>,
}

impl ItemDefinition {
    /// Create a non-equippable definition with no template
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            template: None,
            equippable: false,
            preferred_slot: None,
        }
    }

    /// Set the gameplay template
    pub fn with_template(mut self, template: TemplateRef) -> Self {
        self.template = Some(template);
        self
    }

    /// Mark as equippable
    pub fn equippable(mut self) -> Self {
        self.equippable = true;
        self
    }

    /// Set the preferred slot
    pub fn with_preferred_slot(mut self, slot: usize) -> Self {
        self.preferred_slot = Some(slot);
        self
    }
}

/// What the item-data registry returns for an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemData {
    Basic(BasicItemData),
    Integrated(ItemDefinition),
}

impl ItemData {
    /// Storage-side display name
    pub fn name(&self) -> &str {
        match self {
            Self::Basic(data) => &data.name,
            Self::Integrated(def) => &def.name,
        }
    }

    /// The integration subtype, if this data has one
    pub fn as_definition(&self) -> Option<&ItemDefinition> {
        match self {
            Self::Basic(_) => None,
            Self::Integrated(def) => Some(def),
        }
    }

    /// Consume into the integration subtype
    pub fn into_definition(self) -> Option<ItemDefinition> {
        match self {
            Self::Basic(_) => None,
            Self::Integrated(def) => Some(def),
        }
    }
}

/// A typed piece of behavior attached to a template
pub trait ItemFragment: Any + Send + Sync + fmt::Debug {
    /// Upcast for typed lookup
    fn as_any(&self) -> &dyn Any;

    /// Called once for every new instance of the owning template
    fn on_instance_created(&self, _instance: &mut ItemInstance) {}
}

/// A loaded gameplay template
#[derive(Debug, Clone)]
pub struct ItemTemplate {
    pub reference: TemplateRef,
    pub display_name: String,
    pub fragments: Vec<Arc<dyn ItemFragment>>,
}

impl ItemTemplate {
    /// Create a template with no fragments
    pub fn new(reference: TemplateRef, display_name: impl Into<String>) -> Self {
        Self {
            reference,
            display_name: display_name.into(),
            fragments: Vec::new(),
        }
    }

    /// Attach a fragment
    pub fn with_fragment(mut self, fragment: impl ItemFragment) -> Self {
        self.fragments.push(Arc::new(fragment));
        self
    }

    /// First fragment of type `F`
    pub fn find_fragment<F: ItemFragment>(&self) -> Option<&F> {
        self.fragments
            .iter()
            .find_map(|fragment| fragment.as_any().downcast_ref::<F>())
    }
}

/// Live instance of a template, created when an item is equipped
#[derive(Debug, Clone)]
pub struct ItemInstance {
    item: ItemId,
    template: Arc<ItemTemplate>,
    stats: BTreeMap<String, i64>,
}

impl ItemInstance {
    fn new(item: ItemId, template: Arc<ItemTemplate>) -> Self {
        Self {
            item,
            template,
            stats: BTreeMap::new(),
        }
    }

    /// Item this instance was created for
    pub fn item(&self) -> &ItemId {
        &self.item
    }

    /// Template backing this instance
    pub fn template(&self) -> &Arc<ItemTemplate> {
        &self.template
    }

    /// Set an instance stat
    pub fn set_stat(&mut self, key: impl Into<String>, value: i64) {
        self.stats.insert(key.into(), value);
    }

    /// Read an instance stat (0 when unset)
    pub fn stat(&self, key: &str) -> i64 {
        self.stats.get(key).copied().unwrap_or(0)
    }

    /// First fragment of type `F` on the template
    pub fn find_fragment<F: ItemFragment>(&self) -> Option<&F> {
        self.template.find_fragment::<F>()
    }
}

/// Source of item data and templates.
///
/// `load_template` may block on I/O.
pub trait ItemDataSource: Send + Sync {
    /// Look up the item data for an id
    fn item_data(&self, id: &ItemId) -> Option<ItemData>;

    /// Load a template synchronously
    fn load_template(&self, template: &TemplateRef) -> Option<Arc<ItemTemplate>>;
}

/// In-memory item data and templates
#[derive(Debug, Default)]
pub struct ItemCatalog {
    items: HashMap<ItemId, ItemData>,
    templates: HashMap<TemplateRef, Arc<ItemTemplate>>,
}

impl ItemCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register integrated item data
    pub fn with_definition(mut self, definition: ItemDefinition) -> Self {
        self.items
            .insert(definition.id.clone(), ItemData::Integrated(definition));
        self
    }

    /// Register basic item data
    pub fn with_basic(mut self, id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        let id = id.into();
        self.items.insert(
            id.clone(),
            ItemData::Basic(BasicItemData {
                id,
                name: name.into(),
            }),
        );
        self
    }

    /// Register a template
    pub fn with_template(mut self, template: ItemTemplate) -> Self {
        self.templates
            .insert(template.reference.clone(), Arc::new(template));
        self
    }
}

impl ItemDataSource for ItemCatalog {
    fn item_data(&self, id: &ItemId) -> Option<ItemData> {
        self.items.get(id).cloned()
    }

    fn load_template(&self, template: &TemplateRef) -> Option<Arc<ItemTemplate>> {
        self.templates.get(template).cloned()
    }
}

/// Resolves ids to definitions and caches loaded templates.
///
/// Only successful loads are cached; a failed load is retried next time.
pub struct DefinitionAdapter {
    source: Arc<dyn ItemDataSource>,
    templates: RwLock<HashMap<TemplateRef, Arc<ItemTemplate>>>,
}

impl DefinitionAdapter {
    /// Create an adapter over a data source
    pub fn new(source: Arc<dyn ItemDataSource>) -> Self {
        Self {
            source,
            templates: RwLock::new(HashMap::new()),
        }
    }

    /// Definition for an id, if it has the integration subtype
    pub fn resolve(&self, id: &ItemId) -> Option<ItemDefinition> {
        self.source.item_data(id)?.into_definition()
    }

    /// Load the template a definition refers to
    pub fn load_template_sync(&self, definition: &ItemDefinition) -> Option<Arc<ItemTemplate>> {
        let reference = definition.template.as_ref()?;

        if let Some(template) = self.templates.read().get(reference) {
            log::trace!(target: DATA_TARGET, "Template cache hit for {}", reference);
            return Some(Arc::clone(template));
        }

        let template = self.source.load_template(reference)?;
        log::debug!(target: DATA_TARGET, "Loaded template {} for {}", reference, definition.id);
        self.templates
            .write()
            .insert(reference.clone(), Arc::clone(&template));
        Some(template)
    }

    /// First fragment of type `F` on the definition's template
    pub fn find_fragment<F: ItemFragment + Clone>(&self, definition: &ItemDefinition) -> Option<F> {
        let template = self.load_template_sync(definition)?;
        template.find_fragment::<F>().cloned()
    }

    /// Template display name, falling back to the storage-side name
    pub fn display_name(&self, definition: &ItemDefinition) -> String {
        match self.load_template_sync(definition) {
            Some(template) if !template.display_name.is_empty() => template.display_name.clone(),
            _ => definition.name.clone(),
        }
    }

    /// Create a live instance for an item, running every fragment hook
    pub fn new_instance(&self, id: &ItemId) -> Option<Arc<ItemInstance>> {
        let definition = self.resolve(id)?;
        let Some(template) = self.load_template_sync(&definition) else {
            log::warn!(target: DATA_TARGET, "Failed to load gameplay template for {}", id);
            return None;
        };

        let mut instance = ItemInstance::new(id.clone(), Arc::clone(&template));
        for fragment in &template.fragments {
            fragment.on_instance_created(&mut instance);
        }

        log::trace!(target: DATA_TARGET, "Created instance for {}", id);
        Some(Arc::new(instance))
    }

    /// Number of cached templates
    pub fn cached_templates(&self) -> usize {
        self.templates.read().len()
    }
}

impl fmt::Debug for DefinitionAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionAdapter")
            .field("cached_templates", &self.cached_templates())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct DurabilityFragment {
        max: i64,
    }

    impl ItemFragment for DurabilityFragment {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn on_instance_created(&self, instance: &mut ItemInstance) {
            instance.set_stat("durability", self.max);
        }
    }

    #[derive(Debug, Clone)]
    struct MarkerFragment;

    impl ItemFragment for MarkerFragment {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Counts template loads and can be told to fail
    struct CountingSource {
        catalog: ItemCatalog,
        loads: AtomicU32,
        fail: AtomicU32,
    }

    impl ItemDataSource for CountingSource {
        fn item_data(&self, id: &ItemId) -> Option<ItemData> {
            self.catalog.item_data(id)
        }

        fn load_template(&self, template: &TemplateRef) -> Option<Arc<ItemTemplate>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) > 0 {
                self.fail.fetch_sub(1, Ordering::SeqCst);
                return None;
            }
            self.catalog.load_template(template)
        }
    }

    fn catalog() -> ItemCatalog {
        ItemCatalog::new()
            .with_definition(
                ItemDefinition::new("Weapon.Sword", "sword_item")
                    .with_template(TemplateRef::new("/Items/Sword"))
                    .equippable(),
            )
            .with_definition(ItemDefinition::new("Misc.Rock", "Rock"))
            .with_basic("Misc.Stick", "Stick")
            .with_template(
                ItemTemplate::new(TemplateRef::new("/Items/Sword"), "Iron Sword")
                    .with_fragment(MarkerFragment)
                    .with_fragment(DurabilityFragment { max: 100 }),
            )
    }

    #[test]
    fn test_resolve_requires_integration_data() {
        let adapter = DefinitionAdapter::new(Arc::new(catalog()));

        assert!(adapter.resolve(&"Weapon.Sword".into()).is_some());
        assert!(adapter.resolve(&"Misc.Stick".into()).is_none());
        assert!(adapter.resolve(&"Unknown".into()).is_none());
    }

    #[test]
    fn test_typed_fragment_lookup() {
        let adapter = DefinitionAdapter::new(Arc::new(catalog()));
        let sword = adapter.resolve(&"Weapon.Sword".into()).unwrap();

        assert_eq!(
            adapter.find_fragment::<DurabilityFragment>(&sword),
            Some(DurabilityFragment { max: 100 })
        );

        let rock = adapter.resolve(&"Misc.Rock".into()).unwrap();
        assert!(adapter.find_fragment::<DurabilityFragment>(&rock).is_none());
    }

    #[test]
    fn test_display_name_fallback() {
        let adapter = DefinitionAdapter::new(Arc::new(catalog()));

        let sword = adapter.resolve(&"Weapon.Sword".into()).unwrap();
        assert_eq!(adapter.display_name(&sword), "Iron Sword");

        let rock = adapter.resolve(&"Misc.Rock".into()).unwrap();
        assert_eq!(adapter.display_name(&rock), "Rock");
    }

    #[test]
    fn test_instance_runs_fragment_hooks() {
        let adapter = DefinitionAdapter::new(Arc::new(catalog()));

        let instance = adapter.new_instance(&"Weapon.Sword".into()).unwrap();
        assert_eq!(instance.stat("durability"), 100);
        assert_eq!(instance.item(), &ItemId::new("Weapon.Sword"));
        assert!(instance.find_fragment::<MarkerFragment>().is_some());

        assert!(adapter.new_instance(&"Misc.Rock".into()).is_none());
    }

    #[test]
    fn test_failed_loads_are_not_cached() {
        let source = Arc::new(CountingSource {
            catalog: catalog(),
            loads: AtomicU32::new(0),
            fail: AtomicU32::new(1),
        });
        let adapter = DefinitionAdapter::new(source.clone());
        let sword = adapter.resolve(&"Weapon.Sword".into()).unwrap();

        assert!(adapter.load_template_sync(&sword).is_none());
        assert!(adapter.load_template_sync(&sword).is_some());
        assert!(adapter.load_template_sync(&sword).is_some());

        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
        assert_eq!(adapter.cached_templates(), 1);
    }
}
