// Inputbind Binding Registry
// Categories of bind entries, reconciled from bind documents and user overrides

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::bind::Bind;
use crate::config::{decode_bind, encode_binds, BindSource, ConfigStore};
use crate::error::InputError;

/// Root key of user bind overrides in the config store
pub const BINDING_CONFIG_ROOT: &str = "modBindings";

/// Position of an entry inside a [`BindRegistry`].
///
/// Ids are only meaningful for the registry that produced them; a reload
/// builds a new registry and invalidates every id handed out before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId {
    category: usize,
    entry: usize,
}

impl EntryId {
    pub fn new(category: usize, entry: usize) -> Self {
        Self { category, entry }
    }

    pub fn category_index(self) -> usize {
        self.category
    }

    pub fn entry_index(self) -> usize {
        self.entry
    }
}

/// A logical action: a named slot with default and user binds
#[derive(Debug, Clone, PartialEq)]
pub struct BindEntry {
    id: String,
    category_id: String,
    name: String,
    default_binds: Vec<Bind>,
    custom_binds: Vec<Bind>,
}

impl BindEntry {
    /// Create an entry whose custom binds start as a copy of the defaults
    pub fn new(
        category_id: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
        default_binds: Vec<Bind>,
    ) -> Self {
        Self {
            id: id.into(),
            category_id: category_id.into(),
            name: name.into(),
            custom_binds: default_binds.clone(),
            default_binds,
        }
    }

    fn from_config(category_id: &str, id: &str, config: &Map<String, Value>) -> Self {
        let name = config
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(id)
            .to_string();

        let default_binds = match config.get("default") {
            Some(Value::Array(records)) => decode_records(records, "default", category_id, id),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                log::error!(
                    "Binds: Error loading default binds in {}.{}: expected an array, got {}",
                    category_id,
                    id,
                    other
                );
                Vec::new()
            }
        };

        Self {
            id: id.to_string(),
            category_id: category_id.to_string(),
            name,
            default_binds,
            custom_binds: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_binds(&self) -> &[Bind] {
        &self.default_binds
    }

    pub fn custom_binds(&self) -> &[Bind] {
        &self.custom_binds
    }

    /// Store path of this entry's user override
    pub fn config_path(&self) -> String {
        format!("{}.{}.{}", BINDING_CONFIG_ROOT, self.category_id, self.id)
    }

    /// Replace the custom binds; an empty list falls back to the defaults
    fn assign_custom(&mut self, binds: Vec<Bind>) {
        self.custom_binds = if binds.is_empty() {
            self.default_binds.clone()
        } else {
            binds
        };
    }

    /// Write the custom binds back to the store, creating containers as needed
    fn persist(&self, store: &mut dyn ConfigStore) {
        let array = encode_binds(&self.custom_binds);

        match store.get(BINDING_CONFIG_ROOT) {
            Some(Value::Object(_)) => {}
            Some(other) => {
                log::warn!(
                    "Binds: replacing user config '{}' of unexpected type: {}",
                    BINDING_CONFIG_ROOT,
                    other
                );
                store.set(BINDING_CONFIG_ROOT, Value::Object(Map::new()));
            }
            None => store.set(BINDING_CONFIG_ROOT, Value::Object(Map::new())),
        }

        let category_path = format!("{}.{}", BINDING_CONFIG_ROOT, self.category_id);
        if store.get_path(&category_path).is_some_and(Value::is_object) {
            store.set_path(&self.config_path(), array);
        } else {
            let mut category = Map::new();
            category.insert(self.id.clone(), array);
            store.set_path(&category_path, Value::Object(category));
        }
    }
}

/// Decode a list of bind records, logging and skipping the bad ones
fn decode_records(records: &[Value], kind: &str, category_id: &str, id: &str) -> Vec<Bind> {
    let mut binds = Vec::with_capacity(records.len());
    for record in records {
        match decode_bind(record) {
            Ok(Some(bind)) => binds.push(bind),
            Ok(None) => {}
            Err(e) => log::error!(
                "Binds: Error loading {} bind in {}.{}: {}",
                kind,
                category_id,
                id,
                e
            ),
        }
    }
    binds
}

/// A named group of bind entries
#[derive(Debug, Clone, PartialEq)]
pub struct BindCategory {
    id: String,
    name: String,
    entries: IndexMap<String, BindEntry>,
}

impl BindCategory {
    /// Create an empty category
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    /// Build a category from its document config and apply user overrides
    pub fn from_config(id: &str, config: &Map<String, Value>, store: &dyn ConfigStore) -> Self {
        let name = config
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(id)
            .to_string();
        let mut category = Self::new(id, name);

        let overrides_enabled = store
            .get(BINDING_CONFIG_ROOT)
            .is_some_and(Value::is_object);

        let Some(binds) = config.get("binds").and_then(Value::as_object) else {
            return category;
        };

        for (entry_id, entry_config) in binds {
            let Some(entry_config) = entry_config.as_object() else {
                log::warn!("Binds: skipping non-object bind config {}.{}", id, entry_id);
                continue;
            };
            if category.entries.contains_key(entry_id) {
                continue;
            }

            let mut entry = BindEntry::from_config(id, entry_id, entry_config);
            if overrides_enabled {
                if let Some(Value::Array(records)) = store.get_path(&entry.config_path()) {
                    entry.custom_binds = decode_records(records, "user", id, entry_id);
                }
            }
            if entry.custom_binds.is_empty() {
                entry.custom_binds = entry.default_binds.clone();
            }
            category.entries.insert(entry_id.clone(), entry);
        }

        category
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self, id: &str) -> Option<&BindEntry> {
        self.entries.get(id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &BindEntry> {
        self.entries.values()
    }

    /// Add an entry; an existing entry with the same id is kept
    pub fn insert(&mut self, entry: BindEntry) {
        if !self.entries.contains_key(entry.id()) {
            self.entries.insert(entry.id.clone(), entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The authoritative set of bind categories
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindRegistry {
    categories: IndexMap<String, BindCategory>,
}

impl BindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every document of a source
    pub fn load(source: &dyn BindSource, store: &dyn ConfigStore) -> Self {
        Self::from_documents(&source.documents(), store)
    }

    /// Build the registry from bind documents.
    ///
    /// When several documents declare the same category, the first one
    /// discovered wins.
    pub fn from_documents(documents: &[Value], store: &dyn ConfigStore) -> Self {
        let mut registry = Self::new();
        for document in documents {
            let Some(object) = document.as_object() else {
                log::warn!("Binds: skipping bind document that is not an object");
                continue;
            };
            for (category_id, config) in object {
                let Some(config) = config.as_object() else {
                    log::warn!("Binds: skipping non-object category '{}'", category_id);
                    continue;
                };
                if registry.categories.contains_key(category_id) {
                    log::debug!("Binds: category '{}' already loaded", category_id);
                    continue;
                }
                registry.categories.insert(
                    category_id.clone(),
                    BindCategory::from_config(category_id, config, store),
                );
            }
        }
        registry
    }

    /// Add a category; an existing category with the same id is kept
    pub fn insert(&mut self, category: BindCategory) {
        if !self.categories.contains_key(category.id()) {
            self.categories.insert(category.id.clone(), category);
        }
    }

    pub fn category(&self, id: &str) -> Option<&BindCategory> {
        self.categories.get(id)
    }

    pub fn categories(&self) -> impl Iterator<Item = &BindCategory> {
        self.categories.values()
    }

    /// Total number of entries over all categories
    pub fn entry_count(&self) -> usize {
        self.categories.values().map(BindCategory::len).sum()
    }

    /// Look up an entry, failing with `NotFound` if either id is unknown
    pub fn entry(&self, category_id: &str, entry_id: &str) -> Result<&BindEntry, InputError> {
        self.categories
            .get(category_id)
            .and_then(|category| category.entries.get(entry_id))
            .ok_or_else(|| InputError::not_found(category_id, entry_id))
    }

    fn entry_mut(&mut self, category_id: &str, entry_id: &str) -> Result<&mut BindEntry, InputError> {
        self.categories
            .get_mut(category_id)
            .and_then(|category| category.entries.get_mut(entry_id))
            .ok_or_else(|| InputError::not_found(category_id, entry_id))
    }

    pub fn entry_id(&self, category_id: &str, entry_id: &str) -> Option<EntryId> {
        let (category_index, _, category) = self.categories.get_full(category_id)?;
        let (entry_index, _, _) = category.entries.get_full(entry_id)?;
        Some(EntryId::new(category_index, entry_index))
    }

    pub fn entry_by_id(&self, id: EntryId) -> Option<&BindEntry> {
        let (_, category) = self.categories.get_index(id.category)?;
        category.entries.get_index(id.entry).map(|(_, entry)| entry)
    }

    /// Every entry in discovery order
    pub fn iter_entries(&self) -> impl Iterator<Item = (EntryId, &BindEntry)> {
        self.categories
            .values()
            .enumerate()
            .flat_map(|(c, category)| {
                category
                    .entries
                    .values()
                    .enumerate()
                    .map(move |(e, entry)| (EntryId::new(c, e), entry))
            })
    }

    /// Replace an entry's custom binds and persist them to the store
    pub fn set_custom_binds(
        &mut self,
        category_id: &str,
        entry_id: &str,
        binds: Vec<Bind>,
        store: &mut dyn ConfigStore,
    ) -> Result<(), InputError> {
        let entry = self.entry_mut(category_id, entry_id)?;
        entry.assign_custom(binds);
        entry.persist(store);
        Ok(())
    }

    /// Restore an entry's defaults and persist them to the store
    pub fn reset_custom_binds(
        &mut self,
        category_id: &str,
        entry_id: &str,
        store: &mut dyn ConfigStore,
    ) -> Result<(), InputError> {
        let entry = self.entry_mut(category_id, entry_id)?;
        entry.custom_binds = entry.default_binds.clone();
        entry.persist(store);
        Ok(())
    }
}
