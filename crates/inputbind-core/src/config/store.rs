// Inputbind Config API - User Override Store
// Path-addressable JSON document holding user-edited binds

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// Errors raised by a file-backed store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A key-value document addressed by dotted paths (`"a.b.c"`).
///
/// Path segments are split on `.`, so identifiers containing dots cannot be
/// addressed.
pub trait ConfigStore {
    /// Read a top-level value
    fn get(&self, key: &str) -> Option<&Value>;

    /// Replace a top-level value
    fn set(&mut self, key: &str, value: Value);

    /// Read the value at a dotted path
    fn get_path(&self, path: &str) -> Option<&Value>;

    /// Replace the value at a dotted path, creating intermediate objects
    fn set_path(&mut self, path: &str, value: Value);

    /// Persist pending writes
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// JSON document store, optionally backed by a file
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    root: Value,
    path: Option<PathBuf>,
    dirty: bool,
}

impl JsonConfigStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
            path: None,
            dirty: false,
        }
    }

    /// Wrap an existing document. Non-object documents are replaced by `{}`.
    pub fn from_value(value: Value) -> Self {
        let root = match value {
            Value::Object(_) => value,
            _ => Value::Object(Map::new()),
        };
        Self {
            root,
            path: None,
            dirty: false,
        }
    }

    /// Open a file-backed store. A missing file starts an empty document.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let mut store = if path.exists() {
            let content = fs::read_to_string(path)?;
            Self::from_value(serde_json::from_str(&content)?)
        } else {
            Self::new()
        };
        store.path = Some(path.to_path_buf());
        Ok(store)
    }

    /// Get the default store path (~/.config/inputbind/config.json)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("inputbind").join("config.json"))
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether writes happened since the last flush
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The whole document
    pub fn document(&self) -> &Value {
        &self.root
    }
}

impl Default for JsonConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for JsonConfigStore {
    fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        if let Value::Object(map) = &mut self.root {
            map.insert(key.to_string(), value);
            self.dirty = true;
        }
    }

    fn get_path(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.root, |value, segment| value.get(segment))
    }

    fn set_path(&mut self, path: &str, value: Value) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut current = &mut self.root;
        for segment in segments {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            let Value::Object(map) = current else {
                return;
            };
            current = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }

        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        if let Value::Object(map) = current {
            map.insert(last.to_string(), value);
            self.dirty = true;
        }
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, serde_json::to_string_pretty(&self.root)?)?;
            log::debug!("Wrote user config to {}", path.display());
        }
        self.dirty = false;
        Ok(())
    }
}
