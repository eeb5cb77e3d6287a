// Inputbind Config API - Bind Documents
// Discovers the JSON documents that declare bind categories and their defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

/// Default extension of bind documents
pub const BINDS_EXTENSION: &str = "binds";

/// Errors raised while reading a bind document
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Supplies bind documents.
///
/// Each document is an object mapping category ids to
/// `{ "name"?, "binds": { entryId: { "name"?, "default": [...] } } }`.
/// Documents are returned in discovery order.
pub trait BindSource {
    fn documents(&self) -> Vec<Value>;
}

/// Fixed set of in-memory documents
#[derive(Debug, Clone, Default)]
pub struct StaticBindSource {
    documents: Vec<Value>,
}

impl StaticBindSource {
    pub fn new(documents: Vec<Value>) -> Self {
        Self { documents }
    }

    pub fn push(&mut self, document: Value) {
        self.documents.push(document);
    }
}

impl BindSource for StaticBindSource {
    fn documents(&self) -> Vec<Value> {
        self.documents.clone()
    }
}

/// Bind documents found by scanning a directory tree for a file extension
#[derive(Debug, Clone)]
pub struct DirBindSource {
    root: PathBuf,
    extension: String,
}

impl DirBindSource {
    /// Scan `root` for `*.binds` files
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            extension: BINDS_EXTENSION.to_string(),
        }
    }

    /// Scan for a different extension (without the leading dot)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All matching files below the root, sorted by path
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Binds: cannot read directory {}: {}", dir.display(), e);
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                } else if path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str())
                {
                    found.push(path);
                }
            }
        }
        found.sort();
        found
    }
}

/// Read and parse one bind document
pub fn load_document(path: &Path) -> Result<Value, SourceError> {
    let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SourceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

impl BindSource for DirBindSource {
    fn documents(&self) -> Vec<Value> {
        self.scan()
            .iter()
            .filter_map(|path| match load_document(path) {
                Ok(document) => Some(document),
                Err(e) => {
                    log::warn!("Binds: skipping document: {}", e);
                    None
                }
            })
            .collect()
    }
}
