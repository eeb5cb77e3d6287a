// Inputbind Errors
// Failures reported by the binding engine to its caller

use crate::config::{CodecError, StoreError};

/// Errors surfaced by engine-level operations
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("could not find bind entry {category}.{entry}")]
    NotFound { category: String, entry: String },

    #[error("binding engine has been constructed twice")]
    AlreadyInitialized,

    #[error("binding engine used with no instance available")]
    NotInitialized,

    #[error("bind decode error: {0}")]
    Codec(#[from] CodecError),

    #[error("user config error: {0}")]
    Store(#[from] StoreError),
}

impl InputError {
    pub(crate) fn not_found(category: &str, entry: &str) -> Self {
        InputError::NotFound {
            category: category.to_string(),
            entry: entry.to_string(),
        }
    }
}
