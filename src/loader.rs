//! Document loading from files and strings.

use std::path::Path;

use serde_json::Value;

use crate::document::{Document, DocumentOptions};
use crate::error::DocumentError;

/// Load a JSON tree from a file path.
///
/// # Errors
///
/// Returns `DocumentError::FileNotFound` if the file doesn't exist,
/// or `DocumentError::InvalidJson` if the file isn't valid JSON.
pub fn load_json(path: &Path) -> Result<Value, DocumentError> {
    if !path.exists() {
        return Err(DocumentError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_json_str(&content)
}

/// Load a JSON tree from a string.
pub fn load_json_str(content: &str) -> Result<Value, DocumentError> {
    serde_json::from_str(content).map_err(|source| DocumentError::InvalidJson { source })
}

/// Load and validate an OpenAPI document from a file path.
pub fn load_document(path: &Path, options: DocumentOptions) -> Result<Document, DocumentError> {
    let raw = load_json(path)?;
    tracing::debug!(path = %path.display(), "loaded document");
    Document::new(raw, options)
}
