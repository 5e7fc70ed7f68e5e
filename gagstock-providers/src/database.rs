//! Local stock database document

use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;

use crate::error::ProviderError;

/// Read the persisted database document as JSON
pub async fn read_database(path: impl AsRef<Path>) -> Result<Value, ProviderError> {
    let path = path.as_ref();

    let contents = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => ProviderError::NotFound(path.display().to_string()),
        _ => ProviderError::Io(format!("{}: {}", path.display(), e)),
    })?;

    serde_json::from_str(&contents)
        .map_err(|e| ProviderError::ParseError(format!("{}: {}", path.display(), e)))
}
