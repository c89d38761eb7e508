//! Retrieved documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form document metadata as produced by the indexer.
pub type Metadata = serde_json::Map<String, Value>;

/// A chunk of a source document handed back by a retriever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,

    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Add one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
