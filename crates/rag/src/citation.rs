//! Citation extraction from retrieved document metadata.

use crate::document::{Document, Metadata};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Metadata keys consulted for the source path, in priority order.
pub const SOURCE_KEYS: [&str; 2] = ["source", "file_path"];

/// Source shown when no metadata key yields a path.
pub const UNKNOWN_SOURCE: &str = "unknown source";

/// Metadata key holding the zero-based page index.
pub const PAGE_KEY: &str = "page";

/// Where a piece of an answer came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub source: String,

    /// One-based page number, present only for paged sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<i64>,
}

impl SourceCitation {
    pub fn new(source: impl Into<String>, page_number: Option<i64>) -> Self {
        Self {
            source: source.into(),
            page_number,
        }
    }

    /// Build the citation for one document's metadata.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            source: resolve_source(metadata),
            page_number: page_number(metadata),
        }
    }
}

impl fmt::Display for SourceCitation {
    /// `path (p.N)` when a page is known, the bare path otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page_number {
            Some(page) => write!(f, "{} (p.{})", self.source, page),
            None => f.write_str(&self.source),
        }
    }
}

/// Citations for every document, in retrieval order.
pub fn collect_citations(documents: &[Document]) -> Vec<SourceCitation> {
    documents
        .iter()
        .map(|doc| SourceCitation::from_metadata(&doc.metadata))
        .collect()
}

/// Apply the ordered fallback rule: the first key of [`SOURCE_KEYS`] holding
/// a non-empty string wins, otherwise [`UNKNOWN_SOURCE`].
fn resolve_source(metadata: &Metadata) -> String {
    SOURCE_KEYS
        .iter()
        .filter_map(|key| metadata.get(*key).and_then(Value::as_str))
        .find(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_SOURCE)
        .to_string()
}

/// Convert an integer zero-based page index into a one-based page number.
/// Floats, strings and other non-integers yield no page.
fn page_number(metadata: &Metadata) -> Option<i64> {
    metadata
        .get(PAGE_KEY)
        .and_then(Value::as_i64)
        .map(|page| page.saturating_add(1))
}
