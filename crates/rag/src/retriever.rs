//! Retrievers over a pre-materialized document index.
//!
//! Indexing happens elsewhere; this module only loads what the indexer wrote
//! and answers queries against it.

use crate::document::Document;
use docchat_core::{AppError, AppResult};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use unicode_segmentation::UnicodeSegmentation;

/// Source of context documents for a query.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// Return the documents relevant to `query`, most relevant first.
    async fn retrieve(&self, query: &str) -> AppResult<Vec<Document>>;
}

/// Retriever that always returns the same documents.
#[derive(Debug, Clone, Default)]
pub struct StaticRetriever {
    documents: Vec<Document>,
}

impl StaticRetriever {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

#[async_trait::async_trait]
impl Retriever for StaticRetriever {
    async fn retrieve(&self, _query: &str) -> AppResult<Vec<Document>> {
        Ok(self.documents.clone())
    }
}

#[derive(Debug, Clone)]
struct IndexedDocument {
    document: Document,
    terms: HashSet<String>,
}

/// Lexical retriever ranking documents by shared Unicode words.
///
/// The score of a document is the number of distinct query terms it
/// contains. Documents with no shared term are never returned; ties keep
/// index order.
#[derive(Debug, Clone)]
pub struct KeywordRetriever {
    entries: Vec<IndexedDocument>,
    top_k: usize,
}

impl KeywordRetriever {
    pub fn new(documents: Vec<Document>, top_k: usize) -> Self {
        let entries = documents
            .into_iter()
            .map(|document| IndexedDocument {
                terms: terms(&document.page_content),
                document,
            })
            .collect();

        Self { entries, top_k }
    }

    /// Load a JSONL index: one serialized [`Document`] per line.
    pub fn from_jsonl(path: &Path, top_k: usize) -> AppResult<Self> {
        let file = File::open(path).map_err(|e| {
            AppError::Retrieval(format!("Failed to open document index {:?}: {}", path, e))
        })?;

        let reader = BufReader::new(file);
        let mut documents = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                AppError::Retrieval(format!("Failed to read line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let document: Document = serde_json::from_str(&line).map_err(|e| {
                AppError::Retrieval(format!(
                    "Failed to parse line {} in {:?}: {}",
                    line_num + 1,
                    path,
                    e
                ))
            })?;

            documents.push(document);
        }

        tracing::info!("Loaded {} documents from {:?}", documents.len(), path);
        Ok(Self::new(documents, top_k))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl Retriever for KeywordRetriever {
    async fn retrieve(&self, query: &str) -> AppResult<Vec<Document>> {
        let query_terms = terms(query);

        let mut scored: Vec<(usize, &IndexedDocument)> = self
            .entries
            .iter()
            .map(|entry| (entry.terms.intersection(&query_terms).count(), entry))
            .filter(|(score, _)| *score > 0)
            .collect();

        // Stable sort keeps index order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let results: Vec<Document> = scored
            .into_iter()
            .take(self.top_k)
            .map(|(_, entry)| entry.document.clone())
            .collect();

        tracing::debug!(
            "Keyword retrieval matched {} documents for {} query terms",
            results.len(),
            query_terms.len()
        );

        Ok(results)
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.unicode_words().map(str::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_documents() -> Vec<Document> {
        vec![
            Document::new("Onboarding checklist for new employees")
                .with_metadata("source", "hr/onboarding.pdf"),
            Document::new("Travel expense policy and reimbursement limits")
                .with_metadata("source", "finance/travel.docx"),
            Document::new("Minutes of the employee training policy meeting")
                .with_metadata("source", "hr/minutes.txt"),
        ]
    }

    #[tokio::test]
    async fn test_static_retriever_returns_everything() {
        let retriever = StaticRetriever::new(sample_documents());
        let docs = retriever.retrieve("anything").await.unwrap();
        assert_eq!(docs.len(), 3);
    }

    #[tokio::test]
    async fn test_keyword_ranking() {
        let retriever = KeywordRetriever::new(sample_documents(), 5);
        let docs = retriever
            .retrieve("employee training policy")
            .await
            .unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].metadata["source"], "hr/minutes.txt");
        assert_eq!(docs[1].metadata["source"], "finance/travel.docx");
    }

    #[tokio::test]
    async fn test_keyword_matching_is_case_insensitive() {
        let retriever = KeywordRetriever::new(sample_documents(), 5);
        let docs = retriever.retrieve("ONBOARDING").await.unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn test_top_k_limits_results() {
        let retriever = KeywordRetriever::new(sample_documents(), 1);
        let docs = retriever.retrieve("policy").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata["source"], "finance/travel.docx");
    }

    #[tokio::test]
    async fn test_no_match_returns_empty() {
        let retriever = KeywordRetriever::new(sample_documents(), 5);
        assert!(retriever.retrieve("quarterly revenue").await.unwrap().is_empty());
    }

    #[test]
    fn test_from_jsonl() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"page_content": "alpha", "metadata": {{"source": "a.pdf", "page": 0}}}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"page_content": "beta"}}"#).unwrap();

        let retriever = KeywordRetriever::from_jsonl(file.path(), 5).unwrap();
        assert_eq!(retriever.len(), 2);
    }

    #[test]
    fn test_from_jsonl_reports_line_number() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"page_content": "alpha"}}"#).unwrap();
        writeln!(file, "not json").unwrap();

        match KeywordRetriever::from_jsonl(file.path(), 5) {
            Err(AppError::Retrieval(msg)) => assert!(msg.contains("line 2")),
            other => panic!("Expected retrieval error, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_from_jsonl_missing_file() {
        let result = KeywordRetriever::from_jsonl(Path::new("/nonexistent/index.jsonl"), 5);
        assert!(matches!(result, Err(AppError::Retrieval(_))));
    }
}
