//! Retriever contract consumed by the evaluation framework
//!
//! The retriever itself lives outside this repository (the courserag API
//! service); this module defines the trait the evaluator drives and the
//! typed document shape it scores against.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Sentinel source identifier for documents whose metadata carries no
/// source file. It can never match a real expected source, so such
/// documents always score as irrelevant.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// A single ranked document returned by the retriever
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Stable source identifier (typically the originating filename)
    pub source: String,

    /// Relevance score assigned by the retriever, best first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Chunk text, if the retriever returns it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Auxiliary metadata the evaluator ignores
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl RetrievedDocument {
    /// Creates a document with just a source identifier
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            score: None,
            content: None,
            metadata: BTreeMap::new(),
        }
    }
}

/// Trait defining the retrieval operation the evaluator measures
///
/// Implementations rank by their own notion of relevance, best first, and
/// return at most `k` documents.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve the top-`k` documents for `query`, optionally restricted
    /// to one course via `scope`.
    async fn retrieve(
        &self,
        query: &str,
        scope: Option<&str>,
        k: usize,
    ) -> Result<Vec<RetrievedDocument>>;
}
