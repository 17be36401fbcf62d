//! Labeled test cases for retrieval evaluation
//!
//! A test case pairs a query with the set of source files that a correct
//! retrieval should surface, plus an optional course filter. Cases are
//! immutable once created and keep their registration order.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single labeled retrieval trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Query text submitted to the retriever
    pub query: String,

    /// Source identifiers considered relevant for this query.
    ///
    /// May be empty, meaning no ground truth exists and every retrieved
    /// document counts as a miss. Original order is preserved for
    /// round-tripping, matching is set-based.
    pub expected_sources: Vec<String>,

    /// Optional filter narrowing retrieval to one course
    #[serde(default, alias = "course_id")]
    pub scope: Option<String>,
}

impl TestCase {
    /// Creates a test case, rejecting empty queries
    pub fn new(
        query: impl Into<String>,
        expected_sources: Vec<String>,
        scope: Option<String>,
    ) -> Result<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(Error::invalid_input("test case query must be non-empty"));
        }
        Ok(Self {
            query,
            expected_sources,
            scope,
        })
    }
}
