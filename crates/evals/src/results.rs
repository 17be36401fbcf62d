//! Per-query and aggregated evaluation outcomes

use serde::{Deserialize, Serialize};

/// Outcome of running one test case against the retriever
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalResult {
    /// Query text from the test case
    pub query: String,
    /// Expected relevant sources from the test case
    pub expected_sources: Vec<String>,
    /// Source identifiers in the retriever's ranked order
    pub retrieved_sources: Vec<String>,
    /// Precision@K over the top-K slice
    pub precision_at_k: f64,
    /// Recall@K over the top-K slice
    pub recall_at_k: f64,
    /// 1/rank of the first relevant result over the full ranked list
    pub reciprocal_rank: f64,
    /// Whether any expected source appeared in the top-K
    pub hit: bool,
    /// Wall-clock time of the retrieval call
    pub latency_ms: f64,
}

/// Aggregated metrics across all results of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
    /// Number of test cases that produced a result
    pub num_queries: usize,
    /// Mean Precision@K
    pub precision_at_k: f64,
    /// Mean Recall@K
    pub recall_at_k: f64,
    /// Mean Reciprocal Rank
    pub mrr: f64,
    /// Fraction of queries with at least one relevant result in the top-K
    pub hit_rate: f64,
    /// Mean retrieval latency
    pub avg_latency_ms: f64,
    /// 95th percentile retrieval latency (nearest-rank)
    pub p95_latency_ms: f64,
    /// RFC 3339 time the summary was produced
    pub timestamp: String,
}

/// Detailed export of one evaluation run, suitable for offline analysis
/// or regression comparison across versions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    /// RFC 3339 time the report was written
    pub timestamp: String,
    /// K used for the run
    pub k: usize,
    /// Number of results
    pub num_queries: usize,
    /// Full per-query results in registration order
    pub results: Vec<EvalResult>,
}
