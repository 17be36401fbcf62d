//! Standard IR metrics over ranked retrieval results
//!
//! Provides the per-query building blocks:
//! - Precision@K: proportion of the top-K items that are relevant
//! - Recall@K: proportion of relevant items found in the top-K
//! - Reciprocal Rank: 1/rank of the first relevant item
//! - Hit@K: whether any relevant item appears in the top-K
//!
//! Matching is by exact identifier equality. Division-by-zero cases are
//! defined as 0.0 by policy rather than surfaced as errors.

use std::collections::HashSet;

/// Compute Precision@K
///
/// Precision@K = |relevant ∩ retrieved@K| / K, or 0.0 when k = 0.
/// Set intersection: a source retrieved multiple times in the top-K
/// (common with chunk-level retrieval) still counts once.
pub fn precision_at_k(retrieved: &[String], relevant: &[String], k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }

    let relevant: HashSet<&str> = relevant.iter().map(String::as_str).collect();
    let top_k: HashSet<&str> = retrieved.iter().take(k).map(String::as_str).collect();
    let relevant_in_top_k = top_k.iter().filter(|r| relevant.contains(*r)).count();

    relevant_in_top_k as f64 / k as f64
}

/// Compute Recall@K
///
/// Recall@K = |relevant ∩ retrieved@K| / |relevant|, or 0.0 when there is
/// no ground truth. A query with an empty relevant set can never achieve
/// recall above zero since there is nothing to recall.
pub fn recall_at_k(retrieved: &[String], relevant: &[String], k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }

    let relevant: HashSet<&str> = relevant.iter().map(String::as_str).collect();
    let top_k: HashSet<&str> = retrieved.iter().take(k).map(String::as_str).collect();
    let relevant_retrieved = relevant.iter().filter(|r| top_k.contains(*r)).count();

    relevant_retrieved as f64 / relevant.len() as f64
}

/// Compute Reciprocal Rank
///
/// RR = 1 / (1-based rank of the first relevant item), 0.0 if none found.
/// Scans the full retrieved list rather than the top-K slice: truncating
/// would hide a near-miss sitting just past rank K.
pub fn reciprocal_rank(retrieved: &[String], relevant: &[String]) -> f64 {
    let relevant: HashSet<&str> = relevant.iter().map(String::as_str).collect();
    for (i, doc) in retrieved.iter().enumerate() {
        if relevant.contains(doc.as_str()) {
            return 1.0 / (i + 1) as f64;
        }
    }
    0.0
}

/// Check whether any relevant item appears in the top-K
pub fn hit_at_k(retrieved: &[String], relevant: &[String], k: usize) -> bool {
    let relevant: HashSet<&str> = relevant.iter().map(String::as_str).collect();
    retrieved
        .iter()
        .take(k)
        .any(|d| relevant.contains(d.as_str()))
}

/// 95th percentile by the nearest-rank estimator
///
/// Sorts ascending and takes the element at 0-based index
/// `floor(0.95 * n)`; a single sample is its own p95. This exact index
/// formula is part of the reporting contract, so reported numbers stay
/// reproducible across versions.
pub fn p95_latency_ms(latencies: &[f64]) -> f64 {
    debug_assert!(!latencies.is_empty());
    if latencies.len() == 1 {
        return latencies[0];
    }

    let mut sorted = latencies.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let index = (0.95 * sorted.len() as f64).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}
