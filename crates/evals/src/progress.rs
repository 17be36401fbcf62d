//! Injectable progress reporting for evaluation runs
//!
//! The evaluator stays free of I/O; callers that want per-case output
//! (the CLI, a test harness) plug in an observer. Indices reported here
//! are 1-based and follow registration order.

use crate::results::{EvalResult, EvalSummary};
use courserag_core::Error;

/// Callbacks emitted while a run is in flight
///
/// All methods default to no-ops so implementations only override what
/// they care about. This is observability, not part of the metrics
/// contract.
pub trait ProgressObserver: Send + Sync {
    /// A run is starting over `total` cases with the given k
    fn on_run_start(&self, total: usize, k: usize) {
        let _ = (total, k);
    }

    /// One case finished scoring
    fn on_case_complete(&self, index: usize, total: usize, result: &EvalResult, k: usize) {
        let _ = (index, total, result, k);
    }

    /// One case failed at the retriever (only reached under the skip
    /// failure policy; aborting runs surface the error instead)
    fn on_case_error(&self, index: usize, total: usize, query: &str, error: &Error) {
        let _ = (index, total, query, error);
    }

    /// The run finished and produced a summary
    fn on_run_complete(&self, summary: &EvalSummary, k: usize) {
        let _ = (summary, k);
    }
}

/// Observer that discards all progress events
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ProgressObserver for NullObserver {}
