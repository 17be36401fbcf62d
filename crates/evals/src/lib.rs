//! Retrieval evaluation framework for courserag
//!
//! Measures whether the retrieval layer returns the right documents for
//! labeled queries, using standard IR metrics with latency profiling:
//!
//! - **Precision@K**: fraction of the top-K retrieved docs that are relevant
//! - **Recall@K**: fraction of the relevant docs that are retrieved
//! - **MRR**: mean of 1/rank of the first relevant result
//! - **Hit Rate@K**: fraction of queries with any relevant doc in the top-K

pub mod evaluator;
pub mod metrics;
pub mod progress;
pub mod results;
pub mod samples;

pub use evaluator::{Evaluator, FailurePolicy, DEFAULT_K};
pub use progress::{NullObserver, ProgressObserver};
pub use results::{EvalReport, EvalResult, EvalSummary};
pub use samples::sample_cases;
