//! Retrieval evaluation orchestration
//!
//! The [`Evaluator`] owns a collection of labeled test cases, drives the
//! external retriever for each one, scores the ranked results with
//! standard IR metrics, and aggregates them into a run summary. The loop
//! is strictly sequential and follows registration order; each retrieval
//! call is timed with a monotonic clock.

use crate::metrics;
use crate::progress::{NullObserver, ProgressObserver};
use crate::results::{EvalReport, EvalResult, EvalSummary};
use chrono::Utc;
use courserag_core::{Error, Result, Retriever, TestCase};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Number of documents retrieved per query when none is specified
pub const DEFAULT_K: usize = 5;

/// What to do when the retriever fails for one case mid-run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the whole run on the first failure; no summary is produced
    /// and stored results are cleared (all-or-nothing)
    #[default]
    Abort,
    /// Log and skip the failing case; the summary averages over the
    /// cases that completed. A run where every case fails still errors.
    Skip,
}

/// Evaluates retrieval quality using standard IR metrics
///
/// Usage:
/// ```no_run
/// # use std::sync::Arc;
/// # use courserag_core::Retriever;
/// # use courserag_evals::Evaluator;
/// # async fn demo(retriever: Arc<dyn Retriever>) -> courserag_core::Result<()> {
/// let mut evaluator = Evaluator::new(retriever);
/// evaluator.add_case("What is the grading policy?", vec!["syllabus.pdf".into()], None)?;
/// let summary = evaluator.run(Some(5)).await?;
/// println!("Precision@5: {:.2}", summary.precision_at_k);
/// # Ok(())
/// # }
/// ```
pub struct Evaluator {
    retriever: Arc<dyn Retriever>,
    k: usize,
    failure_policy: FailurePolicy,
    observer: Arc<dyn ProgressObserver>,
    cases: Vec<TestCase>,
    results: Vec<EvalResult>,
    last_k: Option<usize>,
}

impl Evaluator {
    /// Creates an evaluator around a retriever with default settings
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self {
            retriever,
            k: DEFAULT_K,
            failure_policy: FailurePolicy::default(),
            observer: Arc::new(NullObserver),
            cases: Vec::new(),
            results: Vec::new(),
            last_k: None,
        }
    }

    /// Sets the default k used when `run` gets no explicit value
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Sets the mid-run failure policy
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Installs a progress observer for per-case reporting
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Registered test cases, in registration order
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Results of the most recent completed run
    pub fn results(&self) -> &[EvalResult] {
        &self.results
    }

    /// Registers a test case
    ///
    /// No deduplication: identical queries may be registered multiple
    /// times deliberately, e.g. to probe retriever non-determinism.
    pub fn add_case(
        &mut self,
        query: impl Into<String>,
        expected_sources: Vec<String>,
        scope: Option<String>,
    ) -> Result<()> {
        let case = TestCase::new(query, expected_sources, scope)?;
        debug!(query = %case.query, "Registered test case");
        self.cases.push(case);
        Ok(())
    }

    /// Loads test cases from a JSON file, preserving file order
    ///
    /// Expected format:
    /// ```json
    /// [{"query": "...", "expected_sources": ["file1.pdf"], "scope": "CS101"}]
    /// ```
    ///
    /// Returns the number of cases loaded. Malformed input or a case
    /// with an empty query fails with a parse error and registers
    /// nothing.
    pub fn load_cases(&mut self, path: &Path) -> Result<usize> {
        let file = path.display().to_string();
        let content = std::fs::read_to_string(path)?;

        let cases: Vec<TestCase> = serde_json::from_str(&content)
            .map_err(|e| Error::parse(&file, format!("invalid test-case JSON: {e}")))?;

        for (i, case) in cases.iter().enumerate() {
            if case.query.trim().is_empty() {
                return Err(Error::parse(
                    &file,
                    format!("case {} has an empty query", i + 1),
                ));
            }
        }

        let count = cases.len();
        self.cases.extend(cases);
        info!(count, file = %file, "Loaded test cases");
        Ok(count)
    }

    /// Saves the current test cases as JSON
    ///
    /// Round-trips with [`Self::load_cases`]: query text, expected
    /// sources (order and contents), and scope survive for every case.
    pub fn save_cases(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.cases)
            .map_err(|e| Error::config(format!("Failed to serialize test cases: {e}")))?;
        std::fs::write(path, json)?;
        info!(count = self.cases.len(), file = %path.display(), "Saved test cases");
        Ok(())
    }

    /// Evaluates a single test case against the retriever
    ///
    /// Times exactly one retrieval call with a monotonic clock and scores
    /// the ranked results. Has no effect on the evaluator's stored state;
    /// retriever errors propagate to the caller.
    pub async fn evaluate_one(&self, case: &TestCase, k: usize) -> Result<EvalResult> {
        let start = Instant::now();
        let documents = self
            .retriever
            .retrieve(&case.query, case.scope.as_deref(), k)
            .await?;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        // Full ranked list: reciprocal rank looks past the top-k slice.
        let retrieved_sources: Vec<String> = documents.into_iter().map(|d| d.source).collect();

        let precision = metrics::precision_at_k(&retrieved_sources, &case.expected_sources, k);
        let recall = metrics::recall_at_k(&retrieved_sources, &case.expected_sources, k);
        let rr = metrics::reciprocal_rank(&retrieved_sources, &case.expected_sources);
        let hit = metrics::hit_at_k(&retrieved_sources, &case.expected_sources, k);

        debug!(
            query = %case.query,
            precision,
            recall,
            reciprocal_rank = rr,
            hit,
            latency_ms,
            "Evaluated case"
        );

        Ok(EvalResult {
            query: case.query.clone(),
            expected_sources: case.expected_sources.clone(),
            retrieved_sources,
            precision_at_k: precision,
            recall_at_k: recall,
            reciprocal_rank: rr,
            hit,
            latency_ms,
        })
    }

    /// Runs every registered test case and aggregates the results
    ///
    /// Cases are evaluated sequentially in registration order with the
    /// shared `k` (the evaluator default when `None`). Results from a
    /// prior run are replaced. Fails with a configuration error when no
    /// cases are registered; mid-run retriever failures follow the
    /// configured [`FailurePolicy`].
    pub async fn run(&mut self, k: Option<usize>) -> Result<EvalSummary> {
        if self.cases.is_empty() {
            return Err(Error::config(
                "No test cases registered. Call add_case() or load_cases() first.",
            ));
        }

        let k = k.unwrap_or(self.k);
        let total = self.cases.len();
        self.results.clear();
        self.last_k = None;

        info!(total, k, policy = ?self.failure_policy, "Starting evaluation run");
        self.observer.on_run_start(total, k);

        for (i, case) in self.cases.iter().enumerate() {
            match self.evaluate_one(case, k).await {
                Ok(result) => {
                    self.observer.on_case_complete(i + 1, total, &result, k);
                    self.results.push(result);
                }
                Err(e) => match self.failure_policy {
                    FailurePolicy::Abort => {
                        self.results.clear();
                        return Err(Error::with_context(
                            format!("Retrieval failed for case {}/{} ('{}')", i + 1, total, case.query),
                            e,
                        ));
                    }
                    FailurePolicy::Skip => {
                        warn!(
                            case = i + 1,
                            total,
                            query = %case.query,
                            error = %e,
                            "Skipping failed case"
                        );
                        self.observer.on_case_error(i + 1, total, &case.query, &e);
                    }
                },
            }
        }

        if self.results.is_empty() {
            return Err(Error::retrieval(format!(
                "All {total} test cases failed retrieval; no summary produced"
            )));
        }

        let summary = summarize(&self.results);
        self.last_k = Some(k);
        self.observer.on_run_complete(&summary, k);
        info!(
            num_queries = summary.num_queries,
            precision_at_k = summary.precision_at_k,
            recall_at_k = summary.recall_at_k,
            mrr = summary.mrr,
            hit_rate = summary.hit_rate,
            "Evaluation run complete"
        );
        Ok(summary)
    }

    /// Exports the detailed results of the most recent run as JSON
    ///
    /// Fails with a configuration error before any run has completed.
    pub fn export(&self, path: &Path) -> Result<()> {
        if self.results.is_empty() {
            return Err(Error::config(
                "No results to export. Run an evaluation first.",
            ));
        }

        let report = EvalReport {
            timestamp: Utc::now().to_rfc3339(),
            k: self.last_k.unwrap_or(self.k),
            num_queries: self.results.len(),
            results: self.results.clone(),
        };

        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| Error::config(format!("Failed to serialize results: {e}")))?;
        std::fs::write(path, json)?;
        info!(count = report.num_queries, file = %path.display(), "Exported results");
        Ok(())
    }
}

/// Aggregates per-query results into a summary by simple means
fn summarize(results: &[EvalResult]) -> EvalSummary {
    let n = results.len() as f64;
    let latencies: Vec<f64> = results.iter().map(|r| r.latency_ms).collect();

    EvalSummary {
        num_queries: results.len(),
        precision_at_k: results.iter().map(|r| r.precision_at_k).sum::<f64>() / n,
        recall_at_k: results.iter().map(|r| r.recall_at_k).sum::<f64>() / n,
        mrr: results.iter().map(|r| r.reciprocal_rank).sum::<f64>() / n,
        hit_rate: results.iter().filter(|r| r.hit).count() as f64 / n,
        avg_latency_ms: latencies.iter().sum::<f64>() / n,
        p95_latency_ms: metrics::p95_latency_ms(&latencies),
        timestamp: Utc::now().to_rfc3339(),
    }
}
