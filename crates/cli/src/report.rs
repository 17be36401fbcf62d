//! Console progress reporting for evaluation runs
//!
//! Implements the evaluator's observer interface with human-readable
//! per-case lines and a boxed summary block.

use courserag_core::Error;
use courserag_evals::{EvalResult, EvalSummary, ProgressObserver};

const RULE_WIDTH: usize = 60;

/// Observer that prints per-case progress and the summary to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl ProgressObserver for ConsoleReporter {
    fn on_run_start(&self, total: usize, k: usize) {
        println!("\n{}", "=".repeat(RULE_WIDTH));
        println!("Running Retrieval Evaluation (k={k}, {total} cases)");
        println!("{}", "=".repeat(RULE_WIDTH));
    }

    fn on_case_complete(&self, index: usize, total: usize, result: &EvalResult, k: usize) {
        println!("{}", case_line(index, total, result, k));
    }

    fn on_case_error(&self, index: usize, total: usize, query: &str, error: &Error) {
        println!("  [{index}/{total}] ! skipped '{query}': {error}");
    }

    fn on_run_complete(&self, summary: &EvalSummary, k: usize) {
        print!("{}", summary_block(summary, k));
    }
}

/// Formats one per-case progress line
fn case_line(index: usize, total: usize, result: &EvalResult, k: usize) -> String {
    let status = if result.hit { "✓" } else { "✗" };
    format!(
        "  [{index}/{total}] {status} P@{k}={:.2} R@{k}={:.2} RR={:.2} ({:.0}ms)",
        result.precision_at_k, result.recall_at_k, result.reciprocal_rank, result.latency_ms
    )
}

/// Formats the aggregate summary block
fn summary_block(summary: &EvalSummary, k: usize) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    out.push_str(&format!("\n{rule}\n"));
    out.push_str("EVALUATION SUMMARY\n");
    out.push_str(&format!("{rule}\n"));
    out.push_str(&format!("  Queries evaluated: {}\n", summary.num_queries));
    out.push_str(&format!(
        "  Precision@{k}:       {:.2}%\n",
        summary.precision_at_k * 100.0
    ));
    out.push_str(&format!(
        "  Recall@{k}:          {:.2}%\n",
        summary.recall_at_k * 100.0
    ));
    out.push_str(&format!("  MRR:               {:.3}\n", summary.mrr));
    out.push_str(&format!(
        "  Hit Rate@{k}:        {:.2}%\n",
        summary.hit_rate * 100.0
    ));
    out.push_str(&format!(
        "  Avg Latency:       {:.0}ms\n",
        summary.avg_latency_ms
    ));
    out.push_str(&format!(
        "  P95 Latency:       {:.0}ms\n",
        summary.p95_latency_ms
    ));
    out.push_str(&format!("{rule}\n\n"));
    out
}
