//! End-to-end tests for the evaluator against an in-process mock retriever

use async_trait::async_trait;
use courserag_core::{Error, Result, RetrievedDocument, Retriever, TestCase};
use courserag_evals::{EvalReport, Evaluator, FailurePolicy};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Canned retriever: maps query text to a fixed ranked list of sources.
/// Queries with no canned answer fail, exercising the failure policies.
struct MockRetriever {
    responses: HashMap<String, Vec<String>>,
    seen_scopes: Mutex<Vec<Option<String>>>,
}

impl MockRetriever {
    fn new(responses: &[(&str, &[&str])]) -> Arc<Self> {
        Arc::new(Self {
            responses: responses
                .iter()
                .map(|(q, docs)| {
                    (
                        q.to_string(),
                        docs.iter().map(|d| d.to_string()).collect(),
                    )
                })
                .collect(),
            seen_scopes: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn retrieve(
        &self,
        query: &str,
        scope: Option<&str>,
        _k: usize,
    ) -> Result<Vec<RetrievedDocument>> {
        self.seen_scopes
            .lock()
            .unwrap()
            .push(scope.map(String::from));
        match self.responses.get(query) {
            Some(sources) => Ok(sources
                .iter()
                .map(RetrievedDocument::from_source)
                .collect()),
            None => Err(Error::retrieval(format!("no canned answer for '{query}'"))),
        }
    }
}

#[tokio::test]
async fn single_case_with_top_ranked_hit() {
    // One relevant doc at rank 1 of 3, scored at k=5.
    let retriever = MockRetriever::new(&[(
        "What is the grading policy?",
        &["syllabus.pdf", "notes.pdf", "schedule.pdf"],
    )]);
    let mut evaluator = Evaluator::new(retriever);
    evaluator
        .add_case(
            "What is the grading policy?",
            vec!["syllabus.pdf".to_string()],
            None,
        )
        .unwrap();

    let summary = evaluator.run(Some(5)).await.unwrap();

    assert_eq!(summary.num_queries, 1);
    assert!((summary.precision_at_k - 0.2).abs() < 1e-9); // 1/5
    assert!((summary.recall_at_k - 1.0).abs() < 1e-9); // 1/1
    assert!((summary.mrr - 1.0).abs() < 1e-9);
    assert!((summary.hit_rate - 1.0).abs() < 1e-9);
    assert!(summary.avg_latency_ms >= 0.0);
    assert!(summary.p95_latency_ms >= 0.0);
}

#[tokio::test]
async fn single_case_with_no_match() {
    let retriever = MockRetriever::new(&[("q", &["notes.pdf", "schedule.pdf"])]);
    let mut evaluator = Evaluator::new(retriever);
    evaluator
        .add_case("q", vec!["syllabus.pdf".to_string()], None)
        .unwrap();

    let summary = evaluator.run(Some(5)).await.unwrap();

    assert_eq!(summary.precision_at_k, 0.0);
    assert_eq!(summary.recall_at_k, 0.0);
    assert_eq!(summary.mrr, 0.0);
    assert_eq!(summary.hit_rate, 0.0);
}

#[tokio::test]
async fn aggregates_across_mixed_cases() {
    // First case hits with perfect precision at k=1, second misses.
    let retriever = MockRetriever::new(&[
        ("hit query", &["syllabus.pdf"]),
        ("miss query", &["notes.pdf"]),
    ]);
    let mut evaluator = Evaluator::new(retriever);
    evaluator
        .add_case("hit query", vec!["syllabus.pdf".to_string()], None)
        .unwrap();
    evaluator
        .add_case("miss query", vec!["syllabus.pdf".to_string()], None)
        .unwrap();

    let summary = evaluator.run(Some(1)).await.unwrap();

    assert_eq!(summary.num_queries, 2);
    assert!((summary.hit_rate - 0.5).abs() < 1e-9);
    assert!((summary.precision_at_k - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn relevant_result_past_k_counts_for_rr_but_not_hit() {
    // Relevant doc at rank 4 with k=2: a near-miss the reciprocal rank
    // still sees, while hit and precision do not.
    let retriever = MockRetriever::new(&[("q", &["a.pdf", "b.pdf", "c.pdf", "syllabus.pdf"])]);
    let evaluator = {
        let mut e = Evaluator::new(retriever);
        e.add_case("q", vec!["syllabus.pdf".to_string()], None)
            .unwrap();
        e
    };

    let case = evaluator.cases()[0].clone();
    let result = evaluator.evaluate_one(&case, 2).await.unwrap();

    assert!(!result.hit);
    assert_eq!(result.precision_at_k, 0.0);
    assert!((result.reciprocal_rank - 0.25).abs() < 1e-9);
}

#[tokio::test]
async fn k_zero_is_degenerate_but_legal() {
    let retriever = MockRetriever::new(&[("q", &["syllabus.pdf"])]);
    let evaluator = {
        let mut e = Evaluator::new(retriever);
        e.add_case("q", vec!["syllabus.pdf".to_string()], None)
            .unwrap();
        e
    };

    let case = evaluator.cases()[0].clone();
    let result = evaluator.evaluate_one(&case, 0).await.unwrap();

    assert_eq!(result.precision_at_k, 0.0);
    assert!(!result.hit);
    // Full-list scan still finds the doc at rank 1.
    assert!((result.reciprocal_rank - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn run_without_cases_is_a_configuration_error() {
    let retriever = MockRetriever::new(&[]);
    let mut evaluator = Evaluator::new(retriever);

    let err = evaluator.run(None).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)), "got: {err}");
}

#[tokio::test]
async fn export_before_run_is_a_configuration_error() {
    let retriever = MockRetriever::new(&[]);
    let evaluator = Evaluator::new(retriever);
    let dir = tempfile::tempdir().unwrap();

    let err = evaluator.export(&dir.path().join("out.json")).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "got: {err}");
}

#[tokio::test]
async fn export_writes_full_report_in_registration_order() {
    let retriever = MockRetriever::new(&[
        ("first", &["syllabus.pdf"]),
        ("second", &["notes.pdf"]),
    ]);
    let mut evaluator = Evaluator::new(retriever);
    evaluator
        .add_case("first", vec!["syllabus.pdf".to_string()], None)
        .unwrap();
    evaluator
        .add_case("second", vec!["syllabus.pdf".to_string()], None)
        .unwrap();
    evaluator.run(Some(3)).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    evaluator.export(&path).unwrap();

    let report: EvalReport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(report.k, 3);
    assert_eq!(report.num_queries, 2);
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].query, "first");
    assert_eq!(report.results[1].query, "second");
    assert!(report.results[0].hit);
    assert!(!report.results[1].hit);
    assert!(!report.timestamp.is_empty());
}

#[tokio::test]
async fn save_and_load_round_trip_preserves_cases() {
    let retriever = MockRetriever::new(&[]);
    let mut evaluator = Evaluator::new(retriever.clone());
    evaluator
        .add_case(
            "q1",
            vec!["b.pdf".to_string(), "a.pdf".to_string()],
            Some("CS101".to_string()),
        )
        .unwrap();
    evaluator.add_case("q2", vec![], None).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cases.json");
    evaluator.save_cases(&path).unwrap();

    let mut reloaded = Evaluator::new(retriever);
    let count = reloaded.load_cases(&path).unwrap();

    assert_eq!(count, 2);
    assert_eq!(reloaded.cases(), evaluator.cases());
    // Expected-source order survives verbatim.
    assert_eq!(
        reloaded.cases()[0].expected_sources,
        vec!["b.pdf".to_string(), "a.pdf".to_string()]
    );
    assert_eq!(reloaded.cases()[0].scope.as_deref(), Some("CS101"));
}

#[tokio::test]
async fn load_rejects_malformed_json() {
    let retriever = MockRetriever::new(&[]);
    let mut evaluator = Evaluator::new(retriever);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = evaluator.load_cases(&path).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "got: {err}");
    assert!(evaluator.cases().is_empty());
}

#[tokio::test]
async fn load_rejects_missing_query_field() {
    let retriever = MockRetriever::new(&[]);
    let mut evaluator = Evaluator::new(retriever);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"[{"expected_sources": ["a.pdf"]}]"#).unwrap();

    let err = evaluator.load_cases(&path).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "got: {err}");
}

#[tokio::test]
async fn abort_policy_drops_partial_results() {
    // Second of three cases has no canned answer and fails.
    let retriever = MockRetriever::new(&[
        ("ok1", &["syllabus.pdf"]),
        ("ok2", &["syllabus.pdf"]),
    ]);
    let mut evaluator = Evaluator::new(retriever);
    evaluator
        .add_case("ok1", vec!["syllabus.pdf".to_string()], None)
        .unwrap();
    evaluator
        .add_case("boom", vec!["syllabus.pdf".to_string()], None)
        .unwrap();
    evaluator
        .add_case("ok2", vec!["syllabus.pdf".to_string()], None)
        .unwrap();

    let err = evaluator.run(Some(5)).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("case 2/3"), "got: {message}");
    assert!(message.contains("boom"), "got: {message}");

    // All-or-nothing: nothing to export after an aborted run.
    assert!(evaluator.results().is_empty());
    let dir = tempfile::tempdir().unwrap();
    assert!(evaluator.export(&dir.path().join("out.json")).is_err());
}

#[tokio::test]
async fn skip_policy_averages_over_completed_cases() {
    let retriever = MockRetriever::new(&[
        ("ok1", &["syllabus.pdf"]),
        ("ok2", &["notes.pdf"]),
    ]);
    let mut evaluator = Evaluator::new(retriever).with_failure_policy(FailurePolicy::Skip);
    evaluator
        .add_case("ok1", vec!["syllabus.pdf".to_string()], None)
        .unwrap();
    evaluator
        .add_case("boom", vec!["syllabus.pdf".to_string()], None)
        .unwrap();
    evaluator
        .add_case("ok2", vec!["syllabus.pdf".to_string()], None)
        .unwrap();

    let summary = evaluator.run(Some(1)).await.unwrap();

    assert_eq!(summary.num_queries, 2);
    assert!((summary.hit_rate - 0.5).abs() < 1e-9);
    assert_eq!(evaluator.results().len(), 2);
    assert_eq!(evaluator.results()[0].query, "ok1");
    assert_eq!(evaluator.results()[1].query, "ok2");
}

#[tokio::test]
async fn skip_policy_with_all_failures_still_errors() {
    let retriever = MockRetriever::new(&[]);
    let mut evaluator = Evaluator::new(retriever).with_failure_policy(FailurePolicy::Skip);
    evaluator
        .add_case("boom1", vec!["a.pdf".to_string()], None)
        .unwrap();
    evaluator
        .add_case("boom2", vec!["a.pdf".to_string()], None)
        .unwrap();

    let err = evaluator.run(None).await.unwrap_err();
    assert!(matches!(err, Error::Retrieval(_)), "got: {err}");
    assert!(evaluator.results().is_empty());
}

#[tokio::test]
async fn rerun_replaces_previous_results() {
    let retriever = MockRetriever::new(&[("q", &["syllabus.pdf"])]);
    let mut evaluator = Evaluator::new(retriever);
    evaluator
        .add_case("q", vec!["syllabus.pdf".to_string()], None)
        .unwrap();

    evaluator.run(Some(5)).await.unwrap();
    assert_eq!(evaluator.results().len(), 1);

    evaluator.run(Some(1)).await.unwrap();
    assert_eq!(evaluator.results().len(), 1);
}

#[tokio::test]
async fn scope_is_forwarded_to_the_retriever() {
    let retriever = MockRetriever::new(&[("q1", &["a.pdf"]), ("q2", &["a.pdf"])]);
    let mut evaluator = Evaluator::new(retriever.clone());
    evaluator
        .add_case("q1", vec![], Some("CS101".to_string()))
        .unwrap();
    evaluator.add_case("q2", vec![], None).unwrap();

    evaluator.run(Some(5)).await.unwrap();

    let scopes = retriever.seen_scopes.lock().unwrap().clone();
    assert_eq!(scopes, vec![Some("CS101".to_string()), None]);
}

#[tokio::test]
async fn duplicate_queries_are_registered_independently() {
    let retriever = MockRetriever::new(&[("q", &["syllabus.pdf"])]);
    let mut evaluator = Evaluator::new(retriever);
    evaluator
        .add_case("q", vec!["syllabus.pdf".to_string()], None)
        .unwrap();
    evaluator
        .add_case("q", vec!["syllabus.pdf".to_string()], None)
        .unwrap();

    let summary = evaluator.run(Some(1)).await.unwrap();
    assert_eq!(summary.num_queries, 2);
}

#[tokio::test]
async fn duplicate_retrieved_sources_count_once_for_precision() {
    // Chunk-level retrieval returns syllabus.pdf twice in the top-4;
    // precision treats the intersection as sets of sources.
    let retriever = MockRetriever::new(&[(
        "q",
        &["syllabus.pdf", "syllabus.pdf", "notes.pdf", "schedule.pdf"],
    )]);
    let mut evaluator = Evaluator::new(retriever);
    evaluator
        .add_case("q", vec!["syllabus.pdf".to_string()], None)
        .unwrap();

    let summary = evaluator.run(Some(4)).await.unwrap();

    assert!((summary.precision_at_k - 0.25).abs() < 1e-9); // 1/4
    assert!((summary.recall_at_k - 1.0).abs() < 1e-9);
    assert!((summary.mrr - 1.0).abs() < 1e-9);
    assert!((summary.hit_rate - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn empty_expected_sources_never_recall() {
    let retriever = MockRetriever::new(&[("q", &["a.pdf", "b.pdf"])]);
    let mut evaluator = Evaluator::new(retriever);
    evaluator.add_case("q", vec![], None).unwrap();

    let summary = evaluator.run(Some(5)).await.unwrap();
    assert_eq!(summary.recall_at_k, 0.0);
    assert_eq!(summary.hit_rate, 0.0);
}

#[test]
fn sample_cases_round_trip_through_test_case_format() {
    let cases = courserag_evals::sample_cases();
    let json = serde_json::to_string_pretty(&cases).unwrap();
    let reloaded: Vec<TestCase> = serde_json::from_str(&json).unwrap();
    assert_eq!(reloaded, cases);
}
