//! Built-in sample test cases
//!
//! A small template set users customize against their own uploaded
//! documents. Written out by the CLI's `template` command and used as a
//! fallback when no test file is supplied.

use courserag_core::TestCase;

/// Returns the sample test-case template
pub fn sample_cases() -> Vec<TestCase> {
    let cases = [
        ("What is the grading policy for this course?", vec!["syllabus.pdf"]),
        ("When is the midterm exam scheduled?", vec!["syllabus.pdf", "schedule.pdf"]),
        ("What are the office hours?", vec!["syllabus.pdf"]),
        ("What topics are covered in week 3?", vec!["schedule.pdf", "lecture_03.pdf"]),
        ("What is the late submission policy?", vec!["syllabus.pdf"]),
    ];

    cases
        .into_iter()
        .map(|(query, sources)| TestCase {
            query: query.to_string(),
            expected_sources: sources.into_iter().map(String::from).collect(),
            scope: None,
        })
        .collect()
}
