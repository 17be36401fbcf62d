//! Core types and traits for the courserag retrieval evaluation framework
//!
//! This crate provides the foundational abstractions used throughout the
//! evaluation tooling, including:
//!
//! - **Test cases**: Labeled queries with expected relevant sources
//! - **Retrieval contract**: The `Retriever` trait and typed documents
//! - **Configuration**: Evaluation tooling configuration management
//! - **Error handling**: Unified error types

pub mod config;
pub mod error;
pub mod retrieval;
pub mod test_case;

// Re-export main types for convenience
pub use config::{ApiConfig, Config, EvalConfig};
pub use error::{Error, Result, ResultExt};
pub use retrieval::{RetrievedDocument, Retriever, UNKNOWN_SOURCE};
pub use test_case::TestCase;

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
