//! courserag-eval - Retrieval quality evaluation CLI
//!
//! Entry point for the courserag retrieval evaluation framework: loads
//! labeled test cases, drives the retrieval API, and reports standard IR
//! metrics with latency profiling.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod report;
mod template;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use courserag_core::Config;
use courserag_evals::{Evaluator, FailurePolicy};
use courserag_retriever::HttpRetriever;
use report::ConsoleReporter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "courserag-eval")]
#[command(about = "Retrieval quality evaluation for the courserag teaching assistant")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a retrieval evaluation against the courserag API
    Run {
        /// Path to a test-case JSON file (built-in samples when omitted)
        #[arg(long, value_name = "FILE")]
        test_file: Option<PathBuf>,

        /// Number of documents to retrieve per query
        #[arg(long)]
        k: Option<usize>,

        /// Export detailed per-query results to this JSON file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,

        /// Skip cases whose retrieval call fails instead of aborting the run
        #[arg(long)]
        skip_failures: bool,
    },
    /// Generate a sample test-case template to customize
    Template {
        /// Destination path for the template JSON
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            test_file,
            k,
            export,
            skip_failures,
        } => {
            run_evaluation(
                cli.config.as_deref(),
                test_file.as_deref(),
                k,
                export.as_deref(),
                skip_failures,
            )
            .await
        }
        Commands::Template { path } => generate_template(&path),
    }
}

/// Initialize logging system
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "courserag_eval={level},courserag_evals={level},courserag_retriever={level},courserag_core={level}"
        ))
        .init();
}

/// Load cases, run the evaluation, print the summary, optionally export
async fn run_evaluation(
    config_path: Option<&Path>,
    test_file: Option<&Path>,
    k: Option<usize>,
    export: Option<&Path>,
    skip_failures: bool,
) -> Result<()> {
    let config = Config::load(config_path)?;
    config.validate()?;

    let policy = if skip_failures || config.eval.skip_failures {
        FailurePolicy::Skip
    } else {
        FailurePolicy::Abort
    };
    let k = k.unwrap_or(config.eval.default_k);

    let retriever =
        HttpRetriever::new(&config.api).context("Failed to create retrieval client")?;

    let mut evaluator = Evaluator::new(Arc::new(retriever))
        .with_k(k)
        .with_failure_policy(policy)
        .with_observer(Arc::new(ConsoleReporter));

    match test_file {
        Some(path) => {
            let count = evaluator
                .load_cases(path)
                .with_context(|| format!("Failed to load test cases from {}", path.display()))?;
            info!(count, "Test cases loaded");
        }
        None => {
            println!("No test file provided. Using built-in sample test cases.");
            for case in courserag_evals::sample_cases() {
                evaluator.add_case(case.query, case.expected_sources, case.scope)?;
            }
        }
    }

    let summary = evaluator.run(Some(k)).await?;

    if let Some(path) = export {
        evaluator
            .export(path)
            .with_context(|| format!("Failed to export results to {}", path.display()))?;
        println!("Results exported to {}", path.display());
    }

    info!(
        num_queries = summary.num_queries,
        "Evaluation finished successfully"
    );
    Ok(())
}

/// Write the sample template and exit
fn generate_template(path: &Path) -> Result<()> {
    let count = template::write_template(path)
        .with_context(|| format!("Failed to write template to {}", path.display()))?;
    println!("Generated template with {count} cases at {}", path.display());
    println!("Edit this file with queries and expected sources for your documents.");
    Ok(())
}
