//! HTTP-backed retriever client for the courserag API service
//!
//! The evaluation framework treats retrieval as an external collaborator;
//! this crate implements the [`Retriever`] trait against a running
//! courserag service over its REST API.

use async_trait::async_trait;
use courserag_core::{ApiConfig, Error, Result, RetrievedDocument, Retriever, UNKNOWN_SOURCE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Retrieval request body
#[derive(Debug, Serialize)]
struct RetrieveRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<&'a str>,
    k: usize,
}

/// One ranked document as the API returns it
///
/// `source_file` is optional on the wire; the service omits it for chunks
/// whose ingestion metadata was lost. Everything else rides along in the
/// open metadata map.
#[derive(Debug, Deserialize)]
struct RawDocument {
    source_file: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    content: Option<String>,
    #[serde(flatten)]
    metadata: BTreeMap<String, Value>,
}

/// Retrieval response body
#[derive(Debug, Deserialize)]
struct RetrieveResponse {
    results: Vec<RawDocument>,
}

impl From<RawDocument> for RetrievedDocument {
    fn from(raw: RawDocument) -> Self {
        RetrievedDocument {
            source: raw.source_file.unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            score: raw.score,
            content: raw.content,
            metadata: raw.metadata,
        }
    }
}

/// Retriever that queries a running courserag API service
pub struct HttpRetriever {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRetriever {
    /// Creates a client against the configured API endpoint
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::retrieval(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn retrieve(
        &self,
        query: &str,
        scope: Option<&str>,
        k: usize,
    ) -> Result<Vec<RetrievedDocument>> {
        let url = format!("{}/api/v1/retrieve", self.base_url);
        let request = RetrieveRequest { query, scope, k };

        debug!(%url, query, ?scope, k, "Executing retrieval request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::retrieval(format!("Request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::retrieval(format!(
                "Retrieval failed for '{query}': {status} - {body}"
            )));
        }

        let body: RetrieveResponse = response
            .json()
            .await
            .map_err(|e| Error::retrieval(format!("Failed to parse retrieval response: {e}")))?;

        Ok(body.results.into_iter().map(RetrievedDocument::from).collect())
    }
}
