//! Result output: JSON file writer and HTTP reporter
//!
//! Both are best effort from the caller's point of view. Their errors are
//! `TapiError::Output` and never change a suite's verdict.

use std::path::{Path, PathBuf};

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::{TapiError, TapiResult};
use crate::suite::TestSuite;

/// Pretty-printed JSON of a completed suite
pub fn to_json(suite: &TestSuite) -> TapiResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(suite)?)
}

/// Writes completed suites to a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileWriter {
    path: PathBuf,
}

impl JsonFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one suite as a JSON object
    pub fn write(&self, suite: &TestSuite) -> TapiResult<PathBuf> {
        let json = serde_json::to_string_pretty(suite)?;
        self.write_bytes(json.as_bytes())
    }

    /// Write several suites as a JSON array
    pub fn write_all(&self, suites: &[TestSuite]) -> TapiResult<PathBuf> {
        let json = serde_json::to_string_pretty(suites)?;
        self.write_bytes(json.as_bytes())
    }

    fn write_bytes(&self, bytes: &[u8]) -> TapiResult<PathBuf> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.output_error(e))?;
        }
        std::fs::write(&self.path, bytes).map_err(|e| self.output_error(e))?;

        info!("Results written to: {}", self.path.display());
        Ok(self.path.clone())
    }

    fn output_error(&self, e: std::io::Error) -> TapiError {
        TapiError::Output {
            target: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

/// Posts serialized suites to a remote collection endpoint
#[derive(Debug, Clone)]
pub struct HttpReporter {
    client: Client,
    url: String,
}

impl HttpReporter {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `payload` as JSON. Non-2xx responses count as failures.
    pub async fn post(&self, payload: Vec<u8>) -> TapiResult<()> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| self.output_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.output_error(format!("endpoint returned {}", status)));
        }

        debug!("Results posted to {} ({})", self.url, status);
        Ok(())
    }

    /// Serialize and post one suite
    pub async fn post_suite(&self, suite: &TestSuite) -> TapiResult<()> {
        self.post(to_json(suite)?).await
    }

    fn output_error(&self, reason: String) -> TapiError {
        TapiError::Output {
            target: self.url.clone(),
            reason,
        }
    }
}
