//! Executes a single test case against the base URL

use std::error::Error as _;
use std::time::Instant;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Request, StatusCode};
use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::error::{TapiError, TapiResult};
use crate::evaluate::{evaluate, ObservedResponse};
use crate::suite::{TestCase, TestResult};

/// Sends one request per test case and judges the response.
///
/// Cloning is cheap: the client is reference counted, so clones share one
/// connection pool.
#[derive(Debug, Clone)]
pub struct TestExecutor {
    client: Client,
    base_url: String,
}

impl TestExecutor {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Build the shared HTTP client described by `config`
    pub fn build_client(config: &RunnerConfig) -> TapiResult<Client> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The shared client, for collaborators that talk HTTP outside a test
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Target URL for a test: plain concatenation, no normalization
    pub fn target_url(&self, case: &TestCase) -> String {
        format!("{}{}", self.base_url, case.uri)
    }

    /// Run one test case. Never fails: transport problems are recorded in
    /// the returned result.
    pub async fn execute(&self, case: &TestCase) -> TestResult {
        info!("Running test: {}", case.name);

        let request = match self.build_request(case) {
            Ok(request) => request,
            Err(e) => {
                warn!("Error setting up request for test {}: {}", case.name, e);
                return TestResult::transport_failure(Utc::now(), 0.0, e.to_string());
            }
        };

        let run_when = Utc::now();
        let start = Instant::now();

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let elapsed = start.elapsed().as_secs_f64();
                let message = format!(
                    "Error calling {} {}: {}",
                    case.method,
                    self.target_url(case),
                    describe_transport_error(&e)
                );
                warn!("✗ {} - {}", case.name, message);
                return TestResult::transport_failure(run_when, elapsed, message);
            }
        };

        let elapsed = start.elapsed();
        let status = response.status();
        let headers = response.headers().clone();

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read response body for test {}: {}", case.name, e);
                String::new()
            }
        };

        let observed = ObservedResponse {
            status: status.as_u16(),
            elapsed,
            headers,
        };
        let verdict = evaluate(&observed, &case.expects);

        let result = TestResult {
            run_when,
            return_code: status.as_u16(),
            return_code_status_text: status_text(status),
            test_completion_status: verdict.passed,
            body: if case.include_body_in_result { body } else { String::new() },
            elapsed_time: elapsed.as_secs_f64(),
            error_message: verdict.messages,
        };

        debug!("Response Headers: {:?}", observed.headers);
        debug!("Response Body: {}", result.body);
        debug!("Response Status Text: {}", result.return_code_status_text);
        debug!(
            "Status Code: {} (expected {})",
            result.return_code, case.expects.return_code
        );
        debug!(
            "Seconds: {:.4} (expected at most {})",
            result.elapsed_time, case.expects.max_seconds
        );

        if result.test_completion_status {
            info!("✓ {} ({:.3}s)", case.name, result.elapsed_time);
        } else {
            info!("✗ {} - {}", case.name, result.error_message.join(", "));
        }

        result
    }

    /// Turn a test case into a ready-to-send request
    pub fn build_request(&self, case: &TestCase) -> TapiResult<Request> {
        let method = if case.method.is_empty() {
            Method::GET
        } else {
            Method::from_bytes(case.method.as_bytes()).map_err(|e| {
                TapiError::Transport(format!("invalid method '{}': {}", case.method, e))
            })?
        };

        let mut headers = HeaderMap::new();
        for pair in &case.headers {
            let name = HeaderName::from_bytes(pair.key.as_bytes()).map_err(|e| {
                TapiError::Transport(format!("invalid header name '{}': {}", pair.key, e))
            })?;
            let value = HeaderValue::from_str(&pair.value).map_err(|e| {
                TapiError::Transport(format!("invalid value for header '{}': {}", pair.key, e))
            })?;
            // insert, not append: a repeated name keeps its last value
            headers.insert(name, value);
        }

        let url = self.target_url(case);
        let mut builder = self.client.request(method, url.as_str()).headers(headers);
        if !case.body.is_empty() {
            builder = builder.body(case.body.clone());
        }

        builder.build().map_err(|e| {
            TapiError::Transport(format!("invalid request for '{}': {}", url, describe_transport_error(&e)))
        })
    }
}

/// `"200 OK"` style status line text
pub fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// Flatten a reqwest error and its causes into one line
fn describe_transport_error(e: &reqwest::Error) -> String {
    let mut message = if e.is_timeout() {
        format!("request timed out ({})", e)
    } else {
        e.to_string()
    };
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
