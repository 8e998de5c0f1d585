//! Declarative test suite model
//!
//! The same structures describe both the suite document that is loaded
//! before a run and the result document written after it. Field names on
//! the wire are PascalCase (`TestSuiteName`, `Expects`, `ReturnCode`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TapiError, TapiResult};

/// A named, ordered collection of test cases
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestSuite {
    #[serde(rename = "TestSuiteName")]
    pub name: String,

    #[serde(rename = "TestSuiteDescription", default)]
    pub description: String,

    /// AND over every test's completion status, written by the runner
    #[serde(rename = "TestSuiteResultStatus", default)]
    pub result_status: bool,

    /// Sum of every test's elapsed seconds, written by the runner
    #[serde(rename = "TestSuiteTotalSeconds", default)]
    pub total_seconds: f64,

    /// Tests in document order; this is also report order
    #[serde(default)]
    pub tests: Vec<TestCase>,

    #[serde(skip)]
    pub state: SuiteState,
}

/// Lifecycle of a single suite run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SuiteState {
    #[default]
    NotStarted,
    Running,
    Completed,
}

impl std::fmt::Display for SuiteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuiteState::NotStarted => write!(f, "not started"),
            SuiteState::Running => write!(f, "running"),
            SuiteState::Completed => write!(f, "completed"),
        }
    }
}

/// One declarative HTTP request plus its success criteria
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestCase {
    #[serde(rename = "TestName")]
    pub name: String,

    #[serde(rename = "TestDescription", default)]
    pub description: String,

    /// Appended verbatim to the base URL
    pub uri: String,

    pub method: String,

    /// Raw, pre-serialized request payload
    #[serde(default)]
    pub body: String,

    /// Request headers, applied in order (last write wins per name)
    #[serde(default)]
    pub headers: Vec<HeaderPair>,

    /// Whether the response body is kept in the result document
    #[serde(default = "default_include_body")]
    pub include_body_in_result: bool,

    pub expects: Expectation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TestResult>,
}

fn default_include_body() -> bool {
    true
}

/// A single header entry, `{"Key": ..., "Value": ...}` on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HeaderPair {
    pub key: String,
    pub value: String,
}

impl HeaderPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Declared success criteria for a test case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Expectation {
    /// Any integer is accepted; values outside the HTTP range never match
    pub return_code: i64,

    /// Inclusive upper bound on elapsed time
    pub max_seconds: f64,

    /// Headers that must be present with exactly these values
    #[serde(default)]
    pub headers: Vec<HeaderPair>,
}

/// Observed outcome of executing one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestResult {
    pub run_when: DateTime<Utc>,

    /// 0 when no response was received
    pub return_code: u16,

    #[serde(default)]
    pub return_code_status_text: String,

    pub test_completion_status: bool,

    #[serde(default)]
    pub body: String,

    /// Seconds between sending the request and receiving the response head
    pub elapsed_time: f64,

    /// One entry per failed check
    #[serde(default)]
    pub error_message: Vec<String>,
}

impl TestResult {
    /// Result for a request that never produced a response
    pub fn transport_failure(run_when: DateTime<Utc>, elapsed_time: f64, message: String) -> Self {
        Self {
            run_when,
            return_code: 0,
            return_code_status_text: String::new(),
            test_completion_status: false,
            body: String::new(),
            elapsed_time,
            error_message: vec![message],
        }
    }

    pub fn passed(&self) -> bool {
        self.test_completion_status
    }
}

/// Counts derived from a completed suite
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuiteSummary {
    pub name: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub elapsed_seconds: f64,
    pub passed_all: bool,
}

impl TestSuite {
    /// Fold per-test results into the suite aggregate.
    ///
    /// A test without a result counts as failed and contributes no time.
    pub fn fold_results(&mut self) {
        self.result_status = self
            .tests
            .iter()
            .all(|t| t.result.as_ref().map(TestResult::passed).unwrap_or(false));
        self.total_seconds = self
            .tests
            .iter()
            .filter_map(|t| t.result.as_ref())
            .map(|r| r.elapsed_time)
            .sum();
    }

    /// Clear results left over from a previous run
    pub fn reset_results(&mut self) {
        for test in &mut self.tests {
            test.result = None;
        }
        self.result_status = true;
        self.total_seconds = 0.0;
        self.state = SuiteState::NotStarted;
    }

    /// Keep only the named tests, preserving document order
    pub fn retain_tests(&mut self, names: &[String]) {
        if names.is_empty() {
            return;
        }
        self.tests.retain(|t| names.iter().any(|n| n == &t.name));
    }

    pub fn has_test(&self, name: &str) -> bool {
        self.tests.iter().any(|t| t.name == name)
    }

    pub fn failed_tests(&self) -> impl Iterator<Item = &TestCase> {
        self.tests
            .iter()
            .filter(|t| !t.result.as_ref().map(TestResult::passed).unwrap_or(false))
    }

    pub fn summary(&self) -> SuiteSummary {
        let total = self.tests.len();
        let failed = self.failed_tests().count();
        SuiteSummary {
            name: self.name.clone(),
            total,
            passed: total - failed,
            failed,
            elapsed_seconds: self.total_seconds,
            passed_all: self.result_status,
        }
    }
}

/// Narrow every suite to the named tests.
///
/// Every name must match a test in at least one suite; otherwise nothing is
/// narrowed and an `InvalidConfig` error lists the unknown names.
pub fn select_tests(suites: &mut [TestSuite], names: &[String]) -> TapiResult<()> {
    let unknown: Vec<&str> = names
        .iter()
        .filter(|name| !suites.iter().any(|s| s.has_test(name)))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(TapiError::InvalidConfig(format!(
            "no test named {} in the loaded suites",
            unknown.join(", ")
        )));
    }

    for suite in suites.iter_mut() {
        suite.retain_tests(names);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "TestSuiteName": "Sample Tests",
        "TestSuiteDescription": "A set of sample tests",
        "Tests": [
            {
                "TestName": "01",
                "Uri": "",
                "Method": "POST",
                "Headers": [
                    {"Key": "Content-Type", "Value": "application/json"},
                    {"Key": "Authorization", "Value": "SomeAuthKey"}
                ],
                "Expects": {"ReturnCode": 404, "MaxSeconds": 0.300}
            },
            {
                "TestName": "02",
                "TestDescription": "Test of Get",
                "Uri": "api/log",
                "Method": "GET",
                "IncludeBodyInResult": false,
                "Expects": {
                    "ReturnCode": 200,
                    "MaxSeconds": 0.1,
                    "Headers": [{"Key": "Content-type", "Value": "application/json"}]
                }
            }
        ]
    }"#;

    fn result(passed: bool, elapsed: f64) -> TestResult {
        TestResult {
            run_when: Utc::now(),
            return_code: 200,
            return_code_status_text: "200 OK".to_string(),
            test_completion_status: passed,
            body: String::new(),
            elapsed_time: elapsed,
            error_message: vec![],
        }
    }

    #[test]
    fn test_parse_preserves_order_and_defaults() {
        let suite: TestSuite = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(suite.name, "Sample Tests");
        assert_eq!(suite.tests.len(), 2);
        assert_eq!(suite.tests[0].name, "01");
        assert_eq!(suite.tests[1].name, "02");

        let first = &suite.tests[0];
        assert_eq!(first.description, "");
        assert_eq!(first.body, "");
        assert!(first.include_body_in_result);
        assert_eq!(first.headers[0].key, "Content-Type");
        assert_eq!(first.headers[1].key, "Authorization");
        assert!(first.expects.headers.is_empty());
        assert!(first.result.is_none());

        let second = &suite.tests[1];
        assert!(!second.include_body_in_result);
        assert_eq!(second.expects.return_code, 200);
        assert_eq!(second.expects.headers, vec![HeaderPair::new("Content-type", "application/json")]);
        assert_eq!(suite.state, SuiteState::NotStarted);
    }

    #[test]
    fn test_missing_expectation_is_rejected() {
        let doc = r#"{"TestSuiteName": "x", "Tests": [{"TestName": "a", "Uri": "/", "Method": "GET"}]}"#;
        assert!(serde_json::from_str::<TestSuite>(doc).is_err());
    }

    #[test]
    fn test_fold_empty_suite_passes() {
        let mut suite = TestSuite::default();
        suite.fold_results();
        assert!(suite.result_status);
        assert_eq!(suite.total_seconds, 0.0);
    }

    #[test]
    fn test_fold_ands_status_and_sums_time() {
        let mut suite: TestSuite = serde_json::from_str(SAMPLE).unwrap();
        suite.tests[0].result = Some(result(true, 0.25));
        suite.tests[1].result = Some(result(false, 0.5));
        suite.fold_results();

        assert!(!suite.result_status);
        assert!((suite.total_seconds - 0.75).abs() < 1e-9);

        let failed: Vec<_> = suite.failed_tests().map(|t| t.name.as_str()).collect();
        assert_eq!(failed, vec!["02"]);

        let summary = suite.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.passed_all);
    }

    #[test]
    fn test_fold_treats_missing_result_as_failure() {
        let mut suite: TestSuite = serde_json::from_str(SAMPLE).unwrap();
        suite.tests[0].result = Some(result(true, 0.1));
        suite.fold_results();
        assert!(!suite.result_status);
    }

    #[test]
    fn test_retain_tests_keeps_document_order() {
        let mut suite: TestSuite = serde_json::from_str(SAMPLE).unwrap();
        suite.retain_tests(&["02".to_string(), "01".to_string()]);
        let names: Vec<_> = suite.tests.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["01", "02"]);

        suite.retain_tests(&["02".to_string()]);
        assert_eq!(suite.tests.len(), 1);
        assert_eq!(suite.tests[0].name, "02");
    }

    #[test]
    fn test_select_tests_rejects_unknown_name() {
        let mut suites: Vec<TestSuite> = vec![serde_json::from_str(SAMPLE).unwrap()];

        let err = select_tests(&mut suites, &["01".to_string(), "helth".to_string()]).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("helth"));
        assert!(!err.to_string().contains("01,"));
        assert_eq!(suites[0].tests.len(), 2);
    }

    #[test]
    fn test_select_tests_across_suites() {
        let mut other: TestSuite = serde_json::from_str(SAMPLE).unwrap();
        other.tests.retain(|t| t.name == "01");
        other.tests[0].name = "03".to_string();
        let mut suites: Vec<TestSuite> = vec![serde_json::from_str(SAMPLE).unwrap(), other];

        select_tests(&mut suites, &["02".to_string(), "03".to_string()]).unwrap();
        assert_eq!(suites[0].tests.len(), 1);
        assert_eq!(suites[0].tests[0].name, "02");
        assert_eq!(suites[1].tests.len(), 1);
        assert_eq!(suites[1].tests[0].name, "03");

        // no names selects everything
        let mut all: Vec<TestSuite> = vec![serde_json::from_str(SAMPLE).unwrap()];
        select_tests(&mut all, &[]).unwrap();
        assert_eq!(all[0].tests.len(), 2);
    }

    #[test]
    fn test_out_of_range_return_code_still_parses() {
        let doc = r#"{"TestSuiteName": "x", "Tests": [
            {"TestName": "neg", "Uri": "/", "Method": "GET", "Expects": {"ReturnCode": -1, "MaxSeconds": 1}},
            {"TestName": "big", "Uri": "/", "Method": "GET", "Expects": {"ReturnCode": 70000, "MaxSeconds": 1}}
        ]}"#;
        let suite: TestSuite = serde_json::from_str(doc).unwrap();
        assert_eq!(suite.tests[0].expects.return_code, -1);
        assert_eq!(suite.tests[1].expects.return_code, 70000);
    }

    #[test]
    fn test_result_document_field_names() {
        let mut suite: TestSuite = serde_json::from_str(SAMPLE).unwrap();
        suite.tests[0].result = Some(result(true, 0.2));
        suite.fold_results();

        let value = serde_json::to_value(&suite).unwrap();
        assert_eq!(value["TestSuiteResultStatus"], false);
        assert!(value["TestSuiteTotalSeconds"].is_number());

        let first = &value["Tests"][0];
        assert_eq!(first["Result"]["TestCompletionStatus"], true);
        assert_eq!(first["Result"]["ReturnCodeStatusText"], "200 OK");
        assert!(first["Result"]["RunWhen"].is_string());
        assert!(first["Result"]["ErrorMessage"].is_array());
        assert!(value["Tests"][1].get("Result").is_none());
    }
}
