//! Expectation checks against an observed response
//!
//! Every function here is pure: the same response and expectation always
//! yield the same verdict and the same diagnostics.

use reqwest::header::HeaderMap;
use std::time::Duration;

use crate::suite::{Expectation, HeaderPair};

/// What the executor saw on the wire, minus the body
#[derive(Debug, Clone)]
pub struct ObservedResponse {
    pub status: u16,
    pub elapsed: Duration,
    pub headers: HeaderMap,
}

/// Outcome of evaluating one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    /// One entry per failed check category
    pub messages: Vec<String>,
}

/// Run every check and combine them.
///
/// Diagnostics are ordered: headers, return code, elapsed time.
pub fn evaluate(observed: &ObservedResponse, expects: &Expectation) -> Verdict {
    let mut messages = Vec::new();

    let headers_match = match check_headers(&observed.headers, &expects.headers) {
        Ok(()) => true,
        Err(msg) => {
            messages.push(msg);
            false
        }
    };

    let code_match = match check_status(observed.status, expects.return_code) {
        Ok(()) => true,
        Err(msg) => {
            messages.push(msg);
            false
        }
    };

    let time_match = match check_elapsed(observed.elapsed.as_secs_f64(), expects.max_seconds) {
        Ok(()) => true,
        Err(msg) => {
            messages.push(msg);
            false
        }
    };

    Verdict {
        passed: headers_match && code_match && time_match,
        messages,
    }
}

/// Exact status code equality
pub fn check_status(observed: u16, expected: i64) -> Result<(), String> {
    if i64::from(observed) == expected {
        Ok(())
    } else {
        Err(format!(
            "Response Code Mismatch: expected {}, got {}",
            expected, observed
        ))
    }
}

/// Inclusive time budget: `elapsed <= max`
pub fn check_elapsed(elapsed_seconds: f64, max_seconds: f64) -> Result<(), String> {
    if elapsed_seconds <= max_seconds {
        Ok(())
    } else {
        Err(format!(
            "Elapsed time greater than expected time: {:.4}s > {}s",
            elapsed_seconds, max_seconds
        ))
    }
}

/// Every expected header must be present with exactly the expected value.
///
/// Names compare case-insensitively, values case-sensitively. All
/// mismatches are collected into a single message.
pub fn check_headers(actual: &HeaderMap, expected: &[HeaderPair]) -> Result<(), String> {
    let mismatches: Vec<String> = expected
        .iter()
        .filter_map(|pair| {
            let observed = actual
                .get(pair.key.as_str())
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
            match observed {
                Some(ref value) if value == &pair.value => None,
                Some(value) => Some(format!("{}:{} != {}", pair.key, pair.value, value)),
                None => Some(format!("{}:{} != <missing>", pair.key, pair.value)),
            }
        })
        .collect();

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(format!("Header mismatch: {}", mismatches.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    fn observed(status: u16, millis: u64, headers: &[(&'static str, &'static str)]) -> ObservedResponse {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            map.insert(HeaderName::from_static(*k), HeaderValue::from_static(*v));
        }
        ObservedResponse {
            status,
            elapsed: Duration::from_millis(millis),
            headers: map,
        }
    }

    fn expects(code: i64, max: f64, headers: Vec<HeaderPair>) -> Expectation {
        Expectation {
            return_code: code,
            max_seconds: max,
            headers,
        }
    }

    #[test]
    fn test_all_checks_pass() {
        let resp = observed(200, 300, &[("content-type", "application/json")]);
        let exp = expects(200, 1.0, vec![HeaderPair::new("Content-Type", "application/json")]);
        let verdict = evaluate(&resp, &exp);
        assert!(verdict.passed);
        assert!(verdict.messages.is_empty());
    }

    #[test]
    fn test_status_mismatch() {
        let verdict = evaluate(&observed(500, 10, &[]), &expects(200, 1.0, vec![]));
        assert!(!verdict.passed);
        assert_eq!(verdict.messages.len(), 1);
        assert!(verdict.messages[0].contains("Response Code Mismatch"));
        assert!(verdict.messages[0].contains("500"));
    }

    #[test]
    fn test_out_of_range_expected_code_never_matches() {
        assert!(check_status(200, 200).is_ok());
        assert!(check_status(200, -1).is_err());
        assert!(check_status(4464, 70000).is_err());
        assert!(check_status(u16::MAX, 65535 + 65536).is_err());
    }

    #[test]
    fn test_time_bound_is_inclusive() {
        assert!(check_elapsed(1.0, 1.0).is_ok());
        assert!(check_elapsed(1.0001, 1.0).is_err());

        let verdict = evaluate(&observed(200, 1000, &[]), &expects(200, 1.0, vec![]));
        assert!(verdict.passed);
    }

    #[test]
    fn test_time_exceeded() {
        let verdict = evaluate(&observed(200, 1500, &[]), &expects(200, 1.0, vec![]));
        assert!(!verdict.passed);
        assert_eq!(verdict.messages.len(), 1);
        assert!(verdict.messages[0].starts_with("Elapsed time greater than expected time"));
    }

    #[test]
    fn test_missing_header_is_named() {
        let verdict = evaluate(
            &observed(200, 10, &[]),
            &expects(200, 1.0, vec![HeaderPair::new("X-Version", "2")]),
        );
        assert!(!verdict.passed);
        assert_eq!(verdict.messages, vec!["Header mismatch: X-Version:2 != <missing>".to_string()]);
    }

    #[test]
    fn test_header_value_is_case_sensitive() {
        let resp = observed(200, 10, &[("x-mode", "Fast")]);
        assert!(check_headers(&resp.headers, &[HeaderPair::new("X-MODE", "Fast")]).is_ok());
        assert!(check_headers(&resp.headers, &[HeaderPair::new("X-MODE", "fast")]).is_err());
    }

    #[test]
    fn test_all_header_mismatches_in_one_message() {
        let resp = observed(200, 10, &[("x-a", "1")]);
        let err = check_headers(
            &resp.headers,
            &[
                HeaderPair::new("X-A", "2"),
                HeaderPair::new("X-B", "3"),
            ],
        )
        .unwrap_err();
        assert_eq!(err, "Header mismatch: X-A:2 != 1; X-B:3 != <missing>");
    }

    #[test]
    fn test_one_message_per_failed_category_in_fixed_order() {
        let verdict = evaluate(
            &observed(404, 2000, &[]),
            &expects(200, 1.0, vec![HeaderPair::new("X-A", "1"), HeaderPair::new("X-B", "2")]),
        );
        assert!(!verdict.passed);
        assert_eq!(verdict.messages.len(), 3);
        assert!(verdict.messages[0].starts_with("Header mismatch"));
        assert!(verdict.messages[1].starts_with("Response Code Mismatch"));
        assert!(verdict.messages[2].starts_with("Elapsed time"));
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let resp = observed(418, 20, &[("x-a", "1")]);
        let exp = expects(200, 0.01, vec![HeaderPair::new("X-A", "2")]);
        assert_eq!(evaluate(&resp, &exp), evaluate(&resp, &exp));
    }
}
