//! tapi core
//!
//! Declarative HTTP API testing: a suite document lists requests and what
//! their responses must look like; the runner sends each request against a
//! base URL, judges the response and folds the verdicts into a suite result.
//!
//! ```text
//! suite document ──► loader ──► TestSuite
//!                                  │
//!                           SuiteRunner::run
//!                                  │  (sequential or one task per test)
//!                                  ▼
//!                      TestExecutor::execute ──► evaluate()
//!                                  │
//!                  TestResult written back into each TestCase
//!                                  │
//!              fold: AND of statuses, SUM of elapsed seconds
//!                                  │
//!                     JsonFileWriter / HttpReporter
//! ```

pub mod config;
pub mod error;
pub mod evaluate;
pub mod executor;
pub mod loader;
pub mod output;
pub mod runner;
pub mod suite;

pub use config::{ExecutionMode, RunnerConfig};
pub use error::{TapiError, TapiResult};
pub use evaluate::{evaluate, ObservedResponse, Verdict};
pub use executor::TestExecutor;
pub use loader::{load_suite, load_suites};
pub use output::{HttpReporter, JsonFileWriter};
pub use runner::SuiteRunner;
pub use suite::{
    select_tests, Expectation, HeaderPair, SuiteState, SuiteSummary, TestCase, TestResult, TestSuite,
};
