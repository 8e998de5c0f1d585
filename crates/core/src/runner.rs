//! Suite runner: schedules every test of a suite and folds the results

use chrono::Utc;
use futures::future::join_all;
use tracing::{error, info};

use crate::config::{ExecutionMode, RunnerConfig};
use crate::error::TapiResult;
use crate::executor::TestExecutor;
use crate::suite::{SuiteState, SuiteSummary, TestCase, TestResult, TestSuite};

/// Drives test suites against one base URL
pub struct SuiteRunner {
    config: RunnerConfig,
    executor: TestExecutor,
}

impl SuiteRunner {
    /// Validate the configuration and build the shared HTTP client
    pub fn new(config: RunnerConfig) -> TapiResult<Self> {
        config.validate()?;
        let client = TestExecutor::build_client(&config)?;
        let executor = TestExecutor::new(client, config.base_url.clone());
        Ok(Self { config, executor })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn executor(&self) -> &TestExecutor {
        &self.executor
    }

    /// Run every test of `suite` and write the results back into it.
    ///
    /// Individual failures never abort the run; the suite always ends in
    /// `SuiteState::Completed` with its aggregate fields recomputed.
    pub async fn run(&self, suite: &mut TestSuite) -> SuiteSummary {
        suite.reset_results();
        suite.state = SuiteState::Running;

        info!(
            "Running {} test(s) from suite '{}' against {} ({})",
            suite.tests.len(),
            suite.name,
            self.config.base_url,
            self.config.mode
        );

        let results = match self.config.mode {
            ExecutionMode::Sequential => self.run_sequential(&suite.tests).await,
            ExecutionMode::Concurrent => self.run_concurrent(&suite.tests).await,
        };

        // every slot is filled before anything reads a result
        for (test, result) in suite.tests.iter_mut().zip(results) {
            test.result = Some(result);
        }

        suite.fold_results();
        suite.state = SuiteState::Completed;

        let summary = suite.summary();
        info!(
            "Test Results: {} passed, {} failed ({:.3}s) - suite {}",
            summary.passed,
            summary.failed,
            summary.elapsed_seconds,
            if summary.passed_all { "passed" } else { "failed" }
        );
        summary
    }

    /// Run several suites one after another
    pub async fn run_all(&self, suites: &mut [TestSuite]) -> Vec<SuiteSummary> {
        let mut summaries = Vec::with_capacity(suites.len());
        for suite in suites.iter_mut() {
            summaries.push(self.run(suite).await);
        }
        summaries
    }

    async fn run_sequential(&self, tests: &[TestCase]) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(tests.len());
        for test in tests {
            results.push(self.executor.execute(test).await);
        }
        results
    }

    /// One task per test; `join_all` keeps results in test order
    async fn run_concurrent(&self, tests: &[TestCase]) -> Vec<TestResult> {
        let handles: Vec<_> = tests
            .iter()
            .cloned()
            .map(|test| {
                let executor = self.executor.clone();
                tokio::spawn(async move { executor.execute(&test).await })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(tests)
            .map(|(joined, test)| match joined {
                Ok(result) => result,
                Err(e) => {
                    error!("Task for test {} did not complete: {}", test.name, e);
                    TestResult::transport_failure(
                        Utc::now(),
                        0.0,
                        format!("test task did not complete: {}", e),
                    )
                }
            })
            .collect()
    }
}
