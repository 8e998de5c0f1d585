//! Runner configuration

use std::time::Duration;

use crate::error::{TapiError, TapiResult};

/// How the tests of one suite are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One test at a time, in document order
    #[default]
    Sequential,
    /// One task per test, joined before aggregation
    Concurrent,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Configuration shared by the runner and every executor it drives
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Prefix for every test's `Uri`; concatenated without normalization
    pub base_url: String,

    pub mode: ExecutionMode,

    /// Client-wide request timeout; expiry counts as a transport failure
    pub request_timeout: Option<Duration>,

    pub user_agent: String,
}

impl RunnerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> TapiResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(TapiError::InvalidConfig("base URL is required".to_string()));
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(TapiError::InvalidConfig(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            mode: ExecutionMode::Sequential,
            request_timeout: None,
            user_agent: format!("tapi/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
