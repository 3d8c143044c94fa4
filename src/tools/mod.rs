//! Tool adapters over external HTTP APIs.
//!
//! Each tool validates its own parameters, performs the API call and can
//! produce well-formed fallback data when the API is unavailable. Retries,
//! caching and fallback policy live in the executor.

pub mod cache;
pub mod github;
pub mod weather;

pub use cache::{CacheKey, CacheStats, ToolCache};
pub use github::GithubTool;
pub use weather::WeatherTool;

use crate::config::ApiSettings;
use crate::models::{ToolInfo, ToolKind};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when running a tool
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Rate limited by {0}")]
    RateLimited(String),

    #[error("{service} API error: {status}")]
    Api { service: String, status: u16 },

    #[error("{service} unavailable: {status}")]
    Unavailable { service: String, status: u16 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

impl ToolError {
    /// Transport failures and 5xx responses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ToolError::Request(_) | ToolError::Unavailable { .. })
    }

    /// Classify a non-success HTTP status from `service`
    pub fn from_status(service: &str, status: reqwest::StatusCode) -> Self {
        let service = service.to_string();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            ToolError::RateLimited(service)
        } else if status.is_server_error() {
            ToolError::Unavailable { service, status: status.as_u16() }
        } else {
            ToolError::Api { service, status: status.as_u16() }
        }
    }

    /// Errors after which synthetic data is better than nothing.
    pub fn allows_fallback(&self) -> bool {
        matches!(
            self,
            ToolError::Request(_)
                | ToolError::Unavailable { .. }
                | ToolError::RateLimited(_)
                | ToolError::NotFound(_)
        )
    }
}

/// Parameters accepted by a tool, name -> human readable description
pub type ParameterDocs = BTreeMap<String, String>;

#[async_trait]
pub trait Tool: Send + Sync {
    fn kind(&self) -> ToolKind;

    fn description(&self) -> &'static str;

    fn parameters(&self) -> ParameterDocs;

    /// Cheap structural check before any network call
    fn validate(&self, params: &Map<String, Value>) -> bool;

    async fn execute(&self, params: &Map<String, Value>) -> Result<Value, ToolError>;

    /// Synthetic result used when the API cannot be reached
    fn fallback(&self, _params: &Map<String, Value>) -> Option<Value> {
        None
    }

    /// Whether `error` should be answered with [`Tool::fallback`] data
    fn fallback_on(&self, error: &ToolError) -> bool {
        error.allows_fallback()
    }

    fn info(&self) -> ToolInfo {
        ToolInfo {
            name: self.kind().as_str().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Build the shared HTTP client used by all tools
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(github::USER_AGENT)
        .build()
}

/// Lookup table from tool kind to implementation
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<ToolKind, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the GitHub and weather tools sharing one HTTP client
    pub fn from_settings(apis: &ApiSettings) -> Result<Self, reqwest::Error> {
        let client = build_http_client(apis.request_timeout())?;

        let mut registry = Self::new();
        registry.register(Arc::new(GithubTool::new(client.clone(), apis.github_api_base.clone())));
        registry.register(Arc::new(WeatherTool::new(client, apis)));
        Ok(registry)
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.kind(), tool);
    }

    pub fn get(&self, kind: ToolKind) -> Option<Arc<dyn Tool>> {
        self.tools.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool documentation in a stable order
    pub fn describe(&self) -> Vec<ToolInfo> {
        ToolKind::ALL
            .iter()
            .filter_map(|kind| self.tools.get(kind))
            .map(|tool| tool.info())
            .collect()
    }
}

pub(crate) fn str_param<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str()).map(str::trim).filter(|s| !s.is_empty())
}

/// Integer parameter, accepting numeric strings as LLMs often emit them
pub(crate) fn u64_param(params: &Map<String, Value>, key: &str) -> Option<u64> {
    match params.get(key)? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
