use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Tools the executor knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    #[serde(rename = "github_tool")]
    GithubSearch,
    #[serde(rename = "weather_tool")]
    Weather,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [ToolKind::GithubSearch, ToolKind::Weather];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::GithubSearch => "github_tool",
            ToolKind::Weather => "weather_tool",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "github_tool" => Some(ToolKind::GithubSearch),
            "weather_tool" => Some(ToolKind::Weather),
            _ => None,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tool invocation inside a plan
///
/// `tool` stays a plain string because plans may come from an LLM and name
/// tools that do not exist; the planner normalizes it during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    #[serde(default)]
    pub step: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tool: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl PlanStep {
    pub fn new(step: u32, description: impl Into<String>, tool: ToolKind, parameters: Map<String, Value>) -> Self {
        Self {
            step,
            description: description.into(),
            tool: tool.as_str().to_string(),
            parameters,
        }
    }

    pub fn tool_kind(&self) -> Option<ToolKind> {
        ToolKind::parse(&self.tool)
    }
}

/// Ordered list of steps derived from a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub plan: Vec<PlanStep>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.plan.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }
}

/// Outcome of executing one plan step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
    pub step: u32,
    pub tool: String,
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub attempts: u32,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ToolResult {
    pub fn success(step: u32, tool: &str, data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            step,
            tool: tool.to_string(),
            cached: false,
            attempts: 0,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn failure(step: u32, tool: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            step,
            tool: tool.to_string(),
            cached: false,
            attempts: 0,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_cached(mut self, cached: bool) -> Self {
        self.cached = cached;
        self
    }
}

/// A repository as reported by the GitHub tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub stars: u64,
    pub forks: u64,
    pub language: String,
    pub url: String,
    pub created_at: String,
    pub updated_at: String,
    pub license: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Completeness assessment of an execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub is_complete: bool,
    pub completeness_score: u8,
    pub missing_data: Vec<String>,
    pub suggestions: Vec<String>,
    pub summary: String,
}

/// Step counts for a processed task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub total_steps: usize,
    pub successful_steps: usize,
    pub failed_steps: usize,
    pub completeness_score: u8,
}

/// Typed record built from a successful tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResultRecord {
    Github {
        query: String,
        repositories: Vec<Repository>,
        total_count: u64,
        count: usize,
        source: String,
        cached: bool,
    },
    Weather {
        city: String,
        country: String,
        temperature: f64,
        feels_like: Option<f64>,
        condition: String,
        humidity: f64,
        wind_speed: f64,
        source: String,
        cached: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_steps: usize,
    pub executed_steps: usize,
    pub failed_steps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskExecution {
    pub user_request: String,
    pub status: String,
    pub completeness_score: u8,
    pub execution_time: chrono::DateTime<chrono::Utc>,
    pub plan_summary: PlanSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationDigest {
    pub is_complete: bool,
    pub score: u8,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputMetadata {
    pub system: String,
    pub version: String,
    pub architecture: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub agents_used: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedOutput {
    pub task_execution: TaskExecution,
    pub results: Vec<ResultRecord>,
    pub verification: VerificationDigest,
    pub metadata: OutputMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedOutput {
    pub status: String,
    pub user_request: String,
    pub errors: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Structured output handed back to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FinalOutput {
    Completed(CompletedOutput),
    Failed(FailedOutput),
}

impl FinalOutput {
    pub fn is_failed(&self) -> bool {
        matches!(self, FinalOutput::Failed(_))
    }
}

/// Everything produced while processing one task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    pub id: uuid::Uuid,
    pub request: String,
    /// Wall-clock seconds, rounded to two decimals
    pub execution_time: f64,
    pub plan: Plan,
    pub execution_results: Vec<ToolResult>,
    pub verification: Verification,
    pub final_output: FinalOutput,
    pub summary: ExecutionSummary,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
