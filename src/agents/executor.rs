use crate::config::ExecutorSettings;
use crate::models::{Plan, PlanStep, ToolResult};
use crate::tools::{CacheKey, Tool, ToolCache, ToolError, ToolRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Retry, delay and fallback policy for step execution
#[derive(Debug, Clone, Copy)]
pub struct ExecutionPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub step_delay: Duration,
    pub fallback_enabled: bool,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self::from(&ExecutorSettings::default())
    }
}

impl From<&ExecutorSettings> for ExecutionPolicy {
    fn from(settings: &ExecutorSettings) -> Self {
        Self {
            max_retries: settings.max_retries.max(1),
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
            step_delay: Duration::from_millis(settings.step_delay_ms),
            fallback_enabled: settings.fallback_enabled,
        }
    }
}

/// Entries kept in the execution history; older ones are dropped first
pub const MAX_HISTORY: usize = 1000;

/// One entry of the execution history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub step: u32,
    pub tool: String,
    pub success: bool,
    pub cached: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Aggregate over the retained execution history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorSummary {
    pub total_executions: usize,
    pub successful: usize,
    pub failed: usize,
    pub tools_used: Vec<String>,
}

/// Agent responsible for running plan steps against the tool registry
#[derive(Clone)]
pub struct Executor {
    registry: ToolRegistry,
    cache: ToolCache,
    policy: ExecutionPolicy,
    history: Arc<Mutex<VecDeque<HistoryEntry>>>,
    history_capacity: usize,
}

impl Executor {
    pub fn new(registry: ToolRegistry, cache: ToolCache, policy: ExecutionPolicy) -> Self {
        Self {
            registry,
            cache,
            policy,
            history: Arc::new(Mutex::new(VecDeque::new())),
            history_capacity: MAX_HISTORY,
        }
    }

    /// Keep at most `capacity` history entries
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ToolCache {
        &self.cache
    }

    /// Run every step in order, pausing between steps to stay under API rate limits
    pub async fn execute_plan(&self, plan: &Plan) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(plan.len());

        for (i, step) in plan.plan.iter().enumerate() {
            if i > 0 && !self.policy.step_delay.is_zero() {
                tokio::time::sleep(self.policy.step_delay).await;
            }
            results.push(self.execute_step(step).await);
        }

        results
    }

    /// Execute a single step
    pub async fn execute_step(&self, step: &PlanStep) -> ToolResult {
        let result = self.run_step(step).await;
        self.record(&result);
        result
    }

    async fn run_step(&self, step: &PlanStep) -> ToolResult {
        let tool = match step.tool_kind().and_then(|kind| self.registry.get(kind)) {
            Some(tool) => tool,
            None => {
                tracing::warn!("Step {}: tool '{}' not found", step.step, step.tool);
                return ToolResult::failure(step.step, &step.tool, format!("Tool '{}' not found", step.tool));
            }
        };
        let kind = tool.kind();

        if !tool.validate(&step.parameters) {
            tracing::warn!("Step {}: invalid parameters for {}: {:?}", step.step, kind, step.parameters);
            return ToolResult::failure(step.step, kind.as_str(), format!("Invalid parameters for {}", kind));
        }

        let cache_key = CacheKey::tool_call(kind, &step.parameters);
        if let Some(data) = self.cache.get(&cache_key).await {
            tracing::info!("Step {}: {} served from cache", step.step, kind);
            return ToolResult::success(step.step, kind.as_str(), data).with_cached(true);
        }

        let (outcome, attempts) = self.run_with_retries(step, tool.as_ref()).await;

        match outcome {
            Ok(data) => {
                self.cache.set(&cache_key, data.clone()).await;
                tracing::info!("Step {}: {} succeeded after {} attempt(s)", step.step, kind, attempts);
                ToolResult::success(step.step, kind.as_str(), data).with_attempts(attempts)
            }
            Err(e) => self.recover(step, tool.as_ref(), e, attempts),
        }
    }

    async fn run_with_retries(&self, step: &PlanStep, tool: &dyn Tool) -> (Result<Value, ToolError>, u32) {
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::debug!("Executing step {} with {} (attempt {})", step.step, tool.kind(), attempt);

            match tool.execute(&step.parameters).await {
                Ok(data) => return (Ok(data), attempt),
                Err(e) if e.is_retryable() && attempt < self.policy.max_retries => {
                    tracing::warn!("Step {} attempt {} failed: {}", step.step, attempt, e);
                    // linear backoff
                    tokio::time::sleep(self.policy.retry_delay * attempt).await;
                }
                Err(e) => return (Err(e), attempt),
            }
        }
    }

    fn recover(&self, step: &PlanStep, tool: &dyn Tool, error: ToolError, attempts: u32) -> ToolResult {
        let kind = tool.kind();

        if self.policy.fallback_enabled && tool.fallback_on(&error) {
            if let Some(data) = tool.fallback(&step.parameters) {
                tracing::warn!("Step {}: {} unavailable ({}), using fallback data", step.step, kind, error);
                return ToolResult::success(step.step, kind.as_str(), data).with_attempts(attempts);
            }
        }

        let message = if error.is_retryable() {
            format!("Failed after {} attempts: {}", attempts, error)
        } else {
            error.to_string()
        };

        tracing::error!("Step {}: {} failed: {}", step.step, kind, message);
        ToolResult::failure(step.step, kind.as_str(), message).with_attempts(attempts)
    }

    fn record(&self, result: &ToolResult) {
        let entry = HistoryEntry {
            step: result.step,
            tool: result.tool.clone(),
            success: result.success,
            cached: result.cached,
            timestamp: result.timestamp,
        };

        let mut history = match self.history.lock() {
            Ok(history) => history,
            Err(poisoned) => poisoned.into_inner(),
        };

        while history.len() >= self.history_capacity {
            history.pop_front();
        }
        history.push_back(entry);
    }

    /// Retained history, oldest first
    pub fn history(&self) -> Vec<HistoryEntry> {
        match self.history.lock() {
            Ok(history) => history.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    /// Totals across the execution history
    pub fn execution_summary(&self) -> ExecutorSummary {
        let history = self.history();
        let successful = history.iter().filter(|h| h.success).count();
        let tools_used: BTreeSet<String> = history.iter().map(|h| h.tool.clone()).collect();

        ExecutorSummary {
            total_executions: history.len(),
            successful,
            failed: history.len() - successful,
            tools_used: tools_used.into_iter().collect(),
        }
    }
}
