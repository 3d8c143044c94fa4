use crate::agents::{ExecutionPolicy, Executor, Planner, Verifier};
use crate::config::Settings;
use crate::llm::{generator_from_settings, LlmError};
use crate::models::TaskReport;
use crate::tools::{ToolCache, ToolRegistry};
use std::time::Instant;
use thiserror::Error;

/// Errors that can occur while processing a task
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Task must not be empty")]
    EmptyTask,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to set up plan generator: {0}")]
    Generator(#[from] LlmError),
}

/// Planner, executor and verifier wired together
#[derive(Clone)]
pub struct Assistant {
    planner: Planner,
    executor: Executor,
    verifier: Verifier,
}

impl Assistant {
    pub fn new(planner: Planner, executor: Executor, verifier: Verifier) -> Self {
        Self { planner, executor, verifier }
    }

    /// Build every agent from configuration
    pub fn from_settings(settings: &Settings) -> Result<Self, AssistantError> {
        let generator = generator_from_settings(&settings.llm)?;
        let registry = ToolRegistry::from_settings(&settings.apis)?;

        let cache = if settings.cache.enabled {
            ToolCache::new(settings.cache.max_entries, settings.cache.ttl_secs)
        } else {
            ToolCache::disabled()
        };

        let executor = Executor::new(registry, cache, ExecutionPolicy::from(&settings.executor));

        tracing::info!(
            "Assistant ready: {} tool(s), cache {}",
            executor.registry().len(),
            if executor.cache().is_enabled() { "enabled" } else { "disabled" }
        );

        Ok(Self::new(Planner::new(generator), executor, Verifier::new()))
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Plan, execute and verify a task
    pub async fn process_task(&self, task: &str) -> Result<TaskReport, AssistantError> {
        let task = task.trim();
        if task.is_empty() {
            return Err(AssistantError::EmptyTask);
        }

        let started = Instant::now();
        tracing::info!("Processing task: {}", task);

        tracing::info!("Phase 1: planning");
        let plan = self.planner.create_plan(task).await;

        tracing::info!("Phase 2: executing {} step(s)", plan.len());
        let execution_results = self.executor.execute_plan(&plan).await;

        tracing::info!("Phase 3: verifying");
        let report = self.verifier.verify_results(task, &plan, &execution_results);

        let execution_time = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;
        tracing::info!(
            "Task finished in {:.2}s ({}/{} steps succeeded)",
            execution_time,
            report.summary.successful_steps,
            report.summary.total_steps
        );
        tracing::debug!("Tool cache: {:?}", self.executor.cache().stats());

        Ok(TaskReport {
            id: uuid::Uuid::new_v4(),
            request: task.to_string(),
            execution_time,
            plan,
            execution_results,
            verification: report.verification,
            final_output: report.final_output,
            summary: report.summary,
            timestamp: chrono::Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_task_rejected() {
        let assistant = Assistant::from_settings(&Settings::default()).unwrap();
        let err = assistant.process_task("   ").await.unwrap_err();
        assert!(matches!(err, AssistantError::EmptyTask));
    }

    #[test]
    fn test_from_settings_with_cache_disabled() {
        let mut settings = Settings::default();
        settings.cache.enabled = false;

        let assistant = Assistant::from_settings(&settings).unwrap();
        assert!(!assistant.executor().cache().is_enabled());
        assert_eq!(assistant.executor().registry().len(), 2);
    }
}
