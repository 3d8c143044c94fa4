//! Plan generation backends.
//!
//! The rule-based generator needs no model at all. The Ollama generator asks
//! a local model for a JSON plan and falls back to the rule-based one on any
//! failure.

pub mod ollama;
pub mod rule_based;

pub use ollama::OllamaGenerator;
pub use rule_based::RuleBasedGenerator;

use crate::config::LlmSettings;
use crate::models::Plan;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while generating a plan
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Model returned error status: {0}")]
    ApiError(u16),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),
}

#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn generate_plan(&self, task: &str) -> Result<Plan, LlmError>;
}

/// Pick the generator the settings ask for
pub fn generator_from_settings(settings: &LlmSettings) -> Result<Arc<dyn PlanGenerator>, LlmError> {
    if settings.use_ollama {
        tracing::info!("Using Ollama model '{}' at {}", settings.model, settings.ollama_url);
        Ok(Arc::new(OllamaGenerator::from_settings(settings)?))
    } else {
        Ok(Arc::new(RuleBasedGenerator::new()))
    }
}
