use super::{LlmError, PlanGenerator, RuleBasedGenerator};
use crate::config::LlmSettings;
use crate::models::Plan;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SYSTEM_PROMPT: &str = r#"You are an AI Operations Planner. Create a JSON plan with steps.

Available tools:
1. github_tool: Search GitHub repositories. Parameters: {"query": string, "per_page": integer}
2. weather_tool: Get current weather. Parameters: {"city": string}

Return only JSON with this structure:
{
    "plan": [
        {
            "step": 1,
            "description": "step description",
            "tool": "tool_name",
            "parameters": {"param": "value"}
        }
    ],
    "reasoning": "brief reasoning"
}"#;

/// Plan generator backed by a local Ollama server
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
    fallback: RuleBasedGenerator,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: String,
    stream: bool,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaGenerator {
    pub fn new(base_url: String, model: String, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            model,
            fallback: RuleBasedGenerator::new(),
        })
    }

    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        Self::new(
            settings.ollama_url.clone(),
            settings.model.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// Ask the model for a plan, without any fallback
    pub async fn request_plan(&self, task: &str) -> Result<Plan, LlmError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));

        let body = GenerateRequest {
            model: &self.model,
            system: SYSTEM_PROMPT,
            prompt: format!("Create an execution plan for: {}", task),
            stream: false,
            format: "json",
        };

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(LlmError::ApiError(response.status().as_u16()));
        }

        let generated: GenerateResponse = response.json().await?;
        let plan = parse_plan(&generated.response)?;

        if plan.is_empty() {
            return Err(LlmError::InvalidPlan("model returned no steps".to_string()));
        }

        Ok(plan)
    }
}

/// Parse the JSON object embedded in a model response
///
/// Models often wrap JSON in prose or code fences, so only the span from the
/// first `{` to the last `}` is considered.
pub fn parse_plan(response: &str) -> Result<Plan, LlmError> {
    let start = response.find('{');
    let end = response.rfind('}');

    let json = match (start, end) {
        (Some(start), Some(end)) if end > start => &response[start..=end],
        _ => return Err(LlmError::InvalidPlan("no JSON object in response".to_string())),
    };

    serde_json::from_str(json).map_err(|e| LlmError::InvalidPlan(e.to_string()))
}

#[async_trait]
impl PlanGenerator for OllamaGenerator {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn generate_plan(&self, task: &str) -> Result<Plan, LlmError> {
        match self.request_plan(task).await {
            Ok(plan) => {
                tracing::debug!("Ollama produced {} step(s)", plan.len());
                Ok(plan)
            }
            Err(e) => {
                tracing::warn!("Ollama planning failed ({}), using rule-based planner", e);
                self.fallback.generate_plan(task).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_strips_prose() {
        let response = r#"Sure! Here is the plan:
```json
{"plan": [{"step": 1, "description": "weather", "tool": "weather_tool", "parameters": {"city": "Rome"}}], "reasoning": "asked for weather"}
```"#;
        let plan = parse_plan(response).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.plan[0].parameters["city"], "Rome");
        assert_eq!(plan.reasoning, "asked for weather");
    }

    #[test]
    fn test_parse_plan_rejects_garbage() {
        assert!(matches!(parse_plan("no json here"), Err(LlmError::InvalidPlan(_))));
        assert!(matches!(parse_plan("} backwards {"), Err(LlmError::InvalidPlan(_))));
        assert!(matches!(parse_plan("{not json}"), Err(LlmError::InvalidPlan(_))));
    }
}
