use crate::core::DEFAULT_CITY;
use crate::llm::{PlanGenerator, RuleBasedGenerator};
use crate::models::{Plan, PlanStep, ToolKind};
use crate::tools::github::{DEFAULT_PER_PAGE, DEFAULT_SEARCH_QUERY, MAX_PER_PAGE};
use crate::tools::u64_param;
use serde_json::{json, Value};
use std::sync::Arc;

/// Longest plan a single task may run; model output beyond this is dropped
pub const MAX_PLAN_STEPS: usize = 10;

/// Agent responsible for turning a task into a validated plan
#[derive(Clone)]
pub struct Planner {
    generator: Arc<dyn PlanGenerator>,
}

impl Planner {
    pub fn new(generator: Arc<dyn PlanGenerator>) -> Self {
        Self { generator }
    }

    pub fn rule_based() -> Self {
        Self::new(Arc::new(RuleBasedGenerator::new()))
    }

    /// Create an execution plan for `task`
    ///
    /// Never fails: generator errors produce a single-step fallback plan.
    pub async fn create_plan(&self, task: &str) -> Plan {
        tracing::info!("Creating plan with {} generator for: {}", self.generator.name(), task);

        match self.generator.generate_plan(task).await {
            Ok(plan) => {
                let plan = validate_plan(plan);
                tracing::info!("Created plan with {} step(s)", plan.len());
                plan
            }
            Err(e) => {
                tracing::error!("Plan generation failed: {}", e);
                fallback_plan()
            }
        }
    }
}

/// Normalize a plan so every step is executable
///
/// Plans longer than [`MAX_PLAN_STEPS`] are truncated. Steps are renumbered
/// from 1, unknown tools become GitHub searches, and missing or out-of-range
/// parameters get defaults.
pub fn validate_plan(mut plan: Plan) -> Plan {
    if plan.len() > MAX_PLAN_STEPS {
        tracing::warn!("Plan has {} steps, keeping the first {}", plan.len(), MAX_PLAN_STEPS);
        plan.plan.truncate(MAX_PLAN_STEPS);
    }

    for (i, step) in plan.plan.iter_mut().enumerate() {
        step.step = i as u32 + 1;

        let kind = match step.tool_kind() {
            Some(kind) => kind,
            None => {
                tracing::warn!("Unknown tool '{}' in step {}, using {}", step.tool, step.step, ToolKind::GithubSearch);
                step.tool = ToolKind::GithubSearch.as_str().to_string();
                ToolKind::GithubSearch
            }
        };

        match kind {
            ToolKind::GithubSearch => {
                if !has_text(step, "query") {
                    step.parameters.insert("query".to_string(), json!(DEFAULT_SEARCH_QUERY));
                }
                let per_page = u64_param(&step.parameters, "per_page")
                    .unwrap_or(DEFAULT_PER_PAGE)
                    .clamp(1, MAX_PER_PAGE);
                step.parameters.insert("per_page".to_string(), json!(per_page));
            }
            ToolKind::Weather => {
                if !has_text(step, "city") {
                    step.parameters.insert("city".to_string(), json!(DEFAULT_CITY));
                }
            }
        }

        if step.description.trim().is_empty() {
            step.description = format!("Run {}", kind);
        }
    }

    plan
}

fn has_text(step: &PlanStep, key: &str) -> bool {
    step.parameters
        .get(key)
        .and_then(Value::as_str)
        .map_or(false, |s| !s.trim().is_empty())
}

/// Plan used when no generator output is usable
pub fn fallback_plan() -> Plan {
    let mut params = serde_json::Map::new();
    params.insert("query".to_string(), json!(DEFAULT_SEARCH_QUERY));
    params.insert("per_page".to_string(), json!(DEFAULT_PER_PAGE));

    Plan {
        plan: vec![PlanStep::new(1, "Search GitHub repositories", ToolKind::GithubSearch, params)],
        reasoning: "Fallback plan created".to_string(),
        note: Some("Using fallback planning".to_string()),
    }
}
