use super::{LlmError, PlanGenerator};
use crate::core::{contains_word_prefix, extract_cities, extract_query, DEFAULT_CITY};
use crate::models::{Plan, PlanStep, ToolKind};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

const GITHUB_KEYWORDS: &[&str] = &["github", "repo", "code", "project", "search", "find"];
const WEATHER_KEYWORDS: &[&str] = &["weather", "temp", "forecast", "climate", "humid"];

/// Weather lookups per task are capped to keep a single request bounded
pub const MAX_WEATHER_STEPS: usize = 5;

pub const DEFAULT_GITHUB_PER_PAGE: u64 = 5;

/// Keyword-driven planner that needs no model
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedGenerator;

impl RuleBasedGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Build a plan synchronously
    pub fn plan(&self, task: &str) -> Plan {
        let lower = task.to_lowercase();
        let mut plan = Plan::default();
        let mut reasoning = Vec::new();

        if GITHUB_KEYWORDS.iter().any(|k| contains_word_prefix(&lower, k)) {
            let query = extract_query(task);
            plan.plan.push(PlanStep::new(
                next_step(&plan),
                format!("Search GitHub for '{}' repositories", query),
                ToolKind::GithubSearch,
                github_params(&query),
            ));
            reasoning.push(format!("User wants to search for {} repositories.", query));
        }

        if WEATHER_KEYWORDS.iter().any(|k| contains_word_prefix(&lower, k)) {
            let mut cities = extract_cities(task);
            if cities.is_empty() {
                cities.push(DEFAULT_CITY.to_string());
            }
            cities.truncate(MAX_WEATHER_STEPS);

            for city in &cities {
                plan.plan.push(PlanStep::new(
                    next_step(&plan),
                    format!("Get current weather in {}", city),
                    ToolKind::Weather,
                    weather_params(city),
                ));
            }
            reasoning.push(format!("User wants weather information for {}.", cities.join(", ")));
        }

        if plan.plan.is_empty() {
            plan.plan.push(PlanStep::new(
                1,
                "Search GitHub for trending AI repositories",
                ToolKind::GithubSearch,
                github_params("artificial intelligence"),
            ));
            reasoning.push("No specific task mentioned. Providing GitHub search as example.".to_string());
        }

        plan.reasoning = reasoning.join(" ");
        plan
    }
}

fn next_step(plan: &Plan) -> u32 {
    plan.plan.len() as u32 + 1
}

pub fn github_params(query: &str) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("query".to_string(), json!(query));
    params.insert("per_page".to_string(), json!(DEFAULT_GITHUB_PER_PAGE));
    params
}

pub fn weather_params(city: &str) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("city".to_string(), json!(city));
    params
}

#[async_trait]
impl PlanGenerator for RuleBasedGenerator {
    fn name(&self) -> &'static str {
        "rule-based"
    }

    async fn generate_plan(&self, task: &str) -> Result<Plan, LlmError> {
        Ok(self.plan(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_only() {
        let plan = RuleBasedGenerator::new().plan("Find Python machine learning repositories");
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.plan[0].tool_kind(), Some(ToolKind::GithubSearch));
        assert_eq!(plan.plan[0].parameters["query"], "python");
        assert_eq!(plan.plan[0].parameters["per_page"], 5);
        assert!(plan.reasoning.contains("python"));
    }

    #[test]
    fn test_weather_only() {
        let plan = RuleBasedGenerator::new().plan("What's the current weather in Tokyo?");
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.plan[0].tool_kind(), Some(ToolKind::Weather));
        assert_eq!(plan.plan[0].parameters["city"], "Tokyo");
        assert_eq!(plan.plan[0].step, 1);
    }

    #[test]
    fn test_combined_task_orders_steps() {
        let plan = RuleBasedGenerator::new().plan("Search for JavaScript frameworks and get New York weather");
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.plan[0].parameters["query"], "javascript");
        assert_eq!(plan.plan[1].parameters["city"], "New York");
        assert_eq!(plan.plan[1].step, 2);
    }

    #[test]
    fn test_one_weather_step_per_city() {
        let plan = RuleBasedGenerator::new().plan("What's the weather in Tokyo and London?");
        let cities: Vec<&Value> = plan.plan.iter().map(|s| &s.parameters["city"]).collect();
        assert_eq!(cities, vec!["Tokyo", "London"]);
    }

    #[test]
    fn test_weather_steps_are_capped() {
        let plan = RuleBasedGenerator::new().plan("Compare the weather in Tokyo, Berlin, Sydney, Mumbai, Paris and Chicago");
        assert_eq!(plan.len(), MAX_WEATHER_STEPS);
        let cities: Vec<&Value> = plan.plan.iter().map(|s| &s.parameters["city"]).collect();
        assert_eq!(cities, vec!["Tokyo", "Berlin", "Sydney", "Mumbai", "Paris"]);
        assert_eq!(plan.plan[4].step, 5);
    }

    #[test]
    fn test_weather_without_city_uses_default() {
        let plan = RuleBasedGenerator::new().plan("Is it humid today?");
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.plan[0].parameters["city"], DEFAULT_CITY);
    }

    #[test]
    fn test_default_plan() {
        let plan = RuleBasedGenerator::new().plan("hello there");
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.plan[0].parameters["query"], "artificial intelligence");
        assert!(plan.reasoning.starts_with("No specific task"));
    }

    #[test]
    fn test_generate_plan_is_infallible() {
        let plan = tokio_test::block_on(RuleBasedGenerator::new().generate_plan("check paris temperature")).unwrap();
        assert_eq!(plan.plan[0].parameters["city"], "Paris");
    }
}
