use crate::models::{
    CompletedOutput, ExecutionSummary, FailedOutput, FinalOutput, OutputMetadata, Plan, PlanSummary, ResultRecord,
    TaskExecution, ToolKind, ToolResult, Verification, VerificationDigest,
};
use crate::tools::github::SearchData;
use crate::tools::weather::WeatherData;
use serde::{Deserialize, Serialize};

pub const SYSTEM_NAME: &str = "AI Operations Assistant";
pub const ARCHITECTURE: &str = "multi-agent";
pub const AGENTS: [&str; 3] = ["planner", "executor", "verifier"];

/// Everything the verifier derives from a finished execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub verification: Verification,
    pub final_output: FinalOutput,
    pub summary: ExecutionSummary,
}

/// Agent responsible for judging completeness and shaping the final output
#[derive(Debug, Clone, Default)]
pub struct Verifier;

impl Verifier {
    pub fn new() -> Self {
        Self
    }

    /// Score a set of step results
    pub fn score(&self, results: &[ToolResult]) -> Verification {
        let total = results.len();
        let successful = results.iter().filter(|r| r.success).count();

        let completeness_score = if total > 0 && successful == total {
            100
        } else if successful > 0 {
            50
        } else {
            0
        };

        let missing_data = results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.error.clone().unwrap_or_else(|| format!("Step {} failed", r.step)))
            .collect();

        let suggestion = if completeness_score == 100 {
            "All requirements satisfied"
        } else {
            "Some steps failed"
        };

        Verification {
            is_complete: completeness_score == 100,
            completeness_score,
            missing_data,
            suggestions: vec![suggestion.to_string()],
            summary: format!("Completed {}/{} steps successfully", successful, total),
        }
    }

    /// Verify results and build the final structured output
    pub fn verify_results(&self, task: &str, plan: &Plan, results: &[ToolResult]) -> VerificationReport {
        tracing::info!("Verifying {} result(s) for: {}", results.len(), task);

        let mut verification = self.score(results);
        let successful = results.iter().filter(|r| r.success).count();

        let summary = ExecutionSummary {
            total_steps: results.len(),
            successful_steps: successful,
            failed_steps: results.len() - successful,
            completeness_score: verification.completeness_score,
        };

        if successful == 0 {
            tracing::warn!("No step succeeded for: {}", task);
            let errors = std::mem::replace(&mut verification.missing_data, vec!["All execution steps failed".to_string()]);
            verification.summary = format!("Failed to execute task: {}", task);
            verification.suggestions = vec![
                "Check API availability".to_string(),
                "Verify parameters".to_string(),
                "Try different tools".to_string(),
            ];

            let final_output = FinalOutput::Failed(FailedOutput {
                status: "failed".to_string(),
                user_request: task.to_string(),
                errors,
                suggestions: vec![
                    "Try rephrasing your request".to_string(),
                    "Check if the requested information is available".to_string(),
                    "Try a simpler request first".to_string(),
                ],
            });

            return VerificationReport { verification, final_output, summary };
        }

        let records: Vec<ResultRecord> = results.iter().filter(|r| r.success).filter_map(to_record).collect();
        let now = chrono::Utc::now();

        let final_output = FinalOutput::Completed(CompletedOutput {
            task_execution: TaskExecution {
                user_request: task.to_string(),
                status: if verification.is_complete { "completed" } else { "partial" }.to_string(),
                completeness_score: verification.completeness_score,
                execution_time: now,
                plan_summary: PlanSummary {
                    total_steps: plan.len(),
                    executed_steps: results.len(),
                    failed_steps: summary.failed_steps,
                },
            },
            results: records,
            verification: VerificationDigest {
                is_complete: verification.is_complete,
                score: verification.completeness_score,
                issues: verification.missing_data.clone(),
                suggestions: verification.suggestions.clone(),
            },
            metadata: OutputMetadata {
                system: SYSTEM_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                architecture: ARCHITECTURE.to_string(),
                timestamp: now,
                agents_used: AGENTS.iter().map(|a| a.to_string()).collect(),
            },
        });

        tracing::info!("Verification: {}", verification.summary);
        VerificationReport { verification, final_output, summary }
    }
}

/// Typed record for a successful result, if its data has the expected shape
fn to_record(result: &ToolResult) -> Option<ResultRecord> {
    let data = result.data.clone()?;

    let record = match ToolKind::parse(&result.tool)? {
        ToolKind::GithubSearch => serde_json::from_value::<SearchData>(data).map(|d| ResultRecord::Github {
            query: d.query,
            repositories: d.repositories,
            total_count: d.total_count,
            count: d.count,
            source: d.source,
            cached: result.cached,
        }),
        ToolKind::Weather => serde_json::from_value::<WeatherData>(data).map(|d| ResultRecord::Weather {
            city: d.city,
            country: d.country,
            temperature: d.temperature,
            feels_like: d.feels_like,
            condition: d.condition,
            humidity: d.humidity,
            wind_speed: d.wind_speed,
            source: d.source,
            cached: result.cached,
        }),
    };

    match record {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!("Step {}: unexpected {} data: {}", result.step, result.tool, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::github::{fallback_data as github_fallback, SearchParams};
    use crate::tools::weather::fallback_data as weather_fallback;
    use serde_json::{json, Map};

    fn github_result(step: u32) -> ToolResult {
        let params = json!({"query": "rust", "per_page": 2}).as_object().cloned().unwrap();
        let data = serde_json::to_value(github_fallback(&SearchParams::from_map(&params))).unwrap();
        ToolResult::success(step, "github_tool", data)
    }

    fn weather_result(step: u32) -> ToolResult {
        let data = serde_json::to_value(weather_fallback("Tokyo")).unwrap();
        ToolResult::success(step, "weather_tool", data).with_cached(true)
    }

    fn plan_of(n: usize) -> Plan {
        Plan {
            plan: (1..=n as u32)
                .map(|i| crate::models::PlanStep::new(i, "step", ToolKind::GithubSearch, Map::new()))
                .collect(),
            reasoning: String::new(),
            note: None,
        }
    }

    #[test]
    fn test_score_levels() {
        let verifier = Verifier::new();

        let all = verifier.score(&[github_result(1), weather_result(2)]);
        assert!(all.is_complete);
        assert_eq!(all.completeness_score, 100);
        assert_eq!(all.summary, "Completed 2/2 steps successfully");
        assert_eq!(all.suggestions, vec!["All requirements satisfied"]);

        let some = verifier.score(&[github_result(1), ToolResult::failure(2, "weather_tool", "boom")]);
        assert!(!some.is_complete);
        assert_eq!(some.completeness_score, 50);
        assert_eq!(some.missing_data, vec!["boom"]);
        assert_eq!(some.suggestions, vec!["Some steps failed"]);

        let none = verifier.score(&[]);
        assert!(!none.is_complete);
        assert_eq!(none.completeness_score, 0);
    }

    #[test]
    fn test_completed_output() {
        let report = Verifier::new().verify_results("Find rust repos and Tokyo weather", &plan_of(2), &[github_result(1), weather_result(2)]);

        assert_eq!(report.summary.successful_steps, 2);
        let FinalOutput::Completed(output) = report.final_output else {
            panic!("expected completed output");
        };

        assert_eq!(output.task_execution.status, "completed");
        assert_eq!(output.metadata.system, SYSTEM_NAME);
        assert_eq!(output.metadata.architecture, "multi-agent");
        assert_eq!(output.metadata.agents_used, vec!["planner", "executor", "verifier"]);
        assert_eq!(output.results.len(), 2);

        match &output.results[1] {
            ResultRecord::Weather { city, cached, source, .. } => {
                assert_eq!(city, "Tokyo");
                assert!(*cached);
                assert_eq!(source, "fallback_data");
            }
            other => panic!("unexpected record: {:?}", other),
        }
    }

    #[test]
    fn test_partial_output_keeps_issues() {
        let results = [github_result(1), ToolResult::failure(2, "weather_tool", "Open-Meteo API error: 400")];
        let report = Verifier::new().verify_results("task", &plan_of(2), &results);

        assert_eq!(report.summary.failed_steps, 1);
        assert_eq!(report.summary.completeness_score, 50);
        let FinalOutput::Completed(output) = report.final_output else {
            panic!("expected completed output");
        };
        assert_eq!(output.task_execution.status, "partial");
        assert_eq!(output.task_execution.plan_summary.failed_steps, 1);
        assert_eq!(output.verification.issues, vec!["Open-Meteo API error: 400"]);
        assert_eq!(output.results.len(), 1);
    }

    #[test]
    fn test_all_failed_output() {
        let results = [ToolResult::failure(1, "github_tool", "Tool 'github_tool' not found")];
        let report = Verifier::new().verify_results("Find rust repos", &plan_of(1), &results);

        assert_eq!(report.verification.suggestions.len(), 3);
        assert_eq!(report.verification.missing_data, vec!["All execution steps failed"]);
        assert_eq!(report.verification.summary, "Failed to execute task: Find rust repos");
        assert!(!report.verification.is_complete);
        assert_eq!(report.summary.completeness_score, 0);
        match report.final_output {
            FinalOutput::Failed(failed) => {
                assert_eq!(failed.status, "failed");
                assert_eq!(failed.errors, vec!["Tool 'github_tool' not found"]);
                assert_eq!(failed.suggestions[0], "Try rephrasing your request");
            }
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_data_is_skipped() {
        let odd = ToolResult::success(1, "weather_tool", json!({"unexpected": true}));
        let report = Verifier::new().verify_results("task", &plan_of(1), &[odd]);
        let FinalOutput::Completed(output) = report.final_output else {
            panic!("expected completed output");
        };
        assert!(output.results.is_empty());
    }
}
