//! Human readable rendering of task reports for the CLI.

use crate::models::{FinalOutput, ResultRecord, TaskReport};
use std::fmt::Write;

const RULE: &str = "============================================================";

/// Repositories shown per GitHub result
const TOP_REPOSITORIES: usize = 3;

/// Render a report as a plain-text summary
pub fn render_report(report: &TaskReport) -> String {
    let mut out = String::new();

    // writing to a String cannot fail
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &TaskReport) -> std::fmt::Result {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Task: {}", report.request)?;
    writeln!(out, "{}", RULE)?;

    match &report.final_output {
        FinalOutput::Failed(failed) => {
            writeln!(out, "Status: FAILED")?;
            writeln!(out)?;
            writeln!(out, "Errors:")?;
            for error in &failed.errors {
                writeln!(out, "  - {}", error)?;
            }
            writeln!(out)?;
            writeln!(out, "Suggestions:")?;
            for suggestion in &failed.suggestions {
                writeln!(out, "  - {}", suggestion)?;
            }
        }
        FinalOutput::Completed(output) => {
            let execution = &output.task_execution;
            writeln!(out, "Status: {}", execution.status.to_uppercase())?;
            writeln!(out, "Completeness: {}%", execution.completeness_score)?;
            writeln!(
                out,
                "Steps: {}/{} succeeded",
                report.summary.successful_steps, report.summary.total_steps
            )?;

            for record in &output.results {
                writeln!(out)?;
                write_record(out, record)?;
            }

            if !output.verification.issues.is_empty() {
                writeln!(out)?;
                writeln!(out, "Issues:")?;
                for issue in &output.verification.issues {
                    writeln!(out, "  - {}", issue)?;
                }
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "Execution time: {:.2}s", report.execution_time)?;
    write!(out, "{}", RULE)
}

fn write_record(out: &mut String, record: &ResultRecord) -> std::fmt::Result {
    match record {
        ResultRecord::Github { query, repositories, total_count, source, cached, .. } => {
            writeln!(out, "GitHub repositories for '{}' ({} total, {}{})", query, total_count, source, cached_tag(*cached))?;
            if repositories.is_empty() {
                writeln!(out, "  No repositories found")?;
            }
            for (i, repo) in repositories.iter().take(TOP_REPOSITORIES).enumerate() {
                writeln!(out, "  {}. {} ({} stars, {})", i + 1, repo.full_name, repo.stars, repo.language)?;
                writeln!(out, "     {}", repo.description)?;
                writeln!(out, "     {}", repo.url)?;
            }
        }
        ResultRecord::Weather { city, country, temperature, feels_like, condition, humidity, wind_speed, source, cached } => {
            let place = if country.is_empty() { city.clone() } else { format!("{}, {}", city, country) };
            writeln!(out, "Weather in {} ({}{})", place, source, cached_tag(*cached))?;
            write!(out, "  {:.1}°C, {}", temperature, condition)?;
            if let Some(feels_like) = feels_like {
                write!(out, " (feels like {:.1}°C)", feels_like)?;
            }
            writeln!(out)?;
            writeln!(out, "  Humidity: {:.0}%  Wind: {:.1} km/h", humidity, wind_speed)?;
        }
    }
    Ok(())
}

fn cached_tag(cached: bool) -> &'static str {
    if cached {
        ", cached"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Verifier;
    use crate::models::{ExecutionSummary, Plan, Repository, ToolResult};
    use serde_json::json;

    fn report(results: Vec<ToolResult>) -> TaskReport {
        let plan = Plan::default();
        let verified = Verifier::new().verify_results("Find rust repos and Tokyo weather", &plan, &results);
        TaskReport {
            id: uuid::Uuid::new_v4(),
            request: "Find rust repos and Tokyo weather".to_string(),
            execution_time: 1.234,
            plan,
            execution_results: results,
            verification: verified.verification,
            final_output: verified.final_output,
            summary: verified.summary,
            timestamp: chrono::Utc::now(),
        }
    }

    fn repo(i: u64) -> Repository {
        Repository {
            name: format!("repo{}", i),
            full_name: format!("owner/repo{}", i),
            description: "A repository".to_string(),
            stars: 100 * i,
            forks: i,
            language: "Rust".to_string(),
            url: format!("https://github.com/owner/repo{}", i),
            created_at: "2024-01-01".to_string(),
            updated_at: "2024-06-01".to_string(),
            license: None,
            topics: vec![],
        }
    }

    #[test]
    fn test_render_completed_report() {
        let github = json!({
            "query": "rust",
            "repositories": (1..=5).map(repo).collect::<Vec<_>>(),
            "total_count": 900,
            "count": 5,
            "source": "github_api"
        });
        let weather = json!({
            "city": "Tokyo",
            "country": "Japan",
            "temperature": 21.0,
            "feels_like": 20.5,
            "humidity": 40.0,
            "condition": "Clear sky",
            "wind_speed": 5.4,
            "source": "open-meteo_api"
        });

        let text = render_report(&report(vec![
            ToolResult::success(1, "github_tool", github),
            ToolResult::success(2, "weather_tool", weather).with_cached(true),
        ]));

        assert!(text.contains("Status: COMPLETED"));
        assert!(text.contains("Completeness: 100%"));
        assert!(text.contains("3. owner/repo3"));
        assert!(!text.contains("owner/repo4"));
        assert!(text.contains("Weather in Tokyo, Japan (open-meteo_api, cached)"));
        assert!(text.contains("21.0°C, Clear sky (feels like 20.5°C)"));
        assert!(text.contains("Execution time: 1.23s"));
    }

    #[test]
    fn test_render_failed_report() {
        let text = render_report(&report(vec![ToolResult::failure(1, "github_tool", "GitHub API error: 422")]));

        assert!(text.contains("Status: FAILED"));
        assert!(text.contains("  - GitHub API error: 422"));
        assert!(text.contains("  - Try rephrasing your request"));
    }

    #[test]
    fn test_summary_counts_shown() {
        let mut r = report(vec![ToolResult::success(1, "weather_tool", json!({
            "city": "Paris", "temperature": 19.5, "humidity": 70.0,
            "condition": "Light drizzle", "wind_speed": 10.5, "source": "fallback_data"
        }))]);
        r.summary = ExecutionSummary { total_steps: 2, successful_steps: 1, failed_steps: 1, completeness_score: 50 };

        let text = render_report(&r);
        assert!(text.contains("Steps: 1/2 succeeded"));
        assert!(text.contains("Weather in Paris (fallback_data)"));
    }
}
