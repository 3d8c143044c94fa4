use super::{str_param, u64_param, ParameterDocs, Tool, ToolError};
use crate::models::{Repository, ToolKind};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const USER_AGENT: &str = "AI-Operations-Assistant";

/// GitHub caps search pages at this many items
pub const MAX_PER_PAGE: u64 = 30;
pub const DEFAULT_PER_PAGE: u64 = 5;
pub const DEFAULT_SEARCH_QUERY: &str = "python";

/// Repository search against the GitHub REST API
pub struct GithubTool {
    client: Client,
    base_url: String,
}

/// Parsed and clamped search parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub per_page: u64,
    pub sort: String,
    pub order: String,
}

impl SearchParams {
    pub fn from_map(params: &Map<String, Value>) -> Self {
        Self {
            query: str_param(params, "query").unwrap_or(DEFAULT_SEARCH_QUERY).to_string(),
            per_page: u64_param(params, "per_page")
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, MAX_PER_PAGE),
            sort: str_param(params, "sort").unwrap_or("stars").to_string(),
            order: str_param(params, "order").unwrap_or("desc").to_string(),
        }
    }
}

/// Data returned in a successful tool result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchData {
    pub query: String,
    pub repositories: Vec<Repository>,
    pub total_count: u64,
    pub count: usize,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    items: Vec<RepoItem>,
}

#[derive(Debug, Deserialize)]
struct RepoItem {
    name: String,
    full_name: String,
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    language: Option<String>,
    html_url: String,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    updated_at: String,
    license: Option<LicenseItem>,
    #[serde(default)]
    topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LicenseItem {
    name: Option<String>,
}

impl From<RepoItem> for Repository {
    fn from(item: RepoItem) -> Self {
        Repository {
            name: item.name,
            full_name: item.full_name,
            description: item
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| "No description".to_string()),
            stars: item.stargazers_count,
            forks: item.forks_count,
            language: item.language.unwrap_or_else(|| "Not specified".to_string()),
            url: item.html_url,
            created_at: date_only(&item.created_at),
            updated_at: date_only(&item.updated_at),
            license: item.license.and_then(|l| l.name),
            topics: item.topics,
        }
    }
}

/// Keep the `YYYY-MM-DD` part of an ISO-8601 timestamp
fn date_only(timestamp: &str) -> String {
    timestamp.chars().take(10).collect()
}

impl GithubTool {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Search repositories
    pub async fn search(&self, params: &SearchParams) -> Result<SearchData, ToolError> {
        let url = format!(
            "{}/search/repositories?q={}&per_page={}&sort={}&order={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&params.query),
            params.per_page,
            urlencoding::encode(&params.sort),
            urlencoding::encode(&params.order),
        );

        tracing::debug!("Searching GitHub: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        // GitHub signals an exhausted unauthenticated quota with 403
        if status == StatusCode::FORBIDDEN {
            return Err(ToolError::RateLimited("GitHub".to_string()));
        }
        if !status.is_success() {
            return Err(ToolError::from_status("GitHub", status));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ToolError::InvalidResponse(format!("Failed to parse search results: {}", e)))?;

        let repositories: Vec<Repository> = body.items.into_iter().map(Repository::from).collect();

        tracing::debug!(
            "GitHub returned {} repositories for '{}' (total: {})",
            repositories.len(),
            params.query,
            body.total_count
        );

        Ok(SearchData {
            query: params.query.clone(),
            count: repositories.len(),
            repositories,
            total_count: body.total_count,
            source: "github_api".to_string(),
            note: None,
        })
    }
}

/// Plausible repositories for when the API is unreachable or rate limited
pub fn fallback_data(params: &SearchParams) -> SearchData {
    let q = &params.query;
    let slug = q.replace(' ', "-");
    let templates: [(&str, String, u64, u64, &str, &str, &str, &str, [&str; 2]); 3] = [
        ("user", format!("A sample {} project demonstrating best practices", q), 150, 30, "Python", "2023-01-15", "2024-12-20", "MIT", ["example", "demo"]),
        ("org", format!("Production-ready {} application", q), 89, 15, "JavaScript", "2023-05-20", "2024-11-10", "Apache-2.0", ["web", "application"]),
        ("company", format!("Enterprise {} framework with extensive documentation", q), 256, 45, "Python", "2022-11-30", "2024-12-15", "GPL-3.0", ["framework", "enterprise"]),
    ];

    let repositories: Vec<Repository> = templates
        .into_iter()
        .enumerate()
        .take(params.per_page as usize)
        .map(|(i, (owner, description, stars, forks, language, created, updated, license, topics))| {
            let name = format!("{}-project-{}", slug, i + 1);
            Repository {
                full_name: format!("{}/{}", owner, name),
                url: format!("https://github.com/example/{}", name),
                name,
                description,
                stars,
                forks,
                language: language.to_string(),
                created_at: created.to_string(),
                updated_at: updated.to_string(),
                license: Some(license.to_string()),
                topics: std::iter::once(q.clone())
                    .chain(topics.iter().map(|t| t.to_string()))
                    .collect(),
            }
        })
        .collect();

    SearchData {
        query: q.clone(),
        total_count: repositories.len() as u64 * 50,
        count: repositories.len(),
        repositories,
        source: "fallback_data".to_string(),
        note: Some("Using fallback data (API unavailable)".to_string()),
    }
}

#[async_trait]
impl Tool for GithubTool {
    fn kind(&self) -> ToolKind {
        ToolKind::GithubSearch
    }

    fn description(&self) -> &'static str {
        "Search GitHub repositories"
    }

    fn parameters(&self) -> ParameterDocs {
        ParameterDocs::from([
            ("query".to_string(), "Search term (string, required)".to_string()),
            ("per_page".to_string(), format!("Number of results (integer, optional, default: {}, max: {})", DEFAULT_PER_PAGE, MAX_PER_PAGE)),
            ("sort".to_string(), "Sort field (string, optional, default: stars)".to_string()),
            ("order".to_string(), "Sort order (asc|desc, optional, default: desc)".to_string()),
        ])
    }

    fn validate(&self, params: &Map<String, Value>) -> bool {
        str_param(params, "query").is_some()
    }

    async fn execute(&self, params: &Map<String, Value>) -> Result<Value, ToolError> {
        let params = SearchParams::from_map(params);
        let data = self.search(&params).await?;
        serde_json::to_value(data).map_err(|e| ToolError::InvalidResponse(e.to_string()))
    }

    fn fallback(&self, params: &Map<String, Value>) -> Option<Value> {
        let data = fallback_data(&SearchParams::from_map(params));
        serde_json::to_value(data).ok()
    }
}
