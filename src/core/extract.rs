use crate::core::text::{contains_term, find_term, title_case};
use regex::Regex;
use std::sync::OnceLock;

/// City used when a weather request names no location
pub const DEFAULT_CITY: &str = "London";

/// Query used when nothing more specific can be found
pub const FALLBACK_TOPIC_QUERY: &str = "ai";

const KNOWN_CITIES: &[&str] = &[
    "tokyo", "london", "new york", "paris", "berlin", "mumbai",
    "delhi", "beijing", "shanghai", "dubai", "singapore", "sydney",
    "san francisco", "los angeles", "chicago", "toronto", "moscow",
    "rome", "madrid", "amsterdam", "vienna", "prague", "budapest",
];

const LANGUAGES: &[&str] = &[
    "python", "javascript", "java", "typescript", "go", "rust", "php", "swift", "c++", "c#",
];

const TOPICS: &[&str] = &[
    "machine learning", "artificial intelligence", "ai", "ml",
    "deep learning", "web development", "data science",
    "blockchain", "iot", "cloud computing", "devops",
];

// Words the preposition patterns capture that are never places
const NOT_A_CITY: &[&str] = &[
    "the", "a", "an", "my", "our", "your", "this", "that", "these", "those", "me", "us", "it",
    "today", "tomorrow", "now", "tonight", "general", "current", "some", "any", "all", "weather",
    "python", "javascript", "java", "rust", "go", "ai", "github", "repositories", "repos", "projects",
];

fn location_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        // Prepositions match in any case; a capitalized follow-on word keeps
        // names like "São Paulo" whole.
        const PLACE: &str = r"(\p{L}+(?:\s+\p{Lu}\p{L}*)?)";
        [r"(?i:\bweather\s+in)", r"(?i:\bin)", r"(?i:\bat)", r"(?i:\bfor)"]
            .iter()
            .filter_map(|prefix| Regex::new(&format!(r"{}\s+{}", prefix, PLACE)).ok())
            .collect()
    })
}

/// Extract a GitHub search query from free text.
///
/// Programming languages win over topics; a bare mention of GitHub yields
/// "open source", anything else falls back to [`FALLBACK_TOPIC_QUERY`].
pub fn extract_query(text: &str) -> String {
    let lower = text.to_lowercase();

    if let Some(lang) = LANGUAGES.iter().find(|lang| contains_term(&lower, lang)) {
        return lang.to_string();
    }

    if let Some(topic) = TOPICS.iter().find(|topic| contains_term(&lower, topic)) {
        return topic.to_string();
    }

    if lower.contains("github") || lower.contains("repo") {
        return "open source".to_string();
    }

    FALLBACK_TOPIC_QUERY.to_string()
}

/// Extract every city mentioned in `text`, in order of first appearance.
///
/// Known cities are matched first. If none appear, a single location is
/// captured from phrases like "weather in X" or "for X".
pub fn extract_cities(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();

    let mut found: Vec<(usize, &str)> = KNOWN_CITIES
        .iter()
        .filter_map(|city| find_term(&lower, city).map(|pos| (pos, *city)))
        .collect();

    if !found.is_empty() {
        found.sort_by_key(|(pos, _)| *pos);
        return found.into_iter().map(|(_, city)| title_case(city)).collect();
    }

    for pattern in location_patterns() {
        let candidate = pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .find(|place| is_place_name(place));

        if let Some(place) = candidate {
            return vec![title_case(place)];
        }
    }

    Vec::new()
}

fn is_place_name(candidate: &str) -> bool {
    let first = candidate.split_whitespace().next().unwrap_or_default().to_lowercase();
    first.chars().count() > 1 && !NOT_A_CITY.contains(&first.as_str())
}

/// First city mentioned in `text`, or [`DEFAULT_CITY`].
pub fn extract_city(text: &str) -> String {
    extract_cities(text)
        .into_iter()
        .next()
        .unwrap_or_else(|| DEFAULT_CITY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_query_languages_first() {
        assert_eq!(extract_query("Find Python machine learning repositories"), "python");
        assert_eq!(extract_query("Search for JavaScript frameworks"), "javascript");
        assert_eq!(extract_query("any Java libraries?"), "java");
    }

    #[test]
    fn test_extract_query_topics() {
        assert_eq!(extract_query("Find machine learning projects"), "machine learning");
        assert_eq!(extract_query("Check London weather and find AI projects"), "ai");
    }

    #[test]
    fn test_extract_query_defaults() {
        assert_eq!(extract_query("show me popular repos"), "open source");
        assert_eq!(extract_query("something interesting"), FALLBACK_TOPIC_QUERY);
    }

    #[test]
    fn test_extract_query_no_substring_false_positives() {
        // "go" inside "chicago" must not count as the Go language
        assert_eq!(extract_query("projects from chicago on github"), "open source");
    }

    #[test]
    fn test_extract_cities_in_order() {
        assert_eq!(
            extract_cities("What's the weather in Tokyo and London?"),
            vec!["Tokyo".to_string(), "London".to_string()]
        );
        assert_eq!(
            extract_cities("compare london with new york"),
            vec!["London".to_string(), "New York".to_string()]
        );
    }

    #[test]
    fn test_extract_cities_pattern_fallback() {
        assert_eq!(extract_cities("What's the temperature in Seattle?"), vec!["Seattle".to_string()]);
        assert_eq!(extract_cities("weather forecast for Lagos"), vec!["Lagos".to_string()]);
        assert!(extract_cities("how is the weather today").is_empty());
    }

    #[test]
    fn test_extract_cities_non_ascii_names() {
        assert_eq!(extract_cities("weather in Zürich"), vec!["Zürich".to_string()]);
        assert_eq!(extract_cities("What's the weather in São Paulo today?"), vec!["São Paulo".to_string()]);
        assert_eq!(extract_cities("temperature in reykjavík"), vec!["Reykjavík".to_string()]);
    }

    #[test]
    fn test_extract_city_default() {
        assert_eq!(extract_city("is it going to rain?"), DEFAULT_CITY);
        assert_eq!(extract_city("Paris forecast"), "Paris");
    }
}
