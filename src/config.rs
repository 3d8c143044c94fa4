use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub apis: ApiSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub executor: ExecutorSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "localhost".to_string() }
fn default_port() -> u16 { 8000 }

/// Base URLs and credentials for the external APIs the tools call
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_github_api_base")]
    pub github_api_base: String,
    #[serde(default = "default_weather_api_base")]
    pub weather_api_base: String,
    #[serde(default = "default_geocoding_api_base")]
    pub geocoding_api_base: String,
    #[serde(default = "default_openweather_api_base")]
    pub openweather_api_base: String,
    #[serde(default)]
    pub openweather_api_key: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            github_api_base: default_github_api_base(),
            weather_api_base: default_weather_api_base(),
            geocoding_api_base: default_geocoding_api_base(),
            openweather_api_base: default_openweather_api_base(),
            openweather_api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_github_api_base() -> String { "https://api.github.com".to_string() }
fn default_weather_api_base() -> String { "https://api.open-meteo.com/v1".to_string() }
fn default_geocoding_api_base() -> String { "https://geocoding-api.open-meteo.com/v1".to_string() }
fn default_openweather_api_base() -> String { "https://api.openweathermap.org/data/2.5".to_string() }
fn default_request_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub use_ollama: bool,
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            use_ollama: false,
            ollama_url: default_ollama_url(),
            model: default_model(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_ollama_url() -> String { "http://localhost:11434".to_string() }
fn default_model() -> String { "llama3.2".to_string() }
fn default_llm_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorSettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
    #[serde(default = "default_true")]
    pub fallback_enabled: bool,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            step_delay_ms: default_step_delay_ms(),
            fallback_enabled: true,
        }
    }
}

fn default_max_retries() -> u32 { 3 }
fn default_retry_delay_ms() -> u64 { 1000 }
fn default_step_delay_ms() -> u64 { 500 }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_ttl_secs() -> u64 { 300 }
fn default_max_entries() -> u64 { 1000 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "pretty".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, config/local.toml)
    /// 3. Environment variables (prefixed with OPS__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g., OPS__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("OPS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Honor well-known variables that are not under the OPS__ prefix
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    if let Ok(key) = std::env::var("OPENWEATHER_API_KEY") {
        if !key.trim().is_empty() {
            builder = builder.set_override("apis.openweather_api_key", key)?;
        }
    }

    builder.build()
}
