use crate::config::LoggingSettings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&settings.level)));

    let registry = tracing_subscriber::registry().with(filter);

    // try_init so a second call (tests, CLI + server in one process) is a no-op
    let result = match settings.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().with_target(false).json())
            .try_init(),
        "compact" => registry
            .with(tracing_subscriber::fmt::layer().with_target(false).compact())
            .try_init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().with_target(false).pretty())
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!("Logger already initialized: {}", e);
    }
}

fn default_directive(level: &str) -> String {
    format!("ops_assistant={},actix_web=info,warn", level)
}
