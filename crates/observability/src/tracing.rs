//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// How the process-wide subscriber should be set up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingOptions {
    /// JSON lines (for log shippers) instead of human-readable output.
    pub json: bool,
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for TracingOptions {
    fn default() -> Self {
        Self {
            json: true,
            default_filter: "info".to_string(),
        }
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_with(options: &TracingOptions) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let _ = if options.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialisation_is_harmless() {
        init_with(&TracingOptions::default());
        init_with(&TracingOptions {
            json: false,
            default_filter: "not a [valid filter".to_string(),
        });
        tracing::info!("still logging");
    }
}
