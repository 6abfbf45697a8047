/// Tracing subscriber setup
use crate::config::LogsConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "libra_server=info,libra_sources=info,libra_storage=info,tower_http=info";
const DEBUG_FILTER: &str =
    "libra_server=debug,libra_sources=debug,libra_storage=debug,tower_http=debug";

/// Filter directives used when `RUST_LOG` is unset
pub fn default_directives(logs: &LogsConfig) -> &'static str {
    if logs.debug {
        DEBUG_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Install the global subscriber; `RUST_LOG` wins over the configured level
///
/// A second call is a no-op.
pub fn init(logs: &LogsConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(logs)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_raises_level() {
        let quiet = LogsConfig::default();
        let loud = LogsConfig {
            debug: true,
            ..LogsConfig::default()
        };
        assert!(default_directives(&quiet).contains("libra_server=info"));
        assert!(default_directives(&loud).contains("libra_server=debug"));
    }
}
