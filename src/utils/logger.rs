//! Subscriber setup for the `storefront` binary. The library only emits
//! `tracing` events; `RUST_LOG` overrides the default directives below.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "storefront=info";
const VERBOSE_DIRECTIVES: &str = "storefront=debug,info";

fn session_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Compact human-readable output for interactive shopping sessions.
/// Verbose mode adds the per-line checkout and cache events.
pub fn init_cli_logger(verbose: bool) {
    let directives = if verbose {
        VERBOSE_DIRECTIVES
    } else {
        DEFAULT_DIRECTIVES
    };

    let installed = tracing_subscriber::registry()
        .with(session_filter(directives))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .compact(),
        )
        .try_init();
    if installed.is_err() {
        tracing::debug!("Logger already installed");
    }
}

/// One JSON object per event, with checkout fields flattened for log shippers.
pub fn init_json_logger() {
    let installed = tracing_subscriber::registry()
        .with(session_filter(DEFAULT_DIRECTIVES))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false),
        )
        .try_init();
    if installed.is_err() {
        tracing::debug!("Logger already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_ignored() {
        init_cli_logger(false);
        init_cli_logger(true);
        init_json_logger();
    }
}
