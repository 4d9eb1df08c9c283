//! Log output setup for the binary and the test suites.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

static INIT: Once = Once::new();

/// Directives in this variable (`docsearch=trace`, `warn`, ...) override the default level.
pub const LOG_ENV: &str = "DOCSEARCH_LOG";

/// How log lines are written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Install the global subscriber. Only the first call has an effect.
pub fn init(format: LogFormat) {
    INIT.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter(LevelFilter::INFO))
            .with_ansi(false)
            .with_writer(std::io::stderr);

        let result = match format {
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
        if let Err(e) = result {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    });
}

/// Route debug output through the test harness so it is captured per test.
pub fn init_for_tests() {
    INIT.call_once(|| {
        // Another harness may already own the global subscriber
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter(LevelFilter::DEBUG))
            .with_ansi(false)
            .compact()
            .with_test_writer()
            .try_init();
    });
}

fn filter(default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy()
}
