//! Tracing subscriber setup.
//!
//! Logs go to stderr; stdout carries the streamed answer.

use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

/// Crate-specific filter variable, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "SEARCHSTREAM_LOG";

const DEFAULT_FILTER: &str = "warn";

static INIT: OnceCell<()> = OnceCell::new();

fn resolve_env_filter() -> EnvFilter {
    if let Ok(level) = std::env::var(LOG_ENV) {
        if let Ok(filter) = EnvFilter::try_new(level) {
            return filter;
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber once per process. Later calls do nothing.
pub fn init_logging() {
    INIT.get_or_init(|| {
        let layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr);
        // Another subscriber may already be installed (e.g. by a test harness)
        let _ = tracing_subscriber::registry()
            .with(resolve_env_filter())
            .with(layer)
            .try_init();
    });
}
