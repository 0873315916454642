//! Logging setup with verbose mode support.
//!
//! Set `VERBOSE=1` (or pass `verbose = true`) for debug output. `RUST_LOG`
//! takes precedence over both when set.

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable that turns on verbose logging
pub const VERBOSE_ENV: &str = "VERBOSE";

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "yes" | "on")
}

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init(verbose: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Like [`init`], reading the verbose flag from `VERBOSE`.
pub fn init_from_env() -> bool {
    let verbose = std::env::var(VERBOSE_ENV)
        .map(|v| is_truthy(&v))
        .unwrap_or(false);
    init(verbose)
}
