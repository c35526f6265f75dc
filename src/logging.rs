//! logging
//!
//! Diagnostic logging with `tracing`, always to stderr.
//!
//! ```text
//! HUB_LOG=<directive>   any EnvFilter directive, e.g. "hubwork=trace"
//! HUB_DEBUG=1           shorthand for "debug"
//! (neither)             "warn"
//! ```

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "HUB_LOG";

/// Environment variable enabling debug logging.
pub const DEBUG_ENV: &str = "HUB_DEBUG";

/// Pick the filter directive from the two variables.
///
/// ```
/// use hubwork::logging::filter_directive;
///
/// assert_eq!(filter_directive(None, None), "warn");
/// assert_eq!(filter_directive(None, Some("1")), "debug");
/// assert_eq!(filter_directive(Some("trace"), Some("1")), "trace");
/// ```
pub fn filter_directive(log: Option<&str>, debug: Option<&str>) -> String {
    match (log, debug) {
        (Some(directive), _) if !directive.trim().is_empty() => directive.to_string(),
        (_, Some(flag)) if !flag.is_empty() && flag != "0" => "debug".to_string(),
        _ => "warn".to_string(),
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init() {
    let log = std::env::var(LOG_ENV).ok();
    let debug = std::env::var(DEBUG_ENV).ok();
    let directive = filter_directive(log.as_deref(), debug.as_deref());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_disables_debug() {
        assert_eq!(filter_directive(None, Some("0")), "warn");
    }

    #[test]
    fn blank_directive_falls_back() {
        assert_eq!(filter_directive(Some("  "), None), "warn");
    }
}
