//! Tracing setup.
//!
//! Logs go to stderr so stdout carries only the benchmark report.

use crate::error::{BenchError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `log_level` is the complete filter, normally the output of
/// [`log_level_from_env`](crate::domain::config::log_level_from_env), which
/// already applies `TRIG_BENCH_LOG_LEVEL` over `RUST_LOG`.
pub fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_new(log_level).map_err(|e| BenchError::Telemetry(e.to_string()))?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| BenchError::Telemetry(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::log_level_from_lookup;
    use tracing::Level;

    // The global subscriber can be installed once per test binary, so every
    // assertion about it lives in this one test.
    #[test]
    fn test_own_log_level_overrides_rust_log() {
        let level = log_level_from_lookup(|key| match key {
            "TRIG_BENCH_LOG_LEVEL" => Some("warn".to_string()),
            "RUST_LOG" => Some("trace".to_string()),
            _ => None,
        });

        init_tracing(&level).unwrap();
        assert!(tracing::enabled!(Level::WARN));
        assert!(!tracing::enabled!(Level::INFO));
        assert!(!tracing::enabled!(Level::TRACE));

        // A repeat must fail without panicking.
        assert!(matches!(init_tracing("info"), Err(BenchError::Telemetry(_))));
    }

    #[test]
    fn test_invalid_directive_is_rejected() {
        assert!(matches!(
            init_tracing("trig_bench=loud"),
            Err(BenchError::Telemetry(_))
        ));
    }
}
