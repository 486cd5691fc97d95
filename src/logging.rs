//! Tracing setup
//!
//! Checkout events (`storefront_checkout::*`) log at `log_level`; drivers and
//! everything else stay at `warn`. `RUST_LOG` replaces the whole filter.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

/// Filter used when `RUST_LOG` is not set
fn default_directives(level: &str) -> String {
    format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level)
}

/// `hourly` | `daily`, anything else never rotates
fn rotation_from(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

/// Install the global subscriber.
///
/// JSON mode writes to the file only (for log shippers); text mode writes to
/// the file and to stdout. Keep the returned guard alive in `main`, it
/// flushes the file writer on drop.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let appender = RollingFileAppender::new(
        rotation_from(&config.rotation),
        &config.log_dir,
        &config.log_file,
    );
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_target(true)
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(writer).with_ansi(false))
            .with(fmt::layer().with_target(false))
            .init();
    }

    tracing::debug!(
        dir = %config.log_dir,
        file = %config.log_file,
        rotation = %config.rotation,
        json = config.use_json,
        "Logging initialised"
    );

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_scope_level_to_crate() {
        let d = default_directives("debug");
        assert_eq!(d, "warn,storefront_checkout=debug");
        assert!(EnvFilter::try_new(&d).is_ok());
    }

    #[test]
    fn test_rotation_names() {
        assert_eq!(rotation_from("hourly"), Rotation::HOURLY);
        assert_eq!(rotation_from("daily"), Rotation::DAILY);
        assert_eq!(rotation_from("never"), Rotation::NEVER);
        assert_eq!(rotation_from("weekly"), Rotation::NEVER);
    }
}
