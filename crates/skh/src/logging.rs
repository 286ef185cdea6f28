//! Logging configuration for skh.
//!
//! Everything logs through `tracing`. Records emitted through the `log`
//! facade, such as actix-web's request log, are forwarded into the same
//! subscriber.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the binary logs, chosen with `-q` and `-v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Info and above, including one line per HTTP request.
    #[default]
    Normal,
    /// Adds debug records such as schema checks and stored uploads.
    Verbose,
    /// Everything.
    Trace,
}

impl Verbosity {
    /// The level applied to the `skh` target.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// The filter used when `RUST_LOG` is not set.
    ///
    /// The HTTP request log is kept at info unless output is quiet.
    #[must_use]
    pub fn default_filter(&self) -> String {
        let http = match self {
            Self::Quiet => Level::ERROR,
            _ => Level::INFO,
        };
        format!("skh={},actix_web={http}", self.to_level_filter())
    }
}

/// Initialize the logging system.
///
/// Call once at startup. `RUST_LOG` takes precedence over `verbosity`.
///
/// # Examples
///
/// ```no_run
/// use skh::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_filter()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );

    // a second call keeps the first subscriber
    let _ = subscriber.try_init();
}

/// Initialize logging for tests.
///
/// Only warnings and errors are shown to keep test output clean.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_to_level() {
        assert_eq!(Verbosity::Quiet.to_level_filter(), Level::ERROR);
        assert_eq!(Verbosity::Normal.to_level_filter(), Level::INFO);
        assert_eq!(Verbosity::Verbose.to_level_filter(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.to_level_filter(), Level::TRACE);
    }

    #[test]
    fn test_verbosity_default() {
        assert_eq!(Verbosity::default(), Verbosity::Normal);
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(Verbosity::Normal.default_filter(), "skh=INFO,actix_web=INFO");
        assert_eq!(Verbosity::Quiet.default_filter(), "skh=ERROR,actix_web=ERROR");
        assert_eq!(Verbosity::Trace.default_filter(), "skh=TRACE,actix_web=INFO");
    }

    #[test]
    fn test_default_filter_parses() {
        for verbosity in [Verbosity::Quiet, Verbosity::Normal, Verbosity::Trace] {
            assert!(EnvFilter::try_new(verbosity.default_filter()).is_ok());
        }
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        // the test subscriber stays installed; later calls are no-ops
        init_test_logging();
        init_logging(Verbosity::Normal);
        init_logging(Verbosity::Verbose);
    }

    #[test]
    fn test_init_test_logging_does_not_panic() {
        init_test_logging();
    }
}
