use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Directive override, e.g. `G3USI_LOG=g3usi_host=trace,g3usi_frame=debug`.
pub const LOG_ENV: &str = "G3USI_LOG";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// `G3USI_LOG` when it parses, otherwise `--log-level` for every crate.
fn filter(level: LogLevel) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from(level).into())
        .with_env_var(LOG_ENV)
        .from_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from(level).into()))
}

/// Install the stderr subscriber. Stdout stays reserved for command output.
///
/// JSON lines carry the thread name, so frames handled by the reader thread
/// can be told apart from the caller's.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let registry = tracing_subscriber::registry().with(filter(level));

    let _ = match format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_thread_names(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
}
