//! Log output for hosts and demos.
//!
//! The library only emits `tracing` events. Applications that want them printed call
//! [`init`] once at startup.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("unknown log level `{0}`")]
    UnknownLevel(String),
    #[error("a global tracing subscriber is already installed")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Parses `trace`, `debug`, `info`, `warn` or `error` (any case).
pub fn parse_level(level: &str) -> Result<Level, LogInitError> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(LogInitError::UnknownLevel(other.to_string())),
    }
}

/// Installs a formatted stdout subscriber with the given maximum level.
pub fn init(level: &str) -> Result<(), LogInitError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(level)?)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(" DEBUG ").unwrap(), Level::DEBUG);
        assert!(matches!(
            parse_level("loud"),
            Err(LogInitError::UnknownLevel(l)) if l == "loud"
        ));
    }
}
