//! Error taxonomy.
//!
//! Only configuration problems are errors. "Nothing found" (no template for a
//! device, no mapping for a field, no binding for an input) is expressed as
//! `None` or an empty collection, never as an [`Error`].
//!
//! - [`Error::Io`], [`Error::Json`], [`Error::Toml`] are *malformed configuration*:
//!   callers may log them and degrade (empty registry, direct field mapping, defaults).
//! - [`Error::Invariant`] is an authoring mistake detected at load time and is fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or persisting configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("template `{template}`: {reason}")]
    Invariant { template: String, reason: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invariant(template: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Invariant {
            template: template.into(),
            reason: reason.into(),
        }
    }

    /// `true` for unreadable/unparseable configuration, which callers may degrade around.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Error::Invariant { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_is_not_malformed() {
        let err = Error::invariant("vkb_sem", "button_range [50, 40] is inverted");
        assert!(!err.is_malformed());
        assert_eq!(
            err.to_string(),
            "template `vkb_sem`: button_range [50, 40] is inverted"
        );
    }

    #[test]
    fn test_io_is_malformed() {
        let err = Error::io(
            "missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_malformed());
        assert!(err.to_string().contains("missing.json"));
    }
}
