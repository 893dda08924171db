//! Error types for hostfilter.
//!
//! Library crates use [`HostFilterError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all hostfilter operations.
#[derive(Debug, thiserror::Error)]
pub enum HostFilterError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Input could not be decoded or is not well-formed CSV.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Required columns are missing from the input header.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Output text cannot be represented in the requested encoding.
    #[error("encode error: {message}")]
    Encode { message: String },

    /// The destination file could not be written.
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Filesystem I/O error while reading.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid arguments or inputs.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, HostFilterError>;

impl HostFilterError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a schema error from any displayable message.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema {
            message: msg.into(),
        }
    }

    /// Create an encode error from any displayable message.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a `std::io::Error` raised while writing `path`.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = HostFilterError::schema("missing column(s): IP");
        assert_eq!(err.to_string(), "schema error: missing column(s): IP");

        let err = HostFilterError::parse("invalid byte sequence at offset 12");
        assert!(err.to_string().contains("offset 12"));
    }

    #[test]
    fn write_error_names_path() {
        let err = HostFilterError::write(
            "/nowhere/out.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("out.csv"));
        assert!(msg.contains("denied"));
    }
}
