//! Unified error types for flashdeck.
//!
//! The scheduling and rendering core is permissive: malformed cloze markup
//! and unknown template fields degrade to literal text or empty strings.
//! Errors are reserved for the conditions a caller must act on: a broken
//! note-type configuration, an out-of-range review quality, and storage or
//! serialization failures in the review collaborator.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for flashdeck operations.
#[derive(Error, Debug)]
pub enum FlashdeckError {
    /// I/O errors from review store or config file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// A note type whose fields or templates cannot be determined.
    #[error("note type error: {message}")]
    NoteType { message: String },

    /// A review quality outside 0..=5.
    #[error("invalid quality {value}: must be between 0 and 5")]
    InvalidQuality { value: i64 },
}

/// A specialized Result type for flashdeck operations.
pub type Result<T> = std::result::Result<T, FlashdeckError>;

impl FlashdeckError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a note type error.
    pub fn note_type(message: impl Into<String>) -> Self {
        Self::NoteType {
            message: message.into(),
        }
    }

    /// Create an invalid quality error.
    pub fn invalid_quality(value: i64) -> Self {
        Self::InvalidQuality { value }
    }

    /// Whether the error was caused by caller input rather than the environment.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::NoteType { .. } | Self::InvalidQuality { .. })
    }
}

impl From<io::Error> for FlashdeckError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for FlashdeckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Exit codes for the flashdeck CLI.
pub mod exit_codes {
    /// Command completed.
    pub const SUCCESS: i32 = 0;

    /// Command failed at runtime (storage, serialization).
    pub const ERROR: i32 = 1;

    /// Command rejected its input (bad quality, broken note type).
    pub const USAGE: i32 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = FlashdeckError::storage(
            "/tmp/reviews/1.json",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        assert!(err.to_string().contains("storage error"));
        assert!(err.to_string().contains("/tmp/reviews/1.json"));
    }

    #[test]
    fn test_serde_error_display() {
        let err = FlashdeckError::serde("invalid JSON");
        assert_eq!(err.to_string(), "serialization error: invalid JSON");
    }

    #[test]
    fn test_config_error_display() {
        let err = FlashdeckError::config("invalid TOML");
        assert_eq!(err.to_string(), "config error: invalid TOML");
    }

    #[test]
    fn test_note_type_error_display() {
        let err = FlashdeckError::note_type("duplicate field name: Front");
        assert_eq!(
            err.to_string(),
            "note type error: duplicate field name: Front"
        );
    }

    #[test]
    fn test_invalid_quality_display() {
        let err = FlashdeckError::invalid_quality(7);
        assert_eq!(err.to_string(), "invalid quality 7: must be between 0 and 5");
    }

    #[test]
    fn test_is_caller_error() {
        assert!(FlashdeckError::invalid_quality(-1).is_caller_error());
        assert!(FlashdeckError::note_type("broken").is_caller_error());
        assert!(!FlashdeckError::config("bad").is_caller_error());
        assert!(!FlashdeckError::serde("bad").is_caller_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: FlashdeckError = io_err.into();
        assert!(matches!(err, FlashdeckError::Storage { .. }));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: FlashdeckError = json_err.into();
        assert!(matches!(err, FlashdeckError::Serde { .. }));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::ERROR, 1);
        assert_eq!(exit_codes::USAGE, 2);
    }
}
