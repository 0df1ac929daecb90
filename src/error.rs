// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the decoder library.
//!
//! Only structural problems are errors: a topology that does not match the
//! model's tensors, an unusable configuration, or a frame of the wrong shape.
//! Bad tensor *content* (NaN, infinities) is absorbed as a low score.

use std::fmt;

/// Result type alias for decoder operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Main error type for the decoder library.
#[derive(Debug)]
pub enum DecodeError {
    /// The topology is inconsistent with itself or with the model tensors.
    TopologyError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// A tensor does not have the shape the decoder was built for.
    ShapeMismatch(String),
    /// IO error with context (file not found, permission denied, etc.).
    IoError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// Error parsing a topology asset or a frame dump.
    ParseError(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopologyError(msg) => write!(f, "Topology error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::ShapeMismatch(msg) => write!(f, "Shape mismatch: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for DecodeError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::ShapeMismatch(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DecodeError::TopologyError("test".to_string());
        assert_eq!(err.to_string(), "Topology error: test");

        let err = DecodeError::ShapeMismatch("test".to_string());
        assert_eq!(err.to_string(), "Shape mismatch: test");
    }

    #[test]
    fn test_error_source() {
        use std::error::Error;

        let err = DecodeError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(DecodeError::ConfigError("x".to_string()).source().is_none());
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<Vec<u32>>("[1,").unwrap_err();
        let err = DecodeError::from(parse);
        assert!(matches!(err, DecodeError::ParseError(_)));
    }
}
