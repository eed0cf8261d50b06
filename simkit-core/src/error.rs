//! Error types for Simkit operations

use thiserror::Error;

/// Simkit Error types
#[derive(Error, Debug)]
pub enum SimkitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for Simkit operations
pub type Result<T> = std::result::Result<T, SimkitError>;

impl SimkitError {
    /// Build an `InvalidParameter` error for a parameter that must be positive
    pub(crate) fn zero(name: &str) -> Self {
        SimkitError::InvalidParameter(format!("{name} must be greater than zero"))
    }

    /// Map an I/O error raised while opening `path`, keeping "not found" distinct
    pub(crate) fn from_io_at(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            SimkitError::FileNotFound(path.display().to_string())
        } else {
            SimkitError::Io(err)
        }
    }
}

impl From<serde_json::Error> for SimkitError {
    fn from(e: serde_json::Error) -> Self {
        SimkitError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimkitError::FileNotFound("test.txt".to_string());
        assert_eq!(err.to_string(), "File not found: test.txt");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SimkitError = io_err.into();
        assert!(matches!(err, SimkitError::Io(_)));
    }

    #[test]
    fn test_from_io_at_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = SimkitError::from_io_at(io_err, std::path::Path::new("/nope.bin"));
        assert_eq!(err.to_string(), "File not found: /nope.bin");
    }

    #[test]
    fn test_zero_parameter() {
        let err = SimkitError::zero("window_size");
        assert!(matches!(err, SimkitError::InvalidParameter(_)));
        assert!(err.to_string().contains("window_size"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<Vec<i64>>("not json").unwrap_err();
        let err: SimkitError = json_err.into();
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_all_error_variants() {
        let errors = vec![
            SimkitError::InvalidParameter("test".into()),
            SimkitError::FileNotFound("test".into()),
            SimkitError::TypeMismatch("test".into()),
            SimkitError::Compression("test".into()),
            SimkitError::Serialization("test".into()),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
