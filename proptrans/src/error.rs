//! All error types for the proptrans crate.
//!
//! These are returned from the fallible operations (reading, parsing, writing,
//! row access). Edits that break a file-pair contract are not errors: they are
//! rejected and reported as "no change" by the mutation methods instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot access `{}`: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("format error at line {line_number}: {message}")]
    Format { line_number: usize, message: String },

    #[error("row {index} out of range (row count {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates a file access error for `path`.
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Creates a format error for the given 1-based line number.
    pub fn format_error(line_number: usize, message: impl Into<String>) -> Self {
        Error::Format {
            line_number,
            message: message.into(),
        }
    }

    /// Returns true if this error came from the filesystem.
    pub fn is_file_access(&self) -> bool {
        matches!(self, Error::FileAccess { .. } | Error::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_file_access_error() {
        let error = Error::file_access(
            "missing_fr.properties",
            io::Error::new(io::ErrorKind::NotFound, "No such file"),
        );
        assert_eq!(
            error.to_string(),
            "cannot access `missing_fr.properties`: No such file"
        );
        assert!(error.is_file_access());
    }

    #[test]
    fn test_io_error() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let error = Error::from(io_error);
        assert!(error.to_string().contains("I/O error"));
        assert!(error.is_file_access());
    }

    #[test]
    fn test_format_error() {
        let error = Error::format_error(7, "malformed \\uXXXX escape");
        assert_eq!(
            error.to_string(),
            "format error at line 7: malformed \\uXXXX escape"
        );
        assert!(!error.is_file_access());
    }

    #[test]
    fn test_index_error() {
        let error = Error::IndexOutOfRange { index: 9, len: 3 };
        assert_eq!(error.to_string(), "row 9 out of range (row count 3)");
    }

    #[test]
    fn test_invalid_path_and_config_errors() {
        let errors = vec![
            Error::InvalidPath("test".to_string()),
            Error::Config("test".to_string()),
        ];

        for error in errors {
            let display = format!("{}", error);
            assert!(display.contains("test"));
        }
    }

    #[test]
    fn test_error_debug() {
        let error = Error::InvalidPath("strings.properties".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("InvalidPath"));
        assert!(debug.contains("strings.properties"));
    }
}
