//! Custom error types for matura-plan.
//!
//! This module provides structured error types that separate fatal
//! dataset problems from user input mistakes and import failures.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for planner operations
#[derive(Error, Debug)]
pub enum PlanError {
    // =========================================================================
    // Dataset Errors
    // =========================================================================
    /// Dataset could not be read or decoded
    #[error("Dataset error: {message}")]
    Dataset {
        message: String,
        path: Option<PathBuf>,
    },

    /// Dataset file does not exist
    #[error("Dataset not found: {path}")]
    MissingDataset { path: PathBuf },

    /// Two tasks share an id
    #[error("Duplicate task id in dataset: {id}")]
    DuplicateTask { id: String },

    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Task id not present in the dataset
    #[error("Unknown task: {id}")]
    UnknownTask { id: String },

    /// Checklist index past the end of a task's items
    #[error("Item {index} out of range for task {task} ({len} items)")]
    ItemOutOfRange {
        task: String,
        index: usize,
        len: usize,
    },

    /// Bucket key not among the board columns
    #[error("Unknown bucket: {key}")]
    UnknownBucket { key: String },

    /// Filter selector could not be parsed
    #[error("Invalid filter: {field} = {value}")]
    InvalidFilter { field: String, value: String },

    // =========================================================================
    // Import Errors
    // =========================================================================
    /// Import document is not valid JSON
    #[error("Invalid JSON in import: {message}")]
    ImportParse { message: String },

    /// Import document is JSON but has the wrong shape
    #[error("Invalid import payload: {message}")]
    ImportPayload { message: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load or validate configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Slot storage failed
    #[error("Storage error: {message}")]
    Storage { message: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlanError {
    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create a dataset error
    pub fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset {
            message: message.into(),
            path: None,
        }
    }

    /// Create a dataset error with path
    pub fn dataset_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Dataset {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create an unknown task error
    pub fn unknown_task(id: impl Into<String>) -> Self {
        Self::UnknownTask { id: id.into() }
    }

    /// Create an unknown bucket error
    pub fn unknown_bucket(key: impl Into<String>) -> Self {
        Self::UnknownBucket { key: key.into() }
    }

    /// Create an invalid filter error
    pub fn invalid_filter(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidFilter {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an import payload error
    pub fn import_payload(message: impl Into<String>) -> Self {
        Self::ImportPayload {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    // =========================================================================
    // Classification helpers
    // =========================================================================

    /// Check if this error means there is nothing to show
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Dataset { .. } | Self::MissingDataset { .. } | Self::DuplicateTask { .. }
        )
    }

    /// Check if this error was caused by a bad argument or file from the user
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            Self::UnknownTask { .. }
                | Self::ItemOutOfRange { .. }
                | Self::UnknownBucket { .. }
                | Self::InvalidFilter { .. }
                | Self::ImportParse { .. }
                | Self::ImportPayload { .. }
        )
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Dataset { .. } | Self::MissingDataset { .. } | Self::DuplicateTask { .. } => 3,
            Self::ImportParse { .. } | Self::ImportPayload { .. } => 4,
            Self::Config { .. } => 7,
            _ if self.is_user_input() => 2,
            _ => 1,
        }
    }
}

/// Type alias for planner results
pub type Result<T> = std::result::Result<T, PlanError>;

/// Extension trait for converting foreign errors to PlanError
pub trait IntoPlanError<T> {
    /// Wrap the error as [`PlanError::Storage`], prefixed with `context`.
    fn into_plan_storage(self, context: &str) -> Result<T>;
}

impl<T, E: Into<anyhow::Error>> IntoPlanError<T> for std::result::Result<T, E> {
    fn into_plan_storage(self, context: &str) -> Result<T> {
        self.map_err(|e| PlanError::storage(format!("{context}: {}", e.into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlanError::ItemOutOfRange {
            task: "bio-1".into(),
            index: 7,
            len: 3,
        };
        assert!(err.to_string().contains("bio-1"));
        assert!(err.to_string().contains("7"));
        assert!(err.to_string().contains("3 items"));
    }

    #[test]
    fn test_is_fatal() {
        assert!(PlanError::dataset("bad json").is_fatal());
        assert!(PlanError::MissingDataset {
            path: PathBuf::from("data.json")
        }
        .is_fatal());
        assert!(!PlanError::unknown_task("t1").is_fatal());
        assert!(!PlanError::ImportParse {
            message: "eof".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_is_user_input() {
        assert!(PlanError::unknown_bucket("w99").is_user_input());
        assert!(PlanError::invalid_filter("month", "maj").is_user_input());
        assert!(!PlanError::storage("disk full").is_user_input());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(PlanError::dataset("x").exit_code(), 3);
        assert_eq!(PlanError::import_payload("x").exit_code(), 4);
        assert_eq!(PlanError::config("x").exit_code(), 7);
        assert_eq!(PlanError::unknown_task("x").exit_code(), 2);
        assert_eq!(PlanError::storage("x").exit_code(), 1);
    }

    #[test]
    fn test_config_with_path() {
        let path = PathBuf::from("/tmp/settings.json");
        let err = PlanError::config_with_path("failed to parse", path.clone());
        if let PlanError::Config {
            message,
            path: opt_path,
        } = err
        {
            assert_eq!(message, "failed to parse");
            assert_eq!(opt_path, Some(path));
        } else {
            panic!("Wrong error variant");
        }
    }

    #[test]
    fn test_into_plan_error_trait() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        match result.into_plan_storage("Failed to acquire slot lock") {
            Err(PlanError::Storage { message }) => {
                assert!(message.starts_with("Failed to acquire slot lock: "));
                assert!(message.contains("file not found"));
            }
            _ => panic!("Wrong error variant after conversion"),
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: PlanError = io_err.into();
        assert!(matches!(err, PlanError::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }
}
