/// Adapter Error Module
///
/// This module defines the driver-neutral error taxonomy handed to callers.
/// Native client failures never cross the adapter boundary directly: they are
/// re-typed into `Integrity` or `Database` while the native error stays
/// attached as the `source()` of the translated one.
use crate::core::db::native::{NativeError, NativeErrorKind};
use thiserror::Error;

/// Error type for every operation exposed by the adapter.
///
/// - Configuration and thread-affinity problems are fatal and surfaced immediately
/// - Constraint violations surface as `Integrity`
/// - Every other native failure surfaces as `Database`
/// - Row coercion failures and session timezone violations have their own kinds
#[derive(Error, Debug)]
pub enum AdapterError {
    /// A required connection parameter is missing or malformed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A connection was used from a thread that does not own it
    #[error("Thread safety error: {0}")]
    ThreadSafety(String),

    /// Constraint violation reported by the native client
    #[error("Integrity error: {}", .args.join(", "))]
    Integrity {
        args: Vec<String>,
        #[source]
        source: NativeError,
    },

    /// Any other failure reported by the native client
    #[error("Database error: {}", .args.join(", "))]
    Database {
        args: Vec<String>,
        #[source]
        source: NativeError,
    },

    /// A temporal column value could not be parsed
    #[error("Cannot coerce value {value:?} in column '{column}': {reason}")]
    Coercion {
        column: String,
        value: String,
        reason: String,
    },

    /// The session handed back a timestamp that is not in UTC
    #[error("database connection isn't set to UTC (offset {offset_seconds}s)")]
    NonUtcOffset { offset_seconds: i32 },

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file parse errors
    #[error("Settings parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AdapterError {
    /// Re-types a native error into the driver-neutral taxonomy.
    pub fn translate(err: NativeError) -> Self {
        let args = err.args.clone();
        match err.kind {
            NativeErrorKind::Integrity => AdapterError::Integrity { args, source: err },
            NativeErrorKind::Database => AdapterError::Database { args, source: err },
        }
    }

    /// Argument tuple of the underlying native error, if any.
    pub fn args(&self) -> Option<&[String]> {
        match self {
            AdapterError::Integrity { args, .. } | AdapterError::Database { args, .. } => {
                Some(args)
            }
            _ => None,
        }
    }

    pub fn is_integrity(&self) -> bool {
        matches!(self, AdapterError::Integrity { .. })
    }
}

impl From<NativeError> for AdapterError {
    fn from(err: NativeError) -> Self {
        AdapterError::translate(err)
    }
}

/// Type alias for Result to use AdapterError as the error type.
pub type Result<T> = std::result::Result<T, AdapterError>;
