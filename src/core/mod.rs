/// Core Module
///
/// Shared infrastructure of the adapter: the error taxonomy and the
/// database layer (native client seam, cursors, coercion and the
/// connection manager).

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{AdapterError, Result};
