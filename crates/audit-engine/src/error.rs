//! Custom error types for the audit engine.
//!
//! These errors are internal to the engine: the two public entry points
//! ([`crate::QualityAssessor::assess`] and [`crate::AnomalyDetector::detect`])
//! never surface them to callers. They exist so the degradation boundary is
//! an explicit `Result` match rather than blanket suppression.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for audit computations.
#[derive(Error, Debug)]
pub enum AuditError {
    /// A column could not be materialized as a numeric series.
    #[error("Failed to materialize numeric column '{column}': {reason}")]
    ColumnMaterialization { column: String, reason: String },

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON deserialization error (record parsing).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuditError {
    /// Get a stable error code for diagnostic payloads.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnMaterialization { .. } => "COLUMN_MATERIALIZATION",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

/// Serialize errors as a `{code, message}` struct so a storing caller can
/// persist them verbatim in a diagnostic bag.
impl Serialize for AuditError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AuditError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for audit computations.
pub type Result<T> = std::result::Result<T, AuditError>;
