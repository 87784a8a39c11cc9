use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

/// A single uploaded row: column name to scalar JSON value.
///
/// Rows in one dataset need not share identical key sets; the engine
/// rectangularizes them against the union of keys seen across all rows.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Parse a JSON array of row objects into a record set.
///
/// This is the shape the ingestion layer hands to the engine after an
/// upload has been deserialized.
pub fn parse_records(json: &str) -> Result<Vec<Record>> {
    Ok(serde_json::from_str(json)?)
}

/// Result of a quality assessment over one dataset.
///
/// `issues_detected` is a loosely-typed diagnostic bag, not a fixed schema:
/// on success it carries `missingValues` and `duplicateRows` counts, on
/// internal failure a single `error` entry. Callers must not assume both
/// shapes at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// Bounded score in `[0.0, 1.0]`, even under pathological inputs.
    pub quality_score: f64,
    pub issues_detected: HashMap<String, serde_json::Value>,
    /// Human-readable one-liner embedding the score as a whole percentage.
    pub summary: String,
}

impl QualityReport {
    /// Terminal report for an empty record set.
    ///
    /// This is a distinct case, not score 0 falling out of the general
    /// formula.
    pub fn empty_dataset() -> Self {
        let mut issues = HashMap::new();
        issues.insert("missingValues".to_string(), serde_json::json!(0));
        issues.insert("duplicateRows".to_string(), serde_json::json!(0));
        Self {
            quality_score: 0.0,
            issues_detected: issues,
            summary: "Empty dataset".to_string(),
        }
    }

    /// Degraded report emitted when assessment fails internally.
    ///
    /// Carries an `error` entry instead of the two counts.
    pub fn failed(message: impl Into<String>) -> Self {
        let mut issues = HashMap::new();
        issues.insert("error".to_string(), serde_json::json!(message.into()));
        Self {
            quality_score: 0.0,
            issues_detected: issues,
            summary: "Analysis failed".to_string(),
        }
    }

    /// Missing-cell count, if this report has the success shape.
    pub fn missing_values(&self) -> Option<u64> {
        self.issues_detected.get("missingValues")?.as_u64()
    }

    /// Duplicate-row count, if this report has the success shape.
    pub fn duplicate_rows(&self) -> Option<u64> {
        self.issues_detected.get("duplicateRows")?.as_u64()
    }

    /// Whether this report is the degraded failure shape.
    pub fn is_failed(&self) -> bool {
        self.issues_detected.contains_key("error")
    }
}

/// One persisted analysis row, as composed by the calling layer.
///
/// The engine itself returns only the raw [`QualityReport`] and outlier
/// index list; this type is how the CLI (standing in for the ingestion
/// pipeline) wraps them for storage or display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub quality: QualityReport,
    /// 0-based row positions flagged as anomalous, strictly increasing.
    pub outlier_indices: Vec<usize>,
    /// Caller-side summary template over the raw index list.
    pub anomaly_summary: String,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(quality: QualityReport, outlier_indices: Vec<usize>) -> Self {
        let anomaly_summary = format!("AI Audit found {} anomalies.", outlier_indices.len());
        Self {
            quality,
            outlier_indices,
            anomaly_summary,
            analyzed_at: Utc::now(),
        }
    }
}
