//! Dataset Audit Engine
//!
//! Quality scoring and anomaly detection for uploaded tabular datasets.
//!
//! # Overview
//!
//! The engine receives a dataset as an ordered sequence of row-mappings
//! (free-form JSON objects) and derives two independent signals:
//!
//! - **Quality assessment**: missing-value count, duplicate-row count, and a
//!   bounded quality score in `[0.0, 1.0]`
//! - **Anomaly detection**: 0-based positions of statistical outlier rows,
//!   found by a seeded isolation forest over the numeric columns
//!
//! Both components are stateless pure functions of their input. Neither ever
//! raises to its caller: every failure mode degrades to a well-defined
//! empty or zero result, so an otherwise-successful dataset upload never
//! fails because an auxiliary analysis step could not run.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use audit_engine::{AnomalyDetector, QualityAssessor, parse_records};
//!
//! let records = parse_records(r#"[{"price": 1}, {"price": 2}]"#)?;
//!
//! let report = QualityAssessor::assess(&records);
//! println!("{}", report.summary);
//!
//! let outliers = AnomalyDetector::new().detect(&records);
//! println!("AI Audit found {} anomalies.", outliers.len());
//! ```
//!
//! # Configuration
//!
//! The detector's policy constants (tree count, subsample size, seed, row
//! minimum, score threshold) can be tuned through [`DetectorConfig`]:
//!
//! ```rust,ignore
//! use audit_engine::{AnomalyDetector, DetectorConfig};
//!
//! let config = DetectorConfig::builder()
//!     .num_trees(200)
//!     .seed(7)
//!     .build()?;
//! let outliers = AnomalyDetector::with_config(config).detect(&records);
//! ```

pub mod anomaly;
pub mod config;
pub mod error;
pub mod forest;
pub mod quality;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use anomaly::AnomalyDetector;
pub use config::{ConfigValidationError, DetectorConfig, DetectorConfigBuilder};
pub use error::{AuditError, Result as AuditResult};
pub use forest::IsolationForest;
pub use quality::QualityAssessor;
pub use table::{Cell, RecordTable};
pub use types::{AnalysisRecord, QualityReport, Record, parse_records};
pub use utils::{clean_numeric_string, fill_numeric_nulls, parse_numeric_string};

// both components may be invoked concurrently by independent callers
static_assertions::assert_impl_all!(QualityAssessor: Send, Sync);
static_assertions::assert_impl_all!(AnomalyDetector: Send, Sync);
static_assertions::assert_impl_all!(QualityReport: Send, Sync);
