//! Statistical outlier detection over uploaded records.
//!
//! Coerces columns to numeric where possible, mean-imputes missing values,
//! and runs a seeded isolation forest over the resulting dense matrix. Rows
//! the forest isolates unusually early are reported by position.

use polars::prelude::*;
use tracing::{debug, warn};

use crate::config::DetectorConfig;
use crate::error::{AuditError, Result};
use crate::forest::IsolationForest;
use crate::table::{Cell, RecordTable};
use crate::types::Record;
use crate::utils::fill_numeric_nulls;

/// Stateless anomaly detector; a pure function of its input records.
///
/// Shares no state with the quality assessor; each call builds its own
/// rectangularized working table.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    config: DetectorConfig,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyDetector {
    /// Detector with the engine's policy defaults (seed 42, 100 trees,
    /// 5-row minimum, automatic 0.5 threshold).
    pub fn new() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }

    /// Detector with a caller-tuned configuration.
    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Detect outlier rows; returns their 0-based positions in ascending
    /// order.
    ///
    /// Never returns an error: insufficient rows, no usable numeric data,
    /// and internal failures all degrade to an empty result. Detection
    /// failure must never fail the dataset upload it piggybacks on.
    pub fn detect(&self, records: &[Record]) -> Vec<usize> {
        if records.len() < self.config.min_rows {
            debug!(
                "skipping anomaly detection: {} rows is below the {}-row minimum",
                records.len(),
                self.config.min_rows
            );
            return Vec::new();
        }

        match self.detect_inner(records) {
            Ok(indices) => indices,
            Err(e) => {
                warn!("anomaly detection degraded to empty result: {}", e);
                Vec::new()
            }
        }
    }

    fn detect_inner(&self, records: &[Record]) -> Result<Vec<usize>> {
        let table = RecordTable::from_records(records);

        // columns that are already numeric-typed
        let mut numeric = Self::typed_numeric_columns(&table);

        // none: fall back to coercing every column cell-by-cell
        if numeric.is_empty() {
            numeric = Self::coerced_numeric_columns(&table);
        }

        // no mathematical basis for outlier detection on non-numeric data
        if numeric.is_empty() {
            debug!("no numeric columns after coercion; nothing to analyze");
            return Ok(Vec::new());
        }

        let matrix = Self::impute_to_matrix(numeric, table.height())?;

        let forest = IsolationForest::new(
            self.config.num_trees,
            self.config.max_samples,
            self.config.seed,
        );
        let scores = forest.score(&matrix);

        let outliers: Vec<usize> = scores
            .iter()
            .enumerate()
            .filter(|&(_, &score)| score > self.config.score_threshold)
            .map(|(i, _)| i)
            .collect();

        debug!(
            "flagged {} of {} rows across {} numeric columns",
            outliers.len(),
            table.height(),
            matrix[0].len()
        );
        Ok(outliers)
    }

    /// Columns where every present cell is a number (and at least one is).
    fn typed_numeric_columns(table: &RecordTable) -> Vec<(String, Vec<Option<f64>>)> {
        let mut columns = Vec::new();
        'column: for (j, name) in table.column_names().iter().enumerate() {
            let mut values = Vec::with_capacity(table.height());
            let mut present = 0;
            for cell in table.column(j) {
                match cell {
                    Cell::Missing => values.push(None),
                    Cell::Number(v) => {
                        values.push(Some(*v));
                        present += 1;
                    }
                    _ => continue 'column,
                }
            }
            if present > 0 {
                columns.push((name.clone(), values));
            }
        }
        columns
    }

    /// Best-effort coercion of every column; cells that fail to parse
    /// become missing. Columns where nothing parsed are dropped.
    fn coerced_numeric_columns(table: &RecordTable) -> Vec<(String, Vec<Option<f64>>)> {
        let mut columns = Vec::new();
        for (j, name) in table.column_names().iter().enumerate() {
            let values: Vec<Option<f64>> =
                table.column(j).map(Cell::coerce_numeric).collect();
            if values.iter().any(Option::is_some) {
                columns.push((name.clone(), values));
            }
        }
        columns
    }

    /// Fill each column's missing cells with its mean over present values
    /// and assemble the dense row-major matrix.
    fn impute_to_matrix(
        columns: Vec<(String, Vec<Option<f64>>)>,
        height: usize,
    ) -> Result<Vec<Vec<f64>>> {
        let mut matrix = vec![Vec::with_capacity(columns.len()); height];

        for (name, values) in columns {
            let series = Series::new(name.as_str().into(), values);
            // a column with zero present values has no mean; fall back to 0
            let mean = series.mean().unwrap_or(0.0);
            let filled = fill_numeric_nulls(&series, mean).map_err(|e| {
                AuditError::ColumnMaterialization {
                    column: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            for (i, value) in filled.f64()?.into_no_null_iter().enumerate() {
                matrix[i].push(value);
            }
        }

        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    fn numeric_records(values: &[f64]) -> Vec<Record> {
        values
            .iter()
            .map(|v| {
                let mut record = Record::new();
                record.insert("value".to_string(), json!(v));
                record
            })
            .collect()
    }

    #[test]
    fn test_below_minimum_rows_returns_empty() {
        let detector = AnomalyDetector::new();
        assert!(detector.detect(&[]).is_empty());
        assert!(detector.detect(&numeric_records(&[1.0, 2.0, 3.0, 1000.0])).is_empty());
    }

    #[test]
    fn test_extreme_value_is_flagged() {
        let detector = AnomalyDetector::new();
        let outliers = detector.detect(&numeric_records(&[1.0, 2.0, 3.0, 4.0, 1000.0]));

        assert!(outliers.contains(&4), "expected index 4 in {:?}", outliers);
    }

    #[test]
    fn test_detection_is_reproducible() {
        let detector = AnomalyDetector::new();
        let rows = numeric_records(&[3.0, 1.0, 250.0, 1.5, 2.6, 1.9, 2.2, 3.3]);

        assert_eq!(detector.detect(&rows), detector.detect(&rows));
    }

    #[test]
    fn test_non_numeric_data_returns_empty() {
        let detector = AnomalyDetector::new();
        let rows = records(json!([
            {"label": "red"},
            {"label": "green"},
            {"label": "blue"},
            {"label": "cyan"},
            {"label": "mauve"},
            {"label": "ochre"},
        ]));

        assert!(detector.detect(&rows).is_empty());
    }

    #[test]
    fn test_string_numbers_are_coerced() {
        let detector = AnomalyDetector::new();
        let rows = records(json!([
            {"amount": "$1.00"},
            {"amount": "2"},
            {"amount": "3.5"},
            {"amount": "4"},
            {"amount": "1,000"},
        ]));

        let outliers = detector.detect(&rows);
        assert!(outliers.contains(&4), "expected index 4 in {:?}", outliers);
    }

    #[test]
    fn test_typed_columns_skip_coercion_pass() {
        // one genuinely numeric column; the string column stays out of the
        // matrix even though its values would parse
        let rows = records(json!([
            {"n": 1.0, "code": "7"},
            {"n": 2.0, "code": "7"},
            {"n": 3.0, "code": "7"},
            {"n": 4.0, "code": "7"},
            {"n": 5.0, "code": "7"},
        ]));
        let table = RecordTable::from_records(&rows);

        let typed = AnomalyDetector::typed_numeric_columns(&table);
        assert_eq!(typed.len(), 1);
        assert_eq!(typed[0].0, "n");
    }

    #[test]
    fn test_mixed_typed_column_is_not_numeric() {
        let rows = records(json!([
            {"v": 1},
            {"v": "two"},
            {"v": 3},
        ]));
        let table = RecordTable::from_records(&rows);

        assert!(AnomalyDetector::typed_numeric_columns(&table).is_empty());
    }

    #[test]
    fn test_all_null_column_is_dropped() {
        let rows = records(json!([
            {"v": null},
            {"v": null},
            {"v": null},
        ]));
        let table = RecordTable::from_records(&rows);

        assert!(AnomalyDetector::typed_numeric_columns(&table).is_empty());
        assert!(AnomalyDetector::coerced_numeric_columns(&table).is_empty());
    }

    #[test]
    fn test_missing_values_are_mean_imputed() {
        let columns = vec![(
            "v".to_string(),
            vec![Some(1.0), None, Some(3.0)],
        )];
        let matrix = AnomalyDetector::impute_to_matrix(columns, 3).unwrap();

        assert_eq!(matrix, vec![vec![1.0], vec![2.0], vec![3.0]]);
    }

    #[test]
    fn test_indices_are_valid_and_strictly_increasing() {
        let mut values: Vec<f64> = (0..40).map(|i| (i % 7) as f64).collect();
        values.push(500.0);
        values.push(-400.0);
        let rows = numeric_records(&values);

        let detector = AnomalyDetector::new();
        let outliers = detector.detect(&rows);

        for window in outliers.windows(2) {
            assert!(window[0] < window[1]);
        }
        for &idx in &outliers {
            assert!(idx < rows.len());
        }
    }

    #[test]
    fn test_identical_rows_yield_no_anomalies() {
        let detector = AnomalyDetector::new();
        let rows = numeric_records(&[7.0; 8]);

        assert!(detector.detect(&rows).is_empty());
    }

    #[test]
    fn test_score_threshold_comparison_is_strict() {
        // identical rows all score exactly 0.5: at the default threshold
        // the strict comparison keeps them out; lowering it flags every row
        let rows = numeric_records(&[7.0; 8]);

        assert!(AnomalyDetector::new().detect(&rows).is_empty());

        let config = DetectorConfig::builder()
            .score_threshold(0.4)
            .build()
            .unwrap();
        let loose = AnomalyDetector::with_config(config);
        assert_eq!(loose.detect(&rows), (0..8).collect::<Vec<usize>>());
    }

    #[test]
    fn test_custom_config_min_rows() {
        let config = DetectorConfig::builder().min_rows(10).build().unwrap();
        let detector = AnomalyDetector::with_config(config);

        // 5 rows would normally be enough; the tuned floor suppresses it
        assert!(detector.detect(&numeric_records(&[1.0, 2.0, 3.0, 4.0, 1000.0])).is_empty());
    }
}
