//! Rectangularization of heterogeneous row-mappings.
//!
//! Uploaded rows are free-form JSON objects and need not share key sets.
//! Before anything statistical can run, the engine materializes them into a
//! rectangular table: the column set is the union of keys seen across all
//! rows, and a key absent from a row is a missing cell for that row. This is
//! an explicit step, shared by both analysis components (each builds its own
//! table; they hold no common state).

use std::collections::HashMap;

use crate::types::Record;
use crate::utils::parse_numeric_string;

/// One rectangularized scalar cell.
///
/// JSON null, an absent key, and non-scalar values (arrays, objects) all
/// land on `Missing`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(v) => Cell::Number(v),
                None => Cell::Missing,
            },
            serde_json::Value::String(s) => Cell::Text(s.clone()),
            serde_json::Value::Bool(b) => Cell::Bool(*b),
            _ => Cell::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric value of an already numeric-typed cell.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value after best-effort coercion.
    ///
    /// Strings go through the format-tolerant parser, booleans become
    /// 1.0/0.0, anything unparseable becomes missing.
    pub fn coerce_numeric(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => parse_numeric_string(s),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Missing => None,
        }
    }

    /// Hashable equality key for duplicate-row detection.
    ///
    /// Values compare by type tag first, so `"1"` and `1` are never equal.
    /// Numbers compare bitwise as f64 (JSON `1` and `1.0` both parse to the
    /// same f64 and are equal).
    fn dedup_key(&self) -> CellKey {
        match self {
            Cell::Missing => CellKey::Missing,
            Cell::Number(v) => CellKey::Number(v.to_bits()),
            Cell::Text(s) => CellKey::Text(s.clone()),
            Cell::Bool(b) => CellKey::Bool(*b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CellKey {
    Missing,
    Number(u64),
    Text(String),
    Bool(bool),
}

/// A record set materialized into a rectangular cell grid.
///
/// Rows stay positionally aligned with the input sequence; positional
/// indices are the output contract for anomalies.
#[derive(Debug, Clone)]
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RecordTable {
    /// Build the table from raw records.
    ///
    /// Columns appear in first-seen order across the row sequence.
    pub fn from_records(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut column_index: HashMap<String, usize> = HashMap::new();

        for record in records {
            for key in record.keys() {
                if !column_index.contains_key(key) {
                    column_index.insert(key.clone(), columns.len());
                    columns.push(key.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let mut row = vec![Cell::Missing; columns.len()];
            for (key, value) in record {
                // key is always present in the index by construction
                if let Some(&j) = column_index.get(key) {
                    row[j] = Cell::from_json(value);
                }
            }
            rows.push(row);
        }

        Self { columns, rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Cells of column `j`, top to bottom.
    pub fn column(&self, j: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |row| &row[j])
    }

    /// Count of missing cells over the rectangularized grid.
    ///
    /// Counts absent keys as well as explicit nulls, so the total is over
    /// `height * width` cells, not just populated ones.
    pub fn missing_cells(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|c| c.is_missing()).count())
            .sum()
    }

    /// Number of rows beyond the first occurrence of each distinct row.
    ///
    /// Rows compare positionally left-to-right over the full cell grid, so
    /// the count is deterministic under ties.
    pub fn duplicate_rows(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = 0;
        for row in &self.rows {
            let key: Vec<CellKey> = row.iter().map(Cell::dedup_key).collect();
            if !seen.insert(key) {
                duplicates += 1;
            }
        }
        duplicates
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

    #[test]
    fn test_rectangularization_unions_keys() {
        let table = RecordTable::from_records(&records(json!([
            {"a": 1, "b": "x"},
            {"b": "y", "c": true},
            {"a": 2},
        ])));

        assert_eq!(table.height(), 3);
        assert_eq!(table.width(), 3);
        // Keys absent from a row are missing cells for that row
        assert_eq!(table.missing_cells(), 4);
    }

    #[test]
    fn test_non_scalar_values_count_as_missing() {
        let table = RecordTable::from_records(&records(json!([
            {"a": [1, 2], "b": {"nested": true}, "c": null, "d": 1},
        ])));

        assert_eq!(table.missing_cells(), 3);
    }

    #[test]
    fn test_duplicate_rows_counts_beyond_first() {
        let table = RecordTable::from_records(&records(json!([
            {"a": 1, "b": "x"},
            {"a": 1, "b": "x"},
            {"a": 1, "b": "x"},
            {"a": 2, "b": "x"},
        ])));

        assert_eq!(table.duplicate_rows(), 2);
    }

    #[test]
    fn test_duplicate_rows_integer_and_float_forms_equal() {
        // JSON 1 and 1.0 both rectangularize to the same f64
        let table = RecordTable::from_records(&records(json!([
            {"a": 1},
            {"a": 1.0},
        ])));

        assert_eq!(table.duplicate_rows(), 1);
    }

    #[test]
    fn test_duplicate_rows_cross_type_never_equal() {
        let table = RecordTable::from_records(&records(json!([
            {"a": 1},
            {"a": "1"},
            {"a": true},
        ])));

        assert_eq!(table.duplicate_rows(), 0);
    }

    #[test]
    fn test_empty_maps_are_mutual_duplicates() {
        let table = RecordTable::from_records(&records(json!([{}, {}, {}])));

        assert_eq!(table.width(), 0);
        assert_eq!(table.missing_cells(), 0);
        assert_eq!(table.duplicate_rows(), 2);
    }

    #[test]
    fn test_missing_cells_match_in_duplicate_comparison() {
        // A row with an absent key equals a row with an explicit null
        let table = RecordTable::from_records(&records(json!([
            {"a": 1, "b": null},
            {"a": 1},
        ])));

        assert_eq!(table.duplicate_rows(), 1);
    }

    #[test]
    fn test_cell_coercion() {
        assert_eq!(Cell::Text("$1,234.56".to_string()).coerce_numeric(), Some(1234.56));
        assert_eq!(Cell::Text("abc".to_string()).coerce_numeric(), None);
        assert_eq!(Cell::Bool(true).coerce_numeric(), Some(1.0));
        assert_eq!(Cell::Missing.coerce_numeric(), None);
        assert_eq!(Cell::Number(2.5).as_numeric(), Some(2.5));
        assert_eq!(Cell::Text("2.5".to_string()).as_numeric(), None);
    }

    #[test]
    fn test_column_order_is_first_seen() {
        let table = RecordTable::from_records(&records(json!([
            {"b": 1},
            {"a": 2},
        ])));
        assert_eq!(table.column_names(), &["b".to_string(), "a".to_string()]);
    }
}
