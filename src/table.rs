//! Ingested table model.
//!
//! The engine does not parse delimited files itself; an external parser
//! produces a [`Table`] (header plus rows) and hands it over. Rows are
//! immutable once ingested and are identified everywhere by their 0-based
//! position in the ingested sequence — filters, moderation, and exports all
//! key off that index, and rows are never re-sorted or re-indexed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum number of distinct values enumerated per column.
///
/// Value enumeration stops after this many distinct non-empty (trimmed)
/// values have been seen in row order. Values past the cap are permitted to
/// remain unmapped without invalidating a configuration; this is accepted
/// lossy behavior for very-high-cardinality columns.
pub const DISTINCT_VALUE_CAP: usize = 200;

/// A single cell value.
///
/// Cells are scalars: text, a number, or absent. Absent cells render as the
/// empty string wherever the engine reads cells as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A textual cell.
    Text(String),
    /// A numeric cell.
    Number(f64),
    /// An absent cell.
    Missing,
}

impl Value {
    /// Render the cell as text. Absent cells become the empty string.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format!("{}", n),
            Value::Missing => String::new(),
        }
    }

    /// Parse the cell as a finite number, if possible.
    #[must_use]
    pub fn as_finite(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Text(s) => parse_finite(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

/// Parse a string as a finite f64. Returns `None` for empty strings,
/// non-numeric text, NaN, and infinities.
#[must_use]
pub fn parse_finite(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// One ingested row: a mapping from column name to scalar value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    cells: HashMap<String, Value>,
}

impl Row {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Set a cell value.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.cells.insert(column.into(), value.into());
    }

    /// Look up a cell. Absent columns return `None`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    /// Read a cell as text. Missing columns and absent cells both render
    /// as the empty string.
    #[must_use]
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(Value::as_text).unwrap_or_default()
    }

    /// Read a cell as a finite number, if it parses as one.
    #[must_use]
    pub fn finite(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_finite)
    }
}

/// An ingested table: header in first-seen order plus rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Column names in first-seen order.
    pub header: Vec<String>,
    /// Rows in ingestion order. A row's position is its stable identity.
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a table from a header and rows.
    #[must_use]
    pub fn new(header: Vec<String>, rows: Vec<Row>) -> Self {
        Self { header, rows }
    }

    /// Whether the header contains the given column.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.header.iter().any(|c| c == column)
    }

    /// Enumerate distinct values observed in a column, in row order.
    ///
    /// Values are trimmed; empty values are skipped. Enumeration stops at
    /// [`DISTINCT_VALUE_CAP`] distinct values.
    #[must_use]
    pub fn distinct_values(&self, column: &str) -> Vec<String> {
        let mut seen = Vec::new();
        for row in &self.rows {
            let value = row.text(column);
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !seen.iter().any(|s: &String| s == trimmed) {
                seen.push(trimmed.to_string());
                if seen.len() >= DISTINCT_VALUE_CAP {
                    break;
                }
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_cell_reads_as_empty_text() {
        let row = Row::from_pairs([("Title", "A study")]);
        assert_eq!(row.text("Missing Column"), "");
        assert_eq!(row.text("Title"), "A study");
    }

    #[test]
    fn test_missing_value_reads_as_empty_text() {
        let mut row = Row::new();
        row.set("Notes", Value::Missing);
        assert_eq!(row.text("Notes"), "");
    }

    #[test]
    fn test_parse_finite_rejects_nan_and_text() {
        assert_eq!(parse_finite("0.5"), Some(0.5));
        assert_eq!(parse_finite(" 2 "), Some(2.0));
        assert_eq!(parse_finite("NaN"), None);
        assert_eq!(parse_finite("inf"), None);
        assert_eq!(parse_finite("yes"), None);
        assert_eq!(parse_finite(""), None);
    }

    #[test]
    fn test_distinct_values_trims_and_dedupes_in_row_order() {
        let table = Table::new(
            vec!["Label".to_string()],
            vec![
                Row::from_pairs([("Label", "yes")]),
                Row::from_pairs([("Label", " no ")]),
                Row::from_pairs([("Label", "yes")]),
                Row::from_pairs([("Label", "")]),
                Row::from_pairs([("Label", "maybe")]),
            ],
        );
        assert_eq!(table.distinct_values("Label"), vec!["yes", "no", "maybe"]);
    }

    #[test]
    fn test_distinct_values_caps_enumeration() {
        let rows: Vec<Row> = (0..DISTINCT_VALUE_CAP + 50)
            .map(|i| Row::from_pairs([("Id", format!("v{}", i))]))
            .collect();
        let table = Table::new(vec!["Id".to_string()], rows);
        assert_eq!(table.distinct_values("Id").len(), DISTINCT_VALUE_CAP);
    }
}
