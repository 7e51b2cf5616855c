//! Row filtering.
//!
//! Filters are stored one slot per criterion id but evaluated globally: the
//! active set for a scoring pass is the union, over *all* criteria
//! (included or not), of enabled filters with both a column and an operator.
//! A row passes iff it satisfies every active filter. A filter attached to
//! criterion A therefore also restricts scoring for criterion B; this
//! cross-criterion pooling matches the reference behavior and is not a
//! per-criterion scope.

use crate::table::{parse_finite, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Comparison operator for a row filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    /// Equal.
    Eq,
    /// Not equal.
    Neq,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Case-insensitive substring match.
    Contains,
    /// Negated case-insensitive substring match.
    NContains,
}

/// One filter slot.
///
/// A slot is *active* when `enabled` is set and both `column` and
/// `operator` are present; otherwise it is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowFilter {
    /// Whether this slot participates in the pooled filter set.
    pub enabled: bool,
    /// Column whose cell is compared.
    pub column: Option<String>,
    /// Comparison operator.
    pub operator: Option<FilterOp>,
    /// Literal compared against the cell.
    pub value: String,
}

impl RowFilter {
    /// Create an enabled filter.
    #[must_use]
    pub fn new(column: impl Into<String>, operator: FilterOp, value: impl Into<String>) -> Self {
        Self {
            enabled: true,
            column: Some(column.into()),
            operator: Some(operator),
            value: value.into(),
        }
    }

    /// Whether this slot is part of the active filter set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.column.is_some() && self.operator.is_some()
    }

    /// Evaluate this filter against one cell rendered as text.
    ///
    /// If both the cell and the literal parse as finite numbers, ordering
    /// and equality compare numerically. Otherwise eq/neq and the ordering
    /// operators compare as case-sensitive strings (lexicographic), and
    /// contains/ncontains compare case-insensitively as substrings.
    #[must_use]
    pub fn matches_text(&self, cell: &str) -> bool {
        let Some(op) = self.operator else {
            return true;
        };
        match op {
            FilterOp::Contains | FilterOp::NContains => {
                let found = cell.to_lowercase().contains(&self.value.to_lowercase());
                if op == FilterOp::Contains {
                    found
                } else {
                    !found
                }
            }
            _ => {
                if let (Some(lhs), Some(rhs)) = (parse_finite(cell), parse_finite(&self.value)) {
                    compare_numeric(op, lhs, rhs)
                } else {
                    compare_lexical(op, cell, &self.value)
                }
            }
        }
    }
}

fn compare_numeric(op: FilterOp, lhs: f64, rhs: f64) -> bool {
    match op {
        FilterOp::Eq => lhs == rhs,
        FilterOp::Neq => lhs != rhs,
        FilterOp::Lt => lhs < rhs,
        FilterOp::Lte => lhs <= rhs,
        FilterOp::Gt => lhs > rhs,
        FilterOp::Gte => lhs >= rhs,
        FilterOp::Contains | FilterOp::NContains => unreachable!("handled by caller"),
    }
}

fn compare_lexical(op: FilterOp, lhs: &str, rhs: &str) -> bool {
    match op {
        FilterOp::Eq => lhs == rhs,
        FilterOp::Neq => lhs != rhs,
        FilterOp::Lt => lhs < rhs,
        FilterOp::Lte => lhs <= rhs,
        FilterOp::Gt => lhs > rhs,
        FilterOp::Gte => lhs >= rhs,
        FilterOp::Contains | FilterOp::NContains => unreachable!("handled by caller"),
    }
}

/// Collect the active filters from the per-criterion slots.
#[must_use]
pub fn active_filters(filters: &HashMap<String, RowFilter>) -> Vec<&RowFilter> {
    let mut active: Vec<(&String, &RowFilter)> = filters
        .iter()
        .filter(|(_, f)| f.is_active())
        .collect();
    // Stable order for deterministic evaluation and reporting.
    active.sort_by(|a, b| a.0.cmp(b.0));
    active.into_iter().map(|(_, f)| f).collect()
}

/// Original indices of rows that satisfy every active filter.
///
/// With zero active filters every row is kept. Evaluation short-circuits on
/// the first failing filter per row.
#[must_use]
pub fn kept_indices(table: &Table, filters: &HashMap<String, RowFilter>) -> Vec<usize> {
    let active = active_filters(filters);
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            active.iter().all(|filter| {
                let column = filter.column.as_deref().unwrap_or_default();
                filter.matches_text(&row.text(column))
            })
        })
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Row;

    fn table() -> Table {
        Table::new(
            vec!["Year".to_string(), "Venue".to_string()],
            vec![
                Row::from_pairs([("Year", "2019"), ("Venue", "NeurIPS")]),
                Row::from_pairs([("Year", "2021"), ("Venue", "arXiv preprint")]),
                Row::from_pairs([("Year", "2023"), ("Venue", "ICML")]),
            ],
        )
    }

    #[test]
    fn test_numeric_comparison_when_both_sides_parse() {
        let filter = RowFilter::new("Year", FilterOp::Gte, "2021");
        let kept = kept_indices(&table(), &HashMap::from([("a".to_string(), filter)]));
        assert_eq!(kept, vec![1, 2]);
    }

    #[test]
    fn test_lexical_fallback_for_non_numeric_literal() {
        // "10" < "9" lexically but not numerically; a non-numeric cell
        // forces string comparison.
        let filter = RowFilter::new("Venue", FilterOp::Lt, "M");
        let kept = kept_indices(&table(), &HashMap::from([("a".to_string(), filter)]));
        assert_eq!(kept, vec![2]); // only "ICML" < "M"
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let filter = RowFilter::new("Venue", FilterOp::Contains, "PREPRINT");
        let kept = kept_indices(&table(), &HashMap::from([("a".to_string(), filter)]));
        assert_eq!(kept, vec![1]);
    }

    #[test]
    fn test_filters_pool_across_criteria_with_and() {
        let filters = HashMap::from([
            ("a".to_string(), RowFilter::new("Year", FilterOp::Gt, "2019")),
            (
                "b".to_string(),
                RowFilter::new("Venue", FilterOp::NContains, "arxiv"),
            ),
        ]);
        assert_eq!(kept_indices(&table(), &filters), vec![2]);
    }

    #[test]
    fn test_incomplete_or_disabled_slots_are_ignored() {
        let mut disabled = RowFilter::new("Year", FilterOp::Gt, "2020");
        disabled.enabled = false;
        let no_column = RowFilter {
            enabled: true,
            column: None,
            operator: Some(FilterOp::Eq),
            value: "x".to_string(),
        };
        let filters = HashMap::from([
            ("a".to_string(), disabled),
            ("b".to_string(), no_column),
        ]);
        assert_eq!(kept_indices(&table(), &filters), vec![0, 1, 2]);
    }

    #[test]
    fn test_absent_cells_compare_as_empty_string() {
        let table = Table::new(
            vec!["Venue".to_string()],
            vec![Row::new(), Row::from_pairs([("Venue", "ICML")])],
        );
        let filter = RowFilter::new("Venue", FilterOp::Eq, "");
        let kept = kept_indices(&table, &HashMap::from([("a".to_string(), filter)]));
        assert_eq!(kept, vec![0]);
    }
}
