//! Criterion discovery from table headers.
//!
//! A criterion is a label column, optionally paired with a same-named
//! probability column (`"<label> Probability"`). Discovery scans the header
//! for such pairs; columns that never participate in a pair stay available
//! for manual, label-only criteria.

use serde::{Deserialize, Serialize};

/// Fixed suffix that marks a probability column for a label column.
pub const PROBABILITY_SUFFIX: &str = " Probability";

/// One inclusion/exclusion criterion scored per row.
///
/// Identity is `id`, which is always the label column name. For
/// compatibility checks across table reloads, two criteria are the same iff
/// their `(label_column, probability_column)` pair matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    /// Criterion id (equal to the label column name).
    pub id: String,
    /// Column holding the model's label for this criterion.
    pub label_column: String,
    /// Column holding the model's probability, if one was discovered.
    pub probability_column: Option<String>,
    /// Human-readable name shown by hosts. Defaults to the id.
    pub display_name: String,
}

impl Criterion {
    /// Create a discovered criterion with a probability column.
    #[must_use]
    pub fn discovered(label: impl Into<String>, probability_column: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id: label.clone(),
            label_column: label.clone(),
            probability_column: Some(probability_column.into()),
            display_name: label,
        }
    }

    /// Create a manual, label-only criterion. The threshold step is a
    /// no-op for criteria without a probability column.
    #[must_use]
    pub fn manual(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id: label.clone(),
            label_column: label.clone(),
            probability_column: None,
            display_name: label,
        }
    }
}

/// Scan a header for criteria.
///
/// For every column ending in [`PROBABILITY_SUFFIX`], strip the suffix to
/// get a candidate label name; if a column with exactly that name also
/// exists, a criterion is emitted. No two discovered criteria share an id.
///
/// # Example
///
/// ```rust
/// use triage::eval::discover;
///
/// let header = vec![
///     "Title".to_string(),
///     "Has Control Group".to_string(),
///     "Has Control Group Probability".to_string(),
/// ];
/// let criteria = discover(&header);
/// assert_eq!(criteria.len(), 1);
/// assert_eq!(criteria[0].id, "Has Control Group");
/// ```
#[must_use]
pub fn discover(header: &[String]) -> Vec<Criterion> {
    let mut criteria: Vec<Criterion> = Vec::new();
    for column in header {
        let Some(label) = column.strip_suffix(PROBABILITY_SUFFIX) else {
            continue;
        };
        if label.is_empty() || !header.iter().any(|c| c == label) {
            continue;
        }
        if criteria.iter().any(|c| c.id == label) {
            continue;
        }
        criteria.push(Criterion::discovered(label, column.clone()));
    }
    criteria
}

/// Add a manual label-only criterion to a live criterion set.
///
/// Returns `true` if the criterion was added. If a criterion with the same
/// id already exists, its `(label_column, probability_column)` identity is
/// preserved and nothing is added — a manual addition may shadow a
/// discovered criterion's inclusion state but never its identity.
pub fn add_manual(criteria: &mut Vec<Criterion>, column: &str) -> bool {
    if criteria.iter().any(|c| c.id == column) {
        return false;
    }
    criteria.push(Criterion::manual(column));
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_discovers_label_probability_pair() {
        let h = header(&["Title", "Design", "Design Probability"]);
        let criteria = discover(&h);
        assert_eq!(criteria.len(), 1);
        assert_eq!(criteria[0].label_column, "Design");
        assert_eq!(
            criteria[0].probability_column.as_deref(),
            Some("Design Probability")
        );
    }

    #[test]
    fn test_probability_column_without_label_is_ignored() {
        let h = header(&["Title", "Design Probability"]);
        assert!(discover(&h).is_empty());
    }

    #[test]
    fn test_no_duplicate_ids() {
        let h = header(&["Design", "Design Probability", "Design Probability"]);
        assert_eq!(discover(&h).len(), 1);
    }

    #[test]
    fn test_manual_criterion_has_no_probability_column() {
        let mut criteria = discover(&header(&["Design", "Design Probability"]));
        assert!(add_manual(&mut criteria, "Population"));
        let manual = criteria.iter().find(|c| c.id == "Population").unwrap();
        assert!(manual.probability_column.is_none());
    }

    #[test]
    fn test_manual_cannot_override_discovered_identity() {
        let mut criteria = discover(&header(&["Design", "Design Probability"]));
        assert!(!add_manual(&mut criteria, "Design"));
        assert_eq!(criteria.len(), 1);
        assert!(criteria[0].probability_column.is_some());
    }
}
