//! Per-criterion mapping configuration and validation.
//!
//! A [`CriterionConfig`] holds the reviewer's choices for one criterion:
//! whether it participates in scoring, which column carries the human
//! ground truth, and the value-to-decision tables for human and model
//! values. Thresholds are independent of the mapping tables and live in
//! [`Thresholds`].

use crate::table::Table;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::discovery::Criterion;

/// A binary include/exclude decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// The paper satisfies the criterion.
    Include,
    /// The paper does not satisfy the criterion.
    Exclude,
}

impl Decision {
    /// Whether this decision is `Include`.
    #[must_use]
    pub fn is_include(self) -> bool {
        matches!(self, Decision::Include)
    }
}

/// Probability thresholds for one criterion.
///
/// Applied only to criteria with a probability column, and only to rows
/// whose raw label text is literally "yes"/"maybe"/"no" (case-insensitive):
/// a yes/maybe label below `yes_maybe_min_prob` is forced to exclude, a no
/// label below `no_min_prob` is forced to include.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum probability for a yes/maybe label to keep its decision.
    pub yes_maybe_min_prob: f64,
    /// Minimum probability for a no label to keep its decision.
    pub no_min_prob: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            yes_maybe_min_prob: 0.5,
            no_min_prob: 0.5,
        }
    }
}

impl Thresholds {
    /// Create thresholds, clamping both values to [0.0, 1.0].
    #[must_use]
    pub fn new(yes_maybe_min_prob: f64, no_min_prob: f64) -> Self {
        Self {
            yes_maybe_min_prob: yes_maybe_min_prob.clamp(0.0, 1.0),
            no_min_prob: no_min_prob.clamp(0.0, 1.0),
        }
    }
}

/// Reviewer-owned configuration for one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionConfig {
    /// Whether this criterion participates in validation and aggregation.
    pub included: bool,
    /// Column holding the human ground-truth value.
    pub human_column: Option<String>,
    /// Human value -> decision table.
    pub human_value_map: HashMap<String, Decision>,
    /// Model label value -> decision table.
    pub llm_value_map: HashMap<String, Decision>,
}

impl Default for CriterionConfig {
    fn default() -> Self {
        Self {
            included: true,
            human_column: None,
            human_value_map: HashMap::new(),
            llm_value_map: HashMap::new(),
        }
    }
}

/// Result of validating a mapping configuration against a table.
///
/// Collects every problem rather than stopping at the first, so hosts can
/// render all of them at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Problems that block confirmation.
    pub errors: Vec<String>,
    /// Non-blocking observations.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create an empty (passing) report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether validation passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add a blocking error.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Add a non-blocking warning.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Convert to `Result`, returning an error if validation failed.
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::Validation(self.errors.join("; ")))
        }
    }
}

/// Validate configs for scoring.
///
/// A configuration is valid iff every *included* criterion has a human
/// column, and every distinct observed value in that column and in the
/// criterion's label column has a mapping entry. Enumeration is capped at
/// [`crate::table::DISTINCT_VALUE_CAP`] distinct values per column; values
/// past the cap may stay unmapped without invalidating the configuration.
/// Criteria toggled off are skipped entirely.
#[must_use]
pub fn validate(
    table: &Table,
    criteria: &[Criterion],
    configs: &HashMap<String, CriterionConfig>,
) -> ValidationReport {
    let mut report = ValidationReport::new();
    for criterion in criteria {
        let Some(config) = configs.get(&criterion.id) else {
            continue;
        };
        if !config.included {
            continue;
        }

        let Some(human_column) = config.human_column.as_deref() else {
            report.add_error(format!("{}: no human column selected", criterion.id));
            continue;
        };
        if !table.has_column(human_column) {
            report.add_error(format!(
                "{}: human column \"{}\" not in table",
                criterion.id, human_column
            ));
            continue;
        }

        for value in table.distinct_values(human_column) {
            if !config.human_value_map.contains_key(&value) {
                report.add_error(format!(
                    "{}: unmapped human value \"{}\"",
                    criterion.id, value
                ));
            }
        }
        for value in table.distinct_values(&criterion.label_column) {
            if !config.llm_value_map.contains_key(&value) {
                report.add_error(format!(
                    "{}: unmapped model value \"{}\"",
                    criterion.id, value
                ));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Row;

    fn table() -> Table {
        Table::new(
            vec!["Design".to_string(), "Reviewer".to_string()],
            vec![
                Row::from_pairs([("Design", "yes"), ("Reviewer", "included")]),
                Row::from_pairs([("Design", "no"), ("Reviewer", "excluded")]),
            ],
        )
    }

    fn criterion() -> Criterion {
        Criterion::manual("Design")
    }

    fn full_config() -> CriterionConfig {
        CriterionConfig {
            included: true,
            human_column: Some("Reviewer".to_string()),
            human_value_map: HashMap::from([
                ("included".to_string(), Decision::Include),
                ("excluded".to_string(), Decision::Exclude),
            ]),
            llm_value_map: HashMap::from([
                ("yes".to_string(), Decision::Include),
                ("no".to_string(), Decision::Exclude),
            ]),
        }
    }

    #[test]
    fn test_complete_mapping_is_valid() {
        let configs = HashMap::from([("Design".to_string(), full_config())]);
        let report = validate(&table(), &[criterion()], &configs);
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_missing_human_column_is_an_error() {
        let mut config = full_config();
        config.human_column = None;
        let configs = HashMap::from([("Design".to_string(), config)]);
        let report = validate(&table(), &[criterion()], &configs);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_unmapped_observed_value_is_an_error() {
        let mut config = full_config();
        config.llm_value_map.remove("no");
        let configs = HashMap::from([("Design".to_string(), config)]);
        let report = validate(&table(), &[criterion()], &configs);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("unmapped model value"));
    }

    #[test]
    fn test_excluded_criterion_skips_validation() {
        let mut config = full_config();
        config.included = false;
        config.human_column = None;
        let configs = HashMap::from([("Design".to_string(), config)]);
        let report = validate(&table(), &[criterion()], &configs);
        assert!(report.is_valid());
    }

    #[test]
    fn test_values_beyond_cap_may_stay_unmapped() {
        use crate::table::DISTINCT_VALUE_CAP;

        // More distinct values than enumeration ever surfaces; only the
        // first cap's worth are mapped, the rest stay unmapped.
        let rows: Vec<Row> = (0..DISTINCT_VALUE_CAP + 50)
            .map(|i| Row::from_pairs([("Design", format!("v{}", i))]))
            .collect();
        let table = Table::new(vec!["Design".to_string()], rows);

        let mut config = CriterionConfig {
            included: true,
            human_column: Some("Design".to_string()),
            ..CriterionConfig::default()
        };
        for i in 0..DISTINCT_VALUE_CAP {
            config.human_value_map.insert(format!("v{}", i), Decision::Include);
            config.llm_value_map.insert(format!("v{}", i), Decision::Include);
        }

        let configs = HashMap::from([("Design".to_string(), config)]);
        let report = validate(&table, &[criterion()], &configs);
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn test_thresholds_clamp_to_unit_interval() {
        let t = Thresholds::new(1.5, -0.2);
        assert_eq!(t.yes_maybe_min_prob, 1.0);
        assert_eq!(t.no_min_prob, 0.0);
    }
}
