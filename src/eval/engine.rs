//! Evaluation session and scoring pass.
//!
//! The engine is a stateless set of functions over `(table, session)`:
//! [`SessionState`] owns the reviewer's configuration (mappings,
//! thresholds, filters, moderation) and [`evaluate`] recomputes the full
//! [`EvaluationResult`] from scratch on every call. Recomputation is pure
//! and idempotent, so hosts may call it on every input change with no
//! coordination.
//!
//! # Example
//!
//! ```rust
//! use triage::eval::{evaluate, SessionState};
//! use triage::table::{Row, Table};
//!
//! let table = Table::new(
//!     vec!["Design".to_string(), "Design Probability".to_string()],
//!     vec![Row::from_pairs([("Design", "yes"), ("Design Probability", "0.9")])],
//! );
//! let mut session = SessionState::from_table(&table);
//! session.set_human_column("Design", "Design").unwrap();
//! let result = evaluate(&table, &session);
//! assert_eq!(result.kept_rows.len(), 1);
//! ```

use crate::table::Table;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::config::{CriterionConfig, Decision, Thresholds};
use super::confusion::{ConfusionMatrix, Outcome, RowBuckets};
use super::correlation::{pairwise, ErrorIndicators, PairCorrelation};
use super::discovery::{self, Criterion};
use super::filter::{kept_indices, FilterOp, RowFilter};
use super::moderation::{ModerationDecision, ModerationLog};
use super::normalize;

/// Reviewer-owned session state for one loaded table.
///
/// Mutated only through the documented operations; every derived value is
/// recomputed from this state plus the table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Live criterion set: discovered pairs plus manual additions.
    pub criteria: Vec<Criterion>,
    /// Mapping configuration per criterion id.
    pub configs: HashMap<String, CriterionConfig>,
    /// Probability thresholds per criterion id.
    pub thresholds: HashMap<String, Thresholds>,
    /// Filter slots per criterion id (pooled at evaluation time).
    pub filters: HashMap<String, RowFilter>,
    /// Reviewer moderation decisions.
    pub moderation: ModerationLog,
}

impl SessionState {
    /// Create a session from a freshly loaded table.
    ///
    /// Runs criterion discovery over the header and initializes a default
    /// config for each discovered criterion.
    #[must_use]
    pub fn from_table(table: &Table) -> Self {
        let criteria = discovery::discover(&table.header);
        let configs = criteria
            .iter()
            .map(|c| (c.id.clone(), CriterionConfig::default()))
            .collect();
        Self {
            criteria,
            configs,
            thresholds: HashMap::new(),
            filters: HashMap::new(),
            moderation: ModerationLog::new(),
        }
    }

    /// Look up a criterion by id.
    #[must_use]
    pub fn criterion(&self, id: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.id == id)
    }

    /// Add a manual label-only criterion for an existing table column.
    ///
    /// If a criterion with that id already exists, its identity is left
    /// untouched and this is a no-op.
    pub fn add_manual_criterion(&mut self, table: &Table, column: &str) -> Result<()> {
        if !table.has_column(column) {
            return Err(Error::unknown_column(column));
        }
        if discovery::add_manual(&mut self.criteria, column) {
            self.configs
                .entry(column.to_string())
                .or_insert_with(CriterionConfig::default);
        }
        Ok(())
    }

    /// Mutable config for a criterion, created on first touch.
    pub fn config_mut(&mut self, id: &str) -> &mut CriterionConfig {
        self.configs.entry(id.to_string()).or_default()
    }

    /// Config for a criterion, if one has been created.
    #[must_use]
    pub fn config(&self, id: &str) -> Option<&CriterionConfig> {
        self.configs.get(id)
    }

    /// Toggle whether a criterion participates in scoring. Stored maps are
    /// kept when a criterion is toggled off.
    pub fn set_included(&mut self, id: &str, included: bool) {
        self.config_mut(id).included = included;
    }

    /// Select the human ground-truth column for a criterion.
    pub fn set_human_column(&mut self, id: &str, column: impl Into<String>) -> Result<()> {
        if self.criterion(id).is_none() {
            return Err(Error::unknown_criterion(id));
        }
        self.config_mut(id).human_column = Some(column.into());
        Ok(())
    }

    /// Map one observed human value to a decision.
    pub fn map_human_value(&mut self, id: &str, value: impl Into<String>, decision: Decision) {
        self.config_mut(id).human_value_map.insert(value.into(), decision);
    }

    /// Map one observed model label value to a decision.
    pub fn map_llm_value(&mut self, id: &str, value: impl Into<String>, decision: Decision) {
        self.config_mut(id).llm_value_map.insert(value.into(), decision);
    }

    /// Set probability thresholds for a criterion.
    pub fn set_thresholds(&mut self, id: &str, thresholds: Thresholds) {
        self.thresholds.insert(id.to_string(), thresholds);
    }

    /// Thresholds for a criterion, defaulting to 0.5/0.5.
    #[must_use]
    pub fn thresholds_for(&self, id: &str) -> Thresholds {
        self.thresholds.get(id).copied().unwrap_or_default()
    }

    /// Set the filter slot for a criterion id.
    pub fn set_filter(
        &mut self,
        id: &str,
        column: impl Into<String>,
        operator: FilterOp,
        value: impl Into<String>,
    ) {
        self.filters
            .insert(id.to_string(), RowFilter::new(column, operator, value));
    }

    /// Clear the filter slot for a criterion id.
    pub fn clear_filter(&mut self, id: &str) {
        self.filters.remove(id);
    }

    /// Toggle a moderation decision for a `(criterion, row)` pair.
    pub fn toggle_moderation(
        &mut self,
        id: &str,
        row_index: usize,
        decision: ModerationDecision,
    ) -> Option<ModerationDecision> {
        self.moderation.toggle(id, row_index, decision)
    }

    /// Ids of criteria currently participating in scoring, in live order.
    #[must_use]
    pub fn included_ids(&self) -> Vec<String> {
        self.criteria
            .iter()
            .filter(|c| self.configs.get(&c.id).map_or(true, |cfg| cfg.included))
            .map(|c| c.id.clone())
            .collect()
    }
}

/// Scored sequences and aggregates for one criterion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionEvaluation {
    /// Criterion id.
    pub id: String,
    /// Truth decisions, index-aligned to the filtered row subset.
    pub truth: Vec<Decision>,
    /// Model predictions, index-aligned to the filtered row subset.
    pub predictions: Vec<Decision>,
    /// Confusion counts over the filtered rows.
    pub confusion: ConfusionMatrix,
    /// Original row indices bucketed by outcome.
    pub buckets: RowBuckets,
}

impl CriterionEvaluation {
    /// FP/FN indicator sequences derived from the scored pairs.
    #[must_use]
    pub fn indicators(&self) -> ErrorIndicators {
        let mut indicators = ErrorIndicators::default();
        for (&truth, &prediction) in self.truth.iter().zip(&self.predictions) {
            let outcome = Outcome::of(truth, prediction);
            indicators
                .false_positives
                .push(if outcome == Outcome::FalsePositive { 1.0 } else { 0.0 });
            indicators
                .false_negatives
                .push(if outcome == Outcome::FalseNegative { 1.0 } else { 0.0 });
        }
        indicators
    }
}

/// Full derived output of one scoring pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Original indices of rows that passed the pooled filters.
    pub kept_rows: Vec<usize>,
    /// Per-criterion sequences and aggregates, one entry per included
    /// criterion in live order.
    pub criteria: Vec<CriterionEvaluation>,
    /// Accuracy over the concatenation of every included criterion's
    /// truth/prediction pairs. Criteria with more scored rows dominate.
    pub pooled_accuracy: f64,
    /// Pairwise FP/FN correlations over all included criteria.
    pub correlations: Vec<PairCorrelation>,
}

impl EvaluationResult {
    /// Evaluation for one criterion, if it was included.
    #[must_use]
    pub fn criterion(&self, id: &str) -> Option<&CriterionEvaluation> {
        self.criteria.iter().find(|c| c.id == id)
    }

    /// Pairwise correlations restricted to a reviewer-chosen subset.
    ///
    /// Mirrors the full computation over the selected ids, preserving the
    /// result's criterion order.
    #[must_use]
    pub fn selected_correlations(&self, ids: &[&str]) -> Vec<PairCorrelation> {
        let entries: Vec<(String, ErrorIndicators)> = self
            .criteria
            .iter()
            .filter(|c| ids.contains(&c.id.as_str()))
            .map(|c| (c.id.clone(), c.indicators()))
            .collect();
        pairwise(&entries)
    }
}

/// Derive the truth and prediction for one `(criterion, row)` pair,
/// before moderation.
///
/// Truth is the mapped human value (unmapped values default to exclude);
/// the prediction runs the mapped-or-fallback label through the threshold
/// step when a probability is available.
#[must_use]
pub fn score_row(
    table: &Table,
    session: &SessionState,
    criterion: &Criterion,
    config: &CriterionConfig,
    row_index: usize,
) -> (Decision, Decision) {
    let row = &table.rows[row_index];
    let human_raw = config
        .human_column
        .as_deref()
        .map(|column| row.text(column))
        .unwrap_or_default();
    let truth = normalize::human_decision(&human_raw, &config.human_value_map);

    let label_raw = row.text(&criterion.label_column);
    let probability = criterion
        .probability_column
        .as_deref()
        .and_then(|column| row.finite(column));
    let prediction = normalize::predict(
        &label_raw,
        probability,
        &config.llm_value_map,
        session.thresholds_for(&criterion.id),
    );
    (truth, prediction)
}

/// Run one scoring pass over the table.
///
/// Applies the pooled filters, normalizes every `(criterion, row)` pair,
/// overlays moderation, and aggregates confusion counts, pooled accuracy,
/// and pairwise error correlations.
#[must_use]
pub fn evaluate(table: &Table, session: &SessionState) -> EvaluationResult {
    let kept_rows = kept_indices(table, &session.filters);
    let default_config = CriterionConfig::default();

    let mut criteria = Vec::new();
    for criterion in &session.criteria {
        let config = session.configs.get(&criterion.id).unwrap_or(&default_config);
        if !config.included {
            continue;
        }

        let mut truth_seq = Vec::with_capacity(kept_rows.len());
        let mut prediction_seq = Vec::with_capacity(kept_rows.len());
        let mut confusion = ConfusionMatrix::default();
        let mut buckets = RowBuckets::default();

        for &row_index in &kept_rows {
            let (mut truth, prediction) = score_row(table, session, criterion, config, row_index);
            if session.moderation.get(&criterion.id, row_index)
                == Some(ModerationDecision::LlmCorrect)
            {
                truth = prediction;
            }
            let outcome = Outcome::of(truth, prediction);
            confusion.record(outcome);
            buckets.record(outcome, row_index);
            truth_seq.push(truth);
            prediction_seq.push(prediction);
        }

        criteria.push(CriterionEvaluation {
            id: criterion.id.clone(),
            truth: truth_seq,
            predictions: prediction_seq,
            confusion,
            buckets,
        });
    }

    let scored: usize = criteria.iter().map(|c| c.confusion.total()).sum();
    let correct: usize = criteria
        .iter()
        .map(|c| c.confusion.true_positives + c.confusion.true_negatives)
        .sum();
    let pooled_accuracy = if scored == 0 {
        0.0
    } else {
        correct as f64 / scored as f64
    };

    let indicator_entries: Vec<(String, ErrorIndicators)> = criteria
        .iter()
        .map(|c| (c.id.clone(), c.indicators()))
        .collect();
    let correlations = pairwise(&indicator_entries);

    EvaluationResult {
        kept_rows,
        criteria,
        pooled_accuracy,
        correlations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Row;

    fn screening_table() -> Table {
        Table::new(
            vec![
                "Reviewer".to_string(),
                "Design".to_string(),
                "Design Probability".to_string(),
            ],
            vec![
                Row::from_pairs([
                    ("Reviewer", "yes"),
                    ("Design", "yes"),
                    ("Design Probability", "0.9"),
                ]),
                Row::from_pairs([
                    ("Reviewer", "no"),
                    ("Design", "yes"),
                    ("Design Probability", "0.8"),
                ]),
                Row::from_pairs([
                    ("Reviewer", "yes"),
                    ("Design", "no"),
                    ("Design Probability", "0.7"),
                ]),
            ],
        )
    }

    fn session(table: &Table) -> SessionState {
        let mut session = SessionState::from_table(table);
        session.set_human_column("Design", "Reviewer").unwrap();
        session.map_human_value("Design", "yes", Decision::Include);
        session.map_human_value("Design", "no", Decision::Exclude);
        session
    }

    #[test]
    fn test_discovery_seeds_session() {
        let table = screening_table();
        let session = SessionState::from_table(&table);
        assert_eq!(session.criteria.len(), 1);
        assert_eq!(session.included_ids(), vec!["Design"]);
    }

    #[test]
    fn test_evaluate_counts() {
        let table = screening_table();
        let session = session(&table);
        let result = evaluate(&table, &session);
        let design = result.criterion("Design").unwrap();
        // Row 0: TP, row 1: FP, row 2: FN.
        assert_eq!(design.confusion.true_positives, 1);
        assert_eq!(design.confusion.false_positives, 1);
        assert_eq!(design.confusion.false_negatives, 1);
        assert_eq!(design.buckets.false_positives, vec![1]);
        assert_eq!(design.confusion.total(), result.kept_rows.len());
    }

    #[test]
    fn test_llm_correct_moderation_overwrites_truth() {
        let table = screening_table();
        let mut session = session(&table);
        session.toggle_moderation("Design", 1, ModerationDecision::LlmCorrect);
        let result = evaluate(&table, &session);
        let design = result.criterion("Design").unwrap();
        assert_eq!(design.confusion.false_positives, 0);
        assert_eq!(design.confusion.true_positives, 2);
    }

    #[test]
    fn test_human_moderation_is_a_scoring_noop() {
        let table = screening_table();
        let mut session = session(&table);
        let baseline = evaluate(&table, &session);
        session.toggle_moderation("Design", 1, ModerationDecision::Human);
        let moderated = evaluate(&table, &session);
        assert_eq!(
            baseline.criterion("Design").unwrap().confusion,
            moderated.criterion("Design").unwrap().confusion
        );
    }

    #[test]
    fn test_excluded_criterion_is_skipped() {
        let table = screening_table();
        let mut session = session(&table);
        session.set_included("Design", false);
        let result = evaluate(&table, &session);
        assert!(result.criteria.is_empty());
        assert_eq!(result.pooled_accuracy, 0.0);
    }

    #[test]
    fn test_filter_from_any_criterion_restricts_all() {
        let table = screening_table();
        let mut session = session(&table);
        // Manual criterion carrying the filter slot; the filter still
        // restricts the Design criterion's scored rows.
        session.add_manual_criterion(&table, "Reviewer").unwrap();
        session.set_included("Reviewer", false);
        session.set_filter("Reviewer", "Design Probability", FilterOp::Gte, "0.8");
        let result = evaluate(&table, &session);
        assert_eq!(result.kept_rows, vec![0, 1]);
        assert_eq!(result.criterion("Design").unwrap().confusion.total(), 2);
    }

    #[test]
    fn test_threshold_forces_low_confidence_yes_to_exclude() {
        let table = screening_table();
        let mut session = session(&table);
        session.set_thresholds("Design", Thresholds::new(0.85, 0.5));
        let result = evaluate(&table, &session);
        let design = result.criterion("Design").unwrap();
        // Row 1 ("yes" at 0.8) drops below the yes/maybe threshold and is
        // forced to exclude: the FP becomes a TN.
        assert_eq!(design.confusion.false_positives, 0);
        assert_eq!(design.confusion.true_negatives, 1);
    }

    #[test]
    fn test_manual_criterion_threshold_step_is_noop() {
        let table = screening_table();
        let mut session = session(&table);
        session.add_manual_criterion(&table, "Reviewer").unwrap();
        session.set_human_column("Reviewer", "Reviewer").unwrap();
        session.map_human_value("Reviewer", "yes", Decision::Include);
        session.map_human_value("Reviewer", "no", Decision::Exclude);
        // Extreme thresholds change nothing without a probability column.
        session.set_thresholds("Reviewer", Thresholds::new(1.0, 1.0));
        let result = evaluate(&table, &session);
        let manual = result.criterion("Reviewer").unwrap();
        assert_eq!(manual.confusion.accuracy(), 1.0);
    }

    #[test]
    fn test_pooled_accuracy_concatenates_criteria() {
        let table = screening_table();
        let mut session = session(&table);
        session.add_manual_criterion(&table, "Reviewer").unwrap();
        session.set_human_column("Reviewer", "Reviewer").unwrap();
        session.map_human_value("Reviewer", "yes", Decision::Include);
        session.map_human_value("Reviewer", "no", Decision::Exclude);
        let result = evaluate(&table, &session);
        // Design: 1 of 3 correct; Reviewer (self-agreement): 3 of 3.
        assert!((result.pooled_accuracy - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_selected_correlations_mirror_full_table() {
        let table = screening_table();
        let mut session = session(&table);
        session.add_manual_criterion(&table, "Reviewer").unwrap();
        session.set_human_column("Reviewer", "Reviewer").unwrap();
        session.map_human_value("Reviewer", "yes", Decision::Include);
        session.map_human_value("Reviewer", "no", Decision::Exclude);
        let result = evaluate(&table, &session);
        let selected = result.selected_correlations(&["Design", "Reviewer"]);
        assert_eq!(selected, result.correlations);
    }
}
