//! Export assembly.
//!
//! Builds the structured payloads consumed by external report and CSV
//! writers: a metrics/configuration payload for reports, and a moderated
//! dataset with per-criterion classification columns appended to the
//! original rows. Layout and rendering are the writers' concern; this
//! module only fixes the content.

use crate::table::Table;
use serde::{Deserialize, Serialize};

use super::config::{CriterionConfig, Decision, Thresholds};
use super::confusion::{ConfusionMatrix, Outcome, RowBuckets};
use super::correlation::PairCorrelation;
use super::engine::{evaluate, score_row, EvaluationResult, SessionState};
use super::moderation::ModerationDecision;

/// Flattened confusion metrics for one criterion.
///
/// Undefined ratios stay `None`; report writers render them as "—" or omit
/// the figure, never as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsExport {
    /// True positive count.
    pub true_positives: usize,
    /// True negative count.
    pub true_negatives: usize,
    /// False positive count.
    pub false_positives: usize,
    /// False negative count.
    pub false_negatives: usize,
    /// Total scored rows.
    pub total: usize,
    /// Accuracy (0 when nothing was scored).
    pub accuracy: f64,
    /// Precision, if defined.
    pub precision: Option<f64>,
    /// Recall, if defined.
    pub recall: Option<f64>,
    /// F1, if defined.
    pub f1: Option<f64>,
}

impl From<&ConfusionMatrix> for MetricsExport {
    fn from(confusion: &ConfusionMatrix) -> Self {
        Self {
            true_positives: confusion.true_positives,
            true_negatives: confusion.true_negatives,
            false_positives: confusion.false_positives,
            false_negatives: confusion.false_negatives,
            total: confusion.total(),
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1(),
        }
    }
}

/// One criterion's slice of the export payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionExport {
    /// Criterion id.
    pub id: String,
    /// Label column name.
    pub label_column: String,
    /// Probability column, if one exists.
    pub probability_column: Option<String>,
    /// Thresholds in effect for this criterion.
    pub thresholds: Thresholds,
    /// Whether thresholds were actually applied (requires a probability
    /// column).
    pub thresholds_applied: bool,
    /// Mapping configuration at export time.
    pub mapping: CriterionConfig,
    /// Confusion metrics over the filtered rows.
    pub metrics: MetricsExport,
    /// Original row indices bucketed by outcome.
    pub buckets: RowBuckets,
}

/// Full payload handed to external report/CSV writers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportPayload {
    /// Ids of criteria that participated in scoring, in live order.
    pub included_criteria: Vec<String>,
    /// Per-criterion thresholds, mapping, metrics, and buckets.
    pub criteria: Vec<CriterionExport>,
    /// Accuracy over the concatenation of all included criteria.
    pub pooled_accuracy: f64,
    /// Pairwise FP/FN correlation table.
    pub correlations: Vec<PairCorrelation>,
    /// Notes the report must surface, e.g. criteria whose thresholds were
    /// never applied for lack of a probability column.
    pub notes: Vec<String>,
}

/// Assemble the report payload from a completed scoring pass.
#[must_use]
pub fn assemble(session: &SessionState, result: &EvaluationResult) -> ExportPayload {
    let mut criteria = Vec::new();
    let mut notes = Vec::new();
    let default_config = CriterionConfig::default();

    for evaluation in &result.criteria {
        let Some(criterion) = session.criterion(&evaluation.id) else {
            continue;
        };
        let config = session
            .config(&evaluation.id)
            .unwrap_or(&default_config)
            .clone();
        let thresholds_applied = criterion.probability_column.is_some();
        if !thresholds_applied {
            notes.push(format!(
                "Thresholds were not applied to \"{}\": no probability column",
                evaluation.id
            ));
        }
        criteria.push(CriterionExport {
            id: evaluation.id.clone(),
            label_column: criterion.label_column.clone(),
            probability_column: criterion.probability_column.clone(),
            thresholds: session.thresholds_for(&evaluation.id),
            thresholds_applied,
            mapping: config,
            metrics: MetricsExport::from(&evaluation.confusion),
            buckets: evaluation.buckets.clone(),
        });
    }

    ExportPayload {
        included_criteria: result.criteria.iter().map(|c| c.id.clone()).collect(),
        criteria,
        pooled_accuracy: result.pooled_accuracy,
        correlations: result.correlations.clone(),
        notes,
    }
}

/// Moderated dataset: original rows plus per-criterion classification
/// columns, ready for an external CSV writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeratedDataset {
    /// Original header followed by four appended columns per included
    /// criterion.
    pub header: Vec<String>,
    /// One row of cell texts per original input row.
    pub rows: Vec<Vec<String>>,
}

/// Build the moderated dataset export.
///
/// Emits one row per original input row with the original cells verbatim,
/// then per included criterion: the pre-moderation classification label,
/// the moderation marker, the post-moderation classification label, and a
/// final binary inclusion flag ("1"/"0" from the post-moderation truth)
/// that stays empty unless the row was moderated for that criterion.
#[must_use]
pub fn moderated_dataset(table: &Table, session: &SessionState) -> ModeratedDataset {
    let result = evaluate(table, session);
    let default_config = CriterionConfig::default();
    let included: Vec<&super::discovery::Criterion> = result
        .criteria
        .iter()
        .filter_map(|c| session.criterion(&c.id))
        .collect();

    let mut header = table.header.clone();
    for criterion in &included {
        header.push(format!("{} Classification", criterion.id));
        header.push(format!("{} Moderation", criterion.id));
        header.push(format!("{} Moderated Classification", criterion.id));
        header.push(format!("{} Final Include", criterion.id));
    }

    let mut rows = Vec::with_capacity(table.rows.len());
    for row_index in 0..table.rows.len() {
        let mut cells: Vec<String> = table
            .header
            .iter()
            .map(|column| table.rows[row_index].text(column))
            .collect();

        for criterion in &included {
            let config = session.config(&criterion.id).unwrap_or(&default_config);
            let (truth, prediction) = score_row(table, session, criterion, config, row_index);
            let original = Outcome::of(truth, prediction);

            let moderation = session.moderation.get(&criterion.id, row_index);
            let moderated_truth = match moderation {
                Some(ModerationDecision::LlmCorrect) => prediction,
                _ => truth,
            };
            let moderated = Outcome::of(moderated_truth, prediction);

            cells.push(original.label().to_string());
            cells.push(moderation.map(ModerationDecision::marker).unwrap_or("").to_string());
            cells.push(moderated.label().to_string());
            cells.push(match moderation {
                Some(_) => match moderated_truth {
                    Decision::Include => "1".to_string(),
                    Decision::Exclude => "0".to_string(),
                },
                None => String::new(),
            });
        }
        rows.push(cells);
    }

    ModeratedDataset { header, rows }
}
