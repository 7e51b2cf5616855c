//! Confusion matrix counts and derived metrics.
//!
//! Counts are the stored state; accuracy, precision, recall, and F1 are
//! derived on demand. Derived metrics with a zero denominator are `None`,
//! never NaN or 0 — consumers render them as "—" or omit them.

use serde::{Deserialize, Serialize};

use super::config::Decision;

/// Classification outcome for one scored `(criterion, row)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Truth include, prediction include.
    TruePositive,
    /// Truth exclude, prediction exclude.
    TrueNegative,
    /// Truth exclude, prediction include.
    FalsePositive,
    /// Truth include, prediction exclude.
    FalseNegative,
}

impl Outcome {
    /// Classify a truth/prediction pair.
    #[must_use]
    pub fn of(truth: Decision, prediction: Decision) -> Self {
        match (truth.is_include(), prediction.is_include()) {
            (true, true) => Outcome::TruePositive,
            (false, false) => Outcome::TrueNegative,
            (false, true) => Outcome::FalsePositive,
            (true, false) => Outcome::FalseNegative,
        }
    }

    /// Short label used in exports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Outcome::TruePositive => "TP",
            Outcome::TrueNegative => "TN",
            Outcome::FalsePositive => "FP",
            Outcome::FalseNegative => "FN",
        }
    }
}

/// Confusion matrix counts for one criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Truth include, prediction include.
    pub true_positives: usize,
    /// Truth exclude, prediction exclude.
    pub true_negatives: usize,
    /// Truth exclude, prediction include.
    pub false_positives: usize,
    /// Truth include, prediction exclude.
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Record one classified pair.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::TruePositive => self.true_positives += 1,
            Outcome::TrueNegative => self.true_negatives += 1,
            Outcome::FalsePositive => self.false_positives += 1,
            Outcome::FalseNegative => self.false_negatives += 1,
        }
    }

    /// Total scored pairs.
    #[must_use]
    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// `(tp + tn) / total`, or 0 when nothing was scored.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.true_positives + self.true_negatives) as f64 / total as f64
    }

    /// `tp / (tp + fp)`, or `None` when no positives were predicted.
    #[must_use]
    pub fn precision(&self) -> Option<f64> {
        let denominator = self.true_positives + self.false_positives;
        if denominator == 0 {
            return None;
        }
        Some(self.true_positives as f64 / denominator as f64)
    }

    /// `tp / (tp + fn)`, or `None` when truth contains no positives.
    #[must_use]
    pub fn recall(&self) -> Option<f64> {
        let denominator = self.true_positives + self.false_negatives;
        if denominator == 0 {
            return None;
        }
        Some(self.true_positives as f64 / denominator as f64)
    }

    /// Harmonic mean of precision and recall, or `None` when either is
    /// undefined or their sum is zero.
    #[must_use]
    pub fn f1(&self) -> Option<f64> {
        let precision = self.precision()?;
        let recall = self.recall()?;
        if precision + recall == 0.0 {
            return None;
        }
        Some(2.0 * precision * recall / (precision + recall))
    }
}

/// Original row indices bucketed by outcome, for drill-down.
///
/// Indices are positions in the ingested table, not positions in the
/// filtered sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowBuckets {
    /// Rows scored as true positives.
    pub true_positives: Vec<usize>,
    /// Rows scored as true negatives.
    pub true_negatives: Vec<usize>,
    /// Rows scored as false positives.
    pub false_positives: Vec<usize>,
    /// Rows scored as false negatives.
    pub false_negatives: Vec<usize>,
}

impl RowBuckets {
    /// Record one classified row.
    pub fn record(&mut self, outcome: Outcome, row_index: usize) {
        match outcome {
            Outcome::TruePositive => self.true_positives.push(row_index),
            Outcome::TrueNegative => self.true_negatives.push(row_index),
            Outcome::FalsePositive => self.false_positives.push(row_index),
            Outcome::FalseNegative => self.false_negatives.push(row_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(tp: usize, tn: usize, fp: usize, fn_count: usize) -> ConfusionMatrix {
        ConfusionMatrix {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_count,
        }
    }

    #[test]
    fn test_outcome_classification() {
        assert_eq!(
            Outcome::of(Decision::Include, Decision::Include),
            Outcome::TruePositive
        );
        assert_eq!(
            Outcome::of(Decision::Exclude, Decision::Include),
            Outcome::FalsePositive
        );
        assert_eq!(Outcome::of(Decision::Include, Decision::Exclude).label(), "FN");
    }

    #[test]
    fn test_counts_sum_to_total() {
        let m = matrix(2, 1, 1, 1);
        assert_eq!(m.total(), 5);
        assert!((m.accuracy() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_empty_matrix_has_zero_accuracy_and_no_ratios() {
        let m = ConfusionMatrix::default();
        assert_eq!(m.accuracy(), 0.0);
        assert_eq!(m.precision(), None);
        assert_eq!(m.recall(), None);
        assert_eq!(m.f1(), None);
    }

    #[test]
    fn test_f1_none_when_precision_and_recall_are_zero() {
        // tp=0 with fp>0 and fn>0: precision=0, recall=0, sum is zero.
        let m = matrix(0, 3, 2, 2);
        assert_eq!(m.precision(), Some(0.0));
        assert_eq!(m.recall(), Some(0.0));
        assert_eq!(m.f1(), None);
    }

    #[test]
    fn test_spec_example_metrics() {
        let m = matrix(2, 1, 1, 1);
        assert!((m.precision().unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.recall().unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.f1().unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }
}
