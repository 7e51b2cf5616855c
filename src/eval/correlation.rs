//! Inter-criterion error correlation.
//!
//! For each pair of included criteria, Pearson r is computed between their
//! false-positive and false-negative indicator sequences over the filtered
//! rows. Degenerate inputs (empty sequences, zero variance) yield `None`
//! rather than NaN.

use serde::{Deserialize, Serialize};

/// 0/1 error indicator sequences for one criterion over the filtered rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorIndicators {
    /// `1.0` at position i iff filtered row i is a false positive.
    pub false_positives: Vec<f64>,
    /// `1.0` at position i iff filtered row i is a false negative.
    pub false_negatives: Vec<f64>,
}

/// Pearson correlations for one unordered pair of criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairCorrelation {
    /// First criterion id.
    pub a: String,
    /// Second criterion id.
    pub b: String,
    /// r between a's FP indicators and b's FP indicators.
    pub fp_fp: Option<f64>,
    /// r between a's FN indicators and b's FN indicators.
    pub fn_fn: Option<f64>,
    /// r between a's FP indicators and b's FN indicators.
    pub fp_fn: Option<f64>,
    /// r between a's FN indicators and b's FP indicators.
    pub fn_fp: Option<f64>,
}

/// Pearson correlation coefficient.
///
/// Returns `None` for empty or mismatched-length sequences and when either
/// sequence has zero variance.
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.is_empty() || x.len() != y.len() {
        return None;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 {
        return None;
    }
    Some(covariance / denominator)
}

/// Correlate one pair of criteria across all four FP/FN combinations.
#[must_use]
pub fn correlate_pair(
    a_id: &str,
    a: &ErrorIndicators,
    b_id: &str,
    b: &ErrorIndicators,
) -> PairCorrelation {
    PairCorrelation {
        a: a_id.to_string(),
        b: b_id.to_string(),
        fp_fp: pearson(&a.false_positives, &b.false_positives),
        fn_fn: pearson(&a.false_negatives, &b.false_negatives),
        fp_fn: pearson(&a.false_positives, &b.false_negatives),
        fn_fp: pearson(&a.false_negatives, &b.false_positives),
    }
}

/// Correlate every unordered pair in a list of `(id, indicators)` entries,
/// preserving list order.
///
/// The restricted "selected criteria" view is this same routine over a
/// reviewer-chosen subset, so it can never diverge from the full table.
#[must_use]
pub fn pairwise(indicators: &[(String, ErrorIndicators)]) -> Vec<PairCorrelation> {
    let mut pairs = Vec::new();
    for (i, (a_id, a)) in indicators.iter().enumerate() {
        for (b_id, b) in &indicators[i + 1..] {
            pairs.push(correlate_pair(a_id, a, b_id, b));
        }
    }
    pairs
}
