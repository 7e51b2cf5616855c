//! Label normalization and threshold application.
//!
//! Converts one row's raw human value and raw model value into boolean
//! include/exclude decisions, using the per-criterion mapping tables, a
//! built-in fallback vocabulary, and probability thresholds.
//!
//! The threshold step keys off the *raw* label text, not the mapped
//! decision: only labels that are literally "yes"/"maybe"/"no"
//! (case-insensitive) ever receive threshold adjustment. A custom-mapped
//! value like "probably" keeps its mapped decision at any probability.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::config::{Decision, Thresholds};

/// Categorical family of a raw model label, case-insensitive.
///
/// Derived from the untransformed label text, independent of the value
/// mapping. Governs which threshold (if any) applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawCategory {
    /// "yes" or "maybe".
    YesMaybe,
    /// "no".
    No,
    /// Anything else.
    Other,
}

impl RawCategory {
    /// Classify a raw label.
    #[must_use]
    pub fn of(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "yes" | "maybe" => RawCategory::YesMaybe,
            "no" => RawCategory::No,
            _ => RawCategory::Other,
        }
    }
}

/// A model decision before the final unknown-to-exclude collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelDecision {
    /// Mapped or fallback include.
    Include,
    /// Mapped or fallback exclude.
    Exclude,
    /// Unmapped and outside the fallback vocabulary. Scores as exclude.
    Unknown,
}

impl ModelDecision {
    /// Collapse to a scoring decision; unknown resolves to exclude.
    #[must_use]
    pub fn resolve(self) -> Decision {
        match self {
            ModelDecision::Include => Decision::Include,
            ModelDecision::Exclude | ModelDecision::Unknown => Decision::Exclude,
        }
    }
}

/// Derive the human decision for one raw value.
///
/// The value is trimmed and looked up in the human map; unmapped values
/// default to exclude. (Such values block confirmation through validation,
/// but scoring during live editing must not fail on them.)
#[must_use]
pub fn human_decision(raw: &str, human_value_map: &HashMap<String, Decision>) -> Decision {
    human_value_map
        .get(raw.trim())
        .copied()
        .unwrap_or(Decision::Exclude)
}

/// Derive the base model decision for one raw label, before thresholds.
///
/// The label is looked up in the model map first; on a miss the fallback
/// vocabulary applies: yes/maybe -> include, no -> exclude, anything else
/// is unknown.
#[must_use]
pub fn base_model_decision(
    raw: &str,
    llm_value_map: &HashMap<String, Decision>,
) -> ModelDecision {
    if let Some(decision) = llm_value_map.get(raw.trim()) {
        return match decision {
            Decision::Include => ModelDecision::Include,
            Decision::Exclude => ModelDecision::Exclude,
        };
    }
    match RawCategory::of(raw) {
        RawCategory::YesMaybe => ModelDecision::Include,
        RawCategory::No => ModelDecision::Exclude,
        RawCategory::Other => ModelDecision::Unknown,
    }
}

/// Derive the model's prediction for one row of one criterion.
///
/// `probability` must be `Some` only when the criterion has a probability
/// column and the row's value parsed as a finite number; in every other
/// case the base decision stands unchanged.
#[must_use]
pub fn predict(
    raw_label: &str,
    probability: Option<f64>,
    llm_value_map: &HashMap<String, Decision>,
    thresholds: Thresholds,
) -> Decision {
    let base = base_model_decision(raw_label, llm_value_map);
    let Some(probability) = probability.filter(|p| p.is_finite()) else {
        return base.resolve();
    };
    match RawCategory::of(raw_label) {
        RawCategory::YesMaybe if probability < thresholds.yes_maybe_min_prob => Decision::Exclude,
        RawCategory::No if probability < thresholds.no_min_prob => Decision::Include,
        _ => base.resolve(),
    }
}
