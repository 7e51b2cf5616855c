//! Reviewer moderation of human/model disagreements.
//!
//! A moderation decision reconciles one `(criterion, row)` disagreement:
//! confirming the human leaves scoring untouched (audit trail only), while
//! adopting the model's decision overwrites *truth* with the prediction,
//! which always lands the row in TP or TN. Setting the same value twice
//! returns the entry to unset.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A reviewer's call on one `(criterion, row)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationDecision {
    /// The human label stands. No effect on scoring.
    Human,
    /// The model was right: truth is overwritten with the prediction.
    LlmCorrect,
}

impl ModerationDecision {
    /// Marker string used in the moderated dataset export.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            ModerationDecision::Human => "Confirmed Human",
            ModerationDecision::LlmCorrect => "Corrected to LLM",
        }
    }
}

/// Moderation decisions keyed by criterion id and original row index.
///
/// Absence of an entry is the default, terminal-free state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationLog {
    entries: HashMap<String, HashMap<usize, ModerationDecision>>,
}

impl ModerationLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the decision for a `(criterion, row)` pair.
    #[must_use]
    pub fn get(&self, criterion_id: &str, row_index: usize) -> Option<ModerationDecision> {
        self.entries
            .get(criterion_id)
            .and_then(|rows| rows.get(&row_index))
            .copied()
    }

    /// Toggle a decision for a `(criterion, row)` pair.
    ///
    /// Setting a value that is already present removes it (idempotent
    /// toggle back to unset); setting a different value replaces it.
    /// Returns the decision now in effect.
    pub fn toggle(
        &mut self,
        criterion_id: &str,
        row_index: usize,
        decision: ModerationDecision,
    ) -> Option<ModerationDecision> {
        let rows = self.entries.entry(criterion_id.to_string()).or_default();
        if rows.get(&row_index) == Some(&decision) {
            rows.remove(&row_index);
            if rows.is_empty() {
                self.entries.remove(criterion_id);
            }
            None
        } else {
            rows.insert(row_index, decision);
            Some(decision)
        }
    }

    /// Clear the decision for a `(criterion, row)` pair.
    pub fn clear(&mut self, criterion_id: &str, row_index: usize) {
        if let Some(rows) = self.entries.get_mut(criterion_id) {
            rows.remove(&row_index);
            if rows.is_empty() {
                self.entries.remove(criterion_id);
            }
        }
    }

    /// Drop entries whose row index falls outside `[0, row_count)`.
    ///
    /// Applied when restoring a persisted log against a reloaded table;
    /// out-of-range entries are dropped silently.
    pub fn retain_rows(&mut self, row_count: usize) {
        for rows in self.entries.values_mut() {
            rows.retain(|&index, _| index < row_count);
        }
        self.entries.retain(|_, rows| !rows.is_empty());
    }

    /// Total number of set decisions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Whether no decisions are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all set decisions as `(criterion_id, row_index, decision)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize, ModerationDecision)> + '_ {
        self.entries.iter().flat_map(|(id, rows)| {
            rows.iter()
                .map(move |(&index, &decision)| (id.as_str(), index, decision))
        })
    }
}
