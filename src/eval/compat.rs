//! Persisted configuration records, restore compatibility, and import.
//!
//! Restore-on-load is all-or-nothing: a persisted record applies iff its
//! criterion identities match the freshly discovered set exactly and every
//! configured human column still exists. The user-initiated import path is
//! deliberately weaker: it accepts whatever criteria match by id, disables
//! the rest, and reports what was skipped.

use crate::table::Table;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::config::{CriterionConfig, Thresholds};
use super::discovery::Criterion;
use super::engine::SessionState;
use super::filter::RowFilter;
use super::moderation::ModerationLog;

/// Reload-stable identity of one criterion.
///
/// Two criteria are the same across table reloads iff their
/// `(label_column, probability_column)` pairs match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CriterionIdentity {
    /// Label column name.
    pub label_column: String,
    /// Probability column name, if any.
    pub probability_column: Option<String>,
}

impl From<&Criterion> for CriterionIdentity {
    fn from(criterion: &Criterion) -> Self {
        Self {
            label_column: criterion.label_column.clone(),
            probability_column: criterion.probability_column.clone(),
        }
    }
}

/// Save-time signature of a criterion set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Criterion identities, sorted for order-independent comparison.
    pub pairs: Vec<CriterionIdentity>,
    /// Header at save time.
    pub header: Vec<String>,
}

impl Signature {
    /// Capture a signature from a live criterion set and header.
    #[must_use]
    pub fn capture(criteria: &[Criterion], header: &[String]) -> Self {
        let mut pairs: Vec<CriterionIdentity> =
            criteria.iter().map(CriterionIdentity::from).collect();
        pairs.sort();
        Self {
            pairs,
            header: header.to_vec(),
        }
    }
}

/// A persisted session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedConfig {
    /// Signature of the criterion set this record was saved against.
    pub signature: Signature,
    /// Mapping configuration per criterion id.
    pub mapping: HashMap<String, CriterionConfig>,
    /// Thresholds per criterion id.
    #[serde(default)]
    pub thresholds: HashMap<String, Thresholds>,
    /// Filter slots per criterion id.
    #[serde(default)]
    pub filters: HashMap<String, RowFilter>,
    /// Moderation decisions.
    #[serde(default)]
    pub moderation: ModerationLog,
}

impl PersistedConfig {
    /// Capture the persistable parts of a session.
    #[must_use]
    pub fn capture(session: &SessionState, header: &[String]) -> Self {
        Self {
            signature: Signature::capture(&session.criteria, header),
            mapping: session.configs.clone(),
            thresholds: session.thresholds.clone(),
            filters: session.filters.clone(),
            moderation: session.moderation.clone(),
        }
    }
}

/// Check whether a persisted record can be reapplied exactly.
///
/// Compatible iff (a) the sorted criterion-identity lists are identical and
/// (b) every criterion marked included whose human column is set references
/// a column present in the new header. Any violation rejects the whole
/// record.
pub fn check_compatible(
    persisted: &PersistedConfig,
    criteria: &[Criterion],
    header: &[String],
) -> Result<()> {
    let mut live: Vec<CriterionIdentity> = criteria.iter().map(CriterionIdentity::from).collect();
    live.sort();
    if live != persisted.signature.pairs {
        return Err(Error::incompatible(
            "criterion identities do not match the loaded table",
        ));
    }
    for (id, config) in &persisted.mapping {
        if !config.included {
            continue;
        }
        if let Some(human_column) = config.human_column.as_deref() {
            if !header.iter().any(|c| c == human_column) {
                return Err(Error::incompatible(format!(
                    "{}: human column \"{}\" missing from the loaded table",
                    id, human_column
                )));
            }
        }
    }
    Ok(())
}

/// Restore a persisted record against a freshly loaded table.
///
/// All-or-nothing: fails without side effects when incompatible. Criterion
/// identity always comes from the live table's discovery; moderation
/// entries whose row index falls outside the table are dropped silently.
pub fn restore(persisted: &PersistedConfig, table: &Table) -> Result<SessionState> {
    let mut session = SessionState::from_table(table);
    check_compatible(persisted, &session.criteria, &table.header)?;
    session.configs = persisted.mapping.clone();
    session.thresholds = persisted.thresholds.clone();
    session.filters = persisted.filters.clone();
    session.moderation = persisted.moderation.clone();
    session.moderation.retain_rows(table.rows.len());
    Ok(session)
}

/// Outcome of a best-effort mapping import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    /// Criterion ids whose configuration was adopted.
    pub applied: Vec<String>,
    /// Imported ids with no matching live criterion.
    pub skipped: Vec<String>,
}

impl ImportReport {
    /// Number of imported entries that were skipped.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Import a persisted mapping into a live session, best-effort.
///
/// Accepts whichever imported criteria exist by id in the live set and
/// marks every other live criterion `included = false`. Live identity wins:
/// the imported entry only contributes configuration (human column, value
/// maps, inclusion), never a new `(label_column, probability_column)`
/// identity. Thresholds and filter slots ride along for matched ids.
pub fn import(session: &mut SessionState, persisted: &PersistedConfig) -> ImportReport {
    let mut report = ImportReport::default();

    let live_ids: Vec<String> = session.criteria.iter().map(|c| c.id.clone()).collect();
    for id in &live_ids {
        if let Some(config) = persisted.mapping.get(id) {
            session.configs.insert(id.clone(), config.clone());
            if let Some(thresholds) = persisted.thresholds.get(id) {
                session.thresholds.insert(id.clone(), *thresholds);
            }
            if let Some(filter) = persisted.filters.get(id) {
                session.filters.insert(id.clone(), filter.clone());
            }
            report.applied.push(id.clone());
        } else {
            session.config_mut(id).included = false;
        }
    }

    let mut skipped: Vec<String> = persisted
        .mapping
        .keys()
        .filter(|id| !live_ids.iter().any(|live| live == *id))
        .cloned()
        .collect();
    skipped.sort();
    report.skipped = skipped;
    report
}
