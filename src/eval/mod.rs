//! Criterion evaluation engine.
//!
//! # Overview
//!
//! Given an ingested table carrying both human ground-truth labels and
//! model-produced labels/probabilities for a set of inclusion/exclusion
//! criteria, this module:
//!
//! - **Discovers criteria** from the header (label column + optional
//!   `" Probability"` column)
//! - **Normalizes** human and model values to include/exclude decisions
//!   through per-criterion mapping tables and a fallback vocabulary
//! - **Applies probability thresholds** keyed off the raw label text
//! - **Filters rows** through a pooled AND of all enabled filter slots
//! - **Overlays moderation**, letting a reviewer adopt the model's
//!   decision as truth for individual rows
//! - **Aggregates** confusion matrices, pooled accuracy, and pairwise
//!   FP/FN Pearson correlations
//! - **Checks compatibility** of persisted configurations across reloads
//!   and assembles export payloads for external writers
//!
//! Everything downstream of the session state is a pure function of
//! `(table, session)`, recomputed on demand.
//!
//! # Example
//!
//! ```rust
//! use triage::eval::{evaluate, Decision, SessionState};
//! use triage::table::{Row, Table};
//!
//! let table = Table::new(
//!     vec!["Reviewer".to_string(), "Design".to_string()],
//!     vec![
//!         Row::from_pairs([("Reviewer", "yes"), ("Design", "yes")]),
//!         Row::from_pairs([("Reviewer", "no"), ("Design", "yes")]),
//!     ],
//! );
//! let mut session = SessionState::from_table(&table);
//! session.add_manual_criterion(&table, "Design").unwrap();
//! session.set_human_column("Design", "Reviewer").unwrap();
//! session.map_human_value("Design", "yes", Decision::Include);
//! session.map_human_value("Design", "no", Decision::Exclude);
//!
//! let result = evaluate(&table, &session);
//! let design = result.criterion("Design").unwrap();
//! assert_eq!(design.confusion.true_positives, 1);
//! assert_eq!(design.confusion.false_positives, 1);
//! ```

pub mod compat;
pub mod config;
pub mod confusion;
pub mod correlation;
pub mod discovery;
pub mod engine;
pub mod export;
pub mod filter;
pub mod moderation;
pub mod normalize;

pub use compat::{
    check_compatible, import, restore, CriterionIdentity, ImportReport, PersistedConfig, Signature,
};
pub use config::{validate, CriterionConfig, Decision, Thresholds, ValidationReport};
pub use confusion::{ConfusionMatrix, Outcome, RowBuckets};
pub use correlation::{correlate_pair, pairwise, pearson, ErrorIndicators, PairCorrelation};
pub use discovery::{add_manual, discover, Criterion, PROBABILITY_SUFFIX};
pub use engine::{evaluate, score_row, CriterionEvaluation, EvaluationResult, SessionState};
pub use export::{
    assemble, moderated_dataset, CriterionExport, ExportPayload, MetricsExport,
    ModeratedDataset,
};
pub use filter::{active_filters, kept_indices, FilterOp, RowFilter};
pub use moderation::{ModerationDecision, ModerationLog};
pub use normalize::{base_model_decision, human_decision, predict, ModelDecision, RawCategory};
