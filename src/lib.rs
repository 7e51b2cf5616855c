//! # triage
//!
//! Criterion evaluation engine for LLM-assisted literature screening.
//!
//! An external pipeline screens academic papers with an LLM, producing a
//! table with one row per paper: human-annotated ground truth alongside
//! model labels and probabilities for a set of inclusion/exclusion
//! criteria. This crate judges how well the model's per-criterion yes/no
//! decisions match the human annotations:
//!
//! - **Discovery**: infer criteria from the table header
//! - **Mapping**: value-to-decision tables for human and model values
//! - **Thresholds**: probability cutoffs over the raw yes/maybe/no labels
//! - **Filters**: a pooled row-filter grammar applied before scoring
//! - **Moderation**: reviewer reconciliation of disagreements
//! - **Metrics**: per-criterion confusion matrices, pooled accuracy, and
//!   inter-criterion error correlation
//! - **Persistence types**: compatibility-checked configuration records
//!   and export payloads for external writers
//!
//! ## Quick Start
//!
//! ```rust
//! use triage::eval::{evaluate, Decision, SessionState};
//! use triage::table::{Row, Table};
//!
//! // An external parser produced this table.
//! let table = Table::new(
//!     vec![
//!         "Reviewer Decision".to_string(),
//!         "Has Control Group".to_string(),
//!         "Has Control Group Probability".to_string(),
//!     ],
//!     vec![Row::from_pairs([
//!         ("Reviewer Decision", "include"),
//!         ("Has Control Group", "yes"),
//!         ("Has Control Group Probability", "0.92"),
//!     ])],
//! );
//!
//! // Discovery finds "Has Control Group" paired with its probability column.
//! let mut session = SessionState::from_table(&table);
//! session.set_human_column("Has Control Group", "Reviewer Decision").unwrap();
//! session.map_human_value("Has Control Group", "include", Decision::Include);
//!
//! let result = evaluate(&table, &session);
//! assert_eq!(result.criterion("Has Control Group").unwrap().confusion.true_positives, 1);
//! ```
//!
//! ## Design Philosophy
//!
//! - **Pure recomputation**: every derived value is a function of
//!   `(table, session)`; no hidden accumulation, safe to recompute on
//!   every input change
//! - **Degrade, don't fail**: malformed probabilities fall back to the
//!   base decision, unmapped values surface through validation instead of
//!   runtime errors, degenerate statistics are `None` rather than NaN
//! - **Stable row identity**: rows are identified by ingestion position
//!   everywhere; never re-sorted or re-indexed
//! - **External edges**: file parsing, LLM orchestration, storage, and
//!   rendering are collaborators behind plain data types

#![warn(missing_docs)]

mod error;
pub mod eval;
pub mod table;

pub use error::{Error, Result};
pub use eval::{evaluate, EvaluationResult, SessionState};
pub use table::{Row, Table, Value};
