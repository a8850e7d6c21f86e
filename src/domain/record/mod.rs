//! Case record: the structured template of case facts gathered during intake.
//!
//! The record is a fixed set of named optional string fields, partitioned
//! into critical and additional fields and grouped by category. The
//! completion evaluator decides when the record is complete enough for the
//! session to move into the mentoring phase.

mod evaluator;
mod fields;
mod record;
mod summary;

pub use evaluator::{evaluate, Readiness, TransitionPolicy};
pub use fields::{extraction_schema, Category, FieldName};
pub use record::{CaseRecord, RecordPatch};
pub use summary::case_summary;
