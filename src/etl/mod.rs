//! # ETL Module
//!
//! Turns the nested recently-played feed into flat, validated table records
//! and drives a complete sync run.
//!
//! - [`records`] - One struct per table row plus the [`Batch`] of a run.
//! - [`normalize`] - Flattening, release date completion, genre rows.
//! - [`validate`] - Invariants checked before anything is written.
//! - [`pipeline`] - Token, fetch, enrich, normalize, validate, load.

pub mod normalize;
pub mod pipeline;
pub mod records;
pub mod validate;

pub use pipeline::{RunOptions, RunOutcome, run_once};
pub use records::Batch;
pub use validate::{Verdict, validate};
