// crates/zkstatus-aggregate/src/lib.rs

//! Oracle status aggregation.
//!
//! Each oracle (a *source*) answers a status query with a time-ordered list
//! of entries. This crate:
//!
//! 1. decodes and validates every source's list against the last status known
//!    on-chain ([`validate_chain`]), truncating at the first entry that breaks
//!    the append-only rule and recording why,
//! 2. picks a canonical chain across sources ([`select_canonical`]): longest
//!    wins, ties go to the lowest source index, and
//! 3. wraps both behind [`Aggregator`], which validates sources in parallel.
//!
//! Oracle query URLs and response parsing live in [`entry`].

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod aggregator;
pub mod chain;
pub mod entry;
pub mod error;

pub use aggregator::{AggregationOutcome, Aggregator};
pub use chain::{select_canonical, validate_chain, Canonical, ValidChain};
pub use entry::{parse_source_response, OracleQuery, SourceResponseEntry};
pub use error::ValidationError;
