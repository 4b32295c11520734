// crates/zkstatus-report/src/lib.rs

//! Circuit inputs for status transitions and oracle aggregate reports.
//!
//! Three input families, each mapping to one or two prover circuits:
//!
//! - [`TransitionInputs`]: a single chain `s0 -> ... -> sN` split into
//!   endpoints and middle statuses,
//! - [`AggregateReport`]: a final transition plus one transition per oracle,
//!   with a presence `indicator` and fault tolerance `f`,
//! - [`CompactAggregateInputs`]: the same aggregate for wide bitmasks, but
//!   carrying only `(time, word index, change mask)` per step.
//!
//! Every family implements [`CircuitInput`]: it names its circuit and exports
//! canonical JSON (stable key order, integers as decimal strings) in the shape
//! the prover expects. [`SubmissionPayload`] is what goes on-chain afterwards.

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

pub mod aggregate;
pub mod compact;
pub mod error;
pub mod export;
pub mod submission;
pub mod transition;

pub use aggregate::{AggregateReport, MAX_REPORTS};
pub use compact::{CompactAggregateInputs, CompactStep};
pub use error::ReportError;
pub use export::{write_prover_input, CircuitInput};
pub use submission::SubmissionPayload;
pub use transition::TransitionInputs;
