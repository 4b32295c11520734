// crates/zkstatus-prover/src/lib.rs

//! Gateway to the external Groth16 prover.
//!
//! The prover is an opaque program that sets up circuits, proves and
//! verifies inputs, and emits Solidity verifiers. [`ProverGateway`] is the
//! async boundary the rest of the system talks to:
//!
//! - [`SubprocessProver`] drives the real program (`go run main.go` in dev
//!   mode, `./zkssi` in prod mode),
//! - [`MockProver`] returns deterministic proofs for tests and dry runs.
//!
//! Every call takes [`CallOptions`] with a timeout. Dropping a call's future
//! cancels it: child processes are killed and outputs are only ever renamed
//! into place once complete.

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

pub mod error;
pub mod gateway;
pub mod mock;
pub mod subprocess;

pub use error::ProverError;
pub use gateway::{prove_artifact, CallOptions, ProverGateway, ProverInput};
pub use mock::{MockCall, MockProver};
pub use subprocess::{SubprocessProver, INPUT_FILE, PROOF_FILE, VERIFY_FAILED_MARKER};
