//! zkstatus-core: credential status representations, codecs, config, and I/O.
//!
//! This crate defines the **stable boundary** shared by the other zkstatus crates:
//! - the [`Status`] tagged union (64-bit bitmask, wide bitmask, Merkle status)
//!   with its fixed-width codec, genesis value, and append-only `advance` rule,
//! - Groth16 proof and proof-artifact types attached to statuses,
//! - the explicit [`Config`] threaded into every component, and
//! - JSON/CBOR I/O with extension auto-detection plus atomic writes.
//!
//! ```
//! use zkstatus_core::{Status, StatusParams};
//!
//! let genesis = Status::genesis(&StatusParams::Bitmask64);
//! let next = genesis.advance()?.advance()?.advance()?;
//! assert_eq!(next, Status::Bitmask64 { time: 3, bits: 0b111 });
//! # Ok::<(), zkstatus_core::StatusError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Proof types (Groth16 tuple, circuit identity, proof artifact).
pub mod artifact;
/// Explicit, TOML-backed configuration.
pub mod config;
/// Status error taxonomy.
pub mod error;
/// JSON/CBOR helpers, auto-detecting read/write, and atomic writes.
pub mod io;
/// Status mechanisms, parameters, and the [`Status`] union.
pub mod status;

pub use artifact::*;
pub use config::*;
pub use error::*;
pub use status::*;

pub use zkstatus_field::{Fr, U256};
pub use zkstatus_merkle::PairHashKind;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use zkstatus_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        artifact::{CircuitKind, Groth16Proof, ProofArtifact},
        config::Config,
        error::StatusError,
        status::*,
    };
}
