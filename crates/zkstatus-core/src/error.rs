//! Errors raised by status codecs and progression.
//!
//! Format errors (`LengthMismatch`, `InvalidEncoding`, `HeightMismatch`,
//! `RootMismatch`, `Proof`) reject malformed input and are never worth
//! retrying. `Exhausted` is fatal for the status space: the caller must widen
//! capacity or rotate to a new epoch.

use crate::status::StatusMechanism;
use zkstatus_merkle::MerkleError;

/// Wrong byte length for a Groth16 proof blob.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("proof must be {expected} bytes, got {actual}")]
pub struct ProofLengthError {
    /// Required length.
    pub expected: usize,
    /// Observed length.
    pub actual: usize,
}

/// Status codec and progression errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    /// Encoded bytes do not match the variant's fixed layout.
    #[error("{mechanism} status must be {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Variant being decoded.
        mechanism: StatusMechanism,
        /// Length required by the layout.
        expected: usize,
        /// Length observed.
        actual: usize,
    },
    /// Text payload is neither valid base64 nor `0x` hex.
    #[error("invalid status encoding: {0}")]
    InvalidEncoding(String),
    /// Decoded Merkle height differs from the configured one.
    #[error("merkle height mismatch: expected {expected}, got {actual}")]
    HeightMismatch {
        /// Configured height.
        expected: u32,
        /// Encoded height.
        actual: u32,
    },
    /// Encoded Merkle root differs from the root derived from `time`.
    #[error("merkle root does not match the tree derived for time {time}")]
    RootMismatch {
        /// Time whose derived root was compared.
        time: u32,
    },
    /// Every event slot is already set.
    #[error("status space exhausted: all {capacity} event slots are set")]
    Exhausted {
        /// Total number of event slots.
        capacity: usize,
    },
    /// `time` needs more leaves than the tree height allows (reject policy).
    #[error("time {time} exceeds merkle capacity {capacity}")]
    MerkleCapacity {
        /// Requested time.
        time: u32,
        /// `2^height`.
        capacity: u64,
    },
    /// Logical time would overflow its field width.
    #[error("status time overflows the {mechanism} time field")]
    TimeOverflow {
        /// Variant whose time field overflowed.
        mechanism: StatusMechanism,
    },
    /// Operation is not defined for this variant.
    #[error("{op} is not supported for {mechanism} statuses")]
    UnsupportedVariant {
        /// Operation name.
        op: &'static str,
        /// Variant it was called on.
        mechanism: StatusMechanism,
    },
    /// Input belongs to a different status mechanism than configured.
    #[error("expected a {expected} status, got {actual}")]
    MechanismMismatch {
        /// Configured mechanism.
        expected: StatusMechanism,
        /// Mechanism found in the input.
        actual: StatusMechanism,
    },
    /// Attached proof blob is malformed.
    #[error(transparent)]
    Proof(#[from] ProofLengthError),
    /// Merkle parameters are invalid.
    #[error(transparent)]
    Merkle(#[from] MerkleError),
}
