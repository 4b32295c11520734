//! Proof types shared by statuses, the report builder, and the prover gateway.
//!
//! - [`Groth16Proof`]: the fixed 8 × 32-byte tuple produced by the external
//!   prover, in the order `a0, a1, b00, b01, b10, b11, c0, c1`.
//! - [`CircuitKind`]: which circuit a proof belongs to.
//! - [`ProofArtifact`]: a proof pinned to its circuit and to a digest of the
//!   prover input it was generated from, plus free-form `meta`.
//!
//! ## Backward/forward compatibility
//! - Do **not** add `#[serde(deny_unknown_fields)]` so newer producers with
//!   extra fields remain readable by older consumers.
//! - Unknown circuit names decode as [`CircuitKind::Unknown`]; gateways must
//!   refuse to run them.

use crate::error::ProofLengthError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zkstatus_field::U256;

/// Bytes per proof element.
pub const PROOF_ELEMENT_BYTES: usize = 32;

/// Bytes in a serialized [`Groth16Proof`].
pub const PROOF_BYTES: usize = 8 * PROOF_ELEMENT_BYTES;

/// Groth16 proof tuple `(a, b, c)` flattened to eight field elements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ProofWire", into = "ProofWire")]
pub struct Groth16Proof {
    elements: [U256; 8],
}

impl Groth16Proof {
    /// Build from the flattened `a0, a1, b00, b01, b10, b11, c0, c1` order.
    #[inline]
    #[must_use]
    pub const fn from_elements(elements: [U256; 8]) -> Self {
        Self { elements }
    }

    /// Build from structured `(a, b, c)`.
    #[must_use]
    pub const fn from_parts(a: [U256; 2], b: [[U256; 2]; 2], c: [U256; 2]) -> Self {
        Self {
            elements: [a[0], a[1], b[0][0], b[0][1], b[1][0], b[1][1], c[0], c[1]],
        }
    }

    /// Parse the raw 256-byte blob written by the prover.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofLengthError> {
        if bytes.len() != PROOF_BYTES {
            return Err(ProofLengthError {
                expected: PROOF_BYTES,
                actual: bytes.len(),
            });
        }
        let mut elements = [U256::ZERO; 8];
        for (slot, chunk) in elements.iter_mut().zip(bytes.chunks_exact(PROOF_ELEMENT_BYTES)) {
            *slot = U256::from_be_slice(chunk);
        }
        Ok(Self { elements })
    }

    /// Raw 256-byte big-endian blob.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PROOF_BYTES);
        for e in &self.elements {
            out.extend_from_slice(&e.to_be_bytes::<PROOF_ELEMENT_BYTES>());
        }
        out
    }

    /// The eight words in verifier-calldata order.
    #[inline]
    #[must_use]
    pub const fn calldata(&self) -> [U256; 8] {
        self.elements
    }

    /// `a` point.
    #[inline]
    #[must_use]
    pub const fn a(&self) -> [U256; 2] {
        [self.elements[0], self.elements[1]]
    }

    /// `b` point (two `Fp2` coordinates).
    #[inline]
    #[must_use]
    pub const fn b(&self) -> [[U256; 2]; 2] {
        [
            [self.elements[2], self.elements[3]],
            [self.elements[4], self.elements[5]],
        ]
    }

    /// `c` point.
    #[inline]
    #[must_use]
    pub const fn c(&self) -> [U256; 2] {
        [self.elements[6], self.elements[7]]
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
struct ProofWire(#[serde(with = "zkstatus_field::dec::vec")] Vec<U256>);

impl From<Groth16Proof> for ProofWire {
    fn from(p: Groth16Proof) -> Self {
        Self(p.elements.to_vec())
    }
}

impl TryFrom<ProofWire> for Groth16Proof {
    type Error = ProofLengthError;

    fn try_from(w: ProofWire) -> Result<Self, Self::Error> {
        let actual = w.0.len();
        let elements: [U256; 8] = w.0.try_into().map_err(|_| ProofLengthError {
            expected: 8,
            actual,
        })?;
        Ok(Self { elements })
    }
}

/// Circuits understood by the external prover.
///
/// Marked `#[non_exhaustive]`; unknown serialized names decode as
/// [`CircuitKind::Unknown`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircuitKind {
    /// Multi-step walk over 64-bit bitmask statuses.
    #[serde(rename = "StateTransition")]
    StateTransition,
    /// Multi-step walk over wide bitmask statuses.
    #[serde(rename = "BigStateTransition")]
    BigStateTransition,
    /// Multi-step walk over Merkle statuses.
    #[serde(rename = "MTStateTransition")]
    MtStateTransition,
    /// Single Merkle step (no middle statuses).
    #[serde(rename = "SingleMTStateTransition")]
    SingleMtStateTransition,
    /// N-oracle aggregate over bitmask transitions.
    #[serde(rename = "AggBSLStateReport")]
    AggBslStateReport,
    /// N-oracle aggregate over Merkle transitions.
    #[serde(rename = "AggMTStateReport")]
    AggMtStateReport,
    /// N-oracle aggregate over compact wide-bitmask deltas.
    #[serde(rename = "AggCBSLStateReport")]
    AggCbslStateReport,
    /// Catch-all for newer/unknown circuits when deserializing.
    #[serde(other)]
    Unknown,
}

impl CircuitKind {
    /// Every circuit the prover can run.
    pub const ALL: [Self; 7] = [
        Self::StateTransition,
        Self::BigStateTransition,
        Self::MtStateTransition,
        Self::SingleMtStateTransition,
        Self::AggBslStateReport,
        Self::AggMtStateReport,
        Self::AggCbslStateReport,
    ];

    /// Name passed on the prover command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StateTransition => "StateTransition",
            Self::BigStateTransition => "BigStateTransition",
            Self::MtStateTransition => "MTStateTransition",
            Self::SingleMtStateTransition => "SingleMTStateTransition",
            Self::AggBslStateReport => "AggBSLStateReport",
            Self::AggMtStateReport => "AggMTStateReport",
            Self::AggCbslStateReport => "AggCBSLStateReport",
            Self::Unknown => "Unknown",
        }
    }

    /// Solidity verifier file name, e.g. `AggBSLStateReportVerifier.sol`.
    #[must_use]
    pub fn verifier_file_name(self) -> String {
        format!("{}Verifier.sol", self.name())
    }
}

impl fmt::Display for CircuitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CircuitKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown circuit {s:?}"))
    }
}

/// Proof bound to a circuit and to the input it proves.
///
/// **Invariants**
/// - `input_digest` is the BLAKE3 digest of the canonical prover input bytes;
///   verifiers must recompute it and reject mismatches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofArtifact {
    /// Circuit the proof was generated for.
    pub circuit: CircuitKind,
    /// Digest of the canonical prover input.
    pub input_digest: [u8; 32],
    /// The proof itself.
    pub proof: Groth16Proof,
    /// Free-form metadata for debugging/observability.
    ///
    /// Not required; omitted values deserialize as `Null`.
    #[serde(default)]
    pub meta: serde_json::Value,
}

impl ProofArtifact {
    /// Construct a new [`ProofArtifact`].
    #[inline]
    #[must_use]
    pub const fn new(
        circuit: CircuitKind,
        input_digest: [u8; 32],
        proof: Groth16Proof,
        meta: serde_json::Value,
    ) -> Self {
        Self {
            circuit,
            input_digest,
            proof,
            meta,
        }
    }

    /// Input digest as lowercase hex.
    #[must_use]
    pub fn input_digest_hex(&self) -> String {
        hex::encode(self.input_digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Groth16Proof {
        Groth16Proof::from_elements(core::array::from_fn(|i| U256::from(i as u64 + 1)))
    }

    #[test]
    fn bytes_layout_is_big_endian_in_order() {
        let p = sample();
        let bytes = p.to_bytes();
        assert_eq!(bytes.len(), PROOF_BYTES);
        // a0 = 1 lives in the last byte of the first element.
        assert_eq!(bytes[31], 1);
        // c1 = 8 lives in the last byte of the blob.
        assert_eq!(bytes[255], 8);
        assert_eq!(Groth16Proof::from_bytes(&bytes).unwrap(), p);
    }

    #[test]
    fn structured_accessors() {
        let p = sample();
        assert_eq!(p.a(), [U256::from(1u64), U256::from(2u64)]);
        assert_eq!(p.b()[1], [U256::from(5u64), U256::from(6u64)]);
        assert_eq!(p.c(), [U256::from(7u64), U256::from(8u64)]);
        assert_eq!(Groth16Proof::from_parts(p.a(), p.b(), p.c()), p);
    }

    #[test]
    fn rejects_short_blob() {
        let err = Groth16Proof::from_bytes(&[0u8; 255]).unwrap_err();
        assert_eq!(err.actual, 255);
    }

    #[test]
    fn serde_as_decimal_strings() {
        let s = serde_json::to_string(&sample()).unwrap();
        assert_eq!(s, r#"["1","2","3","4","5","6","7","8"]"#);
        assert!(serde_json::from_str::<Groth16Proof>(r#"["1","2"]"#).is_err());
    }

    #[test]
    fn unknown_circuit_is_tolerated() {
        let v = json!({
            "circuit": "FutureCircuit",
            "input_digest": ([0u8; 32]),
            "proof": ["0","0","0","0","0","0","0","0"],
        });
        let a: ProofArtifact = serde_json::from_value(v).unwrap();
        assert_eq!(a.circuit, CircuitKind::Unknown);
        assert!(a.meta.is_null());
    }

    #[test]
    fn circuit_names_round_trip() {
        for c in CircuitKind::ALL {
            assert_eq!(c.name().parse::<CircuitKind>().unwrap(), c);
        }
        assert_eq!(
            CircuitKind::AggCbslStateReport.verifier_file_name(),
            "AggCBSLStateReportVerifier.sol"
        );
    }
}
