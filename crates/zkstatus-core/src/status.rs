//! Status mechanisms and the [`Status`] union.
//!
//! Three interchangeable encodings of "credential status at time `t`":
//!
//! | variant | payload | slots |
//! |---|---|---|
//! | [`Status::Bitmask64`] | one `u64` | 64 |
//! | [`Status::WideBitmask`] | `data_size` × `u256` | `256 * data_size` |
//! | [`Status::Merkle`] | root over `[1..=time]`, padded to `2^height` | `2^height` |
//!
//! All three share one capability set: fixed-width encode/decode, a genesis
//! value, and a pure `advance` that returns a new value with `time + 1`.
//! Bitmask variants set the lowest unset bit (word-major, bit-minor); the
//! Merkle variant re-derives its leaves from `time` alone.
//!
//! Wire layouts (all integers big-endian):
//!
//! - Bitmask64: `time: u64 ‖ bits: u64` (16 bytes)
//! - WideBitmask: `time: u32 ‖ words: u256[data_size]` (`4 + 32 * data_size`)
//! - Merkle: `time: u32 ‖ height: u32 ‖ root: u256 [‖ proof: u256[8]]` (40 or 296)

use crate::artifact::{Groth16Proof, PROOF_BYTES};
use crate::error::StatusError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zkstatus_field::{Fr, U256};
use zkstatus_merkle::{capacity, leaves_at_time, zero_root, MerkleTree, PairHashKind};

/// Bits per wide-bitmask word.
pub const WORD_BITS: usize = 256;

/// Bytes per wide-bitmask word / field element on the wire.
pub const WORD_BYTES: usize = 32;

/// Encoded length of a [`Status::Bitmask64`].
pub const BITMASK64_LEN: usize = 16;

/// Encoded length of a Merkle status without an attached proof.
pub const MERKLE_LEN: usize = 40;

/* ---------------- mechanism / type tags ---------------- */

/// Which status encoding a value (or an oracle entry) uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusMechanism {
    /// Single 64-bit bitmask (`"bsl"`, on-chain index 0).
    #[serde(rename = "bsl")]
    Bitmask64,
    /// Merkle accumulator (`"mt"`, on-chain index 1).
    #[serde(rename = "mt")]
    Merkle,
    /// Multi-word bitmask (`"wbsl"`, on-chain index 2).
    #[serde(rename = "wbsl")]
    WideBitmask,
}

impl StatusMechanism {
    /// Wire/URL name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bitmask64 => "bsl",
            Self::Merkle => "mt",
            Self::WideBitmask => "wbsl",
        }
    }
}

impl fmt::Display for StatusMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusMechanism {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bsl" => Ok(Self::Bitmask64),
            "mt" => Ok(Self::Merkle),
            "wbsl" => Ok(Self::WideBitmask),
            other => Err(format!("unknown status mechanism {other:?}")),
        }
    }
}

/// Which credential lifecycle event the status tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusType {
    /// Issuance events (on-chain index 1).
    Issuance,
    /// Revocation events (on-chain index 2).
    #[default]
    Revocation,
}

impl StatusType {
    /// Wire/URL name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Issuance => "issuance",
            Self::Revocation => "revocation",
        }
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* ---------------- parameters ---------------- */

/// What happens when a Merkle status outgrows `2^height` leaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MerkleOverflowPolicy {
    /// Fail with [`StatusError::MerkleCapacity`].
    #[default]
    Reject,
    /// Keep advancing time; leaves past capacity are dropped.
    Advisory,
}

/// Fixed parameters of a Merkle status space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MerkleParamsWire")]
pub struct MerkleParams {
    height: u32,
    hasher: PairHashKind,
    overflow: MerkleOverflowPolicy,
}

#[derive(Deserialize)]
struct MerkleParamsWire {
    height: u32,
    #[serde(default)]
    hasher: PairHashKind,
    #[serde(default)]
    overflow: MerkleOverflowPolicy,
}

impl TryFrom<MerkleParamsWire> for MerkleParams {
    type Error = StatusError;

    fn try_from(w: MerkleParamsWire) -> Result<Self, Self::Error> {
        Self::new(w.height, w.hasher, w.overflow)
    }
}

impl MerkleParams {
    /// Validated parameters; fails if `height` exceeds the supported maximum.
    pub fn new(
        height: u32,
        hasher: PairHashKind,
        overflow: MerkleOverflowPolicy,
    ) -> Result<Self, StatusError> {
        capacity(height)?;
        Ok(Self {
            height,
            hasher,
            overflow,
        })
    }

    /// Tree height.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Pair hasher used for roots.
    #[inline]
    #[must_use]
    pub const fn hasher(&self) -> PairHashKind {
        self.hasher
    }

    /// Overflow policy.
    #[inline]
    #[must_use]
    pub const fn overflow(&self) -> MerkleOverflowPolicy {
        self.overflow
    }

    /// Leaf capacity `2^height`.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u64 {
        1u64 << self.height
    }
}

/// Variant selector plus its fixed parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mechanism", rename_all = "lowercase")]
pub enum StatusParams {
    /// 64-bit bitmask.
    #[serde(rename = "bsl")]
    Bitmask64,
    /// Wide bitmask of `data_size` words.
    #[serde(rename = "wbsl")]
    WideBitmask {
        /// Number of 256-bit words.
        data_size: usize,
    },
    /// Merkle accumulator.
    #[serde(rename = "mt")]
    Merkle(MerkleParams),
}

impl StatusParams {
    /// Mechanism these parameters describe.
    #[must_use]
    pub const fn mechanism(&self) -> StatusMechanism {
        match self {
            Self::Bitmask64 => StatusMechanism::Bitmask64,
            Self::WideBitmask { .. } => StatusMechanism::WideBitmask,
            Self::Merkle(_) => StatusMechanism::Merkle,
        }
    }

    /// Exact encoded length (without any attached proof).
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        match self {
            Self::Bitmask64 => BITMASK64_LEN,
            Self::WideBitmask { data_size } => 4 + WORD_BYTES * *data_size,
            Self::Merkle(_) => MERKLE_LEN,
        }
    }

    /// Length of the raw payload carried by oracle responses.
    #[must_use]
    pub const fn payload_len(&self) -> usize {
        match self {
            Self::Bitmask64 => 8,
            Self::WideBitmask { data_size } => WORD_BYTES * *data_size,
            Self::Merkle(_) => WORD_BYTES,
        }
    }
}

/* ---------------- Merkle status ---------------- */

/// Merkle status: a fixed-height tree over the leaves `[1..=time]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MerkleStatusWire", into = "MerkleStatusWire")]
pub struct MerkleStatus {
    time: u32,
    params: MerkleParams,
    tree: MerkleTree,
    root: Fr,
    proof: Option<Groth16Proof>,
}

/// Leaves and root are derived, so only the inputs travel.
#[derive(Clone, Serialize, Deserialize)]
struct MerkleStatusWire {
    time: u32,
    params: MerkleParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    proof: Option<Groth16Proof>,
}

impl From<MerkleStatus> for MerkleStatusWire {
    fn from(s: MerkleStatus) -> Self {
        Self {
            time: s.time,
            params: s.params,
            proof: s.proof,
        }
    }
}

impl TryFrom<MerkleStatusWire> for MerkleStatus {
    type Error = StatusError;

    fn try_from(w: MerkleStatusWire) -> Result<Self, Self::Error> {
        let mut s = Self::at_time(w.time, w.params)?;
        s.proof = w.proof;
        Ok(s)
    }
}

impl MerkleStatus {
    /// Genesis: time zero, all-zero leaves.
    #[must_use]
    pub fn genesis(params: MerkleParams) -> Self {
        Self {
            time: 0,
            params,
            tree: MerkleTree::empty(params.height),
            root: zero_root(params.height, &params.hasher),
            proof: None,
        }
    }

    /// Status derived for `time` under `params`, honouring the overflow policy.
    pub fn at_time(time: u32, params: MerkleParams) -> Result<Self, StatusError> {
        let cap = params.capacity();
        let mut kept = time;
        if u64::from(time) > cap {
            match params.overflow {
                MerkleOverflowPolicy::Reject => {
                    return Err(StatusError::MerkleCapacity {
                        time,
                        capacity: cap,
                    })
                }
                MerkleOverflowPolicy::Advisory => {
                    tracing::warn!(time, capacity = cap, "merkle status past capacity; truncating leaves");
                    kept = u32::try_from(cap).unwrap_or(u32::MAX);
                }
            }
        }
        let tree = MerkleTree::new(params.height, leaves_at_time(kept))?;
        let root = tree.root(&params.hasher)?;
        Ok(Self {
            time,
            params,
            tree,
            root,
            proof: None,
        })
    }

    /// Logical time.
    #[inline]
    #[must_use]
    pub const fn time(&self) -> u32 {
        self.time
    }

    /// Tree height.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.tree.height()
    }

    /// Parameters this status was built with.
    #[inline]
    #[must_use]
    pub const fn params(&self) -> MerkleParams {
        self.params
    }

    /// Leaves `[1..=time]` (capped at capacity), without zero padding.
    #[inline]
    #[must_use]
    pub fn leaves(&self) -> &[Fr] {
        self.tree.leaves()
    }

    /// Full `2^height` leaf layer, as the circuits take it.
    #[must_use]
    pub fn padded_leaves(&self) -> Vec<Fr> {
        let mut out = self.leaves().to_vec();
        // capacity <= 2^MAX_HEIGHT always fits usize.
        out.resize(usize::try_from(self.params.capacity()).unwrap_or(usize::MAX), Fr::ZERO);
        out
    }

    /// Tree root.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> Fr {
        self.root
    }

    /// Attached transition proof, if any.
    #[inline]
    #[must_use]
    pub const fn proof(&self) -> Option<&Groth16Proof> {
        self.proof.as_ref()
    }

    /// Same status with `proof` attached.
    #[must_use]
    pub fn with_proof(mut self, proof: Groth16Proof) -> Self {
        self.proof = Some(proof);
        self
    }

    fn advance(&self) -> Result<Self, StatusError> {
        let time = self.time.checked_add(1).ok_or(StatusError::TimeOverflow {
            mechanism: StatusMechanism::Merkle,
        })?;
        Self::at_time(time, self.params)
    }
}

/* ---------------- the union ---------------- */

/// Credential status at a logical time step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mechanism")]
pub enum Status {
    /// One 64-bit word of event bits.
    #[serde(rename = "bsl")]
    Bitmask64 {
        /// Logical time.
        time: u64,
        /// Event bits; bit `i` set means event `i` occurred.
        bits: u64,
    },
    /// `data_size` words of event bits, slot `i` is bit `i % 256` of word `i / 256`.
    #[serde(rename = "wbsl")]
    WideBitmask {
        /// Logical time.
        time: u32,
        /// Event words, length fixed at construction.
        #[serde(with = "zkstatus_field::dec::vec")]
        words: Vec<U256>,
    },
    /// Merkle accumulator status.
    #[serde(rename = "mt")]
    Merkle(MerkleStatus),
}

/// Result of one compact wide-bitmask step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordDelta {
    /// Index of the word that changed.
    pub index: usize,
    /// Word value before the step.
    pub prior_word: U256,
    /// Word value after the step.
    pub changed_word: U256,
    /// Single-bit mask that was set (`changed_word = prior_word | change`).
    pub change: U256,
}

impl Status {
    /// Time zero with an all-zero payload. Idempotent.
    #[must_use]
    pub fn genesis(params: &StatusParams) -> Self {
        match params {
            StatusParams::Bitmask64 => Self::Bitmask64 { time: 0, bits: 0 },
            StatusParams::WideBitmask { data_size } => Self::WideBitmask {
                time: 0,
                words: vec![U256::ZERO; *data_size],
            },
            StatusParams::Merkle(p) => Self::Merkle(MerkleStatus::genesis(*p)),
        }
    }

    /// Mechanism of this value.
    #[must_use]
    pub const fn mechanism(&self) -> StatusMechanism {
        match self {
            Self::Bitmask64 { .. } => StatusMechanism::Bitmask64,
            Self::WideBitmask { .. } => StatusMechanism::WideBitmask,
            Self::Merkle(_) => StatusMechanism::Merkle,
        }
    }

    /// Logical time, widened to `u64`.
    #[must_use]
    pub fn time(&self) -> u64 {
        match self {
            Self::Bitmask64 { time, .. } => *time,
            Self::WideBitmask { time, .. } => u64::from(*time),
            Self::Merkle(m) => u64::from(m.time),
        }
    }

    /// Number of set event bits (leaf count for Merkle statuses).
    #[must_use]
    pub fn popcount(&self) -> usize {
        match self {
            Self::Bitmask64 { bits, .. } => bits.count_ones() as usize,
            Self::WideBitmask { words, .. } => words.iter().map(U256::count_ones).sum(),
            Self::Merkle(m) => m.leaves().iter().filter(|l| !l.is_zero()).count(),
        }
    }

    /// Superset test `self & prev == prev` for bitmask variants.
    ///
    /// Always `false` across variants, across word counts, and for Merkle
    /// statuses (which carry no event bits).
    #[must_use]
    pub fn contains(&self, prev: &Self) -> bool {
        match (self, prev) {
            (Self::Bitmask64 { bits: cur, .. }, Self::Bitmask64 { bits: old, .. }) => {
                cur & old == *old
            }
            (Self::WideBitmask { words: cur, .. }, Self::WideBitmask { words: old, .. }) => {
                cur.len() == old.len() && cur.iter().zip(old).all(|(c, o)| *c & *o == *o)
            }
            _ => false,
        }
    }

    /// Next status: `time + 1` and one more event recorded.
    pub fn advance(&self) -> Result<Self, StatusError> {
        match self {
            Self::Bitmask64 { time, bits } => {
                if *bits == u64::MAX {
                    return Err(StatusError::Exhausted { capacity: 64 });
                }
                let time = time.checked_add(1).ok_or(StatusError::TimeOverflow {
                    mechanism: StatusMechanism::Bitmask64,
                })?;
                let bit = (!*bits).trailing_zeros();
                Ok(Self::Bitmask64 {
                    time,
                    bits: *bits | (1u64 << bit),
                })
            }
            Self::WideBitmask { words, .. } => {
                let delta = self.generate_delta()?;
                let time = self.next_wide_time()?;
                let mut words = words.clone();
                words[delta.index] = delta.changed_word;
                Ok(Self::WideBitmask { time, words })
            }
            Self::Merkle(m) => Ok(Self::Merkle(m.advance()?)),
        }
    }

    /// Compact form of [`Self::advance`] for wide bitmasks: which word
    /// changes and how, without rebuilding the array.
    pub fn generate_delta(&self) -> Result<WordDelta, StatusError> {
        let Self::WideBitmask { words, .. } = self else {
            return Err(StatusError::UnsupportedVariant {
                op: "generate_delta",
                mechanism: self.mechanism(),
            });
        };
        let (index, prior_word) = words
            .iter()
            .enumerate()
            .find(|(_, w)| **w != U256::MAX)
            .map(|(i, w)| (i, *w))
            .ok_or(StatusError::Exhausted {
                capacity: words.len() * WORD_BITS,
            })?;
        let bit = (!prior_word).trailing_zeros();
        let change = U256::from(1u64) << bit;
        Ok(WordDelta {
            index,
            prior_word,
            changed_word: prior_word | change,
            change,
        })
    }

    /// Apply a delta produced by [`Self::generate_delta`] on this status.
    pub fn apply_delta(&self, delta: &WordDelta) -> Result<Self, StatusError> {
        let Self::WideBitmask { words, .. } = self else {
            return Err(StatusError::UnsupportedVariant {
                op: "apply_delta",
                mechanism: self.mechanism(),
            });
        };
        let time = self.next_wide_time()?;
        let mut words = words.clone();
        let slot = words.get_mut(delta.index).ok_or(StatusError::Exhausted {
            capacity: self.capacity_hint(),
        })?;
        *slot |= delta.change;
        Ok(Self::WideBitmask { time, words })
    }

    fn next_wide_time(&self) -> Result<u32, StatusError> {
        let Self::WideBitmask { time, .. } = self else {
            return Err(StatusError::UnsupportedVariant {
                op: "next_wide_time",
                mechanism: self.mechanism(),
            });
        };
        time.checked_add(1).ok_or(StatusError::TimeOverflow {
            mechanism: StatusMechanism::WideBitmask,
        })
    }

    fn capacity_hint(&self) -> usize {
        match self {
            Self::Bitmask64 { .. } => 64,
            Self::WideBitmask { words, .. } => words.len() * WORD_BITS,
            Self::Merkle(m) => usize::try_from(m.params.capacity()).unwrap_or(usize::MAX),
        }
    }

    /// Canonical fixed-width encoding (see module docs).
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Bitmask64 { time, bits } => {
                let mut out = Vec::with_capacity(BITMASK64_LEN);
                out.extend_from_slice(&time.to_be_bytes());
                out.extend_from_slice(&bits.to_be_bytes());
                out
            }
            Self::WideBitmask { time, words } => {
                let mut out = Vec::with_capacity(4 + WORD_BYTES * words.len());
                out.extend_from_slice(&time.to_be_bytes());
                for w in words {
                    out.extend_from_slice(&w.to_be_bytes::<WORD_BYTES>());
                }
                out
            }
            Self::Merkle(m) => {
                let mut out = Vec::with_capacity(MERKLE_LEN + PROOF_BYTES);
                out.extend_from_slice(&m.time.to_be_bytes());
                out.extend_from_slice(&m.params.height.to_be_bytes());
                out.extend_from_slice(&m.root.to_be_bytes());
                if let Some(p) = &m.proof {
                    out.extend_from_slice(&p.to_bytes());
                }
                out
            }
        }
    }

    /// Inverse of [`Self::encode`] under `params`.
    pub fn decode(bytes: &[u8], params: &StatusParams) -> Result<Self, StatusError> {
        let mechanism = params.mechanism();
        let expected = params.encoded_len();
        let length_ok = match params {
            StatusParams::Merkle(_) => {
                bytes.len() == MERKLE_LEN || bytes.len() == MERKLE_LEN + PROOF_BYTES
            }
            _ => bytes.len() == expected,
        };
        if !length_ok {
            return Err(StatusError::LengthMismatch {
                mechanism,
                expected,
                actual: bytes.len(),
            });
        }

        match params {
            StatusParams::Bitmask64 => Ok(Self::Bitmask64 {
                time: be_u64(&bytes[..8]),
                bits: be_u64(&bytes[8..16]),
            }),
            StatusParams::WideBitmask { .. } => Ok(Self::WideBitmask {
                time: be_u32(&bytes[..4]),
                words: bytes[4..]
                    .chunks_exact(WORD_BYTES)
                    .map(U256::from_be_slice)
                    .collect(),
            }),
            StatusParams::Merkle(p) => {
                let time = be_u32(&bytes[..4]);
                let height = be_u32(&bytes[4..8]);
                if height != p.height {
                    return Err(StatusError::HeightMismatch {
                        expected: p.height,
                        actual: height,
                    });
                }
                let root = U256::from_be_slice(&bytes[8..MERKLE_LEN]);
                let mut status = MerkleStatus::at_time(time, *p)?;
                if status.root.value() != root {
                    return Err(StatusError::RootMismatch { time });
                }
                if bytes.len() > MERKLE_LEN {
                    status.proof = Some(Groth16Proof::from_bytes(&bytes[MERKLE_LEN..])?);
                }
                Ok(Self::Merkle(status))
            }
        }
    }

    /// Raw payload as served by oracles (no time field): the `u64` bits,
    /// the word array, or the Merkle root.
    #[must_use]
    pub fn payload_bytes(&self) -> Vec<u8> {
        match self {
            Self::Bitmask64 { bits, .. } => bits.to_be_bytes().to_vec(),
            Self::WideBitmask { words, .. } => words
                .iter()
                .flat_map(|w| w.to_be_bytes::<WORD_BYTES>())
                .collect(),
            Self::Merkle(m) => m.root.to_be_bytes().to_vec(),
        }
    }

    /// Rebuild a status from an oracle payload at `time`.
    ///
    /// Merkle payloads are the root; it must equal the root derived for `time`.
    pub fn from_payload(time: u64, payload: &[u8], params: &StatusParams) -> Result<Self, StatusError> {
        let mechanism = params.mechanism();
        let expected = params.payload_len();
        if payload.len() != expected {
            return Err(StatusError::LengthMismatch {
                mechanism,
                expected,
                actual: payload.len(),
            });
        }
        let narrow_time =
            || u32::try_from(time).map_err(|_| StatusError::TimeOverflow { mechanism });

        match params {
            StatusParams::Bitmask64 => Ok(Self::Bitmask64 {
                time,
                bits: be_u64(payload),
            }),
            StatusParams::WideBitmask { .. } => Ok(Self::WideBitmask {
                time: narrow_time()?,
                words: payload.chunks_exact(WORD_BYTES).map(U256::from_be_slice).collect(),
            }),
            StatusParams::Merkle(p) => {
                let time = narrow_time()?;
                let status = MerkleStatus::at_time(time, *p)?;
                if status.root.value() != U256::from_be_slice(payload) {
                    return Err(StatusError::RootMismatch { time });
                }
                Ok(Self::Merkle(status))
            }
        }
    }

    /// Merkle view, if this is a Merkle status.
    #[must_use]
    pub const fn as_merkle(&self) -> Option<&MerkleStatus> {
        match self {
            Self::Merkle(m) => Some(m),
            _ => None,
        }
    }

    /// Merkle root, if this is a Merkle status.
    #[must_use]
    pub const fn root(&self) -> Option<Fr> {
        match self {
            Self::Merkle(m) => Some(m.root),
            _ => None,
        }
    }

    /// Attach a transition proof (Merkle statuses only).
    pub fn attach_proof(self, proof: Groth16Proof) -> Result<Self, StatusError> {
        match self {
            Self::Merkle(m) => Ok(Self::Merkle(m.with_proof(proof))),
            other => Err(StatusError::UnsupportedVariant {
                op: "attach_proof",
                mechanism: other.mechanism(),
            }),
        }
    }

    /// Status words as 256-bit integers: `[bits]`, the word array, or `[root]`.
    #[must_use]
    pub fn words(&self) -> Vec<U256> {
        match self {
            Self::Bitmask64 { bits, .. } => vec![U256::from(*bits)],
            Self::WideBitmask { words, .. } => words.clone(),
            Self::Merkle(m) => vec![m.root.value()],
        }
    }
}

/// Decode an oracle text payload: `0x`-prefixed hex, otherwise standard base64.
pub fn decode_text(s: &str) -> Result<Vec<u8>, StatusError> {
    let s = s.trim();
    if let Some(h) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return hex::decode(h).map_err(|e| StatusError::InvalidEncoding(format!("hex: {e}")));
    }
    STANDARD
        .decode(s)
        .map_err(|e| StatusError::InvalidEncoding(format!("base64: {e}")))
}

/// Inverse of [`decode_text`] in the requested form.
#[must_use]
pub fn encode_text(bytes: &[u8], as_hex: bool) -> String {
    if as_hex {
        format!("0x{}", hex::encode(bytes))
    } else {
        STANDARD.encode(bytes)
    }
}

#[inline]
fn be_u64(b: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&b[..8]);
    u64::from_be_bytes(buf)
}

#[inline]
fn be_u32(b: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&b[..4]);
    u32::from_be_bytes(buf)
}
