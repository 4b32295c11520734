//! Canonical prover-input JSON.
//!
//! Wire structs below are the only things serialized: their field order is
//! the key order, and every integer is already a decimal string.

use crate::error::ReportError;
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use tracing::info;
use zkstatus_core::{io::write_atomic, CircuitKind, Status, U256};
use zkstatus_field::dec;

/// Something the external prover can consume.
pub trait CircuitInput {
    /// Serializable wire shape.
    type Export: Serialize;

    /// Circuit this input is for.
    fn circuit(&self) -> CircuitKind;

    /// Wire shape for [`Self::circuit`].
    fn export(&self) -> Self::Export;

    /// Canonical JSON bytes (pretty, stable key order).
    fn export_json(&self) -> Result<Vec<u8>, ReportError> {
        Ok(serde_json::to_vec_pretty(&self.export())?)
    }
}

/// Write `input` atomically to `path` as canonical JSON.
pub fn write_prover_input<I: CircuitInput, P: AsRef<Path>>(input: &I, path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    let bytes = input.export_json()?;
    write_atomic(path, &bytes)
        .with_context(|| format!("write {} input", input.circuit()))?;
    info!(circuit = %input.circuit(), path = %path.display(), bytes = bytes.len(), "wrote prover input");
    Ok(())
}

/* ---------- value helpers ---------- */

pub(crate) fn d_u64(v: u64) -> String {
    v.to_string()
}

pub(crate) fn d_u256(v: &U256) -> String {
    dec::to_string(v)
}

/// Status words as decimal strings (`[bits]`, the word array, or `[root]`).
pub(crate) fn words(s: &Status) -> Vec<String> {
    s.words().iter().map(d_u256).collect()
}

/// Zero-padded Merkle leaf layer as decimal strings (empty for bitmask statuses).
pub(crate) fn leaves(s: &Status) -> Vec<String> {
    s.as_merkle()
        .map(|m| m.padded_leaves().iter().map(|l| d_u256(&l.value())).collect())
        .unwrap_or_default()
}

/// Scalar for 64-bit bitmasks, word array for wide bitmasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatusValue {
    /// Single field element.
    Scalar(String),
    /// Array of field elements.
    Words(Vec<String>),
}

impl StatusValue {
    pub(crate) fn of(s: &Status) -> Self {
        match s {
            Status::Bitmask64 { bits, .. } => Self::Scalar(d_u64(*bits)),
            other => Self::Words(words(other)),
        }
    }
}

/* ---------- wire shapes ---------- */

/// `StateTransition` / `BigStateTransition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BitmaskTransitionJson {
    /// Times of the middle statuses.
    pub middle_times: Vec<String>,
    /// Middle statuses.
    pub middle_statuses: Vec<StatusValue>,
    /// `[start, end]` times.
    pub transition_time: [String; 2],
    /// `[start, end]` statuses.
    pub transition_status: [StatusValue; 2],
}

/// `MTStateTransition` / `SingleMTStateTransition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleTransitionJson {
    /// Time of every status in the chain.
    pub transition_time: Vec<String>,
    /// Root of every status in the chain.
    pub transition_status: Vec<String>,
    /// Leaf layer of every status in the chain.
    pub transition_leaves: Vec<Vec<String>>,
}

/// Either transition shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TransitionJson {
    /// Bitmask chain.
    Bitmask(BitmaskTransitionJson),
    /// Merkle chain.
    Merkle(MerkleTransitionJson),
}

/// `AggBSLStateReport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggBitmaskJson {
    /// Final report middle times.
    pub final_middle_times: Vec<String>,
    /// Final report middle statuses.
    pub final_middle_statuses: Vec<Vec<String>>,
    /// Final report `[start, end]` times.
    pub final_transition_time: [String; 2],
    /// Final report `[start, end]` statuses.
    pub final_transition_status: [Vec<String>; 2],
    /// Per oracle: middle times then end time.
    pub report_times: Vec<Vec<String>>,
    /// Per oracle: middle statuses then end status.
    pub report_statuses: Vec<Vec<Vec<String>>>,
    /// Presence bitmap over oracles.
    pub indicator: String,
    /// Fault tolerance.
    pub f: String,
}

/// `AggMTStateReport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggMerkleJson {
    /// Final chain times.
    pub final_transition_time: Vec<String>,
    /// Final chain roots.
    pub final_transition_status: Vec<String>,
    /// Final chain leaf layers.
    pub final_transition_leaves: Vec<Vec<String>>,
    /// Per oracle chain times.
    pub report_transition_time: Vec<Vec<String>>,
    /// Per oracle chain roots.
    pub report_transition_status: Vec<Vec<String>>,
    /// Per oracle chain leaf layers.
    pub report_transition_leaves: Vec<Vec<Vec<String>>>,
    /// Presence bitmap over oracles.
    pub indicator: String,
    /// Fault tolerance.
    pub f: String,
}

/// Either aggregate shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AggregateJson {
    /// Bitmask aggregate.
    Bitmask(AggBitmaskJson),
    /// Merkle aggregate.
    Merkle(AggMerkleJson),
}

/// `AggCBSLStateReport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactJson {
    /// Time of the starting status.
    pub previous_time: String,
    /// Words of the starting status.
    pub previous_statuses: Vec<String>,
    /// Time after each final step.
    pub final_transition_times: Vec<String>,
    /// Word index changed by each final step.
    pub final_transition_indexes: Vec<String>,
    /// Single-bit change mask of each final step.
    pub final_transition_changes: Vec<String>,
    /// Per oracle step times.
    pub report_times: Vec<Vec<String>>,
    /// Per oracle word indexes.
    pub report_indexes: Vec<Vec<String>>,
    /// Per oracle change masks.
    pub report_changes: Vec<Vec<String>>,
    /// Presence bitmap over oracles.
    pub indicator: String,
    /// Fault tolerance.
    pub f: String,
}

/// Serde adapter writing any `Display + FromStr` integer as a decimal string.
pub(crate) mod decimal {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T: Display, S: Serializer>(v: &T, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(v)
    }

    pub fn deserialize<'de, T, D>(d: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        s.parse().map_err(D::Error::custom)
    }
}
