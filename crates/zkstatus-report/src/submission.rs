//! On-chain submission payload.

use crate::aggregate::AggregateReport;
use crate::compact::CompactAggregateInputs;
use crate::error::ReportError;
use crate::export::decimal;
use crate::transition::TransitionInputs;
use serde::{Deserialize, Serialize};
use zkstatus_core::{Groth16Proof, Status, StatusMechanism, U256};
use zkstatus_field::dec;

/// What the registry contract receives once a proof exists.
///
/// `status_or_root` is variant-specific: `[bits]` for 64-bit bitmasks, the
/// word array for wide bitmasks, `[root]` for Merkle statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    /// Mechanism of the submitted status.
    pub mechanism: StatusMechanism,
    /// Time of the submitted status.
    #[serde(with = "decimal")]
    pub time: u64,
    /// Status payload words.
    #[serde(with = "dec::vec")]
    pub status_or_root: Vec<U256>,
    /// Groth16 proof in calldata order.
    pub proof: Groth16Proof,
    /// Oracle presence bitmap (zero for single transitions).
    #[serde(with = "dec")]
    pub indicator: U256,
    /// Fault tolerance (zero for single transitions).
    #[serde(with = "decimal")]
    pub fault_tolerance: u32,
}

impl SubmissionPayload {
    fn of(status: &Status, proof: Groth16Proof, indicator: U256, fault_tolerance: u32) -> Self {
        Self {
            mechanism: status.mechanism(),
            time: status.time(),
            status_or_root: status.words(),
            proof,
            indicator,
            fault_tolerance,
        }
    }

    /// Payload for a proven single transition.
    #[must_use]
    pub fn for_transition(t: &TransitionInputs, proof: Groth16Proof) -> Self {
        Self::of(t.end(), proof, U256::ZERO, 0)
    }

    /// Payload for a proven aggregate.
    #[must_use]
    pub fn for_aggregate(r: &AggregateReport, proof: Groth16Proof) -> Self {
        Self::of(r.final_report().end(), proof, r.indicator(), r.f())
    }

    /// Payload for a proven compact aggregate (status after every step).
    pub fn for_compact(c: &CompactAggregateInputs, proof: Groth16Proof) -> Result<Self, ReportError> {
        Ok(Self::of(&c.final_status()?, proof, c.indicator(), c.f()))
    }
}
