//! Oracle wire contract: query URL and response entries.
//!
//! An oracle is queried with
//! `GET {domain}/statuses/{mechanism}/{type}?time={last_time}` and answers a
//! JSON array of [`SourceResponseEntry`]. The `status` field carries the raw
//! payload (bitmask bits, word array, or Merkle root) as base64, or as hex
//! when prefixed with `0x`.

use serde::{Deserialize, Serialize};
use zkstatus_core::{
    decode_text, encode_text, Status, StatusError, StatusMechanism, StatusParams, StatusType,
};

/// One status as reported by an oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceResponseEntry {
    /// Logical time.
    pub time: u64,
    /// Mechanism the payload is encoded for.
    pub status_mechanism: StatusMechanism,
    /// Event type tracked.
    pub status_type: StatusType,
    /// Text-encoded payload.
    pub status: String,
    /// Optional oracle-supplied proof; carried through, not checked here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<String>,
}

impl SourceResponseEntry {
    /// Entry an oracle would serve for `status` (base64 payload).
    #[must_use]
    pub fn from_status(status: &Status, status_type: StatusType) -> Self {
        Self {
            time: status.time(),
            status_mechanism: status.mechanism(),
            status_type,
            status: encode_text(&status.payload_bytes(), false),
            proof: None,
        }
    }

    /// Decode the payload under `params`.
    pub fn decode_status(&self, params: &StatusParams) -> Result<Status, StatusError> {
        let expected = params.mechanism();
        if self.status_mechanism != expected {
            return Err(StatusError::MechanismMismatch {
                expected,
                actual: self.status_mechanism,
            });
        }
        let bytes = decode_text(&self.status)?;
        Status::from_payload(self.time, &bytes, params)
    }
}

/// Parameters of one oracle status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleQuery {
    /// Oracle base URL, e.g. `http://localhost:8000`.
    pub domain: String,
    /// Mechanism requested.
    pub mechanism: StatusMechanism,
    /// Event type requested.
    pub status_type: StatusType,
    /// Time of the last known status; the oracle returns newer entries.
    pub last_time: u64,
}

impl OracleQuery {
    /// Rendered request URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "{}/statuses/{}/{}?time={}",
            self.domain.trim_end_matches('/'),
            self.mechanism,
            self.status_type,
            self.last_time
        )
    }
}

/// Parse an oracle response body, ordered by time (stable for equal times).
pub fn parse_source_response(json: &str) -> Result<Vec<SourceResponseEntry>, serde_json::Error> {
    let mut entries: Vec<SourceResponseEntry> = serde_json::from_str(json)?;
    entries.sort_by_key(|e| e.time);
    Ok(entries)
}
