//! Single-chain transition inputs.

use crate::error::ReportError;
use crate::export::{
    d_u64, leaves, words, BitmaskTransitionJson, CircuitInput, MerkleTransitionJson, StatusValue,
    TransitionJson,
};
use zkstatus_core::{CircuitKind, Status, StatusMechanism};

/// A chain `s0 -> s1 -> ... -> sN` split as `(s0, [s1..sN-1], sN)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionInputs {
    start: Status,
    middle: Vec<Status>,
    end: Status,
}

impl TransitionInputs {
    /// Split `statuses` (at least two, one mechanism) into endpoints and middle.
    pub fn build(statuses: &[Status]) -> Result<Self, ReportError> {
        let [start, rest @ .., end] = statuses else {
            return Err(ReportError::ChainTooShort {
                len: statuses.len(),
            });
        };
        let expected = start.mechanism();
        if let Some(bad) = statuses.iter().find(|s| s.mechanism() != expected) {
            return Err(ReportError::MixedVariants {
                expected,
                actual: bad.mechanism(),
            });
        }
        Ok(Self {
            start: start.clone(),
            middle: rest.to_vec(),
            end: end.clone(),
        })
    }

    /// First status.
    #[must_use]
    pub const fn start(&self) -> &Status {
        &self.start
    }

    /// Statuses strictly between the endpoints.
    #[must_use]
    pub fn middle(&self) -> &[Status] {
        &self.middle
    }

    /// Last status.
    #[must_use]
    pub const fn end(&self) -> &Status {
        &self.end
    }

    /// Mechanism shared by every status.
    #[must_use]
    pub const fn mechanism(&self) -> StatusMechanism {
        self.start.mechanism()
    }

    /// Every status in chain order.
    pub fn statuses(&self) -> impl Iterator<Item = &Status> + '_ {
        std::iter::once(&self.start)
            .chain(self.middle.iter())
            .chain(std::iter::once(&self.end))
    }

    /// Number of statuses, endpoints included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middle.len() + 2
    }

    /// Always false; a transition has at least two statuses.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    pub(crate) fn merkle_json(&self) -> MerkleTransitionJson {
        MerkleTransitionJson {
            transition_time: self.statuses().map(|s| d_u64(s.time())).collect(),
            transition_status: self.statuses().flat_map(words).collect(),
            transition_leaves: self.statuses().map(leaves).collect(),
        }
    }

    /// Middle times followed by the end time.
    pub(crate) fn report_times(&self) -> Vec<String> {
        self.statuses().skip(1).map(|s| d_u64(s.time())).collect()
    }

    /// Middle statuses followed by the end status, as word arrays.
    pub(crate) fn report_statuses(&self) -> Vec<Vec<String>> {
        self.statuses().skip(1).map(words).collect()
    }
}

impl CircuitInput for TransitionInputs {
    type Export = TransitionJson;

    fn circuit(&self) -> CircuitKind {
        match self.mechanism() {
            StatusMechanism::Bitmask64 => CircuitKind::StateTransition,
            StatusMechanism::WideBitmask => CircuitKind::BigStateTransition,
            StatusMechanism::Merkle if self.middle.is_empty() => {
                CircuitKind::SingleMtStateTransition
            }
            StatusMechanism::Merkle => CircuitKind::MtStateTransition,
        }
    }

    fn export(&self) -> TransitionJson {
        if self.mechanism() == StatusMechanism::Merkle {
            return TransitionJson::Merkle(self.merkle_json());
        }
        TransitionJson::Bitmask(BitmaskTransitionJson {
            middle_times: self.middle.iter().map(|s| d_u64(s.time())).collect(),
            middle_statuses: self.middle.iter().map(StatusValue::of).collect(),
            transition_time: [d_u64(self.start.time()), d_u64(self.end.time())],
            transition_status: [StatusValue::of(&self.start), StatusValue::of(&self.end)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkstatus_core::StatusParams;

    #[track_caller]
    fn chain(params: &StatusParams, n: usize) -> Vec<Status> {
        let mut out = vec![Status::genesis(params)];
        for _ in 0..n {
            let next = out.last().unwrap().advance().unwrap();
            out.push(next);
        }
        out
    }

    #[test]
    fn splits_middle_and_endpoints() {
        let c = chain(&StatusParams::Bitmask64, 3);
        let t = TransitionInputs::build(&c).unwrap();
        assert_eq!(t.start(), &c[0]);
        assert_eq!(t.middle(), &c[1..3]);
        assert_eq!(t.end(), &c[3]);
        assert_eq!(t.len(), 4);
        assert_eq!(t.circuit(), CircuitKind::StateTransition);
    }

    #[test]
    fn too_short_and_mixed() {
        let c = chain(&StatusParams::Bitmask64, 0);
        assert!(matches!(
            TransitionInputs::build(&c),
            Err(ReportError::ChainTooShort { len: 1 })
        ));
        let mixed = vec![
            Status::genesis(&StatusParams::Bitmask64),
            Status::genesis(&StatusParams::WideBitmask { data_size: 1 }),
        ];
        assert!(matches!(
            TransitionInputs::build(&mixed),
            Err(ReportError::MixedVariants {
                expected: StatusMechanism::Bitmask64,
                actual: StatusMechanism::WideBitmask,
            })
        ));
    }

    #[test]
    fn bitmask_export_keys_and_values() {
        let t = TransitionInputs::build(&chain(&StatusParams::Bitmask64, 2)).unwrap();
        let bytes = t.export_json().unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        let pos: Vec<usize> = ["middleTimes", "middleStatuses", "transitionTime", "transitionStatus"]
            .iter()
            .map(|k| text.find(&format!("\"{k}\"")).unwrap())
            .collect();
        assert!(pos.windows(2).all(|w| w[0] < w[1]), "keys out of order: {text}");
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["middleTimes"], serde_json::json!(["1"]));
        assert_eq!(v["middleStatuses"], serde_json::json!(["1"]));
        assert_eq!(v["transitionTime"], serde_json::json!(["0", "2"]));
        assert_eq!(v["transitionStatus"], serde_json::json!(["0", "3"]));
    }

    #[test]
    fn wide_export_uses_word_arrays() {
        let t = TransitionInputs::build(&chain(&StatusParams::WideBitmask { data_size: 2 }, 1))
            .unwrap();
        assert_eq!(t.circuit(), CircuitKind::BigStateTransition);
        let TransitionJson::Bitmask(j) = t.export() else {
            panic!("expected bitmask shape");
        };
        assert!(j.middle_times.is_empty());
        assert_eq!(
            j.transition_status[1],
            StatusValue::Words(vec!["1".into(), "0".into()])
        );
    }
}
