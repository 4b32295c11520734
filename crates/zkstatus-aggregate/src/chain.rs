//! Chain validation and canonical selection.

use crate::entry::SourceResponseEntry;
use crate::error::ValidationError;
use tracing::debug;
use zkstatus_core::{Status, StatusParams};

/// Valid prefix of one source's entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidChain {
    /// Accepted statuses, in order.
    pub statuses: Vec<Status>,
    /// Why the walk stopped early, if it did.
    pub rejection: Option<ValidationError>,
}

impl ValidChain {
    /// Number of accepted statuses.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// True when nothing was accepted.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Most recent accepted status.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&Status> {
        self.statuses.last()
    }
}

impl AsRef<[Status]> for ValidChain {
    fn as_ref(&self) -> &[Status] {
        &self.statuses
    }
}

/// Outcome of [`select_canonical`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonical {
    /// Index of the winning source; `None` when every chain was empty.
    pub source: Option<usize>,
    /// Last status of the winning chain, or genesis.
    pub status: Status,
}

/// Walk `entries` from `last_known`, keeping the longest valid prefix.
///
/// Bitmask entries must be supersets of their predecessor
/// (`decoded & prev == prev`). Merkle entries must move time forward and carry
/// the root derived for their time. The first violation stops the walk; the
/// violating entry and everything after it are dropped.
#[must_use]
pub fn validate_chain(
    entries: &[SourceResponseEntry],
    last_known: &Status,
    params: &StatusParams,
) -> ValidChain {
    let mut statuses: Vec<Status> = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let prev = statuses.last().unwrap_or(last_known);
        let decoded = match entry.decode_status(params) {
            Ok(s) => s,
            Err(e) => {
                return truncated(statuses, ValidationError::from_decode(index, entry.time, e))
            }
        };

        let violation = match params {
            StatusParams::Merkle(_) => (decoded.time() <= prev.time()).then(|| {
                ValidationError::TimeRegression {
                    index,
                    previous: prev.time(),
                    time: decoded.time(),
                }
            }),
            StatusParams::Bitmask64 | StatusParams::WideBitmask { .. } => {
                (!decoded.contains(prev)).then_some(ValidationError::NotSuperset {
                    index,
                    time: decoded.time(),
                })
            }
        };
        if let Some(v) = violation {
            return truncated(statuses, v);
        }
        statuses.push(decoded);
    }

    ValidChain {
        statuses,
        rejection: None,
    }
}

fn truncated(statuses: Vec<Status>, rejection: ValidationError) -> ValidChain {
    debug!(kept = statuses.len(), reason = %rejection, "chain truncated");
    ValidChain {
        statuses,
        rejection: Some(rejection),
    }
}

/// Pick the longest chain; on ties the lowest index wins.
#[must_use]
pub fn select_canonical(chains: &[ValidChain], params: &StatusParams) -> Canonical {
    let mut best: Option<(usize, &Status)> = None;
    let mut best_len = 0usize;
    for (i, chain) in chains.iter().enumerate() {
        if chain.len() > best_len {
            if let Some(last) = chain.last() {
                best = Some((i, last));
                best_len = chain.len();
            }
        }
    }
    match best {
        Some((i, status)) => Canonical {
            source: Some(i),
            status: status.clone(),
        },
        None => Canonical {
            source: None,
            status: Status::genesis(params),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkstatus_core::StatusType;

    #[track_caller]
    fn entry(time: u64, bits: u64) -> SourceResponseEntry {
        SourceResponseEntry::from_status(&Status::Bitmask64 { time, bits }, StatusType::Revocation)
    }

    #[track_caller]
    fn chain_of(len: usize, tag: u64) -> ValidChain {
        ValidChain {
            statuses: (1..=len as u64)
                .map(|t| Status::Bitmask64 { time: t, bits: tag })
                .collect(),
            rejection: None,
        }
    }

    #[test]
    fn second_entry_violates_keeps_one() {
        let genesis = Status::genesis(&StatusParams::Bitmask64);
        let entries = [entry(1, 0b01), entry(2, 0b10)];
        let v = validate_chain(&entries, &genesis, &StatusParams::Bitmask64);
        assert_eq!(v.len(), 1);
        assert_eq!(
            v.rejection,
            Some(ValidationError::NotSuperset { index: 1, time: 2 })
        );
    }

    #[test]
    fn undecodable_entry_stops_walk() {
        let genesis = Status::genesis(&StatusParams::Bitmask64);
        let mut bad = entry(2, 0b11);
        bad.status = "0x01".into();
        let entries = [entry(1, 0b01), bad, entry(3, 0b111)];
        let v = validate_chain(&entries, &genesis, &StatusParams::Bitmask64);
        assert_eq!(v.len(), 1);
        assert!(matches!(
            v.rejection,
            Some(ValidationError::Undecodable { index: 1, .. })
        ));
    }

    #[test]
    fn longest_wins_and_ties_go_low() {
        let chains = [chain_of(3, 1), chain_of(5, 2), chain_of(5, 3)];
        let c = select_canonical(&chains, &StatusParams::Bitmask64);
        assert_eq!(c.source, Some(1));
        assert_eq!(c.status, Status::Bitmask64 { time: 5, bits: 2 });
    }

    #[test]
    fn all_empty_gives_genesis() {
        let chains = [ValidChain::default(), ValidChain::default()];
        let c = select_canonical(&chains, &StatusParams::WideBitmask { data_size: 2 });
        assert_eq!(c.source, None);
        assert_eq!(c.status, Status::genesis(&StatusParams::WideBitmask { data_size: 2 }));
        assert_eq!(select_canonical(&[], &StatusParams::Bitmask64).source, None);
    }
}
