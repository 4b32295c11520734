//! Why a source's chain was cut short.
//!
//! None of these are fatal to aggregation: the entries before the offending
//! one are kept and the source simply contributes a shorter chain.

use zkstatus_core::{StatusError, StatusMechanism};

/// First violation found while walking a source's entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Bitmask entry drops a bit that was already set.
    #[error("entry {index} (time {time}) is not a superset of its predecessor")]
    NotSuperset {
        /// Position in the source's list.
        index: usize,
        /// Entry time.
        time: u64,
    },
    /// Merkle entry does not move time forward.
    #[error("entry {index} has time {time}, not after {previous}")]
    TimeRegression {
        /// Position in the source's list.
        index: usize,
        /// Time of the last accepted status.
        previous: u64,
        /// Entry time.
        time: u64,
    },
    /// Merkle entry root differs from the root derived for its time.
    #[error("entry {index} root does not match the tree for time {time}")]
    RootMismatch {
        /// Position in the source's list.
        index: usize,
        /// Entry time.
        time: u64,
    },
    /// Entry reports a different mechanism than configured.
    #[error("entry {index} is a {actual} status, expected {expected}")]
    MechanismMismatch {
        /// Position in the source's list.
        index: usize,
        /// Configured mechanism.
        expected: StatusMechanism,
        /// Entry mechanism.
        actual: StatusMechanism,
    },
    /// Entry payload could not be decoded.
    #[error("entry {index} is undecodable: {source}")]
    Undecodable {
        /// Position in the source's list.
        index: usize,
        /// Underlying codec error.
        #[source]
        source: StatusError,
    },
}

impl ValidationError {
    /// Position of the rejected entry.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::NotSuperset { index, .. }
            | Self::TimeRegression { index, .. }
            | Self::RootMismatch { index, .. }
            | Self::MechanismMismatch { index, .. }
            | Self::Undecodable { index, .. } => *index,
        }
    }

    /// Classify a decode failure of entry `index` at `time`.
    pub(crate) fn from_decode(index: usize, time: u64, err: StatusError) -> Self {
        match err {
            StatusError::RootMismatch { .. } => Self::RootMismatch { index, time },
            StatusError::MechanismMismatch { expected, actual } => Self::MechanismMismatch {
                index,
                expected,
                actual,
            },
            source => Self::Undecodable { index, source },
        }
    }
}
