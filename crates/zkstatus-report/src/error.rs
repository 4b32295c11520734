//! Report construction errors.

use zkstatus_core::{StatusError, StatusMechanism};

/// Why a set of statuses cannot become circuit input.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Aggregate built from zero oracle reports.
    #[error("aggregate report needs at least one oracle report")]
    EmptyInput,
    /// Transition needs a start and an end status.
    #[error("transition needs at least two statuses, got {len}")]
    ChainTooShort {
        /// Number of statuses supplied.
        len: usize,
    },
    /// Statuses of different mechanisms in one input.
    #[error("mixed status mechanisms: expected {expected}, got {actual}")]
    MixedVariants {
        /// Mechanism of the first status.
        expected: StatusMechanism,
        /// Offending mechanism.
        actual: StatusMechanism,
    },
    /// Indicator is a 256-bit word.
    #[error("{count} oracle reports exceed the maximum of {max}")]
    TooManyReports {
        /// Reports supplied.
        count: usize,
        /// Indicator width.
        max: usize,
    },
    /// Indicator bit outside the report range.
    #[error("indicator index {index} out of range for {len} reports")]
    IndicatorOutOfRange {
        /// Requested bit.
        index: usize,
        /// Number of reports.
        len: usize,
    },
    /// Oracle report length differs from the final report.
    #[error("oracle report has {actual} steps, expected {expected}")]
    ShapeMismatch {
        /// Steps in the final report.
        expected: usize,
        /// Steps in the oracle report.
        actual: usize,
    },
    /// Oracle Merkle report built over a different tree height.
    #[error("oracle report tree height {actual}, expected {expected}")]
    HeightMismatch {
        /// Height of the final report's trees.
        expected: u32,
        /// Height of the oracle report's trees.
        actual: u32,
    },
    /// Input family not defined for this mechanism.
    #[error("{op} is not supported for {mechanism} statuses")]
    UnsupportedVariant {
        /// Input family.
        op: &'static str,
        /// Mechanism supplied.
        mechanism: StatusMechanism,
    },
    /// Underlying status operation failed.
    #[error(transparent)]
    Status(#[from] StatusError),
    /// JSON export failed.
    #[error("serialize prover input: {0}")]
    Json(#[from] serde_json::Error),
}
