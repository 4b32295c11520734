//! Prover gateway errors. All are surfaced to the caller; none are retried.

use std::path::PathBuf;
use std::time::Duration;
use zkstatus_core::ProofLengthError;

/// Failure of a prover call.
#[derive(Debug, thiserror::Error)]
pub enum ProverError {
    /// Circuit name the prover does not know.
    #[error("unknown circuit {0:?}")]
    UnknownCircuit(String),
    /// The prover program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// OS error.
        #[source]
        source: std::io::Error,
    },
    /// The prover exited unsuccessfully.
    #[error("{command} exited with {code:?}: {stderr}")]
    NonZeroExit {
        /// Rendered command line.
        command: String,
        /// Exit code (`None` if killed by a signal).
        code: Option<i32>,
        /// Captured error output.
        stderr: String,
    },
    /// The call exceeded its timeout; the child was killed.
    #[error("{command} timed out after {after:?}")]
    Timeout {
        /// Rendered command line.
        command: String,
        /// Timeout that elapsed.
        after: Duration,
    },
    /// Proof file is not 8 × 32 bytes.
    #[error("malformed proof: {0}")]
    MalformedProof(#[from] ProofLengthError),
    /// Filesystem error on an input, proof, or verifier file.
    #[error("i/o on {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// OS error.
        #[source]
        source: std::io::Error,
    },
    /// Input could not be serialized.
    #[error("serialize prover input: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ProverError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
