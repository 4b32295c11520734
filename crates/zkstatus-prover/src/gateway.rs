//! The [`ProverGateway`] trait and its call inputs.

use crate::error::ProverError;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use zkstatus_core::{CircuitKind, Groth16Proof, ProofArtifact, ProverConfig};

/// Canonical prover input bytes (the JSON written to `input.json`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProverInput {
    bytes: Vec<u8>,
}

impl ProverInput {
    /// Wrap already-canonical JSON bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Serialize `value` as pretty JSON.
    pub fn from_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ProverError> {
        Ok(Self::new(serde_json::to_vec_pretty(value)?))
    }

    /// Raw bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// BLAKE3 digest of the bytes.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        *blake3::hash(&self.bytes).as_bytes()
    }
}

/// Per-call options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    /// Wall-clock limit for the call.
    pub timeout: Duration,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
        }
    }
}

impl CallOptions {
    /// Options with the given timeout.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Options from the `[prover]` config section.
    #[must_use]
    pub const fn from_config(cfg: &ProverConfig) -> Self {
        Self::with_timeout(cfg.timeout())
    }
}

/// Async boundary to a Groth16 prover.
///
/// ## Contracts implementors should uphold
/// - `Unknown` circuits are rejected with [`ProverError::UnknownCircuit`]
///   before any work starts.
/// - A call that exceeds `opts.timeout` returns [`ProverError::Timeout`] and
///   leaves no partial output behind.
/// - `verify` returns `Ok(false)` for a well-formed but invalid proof; `Err`
///   is reserved for failures to run the check at all.
#[async_trait]
pub trait ProverGateway: Send + Sync {
    /// Generate proving and verifying keys for `circuit`.
    async fn setup(&self, circuit: CircuitKind, opts: CallOptions) -> Result<(), ProverError>;

    /// Prove `input` under `circuit`.
    async fn prove(
        &self,
        circuit: CircuitKind,
        input: &ProverInput,
        opts: CallOptions,
    ) -> Result<Groth16Proof, ProverError>;

    /// Check `proof` against `input` under `circuit`.
    async fn verify(
        &self,
        circuit: CircuitKind,
        proof: &Groth16Proof,
        input: &ProverInput,
        opts: CallOptions,
    ) -> Result<bool, ProverError>;

    /// Emit the Solidity verifier for `circuit`.
    ///
    /// If `destination` is an existing directory the file is named
    /// `<Circuit>Verifier.sol` inside it. Returns the final path.
    async fn export_verifier(
        &self,
        circuit: CircuitKind,
        destination: &Path,
        opts: CallOptions,
    ) -> Result<PathBuf, ProverError>;
}

/// Prove and bind the result to the digest of its input.
pub async fn prove_artifact<G: ProverGateway + ?Sized>(
    gateway: &G,
    circuit: CircuitKind,
    input: &ProverInput,
    opts: CallOptions,
) -> Result<ProofArtifact, ProverError> {
    let proof = gateway.prove(circuit, input, opts).await?;
    Ok(ProofArtifact::new(
        circuit,
        input.digest(),
        proof,
        serde_json::json!({ "input_bytes": input.bytes().len() }),
    ))
}

pub(crate) fn ensure_known(circuit: CircuitKind) -> Result<(), ProverError> {
    if circuit == CircuitKind::Unknown {
        return Err(ProverError::UnknownCircuit(circuit.name().to_owned()));
    }
    Ok(())
}

/// Final verifier path for `destination`.
pub(crate) fn verifier_path(circuit: CircuitKind, destination: &Path) -> PathBuf {
    if destination.is_dir() {
        destination.join(circuit.verifier_file_name())
    } else {
        destination.to_path_buf()
    }
}

/// Write `bytes` to a temp sibling and rename it over `path`.
pub(crate) async fn write_file_atomic(path: &Path, bytes: &[u8]) -> Result<(), ProverError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(ProverError::io(parent))?;
    }
    let tmp = zkstatus_core::io::tmp_sibling(path);
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(ProverError::io(&tmp))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(ProverError::io(path)(e));
    }
    Ok(())
}
