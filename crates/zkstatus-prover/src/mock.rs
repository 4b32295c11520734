//! Deterministic in-process prover.
//!
//! Proofs are BLAKE3 XOF output over `(circuit, input)`, reduced into the
//! scalar field element by element. The same input always yields the same
//! proof, and `verify` accepts exactly the proofs `prove` would return.

use crate::error::ProverError;
use crate::gateway::{
    ensure_known, verifier_path, write_file_atomic, CallOptions, ProverGateway, ProverInput,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;
use zkstatus_core::{CircuitKind, Fr, Groth16Proof, PROOF_BYTES, PROOF_ELEMENT_BYTES, U256};

const PROOF_DOMAIN: &str = "zkstatus mock groth16 proof v1";

/// One recorded gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockCall {
    /// Operation name (`setup`, `prove`, `verify`, `export-verifier`).
    pub op: &'static str,
    /// Circuit the call targeted.
    pub circuit: CircuitKind,
}

/// In-process [`ProverGateway`] for tests and dry runs.
#[derive(Debug, Default)]
pub struct MockProver {
    calls: Mutex<Vec<MockCall>>,
    failing: AtomicBool,
    latency: Option<Duration>,
}

impl MockProver {
    /// A mock that answers immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` (still bounded by the call timeout).
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make subsequent calls fail with a non-zero-exit error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Calls seen so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The proof `prove` returns for `(circuit, input)`.
    #[must_use]
    pub fn expected_proof(circuit: CircuitKind, input: &ProverInput) -> Groth16Proof {
        let mut hasher = blake3::Hasher::new_derive_key(PROOF_DOMAIN);
        hasher.update(circuit.name().as_bytes());
        hasher.update(&[0]);
        hasher.update(input.bytes());
        let mut raw = [0u8; PROOF_BYTES];
        hasher.finalize_xof().fill(&mut raw);

        let mut elements = [U256::ZERO; 8];
        for (slot, chunk) in elements.iter_mut().zip(raw.chunks_exact(PROOF_ELEMENT_BYTES)) {
            let mut word = [0u8; PROOF_ELEMENT_BYTES];
            word.copy_from_slice(chunk);
            *slot = Fr::from_be_bytes_reduced(word).value();
        }
        Groth16Proof::from_elements(elements)
    }

    async fn enter(
        &self,
        op: &'static str,
        circuit: CircuitKind,
        opts: CallOptions,
    ) -> Result<(), ProverError> {
        ensure_known(circuit)?;
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MockCall { op, circuit });
        debug!(op, %circuit, "mock prover call");

        let command = format!("mock {op} {circuit}");
        if let Some(latency) = self.latency {
            if tokio::time::timeout(opts.timeout, tokio::time::sleep(latency))
                .await
                .is_err()
            {
                return Err(ProverError::Timeout {
                    command,
                    after: opts.timeout,
                });
            }
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProverError::NonZeroExit {
                command,
                code: Some(1),
                stderr: "mock failure".to_owned(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProverGateway for MockProver {
    async fn setup(&self, circuit: CircuitKind, opts: CallOptions) -> Result<(), ProverError> {
        self.enter("setup", circuit, opts).await
    }

    async fn prove(
        &self,
        circuit: CircuitKind,
        input: &ProverInput,
        opts: CallOptions,
    ) -> Result<Groth16Proof, ProverError> {
        self.enter("prove", circuit, opts).await?;
        Ok(Self::expected_proof(circuit, input))
    }

    async fn verify(
        &self,
        circuit: CircuitKind,
        proof: &Groth16Proof,
        input: &ProverInput,
        opts: CallOptions,
    ) -> Result<bool, ProverError> {
        self.enter("verify", circuit, opts).await?;
        Ok(*proof == Self::expected_proof(circuit, input))
    }

    async fn export_verifier(
        &self,
        circuit: CircuitKind,
        destination: &Path,
        opts: CallOptions,
    ) -> Result<PathBuf, ProverError> {
        self.enter("export-verifier", circuit, opts).await?;
        let out = verifier_path(circuit, destination);
        let source = format!(
            "// SPDX-License-Identifier: MIT\npragma solidity ^0.8.0;\n\n\
             contract {circuit}Verifier {{\n    // mock: accepts nothing\n    \
             function verifyProof(uint256[8] calldata, uint256[] calldata) \
             external pure returns (bool) {{\n        return false;\n    }}\n}}\n"
        );
        write_file_atomic(&out, source.as_bytes()).await?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(s: &str) -> ProverInput {
        ProverInput::new(s.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn prove_is_deterministic_and_verifies() {
        let mock = MockProver::new();
        let opts = CallOptions::default();
        let c = CircuitKind::StateTransition;
        let a = mock.prove(c, &input("{}"), opts).await.unwrap();
        let b = mock.prove(c, &input("{}"), opts).await.unwrap();
        assert_eq!(a, b);
        assert!(mock.verify(c, &a, &input("{}"), opts).await.unwrap());
        assert!(!mock.verify(c, &a, &input("{ }"), opts).await.unwrap());
        assert!(!mock
            .verify(CircuitKind::BigStateTransition, &a, &input("{}"), opts)
            .await
            .unwrap());
    }

    #[test]
    fn proof_elements_are_reduced() {
        let p = MockProver::expected_proof(CircuitKind::AggMtStateReport, &input("x"));
        assert!(p
            .calldata()
            .iter()
            .all(|e| *e < zkstatus_field::MODULUS));
    }

    #[tokio::test]
    async fn records_calls_and_refuses_unknown() {
        let mock = MockProver::new();
        let opts = CallOptions::default();
        mock.setup(CircuitKind::AggCbslStateReport, opts).await.unwrap();
        assert!(matches!(
            mock.setup(CircuitKind::Unknown, opts).await,
            Err(ProverError::UnknownCircuit(_))
        ));
        assert_eq!(
            mock.calls(),
            vec![MockCall {
                op: "setup",
                circuit: CircuitKind::AggCbslStateReport
            }]
        );
    }

    #[tokio::test]
    async fn failure_toggle() {
        let mock = MockProver::new();
        mock.set_failing(true);
        let err = mock
            .setup(CircuitKind::StateTransition, CallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProverError::NonZeroExit { code: Some(1), .. }));
        mock.set_failing(false);
        assert!(mock
            .setup(CircuitKind::StateTransition, CallOptions::default())
            .await
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_bounded_by_timeout() {
        let mock = MockProver::new().with_latency(Duration::from_secs(30));
        let err = mock
            .prove(
                CircuitKind::StateTransition,
                &input("{}"),
                CallOptions::with_timeout(Duration::from_secs(1)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProverError::Timeout { .. }));

        let ok = mock
            .prove(
                CircuitKind::StateTransition,
                &input("{}"),
                CallOptions::with_timeout(Duration::from_secs(60)),
            )
            .await;
        assert!(ok.is_ok());
    }
}
