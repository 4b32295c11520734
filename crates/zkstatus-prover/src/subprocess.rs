//! [`ProverGateway`] backed by the external prover program.
//!
//! Command lines (run inside `workdir`):
//!
//! | op                | arguments                               |
//! |-------------------|-----------------------------------------|
//! | setup             | `setup <C>`                             |
//! | prove             | `prove <C> <input.json> <proof>`        |
//! | verify            | `verify <C> <input.json> <proof>`       |
//! | export verifier   | `generate-verifier <C> <out.sol>`       |
//!
//! Every prove and verify call runs in its own scratch directory
//! `<io_dir>/<C>/<op>-XXXXXX/` holding [`INPUT_FILE`] and [`PROOF_FILE`], so
//! overlapping calls never share a path. The directory is removed when the
//! call returns, fails, or is dropped.
//!
//! A non-zero exit is an error. A verify that prints
//! [`VERIFY_FAILED_MARKER`] exits zero and maps to `Ok(false)`.

use crate::error::ProverError;
use crate::gateway::{ensure_known, verifier_path, CallOptions, ProverGateway, ProverInput};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, warn};
use zkstatus_core::io::tmp_sibling;
use zkstatus_core::{CircuitKind, Groth16Proof, ProverConfig, ProverMode};

/// Line the prover prints when a proof does not verify.
pub const VERIFY_FAILED_MARKER: &str = "Failed to verify";

/// Input file name inside a call directory.
pub const INPUT_FILE: &str = "input.json";

/// Proof file name inside a call directory.
pub const PROOF_FILE: &str = "input.json.proof";

/// Drives the prover program as a child process.
#[derive(Debug, Clone)]
pub struct SubprocessProver {
    program: PathBuf,
    prefix: Vec<OsString>,
    workdir: PathBuf,
    io_dir: PathBuf,
}

impl SubprocessProver {
    /// Launch per `[prover]` config: `go run main.go` (dev) or `zkssi` (prod).
    #[must_use]
    pub fn from_config(cfg: &ProverConfig) -> Self {
        let workdir = absolute(&cfg.workdir);
        let (program, prefix) = match cfg.mode {
            ProverMode::Dev => (PathBuf::from("go"), vec!["run".into(), "main.go".into()]),
            ProverMode::Prod => (workdir.join("zkssi"), Vec::new()),
        };
        Self {
            program,
            prefix,
            workdir,
            io_dir: absolute(&cfg.io_dir),
        }
    }

    /// Launch an arbitrary program; `prefix` precedes every command line.
    #[must_use]
    pub fn with_program(
        program: impl Into<PathBuf>,
        prefix: Vec<OsString>,
        workdir: &Path,
        io_dir: &Path,
    ) -> Self {
        Self {
            program: program.into(),
            prefix,
            workdir: absolute(workdir),
            io_dir: absolute(io_dir),
        }
    }

    /// Parent of the per-call directories for `circuit`.
    #[must_use]
    pub fn circuit_dir(&self, circuit: CircuitKind) -> PathBuf {
        self.io_dir.join(circuit.name())
    }

    async fn call_dir(&self, circuit: CircuitKind, op: &str) -> Result<TempDir, ProverError> {
        let parent = self.circuit_dir(circuit);
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(ProverError::io(&parent))?;
        let prefix = format!("{op}-");
        tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(&parent)
            .map_err(ProverError::io(&parent))
    }

    fn render(&self, args: &[OsString]) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.prefix.iter().map(OsString::as_os_str))
            .chain(args.iter().map(OsString::as_os_str))
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn run(&self, args: Vec<OsString>, timeout: Duration) -> Result<Output, ProverError> {
        let command = self.render(&args);
        debug!(%command, ?timeout, "spawning prover");

        let child = Command::new(&self.program)
            .args(&self.prefix)
            .args(&args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProverError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(res) => res.map_err(ProverError::io(&self.program))?,
            Err(_) => {
                warn!(%command, ?timeout, "prover timed out");
                return Err(ProverError::Timeout {
                    command,
                    after: timeout,
                });
            }
        };

        if !output.status.success() {
            return Err(ProverError::NonZeroExit {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(output)
    }
}

#[async_trait]
impl ProverGateway for SubprocessProver {
    async fn setup(&self, circuit: CircuitKind, opts: CallOptions) -> Result<(), ProverError> {
        ensure_known(circuit)?;
        self.run(vec!["setup".into(), circuit.name().into()], opts.timeout)
            .await?;
        info!(%circuit, "circuit setup complete");
        Ok(())
    }

    async fn prove(
        &self,
        circuit: CircuitKind,
        input: &ProverInput,
        opts: CallOptions,
    ) -> Result<Groth16Proof, ProverError> {
        ensure_known(circuit)?;
        let dir = self.call_dir(circuit, "prove").await?;
        let input_path = dir.path().join(INPUT_FILE);
        let proof_path = dir.path().join(PROOF_FILE);
        tokio::fs::write(&input_path, input.bytes())
            .await
            .map_err(ProverError::io(&input_path))?;

        let args = vec![
            "prove".into(),
            circuit.name().into(),
            input_path.into_os_string(),
            proof_path.clone().into_os_string(),
        ];
        self.run(args, opts.timeout).await?;
        let proof = read_proof(&proof_path).await?;

        info!(%circuit, digest = %hex_digest(input), "proof generated");
        Ok(proof)
    }

    async fn verify(
        &self,
        circuit: CircuitKind,
        proof: &Groth16Proof,
        input: &ProverInput,
        opts: CallOptions,
    ) -> Result<bool, ProverError> {
        ensure_known(circuit)?;
        let dir = self.call_dir(circuit, "verify").await?;
        let input_path = dir.path().join(INPUT_FILE);
        let proof_path = dir.path().join(PROOF_FILE);
        tokio::fs::write(&input_path, input.bytes())
            .await
            .map_err(ProverError::io(&input_path))?;
        tokio::fs::write(&proof_path, proof.to_bytes())
            .await
            .map_err(ProverError::io(&proof_path))?;

        let args = vec![
            "verify".into(),
            circuit.name().into(),
            input_path.into_os_string(),
            proof_path.into_os_string(),
        ];
        let output = self.run(args, opts.timeout).await?;
        let ok = !String::from_utf8_lossy(&output.stdout).contains(VERIFY_FAILED_MARKER);
        info!(%circuit, ok, "proof checked");
        Ok(ok)
    }

    async fn export_verifier(
        &self,
        circuit: CircuitKind,
        destination: &Path,
        opts: CallOptions,
    ) -> Result<PathBuf, ProverError> {
        ensure_known(circuit)?;
        let out = absolute(&verifier_path(circuit, destination));
        if let Some(parent) = out.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ProverError::io(parent))?;
        }
        let tmp = tmp_sibling(&out);
        let args = vec![
            "generate-verifier".into(),
            circuit.name().into(),
            tmp.clone().into_os_string(),
        ];
        if let Err(e) = self.run(args, opts.timeout).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        tokio::fs::rename(&tmp, &out)
            .await
            .map_err(ProverError::io(&out))?;
        info!(%circuit, path = %out.display(), "verifier exported");
        Ok(out)
    }
}

async fn read_proof(path: &Path) -> Result<Groth16Proof, ProverError> {
    let bytes = tokio::fs::read(path).await.map_err(ProverError::io(path))?;
    Ok(Groth16Proof::from_bytes(&bytes)?)
}

fn hex_digest(input: &ProverInput) -> String {
    blake3::Hash::from(input.digest()).to_hex().to_string()
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_mode_runs_through_go() {
        let p = SubprocessProver::from_config(&ProverConfig::default());
        let line = p.render(&["setup".into(), "StateTransition".into()]);
        assert_eq!(line, "go run main.go setup StateTransition");
        let dir = p.circuit_dir(CircuitKind::StateTransition);
        assert!(dir.is_absolute());
        assert!(dir.ends_with("circuits-go/output/StateTransition"));
    }

    #[test]
    fn prod_mode_runs_binary_in_workdir() {
        let cfg = ProverConfig {
            mode: ProverMode::Prod,
            workdir: PathBuf::from("/opt/prover"),
            ..ProverConfig::default()
        };
        let p = SubprocessProver::from_config(&cfg);
        assert_eq!(p.render(&[]), "/opt/prover/zkssi");
    }
}
