//! Explicit configuration, loaded from TOML.
//!
//! Every field has a default so an empty file is a valid config:
//!
//! ```
//! let cfg = zkstatus_core::Config::from_toml_str("")?;
//! assert_eq!(cfg.status.data_size, 8);
//! cfg.validate()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::error::StatusError;
use crate::status::{MerkleOverflowPolicy, MerkleParams, StatusMechanism, StatusParams, StatusType};
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use zkstatus_merkle::{PairHashKind, MAX_HEIGHT};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Status space parameters.
    pub status: StatusConfig,
    /// Oracle aggregation settings.
    pub aggregation: AggregationConfig,
    /// External prover settings.
    pub prover: ProverConfig,
}

/// `[status]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Mechanism in use.
    pub mechanism: StatusMechanism,
    /// Event type tracked.
    pub status_type: StatusType,
    /// Wide bitmask word count.
    pub data_size: usize,
    /// Merkle tree height.
    pub height: u32,
    /// Merkle overflow policy.
    pub overflow: MerkleOverflowPolicy,
    /// Merkle pair hasher.
    pub hasher: PairHashKind,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            mechanism: StatusMechanism::WideBitmask,
            status_type: StatusType::Revocation,
            data_size: 8,
            height: 11,
            overflow: MerkleOverflowPolicy::Reject,
            hasher: PairHashKind::Mimc,
        }
    }
}

/// `[aggregation]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Fault tolerance `f` passed to aggregate circuits.
    pub fault_tolerance: u32,
    /// Oracle base URLs.
    pub sources: Vec<String>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            fault_tolerance: 1,
            sources: vec!["http://localhost:8000".to_owned()],
        }
    }
}

/// How the external prover is launched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProverMode {
    /// `go run main.go <args>`.
    #[default]
    Dev,
    /// `./zkssi <args>`.
    Prod,
}

/// `[prover]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    /// Launch mode.
    pub mode: ProverMode,
    /// Directory the prover runs in.
    pub workdir: PathBuf,
    /// Root for per-circuit input/proof files.
    pub io_dir: PathBuf,
    /// Default per-call timeout.
    pub timeout_secs: u64,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            mode: ProverMode::Dev,
            workdir: PathBuf::from("circuits-go"),
            io_dir: PathBuf::from("circuits-go/output"),
            timeout_secs: 600,
        }
    }
}

impl ProverConfig {
    /// Default call timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Parse from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parse TOML config")
    }

    /// Load from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize TOML config")
    }

    /// Reject configurations no component can run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.status.data_size >= 1, "status.data_size must be >= 1");
        ensure!(
            self.status.height <= MAX_HEIGHT,
            "status.height must be <= {MAX_HEIGHT}, got {}",
            self.status.height
        );
        ensure!(
            !self.aggregation.sources.is_empty(),
            "aggregation.sources must not be empty"
        );
        ensure!(self.prover.timeout_secs > 0, "prover.timeout_secs must be > 0");
        Ok(())
    }

    /// Status parameters for the configured mechanism.
    pub fn status_params(&self) -> Result<StatusParams, StatusError> {
        let s = &self.status;
        Ok(match s.mechanism {
            StatusMechanism::Bitmask64 => StatusParams::Bitmask64,
            StatusMechanism::WideBitmask => StatusParams::WideBitmask {
                data_size: s.data_size,
            },
            StatusMechanism::Merkle => {
                StatusParams::Merkle(MerkleParams::new(s.height, s.hasher, s.overflow)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let cfg = Config::default();
        let text = cfg.to_toml_string().unwrap();
        assert!(text.contains("mechanism = \"wbsl\""));
        assert_eq!(Config::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            [status]
            mechanism = "mt"
            height = 4
            hasher = "addition"

            [prover]
            mode = "prod"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.prover.mode, ProverMode::Prod);
        assert_eq!(cfg.prover.timeout_secs, 600);
        assert_eq!(cfg.aggregation.fault_tolerance, 1);
        let StatusParams::Merkle(p) = cfg.status_params().unwrap() else {
            panic!("expected merkle params");
        };
        assert_eq!(p.height(), 4);
        assert_eq!(p.hasher(), PairHashKind::Addition);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.status.data_size = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.aggregation.sources.clear();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.prover.timeout_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.status.height = MAX_HEIGHT + 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unknown_mechanism_is_an_error() {
        let err = Config::from_toml_str("[status]\nmechanism = \"xyz\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("parse TOML config"));
    }
}
