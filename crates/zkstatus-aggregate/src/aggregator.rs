//! Parallel validation across sources, sequential selection.

use crate::chain::{select_canonical, validate_chain, Canonical, ValidChain};
use crate::entry::{OracleQuery, SourceResponseEntry};
use rayon::prelude::*;
use tracing::{info, warn};
use zkstatus_core::{Config, Status, StatusError, StatusParams, StatusType};

/// Per-source chains plus the canonical pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationOutcome {
    /// One validated chain per source, in source order.
    pub chains: Vec<ValidChain>,
    /// Selected canonical status.
    pub canonical: Canonical,
}

/// Owns the status parameters and the oracle source list.
#[derive(Debug, Clone)]
pub struct Aggregator {
    params: StatusParams,
    status_type: StatusType,
    sources: Vec<String>,
}

impl Aggregator {
    /// New aggregator over `sources`.
    #[must_use]
    pub const fn new(params: StatusParams, status_type: StatusType, sources: Vec<String>) -> Self {
        Self {
            params,
            status_type,
            sources,
        }
    }

    /// Aggregator for the configured status space and sources.
    pub fn from_config(cfg: &Config) -> Result<Self, StatusError> {
        Ok(Self::new(
            cfg.status_params()?,
            cfg.status.status_type,
            cfg.aggregation.sources.clone(),
        ))
    }

    /// Status parameters.
    #[must_use]
    pub const fn params(&self) -> &StatusParams {
        &self.params
    }

    /// Configured sources.
    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// One query per source for statuses newer than `last_known`.
    #[must_use]
    pub fn queries(&self, last_known: &Status) -> Vec<OracleQuery> {
        self.sources
            .iter()
            .map(|domain| OracleQuery {
                domain: domain.clone(),
                mechanism: self.params.mechanism(),
                status_type: self.status_type,
                last_time: last_known.time(),
            })
            .collect()
    }

    /// Validate every response (in parallel) and select the canonical chain.
    ///
    /// `responses[i]` is the answer of source `i`.
    #[must_use]
    pub fn aggregate(
        &self,
        responses: &[Vec<SourceResponseEntry>],
        last_known: &Status,
    ) -> AggregationOutcome {
        let chains: Vec<ValidChain> = responses
            .par_iter()
            .map(|entries| validate_chain(entries, last_known, &self.params))
            .collect();

        for (source, chain) in chains.iter().enumerate() {
            if let Some(r) = &chain.rejection {
                warn!(source, kept = chain.len(), reason = %r, "source chain truncated");
            }
        }

        let canonical = select_canonical(&chains, &self.params);
        info!(
            sources = chains.len(),
            winner = ?canonical.source,
            time = canonical.status.time(),
            "aggregated oracle responses"
        );
        AggregationOutcome { chains, canonical }
    }
}
