//! N-oracle aggregate reports.

use crate::error::ReportError;
use crate::export::{d_u256, d_u64, words, AggBitmaskJson, AggMerkleJson, AggregateJson, CircuitInput};
use crate::transition::TransitionInputs;
use tracing::debug;
use zkstatus_core::{CircuitKind, MerkleStatus, Status, StatusMechanism, U256};

/// Indicator width: one bit per oracle.
pub const MAX_REPORTS: usize = 256;

/// Indicator with bits `0..n` set.
pub(crate) fn full_indicator(n: usize) -> U256 {
    if n >= MAX_REPORTS {
        U256::MAX
    } else {
        (U256::from(1u64) << n) - U256::from(1u64)
    }
}

pub(crate) fn check_report_count(n: usize) -> Result<(), ReportError> {
    if n == 0 {
        return Err(ReportError::EmptyInput);
    }
    if n > MAX_REPORTS {
        return Err(ReportError::TooManyReports {
            count: n,
            max: MAX_REPORTS,
        });
    }
    Ok(())
}

pub(crate) fn clear_indicator_bit(indicator: &mut U256, index: usize, len: usize) -> Result<(), ReportError> {
    if index >= len {
        return Err(ReportError::IndicatorOutOfRange { index, len });
    }
    indicator.set_bit(index, false);
    Ok(())
}

fn tree_height(t: &TransitionInputs) -> Option<u32> {
    t.start().as_merkle().map(MerkleStatus::height)
}

/// Final transition plus one transition per oracle.
///
/// **Invariants**
/// - `1 <= oracle_reports.len() <= 256`,
/// - every report shares the final report's mechanism, status count and
///   Merkle tree height,
/// - indicator bit `i` is set iff report `i` has not been marked absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateReport {
    f: u32,
    indicator: U256,
    final_report: TransitionInputs,
    oracle_reports: Vec<TransitionInputs>,
}

impl AggregateReport {
    /// Aggregate over `oracle_reports`; every indicator bit starts set.
    pub fn build(
        f: u32,
        final_report: TransitionInputs,
        oracle_reports: Vec<TransitionInputs>,
    ) -> Result<Self, ReportError> {
        check_report_count(oracle_reports.len())?;
        let expected = final_report.mechanism();
        if let Some(bad) = oracle_reports.iter().find(|r| r.mechanism() != expected) {
            return Err(ReportError::MixedVariants {
                expected,
                actual: bad.mechanism(),
            });
        }
        let expected = final_report.len();
        if let Some(bad) = oracle_reports.iter().find(|r| r.len() != expected) {
            return Err(ReportError::ShapeMismatch {
                expected,
                actual: bad.len(),
            });
        }
        if let Some(expected) = tree_height(&final_report) {
            for r in &oracle_reports {
                let actual = tree_height(r).unwrap_or(expected);
                if actual != expected {
                    return Err(ReportError::HeightMismatch { expected, actual });
                }
            }
        }
        let indicator = full_indicator(oracle_reports.len());
        Ok(Self {
            f,
            indicator,
            final_report,
            oracle_reports,
        })
    }

    /// Aggregate over validated per-oracle chains.
    ///
    /// `chains[i]` holds the statuses oracle `i` reported after `last_known`
    /// (without it). Every transition starts at `last_known`; the final one
    /// ends on `chains[canonical]`. An oracle whose chain is shorter than the
    /// canonical one is padded by repeating its last status, which never
    /// forms a valid step, and marked absent. Longer chains are cut to the
    /// canonical length.
    pub fn from_chains<C: AsRef<[Status]>>(
        f: u32,
        last_known: &Status,
        chains: &[C],
        canonical: usize,
    ) -> Result<Self, ReportError> {
        check_report_count(chains.len())?;
        let winner: &[Status] = chains
            .get(canonical)
            .ok_or(ReportError::IndicatorOutOfRange {
                index: canonical,
                len: chains.len(),
            })?
            .as_ref();
        let steps = winner.len();
        if steps == 0 {
            return Err(ReportError::ChainTooShort { len: 1 });
        }

        let rooted = |chain: &[Status]| -> Vec<Status> {
            let mut out = Vec::with_capacity(steps + 1);
            out.push(last_known.clone());
            out.extend(chain.iter().take(steps).cloned());
            out
        };
        let final_report = TransitionInputs::build(&rooted(winner))?;

        let mut absent = Vec::new();
        let mut oracle_reports = Vec::with_capacity(chains.len());
        for (i, chain) in chains.iter().enumerate() {
            let mut statuses = rooted(chain.as_ref());
            if statuses.len() <= steps {
                absent.push(i);
                let last = statuses.last().cloned().unwrap_or_else(|| last_known.clone());
                statuses.resize(steps + 1, last);
            }
            oracle_reports.push(TransitionInputs::build(&statuses)?);
        }

        let mut report = Self::build(f, final_report, oracle_reports)?;
        for &i in &absent {
            report.mark_absent(i)?;
        }
        debug!(
            oracles = chains.len(),
            canonical,
            steps,
            absent = absent.len(),
            "aggregate report from oracle chains"
        );
        Ok(report)
    }

    /// Clear indicator bit `index` (oracle did not contribute).
    pub fn mark_absent(&mut self, index: usize) -> Result<(), ReportError> {
        clear_indicator_bit(&mut self.indicator, index, self.oracle_reports.len())
    }

    /// Whether oracle `index` is marked present.
    #[must_use]
    pub fn is_present(&self, index: usize) -> bool {
        index < self.oracle_reports.len() && self.indicator.bit(index)
    }

    /// Fault tolerance.
    #[must_use]
    pub const fn f(&self) -> u32 {
        self.f
    }

    /// Presence bitmap.
    #[must_use]
    pub const fn indicator(&self) -> U256 {
        self.indicator
    }

    /// Agreed transition.
    #[must_use]
    pub const fn final_report(&self) -> &TransitionInputs {
        &self.final_report
    }

    /// Per-oracle transitions.
    #[must_use]
    pub fn oracle_reports(&self) -> &[TransitionInputs] {
        &self.oracle_reports
    }
}

impl CircuitInput for AggregateReport {
    type Export = AggregateJson;

    fn circuit(&self) -> CircuitKind {
        match self.final_report.mechanism() {
            StatusMechanism::Merkle => CircuitKind::AggMtStateReport,
            StatusMechanism::Bitmask64 | StatusMechanism::WideBitmask => {
                CircuitKind::AggBslStateReport
            }
        }
    }

    fn export(&self) -> AggregateJson {
        let indicator = d_u256(&self.indicator);
        let f = self.f.to_string();
        let fin = &self.final_report;

        if fin.mechanism() == StatusMechanism::Merkle {
            let fin = fin.merkle_json();
            let reports: Vec<_> = self.oracle_reports.iter().map(TransitionInputs::merkle_json).collect();
            return AggregateJson::Merkle(AggMerkleJson {
                final_transition_time: fin.transition_time,
                final_transition_status: fin.transition_status,
                final_transition_leaves: fin.transition_leaves,
                report_transition_time: reports.iter().map(|r| r.transition_time.clone()).collect(),
                report_transition_status: reports.iter().map(|r| r.transition_status.clone()).collect(),
                report_transition_leaves: reports.into_iter().map(|r| r.transition_leaves).collect(),
                indicator,
                f,
            });
        }

        AggregateJson::Bitmask(AggBitmaskJson {
            final_middle_times: fin.middle().iter().map(|s| d_u64(s.time())).collect(),
            final_middle_statuses: fin.middle().iter().map(words).collect(),
            final_transition_time: [d_u64(fin.start().time()), d_u64(fin.end().time())],
            final_transition_status: [words(fin.start()), words(fin.end())],
            report_times: self.oracle_reports.iter().map(TransitionInputs::report_times).collect(),
            report_statuses: self
                .oracle_reports
                .iter()
                .map(TransitionInputs::report_statuses)
                .collect(),
            indicator,
            f,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_widths() {
        assert_eq!(full_indicator(1), U256::from(1u64));
        assert_eq!(full_indicator(3), U256::from(0b111u64));
        assert_eq!(full_indicator(256), U256::MAX);
        assert_eq!(full_indicator(255).count_ones(), 255);
    }

    #[test]
    fn report_count_bounds() {
        assert!(matches!(check_report_count(0), Err(ReportError::EmptyInput)));
        assert!(check_report_count(256).is_ok());
        assert!(matches!(
            check_report_count(257),
            Err(ReportError::TooManyReports { count: 257, max: 256 })
        ));
    }

    #[test]
    fn clearing_bits() {
        let mut ind = full_indicator(4);
        clear_indicator_bit(&mut ind, 2, 4).unwrap();
        assert_eq!(ind, U256::from(0b1011u64));
        assert!(matches!(
            clear_indicator_bit(&mut ind, 4, 4),
            Err(ReportError::IndicatorOutOfRange { index: 4, len: 4 })
        ));
    }
}
