//! Compact aggregate inputs for wide bitmasks.
//!
//! Instead of full word arrays per step, each step carries only the index of
//! the word that changed and the single-bit mask that was set. The prover
//! replays the steps over `previous` and checks every oracle agrees.

use crate::aggregate::{check_report_count, clear_indicator_bit, full_indicator};
use crate::error::ReportError;
use crate::export::{d_u256, d_u64, words, CircuitInput, CompactJson};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zkstatus_core::{CircuitKind, Status, WordDelta, U256};
use zkstatus_field::dec;

/// One compact step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactStep {
    /// Status time after the step.
    pub time: u64,
    /// Index of the word that changed.
    pub index: usize,
    /// Word value after the step.
    #[serde(with = "dec")]
    pub word: U256,
    /// Single-bit mask that was set.
    #[serde(with = "dec")]
    pub change: U256,
}

impl CompactStep {
    fn from_delta(time: u64, delta: &WordDelta) -> Self {
        Self {
            time,
            index: delta.index,
            word: delta.changed_word,
            change: delta.change,
        }
    }

    const fn as_delta(&self, prior_word: U256) -> WordDelta {
        WordDelta {
            index: self.index,
            prior_word,
            changed_word: self.word,
            change: self.change,
        }
    }
}

/// Advance `previous` `num_steps` times, recording each delta.
pub fn compact_steps(previous: &Status, num_steps: usize) -> Result<Vec<CompactStep>, ReportError> {
    let mut cur = previous.clone();
    let mut steps = Vec::with_capacity(num_steps);
    for _ in 0..num_steps {
        let delta = cur.generate_delta()?;
        cur = cur.apply_delta(&delta)?;
        steps.push(CompactStep::from_delta(cur.time(), &delta));
    }
    Ok(steps)
}

/// `AggCBSLStateReport` inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactAggregateInputs {
    f: u32,
    indicator: U256,
    previous: Status,
    final_steps: Vec<CompactStep>,
    reports: Vec<Vec<CompactStep>>,
}

impl CompactAggregateInputs {
    /// Advance `previous` `num_steps` times and replicate the steps as the
    /// report of each of `oracle_count` oracles.
    pub fn build(
        f: u32,
        previous: &Status,
        num_steps: usize,
        oracle_count: usize,
    ) -> Result<Self, ReportError> {
        if !matches!(previous, Status::WideBitmask { .. }) {
            return Err(ReportError::UnsupportedVariant {
                op: "compact aggregate",
                mechanism: previous.mechanism(),
            });
        }
        if num_steps == 0 {
            return Err(ReportError::ChainTooShort { len: 1 });
        }
        check_report_count(oracle_count)?;

        let final_steps = compact_steps(previous, num_steps)?;
        debug!(steps = final_steps.len(), oracles = oracle_count, "built compact steps");
        Ok(Self {
            f,
            indicator: full_indicator(oracle_count),
            previous: previous.clone(),
            reports: vec![final_steps.clone(); oracle_count],
            final_steps,
        })
    }

    /// Replace the replicated reports with explicit per-oracle steps.
    ///
    /// Each report must have as many steps as the final transition; the
    /// indicator is reset to all present.
    pub fn with_reports(mut self, reports: Vec<Vec<CompactStep>>) -> Result<Self, ReportError> {
        check_report_count(reports.len())?;
        let expected = self.final_steps.len();
        if let Some(bad) = reports.iter().find(|r| r.len() != expected) {
            return Err(ReportError::ShapeMismatch {
                expected,
                actual: bad.len(),
            });
        }
        self.indicator = full_indicator(reports.len());
        self.reports = reports;
        Ok(self)
    }

    /// Clear indicator bit `index`.
    pub fn mark_absent(&mut self, index: usize) -> Result<(), ReportError> {
        clear_indicator_bit(&mut self.indicator, index, self.reports.len())
    }

    /// Status after replaying every final step over `previous`.
    pub fn final_status(&self) -> Result<Status, ReportError> {
        let mut cur = self.previous.clone();
        for step in &self.final_steps {
            let prior = cur.words().get(step.index).copied().unwrap_or(U256::ZERO);
            cur = cur.apply_delta(&step.as_delta(prior))?;
        }
        Ok(cur)
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

    /// Starting status.
    #[must_use]
    pub const fn previous(&self) -> &Status {
        &self.previous
    }

    /// Agreed steps.
    #[must_use]
    pub fn final_steps(&self) -> &[CompactStep] {
        &self.final_steps
    }

    /// Per-oracle steps.
    #[must_use]
    pub fn reports(&self) -> &[Vec<CompactStep>] {
        &self.reports
    }
}

impl CircuitInput for CompactAggregateInputs {
    type Export = CompactJson;

    fn circuit(&self) -> CircuitKind {
        CircuitKind::AggCbslStateReport
    }

    fn export(&self) -> CompactJson {
        let times = |s: &[CompactStep]| s.iter().map(|x| d_u64(x.time)).collect::<Vec<_>>();
        let indexes = |s: &[CompactStep]| s.iter().map(|x| x.index.to_string()).collect::<Vec<_>>();
        let changes = |s: &[CompactStep]| s.iter().map(|x| d_u256(&x.change)).collect::<Vec<_>>();

        CompactJson {
            previous_time: d_u64(self.previous.time()),
            previous_statuses: words(&self.previous),
            final_transition_times: times(&self.final_steps),
            final_transition_indexes: indexes(&self.final_steps),
            final_transition_changes: changes(&self.final_steps),
            report_times: self.reports.iter().map(|r| times(r)).collect(),
            report_indexes: self.reports.iter().map(|r| indexes(r)).collect(),
            report_changes: self.reports.iter().map(|r| changes(r)).collect(),
            indicator: d_u256(&self.indicator),
            f: self.f.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkstatus_core::StatusParams;

    fn wide(data_size: usize) -> Status {
        Status::genesis(&StatusParams::WideBitmask { data_size })
    }

    #[test]
    fn steps_match_advance() {
        let prev = wide(2).advance().unwrap();
        let steps = compact_steps(&prev, 3).unwrap();
        assert_eq!(steps.iter().map(|s| s.time).collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(steps[0].change, U256::from(0b10u64));
        assert_eq!(steps[2].word, U256::from(0b1111u64));
        assert!(steps.iter().all(|s| s.index == 0));
    }

    #[test]
    fn build_replicates_reports() {
        let c = CompactAggregateInputs::build(1, &wide(1), 2, 3).unwrap();
        assert_eq!(c.reports().len(), 3);
        assert!(c.reports().iter().all(|r| r == c.final_steps()));
        assert_eq!(c.indicator(), U256::from(0b111u64));
        assert_eq!(c.final_status().unwrap(), wide(1).advance().unwrap().advance().unwrap());
    }

    #[test]
    fn build_rejects_bad_inputs() {
        assert!(matches!(
            CompactAggregateInputs::build(1, &wide(1), 1, 0),
            Err(ReportError::EmptyInput)
        ));
        assert!(matches!(
            CompactAggregateInputs::build(1, &wide(1), 0, 1),
            Err(ReportError::ChainTooShort { .. })
        ));
        let b = Status::genesis(&StatusParams::Bitmask64);
        assert!(matches!(
            CompactAggregateInputs::build(1, &b, 1, 1),
            Err(ReportError::UnsupportedVariant { .. })
        ));
    }

    #[test]
    fn with_reports_checks_shape() {
        let c = CompactAggregateInputs::build(0, &wide(1), 2, 1).unwrap();
        let short = vec![c.final_steps()[..1].to_vec()];
        assert!(matches!(
            c.clone().with_reports(short),
            Err(ReportError::ShapeMismatch { expected: 2, actual: 1 })
        ));
        let two = vec![c.final_steps().to_vec(); 2];
        let c = c.with_reports(two).unwrap();
        assert_eq!(c.indicator(), U256::from(0b11u64));
    }

    #[test]
    fn export_shape() {
        let c = CompactAggregateInputs::build(1, &wide(2), 2, 2).unwrap();
        let j = c.export();
        assert_eq!(j.previous_time, "0");
        assert_eq!(j.previous_statuses, vec!["0", "0"]);
        assert_eq!(j.final_transition_times, vec!["1", "2"]);
        assert_eq!(j.final_transition_changes, vec!["1", "2"]);
        assert_eq!(j.report_indexes, vec![vec!["0", "0"]; 2]);
        assert_eq!(j.indicator, "3");
        assert_eq!(j.f, "1");
    }
}
