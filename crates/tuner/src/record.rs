//! Evaluation records: per-candidate outcomes as data.

use blocktune_space::Candidate;
use serde::{Deserialize, Serialize};

/// Why a candidate did not pass. Every kind is local to the candidate; the
/// search continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Rejected by the precompile validator; the builder was never invoked.
    Constraint,
    Build,
    Execution,
    /// Numeric mismatch beyond the oracle threshold. Expected during
    /// exploration.
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub kind: FailureKind,
    pub detail: String,
}

/// Produced exactly once per evaluated candidate, including failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub candidate: Candidate,
    pub build_succeeded: bool,
    pub correctness_passed: bool,
    /// Mean duration across repetitions; `None` when the candidate never
    /// executed.
    pub duration_ms: Option<f64>,
    pub gflops: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureDetail>,
}

impl EvaluationRecord {
    pub fn passed(candidate: Candidate, duration_ms: f64, gflops: f64) -> Self {
        Self {
            candidate,
            build_succeeded: true,
            correctness_passed: true,
            duration_ms: Some(duration_ms),
            gflops: Some(gflops),
            failure: None,
        }
    }

    pub fn rejected(candidate: Candidate, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            candidate,
            build_succeeded: false,
            correctness_passed: false,
            duration_ms: None,
            gflops: None,
            failure: Some(FailureDetail {
                kind,
                detail: detail.into(),
            }),
        }
    }

    /// Numeric failure after a successful build and execution; the measured
    /// duration is kept for diagnostics but the record is never promoted.
    pub fn incorrect(candidate: Candidate, duration_ms: f64, detail: impl Into<String>) -> Self {
        Self {
            candidate,
            build_succeeded: true,
            correctness_passed: false,
            duration_ms: Some(duration_ms),
            gflops: None,
            failure: Some(FailureDetail {
                kind: FailureKind::Incorrect,
                detail: detail.into(),
            }),
        }
    }

    /// Eligible for best-so-far: built, correct, measured.
    pub fn is_viable(&self) -> bool {
        self.build_succeeded && self.correctness_passed && self.duration_ms.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocktune_space::ParamValue;

    fn candidate() -> Candidate {
        Candidate::default().with_value("L1_X", ParamValue::Int(30))
    }

    #[test]
    fn rejected_records_are_not_viable() {
        let record = EvaluationRecord::rejected(candidate(), FailureKind::Constraint, "10 % 4");
        assert!(!record.is_viable());
        assert!(record.duration_ms.is_none());
    }

    #[test]
    fn incorrect_records_keep_the_duration() {
        let record = EvaluationRecord::incorrect(candidate(), 12.5, "mismatch at (0, 0)");
        assert!(!record.is_viable());
        assert_eq!(record.duration_ms, Some(12.5));
    }

    #[test]
    fn record_serializes_without_failure_field_when_passing() {
        let record = EvaluationRecord::passed(candidate(), 10.0, 1.5);
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("failure"));
    }
}
