//! Numeric correctness checking against a trusted reference.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute-difference threshold applied elementwise. A difference equal to
/// the threshold counts as a failure (`>=`, not `>`).
pub const DEFAULT_THRESHOLD: f64 = 1e-8;

/// Outcome of one oracle check. Mismatch diagnostics retain the first
/// offending index and both values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum OracleVerdict {
    Passed,
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    Mismatch {
        index: (usize, usize),
        got: f64,
        expected: f64,
        threshold: f64,
    },
}

impl OracleVerdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, OracleVerdict::Passed)
    }
}

impl fmt::Display for OracleVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleVerdict::Passed => write!(f, "passed"),
            OracleVerdict::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {:?}, got {:?}", expected, got)
            }
            OracleVerdict::Mismatch {
                index,
                got,
                expected,
                threshold,
            } => write!(
                f,
                "mismatch at {:?}: got {} expected {} (threshold {})",
                index, got, expected, threshold
            ),
        }
    }
}

/// Reference output plus tolerance-based comparator.
pub struct CorrectnessOracle {
    reference: Array2<f64>,
    threshold: f64,
}

impl CorrectnessOracle {
    pub fn new(reference: Array2<f64>) -> Self {
        Self {
            reference,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compare every element; short-circuit on the first mismatch.
    pub fn check(&self, output: &Array2<f64>) -> OracleVerdict {
        if output.dim() != self.reference.dim() {
            return OracleVerdict::ShapeMismatch {
                expected: self.reference.dim(),
                got: output.dim(),
            };
        }
        for ((index, &expected), &got) in self.reference.indexed_iter().zip(output.iter()) {
            if (got - expected).abs() >= self.threshold {
                return OracleVerdict::Mismatch {
                    index,
                    got,
                    expected,
                    threshold: self.threshold,
                };
            }
        }
        OracleVerdict::Passed
    }
}
