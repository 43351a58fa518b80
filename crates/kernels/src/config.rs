//! Problem and kernel configuration structures.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised while preparing a tuning problem. Checked before the tuning
/// loop starts; never raised mid-search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemSetupError {
    UnsupportedConfiguration(String),
    InvalidSize(String),
}

impl fmt::Display for ProblemSetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemSetupError::UnsupportedConfiguration(detail) => {
                write!(f, "unsupported configuration: {}", detail)
            }
            ProblemSetupError::InvalidSize(detail) => write!(f, "invalid size: {}", detail),
        }
    }
}

impl std::error::Error for ProblemSetupError {}

/// Declarative description of the matmul workload to tune against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatmulConfig {
    /// Square matrix dimension.
    pub n: usize,
    /// Whether B is stored transposed. The tiled kernel does not support
    /// this layout.
    pub transposed: bool,
    /// Seed for the random input matrices.
    pub seed: u64,
}

impl MatmulConfig {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            transposed: false,
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// The fixed problem instance every candidate is measured on.
#[derive(Debug, Clone)]
pub struct TuningProblem {
    pub n: usize,
    pub a: Array2<f64>,
    pub b: Array2<f64>,
}

impl TuningProblem {
    /// Seed the input matrices, rejecting configurations the tiled kernel
    /// cannot execute.
    pub fn prepare(config: MatmulConfig) -> Result<Self, ProblemSetupError> {
        if config.n == 0 {
            return Err(ProblemSetupError::InvalidSize(
                "matrix dimension must be > 0".to_string(),
            ));
        }
        if config.transposed {
            return Err(ProblemSetupError::UnsupportedConfiguration(
                "the combined kernel does not allow B to be transposed".to_string(),
            ));
        }

        fastrand::seed(config.seed);
        let n = config.n;
        let a = Array2::from_shape_fn((n, n), |_| fastrand::f64());
        let b = Array2::from_shape_fn((n, n), |_| fastrand::f64());
        Ok(Self { n, a, b })
    }

    /// Problem over explicit matrices, for synthetic test scenarios.
    pub fn from_matrices(a: Array2<f64>, b: Array2<f64>) -> Result<Self, ProblemSetupError> {
        let n = a.nrows();
        if a.dim() != (n, n) || b.dim() != (n, n) {
            return Err(ProblemSetupError::InvalidSize(format!(
                "expected square matrices of equal size, got {:?} and {:?}",
                a.dim(),
                b.dim()
            )));
        }
        if n == 0 {
            return Err(ProblemSetupError::InvalidSize(
                "matrix dimension must be > 0".to_string(),
            ));
        }
        Ok(Self { n, a, b })
    }

    /// Multiply-add count for one multiplication.
    pub fn flops(&self) -> f64 {
        2.0 * (self.n as f64).powi(3)
    }
}

/// Hierarchical tiling for the blocked kernel: L2 tiles are split into L1
/// tiles along the row (X), column (Y), and reduction (K_STEP) axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilingConfig {
    pub l2_x: usize,
    pub l2_y: usize,
    pub l2_k_step: usize,
    pub l1_x: usize,
    pub l1_y: usize,
    pub l1_k_step: usize,
    /// Worker threads for the kernel's internal data parallelism.
    pub threads: usize,
}

impl TilingConfig {
    pub fn validate(&self) -> Result<(), String> {
        let dims = [
            ("L2_X", self.l2_x),
            ("L2_Y", self.l2_y),
            ("L2_K_STEP", self.l2_k_step),
            ("L1_X", self.l1_x),
            ("L1_Y", self.l1_y),
            ("L1_K_STEP", self.l1_k_step),
        ];
        for (name, value) in dims {
            if value == 0 {
                return Err(format!("tile dimension {} must be > 0", name));
            }
        }
        if self.threads == 0 {
            return Err("thread count must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            l2_x: 60,
            l2_y: 64,
            l2_k_step: 64,
            l1_x: 30,
            l1_y: 64,
            l1_k_step: 32,
            threads: 1,
        }
    }
}
