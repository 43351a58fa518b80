//! Kernel builder interface and the in-process tiled-kernel builder.

use blocktune_kernels::{TiledMatmul, TilingConfig, TuningProblem};
use blocktune_space::Candidate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Builder configuration. All fields are opaque strings passed through to
/// the builder unmodified; the in-process builder only logs them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    pub include_paths: String,
    pub compile_flags: String,
    pub link_flags: String,
    pub source_dir: String,
}

/// Compilation failure for one candidate. Local to the candidate: recorded,
/// never propagated as control flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildError {
    pub detail: String,
}

impl BuildError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "build failed: {}", self.detail)
    }
}

impl std::error::Error for BuildError {}

/// Artifact crash or malformed output shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionError {
    pub detail: String,
}

impl ExecutionError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "execution failed: {}", self.detail)
    }
}

impl std::error::Error for ExecutionError {}

/// Output of one artifact run.
pub struct ExecutionOutput {
    pub output: Array2<f64>,
    /// Mean duration across the requested repetitions. Mean (not sum) is the
    /// duration policy everywhere in blocktune; throughput comparisons
    /// between candidates rely on it.
    pub mean_duration: Duration,
}

/// An executable unit bound to one candidate.
pub trait KernelArtifact: Send + Sync {
    fn execute(
        &self,
        problem: &TuningProblem,
        repetitions: usize,
    ) -> Result<ExecutionOutput, ExecutionError>;
}

pub type DynArtifact = Arc<dyn KernelArtifact>;

/// Turns a candidate into an executable artifact.
pub trait KernelBuilder: Send + Sync {
    fn name(&self) -> &'static str;
    fn build(&self, candidate: &Candidate) -> Result<DynArtifact, BuildError>;
}

/// In-process builder: binds a candidate's tiling and thread parameters to a
/// [`TiledMatmul`] with its own worker pool.
pub struct TiledKernelBuilder {
    config: BuildConfig,
}

impl TiledKernelBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    fn tiling_from(candidate: &Candidate) -> Result<TilingConfig, BuildError> {
        let dim = |name: &str| -> Result<usize, BuildError> {
            let value = candidate.int(name).map_err(BuildError::new)?;
            usize::try_from(value)
                .map_err(|_| BuildError::new(format!("parameter {} is negative: {}", name, value)))
        };
        Ok(TilingConfig {
            l2_x: dim("L2_X")?,
            l2_y: dim("L2_Y")?,
            l2_k_step: dim("L2_K_STEP")?,
            l1_x: dim("L1_X")?,
            l1_y: dim("L1_Y")?,
            l1_k_step: dim("L1_K_STEP")?,
            threads: dim("KERNEL_THREADS")?,
        })
    }
}

impl KernelBuilder for TiledKernelBuilder {
    fn name(&self) -> &'static str {
        "tiled-inprocess"
    }

    fn build(&self, candidate: &Candidate) -> Result<DynArtifact, BuildError> {
        debug!(
            candidate = %candidate,
            include_paths = %self.config.include_paths,
            compile_flags = %self.config.compile_flags,
            link_flags = %self.config.link_flags,
            source_dir = %self.config.source_dir,
            "building tiled kernel"
        );
        let tiling = Self::tiling_from(candidate)?;
        let kernel = TiledMatmul::new(tiling).map_err(|e| BuildError::new(e.to_string()))?;
        Ok(Arc::new(TiledArtifact { kernel }))
    }
}

struct TiledArtifact {
    kernel: TiledMatmul,
}

impl KernelArtifact for TiledArtifact {
    fn execute(
        &self,
        problem: &TuningProblem,
        repetitions: usize,
    ) -> Result<ExecutionOutput, ExecutionError> {
        if repetitions == 0 {
            return Err(ExecutionError::new("repetition count must be > 0"));
        }

        let mut output = None;
        let mut total = Duration::default();
        for _ in 0..repetitions {
            let start = Instant::now();
            let result = self.kernel.run(problem);
            total += start.elapsed();
            output = Some(result);
        }

        let output = output.expect("at least one repetition ran");
        if output.dim() != (problem.n, problem.n) {
            return Err(ExecutionError::new(format!(
                "output shape {:?} does not match problem size {}",
                output.dim(),
                problem.n
            )));
        }

        Ok(ExecutionOutput {
            output,
            mean_duration: total / repetitions as u32,
        })
    }
}
