//! Reference and tiled matrix-multiplication kernels for blocktune.

pub mod config;
pub mod matmul;

pub use config::{MatmulConfig, ProblemSetupError, TilingConfig, TuningProblem};
pub use matmul::{naive_matmul, thread_count_values, TiledMatmul};
