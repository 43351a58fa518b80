//! Candidate evaluation pipeline and search strategies for blocktune.
//!
//! The tuning loop is one shared pipeline: a strategy proposes candidates,
//! the [`evaluator::Evaluator`] validates, builds, executes and checks each
//! one, and the [`recorder::MeasurementRecorder`] keeps the append-only
//! history plus the best-so-far record. Strategies differ only in proposal
//! policy.

pub mod builder;
pub mod bruteforce;
pub mod evaluator;
pub mod line_search;
pub mod monte_carlo;
pub mod neighborhood;
pub mod oracle;
pub mod record;
pub mod recorder;
pub mod runner;
pub mod strategy;

pub use builder::{
    BuildConfig, BuildError, ExecutionError, ExecutionOutput, KernelArtifact, KernelBuilder,
    TiledKernelBuilder,
};
pub use evaluator::Evaluator;
pub use oracle::{CorrectnessOracle, OracleVerdict};
pub use record::{EvaluationRecord, FailureDetail, FailureKind};
pub use recorder::{JsonlSink, MeasurementRecorder, MeasurementSink};
pub use runner::{run_tuning, TuningOptions, TuningOutcome};
pub use strategy::{SearchStrategy, StrategyConfig};

#[cfg(test)]
pub(crate) mod test_support;
