//! Shared stubs for pipeline and strategy tests: builders with planted
//! outputs and durations, so verdicts and search trajectories are
//! deterministic.

use crate::builder::{
    BuildError, DynArtifact, ExecutionError, ExecutionOutput, KernelArtifact, KernelBuilder,
};
use blocktune_kernels::{naive_matmul, MatmulConfig, TuningProblem};
use blocktune_space::{Candidate, Parameter, ParameterSpace};
use ndarray::Array2;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn small_problem() -> TuningProblem {
    TuningProblem::prepare(MatmulConfig::new(4)).unwrap()
}

/// Space of integer fixed-set parameters, in declaration order.
pub fn fixed_space(axes: &[(&str, &[i64])]) -> ParameterSpace {
    let mut space = ParameterSpace::new();
    for (name, values) in axes {
        space.add_parameter(Parameter::fixed_ints(*name, values));
    }
    space
}

struct PlantedArtifact {
    output: Array2<f64>,
    duration: Duration,
}

impl KernelArtifact for PlantedArtifact {
    fn execute(
        &self,
        _problem: &TuningProblem,
        _repetitions: usize,
    ) -> Result<ExecutionOutput, ExecutionError> {
        Ok(ExecutionOutput {
            output: self.output.clone(),
            mean_duration: self.duration,
        })
    }
}

/// Builder returning the reference output (optionally perturbed) with a
/// planted per-candidate duration.
pub struct PlantedBuilder {
    output: Array2<f64>,
    durations: HashMap<String, u64>,
    default_micros: u64,
    builds: AtomicUsize,
}

impl PlantedBuilder {
    pub fn correct(problem: &TuningProblem) -> Self {
        Self {
            output: naive_matmul(problem),
            durations: HashMap::new(),
            default_micros: 1_000,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn perturbed(problem: &TuningProblem, index: (usize, usize), delta: f64) -> Self {
        let mut builder = Self::correct(problem);
        builder.output[index] += delta;
        builder
    }

    /// Plant a duration (in microseconds) for one canonical candidate key.
    pub fn with_duration(mut self, key: &str, micros: u64) -> Self {
        self.durations.insert(key.to_string(), micros);
        self
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl KernelBuilder for PlantedBuilder {
    fn name(&self) -> &'static str {
        "planted"
    }

    fn build(&self, candidate: &Candidate) -> Result<DynArtifact, BuildError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let micros = self
            .durations
            .get(&candidate.canonical_key())
            .copied()
            .unwrap_or(self.default_micros);
        Ok(Arc::new(PlantedArtifact {
            output: self.output.clone(),
            duration: Duration::from_micros(micros),
        }))
    }
}

/// Builder that counts invocations; optionally fails every build.
pub struct CountingBuilder {
    output: Option<Array2<f64>>,
    builds: AtomicUsize,
}

impl CountingBuilder {
    pub fn correct(problem: &TuningProblem) -> Self {
        Self {
            output: Some(naive_matmul(problem)),
            builds: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            output: None,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl KernelBuilder for CountingBuilder {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn build(&self, _candidate: &Candidate) -> Result<DynArtifact, BuildError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        match &self.output {
            Some(output) => Ok(Arc::new(PlantedArtifact {
                output: output.clone(),
                duration: Duration::from_micros(1_000),
            })),
            None => Err(BuildError::new("synthetic compiler error")),
        }
    }
}
