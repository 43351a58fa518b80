//! The candidate evaluation pipeline: constraint check, build, execute,
//! validate, record.

use crate::builder::{DynArtifact, KernelBuilder};
use crate::oracle::CorrectnessOracle;
use crate::record::{EvaluationRecord, FailureKind};
use crate::recorder::MeasurementRecorder;
use anyhow::Result;
use blocktune_kernels::TuningProblem;
use blocktune_space::{Candidate, ParameterSpace};
use std::collections::HashMap;
use tracing::debug;

/// Shared pipeline every strategy calls. Per-candidate failures are absorbed
/// here and surfaced only as record fields; `evaluate` returns `Err` solely
/// for faults outside the pipeline (e.g. the measurement sink).
pub struct Evaluator<'a> {
    space: &'a ParameterSpace,
    problem: &'a TuningProblem,
    oracle: &'a CorrectnessOracle,
    builder: &'a dyn KernelBuilder,
    recorder: MeasurementRecorder,
    repetitions: usize,
    artifacts: HashMap<String, DynArtifact>,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        space: &'a ParameterSpace,
        problem: &'a TuningProblem,
        oracle: &'a CorrectnessOracle,
        builder: &'a dyn KernelBuilder,
        recorder: MeasurementRecorder,
        repetitions: usize,
    ) -> Self {
        Self {
            space,
            problem,
            oracle,
            builder,
            recorder,
            repetitions,
            artifacts: HashMap::new(),
        }
    }

    /// The space outlives the evaluator borrow, so strategies can hold onto
    /// it across `evaluate` calls.
    pub fn space(&self) -> &'a ParameterSpace {
        self.space
    }

    pub fn evaluations(&self) -> usize {
        self.recorder.evaluations()
    }

    pub fn best(&self) -> Option<&EvaluationRecord> {
        self.recorder.best()
    }

    pub fn recorder(&self) -> &MeasurementRecorder {
        &self.recorder
    }

    /// Consume the evaluator, dropping cached artifacts and returning the
    /// run's history.
    pub fn finish(self) -> MeasurementRecorder {
        self.recorder
    }

    /// Score one candidate. Exactly one record is appended per call.
    pub fn evaluate(&mut self, candidate: &Candidate) -> Result<EvaluationRecord> {
        let record = self.evaluate_inner(candidate);
        self.recorder.record(record.clone())?;
        Ok(record)
    }

    fn evaluate_inner(&mut self, candidate: &Candidate) -> EvaluationRecord {
        // Step 1: constraint check, before anything expensive.
        if let Err(detail) = self.space.validate(candidate) {
            debug!(candidate = %candidate, %detail, "precompile check rejected candidate");
            return EvaluationRecord::rejected(candidate.clone(), FailureKind::Constraint, detail);
        }

        // Step 2: build, reusing the artifact for previously-seen candidates.
        let key = candidate.canonical_key();
        let artifact = match self.artifacts.get(&key) {
            Some(artifact) => artifact.clone(),
            None => match self.builder.build(candidate) {
                Ok(artifact) => {
                    self.artifacts.insert(key, artifact.clone());
                    artifact
                }
                Err(e) => {
                    debug!(candidate = %candidate, error = %e, "build failed");
                    return EvaluationRecord::rejected(
                        candidate.clone(),
                        FailureKind::Build,
                        e.detail,
                    );
                }
            },
        };

        // Step 3: execute for the configured repetitions, mean duration.
        let run = match artifact.execute(self.problem, self.repetitions) {
            Ok(run) => run,
            Err(e) => {
                debug!(candidate = %candidate, error = %e, "execution failed");
                return EvaluationRecord::rejected(
                    candidate.clone(),
                    FailureKind::Execution,
                    e.detail,
                );
            }
        };
        let duration_ms = run.mean_duration.as_secs_f64() * 1000.0;

        // Step 4: correctness.
        let verdict = self.oracle.check(&run.output);
        if !verdict.is_pass() {
            debug!(candidate = %candidate, verdict = %verdict, "correctness check failed");
            return EvaluationRecord::incorrect(
                candidate.clone(),
                duration_ms,
                verdict.to_string(),
            );
        }

        let gflops = self.problem.flops() / (duration_ms * 1.0e6);
        EvaluationRecord::passed(candidate.clone(), duration_ms, gflops)
    }
}
