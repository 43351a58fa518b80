//! Tuning run orchestration: wire space, problem, builder and strategy
//! together, then re-verify the winner with a fresh build.

use crate::builder::KernelBuilder;
use crate::evaluator::Evaluator;
use crate::oracle::CorrectnessOracle;
use crate::record::EvaluationRecord;
use crate::recorder::{MeasurementRecorder, MeasurementSink};
use crate::strategy::StrategyConfig;
use anyhow::{anyhow, Context, Result};
use blocktune_kernels::{naive_matmul, TuningProblem};
use blocktune_space::{Candidate, ParameterSpace};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct TuningOptions {
    /// Timed executions per candidate; the reported duration is their mean.
    pub repetitions: usize,
    pub strategy: StrategyConfig,
}

impl TuningOptions {
    pub fn new(strategy: StrategyConfig) -> Self {
        Self {
            repetitions: 1,
            strategy,
        }
    }

    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }
}

/// What a tuning run produced. `best` is `None` when no candidate passed
/// the full pipeline; `production_check` is the verdict of rebuilding and
/// re-verifying the winner from scratch.
pub struct TuningOutcome {
    pub best: Option<(Candidate, EvaluationRecord)>,
    pub evaluations: usize,
    pub production_check: Option<bool>,
}

/// Run one complete tuning session for `scenario`.
///
/// The space definition is validated up front; a malformed space is a fatal
/// error, unlike per-candidate failures which land in the history. After the
/// strategy exhausts its budget the best candidate is rebuilt without the
/// artifact cache and checked against the reference once more.
pub fn run_tuning(
    scenario: &str,
    problem: &TuningProblem,
    space: &ParameterSpace,
    builder: &dyn KernelBuilder,
    options: &TuningOptions,
    sink: Option<Box<dyn MeasurementSink>>,
) -> Result<TuningOutcome> {
    space
        .validate_definition()
        .map_err(|e| anyhow!("invalid parameter space for {scenario}: {e}"))?;
    if options.repetitions == 0 {
        return Err(anyhow!("repetitions must be at least 1"));
    }

    let reference = naive_matmul(problem);
    let oracle = CorrectnessOracle::new(reference);

    let mut recorder = MeasurementRecorder::new(scenario);
    if let Some(sink) = sink {
        recorder = recorder.with_sink(sink);
    }
    let mut evaluator = Evaluator::new(
        space,
        problem,
        &oracle,
        builder,
        recorder,
        options.repetitions,
    );

    let mut strategy = options.strategy.instantiate();
    info!(
        scenario,
        strategy = strategy.name(),
        n = problem.n,
        space_size = space.size(),
        "tuning run starting"
    );
    strategy
        .tune(&mut evaluator)
        .with_context(|| format!("strategy {} failed for {scenario}", strategy.name()))?;

    let recorder = evaluator.finish();
    let evaluations = recorder.evaluations();
    let best = recorder
        .best()
        .map(|record| (record.candidate.clone(), record.clone()));

    let production_check = match &best {
        Some((candidate, record)) => {
            info!(
                scenario,
                candidate = %candidate,
                duration_ms = record.duration_ms,
                gflops = record.gflops,
                evaluations,
                "tuning run finished"
            );
            Some(production_rebuild(problem, &oracle, builder, candidate))
        }
        None => {
            warn!(scenario, evaluations, "tuning run found no viable candidate");
            None
        }
    };

    Ok(TuningOutcome {
        best,
        evaluations,
        production_check,
    })
}

/// Rebuild the winning candidate from scratch and verify its output once
/// more. The tuning-time artifact is deliberately not reused.
fn production_rebuild(
    problem: &TuningProblem,
    oracle: &CorrectnessOracle,
    builder: &dyn KernelBuilder,
    candidate: &Candidate,
) -> bool {
    let artifact = match builder.build(candidate) {
        Ok(artifact) => artifact,
        Err(e) => {
            warn!(candidate = %candidate, error = %e, "production rebuild failed");
            return false;
        }
    };
    let run = match artifact.execute(problem, 1) {
        Ok(run) => run,
        Err(e) => {
            warn!(candidate = %candidate, error = %e, "production execution failed");
            return false;
        }
    };
    let verdict = oracle.check(&run.output);
    if !verdict.is_pass() {
        warn!(candidate = %candidate, %verdict, "production correctness check failed");
    }
    verdict.is_pass()
}
