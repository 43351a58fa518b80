//! Exhaustive enumeration of the parameter space.

use crate::evaluator::Evaluator;
use crate::strategy::SearchStrategy;
use tracing::info;

/// Deterministic full sweep; use when the space is small enough to exhaust.
pub struct Bruteforce;

impl SearchStrategy for Bruteforce {
    fn name(&self) -> &'static str {
        "bruteforce"
    }

    fn tune(&mut self, evaluator: &mut Evaluator<'_>) -> anyhow::Result<()> {
        let space = evaluator.space();
        info!(candidates = space.size(), "bruteforce sweep starting");
        for candidate in space.enumerate() {
            evaluator.evaluate(&candidate)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::CorrectnessOracle;
    use crate::recorder::MeasurementRecorder;
    use crate::test_support::{fixed_space, small_problem, PlantedBuilder};
    use blocktune_kernels::naive_matmul;
    use std::collections::HashSet;

    #[test]
    fn sweeps_every_combination_exactly_once() {
        let space = fixed_space(&[("a", &[1, 2]), ("b", &[1, 2, 3])]);
        let problem = small_problem();
        let oracle = CorrectnessOracle::new(naive_matmul(&problem));
        let builder = PlantedBuilder::correct(&problem);
        let mut evaluator = Evaluator::new(
            &space,
            &problem,
            &oracle,
            &builder,
            MeasurementRecorder::new("bruteforce"),
            1,
        );

        Bruteforce.tune(&mut evaluator).unwrap();

        let recorder = evaluator.finish();
        assert_eq!(recorder.evaluations(), 6);
        let keys: HashSet<String> = recorder
            .history()
            .iter()
            .map(|r| r.candidate.canonical_key())
            .collect();
        assert_eq!(keys.len(), 6);
        assert!(recorder.best().is_some());
    }
}
