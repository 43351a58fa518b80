//! Independent uniform sampling of the parameter space.

use crate::evaluator::Evaluator;
use crate::strategy::SearchStrategy;
use anyhow::bail;
use tracing::info;

/// Draws a fixed number of independent random candidates. Duplicates are
/// possible and each draw is evaluated and recorded; the sampling
/// distribution never adapts.
pub struct MonteCarlo {
    samples: usize,
    seed: Option<u64>,
}

impl MonteCarlo {
    pub fn new(samples: usize, seed: Option<u64>) -> Self {
        Self { samples, seed }
    }
}

impl SearchStrategy for MonteCarlo {
    fn name(&self) -> &'static str {
        "monte-carlo"
    }

    fn tune(&mut self, evaluator: &mut Evaluator<'_>) -> anyhow::Result<()> {
        let space = evaluator.space();
        if !space.is_randomizable() {
            bail!("monte carlo requires a randomizable parameter space");
        }
        if let Some(seed) = self.seed {
            fastrand::seed(seed);
        }

        info!(samples = self.samples, "monte carlo sampling starting");
        for _ in 0..self.samples {
            let candidate = space
                .random_candidate()
                .map_err(anyhow::Error::msg)?;
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
    use blocktune_space::{ParamValue, Parameter};

    #[test]
    fn issues_exactly_the_configured_number_of_evaluations() {
        let mut space = fixed_space(&[("a", &[1, 2]), ("b", &[1, 2])]);
        // Constraint rejections still consume budget.
        space.set_precompile_validator(|c| {
            if c.int("a")? == c.int("b")? {
                return Err("diagonal rejected".to_string());
            }
            Ok(())
        });
        let problem = small_problem();
        let oracle = CorrectnessOracle::new(naive_matmul(&problem));
        let builder = PlantedBuilder::correct(&problem);
        let mut evaluator = Evaluator::new(
            &space,
            &problem,
            &oracle,
            &builder,
            MeasurementRecorder::new("monte-carlo"),
            1,
        );

        MonteCarlo::new(17, Some(99)).tune(&mut evaluator).unwrap();

        assert_eq!(evaluator.evaluations(), 17);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let space = fixed_space(&[("a", &[1, 2, 3]), ("b", &[1, 2, 3])]);
        let problem = small_problem();
        let oracle = CorrectnessOracle::new(naive_matmul(&problem));

        let mut keys = Vec::new();
        for _ in 0..2 {
            let builder = PlantedBuilder::correct(&problem);
            let mut evaluator = Evaluator::new(
                &space,
                &problem,
                &oracle,
                &builder,
                MeasurementRecorder::new("monte-carlo"),
                1,
            );
            MonteCarlo::new(8, Some(1234)).tune(&mut evaluator).unwrap();
            let run: Vec<String> = evaluator
                .finish()
                .history()
                .iter()
                .map(|r| r.candidate.canonical_key())
                .collect();
            keys.push(run);
        }
        assert_eq!(keys[0], keys[1]);
    }

    #[test]
    fn pinned_singletons_do_not_block_sampling() {
        let mut space = fixed_space(&[("a", &[1, 2])]);
        space.add_parameter(Parameter::fixed_set(
            "X_REG",
            vec![ParamValue::text("5")],
            false,
        ));
        let problem = small_problem();
        let oracle = CorrectnessOracle::new(naive_matmul(&problem));
        let builder = PlantedBuilder::correct(&problem);
        let mut evaluator = Evaluator::new(
            &space,
            &problem,
            &oracle,
            &builder,
            MeasurementRecorder::new("monte-carlo"),
            1,
        );

        MonteCarlo::new(5, Some(3)).tune(&mut evaluator).unwrap();
        assert_eq!(evaluator.evaluations(), 5);
    }

    #[test]
    fn pinned_multi_valued_space_is_a_configuration_error() {
        let mut space = fixed_space(&[("a", &[1, 2])]);
        space.add_parameter(Parameter::fixed_set(
            "X_REG",
            vec![ParamValue::text("5"), ParamValue::text("7")],
            false,
        ));
        let problem = small_problem();
        let oracle = CorrectnessOracle::new(naive_matmul(&problem));
        let builder = PlantedBuilder::correct(&problem);
        let mut evaluator = Evaluator::new(
            &space,
            &problem,
            &oracle,
            &builder,
            MeasurementRecorder::new("monte-carlo"),
            1,
        );

        assert!(MonteCarlo::new(4, None).tune(&mut evaluator).is_err());
        assert_eq!(evaluator.evaluations(), 0);
    }
}
