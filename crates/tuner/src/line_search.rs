//! Axis-by-axis coordinate descent over the parameter space.

use crate::evaluator::Evaluator;
use crate::strategy::SearchStrategy;
use blocktune_space::Candidate;
use tracing::{debug, info};

/// For each round, sweeps every parameter axis in declaration order, fixes
/// the best value found on that axis, and moves on. Stops after the
/// configured round count or as soon as a full round yields no improvement.
pub struct LineSearch {
    rounds: usize,
    max_steps_per_axis: usize,
    initial: Option<Candidate>,
}

impl LineSearch {
    pub fn new(rounds: usize, max_steps_per_axis: usize, initial: Option<Candidate>) -> Self {
        Self {
            rounds,
            max_steps_per_axis,
            initial,
        }
    }
}

impl SearchStrategy for LineSearch {
    fn name(&self) -> &'static str {
        "line-search"
    }

    fn tune(&mut self, evaluator: &mut Evaluator<'_>) -> anyhow::Result<()> {
        let space = evaluator.space();
        let mut current = self
            .initial
            .clone()
            .unwrap_or_else(|| space.default_candidate());

        let baseline = evaluator.evaluate(&current)?;
        let mut current_duration = match baseline.is_viable() {
            true => baseline.duration_ms.unwrap_or(f64::INFINITY),
            false => f64::INFINITY,
        };

        for round in 0..self.rounds {
            let mut round_improved = false;

            for parameter in space.parameters() {
                let name = parameter.name();
                let held = match current.get(name) {
                    Some(value) => value.clone(),
                    None => continue,
                };

                let mut axis_best: Option<(blocktune_space::ParamValue, f64)> = None;
                for value in parameter
                    .domain_values()
                    .into_iter()
                    .take(self.max_steps_per_axis)
                {
                    if value == held {
                        continue; // already measured as the current point
                    }
                    let probe = current.with_value(name, value.clone());
                    let record = evaluator.evaluate(&probe)?;
                    if !record.is_viable() {
                        continue;
                    }
                    let duration = record.duration_ms.unwrap_or(f64::INFINITY);
                    let beats_axis = axis_best
                        .as_ref()
                        .map(|(_, best)| duration < *best)
                        .unwrap_or(true);
                    if duration < current_duration && beats_axis {
                        axis_best = Some((value, duration));
                    }
                }

                if let Some((value, duration)) = axis_best {
                    debug!(round, parameter = name, value = %value, duration_ms = duration, "axis improved");
                    current = current.with_value(name, value);
                    current_duration = duration;
                    round_improved = true;
                }
            }

            if !round_improved {
                info!(round, "line search converged; no improvement this round");
                break;
            }
        }

        Ok(())
    }
}
