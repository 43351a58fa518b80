//! Steepest-descent local search over single-step neighbors.

use crate::evaluator::Evaluator;
use crate::strategy::SearchStrategy;
use tracing::{info, warn};

/// From the current point, evaluates all neighbors and moves to the best
/// strictly-improving one. Ties do not trigger a move, which guarantees
/// termination; the walk stops at a local minimum or when the step budget
/// runs out.
pub struct NeighborhoodSearch {
    max_steps: usize,
}

impl NeighborhoodSearch {
    pub fn new(max_steps: usize) -> Self {
        Self { max_steps }
    }
}

impl SearchStrategy for NeighborhoodSearch {
    fn name(&self) -> &'static str {
        "neighborhood-search"
    }

    fn tune(&mut self, evaluator: &mut Evaluator<'_>) -> anyhow::Result<()> {
        let space = evaluator.space();
        let mut current = space.default_candidate();

        let start = evaluator.evaluate(&current)?;
        if !start.is_viable() {
            warn!(candidate = %current, "starting point is not viable; stopping");
            return Ok(());
        }
        let mut current_duration = start.duration_ms.unwrap_or(f64::INFINITY);

        for step in 0..self.max_steps {
            let mut best_move: Option<(blocktune_space::Candidate, f64)> = None;
            for neighbor in space.neighbors(&current) {
                let record = evaluator.evaluate(&neighbor)?;
                if !record.is_viable() {
                    continue;
                }
                let duration = record.duration_ms.unwrap_or(f64::INFINITY);
                if duration >= current_duration {
                    continue;
                }
                let beats = best_move
                    .as_ref()
                    .map(|(_, best)| duration < *best)
                    .unwrap_or(true);
                if beats {
                    best_move = Some((neighbor, duration));
                }
            }

            match best_move {
                Some((candidate, duration)) => {
                    info!(step, candidate = %candidate, duration_ms = duration, "moving to neighbor");
                    current = candidate;
                    current_duration = duration;
                }
                None => {
                    info!(step, "local minimum reached");
                    break;
                }
            }
        }

        Ok(())
    }
}
