//! The pluggable search-strategy abstraction.

use crate::bruteforce::Bruteforce;
use crate::evaluator::Evaluator;
use crate::line_search::LineSearch;
use crate::monte_carlo::MonteCarlo;
use crate::neighborhood::NeighborhoodSearch;
use blocktune_space::Candidate;
use serde::{Deserialize, Serialize};

/// A candidate-proposal policy. The evaluation pipeline is shared; a
/// strategy only decides which candidate to score next and when to stop.
/// Every strategy terminates in bounded evaluations and records every
/// candidate it proposes, including invalid and failing ones.
pub trait SearchStrategy {
    fn name(&self) -> &'static str;
    fn tune(&mut self, evaluator: &mut Evaluator<'_>) -> anyhow::Result<()>;
}

/// Declarative strategy selection, serializable for logs and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StrategyConfig {
    /// Exhaust the full Cartesian product. Budget equals the space size.
    Bruteforce,
    LineSearch {
        rounds: usize,
        /// Cap on probed values per parameter axis per round.
        max_steps_per_axis: usize,
        /// Starting point; defaults to the space's default candidate.
        initial: Option<Candidate>,
    },
    NeighborhoodSearch {
        max_steps: usize,
    },
    MonteCarlo {
        samples: usize,
        seed: Option<u64>,
    },
}

impl StrategyConfig {
    pub fn instantiate(&self) -> Box<dyn SearchStrategy> {
        match self {
            StrategyConfig::Bruteforce => Box::new(Bruteforce),
            StrategyConfig::LineSearch {
                rounds,
                max_steps_per_axis,
                initial,
            } => Box::new(LineSearch::new(*rounds, *max_steps_per_axis, initial.clone())),
            StrategyConfig::NeighborhoodSearch { max_steps } => {
                Box::new(NeighborhoodSearch::new(*max_steps))
            }
            StrategyConfig::MonteCarlo { samples, seed } => {
                Box::new(MonteCarlo::new(*samples, *seed))
            }
        }
    }
}
