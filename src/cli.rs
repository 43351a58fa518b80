//! CLI wiring for the blocktune binary.

use crate::scenario::combined_parameter_space;
use anyhow::Result;
use blocktune_kernels::{MatmulConfig, TuningProblem};
use blocktune_tuner::builder::{BuildConfig, TiledKernelBuilder};
use blocktune_tuner::{run_tuning, JsonlSink, MeasurementSink, StrategyConfig, TuningOptions};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "blocktune", about = "Autotuner for blocked dense matmul")]
pub struct Cli {
    /// Scenario name, used to key persisted measurements.
    pub scenario: String,

    /// Square matrix dimension.
    #[arg(long, default_value_t = 4096)]
    pub n: usize,

    /// Timed kernel executions per candidate.
    #[arg(long, default_value_t = 2)]
    pub repetitions: usize,

    #[arg(long, value_enum, default_value = "line-search")]
    pub strategy: StrategyArg,

    /// Line search: full passes over all parameters.
    #[arg(long, default_value_t = 1)]
    pub rounds: usize,

    /// Line search / neighborhood search: per-axis probe or step budget.
    #[arg(long, default_value_t = 50)]
    pub steps: usize,

    /// Monte carlo: number of random draws.
    #[arg(long, default_value_t = 1000)]
    pub samples: usize,

    /// Monte carlo: RNG seed for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Append evaluation records to this JSON-lines file.
    #[arg(long)]
    pub measurements: Option<PathBuf>,

    /// Treat B as stored transposed (rejected by the tiled kernel).
    #[arg(long, default_value_t = false)]
    pub transposed: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
pub enum StrategyArg {
    Bruteforce,
    LineSearch,
    NeighborhoodSearch,
    MonteCarlo,
}

impl Cli {
    fn strategy_config(&self) -> StrategyConfig {
        match self.strategy {
            StrategyArg::Bruteforce => StrategyConfig::Bruteforce,
            StrategyArg::LineSearch => StrategyConfig::LineSearch {
                rounds: self.rounds,
                max_steps_per_axis: self.steps,
                initial: None,
            },
            StrategyArg::NeighborhoodSearch => StrategyConfig::NeighborhoodSearch {
                max_steps: self.steps,
            },
            StrategyArg::MonteCarlo => StrategyConfig::MonteCarlo {
                samples: self.samples,
                seed: self.seed,
            },
        }
    }
}

pub fn run_cli(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let mut config = MatmulConfig::new(cli.n);
    config.transposed = cli.transposed;
    let problem = TuningProblem::prepare(config)?;

    let space = combined_parameter_space();
    let builder = TiledKernelBuilder::new(BuildConfig::default());
    let options = TuningOptions::new(cli.strategy_config()).with_repetitions(cli.repetitions);

    let sink: Option<Box<dyn MeasurementSink>> = match &cli.measurements {
        Some(path) => Some(Box::new(JsonlSink::create(path)?)),
        None => None,
    };

    info!(scenario = %cli.scenario, n = cli.n, "starting tuning session");
    let outcome = run_tuning(&cli.scenario, &problem, &space, &builder, &options, sink)?;

    match &outcome.best {
        Some((candidate, record)) => {
            println!("optimal parameter values for scenario {}:", cli.scenario);
            for (name, value) in candidate.iter() {
                println!("  {} = {}", name, value);
            }
            if let (Some(duration), Some(gflops)) = (record.duration_ms, record.gflops) {
                println!(
                    "[N = {}] duration: {:.3} ms, performance: {:.3} GFLOPS",
                    cli.n, duration, gflops
                );
            }
            match outcome.production_check {
                Some(true) => println!("optimized kernel present, correct"),
                _ => println!("warning: production rebuild failed verification"),
            }
        }
        None => {
            println!(
                "no viable candidate found for scenario {} after {} evaluations",
                cli.scenario, outcome.evaluations
            );
        }
    }
    Ok(())
}
