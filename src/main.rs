//! Tuning harness executable for blocktune.

use anyhow::Result;
use blocktune::cli::{run_cli, Cli};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run_cli(cli)
}
