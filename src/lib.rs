//! Application layer for the blocktune autotuner: CLI wiring and the
//! combined-kernel tuning scenario.

pub mod cli;
pub mod scenario;
