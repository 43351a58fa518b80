//! Matrix multiplication kernels.

use crate::config::{TilingConfig, TuningProblem};
use anyhow::{Context, Result};
use ndarray::{Array2, Axis};
use rayon::prelude::*;

/// Trusted reference: naive triple loop. Used once per tuning run to seed the
/// correctness oracle.
pub fn naive_matmul(problem: &TuningProblem) -> Array2<f64> {
    let n = problem.n;
    let a = &problem.a;
    let b = &problem.b;
    let mut c = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for k in 0..n {
            let aik = a[(i, k)];
            for j in 0..n {
                c[(i, j)] += aik * b[(k, j)];
            }
        }
    }
    c
}

/// Hierarchically blocked matmul with a dedicated worker pool.
///
/// L2 tiles partition the output for cache locality; each L2 tile is walked
/// in L1 sub-tiles. Ragged edges (n not divisible by a tile length) are
/// clamped. Row bands of the output are disjoint, so L2 row blocks run in
/// parallel across the pool.
pub struct TiledMatmul {
    config: TilingConfig,
    pool: rayon::ThreadPool,
}

impl TiledMatmul {
    pub fn new(config: TilingConfig) -> Result<Self> {
        config.validate().map_err(anyhow::Error::msg)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .context("failed to build kernel thread pool")?;
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> TilingConfig {
        self.config
    }

    pub fn run(&self, problem: &TuningProblem) -> Array2<f64> {
        let n = problem.n;
        let cfg = self.config;
        let a = &problem.a;
        let b = &problem.b;
        let mut c = Array2::<f64>::zeros((n, n));

        self.pool.install(|| {
            c.axis_chunks_iter_mut(Axis(0), cfg.l2_x)
                .into_par_iter()
                .enumerate()
                .for_each(|(band_idx, mut band)| {
                    let i2 = band_idx * cfg.l2_x;
                    let i2_end = (i2 + cfg.l2_x).min(n);
                    for j2 in (0..n).step_by(cfg.l2_y) {
                        let j2_end = (j2 + cfg.l2_y).min(n);
                        for k2 in (0..n).step_by(cfg.l2_k_step) {
                            let k2_end = (k2 + cfg.l2_k_step).min(n);
                            for i1 in (i2..i2_end).step_by(cfg.l1_x) {
                                let i1_end = (i1 + cfg.l1_x).min(i2_end);
                                for j1 in (j2..j2_end).step_by(cfg.l1_y) {
                                    let j1_end = (j1 + cfg.l1_y).min(j2_end);
                                    for k1 in (k2..k2_end).step_by(cfg.l1_k_step) {
                                        let k1_end = (k1 + cfg.l1_k_step).min(k2_end);
                                        for i in i1..i1_end {
                                            for k in k1..k1_end {
                                                let aik = a[(i, k)];
                                                for j in j1..j1_end {
                                                    band[(i - i2, j)] += aik * b[(k, j)];
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                });
        });

        c
    }
}

/// Thread counts to tune over: the hardware thread count and its successive
/// halvings while even.
pub fn thread_count_values() -> Vec<i64> {
    let mut threads = std::thread::available_parallelism()
        .map(|t| t.get())
        .unwrap_or(1);
    let mut values = vec![threads as i64];
    while threads % 2 == 0 {
        threads /= 2;
        values.push(threads as i64);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatmulConfig;
    use approx::assert_abs_diff_eq;

    fn tiling(threads: usize) -> TilingConfig {
        TilingConfig {
            l2_x: 4,
            l2_y: 4,
            l2_k_step: 4,
            l1_x: 2,
            l1_y: 2,
            l1_k_step: 2,
            threads,
        }
    }

    #[test]
    fn tiled_matches_naive_reference() {
        let problem = TuningProblem::prepare(MatmulConfig::new(16)).unwrap();
        let reference = naive_matmul(&problem);
        let kernel = TiledMatmul::new(tiling(2)).unwrap();
        let output = kernel.run(&problem);

        for i in 0..problem.n {
            for j in 0..problem.n {
                assert_abs_diff_eq!(output[(i, j)], reference[(i, j)], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn ragged_edges_are_clamped() {
        // 10 is not a multiple of any tile length in the config.
        let problem = TuningProblem::prepare(MatmulConfig::new(10)).unwrap();
        let reference = naive_matmul(&problem);
        let kernel = TiledMatmul::new(TilingConfig {
            l2_x: 4,
            l2_y: 6,
            l2_k_step: 8,
            l1_x: 3,
            l1_y: 4,
            l1_k_step: 4,
            threads: 1,
        })
        .unwrap();
        let output = kernel.run(&problem);

        for i in 0..problem.n {
            for j in 0..problem.n {
                assert_abs_diff_eq!(output[(i, j)], reference[(i, j)], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn invalid_tiling_is_rejected() {
        let config = TilingConfig {
            l2_x: 0,
            ..tiling(1)
        };
        assert!(TiledMatmul::new(config).is_err());
    }

    #[test]
    fn thread_values_start_at_hardware_parallelism() {
        let values = thread_count_values();
        assert!(!values.is_empty());
        assert!(values[0] >= 1);
        for pair in values.windows(2) {
            assert_eq!(pair[0], pair[1] * 2);
        }
    }
}
