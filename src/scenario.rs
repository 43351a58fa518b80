//! The combined blocked-matmul tuning scenario: parameter space and
//! constraints for the hierarchically tiled kernel.

use blocktune_kernels::thread_count_values;
use blocktune_space::{Candidate, ParamValue, Parameter, ParameterSpace};

/// Tuning space for the combined kernel. Six tile-size axes, two pinned
/// code-generation switches and the kernel thread count.
pub fn combined_parameter_space() -> ParameterSpace {
    let mut space = ParameterSpace::new();
    space.add_parameter(Parameter::continuous("L2_X", 60, 10, 40, 100));
    space.add_parameter(Parameter::continuous_log("L2_Y", 64, 2, 16, 128));
    space.add_parameter(Parameter::continuous_log("L2_K_STEP", 64, 2, 32, 256));
    space.add_parameter(Parameter::continuous("L1_X", 30, 5, 10, 40));
    space.add_parameter(Parameter::continuous_log("L1_Y", 64, 2, 16, 64));
    space.add_parameter(Parameter::continuous_log("L1_K_STEP", 32, 2, 16, 256));
    space.add_parameter(Parameter::fixed_set(
        "X_REG",
        vec![ParamValue::text("5")],
        false,
    ));
    space.add_parameter(Parameter::fixed_set(
        "Y_BASE_WIDTH",
        vec![ParamValue::text("2")],
        false,
    ));
    space.add_parameter(Parameter::fixed_ints("KERNEL_THREADS", &thread_count_values()));
    space.set_precompile_validator(tile_divisibility);
    space
}

/// Each L2 tile length must be evenly divisible by its L1 counterpart, on
/// all three axes independently.
fn tile_divisibility(candidate: &Candidate) -> Result<(), String> {
    for (outer, inner) in [
        ("L2_X", "L1_X"),
        ("L2_Y", "L1_Y"),
        ("L2_K_STEP", "L1_K_STEP"),
    ] {
        let outer_value = candidate.int(outer)?;
        let inner_value = candidate.int(inner)?;
        if inner_value == 0 || outer_value % inner_value != 0 {
            return Err(format!(
                "blocking error: {} ({}) not divisible by {} ({})",
                outer, outer_value, inner, inner_value
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_space_definition_is_valid() {
        let space = combined_parameter_space();
        assert!(space.validate_definition().is_ok());
        assert_eq!(space.len(), 9);
        // Pinned single-valued switches still allow random sampling.
        assert!(space.is_randomizable());
    }

    #[test]
    fn random_draws_keep_the_pinned_switches() {
        fastrand::seed(11);
        let space = combined_parameter_space();
        for _ in 0..10 {
            let candidate = space.random_candidate().unwrap();
            assert_eq!(candidate.get("X_REG"), Some(&ParamValue::text("5")));
            assert_eq!(candidate.get("Y_BASE_WIDTH"), Some(&ParamValue::text("2")));
            assert!(candidate.int("L2_X").unwrap() >= 40);
        }
    }

    #[test]
    fn default_candidate_passes_the_divisibility_checks() {
        let space = combined_parameter_space();
        let candidate = space.default_candidate();
        assert!(space.validate(&candidate).is_ok());
        assert_eq!(candidate.int("L2_X").unwrap(), 60);
        assert_eq!(candidate.int("L1_X").unwrap(), 30);
    }

    #[test]
    fn non_dividing_tiles_are_rejected_per_axis() {
        let space = combined_parameter_space();
        let base = space.default_candidate();

        let bad = base
            .with_value("L2_X", ParamValue::Int(10))
            .with_value("L1_X", ParamValue::Int(4));
        let detail = space.validate(&bad).unwrap_err();
        assert!(detail.contains("L2_X"));

        let ok = base
            .with_value("L2_X", ParamValue::Int(10))
            .with_value("L1_X", ParamValue::Int(5));
        assert!(space.validate(&ok).is_ok());

        let bad_k = base
            .with_value("L2_K_STEP", ParamValue::Int(64))
            .with_value("L1_K_STEP", ParamValue::Int(48));
        let detail = space.validate(&bad_k).unwrap_err();
        assert!(detail.contains("L2_K_STEP"));
    }

    #[test]
    fn thread_counts_are_positive_halvings() {
        let counts = thread_count_values();
        assert!(!counts.is_empty());
        assert!(counts.iter().all(|&t| t >= 1));
        for pair in counts.windows(2) {
            assert_eq!(pair[0], pair[1] * 2);
        }
    }
}
