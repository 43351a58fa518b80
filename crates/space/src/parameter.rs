//! Tunable parameter definitions.

use crate::candidate::ParamValue;
use serde::{Deserialize, Serialize};

/// A single tunable dimension with a typed domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Parameter {
    /// Values are multiples of `step` within `[min, max]`. With
    /// `logarithmic`, the step multiplies instead of adding, so the domain
    /// doubles/halves (e.g. 16, 32, 64, 128 for step 2).
    ContinuousRange {
        name: String,
        default: i64,
        step: i64,
        min: i64,
        max: i64,
        logarithmic: bool,
    },
    /// An explicit enumerated domain. Non-randomizable sets pin a parameter
    /// that random sampling must not vary; a pinned single-valued set still
    /// joins random draws with its only value.
    FixedSet {
        name: String,
        values: Vec<ParamValue>,
        default_index: usize,
        randomizable: bool,
    },
}

impl Parameter {
    pub fn continuous(name: impl Into<String>, default: i64, step: i64, min: i64, max: i64) -> Self {
        Parameter::ContinuousRange {
            name: name.into(),
            default,
            step,
            min,
            max,
            logarithmic: false,
        }
    }

    /// Range whose step multiplies rather than adds.
    pub fn continuous_log(
        name: impl Into<String>,
        default: i64,
        step: i64,
        min: i64,
        max: i64,
    ) -> Self {
        Parameter::ContinuousRange {
            name: name.into(),
            default,
            step,
            min,
            max,
            logarithmic: true,
        }
    }

    pub fn fixed_set(name: impl Into<String>, values: Vec<ParamValue>, randomizable: bool) -> Self {
        Parameter::FixedSet {
            name: name.into(),
            values,
            default_index: 0,
            randomizable,
        }
    }

    pub fn fixed_ints(name: impl Into<String>, values: &[i64]) -> Self {
        Self::fixed_set(
            name,
            values.iter().copied().map(ParamValue::Int).collect(),
            true,
        )
    }

    pub fn name(&self) -> &str {
        match self {
            Parameter::ContinuousRange { name, .. } => name,
            Parameter::FixedSet { name, .. } => name,
        }
    }

    /// All valid values, in domain order. Domains are small by construction
    /// (tens of values), so materializing them is fine.
    pub fn domain_values(&self) -> Vec<ParamValue> {
        match self {
            Parameter::ContinuousRange {
                step,
                min,
                max,
                logarithmic,
                ..
            } => {
                let mut values = Vec::new();
                let mut v = *min;
                while v <= *max {
                    values.push(ParamValue::Int(v));
                    v = if *logarithmic { v * step } else { v + step };
                }
                values
            }
            Parameter::FixedSet { values, .. } => values.clone(),
        }
    }

    /// `None` only for domains [`validate`](Self::validate) rejects, such as
    /// an empty fixed set.
    pub fn default_value(&self) -> Option<ParamValue> {
        match self {
            Parameter::ContinuousRange { default, .. } => Some(ParamValue::Int(*default)),
            Parameter::FixedSet {
                values,
                default_index,
                ..
            } => values.get(*default_index).or_else(|| values.first()).cloned(),
        }
    }

    pub fn is_randomizable(&self) -> bool {
        match self {
            Parameter::ContinuousRange { .. } => true,
            Parameter::FixedSet { randomizable, .. } => *randomizable,
        }
    }

    pub fn index_of(&self, value: &ParamValue) -> Option<usize> {
        self.domain_values().iter().position(|v| v == value)
    }

    /// Check the domain definition itself.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Parameter::ContinuousRange {
                name,
                default,
                step,
                min,
                max,
                logarithmic,
            } => {
                if min > max {
                    return Err(format!("parameter {}: min {} > max {}", name, min, max));
                }
                if *logarithmic {
                    if *step < 2 {
                        return Err(format!(
                            "parameter {}: logarithmic step must be >= 2, got {}",
                            name, step
                        ));
                    }
                    if *min <= 0 {
                        return Err(format!(
                            "parameter {}: logarithmic range requires min > 0, got {}",
                            name, min
                        ));
                    }
                } else if *step <= 0 {
                    return Err(format!("parameter {}: step must be > 0, got {}", name, step));
                }
                if self.index_of(&ParamValue::Int(*default)).is_none() {
                    return Err(format!(
                        "parameter {}: default {} is not in the domain",
                        name, default
                    ));
                }
                Ok(())
            }
            Parameter::FixedSet {
                name,
                values,
                default_index,
                ..
            } => {
                if values.is_empty() {
                    return Err(format!("parameter {}: empty fixed set", name));
                }
                if *default_index >= values.len() {
                    return Err(format!(
                        "parameter {}: default index {} out of range",
                        name, default_index
                    ));
                }
                Ok(())
            }
        }
    }
}
