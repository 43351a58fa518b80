//! Fully-resolved parameter assignments.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single resolved parameter value.
///
/// Tile sizes and thread counts are integers; code-generation switches like
/// register widths are carried as text and passed through to the builder
/// unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Text(String),
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Text(_) => None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        ParamValue::Text(value.into())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

/// One fully-resolved assignment of values to all tunable parameters.
///
/// Candidates are immutable once constructed; derived candidates are produced
/// with [`Candidate::with_value`] so the evaluation history stays
/// reconstructable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    values: BTreeMap<String, ParamValue>,
}

impl Candidate {
    pub fn new(values: BTreeMap<String, ParamValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Integer value of a parameter, for validators and builders.
    pub fn int(&self, name: &str) -> Result<i64, String> {
        match self.values.get(name) {
            Some(ParamValue::Int(v)) => Ok(*v),
            Some(ParamValue::Text(v)) => v
                .parse::<i64>()
                .map_err(|_| format!("parameter {} is not an integer: {}", name, v)),
            None => Err(format!("parameter {} not present in candidate", name)),
        }
    }

    /// New candidate with one value replaced.
    pub fn with_value(&self, name: impl Into<String>, value: ParamValue) -> Self {
        let mut values = self.values.clone();
        values.insert(name.into(), value);
        Self { values }
    }

    /// Canonical key: sorted `name=value` pairs. Used for artifact caching and
    /// measurement namespacing.
    pub fn canonical_key(&self) -> String {
        let pairs: Vec<String> = self
            .values
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        pairs.join(",")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_key())
    }
}
