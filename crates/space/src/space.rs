//! Ordered parameter collections with constraint checks and candidate
//! generation.

use crate::candidate::{Candidate, ParamValue};
use crate::parameter::Parameter;
use std::collections::BTreeMap;
use std::sync::Arc;

type PrecompileValidator = Arc<dyn Fn(&Candidate) -> Result<(), String> + Send + Sync>;

/// An ordered sequence of parameters plus an optional precompile validator.
///
/// The validator is a predicate over a fully-resolved candidate that must
/// pass before the candidate may be built; it is never handed partial
/// candidates. It must be side-effect-free: it runs far more often than
/// builds succeed.
#[derive(Clone, Default)]
pub struct ParameterSpace {
    parameters: Vec<Parameter>,
    validator: Option<PrecompileValidator>,
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    pub fn set_precompile_validator<F>(&mut self, validator: F)
    where
        F: Fn(&Candidate) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Check the space definition: non-empty, unique names, valid domains.
    pub fn validate_definition(&self) -> Result<(), String> {
        if self.parameters.is_empty() {
            return Err("parameter space has zero parameters".to_string());
        }
        for (idx, parameter) in self.parameters.iter().enumerate() {
            parameter.validate()?;
            let dup = self.parameters[..idx]
                .iter()
                .any(|p| p.name() == parameter.name());
            if dup {
                return Err(format!("duplicate parameter name: {}", parameter.name()));
            }
        }
        Ok(())
    }

    /// Resolve every parameter to its default. Never fails for a valid
    /// space; parameters with a domain `validate_definition` would reject
    /// are skipped.
    pub fn default_candidate(&self) -> Candidate {
        let values: BTreeMap<String, ParamValue> = self
            .parameters
            .iter()
            .filter_map(|p| Some((p.name().to_string(), p.default_value()?)))
            .collect();
        Candidate::new(values)
    }

    /// Apply the precompile validator, if any. Absence means always valid.
    pub fn validate(&self, candidate: &Candidate) -> Result<(), String> {
        match &self.validator {
            Some(validator) => validator(candidate),
            None => Ok(()),
        }
    }

    /// Candidates one step away: for each parameter, one step down and one
    /// step up along its domain, all other parameters held fixed.
    pub fn neighbors(&self, candidate: &Candidate) -> Vec<Candidate> {
        let mut result = Vec::new();
        for parameter in &self.parameters {
            let current = match candidate.get(parameter.name()) {
                Some(value) => value,
                None => continue,
            };
            let domain = parameter.domain_values();
            let idx = match domain.iter().position(|v| v == current) {
                Some(idx) => idx,
                None => continue,
            };
            if idx > 0 {
                result.push(candidate.with_value(parameter.name(), domain[idx - 1].clone()));
            }
            if idx + 1 < domain.len() {
                result.push(candidate.with_value(parameter.name(), domain[idx + 1].clone()));
            }
        }
        result
    }

    /// True when every parameter can take part in a random draw. Pinned
    /// single-valued sets participate trivially with their only value.
    pub fn is_randomizable(&self) -> bool {
        self.parameters
            .iter()
            .all(|p| p.is_randomizable() || p.domain_values().len() == 1)
    }

    /// Draw independently and uniformly from each parameter's domain. Pinned
    /// single-valued parameters always contribute their sole value. Uses the
    /// global `fastrand` state; seed it for reproducible runs.
    pub fn random_candidate(&self) -> Result<Candidate, String> {
        if let Some(fixed) = self
            .parameters
            .iter()
            .find(|p| !p.is_randomizable() && p.domain_values().len() > 1)
        {
            return Err(format!(
                "parameter {} is pinned with multiple values; the space does not support random sampling",
                fixed.name()
            ));
        }
        let values: BTreeMap<String, ParamValue> = self
            .parameters
            .iter()
            .map(|p| {
                let domain = p.domain_values();
                let pick = domain[fastrand::usize(..domain.len())].clone();
                (p.name().to_string(), pick)
            })
            .collect();
        Ok(Candidate::new(values))
    }

    /// Full Cartesian product, declaration order outermost-to-innermost.
    /// Restartable: each call yields an identical sequence.
    pub fn enumerate(&self) -> CandidateEnumeration {
        CandidateEnumeration::new(self)
    }

    /// Total number of candidates `enumerate` will produce.
    pub fn size(&self) -> usize {
        self.parameters
            .iter()
            .map(|p| p.domain_values().len())
            .product()
    }
}

/// Lazy, deterministic Cartesian product over all parameter domains.
pub struct CandidateEnumeration {
    names: Vec<String>,
    domains: Vec<Vec<ParamValue>>,
    indices: Vec<usize>,
    exhausted: bool,
}

impl CandidateEnumeration {
    fn new(space: &ParameterSpace) -> Self {
        let names = space
            .parameters
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        let domains: Vec<Vec<ParamValue>> = space
            .parameters
            .iter()
            .map(|p| p.domain_values())
            .collect();
        let exhausted = domains.is_empty() || domains.iter().any(|d| d.is_empty());
        Self {
            names,
            domains,
            indices: vec![0; space.parameters.len()],
            exhausted,
        }
    }
}

impl Iterator for CandidateEnumeration {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.exhausted {
            return None;
        }
        let values: BTreeMap<String, ParamValue> = self
            .names
            .iter()
            .zip(self.domains.iter())
            .zip(self.indices.iter())
            .map(|((name, domain), &idx)| (name.clone(), domain[idx].clone()))
            .collect();

        // Odometer advance, last parameter innermost.
        for pos in (0..self.indices.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.domains[pos].len() {
                break;
            }
            self.indices[pos] = 0;
            if pos == 0 {
                self.exhausted = true;
            }
        }

        Some(Candidate::new(values))
    }
}
