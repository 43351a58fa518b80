//! Tunable parameter domains and candidate generation for blocktune.

pub mod candidate;
pub mod parameter;
pub mod space;

pub use candidate::{Candidate, ParamValue};
pub use parameter::Parameter;
pub use space::{CandidateEnumeration, ParameterSpace};
