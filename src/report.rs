//! YAML rendering of decoupled and evaluated matrix elements.
use std::collections::BTreeMap;
use serde::{Serialize, Serializer};
use super::decouple::{Decoupled, Term};
use super::error::Result;
use super::evaluate::{Evaluated, EvaluatedTerm};
use super::label::Phase;
use super::scalar::Scalar;

#[derive(Serialize)]
struct TermReport<'a> {
    coeff: &'a Scalar,
    #[serde(skip_serializing_if = "Option::is_none")]
    phase: Option<&'a Phase>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    deltas: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    weights: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    symbols: Vec<String>,
    elements: BTreeMap<&'a str, String>,
}

impl<'a> From<&'a Term> for TermReport<'a> {
    fn from(t: &'a Term) -> Self {
        TermReport {
            coeff: &t.coeff,
            phase: if t.phase.is_trivial() { None } else { Some(&t.phase) },
            deltas: t.deltas.iter()
                .map(|&(ref a, ref b)| format!("δ({}, {})", a, b))
                .collect(),
            weights: t.hats.iter()
                .map(|(j, e)| format!("(2*{} + 1)^({}/2)", j, e))
                .collect(),
            symbols: t.wigners.iter().map(|w| w.to_string()).collect(),
            elements: t.elements.iter()
                .map(|(s, e)| (s.name(), e.to_string()))
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct EvaluatedReport<'a> {
    coeff: &'a Scalar,
    elements: BTreeMap<&'a str, String>,
}

impl<'a> From<&'a EvaluatedTerm> for EvaluatedReport<'a> {
    fn from(t: &'a EvaluatedTerm) -> Self {
        EvaluatedReport {
            coeff: &t.coeff,
            elements: t.elements.iter()
                .map(|(s, e)| (s.name(), e.to_string()))
                .collect(),
        }
    }
}

impl Serialize for Decoupled {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.terms().iter().map(TermReport::from))
    }
}

impl Serialize for Evaluated {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.terms().iter().map(EvaluatedReport::from))
    }
}

/// Render as a YAML document.
pub fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}
