//! Typed, read-only view over an AIG (C1): reencoding checks, symbol
//! annotation parsing, and the warnings the original checker prints for
//! non-fatal structural oddities.

use aiger::Aig;
use log::warn;
use std::path::Path;

use crate::error::{CertError, Result};

/// A parsed `= <N>` / `< <N>` annotation on a witness input or latch symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    /// `= <N>`: this witness signal simulates model literal `N`.
    Simulates(u32),
    /// `< <N>`: in the intervened liveness copy, this witness signal is
    /// rebound to the other copy's value of witness literal `N`.
    Intervention(u32),
}

/// Parses a witness symbol's `=`/`<` prefix annotation, per `spec.md §4.1`.
pub fn parse_annotation(symbol: &str) -> Option<Annotation> {
    let symbol = symbol.trim();
    if let Some(rest) = symbol.strip_prefix('=') {
        rest.trim().parse().ok().map(Annotation::Simulates)
    } else if let Some(rest) = symbol.strip_prefix('<') {
        rest.trim().parse().ok().map(Annotation::Intervention)
    } else {
        None
    }
}

/// Returns whether a witness input symbol marks an oracle input, i.e. it
/// begins with `oracle`.
pub fn is_oracle_symbol(symbol: &str) -> bool {
    symbol.trim_start().starts_with("oracle")
}

/// A validated, read-only view over one loaded AIG, checked for the
/// invariants the core requires (reencoded inputs/latches) and carrying
/// the warnings accumulated while validating it.
pub struct AigView {
    pub aig: Aig,
    /// The literal used for the safety property: the first `bad` literal,
    /// or the first plain output if there is no `bad` signal.
    pub property_lit: Option<u32>,
}

impl AigView {
    /// Validates a freshly-read AIG, emitting warnings for non-fatal
    /// structural oddities and failing on the fatal reencoding invariant.
    pub fn validate(path: &Path, aig: Aig) -> Result<Self> {
        if !aig.reencoded() {
            return Err(CertError::Structure {
                path: path.to_path_buf(),
                message: "inputs/latches are not reencoded (2,4,.. then latches)".to_string(),
            });
        }
        if aig.bad.len() + aig.outputs.len() > 1 && !aig.bad.is_empty() {
            warn!(
                "{}: {} properties present, only the first `bad` is used for safety obligations",
                path.display(),
                aig.bad.len() + aig.outputs.len()
            );
        } else if aig.outputs.len() > 1 {
            warn!(
                "{}: {} outputs present, only the first is used for safety obligations",
                path.display(),
                aig.outputs.len()
            );
        }
        if !aig.justice.is_empty() {
            for (i, j) in aig.justice.iter().enumerate() {
                if j.lits.is_empty() {
                    warn!(
                        "{}: justice property {} has no literals, treating as vacuously true",
                        path.display(),
                        i
                    );
                }
            }
        }
        let property_lit = aig
            .bad
            .first()
            .map(|s| s.lit)
            .or_else(|| aig.outputs.first().map(|s| s.lit));
        Ok(Self { aig, property_lit })
    }

    /// Returns the oracle input literals: witness inputs whose symbol
    /// begins with `oracle`.
    pub fn oracle_inputs(&self) -> Vec<u32> {
        self.aig
            .inputs
            .iter()
            .filter(|i| i.name.as_deref().is_some_and(is_oracle_symbol))
            .map(|i| i.lit)
            .collect()
    }
}
