//! Shared-signal resolver (C3): determines the correspondence between
//! witness and model inputs/latches from comments, symbol annotations, or
//! positional default, per `spec.md §4.3`.

use std::collections::HashSet;

use aiger::Aig;
use log::{debug, warn};

use crate::accessor::{parse_annotation, Annotation};
use crate::error::{CertError, Result};

/// The resolved shared-signal mapping between a model and a witness.
pub struct SharedResolution {
    /// `(model_lit, witness_lit)` pairs: the "unchanged" part of the state
    /// space, in resolver-returned order.
    pub shared: Vec<(u32, u32)>,
    /// `(target_lit, source_lit)` pairs, both witness literals: liveness
    /// obligations substitute `target_lit`'s value with the other copy's
    /// value of `source_lit` when rebuilding the `y`-intervened cone.
    pub intervention: Vec<(u32, u32)>,
    /// Witness inputs/latches with no counterpart in `shared`.
    pub extended: Vec<u32>,
}

/// Finds a `<TAG> <N>` comment line and returns its index and `N`.
fn find_tagged_block(comments: &[String], tag: &str) -> Option<(usize, usize)> {
    comments.iter().enumerate().find_map(|(i, line)| {
        let rest = line.strip_prefix(tag)?;
        let n: usize = rest.trim().parse().ok()?;
        Some((i, n))
    })
}

/// Reads `n` comment lines starting right after index `start`, each parsed
/// as two whitespace-separated literals, in `(first, second)` order.
fn read_pairs(comments: &[String], start: usize, n: usize) -> Result<Vec<(u32, u32)>> {
    let mut pairs = Vec::with_capacity(n);
    for line in comments.iter().skip(start + 1).take(n) {
        let mut it = line.split_ascii_whitespace();
        let a: u32 = it
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| CertError::Parse {
                path: "witness".into(),
                message: format!("malformed mapping line: '{line}'"),
            })?;
        let b: u32 = it
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| CertError::Parse {
                path: "witness".into(),
                message: format!("malformed mapping line: '{line}'"),
            })?;
        pairs.push((a, b));
    }
    if pairs.len() != n {
        return Err(CertError::Parse {
            path: "witness".into(),
            message: format!("mapping block declared {n} entries but only {} found", pairs.len()),
        });
    }
    Ok(pairs)
}

fn witness_io_literals(witness: &Aig) -> Vec<u32> {
    witness
        .inputs
        .iter()
        .map(|i| i.lit)
        .chain(witness.latches.iter().map(|l| l.lit))
        .collect()
}

/// Resolves the shared-signal mapping between `model` and `witness`.
pub fn resolve(model: &Aig, witness: &Aig) -> Result<SharedResolution> {
    let intervention = match find_tagged_block(&witness.comments, "INTERVENTION") {
        Some((idx, n)) => read_pairs(&witness.comments, idx, n)?,
        None => Vec::new(),
    };

    let mut shared = if let Some((idx, n)) = find_tagged_block(&witness.comments, "MAPPING") {
        debug!("shared signals resolved from MAPPING comment ({n} entries)");
        // `MAPPING` lines are `<witness_lit> <model_lit>`.
        read_pairs(&witness.comments, idx, n)?
            .into_iter()
            .map(|(w, m)| (m, w))
            .collect()
    } else if let Some((idx, n)) = find_tagged_block(&witness.comments, "WITNESS_CIRCUIT") {
        debug!("shared signals resolved from legacy WITNESS_CIRCUIT comment ({n} entries)");
        // Legacy `WITNESS_CIRCUIT` lines are `<model_lit> <witness_lit>`,
        // the reverse order of `MAPPING`; whitespace-tolerance is not
        // documented for this path and is not assumed beyond simple
        // single-space splitting, see `spec.md §9`.
        read_pairs(&witness.comments, idx, n)?
    } else {
        let mut from_symbols = Vec::new();
        for lit in witness_io_literals(witness) {
            if let Some(sym) = witness.symbol(lit) {
                if let Some(Annotation::Simulates(model_lit)) = parse_annotation(sym) {
                    from_symbols.push((model_lit, lit));
                }
            }
        }
        if !from_symbols.is_empty() {
            debug!(
                "shared signals resolved from {} symbol `=` annotations",
                from_symbols.len()
            );
            from_symbols
        } else {
            debug!("shared signals resolved positionally");
            let n_inputs = model.inputs.len().min(witness.inputs.len());
            let n_latches = model.latches.len().min(witness.latches.len());
            model.inputs[..n_inputs]
                .iter()
                .zip(&witness.inputs[..n_inputs])
                .map(|(m, w)| (m.lit, w.lit))
                .chain(
                    model.latches[..n_latches]
                        .iter()
                        .zip(&witness.latches[..n_latches])
                        .map(|(m, w)| (m.lit, w.lit)),
                )
                .collect()
        }
    };

    // Symbol-based interventions (`<` prefix) are additive regardless of
    // which primary shared-signal source was used. The annotated number
    // names a witness literal (the source this signal's value is rebound
    // to in the intervened copy), not a model literal.
    let mut intervention = intervention;
    for lit in witness_io_literals(witness) {
        if let Some(sym) = witness.symbol(lit) {
            if let Some(Annotation::Intervention(source_lit)) = parse_annotation(sym) {
                intervention.push((lit, source_lit));
            }
        }
    }

    shared.sort_by_key(|&(m, _)| m);
    let mut seen_model = HashSet::new();
    for &(model_lit, _) in &shared {
        if !seen_model.insert(model_lit) {
            return Err(CertError::Mapping {
                message: format!("model literal {model_lit} claimed by more than one witness literal"),
            });
        }
    }
    for &(model_lit, witness_lit) in &shared {
        if !model.is_input(model_lit) && !model.is_latch(model_lit) {
            return Err(CertError::Mapping {
                message: format!("mapping model literal {model_lit} is not an input/latch"),
            });
        }
        if !witness.is_input(witness_lit) && !witness.is_latch(witness_lit) {
            return Err(CertError::Mapping {
                message: format!("mapping witness literal {witness_lit} is not an input/latch"),
            });
        }
    }

    let shared_witness: HashSet<u32> = shared.iter().map(|&(_, w)| aiger::strip(w)).collect();
    let extended: Vec<u32> = witness_io_literals(witness)
        .into_iter()
        .filter(|&l| !shared_witness.contains(&aiger::strip(l)))
        .collect();

    if extended.is_empty()
        && model.inputs.len() + model.latches.len() != witness.inputs.len() + witness.latches.len()
    {
        warn!("model and witness IO counts differ and no witness extension was detected");
    }

    Ok(SharedResolution {
        shared,
        intervention,
        extended,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiger::AigBuilder;

    fn aig_with_inputs(n: usize) -> Aig {
        let mut b = AigBuilder::new();
        for i in 0..n {
            b.add_input(Some(&format!("x{i}")));
        }
        b.into_aig()
    }

    #[test]
    fn test_positional_default() {
        let model = aig_with_inputs(2);
        let witness = aig_with_inputs(2);
        let res = resolve(&model, &witness).unwrap();
        assert_eq!(res.shared.len(), 2);
        assert!(res.extended.is_empty());
    }

    #[test]
    fn test_extension_detected() {
        let model = aig_with_inputs(1);
        let witness = aig_with_inputs(2);
        let res = resolve(&model, &witness).unwrap();
        assert_eq!(res.shared.len(), 1);
        assert_eq!(res.extended.len(), 1);
    }

    #[test]
    fn test_mapping_comment_takes_priority() {
        let model = aig_with_inputs(2);
        let mut witness = aig_with_inputs(2);
        witness.comments.push("MAPPING 1".to_string());
        witness.comments.push(format!(
            "{} {}",
            witness.inputs[1].lit, model.inputs[0].lit
        ));
        let res = resolve(&model, &witness).unwrap();
        assert_eq!(res.shared, vec![(model.inputs[0].lit, witness.inputs[1].lit)]);
        assert_eq!(res.extended.len(), 1);
    }

    #[test]
    fn test_duplicate_model_literal_is_mapping_error() {
        let model = aig_with_inputs(1);
        let mut witness = aig_with_inputs(2);
        witness.comments.push("MAPPING 2".to_string());
        witness
            .comments
            .push(format!("{} {}", witness.inputs[0].lit, model.inputs[0].lit));
        witness
            .comments
            .push(format!("{} {}", witness.inputs[1].lit, model.inputs[0].lit));
        assert!(matches!(
            resolve(&model, &witness),
            Err(CertError::Mapping { .. })
        ));
    }
}
