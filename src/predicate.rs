//! Predicate encoder (C8): emits AIG subcircuits for R, R|K, F, F|K, C, P,
//! Q-tuples and N-with-intervention at a given time/copy (`spec.md §4.8`).

use std::collections::HashMap;

use aiger::{strip, Aig, AigBuilder, Literal};

use crate::litmap::LiteralMap;

/// `a <-> b`.
fn equiv(to: &mut AigBuilder, a: Literal, b: Literal) -> Literal {
    let fwd = to.add_implies(a, b);
    let bwd = to.add_implies(b, a);
    to.add_and(fwd, bwd)
}

/// **R**/**R|K**: conjunction over latches (optionally restricted to `k`)
/// of `map[l.lit] <-> map[l.reset]`.
pub fn encode_r(to: &mut AigBuilder, aig: &Aig, map: &LiteralMap, k: Option<&[u32]>) -> Literal {
    let mut atoms = Vec::new();
    for latch in &aig.latches {
        if let Some(k) = k {
            if !k.iter().any(|&kl| strip(kl) == strip(latch.lit)) {
                continue;
            }
        }
        let cur = map.get(latch.lit).expect("latch mapped");
        let rst = map.get(latch.reset).expect("latch reset mapped");
        atoms.push(equiv(to, cur, rst));
    }
    to.conj_balanced(atoms)
}

/// **F**/**F|K**: conjunction over latches (optionally restricted to `k`)
/// of `map_t[l.next] <-> map_t1[l.lit]`.
pub fn encode_f(
    to: &mut AigBuilder,
    aig: &Aig,
    map_t: &LiteralMap,
    map_t1: &LiteralMap,
    k: Option<&[u32]>,
) -> Literal {
    let mut atoms = Vec::new();
    for latch in &aig.latches {
        if let Some(k) = k {
            if !k.iter().any(|&kl| strip(kl) == strip(latch.lit)) {
                continue;
            }
        }
        let next = map_t.get(latch.next).expect("latch next mapped");
        let cur1 = map_t1.get(latch.lit).expect("latch mapped at t+1");
        atoms.push(equiv(to, next, cur1));
    }
    to.conj_balanced(atoms)
}

/// **C**: conjunction over all constraint literals under `map`.
pub fn encode_c(to: &mut AigBuilder, aig: &Aig, map: &LiteralMap) -> Literal {
    let atoms: Vec<Literal> = aig
        .constraints
        .iter()
        .map(|c| map.get(c.lit).expect("constraint mapped"))
        .collect();
    to.conj_balanced(atoms)
}

/// **P**: the negation of the circuit's safety property (first `bad`, or
/// first output if no `bad`), under `map`. `true` if the AIG declares no
/// property at all.
pub fn encode_p(to: &mut AigBuilder, property_lit: Option<u32>, map: &LiteralMap) -> Literal {
    match property_lit {
        Some(lit) => {
            let p = map.get(lit).expect("property literal mapped");
            !p
        }
        None => Literal::TRUE,
    }
}

/// **Q\[j\]**: the fairness atoms followed by the literals of justice
/// property `j`, each negated; missing fairness/justice entries (when the
/// witness has fewer than the model) are treated as `true`.
pub fn encode_q(
    to: &mut AigBuilder,
    aig: &Aig,
    map: &LiteralMap,
    j: usize,
    num_model_fairness: usize,
) -> Vec<Literal> {
    let mut atoms = Vec::with_capacity(num_model_fairness + 1);
    for i in 0..num_model_fairness {
        match aig.fairness.get(i) {
            Some(f) => atoms.push(!map.get(f.lit).expect("fairness literal mapped")),
            None => atoms.push(Literal::TRUE),
        }
    }
    let _ = to;
    if let Some(j) = aig.justice.get(j) {
        for &lit in &j.lits {
            atoms.push(!map.get(lit).expect("justice literal mapped"));
        }
    } else {
        atoms.push(Literal::TRUE);
    }
    atoms
}

/// **N\[j\]** without intervention (the `N'_{xx}` case): the negation of
/// the last literal of justice property `j`, or `true` if it has none.
pub fn encode_n(aig: &Aig, map: &LiteralMap, j: usize) -> Literal {
    match aig.justice.get(j).and_then(|jp| jp.lits.last()) {
        Some(&lit) => !map.get(lit).expect("justice last literal mapped"),
        None => Literal::TRUE,
    }
}

/// **N\[j\] with intervention** (`N'_{xy}`): rebuilds the witness's cone
/// feeding justice property `j`'s last literal with a mixed environment —
/// inputs/latches come from the `x`-copy map, except the variables named
/// by `interventions` (pairs `(target_lit, y_source_lit)`) which are
/// rebound to `y_map`'s value of `y_source_lit`. `true` if the witness has
/// no justice property `j` (missing justice property defaults to true,
/// same as [`encode_n`]).
pub fn encode_n_with_intervention(
    to: &mut AigBuilder,
    witness: &Aig,
    x_map: &LiteralMap,
    y_map: &LiteralMap,
    interventions: &[(u32, u32)],
    j: usize,
) -> Literal {
    let Some(lit) = witness.justice.get(j).and_then(|jp| jp.lits.last()) else {
        return Literal::TRUE;
    };

    let substitutions: HashMap<u32, u32> = interventions
        .iter()
        .map(|&(target, source)| (strip(target), source))
        .collect();

    let mut mixed = LiteralMap::new(witness.max_var);
    for input in &witness.inputs {
        let v = strip(input.lit);
        let value = match substitutions.get(&v) {
            Some(&source) => y_map.get(source).expect("intervention source mapped"),
            None => x_map.get(input.lit).expect("witness input mapped in x-copy"),
        };
        mixed.bind(input.lit, value);
    }
    for latch in &witness.latches {
        let v = strip(latch.lit);
        let value = match substitutions.get(&v) {
            Some(&source) => y_map.get(source).expect("intervention source mapped"),
            None => x_map.get(latch.lit).expect("witness latch mapped in x-copy"),
        };
        mixed.bind(latch.lit, value);
    }
    for and in &witness.ands {
        if mixed.is_mapped(and.lhs) {
            continue;
        }
        let v = strip(and.lhs);
        if let Some(&source) = substitutions.get(&v) {
            let value = y_map.get(source).expect("intervention source mapped");
            mixed.bind(and.lhs, value);
            continue;
        }
        let rhs0 = mixed.get(and.rhs0).expect("intervention cone operand mapped");
        let rhs1 = mixed.get(and.rhs1).expect("intervention cone operand mapped");
        let out = to.add_and(rhs0, rhs1);
        mixed.bind(and.lhs, out);
    }

    !mixed.get(*lit).expect("justice literal mapped in mixed copy")
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiger::AigBuilder;
    use crate::litmap::materialize_io;

    #[test]
    fn test_encode_r_trivial_reset() {
        let mut src = Aig::default();
        src.max_var = 1;
        src.latches.push(aiger::Latch {
            lit: 2,
            next: 2,
            reset: 0, // resets to constant false
            name: None,
        });
        let mut to = AigBuilder::new();
        let mut map = LiteralMap::new(src.max_var);
        materialize_io(&mut to, &mut map, &src, None);
        let r = encode_r(&mut to, &src, &map, None);
        // latch <-> FALSE is just !latch, not a constant, but must not panic
        let _ = r;
    }

    #[test]
    fn test_encode_n_without_justice_is_true() {
        let mut b = AigBuilder::new();
        b.add_input(None);
        let aig = b.into_aig();
        let map = LiteralMap::new(aig.max_var);
        assert_eq!(encode_n(&aig, &map, 0), Literal::TRUE);
    }
}
