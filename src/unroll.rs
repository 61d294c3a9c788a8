//! Unroller (C7): constructs the 1-, 2- or 3-copy unrollings of witness
//! and model needed by each obligation, sharing latches across copies per
//! time step but never across time steps (`spec.md §4.7`).

use aiger::{Aig, AigBuilder};

use crate::litmap::{self, LiteralMap};

/// As [`unroll_single`], but with a per-literal naming function.
pub fn unroll_single_named(
    to: &mut AigBuilder,
    aig: &Aig,
    namer: &dyn Fn(u32) -> Option<String>,
) -> Copy {
    let mut map = LiteralMap::new(aig.max_var);
    litmap::materialize_io_named(to, &mut map, aig, namer);
    litmap::materialize_ands(to, &mut map, aig);
    Copy { map }
}

/// As [`unroll_paired`], but with per-literal naming functions for each side.
pub fn unroll_paired_named(
    to: &mut AigBuilder,
    model: &Aig,
    witness: &Aig,
    shared: &[(u32, u32)],
    model_namer: &dyn Fn(u32) -> Option<String>,
    witness_namer: &dyn Fn(u32) -> Option<String>,
) -> PairedCopy {
    let concat = litmap::concatenate_named(to, model, witness, shared, model_namer, witness_namer);
    PairedCopy {
        model: Copy { map: concat.left_map },
        witness: Copy { map: concat.right_map },
    }
}

/// One time-step materialization of a single source AIG (witness or
/// model alone) into the shared check-AIG builder.
pub struct Copy {
    pub map: LiteralMap,
}

/// One time-step materialization of a shared model+witness pair: the
/// model is materialized first (`spec.md §5`: "model first, then
/// witness"), then the witness with its shared literals pre-bound.
pub struct PairedCopy {
    pub model: Copy,
    pub witness: Copy,
}

/// Materializes a single AIG (no sharing) as one time-step copy, with
/// every input/latch named `name` (a quantifier-level annotation, or
/// `None` for the default level).
pub fn unroll_single(to: &mut AigBuilder, aig: &Aig, name: Option<&str>) -> Copy {
    let mut map = LiteralMap::new(aig.max_var);
    litmap::materialize_io(to, &mut map, aig, name);
    litmap::materialize_ands(to, &mut map, aig);
    Copy { map }
}

/// Materializes one time step of model and witness, pre-binding the
/// witness's shared literals to the model's already-mapped literals.
///
/// `shared` pairs are `(model_lit, witness_lit)`. `model_name`/`witness_name`
/// annotate newly-allocated (non-shared) inputs of each side.
pub fn unroll_paired(
    to: &mut AigBuilder,
    model: &Aig,
    witness: &Aig,
    shared: &[(u32, u32)],
    model_name: Option<&str>,
    witness_name: Option<&str>,
) -> PairedCopy {
    let concat = litmap::concatenate(to, model, witness, shared, model_name, witness_name);
    PairedCopy {
        model: Copy { map: concat.left_map },
        witness: Copy { map: concat.right_map },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiger::AigBuilder as Builder;

    fn tiny() -> Aig {
        let mut b = Builder::new();
        let x = b.add_input(None);
        let y = b.add_input(None);
        let g = b.add_and(x, y);
        b.add_output("o", g);
        b.into_aig()
    }

    #[test]
    fn test_unroll_single_materializes_all_ands() {
        let aig = tiny();
        let mut to = AigBuilder::new();
        let copy = unroll_single(&mut to, &aig, None);
        assert!(copy.map.get(aig.outputs[0].lit).is_some());
    }

    #[test]
    fn test_unroll_paired_shares_literal() {
        let model = tiny();
        let witness = tiny();
        let shared = vec![(model.inputs[0].lit, witness.inputs[0].lit)];
        let mut to = AigBuilder::new();
        let paired = unroll_paired(&mut to, &model, &witness, &shared, None, None);
        assert_eq!(
            paired.model.map.get(model.inputs[0].lit),
            paired.witness.map.get(witness.inputs[0].lit)
        );
    }
}
