//! Literal-map builder (C2): materializes one AIG's literals into a target
//! (check) AIG under construction, tracking which source literals are
//! already bound and preserving negation duality.

use aiger::{lit2var, sign, strip, Aig, AigBuilder, Literal};
use log::trace;

const INVALID: u32 = u32::MAX;

/// A literal map from one source AIG's variables to literals of a check
/// AIG under construction.
///
/// Indexed by *variable* rather than literal: `stored[v]` holds the check
/// literal that variable `v`'s positive literal maps to, so that
/// `map(l) = stored[var(l)] ^ sign(l)` always satisfies
/// `map(l^1) == map(l)^1` by construction.
pub struct LiteralMap {
    stored: Vec<u32>,
}

impl LiteralMap {
    /// Allocates a fresh, empty map for a source AIG with the given
    /// maximum variable index, with the constants pre-bound.
    pub fn new(max_var: u32) -> Self {
        let mut stored = vec![INVALID; max_var as usize + 1];
        stored[0] = aiger::FALSE;
        Self { stored }
    }

    /// Returns whether the variable underlying `lit` is already bound.
    pub fn is_mapped(&self, lit: u32) -> bool {
        self.stored[lit2var(lit) as usize] != INVALID
    }

    /// Returns the check-AIG literal `lit` maps to, if bound.
    pub fn get(&self, lit: u32) -> Option<Literal> {
        let v = self.stored[lit2var(lit) as usize];
        if v == INVALID {
            None
        } else {
            Some(Literal(v ^ sign(lit)))
        }
    }

    /// Records `map(from) == to`, and therefore `map(from^1) == to^1`.
    ///
    /// # Panics
    ///
    /// Panics if `from`'s variable is already bound (precondition: `from`
    /// unmaterialized).
    pub fn bind(&mut self, from: u32, to: Literal) {
        let v = lit2var(from) as usize;
        assert_eq!(self.stored[v], INVALID, "literal already mapped");
        self.stored[v] = to.raw() ^ sign(from);
    }
}

/// For each input then each latch of `from` not yet in `map`, allocates a
/// fresh input in `to` (optionally named, e.g. with a quantifier-level
/// symbol) and binds it.
pub fn materialize_io(to: &mut AigBuilder, map: &mut LiteralMap, from: &Aig, name: Option<&str>) {
    materialize_io_named(to, map, from, &|_| name.map(str::to_string));
}

/// As [`materialize_io`], but with a per-literal naming function instead of
/// one uniform name; used to annotate extended/oracle witness signals with
/// a different quantifier-level symbol than shared ones.
pub fn materialize_io_named(
    to: &mut AigBuilder,
    map: &mut LiteralMap,
    from: &Aig,
    namer: &dyn Fn(u32) -> Option<String>,
) {
    for input in &from.inputs {
        if !map.is_mapped(input.lit) {
            let name = namer(input.lit);
            let lit = to.add_input(name.as_deref());
            map.bind(input.lit, lit);
        }
    }
    for latch in &from.latches {
        if !map.is_mapped(latch.lit) {
            let name = namer(latch.lit);
            let lit = to.add_input(name.as_deref());
            map.bind(latch.lit, lit);
        }
    }
}

/// Iterates `from`'s and-gates in stored (topological) order; for each
/// whose output is unmapped, emits the conjunction of the mapped operands
/// into `to` and binds the result.
///
/// # Panics
///
/// Panics if an and-gate's operand is not yet mapped (precondition:
/// operands mapped, guaranteed by AIGER's SSA storage order as long as
/// [`materialize_io`] has already run).
pub fn materialize_ands(to: &mut AigBuilder, map: &mut LiteralMap, from: &Aig) {
    for and in &from.ands {
        if map.is_mapped(and.lhs) {
            continue;
        }
        let rhs0 = map
            .get(and.rhs0)
            .expect("and-gate operand materialized before its definition");
        let rhs1 = map
            .get(and.rhs1)
            .expect("and-gate operand materialized before its definition");
        let out = to.add_and(rhs0, rhs1);
        map.bind(and.lhs, out);
    }
}

/// The result of [`concatenate`]: the two source AIGs' literal maps into
/// the shared check AIG, and the check-AIG input count once `left`'s IO
/// was fully materialized (the boundary between left-derived and
/// right-derived fresh inputs, used for quantifier annotation).
pub struct Concatenation {
    pub left_map: LiteralMap,
    pub right_map: LiteralMap,
    pub boundary: usize,
}

/// Builds `left` then pre-binds `right`'s shared literals to `left`'s
/// already-mapped literals before materializing `right`'s remaining IO and
/// ANDs.
///
/// `shared` pairs are `(left_lit, right_lit)`; `left_lit` must already be
/// mapped once `left`'s IO/ANDs are materialized. `left_name`/`right_name`
/// are optional names (quantifier-level symbols) applied to newly
/// allocated, non-shared inputs of each side.
pub fn concatenate(
    to: &mut AigBuilder,
    left: &Aig,
    right: &Aig,
    shared: &[(u32, u32)],
    left_name: Option<&str>,
    right_name: Option<&str>,
) -> Concatenation {
    concatenate_named(
        to,
        left,
        right,
        shared,
        &|_| left_name.map(str::to_string),
        &|_| right_name.map(str::to_string),
    )
}

/// As [`concatenate`], but with per-literal naming functions for each side,
/// so that e.g. extended and oracle witness signals can be annotated
/// differently from shared ones within the same obligation.
pub fn concatenate_named(
    to: &mut AigBuilder,
    left: &Aig,
    right: &Aig,
    shared: &[(u32, u32)],
    left_namer: &dyn Fn(u32) -> Option<String>,
    right_namer: &dyn Fn(u32) -> Option<String>,
) -> Concatenation {
    let mut left_map = LiteralMap::new(left.max_var);
    materialize_io_named(to, &mut left_map, left, left_namer);
    materialize_ands(to, &mut left_map, left);
    let boundary = to.num_ands() + left.inputs.len() + left.latches.len();

    let mut right_map = LiteralMap::new(right.max_var);
    for &(left_lit, right_lit) in shared {
        let target = left_map
            .get(left_lit)
            .expect("shared mapping references an unmapped left literal");
        if !right_map.is_mapped(right_lit) {
            right_map.bind(right_lit, target);
        }
    }
    trace!(
        "concatenate: {} shared signals pre-bound before materializing {} remaining right IO",
        shared.len(),
        right.inputs.len() + right.latches.len()
    );
    materialize_io_named(to, &mut right_map, right, right_namer);
    materialize_ands(to, &mut right_map, right);

    Concatenation {
        left_map,
        right_map,
        boundary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiger::{AigBuilder, AigerMode};

    fn small_aig() -> Aig {
        let mut b = AigBuilder::new();
        let x = b.add_input(None);
        let y = b.add_input(None);
        let g = b.add_and(x, y);
        b.add_output("out", g);
        b.into_aig()
    }

    #[test]
    fn test_map_soundness() {
        let src = small_aig();
        let mut map = LiteralMap::new(src.max_var);
        let mut to = AigBuilder::new();
        materialize_io(&mut to, &mut map, &src, None);
        materialize_ands(&mut to, &mut map, &src);
        for input in &src.inputs {
            let pos = map.get(input.lit).unwrap();
            let neg = map.get(aiger::not(input.lit)).unwrap();
            assert_eq!(neg, !pos);
        }
        assert_eq!(map.get(0).unwrap(), Literal::FALSE);
        assert_eq!(map.get(1).unwrap(), Literal::TRUE);
    }

    #[test]
    fn test_concatenate_shares_literal() {
        let left = small_aig();
        let right = small_aig();
        let shared = vec![(left.inputs[0].lit, right.inputs[0].lit)];
        let mut to = AigBuilder::new();
        let concat = concatenate(&mut to, &left, &right, &shared, None, None);
        let l0 = concat.left_map.get(left.inputs[0].lit).unwrap();
        let r0 = concat.right_map.get(right.inputs[0].lit).unwrap();
        assert_eq!(l0, r0);
        // the unshared right input must still get its own fresh literal.
        let r1 = concat.right_map.get(right.inputs[1].lit).unwrap();
        let l1 = concat.left_map.get(left.inputs[1].lit).unwrap();
        assert_ne!(r1, l1);
        let _ = to.into_aig().write(&mut Vec::new(), AigerMode::Ascii);
    }
}
