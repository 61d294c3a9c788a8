//! Cone analyzer (C5): computes the set of literals transitively
//! influenced by a given literal set, via a single forward sweep over the
//! AIG's and-gates (`spec.md §4.5`).

use aiger::{lit2var, Aig};
use fixedbitset::FixedBitSet;

/// A variable-indexed cone: `contains(v)` answers whether variable `v` is
/// transitively influenced by the seed set. Both polarities of a literal
/// share the same flag, since the cone is a property of the variable.
pub struct Cone {
    marked: FixedBitSet,
}

impl Cone {
    /// Returns whether `lit`'s variable is in the cone.
    pub fn contains(&self, lit: u32) -> bool {
        self.marked.contains(lit2var(lit) as usize)
    }

    /// Returns whether any of `lits` has its variable in the cone.
    pub fn contains_any(&self, lits: &[u32]) -> bool {
        lits.iter().any(|&l| self.contains(l))
    }
}

/// Computes the forward cone of `seeds` over `aig`: every and-gate output
/// whose operand set includes a marked variable is itself marked, in a
/// single pass over `aig.ands` in storage (topological) order.
pub fn compute(aig: &Aig, seeds: &[u32]) -> Cone {
    let n = aig.max_var as usize + 1;
    let mut marked = FixedBitSet::with_capacity(n);
    for &seed in seeds {
        marked.insert(lit2var(seed) as usize);
    }
    for and in &aig.ands {
        let v = lit2var(and.lhs) as usize;
        let op0 = lit2var(and.rhs0) as usize;
        let op1 = lit2var(and.rhs1) as usize;
        if marked.contains(op0) || marked.contains(op1) {
            marked.insert(v);
        }
    }
    Cone { marked }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiger::AigBuilder;

    #[test]
    fn test_cone_propagates_through_ands() {
        let mut b = AigBuilder::new();
        let x = b.add_input(None);
        let y = b.add_input(None);
        let z = b.add_input(None);
        let g1 = b.add_and(x, y);
        let g2 = b.add_and(g1, z);
        let aig = b.into_aig();

        let cone = compute(&aig, &[x.raw()]);
        assert!(cone.contains(g1.raw()));
        assert!(cone.contains(g2.raw()));
        assert!(!cone.contains(z.raw()));
    }

    #[test]
    fn test_cone_does_not_mark_unrelated_signals() {
        let mut b = AigBuilder::new();
        let x = b.add_input(None);
        let y = b.add_input(None);
        let _g = b.add_and(x, x);
        let aig = b.into_aig();
        let cone = compute(&aig, &[y.raw()]);
        assert!(!cone.contains(x.raw()));
    }
}
