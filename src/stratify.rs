//! Stratification analyzer (C4): decides whether a witness's latch resets
//! are acyclic when combined with and-gate dependencies, using Kahn's
//! topological algorithm (`spec.md §4.4`).

use std::collections::VecDeque;

use aiger::{lit2var, Aig};

/// Returns whether `aig`'s latch resets are *stratified*: the dependency
/// relation "latch L's reset depends on latch L'", combined with AND-gate
/// operand dependencies, is acyclic.
///
/// Builds an in-degree graph over variables `0..=max_var`: each and-gate
/// variable receives an edge from each operand variable; each
/// *initialized* latch variable (`reset != lit`) receives an edge from its
/// reset's variable. A variable-count of `max_var + 1` visited by Kahn's
/// algorithm means the graph is acyclic.
pub fn stratified(aig: &Aig) -> bool {
    let n = aig.max_var as usize + 1;
    let mut indegree = vec![0u32; n];
    let mut dependents: Vec<Vec<u32>> = vec![Vec::new(); n];

    for and in &aig.ands {
        let v = lit2var(and.lhs) as usize;
        for &rhs in &[and.rhs0, and.rhs1] {
            let op = lit2var(rhs) as usize;
            dependents[op].push(v as u32);
            indegree[v] += 1;
        }
    }
    for latch in &aig.latches {
        if latch.reset == latch.lit {
            continue; // uninitialized: no dependency edge
        }
        let v = lit2var(latch.lit) as usize;
        let rv = lit2var(latch.reset) as usize;
        dependents[rv].push(v as u32);
        indegree[v] += 1;
    }

    let mut queue: VecDeque<u32> = (0..n as u32).filter(|&v| indegree[v as usize] == 0).collect();
    let mut visited = 0usize;
    while let Some(v) = queue.pop_front() {
        visited += 1;
        for &child in &dependents[v as usize] {
            indegree[child as usize] -= 1;
            if indegree[child as usize] == 0 {
                queue.push_back(child);
            }
        }
    }
    visited == n
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiger::AigBuilder;

    #[test]
    fn test_no_latches_is_stratified() {
        let mut b = AigBuilder::new();
        let x = b.add_input(None);
        let y = b.add_input(None);
        b.add_and(x, y);
        assert!(stratified(&b.into_aig()));
    }

    #[test]
    fn test_uninitialized_latch_is_stratified() {
        let mut aig = Aig::default();
        aig.max_var = 1;
        aig.latches.push(aiger::Latch {
            lit: 2,
            next: 2,
            reset: 2, // uninitialized: reset == lit
            name: None,
        });
        assert!(stratified(&aig));
    }

    #[test]
    fn test_cyclic_resets_are_not_stratified() {
        // two latches whose resets reference each other through an AND
        let mut aig = Aig::default();
        aig.max_var = 3;
        aig.latches.push(aiger::Latch {
            lit: 2,
            next: 2,
            reset: 4, // depends on latch 2 (cyclic once combined with latch below)
            name: None,
        });
        aig.latches.push(aiger::Latch {
            lit: 4,
            next: 4,
            reset: 2,
            name: None,
        });
        assert!(!stratified(&aig));
    }
}
