//! Quantifier planner (C6): derives per-obligation quantifier level from
//! stratification and cone results, combined with user-supplied caps
//! (`spec.md §4.6`).

use aiger::Aig;

use crate::accessor::AigView;
use crate::cone;
use crate::error::{CertError, Result};
use crate::stratify::stratified;

/// User-supplied caps on the quantifier level of each obligation, from
/// `--qbf [reset=N] [transition=N] [property=N] [step=N]`. `None` means
/// uncapped (i.e. the analyzer's own level is used unmodified).
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantifierCaps {
    pub reset: Option<u8>,
    pub transition: Option<u8>,
    pub property: Option<u8>,
    pub step: Option<u8>,
}

/// The quantifier level chosen for each safety obligation (0, 1 or 2).
/// `base` is always 0: it is always propositional over the witness alone.
#[derive(Debug, Clone, Copy)]
pub struct QuantifierPlan {
    pub reset: u8,
    pub transition: u8,
    pub property: u8,
    pub base: u8,
    pub step: u8,
    pub witness_stratified: bool,
}

fn latch_resets(aig: &Aig) -> Vec<u32> {
    aig.latches.iter().map(|l| l.reset).collect()
}
fn latch_nexts(aig: &Aig) -> Vec<u32> {
    aig.latches.iter().map(|l| l.next).collect()
}
fn constraint_lits(aig: &Aig) -> Vec<u32> {
    aig.constraints.iter().map(|c| c.lit).collect()
}

/// Plans the quantifier level of every safety obligation, from the
/// witness's extended and oracle signal sets, and applies `caps`.
pub fn plan(witness: &AigView, extended: &[u32], oracle: &[u32], caps: QuantifierCaps) -> Result<QuantifierPlan> {
    let witness_stratified = stratified(&witness.aig);
    let extended_cone = cone::compute(&witness.aig, extended);
    let oracle_cone = cone::compute(&witness.aig, oracle);

    let constraints = constraint_lits(&witness.aig);
    let resets = latch_resets(&witness.aig);
    let nexts = latch_nexts(&witness.aig);
    let property = witness.property_lit;

    let reset = if oracle_cone.contains_any(&constraints) || oracle_cone.contains_any(&resets) {
        2
    } else if extended_cone.contains_any(&constraints) || !witness_stratified {
        1
    } else {
        0
    };

    let transition = if oracle_cone.contains_any(&constraints) || oracle_cone.contains_any(&nexts) {
        2
    } else if extended_cone.contains_any(&constraints) {
        1
    } else {
        0
    };

    let property_level = if extended_cone.contains_any(&constraints)
        || property.is_some_and(|p| extended_cone.contains(p))
    {
        1
    } else {
        0
    };

    let step = if property.is_some_and(|p| oracle_cone.contains(p)) || oracle_cone.contains_any(&constraints) {
        1
    } else {
        0
    };

    let reset = caps.reset.map_or(reset, |c| reset.min(c));
    let transition = caps.transition.map_or(transition, |c| transition.min(c));
    let property_level = caps.property.map_or(property_level, |c| property_level.min(c));
    let step = caps.step.map_or(step, |c| step.min(c));

    if !witness_stratified && reset == 0 {
        return Err(CertError::UnsupportedConfiguration {
            message: "witness reset is non-stratified but the reset quantifier cap is 0; \
                      cannot produce a sound propositional reset check"
                .to_string(),
        });
    }

    Ok(QuantifierPlan {
        reset,
        transition,
        property: property_level,
        base: 0,
        step,
        witness_stratified,
    })
}

impl QuantifierPlan {
    /// The exit-code bitmask of `spec.md §6`: bit 1 set if reset is
    /// quantified, bit 2 if transition is quantified.
    pub fn exit_bitmask(&self) -> i32 {
        let mut mask = 0;
        if self.reset > 0 {
            mask |= 1;
        }
        if self.transition > 0 {
            mask |= 2;
        }
        mask
    }
}
