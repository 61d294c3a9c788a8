//! Obligation emitter (C9): assembles each named obligation's
//! antecedent→consequent, optionally quantified, and builds one check AIG
//! per obligation (`spec.md §4.9`).

use std::collections::HashSet;

use aiger::{strip, Aig, AigBuilder, Literal};

use crate::accessor::AigView;
use crate::litmap::LiteralMap;
use crate::predicate;
use crate::quantifier::QuantifierPlan;
use crate::shared::SharedResolution;
use crate::unroll::{unroll_paired_named, unroll_single_named};

/// One emitted proof obligation: a combinational check AIG with a single
/// negated-implication output, plus the quantifier level it was built at.
pub struct Obligation {
    pub name: String,
    pub aig: Aig,
    pub quantifier_level: u8,
}

fn disj_balanced(to: &mut AigBuilder, lits: Vec<Literal>) -> Literal {
    let negated: Vec<Literal> = lits.into_iter().map(|l| !l).collect();
    !to.conj_balanced(negated)
}

/// Builds a per-literal naming function annotating extended/oracle witness
/// signals with a quantifier-level symbol, and leaving shared signals
/// unannotated (implicit level "0"), per `spec.md §4.9`.
fn quantifier_namer(
    extended: HashSet<u32>,
    oracle: HashSet<u32>,
    level: u8,
) -> impl Fn(u32) -> Option<String> {
    move |lit: u32| {
        if level == 0 {
            return None;
        }
        let v = strip(lit);
        if oracle.contains(&v) {
            Some(if level >= 2 { "2" } else { "1" }.to_string())
        } else if extended.contains(&v) {
            Some("1".to_string())
        } else {
            None
        }
    }
}

struct Context {
    model_k: Vec<u32>,
    witness_k: Vec<u32>,
    extended: HashSet<u32>,
    oracle: HashSet<u32>,
}

fn build_reset(model: &AigView, witness: &AigView, shared: &SharedResolution, ctx: &Context, level: u8) -> Obligation {
    let mut to = AigBuilder::new();
    let namer = quantifier_namer(ctx.extended.clone(), ctx.oracle.clone(), level);
    let paired = unroll_paired_named(&mut to, &model.aig, &witness.aig, &shared.shared, &|_| None, &namer);

    // Propositional reset restricts R/R' to the shared set K; quantified
    // reset (level >= 1) needs the full, unrestricted R/R' — the extended
    // latches are exactly what the quantifier exists to cover, and
    // restricting to K would drop their reset/next constraints.
    let model_k = if level == 0 { Some(ctx.model_k.as_slice()) } else { None };
    let witness_k = if level == 0 { Some(ctx.witness_k.as_slice()) } else { None };
    let r = predicate::encode_r(&mut to, &model.aig, &paired.model.map, model_k);
    let c = predicate::encode_c(&mut to, &model.aig, &paired.model.map);
    let rp = predicate::encode_r(&mut to, &witness.aig, &paired.witness.map, witness_k);
    let cp = predicate::encode_c(&mut to, &witness.aig, &paired.witness.map);

    let antecedent = to.conj_balanced(vec![r, c]);
    let consequent = to.conj_balanced(vec![rp, cp]);
    let not_consequent = !consequent;
    let bad = to.add_and(antecedent, not_consequent);
    to.add_output("reset", bad);
    let mut aig = to.into_aig();
    let form = if level == 0 { "R|K ∧ C -> R'|K ∧ C'" } else { "R ∧ C -> R' ∧ C'" };
    aig.comments.push(format!("reset: {form} (quantifier level {level})"));
    Obligation {
        name: "reset".to_string(),
        aig,
        quantifier_level: level,
    }
}

fn build_transition(model: &AigView, witness: &AigView, shared: &SharedResolution, ctx: &Context, level: u8) -> Obligation {
    let mut to = AigBuilder::new();
    let namer = quantifier_namer(ctx.extended.clone(), ctx.oracle.clone(), level);
    let t0 = unroll_paired_named(&mut to, &model.aig, &witness.aig, &shared.shared, &|_| None, &namer);
    let t1 = unroll_paired_named(&mut to, &model.aig, &witness.aig, &shared.shared, &|_| None, &namer);

    // Same propositional-vs-quantified split as `build_reset`: F/F' is
    // restricted to K only at level 0.
    let model_k = if level == 0 { Some(ctx.model_k.as_slice()) } else { None };
    let witness_k = if level == 0 { Some(ctx.witness_k.as_slice()) } else { None };
    let f = predicate::encode_f(&mut to, &model.aig, &t0.model.map, &t1.model.map, model_k);
    let c0 = predicate::encode_c(&mut to, &model.aig, &t0.model.map);
    let c1 = predicate::encode_c(&mut to, &model.aig, &t1.model.map);
    let c0p = predicate::encode_c(&mut to, &witness.aig, &t0.witness.map);
    let fp = predicate::encode_f(&mut to, &witness.aig, &t0.witness.map, &t1.witness.map, witness_k);
    let c1p = predicate::encode_c(&mut to, &witness.aig, &t1.witness.map);

    let antecedent = to.conj_balanced(vec![f, c0, c1, c0p]);
    let consequent = to.conj_balanced(vec![fp, c1p]);
    let not_consequent = !consequent;
    let bad = to.add_and(antecedent, not_consequent);
    to.add_output("transition", bad);
    let mut aig = to.into_aig();
    let form = if level == 0 {
        "F|K ∧ C_0 ∧ C_1 ∧ C'_0 -> F'|K ∧ C'_1"
    } else {
        "F ∧ C_0 ∧ C_1 ∧ C'_0 -> F' ∧ C'_1"
    };
    aig.comments.push(format!("transition: {form} (quantifier level {level})"));
    Obligation {
        name: "transition".to_string(),
        aig,
        quantifier_level: level,
    }
}

fn build_property(model: &AigView, witness: &AigView, shared: &SharedResolution, ctx: &Context, level: u8) -> Obligation {
    let mut to = AigBuilder::new();
    let namer = quantifier_namer(ctx.extended.clone(), ctx.oracle.clone(), level);
    let paired = unroll_paired_named(&mut to, &model.aig, &witness.aig, &shared.shared, &|_| None, &namer);

    let c = predicate::encode_c(&mut to, &model.aig, &paired.model.map);
    let cp = predicate::encode_c(&mut to, &witness.aig, &paired.witness.map);
    let pp = predicate::encode_p(&mut to, witness.property_lit, &paired.witness.map);
    let p = predicate::encode_p(&mut to, model.property_lit, &paired.model.map);

    let antecedent = to.conj_balanced(vec![c, cp, pp]);
    let not_p = !p;
    let bad = to.add_and(antecedent, not_p);
    to.add_output("property", bad);
    let mut aig = to.into_aig();
    aig.comments.push(format!(
        "property: C ∧ C' ∧ P' -> P (quantifier level {level})"
    ));
    Obligation {
        name: "property".to_string(),
        aig,
        quantifier_level: level,
    }
}

fn build_base(witness: &AigView) -> Obligation {
    let mut to = AigBuilder::new();
    let copy = unroll_single_named(&mut to, &witness.aig, &|_| None);
    let rp = predicate::encode_r(&mut to, &witness.aig, &copy.map, None);
    let cp = predicate::encode_c(&mut to, &witness.aig, &copy.map);
    let pp = predicate::encode_p(&mut to, witness.property_lit, &copy.map);

    let antecedent = to.conj_balanced(vec![rp, cp]);
    let not_pp = !pp;
    let bad = to.add_and(antecedent, not_pp);
    to.add_output("base", bad);
    let mut aig = to.into_aig();
    aig.comments.push("base: R' ∧ C' -> P'".to_string());
    Obligation {
        name: "base".to_string(),
        aig,
        quantifier_level: 0,
    }
}

fn build_step(witness: &AigView, ctx: &Context, level: u8) -> Obligation {
    let mut to = AigBuilder::new();
    let namer = move |lit: u32| {
        if level == 0 {
            return None;
        }
        if ctx.oracle.contains(&strip(lit)) {
            Some("1".to_string())
        } else {
            None
        }
    };
    let t0 = unroll_single_named(&mut to, &witness.aig, &namer);
    let t1 = unroll_single_named(&mut to, &witness.aig, &namer);

    let p0p = predicate::encode_p(&mut to, witness.property_lit, &t0.map);
    let fp = predicate::encode_f(&mut to, &witness.aig, &t0.map, &t1.map, None);
    let c0p = predicate::encode_c(&mut to, &witness.aig, &t0.map);
    let c1p = predicate::encode_c(&mut to, &witness.aig, &t1.map);
    let p1p = predicate::encode_p(&mut to, witness.property_lit, &t1.map);

    let antecedent = to.conj_balanced(vec![p0p, fp, c0p, c1p]);
    let not_p1p = !p1p;
    let bad = to.add_and(antecedent, not_p1p);
    to.add_output("step", bad);
    let mut aig = to.into_aig();
    aig.comments.push(format!(
        "step: P'_0 ∧ F' ∧ C'_0 ∧ C'_1 -> P'_1 (quantifier level {level})"
    ));
    Obligation {
        name: "step".to_string(),
        aig,
        quantifier_level: level,
    }
}

fn n_between(
    to: &mut AigBuilder,
    witness: &Aig,
    shared: &SharedResolution,
    from_map: &LiteralMap,
    to_map: &LiteralMap,
    j: usize,
) -> Literal {
    predicate::encode_n_with_intervention(to, witness, from_map, to_map, &shared.intervention, j)
}

fn build_liveness(
    model: &AigView,
    witness: &AigView,
    shared: &SharedResolution,
    ctx: &Context,
    j: usize,
) -> Vec<Obligation> {
    let mut obligations = Vec::new();

    // Decrease and Closure and Cover and Consistent use three witness-only
    // time copies (x, y, z); Live additionally needs model+witness pairing
    // at x and y, see `spec.md §4.7`.
    {
        let mut to = AigBuilder::new();
        let x = unroll_single_named(&mut to, &witness.aig, &|_| None);
        let y = unroll_single_named(&mut to, &witness.aig, &|_| None);
        let c_x = predicate::encode_c(&mut to, &witness.aig, &x.map);
        let p_x = predicate::encode_p(&mut to, witness.property_lit, &x.map);
        let c_y = predicate::encode_c(&mut to, &witness.aig, &y.map);
        let p_y = predicate::encode_p(&mut to, witness.property_lit, &y.map);
        let f_xy = predicate::encode_f(&mut to, &witness.aig, &x.map, &y.map, None);
        let n_xy = n_between(&mut to, &witness.aig, shared, &x.map, &y.map, j);

        let antecedent = to.conj_balanced(vec![c_x, p_x, c_y, p_y, f_xy]);
        let not_n_xy = !n_xy;
        let bad = to.add_and(antecedent, not_n_xy);
        to.add_output(&format!("decrease_{j}"), bad);
        let mut aig = to.into_aig();
        aig.comments.push(format!(
            "decrease[{j}]: C'_x ∧ P'_x ∧ C'_y ∧ P'_y ∧ F' -> N'_xy"
        ));
        obligations.push(Obligation {
            name: format!("decrease_{j}"),
            aig,
            quantifier_level: 0,
        });
    }

    {
        let mut to = AigBuilder::new();
        let x = unroll_single_named(&mut to, &witness.aig, &|_| None);
        let y = unroll_single_named(&mut to, &witness.aig, &|_| None);
        let z = unroll_single_named(&mut to, &witness.aig, &|_| None);
        let c_x = predicate::encode_c(&mut to, &witness.aig, &x.map);
        let p_x = predicate::encode_p(&mut to, witness.property_lit, &x.map);
        let c_y = predicate::encode_c(&mut to, &witness.aig, &y.map);
        let p_y = predicate::encode_p(&mut to, witness.property_lit, &y.map);
        let c_z = predicate::encode_c(&mut to, &witness.aig, &z.map);
        let p_z = predicate::encode_p(&mut to, witness.property_lit, &z.map);
        let f_yz = predicate::encode_f(&mut to, &witness.aig, &y.map, &z.map, None);
        let n_xy = n_between(&mut to, &witness.aig, shared, &x.map, &y.map, j);
        let n_xz = n_between(&mut to, &witness.aig, shared, &x.map, &z.map, j);

        let antecedent = to.conj_balanced(vec![c_x, p_x, c_y, p_y, c_z, p_z, n_xy, f_yz]);
        let not_n_xz = !n_xz;
        let bad = to.add_and(antecedent, not_n_xz);
        to.add_output(&format!("closure_{j}"), bad);
        let mut aig = to.into_aig();
        aig.comments.push(format!(
            "closure[{j}]: (C'_x∧P'_x∧C'_y∧P'_y∧C'_z∧P'_z) ∧ N'_xy ∧ F'_yz -> N'_xz"
        ));
        obligations.push(Obligation {
            name: format!("closure_{j}"),
            aig,
            quantifier_level: 0,
        });
    }

    {
        let mut to = AigBuilder::new();
        let x = unroll_single_named(&mut to, &witness.aig, &|_| None);
        let y = unroll_single_named(&mut to, &witness.aig, &|_| None);
        let c_x = predicate::encode_c(&mut to, &witness.aig, &x.map);
        let p_x = predicate::encode_p(&mut to, witness.property_lit, &x.map);
        let c_y = predicate::encode_c(&mut to, &witness.aig, &y.map);
        let p_y = predicate::encode_p(&mut to, witness.property_lit, &y.map);
        let f_xy = predicate::encode_f(&mut to, &witness.aig, &x.map, &y.map, None);
        let n_yx = n_between(&mut to, &witness.aig, shared, &y.map, &x.map, j);
        let q_x = predicate::encode_q(&mut to, &witness.aig, &x.map, j, model.aig.fairness.len());

        let antecedent = to.conj_balanced(vec![c_x, p_x, c_y, p_y, f_xy, n_yx]);
        let consequent = disj_balanced(&mut to, q_x);
        let not_consequent = !consequent;
        let bad = to.add_and(antecedent, not_consequent);
        to.add_output(&format!("cover_{j}"), bad);
        let mut aig = to.into_aig();
        aig.comments.push(format!(
            "cover[{j}]: C'_x ∧ P'_x ∧ C'_y ∧ P'_y ∧ F' ∧ N'_yx -> OR_q Q'_x[q]"
        ));
        obligations.push(Obligation {
            name: format!("cover_{j}"),
            aig,
            quantifier_level: 0,
        });
    }

    {
        let mut to = AigBuilder::new();
        let x = unroll_single_named(&mut to, &witness.aig, &|_| None);
        let y = unroll_single_named(&mut to, &witness.aig, &|_| None);
        let c_x = predicate::encode_c(&mut to, &witness.aig, &x.map);
        let p_x = predicate::encode_p(&mut to, witness.property_lit, &x.map);
        let c_y = predicate::encode_c(&mut to, &witness.aig, &y.map);
        let p_y = predicate::encode_p(&mut to, witness.property_lit, &y.map);
        let f_xy = predicate::encode_f(&mut to, &witness.aig, &x.map, &y.map, None);
        let n_yx = n_between(&mut to, &witness.aig, shared, &y.map, &x.map, j);
        let q_x = predicate::encode_q(&mut to, &witness.aig, &x.map, j, model.aig.fairness.len());
        let q_y = predicate::encode_q(&mut to, &witness.aig, &y.map, j, model.aig.fairness.len());

        let per_q: Vec<Literal> = q_x
            .iter()
            .zip(q_y.iter())
            .map(|(&qx, &qy)| to.add_implies(qx, qy))
            .collect();
        let antecedent = to.conj_balanced(vec![c_x, p_x, c_y, p_y, f_xy, n_yx]);
        let consequent = to.conj_balanced(per_q);
        let not_consequent = !consequent;
        let bad = to.add_and(antecedent, not_consequent);
        to.add_output(&format!("consistent_{j}"), bad);
        let mut aig = to.into_aig();
        aig.comments.push(format!(
            "consistent[{j}]: C'_x ∧ P'_x ∧ C'_y ∧ P'_y ∧ F' ∧ N'_yx -> AND_q (Q'_x[q] -> Q'_y[q])"
        ));
        obligations.push(Obligation {
            name: format!("consistent_{j}"),
            aig,
            quantifier_level: 0,
        });
    }

    {
        let mut to = AigBuilder::new();
        let namer = quantifier_namer(ctx.extended.clone(), ctx.oracle.clone(), 0);
        let px = unroll_paired_named(&mut to, &model.aig, &witness.aig, &shared.shared, &|_| None, &namer);
        let py = unroll_paired_named(&mut to, &model.aig, &witness.aig, &shared.shared, &|_| None, &namer);

        let c_x_model = predicate::encode_c(&mut to, &model.aig, &px.model.map);
        let c_x_witness = predicate::encode_c(&mut to, &witness.aig, &px.witness.map);
        let p_x_witness = predicate::encode_p(&mut to, witness.property_lit, &px.witness.map);
        let c_y_model = predicate::encode_c(&mut to, &model.aig, &py.model.map);
        let c_y_witness = predicate::encode_c(&mut to, &witness.aig, &py.witness.map);
        let p_y_witness = predicate::encode_p(&mut to, witness.property_lit, &py.witness.map);
        let f_xy = predicate::encode_f(&mut to, &witness.aig, &px.witness.map, &py.witness.map, None);
        let n_yx = n_between(&mut to, &witness.aig, shared, &py.witness.map, &px.witness.map, j);
        let q_x_witness = predicate::encode_q(&mut to, &witness.aig, &px.witness.map, j, model.aig.fairness.len());
        let q_x_model = predicate::encode_q(&mut to, &model.aig, &px.model.map, j, model.aig.fairness.len());

        let per_q: Vec<Literal> = q_x_witness
            .iter()
            .zip(q_x_model.iter())
            .map(|(&qxw, &qxm)| to.add_implies(qxw, qxm))
            .collect();
        let antecedent = to.conj_balanced(vec![
            c_x_model,
            c_x_witness,
            p_x_witness,
            c_y_model,
            c_y_witness,
            p_y_witness,
            f_xy,
            n_yx,
        ]);
        let consequent = to.conj_balanced(per_q);
        let not_consequent = !consequent;
        let bad = to.add_and(antecedent, not_consequent);
        to.add_output(&format!("live_{j}"), bad);
        let mut aig = to.into_aig();
        aig.comments.push(format!(
            "live[{j}]: (C_x∧C'_x∧P'_x∧C_y∧C'_y∧P'_y) ∧ F' ∧ N'_yx -> AND_q (Q'_x[q] -> Q_x[q])"
        ));
        obligations.push(Obligation {
            name: format!("live_{j}"),
            aig,
            quantifier_level: 0,
        });
    }

    obligations
}

/// Builds every obligation the core emits: the five safety obligations
/// always, plus the five liveness obligations per justice property when
/// the model declares any.
pub fn build_all(
    model: &AigView,
    witness: &AigView,
    shared: &SharedResolution,
    plan: &QuantifierPlan,
) -> Vec<Obligation> {
    let model_k: Vec<u32> = shared.shared.iter().map(|&(m, _)| m).collect();
    let witness_k: Vec<u32> = shared.shared.iter().map(|&(_, w)| w).collect();
    let extended: HashSet<u32> = shared.extended.iter().map(|&l| strip(l)).collect();
    let oracle: HashSet<u32> = witness.oracle_inputs().iter().map(|&l| strip(l)).collect();
    let ctx = Context {
        model_k,
        witness_k,
        extended,
        oracle,
    };

    let mut obligations = vec![
        build_reset(model, witness, shared, &ctx, plan.reset),
        build_transition(model, witness, shared, &ctx, plan.transition),
        build_property(model, witness, shared, &ctx, plan.property),
        build_base(witness),
        build_step(witness, &ctx, plan.step),
    ];

    for j in 0..model.aig.justice.len() {
        obligations.extend(build_liveness(model, witness, shared, &ctx, j));
    }

    obligations
}
