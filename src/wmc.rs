//! Weighted model counting.
//!
//! `wmc(bdd) = Σ over satisfying assignments Π w(v)`, computed by a single
//! memoized postorder walk of the BDD rather than literal enumeration of
//! assignments. `get_prob` combines two such counts into the final
//! conditional probability `Pr[state | observations] = wmc(state∧z)/wmc(z)`.

use std::collections::HashMap;

use crate::bdd::BddPtr;
use crate::context::{CompiledExpr, Context};
use crate::error::CompileError;

/// Memoized weighted model count of `bdd` under `ctx`'s registered weights.
/// A variable with no registered weight (a stray placeholder that escaped
/// `existand`) contributes `(1.0, 1.0)`, i.e. counts rather than weighs — this
/// should never happen for a `z`/`state` produced by `compile_expr`, since
/// every placeholder is eliminated before compilation returns.
pub fn wmc(ctx: &Context, bdd: BddPtr) -> f64 {
    let mut memo = HashMap::new();
    wmc_rec(ctx, bdd, &mut memo)
}

fn wmc_rec(ctx: &Context, ptr: BddPtr, memo: &mut HashMap<BddPtr, f64>) -> f64 {
    if ptr.is_false() {
        return 0.0;
    }
    if ptr.is_true() {
        return 1.0;
    }
    if let Some(&cached) = memo.get(&ptr) {
        return cached;
    }
    let var = ctx.manager.topvar(ptr).expect("non-terminal node must carry a variable");
    let low = ctx.manager.node_low(ptr);
    let high = ctx.manager.node_high(ptr);
    let (w0, w1) = ctx.weight(var).unwrap_or((1.0, 1.0));
    let result = w0 * wmc_rec(ctx, low, memo) + w1 * wmc_rec(ctx, high, memo);
    memo.insert(ptr, result);
    result
}

/// `Pr[state | observations]` for a fully compiled expression.
/// Fails with [`CompileError::ZeroEvidence`] when the observation constraint
/// is unsatisfiable (`wmc(z) == 0`), since dividing by it would be meaningless.
pub fn get_prob(ctx: &mut Context, compiled: &CompiledExpr) -> Result<f64, CompileError> {
    let z_weight = wmc(ctx, compiled.z);
    if z_weight == 0.0 {
        log::warn!("wmc: observation constraint is unsatisfiable");
        return Err(CompileError::ZeroEvidence);
    }
    let state = crate::symtree::extract_bdd(&compiled.state)?;
    let joint = ctx.manager.and(state, compiled.z);
    let joint_weight = wmc(ctx, joint);
    Ok(joint_weight / z_weight)
}
