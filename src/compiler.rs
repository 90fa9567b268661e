//! Expression compiler: translates a core-language expression into a
//! `CompiledExpr = {state, z, flips}` under a type environment and a value
//! environment.
//!
//! `infer_type` exists only because placeholder construction (`Let`'s lazy
//! strategy) needs to know the shape of an already-compiled sub-expression.
//! It is a structural re-derivation, not a type checker: well-typedness of
//! the input program is a precondition, so `infer_type` trusts branches
//! agree and never reports a type error of its own beyond the
//! identifier/function lookups it shares with the rest of the compiler.

use std::collections::HashMap;

use crate::ast::{Expr, Type};
use crate::bdd::BddPtr;
use crate::context::{CompiledExpr, CompiledFunc, Context};
use crate::error::CompileError;
use crate::placeholder::{make_placeholder, raw_vars};
use crate::symtree::{map_tree, SymLeaf, SymTree};

pub type TypeEnv = HashMap<String, Type>;
pub type ValueEnv = HashMap<String, SymTree<SymLeaf>>;

/// Structural re-derivation of the type of `e` under `tenv`. See the module
/// doc comment for what this does and does not check.
pub fn infer_type(tenv: &TypeEnv, e: &Expr) -> Result<Type, CompileError> {
    match e {
        Expr::True | Expr::False => Ok(Type::TBool),
        Expr::Ident(x) => tenv.get(x).cloned().ok_or_else(|| CompileError::UnknownIdent(x.clone())),
        Expr::Not(inner) => infer_type(tenv, inner),
        Expr::And(..) | Expr::Or(..) | Expr::Eq(..) => Ok(Type::TBool),
        Expr::Flip(_) => Ok(Type::TBool),
        Expr::Ite(_, t, _) => infer_type(tenv, t),
        Expr::Tup(l, r) => Ok(Type::TTuple(Box::new(infer_type(tenv, l)?), Box::new(infer_type(tenv, r)?))),
        Expr::Fst(inner) => match infer_type(tenv, inner)? {
            Type::TTuple(l, _) => Ok(*l),
            other => Err(CompileError::NotATuple(format!("{:?}", other))),
        },
        Expr::Snd(inner) => match infer_type(tenv, inner)? {
            Type::TTuple(_, r) => Ok(*r),
            other => Err(CompileError::NotATuple(format!("{:?}", other))),
        },
        Expr::Let(x, e1, e2) => {
            let mut tenv2 = tenv.clone();
            tenv2.insert(x.clone(), infer_type(tenv, e1)?);
            infer_type(&tenv2, e2)
        }
        Expr::Observe(_) => Ok(Type::TBool),
        Expr::FuncCall(name, _) => {
            tenv.get(name).cloned().ok_or_else(|| CompileError::UnknownFunction(name.clone()))
        }
    }
}

fn ite_bdd(ctx: &mut Context, guard: BddPtr, t: BddPtr, e: BddPtr) -> BddPtr {
    let on_true = ctx.manager.and(guard, t);
    let not_guard = ctx.manager.not(guard);
    let on_false = ctx.manager.and(not_guard, e);
    ctx.manager.or(on_true, on_false)
}

fn ite_leaf(ctx: &mut Context, guard: BddPtr, t: &SymLeaf, e: &SymLeaf) -> Result<SymLeaf, CompileError> {
    match (t, e) {
        (SymLeaf::Bool(tb), SymLeaf::Bool(eb)) => Ok(SymLeaf::Bool(ite_bdd(ctx, guard, *tb, *eb))),
        (SymLeaf::IntVec(tv), SymLeaf::IntVec(ev)) => {
            if tv.len() != ev.len() {
                return Err(CompileError::ShapeMismatch {
                    context: "Ite".to_string(),
                    detail: format!("integer vectors of length {} and {}", tv.len(), ev.len()),
                });
            }
            Ok(SymLeaf::IntVec(tv.iter().zip(ev.iter()).map(|(&a, &b)| ite_bdd(ctx, guard, a, b)).collect()))
        }
        _ => Err(CompileError::ShapeMismatch {
            context: "Ite".to_string(),
            detail: "then/else branches carry different leaf kinds".to_string(),
        }),
    }
}

/// Pointwise if-then-else over two identically-shaped symbolic trees.
/// Written as direct recursion on `(t, e)` rather than layering this
/// fallible per-leaf computation over `zip_tree`/`map_tree`, since those are
/// infallible by design and vector-length mismatches here must surface as a
/// [`CompileError`], not a panic.
fn ite_tree(ctx: &mut Context, guard: BddPtr, t: &SymTree<SymLeaf>, e: &SymTree<SymLeaf>) -> Result<SymTree<SymLeaf>, CompileError> {
    match (t, e) {
        (SymTree::Leaf(lt), SymTree::Leaf(le)) => Ok(SymTree::Leaf(ite_leaf(ctx, guard, lt, le)?)),
        (SymTree::Node(t1, t2), SymTree::Node(e1, e2)) => {
            let l = ite_tree(ctx, guard, t1, e1)?;
            let r = ite_tree(ctx, guard, t2, e2)?;
            Ok(SymTree::node(l, r))
        }
        _ => Err(CompileError::ShapeMismatch {
            context: "Ite".to_string(),
            detail: "then/else branches have different tree shapes".to_string(),
        }),
    }
}

fn leaf_iff(ctx: &mut Context, a: &SymLeaf, b: &SymLeaf) -> Result<BddPtr, CompileError> {
    match (a, b) {
        (SymLeaf::Bool(x), SymLeaf::Bool(y)) => Ok(ctx.manager.eq(*x, *y)),
        (SymLeaf::IntVec(xs), SymLeaf::IntVec(ys)) => {
            if xs.len() != ys.len() {
                return Err(CompileError::ShapeMismatch {
                    context: "Eq".to_string(),
                    detail: format!("integer vectors of length {} and {}", xs.len(), ys.len()),
                });
            }
            let mut acc = ctx.manager.mk_true();
            for (&x, &y) in xs.iter().zip(ys.iter()) {
                let eq = ctx.manager.eq(x, y);
                acc = ctx.manager.and(acc, eq);
            }
            Ok(acc)
        }
        _ => Err(CompileError::ShapeMismatch {
            context: "Eq".to_string(),
            detail: "operands carry different leaf kinds".to_string(),
        }),
    }
}

/// Structural equality / "iff": `∧ᵢ (aᵢ ⇔ bᵢ)` across a zipped pair of
/// identically-shaped trees. This single helper backs every place that
/// needs exactly this formula: the `Eq` expression, the lazy `Let`'s `iff`,
/// and `FuncCall`'s `argiff`.
fn tree_iff(ctx: &mut Context, a: &SymTree<SymLeaf>, b: &SymTree<SymLeaf>) -> Result<BddPtr, CompileError> {
    match (a, b) {
        (SymTree::Leaf(la), SymTree::Leaf(lb)) => leaf_iff(ctx, la, lb),
        (SymTree::Node(a1, a2), SymTree::Node(b1, b2)) => {
            let l = tree_iff(ctx, a1, b1)?;
            let r = tree_iff(ctx, a2, b2)?;
            Ok(ctx.manager.and(l, r))
        }
        _ => Err(CompileError::ShapeMismatch {
            context: "Eq".to_string(),
            detail: "operands have different tree shapes".to_string(),
        }),
    }
}

/// Apply `existand(cube, iff, ·)` at every Boolean BDD inside `t` (both a
/// lone `Bool` leaf and every element of an `IntVec` leaf), the way the
/// lazy `Let` and `FuncCall` rules both require.
fn existand_tree(ctx: &mut Context, cube: &[crate::bdd::BddVar], iff: BddPtr, t: &SymTree<SymLeaf>) -> SymTree<SymLeaf> {
    map_tree(t, &mut |leaf: &SymLeaf| match leaf {
        SymLeaf::Bool(b) => SymLeaf::Bool(ctx.manager.existand(cube, iff, *b)),
        SymLeaf::IntVec(vs) => SymLeaf::IntVec(vs.iter().map(|&b| ctx.manager.existand(cube, iff, b)).collect()),
    })
}

fn swap_tree(ctx: &mut Context, t: &SymTree<SymLeaf>, a: &[crate::bdd::BddVar], b: &[crate::bdd::BddVar]) -> SymTree<SymLeaf> {
    map_tree(t, &mut |leaf: &SymLeaf| match leaf {
        SymLeaf::Bool(x) => SymLeaf::Bool(ctx.manager.swap_variables(*x, a, b)),
        SymLeaf::IntVec(xs) => SymLeaf::IntVec(xs.iter().map(|&x| ctx.manager.swap_variables(x, a, b)).collect()),
    })
}

/// The expression compiler: translates `e` under `tenv`/`env` into its
/// compiled form `{state, z, flips}`.
pub fn compile_expr(ctx: &mut Context, tenv: &TypeEnv, env: &ValueEnv, e: &Expr) -> Result<CompiledExpr, CompileError> {
    match e {
        Expr::True => Ok(CompiledExpr {
            state: SymTree::Leaf(SymLeaf::Bool(ctx.manager.mk_true())),
            z: ctx.manager.mk_true(),
            flips: Vec::new(),
        }),
        Expr::False => Ok(CompiledExpr {
            state: SymTree::Leaf(SymLeaf::Bool(ctx.manager.mk_false())),
            z: ctx.manager.mk_true(),
            flips: Vec::new(),
        }),
        Expr::Ident(x) => {
            let state = env.get(x).cloned().ok_or_else(|| CompileError::UnknownIdent(x.clone()))?;
            Ok(CompiledExpr { state, z: ctx.manager.mk_true(), flips: Vec::new() })
        }
        Expr::Not(inner) => {
            let c = compile_expr(ctx, tenv, env, inner)?;
            let b = crate::symtree::extract_bdd(&c.state)?;
            let negated = ctx.manager.not(b);
            Ok(CompiledExpr { state: SymTree::Leaf(SymLeaf::Bool(negated)), z: c.z, flips: c.flips })
        }
        Expr::And(l, r) => {
            let cl = compile_expr(ctx, tenv, env, l)?;
            let cr = compile_expr(ctx, tenv, env, r)?;
            let bl = crate::symtree::extract_bdd(&cl.state)?;
            let br = crate::symtree::extract_bdd(&cr.state)?;
            let state = ctx.manager.and(bl, br);
            let z = ctx.manager.and(cl.z, cr.z);
            let mut flips = cl.flips;
            flips.extend(cr.flips);
            Ok(CompiledExpr { state: SymTree::Leaf(SymLeaf::Bool(state)), z, flips })
        }
        Expr::Or(l, r) => {
            let cl = compile_expr(ctx, tenv, env, l)?;
            let cr = compile_expr(ctx, tenv, env, r)?;
            let bl = crate::symtree::extract_bdd(&cl.state)?;
            let br = crate::symtree::extract_bdd(&cr.state)?;
            let state = ctx.manager.or(bl, br);
            let z = ctx.manager.and(cl.z, cr.z);
            let mut flips = cl.flips;
            flips.extend(cr.flips);
            Ok(CompiledExpr { state: SymTree::Leaf(SymLeaf::Bool(state)), z, flips })
        }
        Expr::Eq(l, r) => {
            let cl = compile_expr(ctx, tenv, env, l)?;
            let cr = compile_expr(ctx, tenv, env, r)?;
            let eq = tree_iff(ctx, &cl.state, &cr.state)?;
            let z = ctx.manager.and(cl.z, cr.z);
            let mut flips = cl.flips;
            flips.extend(cr.flips);
            Ok(CompiledExpr { state: SymTree::Leaf(SymLeaf::Bool(eq)), z, flips })
        }
        Expr::Flip(theta) => {
            let var = ctx.new_flip(*theta);
            let state = ctx.manager.mk_var(var);
            Ok(CompiledExpr { state: SymTree::Leaf(SymLeaf::Bool(state)), z: ctx.manager.mk_true(), flips: vec![var] })
        }
        Expr::Observe(inner) => {
            let c = compile_expr(ctx, tenv, env, inner)?;
            let predicate = crate::symtree::extract_bdd(&c.state)?;
            let z = ctx.manager.and(c.z, predicate);
            Ok(CompiledExpr { state: SymTree::Leaf(SymLeaf::Bool(ctx.manager.mk_true())), z, flips: c.flips })
        }
        Expr::Ite(g, t, e) => {
            let cg = compile_expr(ctx, tenv, env, g)?;
            let ct = compile_expr(ctx, tenv, env, t)?;
            let ce = compile_expr(ctx, tenv, env, e)?;
            let guard = crate::symtree::extract_bdd(&cg.state)?;
            let state = ite_tree(ctx, guard, &ct.state, &ce.state)?;
            let guarded_then = ctx.manager.and(guard, ct.z);
            let not_guard = ctx.manager.not(guard);
            let guarded_else = ctx.manager.and(not_guard, ce.z);
            let branch_z = ctx.manager.or(guarded_then, guarded_else);
            let z = ctx.manager.and(cg.z, branch_z);
            let mut flips = cg.flips;
            flips.extend(ct.flips);
            flips.extend(ce.flips);
            Ok(CompiledExpr { state, z, flips })
        }
        Expr::Tup(l, r) => {
            let cl = compile_expr(ctx, tenv, env, l)?;
            let cr = compile_expr(ctx, tenv, env, r)?;
            let z = ctx.manager.and(cl.z, cr.z);
            let mut flips = cl.flips;
            flips.extend(cr.flips);
            Ok(CompiledExpr { state: SymTree::node(cl.state, cr.state), z, flips })
        }
        Expr::Fst(inner) => {
            let c = compile_expr(ctx, tenv, env, inner)?;
            match c.state {
                SymTree::Node(l, _) => Ok(CompiledExpr { state: *l, z: c.z, flips: c.flips }),
                SymTree::Leaf(_) => Err(CompileError::NotATuple(format!("{:?}", inner))),
            }
        }
        Expr::Snd(inner) => {
            let c = compile_expr(ctx, tenv, env, inner)?;
            match c.state {
                SymTree::Node(_, r) => Ok(CompiledExpr { state: *r, z: c.z, flips: c.flips }),
                SymTree::Leaf(_) => Err(CompileError::NotATuple(format!("{:?}", inner))),
            }
        }
        Expr::Let(x, e1, e2) => {
            if ctx.is_lazy() {
                compile_let_lazy(ctx, tenv, env, x, e1, e2)
            } else {
                compile_let_eager(ctx, tenv, env, x, e1, e2)
            }
        }
        Expr::FuncCall(name, args) => compile_func_call(ctx, tenv, env, name, args),
    }
}

fn compile_let_eager(
    ctx: &mut Context,
    tenv: &TypeEnv,
    env: &ValueEnv,
    x: &str,
    e1: &Expr,
    e2: &Expr,
) -> Result<CompiledExpr, CompileError> {
    let c1 = compile_expr(ctx, tenv, env, e1)?;
    let t1 = infer_type(tenv, e1)?;
    let mut tenv2 = tenv.clone();
    tenv2.insert(x.to_string(), t1);
    let mut env2 = env.clone();
    env2.insert(x.to_string(), c1.state.clone());
    let c2 = compile_expr(ctx, &tenv2, &env2, e2)?;
    let z = ctx.manager.and(c1.z, c2.z);
    let mut flips = c1.flips;
    flips.extend(c2.flips);
    Ok(CompiledExpr { state: c2.state, z, flips })
}

fn compile_let_lazy(
    ctx: &mut Context,
    tenv: &TypeEnv,
    env: &ValueEnv,
    x: &str,
    e1: &Expr,
    e2: &Expr,
) -> Result<CompiledExpr, CompileError> {
    let c1 = compile_expr(ctx, tenv, env, e1)?;
    let t1 = infer_type(tenv, e1)?;
    let placeholder = make_placeholder(ctx, &t1);

    let mut tenv2 = tenv.clone();
    tenv2.insert(x.to_string(), t1);
    let mut env2 = env.clone();
    env2.insert(x.to_string(), placeholder.mutex.clone());
    let c2 = compile_expr(ctx, &tenv2, &env2, e2)?;

    let argcube = raw_vars(ctx, &placeholder.raw);
    let iff = tree_iff(ctx, &c1.state, &placeholder.raw)?;

    let state = existand_tree(ctx, &argcube, iff, &c2.state);
    let z_body = ctx.manager.existand(&argcube, iff, c2.z);
    let z = ctx.manager.and(c1.z, z_body);

    let mut flips = c1.flips;
    flips.extend(c2.flips);
    Ok(CompiledExpr { state, z, flips })
}

fn compile_func_call(
    ctx: &mut Context,
    tenv: &TypeEnv,
    env: &ValueEnv,
    name: &str,
    args: &[Expr],
) -> Result<CompiledExpr, CompileError> {
    let func: CompiledFunc = ctx.function(name).cloned().ok_or_else(|| CompileError::UnknownFunction(name.to_string()))?;

    if func.args.len() != args.len() {
        return Err(CompileError::ArityMismatch { name: name.to_string(), expected: func.args.len(), got: args.len() });
    }

    let compiled_args: Vec<CompiledExpr> =
        args.iter().map(|a| compile_expr(ctx, tenv, env, a)).collect::<Result<_, _>>()?;

    // Step 4: refresh every flip the body introduced so this call site gets
    // independent random choices.
    let mut swap_from = Vec::with_capacity(func.body.flips.len());
    let mut swap_to = Vec::with_capacity(func.body.flips.len());
    for &old in &func.body.flips {
        let fresh = ctx.manager.new_var();
        ctx.copy_weight(old, fresh);
        swap_from.push(old);
        swap_to.push(fresh);
    }
    let refreshed_state = swap_tree(ctx, &func.body.state, &swap_from, &swap_to);
    let refreshed_z = ctx.manager.swap_variables(func.body.z, &swap_from, &swap_to);

    // Steps 5-6: build the argument cube and the actual<->placeholder iff.
    let mut argcube = Vec::new();
    for placeholder in &func.args {
        argcube.extend(raw_vars(ctx, placeholder));
    }
    let mut argiff = ctx.manager.mk_true();
    for (actual, placeholder) in compiled_args.iter().zip(func.args.iter()) {
        let iff = tree_iff(ctx, &actual.state, placeholder)?;
        argiff = ctx.manager.and(argiff, iff);
    }

    // Steps 7-8: substitute actuals into the refreshed body.
    let state = existand_tree(ctx, &argcube, argiff, &refreshed_state);
    let mut z = ctx.manager.existand(&argcube, argiff, refreshed_z);
    for actual in &compiled_args {
        z = ctx.manager.and(z, actual.z);
    }

    // Step 9: only the refreshed flips belong to the call's own result —
    // the actual arguments' flips are already folded into `z` above.
    Ok(CompiledExpr { state, z, flips: swap_to })
}
