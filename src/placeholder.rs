//! Placeholder synthesis and mutual exclusion.
//!
//! `gen_sym_type` returns a fresh [`SymTree`] matching a [`Type`]: one fresh
//! Boolean variable per `TBool` position, `n` fresh variables per `TInt(n)`
//! position. [`encode_mutex`] re-encodes an `IntVec` leaf's raw vector as
//! one-hot — this is the subtlest invariant in the module, so the raw and
//! mutex-encoded forms are kept in separate fields of [`Placeholder`]:
//! substituting through `existand` must always use the raw, non-mutex
//! vector, while anything bound into an environment must use the
//! mutex-encoded one.

use crate::ast::Type;
use crate::bdd::BddVar;
use crate::context::Context;
use crate::symtree::{fold_bddtree, map_tree, SymLeaf, SymTree};

/// A placeholder symbolic value together with its mutex-encoded form.
/// `raw` is used for substitution bookkeeping (`existand`'s cube and iff);
/// `mutex` is what gets bound into an `env` for compiling a body against.
pub struct Placeholder {
    pub raw: SymTree<SymLeaf>,
    pub mutex: SymTree<SymLeaf>,
}

/// `gen_sym_type(ctx, t)`: a fresh [`SymTree`] of the given shape, made
/// entirely of single-variable BDDs (`mk_var(fresh)`), so each leaf position
/// still carries exactly one underlying [`BddVar`] recoverable via
/// `ctx.manager.topvar`.
pub fn gen_sym_type(ctx: &mut Context, ty: &Type) -> SymTree<SymLeaf> {
    match ty {
        Type::TBool => {
            let var = ctx.new_placeholder("b");
            SymTree::Leaf(SymLeaf::Bool(ctx.manager.mk_var(var)))
        }
        Type::TInt(n) => {
            let vars: Vec<_> = (0..*n)
                .map(|_| {
                    let var = ctx.new_placeholder("i");
                    ctx.manager.mk_var(var)
                })
                .collect();
            SymTree::Leaf(SymLeaf::IntVec(vars))
        }
        Type::TTuple(l, r) => SymTree::node(gen_sym_type(ctx, l), gen_sym_type(ctx, r)),
    }
}

/// Re-encode every `IntVec` leaf of `raw` as one-hot: entry `i` becomes
/// `v_i ∧ ⋀_{j≠i} ¬v_j`. `Bool` leaves pass through unchanged.
pub fn encode_mutex(ctx: &mut Context, raw: &SymTree<SymLeaf>) -> SymTree<SymLeaf> {
    map_tree(raw, &mut |leaf| match leaf {
        SymLeaf::Bool(b) => SymLeaf::Bool(*b),
        SymLeaf::IntVec(vars) => {
            let n = vars.len();
            let encoded = (0..n)
                .map(|i| {
                    let mut acc = vars[i];
                    for (j, &vj) in vars.iter().enumerate() {
                        if j != i {
                            let not_vj = ctx.manager.not(vj);
                            acc = ctx.manager.and(acc, not_vj);
                        }
                    }
                    acc
                })
                .collect();
            SymLeaf::IntVec(encoded)
        }
    })
}

/// Allocate a placeholder of type `ty` and its mutex-encoded form together.
pub fn make_placeholder(ctx: &mut Context, ty: &Type) -> Placeholder {
    let raw = gen_sym_type(ctx, ty);
    let mutex = encode_mutex(ctx, &raw);
    Placeholder { raw, mutex }
}

/// Recover the underlying [`BddVar`]s of a raw placeholder tree (one per
/// leaf position), used to build the `argcube`/swap lists in `compiler.rs`.
/// Every leaf of a tree produced by [`gen_sym_type`] is, by construction, a
/// single-variable BDD, so `topvar` always succeeds here.
pub fn raw_vars(ctx: &Context, raw: &SymTree<SymLeaf>) -> Vec<BddVar> {
    fold_bddtree(raw, Vec::new(), &mut |mut acc, leaf| {
        match leaf {
            SymLeaf::Bool(b) => acc.extend(ctx.manager.topvar(*b)),
            SymLeaf::IntVec(vars) => {
                for v in vars {
                    acc.extend(ctx.manager.topvar(*v));
                }
            }
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompileConfig;

    #[test]
    fn gen_sym_type_bool_is_single_var() {
        let mut ctx = Context::new(CompileConfig::default());
        let t = gen_sym_type(&mut ctx, &Type::TBool);
        assert_eq!(raw_vars(&ctx, &t).len(), 1);
    }

    #[test]
    fn gen_sym_type_int_has_n_vars() {
        let mut ctx = Context::new(CompileConfig::default());
        let t = gen_sym_type(&mut ctx, &Type::TInt(4));
        assert_eq!(raw_vars(&ctx, &t).len(), 4);
    }

    #[test]
    fn mutex_encoding_is_exclusive() {
        let mut ctx = Context::new(CompileConfig::default());
        let placeholder = make_placeholder(&mut ctx, &Type::TInt(3));
        let mutex = match &placeholder.mutex {
            SymTree::Leaf(SymLeaf::IntVec(vars)) => vars.clone(),
            _ => panic!("expected an IntVec leaf"),
        };
        // any two distinct mutex entries are mutually exclusive: their
        // conjunction is unsatisfiable.
        for i in 0..mutex.len() {
            for j in 0..mutex.len() {
                if i != j {
                    let both = ctx.manager.and(mutex[i], mutex[j]);
                    assert!(both.is_false(), "entries {} and {} not exclusive", i, j);
                }
            }
        }
    }

    #[test]
    fn gen_sym_type_tuple_nests_shapes() {
        let mut ctx = Context::new(CompileConfig::default());
        let t = gen_sym_type(&mut ctx, &Type::TTuple(Box::new(Type::TBool), Box::new(Type::TInt(2))));
        match t {
            SymTree::Node(l, r) => {
                assert_eq!(raw_vars(&ctx, &l).len(), 1);
                assert_eq!(raw_vars(&ctx, &r).len(), 2);
            }
            _ => panic!("expected a Node"),
        }
    }
}
