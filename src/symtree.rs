//! Symbolic tree: the shape of the values this compiler produces.
//!
//! A binary tree whose leaves carry either a single BDD node (`Bool`) or a
//! one-hot vector of BDD nodes (`IntVec`) — a tagged sum rather than a
//! leaf-type class hierarchy, since the compiler must case on which variant
//! it has (e.g. to decide whether equality compares a single bit or a
//! vector pointwise). The tree itself is left generic over the leaf type so
//! `map_tree`/`zip_tree`/`fold_bddtree` are reused at every leaf type this
//! crate needs (`SymLeaf`, and pairs of `SymLeaf` produced by `zip_tree`
//! itself).

use crate::bdd::BddPtr;
use crate::error::CompileError;

/// A symbolic value: either a single leaf, or a pair of sub-trees (used for
/// `Tup`/tuple types).
#[derive(Debug, Clone, PartialEq)]
pub enum SymTree<L> {
    Leaf(L),
    Node(Box<SymTree<L>>, Box<SymTree<L>>),
}

/// The leaf of a value-carrying [`SymTree`]: a Boolean BDD, or the one-hot
/// encoding of a finite integer as a vector of BDDs (the vector's length
/// always equals the domain size of the leaf's `TInt(n)` type).
#[derive(Debug, Clone, PartialEq)]
pub enum SymLeaf {
    Bool(BddPtr),
    IntVec(Vec<BddPtr>),
}

impl<L> SymTree<L> {
    pub fn leaf(value: L) -> SymTree<L> {
        SymTree::Leaf(value)
    }

    pub fn node(left: SymTree<L>, right: SymTree<L>) -> SymTree<L> {
        SymTree::Node(Box::new(left), Box::new(right))
    }
}

/// `map_tree(t, f)`: apply `f` at every leaf, producing a tree of identical
/// shape.
pub fn map_tree<L, M>(t: &SymTree<L>, f: &mut impl FnMut(&L) -> M) -> SymTree<M> {
    match t {
        SymTree::Leaf(l) => SymTree::Leaf(f(l)),
        SymTree::Node(a, b) => SymTree::Node(Box::new(map_tree(a, f)), Box::new(map_tree(b, f))),
    }
}

/// `zip_tree(t1, t2)`: pair up leaves of two identically shaped trees.
/// Fails with [`CompileError::ShapeMismatch`] if the shapes differ.
pub fn zip_tree<L1: Clone, L2: Clone>(
    t1: &SymTree<L1>,
    t2: &SymTree<L2>,
) -> Result<SymTree<(L1, L2)>, CompileError> {
    match (t1, t2) {
        (SymTree::Leaf(a), SymTree::Leaf(b)) => Ok(SymTree::Leaf((a.clone(), b.clone()))),
        (SymTree::Node(a1, b1), SymTree::Node(a2, b2)) => {
            let left = zip_tree(a1, a2)?;
            let right = zip_tree(b1, b2)?;
            Ok(SymTree::node(left, right))
        }
        _ => Err(CompileError::ShapeMismatch {
            context: "zip_tree".to_string(),
            detail: "trees have different shapes (leaf vs. node)".to_string(),
        }),
    }
}

/// `fold_bddtree(t, init, f)`: accumulate over every leaf, left to right.
/// `f` receives the whole [`SymLeaf`], so it alone decides how an `IntVec`
/// leaf contributes (typically by conjoining its vector into a single cube
/// before folding it in — see `placeholder::raw_cube`).
pub fn fold_bddtree<T>(t: &SymTree<SymLeaf>, init: T, f: &mut impl FnMut(T, &SymLeaf) -> T) -> T {
    match t {
        SymTree::Leaf(l) => f(init, l),
        SymTree::Node(a, b) => {
            let acc = fold_bddtree(a, init, f);
            fold_bddtree(b, acc, f)
        }
    }
}

/// `extract_bdd(t)`: require `t = Leaf(Bool(b))`, else a type error. Used
/// wherever the compiler needs a single Boolean guard (e.g. `Ite`'s
/// condition, `Observe`'s predicate).
pub fn extract_bdd(t: &SymTree<SymLeaf>) -> Result<BddPtr, CompileError> {
    match t {
        SymTree::Leaf(SymLeaf::Bool(b)) => Ok(*b),
        other => Err(CompileError::ShapeMismatch {
            context: "extract_bdd".to_string(),
            detail: format!("expected a single Boolean leaf, found {:?}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bdd::BddManager;

    #[test]
    fn map_tree_preserves_shape() {
        let t = SymTree::node(SymTree::Leaf(1), SymTree::Leaf(2));
        let mapped = map_tree(&t, &mut |x: &i32| x * 10);
        assert_eq!(mapped, SymTree::node(SymTree::Leaf(10), SymTree::Leaf(20)));
    }

    #[test]
    fn zip_tree_pairs_matching_shapes() {
        let t1 = SymTree::node(SymTree::Leaf(1), SymTree::Leaf(2));
        let t2 = SymTree::node(SymTree::Leaf("a"), SymTree::Leaf("b"));
        let zipped = zip_tree(&t1, &t2).unwrap();
        assert_eq!(
            zipped,
            SymTree::node(SymTree::Leaf((1, "a")), SymTree::Leaf((2, "b")))
        );
    }

    #[test]
    fn zip_tree_rejects_shape_mismatch() {
        let t1 = SymTree::node(SymTree::Leaf(1), SymTree::Leaf(2));
        let t2: SymTree<i32> = SymTree::Leaf(3);
        assert!(zip_tree(&t1, &t2).is_err());
    }

    #[test]
    fn extract_bdd_requires_bool_leaf() {
        let mgr = BddManager::new();
        let tup = SymTree::node(
            SymTree::Leaf(SymLeaf::Bool(mgr.mk_true())),
            SymTree::Leaf(SymLeaf::Bool(mgr.mk_false())),
        );
        assert!(extract_bdd(&tup).is_err());
        assert!(extract_bdd(&SymTree::Leaf(SymLeaf::Bool(mgr.mk_true()))).is_ok());
    }

    #[test]
    fn fold_bddtree_visits_every_leaf() {
        let mut mgr = BddManager::new();
        let x = mgr.new_var();
        let y = mgr.new_var();
        let t = SymTree::node(
            SymTree::Leaf(SymLeaf::Bool(mgr.mk_var(x))),
            SymTree::Leaf(SymLeaf::IntVec(vec![mgr.mk_var(y), mgr.mk_false()])),
        );
        let count = fold_bddtree(&t, 0usize, &mut |acc, leaf| {
            acc + match leaf {
                SymLeaf::Bool(_) => 1,
                SymLeaf::IntVec(v) => v.len(),
            }
        });
        assert_eq!(count, 3);
    }
}
