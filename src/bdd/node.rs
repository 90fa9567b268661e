//! Array-encoded BDD node storage.
//!
//! Unlike the per-formula `BDD(Vec<BDDNode>)` encoding this module is descended
//! from, nodes here live in one arena owned by the [`super::BddManager`] and are
//! shared across every BDD built during a single compilation, via a unique
//! table keyed on `(var, low, high)`. This is what lets [`super::BddManager::existand`]
//! and friends reuse structure across repeated function calls instead of
//! rebuilding it from scratch every time.

/// Identifies one Boolean variable inside a [`super::BddManager`].
///
/// Variables are allocated in increasing order by [`super::BddManager::new_var`]
/// and that allocation order *is* the decision order: a lower id sits closer to
/// the root than a higher one. Terminal nodes are conceptually "below" every
/// real variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BddVar(pub(crate) u32);

impl BddVar {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// A reference to a node in the manager's arena. `BddPtr(0)` and `BddPtr(1)`
/// are reserved for the `false`/`true` terminals and are always present.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BddPtr(pub(crate) u32);

impl BddPtr {
    pub const FALSE: BddPtr = BddPtr(0);
    pub const TRUE: BddPtr = BddPtr(1);

    pub fn is_terminal(self) -> bool {
        self.0 <= 1
    }

    pub fn is_true(self) -> bool {
        self == BddPtr::TRUE
    }

    pub fn is_false(self) -> bool {
        self == BddPtr::FALSE
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Node {
    pub var: BddVar,
    pub low: BddPtr,
    pub high: BddPtr,
}
