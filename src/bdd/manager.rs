use std::collections::HashMap;

use super::node::{BddPtr, BddVar, Node};

/// Owns every BDD node created during one compilation: variable allocation,
/// the Boolean combinators, existential quantification, and variable
/// substitution.
///
/// Variables are allocated lazily (there is no fixed variable count up
/// front) and every BDD built during a compilation shares one arena with a
/// single unique table, so two structurally identical sub-formulas (e.g. two
/// calls to the same function) collapse onto the same nodes. `and`/`or`/
/// `not`/`eq` all reduce to a single `ite` primitive restricted one variable
/// at a time, since `ite`'s recursive restrict step is what `exists` and
/// `swap_variables` need to reuse as well.
pub struct BddManager {
    nodes: Vec<Node>,
    unique: HashMap<(u32, u32, u32), BddPtr>,
    ite_cache: HashMap<(BddPtr, BddPtr, BddPtr), BddPtr>,
    num_vars: u32,
}

impl Default for BddManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BddManager {
    pub fn new() -> BddManager {
        // Terminal nodes occupy slots 0 (false) and 1 (true). Their `var` field
        // is never read, since `is_terminal` is decided purely by index.
        let sentinel = BddVar(u32::MAX);
        BddManager {
            nodes: vec![
                Node { var: sentinel, low: BddPtr::FALSE, high: BddPtr::FALSE },
                Node { var: sentinel, low: BddPtr::TRUE, high: BddPtr::TRUE },
            ],
            unique: HashMap::new(),
            ite_cache: HashMap::new(),
            num_vars: 0,
        }
    }

    /// Number of BDD nodes currently in the arena (terminals included).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Allocate a fresh Boolean variable.
    pub fn new_var(&mut self) -> BddVar {
        let v = BddVar(self.num_vars);
        self.num_vars += 1;
        log::trace!("bdd: allocated variable {:?} ({} total)", v, self.num_vars);
        v
    }

    fn node(&self, ptr: BddPtr) -> Node {
        self.nodes[ptr.0 as usize]
    }

    /// The variable at the root of `ptr`, or `None` for a terminal node.
    pub fn topvar(&self, ptr: BddPtr) -> Option<BddVar> {
        if ptr.is_terminal() {
            None
        } else {
            Some(self.node(ptr).var)
        }
    }

    fn low(&self, ptr: BddPtr) -> BddPtr {
        self.node(ptr).low
    }

    fn high(&self, ptr: BddPtr) -> BddPtr {
        self.node(ptr).high
    }

    /// Find-or-insert a node, collapsing redundant nodes (`low == high`) the
    /// same way `BDD::mk_not`'s surrounding code relies on the manager never
    /// emitting them.
    fn unique_node(&mut self, var: BddVar, low: BddPtr, high: BddPtr) -> BddPtr {
        if low == high {
            return low;
        }
        let key = (var.0, low.0, high.0);
        if let Some(&existing) = self.unique.get(&key) {
            return existing;
        }
        let ptr = BddPtr(self.nodes.len() as u32);
        self.nodes.push(Node { var, low, high });
        self.unique.insert(key, ptr);
        ptr
    }

    pub fn mk_true(&self) -> BddPtr {
        BddPtr::TRUE
    }

    pub fn mk_false(&self) -> BddPtr {
        BddPtr::FALSE
    }

    pub fn mk_var(&mut self, var: BddVar) -> BddPtr {
        self.unique_node(var, BddPtr::FALSE, BddPtr::TRUE)
    }

    pub fn mk_not_var(&mut self, var: BddVar) -> BddPtr {
        self.unique_node(var, BddPtr::TRUE, BddPtr::FALSE)
    }

    /// Evaluate every node reachable from `subtree` with `var` fixed to `val`.
    /// Deliberately uncached — `ite`'s own `ite_cache` is what provides
    /// sharing across calls.
    fn restrict(&mut self, subtree: BddPtr, var: BddVar, val: bool) -> BddPtr {
        if subtree.is_terminal() {
            return subtree;
        }
        let n = self.node(subtree);
        if n.var > var {
            return subtree;
        }
        if n.var < var {
            let lo = self.restrict(n.low, var, val);
            let hi = self.restrict(n.high, var, val);
            return self.unique_node(n.var, lo, hi);
        }
        if val {
            self.restrict(n.high, var, val)
        } else {
            self.restrict(n.low, var, val)
        }
    }

    fn top_order_key(&self, ptr: BddPtr) -> u32 {
        self.topvar(ptr).map(|v| v.0).unwrap_or(u32::MAX)
    }

    /// If-then-else: `f ? g : h`. The single primitive `and`/`or`/`not`/`eq`
    /// and variable substitution all reduce to.
    fn ite(&mut self, f: BddPtr, g: BddPtr, h: BddPtr) -> BddPtr {
        if f.is_false() {
            return h;
        }
        if f.is_true() {
            return g;
        }
        if g.is_true() && h.is_false() {
            return f;
        }
        if g == h {
            return g;
        }
        let key = (f, g, h);
        if let Some(&cached) = self.ite_cache.get(&key) {
            return cached;
        }
        let v = self.top_order_key(f).min(self.top_order_key(g)).min(self.top_order_key(h));
        let v = BddVar(v);

        let f0 = self.restrict(f, v, false);
        let g0 = self.restrict(g, v, false);
        let h0 = self.restrict(h, v, false);
        let lo = self.ite(f0, g0, h0);

        let f1 = self.restrict(f, v, true);
        let g1 = self.restrict(g, v, true);
        let h1 = self.restrict(h, v, true);
        let hi = self.ite(f1, g1, h1);

        let result = self.unique_node(v, lo, hi);
        self.ite_cache.insert(key, result);
        result
    }

    /// Logical conjunction.
    pub fn and(&mut self, a: BddPtr, b: BddPtr) -> BddPtr {
        self.ite(a, b, BddPtr::FALSE)
    }

    /// Logical disjunction.
    pub fn or(&mut self, a: BddPtr, b: BddPtr) -> BddPtr {
        self.ite(a, BddPtr::TRUE, b)
    }

    /// Logical negation.
    pub fn not(&mut self, a: BddPtr) -> BddPtr {
        self.ite(a, BddPtr::FALSE, BddPtr::TRUE)
    }

    /// Logical biconditional (`a <=> b`).
    pub fn eq(&mut self, a: BddPtr, b: BddPtr) -> BddPtr {
        let not_b = self.not(b);
        self.ite(a, b, not_b)
    }

    /// Existentially quantify `vars` out of `bdd`: `∃v0,v1,...  bdd`.
    pub fn exists(&mut self, vars: &[BddVar], bdd: BddPtr) -> BddPtr {
        let mut acc = bdd;
        for &v in vars {
            let lo = self.restrict(acc, v, false);
            let hi = self.restrict(acc, v, true);
            acc = self.or(lo, hi);
        }
        acc
    }

    /// `existand(cube, a, b) = ∃cube. a ∧ b`, the substitution primitive the
    /// lazy `Let` rule and `FuncCall` argument binding are built on.
    pub fn existand(&mut self, vars: &[BddVar], a: BddPtr, b: BddPtr) -> BddPtr {
        let conj = self.and(a, b);
        self.exists(vars, conj)
    }

    /// Rename a single variable everywhere it appears in `bdd`, by composing
    /// with `mk_var(to)`. Routing this through `ite` (rather than a direct
    /// node-field rewrite) is what keeps the result's variable order correct
    /// when `to` does not occupy the same position in the order as `from`.
    fn substitute_one(&mut self, bdd: BddPtr, from: BddVar, to: BddVar) -> BddPtr {
        let hi = self.restrict(bdd, from, true);
        let lo = self.restrict(bdd, from, false);
        let to_var = self.mk_var(to);
        self.ite(to_var, hi, lo)
    }

    /// Simultaneously substitutes each `a[i]` for `b[i]` everywhere in `bdd`.
    ///
    /// Every caller passes a `b` made entirely of variables freshly
    /// allocated via [`new_var`], which cannot already occur in `bdd` or
    /// coincide with any other `a[j]` or `b[j]`. Under that precondition,
    /// substituting each pair in sequence is equivalent to a true
    /// simultaneous swap (earlier substitutions can never be disturbed by
    /// later ones), so this crate does not need the general two-array
    /// simultaneous-swap machinery real BDD packages use for in-place
    /// variable reordering.
    pub fn swap_variables(&mut self, bdd: BddPtr, a: &[BddVar], b: &[BddVar]) -> BddPtr {
        debug_assert_eq!(a.len(), b.len(), "swap_variables requires equal-length variable lists");
        let mut acc = bdd;
        for (&from, &to) in a.iter().zip(b.iter()) {
            acc = self.substitute_one(acc, from, to);
        }
        acc
    }

    pub(crate) fn node_var(&self, ptr: BddPtr) -> Option<BddVar> {
        self.topvar(ptr)
    }

    pub(crate) fn node_low(&self, ptr: BddPtr) -> BddPtr {
        self.low(ptr)
    }

    pub(crate) fn node_high(&self, ptr: BddPtr) -> BddPtr {
        self.high(ptr)
    }

    /// Render the BDD rooted at `root` as a `.dot` graph string, labeling
    /// each decision node with `var_name` and, where `weight` returns a
    /// value, the `(w0, w1)` pair a weighted model count would use there.
    /// Useful for inspecting why a particular weighted count came out the
    /// way it did.
    pub fn as_dot_string(
        &self,
        root: BddPtr,
        var_name: &dyn Fn(u32) -> String,
        weight: &dyn Fn(BddVar) -> Option<(f64, f64)>,
    ) -> String {
        let mut buf = Vec::new();
        super::dot_printer::print_bdd_as_dot(&mut buf, self, root, var_name, Some(weight), false)
            .expect("writing to an in-memory buffer cannot fail");
        String::from_utf8(buf).expect("dot output is always valid UTF-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_distinct() {
        let mgr = BddManager::new();
        assert_ne!(mgr.mk_true(), mgr.mk_false());
    }

    #[test]
    fn var_and_not_var() {
        let mut mgr = BddManager::new();
        let x = mgr.new_var();
        let vx = mgr.mk_var(x);
        let nvx = mgr.mk_not_var(x);
        assert_eq!(mgr.not(vx), nvx);
        assert_eq!(mgr.not(nvx), vx);
    }

    #[test]
    fn and_or_identities() {
        let mut mgr = BddManager::new();
        let x = mgr.new_var();
        let vx = mgr.mk_var(x);
        let t = mgr.mk_true();
        let f = mgr.mk_false();
        assert_eq!(mgr.and(vx, t), vx);
        assert_eq!(mgr.and(vx, f), f);
        assert_eq!(mgr.or(vx, t), t);
        assert_eq!(mgr.or(vx, f), vx);
    }

    #[test]
    fn contradiction_is_false() {
        let mut mgr = BddManager::new();
        let x = mgr.new_var();
        let vx = mgr.mk_var(x);
        let nvx = mgr.mk_not_var(x);
        assert!(mgr.and(vx, nvx).is_false());
        assert!(mgr.or(vx, nvx).is_true());
    }

    #[test]
    fn eq_is_iff() {
        let mut mgr = BddManager::new();
        let x = mgr.new_var();
        let y = mgr.new_var();
        let vx = mgr.mk_var(x);
        let vy = mgr.mk_var(y);
        let iff = mgr.eq(vx, vy);
        // x<->y is true exactly when x=y=1 or x=y=0: (x&y)|(!x&!y)
        let nx = mgr.not(vx);
        let ny = mgr.not(vy);
        let both_true = mgr.and(vx, vy);
        let both_false = mgr.and(nx, ny);
        let expected = mgr.or(both_true, both_false);
        assert_eq!(iff, expected);
    }

    #[test]
    fn exists_removes_dependency() {
        let mut mgr = BddManager::new();
        let x = mgr.new_var();
        let y = mgr.new_var();
        let vx = mgr.mk_var(x);
        let vy = mgr.mk_var(y);
        let f = mgr.and(vx, vy); // x & y
        let exists_x = mgr.exists(&[x], f);
        assert_eq!(exists_x, vy); // exists x. x&y === y
    }

    #[test]
    fn existand_matches_and_then_exists() {
        let mut mgr = BddManager::new();
        let x = mgr.new_var();
        let y = mgr.new_var();
        let vx = mgr.mk_var(x);
        let vy = mgr.mk_var(y);
        let direct = mgr.existand(&[x], vx, vy);
        let conj = mgr.and(vx, vy);
        let via_exists = mgr.exists(&[x], conj);
        assert_eq!(direct, via_exists);
    }

    #[test]
    fn swap_variables_renames_fresh_target() {
        let mut mgr = BddManager::new();
        let x = mgr.new_var();
        let vx = mgr.mk_var(x);
        let y = mgr.new_var(); // fresh target, allocated after x
        let swapped = mgr.swap_variables(vx, &[x], &[y]);
        assert_eq!(swapped, mgr.mk_var(y));
    }

    #[test]
    fn swap_variables_preserves_structure_under_conjunction() {
        let mut mgr = BddManager::new();
        let a = mgr.new_var();
        let b = mgr.new_var();
        let va = mgr.mk_var(a);
        let vb = mgr.mk_var(b);
        let f = mgr.and(va, vb);
        let a2 = mgr.new_var();
        let b2 = mgr.new_var();
        let swapped = mgr.swap_variables(f, &[a, b], &[a2, b2]);
        let expected = mgr.and(mgr.mk_var(a2), mgr.mk_var(b2));
        assert_eq!(swapped, expected);
    }

    #[test]
    fn as_dot_string_includes_weight_annotation() {
        let mut mgr = BddManager::new();
        let x = mgr.new_var();
        let root = mgr.mk_var(x);
        let dot = mgr.as_dot_string(root, &|v| format!("v{v}"), &|_| Some((0.6, 0.4)));
        assert!(dot.contains("0.600/0.400"));
    }
}
