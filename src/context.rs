//! Compile context.
//!
//! Owns everything a single program compilation-plus-WMC pass needs and that
//! must die together with it: the BDD manager, the weight table, the
//! debug-name table, the function table, and the lazy/eager flag. None of
//! this is `Sync` — sharing a `Context` across threads is a compile error,
//! which is the right way to enforce that a manager must never be shared
//! across concurrent compilations.

use std::collections::HashMap;

use num_rational::Rational64;
use num_traits::ToPrimitive;

use crate::bdd::{BddManager, BddVar};
use crate::symtree::SymTree;
use crate::symtree::SymLeaf;

/// The per-variable weight pair `(w0, w1)` used by [`crate::wmc::wmc`]: the
/// contribution of that variable being false or true, respectively.
pub type Weight = (f64, f64);

/// The result of compiling an expression: the symbolic value it produces,
/// the accumulated observation constraint, and the flip variables it
/// introduced.
#[derive(Debug, Clone)]
pub struct CompiledExpr {
    /// The symbolic value the expression evaluates to.
    pub state: SymTree<SymLeaf>,
    /// The accumulated observation constraint (`⊤` until an `Observe` is
    /// reached on some path that contributed to this expression).
    pub z: crate::bdd::BddPtr,
    /// Every fresh flip variable introduced while compiling this expression.
    pub flips: Vec<BddVar>,
}

/// A function compiled once and reused at every call site. `args` are the
/// placeholder trees the body was compiled against; a call refreshes the
/// body's flips and substitutes real arguments in via `existand` rather
/// than recompiling.
#[derive(Debug, Clone)]
pub struct CompiledFunc {
    pub args: Vec<SymTree<SymLeaf>>,
    pub body: CompiledExpr,
}

/// Whether `Let` uses the eager or lazy compilation strategy. Lazy is the
/// default: it shares more BDD structure across repeated uses of a
/// let-bound name at the cost of an extra placeholder and existential
/// quantification per binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileConfig {
    pub lazy: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig { lazy: true }
    }
}

/// Owns the BDD manager, weight/name/function tables, and compilation mode
/// for one program compilation.
pub struct Context {
    pub manager: BddManager,
    weights: HashMap<BddVar, Weight>,
    names: HashMap<BddVar, String>,
    funcs: HashMap<String, CompiledFunc>,
    config: CompileConfig,
    /// Owned by the context rather than a process-global counter, so two
    /// concurrent `Context`s never collide on debug names.
    flip_counter: u64,
}

impl Context {
    pub fn new(config: CompileConfig) -> Context {
        Context {
            manager: BddManager::new(),
            weights: HashMap::new(),
            names: HashMap::new(),
            funcs: HashMap::new(),
            config,
            flip_counter: 0,
        }
    }

    pub fn is_lazy(&self) -> bool {
        self.config.lazy
    }

    /// Allocate a fresh Boolean variable for a `Flip(theta)`, registering its
    /// weight `(1-theta, theta)` and a debug name.
    pub fn new_flip(&mut self, theta: Rational64) -> BddVar {
        let var = self.manager.new_var();
        let p = theta.to_f64().unwrap_or(0.0);
        self.weights.insert(var, (1.0 - p, p));
        let name = format!("flip{}", self.flip_counter);
        self.flip_counter += 1;
        log::debug!("context: {} = {:?} (theta = {})", name, var, theta);
        self.names.insert(var, name);
        var
    }

    /// Allocate a fresh placeholder variable (no weight registered — it is
    /// eliminated by `existand` before WMC ever sees it).
    pub fn new_placeholder(&mut self, debug_hint: &str) -> BddVar {
        let var = self.manager.new_var();
        let name = format!("{}{}", debug_hint, var.index());
        self.names.insert(var, name);
        var
    }

    /// Copy the weight of `from` onto `to`. Used when flip variables are
    /// refreshed at a function call site: the refreshed variable is a
    /// different random choice with the same distribution.
    pub fn copy_weight(&mut self, from: BddVar, to: BddVar) {
        if let Some(&w) = self.weights.get(&from) {
            self.weights.insert(to, w);
        }
        if let Some(name) = self.names.get(&from).cloned() {
            self.names.insert(to, format!("{}'", name));
        }
    }

    pub fn weight(&self, var: BddVar) -> Option<Weight> {
        self.weights.get(&var).copied()
    }

    pub fn name(&self, var: BddVar) -> String {
        self.names.get(&var).cloned().unwrap_or_else(|| format!("v{}", var.index()))
    }

    pub fn register_function(&mut self, name: String, func: CompiledFunc) {
        self.funcs.insert(name, func);
    }

    pub fn function(&self, name: &str) -> Option<&CompiledFunc> {
        self.funcs.get(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }
}
