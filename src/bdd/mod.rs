//! Self-contained binary decision diagram engine: variable allocation,
//! the standard Boolean combinators, existential quantification, and
//! simultaneous variable substitution, all built on one shared node arena.

mod dot_printer;
mod manager;
mod node;

pub use dot_printer::print_bdd_as_dot;
pub use manager::BddManager;
pub use node::{BddPtr, BddVar};
