//! `dicelang-core`: a symbolic compiler and exact weighted-model-counting
//! inference engine for a small discrete probabilistic programming language.
//! A program denotes a distribution over Boolean and finite-integer values
//! built from coin flips, Boolean combinators, conditionals, tuples,
//! functions, and soft conditioning (`observe`); this crate computes the
//! exact conditional probability of the program's result given its
//! observations.
//!
//! The public entry point is [`compile_and_infer`], which takes a
//! [`ast::Program`] end to end: compile every function and the main body,
//! then weighted-model-count the result.

pub mod ast;
pub mod bdd;
pub mod compiler;
pub mod context;
pub mod error;
pub mod function;
pub mod placeholder;
pub mod program;
pub mod symtree;
pub mod wmc;

pub use context::{CompileConfig, Context};
pub use error::CompileError;

/// Compile `program` and return `Pr[body is true | all observations hold]`.
/// Builds a fresh [`Context`] (and so a fresh `BddManager`), compiles every
/// function then the main body, and computes `wmc(state ∧ z) / wmc(z)`.
pub fn compile_and_infer(program: &ast::Program, config: CompileConfig) -> Result<f64, CompileError> {
    let mut ctx = Context::new(config);
    let compiled = program::compile_program(&mut ctx, program)?;
    wmc::get_prob(&mut ctx, &compiled)
}

/// [`compile_and_infer`] with the default configuration (lazy `Let`).
pub fn get_prob(program: &ast::Program) -> Result<f64, CompileError> {
    compile_and_infer(program, CompileConfig::default())
}
