//! Program driver.
//!
//! Compiles every function definition in declaration order, registering each
//! one's return type and compiled body before moving to the next, then
//! compiles the main body against the fully populated function table.
//!
//! The function list is expected to arrive topologically sorted, but this
//! crate does not trust that silently: a call to a not-yet-registered
//! function is reported as [`CompileError::UnknownFunction`] rather than
//! causing a panic or an out-of-order compile, and a repeated function name
//! is rejected up front.

use std::collections::HashSet;

use crate::ast::Program;
use crate::compiler::{compile_expr, TypeEnv};
use crate::context::{CompiledExpr, Context};
use crate::error::CompileError;
use crate::function::compile_function;

/// Compile every function, then the main body, returning the main body's
/// [`CompiledExpr`]. The context accumulates every function's flips and
/// weights along the way; `crate::wmc::get_prob` is run against the result.
pub fn compile_program(ctx: &mut Context, program: &Program) -> Result<CompiledExpr, CompileError> {
    let mut tenv = TypeEnv::new();
    let mut seen = HashSet::new();

    for func in &program.functions {
        if !seen.insert(func.name.clone()) {
            return Err(CompileError::DuplicateFunction(func.name.clone()));
        }
        let compiled = compile_function(ctx, &tenv, func)?;
        tenv.insert(func.name.clone(), func.return_type.clone());
        ctx.register_function(func.name.clone(), compiled);
    }

    let env = crate::compiler::ValueEnv::new();
    compile_expr(ctx, &tenv, &env, &program.body)
}
