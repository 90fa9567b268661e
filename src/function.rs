//! Function compiler.
//!
//! Compiles a [`FuncDef`]'s body exactly once, against placeholder argument
//! values, and stores the result in the [`Context`] for every [`FuncCall`]
//! site to reuse: a call site refreshes the compiled body's flips and
//! substitutes real arguments into it rather than recompiling the body from
//! scratch.

use std::collections::HashSet;

use crate::ast::FuncDef;
use crate::compiler::{compile_expr, TypeEnv, ValueEnv};
use crate::context::{CompiledFunc, Context};
use crate::error::CompileError;
use crate::placeholder::make_placeholder;

/// Compile one function definition: synthesize a placeholder per parameter,
/// bind it into a fresh value environment, and compile the body once.
pub fn compile_function(ctx: &mut Context, tenv: &TypeEnv, func: &FuncDef) -> Result<CompiledFunc, CompileError> {
    let mut seen = HashSet::new();
    for (param, _) in &func.params {
        if !seen.insert(param.clone()) {
            return Err(CompileError::DuplicateParam { function: func.name.clone(), param: param.clone() });
        }
    }

    let mut tenv2 = tenv.clone();
    let mut env: ValueEnv = ValueEnv::new();
    let mut arg_placeholders = Vec::with_capacity(func.params.len());
    for (param, ty) in &func.params {
        let placeholder = make_placeholder(ctx, ty);
        tenv2.insert(param.clone(), ty.clone());
        env.insert(param.clone(), placeholder.mutex.clone());
        arg_placeholders.push(placeholder.raw);
    }

    let body = compile_expr(ctx, &tenv2, &env, &func.body)?;
    Ok(CompiledFunc { args: arg_placeholders, body })
}
