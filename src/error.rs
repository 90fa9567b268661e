//! Compile-time errors.
//!
//! This crate compiles programs handed to it by an external, untrusted
//! front-end, so every malformed-input case below is a recoverable `Err`,
//! never a panic. `panic!`/`unwrap`/`expect` outside tests are reserved for
//! invariants this crate's own code is responsible for (e.g. a `BddManager`
//! node lookup that cannot fail if the manager was used correctly).

use thiserror::Error;

/// Every way compiling a [`crate::ast::Program`] can fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("unknown identifier `{0}`")]
    UnknownIdent(String),

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("function `{name}` called with {got} argument(s), expected {expected}")]
    ArityMismatch { name: String, expected: usize, got: usize },

    #[error("shape mismatch in `{context}`: {detail}")]
    ShapeMismatch { context: String, detail: String },

    #[error("`{0}` cannot be projected, it is not a tuple")]
    NotATuple(String),

    #[error("duplicate parameter `{param}` in function `{function}`")]
    DuplicateParam { function: String, param: String },

    #[error("duplicate function definition `{0}`")]
    DuplicateFunction(String),

    #[error("evidence has probability zero")]
    ZeroEvidence,
}
