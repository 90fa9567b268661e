//! The core AST: the input this crate's compiler consumes.
//!
//! Produced elsewhere by a lexer/parser/desugarer this crate does not
//! implement. Well-typedness of any [`Program`] handed to
//! [`crate::program::compile_program`] is a precondition, not something this
//! module checks — see `compiler::infer_type` for the narrow, structural
//! re-derivation the compiler itself needs.

use num_rational::Rational64;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A type in the language: Booleans, bounded integers, and their tuples.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    TBool,
    /// `TInt(n)`: a finite integer in `0..n`.
    TInt(usize),
    TTuple(Box<Type>, Box<Type>),
}

/// A core-language expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    True,
    False,
    Ident(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    /// `Flip(theta)`: a fresh coin with `Pr[true] = theta`.
    Flip(Rational64),
    Ite(Box<Expr>, Box<Expr>, Box<Expr>),
    Tup(Box<Expr>, Box<Expr>),
    Fst(Box<Expr>),
    Snd(Box<Expr>),
    Let(String, Box<Expr>, Box<Expr>),
    /// Soft-conditions the program on `e` being true.
    Observe(Box<Expr>),
    FuncCall(String, Vec<Expr>),
}

/// One function definition: a name, typed parameters, declared return type,
/// and a body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FuncDef {
    pub name: String,
    pub params: Vec<(String, Type)>,
    pub return_type: Type,
    pub body: Expr,
}

/// A program: an ordered list of function definitions (assumed topologically
/// sorted by whatever produced this AST) plus a main body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Program {
    pub functions: Vec<FuncDef>,
    pub body: Expr,
}

impl Expr {
    pub fn b(self) -> Box<Expr> {
        Box::new(self)
    }
}
