//! End-to-end integration tests exercising the public `dicelang_core` API
//! on a handful of small concrete programs.

use dicelang_core::ast::{Expr, FuncDef, Program, Type};
use dicelang_core::{get_prob, CompileError};
use num_rational::Rational64;

fn r(num: i64, den: i64) -> Rational64 {
    Rational64::new(num, den)
}

fn ident(name: &str) -> Expr {
    Expr::Ident(name.to_string())
}

fn let_(name: &str, bound: Expr, body: Expr) -> Expr {
    Expr::Let(name.to_string(), bound.b(), body.b())
}

const EPS: f64 = 1e-6;

#[test]
fn scenario_1_single_flip() {
    let program = Program { functions: vec![], body: Expr::Flip(r(3, 10)) };
    let p = get_prob(&program).unwrap();
    assert!((p - 0.3).abs() < EPS, "got {p}");
}

#[test]
fn scenario_2_two_coins_and() {
    let program = Program {
        functions: vec![],
        body: let_(
            "x",
            Expr::Flip(r(1, 2)),
            let_("y", Expr::Flip(r(1, 2)), Expr::And(ident("x").b(), ident("y").b())),
        ),
    };
    let p = get_prob(&program).unwrap();
    assert!((p - 0.25).abs() < EPS, "got {p}");
}

#[test]
fn scenario_3_observe_or() {
    // let x = flip 0.3 in let y = flip 0.4 in observe(x||y); x
    // -> 0.3 / (1 - 0.7*0.6) = 0.517241...
    let program = Program {
        functions: vec![],
        body: let_(
            "x",
            Expr::Flip(r(3, 10)),
            let_(
                "y",
                Expr::Flip(r(2, 5)),
                let_(
                    "_obs",
                    Expr::Observe(Expr::Or(ident("x").b(), ident("y").b()).b()),
                    ident("x"),
                ),
            ),
        ),
    };
    let p = get_prob(&program).unwrap();
    let expected = 0.3 / (1.0 - 0.7 * 0.6);
    assert!((p - expected).abs() < EPS, "got {p}, expected {expected}");
}

#[test]
fn scenario_4_ite_flip() {
    let program = Program {
        functions: vec![],
        body: let_(
            "x",
            Expr::Flip(r(1, 2)),
            Expr::Ite(ident("x").b(), Expr::Flip(r(9, 10)).b(), Expr::Flip(r(1, 10)).b()),
        ),
    };
    let p = get_prob(&program).unwrap();
    assert!((p - 0.5).abs() < EPS, "got {p}");
}

#[test]
fn scenario_5_func_call_and() {
    // fun f(x: Bool) { x && flip 0.5 }; f(flip 0.4) -> 0.2
    let program = Program {
        functions: vec![FuncDef {
            name: "f".to_string(),
            params: vec![("x".to_string(), Type::TBool)],
            return_type: Type::TBool,
            body: Expr::And(ident("x").b(), Expr::Flip(r(1, 2)).b()),
        }],
        body: Expr::FuncCall("f".to_string(), vec![Expr::Flip(r(2, 5))]),
    };
    let p = get_prob(&program).unwrap();
    assert!((p - 0.2).abs() < EPS, "got {p}");
}

#[test]
fn scenario_6_zero_evidence_errors() {
    let program = Program {
        functions: vec![],
        body: let_(
            "x",
            Expr::Flip(r(0, 1)),
            let_("_obs", Expr::Observe(ident("x").b()), ident("x")),
        ),
    };
    assert_eq!(get_prob(&program), Err(CompileError::ZeroEvidence));
}

#[test]
fn tuple_fst_snd_roundtrip() {
    // let p = (flip 0.3, flip 0.8) in fst p -> 0.3
    let program = Program {
        functions: vec![],
        body: let_(
            "p",
            Expr::Tup(Expr::Flip(r(3, 10)).b(), Expr::Flip(r(4, 5)).b()),
            Expr::Fst(ident("p").b()),
        ),
    };
    let p = get_prob(&program).unwrap();
    assert!((p - 0.3).abs() < EPS, "got {p}");
}

#[test]
fn unknown_identifier_errors() {
    let program = Program { functions: vec![], body: ident("nope") };
    assert_eq!(get_prob(&program), Err(CompileError::UnknownIdent("nope".to_string())));
}

#[test]
fn unknown_function_errors() {
    let program = Program { functions: vec![], body: Expr::FuncCall("nope".to_string(), vec![]) };
    assert_eq!(get_prob(&program), Err(CompileError::UnknownFunction("nope".to_string())));
}

#[test]
fn arity_mismatch_errors() {
    let program = Program {
        functions: vec![FuncDef {
            name: "f".to_string(),
            params: vec![("x".to_string(), Type::TBool)],
            return_type: Type::TBool,
            body: ident("x"),
        }],
        body: Expr::FuncCall("f".to_string(), vec![]),
    };
    assert_eq!(
        get_prob(&program),
        Err(CompileError::ArityMismatch { name: "f".to_string(), expected: 1, got: 0 })
    );
}

#[test]
fn duplicate_function_errors() {
    let dup = FuncDef {
        name: "f".to_string(),
        params: vec![],
        return_type: Type::TBool,
        body: Expr::True,
    };
    let program = Program { functions: vec![dup.clone(), dup], body: Expr::True };
    assert_eq!(get_prob(&program), Err(CompileError::DuplicateFunction("f".to_string())));
}

#[test]
fn duplicate_parameter_errors() {
    let program = Program {
        functions: vec![FuncDef {
            name: "f".to_string(),
            params: vec![("x".to_string(), Type::TBool), ("x".to_string(), Type::TBool)],
            return_type: Type::TBool,
            body: Expr::True,
        }],
        body: Expr::FuncCall("f".to_string(), vec![Expr::True, Expr::False]),
    };
    assert_eq!(
        get_prob(&program),
        Err(CompileError::DuplicateParam { function: "f".to_string(), param: "x".to_string() })
    );
}

#[test]
fn shape_mismatch_on_bool_arg_to_int_param() {
    let program = Program {
        functions: vec![FuncDef {
            name: "same".to_string(),
            params: vec![("x".to_string(), Type::TInt(3))],
            return_type: Type::TBool,
            body: Expr::Eq(ident("x").b(), ident("x").b()),
        }],
        body: Expr::FuncCall("same".to_string(), vec![Expr::True]),
    };
    assert!(matches!(get_prob(&program), Err(CompileError::ShapeMismatch { .. })));
}
