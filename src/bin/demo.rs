//! Runnable entry point for `dicelang-core`.
//!
//! This is not a parser over concrete syntax — it takes no source file and
//! reads nothing from disk. It builds a handful of fixed core-AST programs
//! directly via `ast` constructors and runs one of them, selected by name.

use clap::{Parser, ValueEnum};
use dicelang_core::ast::{Expr, FuncDef, Program, Type};
use dicelang_core::{compile_and_infer, CompileConfig};
use num_rational::Rational64;

#[derive(Debug, Clone, ValueEnum)]
enum Scenario {
    /// `flip 0.3` -> 0.3
    SingleFlip,
    /// `let x = flip 0.5 in let y = flip 0.5 in x && y` -> 0.25
    TwoCoinsAnd,
    /// `let x = flip 0.3 in let y = flip 0.4 in observe(x||y); x` -> 0.517241...
    ObserveOr,
    /// `let x = flip 0.5 in if x then flip 0.9 else flip 0.1` -> 0.5
    IteFlip,
    /// `fun f(x: Bool) { x && flip 0.5 }; f(flip 0.4)` -> 0.2
    FuncCallAnd,
    /// `let x = flip 0 in observe(x); x` -> zero-evidence error
    ZeroEvidence,
}

#[derive(Parser, Debug)]
#[command(name = "demo")]
#[command(about = "Run one of dicelang-core's built-in example programs", long_about = None)]
struct Args {
    /// Which built-in program to compile and run.
    #[arg(value_enum, default_value = "single-flip")]
    scenario: Scenario,

    /// Use eager `Let` compilation instead of the default lazy strategy.
    #[arg(long)]
    eager: bool,
}

fn theta(num: i64, den: i64) -> Expr {
    Expr::Flip(Rational64::new(num, den))
}

fn program_for(scenario: &Scenario) -> Program {
    match scenario {
        Scenario::SingleFlip => Program { functions: vec![], body: theta(3, 10) },
        Scenario::TwoCoinsAnd => Program {
            functions: vec![],
            body: Expr::Let(
                "x".to_string(),
                theta(1, 2).b(),
                Expr::Let(
                    "y".to_string(),
                    theta(1, 2).b(),
                    Expr::And(Expr::Ident("x".to_string()).b(), Expr::Ident("y".to_string()).b()).b(),
                )
                .b(),
            ),
        },
        Scenario::ObserveOr => Program {
            functions: vec![],
            body: Expr::Let(
                "x".to_string(),
                theta(3, 10).b(),
                Expr::Let(
                    "y".to_string(),
                    theta(2, 5).b(),
                    Expr::Let(
                        "_obs".to_string(),
                        Expr::Observe(
                            Expr::Or(Expr::Ident("x".to_string()).b(), Expr::Ident("y".to_string()).b()).b(),
                        )
                        .b(),
                        Expr::Ident("x".to_string()).b(),
                    )
                    .b(),
                )
                .b(),
            ),
        },
        Scenario::IteFlip => Program {
            functions: vec![],
            body: Expr::Let(
                "x".to_string(),
                theta(1, 2).b(),
                Expr::Ite(Expr::Ident("x".to_string()).b(), theta(9, 10).b(), theta(1, 10).b()).b(),
            ),
        },
        Scenario::FuncCallAnd => Program {
            functions: vec![FuncDef {
                name: "f".to_string(),
                params: vec![("x".to_string(), Type::TBool)],
                return_type: Type::TBool,
                body: Expr::And(Expr::Ident("x".to_string()).b(), theta(1, 2).b()),
            }],
            body: Expr::FuncCall("f".to_string(), vec![theta(2, 5)]),
        },
        Scenario::ZeroEvidence => Program {
            functions: vec![],
            body: Expr::Let(
                "x".to_string(),
                Expr::Flip(Rational64::new(0, 1)).b(),
                Expr::Let(
                    "_obs".to_string(),
                    Expr::Observe(Expr::Ident("x".to_string()).b()).b(),
                    Expr::Ident("x".to_string()).b(),
                )
                .b(),
            ),
        },
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let program = program_for(&args.scenario);
    let config = CompileConfig { lazy: !args.eager };

    log::info!("demo: running {:?} (lazy = {})", args.scenario, config.lazy);
    match compile_and_infer(&program, config) {
        Ok(p) => println!("{:.6}", p),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
