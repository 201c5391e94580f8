//! Demo driver: builds a small fixed program through [`tacc::AstBuilder`]
//! (standing in for the absent lexer/parser), runs it through the seven-pass
//! semantic analyzer, and either prints the accumulated diagnostics or, if
//! the program is well-typed, the TAC dump.

use tacc::{AstBuilder, BinOp, CompilerContext, Datatype, SemanticAnalyzer, TacGenerator};

fn main() {
    env_logger::init();

    let mut ctx = CompilerContext::new();
    let program = build_sample_program(&mut ctx);

    let analysis = SemanticAnalyzer::new().analyze(&mut ctx, &program);
    if !analysis.is_ok() {
        eprintln!("semantic analysis failed with {} error(s):", analysis.errors.len());
        for error in &analysis.errors {
            eprintln!("  {error}");
        }
        std::process::exit(1);
    }

    match TacGenerator::generate(&mut ctx, &program) {
        Ok(tac) => print!("{}", tac.dump(&ctx.symbols)),
        Err(e) => {
            eprintln!("TAC generation failed: {e}");
            std::process::exit(1);
        }
    }
}

/// `int a = 1; int b = 2; int x; if (a < b) x = 1 else x = 2;` — scenario 6
/// from the external design, the IF_ELSE lowering example.
fn build_sample_program(ctx: &mut CompilerContext) -> tacc::Node {
    let mut b = AstBuilder::new(&mut ctx.symbols);

    let init_a = b.lit_int("1", 1);
    let decl_a = b.var_decl("a", Datatype::Int, Some(init_a), 1);
    let init_b = b.lit_int("2", 1);
    let decl_b = b.var_decl("b", Datatype::Int, Some(init_b), 1);
    let decl_x = b.var_decl("x", Datatype::Int, None, 1);

    let lhs = b.identifier("a", 2);
    let rhs = b.identifier("b", 2);
    let cond = b.binary(BinOp::Lt, lhs, rhs, 2);
    let then_value = b.lit_int("1", 2);
    let then_branch = vec![b.var_attrib("x", then_value, 2)];
    let else_value = b.lit_int("2", 2);
    let else_branch = vec![b.var_attrib("x", else_value, 2)];
    let if_else = b.if_else_stmt(cond, then_branch, else_branch, 2);

    b.program(vec![decl_a, decl_b, decl_x, if_else])
}
