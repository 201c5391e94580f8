//! The TAC generator: a single post-order recursive lowering of the
//! validated AST, per the pattern table in the external design. Runs only
//! after the semantic analyzer reports zero errors — [`generate`] is the
//! sole entry point and enforces that gate itself.

use crate::ast::{BinOp, Node, NodeKind, UnOp};
use crate::context::CompilerContext;
use crate::symbol::SymbolId;
use crate::tac::{Instruction, Opcode, TacBuilder, TacError, TacResult};

/// Stateless driver — all mutable state (symbol table, temp/label
/// counters) lives on the [`CompilerContext`] passed to every call.
pub struct TacGenerator;

impl TacGenerator {
    /// Lower `program` to TAC. Refuses if `ctx` already carries semantic
    /// errors, matching "TAC generation proceeds only if the error count
    /// is zero".
    pub fn generate(ctx: &mut CompilerContext, program: &Node) -> TacResult<TacBuilder> {
        if ctx.has_errors() {
            return Err(TacError::SemanticErrorsPresent(ctx.error_count()));
        }
        Ok(gen_node(ctx, program))
    }
}

/// The symbol a generated code block's *value* lives in — the `res` of its
/// last instruction. Every pattern in the table below appends its last
/// instruction as the one producing the block's value, so this always
/// finds the right answer without a separate "current result" field.
fn result_symbol(builder: &TacBuilder) -> Option<SymbolId> {
    builder.instructions().last().and_then(|instr| instr.res)
}

fn binop_opcode(op: BinOp) -> Opcode {
    match op {
        BinOp::Add => Opcode::Add,
        BinOp::Sub => Opcode::Sub,
        BinOp::Mul => Opcode::Mul,
        BinOp::Div => Opcode::Div,
        BinOp::Le => Opcode::Le,
        BinOp::Ge => Opcode::Ge,
        BinOp::Eq => Opcode::Eq,
        BinOp::Dif => Opcode::Dif,
        BinOp::Gt => Opcode::Gt,
        BinOp::Lt => Opcode::Lt,
        BinOp::And => Opcode::And,
        BinOp::Or => Opcode::Or,
    }
}

fn unop_opcode(op: UnOp) -> Opcode {
    match op {
        UnOp::Neg => Opcode::Neg,
        UnOp::Not => Opcode::Not,
    }
}

fn gen_node(ctx: &mut CompilerContext, node: &Node) -> TacBuilder {
    match &node.kind {
        NodeKind::LitInt { symbol }
        | NodeKind::LitReal { symbol }
        | NodeKind::LitChar { symbol }
        | NodeKind::LitString { symbol }
        | NodeKind::Identifier { symbol } => {
            TacBuilder::single(Instruction::new(Opcode::Symbol, Some(*symbol), None, None))
        }

        NodeKind::VecAccess { symbol, index } => {
            let mut code = gen_node(ctx, index);
            let r0 = result_symbol(&code);
            let datatype = ctx.symbols.get(*symbol).datatype;
            let temp = ctx.symbols.make_temp(datatype);
            code.push(Instruction::new(Opcode::Copy, Some(temp), Some(*symbol), r0));
            code
        }

        NodeKind::FuncCall { symbol, args } => {
            let callee = ctx.symbols.get(*symbol).clone();
            let mut code = TacBuilder::new();
            for (i, arg) in args.iter().enumerate() {
                let arg_code = gen_node(ctx, &arg.expr);
                let r_arg = result_symbol(&arg_code);
                code.append(arg_code);
                let formal = callee.param_symbols.get(i).copied();
                code.push(Instruction::new(Opcode::Arg, None, formal, r_arg));
            }
            let temp = ctx.symbols.make_temp(callee.datatype);
            code.push(Instruction::new(Opcode::Call, Some(temp), Some(*symbol), None));
            code
        }

        NodeKind::Binary { op, left, right } => {
            let left_code = gen_node(ctx, left);
            let r0 = result_symbol(&left_code);
            let right_code = gen_node(ctx, right);
            let r1 = result_symbol(&right_code);
            let mut code = left_code;
            code.append(right_code);
            let temp = ctx.symbols.make_temp(node.result_datatype.get());
            code.push(Instruction::new(binop_opcode(*op), Some(temp), r0, r1));
            code
        }

        NodeKind::Unary { op, operand } => {
            let mut code = gen_node(ctx, operand);
            let r0 = result_symbol(&code);
            let temp = ctx.symbols.make_temp(node.result_datatype.get());
            code.push(Instruction::new(unop_opcode(*op), Some(temp), r0, None));
            code
        }

        // Transparent: the parenthesized form carries no TAC of its own.
        NodeKind::NestedExpr { inner } => gen_node(ctx, inner),

        NodeKind::InputExpr { datatype } => {
            let temp = ctx.symbols.make_temp(*datatype);
            TacBuilder::single(Instruction::new(Opcode::Read, Some(temp), None, None))
        }

        NodeKind::VarAttrib { symbol, value } => {
            let mut code = gen_node(ctx, value);
            let r0 = result_symbol(&code);
            code.push(Instruction::new(Opcode::Copy, Some(*symbol), r0, None));
            code
        }

        NodeKind::VecAttrib { symbol, index, value } => {
            let index_code = gen_node(ctx, index);
            let r0 = result_symbol(&index_code);
            let value_code = gen_node(ctx, value);
            let r1 = result_symbol(&value_code);
            let mut code = index_code;
            code.append(value_code);
            code.push(Instruction::new(Opcode::Copy, Some(*symbol), r0, r1));
            code
        }

        NodeKind::If { cond, then_branch } => {
            let mut code = gen_node(ctx, cond);
            let r_e = result_symbol(&code);
            let l_end = ctx.symbols.make_label();
            code.push(Instruction::new(Opcode::Jfalse, Some(l_end), r_e, None));
            for stmt in then_branch {
                code.append(gen_node(ctx, stmt));
            }
            code.push(Instruction::new(Opcode::Label, Some(l_end), None, None));
            code
        }

        NodeKind::IfElse { cond, then_branch, else_branch } => {
            let mut code = gen_node(ctx, cond);
            let r_e = result_symbol(&code);
            let l_else = ctx.symbols.make_label();
            let l_end = ctx.symbols.make_label();
            code.push(Instruction::new(Opcode::Jfalse, Some(l_else), r_e, None));
            for stmt in then_branch {
                code.append(gen_node(ctx, stmt));
            }
            code.push(Instruction::new(Opcode::Jump, Some(l_end), None, None));
            code.push(Instruction::new(Opcode::Label, Some(l_else), None, None));
            for stmt in else_branch {
                code.append(gen_node(ctx, stmt));
            }
            code.push(Instruction::new(Opcode::Label, Some(l_end), None, None));
            code
        }

        NodeKind::Loop { cond, body } => {
            let l_start = ctx.symbols.make_label();
            let l_end = ctx.symbols.make_label();
            let mut code = TacBuilder::single(Instruction::new(Opcode::Label, Some(l_start), None, None));
            let cond_code = gen_node(ctx, cond);
            let r_e = result_symbol(&cond_code);
            code.append(cond_code);
            code.push(Instruction::new(Opcode::Jfalse, Some(l_end), r_e, None));
            for stmt in body {
                code.append(gen_node(ctx, stmt));
            }
            code.push(Instruction::new(Opcode::Jump, Some(l_start), None, None));
            code.push(Instruction::new(Opcode::Label, Some(l_end), None, None));
            code
        }

        NodeKind::Return { value } => {
            let mut code = gen_node(ctx, value);
            let r0 = result_symbol(&code);
            code.push(Instruction::new(Opcode::Ret, None, r0, None));
            code
        }

        NodeKind::Output { args } => {
            let mut code = TacBuilder::new();
            for arg in args {
                let arg_code = gen_node(ctx, arg);
                let r0 = result_symbol(&arg_code);
                code.append(arg_code);
                code.push(Instruction::new(Opcode::PrintArg, None, r0, None));
            }
            code.push(Instruction::new(Opcode::Print, None, None, None));
            code
        }

        NodeKind::VarDecl { symbol, init, .. } => match init {
            Some(init) => {
                let mut code = gen_node(ctx, init);
                let r0 = result_symbol(&code);
                code.push(Instruction::new(Opcode::Vardec, Some(*symbol), r0, None));
                code
            }
            None => TacBuilder::single(Instruction::new(Opcode::Vardec, Some(*symbol), None, None)),
        },

        NodeKind::VecDecl { symbol, size, init_items, .. } => {
            let mut code = gen_node(ctx, size);
            let r_size = result_symbol(&code);
            code.push(Instruction::new(Opcode::Vecdec, Some(*symbol), r_size, None));
            for (i, item) in init_items.iter().enumerate() {
                let item_code = gen_node(ctx, item);
                let r_item = result_symbol(&item_code);
                code.append(item_code);
                let index_symbol = ctx.symbols.insert_literal(
                    &i.to_string(),
                    crate::symbol::SymbolKind::LiteralInt,
                    crate::symbol::Datatype::Int,
                    node.line,
                );
                code.push(Instruction::new(Opcode::Copy, Some(*symbol), Some(index_symbol), r_item));
            }
            code
        }

        // Parameters are already declared symbols; nothing to emit.
        NodeKind::Param { .. } => TacBuilder::new(),

        NodeKind::FuncDecl { symbol, params, body, .. } => {
            let mut code = TacBuilder::single(Instruction::new(Opcode::Beginfun, Some(*symbol), None, None));
            for param in params {
                code.append(gen_node(ctx, param));
            }
            for stmt in body {
                code.append(gen_node(ctx, stmt));
            }
            code.push(Instruction::new(Opcode::Endfun, Some(*symbol), None, None));
            code
        }

        NodeKind::Program { items } => {
            let mut code = TacBuilder::new();
            for item in items {
                code.append(gen_node(ctx, item));
            }
            code
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstBuilder;
    use crate::semantic::SemanticAnalyzer;
    use crate::symbol::Datatype;

    fn analyzed(program: Node, ctx: &mut CompilerContext) -> Node {
        let result = SemanticAnalyzer::new().analyze(ctx, &program);
        assert!(result.is_ok(), "expected well-typed program, got {:?}", result.errors);
        program
    }

    #[test]
    fn if_else_lowers_to_balanced_labels_in_source_order() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let init_x = b.lit_int("0", 1);
            let x = b.var_decl("x", Datatype::Int, Some(init_x), 1);
            let init_a = b.lit_int("1", 1);
            let a = b.var_decl("a", Datatype::Int, Some(init_a), 1);
            let init_b = b.lit_int("2", 1);
            let bb = b.var_decl("b", Datatype::Int, Some(init_b), 1);
            let lhs = b.identifier("a", 2);
            let rhs = b.identifier("b", 2);
            let cond = b.binary(BinOp::Lt, lhs, rhs, 2);
            let then_value = b.lit_int("1", 2);
            let then_branch = vec![b.var_attrib("x", then_value, 2)];
            let else_value = b.lit_int("2", 2);
            let else_branch = vec![b.var_attrib("x", else_value, 2)];
            let if_else = b.if_else_stmt(cond, then_branch, else_branch, 2);
            b.program(vec![x, a, bb, if_else])
        };
        let program = analyzed(program, &mut ctx);
        let tac = TacGenerator::generate(&mut ctx, &program).unwrap();

        let labels: Vec<_> = tac
            .instructions()
            .iter()
            .filter(|i| i.op == Opcode::Label)
            .map(|i| i.res.unwrap())
            .collect();
        assert_eq!(labels.len(), 2, "expected one else-label and one end-label");
        assert_eq!(labels[0], labels[1] - 1, "labels minted back to back for one if/else");

        let jfalse_target = tac.instructions().iter().find(|i| i.op == Opcode::Jfalse).unwrap().res;
        assert_eq!(jfalse_target, Some(labels[0]));
        let jump_target = tac.instructions().iter().find(|i| i.op == Opcode::Jump).unwrap().res;
        assert_eq!(jump_target, Some(labels[1]));
    }

    #[test]
    fn func_decl_brackets_its_body_with_beginfun_and_endfun() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let p = b.param("n", Datatype::Int, 1);
            let ret_value = b.identifier("n", 2);
            let ret = b.return_stmt(ret_value, 2);
            let f = b.func_decl("f", Datatype::Int, vec![p], vec![ret], 1);
            b.program(vec![f])
        };
        let program = analyzed(program, &mut ctx);
        let tac = TacGenerator::generate(&mut ctx, &program).unwrap();
        let ops: Vec<_> = tac.instructions().iter().map(|i| i.op).collect();
        assert_eq!(ops.first(), Some(&Opcode::Beginfun));
        assert_eq!(ops.last(), Some(&Opcode::Endfun));
        assert!(ops.contains(&Opcode::Ret));
    }

    #[test]
    fn call_emits_one_arg_per_argument_and_exactly_one_call() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let p1 = b.param("a", Datatype::Int, 1);
            let p2 = b.param("b", Datatype::Int, 1);
            let ret_value = b.identifier("a", 1);
            let ret = b.return_stmt(ret_value, 1);
            let f = b.func_decl("f", Datatype::Int, vec![p1, p2], vec![ret], 1);
            let arg1 = b.lit_int("1", 2);
            let arg2 = b.lit_int("2", 2);
            let call = b.func_call("f", vec![arg1, arg2], 2);
            let x = b.var_decl("x", Datatype::Int, Some(call), 2);
            b.program(vec![f, x])
        };
        let program = analyzed(program, &mut ctx);
        let tac = TacGenerator::generate(&mut ctx, &program).unwrap();
        let arg_count = tac.instructions().iter().filter(|i| i.op == Opcode::Arg).count();
        let call_count = tac.instructions().iter().filter(|i| i.op == Opcode::Call).count();
        assert_eq!(arg_count, 2);
        assert_eq!(call_count, 1);
    }

    #[test]
    fn vec_access_lowers_to_copy_not_a_vec_access_instruction() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let size = b.lit_int("3", 1);
            let v = b.vec_decl("v", Datatype::Int, size, vec![], 1);
            let x = b.var_decl("x", Datatype::Int, None, 1);
            let index = b.lit_int("0", 2);
            let access = b.vec_access("v", index, 2);
            let assign = b.var_attrib("x", access, 2);
            b.program(vec![v, x, assign])
        };
        let program = analyzed(program, &mut ctx);
        let tac = TacGenerator::generate(&mut ctx, &program).unwrap();

        assert!(
            !tac.instructions().iter().any(|i| i.op == Opcode::VecAccess),
            "vector reads must lower to COPY, not the vestigial VEC_ACCESS opcode"
        );
        // One COPY for the vector read into a temp, one for the assignment to `x`.
        let copy_count = tac.instructions().iter().filter(|i| i.op == Opcode::Copy).count();
        assert_eq!(copy_count, 2);
    }

    #[test]
    fn generation_refuses_a_program_with_outstanding_errors() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let value = b.lit_int("1", 1);
            let stmt = b.var_attrib("undeclared", value, 1);
            b.program(vec![stmt])
        };
        let result = SemanticAnalyzer::new().analyze(&mut ctx, &program);
        assert!(!result.is_ok());
        assert!(TacGenerator::generate(&mut ctx, &program).is_err());
    }
}
