//! The seven-pass semantic analyzer: declarations, undeclared-identifier
//! sweep, operand typechecking, assignment validation, return validation,
//! call arity/type validation, and conditional-expression validation.
//!
//! Every pass is a full tree walk rather than an early-exit validator —
//! passes never abort on the first error, so one run surfaces every
//! independent diagnostic (`semantic.c`'s behavior, preserved here).

use std::fmt;

use crate::ast::{Node, NodeKind, UnOp};
use crate::context::CompilerContext;
use crate::semantic::predicates::{
    coerce_for_arithmetic, compare_datatypes, is_bool_shape, is_numeric_shape, literal_compatible_with_element,
};
use crate::symbol::{Datatype, SymbolId, SymbolKind};

/// One diagnostic kind, one per entry in the error-handling design. Every
/// variant but `UndeclaredIdentifier` carries a line number, matching the
/// wire format's "undeclared-identifier messages omit line" rule.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticError {
    Redeclaration { text: String, line: u32 },
    UndeclaredIdentifier { text: String },
    BadVectorInitializer { text: String, index: usize, line: u32 },
    VectorSizeMismatch { text: String, got: usize, expected: usize, line: u32 },
    VectorUsedAsValue { text: String, line: u32 },
    FunctionUsedAsValue { text: String, line: u32 },
    NotIndexable { text: String, line: u32 },
    NotCallable { text: String, line: u32 },
    NestedExprMisuse { text: String, line: u32 },
    OperandTypeMismatch { line: u32 },
    NonNumericOperand { text: String, line: u32 },
    NonBooleanOperand { line: u32 },
    AssignToFunction { text: String, line: u32 },
    InvalidAssignment { from: Datatype, to: Datatype, line: u32 },
    BadVectorIndex { text: String, line: u32 },
    MissingReturn { function: String, line: u32 },
    WrongReturnType { function: String, expected: Datatype, got: Datatype, line: u32 },
    WrongArgumentCount { function: String, expected: usize, got: usize, line: u32 },
    WrongArgumentType { function: String, index: usize, line: u32 },
    NonBooleanCondition { line: u32 },
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticError::Redeclaration { text, line } => {
                write!(f, "Semantic error: identifier {text} already declared at line {line}")
            }
            SemanticError::UndeclaredIdentifier { text } => {
                write!(f, "Semantic error: undeclared identifier {text}")
            }
            SemanticError::BadVectorInitializer { text, index, line } => write!(
                f,
                "Semantic error: invalid initializer element {index} for vector {text} at line {line}"
            ),
            SemanticError::VectorSizeMismatch { text, got, expected, line } => write!(
                f,
                "Semantic error: {text} has {got} initialization items, but its size is {expected} at line {line}"
            ),
            SemanticError::VectorUsedAsValue { text, line } => {
                write!(f, "Semantic error: vector {text} used as value at line {line}")
            }
            SemanticError::FunctionUsedAsValue { text, line } => {
                write!(f, "Semantic error: function {text} used as value at line {line}")
            }
            SemanticError::NotIndexable { text, line } => {
                write!(f, "Semantic error: {text} is not a vector and cannot be indexed at line {line}")
            }
            SemanticError::NotCallable { text, line } => {
                write!(f, "Semantic error: {text} is not a function and cannot be called at line {line}")
            }
            SemanticError::NestedExprMisuse { text, line } => write!(
                f,
                "Semantic error: nested expression starting with vector/function {text} at line {line}"
            ),
            SemanticError::OperandTypeMismatch { line } => {
                write!(f, "Semantic error: operands should have same type at line {line}")
            }
            SemanticError::NonNumericOperand { text, line } => write!(
                f,
                "Semantic error: non-numeric operand {text} in arithmetic expression at line {line}"
            ),
            SemanticError::NonBooleanOperand { line } => {
                write!(f, "Semantic error: non-boolean operand in logical expression at line {line}")
            }
            SemanticError::AssignToFunction { text, line } => {
                write!(f, "Semantic error: cannot assign to function {text} at line {line}")
            }
            SemanticError::InvalidAssignment { from, to, line } => {
                write!(f, "Semantic error: invalid assignment of {from} to {to} at line {line}")
            }
            SemanticError::BadVectorIndex { text, line } => {
                write!(f, "Semantic error: vector {text} index must be an integer at line {line}")
            }
            SemanticError::MissingReturn { function, line } => write!(
                f,
                "Semantic error: missing return statement in function {function} at line {line}"
            ),
            SemanticError::WrongReturnType { function, expected, got, line } => write!(
                f,
                "Semantic error: wrong return type in function {function}, expected {expected} got {got} at line {line}"
            ),
            SemanticError::WrongArgumentCount { expected, got, line, .. } => write!(
                f,
                "Semantic error: invalid number of parameters (expected {expected}, got {got}) at line {line}"
            ),
            SemanticError::WrongArgumentType { function, index, line } => write!(
                f,
                "Semantic error: argument {index} of call to {function} has the wrong type at line {line}"
            ),
            SemanticError::NonBooleanCondition { line } => {
                write!(f, "Semantic error: condition must be boolean at line {line}")
            }
        }
    }
}

impl std::error::Error for SemanticError {}

/// The seven passes, in their fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Declarations,
    Undeclared,
    Operands,
    Assignments,
    Returns,
    FunctionCalls,
    Conditionals,
}

impl Pass {
    fn order(self) -> u8 {
        match self {
            Pass::Declarations => 0,
            Pass::Undeclared => 1,
            Pass::Operands => 2,
            Pass::Assignments => 3,
            Pass::Returns => 4,
            Pass::FunctionCalls => 5,
            Pass::Conditionals => 6,
        }
    }
}

/// Tunables for the analyzer, mirroring the teacher's `AnalyzerConfig`
/// pattern: toggles consumed by tooling that wants partial or bounded runs
/// rather than a full compile.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub max_errors: Option<usize>,
    pub stop_after: Option<Pass>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { max_errors: None, stop_after: None }
    }
}

/// Counters surfaced alongside the error list, for tooling/telemetry.
#[derive(Debug, Clone, Default)]
pub struct AnalysisStats {
    pub declarations_checked: usize,
    pub expressions_typechecked: usize,
    pub functions_checked: usize,
    pub calls_checked: usize,
}

/// Outcome of a full `SemanticAnalyzer::analyze` run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    pub errors: Vec<SemanticError>,
    pub stats: AnalysisStats,
}

impl AnalysisResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SemanticAnalyzer {
    config: AnalysisConfig,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    fn should_stop(&self, just_ran: Pass) -> bool {
        match self.config.stop_after {
            Some(stop) => stop.order() <= just_ran.order(),
            None => false,
        }
    }

    /// Runs all seven passes over `program` in order, threading `ctx`
    /// through each. TAC generation is the caller's responsibility and
    /// should only proceed if the returned result `is_ok()`.
    pub fn analyze(&self, ctx: &mut CompilerContext, program: &Node) -> AnalysisResult {
        let mut stats = AnalysisStats::default();

        log::debug!("pass 1: check_and_set_declarations");
        check_and_set_declarations(ctx, program, &mut stats);
        if self.max_errors_hit(ctx) || self.should_stop(Pass::Declarations) {
            return self.finish(ctx, stats);
        }

        log::debug!("pass 2: check_undeclared");
        check_undeclared(ctx);
        if self.max_errors_hit(ctx) || self.should_stop(Pass::Undeclared) {
            return self.finish(ctx, stats);
        }

        log::debug!("pass 3: check_operands");
        check_operands(ctx, program, &mut stats);
        if self.max_errors_hit(ctx) || self.should_stop(Pass::Operands) {
            return self.finish(ctx, stats);
        }

        log::debug!("pass 4: check_assignments");
        check_assignments(ctx, program);
        if self.max_errors_hit(ctx) || self.should_stop(Pass::Assignments) {
            return self.finish(ctx, stats);
        }

        log::debug!("pass 5: check_return");
        check_return(ctx, program, &mut stats);
        if self.max_errors_hit(ctx) || self.should_stop(Pass::Returns) {
            return self.finish(ctx, stats);
        }

        log::debug!("pass 6: check_function_call");
        check_function_call(ctx, program, &mut stats);
        if self.max_errors_hit(ctx) || self.should_stop(Pass::FunctionCalls) {
            return self.finish(ctx, stats);
        }

        log::debug!("pass 7: check_conditional_stmts");
        check_conditional_stmts(ctx, program);

        self.finish(ctx, stats)
    }

    fn max_errors_hit(&self, ctx: &CompilerContext) -> bool {
        matches!(self.config.max_errors, Some(max) if ctx.error_count() >= max)
    }

    fn finish(&self, ctx: &mut CompilerContext, stats: AnalysisStats) -> AnalysisResult {
        AnalysisResult { errors: std::mem::take(&mut ctx.errors), stats }
    }
}

fn describe(ctx: &CompilerContext, node: &Node) -> String {
    match node.symbol() {
        Some(id) => ctx.symbols.get(id).text.clone(),
        None => "<expression>".to_string(),
    }
}

fn parse_vector_size(size: &Node, ctx: &CompilerContext) -> Option<usize> {
    let id = size.symbol()?;
    ctx.symbols.get(id).text.parse::<usize>().ok()
}

// ---------------------------------------------------------------------
// Pass 1 — declarations
// ---------------------------------------------------------------------

fn check_and_set_declarations(ctx: &mut CompilerContext, node: &Node, stats: &mut AnalysisStats) {
    match &node.kind {
        NodeKind::VarDecl { symbol, datatype, .. } => {
            stats.declarations_checked += 1;
            if let Err(e) = ctx.symbols.promote(*symbol, SymbolKind::Variable, *datatype, node.line) {
                ctx.report(SemanticError::Redeclaration { text: e.text, line: e.line_number });
            }
        }
        NodeKind::VecDecl { symbol, datatype, size, init_items } => {
            stats.declarations_checked += 1;
            match ctx.symbols.promote(*symbol, SymbolKind::Vector, *datatype, node.line) {
                Err(e) => ctx.report(SemanticError::Redeclaration { text: e.text, line: e.line_number }),
                Ok(()) => {
                    if let Some(declared_size) = parse_vector_size(size, ctx) {
                        if !init_items.is_empty() {
                            let text = ctx.symbols.get(*symbol).text.clone();
                            for (i, item) in init_items.iter().enumerate() {
                                if !literal_compatible_with_element(*datatype, item, &ctx.symbols) {
                                    ctx.report(SemanticError::BadVectorInitializer {
                                        text: text.clone(),
                                        index: i,
                                        line: item.line,
                                    });
                                }
                            }
                            if init_items.len() != declared_size {
                                ctx.report(SemanticError::VectorSizeMismatch {
                                    text,
                                    got: init_items.len(),
                                    expected: declared_size,
                                    line: node.line,
                                });
                            }
                        }
                    }
                }
            }
        }
        NodeKind::Param { symbol, datatype } => {
            stats.declarations_checked += 1;
            if let Err(e) = ctx.symbols.promote(*symbol, SymbolKind::Parameter, *datatype, node.line) {
                ctx.report(SemanticError::Redeclaration { text: e.text, line: e.line_number });
            }
        }
        NodeKind::FuncDecl { symbol, datatype, params, .. } => {
            stats.declarations_checked += 1;
            stats.functions_checked += 1;
            let param_types: Vec<Datatype> = params
                .iter()
                .map(|p| match &p.kind {
                    NodeKind::Param { datatype, .. } => *datatype,
                    _ => Datatype::Unset,
                })
                .collect();
            let param_symbols: Vec<SymbolId> = params.iter().filter_map(|p| p.symbol()).collect();
            let fn_id = ctx.next_function_id();
            if let Err(e) = ctx
                .symbols
                .promote_function(*symbol, *datatype, param_types, param_symbols, node.line, fn_id)
            {
                ctx.report(SemanticError::Redeclaration { text: e.text, line: e.line_number });
            }
        }
        _ => {}
    }
    for child in node.children() {
        check_and_set_declarations(ctx, child, stats);
    }
}

// ---------------------------------------------------------------------
// Pass 2 — undeclared identifiers
// ---------------------------------------------------------------------

fn check_undeclared(ctx: &mut CompilerContext) {
    for text in ctx.symbols.check_undeclared() {
        ctx.report(SemanticError::UndeclaredIdentifier { text });
    }
}

// ---------------------------------------------------------------------
// Pass 3 — operand / expression typechecking
// ---------------------------------------------------------------------

fn check_operands(ctx: &mut CompilerContext, node: &Node, stats: &mut AnalysisStats) {
    typecheck(ctx, node, stats);
}

fn typecheck(ctx: &mut CompilerContext, node: &Node, stats: &mut AnalysisStats) -> Datatype {
    if node.typechecked.get() {
        return node.result_datatype.get();
    }
    let ty = compute_datatype(ctx, node, stats);
    node.result_datatype.set(ty);
    node.typechecked.set(true);
    stats.expressions_typechecked += 1;
    ty
}

fn compute_datatype(ctx: &mut CompilerContext, node: &Node, stats: &mut AnalysisStats) -> Datatype {
    match &node.kind {
        NodeKind::LitInt { .. } => Datatype::Int,
        NodeKind::LitReal { .. } => Datatype::Real,
        NodeKind::LitChar { .. } => Datatype::Char,
        NodeKind::LitString { .. } => Datatype::Unset,
        NodeKind::Identifier { symbol } => {
            let sym = ctx.symbols.get(*symbol).clone();
            if sym.is_function {
                ctx.report(SemanticError::FunctionUsedAsValue { text: sym.text, line: node.line });
                Datatype::Unset
            } else if sym.is_vector {
                ctx.report(SemanticError::VectorUsedAsValue { text: sym.text, line: node.line });
                Datatype::Unset
            } else {
                coerce_for_arithmetic(sym.datatype)
            }
        }
        NodeKind::VecAccess { symbol, index } => {
            let sym = ctx.symbols.get(*symbol).clone();
            if !sym.is_vector {
                ctx.report(SemanticError::NotIndexable { text: sym.text.clone(), line: node.line });
            }
            let index_ty = typecheck(ctx, index, stats);
            if !compare_datatypes(index_ty, Datatype::Int) {
                ctx.report(SemanticError::BadVectorIndex { text: sym.text.clone(), line: index.line });
            }
            if sym.is_vector { sym.datatype } else { Datatype::Unset }
        }
        NodeKind::FuncCall { symbol, args } => {
            let sym = ctx.symbols.get(*symbol).clone();
            if !sym.is_function && sym.kind != SymbolKind::Identifier {
                ctx.report(SemanticError::NotCallable { text: sym.text.clone(), line: node.line });
            }
            for arg in args {
                typecheck(ctx, &arg.expr, stats);
            }
            if sym.is_function { sym.datatype } else { Datatype::Unset }
        }
        NodeKind::Binary { op, left, right } => {
            let left_ty = typecheck(ctx, left, stats);
            let right_ty = typecheck(ctx, right, stats);
            if op.is_logical() {
                if !is_bool_shape(left) {
                    ctx.report(SemanticError::NonBooleanOperand { line: left.line });
                }
                if !is_bool_shape(right) {
                    ctx.report(SemanticError::NonBooleanOperand { line: right.line });
                }
                Datatype::Bool
            } else {
                if !is_numeric_shape(left) {
                    ctx.report(SemanticError::NonNumericOperand { text: describe(ctx, left), line: left.line });
                }
                if !is_numeric_shape(right) {
                    ctx.report(SemanticError::NonNumericOperand { text: describe(ctx, right), line: right.line });
                }
                if !compare_datatypes(left_ty, right_ty) {
                    ctx.report(SemanticError::OperandTypeMismatch { line: node.line });
                }
                if op.is_relational() {
                    Datatype::Bool
                } else if left_ty == Datatype::Real || right_ty == Datatype::Real {
                    Datatype::Real
                } else {
                    Datatype::Int
                }
            }
        }
        NodeKind::Unary { op, operand } => {
            let ty = typecheck(ctx, operand, stats);
            match op {
                UnOp::Neg => {
                    if !is_numeric_shape(operand) {
                        ctx.report(SemanticError::NonNumericOperand {
                            text: describe(ctx, operand),
                            line: operand.line,
                        });
                    }
                    ty
                }
                UnOp::Not => {
                    if !is_bool_shape(operand) {
                        ctx.report(SemanticError::NonBooleanOperand { line: operand.line });
                    }
                    Datatype::Bool
                }
            }
        }
        NodeKind::NestedExpr { inner } => typecheck(ctx, inner, stats),
        NodeKind::InputExpr { datatype } => *datatype,
        // Structural nodes carry no datatype of their own; still walk
        // every child so nested expressions get memoized before later
        // passes read `result_datatype`.
        _ => {
            for child in node.children() {
                typecheck(ctx, child, stats);
            }
            Datatype::Unset
        }
    }
}

// ---------------------------------------------------------------------
// Pass 4 — assignments
// ---------------------------------------------------------------------

fn check_assignments(ctx: &mut CompilerContext, node: &Node) {
    match &node.kind {
        NodeKind::VarAttrib { symbol, value } => {
            let sym = ctx.symbols.get(*symbol).clone();
            if sym.is_function {
                ctx.report(SemanticError::AssignToFunction { text: sym.text, line: node.line });
            } else {
                let value_ty = value.result_datatype.get();
                if !compare_datatypes(sym.datatype, value_ty) {
                    ctx.report(SemanticError::InvalidAssignment {
                        from: value_ty,
                        to: sym.datatype,
                        line: node.line,
                    });
                }
            }
        }
        NodeKind::VecAttrib { symbol, index, value } => {
            let sym = ctx.symbols.get(*symbol).clone();
            let index_ty = index.result_datatype.get();
            if !compare_datatypes(index_ty, Datatype::Int) {
                ctx.report(SemanticError::BadVectorIndex { text: sym.text.clone(), line: index.line });
            }
            let value_ty = value.result_datatype.get();
            if !compare_datatypes(sym.datatype, value_ty) {
                ctx.report(SemanticError::InvalidAssignment { from: value_ty, to: sym.datatype, line: node.line });
            }
        }
        _ => {}
    }
    for child in node.children() {
        check_assignments(ctx, child);
    }
}

// ---------------------------------------------------------------------
// Pass 5 — returns
// ---------------------------------------------------------------------

fn check_return(ctx: &mut CompilerContext, node: &Node, stats: &mut AnalysisStats) {
    if let NodeKind::FuncDecl { symbol, datatype, body, .. } = &node.kind {
        stats.functions_checked += 1;
        let text = ctx.symbols.get(*symbol).text.clone();
        let mut found = false;
        check_return_in_body(ctx, body, *datatype, &text, &mut found);
        if !found {
            ctx.report(SemanticError::MissingReturn { function: text, line: node.line });
        }
    }
    for child in node.children() {
        check_return(ctx, child, stats);
    }
}

fn check_return_in_body(ctx: &mut CompilerContext, nodes: &[Node], expected: Datatype, fn_text: &str, found: &mut bool) {
    for n in nodes {
        check_return_in_node(ctx, n, expected, fn_text, found);
    }
}

fn check_return_in_node(ctx: &mut CompilerContext, node: &Node, expected: Datatype, fn_text: &str, found: &mut bool) {
    match &node.kind {
        NodeKind::Return { value } => {
            *found = true;
            validate_return_value(ctx, value, expected, fn_text, node.line);
        }
        NodeKind::If { then_branch, .. } => check_return_in_body(ctx, then_branch, expected, fn_text, found),
        NodeKind::IfElse { then_branch, else_branch, .. } => {
            check_return_in_body(ctx, then_branch, expected, fn_text, found);
            check_return_in_body(ctx, else_branch, expected, fn_text, found);
        }
        NodeKind::Loop { body, .. } => check_return_in_body(ctx, body, expected, fn_text, found),
        NodeKind::FuncDecl { .. } => {}
        _ => {}
    }
}

fn validate_return_value(ctx: &mut CompilerContext, value: &Node, expected: Datatype, fn_text: &str, line: u32) {
    match &value.kind {
        NodeKind::Identifier { symbol } => {
            let sym = ctx.symbols.get(*symbol).clone();
            if sym.is_vector {
                ctx.report(SemanticError::VectorUsedAsValue { text: sym.text, line });
                return;
            }
            if sym.is_function {
                ctx.report(SemanticError::FunctionUsedAsValue { text: sym.text, line });
                return;
            }
        }
        NodeKind::NestedExpr { inner } => {
            if let NodeKind::Identifier { symbol } = &inner.kind {
                let sym = ctx.symbols.get(*symbol);
                if sym.is_vector || sym.is_function {
                    ctx.report(SemanticError::NestedExprMisuse { text: sym.text.clone(), line });
                    return;
                }
            }
        }
        _ => {}
    }
    let actual = value.result_datatype.get();
    if !compare_datatypes(expected, actual) {
        ctx.report(SemanticError::WrongReturnType {
            function: fn_text.to_string(),
            expected,
            got: actual,
            line,
        });
    }
}

// ---------------------------------------------------------------------
// Pass 6 — call arity & types
// ---------------------------------------------------------------------

fn check_function_call(ctx: &mut CompilerContext, node: &Node, stats: &mut AnalysisStats) {
    if let NodeKind::FuncCall { symbol, args } = &node.kind {
        let sym = ctx.symbols.get(*symbol).clone();
        if sym.kind != SymbolKind::Identifier {
            stats.calls_checked += 1;
            if args.len() != sym.params.len() {
                ctx.report(SemanticError::WrongArgumentCount {
                    function: sym.text.clone(),
                    expected: sym.params.len(),
                    got: args.len(),
                    line: node.line,
                });
            }
            for (i, (arg, expected)) in args.iter().zip(sym.params.iter()).enumerate() {
                let actual = arg.expr.result_datatype.get();
                if !compare_datatypes(*expected, actual) {
                    ctx.report(SemanticError::WrongArgumentType {
                        function: sym.text.clone(),
                        index: i,
                        line: arg.expr.line,
                    });
                }
            }
        }
    }
    for child in node.children() {
        check_function_call(ctx, child, stats);
    }
}

// ---------------------------------------------------------------------
// Pass 7 — conditionals
// ---------------------------------------------------------------------

fn check_conditional_stmts(ctx: &mut CompilerContext, node: &Node) {
    match &node.kind {
        NodeKind::If { cond, .. } | NodeKind::IfElse { cond, .. } | NodeKind::Loop { cond, .. } => {
            check_condition(ctx, cond);
        }
        _ => {}
    }
    for child in node.children() {
        check_conditional_stmts(ctx, child);
    }
}

fn check_condition(ctx: &mut CompilerContext, cond: &Node) {
    let ok = match &cond.kind {
        NodeKind::Identifier { symbol } => ctx.symbols.get(*symbol).datatype == Datatype::Bool,
        _ => cond.result_datatype.get() == Datatype::Bool,
    };
    if !ok {
        ctx.report(SemanticError::NonBooleanCondition { line: cond.line });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstBuilder, BinOp, UnOp};

    #[test]
    fn redeclaration_is_reported_once_and_symbol_stays_promoted() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let d1 = b.var_decl("x", Datatype::Int, None, 1);
            let d2 = b.var_decl("x", Datatype::Int, None, 1);
            b.program(vec![d1, d2])
        };
        let result = SemanticAnalyzer::new().analyze(&mut ctx, &program);
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(result.errors[0], SemanticError::Redeclaration { .. }));
        let id = ctx.symbols.find("x").unwrap();
        assert_eq!(ctx.symbols.get(id).kind, SymbolKind::Variable);
        assert_eq!(ctx.symbols.get(id).datatype, Datatype::Int);
    }

    #[test]
    fn vector_init_size_mismatch_is_reported() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let size = b.lit_int("3", 1);
            let i1 = b.lit_int("1", 1);
            let i2 = b.lit_int("2", 1);
            let decl = b.vec_decl("v", Datatype::Int, size, vec![i1, i2], 1);
            b.program(vec![decl])
        };
        let result = SemanticAnalyzer::new().analyze(&mut ctx, &program);
        assert!(result.errors.iter().any(|e| matches!(
            e,
            SemanticError::VectorSizeMismatch { got: 2, expected: 3, .. }
        )));
    }

    #[test]
    fn mismatched_binary_operand_types_cascade_into_assignment_error() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let dx = b.var_decl("x", Datatype::Int, None, 1);
            let dy = b.var_decl("y", Datatype::Real, None, 1);
            let x1 = b.identifier("x", 2);
            let y1 = b.identifier("y", 2);
            let sum = b.binary(BinOp::Add, x1, y1, 2);
            let assign = b.var_attrib("x", sum, 2);
            b.program(vec![dx, dy, assign])
        };
        let result = SemanticAnalyzer::new().analyze(&mut ctx, &program);
        assert!(result.errors.iter().any(|e| matches!(e, SemanticError::OperandTypeMismatch { .. })));
        assert!(result.errors.iter().any(|e| matches!(
            e,
            SemanticError::InvalidAssignment { from: Datatype::Real, to: Datatype::Int, .. }
        )));
    }

    #[test]
    fn missing_return_is_reported() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let out = b.output_stmt(vec![], 1);
            let f = b.func_decl("f", Datatype::Int, vec![], vec![out], 1);
            b.program(vec![f])
        };
        let result = SemanticAnalyzer::new().analyze(&mut ctx, &program);
        assert!(result.errors.iter().any(|e| matches!(e, SemanticError::MissingReturn { .. })));
    }

    #[test]
    fn wrong_arity_call_is_reported() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let pa = b.param("a", Datatype::Int, 1);
            let pb = b.param("b", Datatype::Int, 1);
            let ret = b.identifier("a", 1);
            let ret_stmt = b.return_stmt(ret, 1);
            let f = b.func_decl("f", Datatype::Int, vec![pa, pb], vec![ret_stmt], 1);
            let one = b.lit_int("1", 2);
            let call = b.func_call("f", vec![one], 2);
            let call_assign = b.var_decl("r", Datatype::Int, Some(call), 2);
            b.program(vec![f, call_assign])
        };
        let result = SemanticAnalyzer::new().analyze(&mut ctx, &program);
        assert!(result.errors.iter().any(|e| matches!(
            e,
            SemanticError::WrongArgumentCount { expected: 2, got: 1, .. }
        )));
    }

    #[test]
    fn well_typed_program_has_no_errors() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let d = b.var_decl("x", Datatype::Int, None, 1);
            let lit = b.lit_int("5", 2);
            let assign = b.var_attrib("x", lit, 2);
            b.program(vec![d, assign])
        };
        let result = SemanticAnalyzer::new().analyze(&mut ctx, &program);
        assert!(result.is_ok());
    }

    #[test]
    fn non_boolean_condition_is_reported() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let d = b.var_decl("x", Datatype::Int, None, 1);
            let cond = b.lit_int("1", 2);
            let body_assign_lit = b.lit_int("2", 2);
            let body = b.var_attrib("x", body_assign_lit, 2);
            let if_stmt = b.if_stmt(cond, vec![body], 2);
            b.program(vec![d, if_stmt])
        };
        let result = SemanticAnalyzer::new().analyze(&mut ctx, &program);
        assert!(result.errors.iter().any(|e| matches!(e, SemanticError::NonBooleanCondition { .. })));
    }

    #[test]
    fn non_boolean_operands_to_and_are_each_reported() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let da = b.var_decl("a", Datatype::Int, None, 1);
            let db = b.var_decl("b", Datatype::Int, None, 1);
            let dc = b.var_decl("c", Datatype::Bool, None, 1);
            let lhs = b.identifier("a", 2);
            let rhs = b.identifier("b", 2);
            let conj = b.binary(BinOp::And, lhs, rhs, 2);
            let assign = b.var_attrib("c", conj, 2);
            b.program(vec![da, db, dc, assign])
        };
        let result = SemanticAnalyzer::new().analyze(&mut ctx, &program);
        let non_bool_count = result
            .errors
            .iter()
            .filter(|e| matches!(e, SemanticError::NonBooleanOperand { .. }))
            .count();
        assert_eq!(non_bool_count, 2, "both non-boolean operands to AND should be reported independently");
    }

    #[test]
    fn non_boolean_operand_to_not_is_reported() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let da = b.var_decl("a", Datatype::Int, None, 1);
            let dc = b.var_decl("c", Datatype::Bool, None, 1);
            let lhs = b.identifier("a", 2);
            let negated = b.unary(UnOp::Not, lhs, 2);
            let assign = b.var_attrib("c", negated, 2);
            b.program(vec![da, dc, assign])
        };
        let result = SemanticAnalyzer::new().analyze(&mut ctx, &program);
        assert!(result.errors.iter().any(|e| matches!(e, SemanticError::NonBooleanOperand { .. })));
    }

    #[test]
    fn non_numeric_bool_operands_to_arithmetic_are_each_reported() {
        let mut ctx = CompilerContext::new();
        let program = {
            let mut b = AstBuilder::new(&mut ctx.symbols);
            let da = b.var_decl("a", Datatype::Bool, None, 1);
            let db = b.var_decl("b", Datatype::Bool, None, 1);
            let dc = b.var_decl("c", Datatype::Int, None, 1);
            let lhs = b.identifier("a", 2);
            let rhs = b.identifier("b", 2);
            let sum = b.binary(BinOp::Add, lhs, rhs, 2);
            let assign = b.var_attrib("c", sum, 2);
            b.program(vec![da, db, dc, assign])
        };
        let result = SemanticAnalyzer::new().analyze(&mut ctx, &program);
        let non_numeric_count = result
            .errors
            .iter()
            .filter(|e| matches!(e, SemanticError::NonNumericOperand { .. }))
            .count();
        assert_eq!(non_numeric_count, 2, "both boolean operands to + should be reported independently");
    }
}
