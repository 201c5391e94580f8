//! Closed predicates over node kinds and datatypes that the analyzer and the
//! TAC generator both rely on. Kept separate from `analyzer.rs` because they
//! carry no pass-ordering logic of their own — just classification.

use crate::ast::{BinOp, Node, UnOp};
use crate::symbol::{Datatype, SymbolKind, SymbolTable};

/// `ADD, SUB, MUL, DIV`.
pub fn is_arithmetic(op: BinOp) -> bool {
    op.is_arithmetic()
}

/// `AND, OR, NOT, LE, GE, EQ, DIF, GT, LT` — every operator whose operands
/// or result are boolean-flavored, per the distinction the analyzer draws
/// between arithmetic and logic/relational context.
pub fn is_logic_binop(op: BinOp) -> bool {
    op.is_relational() || op.is_logical()
}

pub fn is_logic_unop(op: UnOp) -> bool {
    matches!(op, UnOp::Not)
}

/// `NEG, NOT`.
pub fn is_unary(op: UnOp) -> bool {
    matches!(op, UnOp::Neg | UnOp::Not)
}

/// Arithmetic ∪ relational ∪ {AND, OR}: every `Binary` node kind.
pub fn is_binary(_op: BinOp) -> bool {
    true
}

pub fn is_input_cmd(node: &Node) -> bool {
    node.is_input_cmd()
}

/// A node is "numeric" if its *resolved* datatype is INT/REAL/CHAR. Callers
/// always invoke this only after `typecheck`ing the node, so
/// `result_datatype` already holds the answer — an identifier, vector
/// access, or function call of BOOL type correctly fails this check instead
/// of passing by shape alone.
pub fn is_numeric_shape(node: &Node) -> bool {
    matches!(
        node.result_datatype.get(),
        Datatype::Int | Datatype::Real | Datatype::Char
    )
}

/// A node is "bool shape" if its *resolved* datatype is BOOL. Like
/// `is_numeric_shape`, this reads `result_datatype` rather than guessing
/// from node kind, so a non-BOOL identifier or `input(int)` correctly fails.
pub fn is_bool_shape(node: &Node) -> bool {
    node.result_datatype.get() == Datatype::Bool
}

/// Datatype compatibility: equal, or one is CHAR and the other INT (CHAR
/// promotes to INT for arithmetic/indexing/return). REAL is compatible with
/// nothing but REAL. Symmetric by construction.
pub fn compare_datatypes(a: Datatype, b: Datatype) -> bool {
    if a == b {
        return true;
    }
    matches!(
        (a, b),
        (Datatype::Char, Datatype::Int) | (Datatype::Int, Datatype::Char)
    )
}

/// CHAR promotes to INT in arithmetic/indexing/return contexts; every other
/// datatype is unaffected. Kept as its own function per the design notes
/// rather than folding the rule into `compare_datatypes` callers.
pub fn coerce_for_arithmetic(datatype: Datatype) -> Datatype {
    match datatype {
        Datatype::Char => Datatype::Int,
        other => other,
    }
}

/// Literal-kind compatibility for vector initializers: INT accepts LIT_INT;
/// CHAR accepts LIT_CHAR or LIT_INT; REAL accepts LIT_REAL; BOOL vectors
/// have no literal form at all.
pub fn literal_compatible_with_element(element: Datatype, item: &Node, symbols: &SymbolTable) -> bool {
    let literal_symbol_kind = match item.symbol() {
        Some(id) => symbols.get(id).kind,
        None => return false,
    };
    match element {
        Datatype::Int => literal_symbol_kind == SymbolKind::LiteralInt,
        Datatype::Char => {
            matches!(literal_symbol_kind, SymbolKind::LiteralChar | SymbolKind::LiteralInt)
        }
        Datatype::Real => literal_symbol_kind == SymbolKind::LiteralReal,
        Datatype::Bool | Datatype::Unset => false,
    }
}
