//! Abstract syntax tree consumed by the semantic analyzer and TAC generator.
//!
//! Per the REDESIGN FLAGS in the specification this folds the original's
//! tagged `son[0..MAX_SONS)` array into a closed sum type with named fields
//! per variant — the analyzer becomes exhaustive pattern matching instead of
//! indexing into a fixed-arity array. Nodes are built by an external
//! collaborator (lexer/parser); [`AstBuilder`] stands in for that
//! collaborator in tests and the demo binary, interning identifiers and
//! literals into the [`SymbolTable`] as it goes exactly as a parser would.

use std::cell::Cell;

use crate::symbol::{Datatype, SymbolId, SymbolKind, SymbolTable};

/// Unique identifier for an AST node (debug aid, mirrors the original's
/// `id` field).
pub type NodeId = u32;

/// Binary operators. Arithmetic and relational operators share a node shape
/// (`Binary`) because the original treats them identically up to the
/// opcode; logical `And`/`Or` are also binary but checked against boolean
/// operands instead of numeric ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Le,
    Ge,
    Eq,
    Dif,
    Gt,
    Lt,
    And,
    Or,
}

impl BinOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div)
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinOp::Le | BinOp::Ge | BinOp::Eq | BinOp::Dif | BinOp::Gt | BinOp::Lt
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

/// Unary operators: arithmetic negation and logical negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// One argument in a function call's argument list. The formal parameter
/// this argument binds to is found by position in the callee's own
/// `param_symbols` at TAC-generation time — the flat namespace means that
/// symbol already exists, so there is nothing to resolve ahead of time.
#[derive(Debug, Clone, PartialEq)]
pub struct CallArg {
    pub expr: Box<Node>,
}

/// The node-kind sum type. One variant per AST kind tag enumerated in the
/// external interface, with the `son[]` slots folded into named fields.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    LitInt { symbol: SymbolId },
    LitReal { symbol: SymbolId },
    LitChar { symbol: SymbolId },
    LitString { symbol: SymbolId },
    Identifier { symbol: SymbolId },
    VecAccess { symbol: SymbolId, index: Box<Node> },
    FuncCall { symbol: SymbolId, args: Vec<CallArg> },
    Binary { op: BinOp, left: Box<Node>, right: Box<Node> },
    Unary { op: UnOp, operand: Box<Node> },
    NestedExpr { inner: Box<Node> },
    InputExpr { datatype: Datatype },
    VarAttrib { symbol: SymbolId, value: Box<Node> },
    VecAttrib { symbol: SymbolId, index: Box<Node>, value: Box<Node> },
    If { cond: Box<Node>, then_branch: Vec<Node> },
    IfElse { cond: Box<Node>, then_branch: Vec<Node>, else_branch: Vec<Node> },
    Loop { cond: Box<Node>, body: Vec<Node> },
    Return { value: Box<Node> },
    Output { args: Vec<Node> },
    VarDecl { symbol: SymbolId, datatype: Datatype, init: Option<Box<Node>> },
    VecDecl { symbol: SymbolId, datatype: Datatype, size: Box<Node>, init_items: Vec<Node> },
    Param { symbol: SymbolId, datatype: Datatype },
    FuncDecl { symbol: SymbolId, datatype: Datatype, params: Vec<Node>, body: Vec<Node> },
    Program { items: Vec<Node> },
}

/// A single AST node. `result_datatype`/`typechecked` are the memoization
/// cells the semantic analyzer's typecheck pass fills in — `Cell` rather
/// than plain fields because the pass walks the tree through shared
/// references, mutating only these two slots per node.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub line: u32,
    pub result_datatype: Cell<Datatype>,
    pub typechecked: Cell<bool>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.kind == other.kind && self.line == other.line
    }
}

impl Node {
    fn new(id: NodeId, kind: NodeKind, line: u32) -> Self {
        Self {
            id,
            kind,
            line,
            result_datatype: Cell::new(Datatype::Unset),
            typechecked: Cell::new(false),
        }
    }

    /// The symbol this node directly refers to, if any (identifiers,
    /// literals, vector accesses, calls, declarations).
    pub fn symbol(&self) -> Option<SymbolId> {
        match &self.kind {
            NodeKind::LitInt { symbol }
            | NodeKind::LitReal { symbol }
            | NodeKind::LitChar { symbol }
            | NodeKind::LitString { symbol }
            | NodeKind::Identifier { symbol }
            | NodeKind::VecAccess { symbol, .. }
            | NodeKind::FuncCall { symbol, .. }
            | NodeKind::VarAttrib { symbol, .. }
            | NodeKind::VecAttrib { symbol, .. }
            | NodeKind::VarDecl { symbol, .. }
            | NodeKind::VecDecl { symbol, .. }
            | NodeKind::Param { symbol, .. }
            | NodeKind::FuncDecl { symbol, .. } => Some(*symbol),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::LitInt { .. } | NodeKind::LitReal { .. } | NodeKind::LitChar { .. } | NodeKind::LitString { .. }
        )
    }

    pub fn is_input_cmd(&self) -> bool {
        matches!(self.kind, NodeKind::InputExpr { .. })
    }

    /// Every node reachable by one structural step — the generic traversal
    /// every semantic pass recurses through after applying its own,
    /// kind-specific checks at this node.
    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::LitInt { .. }
            | NodeKind::LitReal { .. }
            | NodeKind::LitChar { .. }
            | NodeKind::LitString { .. }
            | NodeKind::Identifier { .. }
            | NodeKind::InputExpr { .. }
            | NodeKind::Param { .. } => Vec::new(),
            NodeKind::VecAccess { index, .. } => vec![index.as_ref()],
            NodeKind::FuncCall { args, .. } => args.iter().map(|a| a.expr.as_ref()).collect(),
            NodeKind::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            NodeKind::Unary { operand, .. } => vec![operand.as_ref()],
            NodeKind::NestedExpr { inner } => vec![inner.as_ref()],
            NodeKind::VarAttrib { value, .. } => vec![value.as_ref()],
            NodeKind::VecAttrib { index, value, .. } => vec![index.as_ref(), value.as_ref()],
            NodeKind::If { cond, then_branch } => {
                let mut v = vec![cond.as_ref()];
                v.extend(then_branch.iter());
                v
            }
            NodeKind::IfElse { cond, then_branch, else_branch } => {
                let mut v = vec![cond.as_ref()];
                v.extend(then_branch.iter());
                v.extend(else_branch.iter());
                v
            }
            NodeKind::Loop { cond, body } => {
                let mut v = vec![cond.as_ref()];
                v.extend(body.iter());
                v
            }
            NodeKind::Return { value } => vec![value.as_ref()],
            NodeKind::Output { args } => args.iter().collect(),
            NodeKind::VarDecl { init, .. } => init.iter().map(|b| b.as_ref()).collect(),
            NodeKind::VecDecl { size, init_items, .. } => {
                let mut v = vec![size.as_ref()];
                v.extend(init_items.iter());
                v
            }
            NodeKind::FuncDecl { params, body, .. } => {
                let mut v: Vec<&Node> = params.iter().collect();
                v.extend(body.iter());
                v
            }
            NodeKind::Program { items } => items.iter().collect(),
        }
    }
}

/// Builds AST nodes while interning identifiers/literals into a
/// [`SymbolTable`], the same way a parser would as it reduces grammar
/// productions. Exists so tests and the demo binary can construct whole
/// programs without a real lexer/parser in the tree.
pub struct AstBuilder<'a> {
    pub symbols: &'a mut SymbolTable,
    next_id: NodeId,
}

impl<'a> AstBuilder<'a> {
    pub fn new(symbols: &'a mut SymbolTable) -> Self {
        Self { symbols, next_id: 0 }
    }

    fn next_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn identifier(&mut self, text: &str, line: u32) -> Node {
        let symbol = self.symbols.insert(text, line);
        let id = self.next_id();
        Node::new(id, NodeKind::Identifier { symbol }, line)
    }

    pub fn lit_int(&mut self, text: &str, line: u32) -> Node {
        let symbol = self
            .symbols
            .insert_literal(text, SymbolKind::LiteralInt, Datatype::Int, line);
        let id = self.next_id();
        Node::new(id, NodeKind::LitInt { symbol }, line)
    }

    pub fn lit_real(&mut self, text: &str, line: u32) -> Node {
        let symbol = self
            .symbols
            .insert_literal(text, SymbolKind::LiteralReal, Datatype::Real, line);
        let id = self.next_id();
        Node::new(id, NodeKind::LitReal { symbol }, line)
    }

    pub fn lit_char(&mut self, text: &str, line: u32) -> Node {
        let symbol = self
            .symbols
            .insert_literal(text, SymbolKind::LiteralChar, Datatype::Char, line);
        let id = self.next_id();
        Node::new(id, NodeKind::LitChar { symbol }, line)
    }

    pub fn lit_string(&mut self, text: &str, line: u32) -> Node {
        let symbol =
            self.symbols
                .insert_literal(text, SymbolKind::LiteralString, Datatype::Unset, line);
        let id = self.next_id();
        Node::new(id, NodeKind::LitString { symbol }, line)
    }

    pub fn vec_access(&mut self, text: &str, index: Node, line: u32) -> Node {
        let symbol = self.symbols.insert(text, line);
        let id = self.next_id();
        Node::new(
            id,
            NodeKind::VecAccess { symbol, index: Box::new(index) },
            line,
        )
    }

    pub fn func_call(&mut self, text: &str, args: Vec<Node>, line: u32) -> Node {
        let symbol = self.symbols.insert(text, line);
        let args = args
            .into_iter()
            .map(|expr| CallArg { expr: Box::new(expr) })
            .collect();
        let id = self.next_id();
        Node::new(id, NodeKind::FuncCall { symbol, args }, line)
    }

    pub fn binary(&mut self, op: BinOp, left: Node, right: Node, line: u32) -> Node {
        let id = self.next_id();
        Node::new(
            id,
            NodeKind::Binary { op, left: Box::new(left), right: Box::new(right) },
            line,
        )
    }

    pub fn unary(&mut self, op: UnOp, operand: Node, line: u32) -> Node {
        let id = self.next_id();
        Node::new(id, NodeKind::Unary { op, operand: Box::new(operand) }, line)
    }

    pub fn nested(&mut self, inner: Node, line: u32) -> Node {
        let id = self.next_id();
        Node::new(id, NodeKind::NestedExpr { inner: Box::new(inner) }, line)
    }

    pub fn input_expr(&mut self, datatype: Datatype, line: u32) -> Node {
        let id = self.next_id();
        Node::new(id, NodeKind::InputExpr { datatype }, line)
    }

    pub fn var_attrib(&mut self, text: &str, value: Node, line: u32) -> Node {
        let symbol = self.symbols.insert(text, line);
        let id = self.next_id();
        Node::new(
            id,
            NodeKind::VarAttrib { symbol, value: Box::new(value) },
            line,
        )
    }

    pub fn vec_attrib(&mut self, text: &str, index: Node, value: Node, line: u32) -> Node {
        let symbol = self.symbols.insert(text, line);
        let id = self.next_id();
        Node::new(
            id,
            NodeKind::VecAttrib {
                symbol,
                index: Box::new(index),
                value: Box::new(value),
            },
            line,
        )
    }

    pub fn if_stmt(&mut self, cond: Node, then_branch: Vec<Node>, line: u32) -> Node {
        let id = self.next_id();
        Node::new(id, NodeKind::If { cond: Box::new(cond), then_branch }, line)
    }

    pub fn if_else_stmt(
        &mut self,
        cond: Node,
        then_branch: Vec<Node>,
        else_branch: Vec<Node>,
        line: u32,
    ) -> Node {
        let id = self.next_id();
        Node::new(
            id,
            NodeKind::IfElse { cond: Box::new(cond), then_branch, else_branch },
            line,
        )
    }

    pub fn loop_stmt(&mut self, cond: Node, body: Vec<Node>, line: u32) -> Node {
        let id = self.next_id();
        Node::new(id, NodeKind::Loop { cond: Box::new(cond), body }, line)
    }

    pub fn return_stmt(&mut self, value: Node, line: u32) -> Node {
        let id = self.next_id();
        Node::new(id, NodeKind::Return { value: Box::new(value) }, line)
    }

    pub fn output_stmt(&mut self, args: Vec<Node>, line: u32) -> Node {
        let id = self.next_id();
        Node::new(id, NodeKind::Output { args }, line)
    }

    /// Note: unlike a real parser, declarations are not promoted here — the
    /// symbol stays at kind `Identifier` until `check_and_set_declarations`
    /// (pass 1 of the semantic analyzer) promotes it, exactly as the lexer
    /// hands the analyzer unresolved identifiers to begin with.
    pub fn var_decl(&mut self, text: &str, datatype: Datatype, init: Option<Node>, line: u32) -> Node {
        let symbol = self.symbols.insert(text, line);
        let id = self.next_id();
        Node::new(
            id,
            NodeKind::VarDecl { symbol, datatype, init: init.map(Box::new) },
            line,
        )
    }

    pub fn vec_decl(
        &mut self,
        text: &str,
        datatype: Datatype,
        size: Node,
        init_items: Vec<Node>,
        line: u32,
    ) -> Node {
        let symbol = self.symbols.insert(text, line);
        let id = self.next_id();
        Node::new(
            id,
            NodeKind::VecDecl { symbol, datatype, size: Box::new(size), init_items },
            line,
        )
    }

    pub fn param(&mut self, text: &str, datatype: Datatype, line: u32) -> Node {
        let symbol = self.symbols.insert(text, line);
        let id = self.next_id();
        Node::new(id, NodeKind::Param { symbol, datatype }, line)
    }

    pub fn func_decl(
        &mut self,
        text: &str,
        datatype: Datatype,
        params: Vec<Node>,
        body: Vec<Node>,
        line: u32,
    ) -> Node {
        let symbol = self.symbols.insert(text, line);
        let id = self.next_id();
        Node::new(id, NodeKind::FuncDecl { symbol, datatype, params, body }, line)
    }

    pub fn program(&mut self, items: Vec<Node>) -> Node {
        let id = self.next_id();
        Node::new(id, NodeKind::Program { items }, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_share_a_symbol_across_occurrences() {
        let mut symbols = SymbolTable::new();
        let mut b = AstBuilder::new(&mut symbols);
        let a = b.identifier("x", 1);
        let c = b.identifier("x", 2);
        assert_eq!(a.symbol(), c.symbol());
    }

    #[test]
    fn func_decl_keeps_param_nodes_until_pass_one_promotes_them() {
        let mut symbols = SymbolTable::new();
        let mut b = AstBuilder::new(&mut symbols);
        let p1 = b.param("a", Datatype::Int, 1);
        let p2 = b.param("b", Datatype::Char, 1);
        let f = b.func_decl("f", Datatype::Int, vec![p1, p2], vec![], 1);
        let sym = symbols.get(f.symbol().unwrap());
        assert_eq!(sym.kind, SymbolKind::Identifier);
        match &f.kind {
            NodeKind::FuncDecl { params, .. } => assert_eq!(params.len(), 2),
            _ => panic!("expected FuncDecl"),
        }
    }

    #[test]
    fn node_ids_are_monotonic() {
        let mut symbols = SymbolTable::new();
        let mut b = AstBuilder::new(&mut symbols);
        let n0 = b.lit_int("1", 1);
        let n1 = b.lit_int("2", 1);
        assert!(n1.id > n0.id);
    }
}
