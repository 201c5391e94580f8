//! Semantic-analysis and three-address-code generation core for a small
//! statically-typed imperative language. Lexing and parsing are external
//! collaborators — this crate consumes an already-built AST and symbol
//! table (or, in tests and the demo binary, [`ast::AstBuilder`] standing in
//! for a parser) and carries it through the seven-pass semantic analyzer
//! and the TAC generator.

pub mod ast;
pub mod context;
pub mod semantic;
pub mod symbol;
pub mod tac;

pub use ast::{AstBuilder, BinOp, CallArg, Node, NodeId, NodeKind, UnOp};
pub use context::CompilerContext;
pub use semantic::{AnalysisConfig, AnalysisResult, AnalysisStats, Pass, SemanticAnalyzer, SemanticError};
pub use symbol::{Datatype, Symbol, SymbolId, SymbolKind, SymbolTable};
pub use tac::{Instruction, Opcode, TacBuilder, TacError, TacGenerator, TacResult};
