//! Symbol table for the semantic analysis and TAC generation core.
//!
//! Mirrors `hash.h`/`hash.c` from the original implementation: a single
//! process-wide interning store mapping an identifier's text to one symbol
//! record. Every AST node that refers to a name holds a [`SymbolId`] — the
//! Rust analogue of the original's `hash_t*` pointer — rather than owning a
//! copy of the symbol.

use std::collections::HashMap;
use std::fmt;

/// Unique identifier for a symbol-table entry (stands in for the original's
/// raw `hash_t*`).
pub type SymbolId = u32;

/// The four datatypes the language's static type system knows about, plus
/// the "not yet assigned" sentinel every symbol and expression node starts
/// life with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datatype {
    Unset,
    Int,
    Real,
    Bool,
    Char,
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Datatype::Unset => "invalid",
            Datatype::Int => "int",
            Datatype::Real => "real",
            Datatype::Bool => "bool",
            Datatype::Char => "char",
        };
        f.write_str(s)
    }
}

/// The role a symbol plays. A plain-identifier occurrence starts at
/// `Identifier` when the lexer first interns its text and is promoted to
/// exactly one of `Variable`/`Vector`/`Function`/`Parameter` by the
/// declarations pass; a second promotion attempt is a redeclaration error.
/// Literal occurrences are interned directly at their literal kind — they
/// are never `Identifier` and are never promoted. `Temp`/`Label` are minted
/// by the TAC pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Identifier,
    LiteralInt,
    LiteralReal,
    LiteralChar,
    LiteralString,
    Variable,
    Vector,
    Function,
    Parameter,
    Temp,
    Label,
}

impl SymbolKind {
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SymbolKind::LiteralInt
                | SymbolKind::LiteralReal
                | SymbolKind::LiteralChar
                | SymbolKind::LiteralString
        )
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymbolKind::Identifier => "identifier",
            SymbolKind::LiteralInt => "literal int",
            SymbolKind::LiteralReal => "literal real",
            SymbolKind::LiteralChar => "literal char",
            SymbolKind::LiteralString => "literal string",
            SymbolKind::Variable => "variable",
            SymbolKind::Vector => "vector",
            SymbolKind::Function => "function",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Temp => "temp",
            SymbolKind::Label => "label",
        };
        f.write_str(s)
    }
}

/// A single symbol-table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub text: String,
    pub kind: SymbolKind,
    pub datatype: Datatype,
    pub is_vector: bool,
    pub is_function: bool,
    /// Declared parameter datatypes, in order, for `Function` symbols.
    pub params: Vec<Datatype>,
    /// The formal parameters' own symbol ids, in order — not part of the
    /// original's `hash_t`, but needed to emit the `ARG <param_name>`
    /// instructions §4.6 requires at call sites. Safe to store directly
    /// since the table is a single flat namespace: a function's parameters
    /// are ordinary promoted symbols, not scoped to the function.
    pub param_symbols: Vec<SymbolId>,
    pub line_number: u32,
    /// Sequential id assigned to function symbols at declaration time
    /// (`set_function_id` in the original). Not consumed by TAC generation,
    /// which addresses functions by symbol, but kept for downstream
    /// consumers such as a future linker stage.
    pub function_id: Option<u32>,
}

impl Symbol {
    fn new(text: String, kind: SymbolKind, line_number: u32) -> Self {
        Self {
            text,
            kind,
            datatype: Datatype::Unset,
            is_vector: false,
            is_function: false,
            params: Vec::new(),
            param_symbols: Vec::new(),
            line_number,
            function_id: None,
        }
    }
}

/// A promotion attempt against a symbol that is no longer at kind
/// `Identifier` — the redeclaration case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeclarationError {
    pub text: String,
    pub line_number: u32,
}

impl fmt::Display for RedeclarationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "identifier {} already declared at line {}",
            self.text, self.line_number
        )
    }
}

impl std::error::Error for RedeclarationError {}

/// The interning symbol table. Implemented as a `Vec<Symbol>` plus a
/// name-to-id index rather than the original's fixed-size hash-bucket
/// array — `insert`/`find` stay O(1) average without needing to model the
/// bucket chain explicitly.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<Symbol>,
    index: HashMap<String, SymbolId>,
    next_temp: u32,
    next_label: u32,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// O(1) average lookup by text.
    pub fn find(&self, text: &str) -> Option<SymbolId> {
        self.index.get(text).copied()
    }

    /// If `text` is already present, return its existing id unchanged;
    /// otherwise create a fresh `Identifier` entry and return its id.
    pub fn insert(&mut self, text: &str, line_number: u32) -> SymbolId {
        if let Some(&id) = self.index.get(text) {
            return id;
        }
        let id = self.entries.len() as SymbolId;
        self.entries
            .push(Symbol::new(text.to_string(), SymbolKind::Identifier, line_number));
        self.index.insert(text.to_string(), id);
        id
    }

    /// Intern a literal occurrence directly at its literal kind/datatype.
    /// Literals never pass through `Identifier` and are never promoted —
    /// the lexer (an external collaborator) is assumed to know a literal's
    /// kind and datatype the moment it tokenizes it.
    pub fn insert_literal(
        &mut self,
        text: &str,
        kind: SymbolKind,
        datatype: Datatype,
        line_number: u32,
    ) -> SymbolId {
        debug_assert!(kind.is_literal());
        if let Some(&id) = self.index.get(text) {
            return id;
        }
        let id = self.entries.len() as SymbolId;
        let mut symbol = Symbol::new(text.to_string(), kind, line_number);
        symbol.datatype = datatype;
        self.entries.push(symbol);
        self.index.insert(text.to_string(), id);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.entries[id as usize]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.entries[id as usize]
    }

    /// Promote a symbol from `Identifier` to `kind`/`datatype`. Returns a
    /// `RedeclarationError` (without mutating the symbol) if it has already
    /// been promoted once.
    pub fn promote(
        &mut self,
        id: SymbolId,
        kind: SymbolKind,
        datatype: Datatype,
        line_number: u32,
    ) -> Result<(), RedeclarationError> {
        let symbol = self.get_mut(id);
        if symbol.kind != SymbolKind::Identifier {
            return Err(RedeclarationError {
                text: symbol.text.clone(),
                line_number,
            });
        }
        symbol.kind = kind;
        symbol.datatype = datatype;
        symbol.is_vector = kind == SymbolKind::Vector;
        symbol.is_function = kind == SymbolKind::Function;
        Ok(())
    }

    /// Promote a symbol to `Function`, recording its formal parameter
    /// signature and assigning it the next sequential function id
    /// (`set_function_id` in the original).
    pub fn promote_function(
        &mut self,
        id: SymbolId,
        datatype: Datatype,
        params: Vec<Datatype>,
        param_symbols: Vec<SymbolId>,
        line_number: u32,
        next_function_id: u32,
    ) -> Result<(), RedeclarationError> {
        self.promote(id, SymbolKind::Function, datatype, line_number)?;
        let symbol = self.get_mut(id);
        symbol.params = params;
        symbol.param_symbols = param_symbols;
        symbol.function_id = Some(next_function_id);
        Ok(())
    }

    /// Scan all entries; every symbol still at kind `Identifier` never got
    /// promoted by a declaration, i.e. it is used but never declared.
    /// Returns the undeclared identifiers found, in table order.
    pub fn check_undeclared(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|s| s.kind == SymbolKind::Identifier)
            .map(|s| s.text.clone())
            .collect()
    }

    /// Mint a fresh compiler-generated temporary of the given datatype,
    /// with synthetic name `_t<n>`.
    pub fn make_temp(&mut self, datatype: Datatype) -> SymbolId {
        let text = format!("_t{}", self.next_temp);
        self.next_temp += 1;
        let id = self.entries.len() as SymbolId;
        let mut symbol = Symbol::new(text.clone(), SymbolKind::Temp, 0);
        symbol.datatype = datatype;
        self.entries.push(symbol);
        self.index.insert(text, id);
        id
    }

    /// Mint a fresh compiler-generated label with synthetic name `_L<n>`.
    pub fn make_label(&mut self) -> SymbolId {
        let text = format!("_L{}", self.next_label);
        self.next_label += 1;
        let id = self.entries.len() as SymbolId;
        self.entries.push(Symbol::new(text.clone(), SymbolKind::Label, 0));
        self.index.insert(text, id);
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
