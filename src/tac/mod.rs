//! Three-address-code instruction model and the forward-building list that
//! replaces the original's doubly-linked `prev`/`next` chain (see the
//! "doubly-linked TAC via raw back-pointers" design note): a `TacBuilder`
//! owns a `Vec<Instruction>` and only ever appends, so there is no
//! reverse-linking pass to run before the list can be iterated forward.

use std::fmt;

use crate::symbol::SymbolTable;
use crate::symbol::SymbolId;

pub mod gen;

pub use gen::TacGenerator;

/// The stable opcode set, one variant per entry in the external TAC opcode
/// list. Variant names are the spec's own names in Rust's PascalCase
/// convention; `Display` prints them back out in the original's upper-snake
/// spelling for the dump format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Symbol,
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Not,
    And,
    Or,
    Le,
    Ge,
    Eq,
    Dif,
    Gt,
    Lt,
    Copy,
    Jfalse,
    Label,
    Jtrue,
    Jump,
    Ret,
    Beginfun,
    Endfun,
    Call,
    Arg,
    VecAccess,
    Print,
    Read,
    PrintArg,
    Vardec,
    Vecdec,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::Symbol => "SYMBOL",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Neg => "NEG",
            Opcode::Not => "NOT",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Le => "LE",
            Opcode::Ge => "GE",
            Opcode::Eq => "EQ",
            Opcode::Dif => "DIF",
            Opcode::Gt => "GT",
            Opcode::Lt => "LT",
            Opcode::Copy => "COPY",
            Opcode::Jfalse => "JFALSE",
            Opcode::Label => "LABEL",
            Opcode::Jtrue => "JTRUE",
            Opcode::Jump => "JUMP",
            Opcode::Ret => "RET",
            Opcode::Beginfun => "BEGINFUN",
            Opcode::Endfun => "ENDFUN",
            Opcode::Call => "CALL",
            Opcode::Arg => "ARG",
            Opcode::VecAccess => "VEC_ACCESS",
            Opcode::Print => "PRINT",
            Opcode::Read => "READ",
            Opcode::PrintArg => "PRINT_ARG",
            Opcode::Vardec => "VARDEC",
            Opcode::Vecdec => "VECDEC",
        };
        f.write_str(name)
    }
}

/// One three-address instruction. `res`/`op1`/`op2` are the up-to-three
/// symbol slots the original packs into every node; which slots are
/// populated and what they mean is opcode-dependent (see `tac::gen`'s
/// lowering table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Opcode,
    pub res: Option<SymbolId>,
    pub op1: Option<SymbolId>,
    pub op2: Option<SymbolId>,
}

impl Instruction {
    pub fn new(op: Opcode, res: Option<SymbolId>, op1: Option<SymbolId>, op2: Option<SymbolId>) -> Self {
        Self { op, res, op1, op2 }
    }

    fn field_text(field: Option<SymbolId>, symbols: &SymbolTable) -> String {
        match field {
            Some(id) => symbols.get(id).text.clone(),
            None => "0".to_string(),
        }
    }

    /// Render one line of the `TAC(op, res, op1, op2)` dump format.
    pub fn dump(&self, symbols: &SymbolTable) -> String {
        format!(
            "TAC({}, {}, {}, {})",
            self.op,
            Self::field_text(self.res, symbols),
            Self::field_text(self.op1, symbols),
            Self::field_text(self.op2, symbols),
        )
    }
}

/// Errors that can surface from the TAC stage. Generation itself is total
/// over a well-typed AST — the only way to reach it is through
/// `generate`, which refuses to lower a program that still has
/// outstanding semantic errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TacError {
    SemanticErrorsPresent(usize),
}

impl fmt::Display for TacError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TacError::SemanticErrorsPresent(n) => {
                write!(f, "cannot generate code: {n} unresolved semantic error(s)")
            }
        }
    }
}

impl std::error::Error for TacError {}

pub type TacResult<T> = Result<T, TacError>;

/// The forward-built instruction list. Construction only ever appends —
/// `append` is the forward-list analogue of the original's `tac_join`,
/// minus the need to walk anything to find a splice point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TacBuilder {
    instructions: Vec<Instruction>,
}

impl TacBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(instr: Instruction) -> Self {
        Self { instructions: vec![instr] }
    }

    pub fn push(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    /// Move `other`'s instructions onto the end of `self`.
    pub fn append(&mut self, mut other: TacBuilder) {
        self.instructions.append(&mut other.instructions);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// The §6.4 debug dump: one `TAC(...)` line per instruction, `SYMBOL`
    /// instructions suppressed since they carry no information beyond the
    /// symbol each producing node already names.
    pub fn dump(&self, symbols: &SymbolTable) -> String {
        let mut out = String::new();
        for instr in &self.instructions {
            if instr.op == Opcode::Symbol {
                continue;
            }
            out.push_str(&instr.dump(symbols));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{Datatype, SymbolKind};

    #[test]
    fn append_preserves_forward_order() {
        let mut a = TacBuilder::single(Instruction::new(Opcode::Label, Some(0), None, None));
        let b = TacBuilder::single(Instruction::new(Opcode::Jump, Some(1), None, None));
        a.append(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.instructions()[0].op, Opcode::Label);
        assert_eq!(a.instructions()[1].op, Opcode::Jump);
    }

    #[test]
    fn dump_suppresses_symbol_instructions_and_prints_zero_for_absent_fields() {
        let mut symbols = SymbolTable::new();
        let x = symbols.insert("x", 1);
        symbols.promote(x, SymbolKind::Variable, Datatype::Int, 1).unwrap();
        let mut builder = TacBuilder::new();
        builder.push(Instruction::new(Opcode::Symbol, Some(x), None, None));
        builder.push(Instruction::new(Opcode::Print, None, None, None));
        let dump = builder.dump(&symbols);
        assert_eq!(dump, "TAC(PRINT, 0, 0, 0)\n");
    }
}
