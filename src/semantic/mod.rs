//! Semantic analysis: the seven-pass analyzer and the predicates it shares
//! with TAC generation.

pub mod analyzer;
pub mod predicates;

pub use analyzer::{AnalysisConfig, AnalysisResult, AnalysisStats, Pass, SemanticAnalyzer, SemanticError};
pub use predicates::{
    coerce_for_arithmetic, compare_datatypes, is_arithmetic, is_binary, is_bool_shape, is_input_cmd,
    is_logic_binop, is_logic_unop, is_numeric_shape, is_unary, literal_compatible_with_element,
};
