//! Abstract Syntax Tree types for the bot DSL.
//!
//! Architecture: source text -> Lexer -> Parser -> parse tree -> AST builder
//! -> FlowTable -> Engine.

pub mod types;

pub use types::{BotFlow, CompareOp, FlowTable, Instruction, Value, EXIT_STATE, START_STATE};
