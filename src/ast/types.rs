//! Abstract Syntax Tree types for the bot DSL.
//!
//! These are the tagged variants §3 of the instruction set folds into: a
//! flow table is an immutable mapping of bot name to a per-state instruction
//! list, built once at load time and shared read-only by every session.

use indexmap::IndexMap;
use std::collections::HashMap;

/// A value embedded in an instruction: a literal or a deferred variable lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    /// `$name`, resolved against a session's `Context` at execution time.
    VarRef(String),
}

/// Comparison operators recognized by `if`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
        }
    }
}

/// One instruction. An `Action` (the branch of a `process` case or default)
/// is exactly one `Instruction`, never a list — `Process` stores its cases
/// and default as boxed instructions for that reason.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Say {
        content: String,
    },
    Listen {
        var: Option<String>,
    },
    Goto {
        target: String,
    },
    Exit,
    Set {
        var: String,
        value: Value,
    },
    Call {
        func: String,
        args: Vec<Value>,
        result: String,
    },
    If {
        left: Value,
        op: CompareOp,
        right: Value,
        target: String,
    },
    Sql {
        query: String,
        result: Option<String>,
    },
    Process {
        /// Declaration order preserved — candidates are presented to the
        /// classifier in the order their cases were written.
        cases: IndexMap<String, Box<Instruction>>,
        default: Option<Box<Instruction>>,
    },
}

/// The reserved name of the initial state every bot starts in.
pub const START_STATE: &str = "Start";
/// The reserved sentinel name of the terminal state. Never declared as a
/// state body; only ever a jump target.
pub const EXIT_STATE: &str = "Exit";

/// A single bot: its declared states, in declaration order, each holding an
/// ordered instruction list.
#[derive(Debug, Clone, PartialEq)]
pub struct BotFlow {
    pub name: String,
    pub states: IndexMap<String, Vec<Instruction>>,
}

impl BotFlow {
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }
}

/// The compiled, read-only representation of every bot declared in a script.
pub type FlowTable = HashMap<String, BotFlow>;
