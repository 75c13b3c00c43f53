//! AST builder (C2): folds the parsed bots into the immutable `FlowTable`
//! the engine consults, rejecting structurally invalid scripts (duplicate
//! bot/state names, a state body named `Exit`). Jump targets themselves are
//! not validated here — an unresolvable target is a runtime condition
//! (§3 invariant 1), not a compile error.

use indexmap::IndexMap;

use super::errors::ParseError;
use super::grammar::ParsedBot;
use crate::ast::types::{BotFlow, FlowTable, EXIT_STATE};

pub fn build_flow_table(bots: Vec<ParsedBot>) -> Result<FlowTable, ParseError> {
    let mut table = FlowTable::new();
    for bot in bots {
        if table.contains_key(&bot.name) {
            return Err(ParseError::new(
                format!("duplicate bot definition `{}`", bot.name),
                0,
                0,
            ));
        }

        let mut states: IndexMap<String, Vec<crate::ast::Instruction>> = IndexMap::new();
        for state in bot.states {
            if state.name == EXIT_STATE {
                return Err(ParseError::new(
                    format!("`{EXIT_STATE}` is a reserved sentinel and cannot be declared as a state"),
                    0,
                    0,
                ));
            }
            if states.contains_key(&state.name) {
                return Err(ParseError::new(
                    format!("duplicate state `{}` in bot `{}`", state.name, bot.name),
                    0,
                    0,
                ));
            }
            states.insert(state.name, state.instructions);
        }

        table.insert(
            bot.name.clone(),
            BotFlow {
                name: bot.name,
                states,
            },
        );
    }
    Ok(table)
}

/// Parse and fold a script in one step — the usual entry point for callers
/// that don't need the intermediate parse tree.
pub fn compile(source: &str) -> Result<FlowTable, ParseError> {
    let bots = super::grammar::parse(source)?;
    build_flow_table(bots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_exit_as_state_name() {
        let src = r#"
            bot B {
                state Exit {
                    say "nope"
                }
            }
        "#;
        assert!(compile(src).is_err());
    }

    #[test]
    fn rejects_duplicate_state() {
        let src = r#"
            bot B {
                state Start { exit }
                state Start { exit }
            }
        "#;
        assert!(compile(src).is_err());
    }

    #[test]
    fn builds_flow_table_preserving_order() {
        let src = r#"
            bot B {
                state Start {
                    goto Second
                }
                state Second {
                    exit
                }
            }
        "#;
        let table = compile(src).unwrap();
        let bot = &table["B"];
        let names: Vec<&str> = bot.state_names().collect();
        assert_eq!(names, vec!["Start", "Second"]);
    }
}
