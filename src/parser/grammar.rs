//! Recursive-descent parser for the bot DSL.
//!
//! Accepts `bot <Name> { <state>* }` where each state is
//! `state <Name> { <instruction>* }`. The grammar is deterministic with a
//! single token of lookahead: every instruction and every action begins
//! with a distinct keyword, so no backtracking is required. This mirrors
//! the hand-written descent used throughout the rest of the DSL stack
//! rather than a generated LALR table — the grammar is small enough that a
//! table buys nothing.

use indexmap::IndexMap;

use super::errors::ParseError;
use super::lexer::{tokenize, Token, TokenKind};
use crate::ast::types::{CompareOp, Instruction, Value};

/// One parsed bot, states in declaration order. Folded into a `FlowTable`
/// by `builder::build_flow_table`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBot {
    pub name: String,
    pub states: Vec<ParsedState>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedState {
    pub name: String,
    pub instructions: Vec<Instruction>,
}

/// Parse a whole script into its declared bots, in declaration order.
pub fn parse(source: &str) -> Result<Vec<ParsedBot>, ParseError> {
    let tokens = tokenize(source)?;
    let mut p = Parser { tokens, pos: 0 };
    p.parse_bots()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn loc(&self) -> (usize, usize) {
        let t = &self.tokens[self.pos];
        (t.line, t.column)
    }

    fn advance(&mut self) -> TokenKind {
        let t = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let (line, column) = self.loc();
        ParseError::new(message, line, column)
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<(), ParseError> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            let found = self.peek().describe();
            Err(self.error(format!("expected `{expected:?}`, found {found}")))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            TokenKind::Ident(s) => Ok(s),
            other => Err(self.error(format!("expected identifier, found {}", other.describe()))),
        }
    }

    fn expect_var(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            TokenKind::Var(s) => Ok(s),
            other => Err(self.error(format!("expected `$variable`, found {}", other.describe()))),
        }
    }

    fn expect_str(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            TokenKind::Str(s) => Ok(s),
            other => Err(self.error(format!("expected string literal, found {}", other.describe()))),
        }
    }

    fn parse_bots(&mut self) -> Result<Vec<ParsedBot>, ParseError> {
        let mut bots = Vec::new();
        while *self.peek() != TokenKind::Eof {
            bots.push(self.parse_bot()?);
        }
        Ok(bots)
    }

    fn parse_bot(&mut self) -> Result<ParsedBot, ParseError> {
        self.expect(&TokenKind::Bot)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LBrace)?;
        let mut states = Vec::new();
        while *self.peek() != TokenKind::RBrace {
            states.push(self.parse_state()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(ParsedBot { name, states })
    }

    fn parse_state(&mut self) -> Result<ParsedState, ParseError> {
        self.expect(&TokenKind::State)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LBrace)?;
        let mut instructions = Vec::new();
        while *self.peek() != TokenKind::RBrace {
            instructions.push(self.parse_instruction()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(ParsedState { name, instructions })
    }

    /// Top-level instruction: any of the nine kinds, including `listen` and
    /// `process`, which are not permitted inside a nested action.
    fn parse_instruction(&mut self) -> Result<Instruction, ParseError> {
        match self.peek().clone() {
            TokenKind::Listen => self.parse_listen(),
            TokenKind::Process => self.parse_process(),
            _ => self.parse_action(),
        }
    }

    /// An action is the single instruction that is the branch of a `process`
    /// case or default: `Goto`, `Exit`, `Say`, `Set`, `Sql`, `Call`, or `If`.
    fn parse_action(&mut self) -> Result<Instruction, ParseError> {
        match self.peek().clone() {
            TokenKind::Say => self.parse_say(),
            TokenKind::Goto => self.parse_goto(),
            TokenKind::Exit => {
                self.advance();
                Ok(Instruction::Exit)
            }
            TokenKind::Set => self.parse_set(),
            TokenKind::Call => self.parse_call(),
            TokenKind::If => self.parse_if(),
            TokenKind::Sql => self.parse_sql(),
            other => Err(self.error(format!("unexpected {} at start of instruction", other.describe()))),
        }
    }

    fn parse_say(&mut self) -> Result<Instruction, ParseError> {
        self.expect(&TokenKind::Say)?;
        let content = self.expect_str()?;
        Ok(Instruction::Say { content })
    }

    fn parse_listen(&mut self) -> Result<Instruction, ParseError> {
        self.expect(&TokenKind::Listen)?;
        let var = if let TokenKind::Var(_) = self.peek() {
            Some(self.expect_var()?)
        } else {
            None
        };
        Ok(Instruction::Listen { var })
    }

    fn parse_goto(&mut self) -> Result<Instruction, ParseError> {
        self.expect(&TokenKind::Goto)?;
        let target = self.expect_ident()?;
        Ok(Instruction::Goto { target })
    }

    fn parse_set(&mut self) -> Result<Instruction, ParseError> {
        self.expect(&TokenKind::Set)?;
        let var = self.expect_var()?;
        self.expect(&TokenKind::Assign)?;
        let value = self.parse_value()?;
        Ok(Instruction::Set { var, value })
    }

    fn parse_call(&mut self) -> Result<Instruction, ParseError> {
        self.expect(&TokenKind::Call)?;
        let func = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if *self.peek() != TokenKind::RParen {
            args.push(self.parse_value()?);
            while *self.peek() == TokenKind::Comma {
                self.advance();
                args.push(self.parse_value()?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Arrow)?;
        let result = self.expect_var()?;
        Ok(Instruction::Call { func, args, result })
    }

    fn parse_if(&mut self) -> Result<Instruction, ParseError> {
        self.expect(&TokenKind::If)?;
        let left = self.parse_value()?;
        let op = match self.advance() {
            TokenKind::EqEq => CompareOp::Eq,
            TokenKind::NotEq => CompareOp::Ne,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::Gt => CompareOp::Gt,
            other => return Err(self.error(format!("expected comparison operator, found {}", other.describe()))),
        };
        let right = self.parse_value()?;
        self.expect(&TokenKind::Then)?;
        self.expect(&TokenKind::Goto)?;
        let target = self.expect_ident()?;
        Ok(Instruction::If { left, op, right, target })
    }

    fn parse_sql(&mut self) -> Result<Instruction, ParseError> {
        self.expect(&TokenKind::Sql)?;
        let query = self.expect_str()?;
        let result = if *self.peek() == TokenKind::Arrow {
            self.advance();
            Some(self.expect_var()?)
        } else {
            None
        };
        Ok(Instruction::Sql { query, result })
    }

    fn parse_process(&mut self) -> Result<Instruction, ParseError> {
        self.expect(&TokenKind::Process)?;
        self.expect(&TokenKind::LBrace)?;
        let mut cases: IndexMap<String, Box<Instruction>> = IndexMap::new();
        let mut default = None;
        while *self.peek() != TokenKind::RBrace {
            match self.peek().clone() {
                TokenKind::Case => {
                    self.advance();
                    let intent = self.expect_str()?;
                    self.expect(&TokenKind::Arrow)?;
                    let action = self.parse_action()?;
                    self.expect(&TokenKind::Semicolon)?;
                    cases.insert(intent, Box::new(action));
                }
                TokenKind::Default => {
                    self.advance();
                    self.expect(&TokenKind::Arrow)?;
                    let action = self.parse_action()?;
                    self.expect(&TokenKind::Semicolon)?;
                    if default.is_some() {
                        return Err(self.error("process block may declare at most one default"));
                    }
                    default = Some(Box::new(action));
                }
                other => {
                    return Err(self.error(format!(
                        "expected `case` or `default` inside process block, found {}",
                        other.describe()
                    )))
                }
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Instruction::Process { cases, default })
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        match self.advance() {
            TokenKind::Str(s) => Ok(Value::Str(s)),
            TokenKind::Int(n) => Ok(Value::Int(n)),
            TokenKind::Var(v) => Ok(Value::VarRef(v)),
            other => Err(self.error(format!("expected a value, found {}", other.describe()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_bot() {
        let src = r#"
            bot Greeter {
                state Start {
                    say "hi"
                    listen $name
                    exit
                }
            }
        "#;
        let bots = parse(src).unwrap();
        assert_eq!(bots.len(), 1);
        assert_eq!(bots[0].name, "Greeter");
        assert_eq!(bots[0].states[0].instructions.len(), 3);
    }

    #[test]
    fn parses_process_with_default() {
        let src = r#"
            bot B {
                state Start {
                    listen
                    process {
                        case "yes" -> goto Confirmed;
                        default -> exit;
                    }
                }
            }
        "#;
        let bots = parse(src).unwrap();
        match &bots[0].states[0].instructions[1] {
            Instruction::Process { cases, default } => {
                assert_eq!(cases.len(), 1);
                assert!(default.is_some());
            }
            other => panic!("expected process, got {other:?}"),
        }
    }

    #[test]
    fn rejects_second_default() {
        let src = r#"
            bot B {
                state Start {
                    process {
                        default -> exit;
                        default -> exit;
                    }
                }
            }
        "#;
        assert!(parse(src).is_err());
    }

    #[test]
    fn rejects_listen_inside_action() {
        let src = r#"
            bot B {
                state Start {
                    process {
                        case "x" -> listen;
                    }
                }
            }
        "#;
        assert!(parse(src).is_err());
    }

    #[test]
    fn parses_if_and_sql() {
        let src = r#"
            bot B {
                state Start {
                    sql "SELECT balance FROM users WHERE phone=$phone" -> $balance
                    if $balance < 10 then goto Low
                }
            }
        "#;
        let bots = parse(src).unwrap();
        assert_eq!(bots[0].states[0].instructions.len(), 2);
    }
}
