//! Instruction executor (C4): pure per-instruction dispatch. Ties together
//! the context, the SQL binder, the classifier, the function registry, and
//! the I/O adapter. Nothing here blocks except `Listen`'s call into the
//! adapter's `receive`.

use crate::adapter::Adapter;
use crate::ast::types::{CompareOp, Instruction, Value, EXIT_STATE};
use crate::classifier::Classifier;
use crate::functions::FunctionRegistry;
use crate::store::Store;

use super::context::Context;

/// What the driver should do after one instruction ran: stop this state's
/// instruction list (`brk`), and if `next` is set, jump there.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecOutcome {
    pub brk: bool,
    pub next: Option<String>,
}

impl ExecOutcome {
    fn cont() -> Self {
        Self::default()
    }

    fn jump(target: impl Into<String>) -> Self {
        Self {
            brk: true,
            next: Some(target.into()),
        }
    }
}

/// Resolve a `Value` against a session's context: literals pass through,
/// variable references are looked up (missing -> empty string).
pub fn resolve_value(value: &Value, ctx: &Context) -> String {
    match value {
        Value::Str(s) => s.clone(),
        Value::Int(n) => n.to_string(),
        Value::VarRef(name) => ctx.get(name),
    }
}

/// Bundles the collaborators an executing instruction may need. `store`
/// and `classifier` are optional — a bot that never issues `sql` or
/// `process` instructions doesn't need either.
pub struct Engine<'a> {
    pub store: Option<&'a dyn Store>,
    pub functions: &'a FunctionRegistry,
    pub classifier: Option<&'a dyn Classifier>,
    pub adapter: &'a dyn Adapter,
}

impl<'a> Engine<'a> {
    pub fn new(
        store: Option<&'a dyn Store>,
        functions: &'a FunctionRegistry,
        classifier: Option<&'a dyn Classifier>,
        adapter: &'a dyn Adapter,
    ) -> Self {
        Self {
            store,
            functions,
            classifier,
            adapter,
        }
    }

    pub fn execute(&self, instr: &Instruction, ctx: &mut Context) -> ExecOutcome {
        match instr {
            Instruction::Say { content } => {
                let text = ctx.format_template(content);
                self.adapter.send(&text);
                ExecOutcome::cont()
            }

            Instruction::Listen { var } => {
                let input = self.adapter.receive();
                if input == "EXIT" {
                    return ExecOutcome::jump(EXIT_STATE);
                }
                ctx.append_history(input.clone());
                if let Some(v) = var {
                    ctx.set(v, input);
                }
                ExecOutcome::cont()
            }

            Instruction::Goto { target } => ExecOutcome::jump(target.clone()),

            Instruction::Exit => ExecOutcome::jump(EXIT_STATE),

            Instruction::Set { var, value } => {
                let resolved = resolve_value(value, ctx);
                ctx.set(var, resolved);
                ExecOutcome::cont()
            }

            Instruction::Call { func, args, result } => {
                let resolved_args: Vec<String> = args.iter().map(|a| resolve_value(a, ctx)).collect();
                match self.functions.call(func, &resolved_args) {
                    Some(Ok(value)) => ctx.set(result, value),
                    Some(Err(err)) => {
                        tracing::warn!(function = %func, error = %err, "call instruction failed; binding \"error\"");
                        ctx.set(result, "error");
                    }
                    None => {
                        tracing::debug!(function = %func, "call to unregistered function ignored");
                    }
                }
                ExecOutcome::cont()
            }

            Instruction::If { left, op, right, target } => {
                let l = resolve_value(left, ctx);
                let r = resolve_value(right, ctx);
                let met = match op {
                    CompareOp::Eq => l == r,
                    CompareOp::Ne => l != r,
                    CompareOp::Lt | CompareOp::Gt => match (l.parse::<f64>(), r.parse::<f64>()) {
                        (Ok(lf), Ok(rf)) => {
                            if *op == CompareOp::Lt {
                                lf < rf
                            } else {
                                lf > rf
                            }
                        }
                        _ => false,
                    },
                };
                if met {
                    ExecOutcome::jump(target.clone())
                } else {
                    ExecOutcome::cont()
                }
            }

            Instruction::Sql { query, result } => {
                let value = match self.store {
                    Some(store) => crate::sql::execute_sql(store, query, ctx),
                    None => "0".to_string(),
                };
                if let Some(r) = result {
                    ctx.set(r, value);
                }
                ExecOutcome::cont()
            }

            Instruction::Process { cases, default } => {
                let Some(classifier) = self.classifier else {
                    tracing::error!("process instruction requires a configured classifier; terminating session");
                    return ExecOutcome::jump(EXIT_STATE);
                };

                let last_input = ctx.history.last().cloned().unwrap_or_default();
                let candidates: Vec<String> = cases.keys().cloned().collect();
                let intent = classifier.detect_intent(&last_input, &candidates);
                let matched = cases.get(&intent).or(default.as_ref());

                match matched {
                    Some(action) => self.execute(action, ctx),
                    None => ExecOutcome::cont(),
                }
            }
        }
    }
}
