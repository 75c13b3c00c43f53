//! Engine driver (C6): the outer loop over states, with step-cap
//! protection against runaway scripts. Owns the session context and runs
//! to completion — it never returns early, by design: the last action is
//! always sending "Session Ended" to the adapter.

use crate::ast::types::{BotFlow, EXIT_STATE};

use super::context::Context;
use super::executor::Engine;

/// Upper bound on outer-loop iterations before the driver aborts a session
/// for safety. A state that runs to the end of its instruction list
/// without a jump re-enters itself on the next iteration and counts
/// against this cap.
pub const MAX_STEPS: usize = 1000;

/// Run one bot to completion: creates a fresh `Context`, drives the state
/// machine, and emits the closing "Session Ended" notice.
pub fn run(flow: &BotFlow, engine: &Engine) -> Context {
    let mut ctx = Context::new();
    run_with_context(flow, engine, &mut ctx);
    ctx
}

/// Like `run`, but against a caller-supplied context — used by tests that
/// need to inspect the final state, and by the web adapter's worker, which
/// owns the context for the lifetime of the session.
pub fn run_with_context(flow: &BotFlow, engine: &Engine, ctx: &mut Context) {
    tracing::info!(bot = %flow.name, "session started");
    let mut steps = 0usize;

    'outer: while ctx.state != EXIT_STATE {
        if steps > MAX_STEPS {
            tracing::error!(bot = %flow.name, "step cap exceeded, terminating session");
            engine.adapter.send("Step limit exceeded; terminating session.");
            break 'outer;
        }

        let Some(instructions) = flow.states.get(&ctx.state) else {
            tracing::warn!(bot = %flow.name, state = %ctx.state, "unknown state, terminating session");
            break 'outer;
        };

        for instr in instructions {
            let outcome = engine.execute(instr, ctx);
            if outcome.brk {
                if let Some(next) = outcome.next {
                    ctx.state = next;
                }
                break;
            }
        }

        steps += 1;
    }

    engine.adapter.send("Session Ended");
    tracing::info!(bot = %flow.name, "session ended");
}
