//! Runtime: session context (C3), instruction executor (C4), and the
//! engine driver (C6) that loops the executor over a `BotFlow`.

pub mod context;
pub mod driver;
pub mod executor;

pub use context::Context;
pub use driver::{run, run_with_context, MAX_STEPS};
pub use executor::{resolve_value, Engine, ExecOutcome};
