//! I/O adapter (C7): the boundary between the synchronous engine and
//! whatever transport a bot is actually running over. `Engine` never talks
//! to a socket or a terminal directly — it talks to a `&dyn Adapter`.

pub mod console;
pub mod web;

pub use console::ConsoleAdapter;
pub use web::{OutboundMessage, WebAdapter};

/// Two blocking operations: emit text to the user, and block until the
/// user's next line arrives. `receive` returning the literal sentinel
/// `"EXIT"` tells the engine the session should terminate immediately, as
/// if the script itself had run `exit` — this is how an adapter whose
/// underlying connection dropped unwinds a blocked `Listen`.
pub trait Adapter: Send + Sync {
    fn send(&self, text: &str);
    fn receive(&self) -> String;
}

/// A canned-input adapter used by driver and executor tests: replays a
/// fixed list of inputs and records everything sent to it. Not behind
/// `#[cfg(test)]` at the module level because `runtime::driver`'s own
/// tests (in a sibling module) need to construct it too.
pub struct ConsoleLikeTestAdapter {
    inputs: std::sync::Mutex<std::collections::VecDeque<String>>,
    sent: std::sync::Mutex<Vec<String>>,
}

impl ConsoleLikeTestAdapter {
    pub fn new(inputs: Vec<&str>) -> Self {
        Self {
            inputs: std::sync::Mutex::new(inputs.into_iter().map(String::from).collect()),
            sent: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Adapter for ConsoleLikeTestAdapter {
    fn send(&self, text: &str) {
        self.sent.lock().unwrap().push(text.to_string());
    }

    fn receive(&self) -> String {
        self.inputs.lock().unwrap().pop_front().unwrap_or_else(|| "EXIT".to_string())
    }
}
