//! Web adapter: bridges a synchronous `Engine` session, run on a blocking
//! worker thread, to an async HTTP handler. Two plain `std::sync::mpsc`
//! channels carry the traffic in each direction — the engine's core stays
//! synchronous, and only the server boundary (see `server`) deals with
//! async/await.

use std::sync::mpsc::{self, Receiver, RecvError, Sender};
use std::sync::Mutex;

use super::Adapter;

/// Something queued for the HTTP side to pick up: either text the bot
/// said, or a system notice about the session's own state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Text(String),
    /// Enqueued by `receive` just before it blocks, so the client UI can
    /// render an input prompt. Always strictly the last message before a
    /// `receive` call starts waiting, because it is pushed immediately
    /// before the blocking dequeue.
    WaitInput,
}

/// One session's half-duplex pipe. `push_user_input` feeds text in from
/// the HTTP handler; `drain_outbound` pulls whatever the bot has said
/// since the last drain. `close_inbound` drops the inbound sender so a
/// worker thread blocked in `receive` unblocks with the `"EXIT"` sentinel —
/// this is how resetting or abandoning a session interrupts a bot waiting
/// on `listen`.
pub struct WebAdapter {
    inbound_tx: Mutex<Option<Sender<String>>>,
    inbound_rx: Mutex<Receiver<String>>,
    outbound_tx: Sender<OutboundMessage>,
    outbound_rx: Mutex<Receiver<OutboundMessage>>,
}

impl WebAdapter {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel();
        let (outbound_tx, outbound_rx) = mpsc::channel();
        Self {
            inbound_tx: Mutex::new(Some(inbound_tx)),
            inbound_rx: Mutex::new(inbound_rx),
            outbound_tx,
            outbound_rx: Mutex::new(outbound_rx),
        }
    }

    /// Feed one line of user input to the engine. A no-op once the session
    /// has been reset (`close_inbound` already ran).
    pub fn push_user_input(&self, text: String) {
        if let Some(tx) = self.inbound_tx.lock().unwrap().as_ref() {
            let _ = tx.send(text);
        }
    }

    /// Drain every message the bot has sent so far without blocking.
    pub fn drain_outbound(&self) -> Vec<OutboundMessage> {
        let rx = self.outbound_rx.lock().unwrap();
        rx.try_iter().collect()
    }

    /// Drop the inbound sender. Any `receive()` currently blocked on
    /// `inbound_rx.recv()` observes a disconnected channel and returns the
    /// `"EXIT"` sentinel to the engine.
    pub fn close_inbound(&self) {
        *self.inbound_tx.lock().unwrap() = None;
    }
}

impl Default for WebAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for WebAdapter {
    fn send(&self, text: &str) {
        let _ = self.outbound_tx.send(OutboundMessage::Text(text.to_string()));
    }

    fn receive(&self) -> String {
        let _ = self.outbound_tx.send(OutboundMessage::WaitInput);
        let result: Result<String, RecvError> = self.inbound_rx.lock().unwrap().recv();
        result.unwrap_or_else(|_| "EXIT".to_string())
    }
}
