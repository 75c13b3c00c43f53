//! Terminal adapter: `say` writes a line to stdout, `listen` blocks on a
//! line of stdin. Used by the REPL entry point in `main`.

use std::io::{self, BufRead, Write};

use super::Adapter;

pub struct ConsoleAdapter;

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for ConsoleAdapter {
    fn send(&self, text: &str) {
        println!("{text}");
        let _ = io::stdout().flush();
    }

    fn receive(&self) -> String {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => "EXIT".to_string(),
            Ok(_) => line.trim_end_matches(['\n', '\r']).to_string(),
            Err(_) => "EXIT".to_string(),
        }
    }
}
