//! Per-session mutable state (C3): the current state name, the variable
//! environment, and the input history. Missing variable lookups never
//! fail — they resolve to the empty string.

use indexmap::IndexMap;

use crate::ast::types::START_STATE;

#[derive(Debug, Clone)]
pub struct Context {
    pub state: String,
    /// Keyed by the variable's literal `$name` text, so template
    /// substitution can search-and-replace directly.
    pub variables: IndexMap<String, String>,
    pub history: Vec<String>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            state: START_STATE.to_string(),
            variables: IndexMap::new(),
            history: Vec::new(),
        }
    }

    pub fn set(&mut self, var: &str, value: impl Into<String>) {
        self.variables.insert(var.to_string(), value.into());
    }

    pub fn get(&self, var: &str) -> String {
        self.variables.get(var).cloned().unwrap_or_default()
    }

    pub fn append_history(&mut self, input: String) {
        self.history.push(input);
    }

    /// Textual substitution of every declared variable's literal name.
    /// Longest-name-first order resolves the ambiguity the specification
    /// leaves open for overlapping names (`$x` vs `$xy`): substituting
    /// `$xy` before `$x` prevents `$x` from matching inside `$xy` and
    /// corrupting the longer name's occurrences.
    pub fn format_template(&self, text: &str) -> String {
        let mut keys: Vec<&String> = self.variables.keys().collect();
        keys.sort_by_key(|k| std::cmp::Reverse(k.len()));

        let mut out = text.to_string();
        for key in keys {
            let value = &self.variables[key];
            out = out.replace(key.as_str(), value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_is_empty_string() {
        let ctx = Context::new();
        assert_eq!(ctx.get("$nope"), "");
    }

    #[test]
    fn substitutes_declared_variable() {
        let mut ctx = Context::new();
        ctx.set("$x", "A");
        assert_eq!(ctx.format_template("value: $x"), "value: A");
    }

    #[test]
    fn longest_name_wins_for_overlapping_prefixes() {
        let mut ctx = Context::new();
        ctx.set("$x", "SHORT");
        ctx.set("$xy", "LONG");
        assert_eq!(ctx.format_template("$xy and $x"), "LONG and SHORT");
    }
}
