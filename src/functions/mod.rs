//! External function registry: the `call` instruction's only extension
//! point. A script can invoke any function the embedding application
//! registered by name; calling an unregistered name is a no-op rather
//! than an error, so a script ported between deployments degrades
//! gracefully instead of crashing.

use std::collections::HashMap;

pub type ExternalFn = Box<dyn Fn(&[String]) -> Result<String, String> + Send + Sync>;

pub struct FunctionRegistry {
    functions: HashMap<String, ExternalFn>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self { functions: HashMap::new() }
    }

    pub fn register(&mut self, name: impl Into<String>, func: ExternalFn) {
        self.functions.insert(name.into(), func);
    }

    /// `None` if `name` was never registered; `Some(Err(_))` if it was
    /// registered but the call itself failed.
    pub fn call(&self, name: &str, args: &[String]) -> Option<Result<String, String>> {
        self.functions.get(name).map(|f| f(args))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_registered_function_with_resolved_args() {
        let mut registry = FunctionRegistry::new();
        registry.register("upper", Box::new(|args: &[String]| Ok(args[0].to_uppercase())));
        assert_eq!(registry.call("upper", &["ada".to_string()]), Some(Ok("ADA".to_string())));
    }

    #[test]
    fn unregistered_call_returns_none() {
        let registry = FunctionRegistry::new();
        assert_eq!(registry.call("nope", &[]), None);
    }

    #[test]
    fn propagates_function_error() {
        let mut registry = FunctionRegistry::new();
        registry.register("fail", Box::new(|_: &[String]| Err("boom".to_string())));
        assert_eq!(registry.call("fail", &[]), Some(Err("boom".to_string())));
    }
}
