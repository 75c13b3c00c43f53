//! Engine configuration: how a deployment wires the classifier, the
//! store, and the script directory together. Read from the environment
//! (via `dotenvy`) by the CLI entry point; constructible by hand in tests.

use std::env;

/// Which `Classifier` implementation a deployment runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierKind {
    /// Deterministic substring rules; no network calls.
    Rule,
    /// An OpenAI-chat-compatible HTTP endpoint.
    Http { endpoint: String, api_key: String, model: String },
}

/// Top-level knobs for constructing an `Engine` and its collaborators.
/// Every field has a sensible default so a bare `EngineOptions::default()`
/// runs against an in-memory store with the rule classifier.
pub struct EngineOptions {
    /// Path to the SQLite database file, or `None` for an in-memory store.
    pub db_path: Option<String>,
    pub classifier: ClassifierKind,
    /// Directory scanned for `*.bot` scripts.
    pub scripts_dir: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            db_path: None,
            classifier: ClassifierKind::Rule,
            scripts_dir: "demos".to_string(),
        }
    }
}

impl EngineOptions {
    /// Build options from environment variables, loading a `.env` file
    /// first if one is present. Recognizes:
    /// - `BOTFLOW_DB_PATH` — SQLite file path (default: in-memory)
    /// - `BOTFLOW_SCRIPTS_DIR` — scripts directory (default: `demos`)
    /// - `BOTFLOW_LLM_ENDPOINT` / `BOTFLOW_LLM_API_KEY` / `BOTFLOW_LLM_MODEL` —
    ///   if all three are set, selects the HTTP classifier; otherwise the
    ///   rule classifier is used.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let classifier = match (
            env::var("BOTFLOW_LLM_ENDPOINT"),
            env::var("BOTFLOW_LLM_API_KEY"),
        ) {
            (Ok(endpoint), Ok(api_key)) => {
                let model = env::var("BOTFLOW_LLM_MODEL").unwrap_or_else(|_| "glm-4-flash".to_string());
                ClassifierKind::Http { endpoint, api_key, model }
            }
            _ => ClassifierKind::Rule,
        };

        Self {
            db_path: env::var("BOTFLOW_DB_PATH").ok(),
            classifier,
            scripts_dir: env::var("BOTFLOW_SCRIPTS_DIR").unwrap_or_else(|_| "demos".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_use_rule_classifier_and_in_memory_store() {
        let options = EngineOptions::default();
        assert_eq!(options.classifier, ClassifierKind::Rule);
        assert!(options.db_path.is_none());
        assert_eq!(options.scripts_dir, "demos");
    }
}
