//! HTTP-backed classifier: prompts an OpenAI-chat-compatible completion
//! endpoint to pick the best-matching candidate label. Kept synchronous
//! (`reqwest::blocking`) so it can be called from the engine's otherwise
//! synchronous `execute` without infecting the core with async.

use serde::{Deserialize, Serialize};

use super::{Classifier, UNKNOWN};

pub struct HttpClassifier {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn prompt(input: &str, candidates: &[String]) -> String {
        let candidates_str = candidates.iter().map(|c| format!("\"{c}\"")).collect::<Vec<_>>().join(", ");
        format!(
            "Select the best intent from: [{candidates_str}]\nUser Input: \"{input}\"\nOutput only the exact intent string. Return 'UNKNOWN' if no match."
        )
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageOwned,
}

#[derive(Deserialize)]
struct ChatMessageOwned {
    content: String,
}

impl Classifier for HttpClassifier {
    fn detect_intent(&self, input: &str, candidates: &[String]) -> String {
        let content = Self::prompt(input, candidates);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: &content }],
            temperature: 0.01,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<ChatResponse>());

        let raw = match response {
            Ok(body) => match body.choices.into_iter().next() {
                Some(choice) => choice.message.content,
                None => return UNKNOWN.to_string(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "intent classification request failed");
                return UNKNOWN.to_string();
            }
        };

        let clean = raw.trim().replace(['"', '\''], "");

        if candidates.iter().any(|c| c == &clean) {
            return clean;
        }
        if let Some(matched) = candidates.iter().find(|c| clean.contains(c.as_str())) {
            return matched.clone();
        }
        UNKNOWN.to_string()
    }
}
