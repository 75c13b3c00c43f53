//! HTTP surface: a thin axum front end over the engine. One session per
//! browser, identified by a cookie; each session's bot runs on its own
//! blocking worker thread talking to a `WebAdapter`, polled by the
//! frontend rather than pushed over a socket.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};

use crate::adapter::{OutboundMessage, WebAdapter};
use crate::ast::FlowTable;
use crate::classifier::Classifier;
use crate::functions::FunctionRegistry;
use crate::runtime::{driver, Context, Engine};
use crate::store::Store;

const SESSION_COOKIE: &str = "botflow_user_id";

pub struct AppState {
    pub scripts_dir: String,
    pub store: Option<Arc<dyn Store>>,
    pub classifier: Arc<dyn Classifier>,
    pub flows: Mutex<FlowTable>,
    pub current_script: Mutex<String>,
    pub sessions: Mutex<HashMap<String, Arc<WebAdapter>>>,
}

impl AppState {
    pub fn new(scripts_dir: String, store: Option<Arc<dyn Store>>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            scripts_dir,
            store,
            classifier,
            flows: Mutex::new(FlowTable::new()),
            current_script: Mutex::new(String::new()),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn scripts_on_disk(&self) -> Vec<String> {
        let pattern = format!("{}/*.bot", self.scripts_dir);
        glob::glob(&pattern)
            .into_iter()
            .flatten()
            .filter_map(Result::ok)
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect()
    }

    pub fn load_script(&self, filename: &str) -> Result<(), String> {
        let path = Path::new(&self.scripts_dir).join(filename);
        let source = std::fs::read_to_string(&path).map_err(|e| e.to_string())?;
        let table = crate::parser::compile(&source).map_err(|e| e.to_string())?;
        *self.flows.lock().unwrap() = table;
        *self.current_script.lock().unwrap() = filename.to_string();
        Ok(())
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/scripts", get(list_scripts))
        .route("/api/switch_script", post(switch_script))
        .route("/start_chat", post(start_chat))
        .route("/send", post(send_message))
        .route("/poll", get(poll))
        .route("/reset", post(reset))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

async fn index() -> impl IntoResponse {
    Html("<!doctype html><title>botflow</title><p>botflow is running.</p>")
}

#[derive(Serialize)]
struct ScriptsResponse {
    scripts: Vec<String>,
    current: String,
}

async fn list_scripts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ScriptsResponse {
        scripts: state.scripts_on_disk(),
        current: state.current_script.lock().unwrap().clone(),
    })
}

#[derive(Deserialize)]
struct SwitchScriptRequest {
    filename: String,
}

async fn switch_script(State(state): State<Arc<AppState>>, Json(body): Json<SwitchScriptRequest>) -> impl IntoResponse {
    match state.load_script(&body.filename) {
        Ok(()) => {
            state.sessions.lock().unwrap().clear();
            Json(serde_json::json!({"status": "ok", "current": body.filename})).into_response()
        }
        Err(message) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"status": "error", "message": message})),
        )
            .into_response(),
    }
}

fn user_id(cookies: &Cookies) -> String {
    match cookies.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            cookies.add(Cookie::new(SESSION_COOKIE, id.clone()));
            id
        }
    }
}

async fn start_chat(State(state): State<Arc<AppState>>, cookies: Cookies) -> impl IntoResponse {
    let uid = user_id(&cookies);

    let bot_name = {
        let flows = state.flows.lock().unwrap();
        match flows.keys().next() {
            Some(name) => name.clone(),
            None => {
                return (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": "No bot defined in script"})),
                )
                    .into_response();
            }
        }
    };

    let adapter = Arc::new(WebAdapter::new());
    state.sessions.lock().unwrap().insert(uid, adapter.clone());

    let store = state.store.clone();
    let classifier = state.classifier.clone();
    let flows = Arc::new(state.flows.lock().unwrap().clone());

    tokio::task::spawn_blocking(move || {
        let functions = FunctionRegistry::new();
        let flow = match flows.get(&bot_name) {
            Some(flow) => flow,
            None => return,
        };
        let engine = Engine::new(store.as_deref(), &functions, Some(classifier.as_ref()), adapter.as_ref());
        let mut ctx = Context::new();
        driver::run_with_context(flow, &engine, &mut ctx);
    });

    Json(serde_json::json!({"status": "ok", "bot_name": bot_name})).into_response()
}

#[derive(Deserialize)]
struct SendMessageRequest {
    message: String,
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(body): Json<SendMessageRequest>,
) -> impl IntoResponse {
    let uid = match cookies.get(SESSION_COOKIE) {
        Some(c) => c.value().to_string(),
        None => {
            return (axum::http::StatusCode::BAD_REQUEST, Json(serde_json::json!({"error": "Session expired"})))
                .into_response()
        }
    };
    let sessions = state.sessions.lock().unwrap();
    match sessions.get(&uid) {
        Some(adapter) => {
            adapter.push_user_input(body.message);
            Json(serde_json::json!({"status": "ok"})).into_response()
        }
        None => (axum::http::StatusCode::BAD_REQUEST, Json(serde_json::json!({"error": "Session expired"}))).into_response(),
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum PolledMessage {
    Bot { content: String },
    System { action: String },
}

async fn poll(State(state): State<Arc<AppState>>, cookies: Cookies) -> impl IntoResponse {
    let Some(uid) = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
        return Json(Vec::<PolledMessage>::new());
    };
    let sessions = state.sessions.lock().unwrap();
    match sessions.get(&uid) {
        Some(adapter) => {
            let messages = adapter
                .drain_outbound()
                .into_iter()
                .map(|m| match m {
                    OutboundMessage::Text(content) => PolledMessage::Bot { content },
                    OutboundMessage::WaitInput => PolledMessage::System { action: "wait_input".to_string() },
                })
                .collect();
            Json(messages)
        }
        None => Json(Vec::new()),
    }
}

async fn reset(State(state): State<Arc<AppState>>, cookies: Cookies) -> impl IntoResponse {
    if let Some(uid) = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
        if let Some(adapter) = state.sessions.lock().unwrap().remove(&uid) {
            adapter.close_inbound();
        }
    }
    Json(serde_json::json!({"status": "ok"}))
}
