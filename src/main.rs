use std::sync::Arc;

use clap::{Parser, Subcommand};

use botflow::adapter::ConsoleAdapter;
use botflow::classifier::{Classifier, HttpClassifier, RuleClassifier};
use botflow::config::{ClassifierKind, EngineOptions};
use botflow::functions::FunctionRegistry;
use botflow::runtime::{driver, Engine};
use botflow::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "botflow")]
#[command(about = "A DSL and runtime for multi-turn conversational bots")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a .bot script in the terminal (the default when no subcommand is given)
    Run {
        /// Path to a .bot script file
        script_file: String,
        /// Which bot to start, defaulting to the first one declared
        #[arg(long)]
        bot: Option<String>,
    },
    /// Serve the web front end over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },
}

fn build_classifier(options: &EngineOptions) -> Arc<dyn Classifier> {
    match &options.classifier {
        ClassifierKind::Rule => Arc::new(RuleClassifier::new()) as Arc<dyn Classifier>,
        ClassifierKind::Http { endpoint, api_key, model } => {
            Arc::new(HttpClassifier::new(endpoint.as_str(), api_key.as_str(), model.as_str())) as Arc<dyn Classifier>
        }
    }
}

fn build_store(options: &EngineOptions) -> Option<Arc<dyn Store>> {
    match &options.db_path {
        Some(path) => match SqliteStore::open(path) {
            Ok(store) => Some(Arc::new(store) as Arc<dyn Store>),
            Err(err) => {
                tracing::error!(error = %err, path = %path, "failed to open database; running without persistence");
                None
            }
        },
        None => SqliteStore::in_memory().ok().map(|s| Arc::new(s) as Arc<dyn Store>),
    }
}

fn run_console(script_file: &str, bot: Option<String>, options: EngineOptions) {
    let source = match std::fs::read_to_string(script_file) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Cannot read script file {script_file}: {err}");
            std::process::exit(1);
        }
    };

    let table = match botflow::parser::compile(&source) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("Failed to parse {script_file}: {err}");
            std::process::exit(1);
        }
    };

    let bot_name = bot.or_else(|| table.keys().next().cloned());
    let Some(bot_name) = bot_name else {
        eprintln!("No bot defined in {script_file}");
        std::process::exit(1);
    };
    let Some(flow) = table.get(&bot_name) else {
        eprintln!("Bot '{bot_name}' not found in {script_file}");
        std::process::exit(1);
    };

    let store = build_store(&options);
    let classifier = build_classifier(&options);
    let functions = FunctionRegistry::new();
    let adapter = ConsoleAdapter::new();

    let engine = Engine::new(store.as_deref(), &functions, Some(classifier.as_ref()), &adapter);
    driver::run(flow, &engine);
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let options = EngineOptions::from_env();

    match cli.command {
        Some(Command::Run { script_file, bot }) => run_console(&script_file, bot, options),
        Some(Command::Serve { addr }) => serve(&addr, options),
        None => {
            eprintln!("Usage: botflow run <script.bot> | botflow serve");
            std::process::exit(1);
        }
    }
}

fn serve(addr: &str, options: EngineOptions) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");

    runtime.block_on(async move {
        let store = build_store(&options);
        let classifier = build_classifier(&options);
        let state = Arc::new(botflow::server::AppState::new(options.scripts_dir.clone(), store, classifier));

        let first_script = std::fs::read_dir(&options.scripts_dir).ok().and_then(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.path())
                .find(|p| p.extension().and_then(|e| e.to_str()) == Some("bot"))
                .and_then(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
        });

        match first_script {
            Some(first) => {
                if let Err(err) = state.load_script(&first) {
                    tracing::warn!(error = %err, script = %first, "failed to load startup script");
                }
            }
            None => tracing::warn!(dir = %options.scripts_dir, "no .bot scripts found"),
        }

        let app = botflow::server::router(state);
        let listener = tokio::net::TcpListener::bind(addr).await.expect("failed to bind address");
        tracing::info!(%addr, "serving");
        axum::serve(listener, app).await.expect("server error");
    });
}
