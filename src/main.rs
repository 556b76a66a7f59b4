use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

mod analysis;
mod config;
mod data;
mod llm;
mod util;
mod web;

use crate::analysis::topic::{KEYWORD_TABLE_VERSION, Topic};
use crate::config::{AppConfig, CliArgs};
use crate::data::DatasetStore;
use crate::data::file::JsonFileStore;
use crate::data::memory::InMemoryStore;
use crate::data::schema::SchemaDescription;
use crate::data::seed::default_datasets;
use crate::llm::{LlmManager, ModelGateway};
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = CliArgs::parse();

    // Initialize logging
    init_tracing(args.log_json);

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    info!("Loaded configuration: {:?}", config);

    // Schema used for SQL prompts
    let schema = match &config.data.schema_file {
        Some(path) => {
            info!("Loading schema description from {}", path);
            SchemaDescription::load(Path::new(path))?
        }
        None => SchemaDescription::builtin(),
    };
    if schema.is_empty() {
        warn!("Schema description has no tables; SQL prompts will carry no schema");
    }

    // Dataset store backing
    let store: Arc<dyn DatasetStore> = match config.data.store.as_str() {
        "memory" => {
            info!("Using in-memory dataset store");
            Arc::new(InMemoryStore::seeded())
        }
        "file" => {
            let store = JsonFileStore::open(&config.data_dir(), default_datasets()).await?;
            info!("Using file-backed dataset store at {}", store.path().display());
            Arc::new(store)
        }
        other => {
            error!("Unsupported dataset store: {}", other);
            return Err(format!("Unsupported dataset store: {}", other).into());
        }
    };

    // A topic without a dataset fails every query routed to it
    for topic in Topic::ALL {
        if store.get(topic.key()).await?.is_none() {
            warn!("No dataset stored for topic '{}'", topic);
        }
    }
    info!("Topic keyword table version {}", KEYWORD_TABLE_VERSION);

    // Initialize LLM gateway
    info!("Initializing LLM gateway with backend: {}", config.llm.backend);
    let gateway: Arc<dyn ModelGateway> = Arc::new(LlmManager::new(&config.llm)?);

    let app_state = Arc::new(AppState::new(config.clone(), gateway, store, schema));

    // Start the web server
    info!("Starting DataInsight server on {}:{}", config.web.host, config.web.port);
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
