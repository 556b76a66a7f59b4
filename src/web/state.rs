use crate::analysis::Analyzer;
use crate::config::AppConfig;
use crate::data::DatasetStore;
use crate::data::schema::SchemaDescription;
use crate::llm::ModelGateway;
use std::sync::Arc;

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub analyzer: Analyzer,
    pub store: Arc<dyn DatasetStore>,
    pub schema: Arc<SchemaDescription>,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        gateway: Arc<dyn ModelGateway>,
        store: Arc<dyn DatasetStore>,
        schema: SchemaDescription,
    ) -> Self {
        let schema = Arc::new(schema);
        let analyzer = Analyzer::new(gateway, Arc::clone(&store), Arc::clone(&schema));

        Self {
            config,
            analyzer,
            store,
            schema,
            startup_time: chrono::Utc::now(),
        }
    }
}
