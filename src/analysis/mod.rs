pub mod prompts;
pub mod topic;

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::data::schema::SchemaDescription;
use crate::data::{ChartDataset, DatasetStore, StoreError};
use crate::llm::ModelGateway;
use self::topic::Topic;

/// Substituted when the model cannot produce SQL.
pub const FALLBACK_SQL: &str =
    "SELECT * FROM orders WHERE order_date >= DATE_SUB(CURDATE(), INTERVAL 1 YEAR);";

/// Substituted when the model cannot produce an insight.
pub const FALLBACK_INSIGHT: &str =
    "Analysis complete. Keep an eye on how the key metrics trend over time.";

/// How many values of the first series go into the insight prompt.
pub const SUMMARY_VALUES: usize = 5;

#[derive(Debug)]
pub enum AnalysisError {
    InvalidInput(String),
    DataUnavailable(String),
    Persistence(StoreError),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::DataUnavailable(msg) => write!(f, "Data unavailable: {}", msg),
            AnalysisError::Persistence(err) => write!(f, "Dataset store error: {}", err),
        }
    }
}

impl Error for AnalysisError {}

impl From<StoreError> for AnalysisError {
    fn from(err: StoreError) -> Self {
        AnalysisError::Persistence(err)
    }
}

/// Complete answer to one query; every field is always populated.
///
/// `sql` is display text only. It is never executed and must not be handed
/// to anything that would execute it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub query: String,
    pub sql: String,
    pub data: ChartDataset,
    pub insight: String,
}

/// Runs the query → SQL → dataset → insight pipeline.
///
/// Holds no per-request state; one instance serves concurrent requests.
pub struct Analyzer {
    gateway: Arc<dyn ModelGateway>,
    store: Arc<dyn DatasetStore>,
    schema: Arc<SchemaDescription>,
}

impl Analyzer {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        store: Arc<dyn DatasetStore>,
        schema: Arc<SchemaDescription>,
    ) -> Self {
        Self {
            gateway,
            store,
            schema,
        }
    }

    pub async fn analyze(&self, query: &str) -> Result<AnalysisResult, AnalysisError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AnalysisError::InvalidInput("query must not be empty".to_string()));
        }

        debug!("Analyzing query: {}", query);

        // Without model SQL the raw query is the better classification input.
        let (sql, topic) = match self.generate_sql(query).await {
            Some(sql) => {
                let topic = topic::resolve(&sql);
                (sql, topic)
            }
            None => (FALLBACK_SQL.to_string(), topic::resolve(query)),
        };

        info!("Resolved topic '{}' for query", topic);

        let data = self.load_dataset(topic).await?;
        let summary = data.summary(SUMMARY_VALUES);
        let insight = self.generate_insight(query, &sql, &summary).await;

        Ok(AnalysisResult {
            query: query.to_string(),
            sql,
            data,
            insight,
        })
    }

    async fn generate_sql(&self, query: &str) -> Option<String> {
        let prompt = match prompts::build_sql_prompt(query, &self.schema) {
            Ok(prompt) => prompt,
            Err(e) => {
                error!("Failed to render SQL prompt: {}", e);
                return None;
            }
        };

        match self.gateway.complete(&prompt).await {
            Ok(reply) => {
                let sql = prompts::strip_code_fences(&reply);
                if sql.is_empty() {
                    warn!("Model returned no SQL, using fallback");
                    None
                } else {
                    debug!("Generated SQL: {}", sql);
                    Some(sql)
                }
            }
            Err(e) => {
                warn!("SQL generation failed, using fallback: {}", e);
                None
            }
        }
    }

    async fn load_dataset(&self, topic: Topic) -> Result<ChartDataset, AnalysisError> {
        match self.store.get(topic.key()).await? {
            Some(dataset) => Ok(dataset),
            None => {
                error!("No dataset configured for topic '{}'", topic);
                Err(AnalysisError::DataUnavailable(format!(
                    "no dataset for topic '{}'",
                    topic
                )))
            }
        }
    }

    async fn generate_insight(&self, query: &str, sql: &str, summary: &str) -> String {
        let prompt = match prompts::build_insight_prompt(query, sql, summary) {
            Ok(prompt) => prompt,
            Err(e) => {
                error!("Failed to render insight prompt: {}", e);
                return FALLBACK_INSIGHT.to_string();
            }
        };

        match self.gateway.complete(&prompt).await {
            Ok(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
            Ok(_) => {
                warn!("Model returned an empty insight, using fallback");
                FALLBACK_INSIGHT.to_string()
            }
            Err(e) => {
                warn!("Insight generation failed, using fallback: {}", e);
                FALLBACK_INSIGHT.to_string()
            }
        }
    }
}
