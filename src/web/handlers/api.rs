use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::analysis::{AnalysisError, AnalysisResult};
use crate::data::schema::SchemaDescription;
use crate::data::{ChartDataset, StoreError};
use crate::web::state::AppState;

// Request / response types

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct DataMutationResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ChartDataset>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
    pub llm_backend: String,
    pub uptime_seconds: i64,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Error response carrying a short message and never internal detail.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidInput(msg) => ApiError::new(StatusCode::BAD_REQUEST, msg),
            AnalysisError::DataUnavailable(msg) => {
                error!("Analysis failed: {}", msg);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load data for this query")
            }
            AnalysisError::Persistence(e) => e.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidDataset(msg) => ApiError::new(StatusCode::BAD_REQUEST, msg),
            other => {
                error!("Dataset store error: {}", other);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to access dataset store")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::new(StatusCode::BAD_REQUEST, "Request body must be JSON like {\"query\": \"...\"}")
    }
}

// Analysis
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(payload) = payload?;
    let result = state.analyzer.analyze(&payload.query).await?;
    Ok(Json(result))
}

// Datasets
pub async fn list_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, ChartDataset>>, ApiError> {
    Ok(Json(state.store.all().await?))
}

pub async fn get_data(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<ChartDataset>, ApiError> {
    match state.store.get(&key).await? {
        Some(dataset) => Ok(Json(dataset)),
        None => Err(ApiError::new(StatusCode::NOT_FOUND, format!("Dataset '{}' not found", key))),
    }
}

/// PUT: insert or replace, reported as an update.
pub async fn replace_data(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(dataset): Json<ChartDataset>,
) -> Result<Json<DataMutationResponse>, ApiError> {
    match state.store.put(&key, dataset.clone()).await? {
        Some(_) => info!("Replaced dataset '{}'", key),
        None => info!("PUT created dataset '{}'", key),
    }

    Ok(Json(DataMutationResponse {
        message: "Dataset updated".to_string(),
        data: Some(dataset),
    }))
}

/// POST: insert or replace.
pub async fn upsert_data(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(dataset): Json<ChartDataset>,
) -> Result<Json<DataMutationResponse>, ApiError> {
    let previous = state.store.put(&key, dataset.clone()).await?;
    if previous.is_some() {
        warn!("POST overwrote existing dataset '{}'", key);
    } else {
        info!("Added dataset '{}'", key);
    }

    Ok(Json(DataMutationResponse {
        message: "Dataset saved".to_string(),
        data: Some(dataset),
    }))
}

pub async fn delete_data(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<DataMutationResponse>, ApiError> {
    match state.store.remove(&key).await? {
        Some(_) => {
            info!("Deleted dataset '{}'", key);
            Ok(Json(DataMutationResponse {
                message: "Dataset deleted".to_string(),
                data: None,
            }))
        }
        None => Err(ApiError::new(StatusCode::NOT_FOUND, format!("Dataset '{}' not found", key))),
    }
}

// Schema
pub async fn get_schema(State(state): State<Arc<AppState>>) -> Json<SchemaDescription> {
    Json(state.schema.as_ref().clone())
}

// System status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let now = chrono::Utc::now();

    Json(HealthStatus {
        status: "ok",
        message: "DataInsight backend is running",
        version: env!("CARGO_PKG_VERSION"),
        llm_backend: state.config.llm.backend.clone(),
        uptime_seconds: now.signed_duration_since(state.startup_time).num_seconds(),
        timestamp: now.to_rfc3339(),
    })
}
