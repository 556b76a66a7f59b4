pub mod file;
pub mod memory;
pub mod schema;
pub mod seed;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    IoError(std::io::Error),
    SerializationError(serde_json::Error),
    InvalidDataset(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::IoError(err) => write!(f, "IO error: {}", err),
            StoreError::SerializationError(err) => write!(f, "Serialization error: {}", err),
            StoreError::InvalidDataset(msg) => write!(f, "Invalid dataset: {}", msg),
        }
    }
}

impl Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::IoError(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Bar,
    Pie,
    Doughnut,
}

/// Display color: one CSS color for the whole series, or one per label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Single(String),
    PerLabel(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    #[serde(rename = "data", alias = "values")]
    pub values: Vec<f64>,
    #[serde(
        rename = "backgroundColor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub background_color: Option<Color>,
    #[serde(
        rename = "borderColor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub border_color: Option<Color>,
}

/// A chart-ready dataset in the shape the frontend's charting library reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub labels: Vec<String>,
    #[serde(rename = "datasets", alias = "series")]
    pub series: Vec<Series>,
}

impl ChartDataset {
    /// Every series carries exactly one value per label, and there is at
    /// least one label and one series.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.labels.is_empty() {
            return Err(StoreError::InvalidDataset("labels must not be empty".to_string()));
        }
        if self.series.is_empty() {
            return Err(StoreError::InvalidDataset(
                "at least one series is required".to_string(),
            ));
        }
        for series in &self.series {
            if series.values.len() != self.labels.len() {
                return Err(StoreError::InvalidDataset(format!(
                    "series '{}' has {} values for {} labels",
                    series.label,
                    series.values.len(),
                    self.labels.len()
                )));
            }
            if series.values.iter().any(|v| !v.is_finite()) {
                return Err(StoreError::InvalidDataset(format!(
                    "series '{}' contains a non-finite value",
                    series.label
                )));
            }
        }
        Ok(())
    }

    /// JSON array of the first `n` values of the first series.
    pub fn summary(&self, n: usize) -> String {
        let head: &[f64] = self
            .series
            .first()
            .map(|s| &s.values[..n.min(s.values.len())])
            .unwrap_or(&[]);
        serde_json::to_string(head).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Named chart datasets keyed by topic.
///
/// The analysis path only reads; writes come from the data-editing
/// endpoints and must leave every entry satisfying
/// [`ChartDataset::validate`].
#[async_trait]
pub trait DatasetStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<ChartDataset>, StoreError>;

    async fn all(&self) -> Result<BTreeMap<String, ChartDataset>, StoreError>;

    /// Inserts or replaces, returning the previous entry.
    async fn put(&self, key: &str, dataset: ChartDataset) -> Result<Option<ChartDataset>, StoreError>;

    async fn remove(&self, key: &str) -> Result<Option<ChartDataset>, StoreError>;
}
