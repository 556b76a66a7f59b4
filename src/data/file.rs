use super::{ChartDataset, DatasetStore, StoreError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const DATASETS_FILE: &str = "datasets.json";

/// Store backed by a single JSON document holding every dataset.
///
/// Writers are serialized and replace the whole document through a temp
/// file + rename, so readers (which take no lock) always see a complete
/// document.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens `<data_dir>/datasets.json`, seeding it with `initial` if absent.
    pub async fn open(
        data_dir: &Path,
        initial: BTreeMap<String, ChartDataset>,
    ) -> Result<Self, StoreError> {
        let path = data_dir.join(DATASETS_FILE);
        let store = Self {
            path,
            write_lock: Mutex::new(()),
        };

        if !tokio::fs::try_exists(&store.path).await? {
            info!("Creating dataset document at {}", store.path.display());
            tokio::fs::create_dir_all(data_dir).await?;
            let mut document = Map::new();
            for (key, dataset) in &initial {
                document.insert(key.clone(), serde_json::to_value(dataset)?);
            }
            store.save(&document).await?;
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The document as written, including entries that do not parse as a
    /// dataset. Writers go through this so hand-edited entries survive.
    async fn load_raw(&self) -> Result<Map<String, Value>, StoreError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn load(&self) -> Result<BTreeMap<String, ChartDataset>, StoreError> {
        let raw = self.load_raw().await?;
        Ok(raw
            .iter()
            .filter_map(|(key, value)| self.parse_entry(key, value))
            .collect())
    }

    // Hand-edited documents may hold entries that break the shape.
    fn parse_entry(&self, key: &str, value: &Value) -> Option<(String, ChartDataset)> {
        let parsed = ChartDataset::deserialize(value)
            .map_err(StoreError::from)
            .and_then(|dataset| dataset.validate().map(|()| dataset));
        match parsed {
            Ok(dataset) => Some((key.to_string(), dataset)),
            Err(e) => {
                warn!("Skipping dataset '{}' in {}: {}", key, self.path.display(), e);
                None
            }
        }
    }

    async fn save(&self, document: &Map<String, Value>) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(document)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, body).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        debug!("Saved {} entries to {}", document.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl DatasetStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<ChartDataset>, StoreError> {
        let raw = self.load_raw().await?;
        Ok(raw
            .get(key)
            .and_then(|value| self.parse_entry(key, value))
            .map(|(_, dataset)| dataset))
    }

    async fn all(&self) -> Result<BTreeMap<String, ChartDataset>, StoreError> {
        self.load().await
    }

    async fn put(&self, key: &str, dataset: ChartDataset) -> Result<Option<ChartDataset>, StoreError> {
        dataset.validate()?;
        let value = serde_json::to_value(&dataset)?;

        let _guard = self.write_lock.lock().await;
        let mut document = self.load_raw().await?;
        let previous = document
            .insert(key.to_string(), value)
            .and_then(|old| self.parse_entry(key, &old))
            .map(|(_, dataset)| dataset);
        self.save(&document).await?;
        Ok(previous)
    }

    /// Entries that do not parse are invisible to readers, so they are left
    /// in place here too.
    async fn remove(&self, key: &str) -> Result<Option<ChartDataset>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load_raw().await?;
        let previous = match document.get(key).and_then(|value| self.parse_entry(key, value)) {
            Some((_, dataset)) => dataset,
            None => return Ok(None),
        };
        document.remove(key);
        self.save(&document).await?;
        Ok(Some(previous))
    }
}
