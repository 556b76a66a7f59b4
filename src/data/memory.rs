use super::{ChartDataset, DatasetStore, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Process-local store; writes are lost on restart.
pub struct InMemoryStore {
    datasets: RwLock<BTreeMap<String, ChartDataset>>,
}

impl InMemoryStore {
    pub fn new(datasets: BTreeMap<String, ChartDataset>) -> Self {
        Self {
            datasets: RwLock::new(datasets),
        }
    }

    pub fn seeded() -> Self {
        Self::new(super::seed::default_datasets())
    }
}

#[async_trait]
impl DatasetStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<ChartDataset>, StoreError> {
        Ok(self.datasets.read().await.get(key).cloned())
    }

    async fn all(&self) -> Result<BTreeMap<String, ChartDataset>, StoreError> {
        Ok(self.datasets.read().await.clone())
    }

    async fn put(&self, key: &str, dataset: ChartDataset) -> Result<Option<ChartDataset>, StoreError> {
        dataset.validate()?;
        Ok(self.datasets.write().await.insert(key.to_string(), dataset))
    }

    async fn remove(&self, key: &str) -> Result<Option<ChartDataset>, StoreError> {
        Ok(self.datasets.write().await.remove(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ChartType;

    #[tokio::test]
    async fn test_seeded_store_serves_topics() {
        let store = InMemoryStore::seeded();
        let city = store.get("users_by_city").await.unwrap().unwrap();
        assert_eq!(city.chart_type, ChartType::Pie);
        assert_eq!(city.labels.len(), 10);
        assert!(store.get("no_such_topic").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_write_leaves_entry_untouched() {
        let store = InMemoryStore::seeded();
        let before = store.get("users_by_age").await.unwrap().unwrap();

        let mut broken = before.clone();
        broken.labels.pop();
        assert!(matches!(
            store.put("users_by_age", broken).await,
            Err(StoreError::InvalidDataset(_))
        ));

        assert_eq!(store.get("users_by_age").await.unwrap().unwrap(), before);
    }

    #[tokio::test]
    async fn test_put_and_remove_return_previous_entry() {
        let store = InMemoryStore::new(BTreeMap::new());
        let dataset = crate::data::seed::default_datasets()
            .remove("orders_by_status")
            .unwrap();

        assert!(store.put("custom", dataset.clone()).await.unwrap().is_none());
        assert_eq!(store.put("custom", dataset.clone()).await.unwrap(), Some(dataset.clone()));
        assert_eq!(store.remove("custom").await.unwrap(), Some(dataset));
        assert!(store.remove("custom").await.unwrap().is_none());
    }
}
