use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{MeasurementStore, StoreError};
use crate::{
    model::{MeasurementRecord, QueriedRecord},
    query::QueryPlan,
};

/// Process-local store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<MeasurementRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MeasurementStore for MemoryStore {
    async fn find(&self, plan: &QueryPlan) -> Result<Vec<QueriedRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| plan.range.contains(&r.timestamp))
            .map(|r| plan.projection.apply(r))
            .collect())
    }

    async fn insert_many(&self, records: Vec<MeasurementRecord>) -> Result<(), StoreError> {
        self.records.write().await.extend(records);
        Ok(())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.records.read().await.len() as u64)
    }
}
