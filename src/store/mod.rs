//! Document-store backends for measurement records.
//!
//! The pipelines only need three operations: a range + projection `find`, a
//! bulk `insert_many`, and a `count`. `MemoryStore` keeps everything in
//! process; `ParquetStore` persists records as Parquet part files.

pub mod memory;
pub mod parquet_store;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    model::{MeasurementRecord, QueriedRecord},
    query::QueryPlan,
};

pub use self::memory::MemoryStore;
pub use self::parquet_store::ParquetStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Stored data does not have the expected shape.
    #[error("corrupt data in {location}: {reason}")]
    Corrupt { location: String, reason: String },
}

#[async_trait]
pub trait MeasurementStore: Send + Sync {
    /// Records whose timestamp satisfies `plan.range`, restricted to
    /// `plan.projection`, in insertion order.
    async fn find(&self, plan: &QueryPlan) -> Result<Vec<QueriedRecord>, StoreError>;

    /// Persist all `records` as one operation.
    async fn insert_many(&self, records: Vec<MeasurementRecord>) -> Result<(), StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}
