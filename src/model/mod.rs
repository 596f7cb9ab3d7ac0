pub mod field;
pub mod filter;
pub mod record;

pub use field::{Field, FieldMetadata, DATASET_MAX_DATE, DATASET_MIN_DATE, METADATA};
pub use filter::{FilterParams, FilterSpec};
pub use record::{MeasurementRecord, QueriedRecord, RawRow};
