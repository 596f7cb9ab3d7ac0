use arrow::{
    array::{Array, ArrayRef, Float64Array, TimestampMicrosecondArray},
    datatypes::{DataType as ArrowDataType, Field as ArrowField, Schema as ArrowSchema, TimeUnit},
    record_batch::RecordBatch,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use glob::glob;
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter, ProjectionMask},
    basic::Compression,
    file::{properties::WriterProperties, reader::FileReader, serialized_reader::SerializedFileReader},
};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info, warn};

use super::{MeasurementStore, StoreError};
use crate::{
    model::{Field, MeasurementRecord, QueriedRecord},
    query::QueryPlan,
};

const TIMESTAMP_COLUMN: &str = "timestamp";
const BATCH_SIZE: usize = 8192;

/// Stores records as a directory of Parquet part files, one per
/// `insert_many` call. Parts are written to a `.tmp` file and renamed into
/// place, so a reader never sees a half-written part.
#[derive(Debug, Clone)]
pub struct ParquetStore {
    dir: PathBuf,
    schema: Arc<ArrowSchema>,
}

impl ParquetStore {
    /// Open (creating if needed) the store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            schema: Arc::new(record_schema()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// `timestamp` (UTC micros) followed by the 13 fields in `Field::ALL` order.
fn record_schema() -> ArrowSchema {
    let mut fields = Vec::with_capacity(Field::ALL.len() + 1);
    fields.push(ArrowField::new(
        TIMESTAMP_COLUMN,
        ArrowDataType::Timestamp(TimeUnit::Microsecond, None),
        false,
    ));
    for f in Field::ALL {
        fields.push(ArrowField::new(f.as_str(), ArrowDataType::Float64, false));
    }
    ArrowSchema::new(fields)
}

fn part_files(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let pattern = format!("{}/*.parquet", dir.display());
    let mut files: Vec<PathBuf> = glob(&pattern)?.filter_map(Result::ok).collect();
    files.sort();
    Ok(files)
}

fn to_batch(
    schema: Arc<ArrowSchema>,
    records: &[MeasurementRecord],
) -> Result<RecordBatch, StoreError> {
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(Field::ALL.len() + 1);
    arrays.push(Arc::new(TimestampMicrosecondArray::from(
        records
            .iter()
            .map(|r| r.timestamp.timestamp_micros())
            .collect::<Vec<_>>(),
    )));
    for f in Field::ALL {
        arrays.push(Arc::new(Float64Array::from(
            records.iter().map(|r| r.value(f)).collect::<Vec<_>>(),
        )));
    }
    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn write_part(
    dir: &Path,
    schema: Arc<ArrowSchema>,
    records: &[MeasurementRecord],
) -> Result<PathBuf, StoreError> {
    let batch = to_batch(schema.clone(), records)?;
    let fname = format!("part-{}.parquet", Utc::now().timestamp_micros());
    write_batch_as(dir, &fname, schema, &batch)
}

/// Write `batch` to `dir/<fname>` via a `.tmp` sibling. The temp file is
/// removed again if any step fails.
fn write_batch_as(
    dir: &Path,
    fname: &str,
    schema: Arc<ArrowSchema>,
    batch: &RecordBatch,
) -> Result<PathBuf, StoreError> {
    let tmp = dir.join(format!("{}.tmp", fname));
    let final_path = dir.join(fname);

    let written = (|| -> Result<(), StoreError> {
        let file = File::create(&tmp)?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(BufWriter::new(file), schema, Some(props))?;
        writer.write(batch)?;
        writer.close()?;
        fs::rename(&tmp, &final_path)?;
        Ok(())
    })();

    if let Err(e) = written {
        if let Err(rm) = fs::remove_file(&tmp) {
            warn!(path = %tmp.display(), error = %rm, "failed to remove temp part");
        }
        return Err(e);
    }
    Ok(final_path)
}

fn corrupt(path: &Path, reason: impl Into<String>) -> StoreError {
    StoreError::Corrupt {
        location: path.display().to_string(),
        reason: reason.into(),
    }
}

fn scan_part(path: &Path, plan: &QueryPlan, out: &mut Vec<QueriedRecord>) -> Result<(), StoreError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let fields = plan.projection.fields();
    let mut roots = vec![0];
    roots.extend(fields.iter().map(|f| f.index() + 1));
    let mask = ProjectionMask::roots(builder.parquet_schema(), roots);
    let reader = builder
        .with_projection(mask)
        .with_batch_size(BATCH_SIZE)
        .build()?;

    for batch in reader {
        let batch = batch?;
        let timestamps = batch
            .column_by_name(TIMESTAMP_COLUMN)
            .and_then(|c| c.as_any().downcast_ref::<TimestampMicrosecondArray>())
            .ok_or_else(|| corrupt(path, "missing timestamp column"))?;
        let columns = fields
            .iter()
            .map(|f| {
                batch
                    .column_by_name(f.as_str())
                    .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
                    .map(|a| (*f, a))
                    .ok_or_else(|| corrupt(path, format!("missing column `{}`", f)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            let micros = timestamps.value(row);
            let timestamp = DateTime::<Utc>::from_timestamp_micros(micros)
                .ok_or_else(|| corrupt(path, format!("timestamp out of range: {}", micros)))?;
            if !plan.range.contains(&timestamp) {
                continue;
            }
            out.push(QueriedRecord {
                timestamp,
                values: columns.iter().map(|(f, a)| (*f, a.value(row))).collect(),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl MeasurementStore for ParquetStore {
    async fn find(&self, plan: &QueryPlan) -> Result<Vec<QueriedRecord>, StoreError> {
        let dir = self.dir.clone();
        let plan = *plan;
        let found = tokio::task::spawn_blocking(move || -> Result<_, StoreError> {
            let mut out = Vec::new();
            for path in part_files(&dir)? {
                scan_part(&path, &plan, &mut out)?;
            }
            Ok(out)
        })
        .await??;
        debug!(rows = found.len(), "parquet find");
        Ok(found)
    }

    async fn insert_many(&self, records: Vec<MeasurementRecord>) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        let dir = self.dir.clone();
        let schema = self.schema.clone();
        let rows = records.len();
        let path = tokio::task::spawn_blocking(move || write_part(&dir, schema, &records)).await??;
        info!(rows, path = %path.display(), "wrote parquet part");
        Ok(())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || -> Result<u64, StoreError> {
            let mut total = 0u64;
            for path in part_files(&dir)? {
                let reader = SerializedFileReader::new(File::open(&path)?)?;
                total += reader.metadata().file_metadata().num_rows().max(0) as u64;
            }
            Ok(total)
        })
        .await?
    }
}
