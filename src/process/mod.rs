// src/process/mod.rs
pub mod date_parser;
pub mod normalize;
pub mod utils;

use csv::{ReaderBuilder, StringRecord, Trim};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use tracing::{debug, info};

use crate::{
    error::{AirQualityError, Result},
    model::RawRow,
};

pub use normalize::{normalize, normalize_rows};

pub const DELIMITER: u8 = b';';

/// Column layout of the source file: 15 named columns followed by two
/// unnamed ones produced by the trailing `;;` on every line.
pub const SOURCE_COLUMNS: [&str; 17] = [
    "Date",
    "Time",
    "CO(GT)",
    "PT08.S1(CO)",
    "NMHC(GT)",
    "C6H6(GT)",
    "PT08.S2(NMHC)",
    "NOx(GT)",
    "PT08.S3(NOx)",
    "NO2(GT)",
    "PT08.S4(NO2)",
    "PT08.S5(O3)",
    "T",
    "RH",
    "AH",
    "",
    "",
];
const NAMED_COLUMNS: usize = 15;

/// Read every data row of the source file at `path` into memory.
///
/// The first line is the header and is skipped. Rows may carry 15 to 17
/// fields; anything else is a structural error.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<Vec<RawRow>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AirQualityError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = read_rows(BufReader::new(file), path)?;
    info!(rows = rows.len(), "read source rows");
    Ok(rows)
}

/// Tokenize source rows from any reader; `path` is only used in errors.
pub fn read_rows<R: Read>(reader: R, path: &Path) -> Result<Vec<RawRow>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Fields)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| csv_error(path, e))?;
        rows.push(to_raw_row(&record)?);
    }
    debug!(rows = rows.len(), "tokenized source");
    Ok(rows)
}

fn to_raw_row(record: &StringRecord) -> Result<RawRow> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();
    if !(NAMED_COLUMNS..=SOURCE_COLUMNS.len()).contains(&record.len()) {
        return Err(AirQualityError::SourceParse {
            line,
            reason: format!(
                "expected {} to {} fields, found {}",
                NAMED_COLUMNS,
                SOURCE_COLUMNS.len(),
                record.len()
            ),
        });
    }

    let field = |i: usize| record.get(i).unwrap_or_default().to_string();
    Ok(RawRow {
        line,
        date: field(0),
        time: field(1),
        values: std::array::from_fn(|i| field(i + 2)),
    })
}

fn csv_error(path: &Path, err: csv::Error) -> AirQualityError {
    let line = err.position().map(|p| p.line()).unwrap_or_default();
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => AirQualityError::SourceRead {
            path: path.to_path_buf(),
            source,
        },
        _ => AirQualityError::SourceParse { line, reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,airquality::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const SAMPLE: &str = "Date;Time;CO(GT);PT08.S1(CO);NMHC(GT);C6H6(GT);PT08.S2(NMHC);NOx(GT);PT08.S3(NOx);NO2(GT);PT08.S4(NO2);PT08.S5(O3);T;RH;AH;;
10/03/2004;18.00.00;2,6;1360;150;11,9;1046;166;1056;113;1692;1268;13,6;48,9;0,7578;;
10/03/2004;19.00.00;2;1292;112;9,4;955;103;1174;92;1559;972;13,3;47,7;0,7255;;
;;;;;;;;;;;;;;;;
";

    #[test]
    fn reads_sample_file() -> anyhow::Result<()> {
        init_test_logging();
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(SAMPLE.as_bytes())?;

        let rows = read_source(tmp.path())?;
        assert_eq!(rows.len(), 3);

        let first = &rows[0];
        assert_eq!(first.line, 2);
        assert_eq!(first.date, "10/03/2004");
        assert_eq!(first.time, "18.00.00");
        assert_eq!(first.values[0], "2,6");
        assert_eq!(first.values[12], "0,7578");

        assert!(!rows[2].has_date());
        Ok(())
    }

    #[test]
    fn tolerates_missing_trailing_columns() {
        let data = "Date;Time;CO(GT);PT08.S1(CO);NMHC(GT);C6H6(GT);PT08.S2(NMHC);NOx(GT);PT08.S3(NOx);NO2(GT);PT08.S4(NO2);PT08.S5(O3);T;RH;AH
11/03/2004;00.00.00;1,2;1185;31;3,6;690;62;1462;77;1333;733;11,3;56,8;0,7603
";
        let rows = read_rows(Cursor::new(data), Path::new("inline.csv")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].values[10], "11,3");
    }

    #[test]
    fn short_row_is_a_parse_error() {
        let data = "Date;Time;CO(GT)\n10/03/2004;18.00.00;2,6\n";
        let err = read_rows(Cursor::new(data), Path::new("inline.csv")).unwrap_err();
        match err {
            AirQualityError::SourceParse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn long_row_is_a_parse_error() {
        let mut data = SOURCE_COLUMNS.join(";");
        data.push('\n');
        data.push_str(&vec!["1"; 18].join(";"));
        data.push('\n');
        let err = read_rows(Cursor::new(data), Path::new("inline.csv")).unwrap_err();
        assert!(matches!(err, AirQualityError::SourceParse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(dir.path().join("AirQualityUCI.csv")).unwrap_err();
        assert!(matches!(err, AirQualityError::SourceRead { .. }));
    }
}
