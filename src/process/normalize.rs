use chrono::FixedOffset;
use rayon::prelude::*;

use crate::{
    error::{AirQualityError, Result},
    model::{Field, MeasurementRecord, RawRow},
    process::{date_parser::combine_date_time, utils::parse_decimal},
};

/// Convert one raw source row into a measurement record.
///
/// Every numeric field is filled; the only failure is a date/time that does
/// not name a real instant.
pub fn normalize(raw: &RawRow, offset: &FixedOffset) -> Result<MeasurementRecord> {
    let timestamp = combine_date_time(&raw.date, &raw.time, offset).ok_or_else(|| {
        AirQualityError::SourceParse {
            line: raw.line,
            reason: format!("invalid date/time `{} {}`", raw.date, raw.time),
        }
    })?;
    let values = Field::ALL.map(|f| parse_decimal(raw.value(f)));
    Ok(MeasurementRecord::from_values(timestamp, values))
}

/// Normalize a batch in parallel, keeping input order. Fails on the first
/// row that cannot be normalized.
pub fn normalize_rows(rows: &[RawRow], offset: FixedOffset) -> Result<Vec<MeasurementRecord>> {
    rows.par_iter().map(|row| normalize(row, &offset)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row(line: u64, date: &str, time: &str, values: [&str; 13]) -> RawRow {
        RawRow {
            line,
            date: date.into(),
            time: time.into(),
            values: values.map(String::from),
        }
    }

    const FIRST_ROW: [&str; 13] = [
        "2,6", "1360", "150", "11,9", "1046", "166", "1056", "113", "1692", "1268", "13,6",
        "48,9", "0,7578",
    ];

    #[test]
    fn normalizes_a_source_row() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let rec = normalize(&row(2, "10/03/2004", "18.00.00", FIRST_ROW), &utc).unwrap();

        assert_eq!(rec.timestamp, Utc.with_ymd_and_hms(2004, 3, 10, 18, 0, 0).unwrap());
        assert_eq!(rec.co_concentration, 2.6);
        assert_eq!(rec.co_sensor_value, 1360.0);
        assert_eq!(rec.hydrocarbons_concentration, 150.0);
        assert_eq!(rec.benzene_concentration, 11.9);
        assert_eq!(rec.hydrocarbons_sensor_value, 1046.0);
        assert_eq!(rec.no_concentration, 166.0);
        assert_eq!(rec.nitro_oxides_sensor_value, 1056.0);
        assert_eq!(rec.nitro_oxides_concentration, 113.0);
        assert_eq!(rec.nitro_dioxide_sensor_value, 1692.0);
        assert_eq!(rec.ozone_sensor_value, 1268.0);
        assert_eq!(rec.temperature, 13.6);
        assert_eq!(rec.relative_humidity, 48.9);
        assert_eq!(rec.absolute_humidity, 0.7578);
    }

    #[test]
    fn blank_values_become_zero() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let rec = normalize(&row(3, "10/03/2004", "19.00.00", [""; 13]), &utc).unwrap();
        assert!(rec.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn bad_date_reports_line() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let err = normalize(&row(42, "32/03/2004", "18.00.00", FIRST_ROW), &utc).unwrap_err();
        match err {
            AirQualityError::SourceParse { line, .. } => assert_eq!(line, 42),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn batch_keeps_order() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let rows: Vec<RawRow> = (0..48u32)
            .map(|h| {
                let day = 10 + h / 24;
                row(h as u64 + 2, &format!("{day}/03/2004"), &format!("{}.00.00", h % 24), FIRST_ROW)
            })
            .collect();
        let records = normalize_rows(&rows, utc).unwrap();
        assert_eq!(records.len(), 48);
        assert!(records.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }
}
