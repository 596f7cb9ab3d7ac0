use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::field::Field;
use crate::error::{AirQualityError, Result};

pub const MISSING_BOUNDS: &str = "Missing required query parameters: from_date_time, to_date_time";
pub const INVALID_DATE: &str = "Invalid date format. Use ISO 8601 format (YYYY-MM-DDTHH:mm:ss.sssZ)";
pub const INVALID_FIELD: &str = "field must be valid";

const KEY_SEPARATOR: char = '_';

/// Query parameters exactly as the client sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl FilterParams {
    /// Check the raw parameters and turn them into a typed `FilterSpec`.
    ///
    /// Both bounds are required and must parse as ISO-8601; `field`, when
    /// present and non-empty, must name a canonical field.
    pub fn validate(&self) -> Result<FilterSpec> {
        let (from, to) = match (non_empty(&self.from_date_time), non_empty(&self.to_date_time)) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(AirQualityError::InvalidFilter(MISSING_BOUNDS.into())),
        };

        let (from, to) = match (parse_iso8601(from), parse_iso8601(to)) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(AirQualityError::InvalidFilter(INVALID_DATE.into())),
        };

        let field = match non_empty(&self.field) {
            Some(name) => Some(
                name.parse::<Field>()
                    .map_err(|_| AirQualityError::InvalidFilter(INVALID_FIELD.into()))?,
            ),
            None => None,
        };

        Ok(FilterSpec {
            from: Some(from),
            to: Some(to),
            field,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// A validated query filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub field: Option<Field>,
}

impl FilterSpec {
    /// Cache key for this filter: `<from>_<to>[_<field>]`.
    ///
    /// Bounds are rendered as RFC 3339 UTC at full precision: equivalent
    /// spellings of one instant share a key, distinct instants never do.
    pub fn cache_key(&self) -> String {
        let render = |t: &Option<DateTime<Utc>>| {
            t.map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
                .unwrap_or_default()
        };
        let mut key = format!("{}{}{}", render(&self.from), KEY_SEPARATOR, render(&self.to));
        if let Some(field) = self.field {
            key.push(KEY_SEPARATOR);
            key.push_str(field.as_str());
        }
        key
    }
}

/// Parse a client-supplied ISO-8601 timestamp. Forms without an offset are
/// taken as UTC; a bare date means midnight.
pub fn parse_iso8601(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn params(from: Option<&str>, to: Option<&str>, field: Option<&str>) -> FilterParams {
        FilterParams {
            from_date_time: from.map(String::from),
            to_date_time: to.map(String::from),
            field: field.map(String::from),
        }
    }

    fn invalid_reason(p: FilterParams) -> String {
        match p.validate() {
            Err(AirQualityError::InvalidFilter(reason)) => reason,
            other => panic!("expected InvalidFilter, got {:?}", other),
        }
    }

    #[test]
    fn accepts_common_iso_forms() {
        let expected = Utc.with_ymd_and_hms(2004, 3, 10, 18, 0, 0).unwrap();
        for s in [
            "2004-03-10T18:00:00Z",
            "2004-03-10T18:00:00.000Z",
            "2004-03-10T20:00:00+02:00",
            "2004-03-10T18:00:00",
            "2004-03-10T18:00",
            "2004-03-10 18:00:00",
        ] {
            assert_eq!(parse_iso8601(s), Some(expected), "{s}");
        }
        assert_eq!(
            parse_iso8601("2004-03-10"),
            Some(Utc.with_ymd_and_hms(2004, 3, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_iso8601("not-a-date"), None);
        assert_eq!(parse_iso8601("2004-13-40"), None);
    }

    #[test]
    fn both_bounds_are_required() {
        assert_eq!(invalid_reason(params(None, Some("2004-04-04"), None)), MISSING_BOUNDS);
        assert_eq!(invalid_reason(params(Some("2004-03-10"), Some("  "), None)), MISSING_BOUNDS);
        assert_eq!(invalid_reason(params(None, None, Some("not_a_field"))), MISSING_BOUNDS);
    }

    #[test]
    fn rejects_unparseable_bounds() {
        assert_eq!(
            invalid_reason(params(Some("not-a-date"), Some("2004-04-04"), None)),
            INVALID_DATE
        );
    }

    #[test]
    fn rejects_unknown_field() {
        assert_eq!(
            invalid_reason(params(Some("2004-03-10"), Some("2004-04-04"), Some("not_a_field"))),
            INVALID_FIELD
        );
    }

    #[test]
    fn empty_field_means_no_projection() {
        let spec = params(Some("2004-03-10"), Some("2004-04-04"), Some(""))
            .validate()
            .unwrap();
        assert_eq!(spec.field, None);
    }

    #[test]
    fn cache_keys_are_stable_and_distinct() {
        let plain = params(Some("2004-03-10"), Some("2004-04-04"), None)
            .validate()
            .unwrap();
        let with_field = params(Some("2004-03-10"), Some("2004-04-04"), Some("temperature"))
            .validate()
            .unwrap();

        assert_eq!(
            plain.cache_key(),
            "2004-03-10T00:00:00Z_2004-04-04T00:00:00Z"
        );
        assert_eq!(
            with_field.cache_key(),
            "2004-03-10T00:00:00Z_2004-04-04T00:00:00Z_temperature"
        );
        assert_ne!(plain.cache_key(), with_field.cache_key());
        assert_eq!(plain.cache_key(), plain.clone().cache_key());
    }

    #[test]
    fn equivalent_spellings_share_a_key() {
        let a = params(Some("2004-03-10"), Some("2004-04-04T00:00:00Z"), None)
            .validate()
            .unwrap();
        let b = params(Some("2004-03-10T02:00:00+02:00"), Some("2004-04-04 00:00:00"), None)
            .validate()
            .unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn sub_millisecond_bounds_get_distinct_keys() {
        let coarse = params(Some("2004-03-10T18:00:00Z"), Some("2004-03-10T20:00:00Z"), None)
            .validate()
            .unwrap();
        let fine = params(Some("2004-03-10T18:00:00.0001Z"), Some("2004-03-10T20:00:00Z"), None)
            .validate()
            .unwrap();
        let finer = params(
            Some("2004-03-10T18:00:00.000000001Z"),
            Some("2004-03-10T20:00:00Z"),
            None,
        )
        .validate()
        .unwrap();

        assert_ne!(coarse.from, fine.from);
        assert_ne!(coarse.cache_key(), fine.cache_key());
        assert_ne!(coarse.cache_key(), finer.cache_key());
        assert_ne!(fine.cache_key(), finer.cache_key());
        assert_eq!(
            fine.cache_key(),
            "2004-03-10T18:00:00.000100Z_2004-03-10T20:00:00Z"
        );
    }
}
