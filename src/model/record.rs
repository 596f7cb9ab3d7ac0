use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::field::Field;

/// One data row of the source file, as tokenized and before any conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line in the source file, for error reporting.
    pub line: u64,
    /// `DD/MM/YYYY`; empty on the padding rows at the end of the file.
    pub date: String,
    /// `HH.MM.SS`
    pub time: String,
    /// Sensor columns in `Field::ALL` order, still using `,` as decimal separator.
    pub values: [String; 13],
}

impl RawRow {
    pub fn value(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn has_date(&self) -> bool {
        !self.date.trim().is_empty()
    }
}

/// A normalized measurement, one per hourly source row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub timestamp: DateTime<Utc>,
    pub co_concentration: f64,
    pub co_sensor_value: f64,
    pub hydrocarbons_concentration: f64,
    pub hydrocarbons_sensor_value: f64,
    pub benzene_concentration: f64,
    pub no_concentration: f64,
    pub nitro_oxides_sensor_value: f64,
    pub nitro_oxides_concentration: f64,
    pub nitro_dioxide_sensor_value: f64,
    pub ozone_sensor_value: f64,
    pub temperature: f64,
    pub relative_humidity: f64,
    pub absolute_humidity: f64,
}

impl MeasurementRecord {
    /// Build a record from values laid out in `Field::ALL` order.
    pub fn from_values(timestamp: DateTime<Utc>, values: [f64; 13]) -> Self {
        let v = |f: Field| values[f.index()];
        Self {
            timestamp,
            co_concentration: v(Field::CoConcentration),
            co_sensor_value: v(Field::CoSensorValue),
            hydrocarbons_concentration: v(Field::HydrocarbonsConcentration),
            hydrocarbons_sensor_value: v(Field::HydrocarbonsSensorValue),
            benzene_concentration: v(Field::BenzeneConcentration),
            no_concentration: v(Field::NoConcentration),
            nitro_oxides_sensor_value: v(Field::NitroOxidesSensorValue),
            nitro_oxides_concentration: v(Field::NitroOxidesConcentration),
            nitro_dioxide_sensor_value: v(Field::NitroDioxideSensorValue),
            ozone_sensor_value: v(Field::OzoneSensorValue),
            temperature: v(Field::Temperature),
            relative_humidity: v(Field::RelativeHumidity),
            absolute_humidity: v(Field::AbsoluteHumidity),
        }
    }

    pub fn value(&self, field: Field) -> f64 {
        match field {
            Field::CoConcentration => self.co_concentration,
            Field::CoSensorValue => self.co_sensor_value,
            Field::HydrocarbonsConcentration => self.hydrocarbons_concentration,
            Field::BenzeneConcentration => self.benzene_concentration,
            Field::HydrocarbonsSensorValue => self.hydrocarbons_sensor_value,
            Field::NoConcentration => self.no_concentration,
            Field::NitroOxidesSensorValue => self.nitro_oxides_sensor_value,
            Field::NitroOxidesConcentration => self.nitro_oxides_concentration,
            Field::NitroDioxideSensorValue => self.nitro_dioxide_sensor_value,
            Field::OzoneSensorValue => self.ozone_sensor_value,
            Field::Temperature => self.temperature,
            Field::RelativeHumidity => self.relative_humidity,
            Field::AbsoluteHumidity => self.absolute_humidity,
        }
    }

    pub fn values(&self) -> [f64; 13] {
        Field::ALL.map(|f| self.value(f))
    }
}

/// A record as returned by a query: the timestamp plus whichever fields
/// survived projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueriedRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub values: BTreeMap<Field, f64>,
}

impl QueriedRecord {
    pub fn get(&self, field: Field) -> Option<f64> {
        self.values.get(&field).copied()
    }
}

impl From<&MeasurementRecord> for QueriedRecord {
    fn from(record: &MeasurementRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            values: Field::ALL.iter().map(|&f| (f, record.value(f))).collect(),
        }
    }
}
