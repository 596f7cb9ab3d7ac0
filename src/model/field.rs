use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The 13 numeric measurements carried by every record, in source column order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    CoConcentration,
    CoSensorValue,
    HydrocarbonsConcentration,
    BenzeneConcentration,
    HydrocarbonsSensorValue,
    NoConcentration,
    NitroOxidesSensorValue,
    NitroOxidesConcentration,
    NitroDioxideSensorValue,
    OzoneSensorValue,
    Temperature,
    RelativeHumidity,
    AbsoluteHumidity,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::CoConcentration,
        Field::CoSensorValue,
        Field::HydrocarbonsConcentration,
        Field::BenzeneConcentration,
        Field::HydrocarbonsSensorValue,
        Field::NoConcentration,
        Field::NitroOxidesSensorValue,
        Field::NitroOxidesConcentration,
        Field::NitroDioxideSensorValue,
        Field::OzoneSensorValue,
        Field::Temperature,
        Field::RelativeHumidity,
        Field::AbsoluteHumidity,
    ];

    /// Canonical column name, as stored and as accepted in query filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::CoConcentration => "co_concentration",
            Field::CoSensorValue => "co_sensor_value",
            Field::HydrocarbonsConcentration => "hydrocarbons_concentration",
            Field::BenzeneConcentration => "benzene_concentration",
            Field::HydrocarbonsSensorValue => "hydrocarbons_sensor_value",
            Field::NoConcentration => "no_concentration",
            Field::NitroOxidesSensorValue => "nitro_oxides_sensor_value",
            Field::NitroOxidesConcentration => "nitro_oxides_concentration",
            Field::NitroDioxideSensorValue => "nitro_dioxide_sensor_value",
            Field::OzoneSensorValue => "ozone_sensor_value",
            Field::Temperature => "temperature",
            Field::RelativeHumidity => "relative_humidity",
            Field::AbsoluteHumidity => "absolute_humidity",
        }
    }

    /// Position of this field in `ALL`, the source column order.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn metadata(&self) -> &'static FieldMetadata {
        &METADATA[self.index()]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field `{}`", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Human-facing description of one canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldMetadata {
    pub db_column: Field,
    /// Header of the source column this field is read from.
    pub slug: &'static str,
    pub info: &'static str,
}

pub static METADATA: [FieldMetadata; 13] = [
    FieldMetadata {
        db_column: Field::CoConcentration,
        slug: "CO(GT)",
        info: "concentration of carbon monoxide in the air (µg/m³)",
    },
    FieldMetadata {
        db_column: Field::CoSensorValue,
        slug: "PT08.S1(CO)",
        info: "sensor value for carbon monoxide",
    },
    FieldMetadata {
        db_column: Field::HydrocarbonsConcentration,
        slug: "NMHC(GT)",
        info: "concentration of non-methane hydrocarbons in the air (µg/m³)",
    },
    FieldMetadata {
        db_column: Field::BenzeneConcentration,
        slug: "C6H6(GT)",
        info: "concentration of benzene in the air (µg/m³)",
    },
    FieldMetadata {
        db_column: Field::HydrocarbonsSensorValue,
        slug: "PT08.S2(NMHC)",
        info: "sensor value for non-methane hydrocarbons",
    },
    FieldMetadata {
        db_column: Field::NoConcentration,
        slug: "NOx(GT)",
        info: "concentration of nitrogen oxides in the air (µg/m³)",
    },
    FieldMetadata {
        db_column: Field::NitroOxidesSensorValue,
        slug: "PT08.S3(NOx)",
        info: "sensor value for nitrogen oxides",
    },
    FieldMetadata {
        db_column: Field::NitroOxidesConcentration,
        slug: "NO2(GT)",
        info: "concentration of nitrogen dioxide in the air (µg/m³)",
    },
    FieldMetadata {
        db_column: Field::NitroDioxideSensorValue,
        slug: "PT08.S4(NO2)",
        info: "sensor value for nitrogen dioxide",
    },
    FieldMetadata {
        db_column: Field::OzoneSensorValue,
        slug: "PT08.S5(O3)",
        info: "sensor value for ozone",
    },
    FieldMetadata {
        db_column: Field::Temperature,
        slug: "T",
        info: "temperature at the time of measurement (celsius)",
    },
    FieldMetadata {
        db_column: Field::RelativeHumidity,
        slug: "RH",
        info: "relative humidity in the air (as a percentage)",
    },
    FieldMetadata {
        db_column: Field::AbsoluteHumidity,
        slug: "AH",
        info: "absolute humidity (in grams per cubic meter)",
    },
];

/// Earliest and latest measurement dates in the published dataset.
pub const DATASET_MIN_DATE: &str = "2004-03-10";
pub const DATASET_MAX_DATE: &str = "2005-04-04";
