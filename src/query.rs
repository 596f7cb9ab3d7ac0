use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::model::{Field, FilterSpec, MeasurementRecord, QueriedRecord};

/// Inclusive timestamp bounds; a missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangePredicate {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl RangePredicate {
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| *ts >= from) && self.to.map_or(true, |to| *ts <= to)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Which measurement fields a query returns. `timestamp` is always included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Projection {
    #[default]
    All,
    Field(Field),
}

impl Projection {
    pub fn fields(&self) -> Vec<Field> {
        match self {
            Projection::All => Field::ALL.to_vec(),
            Projection::Field(f) => vec![*f],
        }
    }

    pub fn apply(&self, record: &MeasurementRecord) -> QueriedRecord {
        match self {
            Projection::All => QueriedRecord::from(record),
            Projection::Field(f) => QueriedRecord {
                timestamp: record.timestamp,
                values: BTreeMap::from([(*f, record.value(*f))]),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryPlan {
    pub range: RangePredicate,
    pub projection: Projection,
}

/// Translate a validated filter into a storage query.
pub fn plan(filter: &FilterSpec) -> QueryPlan {
    QueryPlan {
        range: RangePredicate {
            from: filter.from,
            to: filter.to,
        },
        projection: filter.field.map_or(Projection::All, Projection::Field),
    }
}
