//! Inbound response model: named aggregate results as returned by the
//! backend, decoded against the request tree that produced them.

mod decode;


pub use decode::{decode_aggregations, decode_response};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

///
/// Aggregates
///
/// Name-keyed aggregate results for one level of a response: the top
/// level, the inside of a bucket, or the inside of a filter scope.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Aggregates {
    entries: BTreeMap<String, AggregateResult>,
}

impl Aggregates {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, result: AggregateResult) {
        self.entries.insert(name.into(), result);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AggregateResult> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregateResult)> {
        self.entries.iter().map(|(name, result)| (name.as_str(), result))
    }
}

impl FromIterator<(String, AggregateResult)> for Aggregates {
    fn from_iter<I: IntoIterator<Item = (String, AggregateResult)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

///
/// AggregateResult
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateResult {
    /// Single-value metric (sum, avg, min, max). `None` when the backend
    /// had no values to aggregate.
    Metric(Option<f64>),
    ValueCount(u64),
    Cardinality(u64),
    Percentiles(Vec<PercentileItem>),
    Stats(Stats),

    /// `_source` documents of the top hits, best first.
    TopHits(Vec<JsonValue>),
    Terms(Vec<KeyedBucket>),
    Filter(SingleBucket),
}

impl AggregateResult {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Metric(_) => "metric",
            Self::ValueCount(_) => "value count",
            Self::Cardinality(_) => "cardinality",
            Self::Percentiles(_) => "percentiles",
            Self::Stats(_) => "stats",
            Self::TopHits(_) => "top hits",
            Self::Terms(_) => "terms",
            Self::Filter(_) => "filter",
        }
    }
}

///
/// KeyedBucket
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct KeyedBucket {
    pub key: String,

    /// The backend's raw `key`, kept when `key` came from a differing
    /// `key_as_string` (formatted dates).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_key: Option<String>,
    pub doc_count: u64,
    #[serde(default)]
    pub aggregations: Aggregates,
}

impl KeyedBucket {
    #[must_use]
    pub fn new(key: impl Into<String>, doc_count: u64) -> Self {
        Self {
            key: key.into(),
            raw_key: None,
            doc_count,
            aggregations: Aggregates::new(),
        }
    }

    #[must_use]
    pub fn with_aggregations(mut self, aggregations: Aggregates) -> Self {
        self.aggregations = aggregations;
        self
    }
}

///
/// SingleBucket
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SingleBucket {
    pub doc_count: u64,
    #[serde(default)]
    pub aggregations: Aggregates,
}

///
/// PercentileItem
///

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct PercentileItem {
    pub percent: f64,
    pub value: Option<f64>,
}

///
/// Stats
///
/// Extended statistics over a numeric field.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Stats {
    pub count: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub sum: f64,
    pub sum_of_squares: Option<f64>,
    pub variance: Option<f64>,
    pub std_deviation: Option<f64>,
}
