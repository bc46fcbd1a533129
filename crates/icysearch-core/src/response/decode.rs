use crate::{
    agg::{AggregationRequest, GroupByNode, LeafAggNode, LeafKind},
    error::QueryError,
    response::{AggregateResult, Aggregates, KeyedBucket, PercentileItem, SingleBucket, Stats},
};
use serde_json::{Map, Value as JsonValue};

/// Decode a full search response body; a body without an `aggregations`
/// object decodes to an empty set.
pub fn decode_response(
    requests: &[AggregationRequest],
    body: &JsonValue,
) -> Result<Aggregates, QueryError> {
    match body.get("aggregations") {
        Some(aggs) => decode_aggregations(requests, aggs),
        None => Ok(Aggregates::new()),
    }
}

/// Decode one level of the backend's aggregation object, guided by the
/// requests issued at that level. Requested aggregations the backend did
/// not return are left out; extraction reports them as missing.
pub fn decode_aggregations(
    requests: &[AggregationRequest],
    aggs: &JsonValue,
) -> Result<Aggregates, QueryError> {
    let object = aggs
        .as_object()
        .ok_or_else(|| QueryError::malformed("aggregations", "expected an object"))?;

    let mut decoded = Aggregates::new();
    for request in requests {
        let name = request.outer_name().as_str();
        let Some(body) = object.get(name) else {
            continue;
        };

        let result = match request {
            AggregationRequest::GroupBy(node) => decode_group_by(node, body)?,
            AggregationRequest::Leaf(leaf) => decode_scoped_leaf(leaf, body)?,
        };
        decoded.insert(name, result);
    }

    Ok(decoded)
}

fn decode_group_by(node: &GroupByNode, body: &JsonValue) -> Result<AggregateResult, QueryError> {
    decode_terms(node.name.as_str(), body, &node.inner)
}

fn decode_scoped_leaf(leaf: &LeafAggNode, body: &JsonValue) -> Result<AggregateResult, QueryError> {
    let Some(scope) = &leaf.filter else {
        return decode_leaf(leaf, body);
    };

    let doc_count = doc_count(scope.name.as_str(), body)?;
    let mut aggregations = Aggregates::new();
    if let Some(inner) = body.get(leaf.name.as_str()) {
        aggregations.insert(leaf.name.as_str(), decode_leaf(leaf, inner)?);
    }

    Ok(AggregateResult::Filter(SingleBucket {
        doc_count,
        aggregations,
    }))
}

fn decode_leaf(leaf: &LeafAggNode, body: &JsonValue) -> Result<AggregateResult, QueryError> {
    let name = leaf.name.as_str();

    match leaf.kind {
        LeafKind::Sum | LeafKind::Average | LeafKind::Min | LeafKind::Max => {
            Ok(AggregateResult::Metric(metric_value(name, body)?))
        }
        LeafKind::Count => Ok(AggregateResult::ValueCount(count_value(name, body)?)),
        LeafKind::Cardinality => Ok(AggregateResult::Cardinality(count_value(name, body)?)),
        LeafKind::Percentile => decode_percentiles(name, body).map(AggregateResult::Percentiles),
        LeafKind::Stats => decode_stats(name, body).map(AggregateResult::Stats),
        LeafKind::FirstBy => decode_top_hits(name, body).map(AggregateResult::TopHits),
        LeafKind::Distinct => decode_terms(name, body, &[]),
    }
}

fn decode_terms(
    name: &str,
    body: &JsonValue,
    inner: &[AggregationRequest],
) -> Result<AggregateResult, QueryError> {
    let buckets = body
        .get("buckets")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| QueryError::malformed(name, "expected a 'buckets' array"))?;

    buckets
        .iter()
        .map(|bucket| {
            let (key, raw_key) = bucket_key(name, bucket)?;

            Ok(KeyedBucket {
                key,
                raw_key,
                doc_count: doc_count(name, bucket)?,
                aggregations: decode_aggregations(inner, bucket)?,
            })
        })
        .collect::<Result<Vec<_>, QueryError>>()
        .map(AggregateResult::Terms)
}

fn decode_percentiles(name: &str, body: &JsonValue) -> Result<Vec<PercentileItem>, QueryError> {
    let mut items = match body.get("values") {
        // keyed form: {"50.0": 12.5, ...}
        Some(JsonValue::Object(values)) => keyed_percentiles(name, values)?,

        // list form: [{"key": 50.0, "value": 12.5}, ...]
        Some(JsonValue::Array(values)) => values
            .iter()
            .map(|item| {
                let percent = item
                    .get("key")
                    .and_then(JsonValue::as_f64)
                    .ok_or_else(|| QueryError::malformed(name, "percentile without a key"))?;

                Ok(PercentileItem {
                    percent,
                    value: item.get("value").and_then(JsonValue::as_f64),
                })
            })
            .collect::<Result<Vec<_>, QueryError>>()?,

        _ => return Err(QueryError::malformed(name, "expected percentile 'values'")),
    };

    items.sort_by(|a, b| a.percent.total_cmp(&b.percent));

    Ok(items)
}

fn keyed_percentiles(
    name: &str,
    values: &Map<String, JsonValue>,
) -> Result<Vec<PercentileItem>, QueryError> {
    values
        .iter()
        .filter(|(key, _)| !key.ends_with("_as_string"))
        .map(|(key, value)| {
            let percent = key.parse::<f64>().map_err(|_| {
                QueryError::malformed(name, format!("percentile key '{key}' is not numeric"))
            })?;

            Ok(PercentileItem {
                percent,
                value: value.as_f64(),
            })
        })
        .collect()
}

fn decode_stats(name: &str, body: &JsonValue) -> Result<Stats, QueryError> {
    let float = |field: &str| body.get(field).and_then(JsonValue::as_f64);

    Ok(Stats {
        count: body
            .get("count")
            .and_then(as_count)
            .ok_or_else(|| QueryError::malformed(name, "stats without a 'count'"))?,
        min: float("min"),
        max: float("max"),
        avg: float("avg"),
        sum: float("sum").unwrap_or_default(),
        sum_of_squares: float("sum_of_squares"),
        variance: float("variance"),
        std_deviation: float("std_deviation"),
    })
}

fn decode_top_hits(name: &str, body: &JsonValue) -> Result<Vec<JsonValue>, QueryError> {
    let hits = body
        .pointer("/hits/hits")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| QueryError::malformed(name, "expected 'hits.hits'"))?;

    Ok(hits
        .iter()
        .map(|hit| hit.get("_source").cloned().unwrap_or(JsonValue::Null))
        .collect())
}

fn metric_value(name: &str, body: &JsonValue) -> Result<Option<f64>, QueryError> {
    match body.get("value") {
        Some(JsonValue::Null) | None if body.is_object() => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| QueryError::malformed(name, "metric 'value' is not numeric")),
        None => Err(QueryError::malformed(name, "expected an object")),
    }
}

fn count_value(name: &str, body: &JsonValue) -> Result<u64, QueryError> {
    body.get("value")
        .and_then(as_count)
        .ok_or_else(|| QueryError::malformed(name, "expected an integral 'value'"))
}

fn doc_count(name: &str, body: &JsonValue) -> Result<u64, QueryError> {
    body.get("doc_count")
        .and_then(as_count)
        .ok_or_else(|| QueryError::malformed(name, "expected a 'doc_count'"))
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_count(value: &JsonValue) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
            .map(|v| v as u64)
    })
}

/// Bucket keys are kept as text. `key_as_string` wins when present, with
/// the raw key kept beside it; integral numbers render without a fraction.
fn bucket_key(name: &str, bucket: &JsonValue) -> Result<(String, Option<String>), QueryError> {
    let raw = match bucket.get("key") {
        Some(JsonValue::String(text)) => Some(text.clone()),
        Some(JsonValue::Bool(flag)) => Some(flag.to_string()),
        Some(JsonValue::Number(number)) => Some(render_number(number)),
        _ => None,
    };

    if let Some(text) = bucket.get("key_as_string").and_then(JsonValue::as_str) {
        return Ok((text.to_string(), raw.filter(|raw| raw != text)));
    }

    raw.map(|key| (key, None))
        .ok_or_else(|| QueryError::malformed(name, "bucket without a scalar 'key'"))
}

#[expect(clippy::cast_possible_truncation)]
fn render_number(number: &serde_json::Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }

    match number.as_f64() {
        Some(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => (v as i64).to_string(),
        _ => number.to_string(),
    }
}
