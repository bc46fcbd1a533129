//! Outbound rendering into the backend's JSON query DSL.
//!
//! Pure structural translation: every decision was already made while
//! compiling filters and lowering aggregations.

use crate::{
    agg::{AggregationRequest, GroupByNode, LeafAggNode, LeafKind},
    filter::{Combinator, FilterLeaf, FilterNode, FilterOp},
    value::Value,
};
use serde_json::{Map, Value as JsonValue, json};

/// Render a literal.
#[must_use]
pub fn value_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(v) => JsonValue::Bool(*v),
        Value::Int(v) => json!(v),
        Value::Uint(v) => json!(v),
        Value::Float(v) => serde_json::Number::from_f64(*v).map_or(JsonValue::Null, JsonValue::Number),
        Value::Text(v) | Value::Enum(v) => JsonValue::String(v.clone()),
        Value::Timestamp(v) => JsonValue::String(v.to_rfc3339()),
        Value::List(items) => JsonValue::Array(items.iter().map(value_json).collect()),
    }
}

/// Render a compiled filter as a boolean query clause.
#[must_use]
pub fn filter_dsl(node: &FilterNode) -> JsonValue {
    match node {
        FilterNode::Leaf(leaf) => leaf_dsl(leaf),
        FilterNode::Combinator { kind, children } => {
            let clauses: Vec<JsonValue> = children.iter().map(filter_dsl).collect();
            match kind {
                Combinator::And => json!({ "bool": { "must": clauses } }),
                Combinator::Or => json!({
                    "bool": { "should": clauses, "minimum_should_match": 1 }
                }),
                Combinator::Not => json!({ "bool": { "must_not": clauses } }),
            }
        }
    }
}

fn leaf_dsl(leaf: &FilterLeaf) -> JsonValue {
    let value = value_json(&leaf.value);

    match leaf.op {
        FilterOp::Eq => object("term", object(&leaf.field, value)),
        FilterOp::Neq => json!({
            "bool": { "must_not": [object("term", object(&leaf.field, value))] }
        }),
        FilterOp::Within => object("terms", object(&leaf.field, value)),
        FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => {
            let bound = leaf.op.range_bound().unwrap_or("gte");
            object("range", object(&leaf.field, object(bound, value)))
        }
    }
}

/// Render a request tree as the `aggs` object.
#[must_use]
pub fn aggregations_dsl(requests: &[AggregationRequest]) -> JsonValue {
    let mut map = Map::new();
    for request in requests {
        let body = match request {
            AggregationRequest::GroupBy(node) => group_by_dsl(node),
            AggregationRequest::Leaf(leaf) => scoped_leaf_dsl(leaf),
        };
        map.insert(request.outer_name().to_string(), body);
    }

    JsonValue::Object(map)
}

fn group_by_dsl(node: &GroupByNode) -> JsonValue {
    let mut body = json!({
        "terms": { "field": node.field, "size": node.size }
    });

    if !node.inner.is_empty() {
        body["aggs"] = aggregations_dsl(&node.inner);
    }

    body
}

fn scoped_leaf_dsl(leaf: &LeafAggNode) -> JsonValue {
    match &leaf.filter {
        Some(scope) => json!({
            "filter": filter_dsl(&scope.node),
            "aggs": object(leaf.name.as_str(), leaf_dsl_body(leaf)),
        }),
        None => leaf_dsl_body(leaf),
    }
}

fn leaf_dsl_body(leaf: &LeafAggNode) -> JsonValue {
    let field = json!({ "field": leaf.field });

    match leaf.kind {
        LeafKind::Sum => object("sum", field),
        LeafKind::Average => object("avg", field),
        LeafKind::Min => object("min", field),
        LeafKind::Max => object("max", field),
        LeafKind::Count => object("value_count", field),
        LeafKind::Cardinality => object("cardinality", field),
        LeafKind::Stats => object("extended_stats", field),
        LeafKind::Percentile => {
            let mut body = field;
            if !leaf.percents.is_empty() {
                body["percents"] = json!(leaf.percents);
            }
            object("percentiles", body)
        }
        LeafKind::Distinct => {
            let mut body = field;
            if let Some(size) = leaf.size {
                body["size"] = json!(size);
            }
            object("terms", body)
        }
        LeafKind::FirstBy => {
            let mut body = json!({
                "size": 1,
                "_source": { "includes": [leaf.field] },
            });
            if let Some((order_field, order)) = &leaf.order {
                body["sort"] = json!([object(order_field, json!({ "order": order.as_str() }))]);
            }
            object("top_hits", body)
        }
    }
}

fn object(key: &str, value: JsonValue) -> JsonValue {
    let mut map = Map::new();
    map.insert(key.to_string(), value);

    JsonValue::Object(map)
}
