use crate::{
    agg::{
        builder::{AggSpec, GroupTarget, LeafKind, LeafSpec},
        request::{AggregationRequest, GroupByNode, LeafAggNode, ScopedFilter},
    },
    config::SearchConfig,
    error::QueryError,
    field::validate_path,
    filter::compile_expr,
    name::{AggKind, AggName, filter_scope, resolve_ref},
};
use std::collections::BTreeSet;

/// Lower aggregation specs into a named request tree and reject any
/// name that would be ambiguous at lookup time.
pub fn lower(
    specs: &[AggSpec],
    config: &SearchConfig,
) -> Result<Vec<AggregationRequest>, QueryError> {
    let requests = lower_level(specs, config)?;
    validate_names(&requests)?;

    Ok(requests)
}

/// Reject duplicate names among siblings, and group-by names that repeat
/// an enclosing group-by's name.
pub fn validate_names(requests: &[AggregationRequest]) -> Result<(), QueryError> {
    let mut ancestors = Vec::new();

    validate_level(requests, &mut ancestors)
}

fn lower_level(
    specs: &[AggSpec],
    config: &SearchConfig,
) -> Result<Vec<AggregationRequest>, QueryError> {
    specs
        .iter()
        .map(|spec| match spec {
            AggSpec::GroupBy { target, inner } => {
                lower_group_by(target, inner, config).map(AggregationRequest::GroupBy)
            }
            AggSpec::Leaf(leaf) => lower_leaf(leaf, config).map(AggregationRequest::Leaf),
        })
        .collect()
}

fn lower_group_by(
    target: &GroupTarget,
    inner: &[AggSpec],
    config: &SearchConfig,
) -> Result<GroupByNode, QueryError> {
    let (name, field) = match target {
        GroupTarget::Field(field) => (
            resolve_ref(field, AggKind::GroupBy)?,
            field.path.clone(),
        ),
        GroupTarget::Key(key) => {
            validate_path(key)?;
            (AggName::raw(key.clone()), key.clone())
        }
    };

    Ok(GroupByNode {
        name,
        field,
        size: config.max_buckets,
        inner: lower_level(inner, config)?,
    })
}

fn lower_leaf(spec: &LeafSpec, config: &SearchConfig) -> Result<LeafAggNode, QueryError> {
    let name = resolve_ref(&spec.field, spec.kind.agg_kind())?;

    let filter = match &spec.filter {
        Some(expr) => {
            let node = compile_expr(expr)?;
            Some(ScopedFilter {
                name: filter_scope(&name, &node.fingerprint()),
                node,
            })
        }
        None => None,
    };

    let percents = if spec.kind == LeafKind::Percentile && spec.percents.is_empty() {
        config.default_percents.clone()
    } else {
        spec.percents.clone()
    };

    let order = match &spec.order {
        Some((field, order)) => Some((field.resolve_path()?.to_string(), *order)),
        None => None,
    };

    Ok(LeafAggNode {
        name,
        kind: spec.kind,
        field: spec.field.path.clone(),
        filter,
        percents,
        size: (spec.kind == LeafKind::Distinct).then_some(config.max_buckets),
        order,
    })
}

fn validate_level<'a>(
    level: &'a [AggregationRequest],
    ancestors: &mut Vec<&'a AggName>,
) -> Result<(), QueryError> {
    let mut seen = BTreeSet::new();

    for request in level {
        let name = request.outer_name();
        if !seen.insert(name) {
            return Err(QueryError::ambiguous(name.as_str()));
        }

        if let AggregationRequest::GroupBy(node) = request {
            if ancestors.contains(&&node.name) {
                return Err(QueryError::ambiguous(node.name.as_str()));
            }

            ancestors.push(&node.name);
            validate_level(&node.inner, ancestors)?;
            ancestors.pop();
        }
    }

    Ok(())
}
