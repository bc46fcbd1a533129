use crate::{
    error::QueryError,
    field::{CompareOp, Field, FieldRef},
    filter::{
        ast::{Expr, Predicate},
        node::{Combinator, FilterNode, FilterOp, push_flattened},
    },
    value::{FieldValue, Value, ValueKind},
};

/// Compile a typed predicate into a filter tree.
pub fn compile<M>(predicate: &Predicate<M>) -> Result<FilterNode, QueryError> {
    compile_expr(predicate.expr())
}

/// Compile an untyped predicate expression.
///
/// Fails on the first unsupported sub-expression; a partially built tree
/// is never returned.
pub fn compile_expr(expr: &Expr) -> Result<FilterNode, QueryError> {
    match expr {
        Expr::Compare { field, op, value } => compile_compare(expr, field, *op, value),
        Expr::Within { field, values } => compile_within(expr, field, values),
        Expr::Field(field) => compile_bare_field(expr, field),
        Expr::And(children) => compile_combinator(expr, children, Combinator::And),
        Expr::Or(children) => compile_combinator(expr, children, Combinator::Or),
        Expr::Not(inner) => Ok(FilterNode::not(compile_expr(inner)?)),
    }
}

/// Membership filter on `field`, compiled directly.
pub fn value_within<M, V, I>(field: &Field<M, V>, values: I) -> Result<FilterNode, QueryError>
where
    V: FieldValue,
    I: IntoIterator,
    I::Item: Into<V>,
{
    compile(&field.within(values))
}

fn compile_compare(
    expr: &Expr,
    field: &FieldRef,
    op: CompareOp,
    value: &Value,
) -> Result<FilterNode, QueryError> {
    let path = field.resolve_path()?;
    check_operand(expr, field.kind, value)?;

    if op.is_range() && !field.kind.is_ordered() {
        return Err(QueryError::unsupported(
            expr.to_string(),
            "range comparison on a boolean field",
        ));
    }

    let op = match op {
        CompareOp::Eq => FilterOp::Eq,
        CompareOp::Ne => FilterOp::Neq,
        CompareOp::Lt => FilterOp::Lt,
        CompareOp::Lte => FilterOp::Lte,
        CompareOp::Gt => FilterOp::Gt,
        CompareOp::Gte => FilterOp::Gte,
    };

    Ok(FilterNode::leaf(path, op, literal(field, value.clone())))
}

fn compile_within(
    expr: &Expr,
    field: &FieldRef,
    values: &[Value],
) -> Result<FilterNode, QueryError> {
    let path = field.resolve_path()?;
    for value in values {
        check_operand(expr, field.kind, value)?;
    }

    let values = values.iter().map(|v| literal(field, v.clone())).collect();

    Ok(FilterNode::leaf(path, FilterOp::Within, Value::List(values)))
}

// A boolean field referenced alone means `field == true`.
fn compile_bare_field(expr: &Expr, field: &FieldRef) -> Result<FilterNode, QueryError> {
    let path = field.resolve_path()?;

    if field.kind != ValueKind::Bool {
        return Err(QueryError::unsupported(
            expr.to_string(),
            "only boolean fields may be used without a comparison",
        ));
    }

    Ok(FilterNode::leaf(path, FilterOp::Eq, Value::Bool(true)))
}

fn compile_combinator(
    expr: &Expr,
    children: &[Expr],
    kind: Combinator,
) -> Result<FilterNode, QueryError> {
    if children.is_empty() {
        return Err(QueryError::unsupported(
            expr.to_string(),
            "combinator without operands",
        ));
    }

    let mut out = Vec::with_capacity(children.len());
    for child in children {
        push_flattened(&mut out, compile_expr(child)?, kind);
    }

    if out.len() == 1 {
        return Ok(out.remove(0));
    }

    Ok(FilterNode::Combinator {
        kind,
        children: out,
    })
}

fn literal(field: &FieldRef, value: Value) -> Value {
    if field.lowers_text() {
        value.lowered()
    } else {
        value
    }
}

fn check_operand(expr: &Expr, kind: ValueKind, value: &Value) -> Result<(), QueryError> {
    let ok = match value {
        Value::Null => {
            return Err(QueryError::unsupported(
                expr.to_string(),
                "comparison against null",
            ));
        }
        Value::List(_) => false,
        Value::Bool(_) => kind == ValueKind::Bool,
        Value::Int(_) | Value::Uint(_) => kind.is_numeric(),
        Value::Float(v) if !v.is_finite() => {
            return Err(QueryError::unsupported(
                expr.to_string(),
                "non-finite float operand",
            ));
        }
        Value::Float(_) => kind == ValueKind::Float,
        Value::Text(_) => matches!(kind, ValueKind::Text | ValueKind::Enum),
        Value::Enum(_) => kind == ValueKind::Enum,
        Value::Timestamp(_) => kind == ValueKind::Timestamp,
    };

    if ok {
        Ok(())
    } else {
        Err(QueryError::unsupported(
            expr.to_string(),
            format!("operand {value} does not match field type {kind:?}"),
        ))
    }
}
