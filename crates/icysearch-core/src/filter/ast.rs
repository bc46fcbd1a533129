use crate::{
    field::{CompareOp, Field, FieldRef},
    value::{FieldValue, Value},
};
use std::{
    fmt,
    marker::PhantomData,
    ops::{BitAnd, BitOr, Not},
};

///
/// Expr
///
/// Untyped predicate tree. Built through [`Predicate`] combinators rather
/// than parsed, then compiled into a [`FilterNode`](super::FilterNode).
///

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Compare {
        field: FieldRef,
        op: CompareOp,
        value: Value,
    },
    Within {
        field: FieldRef,
        values: Vec<Value>,
    },
    /// A field referenced alone, with no comparison.
    Field(FieldRef),
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { field, op, value } => write!(f, "{field} {} {value}", op.symbol()),
            Self::Within { field, values } => {
                write!(f, "{field} within {}", Value::List(values.clone()))
            }
            Self::Field(field) => write!(f, "{field}"),
            Self::And(children) => write_joined(f, children, " && "),
            Self::Or(children) => write_joined(f, children, " || "),
            Self::Not(inner) => write!(f, "!({inner})"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[Expr], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{child}")?;
    }
    write!(f, ")")
}

///
/// Predicate
///
/// Boolean predicate over model `M`.
///

pub struct Predicate<M> {
    expr: Expr,
    _marker: PhantomData<fn(&M)>,
}

impl<M> Predicate<M> {
    #[must_use]
    pub const fn from_expr(expr: Expr) -> Self {
        Self {
            expr,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    #[must_use]
    pub fn into_expr(self) -> Expr {
        self.expr
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::from_expr(Expr::And(vec![self.expr, other.expr]))
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::from_expr(Expr::Or(vec![self.expr, other.expr]))
    }

    /// Append a further restriction, keeping this filter's clauses first.
    #[must_use]
    pub fn and_filtered_on(self, other: Self) -> Self {
        self.and(other)
    }

    /// Append a membership restriction on `field`.
    #[must_use]
    pub fn and_value_within<V, I>(self, field: &Field<M, V>, values: I) -> Self
    where
        V: FieldValue,
        I: IntoIterator,
        I::Item: Into<V>,
    {
        self.and(field.within(values))
    }
}

impl<M> Clone for Predicate<M> {
    fn clone(&self) -> Self {
        Self::from_expr(self.expr.clone())
    }
}

impl<M> fmt::Debug for Predicate<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.expr).finish()
    }
}

impl<M> fmt::Display for Predicate<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.expr.fmt(f)
    }
}

impl<M> PartialEq for Predicate<M> {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl<M> BitAnd for Predicate<M> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl<M> BitOr for Predicate<M> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl<M> Not for Predicate<M> {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::from_expr(Expr::Not(Box::new(self.expr)))
    }
}

impl<M> From<Field<M, bool>> for Predicate<M> {
    fn from(field: Field<M, bool>) -> Self {
        field.is_true()
    }
}

impl<M> From<&Field<M, bool>> for Predicate<M> {
    fn from(field: &Field<M, bool>) -> Self {
        field.is_true()
    }
}
