use crate::{
    error::QueryError,
    filter::{Expr, Predicate},
    value::{FieldValue, ValueKind},
};
use std::{borrow::Cow, fmt, marker::PhantomData};

///
/// Field
///
/// Typed accessor for one field of model `M` whose value type is `V`.
/// Declared once per model, usually as an associated constant:
///
/// ```ignore
/// impl User {
///     pub const AGE: Field<Self, i32> = Field::new("age");
/// }
/// ```
///
/// Text fields are analyzed (lower-cased by the backend) unless declared
/// with [`Field::keyword`].
///

pub struct Field<M, V> {
    path: Cow<'static, str>,
    analyzed: bool,
    _marker: PhantomData<fn(&M) -> V>,
}

impl<M, V> Field<M, V> {
    #[must_use]
    pub const fn new(path: &'static str) -> Self {
        Self {
            path: Cow::Borrowed(path),
            analyzed: true,
            _marker: PhantomData,
        }
    }

    /// Declare a non-analyzed field; text literals keep their exact case.
    #[must_use]
    pub const fn keyword(path: &'static str) -> Self {
        Self {
            path: Cow::Borrowed(path),
            analyzed: false,
            _marker: PhantomData,
        }
    }

    /// Chain through a nested property: `User::ADDRESS.nested(Address::CITY)`
    /// addresses `address.city` on `User`.
    #[must_use]
    pub fn nested<W>(&self, child: Field<V, W>) -> Field<M, W> {
        Field {
            path: Cow::Owned(format!("{}.{}", self.path, child.path)),
            analyzed: child.analyzed,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn is_analyzed(&self) -> bool {
        self.analyzed
    }
}

impl<M, V: FieldValue> Field<M, V> {
    /// Erase the model and value types, keeping what the compiler needs.
    #[must_use]
    pub fn to_ref(&self) -> FieldRef {
        FieldRef {
            path: self.path.to_string(),
            kind: V::kind(),
            analyzed: self.analyzed,
        }
    }

    #[must_use]
    pub fn eq(&self, value: impl Into<V>) -> Predicate<M> {
        self.compare(CompareOp::Eq, value.into())
    }

    #[must_use]
    pub fn ne(&self, value: impl Into<V>) -> Predicate<M> {
        self.compare(CompareOp::Ne, value.into())
    }

    #[must_use]
    pub fn gt(&self, value: impl Into<V>) -> Predicate<M> {
        self.compare(CompareOp::Gt, value.into())
    }

    #[must_use]
    pub fn gte(&self, value: impl Into<V>) -> Predicate<M> {
        self.compare(CompareOp::Gte, value.into())
    }

    #[must_use]
    pub fn lt(&self, value: impl Into<V>) -> Predicate<M> {
        self.compare(CompareOp::Lt, value.into())
    }

    #[must_use]
    pub fn lte(&self, value: impl Into<V>) -> Predicate<M> {
        self.compare(CompareOp::Lte, value.into())
    }

    /// Membership against an explicit value set.
    #[must_use]
    pub fn within<I>(&self, values: I) -> Predicate<M>
    where
        I: IntoIterator,
        I::Item: Into<V>,
    {
        Predicate::from_expr(Expr::Within {
            field: self.to_ref(),
            values: values
                .into_iter()
                .map(|v| Into::<V>::into(v).to_value())
                .collect(),
        })
    }

    fn compare(&self, op: CompareOp, value: V) -> Predicate<M> {
        Predicate::from_expr(Expr::Compare {
            field: self.to_ref(),
            op,
            value: value.to_value(),
        })
    }
}

impl<M> Field<M, bool> {
    /// Reference the boolean field alone; compiles to `field == true`.
    #[must_use]
    pub fn is_true(&self) -> Predicate<M> {
        Predicate::from_expr(Expr::Field(self.to_ref()))
    }
}

impl<M> Field<M, Option<bool>> {
    #[must_use]
    pub fn is_true(&self) -> Predicate<M> {
        Predicate::from_expr(Expr::Field(self.to_ref()))
    }
}

impl<M, V> Clone for Field<M, V> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            analyzed: self.analyzed,
            _marker: PhantomData,
        }
    }
}

impl<M, V> fmt::Debug for Field<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("path", &self.path)
            .field("analyzed", &self.analyzed)
            .finish()
    }
}

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum CompareOp {
    Eq = 0x01,
    Ne = 0x02,
    Lt = 0x03,
    Lte = 0x04,
    Gt = 0x05,
    Gte = 0x06,
}

impl CompareOp {
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn is_range(self) -> bool {
        matches!(self, Self::Lt | Self::Lte | Self::Gt | Self::Gte)
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }
}

///
/// FieldRef
///
/// Type-erased field reference: resolved path plus inferred value kind.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FieldRef {
    pub path: String,
    pub kind: ValueKind,
    pub analyzed: bool,
}

impl FieldRef {
    /// Validate the path as a chain of simple accessors and return it.
    pub fn resolve_path(&self) -> Result<&str, QueryError> {
        validate_path(&self.path)?;

        Ok(&self.path)
    }

    /// Whether text literals compared against this field are lower-cased.
    #[must_use]
    pub const fn lowers_text(&self) -> bool {
        self.analyzed && matches!(self.kind, ValueKind::Text | ValueKind::Enum)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// A path is one or more dot-separated identifiers.
pub fn validate_path(path: &str) -> Result<(), QueryError> {
    if path.is_empty() {
        return Err(QueryError::unsupported(path, "empty field path"));
    }

    for segment in path.split('.') {
        if !is_identifier(segment) {
            return Err(QueryError::unsupported(
                path,
                format!("segment '{segment}' is not a simple field accessor"),
            ));
        }
    }

    Ok(())
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Lower-case the first character, matching backend field naming.
#[must_use]
pub fn first_char_lower(name: &str) -> String {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
