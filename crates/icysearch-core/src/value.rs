use chrono::{DateTime, Utc};
use std::fmt;

///
/// Value
///
/// Literal operand carried by a compiled filter leaf.
/// `List` only appears as the operand of a membership (`within`) leaf.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    Enum(String),
    Timestamp(DateTime<Utc>),
    List(Vec<Self>),
}

impl Value {
    /// Lower-case text-like literals the way the backend lowers analyzed text.
    /// Dates and numbers are returned untouched.
    #[must_use]
    pub fn lowered(self) -> Self {
        match self {
            Self::Text(text) => Self::Text(text.to_lowercase()),
            Self::Enum(text) => Self::Enum(text.to_lowercase()),
            Self::List(items) => Self::List(items.into_iter().map(Self::lowered).collect()),
            other => other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) | Self::Enum(v) => write!(f, "\"{v}\""),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

///
/// ValueKind
///
/// Value-type classification inferred from a field's Rust type.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueKind {
    Bool,
    Int,
    Uint,
    Float,
    Text,
    Enum,
    Timestamp,
}

impl ValueKind {
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Uint | Self::Float)
    }

    #[must_use]
    pub const fn is_ordered(self) -> bool {
        !matches!(self, Self::Bool)
    }
}

///
/// FieldValue
///
/// Conversion boundary for Rust types that can be the value type of a
/// model field. Drives both literal conversion and value-type inference.
///

pub trait FieldValue {
    fn kind() -> ValueKind
    where
        Self: Sized;

    fn to_value(&self) -> Value;
}

impl FieldValue for String {
    fn kind() -> ValueKind {
        ValueKind::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FieldValue for DateTime<Utc> {
    fn kind() -> ValueKind {
        ValueKind::Timestamp
    }

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn kind() -> ValueKind {
        T::kind()
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

// impl_field_value
macro_rules! impl_field_value {
    ( $( $type:ty => $variant:ident as $kind:ident ),* $(,)? ) => {
        $(
            impl FieldValue for $type {
                fn kind() -> ValueKind {
                    ValueKind::$kind
                }

                fn to_value(&self) -> Value {
                    Value::$variant((*self).into())
                }
            }
        )*
    };
}

impl_field_value!(
    i8 => Int as Int,
    i16 => Int as Int,
    i32 => Int as Int,
    i64 => Int as Int,
    u8 => Uint as Uint,
    u16 => Uint as Uint,
    u32 => Uint as Uint,
    u64 => Uint as Uint,
    f32 => Float as Float,
    f64 => Float as Float,
    bool => Bool as Bool,
);

///
/// EnumValue
///
/// Enumerated field types. Variant names are the textual form stored in
/// the backend and matched case-insensitively when read back.
///

pub trait EnumValue: Copy + Sized + 'static {
    const VARIANTS: &'static [Self];

    fn variant_name(self) -> &'static str;

    #[must_use]
    fn parse_variant(text: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.variant_name().eq_ignore_ascii_case(text))
    }
}

/// Implement [`EnumValue`], [`FieldValue`] and `FromBucketKey` for a
/// fieldless enum by listing its variants.
#[macro_export]
macro_rules! impl_enum_value {
    ($type:ident { $( $variant:ident ),+ $(,)? }) => {
        impl $crate::value::EnumValue for $type {
            const VARIANTS: &'static [Self] = &[ $( Self::$variant ),+ ];

            fn variant_name(self) -> &'static str {
                match self {
                    $( Self::$variant => stringify!($variant), )+
                }
            }
        }

        impl $crate::value::FieldValue for $type {
            fn kind() -> $crate::value::ValueKind {
                $crate::value::ValueKind::Enum
            }

            fn to_value(&self) -> $crate::value::Value {
                $crate::value::Value::Enum(
                    $crate::value::EnumValue::variant_name(*self).to_string(),
                )
            }
        }

        impl $crate::extract::FromBucketKey for $type {
            fn from_bucket_key(key: &str) -> Option<Self> {
                <Self as $crate::value::EnumValue>::parse_variant(key)
            }
        }
    };
}
