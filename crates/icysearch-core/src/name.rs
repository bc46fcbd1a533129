//! Deterministic aggregation naming.
//!
//! The same function names an aggregation when the request is built and
//! when its result is looked up, so both sides agree without any registry.

use crate::{
    error::QueryError,
    field::{Field, FieldRef, validate_path},
    filter::FilterFingerprint,
    value::FieldValue,
};
use derive_more::{Deref, Display};

///
/// AggKind
///
/// Namespaces derived names so two kinds over one field never collide.
/// Tags are lower-case, underscore-free and prefix-free.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[remain::sorted]
pub enum AggKind {
    Average,
    Cardinality,
    Count,
    Distinct,
    Filter,
    FirstBy,
    GroupBy,
    Max,
    Min,
    Percentile,
    Stats,
    Sum,
}

impl AggKind {
    pub const ALL: [Self; 12] = [
        Self::Average,
        Self::Cardinality,
        Self::Count,
        Self::Distinct,
        Self::Filter,
        Self::FirstBy,
        Self::GroupBy,
        Self::Max,
        Self::Min,
        Self::Percentile,
        Self::Stats,
        Self::Sum,
    ];

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Average => "avg",
            Self::Cardinality => "cardinality",
            Self::Count => "count",
            Self::Distinct => "distinct",
            Self::Filter => "filter",
            Self::FirstBy => "firstby",
            Self::GroupBy => "groupby",
            Self::Max => "max",
            Self::Min => "min",
            Self::Percentile => "percentiles",
            Self::Stats => "stats",
            Self::Sum => "sum",
        }
    }

    /// Kinds answered by a terms aggregation (bucketed response).
    #[must_use]
    pub const fn is_bucketing(self) -> bool {
        matches!(self, Self::GroupBy | Self::Distinct)
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

///
/// AggName
///
/// Derived aggregation key, `{kind}_{path}`.
///

#[derive(Clone, Debug, Deref, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AggName(String);

impl AggName {
    /// Wrap a caller-supplied key verbatim (raw-key group-bys).
    #[must_use]
    pub fn raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a derived name back into `(kind, path)`.
    #[must_use]
    pub fn split(&self) -> Option<(AggKind, &str)> {
        let (tag, rest) = self.0.split_once('_')?;

        AggKind::from_tag(tag).map(|kind| (kind, rest))
    }
}

impl AsRef<str> for AggName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the name for `kind` over a type-erased field.
pub fn resolve_ref(field: &FieldRef, kind: AggKind) -> Result<AggName, QueryError> {
    let path = field.resolve_path()?;

    Ok(derive(kind, path))
}

/// Derive the name for `kind` over a typed field accessor.
pub fn resolve<M, V: FieldValue>(field: &Field<M, V>, kind: AggKind) -> Result<AggName, QueryError> {
    validate_path(field.path())?;

    Ok(derive(kind, field.path()))
}

/// Name of the filter aggregation that scopes `inner` to a filter.
#[must_use]
pub fn filter_scope(inner: &AggName, fingerprint: &FilterFingerprint) -> AggName {
    AggName(format!(
        "{}_{}_{}",
        AggKind::Filter.tag(),
        inner.as_str(),
        fingerprint.short_hex()
    ))
}

fn derive(kind: AggKind, path: &str) -> AggName {
    AggName(format!("{}_{path}", kind.tag()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        field::FieldRef,
        test_fixtures::{Address, Car, User},
        value::ValueKind,
    };
    use proptest::prelude::*;

    fn field_ref(path: &str) -> FieldRef {
        FieldRef {
            path: path.to_string(),
            kind: ValueKind::Int,
            analyzed: true,
        }
    }

    #[test]
    fn typed_and_erased_resolution_agree() {
        assert_eq!(
            resolve(&Car::ENGINE_SIZE, AggKind::Max).unwrap(),
            resolve_ref(&Car::ENGINE_SIZE.to_ref(), AggKind::Max).unwrap()
        );
        assert_eq!(
            resolve(&User::ADDRESS.nested(Address::CITY), AggKind::Distinct)
                .unwrap()
                .as_str(),
            "distinct_address.city"
        );
    }

    #[test]
    fn computed_paths_are_rejected() {
        for path in ["", "a..b", "len()", "1st", "a b", "a.b-c"] {
            let err = resolve_ref(&field_ref(path), AggKind::Sum).unwrap_err();
            assert!(matches!(err, QueryError::UnsupportedExpression { .. }), "{path}");
        }
    }

    #[test]
    fn tags_are_unique_and_round_trip() {
        for kind in AggKind::ALL {
            assert!(!kind.tag().contains('_'));
            assert_eq!(AggKind::from_tag(kind.tag()), Some(kind));
        }
        assert!(AggKind::Distinct.is_bucketing());
        assert!(!AggKind::Sum.is_bucketing());
    }

    #[test]
    fn raw_names_do_not_split() {
        assert_eq!(AggName::raw("carType").split(), None);
    }

    fn path_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-zA-Z_][a-zA-Z0-9_]{0,8}", 1..4).prop_map(|s| s.join("."))
    }

    proptest! {
        #[test]
        fn distinct_kinds_never_collide(path in path_strategy(), a in 0..12_usize, b in 0..12_usize) {
            prop_assume!(a != b);
            let field = field_ref(&path);

            prop_assert_ne!(
                resolve_ref(&field, AggKind::ALL[a]).unwrap(),
                resolve_ref(&field, AggKind::ALL[b]).unwrap()
            );
        }

        #[test]
        fn resolution_is_stable_and_splits_back(path in path_strategy(), k in 0..12_usize) {
            let field = field_ref(&path);
            let kind = AggKind::ALL[k];
            let first = resolve_ref(&field, kind).unwrap();

            prop_assert_eq!(&first, &resolve_ref(&field, kind).unwrap());
            prop_assert_eq!(first.split(), Some((kind, path.as_str())));
        }
    }
}
