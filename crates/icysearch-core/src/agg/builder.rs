use crate::{
    field::{Field, FieldRef, first_char_lower},
    filter::{Expr, Predicate},
    name::AggKind,
    value::FieldValue,
};
use std::{fmt, marker::PhantomData};

///
/// SortOrder
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

///
/// LeafKind
///
/// Aggregation kinds that can sit at a leaf. Bucketing by group-by and
/// filter scoping are structural and never leaves.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum LeafKind {
    Average,
    Cardinality,
    Count,
    Distinct,
    FirstBy,
    Max,
    Min,
    Percentile,
    Stats,
    Sum,
}

impl LeafKind {
    /// Naming namespace of this leaf kind.
    #[must_use]
    pub const fn agg_kind(self) -> AggKind {
        match self {
            Self::Average => AggKind::Average,
            Self::Cardinality => AggKind::Cardinality,
            Self::Count => AggKind::Count,
            Self::Distinct => AggKind::Distinct,
            Self::FirstBy => AggKind::FirstBy,
            Self::Max => AggKind::Max,
            Self::Min => AggKind::Min,
            Self::Percentile => AggKind::Percentile,
            Self::Stats => AggKind::Stats,
            Self::Sum => AggKind::Sum,
        }
    }
}

///
/// GroupTarget
///

#[derive(Clone, Debug, PartialEq)]
pub enum GroupTarget {
    /// Typed field; named `groupby_{path}`.
    Field(FieldRef),

    /// Caller-supplied key, used as both field and aggregation name.
    Key(String),
}

///
/// LeafSpec
///
/// Unlowered leaf aggregation. The optional filter stays an expression
/// until the compiler lowers the request.
///

#[derive(Clone, Debug, PartialEq)]
pub struct LeafSpec {
    pub kind: LeafKind,
    pub field: FieldRef,
    pub filter: Option<Expr>,
    pub percents: Vec<f64>,
    pub order: Option<(FieldRef, SortOrder)>,
}

///
/// AggSpec
///

#[derive(Clone, Debug, PartialEq)]
pub enum AggSpec {
    GroupBy {
        target: GroupTarget,
        inner: Vec<Self>,
    },
    Leaf(LeafSpec),
}

///
/// Aggregations
///
/// Ordered, typed aggregation container for model `M`. Leaf builders append
/// a sibling; `group_by*` wraps everything built so far as the inner
/// aggregations of a new bucketing level.
///

pub struct Aggregations<M> {
    specs: Vec<AggSpec>,
    _marker: PhantomData<fn(&M)>,
}

impl<M> Aggregations<M> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            specs: Vec::new(),
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn specs(&self) -> &[AggSpec] {
        &self.specs
    }

    #[must_use]
    pub fn into_specs(self) -> Vec<AggSpec> {
        self.specs
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.specs.len()
    }

    /// Append the aggregations of `other` after this container's own.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.specs.extend(other.specs);
        self
    }

    //
    // Leaf aggregations
    //

    #[must_use]
    pub fn sum<V: FieldValue>(self, field: &Field<M, V>, filter: Option<Predicate<M>>) -> Self {
        self.leaf(LeafKind::Sum, field, filter)
    }

    #[must_use]
    pub fn average<V: FieldValue>(self, field: &Field<M, V>, filter: Option<Predicate<M>>) -> Self {
        self.leaf(LeafKind::Average, field, filter)
    }

    #[must_use]
    pub fn min<V: FieldValue>(self, field: &Field<M, V>, filter: Option<Predicate<M>>) -> Self {
        self.leaf(LeafKind::Min, field, filter)
    }

    #[must_use]
    pub fn max<V: FieldValue>(self, field: &Field<M, V>, filter: Option<Predicate<M>>) -> Self {
        self.leaf(LeafKind::Max, field, filter)
    }

    #[must_use]
    pub fn count<V: FieldValue>(self, field: &Field<M, V>, filter: Option<Predicate<M>>) -> Self {
        self.leaf(LeafKind::Count, field, filter)
    }

    #[must_use]
    pub fn cardinality<V: FieldValue>(
        self,
        field: &Field<M, V>,
        filter: Option<Predicate<M>>,
    ) -> Self {
        self.leaf(LeafKind::Cardinality, field, filter)
    }

    #[must_use]
    pub fn distinct<V: FieldValue>(
        self,
        field: &Field<M, V>,
        filter: Option<Predicate<M>>,
    ) -> Self {
        self.leaf(LeafKind::Distinct, field, filter)
    }

    #[must_use]
    pub fn stats<V: FieldValue>(self, field: &Field<M, V>, filter: Option<Predicate<M>>) -> Self {
        self.leaf(LeafKind::Stats, field, filter)
    }

    /// Percentiles at the configured default percents.
    #[must_use]
    pub fn percentiles<V: FieldValue>(
        self,
        field: &Field<M, V>,
        filter: Option<Predicate<M>>,
    ) -> Self {
        self.leaf(LeafKind::Percentile, field, filter)
    }

    #[must_use]
    pub fn percentiles_at<V: FieldValue>(
        self,
        field: &Field<M, V>,
        percents: &[f64],
        filter: Option<Predicate<M>>,
    ) -> Self {
        self.push_leaf(LeafSpec {
            percents: percents.to_vec(),
            ..leaf_spec(LeafKind::Percentile, field, filter)
        })
    }

    /// Top-1 document's value of `field`.
    #[must_use]
    pub fn first_by<V: FieldValue>(
        self,
        field: &Field<M, V>,
        filter: Option<Predicate<M>>,
    ) -> Self {
        self.leaf(LeafKind::FirstBy, field, filter)
    }

    /// Top-1 document's value of `field` under an explicit ordering.
    #[must_use]
    pub fn first_by_ordered<V: FieldValue, W: FieldValue>(
        self,
        field: &Field<M, V>,
        order_by: &Field<M, W>,
        order: SortOrder,
        filter: Option<Predicate<M>>,
    ) -> Self {
        self.push_leaf(LeafSpec {
            order: Some((order_by.to_ref(), order)),
            ..leaf_spec(LeafKind::FirstBy, field, filter)
        })
    }

    //
    // Bucketing
    //

    /// Bucket by `field`, nesting everything built so far.
    #[must_use]
    pub fn group_by<V: FieldValue>(self, field: &Field<M, V>) -> Self {
        self.wrap(GroupTarget::Field(field.to_ref()))
    }

    /// Bucket by a raw field key, nesting everything built so far.
    #[must_use]
    pub fn group_by_key(self, key: impl Into<String>) -> Self {
        self.wrap(GroupTarget::Key(key.into()))
    }

    /// Drill down through several keys: the first key becomes the outermost
    /// bucket level and the last wraps this container directly.
    #[must_use]
    pub fn group_by_keys<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lowered: Vec<String> = keys
            .into_iter()
            .map(|key| first_char_lower(key.as_ref()))
            .collect();
        lowered.reverse();

        lowered
            .into_iter()
            .fold(self, |acc, key| acc.group_by_key(key))
    }

    fn wrap(self, target: GroupTarget) -> Self {
        Self {
            specs: vec![AggSpec::GroupBy {
                target,
                inner: self.specs,
            }],
            _marker: PhantomData,
        }
    }

    fn leaf<V: FieldValue>(
        self,
        kind: LeafKind,
        field: &Field<M, V>,
        filter: Option<Predicate<M>>,
    ) -> Self {
        self.push_leaf(leaf_spec(kind, field, filter))
    }

    fn push_leaf(mut self, spec: LeafSpec) -> Self {
        self.specs.push(AggSpec::Leaf(spec));
        self
    }
}

fn leaf_spec<M, V: FieldValue>(
    kind: LeafKind,
    field: &Field<M, V>,
    filter: Option<Predicate<M>>,
) -> LeafSpec {
    LeafSpec {
        kind,
        field: field.to_ref(),
        filter: filter.map(Predicate::into_expr),
        percents: Vec::new(),
        order: None,
    }
}

/// Bucket by `field` with `inner` nested under every bucket.
#[must_use]
pub fn group_by<M, V: FieldValue>(field: &Field<M, V>, inner: Aggregations<M>) -> Aggregations<M> {
    inner.group_by(field)
}

/// Nested single-field group-bys, `keys[0]` outermost, `inner` deepest.
#[must_use]
pub fn group_by_keys<M, I, S>(keys: I, inner: Aggregations<M>) -> Aggregations<M>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    inner.group_by_keys(keys)
}

impl<M> Default for Aggregations<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for Aggregations<M> {
    fn clone(&self) -> Self {
        Self {
            specs: self.specs.clone(),
            _marker: PhantomData,
        }
    }
}

impl<M> fmt::Debug for Aggregations<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.specs).finish()
    }
}
