use crate::{
    agg::builder::{LeafKind, SortOrder},
    filter::FilterNode,
    name::{AggKind, AggName},
};

///
/// ScopedFilter
///
/// Filter aggregation that restricts a leaf to matching documents.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ScopedFilter {
    pub name: AggName,
    pub node: FilterNode,
}

///
/// GroupByNode
///

#[derive(Clone, Debug, PartialEq)]
pub struct GroupByNode {
    pub name: AggName,
    pub field: String,
    pub size: u32,
    pub inner: Vec<AggregationRequest>,
}

///
/// LeafAggNode
///

#[derive(Clone, Debug, PartialEq)]
pub struct LeafAggNode {
    pub name: AggName,
    pub kind: LeafKind,
    pub field: String,
    pub filter: Option<ScopedFilter>,

    /// Requested percents (percentile kind only).
    pub percents: Vec<f64>,

    /// Bucket count (distinct kind only).
    pub size: Option<u32>,

    /// Ordering of the top hit (first-by kind only).
    pub order: Option<(String, SortOrder)>,
}

impl LeafAggNode {
    /// Name this leaf is registered under at its own level.
    #[must_use]
    pub fn outer_name(&self) -> &AggName {
        self.filter.as_ref().map_or(&self.name, |scope| &scope.name)
    }
}

///
/// AggregationRequest
///
/// Lowered aggregation tree: names resolved, filters compiled.
///

#[derive(Clone, Debug, PartialEq)]
pub enum AggregationRequest {
    GroupBy(GroupByNode),
    Leaf(LeafAggNode),
}

impl AggregationRequest {
    #[must_use]
    pub fn outer_name(&self) -> &AggName {
        match self {
            Self::GroupBy(node) => &node.name,
            Self::Leaf(leaf) => leaf.outer_name(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> AggKind {
        match self {
            Self::GroupBy(_) => AggKind::GroupBy,
            Self::Leaf(leaf) => leaf.kind.agg_kind(),
        }
    }

    #[must_use]
    pub const fn as_group_by(&self) -> Option<&GroupByNode> {
        match self {
            Self::GroupBy(node) => Some(node),
            Self::Leaf(_) => None,
        }
    }

    #[must_use]
    pub const fn as_leaf(&self) -> Option<&LeafAggNode> {
        match self {
            Self::GroupBy(_) => None,
            Self::Leaf(leaf) => Some(leaf),
        }
    }

    /// Total node count, counting this node.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::GroupBy(node) => 1 + node.inner.iter().map(Self::node_count).sum::<usize>(),
            Self::Leaf(_) => 1,
        }
    }
}
