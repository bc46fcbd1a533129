//! Aggregation builder: typed specs, lowering, and the lowered request tree.

mod builder;
mod lower;
mod request;


pub use builder::{
    AggSpec, Aggregations, GroupTarget, LeafKind, LeafSpec, SortOrder, group_by, group_by_keys,
};
pub use lower::{lower, validate_names};
pub use request::{AggregationRequest, GroupByNode, LeafAggNode, ScopedFilter};
