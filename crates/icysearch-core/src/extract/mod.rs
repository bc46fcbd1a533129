//! Result extractor: typed reads out of a decoded response.
//!
//! Every lookup re-derives the aggregation name from the same field and
//! filter that built the request, so build and read sides cannot drift.

mod aggregates;
mod key;


pub use aggregates::{Distinct, lookup_name};
pub use key::FromBucketKey;
