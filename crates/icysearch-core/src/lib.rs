//! Core of IcySearch: typed field accessors, the filter compiler, the
//! aggregation builder, deterministic aggregation naming, and typed
//! extraction from backend responses.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod agg;
pub mod compiler;
pub mod config;
pub mod dsl;
pub mod error;
pub mod extract;
pub mod facade;
pub mod field;
pub mod filter;
pub mod name;
pub mod obs;
pub mod response;
pub mod search;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use compiler::Compiler;
pub use error::{ErrorClass, QueryError};

///
/// Prelude
///
/// Vocabulary needed to declare models, build searches and read results.
/// Compiler internals, DSL rendering and response decoding stay out.
///

pub mod prelude {
    pub use crate::{
        agg::{Aggregations, SortOrder, group_by, group_by_keys},
        compiler::Compiler,
        config::SearchConfig,
        error::QueryError,
        extract::FromBucketKey,
        facade::AggsContainer,
        field::Field,
        filter::Predicate,
        impl_enum_value,
        response::{Aggregates, KeyedBucket},
        search::SearchRequest,
        value::{EnumValue, FieldValue},
    };
}
