//! ## Crate layout
//! - `core`: field accessors, filter compiler, aggregation builder, naming,
//!   response decoding, and typed extraction.
//!
//! The `prelude` module carries everything needed to declare a model,
//! build a search, and read its aggregations back.

pub use icysearch_core as core;

/// re-exports
///
/// model declarations use these, stops the user having to specify all the
/// dependencies in the Cargo.toml file manually
pub mod __reexports {
    pub use chrono;
    pub use num_traits;
    pub use serde_json;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Macros
//

pub use icysearch_core::impl_enum_value;

pub use icysearch_core::{Compiler, ErrorClass, QueryError};

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::prelude::*;
    pub use chrono::{DateTime, Utc};
}
