//! Filter compiler: typed predicates in, backend filter trees out.

mod ast;
mod compile;
mod fingerprint;
mod node;

#[cfg(test)]
mod tests;

pub use ast::{Expr, Predicate};
pub use compile::{compile, compile_expr, value_within};
pub use fingerprint::FilterFingerprint;
pub use node::{Combinator, FilterLeaf, FilterNode, FilterOp, and, or};
