//! Observability: caller-injected trace sinks.
//!
//! Nothing here holds global state; a sink only sees events when the
//! caller hands one to a [`Compiler`](crate::Compiler) or an
//! [`AggsContainer`](crate::facade::AggsContainer).

mod trace;


pub(crate) use trace::Tracer;
pub use trace::{QueryTraceEvent, QueryTraceSink};
