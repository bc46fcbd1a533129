//! Query tracing boundary.
//!
//! Tracing is optional, injected by the caller, and must not affect
//! compilation or extraction semantics.

use crate::{
    error::{ErrorClass, QueryError},
    filter::FilterFingerprint,
    name::AggKind,
};

///
/// QueryTraceSink
///

pub trait QueryTraceSink: Send + Sync {
    fn on_event(&self, event: QueryTraceEvent<'_>);
}

///
/// QueryTraceEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryTraceEvent<'a> {
    FilterCompiled {
        fingerprint: FilterFingerprint,
        leaves: u32,
        depth: u32,
    },
    AggregationsLowered {
        nodes: u32,
    },
    Decoded {
        aggregates: u32,
    },
    Extracted {
        kind: AggKind,
        name: &'a str,
    },
    /// The aggregation was not in the response.
    ExtractionMissing {
        kind: AggKind,
        name: &'a str,
    },
    /// The aggregation was present but could not be read.
    ExtractionFailed {
        kind: AggKind,
        name: &'a str,
        class: ErrorClass,
    },
}

///
/// Tracer
///
/// Thin optional handle over a caller-supplied sink.
///

#[derive(Clone, Copy, Default)]
pub(crate) struct Tracer<'s> {
    sink: Option<&'s dyn QueryTraceSink>,
}

impl<'s> Tracer<'s> {
    pub(crate) const fn new(sink: Option<&'s dyn QueryTraceSink>) -> Self {
        Self { sink }
    }

    pub(crate) const fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub(crate) fn emit(&self, event: QueryTraceEvent<'_>) {
        if let Some(sink) = self.sink {
            sink.on_event(event);
        }
    }

    /// Report the outcome of a named extraction and pass the result through.
    pub(crate) fn extraction<T>(
        &self,
        kind: AggKind,
        name: &str,
        result: Result<T, QueryError>,
    ) -> Result<T, QueryError> {
        self.extraction_where(kind, name, result, |_| true)
    }

    /// As [`Self::extraction`], with `found` deciding whether an `Ok`
    /// value stands for a present aggregation.
    pub(crate) fn extraction_where<T>(
        &self,
        kind: AggKind,
        name: &str,
        result: Result<T, QueryError>,
        found: impl FnOnce(&T) -> bool,
    ) -> Result<T, QueryError> {
        if self.sink.is_some() {
            let event = match &result {
                Ok(value) if found(value) => QueryTraceEvent::Extracted { kind, name },
                Ok(_) => QueryTraceEvent::ExtractionMissing { kind, name },
                Err(err) if err.is_missing() => QueryTraceEvent::ExtractionMissing { kind, name },
                Err(err) => QueryTraceEvent::ExtractionFailed {
                    kind,
                    name,
                    class: err.class(),
                },
            };
            self.emit(event);
        }

        result
    }
}

impl std::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.sink.is_some())
            .finish()
    }
}
