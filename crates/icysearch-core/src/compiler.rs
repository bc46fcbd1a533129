use crate::{
    agg::{AggregationRequest, Aggregations, lower},
    config::SearchConfig,
    dsl,
    error::QueryError,
    filter::{FilterNode, Predicate, compile},
    obs::{QueryTraceEvent, QueryTraceSink, Tracer},
    response::{self, Aggregates},
    search::SearchRequest,
};
use serde_json::{Map, Value as JsonValue, json};

///
/// Compiler
///
/// Turns typed requests into backend request bodies and backend response
/// bodies into [`Aggregates`]. Holds only configuration and an optional
/// trace sink, so one instance can serve any number of threads.
///

#[derive(Clone, Debug, Default)]
pub struct Compiler<'s> {
    config: SearchConfig,
    tracer: Tracer<'s>,
}

impl Compiler<'static> {
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            tracer: Tracer::new(None),
        }
    }
}

impl Compiler<'_> {
    #[must_use]
    pub fn with_trace<'t>(self, sink: &'t dyn QueryTraceSink) -> Compiler<'t> {
        Compiler {
            config: self.config,
            tracer: Tracer::new(Some(sink)),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Compile a predicate into a filter tree.
    pub fn compile<M>(&self, predicate: &Predicate<M>) -> Result<FilterNode, QueryError> {
        let node = compile(predicate)?;

        if self.tracer.is_enabled() {
            self.tracer.emit(QueryTraceEvent::FilterCompiled {
                fingerprint: node.fingerprint(),
                leaves: saturating_u32(node.leaf_count()),
                depth: saturating_u32(node.depth()),
            });
        }

        Ok(node)
    }

    /// Lower aggregations into a named request tree.
    pub fn lower<M>(
        &self,
        aggregations: &Aggregations<M>,
    ) -> Result<Vec<AggregationRequest>, QueryError> {
        let requests = lower(aggregations.specs(), &self.config)?;

        self.tracer.emit(QueryTraceEvent::AggregationsLowered {
            nodes: saturating_u32(requests.iter().map(AggregationRequest::node_count).sum()),
        });

        Ok(requests)
    }

    /// Render the full backend request body.
    pub fn search_body<M>(&self, request: &SearchRequest<M>) -> Result<JsonValue, QueryError> {
        let mut body = Map::new();

        if let Some(predicate) = request.filter() {
            let node = self.compile(predicate)?;
            body.insert(
                "query".to_string(),
                json!({ "bool": { "filter": [dsl::filter_dsl(&node)] } }),
            );
        }

        if !request.aggs().is_empty() {
            let requests = self.lower(request.aggs())?;
            body.insert("aggs".to_string(), dsl::aggregations_dsl(&requests));
        }

        if let Some(size) = request.hit_size() {
            body.insert("size".to_string(), json!(size));
        }

        Ok(JsonValue::Object(body))
    }

    /// Decode a full backend response body for `request`.
    pub fn decode_response<M>(
        &self,
        request: &SearchRequest<M>,
        body: &JsonValue,
    ) -> Result<Aggregates, QueryError> {
        let requests = self.lower(request.aggs())?;
        let aggregates = response::decode_response(&requests, body)?;
        self.trace_decoded(&aggregates);

        Ok(aggregates)
    }

    /// Decode the backend's `aggregations` object for `aggregations`.
    pub fn decode_aggregations<M>(
        &self,
        aggregations: &Aggregations<M>,
        aggs: &JsonValue,
    ) -> Result<Aggregates, QueryError> {
        let requests = self.lower(aggregations)?;
        let aggregates = response::decode_aggregations(&requests, aggs)?;
        self.trace_decoded(&aggregates);

        Ok(aggregates)
    }

    fn trace_decoded(&self, aggregates: &Aggregates) {
        self.tracer.emit(QueryTraceEvent::Decoded {
            aggregates: saturating_u32(aggregates.len()),
        });
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
