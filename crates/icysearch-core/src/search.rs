use crate::{
    agg::Aggregations,
    field::Field,
    filter::Predicate,
    value::FieldValue,
};
use std::fmt;

///
/// SearchRequest
///
/// Typed search over model `M`: an optional filter, the aggregations to
/// compute, and the number of hits to return.
///

pub struct SearchRequest<M> {
    filter: Option<Predicate<M>>,
    aggregations: Aggregations<M>,
    size: Option<u32>,
}

impl<M> SearchRequest<M> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            filter: None,
            aggregations: Aggregations::new(),
            size: None,
        }
    }

    /// AND `predicate` onto the current filter.
    #[must_use]
    pub fn filtered_on(mut self, predicate: Predicate<M>) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(current) => current.and_filtered_on(predicate),
            None => predicate,
        });
        self
    }

    /// AND a membership test onto the current filter.
    #[must_use]
    pub fn and_value_within<V, I>(mut self, field: &Field<M, V>, values: I) -> Self
    where
        V: FieldValue,
        I: IntoIterator,
        I::Item: Into<V>,
    {
        self.filter = Some(match self.filter.take() {
            Some(current) => current.and_value_within(field, values),
            None => field.within(values),
        });
        self
    }

    /// Append aggregations after any already requested.
    #[must_use]
    pub fn aggregations(mut self, aggregations: Aggregations<M>) -> Self {
        self.aggregations = self.aggregations.merge(aggregations);
        self
    }

    /// Number of hits to return alongside the aggregations.
    #[must_use]
    pub const fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub const fn filter(&self) -> Option<&Predicate<M>> {
        self.filter.as_ref()
    }

    #[must_use]
    pub const fn aggs(&self) -> &Aggregations<M> {
        &self.aggregations
    }

    #[must_use]
    pub const fn hit_size(&self) -> Option<u32> {
        self.size
    }
}

impl<M> Default for SearchRequest<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for SearchRequest<M> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            aggregations: self.aggregations.clone(),
            size: self.size,
        }
    }
}

impl<M> fmt::Debug for SearchRequest<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchRequest")
            .field("filter", &self.filter)
            .field("aggregations", &self.aggregations)
            .field("size", &self.size)
            .finish()
    }
}
