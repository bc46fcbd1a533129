//! Model-bound extraction.
//!
//! [`AggsContainer`] fixes the model type once so call sites read
//! `aggs.sum(&Car::PRICE, None)` without restating it, and reports each
//! extraction to an optional trace sink.

use crate::{
    error::QueryError,
    extract::{Distinct, FromBucketKey, lookup_name},
    field::Field,
    filter::Predicate,
    name::{AggKind, AggName},
    obs::{QueryTraceSink, Tracer},
    response::{Aggregates, KeyedBucket, PercentileItem, Stats},
    value::FieldValue,
};
use num_traits::NumCast;
use serde::de::DeserializeOwned;
use std::{collections::HashMap, fmt, hash::Hash, marker::PhantomData};

///
/// AggsContainer
///

pub struct AggsContainer<'a, M> {
    aggregates: &'a Aggregates,
    tracer: Tracer<'a>,
    _marker: PhantomData<fn(&M)>,
}

impl<'a, M> AggsContainer<'a, M> {
    #[must_use]
    pub const fn new(aggregates: &'a Aggregates) -> Self {
        Self {
            aggregates,
            tracer: Tracer::new(None),
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn with_trace(mut self, sink: &'a dyn QueryTraceSink) -> Self {
        self.tracer = Tracer::new(Some(sink));
        self
    }

    #[must_use]
    pub const fn aggregates(&self) -> &'a Aggregates {
        self.aggregates
    }

    /// Bind the aggregations nested inside one bucket, keeping the sink.
    #[must_use]
    pub const fn bucket(&self, bucket: &'a KeyedBucket) -> Self {
        Self {
            aggregates: &bucket.aggregations,
            tracer: self.tracer,
            _marker: PhantomData,
        }
    }

    pub fn sum<K: NumCast, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<K, QueryError> {
        self.traced(AggKind::Sum, field, filter, self.aggregates.sum(field, filter))
    }

    pub fn average<K: NumCast, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<K, QueryError> {
        self.traced(
            AggKind::Average,
            field,
            filter,
            self.aggregates.average(field, filter),
        )
    }

    pub fn min<K: NumCast, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<K, QueryError> {
        self.traced(AggKind::Min, field, filter, self.aggregates.min(field, filter))
    }

    pub fn max<K: NumCast, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<K, QueryError> {
        self.traced(AggKind::Max, field, filter, self.aggregates.max(field, filter))
    }

    pub fn count<V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<Option<u64>, QueryError> {
        self.traced_where(
            AggKind::Count,
            field,
            filter,
            self.aggregates.count(field, filter),
            Option::is_some,
        )
    }

    pub fn cardinality<V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<u64, QueryError> {
        self.traced(
            AggKind::Cardinality,
            field,
            filter,
            self.aggregates.cardinality(field, filter),
        )
    }

    pub fn distinct<V: FieldValue + FromBucketKey>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<Distinct<'a, V>, QueryError> {
        self.traced(
            AggKind::Distinct,
            field,
            filter,
            self.aggregates.distinct(field, filter),
        )
    }

    pub fn percentiles<V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<&'a [PercentileItem], QueryError> {
        self.traced(
            AggKind::Percentile,
            field,
            filter,
            self.aggregates.percentiles(field, filter),
        )
    }

    pub fn stats<V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<&'a Stats, QueryError> {
        self.traced(
            AggKind::Stats,
            field,
            filter,
            self.aggregates.stats(field, filter),
        )
    }

    pub fn first_by<K: DeserializeOwned, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<Option<K>, QueryError> {
        self.traced(
            AggKind::FirstBy,
            field,
            filter,
            self.aggregates.first_by(field, filter),
        )
    }

    pub fn group_by<V: FieldValue>(
        &self,
        field: &Field<M, V>,
    ) -> Result<&'a [KeyedBucket], QueryError> {
        self.traced(AggKind::GroupBy, field, None, self.aggregates.group_by(field))
    }

    pub fn group_by_key(&self, key: &str) -> Result<&'a [KeyedBucket], QueryError> {
        let result = self.aggregates.group_by_key(key);

        self.tracer
            .extraction(AggKind::GroupBy, AggName::raw(key).as_str(), result)
    }

    pub fn group_by_map<V: FieldValue, K>(
        &self,
        field: &Field<M, V>,
        projector: impl FnMut(&KeyedBucket) -> K,
    ) -> Result<Vec<K>, QueryError> {
        self.traced(
            AggKind::GroupBy,
            field,
            None,
            self.aggregates.group_by_map(field, projector),
        )
    }

    pub fn dictionary<V>(
        &self,
        field: &Field<M, V>,
    ) -> Result<HashMap<V, &'a KeyedBucket>, QueryError>
    where
        V: FieldValue + FromBucketKey + Eq + Hash,
    {
        self.traced(
            AggKind::GroupBy,
            field,
            None,
            self.aggregates.dictionary(field),
        )
    }

    pub fn dictionary_by<V: FieldValue, K, P>(
        &self,
        field: &Field<M, V>,
        parse: P,
    ) -> Result<HashMap<K, &'a KeyedBucket>, QueryError>
    where
        K: Eq + Hash,
        P: Fn(&str) -> Option<K>,
    {
        self.traced(
            AggKind::GroupBy,
            field,
            None,
            self.aggregates.dictionary_by(field, parse),
        )
    }

    pub fn dictionary_map<V, K>(
        &self,
        field: &Field<M, V>,
        projector: impl FnMut(&KeyedBucket) -> K,
    ) -> Result<HashMap<V, K>, QueryError>
    where
        V: FieldValue + FromBucketKey + Eq + Hash,
    {
        self.traced(
            AggKind::GroupBy,
            field,
            None,
            self.aggregates.dictionary_map(field, projector),
        )
    }

    pub fn key_dictionary<V>(&self, key: &str) -> Result<HashMap<V, &'a KeyedBucket>, QueryError>
    where
        V: FromBucketKey + Eq + Hash,
    {
        let result = self.aggregates.key_dictionary(key);

        self.tracer
            .extraction(AggKind::GroupBy, AggName::raw(key).as_str(), result)
    }

    fn traced<T, V: FieldValue>(
        &self,
        kind: AggKind,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
        result: Result<T, QueryError>,
    ) -> Result<T, QueryError> {
        self.traced_where(kind, field, filter, result, |_| true)
    }

    fn traced_where<T, V: FieldValue>(
        &self,
        kind: AggKind,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
        result: Result<T, QueryError>,
        found: impl FnOnce(&T) -> bool,
    ) -> Result<T, QueryError> {
        if !self.tracer.is_enabled() {
            return result;
        }

        match lookup_name(field, kind, filter) {
            Ok(name) => self
                .tracer
                .extraction_where(kind, name.as_str(), result, found),
            Err(_) => result,
        }
    }
}

impl<M> Clone for AggsContainer<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for AggsContainer<'_, M> {}

impl<M> fmt::Debug for AggsContainer<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggsContainer")
            .field("aggregates", &self.aggregates.len())
            .field("tracer", &self.tracer)
            .finish()
    }
}

impl Aggregates {
    /// Bind these results to model `M`.
    #[must_use]
    pub const fn as_container<M>(&self) -> AggsContainer<'_, M> {
        AggsContainer::new(self)
    }
}
