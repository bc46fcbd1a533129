use crate::{
    error::QueryError,
    extract::FromBucketKey,
    field::Field,
    filter::{Predicate, compile},
    name::{AggKind, AggName, filter_scope, resolve},
    response::{AggregateResult, Aggregates, KeyedBucket, PercentileItem, Stats},
    value::FieldValue,
};
use num_traits::NumCast;
use serde::de::DeserializeOwned;
use std::{collections::HashMap, hash::Hash, iter::FusedIterator, marker::PhantomData, slice};

/// Name an aggregation is registered under at its own level: the derived
/// name, or its filter scope when a filter is given.
pub fn lookup_name<M, V: FieldValue>(
    field: &Field<M, V>,
    kind: AggKind,
    filter: Option<&Predicate<M>>,
) -> Result<AggName, QueryError> {
    let name = resolve(field, kind)?;

    match filter {
        Some(predicate) => Ok(filter_scope(&name, &compile(predicate)?.fingerprint())),
        None => Ok(name),
    }
}

///
/// Lookup
///
/// Result of resolving a field at one response level.
///

struct Lookup<'a> {
    name: AggName,
    result: Option<&'a AggregateResult>,
}

impl<'a> Lookup<'a> {
    fn require(&self) -> Result<&'a AggregateResult, QueryError> {
        self.result
            .ok_or_else(|| QueryError::missing(self.name.as_str()))
    }

    fn unexpected(&self, expected: &str, found: &AggregateResult) -> QueryError {
        QueryError::malformed(
            self.name.as_str(),
            format!("expected {expected}, found {}", found.label()),
        )
    }
}

impl Aggregates {
    //
    // Metrics
    //

    /// Sum of `field`, cast to `K`.
    pub fn sum<K: NumCast, M, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<K, QueryError> {
        self.metric(field, AggKind::Sum, filter)
    }

    pub fn average<K: NumCast, M, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<K, QueryError> {
        self.metric(field, AggKind::Average, filter)
    }

    pub fn min<K: NumCast, M, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<K, QueryError> {
        self.metric(field, AggKind::Min, filter)
    }

    pub fn max<K: NumCast, M, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<K, QueryError> {
        self.metric(field, AggKind::Max, filter)
    }

    /// Value count of `field`. `None` when the response carries no count
    /// for this field and filter, which is distinct from a count of zero.
    pub fn count<M, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<Option<u64>, QueryError> {
        let lookup = self.locate(field, AggKind::Count, filter)?;

        match lookup.result {
            None => Ok(None),
            Some(AggregateResult::ValueCount(count)) => Ok(Some(*count)),
            Some(other) => Err(lookup.unexpected("a value count", other)),
        }
    }

    pub fn cardinality<M, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<u64, QueryError> {
        let lookup = self.locate(field, AggKind::Cardinality, filter)?;

        match lookup.require()? {
            AggregateResult::Cardinality(count) => Ok(*count),
            other => Err(lookup.unexpected("a cardinality", other)),
        }
    }

    //
    // Multi-value
    //

    /// Distinct values of `field` in backend order, parsed lazily.
    pub fn distinct<M, V: FieldValue + FromBucketKey>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<Distinct<'_, V>, QueryError> {
        let lookup = self.locate(field, AggKind::Distinct, filter)?;

        match lookup.require()? {
            AggregateResult::Terms(buckets) => Ok(Distinct::new(buckets)),
            other => Err(lookup.unexpected("terms", other)),
        }
    }

    pub fn percentiles<M, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<&[PercentileItem], QueryError> {
        let lookup = self.locate(field, AggKind::Percentile, filter)?;

        match lookup.require()? {
            AggregateResult::Percentiles(items) => Ok(items),
            other => Err(lookup.unexpected("percentiles", other)),
        }
    }

    pub fn stats<M, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<&Stats, QueryError> {
        let lookup = self.locate(field, AggKind::Stats, filter)?;

        match lookup.require()? {
            AggregateResult::Stats(stats) => Ok(stats),
            other => Err(lookup.unexpected("stats", other)),
        }
    }

    /// Value of `field` on the top hit. `None` when no document matched or
    /// the top hit has no value for the field.
    pub fn first_by<K: DeserializeOwned, M, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        filter: Option<&Predicate<M>>,
    ) -> Result<Option<K>, QueryError> {
        let lookup = self.locate(field, AggKind::FirstBy, filter)?;

        let hits = match lookup.require()? {
            AggregateResult::TopHits(hits) => hits,
            other => return Err(lookup.unexpected("top hits", other)),
        };

        let pointer = format!("/{}", field.path().replace('.', "/"));
        let Some(value) = hits.first().and_then(|source| source.pointer(&pointer)) else {
            return Ok(None);
        };

        if value.is_null() {
            return Ok(None);
        }

        serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|_| QueryError::conversion::<K>(value.to_string()))
    }

    //
    // Bucketing
    //

    /// Buckets of the group-by over `field`, in backend order.
    pub fn group_by<M, V: FieldValue>(
        &self,
        field: &Field<M, V>,
    ) -> Result<&[KeyedBucket], QueryError> {
        self.buckets_at(&resolve(field, AggKind::GroupBy)?)
    }

    /// Buckets of a raw-key group-by.
    pub fn group_by_key(&self, key: &str) -> Result<&[KeyedBucket], QueryError> {
        self.buckets_at(&AggName::raw(key))
    }

    /// Group-by buckets projected through `projector`, in backend order.
    pub fn group_by_map<M, V: FieldValue, K>(
        &self,
        field: &Field<M, V>,
        projector: impl FnMut(&KeyedBucket) -> K,
    ) -> Result<Vec<K>, QueryError> {
        Ok(self.group_by(field)?.iter().map(projector).collect())
    }

    /// Group-by buckets keyed by the parsed bucket key.
    pub fn dictionary<M, V>(
        &self,
        field: &Field<M, V>,
    ) -> Result<HashMap<V, &KeyedBucket>, QueryError>
    where
        V: FieldValue + FromBucketKey + Eq + Hash,
    {
        keyed(self.group_by(field)?, V::from_bucket_key, |bucket| bucket)
    }

    /// Group-by buckets keyed through a caller-supplied parser.
    pub fn dictionary_by<M, V: FieldValue, K, P>(
        &self,
        field: &Field<M, V>,
        parse: P,
    ) -> Result<HashMap<K, &KeyedBucket>, QueryError>
    where
        K: Eq + Hash,
        P: Fn(&str) -> Option<K>,
    {
        keyed(self.group_by(field)?, parse, |bucket| bucket)
    }

    /// Group-by buckets keyed by the parsed bucket key and projected.
    pub fn dictionary_map<M, V, K>(
        &self,
        field: &Field<M, V>,
        projector: impl FnMut(&KeyedBucket) -> K,
    ) -> Result<HashMap<V, K>, QueryError>
    where
        V: FieldValue + FromBucketKey + Eq + Hash,
    {
        keyed(self.group_by(field)?, V::from_bucket_key, projector)
    }

    /// Raw-key group-by buckets keyed by the key parsed as `V`.
    pub fn key_dictionary<V>(&self, key: &str) -> Result<HashMap<V, &KeyedBucket>, QueryError>
    where
        V: FromBucketKey + Eq + Hash,
    {
        keyed(self.group_by_key(key)?, V::from_bucket_key, |bucket| bucket)
    }

    fn metric<K: NumCast, M, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        kind: AggKind,
        filter: Option<&Predicate<M>>,
    ) -> Result<K, QueryError> {
        let lookup = self.locate(field, kind, filter)?;

        match lookup.require()? {
            AggregateResult::Metric(Some(value)) => <K as NumCast>::from(*value)
                .ok_or_else(|| QueryError::conversion::<K>(value.to_string())),
            AggregateResult::Metric(None) => Err(QueryError::missing(lookup.name.as_str())),
            other => Err(lookup.unexpected("a metric", other)),
        }
    }

    fn buckets_at(&self, name: &AggName) -> Result<&[KeyedBucket], QueryError> {
        match self.get(name) {
            Some(AggregateResult::Terms(buckets)) => Ok(buckets),
            Some(other) => Err(QueryError::malformed(
                name.as_str(),
                format!("expected terms, found {}", other.label()),
            )),
            None => Err(QueryError::missing(name.as_str())),
        }
    }

    fn locate<M, V: FieldValue>(
        &self,
        field: &Field<M, V>,
        kind: AggKind,
        filter: Option<&Predicate<M>>,
    ) -> Result<Lookup<'_>, QueryError> {
        let name = resolve(field, kind)?;

        let Some(predicate) = filter else {
            return Ok(Lookup {
                result: self.get(&name),
                name,
            });
        };

        let scope = filter_scope(&name, &compile(predicate)?.fingerprint());
        let result = match self.get(&scope) {
            Some(AggregateResult::Filter(bucket)) => bucket.aggregations.get(&name),
            Some(other) => {
                return Err(QueryError::malformed(
                    scope.as_str(),
                    format!("expected filter, found {}", other.label()),
                ));
            }
            None => None,
        };

        Ok(Lookup {
            name: scope,
            result,
        })
    }
}

impl KeyedBucket {
    /// Parse this bucket's key as `V`.
    pub fn key_as<V: FromBucketKey>(&self) -> Result<V, QueryError> {
        self.parse_key(V::from_bucket_key)
    }

    // Formatted key first, then the raw key it was rendered from.
    fn parse_key<K>(&self, parse: impl Fn(&str) -> Option<K>) -> Result<K, QueryError> {
        parse(&self.key)
            .or_else(|| self.raw_key.as_deref().and_then(&parse))
            .ok_or_else(|| QueryError::conversion::<K>(self.key.as_str()))
    }
}

fn keyed<'a, K, T>(
    buckets: &'a [KeyedBucket],
    parse: impl Fn(&str) -> Option<K>,
    mut project: impl FnMut(&'a KeyedBucket) -> T,
) -> Result<HashMap<K, T>, QueryError>
where
    K: Eq + Hash,
{
    buckets
        .iter()
        .map(|bucket| {
            let key = bucket.parse_key(&parse)?;

            Ok((key, project(bucket)))
        })
        .collect()
}

///
/// Distinct
///
/// Lazy iterator over the distinct values of a terms aggregation. Each
/// item parses one bucket key.
///

pub struct Distinct<'a, V> {
    buckets: slice::Iter<'a, KeyedBucket>,
    _marker: PhantomData<fn() -> V>,
}

impl<'a, V> Distinct<'a, V> {
    fn new(buckets: &'a [KeyedBucket]) -> Self {
        Self {
            buckets: buckets.iter(),
            _marker: PhantomData,
        }
    }
}

impl<V: FromBucketKey> Iterator for Distinct<'_, V> {
    type Item = Result<V, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buckets.next().map(KeyedBucket::key_as)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.buckets.size_hint()
    }
}

impl<V: FromBucketKey> ExactSizeIterator for Distinct<'_, V> {}

impl<V: FromBucketKey> FusedIterator for Distinct<'_, V> {}
