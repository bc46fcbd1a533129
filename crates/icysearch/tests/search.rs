use icysearch::{
    ErrorClass,
    core::obs::{QueryTraceEvent, QueryTraceSink},
    prelude::*,
};
use serde_json::{Value as JsonValue, json};
use std::sync::Mutex;

///
/// Person
///

struct Person;

impl Person {
    const NAME: Field<Self, String> = Field::new("name");
    const AGE: Field<Self, u32> = Field::new("age");
    const ROLE: Field<Self, Role> = Field::new("role");
    const JOINED: Field<Self, DateTime<Utc>> = Field::new("joined");
    const ACTIVE: Field<Self, bool> = Field::new("active");
}

///
/// Role
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum Role {
    Admin,
    Member,
}

impl_enum_value!(Role { Admin, Member });

///
/// OutcomeSink
///

#[derive(Default)]
struct OutcomeSink {
    outcomes: Mutex<Vec<String>>,
}

impl QueryTraceSink for OutcomeSink {
    fn on_event(&self, event: QueryTraceEvent<'_>) {
        let line = match event {
            QueryTraceEvent::ExtractionMissing { name, .. } => format!("missing {name}"),
            QueryTraceEvent::ExtractionFailed { name, class, .. } => format!("{class} {name}"),
            _ => return,
        };
        self.outcomes.lock().unwrap().push(line);
    }
}

fn scope_key(body: &JsonValue, prefix: &str) -> String {
    body["aggs"]
        .as_object()
        .unwrap()
        .keys()
        .find(|key| key.starts_with(prefix))
        .cloned()
        .unwrap()
}

#[test]
fn evens_filtered_sum_round_trips() {
    let compiler = Compiler::default();
    let evens = Person::AGE.within([2_u32, 4, 6, 8, 10]);
    let request = SearchRequest::new()
        .filtered_on(Person::ACTIVE.is_true())
        .aggregations(
            Aggregations::new()
                .sum(&Person::AGE, Some(evens.clone()))
                .count(&Person::AGE, None),
        )
        .size(0);

    let body = compiler.search_body(&request).unwrap();
    assert_eq!(
        body["query"],
        json!({ "bool": { "filter": [ { "term": { "active": true } } ] } })
    );

    let scope = scope_key(&body, "filter_sum_age_");
    assert_eq!(
        body["aggs"][scope.as_str()]["filter"],
        json!({ "terms": { "age": [2, 4, 6, 8, 10] } })
    );

    let mut aggregations = json!({ "count_age": { "value": 10 } });
    aggregations[scope.as_str()] = json!({ "doc_count": 5, "sum_age": { "value": 30.0 } });
    let response = json!({ "hits": { "hits": [] }, "aggregations": aggregations });

    let aggregates = compiler.decode_response(&request, &response).unwrap();
    let results = aggregates.as_container::<Person>();

    let total: u32 = results.sum(&Person::AGE, Some(&evens)).unwrap();
    assert_eq!(total, 30);
    assert_eq!(results.count(&Person::AGE, None).unwrap(), Some(10));
}

#[test]
fn enum_group_by_reads_as_dictionary() {
    let compiler = Compiler::default();
    let aggs = Aggregations::new()
        .count(&Person::AGE, None)
        .first_by(&Person::NAME, None)
        .group_by(&Person::ROLE);

    let aggregates = compiler
        .decode_aggregations(
            &aggs,
            &json!({ "groupby_role": { "buckets": [
                {
                    "key": "admin",
                    "doc_count": 2,
                    "count_age": { "value": 2 },
                    "firstby_name": { "hits": { "hits": [ { "_source": { "name": "ada" } } ] } },
                },
                {
                    "key": "member",
                    "doc_count": 7,
                    "count_age": { "value": 6 },
                    "firstby_name": { "hits": { "hits": [] } },
                },
            ] } }),
        )
        .unwrap();

    let results = aggregates.as_container::<Person>();
    let roles = results.dictionary(&Person::ROLE).unwrap();
    assert_eq!(roles.len(), 2);

    let admin = results.bucket(roles[&Role::Admin]);
    assert_eq!(admin.count(&Person::AGE, None).unwrap(), Some(2));
    let first: Option<String> = admin.first_by(&Person::NAME, None).unwrap();
    assert_eq!(first.as_deref(), Some("ada"));

    let member = results.bucket(roles[&Role::Member]);
    assert_eq!(member.count(&Person::AGE, None).unwrap(), Some(6));
    let first: Option<String> = member.first_by(&Person::NAME, None).unwrap();
    assert_eq!(first, None);

    let counts = results
        .dictionary_map(&Person::ROLE, |bucket| bucket.doc_count)
        .unwrap();
    assert_eq!(counts[&Role::Member], 7);
}

#[test]
fn numeric_raw_key_group_by_reads_as_dictionary() {
    let compiler = Compiler::default();
    let aggs = group_by_keys(["Age"], Aggregations::<Person>::new());

    let body = compiler
        .search_body(&SearchRequest::new().aggregations(aggs.clone()))
        .unwrap();
    assert_eq!(
        body["aggs"]["age"]["terms"],
        json!({ "field": "age", "size": 2_147_483_647 })
    );

    let aggregates = compiler
        .decode_aggregations(
            &aggs,
            &json!({ "age": { "buckets": [
                { "key": 1, "doc_count": 4 },
                { "key": 2, "doc_count": 9 },
            ] } }),
        )
        .unwrap();

    let ages = aggregates
        .as_container::<Person>()
        .key_dictionary::<u32>("age")
        .unwrap();

    assert_eq!(ages[&1].doc_count, 4);
    assert_eq!(ages[&2].doc_count, 9);
}

#[test]
fn multi_key_drill_down_nests_in_key_order() {
    let inner = Aggregations::new().max(&Person::JOINED, None);
    let request = SearchRequest::new().aggregations(group_by_keys(["Role", "Active"], inner));

    let body = Compiler::default().search_body(&request).unwrap();

    assert_eq!(
        body["aggs"]["role"]["aggs"]["active"]["aggs"]["max_joined"],
        json!({ "max": { "field": "joined" } })
    );
}

#[test]
fn configured_compiler_shapes_requests() {
    let config = SearchConfig::from_toml_str("max_buckets = 25\ndefault_percents = [50.0]").unwrap();
    let compiler = Compiler::new(config);
    let request = SearchRequest::new().aggregations(
        Aggregations::new()
            .percentiles(&Person::AGE, None)
            .group_by(&Person::ROLE),
    );

    let body = compiler.search_body(&request).unwrap();
    let group = &body["aggs"]["groupby_role"];

    assert_eq!(group["terms"]["size"], json!(25));
    assert_eq!(
        group["aggs"]["percentiles_age"]["percentiles"]["percents"],
        json!([50.0])
    );
}

#[test]
fn extraction_outcomes_reach_the_trace_sink() {
    let sink = OutcomeSink::default();
    let aggs = Aggregations::new().max(&Person::AGE, None);
    let aggregates = Compiler::default()
        .decode_aggregations(&aggs, &json!({ "max_age": { "value": 1000.0 } }))
        .unwrap();
    let results = aggregates.as_container::<Person>().with_trace(&sink);

    let err = results.sum::<u32, _>(&Person::AGE, None).unwrap_err();
    assert!(err.is_missing());
    assert_eq!(results.count(&Person::AGE, None).unwrap(), None);
    let err = results.max::<u8, _>(&Person::AGE, None).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Conversion);
    let oldest: u32 = results.max(&Person::AGE, None).unwrap();
    assert_eq!(oldest, 1000);

    assert_eq!(
        *sink.outcomes.lock().unwrap(),
        vec![
            "missing sum_age".to_string(),
            "missing count_age".to_string(),
            "conversion max_age".to_string(),
        ]
    );
}

#[test]
fn unsupported_filters_fail_before_rendering() {
    let request = SearchRequest::new().filtered_on(Person::ACTIVE.gt(false));

    let err = Compiler::default().search_body(&request).unwrap_err();

    assert_eq!(err.class(), ErrorClass::Unsupported);
    assert!(!icysearch::VERSION.is_empty());
}
