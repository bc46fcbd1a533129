use super::*;
use crate::{
    error::{ErrorClass, QueryError},
    field::{CompareOp, FieldRef},
    test_fixtures::{Address, Car, CarKind, User},
    value::{Value, ValueKind},
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn leaf(field: &str, op: FilterOp, value: Value) -> FilterNode {
    FilterNode::leaf(field, op, value)
}

#[test]
fn and_of_two_equalities_keeps_source_order() {
    let pred = User::AGE.eq(1) & User::NAME.eq("b");
    let node = compile(&pred).unwrap();

    assert_eq!(
        node,
        FilterNode::Combinator {
            kind: Combinator::And,
            children: vec![
                leaf("age", FilterOp::Eq, Value::Int(1)),
                leaf("name", FilterOp::Eq, Value::Text("b".to_string())),
            ],
        }
    );
}

#[test]
fn chained_and_flattens_into_one_combinator() {
    let pred = User::NAME.eq("name1") & User::AGE.gte(5) & User::EMAIL.eq("Email@email1.com");
    let node = compile(&pred).unwrap();

    let children = node.children_of(Combinator::And);
    assert_eq!(children.len(), 3);
    assert_eq!(children[0].as_leaf().unwrap().field, "name");
    assert_eq!(children[1].as_leaf().unwrap().op, FilterOp::Gte);
    assert_eq!(children[2].as_leaf().unwrap().field, "email");
}

#[test]
fn or_compiles_to_or_combinator() {
    let pred = User::NAME.eq("name1") | User::AGE.gte(5);
    let node = compile(&pred).unwrap();

    assert_eq!(node.children_of(Combinator::Or).len(), 2);
    assert!(node.children_of(Combinator::And).is_empty());
}

#[test]
fn not_equal_compiles_to_neq_leaf() {
    let pred = User::NAME.ne("name1") & User::NAME.ne("name2");
    let node = compile(&pred).unwrap();

    for child in node.children_of(Combinator::And) {
        assert_eq!(child.as_leaf().unwrap().op, FilterOp::Neq);
    }
}

#[test]
fn negation_wraps_child_in_not() {
    let node = compile(&!User::AGE.gt(3)).unwrap();

    assert_eq!(
        node,
        FilterNode::not(leaf("age", FilterOp::Gt, Value::Int(3)))
    );
}

#[test]
fn bare_boolean_field_matches_explicit_true() {
    let bare = compile(&User::ACTIVE.is_true()).unwrap();
    let explicit = compile(&User::ACTIVE.eq(true)).unwrap();

    assert_eq!(bare, explicit);
    assert_eq!(bare, leaf("active", FilterOp::Eq, Value::Bool(true)));
}

#[test]
fn bare_nullable_boolean_field_matches_explicit_true() {
    let bare = compile(&User::ENABLED.is_true()).unwrap();
    let explicit = compile(&User::ENABLED.eq(true)).unwrap();

    assert_eq!(bare, explicit);
}

#[test]
fn boolean_field_converts_into_predicate() {
    let pred: Predicate<Car> = Car::SOLD.into();

    assert_eq!(
        compile(&pred).unwrap(),
        leaf("sold", FilterOp::Eq, Value::Bool(true))
    );
}

#[test]
fn analyzed_text_is_lowered_but_keyword_is_not() {
    let analyzed = compile(&Car::CAR_TYPE.eq("Type0")).unwrap();
    let keyword = compile(&User::EMAIL.eq("Email@email1.com")).unwrap();

    assert_eq!(
        analyzed.as_leaf().unwrap().value,
        Value::Text("type0".to_string())
    );
    assert_eq!(
        keyword.as_leaf().unwrap().value,
        Value::Text("Email@email1.com".to_string())
    );
}

#[test]
fn enum_literal_is_lowered() {
    let node = compile(&Car::KIND.eq(CarKind::Sedan)).unwrap();

    assert_eq!(
        node.as_leaf().unwrap().value,
        Value::Enum("sedan".to_string())
    );
}

#[test]
fn dates_and_numbers_are_used_verbatim() {
    let start = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
    let pred = Car::TIMESTAMP.gte(start) & Car::EMISSIONS.lt(6.0);
    let node = compile(&pred).unwrap();
    let children = node.children_of(Combinator::And);

    assert_eq!(children[0].as_leaf().unwrap().value, Value::Timestamp(start));
    assert_eq!(children[1].as_leaf().unwrap().value, Value::Float(6.0));
}

#[test]
fn membership_is_single_within_leaf() {
    let node = value_within(&User::NAME, ["name1", "name2"]).unwrap();

    assert_eq!(
        node,
        leaf(
            "name",
            FilterOp::Within,
            Value::List(vec![
                Value::Text("name1".to_string()),
                Value::Text("name2".to_string()),
            ])
        )
    );
    assert!(node.children_of(Combinator::Or).is_empty());
}

#[test]
fn and_value_within_appends_after_existing_filter() {
    let pred = User::AGE
        .gt(8)
        .and_value_within(&User::NAME, vec!["name1", "name2"]);
    let node = compile(&pred).unwrap();
    let children = node.children_of(Combinator::And);

    assert_eq!(children.len(), 2);
    assert_eq!(children[1].as_leaf().unwrap().op, FilterOp::Within);
}

#[test]
fn compiled_and_merges_flat() {
    let left = compile(&(User::NAME.eq("name1") & User::AGE.gte(5))).unwrap();
    let right = compile(&User::EMAIL.eq("Email@email1.com")).unwrap();
    let node = and(left, right);

    assert_eq!(node.children_of(Combinator::And).len(), 3);
    assert_eq!(node.leaf_count(), 3);
    assert_eq!(node.depth(), 2);
}

#[test]
fn nested_accessor_resolves_dotted_path() {
    let city = User::ADDRESS.nested(Address::CITY);
    let node = compile(&city.eq("Oslo")).unwrap();

    assert_eq!(node.as_leaf().unwrap().field, "address.city");
}

#[test]
fn computed_path_is_unsupported() {
    let expr = Expr::Compare {
        field: FieldRef {
            path: "name.len()".to_string(),
            kind: ValueKind::Int,
            analyzed: true,
        },
        op: CompareOp::Eq,
        value: Value::Int(3),
    };

    let err = compile_expr(&expr).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Unsupported);
}

#[test]
fn bare_non_boolean_field_is_unsupported() {
    let expr = Expr::Field(User::AGE.to_ref());
    let err = compile_expr(&expr).unwrap_err();

    let QueryError::UnsupportedExpression { expression, .. } = err else {
        panic!("expected unsupported expression");
    };
    assert_eq!(expression, "age");
}

#[test]
fn null_operand_is_unsupported() {
    let pred = User::ENABLED.eq(None::<bool>);

    assert!(matches!(
        compile(&pred),
        Err(QueryError::UnsupportedExpression { .. })
    ));
}

#[test]
fn non_finite_float_operand_is_unsupported() {
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = compile(&Car::EMISSIONS.gt(bad)).unwrap_err();
        let QueryError::UnsupportedExpression { expression, .. } = err else {
            panic!("expected unsupported expression");
        };
        assert!(expression.starts_with("emissions > "), "{expression}");
    }

    assert!(compile(&Car::EMISSIONS.within([1.0, f64::NAN])).is_err());
}

#[test]
fn range_on_boolean_is_unsupported() {
    assert!(compile(&User::ACTIVE.gt(false)).is_err());
}

#[test]
fn mismatched_operand_fails_whole_tree() {
    let bad = Predicate::<User>::from_expr(Expr::Compare {
        field: User::AGE.to_ref(),
        op: CompareOp::Eq,
        value: Value::Text("ten".to_string()),
    });
    let pred = User::NAME.eq("ok") & bad;

    assert!(compile(&pred).is_err());
}

#[test]
fn fingerprint_tracks_content() {
    let a = compile(&User::AGE.gte(5)).unwrap();
    let b = compile(&User::AGE.gte(5)).unwrap();
    let c = compile(&User::AGE.gte(6)).unwrap();

    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
    assert_eq!(a.fingerprint().short_hex().len(), 16);
}

#[test]
fn fingerprint_keeps_sub_microsecond_timestamps_apart() {
    let at = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
    let later = at + chrono::Duration::nanoseconds(500);

    let a = compile(&Car::TIMESTAMP.gt(at)).unwrap();
    let b = compile(&Car::TIMESTAMP.gt(later)).unwrap();

    assert_ne!(a, b);
    assert_ne!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint().short_hex(), b.fingerprint().short_hex());
}

proptest! {
    #[test]
    fn and_chain_preserves_order(ages in prop::collection::vec(any::<i32>(), 2..8)) {
        let pred = ages
            .iter()
            .map(|age| User::AGE.eq(*age))
            .reduce(|acc, next| acc & next)
            .unwrap();
        let node = compile(&pred).unwrap();
        let children = node.children_of(Combinator::And);

        prop_assert_eq!(children.len(), ages.len());
        for (child, age) in children.iter().zip(&ages) {
            prop_assert_eq!(&child.as_leaf().unwrap().value, &Value::Int(i64::from(*age)));
        }
    }
}
