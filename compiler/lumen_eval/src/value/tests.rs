use super::*;
use lumen_types::Project;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn n(magnitude: f64) -> Value {
    Value::unitless(magnitude)
}

fn context() -> Context {
    Context::for_project(Arc::new(Project::parse("1")))
}

#[test]
fn display_uses_literal_syntax() {
    assert_eq!(Value::Boolean(true).to_string(), "⊤");
    assert_eq!(Value::None.to_string(), "ø");
    assert_eq!(Value::text("hi").to_string(), "'hi'");
    assert_eq!(Value::number(2.5, Unit::base("m")).to_string(), "2.5m");
    assert_eq!(Value::list(vec![n(1.0), n(2.0)]).to_string(), "[1 2]");
    assert_eq!(Value::map(Vec::new()).to_string(), "{:}");
    assert_eq!(Value::map(vec![(n(1.0), Value::text("a"))]).to_string(), "{1:'a'}");
    assert_eq!(Value::Stream(StreamKind::Time).to_string(), "…Time");
}

#[test]
fn sets_drop_duplicates_and_ignore_order() {
    let set = Value::set(vec![n(1.0), n(2.0), n(1.0)]);
    assert_eq!(set.to_string(), "{1 2}");
    assert_eq!(set, Value::set(vec![n(2.0), n(1.0)]));
    assert_ne!(set, Value::list(vec![n(1.0), n(2.0)]));
}

#[test]
fn later_map_pairs_win() {
    let map = Value::map(vec![(n(1.0), n(10.0)), (n(1.0), n(20.0))]);
    assert_eq!(map.to_string(), "{1:20}");
}

#[test]
fn units_are_part_of_number_identity() {
    assert_ne!(Value::number(1.0, Unit::base("m")), n(1.0));
    assert_eq!(Value::number(1.0, Unit::base("m")).type_label(), "#m");
}

#[test]
fn runtime_types() {
    let ctx = context();
    assert_eq!(n(1.0).runtime_type(&ctx).to_string(), "#");
    assert_eq!(
        Value::list(vec![n(1.0), n(2.0)]).runtime_type(&ctx).to_string(),
        "[#]"
    );
    assert_eq!(Value::list(Vec::new()).runtime_type(&ctx), Type::list(Type::Never));
    assert_eq!(Value::text("a").runtime_type(&ctx), Type::Text);
}

#[test]
fn literals_from_the_command_line() {
    assert_eq!(Value::from_literal("⊤"), Value::Boolean(true));
    assert_eq!(Value::from_literal("ø"), Value::None);
    assert_eq!(Value::from_literal("5m"), Value::number(5.0, Unit::base("m")));
    assert_eq!(Value::from_literal("-2"), n(-2.0));
    assert_eq!(Value::from_literal("'a b'"), Value::text("a b"));
    assert_eq!(Value::from_literal("hello"), Value::text("hello"));
}

#[test]
fn accessors() {
    assert_eq!(Value::Boolean(true).as_bool(), Some(true));
    assert_eq!(n(1.0).as_bool(), None);
    assert_eq!(Value::text("a").as_text(), Some("a"));
    assert!(Value::None.is_none());
    assert_eq!(n(3.0).as_number().map(|number| number.magnitude), Some(3.0));
}

proptest! {
    #[test]
    fn set_construction_is_idempotent(items in proptest::collection::vec(0u8..8, 0..16)) {
        let values: Vec<Value> = items.iter().map(|i| n(f64::from(*i))).collect();
        let Value::Set(once) = Value::set(values) else {
            unreachable!("sets build sets");
        };
        let twice = Value::set(once.to_vec());
        prop_assert_eq!(twice.clone(), Value::Set(once.clone()));
        let Value::Set(twice) = twice else {
            unreachable!("sets build sets");
        };
        prop_assert_eq!(once.len(), twice.len());
    }
}
