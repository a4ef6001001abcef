use super::*;
use crate::ExceptionKind;
use lumen_ir::Name;
use pretty_assertions::assert_eq;

fn n(magnitude: f64) -> Value {
    Value::unitless(magnitude)
}

fn list(items: &[f64]) -> Value {
    Value::list(items.iter().copied().map(n).collect())
}

#[test]
fn number_members_keep_units() {
    let meters = Value::number(-2.4, Unit::base("m"));
    assert_eq!(
        call_member(BuiltinMember::Abs, &meters, &[]),
        Ok(Value::number(2.4, Unit::base("m")))
    );
    assert_eq!(
        call_member(BuiltinMember::Round, &meters, &[]),
        Ok(Value::number(-2.0, Unit::base("m")))
    );
    assert_eq!(call_member(BuiltinMember::Sqrt, &n(9.0), &[]), Ok(n(3.0)));
    assert_eq!(call_member(BuiltinMember::NumberText, &meters, &[]), Ok(Value::text("-2.4m")));
}

#[test]
fn text_members() {
    let text = Value::text("héllo");
    assert_eq!(call_member(BuiltinMember::TextLength, &text, &[]), Ok(n(5.0)));
    assert_eq!(
        call_member(BuiltinMember::TextHas, &text, &[Value::text("ll")]),
        Ok(Value::Boolean(true))
    );
    assert_eq!(
        call_member(BuiltinMember::Repeat, &Value::text("ab"), &[n(3.0)]),
        Ok(Value::text("ababab"))
    );
}

#[test]
fn list_positions_start_at_one() {
    let items = list(&[10.0, 20.0, 30.0]);
    assert_eq!(call_member(BuiltinMember::Get, &items, &[n(1.0)]), Ok(n(10.0)));
    assert_eq!(call_member(BuiltinMember::Get, &items, &[n(3.0)]), Ok(n(30.0)));
    assert_eq!(call_member(BuiltinMember::Get, &items, &[n(0.0)]), Ok(Value::None));
    assert_eq!(call_member(BuiltinMember::Get, &items, &[n(1.5)]), Ok(Value::None));
    assert_eq!(call_member(BuiltinMember::First, &list(&[]), &[]), Ok(Value::None));
    assert_eq!(call_member(BuiltinMember::Last, &items, &[]), Ok(n(30.0)));
}

#[test]
fn list_members_build_new_lists() {
    let items = list(&[1.0, 2.0]);
    assert_eq!(call_member(BuiltinMember::Reverse, &items, &[]), Ok(list(&[2.0, 1.0])));
    assert_eq!(call_member(BuiltinMember::ListAdd, &items, &[n(3.0)]), Ok(list(&[1.0, 2.0, 3.0])));
    assert_eq!(items, list(&[1.0, 2.0]));
    assert_eq!(
        call_member(BuiltinMember::ListHas, &items, &[n(2.0)]),
        Ok(Value::Boolean(true))
    );
}

#[test]
fn set_and_map_members() {
    let set = Value::set(vec![n(1.0), n(2.0)]);
    assert_eq!(call_member(BuiltinMember::SetAdd, &set, &[n(1.0)]), Ok(set.clone()));
    assert_eq!(
        call_member(BuiltinMember::SetRemove, &set, &[n(1.0)]),
        Ok(Value::set(vec![n(2.0)]))
    );
    let map = Value::map(vec![(Value::text("a"), n(1.0))]);
    assert_eq!(call_member(BuiltinMember::MapGet, &map, &[Value::text("b")]), Ok(Value::None));
    let updated = call_member(BuiltinMember::MapSet, &map, &[Value::text("a"), n(5.0)]);
    assert_eq!(updated.map(|map| map.to_string()), Ok("{'a':5}".to_string()));
    assert_eq!(call_member(BuiltinMember::Keys, &map, &[]), Ok(Value::list(vec![Value::text("a")])));
}

#[test]
fn wrong_receivers_and_inputs_are_mismatches() {
    let kind = |result: EvalResult| result.map_err(|exception| exception.kind);
    assert_eq!(
        kind(call_member(BuiltinMember::Sqrt, &Value::text("a"), &[])),
        Err(ExceptionKind::TypeMismatch)
    );
    assert_eq!(
        kind(call_member(BuiltinMember::Repeat, &Value::text("a"), &[])),
        Err(ExceptionKind::TypeMismatch)
    );
}

#[test]
fn conversions() {
    assert_eq!(
        convert(BuiltinConversion::NumberToText, &n(2.0), &Type::Text),
        Ok(Value::text("2"))
    );
    assert_eq!(
        convert(BuiltinConversion::TextToNumber, &Value::text(" 42 "), &Type::unitless()),
        Ok(n(42.0))
    );
    let scaled = convert(
        BuiltinConversion::Scale(1000.0),
        &Value::number(2.0, Unit::base("km")),
        &Type::Number(Unit::base("m")),
    );
    assert_eq!(scaled, Ok(Value::number(2000.0, Unit::base("m"))));
    assert_eq!(
        convert(BuiltinConversion::ListToSet, &list(&[1.0, 1.0]), &Type::set(Type::Any)),
        Ok(Value::set(vec![n(1.0)]))
    );
}

#[test]
fn tables_need_full_rows() {
    let columns = vec![Name::new("a"), Name::new("b")];
    let table = table(columns.clone(), vec![vec![n(1.0), n(2.0)]]);
    assert_eq!(table.map(|table| table.to_string()), Ok("⎡a b⎦⎡1 2⎦".to_string()));
    let short = super::table(columns, vec![vec![n(1.0)]]);
    assert_eq!(short.map_err(|exception| exception.kind), Err(ExceptionKind::TypeMismatch));
}
