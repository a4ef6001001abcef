use super::*;
use pretty_assertions::assert_eq;

#[test]
fn streams_by_name() {
    for kind in StreamKind::ALL {
        assert_eq!(StreamKind::from_name(kind.name()), Some(kind));
    }
    assert_eq!(StreamKind::from_name("Clock"), None);
    assert_eq!(StreamKind::Time.item_type().to_string(), "#ms");
    assert_eq!(StreamKind::Pointer.creator_type().to_string(), "ƒ() …[#px]");
}

#[test]
fn members_depend_on_the_receiver() {
    assert_eq!(
        BuiltinMember::find(Receiver::List, "length"),
        Some(BuiltinMember::ListLength)
    );
    assert_eq!(
        BuiltinMember::find(Receiver::Text, "length"),
        Some(BuiltinMember::TextLength)
    );
    assert_eq!(BuiltinMember::find(Receiver::Set, "length"), None);
    assert!(BuiltinMember::names(Receiver::Map).contains(&"keys"));
    assert_eq!(Receiver::of(&Type::Boolean), None);
}

#[test]
fn signatures_follow_the_item_type() {
    let list = Type::list(Type::Text);
    assert_eq!(BuiltinMember::First.signature(&list).output.to_string(), "''|ø");
    assert_eq!(
        BuiltinMember::Filter.signature(&list).inputs[0].ty.to_string(),
        "ƒ(item•'') ?"
    );
    let map = Type::map(Type::Text, Type::unitless());
    assert_eq!(BuiltinMember::Values.signature(&map).output.to_string(), "[#]");
    assert_eq!(BuiltinMember::MapSet.signature(&map).inputs.len(), 2);
}

#[test]
fn higher_order_members_refine_their_output() {
    let list = Type::list(Type::unitless());
    assert!(BuiltinMember::Translate.is_higher_order());
    assert!(!BuiltinMember::Reverse.is_higher_order());
    assert_eq!(
        BuiltinMember::Translate.signature(&list).refine,
        Some(Refine::ListOfFunctionOutput)
    );
    assert_eq!(
        BuiltinMember::Combine.signature(&list).refine,
        Some(Refine::FirstInput)
    );
}

#[test]
fn conversions() {
    let km = Type::Number(Unit::base("km"));
    let m = Type::Number(Unit::base("m"));
    assert_eq!(BuiltinConversion::find(&km, &m), Some(BuiltinConversion::Scale(1000.0)));
    assert_eq!(
        BuiltinConversion::find(&Type::Text, &Type::unitless()),
        Some(BuiltinConversion::TextToNumber)
    );
    assert_eq!(BuiltinConversion::find(&Type::Text, &m), None);
    assert_eq!(BuiltinConversion::find(&m, &Type::Number(Unit::base("s"))), None);
    assert_eq!(
        BuiltinConversion::find(&Type::list(Type::Text), &Type::set(Type::Text)),
        Some(BuiltinConversion::ListToSet)
    );
}
