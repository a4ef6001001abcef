use super::*;
use pretty_assertions::assert_eq;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

#[test]
fn substitutes_positional_arguments() {
    assert_eq!(substitute("$2 then $1", &args(&["a", "b"])), "b then a");
}

#[test]
fn multi_digit_placeholders() {
    let many: Vec<String> = (1..=11).map(|n| n.to_string()).collect();
    assert_eq!(substitute("[$11]", &many), "[11]");
}

#[test]
fn missing_arguments_and_bare_dollars() {
    assert_eq!(substitute("$3 costs $", &args(&["x"])), "? costs $");
    assert_eq!(substitute("$0", &args(&["x"])), "?");
}

#[test]
fn english_renders_known_keys() {
    assert_eq!(
        English.render("MissingInput.primary", &args(&["b", "#"])),
        Some("missing required input b (#)".to_string())
    );
    assert_eq!(English.lookup("NoSuchKind.primary"), None);
}

#[test]
fn every_conflict_kind_has_a_primary_message() {
    let kinds = [
        "UnknownName", "UnknownTypeName", "IncompatibleBind", "IncompatibleInput",
        "MissingInput", "UnexpectedInput", "NotAFunction", "DuplicateName",
        "CaseCollision", "ExpectedBooleanCondition", "IncompatibleOperand",
        "IncompatibleUnits", "UnknownProperty", "ExpectedStream", "MisplacedThis",
        "MissingCell", "ExtraCell", "IncompatibleCell", "ExpectedColumnType",
        "UnknownColumn", "NonBooleanQuery", "BorrowCycle", "ReferenceCycle",
        "UnknownBorrow", "ExpectedEndingExpression", "IgnoredExpression",
        "UnimplementedInterface", "IncompatibleOutput", "Placeholder", "Unparsable",
        "UnknownConversion", "RequiredAfterOptional",
    ];
    for kind in kinds {
        assert!(English.lookup(&format!("{kind}.primary")).is_some(), "{kind}");
    }
}
