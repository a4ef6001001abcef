use super::*;
use pretty_assertions::assert_eq;

fn one() -> Value {
    Value::unitless(1.0)
}

#[test]
fn lookups_walk_parents() {
    let root = Scope::root();
    root.define(Name::new("x"), one());
    let child = root.child();
    assert_eq!(child.lookup("x"), Some(one()));
    assert_eq!(child.get_here("x"), None);
    assert!(!child.is_bound_here("x"));
    assert_eq!(child.lookup("y"), None);
}

#[test]
fn children_shadow_without_touching_parents() {
    let root = Scope::root();
    root.define(Name::new("x"), one());
    let child = root.child();
    child.define(Name::new("x"), Value::text("inner"));
    assert_eq!(child.lookup("x"), Some(Value::text("inner")));
    assert_eq!(root.lookup("x"), Some(one()));
}

#[test]
fn define_returns_what_it_replaced() {
    let scope = Scope::root();
    let x = Name::new("x");
    assert_eq!(scope.define(x.clone(), one()), None);
    let previous = scope.define(x.clone(), Value::None);
    assert_eq!(previous, Some(one()));
    scope.undefine(&x, previous);
    assert_eq!(scope.get_here("x"), Some(one()));
    scope.undefine(&x, None);
    assert!(!scope.is_bound_here("x"));
}

#[test]
fn clones_share_bindings() {
    let scope = Scope::root();
    let alias = scope.clone();
    alias.define(Name::new("x"), one());
    assert_eq!(scope.get_here("x"), Some(one()));
    assert!(scope.same(&alias));
    assert!(!scope.same(&scope.child()));
}

#[test]
fn local_bindings_are_sorted() {
    let scope = Scope::root();
    scope.define(Name::new("b"), one());
    scope.define(Name::new("a"), Value::None);
    let names: Vec<String> = scope
        .local_bindings()
        .into_iter()
        .map(|(name, _)| name.to_string())
        .collect();
    assert_eq!(names, ["a", "b"]);
    assert_eq!(scope.child().child().depth(), 3);
}
