#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::{Token, TokenKind};
use pretty_assertions::assert_eq;

fn leaf(kind: TokenKind, text: &str, trivia: &str) -> Node {
    Node::leaf(Token::new(kind, text, trivia))
}

fn number(text: &str, trivia: &str) -> Node {
    Node::new(NumberLiteral {
        number: leaf(TokenKind::Number, text, trivia),
    })
}

/// `1 + 2`
fn sum() -> Node {
    sum_after("")
}

/// `1 + 2` with `lead` before the `1`.
fn sum_after(lead: &str) -> Node {
    Node::new(BinaryOperation {
        left: number("1", lead),
        operator: leaf(TokenKind::Operator, "+", " "),
        right: number("2", " "),
    })
}

/// `x: 1 + 2` as a whole program.
fn program() -> Node {
    let bind = Node::new(Bind {
        docs: None,
        names: vec![Node::new(Alias {
            name: leaf(TokenKind::Name, "x", ""),
            separator: None,
        })],
        dot: None,
        ty: None,
        colon: Some(leaf(TokenKind::Colon, ":", "")),
        value: Some(sum_after(" ")),
    });
    let block = Node::new(Block {
        open: None,
        statements: vec![bind],
        close: None,
    });
    Node::new(Program {
        docs: None,
        borrows: Vec::new(),
        block,
        end: leaf(TokenKind::End, "", "\n"),
    })
}

fn bind_value(root: &Node) -> Node {
    root.descendants()
        .into_iter()
        .find(|node| node.label() == "BinaryOperation")
        .unwrap()
}

#[test]
fn children_follow_grammar_order() {
    let node = sum();
    let labels: Vec<_> = node.children().iter().map(Node::label).collect();
    assert_eq!(labels, vec!["NumberLiteral", "Token", "NumberLiteral"]);

    let fields: Vec<_> = node.grammar().iter().map(|field| field.name).collect();
    assert_eq!(fields, vec!["left", "operator", "right"]);
}

#[test]
fn grammar_reports_arity_and_category() {
    let root = program();
    let grammar = root.grammar();
    assert_eq!(grammar[0].arity, Arity::Optional);
    assert_eq!(grammar[0].category, Category::Docs);
    assert_eq!(grammar[1].arity, Arity::Many);
    assert_eq!(grammar[2].arity, Arity::One);
    assert_eq!(grammar[2].category, Category::Block);
}

#[test]
fn print_is_exact() {
    assert_eq!(program().print(), "x: 1 + 2\n");
}

#[test]
fn replace_shares_siblings() {
    let node = sum();
    let old = node.children()[2].clone();
    let replaced = node.replace(&old, &number("5", " ")).unwrap();

    assert_eq!(replaced.print(), "1 + 5");
    assert!(!replaced.same(&node));
    assert!(replaced.children()[0].same(&node.children()[0]));
    assert!(replaced.children()[1].same(&node.children()[1]));
    // The original is untouched.
    assert_eq!(node.print(), "1 + 2");
}

#[test]
fn replace_of_non_child_is_none() {
    let node = sum();
    assert!(node.replace(&number("9", ""), &number("5", "")).is_none());
}

#[test]
fn replace_descendant_rebuilds_only_the_spine() {
    let root = program();
    let target = bind_value(&root).children()[0].clone();
    let edited = root
        .replace_descendant(&target, &number("40", " "))
        .unwrap();

    assert_eq!(edited.print(), "x: 40 + 2\n");

    let before: Vec<Node> = root.descendants();
    let after: Vec<Node> = edited.descendants();
    let spine = root.find_path(&target).unwrap();
    let shared = after
        .iter()
        .filter(|node| before.iter().any(|old| old.same(node)))
        .count();
    // Everything except the spine (and the replaced leaf below it) survives.
    assert_eq!(shared, before.len() - spine.len() - 1);
}

#[test]
fn find_path_runs_root_to_target() {
    let root = program();
    let target = bind_value(&root);
    let path = root.find_path(&target).unwrap();
    let labels: Vec<_> = path.iter().map(Node::label).collect();
    assert_eq!(labels, vec!["Program", "Block", "Bind", "BinaryOperation"]);
    assert!(root.find_path(&sum()).is_none());
}

#[test]
fn parents_and_spans() {
    let root = program();
    let value = bind_value(&root);
    let parents = compute_parents(&root);
    assert_eq!(parents[&value.id()].label(), "Bind");

    let spans = compute_spans(&root);
    assert_eq!(spans[&value.id()], Span::new(3, 8));
    assert_eq!(spans[&root.id()], Span::new(0, 9));
}

#[test]
fn identity_not_structure() {
    let a = sum();
    let b = sum();
    assert_ne!(a, b);
    assert!(a.same_shape(&b));
    assert!(!a.same_shape(&number("1", "")));
}

#[test]
fn category_fits() {
    assert!(Category::Bind.fits(Category::Statement));
    assert!(Category::Reference.fits(Category::Expression));
    assert!(!Category::Type.fits(Category::Expression));
}

#[test]
fn bind_aliases() {
    let root = program();
    let bind = root
        .descendants()
        .into_iter()
        .find(|node| node.label() == "Bind")
        .unwrap();
    let NodeKind::Bind(bind) = bind.kind() else {
        panic!("expected a bind");
    };
    assert_eq!(bind.primary_name().unwrap().as_str(), "x");
    assert!(bind.has_name("x"));
    assert!(bind.has_default());
}
