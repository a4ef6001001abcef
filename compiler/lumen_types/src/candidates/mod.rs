//! Replacement candidates for a child slot, used for structural
//! autocomplete.
//!
//! Candidates are fresh, detached nodes; the caller splices one in with
//! [`Node::replace`].

use lumen_ir::{
    BooleanLiteral, BooleanType, Category, ExpressionPlaceholder, Field, ListLiteral, MapLiteral,
    NameType, Node, NoneLiteral, NoneType, NumberLiteral, NumberType, Reference, SetLiteral,
    TextLiteral, TextType, Token, TokenKind, TypePlaceholder,
};
use rustc_hash::FxHashSet;

use crate::resolve::{scopes, Definition};
use crate::Context;

fn leaf(kind: TokenKind, text: &str) -> Node {
    Node::leaf(Token::bare(kind, text))
}

fn expression_candidates() -> Vec<Node> {
    vec![
        Node::new(ExpressionPlaceholder {
            placeholder: leaf(TokenKind::Placeholder, "_"),
            dot: None,
            ty: None,
        }),
        Node::new(BooleanLiteral {
            value: leaf(TokenKind::True, "⊤"),
        }),
        Node::new(BooleanLiteral {
            value: leaf(TokenKind::False, "⊥"),
        }),
        Node::new(NumberLiteral {
            number: leaf(TokenKind::Number, "0"),
        }),
        Node::new(TextLiteral {
            text: leaf(TokenKind::Text, "''"),
        }),
        Node::new(NoneLiteral {
            none: leaf(TokenKind::NoneLiteral, "ø"),
        }),
        Node::new(ListLiteral {
            open: leaf(TokenKind::LBracket, "["),
            items: Vec::new(),
            close: Some(leaf(TokenKind::RBracket, "]")),
        }),
        Node::new(SetLiteral {
            open: leaf(TokenKind::LBrace, "{"),
            items: Vec::new(),
            close: Some(leaf(TokenKind::RBrace, "}")),
        }),
        Node::new(MapLiteral {
            open: leaf(TokenKind::LBrace, "{"),
            entries: Vec::new(),
            bind: Some(leaf(TokenKind::Colon, ":")),
            close: Some(leaf(TokenKind::RBrace, "}")),
        }),
    ]
}

fn type_candidates() -> Vec<Node> {
    vec![
        Node::new(TypePlaceholder {
            placeholder: leaf(TokenKind::Placeholder, "_"),
        }),
        Node::new(BooleanType {
            question: leaf(TokenKind::Question, "?"),
        }),
        Node::new(NumberType {
            number: leaf(TokenKind::NumberType, "#"),
        }),
        Node::new(TextType {
            text: leaf(TokenKind::Text, "''"),
        }),
        Node::new(NoneType {
            none: leaf(TokenKind::NoneLiteral, "ø"),
        }),
    ]
}

/// Nodes that could fill `field` of a node at `anchor`.
///
/// Expression slots get placeholders, one literal of each kind and a
/// reference to every name in scope. Type slots get the primitive types
/// and every structure in scope. Other slots have no candidates.
pub fn candidates(field: &Field, anchor: &Node, ctx: &Context) -> Vec<Node> {
    let mut seen = FxHashSet::default();
    match field.category {
        Category::Expression | Category::Statement => {
            let mut out = expression_candidates();
            for (name, _) in scopes(anchor, ctx) {
                if seen.insert(name.clone()) {
                    out.push(Node::new(Reference {
                        name: leaf(TokenKind::Name, name.as_str()),
                    }));
                }
            }
            out
        }
        Category::Type => {
            let mut out = type_candidates();
            for (name, definition) in scopes(anchor, ctx) {
                if matches!(definition, Definition::Structure(_)) && seen.insert(name.clone()) {
                    out.push(Node::new(NameType {
                        name: leaf(TokenKind::Name, name.as_str()),
                    }));
                }
            }
            out
        }
        _ => Vec::new(),
    }
}
