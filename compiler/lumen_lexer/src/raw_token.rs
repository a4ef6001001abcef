//! Raw Token Definition
//!
//! The `RawToken` enum is the logos-derived scanner output before trivia is
//! attached and the final `TokenKind` is chosen.

use logos::Logos;

/// Raw token from logos (before trivia attachment).
///
/// Whitespace is a token here rather than skipped so the cooker can keep it
/// as trivia.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    // Literals
    #[regex(r"[0-9]+(\.[0-9]+)?([A-Za-z]+(\^-?[0-9]+)?(·[A-Za-z]+(\^-?[0-9]+)?)*(/[A-Za-z]+(\^-?[0-9]+)?(·[A-Za-z]+(\^-?[0-9]+)?)*)?)?")]
    Number,
    #[regex(r"'[^']*'")]
    #[regex(r#""[^"]*""#)]
    Text,
    #[regex(r"'[^']*")]
    #[regex(r#""[^"]*"#)]
    UnterminatedText,
    #[regex(r"¶[^¶]*¶")]
    Docs,
    #[regex(r"¶[^¶]*")]
    UnterminatedDocs,
    #[token("⊤")]
    True,
    #[token("⊥")]
    False,
    #[token("ø")]
    NoneLiteral,
    #[token("_", priority = 3)]
    Placeholder,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Name,

    #[regex(r"#([A-Za-z]+(\^-?[0-9]+)?(·[A-Za-z]+(\^-?[0-9]+)?)*(/[A-Za-z]+(\^-?[0-9]+)?(·[A-Za-z]+(\^-?[0-9]+)?)*)?)?")]
    NumberType,

    // Operators
    #[token("+")]
    #[token("-")]
    #[token("×")]
    #[token("·")]
    #[token("*")]
    #[token("÷")]
    #[token("/")]
    #[token("%")]
    #[token("^")]
    #[token("<")]
    #[token(">")]
    #[token("≤")]
    #[token("<=")]
    #[token("≥")]
    #[token(">=")]
    #[token("=")]
    #[token("≠")]
    #[token("!=")]
    #[token("&")]
    #[token("|")]
    #[token("¬")]
    #[token("~")]
    Operator,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("⎡")]
    TableOpen,
    #[token("⎦")]
    TableClose,
    #[token("⎡?")]
    SelectOpen,
    #[token("⎡+")]
    InsertOpen,
    #[token("⎡-")]
    DeleteOpen,
    #[token("⎡:")]
    UpdateOpen,

    // Glyphs
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token("ƒ")]
    Function,
    #[token("•")]
    TypeMark,
    #[token("→")]
    #[token("->")]
    Convert,
    #[token("←")]
    Previous,
    #[token("…")]
    #[token("...")]
    Stream,
    #[token("∆")]
    Change,
    #[token("↓")]
    Borrow,
}
