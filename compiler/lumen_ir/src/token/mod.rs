//! Tokens produced by the tokenizer.
//!
//! A token owns its text and the whitespace that precedes it (its trivia),
//! so concatenating `trivia + text` over every token reproduces the source
//! exactly. The final [`TokenKind::End`] token carries any trailing
//! whitespace.

use std::fmt;
use std::sync::Arc;

use crate::Span;

/// Token categories.
///
/// Fieldless so that a kind fits in a bitset (see the parser's recovery
/// sets); the exact operator or literal is recovered from the text.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum TokenKind {
    // Literals and names
    Name,
    Number,
    Text,
    Docs,
    True,
    False,
    NoneLiteral,
    Placeholder,

    // Operators (binary or unary; see `BinaryOp::from_symbol`)
    Operator,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    TableOpen,
    TableClose,
    SelectOpen,
    InsertOpen,
    DeleteOpen,
    UpdateOpen,

    // Glyphs
    Colon,
    Comma,
    Dot,
    Question,
    Function,
    TypeMark,
    Convert,
    Previous,
    Stream,
    Change,
    Borrow,
    NumberType,

    /// Unrecognized glyph or unterminated literal.
    Unknown,
    End,
}

impl TokenKind {
    /// Index of this kind for bitset membership.
    #[inline]
    pub const fn discriminant_index(self) -> u32 {
        self as u32
    }

    /// True for tokens that are lexical errors.
    #[inline]
    pub const fn is_error(self) -> bool {
        matches!(self, TokenKind::Unknown)
    }

    /// Human-readable description used in debugging output.
    pub const fn display_name(self) -> &'static str {
        match self {
            TokenKind::Name => "name",
            TokenKind::Number => "number",
            TokenKind::Text => "text",
            TokenKind::Docs => "docs",
            TokenKind::True | TokenKind::False => "boolean",
            TokenKind::NoneLiteral => "none",
            TokenKind::Placeholder => "placeholder",
            TokenKind::Operator => "operator",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::TableOpen => "⎡",
            TokenKind::TableClose => "⎦",
            TokenKind::SelectOpen => "⎡?",
            TokenKind::InsertOpen => "⎡+",
            TokenKind::DeleteOpen => "⎡-",
            TokenKind::UpdateOpen => "⎡:",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Question => "?",
            TokenKind::Function => "ƒ",
            TokenKind::TypeMark => "•",
            TokenKind::Convert => "→",
            TokenKind::Previous => "←",
            TokenKind::Stream => "…",
            TokenKind::Change => "∆",
            TokenKind::Borrow => "↓",
            TokenKind::NumberType => "#",
            TokenKind::Unknown => "unknown",
            TokenKind::End => "end",
        }
    }
}

/// A single token with its leading trivia.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Arc<str>,
    pub trivia: Arc<str>,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str, trivia: &str) -> Self {
        Token {
            kind,
            text: Arc::from(text),
            trivia: Arc::from(trivia),
        }
    }

    /// A token with no leading whitespace.
    pub fn bare(kind: TokenKind, text: &str) -> Self {
        Token::new(kind, text, "")
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// True if whitespace precedes this token.
    #[inline]
    pub fn has_trivia(&self) -> bool {
        !self.trivia.is_empty()
    }

    /// True if the preceding whitespace contains a line break.
    pub fn follows_newline(&self) -> bool {
        self.trivia.contains('\n')
    }

    /// Source length including trivia.
    pub fn full_len(&self) -> usize {
        self.trivia.len() + self.text.len()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.kind, &*self.text)
    }
}

/// Tokenizer output: every token in source order, ending with `End`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenList { tokens }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// Spans of each token's text (trivia excluded), parallel to the list.
    pub fn spans(&self) -> Vec<Span> {
        let mut offset = 0usize;
        self.tokens
            .iter()
            .map(|token| {
                let start = offset + token.trivia.len();
                offset = start + token.text.len();
                Span::from_range(start..offset)
            })
            .collect()
    }

    /// Reassemble the exact source text.
    pub fn source(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            out.push_str(&token.trivia);
            out.push_str(&token.text);
        }
        out
    }
}

impl std::ops::Index<usize> for TokenList {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
