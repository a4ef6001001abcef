//! Token cooking layer.
//!
//! Turns `(RawToken, slice)` pairs from the logos scanner into [`Token`]s,
//! folding whitespace into the leading trivia of the next token:
//!
//! ```text
//! source → RawToken::lexer → (RawToken, slice) → TokenCooker → TokenList
//! ```
//!
//! Unterminated literals and unrecognized glyphs become
//! [`TokenKind::Unknown`] tokens; the cooker never fails.

use lumen_ir::{Token, TokenKind, TokenList};

use crate::raw_token::RawToken;

/// Accumulates cooked tokens and pending trivia for one source.
pub(crate) struct TokenCooker {
    tokens: Vec<Token>,
    trivia: String,
    errors: usize,
}

impl TokenCooker {
    pub(crate) fn new() -> Self {
        TokenCooker {
            tokens: Vec::new(),
            trivia: String::new(),
            errors: 0,
        }
    }

    /// Cook one scanned token. `None` is a scanner error.
    pub(crate) fn cook(&mut self, raw: Option<RawToken>, slice: &str) {
        let kind = match raw {
            Some(RawToken::Whitespace) => {
                self.trivia.push_str(slice);
                return;
            }
            Some(raw) => kind_of(raw),
            None => TokenKind::Unknown,
        };
        if kind.is_error() {
            self.errors += 1;
        }
        let trivia = std::mem::take(&mut self.trivia);
        self.tokens.push(Token::new(kind, slice, &trivia));
    }

    /// Number of error tokens cooked so far.
    pub(crate) fn error_count(&self) -> usize {
        self.errors
    }

    /// Append the end token, which carries any trailing trivia.
    pub(crate) fn finish(mut self) -> TokenList {
        let trivia = std::mem::take(&mut self.trivia);
        self.tokens.push(Token::new(TokenKind::End, "", &trivia));
        TokenList::new(self.tokens)
    }
}

/// Direct mapping; every non-whitespace raw token has exactly one kind.
fn kind_of(raw: RawToken) -> TokenKind {
    match raw {
        RawToken::Whitespace | RawToken::UnterminatedText | RawToken::UnterminatedDocs => {
            TokenKind::Unknown
        }
        RawToken::Number => TokenKind::Number,
        RawToken::Text => TokenKind::Text,
        RawToken::Docs => TokenKind::Docs,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::NoneLiteral => TokenKind::NoneLiteral,
        RawToken::Placeholder => TokenKind::Placeholder,
        RawToken::Name => TokenKind::Name,
        RawToken::NumberType => TokenKind::NumberType,
        RawToken::Operator => TokenKind::Operator,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::TableOpen => TokenKind::TableOpen,
        RawToken::TableClose => TokenKind::TableClose,
        RawToken::SelectOpen => TokenKind::SelectOpen,
        RawToken::InsertOpen => TokenKind::InsertOpen,
        RawToken::DeleteOpen => TokenKind::DeleteOpen,
        RawToken::UpdateOpen => TokenKind::UpdateOpen,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Question => TokenKind::Question,
        RawToken::Function => TokenKind::Function,
        RawToken::TypeMark => TokenKind::TypeMark,
        RawToken::Convert => TokenKind::Convert,
        RawToken::Previous => TokenKind::Previous,
        RawToken::Stream => TokenKind::Stream,
        RawToken::Change => TokenKind::Change,
        RawToken::Borrow => TokenKind::Borrow,
    }
}

#[cfg(test)]
mod tests;
