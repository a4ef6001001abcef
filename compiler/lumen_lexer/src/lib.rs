//! Lexer for Lumen using logos.
//!
//! [`lex`] covers the entire input: whitespace is kept as leading trivia of
//! the following token and the final `End` token carries whatever trails, so
//! `lex(s).source() == s` for every `s`. Lexing never fails; bad input
//! becomes [`TokenKind::Unknown`](lumen_ir::TokenKind::Unknown) tokens.

mod cooker;
mod raw_token;

use logos::Logos;
use lumen_ir::TokenList;
use tracing::debug;

use crate::cooker::TokenCooker;
use crate::raw_token::RawToken;

/// Lex source text into a `TokenList` ending with `End`.
pub fn lex(source: &str) -> TokenList {
    let mut cooker = TokenCooker::new();
    let mut logos = RawToken::lexer(source);

    while let Some(result) = logos.next() {
        let span = logos.span();
        match result {
            Ok(raw) => cooker.cook(Some(raw), &source[span]),
            Err(()) => {
                // Errors may stop inside a multi-byte glyph; widen to a
                // whole character so every token is valid text.
                let mut end = span.end;
                while end < source.len() && !source.is_char_boundary(end) {
                    end += 1;
                }
                if end > span.end {
                    logos.bump(end - span.end);
                }
                cooker.cook(None, &source[span.start..end]);
            }
        }
    }

    if cooker.error_count() > 0 {
        debug!(errors = cooker.error_count(), "lexed with unknown tokens");
    }
    cooker.finish()
}
