//! Error recovery for the parser.
//!
//! Token sets for deciding where an unparsable run of tokens stops, and
//! which tokens may begin a production. Membership is an O(1) bit test.

use lumen_ir::TokenKind;

use crate::cursor::Cursor;

/// A set of token kinds, one bit per `TokenKind` discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline]
    #[must_use]
    pub const fn with(self, kind: TokenKind) -> Self {
        Self(self.0 | (1u64 << kind.discriminant_index()))
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(&self, kind: TokenKind) -> bool {
        (self.0 & (1u64 << kind.discriminant_index())) != 0
    }

    #[inline]
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }
}

impl Default for TokenSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Closing delimiters and the end of input: an unparsable run never
/// swallows these.
pub const RECOVERY: TokenSet = TokenSet::new()
    .with(TokenKind::RParen)
    .with(TokenKind::RBracket)
    .with(TokenKind::RBrace)
    .with(TokenKind::TableClose)
    .with(TokenKind::End);

/// Tokens that can begin an expression. Operators are checked separately
/// since only the unary ones qualify.
pub const EXPRESSION_START: TokenSet = TokenSet::new()
    .with(TokenKind::Number)
    .with(TokenKind::Text)
    .with(TokenKind::True)
    .with(TokenKind::False)
    .with(TokenKind::NoneLiteral)
    .with(TokenKind::Name)
    .with(TokenKind::Dot)
    .with(TokenKind::Placeholder)
    .with(TokenKind::LBracket)
    .with(TokenKind::LBrace)
    .with(TokenKind::TableOpen)
    .with(TokenKind::LParen)
    .with(TokenKind::Function)
    .with(TokenKind::TypeMark)
    .with(TokenKind::Convert)
    .with(TokenKind::Previous)
    .with(TokenKind::Change)
    .with(TokenKind::Docs);

/// Tokens that can begin a type. `|` unions are handled by the type rule.
pub const TYPE_START: TokenSet = TokenSet::new()
    .with(TokenKind::Question)
    .with(TokenKind::NumberType)
    .with(TokenKind::Text)
    .with(TokenKind::NoneLiteral)
    .with(TokenKind::LBracket)
    .with(TokenKind::LBrace)
    .with(TokenKind::TableOpen)
    .with(TokenKind::Function)
    .with(TokenKind::Stream)
    .with(TokenKind::Name)
    .with(TokenKind::Placeholder);

/// True if an expression can start at the cursor.
pub fn at_expression_start(cursor: &Cursor<'_>) -> bool {
    EXPRESSION_START.contains(cursor.current_kind()) || cursor.unary_op().is_some()
}

/// Advance past the rest of an unparsable run: stop before a recovery
/// token or at the start of the next line. Returns the skipped tokens.
pub fn skip_to_boundary(cursor: &mut Cursor<'_>) -> Vec<lumen_ir::Node> {
    let mut skipped = Vec::new();
    while !RECOVERY.contains(cursor.current_kind()) && !cursor.on_new_line() {
        skipped.push(cursor.advance());
    }
    skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_kind_fits_the_bitset() {
        assert!(TokenKind::End.discriminant_index() < 64);
    }

    #[test]
    fn membership() {
        assert!(RECOVERY.contains(TokenKind::RParen));
        assert!(!RECOVERY.contains(TokenKind::Name));
        assert_eq!(RECOVERY.count(), 5);
        assert!(EXPRESSION_START.union(TYPE_START).contains(TokenKind::Stream));
    }

    #[test]
    fn skipping_stops_at_boundaries() {
        let tokens = lumen_lexer::lex("a b c) d");
        let mut cursor = Cursor::new(&tokens);
        assert_eq!(skip_to_boundary(&mut cursor).len(), 3);
        assert!(cursor.check(TokenKind::RParen));

        let tokens = lumen_lexer::lex("a b\nc");
        let mut cursor = Cursor::new(&tokens);
        assert_eq!(skip_to_boundary(&mut cursor).len(), 2);
        assert!(cursor.on_new_line());
    }

    #[test]
    fn unary_operators_start_expressions() {
        let tokens = lumen_lexer::lex("-1 ×2");
        let mut cursor = Cursor::new(&tokens);
        assert!(at_expression_start(&cursor));
        cursor.advance();
        cursor.advance();
        assert!(!at_expression_start(&cursor));
    }
}
