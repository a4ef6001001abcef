//! Token cursor for navigating the token stream.
//!
//! Provides token access, lookahead, and consumption. Consumed tokens come
//! back as leaf [`Node`]s so grammar rules can drop them straight into a
//! slot; a token that is advanced over must end up in some node or the
//! printed tree would lose text.

use lumen_ir::{BinaryOp, Node, Token, TokenKind, TokenList, UnaryOp};
use tracing::trace;

/// Cursor for navigating tokens.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    /// Stands in for a missing trailing `End`.
    end: Token,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of the token stream.
    pub fn new(tokens: &'a TokenList) -> Self {
        Cursor {
            tokens: tokens.as_slice(),
            end: Token::bare(TokenKind::End, ""),
            pos: 0,
        }
    }

    /// Current position; compare before and after a rule to detect progress.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get the current token.
    ///
    /// Reads past the last token see an `End` token, so a hand-built list
    /// without one still parses.
    #[inline]
    pub fn current(&self) -> &Token {
        self.peek(0)
    }

    /// Token `n` positions ahead of the current one.
    pub fn peek(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).unwrap_or(&self.end)
    }

    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub fn peek_kind(&self, n: usize) -> TokenKind {
        self.peek(n).kind
    }

    /// Check if at end of token stream.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.current_kind() == TokenKind::End
    }

    /// Check if the current token matches the given kind.
    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// True if the current token is written directly against the previous
    /// one. Calls, property access and `•` checks require it.
    #[inline]
    pub fn is_attached(&self) -> bool {
        !self.current().has_trivia()
    }

    /// True if a line break precedes the current token.
    #[inline]
    pub fn on_new_line(&self) -> bool {
        self.current().follows_newline()
    }

    /// The binary operator under the cursor, if any.
    pub fn binary_op(&self) -> Option<BinaryOp> {
        if self.check(TokenKind::Operator) {
            BinaryOp::from_symbol(&self.current().text)
        } else {
            None
        }
    }

    /// The unary operator under the cursor, if any.
    pub fn unary_op(&self) -> Option<UnaryOp> {
        if self.check(TokenKind::Operator) {
            UnaryOp::from_symbol(&self.current().text)
        } else {
            None
        }
    }

    /// True if the current token is the operator `symbol`.
    pub fn check_operator(&self, symbol: &str) -> bool {
        self.check(TokenKind::Operator) && &*self.current().text == symbol
    }

    /// Advance to the next token and return the consumed token as a leaf.
    ///
    /// At the end of the stream this returns the `End` token without moving;
    /// grammar rules check before consuming, so only recovery paths hit it.
    pub fn advance(&mut self) -> Node {
        let token = self.current().clone();
        trace!(
            pos = self.pos,
            kind = token.kind.display_name(),
            text = &*token.text,
            "advance"
        );
        if !self.is_at_end() {
            self.pos += 1;
        }
        Node::leaf(token)
    }

    /// Consume the current token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> Option<Node> {
        self.check(kind).then(|| self.advance())
    }
}

#[cfg(test)]
mod tests;
