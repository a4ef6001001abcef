//! Recursive descent parser for Lumen.
//!
//! Produces an immutable [`Node`] tree. Parsing never fails: input no
//! production accepts becomes an `UnparsableExpression` or
//! `UnparsableType` node that keeps the offending tokens, so printing the
//! tree always reproduces the source exactly.
//!
//! There is one entry point per grammatical category:
//! [`Parser::parse_program`], [`Parser::parse_expression`],
//! [`Parser::parse_type`], [`Parser::parse_bind`], [`Parser::parse_row`],
//! and [`Parser::parse_docs`].
//!
//! Binary operators use precedence climbing over the table in
//! [`BinaryOp::precedence`](lumen_ir::BinaryOp::precedence). Operators of
//! equal precedence group left to right, so `2 - 3 - 1` is `(2 - 3) - 1`.

mod cursor;
mod grammar;
mod recovery;

pub use cursor::Cursor;
pub use recovery::{TokenSet, EXPRESSION_START, RECOVERY, TYPE_START};

use lumen_ir::{Node, TokenList};

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a TokenList) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
        }
    }

    /// True once every token up to `End` has been consumed.
    pub fn is_finished(&self) -> bool {
        self.cursor.is_at_end()
    }
}

/// Parse a whole program.
pub fn parse(tokens: &TokenList) -> Node {
    Parser::new(tokens).parse_program()
}

/// Lex and parse a whole program.
pub fn parse_source(source: &str) -> Node {
    parse(&lumen_lexer::lex(source))
}

/// Lex and parse a single expression, ignoring anything after it.
pub fn parse_expression_source(source: &str) -> Node {
    Parser::new(&lumen_lexer::lex(source)).parse_expression()
}

/// Lex and parse a single type, ignoring anything after it.
pub fn parse_type_source(source: &str) -> Node {
    Parser::new(&lumen_lexer::lex(source)).parse_type()
}

#[cfg(test)]
mod tests;
