//! Grammar productions.
//!
//! - `mod.rs`: programs, borrows, docs, statements, blocks, binds
//! - `expr.rs`: expressions, from reactions down to atoms
//! - `ty.rs`: types
//! - `table.rs`: table literals, rows, and the table operations

mod expr;
mod table;
mod ty;

use lumen_ir::{
    Alias, Bind, Block, Borrow, Docs, Node, NodeKind, Program, TokenKind,
    UnparsableExpression,
};
use tracing::debug;

use crate::recovery::skip_to_boundary;
use crate::Parser;

impl Parser<'_> {
    /// `program := docs? borrow* statement* END`
    pub fn parse_program(&mut self) -> Node {
        debug!(pos = self.cursor.position(), "parse_program");
        let docs = self.program_docs();
        let mut borrows = Vec::new();
        while self.cursor.check(TokenKind::Borrow) {
            borrows.push(self.parse_borrow());
        }
        let mut statements = Vec::new();
        while !self.cursor.is_at_end() {
            statements.push(self.parse_statement());
        }
        let block = Node::new(Block {
            open: None,
            statements,
            close: None,
        });
        let end = self.cursor.advance();
        Node::new(Program {
            docs,
            borrows,
            block,
            end,
        })
    }

    /// Leading docs belong to the program when a borrow or a blank line
    /// separates them from the first statement.
    fn program_docs(&mut self) -> Option<Node> {
        let mut count = 0;
        while self.cursor.peek_kind(count) == TokenKind::Docs {
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let after = self.cursor.peek(count);
        let detached = after.kind == TokenKind::Borrow
            || after.kind == TokenKind::End
            || after.trivia.matches('\n').count() >= 2;
        detached.then(|| self.parse_docs())
    }

    /// `borrow := '↓' NAME ('.' NAME)?`
    fn parse_borrow(&mut self) -> Node {
        let arrow = self.cursor.advance();
        let source = match self.cursor.eat(TokenKind::Name) {
            Some(name) => name,
            None => return self.unparsable(vec![arrow]),
        };
        let (dot, name) = if self.cursor.check(TokenKind::Dot)
            && self.cursor.is_attached()
            && self.cursor.peek_kind(1) == TokenKind::Name
        {
            let dot = self.cursor.advance();
            (Some(dot), Some(self.cursor.advance()))
        } else {
            (None, None)
        };
        Node::new(Borrow {
            arrow,
            source,
            dot,
            name,
        })
    }

    /// One or more consecutive documentation tokens.
    pub fn parse_docs(&mut self) -> Node {
        let mut docs = Vec::new();
        while let Some(doc) = self.cursor.eat(TokenKind::Docs) {
            docs.push(doc);
        }
        Node::new(Docs { docs })
    }

    /// `statement := bind | expression`
    ///
    /// A name followed by `•`, `:` or `,` starts a bind, so a type check
    /// of a bare name in statement position needs parentheses.
    pub(crate) fn parse_statement(&mut self) -> Node {
        let mut docs_len = 0;
        while self.cursor.peek_kind(docs_len) == TokenKind::Docs {
            docs_len += 1;
        }
        if self.starts_bind(docs_len) {
            self.parse_bind()
        } else {
            self.parse_expression()
        }
    }

    fn starts_bind(&self, offset: usize) -> bool {
        self.cursor.peek_kind(offset) == TokenKind::Name
            && matches!(
                self.cursor.peek_kind(offset + 1),
                TokenKind::TypeMark | TokenKind::Colon | TokenKind::Comma
            )
    }

    /// `bind := docs? name (',' name)* ('•' type)? (':' expression)?`
    pub fn parse_bind(&mut self) -> Node {
        let docs = self
            .cursor
            .check(TokenKind::Docs)
            .then(|| self.parse_docs());
        let mut names = Vec::new();
        while self.cursor.check(TokenKind::Name) {
            let name = self.cursor.advance();
            let separator = if self.cursor.check(TokenKind::Comma)
                && self.cursor.peek_kind(1) == TokenKind::Name
            {
                Some(self.cursor.advance())
            } else {
                None
            };
            let more = separator.is_some();
            names.push(Node::new(Alias { name, separator }));
            if !more {
                break;
            }
        }
        let (dot, ty) = match self.cursor.eat(TokenKind::TypeMark) {
            Some(dot) => (Some(dot), Some(self.parse_type())),
            None => (None, None),
        };
        let (colon, value) = match self.cursor.eat(TokenKind::Colon) {
            Some(colon) => (Some(colon), Some(self.parse_expression())),
            None => (None, None),
        };
        if names.is_empty() && dot.is_none() && colon.is_none() {
            // Nothing bind-like here; keep the tokens as the value.
            return Node::new(Bind {
                docs,
                names,
                dot,
                ty,
                colon,
                value: Some(self.parse_expression()),
            });
        }
        Node::new(Bind {
            docs,
            names,
            dot,
            ty,
            colon,
            value,
        })
    }

    /// Statements up to (not including) `close` or the end of input.
    fn parse_statements_until(&mut self, close: TokenKind) -> Vec<Node> {
        let mut statements = Vec::new();
        while !self.cursor.check(close) && !self.cursor.is_at_end() {
            statements.push(self.parse_statement());
        }
        statements
    }

    /// `'(' statement* ')'`
    pub(crate) fn parse_block(&mut self) -> Node {
        let open = self.cursor.advance();
        let statements = self.parse_statements_until(TokenKind::RParen);
        let close = self.cursor.eat(TokenKind::RParen);
        Node::new(Block {
            open: Some(open),
            statements,
            close,
        })
    }

    /// Wrap already-consumed nodes, plus the rest of the current run, as an
    /// unparsable expression. Always consumes at least one token when
    /// `consumed` is empty, so callers make progress.
    pub(crate) fn unparsable(&mut self, consumed: Vec<Node>) -> Node {
        let mut tokens: Vec<Node> = consumed
            .iter()
            .flat_map(|node| match node.kind() {
                NodeKind::Token(_) => vec![node.clone()],
                _ => node.tokens().into_iter().map(Node::leaf).collect(),
            })
            .collect();
        if tokens.is_empty() && !self.cursor.is_at_end() {
            tokens.push(self.cursor.advance());
        }
        tokens.extend(skip_to_boundary(&mut self.cursor));
        debug!(
            pos = self.cursor.position(),
            skipped = tokens.len(),
            "unparsable expression"
        );
        Node::new(UnparsableExpression { tokens })
    }
}
