//! Type productions.
//!
//! ```text
//! type     := primtype ('|' primtype)*
//! primtype := '?' | '#unit' | TEXT | 'ø' | '[' type ']' | '{' type '}'
//!           | '{' type ':' type '}' | '⎡' bind* '⎦' | 'ƒ' '(' bind* ')' type
//!           | '…' type | NAME | '_'
//! ```

use lumen_ir::{
    BooleanType, FunctionType, ListType, MapType, NameType, Node, NoneType, NumberType, SetType,
    StreamType, TableType, TextType, TokenKind, TypePlaceholder, UnionType, UnparsableType,
};
use lumen_stack::ensure_sufficient_stack;
use tracing::debug;

use crate::recovery::{skip_to_boundary, TYPE_START};
use crate::Parser;

impl Parser<'_> {
    pub fn parse_type(&mut self) -> Node {
        ensure_sufficient_stack(|| {
            let mut left = self.parse_primitive_type();
            while self.cursor.check_operator("|") {
                let bar = self.cursor.advance();
                let right = self.parse_primitive_type();
                left = Node::new(UnionType { left, bar, right });
            }
            left
        })
    }

    fn optional_type(&mut self) -> Option<Node> {
        TYPE_START
            .contains(self.cursor.current_kind())
            .then(|| self.parse_type())
    }

    fn parse_primitive_type(&mut self) -> Node {
        match self.cursor.current_kind() {
            TokenKind::Question => Node::new(BooleanType {
                question: self.cursor.advance(),
            }),
            TokenKind::NumberType => Node::new(NumberType {
                number: self.cursor.advance(),
            }),
            TokenKind::Text => Node::new(TextType {
                text: self.cursor.advance(),
            }),
            TokenKind::NoneLiteral => Node::new(NoneType {
                none: self.cursor.advance(),
            }),
            TokenKind::Name => Node::new(NameType {
                name: self.cursor.advance(),
            }),
            TokenKind::Placeholder => Node::new(TypePlaceholder {
                placeholder: self.cursor.advance(),
            }),
            TokenKind::LBracket => {
                let open = self.cursor.advance();
                let item = self.optional_type();
                let close = self.cursor.eat(TokenKind::RBracket);
                Node::new(ListType { open, item, close })
            }
            TokenKind::LBrace => {
                let open = self.cursor.advance();
                let key = self.optional_type();
                match self.cursor.eat(TokenKind::Colon) {
                    Some(colon) => {
                        let value = self.optional_type();
                        let close = self.cursor.eat(TokenKind::RBrace);
                        Node::new(MapType {
                            open,
                            key,
                            colon,
                            value,
                            close,
                        })
                    }
                    None => {
                        let close = self.cursor.eat(TokenKind::RBrace);
                        Node::new(SetType {
                            open,
                            item: key,
                            close,
                        })
                    }
                }
            }
            TokenKind::TableOpen => {
                let open = self.cursor.advance();
                let columns = self.parse_binds_until(TokenKind::TableClose);
                let close = self.cursor.eat(TokenKind::TableClose);
                Node::new(TableType {
                    open,
                    columns,
                    close,
                })
            }
            TokenKind::Function => {
                let fun = self.cursor.advance();
                let open = self.cursor.eat(TokenKind::LParen);
                let mut inputs = Vec::new();
                let mut close = None;
                if open.is_some() {
                    inputs = self.parse_binds_until(TokenKind::RParen);
                    close = self.cursor.eat(TokenKind::RParen);
                }
                let output = self.optional_type();
                Node::new(FunctionType {
                    fun,
                    open,
                    inputs,
                    close,
                    output,
                })
            }
            TokenKind::Stream => {
                let dots = self.cursor.advance();
                let item = self.optional_type();
                Node::new(StreamType { dots, item })
            }
            _ => {
                let mut tokens = Vec::new();
                if !self.cursor.is_at_end() {
                    tokens.push(self.cursor.advance());
                }
                tokens.extend(skip_to_boundary(&mut self.cursor));
                debug!(
                    pos = self.cursor.position(),
                    skipped = tokens.len(),
                    "unparsable type"
                );
                Node::new(UnparsableType { tokens })
            }
        }
    }
}
