//! Expression productions, from reactions down to atoms.

use lumen_ir::{
    BinaryOperation, BooleanLiteral, Changed, Conditional, ConversionDefinition, Convert,
    Documented, Evaluate, ExpressionPlaceholder, FunctionDefinition, Is, KeyValue, ListLiteral,
    MapLiteral, Node, NoneLiteral, NumberLiteral, Previous, PropertyReference, Reaction,
    Reference, SetLiteral, StructureDefinition, TextLiteral, This, TokenKind, UnaryOperation,
};
use lumen_stack::ensure_sufficient_stack;
use tracing::trace;

use crate::recovery::at_expression_start;
use crate::Parser;

impl Parser<'_> {
    /// `expression := reaction`
    pub fn parse_expression(&mut self) -> Node {
        ensure_sufficient_stack(|| self.parse_reaction())
    }

    /// `reaction := conditional ('…' conditional '…' conditional)?`
    fn parse_reaction(&mut self) -> Node {
        let initial = self.parse_conditional();
        if !self.cursor.check(TokenKind::Stream) {
            return initial;
        }
        let dots = self.cursor.advance();
        let condition = self.parse_conditional();
        let Some(next_dots) = self.cursor.eat(TokenKind::Stream) else {
            return self.unparsable(vec![initial, dots, condition]);
        };
        let next = self.parse_conditional();
        Node::new(Reaction {
            initial,
            dots,
            condition,
            next_dots,
            next,
        })
    }

    /// `conditional := binary ('?' expression expression)?`
    fn parse_conditional(&mut self) -> Node {
        let condition = self.parse_binary(0);
        if !self.cursor.check(TokenKind::Question) {
            return condition;
        }
        let question = self.cursor.advance();
        let yes = self.parse_expression();
        let no = self.parse_expression();
        Node::new(Conditional {
            condition,
            question,
            yes,
            no,
        })
    }

    /// An operator chain without a trailing conditional or reaction.
    pub(crate) fn parse_binary_expression(&mut self) -> Node {
        self.parse_binary(0)
    }

    /// Precedence climbing. Operators at or above `min` bind here; the
    /// right operand only takes strictly tighter operators, which groups
    /// equal precedence to the left.
    fn parse_binary(&mut self, min: u8) -> Node {
        let mut left = self.parse_postfix();
        while let Some(op) = self.cursor.binary_op() {
            let precedence = op.precedence();
            if precedence < min {
                break;
            }
            trace!(op = op.as_symbol(), precedence, "binary operator");
            let operator = self.cursor.advance();
            let right = self.parse_binary(precedence + 1);
            left = Node::new(BinaryOperation {
                left,
                operator,
                right,
            });
        }
        left
    }

    /// Atom followed by calls, property access, type checks, conversions,
    /// and table operations.
    fn parse_postfix(&mut self) -> Node {
        let mut expression = self.parse_atom();
        loop {
            expression = match self.cursor.current_kind() {
                TokenKind::LParen if self.cursor.is_attached() => self.parse_evaluate(expression),
                TokenKind::Dot
                    if self.cursor.is_attached()
                        && self.cursor.peek_kind(1) == TokenKind::Name =>
                {
                    let dot = self.cursor.advance();
                    let name = Some(self.cursor.advance());
                    Node::new(PropertyReference {
                        structure: expression,
                        dot,
                        name,
                    })
                }
                TokenKind::TypeMark if self.cursor.is_attached() => {
                    let dot = self.cursor.advance();
                    let ty = self.parse_type();
                    Node::new(Is {
                        expression,
                        dot,
                        ty,
                    })
                }
                TokenKind::Convert if !self.cursor.on_new_line() => {
                    let arrow = self.cursor.advance();
                    let ty = self.parse_type();
                    Node::new(Convert {
                        expression,
                        arrow,
                        ty,
                    })
                }
                TokenKind::SelectOpen
                | TokenKind::InsertOpen
                | TokenKind::DeleteOpen
                | TokenKind::UpdateOpen => self.parse_table_operation(expression),
                _ => return expression,
            };
        }
    }

    /// `'(' expression* ')'` directly after the callee.
    fn parse_evaluate(&mut self, function: Node) -> Node {
        let open = self.cursor.advance();
        let inputs = self.parse_expressions_until(TokenKind::RParen);
        let close = self.cursor.eat(TokenKind::RParen);
        Node::new(Evaluate {
            function,
            open,
            inputs,
            close,
        })
    }

    /// Expressions up to `close`, stopping early at anything that cannot
    /// start one.
    pub(crate) fn parse_expressions_until(&mut self, close: TokenKind) -> Vec<Node> {
        let mut items = Vec::new();
        while !self.cursor.check(close) && at_expression_start(&self.cursor) {
            items.push(self.parse_expression());
        }
        items
    }

    fn parse_atom(&mut self) -> Node {
        trace!(
            pos = self.cursor.position(),
            kind = self.cursor.current_kind().display_name(),
            "parse_atom"
        );
        match self.cursor.current_kind() {
            TokenKind::Number => Node::new(NumberLiteral {
                number: self.cursor.advance(),
            }),
            TokenKind::Text => Node::new(TextLiteral {
                text: self.cursor.advance(),
            }),
            TokenKind::True | TokenKind::False => Node::new(BooleanLiteral {
                value: self.cursor.advance(),
            }),
            TokenKind::NoneLiteral => Node::new(NoneLiteral {
                none: self.cursor.advance(),
            }),
            TokenKind::Name => Node::new(Reference {
                name: self.cursor.advance(),
            }),
            TokenKind::Dot => Node::new(This {
                dot: self.cursor.advance(),
            }),
            TokenKind::Placeholder => self.parse_placeholder(),
            TokenKind::LBracket => self.parse_list(),
            TokenKind::LBrace => self.parse_set_or_map(),
            TokenKind::TableOpen => self.parse_table(),
            TokenKind::LParen => self.parse_block(),
            TokenKind::Function => self.parse_function(None),
            TokenKind::TypeMark => self.parse_structure(None),
            TokenKind::Convert => self.parse_conversion(None),
            TokenKind::Previous => self.parse_previous(),
            TokenKind::Change => {
                let delta = self.cursor.advance();
                let stream = self.parse_postfix();
                Node::new(Changed { delta, stream })
            }
            TokenKind::Docs => self.parse_documented(),
            TokenKind::Operator if self.cursor.unary_op().is_some() => {
                let operator = self.cursor.advance();
                let operand = ensure_sufficient_stack(|| self.parse_postfix());
                Node::new(UnaryOperation { operator, operand })
            }
            _ => self.unparsable(Vec::new()),
        }
    }

    /// `'_' ('•' type)?`
    fn parse_placeholder(&mut self) -> Node {
        let placeholder = self.cursor.advance();
        let (dot, ty) = if self.cursor.check(TokenKind::TypeMark) && self.cursor.is_attached() {
            let dot = self.cursor.advance();
            (Some(dot), Some(self.parse_type()))
        } else {
            (None, None)
        };
        Node::new(ExpressionPlaceholder {
            placeholder,
            dot,
            ty,
        })
    }

    /// `'[' expression* ']'`
    fn parse_list(&mut self) -> Node {
        let open = self.cursor.advance();
        let items = self.parse_expressions_until(TokenKind::RBracket);
        let close = self.cursor.eat(TokenKind::RBracket);
        Node::new(ListLiteral { open, items, close })
    }

    /// `'{' expression* '}'`, `'{' (expression ':' expression)* '}'`, or
    /// `'{' ':' '}'` for the empty map.
    fn parse_set_or_map(&mut self) -> Node {
        let open = self.cursor.advance();
        if self.cursor.check(TokenKind::Colon) && self.cursor.peek_kind(1) == TokenKind::RBrace {
            let bind = Some(self.cursor.advance());
            let close = self.cursor.eat(TokenKind::RBrace);
            return Node::new(MapLiteral {
                open,
                entries: Vec::new(),
                bind,
                close,
            });
        }
        if self.cursor.check(TokenKind::RBrace) || !at_expression_start(&self.cursor) {
            let close = self.cursor.eat(TokenKind::RBrace);
            return Node::new(SetLiteral {
                open,
                items: Vec::new(),
                close,
            });
        }

        let first = self.parse_expression();
        if !self.cursor.check(TokenKind::Colon) {
            let mut items = vec![first];
            items.extend(self.parse_expressions_until(TokenKind::RBrace));
            let close = self.cursor.eat(TokenKind::RBrace);
            return Node::new(SetLiteral { open, items, close });
        }

        let mut entries = Vec::new();
        let mut key = first;
        loop {
            let entry = match self.cursor.eat(TokenKind::Colon) {
                Some(colon) => {
                    let value = self.parse_expression();
                    Node::new(KeyValue { key, colon, value })
                }
                // A key without a value; keep its tokens.
                None => self.unparsable(vec![key]),
            };
            entries.push(entry);
            if self.cursor.check(TokenKind::RBrace) || !at_expression_start(&self.cursor) {
                break;
            }
            key = self.parse_expression();
        }
        let close = self.cursor.eat(TokenKind::RBrace);
        Node::new(MapLiteral {
            open,
            entries,
            bind: None,
            close,
        })
    }

    /// `'ƒ' NAME? '(' bind* ')' ('•' type)? expression`
    fn parse_function(&mut self, docs: Option<Node>) -> Node {
        let fun = self.cursor.advance();
        let name = self.cursor.eat(TokenKind::Name);
        let open = self.cursor.eat(TokenKind::LParen);
        let mut inputs = Vec::new();
        let mut close = None;
        if open.is_some() {
            inputs = self.parse_binds_until(TokenKind::RParen);
            close = self.cursor.eat(TokenKind::RParen);
        }
        let (dot, output) = match self.cursor.eat(TokenKind::TypeMark) {
            Some(dot) => (Some(dot), Some(self.parse_type())),
            None => (None, None),
        };
        let body = at_expression_start(&self.cursor).then(|| self.parse_expression());
        Node::new(FunctionDefinition {
            docs,
            fun,
            name,
            open,
            inputs,
            close,
            dot,
            output,
            body,
        })
    }

    /// `'•' NAME NAME* '(' bind* ')' block?`
    fn parse_structure(&mut self, docs: Option<Node>) -> Node {
        let dot = self.cursor.advance();
        let name = self.cursor.eat(TokenKind::Name);
        let mut interfaces = Vec::new();
        while self.cursor.check(TokenKind::Name) && !self.cursor.on_new_line() {
            interfaces.push(Node::new(Reference {
                name: self.cursor.advance(),
            }));
        }
        let open = self.cursor.eat(TokenKind::LParen);
        let mut inputs = Vec::new();
        let mut close = None;
        if open.is_some() {
            inputs = self.parse_binds_until(TokenKind::RParen);
            close = self.cursor.eat(TokenKind::RParen);
        }
        let body = (self.cursor.check(TokenKind::LParen) && !self.cursor.on_new_line())
            .then(|| self.parse_block());
        Node::new(StructureDefinition {
            docs,
            dot,
            name,
            interfaces,
            open,
            inputs,
            close,
            body,
        })
    }

    /// `'→' type type expression`
    fn parse_conversion(&mut self, docs: Option<Node>) -> Node {
        let arrow = self.cursor.advance();
        let input = self.parse_type();
        let output = self.parse_type();
        let body = self.parse_expression();
        Node::new(ConversionDefinition {
            docs,
            arrow,
            input,
            output,
            body,
        })
    }

    /// `'←' NUMBER? postfix`
    fn parse_previous(&mut self) -> Node {
        let arrow = self.cursor.advance();
        let offset = self.cursor.eat(TokenKind::Number);
        let stream = self.parse_postfix();
        Node::new(Previous {
            arrow,
            offset,
            stream,
        })
    }

    /// Docs before a definition attach to it; before anything else they wrap
    /// the expression.
    fn parse_documented(&mut self) -> Node {
        let docs = self.parse_docs();
        match self.cursor.current_kind() {
            TokenKind::Function => self.parse_function(Some(docs)),
            TokenKind::TypeMark => self.parse_structure(Some(docs)),
            TokenKind::Convert => self.parse_conversion(Some(docs)),
            _ => {
                let expression = self.parse_expression();
                Node::new(Documented { docs, expression })
            }
        }
    }

    /// Binds up to `close`; anything that is not a bind is kept as an
    /// unparsable run so the loop always advances.
    pub(crate) fn parse_binds_until(&mut self, close: TokenKind) -> Vec<Node> {
        let mut binds = Vec::new();
        while !self.cursor.check(close) && !self.cursor.is_at_end() {
            if self.cursor.check(TokenKind::Name) || self.cursor.check(TokenKind::Docs) {
                binds.push(self.parse_bind());
            } else if crate::recovery::RECOVERY.contains(self.cursor.current_kind()) {
                break;
            } else {
                binds.push(self.unparsable(Vec::new()));
            }
        }
        binds
    }
}
