//! Table literals and table operations.
//!
//! ```text
//! table  := '⎡' bind* '⎦' ('⎡' expression* '⎦')*
//! select := expr '⎡?' NAME* '⎦' expression
//! insert := expr '⎡+' expression* '⎦'
//! delete := expr '⎡-' '⎦' expression
//! update := expr '⎡:' bind* '⎦' expression
//! ```
//!
//! Queries parse at binary-operator level so a query ends before a
//! following `?` or `…`.

use lumen_ir::{Delete, Insert, Node, Reference, Row, Select, TableLiteral, TokenKind, Update};

use crate::Parser;

impl Parser<'_> {
    /// `'⎡' bind* '⎦'` followed by value rows.
    pub(crate) fn parse_table(&mut self) -> Node {
        let open = self.cursor.advance();
        let cells = self.parse_binds_until(TokenKind::TableClose);
        let close = self.cursor.eat(TokenKind::TableClose);
        let header = Node::new(Row { open, cells, close });

        let mut rows = Vec::new();
        while self.cursor.check(TokenKind::TableOpen) {
            rows.push(self.parse_row());
        }
        Node::new(TableLiteral { header, rows })
    }

    /// A value row: `'⎡' expression* '⎦'`. Any row opener is accepted so
    /// this entry point also serves editors replacing a single row.
    pub fn parse_row(&mut self) -> Node {
        let open = self.cursor.advance();
        let cells = self.parse_expressions_until(TokenKind::TableClose);
        let close = self.cursor.eat(TokenKind::TableClose);
        Node::new(Row { open, cells, close })
    }

    pub(crate) fn parse_table_operation(&mut self, table: Node) -> Node {
        match self.cursor.current_kind() {
            TokenKind::SelectOpen => {
                let open = self.cursor.advance();
                let mut cells = Vec::new();
                while self.cursor.check(TokenKind::Name) {
                    cells.push(Node::new(Reference {
                        name: self.cursor.advance(),
                    }));
                }
                let close = self.cursor.eat(TokenKind::TableClose);
                let row = Node::new(Row { open, cells, close });
                let query = self.parse_query();
                Node::new(Select { table, row, query })
            }
            TokenKind::InsertOpen => {
                let row = self.parse_row();
                Node::new(Insert { table, row })
            }
            TokenKind::DeleteOpen => {
                let open = self.cursor.advance();
                let close = self.cursor.eat(TokenKind::TableClose);
                let row = Node::new(Row {
                    open,
                    cells: Vec::new(),
                    close,
                });
                let query = self.parse_query();
                Node::new(Delete { table, row, query })
            }
            _ => {
                let open = self.cursor.advance();
                let cells = self.parse_binds_until(TokenKind::TableClose);
                let close = self.cursor.eat(TokenKind::TableClose);
                let row = Node::new(Row { open, cells, close });
                let query = self.parse_query();
                Node::new(Update { table, row, query })
            }
        }
    }

    fn parse_query(&mut self) -> Node {
        lumen_stack::ensure_sufficient_stack(|| self.parse_binary_expression())
    }
}
