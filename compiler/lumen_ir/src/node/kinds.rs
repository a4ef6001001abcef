//! Node kinds and their grammar declarations.
//!
//! Each entry declares a kind, its own category, and its child slots in
//! source order. The `define_nodes!` macro turns the declarations into a
//! struct per kind plus the exhaustive `NodeKind` dispatch used for
//! children, grammar descriptions, and structural replacement.

use super::{Category, Field, Node, Slot};
use crate::{Name, Token, TokenKind};

macro_rules! define_nodes {
    ($(
        $(#[$meta:meta])*
        $kind:ident as $category:ident {
            $( $field:ident : $ty:ty => $slot:ident ),* $(,)?
        }
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Debug)]
            pub struct $kind {
                $( pub $field: $ty, )*
            }

            impl From<$kind> for NodeKind {
                fn from(node: $kind) -> Self {
                    NodeKind::$kind(node)
                }
            }
        )*

        /// Every kind of node. Token leaves wrap a [`Token`].
        #[derive(Clone, Debug)]
        pub enum NodeKind {
            Token(Token),
            $( $kind($kind), )*
        }

        impl NodeKind {
            pub fn label(&self) -> &'static str {
                match self {
                    NodeKind::Token(_) => "Token",
                    $( NodeKind::$kind(_) => stringify!($kind), )*
                }
            }

            pub fn category(&self) -> Category {
                match self {
                    NodeKind::Token(_) => Category::Token,
                    $( NodeKind::$kind(_) => Category::$category, )*
                }
            }

            /// Declared child slots, in source order.
            pub fn grammar(&self) -> &'static [Field] {
                match self {
                    NodeKind::Token(_) => &[],
                    $( NodeKind::$kind(_) => {
                        const FIELDS: &[Field] = &[
                            $( Field {
                                name: stringify!($field),
                                category: Category::$slot,
                                arity: <$ty as Slot>::ARITY,
                            }, )*
                        ];
                        FIELDS
                    } )*
                }
            }

            pub fn children(&self) -> Vec<Node> {
                let mut out = Vec::new();
                match self {
                    NodeKind::Token(_) => {}
                    $( NodeKind::$kind(node) => {
                        $( Slot::collect(&node.$field, &mut out); )*
                    } )*
                }
                out
            }

            /// Rebuild this kind with every child passed through `f`.
            pub(crate) fn remap(&self, f: &mut dyn FnMut(&Node) -> Node) -> NodeKind {
                match self {
                    NodeKind::Token(token) => NodeKind::Token(token.clone()),
                    $( NodeKind::$kind(node) => NodeKind::$kind($kind {
                        $( $field: Slot::remap(&node.$field, f), )*
                    }), )*
                }
            }
        }
    };
}

define_nodes! {
    /// A whole source: optional docs, borrows, then the top-level block.
    Program as Program {
        docs: Option<Node> => Docs,
        borrows: Vec<Node> => Borrow,
        block: Node => Block,
        end: Node => Token,
    }

    /// `↓ source` or `↓ source.name`
    Borrow as Borrow {
        arrow: Node => Token,
        source: Node => Token,
        dot: Option<Node> => Token,
        name: Option<Node> => Token,
    }

    /// One or more `¶…¶` tokens.
    Docs as Docs {
        docs: Vec<Node> => Token,
    }

    /// A statement sequence; parenthesized unless it is a program or
    /// structure body.
    Block as Block {
        open: Option<Node> => Token,
        statements: Vec<Node> => Statement,
        close: Option<Node> => Token,
    }

    /// `docs? a, b •Type : value`
    Bind as Bind {
        docs: Option<Node> => Docs,
        names: Vec<Node> => Name,
        dot: Option<Node> => Token,
        ty: Option<Node> => Type,
        colon: Option<Node> => Token,
        value: Option<Node> => Expression,
    }

    /// One alias of a bind, with its trailing comma.
    Alias as Name {
        name: Node => Token,
        separator: Option<Node> => Token,
    }

    BooleanLiteral as Expression {
        value: Node => Token,
    }

    NumberLiteral as Expression {
        number: Node => Token,
    }

    TextLiteral as Expression {
        text: Node => Token,
    }

    NoneLiteral as Expression {
        none: Node => Token,
    }

    ListLiteral as Expression {
        open: Node => Token,
        items: Vec<Node> => Expression,
        close: Option<Node> => Token,
    }

    SetLiteral as Expression {
        open: Node => Token,
        items: Vec<Node> => Expression,
        close: Option<Node> => Token,
    }

    /// `{k: v …}`, or `{:}` for the empty map.
    MapLiteral as Expression {
        open: Node => Token,
        entries: Vec<Node> => Entry,
        bind: Option<Node> => Token,
        close: Option<Node> => Token,
    }

    KeyValue as Entry {
        key: Node => Expression,
        colon: Node => Token,
        value: Node => Expression,
    }

    /// A header row of column binds followed by value rows.
    TableLiteral as Expression {
        header: Node => Row,
        rows: Vec<Node> => Row,
    }

    Row as Row {
        open: Node => Token,
        cells: Vec<Node> => Statement,
        close: Option<Node> => Token,
    }

    Reference as Reference {
        name: Node => Token,
    }

    /// `.`: the prior value in a reaction, or the input of a conversion.
    This as Expression {
        dot: Node => Token,
    }

    PropertyReference as Expression {
        structure: Node => Expression,
        dot: Node => Token,
        name: Option<Node> => Token,
    }

    Evaluate as Expression {
        function: Node => Expression,
        open: Node => Token,
        inputs: Vec<Node> => Expression,
        close: Option<Node> => Token,
    }

    FunctionDefinition as Expression {
        docs: Option<Node> => Docs,
        fun: Node => Token,
        name: Option<Node> => Token,
        open: Option<Node> => Token,
        inputs: Vec<Node> => Bind,
        close: Option<Node> => Token,
        dot: Option<Node> => Token,
        output: Option<Node> => Type,
        body: Option<Node> => Expression,
    }

    StructureDefinition as Expression {
        docs: Option<Node> => Docs,
        dot: Node => Token,
        name: Option<Node> => Token,
        interfaces: Vec<Node> => Reference,
        open: Option<Node> => Token,
        inputs: Vec<Node> => Bind,
        close: Option<Node> => Token,
        body: Option<Node> => Block,
    }

    /// `→ Input Output body`
    ConversionDefinition as Expression {
        docs: Option<Node> => Docs,
        arrow: Node => Token,
        input: Node => Type,
        output: Node => Type,
        body: Node => Expression,
    }

    BinaryOperation as Expression {
        left: Node => Expression,
        operator: Node => Token,
        right: Node => Expression,
    }

    UnaryOperation as Expression {
        operator: Node => Token,
        operand: Node => Expression,
    }

    /// `condition ? yes no`
    Conditional as Expression {
        condition: Node => Expression,
        question: Node => Token,
        yes: Node => Expression,
        no: Node => Expression,
    }

    /// `expression•Type`
    Is as Expression {
        expression: Node => Expression,
        dot: Node => Token,
        ty: Node => Type,
    }

    /// `expression → Type`
    Convert as Expression {
        expression: Node => Expression,
        arrow: Node => Token,
        ty: Node => Type,
    }

    /// `← offset? stream`
    Previous as Expression {
        arrow: Node => Token,
        offset: Option<Node> => Token,
        stream: Node => Expression,
    }

    /// `∆ stream`
    Changed as Expression {
        delta: Node => Token,
        stream: Node => Expression,
    }

    /// `initial … condition … next`
    Reaction as Expression {
        initial: Node => Expression,
        dots: Node => Token,
        condition: Node => Expression,
        next_dots: Node => Token,
        next: Node => Expression,
    }

    Documented as Expression {
        docs: Node => Docs,
        expression: Node => Expression,
    }

    /// `table ⎡? columns⎦ query`
    Select as Expression {
        table: Node => Expression,
        row: Node => Row,
        query: Node => Expression,
    }

    /// `table ⎡+ cells⎦`
    Insert as Expression {
        table: Node => Expression,
        row: Node => Row,
    }

    /// `table ⎡: binds⎦ query`
    Update as Expression {
        table: Node => Expression,
        row: Node => Row,
        query: Node => Expression,
    }

    /// `table ⎡-⎦ query`
    Delete as Expression {
        table: Node => Expression,
        row: Node => Row,
        query: Node => Expression,
    }

    /// `_` or `_•Type`: an expression still to be written.
    ExpressionPlaceholder as Expression {
        placeholder: Node => Token,
        dot: Option<Node> => Token,
        ty: Option<Node> => Type,
    }

    /// Tokens no expression production accepted.
    UnparsableExpression as Expression {
        tokens: Vec<Node> => Token,
    }

    BooleanType as Type {
        question: Node => Token,
    }

    /// `#` with an optional unit, e.g. `#m/s`.
    NumberType as Type {
        number: Node => Token,
    }

    /// A text literal in type position, conventionally `''`.
    TextType as Type {
        text: Node => Token,
    }

    NoneType as Type {
        none: Node => Token,
    }

    ListType as Type {
        open: Node => Token,
        item: Option<Node> => Type,
        close: Option<Node> => Token,
    }

    SetType as Type {
        open: Node => Token,
        item: Option<Node> => Type,
        close: Option<Node> => Token,
    }

    MapType as Type {
        open: Node => Token,
        key: Option<Node> => Type,
        colon: Node => Token,
        value: Option<Node> => Type,
        close: Option<Node> => Token,
    }

    TableType as Type {
        open: Node => Token,
        columns: Vec<Node> => Bind,
        close: Option<Node> => Token,
    }

    FunctionType as Type {
        fun: Node => Token,
        open: Option<Node> => Token,
        inputs: Vec<Node> => Bind,
        close: Option<Node> => Token,
        output: Option<Node> => Type,
    }

    /// `…Type`
    StreamType as Type {
        dots: Node => Token,
        item: Option<Node> => Type,
    }

    UnionType as Type {
        left: Node => Type,
        bar: Node => Token,
        right: Node => Type,
    }

    /// A structure referenced by name.
    NameType as Type {
        name: Node => Token,
    }

    TypePlaceholder as Type {
        placeholder: Node => Token,
    }

    UnparsableType as Type {
        tokens: Vec<Node> => Token,
    }
}

/// Name carried by a token leaf, if it is a name token.
fn token_name(node: &Node) -> Option<Name> {
    node.as_token()
        .filter(|token| token.kind == TokenKind::Name)
        .map(|token| Name::new(&token.text))
}

impl Alias {
    pub fn name_text(&self) -> Option<Name> {
        token_name(&self.name)
    }
}

impl Bind {
    /// Every alias this bind introduces, in order.
    pub fn aliases(&self) -> Vec<Name> {
        self.names
            .iter()
            .filter_map(|node| match node.kind() {
                NodeKind::Alias(alias) => alias.name_text(),
                _ => None,
            })
            .collect()
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.aliases().iter().any(|alias| alias.as_str() == name)
    }

    /// First alias; what messages call this bind.
    pub fn primary_name(&self) -> Option<Name> {
        self.aliases().into_iter().next()
    }

    pub fn has_default(&self) -> bool {
        self.value.is_some()
    }
}

impl Reference {
    pub fn name_text(&self) -> Name {
        Name::new(self.name.text())
    }
}

impl PropertyReference {
    pub fn name_text(&self) -> Option<Name> {
        self.name.as_ref().and_then(token_name)
    }
}

impl FunctionDefinition {
    pub fn name_text(&self) -> Option<Name> {
        self.name.as_ref().and_then(token_name)
    }
}

impl StructureDefinition {
    pub fn name_text(&self) -> Option<Name> {
        self.name.as_ref().and_then(token_name)
    }

    /// Whether this structure only declares functions without inputs, i.e.
    /// can serve as an interface.
    pub fn is_interface(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl Borrow {
    pub fn source_name(&self) -> Name {
        Name::new(self.source.text())
    }

    pub fn name_text(&self) -> Option<Name> {
        self.name.as_ref().and_then(token_name)
    }
}
