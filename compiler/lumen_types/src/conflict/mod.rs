//! Conflicts: statically diagnosed problems.
//!
//! A conflict names its kind, the node at fault, optionally a related
//! node, and structured arguments for its message. Message text comes from
//! a [`Locale`] under the keys `<Kind>.primary` and `<Kind>.secondary`.

use std::fmt;

use lumen_diagnostic::{Diagnostic, ErrorCode, Locale, Severity};
use lumen_ir::{Name, Node};

use crate::{Context, Type};

macro_rules! conflict_kinds {
    ($( $(#[$meta:meta])* $kind:ident => $minor:literal ),* $(,)?) => {
        /// Every kind of conflict, in error code order.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum ConflictKind {
            $( $(#[$meta])* $kind, )*
        }

        impl ConflictKind {
            pub const ALL: &'static [ConflictKind] = &[$( ConflictKind::$kind, )*];

            pub const fn name(self) -> &'static str {
                match self {
                    $( ConflictKind::$kind => stringify!($kind), )*
                }
            }

            /// Minor conflicts are warnings.
            pub const fn is_minor(self) -> bool {
                match self {
                    $( ConflictKind::$kind => $minor, )*
                }
            }
        }
    };
}

conflict_kinds! {
    UnknownName => false,
    UnknownTypeName => false,
    IncompatibleBind => false,
    IncompatibleInput => false,
    MissingInput => false,
    UnexpectedInput => false,
    NotAFunction => false,
    DuplicateName => false,
    /// Two names in one scope differ only by letter case.
    CaseCollision => true,
    ExpectedBooleanCondition => false,
    IncompatibleOperand => false,
    IncompatibleUnits => false,
    UnknownProperty => false,
    ExpectedStream => false,
    MisplacedThis => false,
    MissingCell => false,
    ExtraCell => false,
    IncompatibleCell => false,
    ExpectedColumnType => false,
    UnknownColumn => false,
    NonBooleanQuery => false,
    BorrowCycle => false,
    ReferenceCycle => false,
    UnknownBorrow => false,
    ExpectedEndingExpression => false,
    /// A statement whose value nothing uses.
    IgnoredExpression => true,
    UnimplementedInterface => false,
    IncompatibleOutput => false,
    Placeholder => false,
    Unparsable => false,
    UnknownConversion => false,
    RequiredAfterOptional => false,
}

impl ConflictKind {
    pub fn code(self) -> ErrorCode {
        ErrorCode::CONFLICTS[self as usize]
    }

    pub fn severity(self) -> Severity {
        if self.is_minor() {
            Severity::Warning
        } else {
            Severity::Error
        }
    }

    pub fn primary_key(self) -> String {
        format!("{}.primary", self.name())
    }

    pub fn secondary_key(self) -> String {
        format!("{}.secondary", self.name())
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A message argument.
#[derive(Clone, Debug)]
pub enum Arg {
    Node(Node),
    Type(Type),
    Name(Name),
    Count(usize),
    Symbol(&'static str),
}

impl Arg {
    pub fn render(&self) -> String {
        match self {
            Arg::Node(node) => node.print().trim().to_string(),
            Arg::Type(ty) => ty.to_string(),
            Arg::Name(name) => name.to_string(),
            Arg::Count(count) => count.to_string(),
            Arg::Symbol(symbol) => (*symbol).to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub primary: Node,
    pub secondary: Option<Node>,
    pub args: Vec<Arg>,
}

impl Conflict {
    pub fn new(kind: ConflictKind, primary: &Node) -> Self {
        Conflict {
            kind,
            primary: primary.clone(),
            secondary: None,
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_secondary(mut self, node: &Node) -> Self {
        self.secondary = Some(node.clone());
        self
    }

    #[must_use]
    pub fn with_arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn is_minor(&self) -> bool {
        self.kind.is_minor()
    }

    fn rendered_args(&self) -> Vec<String> {
        self.args.iter().map(Arg::render).collect()
    }

    /// Primary message, or the key itself if the locale lacks it.
    pub fn message(&self, locale: &dyn Locale) -> String {
        let key = self.kind.primary_key();
        locale.render(&key, &self.rendered_args()).unwrap_or(key)
    }

    pub fn secondary_message(&self, locale: &dyn Locale) -> Option<String> {
        self.secondary.as_ref()?;
        locale.render(&self.kind.secondary_key(), &self.rendered_args())
    }

    pub fn to_diagnostic(&self, ctx: &Context, locale: &dyn Locale) -> Diagnostic {
        let message = self.message(locale);
        let mut diagnostic = Diagnostic::new(self.kind.code(), self.kind.severity())
            .with_message(message.clone())
            .with_label(ctx.span(&self.primary), message);
        if let Some(secondary) = &self.secondary {
            let text = self.secondary_message(locale).unwrap_or_default();
            diagnostic = diagnostic.with_secondary_label(ctx.span(secondary), text);
        }
        diagnostic
    }
}
