//! Name resolution.
//!
//! Resolution walks from a reference up through its ancestors. Each scope
//! kind contributes names:
//!
//! - a block: every bind, named function and structure among its statements
//! - a function: its inputs, for references in its body or later inputs
//! - a structure: its inputs, for references in its body
//! - a table query: the columns of the table being queried
//! - a program: its borrows
//!
//! and finally the builtin streams. Blocks expose all of their definitions
//! regardless of position. Whether a use comes too early is a separate
//! question answered by [`reference_order`].

use lumen_ir::{Name, Node, NodeKind};

use crate::builtins::StreamKind;
use crate::infer::type_of;
use crate::{Column, Context};

/// What a name refers to.
#[derive(Clone, Debug)]
pub enum Definition {
    /// A bind: a block statement, an input, or a borrowed top-level bind.
    Bind(Node),
    /// A named function definition statement.
    Function(Node),
    Structure(Node),
    /// A column of a table being queried.
    Column(Column),
    Stream(StreamKind),
}

impl Definition {
    pub fn node(&self) -> Option<&Node> {
        match self {
            Definition::Bind(node) | Definition::Function(node) | Definition::Structure(node) => {
                Some(node)
            }
            Definition::Column(column) => column.definition.as_ref(),
            Definition::Stream(_) => None,
        }
    }
}

/// The definition a statement introduces under `name`, if any.
pub(crate) fn statement_defines(statement: &Node, name: &str) -> Option<Definition> {
    match statement.kind() {
        NodeKind::Bind(bind) if bind.has_name(name) => Some(Definition::Bind(statement.clone())),
        NodeKind::FunctionDefinition(function)
            if function.name_text().is_some_and(|n| n.as_str() == name) =>
        {
            Some(Definition::Function(statement.clone()))
        }
        NodeKind::StructureDefinition(structure)
            if structure.name_text().is_some_and(|n| n.as_str() == name) =>
        {
            Some(Definition::Structure(statement.clone()))
        }
        _ => None,
    }
}

/// Names a statement introduces.
pub(crate) fn statement_names(statement: &Node) -> Vec<Name> {
    match statement.kind() {
        NodeKind::Bind(bind) => bind.aliases(),
        NodeKind::FunctionDefinition(function) => function.name_text().into_iter().collect(),
        NodeKind::StructureDefinition(structure) => structure.name_text().into_iter().collect(),
        _ => Vec::new(),
    }
}

fn table_columns(table: &Node, ctx: &Context) -> Vec<Column> {
    type_of(table, ctx)
        .columns()
        .map(<[Column]>::to_vec)
        .unwrap_or_default()
}

/// Every definition visible at `anchor`, innermost scope first. Shadowed
/// names appear more than once; the first entry wins.
pub fn scopes(anchor: &Node, ctx: &Context) -> Vec<(Name, Definition)> {
    let mut out = Vec::new();
    let mut child = anchor.clone();
    for ancestor in ctx.ancestors(anchor) {
        match ancestor.kind() {
            NodeKind::Block(block) => {
                for statement in &block.statements {
                    for name in statement_names(statement) {
                        if let Some(definition) = statement_defines(statement, name.as_str()) {
                            out.push((name, definition));
                        }
                    }
                }
            }
            NodeKind::FunctionDefinition(function) => {
                let inside = function.body.as_ref().is_some_and(|b| b.same(&child))
                    || function.inputs.iter().any(|i| i.same(&child));
                if inside {
                    push_inputs(&function.inputs, &mut out);
                }
            }
            NodeKind::StructureDefinition(structure) => {
                if structure.body.as_ref().is_some_and(|b| b.same(&child)) {
                    push_inputs(&structure.inputs, &mut out);
                }
            }
            NodeKind::Select(op) if op.row.same(&child) || op.query.same(&child) => {
                push_columns(&op.table, ctx, &mut out);
            }
            NodeKind::Update(op) if op.row.same(&child) || op.query.same(&child) => {
                push_columns(&op.table, ctx, &mut out);
            }
            NodeKind::Delete(op) if op.query.same(&child) => {
                push_columns(&op.table, ctx, &mut out);
            }
            NodeKind::Program(program) => {
                for borrow in &program.borrows {
                    out.extend(borrowed(borrow, ctx));
                }
            }
            _ => {}
        }
        child = ancestor;
    }
    for stream in StreamKind::ALL {
        out.push((Name::new(stream.name()), Definition::Stream(stream)));
    }
    out
}

fn push_inputs(inputs: &[Node], out: &mut Vec<(Name, Definition)>) {
    for input in inputs {
        if let NodeKind::Bind(bind) = input.kind() {
            for name in bind.aliases() {
                out.push((name, Definition::Bind(input.clone())));
            }
        }
    }
}

fn push_columns(table: &Node, ctx: &Context, out: &mut Vec<(Name, Definition)>) {
    for column in table_columns(table, ctx) {
        out.push((column.name.clone(), Definition::Column(column)));
    }
}

/// Definitions a borrow brings in. Unknown sources bring nothing.
pub fn borrowed(borrow: &Node, ctx: &Context) -> Vec<(Name, Definition)> {
    let NodeKind::Borrow(b) = borrow.kind() else {
        return Vec::new();
    };
    let Some(source) = ctx.project().source(b.source_name().as_str()) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for (name, node) in source.exports() {
        if b.name_text().is_some_and(|wanted| wanted != name) {
            continue;
        }
        if let Some(definition) = statement_defines(&node, name.as_str()) {
            out.push((name, definition));
        }
    }
    out
}

/// Resolve `name` as seen from `anchor`.
pub fn resolve(name: &str, anchor: &Node, ctx: &Context) -> Option<Definition> {
    scopes(anchor, ctx)
        .into_iter()
        .find(|(candidate, _)| candidate.as_str() == name)
        .map(|(_, definition)| definition)
}

/// Structure definition named `name` visible at `anchor`.
pub fn resolve_structure(name: &str, anchor: &Node, ctx: &Context) -> Option<Node> {
    match resolve(name, anchor, ctx) {
        Some(Definition::Structure(node)) => Some(node),
        _ => None,
    }
}

/// How a reference relates to the bind it resolved to, in evaluation order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Order {
    /// The bind is evaluated before the reference.
    After,
    /// The reference is inside the bind's own value.
    Within,
    /// The reference is evaluated before the bind.
    Before,
}

/// Where `reference` sits relative to the block-level `bind` it names.
///
/// References inside a function or structure body are evaluated later,
/// when the body runs, so they always count as [`Order::After`].
pub fn reference_order(reference: &Node, bind: &Node, ctx: &Context) -> Order {
    let Some(block) = ctx.parent(bind) else {
        return Order::After;
    };
    let NodeKind::Block(block_kind) = block.kind() else {
        return Order::After;
    };
    let mut statement = None;
    for ancestor in std::iter::once(reference.clone()).chain(ctx.ancestors(reference)) {
        if matches!(
            ancestor.kind(),
            NodeKind::FunctionDefinition(_) | NodeKind::StructureDefinition(_)
        ) {
            return Order::After;
        }
        if ctx.parent(&ancestor).is_some_and(|parent| parent.same(&block)) {
            statement = Some(ancestor);
            break;
        }
    }
    let Some(statement) = statement else {
        return Order::After;
    };
    let position = |node: &Node| block_kind.statements.iter().position(|s| s.same(node));
    match (position(&statement), position(bind)) {
        (Some(user), Some(defined)) if user == defined => Order::Within,
        (Some(user), Some(defined)) if user < defined => Order::Before,
        _ => Order::After,
    }
}

/// Named functions declared in a structure's body.
pub fn structure_functions(structure: &Node) -> Vec<(Name, Node)> {
    let NodeKind::StructureDefinition(definition) = structure.kind() else {
        return Vec::new();
    };
    let Some(body) = &definition.body else {
        return Vec::new();
    };
    body.children()
        .into_iter()
        .filter_map(|statement| match statement.kind() {
            NodeKind::FunctionDefinition(function) => {
                function.name_text().map(|name| (name, statement.clone()))
            }
            _ => None,
        })
        .collect()
}

/// Whether `candidate` is `interface` or declares it, possibly through
/// other interfaces.
pub fn implements(candidate: &Node, interface: &Node, ctx: &Context) -> bool {
    let mut seen = rustc_hash::FxHashSet::default();
    let mut pending = vec![candidate.clone()];
    while let Some(structure) = pending.pop() {
        if structure.same(interface) {
            return true;
        }
        if !seen.insert(structure.id()) {
            continue;
        }
        if let NodeKind::StructureDefinition(definition) = structure.kind() {
            for reference in &definition.interfaces {
                if let NodeKind::Reference(r) = reference.kind() {
                    pending.extend(resolve_structure(r.name_text().as_str(), reference, ctx));
                }
            }
        }
    }
    false
}
