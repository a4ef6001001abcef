//! Shared helpers for unit tests.

use lumen_ir::{Node, NodeKind};

use crate::{check, ConflictKind, Context};

pub(crate) fn context(source: &str) -> Context {
    Context::new(&lumen_parse::parse_source(source))
}

/// First node in the main program with this label whose trimmed text is
/// `text`.
pub(crate) fn find(ctx: &Context, label: &str, text: &str) -> Node {
    ctx.program()
        .descendants()
        .into_iter()
        .find(|node| node.label() == label && node.print().trim() == text)
        .unwrap_or_else(|| panic!("no {label} printing as {text:?}"))
}

/// Last top-level statement of the main program.
pub(crate) fn last_statement(ctx: &Context) -> Node {
    let NodeKind::Program(program) = ctx.program().kind() else {
        panic!("main source must be a program");
    };
    program
        .block
        .children()
        .pop()
        .unwrap_or_else(|| panic!("program has no statements"))
}

/// Kinds of every conflict in `source`, in report order.
pub(crate) fn conflict_kinds(source: &str) -> Vec<ConflictKind> {
    check(&context(source)).iter().map(|c| c.kind).collect()
}
