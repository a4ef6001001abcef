//! Parser tests.
//!
//! - `expressions.rs`: grouping and the shape of each production
//! - `recovery.rs`: unparsable input
//! - `roundtrip.rs`: exact printing and re-parse stability

mod roundtrip;

use lumen_ir::{Node, NodeKind};

/// Compact tree shape: token text for leaves, `Label(children…)` otherwise.
pub(crate) fn shape(node: &Node) -> String {
    match node.kind() {
        NodeKind::Token(token) => token.text.to_string(),
        kind => {
            let children: Vec<String> = node.children().iter().map(shape).collect();
            format!("{}({})", kind.label(), children.join(" "))
        }
    }
}

/// Top-level statements of a parsed program.
pub(crate) fn statements(source: &str) -> Vec<Node> {
    let program = crate::parse_source(source);
    let NodeKind::Program(program) = program.kind() else {
        panic!("parse_source must return a program");
    };
    program.block.children()
}

pub(crate) fn expression_shape(source: &str) -> String {
    shape(&crate::parse_expression_source(source))
}
