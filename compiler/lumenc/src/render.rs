//! Text renderings for the inspection commands.

use std::fmt::Write;

use lumen_eval::{Plan, PlanKind};
use lumen_ir::{Node, NodeKind, TokenList};
use lumen_stack::ensure_sufficient_stack;

/// One line per token: kind, text and the span of the text.
pub fn render_tokens(tokens: &TokenList) -> String {
    let mut out = String::new();
    for (token, span) in tokens.iter().zip(tokens.spans()) {
        let _ = writeln!(out, "{:?} @ {}..{}", token, span.start, span.end);
    }
    out
}

/// The tree as an indented outline. Tokens show their kind and text.
pub fn render_tree(node: &Node) -> String {
    let mut out = String::new();
    outline(node, 0, &mut out);
    out
}

fn outline(node: &Node, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node.as_token() {
        Some(token) => {
            let _ = writeln!(out, "{indent}{token:?}");
        }
        None => {
            let _ = writeln!(out, "{indent}{}", node.label());
            for child in node.children() {
                ensure_sufficient_stack(|| outline(&child, depth + 1, out));
            }
        }
    }
}

/// Nodes below `program` that own a plan of their own, with its kind.
pub fn plan_owners(program: &Node) -> Vec<(Node, PlanKind)> {
    program
        .descendants()
        .into_iter()
        .filter_map(|node| {
            let kind = match node.kind() {
                NodeKind::FunctionDefinition(_) => PlanKind::Function,
                NodeKind::StructureDefinition(_) => PlanKind::Structure,
                NodeKind::ConversionDefinition(_) => PlanKind::Conversion,
                _ => return None,
            };
            Some((node, kind))
        })
        .collect()
}

/// A plan under a header naming what it evaluates.
pub fn render_plan(plan: &Plan) -> String {
    let header = match plan.root.kind() {
        NodeKind::FunctionDefinition(function) => match function.name_text() {
            Some(name) => format!("ƒ {name}"),
            None => "ƒ".to_string(),
        },
        NodeKind::StructureDefinition(structure) => match structure.name_text() {
            Some(name) => format!("•{name}"),
            None => "•".to_string(),
        },
        NodeKind::ConversionDefinition(_) => {
            let source: String = plan.root.print().trim().chars().take(40).collect();
            format!("conversion {source}")
        }
        _ => "program".to_string(),
    };
    format!("{header} ({} steps)\n{plan}", plan.len())
}

#[cfg(test)]
mod tests;
