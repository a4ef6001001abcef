//! Finding conversions between types.
//!
//! A conversion is looked up in order: none needed, a conversion defined
//! in an enclosing block, one defined in the source structure's body, then
//! the builtins.

use lumen_ir::{Node, NodeKind};

use crate::builtins::BuiltinConversion;
use crate::infer::raw_type;
use crate::{Context, Type};

#[derive(Clone, Debug)]
pub enum Conversion {
    /// The value already has the target type.
    Identity,
    Builtin(BuiltinConversion),
    /// A `ConversionDefinition` node.
    Defined(Node),
}

/// Conversion definitions among the statements of enclosing blocks.
pub fn conversions_in_scope(anchor: &Node, ctx: &Context) -> Vec<Node> {
    let mut out = Vec::new();
    for ancestor in ctx.ancestors(anchor) {
        if let NodeKind::Block(block) = ancestor.kind() {
            out.extend(
                block
                    .statements
                    .iter()
                    .filter(|s| matches!(s.kind(), NodeKind::ConversionDefinition(_)))
                    .cloned(),
            );
        }
    }
    out
}

fn structure_conversions(from: &Type) -> Vec<Node> {
    let Type::Structure(structure) = from else {
        return Vec::new();
    };
    let NodeKind::StructureDefinition(definition) = structure.definition.kind() else {
        return Vec::new();
    };
    definition
        .body
        .as_ref()
        .map(|body| {
            body.children()
                .into_iter()
                .filter(|s| matches!(s.kind(), NodeKind::ConversionDefinition(_)))
                .collect()
        })
        .unwrap_or_default()
}

/// How to convert a `from` value at `anchor` into `to`.
pub fn find_conversion(from: &Type, to: &Type, anchor: &Node, ctx: &Context) -> Option<Conversion> {
    if to.accepts(from, ctx) {
        return Some(Conversion::Identity);
    }
    let defined = conversions_in_scope(anchor, ctx)
        .into_iter()
        .chain(structure_conversions(from))
        .find(|node| {
            let NodeKind::ConversionDefinition(conversion) = node.kind() else {
                return false;
            };
            raw_type(&conversion.input, ctx).accepts(from, ctx)
                && to.accepts(&raw_type(&conversion.output, ctx), ctx)
        });
    if let Some(node) = defined {
        return Some(Conversion::Defined(node));
    }
    BuiltinConversion::find(from, to).map(Conversion::Builtin)
}
