//! The conflict detector.
//!
//! Each node kind has one local rule ([`local_conflicts`]). The conflicts
//! of a subtree are its root's local conflicts followed by those of its
//! children, in source order, memoized per node in the [`Context`]. The
//! rules only read types and resolved names, so a single top-down pass is
//! enough.
//!
//! Rules stay quiet when an operand's type is unknown or `any`: the cause
//! of an unknown type is reported where it arises, not at every use.

mod rules;

use std::sync::Arc;

use lumen_ir::Node;
use lumen_stack::ensure_sufficient_stack;
use tracing::debug;

use crate::{Conflict, Context};

pub use rules::local_conflicts;

/// Conflicts in `node` and everything below it.
pub fn conflicts_of(node: &Node, ctx: &Context) -> Arc<[Conflict]> {
    if let Some(cached) = ctx.cached_conflicts(node) {
        return cached;
    }
    let mut out = local_conflicts(node, ctx);
    for child in node.children() {
        if child.as_token().is_some() {
            continue;
        }
        let below = ensure_sufficient_stack(|| conflicts_of(&child, ctx));
        out.extend(below.iter().cloned());
    }
    let out: Arc<[Conflict]> = out.into();
    ctx.store_conflicts(node, Arc::clone(&out));
    out
}

/// Every conflict in the context's main program.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check(ctx: &Context) -> Vec<Conflict> {
    let conflicts = conflicts_of(ctx.program(), ctx).to_vec();
    debug!(
        count = conflicts.len(),
        minor = conflicts.iter().filter(|c| c.is_minor()).count(),
        "checked program"
    );
    conflicts
}
