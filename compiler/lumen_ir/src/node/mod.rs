//! The immutable syntax tree.
//!
//! A [`Node`] is a reference-counted handle to an immutable [`NodeKind`].
//! Each kind declares its ordered child slots once (see `kinds.rs`), and
//! that single declaration drives child enumeration, printing, structural
//! replacement, and the slot descriptions editors use to offer
//! replacements.
//!
//! # Structural Sharing
//!
//! ```text
//! let edited = root.replace_descendant(&old, &new)?;
//! ```
//!
//! `edited` is a fresh root. Only the spine from the root down to the
//! replaced node is rebuilt; every other node in `edited` is the same
//! allocation as in `root`.

mod kinds;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{Span, Token, TokenKind};

pub use kinds::*;

/// Identity of one node allocation.
///
/// Ids are never reused within a process, so they are safe cache keys even
/// after the node they named has been dropped.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeId(u32);

impl NodeId {
    fn fresh() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// How many nodes a slot holds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Arity {
    One,
    Optional,
    Many,
}

/// Grammatical category of a node or of the nodes a slot accepts.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Category {
    Token,
    Program,
    Borrow,
    Docs,
    Block,
    /// A bind or an expression.
    Statement,
    Bind,
    Name,
    Expression,
    Entry,
    Row,
    Reference,
    Type,
}

impl Category {
    /// Whether a node of category `self` may fill a slot of category `slot`.
    pub fn fits(self, slot: Category) -> bool {
        match slot {
            Category::Statement => matches!(
                self,
                Category::Bind | Category::Expression | Category::Reference | Category::Block
            ),
            Category::Expression => matches!(
                self,
                Category::Expression | Category::Reference | Category::Block
            ),
            other => self == other,
        }
    }
}

/// One declared child slot.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Field {
    pub name: &'static str,
    pub category: Category,
    pub arity: Arity,
}

/// Storage shapes a slot can take.
pub(crate) trait Slot: Sized {
    const ARITY: Arity;

    fn collect(&self, out: &mut Vec<Node>);

    fn remap(&self, f: &mut dyn FnMut(&Node) -> Node) -> Self;
}

impl Slot for Node {
    const ARITY: Arity = Arity::One;

    fn collect(&self, out: &mut Vec<Node>) {
        out.push(self.clone());
    }

    fn remap(&self, f: &mut dyn FnMut(&Node) -> Node) -> Self {
        f(self)
    }
}

impl Slot for Option<Node> {
    const ARITY: Arity = Arity::Optional;

    fn collect(&self, out: &mut Vec<Node>) {
        if let Some(node) = self {
            out.push(node.clone());
        }
    }

    fn remap(&self, f: &mut dyn FnMut(&Node) -> Node) -> Self {
        self.as_ref().map(f)
    }
}

impl Slot for Vec<Node> {
    const ARITY: Arity = Arity::Many;

    fn collect(&self, out: &mut Vec<Node>) {
        out.extend(self.iter().cloned());
    }

    fn remap(&self, f: &mut dyn FnMut(&Node) -> Node) -> Self {
        self.iter().map(f).collect()
    }
}

struct NodeData {
    id: NodeId,
    kind: NodeKind,
}

/// Handle to an immutable syntax tree node.
///
/// Cloning is a reference-count bump. Equality and hashing are by identity.
#[derive(Clone)]
pub struct Node(Arc<NodeData>);

impl Node {
    pub fn new(kind: impl Into<NodeKind>) -> Node {
        Node(Arc::new(NodeData {
            id: NodeId::fresh(),
            kind: kind.into(),
        }))
    }

    /// Wrap a token as a leaf node.
    pub fn leaf(token: Token) -> Node {
        Node::new(NodeKind::Token(token))
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.0.id
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    /// True if both handles refer to the same allocation.
    #[inline]
    pub fn same(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self.kind() {
            NodeKind::Token(token) => Some(token),
            _ => None,
        }
    }

    /// True if this is a token leaf of the given kind.
    pub fn is_token(&self, kind: TokenKind) -> bool {
        self.as_token().is_some_and(|token| token.kind == kind)
    }

    /// Text of a token leaf; empty for interior nodes.
    pub fn text(&self) -> &str {
        self.as_token().map_or("", |token| &token.text)
    }

    pub fn label(&self) -> &'static str {
        self.kind().label()
    }

    pub fn category(&self) -> Category {
        self.kind().category()
    }

    pub fn grammar(&self) -> &'static [Field] {
        self.kind().grammar()
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<Node> {
        self.kind().children()
    }

    /// Replace the direct child `old` with `new`.
    ///
    /// Returns `None` if `old` is not a direct child. Every other slot of the
    /// returned node points at the original children.
    pub fn replace(&self, old: &Node, new: &Node) -> Option<Node> {
        let mut found = false;
        let kind = self.kind().remap(&mut |child| {
            if child.same(old) {
                found = true;
                new.clone()
            } else {
                child.clone()
            }
        });
        found.then(|| Node::new(kind))
    }

    /// Replace `old` anywhere below (or at) this node, rebuilding only the
    /// spine between this node and `old`.
    pub fn replace_descendant(&self, old: &Node, new: &Node) -> Option<Node> {
        let path = self.find_path(old)?;
        let mut replacement = new.clone();
        let mut current = old.clone();
        for ancestor in path.iter().rev().skip(1) {
            replacement = ancestor.replace(&current, &replacement)?;
            current = ancestor.clone();
        }
        Some(replacement)
    }

    /// Nodes from this node down to `target`, both inclusive.
    pub fn find_path(&self, target: &Node) -> Option<Vec<Node>> {
        if self.same(target) {
            return Some(vec![self.clone()]);
        }
        let parents = compute_parents(self);
        let mut path = vec![target.clone()];
        let mut cursor = target.id();
        while let Some(parent) = parents.get(&cursor) {
            path.push(parent.clone());
            if parent.same(self) {
                path.reverse();
                return Some(path);
            }
            cursor = parent.id();
        }
        None
    }

    /// This node and every node below it, in preorder.
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            let children = node.children();
            out.push(node);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Token leaves in source order.
    pub fn tokens(&self) -> Vec<Token> {
        self.descendants()
            .into_iter()
            .filter_map(|node| node.as_token().cloned())
            .collect()
    }

    pub fn first_token(&self) -> Option<Token> {
        let mut node = self.clone();
        loop {
            if let Some(token) = node.as_token() {
                return Some(token.clone());
            }
            node = node.children().into_iter().next()?;
        }
    }

    /// Exact source text of this subtree, trivia included.
    pub fn print(&self) -> String {
        let mut out = String::new();
        for token in self.tokens() {
            out.push_str(&token.trivia);
            out.push_str(&token.text);
        }
        out
    }

    /// Structural comparison: same kinds in the same shape with the same
    /// token text. Identity is ignored.
    pub fn same_shape(&self, other: &Node) -> bool {
        let left = self.descendants();
        let right = other.descendants();
        left.len() == right.len()
            && left.iter().zip(&right).all(|(a, b)| {
                a.label() == b.label()
                    && a.children().len() == b.children().len()
                    && a.as_token() == b.as_token()
            })
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Token(token) => write!(f, "{token:?}"),
            kind => write!(f, "{}#{}({:?})", kind.label(), self.id().raw(), self.print().trim()),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print())
    }
}

/// Map from each node below `root` to its parent.
pub fn compute_parents(root: &Node) -> FxHashMap<NodeId, Node> {
    let mut parents = FxHashMap::default();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        for child in node.children() {
            parents.insert(child.id(), node.clone());
            stack.push(child);
        }
    }
    parents
}

/// Source span of every node below `root`, measured from the start of
/// `root`'s printed text. Token spans exclude trivia.
pub fn compute_spans(root: &Node) -> FxHashMap<NodeId, Span> {
    enum Visit {
        Enter(Node),
        Exit(Node),
    }

    let mut spans = FxHashMap::default();
    let mut offset = 0usize;
    let mut stack = vec![Visit::Enter(root.clone())];
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(node) => {
                if let Some(token) = node.as_token() {
                    let start = offset + token.trivia.len();
                    offset = start + token.text.len();
                    spans.insert(node.id(), Span::from_range(start..offset));
                } else {
                    let children = node.children();
                    stack.push(Visit::Exit(node));
                    stack.extend(children.into_iter().rev().map(Visit::Enter));
                }
            }
            Visit::Exit(node) => {
                let children = node.children();
                let first = children.first().and_then(|c| spans.get(&c.id()).copied());
                let last = children.last().and_then(|c| spans.get(&c.id()).copied());
                let span = match (first, last) {
                    (Some(first), Some(last)) => first.merge(last),
                    _ => Span::from_range(offset..offset),
                };
                spans.insert(node.id(), span);
            }
        }
    }
    spans
}

#[cfg(test)]
mod tests;
