//! The resolution environment for type and conflict queries.
//!
//! A [`Context`] wraps one version of a [`Project`] and memoizes derived
//! facts per node: parents, spans, types and conflicts. Nodes are
//! immutable and ids are never reused, so cached entries stay valid for as
//! long as the context lives. An edit produces a new program and therefore
//! a new context.

use std::sync::{Arc, OnceLock};

use lumen_ir::{compute_parents, compute_spans, Node, NodeId, NodeKind, Span};
use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{Conflict, Project, Source, Type};

pub struct Context {
    project: Arc<Project>,
    parents: OnceLock<FxHashMap<NodeId, Node>>,
    spans: OnceLock<FxHashMap<NodeId, Span>>,
    types: RwLock<FxHashMap<NodeId, Type>>,
    conflicts: RwLock<FxHashMap<NodeId, Arc<[Conflict]>>>,
    in_progress: Mutex<FxHashSet<NodeId>>,
}

impl Context {
    /// A context for a single program with no borrowable sources.
    pub fn new(program: &Node) -> Self {
        Context::for_project(Arc::new(Project::new(program.clone())))
    }

    pub fn for_project(project: Arc<Project>) -> Self {
        Context {
            project,
            parents: OnceLock::new(),
            spans: OnceLock::new(),
            types: RwLock::new(FxHashMap::default()),
            conflicts: RwLock::new(FxHashMap::default()),
            in_progress: Mutex::new(FxHashSet::default()),
        }
    }

    pub fn project(&self) -> &Arc<Project> {
        &self.project
    }

    /// The main program.
    pub fn program(&self) -> &Node {
        &self.project.main().program
    }

    fn parents(&self) -> &FxHashMap<NodeId, Node> {
        self.parents.get_or_init(|| {
            let mut parents = FxHashMap::default();
            for source in self.project.sources() {
                parents.extend(compute_parents(&source.program));
            }
            parents
        })
    }

    pub fn parent(&self, node: &Node) -> Option<Node> {
        self.parents().get(&node.id()).cloned()
    }

    /// Parent, grandparent, and so on up to the program.
    pub fn ancestors(&self, node: &Node) -> Vec<Node> {
        let mut out = Vec::new();
        let mut current = node.id();
        while let Some(parent) = self.parents().get(&current) {
            out.push(parent.clone());
            current = parent.id();
        }
        out
    }

    /// Whether `ancestor` is `node` or contains it.
    pub fn contains(&self, ancestor: &Node, node: &Node) -> bool {
        ancestor.same(node) || self.ancestors(node).iter().any(|a| a.same(ancestor))
    }

    /// Span within the node's own source text.
    pub fn span(&self, node: &Node) -> Span {
        let spans = self.spans.get_or_init(|| {
            let mut spans = FxHashMap::default();
            for source in self.project.sources() {
                spans.extend(compute_spans(&source.program));
            }
            spans
        });
        spans.get(&node.id()).copied().unwrap_or(Span::DUMMY)
    }

    /// The source containing `node`.
    pub fn source_of(&self, node: &Node) -> Option<&Source> {
        let root = self.ancestors(node).pop().unwrap_or_else(|| node.clone());
        if !matches!(root.kind(), NodeKind::Program(_)) {
            return None;
        }
        self.project.source_of(&root)
    }

    pub(crate) fn cached_type(&self, node: &Node) -> Option<Type> {
        self.types.read().get(&node.id()).cloned()
    }

    pub(crate) fn store_type(&self, node: &Node, ty: &Type) {
        self.types.write().insert(node.id(), ty.clone());
    }

    pub(crate) fn cached_conflicts(&self, node: &Node) -> Option<Arc<[Conflict]>> {
        self.conflicts.read().get(&node.id()).cloned()
    }

    pub(crate) fn store_conflicts(&self, node: &Node, conflicts: Arc<[Conflict]>) {
        self.conflicts.write().insert(node.id(), conflicts);
    }

    /// Mark `node` as being computed. False if it already is, which means
    /// its type depends on itself.
    pub(crate) fn enter(&self, node: &Node) -> bool {
        self.in_progress.lock().insert(node.id())
    }

    pub(crate) fn exit(&self, node: &Node) {
        self.in_progress.lock().remove(&node.id());
    }

    /// Drop every memoized type and conflict.
    pub fn clear_caches(&self) {
        self.types.write().clear();
        self.conflicts.write().clear();
    }

    pub fn cached_type_count(&self) -> usize {
        self.types.read().len()
    }
}
