//! Lexical scopes for runtime bindings.
//!
//! A [`Scope`] is a shared handle to one level of bindings plus its parent.
//! Closures and structure instances hold the scope they were created in, so
//! a function defined before a later bind in the same block (including
//! itself, for recursion) still sees it once it is bound.
//!
//! Scopes are shared between frames and snapshots, so a bind cannot be
//! undone by restoring a frame. Every [`Scope::define`] returns the value
//! it replaced; the evaluator journals that to undo binds when stepping
//! backward.

use std::fmt;
use std::sync::Arc;

use lumen_ir::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Value;

struct ScopeData {
    bindings: RwLock<FxHashMap<Name, Value>>,
    parent: Option<Scope>,
}

/// Handle to one level of bindings. Cloning shares the level.
#[derive(Clone)]
pub struct Scope(Arc<ScopeData>);

impl Scope {
    /// An empty scope with no parent.
    pub fn root() -> Self {
        Scope(Arc::new(ScopeData {
            bindings: RwLock::new(FxHashMap::default()),
            parent: None,
        }))
    }

    /// An empty scope whose lookups fall back to `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        Scope(Arc::new(ScopeData {
            bindings: RwLock::new(FxHashMap::default()),
            parent: Some(self.clone()),
        }))
    }

    /// Bind `name` in this level, returning what it replaced.
    pub fn define(&self, name: Name, value: Value) -> Option<Value> {
        self.0.bindings.write().insert(name, value)
    }

    /// Restore `name` in this level to `previous`.
    pub fn undefine(&self, name: &Name, previous: Option<Value>) {
        let mut bindings = self.0.bindings.write();
        match previous {
            Some(value) => {
                bindings.insert(name.clone(), value);
            }
            None => {
                bindings.remove(name);
            }
        }
    }

    /// Look `name` up here, then in each parent.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut scope = self;
        loop {
            if let Some(value) = scope.0.bindings.read().get(name) {
                return Some(value.clone());
            }
            scope = scope.0.parent.as_ref()?;
        }
    }

    /// Value of `name` in this level, ignoring parents.
    pub fn get_here(&self, name: &str) -> Option<Value> {
        self.0.bindings.read().get(name).cloned()
    }

    /// Whether `name` is bound in this level, ignoring parents.
    pub fn is_bound_here(&self, name: &str) -> bool {
        self.0.bindings.read().contains_key(name)
    }

    /// Bindings of this level only, sorted by name.
    pub fn local_bindings(&self) -> Vec<(Name, Value)> {
        let mut out: Vec<(Name, Value)> = self
            .0
            .bindings
            .read()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub fn same(&self, other: &Scope) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of levels from here to the root, inclusive.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut scope = self;
        while let Some(parent) = &scope.0.parent {
            depth += 1;
            scope = parent;
        }
        depth
    }
}

impl fmt::Debug for Scope {
    // Bindings may hold closures over this scope, so never print values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<Name> = self.0.bindings.read().keys().cloned().collect();
        f.debug_struct("Scope")
            .field("names", &names)
            .field("depth", &self.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests;
