//! Identifier text.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// An identifier as written in source.
///
/// Names are compared case-sensitively. [`Name::folded`] gives the
/// lowercase form used to detect case collisions between aliases.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Arc<str>);

impl Name {
    pub fn new(text: &str) -> Self {
        Name(Arc::from(text))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form, for case-collision warnings only.
    pub fn folded(&self) -> String {
        self.0.to_lowercase()
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Name::new(text)
    }
}

impl std::ops::Deref for Name {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
