//! String interning for declaration names
//!
//! Every name in the program model is interned once. Reference text is only ever
//! *looked up* against the interner: a name that was never interned cannot name
//! any declaration, so lookups short-circuit without growing the table.

pub use lasso::Spur as Symbol;
use lasso::ThreadedRodeo;
use std::sync::Arc;

/// Thread-safe string interner
#[derive(Clone, Debug)]
pub struct Interner {
    inner: Arc<ThreadedRodeo>,
}

impl Interner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern a string, returning its symbol
    pub fn intern(&self, text: &str) -> Symbol {
        self.inner.get_or_intern(text)
    }

    /// Look up the symbol of an already interned string
    pub fn get(&self, text: &str) -> Option<Symbol> {
        self.inner.get(text)
    }

    /// Resolve a symbol back to its text
    pub fn resolve(&self, sym: &Symbol) -> &str {
        self.inner.resolve(sym)
    }

    /// Resolve a symbol that may belong to a different interner
    pub fn try_resolve(&self, sym: &Symbol) -> Option<&str> {
        self.inner.try_resolve(sym)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
