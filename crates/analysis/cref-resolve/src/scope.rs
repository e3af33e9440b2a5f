//! The lexical scope chain at a reference's anchor
//!
//! An unqualified first segment is looked up level by level, innermost first, and the
//! first level with any candidate wins:
//!
//! 1. the anchor's own type parameters, when the anchor is a member
//! 2. for each enclosing type, outward: its type parameters, then its declared members
//! 3. for each enclosing namespace, outward: its members, then the import scopes
//!    attached to it
//!
//! The global namespace is the last namespace. Inherited members are never part of a
//! level.

use crate::options::ResolverOptions;
use cref_symbols::{
    Arity, CandidateSet, ContainerRef, ImportScopeId, LookupScope, SymbolId, SymbolTable,
};
use std::iter;

/// Lookup levels from the anchor outward
#[derive(Clone, Debug)]
pub(crate) struct ScopeChain {
    levels: Vec<LookupScope>,
}

impl ScopeChain {
    /// Build the chain visible at `anchor` with the import scope `imports`
    pub(crate) fn at(
        table: &dyn SymbolTable,
        anchor: SymbolId,
        imports: Option<ImportScopeId>,
        options: &ResolverOptions,
    ) -> Self {
        let mut attached = import_scopes(table, imports);
        let mut levels = Vec::new();

        let anchor_data = table.symbol(anchor);
        if !anchor_data.kind.is_container()
            && options.method_type_parameters_in_scope
            && !anchor_data.type_parameters.is_empty()
        {
            levels.push(LookupScope::TypeParameters(anchor));
        }

        for symbol in iter::once(anchor).chain(table.ancestors(anchor)) {
            let data = table.symbol(symbol);
            if data.kind.is_type() {
                if !data.type_parameters.is_empty() {
                    levels.push(LookupScope::TypeParameters(symbol));
                }
                levels.push(LookupScope::Members(ContainerRef::unfiltered(symbol)));
            } else if data.kind.is_namespace() {
                levels.push(LookupScope::Members(ContainerRef::unfiltered(symbol)));
                attached.retain(|scope| {
                    let here = table.import_scope(*scope).namespace == symbol;
                    if here {
                        levels.push(LookupScope::Imports(*scope));
                    }
                    !here
                });
            }
        }

        // Import scopes attached to a namespace the anchor is not inside still apply,
        // after everything else.
        levels.extend(attached.into_iter().map(LookupScope::Imports));
        Self { levels }
    }

    /// Candidates from the first level that has any
    pub(crate) fn lookup(&self, table: &dyn SymbolTable, name: &str, arity: Arity) -> CandidateSet {
        self.lookup_where(table, name, arity, |_| true)
    }

    /// Candidates accepted by `keep` from the first level that has any
    pub(crate) fn lookup_where(
        &self,
        table: &dyn SymbolTable,
        name: &str,
        arity: Arity,
        keep: impl Fn(SymbolId) -> bool,
    ) -> CandidateSet {
        for (depth, level) in self.levels.iter().enumerate() {
            let found = table.lookup(*level, name, arity).filter(&keep);
            tracing::trace!(depth, ?level, name, candidates = found.len(), "scope level");
            if !found.is_empty() {
                return found;
            }
        }
        CandidateSet::default()
    }

    /// Number of levels
    pub(crate) fn depth(&self) -> usize {
        self.levels.len()
    }
}

/// The import scope chain from the innermost scope outward
fn import_scopes(table: &dyn SymbolTable, imports: Option<ImportScopeId>) -> Vec<ImportScopeId> {
    let mut scopes = Vec::new();
    let mut current = imports;
    while let Some(scope) = current {
        scopes.push(scope);
        current = table.import_scope(scope).parent;
    }
    scopes
}
