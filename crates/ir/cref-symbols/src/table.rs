//! The declaration-table seam the resolver queries

use crate::model::{Arity, CandidateSet, SymbolData, SymbolId};
use crate::scope::{Capability, ContainerRef, ImportScope, ImportScopeId, LookupScope};
use cref_intern::Interner;
use cref_syntax::PredefinedType;

/// Read-only view of a program's declarations
///
/// Implementations must be safe to share between threads: the resolver treats the table
/// as an immutable snapshot and may resolve many references against it at once.
pub trait SymbolTable: Sync {
    /// The declaration behind a handle
    fn symbol(&self, id: SymbolId) -> &SymbolData;

    /// The interner that declaration names were interned with
    fn interner(&self) -> &Interner;

    /// The root namespace
    fn global_namespace(&self) -> SymbolId;

    /// Declarations named `name` in `scope` whose generic arity matches `arity`, ordered
    /// by source registration order, then declaration order
    fn lookup(&self, scope: LookupScope, name: &str, arity: Arity) -> CandidateSet;

    /// Resolve the `name` in `name::` through the import scopes visible at `imports`
    ///
    /// `global` always names the global namespace.
    fn resolve_alias(&self, imports: Option<ImportScopeId>, name: &str) -> Option<ContainerRef>;

    /// The platform type a predefined keyword stands for
    fn special_type(&self, ty: PredefinedType) -> Option<SymbolId>;

    /// Whether the host supports a feature
    fn capability(&self, capability: Capability) -> bool;

    /// The import scope behind a handle
    fn import_scope(&self, id: ImportScopeId) -> &ImportScope;

    /// The declared name of a symbol
    fn name(&self, id: SymbolId) -> &str {
        self.interner().resolve(&self.symbol(id).name)
    }

    /// Containers of `id` from the innermost outward, not including `id`
    fn ancestors(&self, id: SymbolId) -> Vec<SymbolId> {
        let mut ancestors = Vec::new();
        let mut current = self.symbol(id).container;
        while let Some(container) = current {
            ancestors.push(container);
            current = self.symbol(container).container;
        }
        ancestors
    }

    /// Type parameters in scope for a type or method, flattened outermost first
    ///
    /// This is the order [`crate::SymbolRef`] type arguments are given in.
    fn type_parameter_chain(&self, id: SymbolId) -> Vec<SymbolId> {
        let mut owners: Vec<SymbolId> = self
            .ancestors(id)
            .into_iter()
            .take_while(|ancestor| self.symbol(*ancestor).kind.is_type())
            .collect();
        owners.reverse();
        owners.push(id);
        owners
            .into_iter()
            .flat_map(|owner| self.symbol(owner).type_parameters.iter().copied())
            .collect()
    }

    /// The nearest namespace containing `id`, or `id` itself if it is a namespace
    fn containing_namespace(&self, id: SymbolId) -> SymbolId {
        if self.symbol(id).kind.is_namespace() {
            return id;
        }
        self.ancestors(id)
            .into_iter()
            .find(|ancestor| self.symbol(*ancestor).kind.is_namespace())
            .unwrap_or_else(|| self.global_namespace())
    }
}
