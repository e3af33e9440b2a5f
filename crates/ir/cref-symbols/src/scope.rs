//! Lookup scopes, import scopes and host capabilities

use crate::model::{SourceId, SymbolId};
use cref_arena::Idx;
use cref_intern::Symbol;

/// Handle to an import scope
pub type ImportScopeId = Idx<ImportScope>;

/// A container viewed through an optional source filter
///
/// Dotting into a namespace reached through an extern alias only sees what that
/// alias's source declares.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct ContainerRef {
    /// Namespace or type
    pub symbol: SymbolId,
    /// Only members from this source, when set
    pub source: Option<SourceId>,
}

impl ContainerRef {
    /// View a container unfiltered
    pub fn unfiltered(symbol: SymbolId) -> Self {
        Self {
            symbol,
            source: None,
        }
    }

    /// The same filter applied to a nested container
    #[must_use]
    pub fn nested(self, symbol: SymbolId) -> Self {
        Self {
            symbol,
            source: self.source,
        }
    }
}

/// Where a name is looked up
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum LookupScope {
    /// The own type parameters of a type or method
    TypeParameters(SymbolId),
    /// The directly declared members of a container; inherited members are never included
    Members(ContainerRef),
    /// The types of imported namespaces plus the aliases of one import scope
    Imports(ImportScopeId),
}

/// One `using` directive or extern alias
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum Import {
    /// `using N;`: the types declared directly in `N`
    Namespace(SymbolId),
    /// `using A = N.C;`
    Alias {
        /// Alias name
        name: Symbol,
        /// Aliased namespace or type
        target: SymbolId,
    },
    /// `extern alias A;`: the global namespace of one source
    Extern {
        /// Alias name
        name: Symbol,
        /// The aliased source
        source: SourceId,
    },
}

/// The imports in effect inside one namespace declaration
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImportScope {
    /// Enclosing import scope, for the enclosing namespace declaration
    pub parent: Option<ImportScopeId>,
    /// The namespace these imports are attached to
    pub namespace: SymbolId,
    /// Imports in declaration order
    pub imports: Vec<Import>,
}

/// A host feature that changes what reference text may contain
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum Capability {
    /// `ref readonly` parameters
    RefReadonlyParameters,
}
