//! In-memory declaration table

use crate::model::{Arity, CandidateSet, SourceId, SymbolData, SymbolId};
use crate::scope::{Capability, ContainerRef, Import, ImportScope, ImportScopeId, LookupScope};
use crate::table::SymbolTable;
use cref_arena::{Arena, ordinal};
use cref_intern::{Interner, Symbol};
use cref_syntax::PredefinedType;
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};

/// Members of one container, grouped by name in first-declaration order
pub(crate) type MemberIndex = IndexMap<Symbol, Vec<SymbolId>, FxBuildHasher>;

/// A registered declaration source
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceData {
    /// Display name
    pub name: String,
    /// Whether the source's declarations are visible from the global namespace, rather
    /// than only through an extern alias
    pub globally_visible: bool,
}

/// A complete program model built with [`crate::ProgramBuilder`]
#[derive(Debug)]
pub struct ProgramModel {
    pub(crate) interner: Interner,
    pub(crate) symbols: Arena<SymbolData>,
    pub(crate) import_scopes: Arena<ImportScope>,
    pub(crate) sources: Vec<SourceData>,
    pub(crate) global: SymbolId,
    pub(crate) member_index: FxHashMap<SymbolId, MemberIndex>,
    pub(crate) namespace_sources: FxHashMap<SymbolId, FxHashSet<SourceId>>,
    pub(crate) special_types: FxHashMap<PredefinedType, SymbolId>,
    pub(crate) capabilities: FxHashSet<Capability>,
}

impl ProgramModel {
    /// A registered source
    pub fn source(&self, source: SourceId) -> Option<&SourceData> {
        self.sources.get(source.0 as usize)
    }

    /// Number of declarations, including type parameters
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Find a declaration by dotted path from the global namespace
    ///
    /// Each step takes the first member with that name, so this is only meant for
    /// addressing declarations whose names are unique.
    pub fn find(&self, path: &str) -> Option<SymbolId> {
        path.split('.').try_fold(self.global, |container, name| {
            let name = self.interner.get(name)?;
            self.member_index.get(&container)?.get(&name)?.first().copied()
        })
    }

    /// All members of `container` named `name`, in declaration order
    pub fn members_named(&self, container: SymbolId, name: &str) -> Vec<SymbolId> {
        self.interner
            .get(name)
            .and_then(|name| self.member_index.get(&container)?.get(&name).cloned())
            .unwrap_or_default()
    }

    fn source_visible(&self, source: SourceId) -> bool {
        self.source(source)
            .is_some_and(|source| source.globally_visible)
    }

    /// Whether a namespace member is visible through `filter`
    fn visible_in(&self, member: SymbolId, filter: Option<SourceId>) -> bool {
        let data = &self.symbols[member];
        if !data.kind.is_namespace() {
            return match filter {
                Some(source) => data.source == source,
                None => self.source_visible(data.source),
            };
        }

        let Some(sources) = self.namespace_sources.get(&member) else {
            return filter.is_none();
        };
        match filter {
            Some(source) => sources.contains(&source),
            None => sources.iter().any(|source| self.source_visible(*source)),
        }
    }

    fn declared_members(&self, container: ContainerRef, name: Symbol) -> Vec<SymbolId> {
        let Some(members) = self
            .member_index
            .get(&container.symbol)
            .and_then(|index| index.get(&name))
        else {
            return Vec::new();
        };

        // Members of a type always come from the type's own source.
        if !self.symbols[container.symbol].kind.is_namespace() {
            return members.clone();
        }
        members
            .iter()
            .copied()
            .filter(|member| self.visible_in(*member, container.source))
            .collect()
    }

    fn imported(&self, imports: ImportScopeId, name: Symbol, arity: Arity) -> Vec<SymbolId> {
        let mut found = Vec::new();
        for import in &self.import_scopes[imports].imports {
            match import {
                Import::Namespace(namespace) => found.extend(
                    self.declared_members(ContainerRef::unfiltered(*namespace), name)
                        .into_iter()
                        .filter(|member| self.matches_arity(*member, arity))
                        .filter(|member| self.symbols[*member].kind.is_type()),
                ),
                Import::Alias {
                    name: alias,
                    target,
                } if *alias == name && !matches!(arity, Arity::Exact(_)) => found.push(*target),
                Import::Alias { .. } | Import::Extern { .. } => {}
            }
        }
        found
    }

    fn matches_arity(&self, symbol: SymbolId, arity: Arity) -> bool {
        let data = &self.symbols[symbol];
        arity.matches(data.kind, data.arity())
    }
}

impl SymbolTable for ProgramModel {
    fn symbol(&self, id: SymbolId) -> &SymbolData {
        &self.symbols[id]
    }

    fn interner(&self) -> &Interner {
        &self.interner
    }

    fn global_namespace(&self) -> SymbolId {
        self.global
    }

    fn lookup(&self, scope: LookupScope, name: &str, arity: Arity) -> CandidateSet {
        let Some(name) = self.interner.get(name) else {
            return CandidateSet::default();
        };

        let mut found = match scope {
            LookupScope::TypeParameters(owner) => self.symbols[owner]
                .type_parameters
                .iter()
                .copied()
                .filter(|param| self.symbols[*param].name == name)
                .filter(|param| self.matches_arity(*param, arity))
                .collect(),
            LookupScope::Members(container) => self
                .declared_members(container, name)
                .into_iter()
                .filter(|member| self.matches_arity(*member, arity))
                .collect(),
            LookupScope::Imports(imports) => self.imported(imports, name, arity),
        };

        found.sort_by_key(|symbol: &SymbolId| (self.symbols[*symbol].source, ordinal(*symbol)));
        found.dedup();
        tracing::trace!(?scope, candidates = found.len(), "lookup");
        CandidateSet::new(found)
    }

    fn resolve_alias(&self, imports: Option<ImportScopeId>, name: &str) -> Option<ContainerRef> {
        if name == "global" {
            return Some(ContainerRef::unfiltered(self.global));
        }
        let name = self.interner.get(name)?;

        let mut current = imports;
        while let Some(scope_id) = current {
            let scope = &self.import_scopes[scope_id];
            for import in &scope.imports {
                match import {
                    Import::Extern {
                        name: alias,
                        source,
                    } if *alias == name => {
                        return Some(ContainerRef {
                            symbol: self.global,
                            source: Some(*source),
                        });
                    }
                    Import::Alias {
                        name: alias,
                        target,
                    } if *alias == name && self.symbols[*target].kind.is_namespace() => {
                        return Some(ContainerRef::unfiltered(*target));
                    }
                    Import::Namespace(_) | Import::Alias { .. } | Import::Extern { .. } => {}
                }
            }
            current = scope.parent;
        }
        None
    }

    fn special_type(&self, ty: PredefinedType) -> Option<SymbolId> {
        self.special_types.get(&ty).copied()
    }

    fn capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    fn import_scope(&self, id: ImportScopeId) -> &ImportScope {
        &self.import_scopes[id]
    }
}
