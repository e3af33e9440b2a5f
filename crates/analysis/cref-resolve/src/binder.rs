//! Binding paths and types written in a reference
//!
//! Qualifier paths bind to containers; parameter types, conversion targets and type
//! arguments bind to [`TypeExpr`]s. A bare name in a type position is checked against
//! the reference's placeholders before any real declaration.

use crate::placeholders::PlaceholderTable;
use crate::result::UnresolvedReason;
use crate::scope::ScopeChain;
use cref_symbols::{
    Arity, CandidateSet, ContainerRef, ImportScopeId, LookupScope, SourceId, SymbolId,
    SymbolKind, SymbolRef, SymbolTable, TypeExpr,
};
use cref_syntax::{Segment, SegmentName, TypeArgument, TypePath, TypeRef};

/// What a path named
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct PathValue {
    /// The declaration with its flattened type arguments
    pub(crate) symbol: SymbolRef,
    /// The source filter inherited from an extern alias
    pub(crate) source: Option<SourceId>,
}

impl PathValue {
    /// The path as a container to look members up in
    pub(crate) fn container(&self, table: &dyn SymbolTable) -> Option<ContainerRef> {
        table
            .symbol(self.symbol.def)
            .kind
            .is_container()
            .then_some(ContainerRef {
                symbol: self.symbol.def,
                source: self.source,
            })
    }

    /// Whether the path named a type
    pub(crate) fn is_type(&self, table: &dyn SymbolTable) -> bool {
        table.symbol(self.symbol.def).kind.is_type()
    }
}

/// Name binding for one reference
pub(crate) struct Binder<'res> {
    table: &'res dyn SymbolTable,
    imports: Option<ImportScopeId>,
    scopes: ScopeChain,
    placeholders: PlaceholderTable,
}

impl<'res> Binder<'res> {
    pub(crate) fn new(
        table: &'res dyn SymbolTable,
        imports: Option<ImportScopeId>,
        scopes: ScopeChain,
        placeholders: PlaceholderTable,
    ) -> Self {
        Self {
            table,
            imports,
            scopes,
            placeholders,
        }
    }

    pub(crate) fn placeholders(&self) -> &PlaceholderTable {
        &self.placeholders
    }

    /// Look a name up through the scope chain
    pub(crate) fn lookup_unqualified(&self, name: &str, arity: Arity) -> CandidateSet {
        self.scopes.lookup(self.table, name, arity)
    }

    /// Look a type name up through the scope chain, ignoring everything but types
    pub(crate) fn lookup_unqualified_types(&self, name: &str, arity: Arity) -> CandidateSet {
        self.scopes.lookup_where(self.table, name, arity, |symbol| {
            self.table.symbol(symbol).kind.is_type()
        })
    }

    /// Bind a path
    ///
    /// `first_list` numbers the path's `{...}` lists as declaring lists, starting at that
    /// index; without it the lists hold ordinary type arguments.
    pub(crate) fn resolve_path(
        &self,
        path: &TypePath,
        first_list: Option<u32>,
    ) -> Result<PathValue, UnresolvedReason> {
        let mut current = match &path.alias {
            Some(alias) => {
                let container = self
                    .table
                    .resolve_alias(self.imports, &alias.text)
                    .ok_or(UnresolvedReason::AliasNotFound)?;
                Some(PathValue {
                    symbol: SymbolRef::definition(container.symbol),
                    source: container.source,
                })
            }
            None => None,
        };

        let mut next_list = first_list;
        for (position, segment) in path.segments.iter().enumerate() {
            let list = match (&segment.type_arguments, next_list) {
                (Some(_), Some(list)) => {
                    next_list = Some(list + 1);
                    Some(list)
                }
                _ => None,
            };
            let own_args = self.segment_args(segment, list)?;
            let arity = segment.arity().map_or(Arity::Omitted, Arity::Exact);
            let continues = position + 1 < path.segments.len();

            let value = match current.take() {
                None => self.first_segment(segment, arity, continues, own_args)?,
                Some(previous) => self.nested_segment(&previous, segment, arity, own_args)?,
            };
            current = Some(value);
        }

        current.ok_or(UnresolvedReason::NotFound)
    }

    fn first_segment(
        &self,
        segment: &Segment,
        arity: Arity,
        continues: bool,
        own_args: Vec<TypeExpr>,
    ) -> Result<PathValue, UnresolvedReason> {
        let def = match &segment.name {
            SegmentName::Predefined { ty, .. } => self
                .table
                .special_type(*ty)
                .ok_or(UnresolvedReason::NotFound)?,
            SegmentName::Ident(ident) => {
                if continues
                    && segment.type_arguments.is_none()
                    && self.placeholders.contains(&ident.text)
                {
                    return Err(UnresolvedReason::NotAContainer);
                }
                single(&self.lookup_unqualified(&ident.text, arity))?
            }
        };

        let mut type_arguments = self.outer_identity(def);
        type_arguments.extend(own_args);
        Ok(PathValue {
            symbol: SymbolRef {
                def,
                type_arguments,
            },
            source: None,
        })
    }

    fn nested_segment(
        &self,
        previous: &PathValue,
        segment: &Segment,
        arity: Arity,
        own_args: Vec<TypeExpr>,
    ) -> Result<PathValue, UnresolvedReason> {
        let container = previous
            .container(self.table)
            .ok_or(UnresolvedReason::NotAContainer)?;
        let found = self.table.lookup(
            LookupScope::Members(container),
            segment.name.text(),
            arity,
        );
        let def = single(&found)?;

        let mut type_arguments = if previous.is_type(self.table) {
            previous.symbol.type_arguments.clone()
        } else {
            Vec::new()
        };
        type_arguments.extend(own_args);
        Ok(PathValue {
            symbol: SymbolRef {
                def,
                type_arguments,
            },
            source: container.source,
        })
    }

    /// Bind the `{...}` list of a segment
    ///
    /// In a declaring list each placeholder binds to the instance its name refers to;
    /// recovered type arguments and ordinary lists bind as types.
    pub(crate) fn segment_args(
        &self,
        segment: &Segment,
        list: Option<u32>,
    ) -> Result<Vec<TypeExpr>, UnresolvedReason> {
        let Some(arguments) = &segment.type_arguments else {
            return Ok(Vec::new());
        };
        arguments
            .arguments
            .iter()
            .enumerate()
            .map(|(ordinal, argument)| match (argument, list) {
                (TypeArgument::Placeholder(_), Some(declaring)) => self
                    .placeholders
                    .at(declaring, ordinal as u32)
                    .ok_or(UnresolvedReason::NotFound),
                (TypeArgument::Placeholder(ident), None) => self
                    .placeholders
                    .by_name(&ident.text)
                    .ok_or(UnresolvedReason::NotFound),
                (TypeArgument::Type(ty), _) => self.bind_type(ty),
            })
            .collect()
    }

    /// Bind a type written in a parameter list, conversion target or type argument
    pub(crate) fn bind_type(&self, ty: &TypeRef) -> Result<TypeExpr, UnresolvedReason> {
        match ty {
            TypeRef::Dynamic(_) => Ok(TypeExpr::Dynamic),
            TypeRef::Array { element, rank, .. } => Ok(TypeExpr::Array {
                element: Box::new(self.bind_type(element)?),
                rank: *rank,
            }),
            TypeRef::Pointer { pointee, .. } => {
                Ok(TypeExpr::Pointer(Box::new(self.bind_type(pointee)?)))
            }
            TypeRef::Nullable { underlying, .. } => {
                Ok(TypeExpr::Nullable(Box::new(self.bind_type(underlying)?)))
            }
            TypeRef::Path(path) => {
                if let Some(placeholder) = path
                    .simple_name()
                    .and_then(|ident| self.placeholders.by_name(&ident.text))
                {
                    return Ok(placeholder);
                }
                let value = self.resolve_path(path, None)?;
                let def = value.symbol.def;
                match self.table.symbol(def).kind {
                    SymbolKind::Type(_) => Ok(TypeExpr::Named {
                        def,
                        args: value.symbol.type_arguments,
                    }),
                    SymbolKind::TypeParameter { .. } => Ok(TypeExpr::TypeParameter(def)),
                    _ => Err(UnresolvedReason::NotFound),
                }
            }
        }
    }

    /// Type arguments a declaration found by unqualified lookup implicitly carries: the
    /// type parameters of its enclosing generic types
    pub(crate) fn outer_identity(&self, def: SymbolId) -> Vec<TypeExpr> {
        let data = self.table.symbol(def);
        if matches!(
            data.kind,
            SymbolKind::Namespace | SymbolKind::TypeParameter { .. }
        ) {
            return Vec::new();
        }
        let chain = self.table.type_parameter_chain(def);
        let outer = chain.len().saturating_sub(data.type_parameters.len());
        chain[..outer]
            .iter()
            .map(|param| TypeExpr::TypeParameter(*param))
            .collect()
    }
}

/// The only candidate; more than one is an ambiguous qualifier
fn single(found: &CandidateSet) -> Result<SymbolId, UnresolvedReason> {
    match found.len() {
        0 => Err(UnresolvedReason::NotFound),
        1 => found.first().ok_or(UnresolvedReason::NotFound),
        _ => Err(UnresolvedReason::AmbiguousQualifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ResolverOptions;
    use cref_parser::{ParseOptions, parse_reference};
    use cref_symbols::{ProgramBuilder, ProgramModel, TypeDecl};
    use cref_syntax::{PredefinedType, ReferenceTree};

    fn binder_for<'res>(
        program: &'res ProgramModel,
        anchor: SymbolId,
        tree: &ReferenceTree,
    ) -> Binder<'res> {
        let scopes = ScopeChain::at(program, anchor, None, &ResolverOptions::default());
        Binder::new(program, None, scopes, PlaceholderTable::declare_all(tree))
    }

    fn tree(text: &str) -> ReferenceTree {
        let output = parse_reference(text, ParseOptions::default());
        let Some(tree) = output.tree else {
            panic!("`{text}` should parse");
        };
        tree
    }

    #[test]
    fn test_nested_generic_carries_outer_arguments() {
        let mut builder = ProgramBuilder::new();
        builder.add_platform_types();
        let outer = builder.add_type(builder.global(), TypeDecl::class("Outer").generic(["T"]));
        let inner = builder.add_type(outer, TypeDecl::class("Inner").generic(["U"]));
        let program = builder.finish();

        let reference = tree("M(Outer{int}.Inner{string})");
        let binder = binder_for(&program, program.global_namespace(), &reference);
        let Some(parameters) = reference.parameters() else {
            panic!("parameter list expected");
        };
        let bound = binder.bind_type(&parameters.parameters[0].ty);

        let named = |keyword| {
            program
                .special_type(keyword)
                .map_or(TypeExpr::Dynamic, TypeExpr::named)
        };
        let expected = TypeExpr::Named {
            def: inner,
            args: vec![
                named(PredefinedType::Int),
                named(PredefinedType::String),
            ],
        };
        assert_eq!(bound, Ok(expected));
    }

    #[test]
    fn test_placeholder_shadows_real_type() {
        let mut builder = ProgramBuilder::new();
        let system = builder.add_platform_types();
        builder.add_type(builder.global(), TypeDecl::class("A").generic(["T"]));
        let program = builder.finish();

        // `Int32` is a real type in `System`, but here it names the placeholder.
        let reference = tree("A{Int32}.M(Int32)");
        let binder = binder_for(&program, system, &reference);
        let Some(parameters) = reference.parameters() else {
            panic!("parameter list expected");
        };
        let bound = binder.bind_type(&parameters.parameters[0].ty);
        assert!(matches!(bound, Ok(TypeExpr::Placeholder(_))));
        assert_eq!(bound.ok(), binder.placeholders().at(0, 0));
    }

    #[test]
    fn test_dotting_into_placeholder_fails() {
        let mut builder = ProgramBuilder::new();
        builder.add_type(builder.global(), TypeDecl::class("A").generic(["T"]));
        let program = builder.finish();

        let reference = tree("A{T}.M(T.C)");
        let binder = binder_for(&program, program.global_namespace(), &reference);
        let Some(parameters) = reference.parameters() else {
            panic!("parameter list expected");
        };
        assert_eq!(
            binder.bind_type(&parameters.parameters[0].ty),
            Err(UnresolvedReason::NotAContainer)
        );
    }

    #[test]
    fn test_ambiguous_qualifier_is_not_guessed() {
        let mut builder = ProgramBuilder::new();
        let library = builder.add_source("lib");
        let namespace = builder.namespace("N");
        let merged = builder.namespace_in(library, "N");
        assert_eq!(namespace, merged);
        builder.add_type(namespace, TypeDecl::class("C"));
        builder.add_type(namespace, TypeDecl::class("C").in_source(library));
        let program = builder.finish();

        let reference = tree("N.C.M");
        let binder = binder_for(&program, program.global_namespace(), &reference);
        let member = reference.as_member();
        let Some(qualifier) = &member.qualifier else {
            panic!("qualifier expected");
        };
        assert_eq!(
            binder.resolve_path(qualifier, Some(0)),
            Err(UnresolvedReason::AmbiguousQualifier)
        );
    }
}
