//! Building a program model
//!
//! Declarations are added top-down: namespaces, then types, then their members.
//! Signature types are written in a compact text form (`List<T>[]`, `int*`, `N.C?`)
//! and resolved against the declaration being built: its own type parameters, the type
//! parameters of enclosing types, predefined keywords, and type names reachable from
//! any enclosing container.

use crate::error::BuildError;
use crate::model::{
    Accessibility, MethodKind, ParameterData, SourceId, SymbolData, SymbolId, SymbolKind,
    TypeExpr, TypeKind,
};
use crate::program::{ProgramModel, SourceData};
use crate::scope::{Capability, Import, ImportScope, ImportScopeId};
use crate::table::SymbolTable;
use cref_arena::Arena;
use cref_intern::Interner;
use cref_syntax::{
    CONSTRUCTOR_NAME, ConversionKind, DESTRUCTOR_NAME, INDEXER_NAME, OverloadableOperator,
    PredefinedType, RefKind, STATIC_CONSTRUCTOR_NAME,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::iter;

/// A signature type, either as text or already resolved
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeSpec {
    /// Compact type text, resolved when the declaration is added
    Text(String),
    /// A resolved type
    Exact(TypeExpr),
}

impl From<&str> for TypeSpec {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<TypeExpr> for TypeSpec {
    fn from(ty: TypeExpr) -> Self {
        Self::Exact(ty)
    }
}

impl From<SymbolId> for TypeSpec {
    fn from(def: SymbolId) -> Self {
        Self::Exact(TypeExpr::named(def))
    }
}

/// A parameter to be declared
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParamSpec {
    /// Parameter type
    pub ty: TypeSpec,
    /// Passing mode
    pub ref_kind: RefKind,
    /// Whether this is a `params` array
    pub is_params: bool,
}

/// A type to be declared
#[derive(Clone, Debug)]
pub struct TypeDecl {
    name: String,
    kind: TypeKind,
    type_parameters: Vec<String>,
    accessibility: Accessibility,
    is_static: bool,
    source: Option<SourceId>,
}

impl TypeDecl {
    fn new(kind: TypeKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            type_parameters: Vec::new(),
            accessibility: Accessibility::default(),
            is_static: false,
            source: None,
        }
    }

    /// A class
    pub fn class(name: &str) -> Self {
        Self::new(TypeKind::Class, name)
    }

    /// A struct
    pub fn structure(name: &str) -> Self {
        Self::new(TypeKind::Struct, name)
    }

    /// An interface
    pub fn interface(name: &str) -> Self {
        Self::new(TypeKind::Interface, name)
    }

    /// An enum
    pub fn enumeration(name: &str) -> Self {
        Self::new(TypeKind::Enum, name)
    }

    /// A delegate
    pub fn delegate(name: &str) -> Self {
        Self::new(TypeKind::Delegate, name)
    }

    /// Declare type parameters
    #[must_use]
    pub fn generic<'name>(mut self, names: impl IntoIterator<Item = &'name str>) -> Self {
        self.type_parameters = names.into_iter().map(str::to_string).collect();
        self
    }

    /// Set the declared accessibility
    #[must_use]
    pub fn accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// Mark the type static
    #[must_use]
    pub fn static_type(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Declare the type in a specific source; nested types always use their
    /// container's source
    #[must_use]
    pub fn in_source(mut self, source: SourceId) -> Self {
        self.source = Some(source);
        self
    }
}

#[derive(Clone, Debug)]
enum MethodName {
    Named(String),
    Constructor,
    StaticConstructor,
    Destructor,
    Operator(OverloadableOperator),
    Conversion(ConversionKind),
}

/// A method, constructor, operator or conversion to be declared
#[derive(Clone, Debug)]
pub struct MethodDecl {
    name: MethodName,
    type_parameters: Vec<String>,
    parameters: Vec<ParamSpec>,
    return_type: Option<TypeSpec>,
    accessibility: Accessibility,
    is_static: bool,
    is_vararg: bool,
    is_extension: bool,
}

impl MethodDecl {
    fn new(name: MethodName) -> Self {
        Self {
            name,
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: None,
            accessibility: Accessibility::default(),
            is_static: false,
            is_vararg: false,
            is_extension: false,
        }
    }

    /// An ordinary method
    pub fn method(name: &str) -> Self {
        Self::new(MethodName::Named(name.to_string()))
    }

    /// An instance constructor
    pub fn constructor() -> Self {
        Self::new(MethodName::Constructor)
    }

    /// A static constructor
    pub fn static_constructor() -> Self {
        let mut decl = Self::new(MethodName::StaticConstructor);
        decl.is_static = true;
        decl
    }

    /// A finalizer
    pub fn destructor() -> Self {
        Self::new(MethodName::Destructor)
    }

    /// A user-defined operator; the unary or binary name follows the parameter count
    pub fn operator(operator: OverloadableOperator) -> Self {
        let mut decl = Self::new(MethodName::Operator(operator));
        decl.is_static = true;
        decl
    }

    /// A user-defined conversion to `target`
    pub fn conversion(kind: ConversionKind, target: impl Into<TypeSpec>) -> Self {
        let mut decl = Self::new(MethodName::Conversion(kind));
        decl.is_static = true;
        decl.return_type = Some(target.into());
        decl
    }

    /// Declare method type parameters
    #[must_use]
    pub fn generic<'name>(mut self, names: impl IntoIterator<Item = &'name str>) -> Self {
        self.type_parameters = names.into_iter().map(str::to_string).collect();
        self
    }

    /// Add a by-value parameter
    #[must_use]
    pub fn param(self, ty: impl Into<TypeSpec>) -> Self {
        self.param_ref(RefKind::None, ty)
    }

    /// Add a parameter with a passing mode
    #[must_use]
    pub fn param_ref(mut self, ref_kind: RefKind, ty: impl Into<TypeSpec>) -> Self {
        self.parameters.push(ParamSpec {
            ty: ty.into(),
            ref_kind,
            is_params: false,
        });
        self
    }

    /// Add a trailing `params` array parameter
    #[must_use]
    pub fn params_array(mut self, ty: impl Into<TypeSpec>) -> Self {
        self.parameters.push(ParamSpec {
            ty: ty.into(),
            ref_kind: RefKind::None,
            is_params: true,
        });
        self
    }

    /// Set the return type
    #[must_use]
    pub fn returns(mut self, ty: impl Into<TypeSpec>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    /// Mark the method static
    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark the method as taking `__arglist`
    #[must_use]
    pub fn vararg(mut self) -> Self {
        self.is_vararg = true;
        self
    }

    /// Mark the method as an extension method
    #[must_use]
    pub fn extension(mut self) -> Self {
        self.is_extension = true;
        self.is_static = true;
        self
    }

    /// Set the declared accessibility
    #[must_use]
    pub fn accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    fn kind(&self) -> MethodKind {
        match self.name {
            MethodName::Named(_) => MethodKind::Ordinary,
            MethodName::Constructor => MethodKind::Constructor,
            MethodName::StaticConstructor => MethodKind::StaticConstructor,
            MethodName::Destructor => MethodKind::Destructor,
            MethodName::Operator(_) => MethodKind::Operator,
            MethodName::Conversion(_) => MethodKind::Conversion,
        }
    }

    fn canonical_name(&self) -> &str {
        match &self.name {
            MethodName::Named(name) => name,
            MethodName::Constructor => CONSTRUCTOR_NAME,
            MethodName::StaticConstructor => STATIC_CONSTRUCTOR_NAME,
            MethodName::Destructor => DESTRUCTOR_NAME,
            MethodName::Operator(operator) => operator.member_name(Some(self.parameters.len())),
            MethodName::Conversion(kind) => kind.member_name(),
        }
    }
}

/// A field, property, event or indexer to be declared
#[derive(Clone, Debug)]
pub struct MemberDecl {
    kind: SymbolKind,
    name: String,
    ty: TypeSpec,
    parameters: Vec<ParamSpec>,
    accessibility: Accessibility,
    is_static: bool,
}

impl MemberDecl {
    fn new(kind: SymbolKind, name: &str, ty: impl Into<TypeSpec>) -> Self {
        Self {
            kind,
            name: name.to_string(),
            ty: ty.into(),
            parameters: Vec::new(),
            accessibility: Accessibility::default(),
            is_static: false,
        }
    }

    /// A field
    pub fn field(name: &str, ty: impl Into<TypeSpec>) -> Self {
        Self::new(SymbolKind::Field, name, ty)
    }

    /// A property
    pub fn property(name: &str, ty: impl Into<TypeSpec>) -> Self {
        Self::new(SymbolKind::Property, name, ty)
    }

    /// An event
    pub fn event(name: &str, ty: impl Into<TypeSpec>) -> Self {
        Self::new(SymbolKind::Event, name, ty)
    }

    /// An indexer returning `ty`
    pub fn indexer(ty: impl Into<TypeSpec>) -> Self {
        Self::new(SymbolKind::Indexer, INDEXER_NAME, ty)
    }

    /// Add an indexer parameter
    #[must_use]
    pub fn param(mut self, ty: impl Into<TypeSpec>) -> Self {
        self.parameters.push(ParamSpec {
            ty: ty.into(),
            ref_kind: RefKind::None,
            is_params: false,
        });
        self
    }

    /// Mark the member static
    #[must_use]
    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Set the declared accessibility
    #[must_use]
    pub fn accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }
}

/// Incrementally builds a [`ProgramModel`]
#[derive(Debug)]
pub struct ProgramBuilder {
    program: ProgramModel,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramBuilder {
    /// Start a program with an empty global namespace and one globally visible source
    pub fn new() -> Self {
        let interner = Interner::new();
        let mut symbols = Arena::new();
        let global = symbols.alloc(SymbolData {
            name: interner.intern(""),
            kind: SymbolKind::Namespace,
            container: None,
            source: SourceId(0),
            accessibility: Accessibility::Public,
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: None,
            members: Vec::new(),
            base_types: Vec::new(),
            is_static: false,
            is_vararg: false,
            is_extension: false,
            special: None,
        });

        let mut namespace_sources = FxHashMap::default();
        namespace_sources.insert(global, FxHashSet::from_iter([SourceId(0)]));

        Self {
            program: ProgramModel {
                interner,
                symbols,
                import_scopes: Arena::new(),
                sources: vec![SourceData {
                    name: "main".to_string(),
                    globally_visible: true,
                }],
                global,
                member_index: FxHashMap::default(),
                namespace_sources,
                special_types: FxHashMap::default(),
                capabilities: FxHashSet::default(),
            },
        }
    }

    /// The source created with the builder
    pub fn main_source(&self) -> SourceId {
        SourceId(0)
    }

    /// The global namespace
    pub fn global(&self) -> SymbolId {
        self.program.global
    }

    /// Register a referenced library visible from the global namespace
    pub fn add_source(&mut self, name: &str) -> SourceId {
        self.register_source(name, true)
    }

    /// Register a referenced library reachable only through an extern alias
    pub fn add_aliased_source(&mut self, name: &str) -> SourceId {
        self.register_source(name, false)
    }

    fn register_source(&mut self, name: &str, globally_visible: bool) -> SourceId {
        let source = SourceId(self.program.sources.len() as u32);
        self.program.sources.push(SourceData {
            name: name.to_string(),
            globally_visible,
        });
        self.program
            .namespace_sources
            .entry(self.program.global)
            .or_default()
            .insert(source);
        source
    }

    /// Enable a host capability
    pub fn enable(&mut self, capability: Capability) -> &mut Self {
        self.program.capabilities.insert(capability);
        self
    }

    /// Get or create a namespace by dotted path in the main source
    pub fn namespace(&mut self, path: &str) -> SymbolId {
        self.namespace_in(SourceId(0), path)
    }

    /// Get or create a namespace by dotted path, recording that `source` declares it
    pub fn namespace_in(&mut self, source: SourceId, path: &str) -> SymbolId {
        let mut current = self.program.global;
        for name in path.split('.').filter(|name| !name.is_empty()) {
            let existing = self
                .program
                .members_named(current, name)
                .into_iter()
                .find(|member| self.program.symbols[*member].kind.is_namespace());
            current = match existing {
                Some(namespace) => namespace,
                None => {
                    let namespace = self.alloc(SymbolKind::Namespace, name, current, source);
                    self.attach(current, namespace);
                    namespace
                }
            };
        }
        self.mark_namespace_source(current, source);
        current
    }

    /// Declare the platform types behind the predefined keywords in `System`
    ///
    /// Returns the `System` namespace.
    pub fn add_platform_types(&mut self) -> SymbolId {
        let system = self.namespace("System");
        for predefined in PredefinedType::ALL {
            if self.program.special_types.contains_key(&predefined) {
                continue;
            }
            let existing = self
                .program
                .members_named(system, predefined.metadata_name())
                .into_iter()
                .find(|member| self.program.symbols[*member].kind.is_type());
            let def = existing.unwrap_or_else(|| {
                let decl = match predefined {
                    PredefinedType::Object | PredefinedType::String => {
                        TypeDecl::class(predefined.metadata_name())
                    }
                    _ => TypeDecl::structure(predefined.metadata_name()),
                };
                self.add_type(system, decl)
            });
            if self.program.symbols[def].special.is_none() {
                self.program.symbols[def].special = Some(predefined);
            }
            self.program.special_types.insert(predefined, def);
        }
        system
    }

    /// Declare a type inside a namespace or type
    pub fn add_type(&mut self, container: SymbolId, decl: TypeDecl) -> SymbolId {
        let container_is_namespace = self.program.symbols[container].kind.is_namespace();
        let source = if container_is_namespace {
            decl.source.unwrap_or(SourceId(0))
        } else {
            self.program.symbols[container].source
        };

        let ty = self.alloc(SymbolKind::Type(decl.kind), &decl.name, container, source);
        let type_parameters = self.alloc_type_parameters(ty, &decl.type_parameters);
        let data = &mut self.program.symbols[ty];
        data.type_parameters = type_parameters;
        data.accessibility = decl.accessibility;
        data.is_static = decl.is_static;

        self.attach(container, ty);
        if container_is_namespace {
            self.mark_namespace_source(container, source);
        }
        ty
    }

    /// Record a base class or implemented interface of `ty`
    ///
    /// The base is resolved from inside `ty`, so `Base<T>` may use the type's own
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if the base type cannot be resolved.
    pub fn add_base_type(&mut self, ty: SymbolId, base: impl Into<TypeSpec>) -> Result<(), BuildError> {
        let base = self.resolve_type(ty, &base.into())?;
        self.program.symbols[ty].base_types.push(base);
        Ok(())
    }

    /// Declare a method inside a type
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if a parameter or return type cannot be resolved; the
    /// method is not added.
    pub fn add_method(&mut self, container: SymbolId, decl: MethodDecl) -> Result<SymbolId, BuildError> {
        let source = self.program.symbols[container].source;
        let method = self.alloc(
            SymbolKind::Method(decl.kind()),
            decl.canonical_name(),
            container,
            source,
        );
        let type_parameters = self.alloc_type_parameters(method, &decl.type_parameters);
        self.program.symbols[method].type_parameters = type_parameters;

        let parameters = self.resolve_parameters(method, &decl.parameters)?;
        let return_type = decl
            .return_type
            .as_ref()
            .map(|spec| self.resolve_type(method, spec))
            .transpose()?;

        let data = &mut self.program.symbols[method];
        data.parameters = parameters;
        data.return_type = return_type;
        data.accessibility = decl.accessibility;
        data.is_static = decl.is_static;
        data.is_vararg = decl.is_vararg;
        data.is_extension = decl.is_extension;

        self.attach(container, method);
        Ok(method)
    }

    /// Declare a field, property, event or indexer inside a type
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if the member's type or an indexer parameter type cannot
    /// be resolved; the member is not added.
    pub fn add_member(&mut self, container: SymbolId, decl: MemberDecl) -> Result<SymbolId, BuildError> {
        let source = self.program.symbols[container].source;
        let member = self.alloc(decl.kind, &decl.name, container, source);
        let parameters = self.resolve_parameters(member, &decl.parameters)?;
        let return_type = self.resolve_type(member, &decl.ty)?;

        let data = &mut self.program.symbols[member];
        data.parameters = parameters;
        data.return_type = Some(return_type);
        data.accessibility = decl.accessibility;
        data.is_static = decl.is_static;

        self.attach(container, member);
        Ok(member)
    }

    /// Open an import scope for declarations inside `namespace`
    pub fn add_import_scope(&mut self, namespace: SymbolId, parent: Option<ImportScopeId>) -> ImportScopeId {
        self.program.import_scopes.alloc(ImportScope {
            parent,
            namespace,
            imports: Vec::new(),
        })
    }

    /// `using namespace;`
    pub fn import_namespace(&mut self, scope: ImportScopeId, namespace: SymbolId) -> &mut Self {
        self.program.import_scopes[scope]
            .imports
            .push(Import::Namespace(namespace));
        self
    }

    /// `using name = target;`
    pub fn import_alias(&mut self, scope: ImportScopeId, name: &str, target: SymbolId) -> &mut Self {
        let name = self.program.interner.intern(name);
        self.program.import_scopes[scope]
            .imports
            .push(Import::Alias { name, target });
        self
    }

    /// `extern alias name;` for `source`
    pub fn import_extern(&mut self, scope: ImportScopeId, name: &str, source: SourceId) -> &mut Self {
        let name = self.program.interner.intern(name);
        self.program.import_scopes[scope]
            .imports
            .push(Import::Extern { name, source });
        self
    }

    /// Resolve a signature type as if it were written inside `context`
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if the text is malformed or names nothing.
    pub fn resolve_type(&self, context: SymbolId, spec: &TypeSpec) -> Result<TypeExpr, BuildError> {
        match spec {
            TypeSpec::Exact(ty) => Ok(ty.clone()),
            TypeSpec::Text(text) => {
                let parsed = parse_spec(text).ok_or_else(|| BuildError::MalformedType {
                    text: text.clone(),
                })?;
                self.lower(context, &parsed)
            }
        }
    }

    /// Finish building
    pub fn finish(self) -> ProgramModel {
        tracing::debug!(
            symbols = self.program.symbols.len(),
            sources = self.program.sources.len(),
            "program model built"
        );
        self.program
    }

    fn alloc(&mut self, kind: SymbolKind, name: &str, container: SymbolId, source: SourceId) -> SymbolId {
        let name = self.program.interner.intern(name);
        self.program.symbols.alloc(SymbolData {
            name,
            kind,
            container: Some(container),
            source,
            accessibility: Accessibility::default(),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: None,
            members: Vec::new(),
            base_types: Vec::new(),
            is_static: false,
            is_vararg: false,
            is_extension: false,
            special: None,
        })
    }

    fn alloc_type_parameters(&mut self, owner: SymbolId, names: &[String]) -> Vec<SymbolId> {
        let source = self.program.symbols[owner].source;
        names
            .iter()
            .enumerate()
            .map(|(position, name)| {
                let kind = SymbolKind::TypeParameter {
                    ordinal: position as u32,
                };
                self.alloc(kind, name, owner, source)
            })
            .collect()
    }

    fn attach(&mut self, container: SymbolId, member: SymbolId) {
        let name = self.program.symbols[member].name;
        self.program.symbols[container].members.push(member);
        self.program
            .member_index
            .entry(container)
            .or_default()
            .entry(name)
            .or_default()
            .push(member);
    }

    fn mark_namespace_source(&mut self, namespace: SymbolId, source: SourceId) {
        let mut current = Some(namespace);
        while let Some(symbol) = current {
            self.program
                .namespace_sources
                .entry(symbol)
                .or_default()
                .insert(source);
            current = self.program.symbols[symbol].container;
        }
    }

    fn resolve_parameters(&self, context: SymbolId, specs: &[ParamSpec]) -> Result<Vec<ParameterData>, BuildError> {
        specs
            .iter()
            .map(|spec| {
                Ok(ParameterData {
                    ty: self.resolve_type(context, &spec.ty)?,
                    ref_kind: spec.ref_kind,
                    is_params: spec.is_params,
                })
            })
            .collect()
    }

    /// `context` and its enclosing declarations, innermost first
    fn scope_chain(&self, context: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        iter::once(context).chain(self.program.ancestors(context))
    }

    fn lower(&self, context: SymbolId, parsed: &ParsedType) -> Result<TypeExpr, BuildError> {
        match parsed {
            ParsedType::Dynamic => Ok(TypeExpr::Dynamic),
            ParsedType::Array(element, rank) => Ok(TypeExpr::Array {
                element: Box::new(self.lower(context, element)?),
                rank: *rank,
            }),
            ParsedType::Pointer(inner) => Ok(TypeExpr::Pointer(Box::new(self.lower(context, inner)?))),
            ParsedType::Nullable(inner) => Ok(TypeExpr::Nullable(Box::new(self.lower(context, inner)?))),
            ParsedType::Named { path, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.lower(context, arg))
                    .collect::<Result<Vec<_>, _>>()?;

                if let ([name], true) = (path.as_slice(), args.is_empty()) {
                    if let Some(param) = self.type_parameter_named(context, name) {
                        return Ok(TypeExpr::TypeParameter(param));
                    }
                    if let Some(predefined) = PredefinedType::from_keyword(name) {
                        return self
                            .program
                            .special_types
                            .get(&predefined)
                            .map(|def| TypeExpr::named(*def))
                            .ok_or(BuildError::MissingPlatformType {
                                keyword: predefined.keyword(),
                            });
                    }
                }

                let def = self
                    .scope_chain(context)
                    .filter(|container| self.program.symbols[*container].kind.is_container())
                    .find_map(|start| self.walk_path(start, path, args.len() as u32))
                    .ok_or_else(|| BuildError::UnknownType {
                        name: path.join("."),
                        context: self.program.name(context).to_string(),
                    })?;

                // Types nested in generic types are written with the outer parameters
                // implied.
                let chain = self.program.type_parameter_chain(def);
                let outer = chain.len() - self.program.symbols[def].type_parameters.len();
                let mut flattened: Vec<TypeExpr> = chain[..outer]
                    .iter()
                    .map(|param| TypeExpr::TypeParameter(*param))
                    .collect();
                flattened.extend(args);
                Ok(TypeExpr::Named {
                    def,
                    args: flattened,
                })
            }
        }
    }

    fn type_parameter_named(&self, context: SymbolId, name: &str) -> Option<SymbolId> {
        self.scope_chain(context)
            .take_while(|owner| !self.program.symbols[*owner].kind.is_namespace())
            .flat_map(|owner| self.program.symbols[owner].type_parameters.iter().copied())
            .find(|param| self.program.name(*param) == name)
    }

    fn walk_path(&self, start: SymbolId, path: &[String], arity: u32) -> Option<SymbolId> {
        let (last, prefix) = path.split_last()?;
        let container = prefix.iter().try_fold(start, |container, name| {
            self.program
                .members_named(container, name)
                .into_iter()
                .find(|member| self.program.symbols[*member].kind.is_container())
        })?;
        self.program
            .members_named(container, last)
            .into_iter()
            .find(|member| {
                let data = &self.program.symbols[*member];
                data.kind.is_type() && data.arity() == arity
            })
    }
}

/// Structured form of compact type text
///
/// This is declaration syntax: `<...>` arguments, no placeholders, aliases or escapes.
#[derive(Clone, Debug, Eq, PartialEq)]
enum ParsedType {
    Named {
        path: Vec<String>,
        args: Vec<ParsedType>,
    },
    Array(Box<ParsedType>, u32),
    Pointer(Box<ParsedType>),
    Nullable(Box<ParsedType>),
    Dynamic,
}

fn parse_spec(text: &str) -> Option<ParsedType> {
    let compact: String = text.chars().filter(|ch| !ch.is_whitespace()).collect();
    let mut cursor = compact.as_str();
    let parsed = parse_spec_type(&mut cursor)?;
    cursor.is_empty().then_some(parsed)
}

fn parse_spec_type(cursor: &mut &str) -> Option<ParsedType> {
    let name_len = cursor
        .find(|ch: char| !(ch.is_alphanumeric() || ch == '_' || ch == '.'))
        .unwrap_or(cursor.len());
    if name_len == 0 {
        return None;
    }
    let name = &cursor[..name_len];
    *cursor = &cursor[name_len..];

    let mut ty = if name == "dynamic" {
        ParsedType::Dynamic
    } else {
        let mut args = Vec::new();
        if let Some(rest) = cursor.strip_prefix('<') {
            *cursor = rest;
            loop {
                args.push(parse_spec_type(cursor)?);
                if let Some(rest) = cursor.strip_prefix(',') {
                    *cursor = rest;
                    continue;
                }
                *cursor = cursor.strip_prefix('>')?;
                break;
            }
        }
        ParsedType::Named {
            path: name.split('.').map(str::to_string).collect(),
            args,
        }
    };

    let mut ranks = Vec::new();
    loop {
        if let Some(rest) = cursor.strip_prefix('*') {
            *cursor = rest;
            ty = ParsedType::Pointer(Box::new(ty));
        } else if let Some(rest) = cursor.strip_prefix('?') {
            *cursor = rest;
            ty = ParsedType::Nullable(Box::new(ty));
        } else if let Some(rest) = cursor.strip_prefix('[') {
            let close = rest.find(']')?;
            let commas = &rest[..close];
            if !commas.chars().all(|ch| ch == ',') {
                return None;
            }
            ranks.push(commas.len() as u32 + 1);
            *cursor = &rest[close + 1..];
        } else {
            break;
        }
    }
    // `T[][,]` is an array of `T[,]`.
    for rank in ranks.into_iter().rev() {
        ty = ParsedType::Array(Box::new(ty), rank);
    }
    Some(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Arity, SymbolRef};
    use crate::scope::{ContainerRef, LookupScope};

    fn named(path: &str) -> ParsedType {
        ParsedType::Named {
            path: path.split('.').map(str::to_string).collect(),
            args: Vec::new(),
        }
    }

    #[test]
    fn test_parse_spec_shapes() {
        assert_eq!(parse_spec("N.C"), Some(named("N.C")));
        assert_eq!(
            parse_spec("List<int, T>"),
            Some(ParsedType::Named {
                path: vec!["List".to_string()],
                args: vec![named("int"), named("T")],
            })
        );
        assert_eq!(
            parse_spec("Q[][,]"),
            Some(ParsedType::Array(
                Box::new(ParsedType::Array(Box::new(named("Q")), 2)),
                1
            ))
        );
        assert_eq!(
            parse_spec("int*?"),
            Some(ParsedType::Nullable(Box::new(ParsedType::Pointer(Box::new(
                named("int")
            )))))
        );
        assert_eq!(parse_spec("List<int"), None);
        assert_eq!(parse_spec("int[x]"), None);
        assert_eq!(parse_spec(""), None);
    }

    #[test]
    fn test_special_member_names() -> Result<(), BuildError> {
        let mut builder = ProgramBuilder::new();
        builder.add_platform_types();
        let class = builder.add_type(builder.global(), TypeDecl::class("C"));
        let ctor = builder.add_method(class, MethodDecl::constructor())?;
        let negate = builder.add_method(
            class,
            MethodDecl::operator(OverloadableOperator::Minus).param("C"),
        )?;
        let subtract = builder.add_method(
            class,
            MethodDecl::operator(OverloadableOperator::Minus)
                .param("C")
                .param("C"),
        )?;
        let conversion = builder.add_method(
            class,
            MethodDecl::conversion(ConversionKind::Explicit, "int").param("C"),
        )?;
        let indexer = builder.add_member(class, MemberDecl::indexer("int").param("int"))?;
        let program = builder.finish();

        assert_eq!(program.name(ctor), ".ctor");
        assert_eq!(program.name(negate), "op_UnaryNegation");
        assert_eq!(program.name(subtract), "op_Subtraction");
        assert_eq!(program.name(conversion), "op_Explicit");
        assert_eq!(program.name(indexer), "this[]");
        Ok(())
    }

    #[test]
    fn test_signature_types_resolve_in_context() -> Result<(), BuildError> {
        let mut builder = ProgramBuilder::new();
        builder.add_platform_types();
        let outer = builder.add_type(builder.global(), TypeDecl::class("Outer").generic(["T"]));
        let inner = builder.add_type(outer, TypeDecl::class("Inner"));
        let method = builder.add_method(
            inner,
            MethodDecl::method("M")
                .generic(["U"])
                .param("T")
                .param("U[]")
                .param("Inner"),
        )?;
        let program = builder.finish();

        let data = program.symbol(method);
        let outer_param = program.symbol(outer).type_parameters[0];
        let method_param = data.type_parameters[0];
        assert_eq!(data.parameters[0].ty, TypeExpr::TypeParameter(outer_param));
        assert_eq!(
            data.parameters[1].ty,
            TypeExpr::Array {
                element: Box::new(TypeExpr::TypeParameter(method_param)),
                rank: 1,
            }
        );
        // The nested type carries the outer type's parameter.
        assert_eq!(
            data.parameters[2].ty,
            TypeExpr::Named {
                def: inner,
                args: vec![TypeExpr::TypeParameter(outer_param)],
            }
        );
        assert_eq!(program.type_parameter_chain(method), vec![outer_param, method_param]);
        assert_eq!(SymbolRef::definition(method).type_arguments.len(), 0);
        Ok(())
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let mut builder = ProgramBuilder::new();
        let class = builder.add_type(builder.global(), TypeDecl::class("C"));
        let err = builder.add_method(class, MethodDecl::method("M").param("Missing"));
        assert_eq!(
            err,
            Err(BuildError::UnknownType {
                name: "Missing".to_string(),
                context: "M".to_string(),
            })
        );
        let err = builder.add_method(class, MethodDecl::method("M").param("int"));
        assert_eq!(
            err,
            Err(BuildError::MissingPlatformType { keyword: "int" })
        );
    }

    #[test]
    fn test_base_types_are_recorded_but_not_searched() -> Result<(), BuildError> {
        let mut builder = ProgramBuilder::new();
        let global = builder.global();
        let base = builder.add_type(global, TypeDecl::class("Base").generic(["T"]));
        builder.add_method(base, MethodDecl::method("Inherited"))?;
        let derived = builder.add_type(global, TypeDecl::class("Derived").generic(["U"]));
        builder.add_base_type(derived, "Base<U>")?;
        let program = builder.finish();

        let data = program.symbol(derived);
        assert_eq!(
            data.base_types,
            vec![TypeExpr::Named {
                def: base,
                args: vec![TypeExpr::TypeParameter(data.type_parameters[0])],
            }]
        );
        let found = program.lookup(
            LookupScope::Members(ContainerRef::unfiltered(derived)),
            "Inherited",
            Arity::Omitted,
        );
        assert!(found.is_empty());
        Ok(())
    }

    #[test]
    fn test_lookup_orders_by_source_then_declaration() {
        let mut builder = ProgramBuilder::new();
        let library = builder.add_source("lib");
        let global = builder.global();
        let from_library = builder.add_type(global, TypeDecl::class("A").in_source(library));
        let from_main = builder.add_type(global, TypeDecl::class("A"));
        let program = builder.finish();

        let found = program.lookup(
            LookupScope::Members(ContainerRef::unfiltered(global)),
            "A",
            Arity::Omitted,
        );
        assert_eq!(found.as_slice(), &[from_main, from_library]);
    }

    #[test]
    fn test_aliased_source_is_only_reachable_through_alias() {
        let mut builder = ProgramBuilder::new();
        let library = builder.add_aliased_source("lib");
        let namespace = builder.namespace_in(library, "N");
        let class = builder.add_type(namespace, TypeDecl::class("C").in_source(library));
        let global = builder.global();
        let imports = builder.add_import_scope(global, None);
        builder.import_extern(imports, "LibAlias", library);
        let program = builder.finish();

        let unfiltered = program.lookup(
            LookupScope::Members(ContainerRef::unfiltered(global)),
            "N",
            Arity::Omitted,
        );
        assert!(unfiltered.is_empty());

        let root = program.resolve_alias(Some(imports), "LibAlias");
        assert_eq!(
            root,
            Some(ContainerRef {
                symbol: global,
                source: Some(library),
            })
        );
        let found = root
            .map(|root| program.lookup(LookupScope::Members(root), "N", Arity::Omitted))
            .unwrap_or_default();
        assert_eq!(found.single(), Some(namespace));
        let nested = program.lookup(
            LookupScope::Members(ContainerRef {
                symbol: namespace,
                source: Some(library),
            }),
            "C",
            Arity::Omitted,
        );
        assert_eq!(nested.single(), Some(class));
        assert!(program.resolve_alias(Some(imports), "Other").is_none());
    }

    #[test]
    fn test_imports_see_types_and_aliases() {
        let mut builder = ProgramBuilder::new();
        let namespace = builder.namespace("N");
        let class = builder.add_type(namespace, TypeDecl::class("C"));
        let _nested = builder.namespace("N.Inner");
        let global = builder.global();
        let imports = builder.add_import_scope(global, None);
        builder
            .import_namespace(imports, namespace)
            .import_alias(imports, "Alias", class);
        let program = builder.finish();

        let scope = LookupScope::Imports(imports);
        assert_eq!(program.lookup(scope, "C", Arity::Omitted).single(), Some(class));
        assert_eq!(program.lookup(scope, "Alias", Arity::Omitted).single(), Some(class));
        assert!(program.lookup(scope, "Alias", Arity::Exact(1)).is_empty());
        // Importing a namespace does not import its nested namespaces.
        assert!(program.lookup(scope, "Inner", Arity::Omitted).is_empty());
    }

    #[test]
    fn test_platform_types_are_tagged() {
        let mut builder = ProgramBuilder::new();
        let system = builder.add_platform_types();
        let program = builder.finish();

        let int = program.special_type(PredefinedType::Int);
        assert_eq!(int, program.find("System.Int32"));
        assert_eq!(program.find("System"), Some(system));
        assert!(int.is_some_and(|int| program.symbol(int).special == Some(PredefinedType::Int)));
        assert!(
            program
                .special_type(PredefinedType::Object)
                .is_some_and(|object| program.symbol(object).is_object())
        );
    }
}
