//! Declarations and type expressions

use cref_arena::Idx;
use cref_intern::Symbol;
use cref_syntax::{PredefinedType, RefKind};
use derive_more::Display;
use std::hash::{Hash, Hasher};
use std::{iter, slice};

/// Handle to a declaration
pub type SymbolId = Idx<SymbolData>;

/// A declaration source: the compilation itself or one referenced library
///
/// Sources are numbered in registration order, which is also the order candidates
/// from different sources are reported in.
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[display("source#{_0}")]
pub struct SourceId(pub u32);

/// Declared accessibility
///
/// Recorded for callers that want to flag inaccessible targets; lookup never filters
/// on it.
#[derive(Copy, Clone, Debug, Default, Display, Hash, Eq, PartialEq)]
pub enum Accessibility {
    /// `public`
    #[default]
    #[display("public")]
    Public,
    /// `internal`
    #[display("internal")]
    Internal,
    /// `protected`
    #[display("protected")]
    Protected,
    /// `private`
    #[display("private")]
    Private,
}

/// Kind of type declaration
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub enum TypeKind {
    /// Reference type
    #[display("class")]
    Class,
    /// Value type
    #[display("struct")]
    Struct,
    /// Interface
    #[display("interface")]
    Interface,
    /// Enumeration
    #[display("enum")]
    Enum,
    /// Delegate
    #[display("delegate")]
    Delegate,
}

/// Kind of method declaration
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub enum MethodKind {
    /// Ordinary named method
    #[display("method")]
    Ordinary,
    /// Instance constructor
    #[display("constructor")]
    Constructor,
    /// Static constructor
    #[display("static constructor")]
    StaticConstructor,
    /// Finalizer
    #[display("destructor")]
    Destructor,
    /// User-defined operator
    #[display("operator")]
    Operator,
    /// User-defined conversion
    #[display("conversion")]
    Conversion,
}

/// What a declaration is
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub enum SymbolKind {
    /// A namespace, merged across sources
    #[display("namespace")]
    Namespace,
    /// A type
    #[display("{_0}")]
    Type(TypeKind),
    /// A type parameter of a type or method
    #[display("type parameter")]
    TypeParameter {
        /// Position in the owner's own type parameter list
        ordinal: u32,
    },
    /// A method, operator, conversion or constructor
    #[display("{_0}")]
    Method(MethodKind),
    /// A property
    #[display("property")]
    Property,
    /// An indexer
    #[display("indexer")]
    Indexer,
    /// A field
    #[display("field")]
    Field,
    /// An event
    #[display("event")]
    Event,
}

impl SymbolKind {
    /// Whether this is a type declaration
    pub fn is_type(self) -> bool {
        matches!(self, Self::Type(_))
    }

    /// Whether this is a namespace
    pub fn is_namespace(self) -> bool {
        matches!(self, Self::Namespace)
    }

    /// Whether this is any kind of method
    pub fn is_method(self) -> bool {
        matches!(self, Self::Method(_))
    }

    /// Whether members can be looked up inside this declaration
    pub fn is_container(self) -> bool {
        self.is_namespace() || self.is_type()
    }

    /// Whether this declaration has a parameter list
    pub fn has_parameters(self) -> bool {
        matches!(self, Self::Method(_) | Self::Indexer)
    }
}

/// One declared parameter
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct ParameterData {
    /// Declared type
    pub ty: TypeExpr,
    /// Passing mode
    pub ref_kind: RefKind,
    /// Whether this is a `params` array
    pub is_params: bool,
}

/// A declaration record
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SymbolData {
    /// Declared name; canonical for special members (`.ctor`, `op_Addition`, `this[]`)
    pub name: Symbol,
    /// What the declaration is
    pub kind: SymbolKind,
    /// Containing namespace or type; the owner for a type parameter
    pub container: Option<SymbolId>,
    /// Where the declaration came from
    pub source: SourceId,
    /// Declared accessibility
    pub accessibility: Accessibility,
    /// The declaration's own type parameters, in order
    pub type_parameters: Vec<SymbolId>,
    /// Parameters, for methods and indexers
    pub parameters: Vec<ParameterData>,
    /// Return type, for methods, properties, indexers, fields and events
    pub return_type: Option<TypeExpr>,
    /// Directly declared members, in declaration order
    pub members: Vec<SymbolId>,
    /// Base class and implemented interfaces of a type, in declaration order
    ///
    /// Reference lookup never searches these; members reached only through a base type are
    /// not visible to references.
    pub base_types: Vec<TypeExpr>,
    /// Whether the declaration is static
    pub is_static: bool,
    /// Whether the method takes a variable argument list (`__arglist`)
    pub is_vararg: bool,
    /// Whether the method is an extension method
    pub is_extension: bool,
    /// The predefined keyword this type stands for, if any
    pub special: Option<PredefinedType>,
}

impl SymbolData {
    /// Number of the declaration's own type parameters
    pub fn arity(&self) -> u32 {
        self.type_parameters.len() as u32
    }

    /// Whether this is the platform `object` type
    pub fn is_object(&self) -> bool {
        self.special == Some(PredefinedType::Object)
    }
}

/// A type parameter invented by the reference text itself
///
/// Placeholders are compared by position, never by name: `C{Q}` and `C{T}` both
/// declare the placeholder at ordinal 0 of a one-argument list.
#[derive(Clone, Debug)]
pub struct Placeholder {
    /// Name as written, for display only
    pub name: String,
    /// Which declaring list in the reference, in textual order
    pub list: u32,
    /// Position within that list
    pub ordinal: u32,
    /// Length of that list
    pub arity: u32,
}

impl PartialEq for Placeholder {
    fn eq(&self, other: &Self) -> bool {
        self.list == other.list && self.ordinal == other.ordinal && self.arity == other.arity
    }
}

impl Eq for Placeholder {}

impl Hash for Placeholder {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.list.hash(state);
        self.ordinal.hash(state);
        self.arity.hash(state);
    }
}

/// A type as it appears in a signature
///
/// Type arguments of a named type are flattened: a type nested in a generic type
/// carries the outer type's arguments first, then its own.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum TypeExpr {
    /// A named type with its type arguments
    Named {
        /// The type definition
        def: SymbolId,
        /// Flattened type arguments; empty for a non-generic type
        args: Vec<TypeExpr>,
    },
    /// A declared type parameter
    TypeParameter(SymbolId),
    /// A type parameter declared by the reference text
    Placeholder(Placeholder),
    /// `T[]`, `T[,]`
    Array {
        /// Element type
        element: Box<TypeExpr>,
        /// Number of dimensions
        rank: u32,
    },
    /// `T*`
    Pointer(Box<TypeExpr>),
    /// `T?`
    Nullable(Box<TypeExpr>),
    /// `dynamic`
    Dynamic,
}

impl TypeExpr {
    /// A non-generic named type
    pub fn named(def: SymbolId) -> Self {
        Self::Named {
            def,
            args: Vec::new(),
        }
    }

    /// The named type or type parameter at the root of this expression
    pub fn definition(&self) -> Option<SymbolId> {
        match self {
            Self::Named { def, .. } | Self::TypeParameter(def) => Some(*def),
            Self::Array { element, .. } => element.definition(),
            Self::Pointer(inner) | Self::Nullable(inner) => inner.definition(),
            Self::Placeholder(_) | Self::Dynamic => None,
        }
    }

    /// Replace type parameters using `substitution`, leaving unmapped ones in place
    #[must_use]
    pub fn substitute(&self, substitution: &dyn Fn(SymbolId) -> Option<Self>) -> Self {
        match self {
            Self::TypeParameter(param) => {
                substitution(*param).unwrap_or_else(|| Self::TypeParameter(*param))
            }
            Self::Named { def, args } => Self::Named {
                def: *def,
                args: args.iter().map(|arg| arg.substitute(substitution)).collect(),
            },
            Self::Array { element, rank } => Self::Array {
                element: Box::new(element.substitute(substitution)),
                rank: *rank,
            },
            Self::Pointer(inner) => Self::Pointer(Box::new(inner.substitute(substitution))),
            Self::Nullable(inner) => Self::Nullable(Box::new(inner.substitute(substitution))),
            Self::Placeholder(_) | Self::Dynamic => self.clone(),
        }
    }
}

/// A declaration together with the type arguments it was named with
///
/// Arguments are flattened over the container chain like [`TypeExpr::Named`], followed by
/// the declaration's own; a reference that gives no arguments leaves the list empty.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct SymbolRef {
    /// The declaration
    pub def: SymbolId,
    /// Flattened type arguments
    pub type_arguments: Vec<TypeExpr>,
}

impl SymbolRef {
    /// Refer to a declaration without type arguments
    pub fn definition(def: SymbolId) -> Self {
        Self {
            def,
            type_arguments: Vec::new(),
        }
    }

    /// Whether any type argument was supplied
    pub fn is_constructed(&self) -> bool {
        !self.type_arguments.is_empty()
    }
}

/// Generic arity requested by a lookup
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum Arity {
    /// `{...}` with this many arguments: only types and methods with exactly that many
    /// type parameters
    Exact(u32),
    /// No `{...}`: non-generic types, methods of any arity, everything else
    Omitted,
    /// A standalone type name: types of any arity as well
    Any,
}

impl Arity {
    /// Whether a declaration of `kind` with `arity` own type parameters matches
    pub fn matches(self, kind: SymbolKind, arity: u32) -> bool {
        match (self, kind) {
            (Self::Exact(wanted), SymbolKind::Type(_) | SymbolKind::Method(_)) => wanted == arity,
            (Self::Exact(_), _) => false,
            (Self::Omitted, SymbolKind::Type(_)) => arity == 0,
            (Self::Omitted | Self::Any, _) => true,
        }
    }
}

/// Declarations sharing a name, before signature filtering
///
/// Ordered by source registration order, then declaration order.
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct CandidateSet {
    symbols: Vec<SymbolId>,
}

impl CandidateSet {
    /// Wrap an already ordered list
    pub fn new(symbols: Vec<SymbolId>) -> Self {
        Self { symbols }
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether there are no candidates
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Candidates in order
    pub fn iter(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols.iter().copied()
    }

    /// Candidates as a slice
    pub fn as_slice(&self) -> &[SymbolId] {
        &self.symbols
    }

    /// The first candidate
    pub fn first(&self) -> Option<SymbolId> {
        self.symbols.first().copied()
    }

    /// The only candidate, if there is exactly one
    pub fn single(&self) -> Option<SymbolId> {
        match self.symbols.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// A new set keeping the candidates accepted by `keep`, in order
    #[must_use]
    pub fn filter(&self, mut keep: impl FnMut(SymbolId) -> bool) -> Self {
        self.iter().filter(|symbol| keep(*symbol)).collect()
    }
}

impl FromIterator<SymbolId> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = SymbolId>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'set> IntoIterator for &'set CandidateSet {
    type Item = SymbolId;
    type IntoIter = iter::Copied<slice::Iter<'set, SymbolId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter().copied()
    }
}
