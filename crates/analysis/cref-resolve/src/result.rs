//! Terminal outcomes of resolving a reference

use crate::diagnostics::CrefDiagnostic;
use cref_span::Span;
use cref_symbols::{SymbolId, SymbolRef, TypeExpr};
use derive_more::Display;

/// What a reference resolved to
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum Target {
    /// A declaration, with the type arguments the reference gave it
    Symbol(SymbolRef),
    /// A type with no declaration of its own: an array, pointer, nullable, `dynamic`, or
    /// a placeholder
    Type(TypeExpr),
}

impl Target {
    /// The declaration a type resolves to, or the type itself when it has none
    pub(crate) fn from_type(ty: TypeExpr) -> Self {
        match ty {
            TypeExpr::Named { def, args } => Self::Symbol(SymbolRef {
                def,
                type_arguments: args,
            }),
            TypeExpr::TypeParameter(def) => Self::Symbol(SymbolRef::definition(def)),
            other => Self::Type(other),
        }
    }

    /// The declaration this target is or is rooted at
    pub fn definition(&self) -> Option<SymbolId> {
        match self {
            Self::Symbol(symbol) => Some(symbol.def),
            Self::Type(ty) => ty.definition(),
        }
    }

    /// The declaration, if this target is one
    pub fn as_symbol(&self) -> Option<&SymbolRef> {
        match self {
            Self::Symbol(symbol) => Some(symbol),
            Self::Type(_) => None,
        }
    }
}

/// Why more than one candidate was left
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub enum AmbiguityKind {
    /// Overloads of one member, with no parameter list to pick between them
    #[display("overloads")]
    Overloads,
    /// Same-named members of different kinds, such as a field and a method
    #[display("different kinds")]
    DifferentKinds,
    /// Several candidates survived exact signature matching
    #[display("signature")]
    Signature,
}

/// Why nothing was found
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub enum UnresolvedReason {
    /// No declaration has the name at the place it was looked up
    #[display("not found")]
    NotFound,
    /// The `alias::` prefix names no alias
    #[display("alias not found")]
    AliasNotFound,
    /// A qualifier segment matched more than one declaration
    #[display("ambiguous qualifier")]
    AmbiguousQualifier,
    /// A qualifier segment names something without members
    #[display("not a namespace or type")]
    NotAContainer,
    /// A type was named with a parameter list but declares no instance constructor
    #[display("no constructor")]
    NoConstructor,
    /// Candidates exist but none has the written signature
    #[display("no matching signature")]
    NoMatchingSignature,
    /// A parameter type did not resolve
    #[display("invalid type for parameter {index}")]
    InvalidParameterType {
        /// Zero-based parameter index
        index: usize,
    },
    /// A conversion target did not resolve
    #[display("invalid return type")]
    InvalidReturnType,
    /// The requested part does not exist in the reference
    #[display("no such part")]
    NoSuchPart,
}

/// The terminal outcome of one resolution
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResolutionResult {
    /// Exactly one match
    Resolved(Target),
    /// Several matches; `best` is the deterministic pick
    Ambiguous {
        /// Every remaining candidate, in lookup order
        candidates: Vec<SymbolId>,
        /// The assumed target
        best: Target,
        /// Why the candidates could not be told apart
        kind: AmbiguityKind,
    },
    /// No match
    Unresolved(UnresolvedReason),
    /// The text does not parse
    SyntaxError {
        /// Location of the first syntax error
        span: Span,
        /// The parser's message
        message: String,
        /// What the recovered tree resolved to, when the error was recoverable
        salvaged: Option<Box<ResolutionResult>>,
    },
}

impl ResolutionResult {
    /// The resolved target, or the best-effort pick of an ambiguous result
    ///
    /// A syntax error never yields a target, even when its salvaged tree resolved.
    pub fn target(&self) -> Option<&Target> {
        match self {
            Self::Resolved(target) | Self::Ambiguous { best: target, .. } => Some(target),
            Self::Unresolved(_) | Self::SyntaxError { .. } => None,
        }
    }

    /// Whether this is a clean single match
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// A result together with everything reported about it
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Resolution {
    /// The outcome
    pub result: ResolutionResult,
    /// The primary diagnostic first, then secondary ones
    pub diagnostics: Vec<CrefDiagnostic>,
}

impl Resolution {
    /// The resolved declaration, if the reference resolved cleanly to one
    pub fn symbol(&self) -> Option<SymbolId> {
        match &self.result {
            ResolutionResult::Resolved(Target::Symbol(symbol)) => Some(symbol.def),
            _ => None,
        }
    }
}
