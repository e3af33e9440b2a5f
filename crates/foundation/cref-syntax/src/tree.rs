//! The parsed form of a reference
//!
//! Every node carries the span of raw text it was parsed from. Identifier text is stored
//! decoded (`&#64;` and the verbatim marker already removed).

use crate::{ConversionKind, OverloadableOperator, PredefinedType};
use cref_span::Span;
use derive_more::Display;
use std::borrow::Cow;

/// A decoded identifier
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Ident {
    /// Decoded text, without the verbatim `@`
    pub text: String,
    /// Raw span, including the verbatim `@` if present
    pub span: Span,
    /// Whether the identifier was written with the verbatim `@` marker
    pub verbatim: bool,
}

/// The name part of a path segment
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum SegmentName {
    /// An ordinary identifier
    Ident(Ident),
    /// A predefined type keyword, only valid as the first segment of a path
    Predefined {
        /// Which built-in type
        ty: PredefinedType,
        /// Source location of the keyword
        span: Span,
    },
}

impl SegmentName {
    /// Source location of the name
    pub fn span(&self) -> Span {
        match self {
            Self::Ident(ident) => ident.span,
            Self::Predefined { span, .. } => *span,
        }
    }

    /// The name as it is looked up
    pub fn text(&self) -> &str {
        match self {
            Self::Ident(ident) => &ident.text,
            Self::Predefined { ty, .. } => ty.keyword(),
        }
    }
}

/// One `.`-separated step of a path, optionally generic
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Segment {
    /// The segment name
    pub name: SegmentName,
    /// The `{...}` list, if present
    pub type_arguments: Option<TypeArgumentList>,
    /// Source location of the whole segment
    pub span: Span,
}

impl Segment {
    /// Number of type arguments written, `None` when the list is absent
    pub fn arity(&self) -> Option<u32> {
        self.type_arguments
            .as_ref()
            .map(|list| list.arguments.len() as u32)
    }
}

/// A `{...}` list
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct TypeArgumentList {
    /// Arguments in order
    pub arguments: Vec<TypeArgument>,
    /// Source location including the braces
    pub span: Span,
}

/// One entry of a type argument list
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum TypeArgument {
    /// A type parameter declared by the reference itself (`T` in `List{T}.Add(T)`)
    Placeholder(Ident),
    /// A type, either inside a parameter or return type or recovered from a malformed
    /// declaration such as `List{int}`
    Type(TypeRef),
}

impl TypeArgument {
    /// Source location of the argument
    pub fn span(&self) -> Span {
        match self {
            Self::Placeholder(ident) => ident.span,
            Self::Type(ty) => ty.span(),
        }
    }
}

/// A dotted path, optionally rooted at an extern alias
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct TypePath {
    /// `alias` in `alias::A.B`
    pub alias: Option<Ident>,
    /// Segments in order; empty only for an alias-only qualifier
    pub segments: Vec<Segment>,
    /// Source location of the whole path
    pub span: Span,
}

impl TypePath {
    /// The identifier, if this path is a single plain identifier
    pub fn simple_name(&self) -> Option<&Ident> {
        match (&self.alias, self.segments.as_slice()) {
            (
                None,
                [
                    Segment {
                        name: SegmentName::Ident(ident),
                        type_arguments: None,
                        ..
                    },
                ],
            ) => Some(ident),
            _ => None,
        }
    }
}

/// A type written inside a parameter list, a conversion target, or a type argument
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum TypeRef {
    /// A named type, possibly qualified and generic, or a predefined keyword
    Path(TypePath),
    /// `dynamic`
    Dynamic(Span),
    /// `T[]`, `T[,]`
    Array {
        /// Element type
        element: Box<TypeRef>,
        /// Number of dimensions
        rank: u32,
        /// Source location
        span: Span,
    },
    /// `T*`
    Pointer {
        /// Pointed-to type
        pointee: Box<TypeRef>,
        /// Source location
        span: Span,
    },
    /// `T?`
    Nullable {
        /// Underlying type
        underlying: Box<TypeRef>,
        /// Source location
        span: Span,
    },
}

impl TypeRef {
    /// Source location of the type
    pub fn span(&self) -> Span {
        match self {
            Self::Path(path) => path.span,
            Self::Dynamic(span)
            | Self::Array { span, .. }
            | Self::Pointer { span, .. }
            | Self::Nullable { span, .. } => *span,
        }
    }
}

/// Parameter passing mode
#[derive(Copy, Clone, Debug, Default, Display, Hash, Eq, PartialEq)]
pub enum RefKind {
    /// By value
    #[default]
    #[display("")]
    None,
    /// `ref`
    #[display("ref")]
    Ref,
    /// `out`
    #[display("out")]
    Out,
    /// `in`
    #[display("in")]
    In,
    /// `ref readonly`, also accepted as `readonly ref`
    #[display("ref readonly")]
    RefReadonly,
}

/// One entry of a parameter list
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Parameter {
    /// Passing mode written before the type
    pub ref_kind: RefKind,
    /// Parameter type
    pub ty: TypeRef,
    /// Source location including the ref-kind tokens
    pub span: Span,
}

/// A `(...)` or `[...]` parameter list
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct ParameterList {
    /// Parameters in order
    pub parameters: Vec<Parameter>,
    /// Source location including the brackets
    pub span: Span,
}

/// What a member reference names
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum MemberName {
    /// A plain or generic name: `M`, `M{T}`, or a type used as its own constructor
    Named(Segment),
    /// `this`
    Indexer {
        /// Source location of `this`
        span: Span,
    },
    /// `operator +`
    Operator {
        /// The operator token
        operator: OverloadableOperator,
        /// Source location from `operator` through the token
        span: Span,
    },
    /// `implicit operator T` / `explicit operator T`
    Conversion {
        /// Implicit or explicit
        kind: ConversionKind,
        /// The target (return) type
        target: Box<TypeRef>,
        /// Source location from the first keyword through the target type
        span: Span,
    },
}

impl MemberName {
    /// Source location of the member name
    pub fn span(&self) -> Span {
        match self {
            Self::Named(segment) => segment.span,
            Self::Indexer { span } | Self::Operator { span, .. } | Self::Conversion { span, .. } => {
                *span
            }
        }
    }
}

/// A member named relative to an optional qualifier
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct MemberReference {
    /// Everything before the final `.`, or an alias-only qualifier for `alias::M`
    pub qualifier: Option<TypePath>,
    /// The member itself
    pub member: MemberName,
    /// The parameter list, if one was written
    pub parameters: Option<ParameterList>,
    /// Source location of the whole reference
    pub span: Span,
}

impl MemberReference {
    /// Source location of the member name through the end of the reference
    pub fn member_span(&self) -> Span {
        Span::new(self.member.span().start, self.span.end)
    }

    /// Whether a `.` separates the qualifier from the member
    pub fn is_dotted(&self) -> bool {
        self.qualifier
            .as_ref()
            .is_some_and(|qualifier| !qualifier.segments.is_empty())
    }
}

/// A parsed reference
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum ReferenceTree {
    /// A dotted path with no parameter list and no special member: `System.String`, `M`
    TypeOrNamespace(TypePath),
    /// Anything with a parameter list or a special member name
    Member(MemberReference),
}

impl ReferenceTree {
    /// Source location of the whole reference
    pub fn span(&self) -> Span {
        match self {
            Self::TypeOrNamespace(path) => path.span,
            Self::Member(member) => member.span,
        }
    }

    /// View the reference as a member of its qualifier
    ///
    /// A bare path `A.B.C` is the member `C` of the qualifier `A.B`.
    pub fn as_member(&self) -> Cow<'_, MemberReference> {
        match self {
            Self::Member(member) => Cow::Borrowed(member),
            Self::TypeOrNamespace(path) => {
                let mut prefix = path.segments.clone();
                // The parser never produces an empty path; an empty one names nothing.
                let last = prefix.pop().unwrap_or_else(|| {
                    let name = Ident {
                        text: String::new(),
                        span: Span::empty(path.span.end),
                        verbatim: false,
                    };
                    Segment {
                        span: name.span,
                        name: SegmentName::Ident(name),
                        type_arguments: None,
                    }
                });
                let qualifier = if prefix.is_empty() && path.alias.is_none() {
                    None
                } else {
                    let end = prefix.last().map_or_else(
                        || path.alias.as_ref().map_or(path.span.start, |alias| alias.span.end),
                        |segment| segment.span.end,
                    );
                    Some(TypePath {
                        alias: path.alias.clone(),
                        segments: prefix,
                        span: Span::new(path.span.start, end),
                    })
                };
                Cow::Owned(MemberReference {
                    qualifier,
                    member: MemberName::Named(last),
                    parameters: None,
                    span: path.span,
                })
            }
        }
    }

    /// All segments in textual order: the qualifier's, then the member name's
    pub fn segments(&self) -> Vec<&Segment> {
        match self {
            Self::TypeOrNamespace(path) => path.segments.iter().collect(),
            Self::Member(member) => {
                let mut segments: Vec<&Segment> = member
                    .qualifier
                    .iter()
                    .flat_map(|qualifier| qualifier.segments.iter())
                    .collect();
                if let MemberName::Named(segment) = &member.member {
                    segments.push(segment);
                }
                segments
            }
        }
    }

    /// The type argument lists that declare placeholders, in textual order
    ///
    /// Lists inside parameter types and conversion targets refer to placeholders rather
    /// than declaring them, so they are not included.
    pub fn declaring_lists(&self) -> Vec<&TypeArgumentList> {
        self.segments()
            .into_iter()
            .filter_map(|segment| segment.type_arguments.as_ref())
            .collect()
    }

    /// The parameter list, if one was written
    pub fn parameters(&self) -> Option<&ParameterList> {
        match self {
            Self::TypeOrNamespace(_) => None,
            Self::Member(member) => member.parameters.as_ref(),
        }
    }
}

/// A sub-reference that can be resolved on its own
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum ReferencePart {
    /// The path before the member name
    Qualifier,
    /// The type of the parameter at this index
    Parameter(usize),
    /// The target type of a conversion operator
    ReturnType,
    /// A type argument, addressed by segment position (see [`ReferenceTree::segments`])
    /// and position within that segment's list
    TypeArgument {
        /// Index into [`ReferenceTree::segments`]
        segment: usize,
        /// Index into the segment's type argument list
        index: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(text: &str, start: u32) -> Ident {
        Ident {
            text: text.to_string(),
            span: Span::new(start, start + text.len() as u32),
            verbatim: false,
        }
    }

    fn segment(text: &str, start: u32) -> Segment {
        let name = ident(text, start);
        Segment {
            span: name.span,
            name: SegmentName::Ident(name),
            type_arguments: None,
        }
    }

    #[test]
    fn test_bare_path_splits_into_qualifier_and_member() {
        // A.B.C
        let path = TypePath {
            alias: None,
            segments: vec![segment("A", 0), segment("B", 2), segment("C", 4)],
            span: Span::new(0, 5),
        };
        let tree = ReferenceTree::TypeOrNamespace(path);
        let member = tree.as_member();
        let qualifier = member.qualifier.as_ref().map(|path| path.segments.len());
        assert_eq!(qualifier, Some(2));
        assert_eq!(member.qualifier.as_ref().map(|path| path.span), Some(Span::new(0, 3)));
        assert!(member.is_dotted());
        assert_eq!(member.member_span(), Span::new(4, 5));
    }

    #[test]
    fn test_single_segment_has_no_qualifier() {
        let path = TypePath {
            alias: None,
            segments: vec![segment("M", 0)],
            span: Span::new(0, 1),
        };
        let tree = ReferenceTree::TypeOrNamespace(path);
        assert!(tree.as_member().qualifier.is_none());
        assert_eq!(tree.segments().len(), 1);
    }

    #[test]
    fn test_alias_only_qualifier_is_not_dotted() {
        // lib::A
        let path = TypePath {
            alias: Some(ident("lib", 0)),
            segments: vec![segment("A", 5)],
            span: Span::new(0, 6),
        };
        let tree = ReferenceTree::TypeOrNamespace(path);
        let member = tree.as_member();
        assert!(member.qualifier.is_some());
        assert!(!member.is_dotted());
    }

    #[test]
    fn test_simple_name() {
        let path = TypePath {
            alias: None,
            segments: vec![segment("T", 0)],
            span: Span::new(0, 1),
        };
        assert_eq!(path.simple_name().map(|name| name.text.as_str()), Some("T"));
    }
}
