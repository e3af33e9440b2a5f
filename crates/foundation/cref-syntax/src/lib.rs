//! Syntax model for documentation cross-references
//!
//! A cross-reference ("cref") is the short text inside a documentation annotation that
//! names a declaration: `List{T}.Add(T)`, `operator +(C, C)`, `this[int]`,
//! `explicit operator int`. This crate holds the parsed form of that text together with
//! the fixed tables the rest of the pipeline shares.
//!
//! # Architecture
//!
//! - **Reference tree**: the closed set of shapes a reference can take ([`ReferenceTree`])
//! - **Special names**: overloadable operator tokens and the canonical member names they
//!   map to ([`OverloadableOperator`], [`CONSTRUCTOR_NAME`], [`INDEXER_NAME`])
//! - **Predefined types**: the keyword table for built-in types ([`PredefinedType`])
//! - **Keywords**: reserved words that cannot be used as identifiers unless written verbatim

pub mod keywords;
pub mod operators;
pub mod predefined;
pub mod tree;

pub use operators::{
    CONSTRUCTOR_NAME, ConversionKind, DESTRUCTOR_NAME, INDEXER_NAME, OverloadableOperator,
    STATIC_CONSTRUCTOR_NAME,
};
pub use predefined::PredefinedType;
pub use tree::{
    Ident, MemberName, MemberReference, Parameter, ParameterList, RefKind, ReferencePart,
    ReferenceTree, Segment, SegmentName, TypeArgument, TypeArgumentList, TypePath, TypeRef,
};
