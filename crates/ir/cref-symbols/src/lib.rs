//! Program model consumed by the reference resolver
//!
//! The resolver never binds ordinary code, so it only needs a narrow view of the
//! program: which declarations exist, what they are called, what they contain, and
//! what their signatures look like.
//!
//! # Architecture
//!
//! - **Model**: arena-allocated declaration records ([`SymbolData`]) addressed by
//!   [`SymbolId`], plus signature types ([`TypeExpr`]) and reference-local
//!   [`Placeholder`]s
//! - **Seam**: the [`SymbolTable`] trait, the only way the resolver reads declarations;
//!   hosts with their own symbol tables implement it directly
//! - **In-memory table**: [`ProgramModel`], built with [`ProgramBuilder`], for tools and
//!   tests that describe a program by hand
//!
//! Lookups never consider inheritance and never filter on accessibility.

mod builder;
pub mod error;
mod model;
mod program;
mod scope;
mod table;

pub use builder::{MemberDecl, MethodDecl, ParamSpec, ProgramBuilder, TypeDecl, TypeSpec};
pub use error::BuildError;
pub use model::{
    Accessibility, Arity, CandidateSet, MethodKind, ParameterData, Placeholder, SourceId,
    SymbolData, SymbolId, SymbolKind, SymbolRef, TypeExpr, TypeKind,
};
pub use program::{ProgramModel, SourceData};
pub use scope::{Capability, ContainerRef, Import, ImportScope, ImportScopeId, LookupScope};
pub use table::SymbolTable;
