//! Resolution of documentation cross-references
//!
//! Given reference text, the declaration its documentation comment is attached to, and
//! the imports in effect there, a [`Resolver`] finds the declaration the text names and
//! reports diagnostics for anything it could not settle.
//!
//! # Architecture
//!
//! - **Parsing**: `cref-parser` turns the text into a tree; syntax errors are reported
//!   and a recoverable tree is still resolved as a salvaged result
//! - **Placeholders**: type parameter names declared inside the reference (`List{T}`)
//!   shadow real types in parameter and type argument positions
//! - **Scope chain**: the anchor's lexical scopes from the innermost outward, each level
//!   consulted only if the ones inside it found nothing
//! - **Binding**: the qualifier path, parameter types and conversion targets bind to
//!   declarations and signature types
//! - **Selection**: same-named candidates narrow by exact signature, or by name with an
//!   ambiguity report
//!
//! The resolver only reads the program through [`cref_symbols::SymbolTable`] and keeps
//! no state between calls, so one table can serve any number of threads.

mod binder;
pub mod diagnostics;
mod display;
pub mod options;
mod overload;
mod placeholders;
mod resolver;
mod result;
mod scope;

pub use diagnostics::{CrefDiagnostic, DiagnosticKind, DiagnosticReport};
pub use display::{display, display_target, display_type, render_cref};
pub use options::{ConfigError, ResolverOptions};
pub use resolver::{BatchResolution, RawReference, Resolver};
pub use result::{AmbiguityKind, Resolution, ResolutionResult, Target, UnresolvedReason};
