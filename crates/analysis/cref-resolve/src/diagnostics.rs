//! Diagnostics reported for a resolved reference
//!
//! Every terminal outcome maps to one primary diagnostic, except a clean resolution,
//! which has none. Invalid parameter and return types are secondary diagnostics reported
//! alongside the primary `Unresolved` one. Spans address the raw reference text.

#![allow(
    unused_assignments,
    reason = "fields are read by the miette derive expansion"
)]

use codespan_reporting::diagnostic::{Diagnostic as CodespanDiagnostic, Label};
use cref_span::Span;
use derive_more::Display;
use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed diagnostic taxonomy
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Malformed reference text
    #[display("bad_syntax")]
    BadSyntax,
    /// No declaration matched
    #[display("unresolved")]
    Unresolved,
    /// More than one declaration matched equally well
    #[display("ambiguous")]
    Ambiguous,
    /// A parameter type did not resolve
    #[display("invalid_parameter_type")]
    InvalidParameterType,
    /// A conversion target type did not resolve
    #[display("invalid_return_type")]
    InvalidReturnType,
    /// The reference names a type parameter
    #[display("type_variable")]
    TypeVariable,
}

/// A diagnostic about one reference
#[derive(Error, Debug, Clone, Diagnostic, Eq, PartialEq)]
pub enum CrefDiagnostic {
    /// The text does not parse
    #[error("Documentation reference '{text}' has incorrect syntax: {message}")]
    #[diagnostic(code(cref::bad_syntax))]
    BadSyntax {
        /// The whole reference text
        text: String,
        /// What the parser reported
        message: String,
        /// Where the parser stopped
        #[label("{message}")]
        span: SourceSpan,
    },

    /// Nothing matched
    #[error("Documentation reference '{text}' could not be resolved")]
    #[diagnostic(code(cref::unresolved))]
    Unresolved {
        /// The member part of a dotted reference, otherwise the whole text
        text: String,
        /// Location of `text`
        #[label("no matching declaration")]
        span: SourceSpan,
    },

    /// Several declarations matched
    #[error(
        "Ambiguous documentation reference '{text}'. Assuming '{best}', but it could also \
         have matched other overloads including '{other}'"
    )]
    #[diagnostic(
        code(cref::ambiguous),
        help("add a parameter list to select one overload")
    )]
    Ambiguous {
        /// The whole reference text
        text: String,
        /// The best-effort pick
        best: String,
        /// The first candidate that was not picked
        other: String,
        /// The whole reference
        #[label("matches more than one declaration")]
        span: SourceSpan,
    },

    /// A parameter type did not resolve
    #[error("Invalid type for parameter {position} in documentation reference: '{text}'")]
    #[diagnostic(code(cref::invalid_parameter_type))]
    InvalidParameterType {
        /// One-based parameter position
        position: usize,
        /// The parameter type text
        text: String,
        /// Location of the parameter type
        #[label("cannot resolve this type")]
        span: SourceSpan,
    },

    /// A conversion target did not resolve
    #[error("Invalid return type in documentation reference: '{text}'")]
    #[diagnostic(code(cref::invalid_return_type))]
    InvalidReturnType {
        /// The target type text
        text: String,
        /// Location of the target type
        #[label("cannot resolve this type")]
        span: SourceSpan,
    },

    /// The reference names a type parameter
    #[error("Documentation reference '{text}' refers to a type parameter")]
    #[diagnostic(
        code(cref::type_variable),
        help("use a type parameter reference element instead")
    )]
    TypeVariable {
        /// The whole reference text
        text: String,
        /// The whole reference
        #[label("type parameter")]
        span: SourceSpan,
    },
}

impl CrefDiagnostic {
    /// Which taxonomy entry this is
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::BadSyntax { .. } => DiagnosticKind::BadSyntax,
            Self::Unresolved { .. } => DiagnosticKind::Unresolved,
            Self::Ambiguous { .. } => DiagnosticKind::Ambiguous,
            Self::InvalidParameterType { .. } => DiagnosticKind::InvalidParameterType,
            Self::InvalidReturnType { .. } => DiagnosticKind::InvalidReturnType,
            Self::TypeVariable { .. } => DiagnosticKind::TypeVariable,
        }
    }

    /// Source location within the reference text
    pub fn span(&self) -> Span {
        let source = match self {
            Self::BadSyntax { span, .. }
            | Self::Unresolved { span, .. }
            | Self::Ambiguous { span, .. }
            | Self::InvalidParameterType { span, .. }
            | Self::InvalidReturnType { span, .. }
            | Self::TypeVariable { span, .. } => span,
        };
        Span::new(source.offset() as u32, (source.offset() + source.len()) as u32)
    }

    /// Convert to a codespan diagnostic; all reference diagnostics are warnings
    pub fn to_codespan_diagnostic(&self, file_id: usize) -> CodespanDiagnostic<usize> {
        let code = self
            .code()
            .map(|code| code.to_string())
            .unwrap_or_default();
        let mut diag = CodespanDiagnostic::warning()
            .with_message(self.to_string())
            .with_code(code)
            .with_labels(vec![Label::primary(file_id, self.span().range())]);

        if let Some(help) = self.help() {
            diag = diag.with_notes(vec![help.to_string()]);
        }
        diag
    }

    /// A serializable summary for tooling
    pub fn report(&self) -> DiagnosticReport {
        let span = self.span();
        DiagnosticReport {
            kind: self.kind(),
            code: self
                .code()
                .map(|code| code.to_string())
                .unwrap_or_default(),
            message: self.to_string(),
            start: span.start,
            end: span.end,
            help: self.help().map(|help| help.to_string()),
        }
    }
}

/// A diagnostic flattened for serialization
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// Taxonomy entry
    pub kind: DiagnosticKind,
    /// Diagnostic code, such as `cref::unresolved`
    pub code: String,
    /// Rendered message
    pub message: String,
    /// Start offset in the reference text
    pub start: u32,
    /// End offset in the reference text
    pub end: u32,
    /// Help text, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unresolved() -> CrefDiagnostic {
        CrefDiagnostic::Unresolved {
            text: "D{C}".to_string(),
            span: Span::new(2, 6).into(),
        }
    }

    #[test]
    fn test_kind_and_span() {
        let diag = unresolved();
        assert_eq!(diag.kind(), DiagnosticKind::Unresolved);
        assert_eq!(diag.span(), Span::new(2, 6));
        assert_eq!(
            diag.to_string(),
            "Documentation reference 'D{C}' could not be resolved"
        );
    }

    #[test]
    fn test_codespan_conversion() {
        let diag = CrefDiagnostic::Ambiguous {
            text: "M".to_string(),
            best: "C.M()".to_string(),
            other: "C.M(int)".to_string(),
            span: Span::new(0, 1).into(),
        };
        let codespan = diag.to_codespan_diagnostic(3);
        assert_eq!(codespan.code.as_deref(), Some("cref::ambiguous"));
        assert_eq!(codespan.labels.len(), 1);
        assert_eq!(codespan.labels[0].file_id, 3);
        assert_eq!(codespan.notes.len(), 1);
    }

    #[test]
    fn test_report_serializes_kind_in_snake_case() {
        let report = unresolved().report();
        let json = serde_json::to_value(&report);
        let Ok(json) = json else {
            panic!("report should serialize");
        };
        assert_eq!(json["kind"], "unresolved");
        assert_eq!(json["code"], "cref::unresolved");
        assert_eq!(json["start"], 2);
        assert!(json.get("help").is_none());
    }
}
