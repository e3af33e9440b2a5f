//! Syntax errors in reference text
//!
//! Note: These struct fields are used by miette's `#[derive(Diagnostic)]` macro
//! for rich error output, but the compiler cannot see through the proc macro expansion.

#![allow(
    unused_assignments,
    reason = "fields are read by the miette derive expansion"
)]

use cref_span::Span;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// A syntax error with rich diagnostic information
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum ParseError {
    /// The text is empty or does not start with a name
    #[error("Identifier expected")]
    #[diagnostic(code(cref::parser::identifier_expected))]
    IdentifierExpected {
        /// Source location
        #[label("identifier expected here")]
        span: SourceSpan,
    },

    /// A reserved word where a name is required
    #[error("Identifier expected; '{keyword}' is a keyword")]
    #[diagnostic(
        code(cref::parser::keyword_as_identifier),
        help("write `@{keyword}` to use a keyword as a name")
    )]
    KeywordAsIdentifier {
        /// The offending keyword
        keyword: String,
        /// Source location
        #[label("reserved word")]
        span: SourceSpan,
    },

    /// `@` not followed by a name
    #[error("Keyword, identifier, or string expected after verbatim specifier: @")]
    #[diagnostic(code(cref::parser::verbatim_specifier))]
    VerbatimSpecifier {
        /// Location of the `@`
        #[label("verbatim specifier")]
        span: SourceSpan,
    },

    /// `operator` followed by something that cannot be overloaded
    #[error("Overloadable operator expected")]
    #[diagnostic(
        code(cref::parser::overloadable_operator_expected),
        help("only unary, binary and conversion operators can be referenced")
    )]
    OverloadableOperatorExpected {
        /// Source location
        #[label("not an overloadable operator")]
        span: SourceSpan,
    },

    /// A type where a type parameter name is declared: `List{int}`
    #[error("Type parameter declaration must be an identifier not a type")]
    #[diagnostic(code(cref::parser::type_parameter_not_identifier))]
    TypeParameterNotIdentifier {
        /// Source location of the argument
        #[label("declared here")]
        span: SourceSpan,
    },

    /// A parameter or conversion target with no type
    #[error("Type expected")]
    #[diagnostic(code(cref::parser::type_expected))]
    TypeExpected {
        /// Source location
        #[label("type expected here")]
        span: SourceSpan,
    },

    /// A missing delimiter
    #[error("Syntax error, '{expected}' expected")]
    #[diagnostic(code(cref::parser::missing_token), help("try adding `{expected}` here"))]
    Expected {
        /// What was expected
        expected: String,
        /// Source location where it should be
        #[label("expected `{expected}` here")]
        span: SourceSpan,
    },

    /// Text left over after a complete reference
    #[error("Unexpected text '{text}' after the reference")]
    #[diagnostic(code(cref::parser::trailing_text))]
    TrailingText {
        /// The leftover text
        text: String,
        /// Source location
        #[label("unexpected")]
        span: SourceSpan,
    },

    /// `ref readonly` without host support
    #[error("Feature 'ref readonly parameters' is not available")]
    #[diagnostic(
        code(cref::parser::ref_readonly_unavailable),
        help("the parameter list is ignored")
    )]
    RefReadonlyUnavailable {
        /// Source location of the modifier pair
        #[label("unsupported modifier")]
        span: SourceSpan,
    },
}

impl ParseError {
    /// Source location of the error
    pub fn span(&self) -> Span {
        let source = match self {
            Self::IdentifierExpected { span }
            | Self::KeywordAsIdentifier { span, .. }
            | Self::VerbatimSpecifier { span }
            | Self::OverloadableOperatorExpected { span }
            | Self::TypeParameterNotIdentifier { span }
            | Self::TypeExpected { span }
            | Self::Expected { span, .. }
            | Self::TrailingText { span, .. }
            | Self::RefReadonlyUnavailable { span } => span,
        };
        Span::new(source.offset() as u32, (source.offset() + source.len()) as u32)
    }

    /// Whether parsing could continue past this error with a usable tree
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TypeParameterNotIdentifier { .. }
                | Self::TrailingText { .. }
                | Self::RefReadonlyUnavailable { .. }
        )
    }

    /// Convert to codespan diagnostic for rustc-style output
    pub fn to_codespan_diagnostic(
        &self,
        file_id: usize,
    ) -> codespan_reporting::diagnostic::Diagnostic<usize> {
        use codespan_reporting::diagnostic::{Diagnostic as CodespanDiagnostic, Label};

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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_round_trips_through_source_span() {
        let err = ParseError::TypeExpected {
            span: Span::new(4, 9).into(),
        };
        assert_eq!(err.span(), Span::new(4, 9));
    }

    #[test]
    fn test_recoverable_errors() {
        let trailing = ParseError::TrailingText {
            text: "[]".to_string(),
            span: Span::new(1, 3).into(),
        };
        let verbatim = ParseError::VerbatimSpecifier {
            span: Span::new(0, 1).into(),
        };
        assert!(trailing.is_recoverable());
        assert!(!verbatim.is_recoverable());
    }

    #[test]
    fn test_codespan_conversion_keeps_code_and_help() {
        let err = ParseError::OverloadableOperatorExpected {
            span: Span::new(9, 10).into(),
        };
        let diag = err.to_codespan_diagnostic(0);
        assert_eq!(diag.message, "Overloadable operator expected");
        assert_eq!(
            diag.code.as_deref(),
            Some("cref::parser::overloadable_operator_expected")
        );
        assert_eq!(diag.labels[0].range, 9..10);
        assert_eq!(diag.notes.len(), 1);
    }
}
