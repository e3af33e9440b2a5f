//! Parser for documentation cross-references
//!
//! Turns reference text such as `List{T}.Add(T)` into a [`ReferenceTree`]. Parsing never
//! fails outright: a [`ParseOutput`] always carries every error found, and carries a
//! tree unless one of those errors stopped the parse.
//!
//! Recoverable errors (a type where a placeholder is declared, trailing text, an
//! unavailable `ref readonly` modifier) still produce a tree, which callers resolve to
//! salvage a best-effort target.
//!
//! [`ReferenceTree`]: cref_syntax::ReferenceTree

mod chars;
pub mod error;
mod parser;

pub use chars::{DecodedChar, decode};
pub use error::ParseError;

use cref_syntax::ReferenceTree;

/// Host-dependent parser behavior
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ParseOptions {
    /// Whether `ref readonly` parameters are supported
    pub ref_readonly_parameters: bool,
}

/// Result of parsing a reference
#[derive(Debug, Clone)]
pub struct ParseOutput {
    /// The parsed tree, absent when a fatal error stopped the parse
    pub tree: Option<ReferenceTree>,
    /// Errors in source order of discovery
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    /// Whether the text parsed without any error
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first error, which decides the reported syntax error
    pub fn first_error(&self) -> Option<&ParseError> {
        self.errors.first()
    }
}

/// Parse raw reference text
///
/// `text` is the attribute value exactly as written; character references are decoded
/// here and spans in the result address the raw text.
#[tracing::instrument(level = "trace", skip(options))]
pub fn parse_reference(text: &str, options: ParseOptions) -> ParseOutput {
    let output = parser::Parser::new(text, options).parse();
    tracing::trace!(
        has_tree = output.tree.is_some(),
        errors = output.errors.len(),
        "parsed reference"
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use cref_syntax::{
        MemberName, ReferenceTree, Segment, SegmentName, TypeArgument, TypePath, TypeRef,
    };
    use expect_test::{Expect, expect};

    fn render_path(path: &TypePath) -> String {
        let mut out = String::new();
        if let Some(alias) = &path.alias {
            out.push_str(&format!("{}::", alias.text));
        }
        let segments: Vec<String> = path.segments.iter().map(render_segment).collect();
        out.push_str(&segments.join("."));
        out
    }

    fn render_segment(segment: &Segment) -> String {
        let mut out = match &segment.name {
            SegmentName::Ident(ident) if ident.verbatim => format!("@{}", ident.text),
            name => name.text().to_string(),
        };
        if let Some(list) = &segment.type_arguments {
            let arguments: Vec<String> = list
                .arguments
                .iter()
                .map(|argument| match argument {
                    TypeArgument::Placeholder(ident) => format!("${}", ident.text),
                    TypeArgument::Type(ty) => render_type(ty),
                })
                .collect();
            out.push_str(&format!("{{{}}}", arguments.join(", ")));
        }
        out
    }

    fn render_type(ty: &TypeRef) -> String {
        match ty {
            TypeRef::Path(path) => render_path(path),
            TypeRef::Dynamic(_) => "dynamic".to_string(),
            TypeRef::Array { element, rank, .. } => {
                format!("array{rank}({})", render_type(element))
            }
            TypeRef::Pointer { pointee, .. } => format!("ptr({})", render_type(pointee)),
            TypeRef::Nullable { underlying, .. } => format!("opt({})", render_type(underlying)),
        }
    }

    fn render_tree(tree: &ReferenceTree) -> String {
        match tree {
            ReferenceTree::TypeOrNamespace(path) => format!("path {}", render_path(path)),
            ReferenceTree::Member(member) => {
                let mut out = "member ".to_string();
                if let Some(qualifier) = &member.qualifier {
                    out.push_str(&render_path(qualifier));
                    if !qualifier.segments.is_empty() {
                        out.push('.');
                    }
                }
                match &member.member {
                    MemberName::Named(segment) => out.push_str(&render_segment(segment)),
                    MemberName::Indexer { .. } => out.push_str("this"),
                    MemberName::Operator { operator, .. } => {
                        out.push_str(&format!("operator {operator:?}"));
                    }
                    MemberName::Conversion { kind, target, .. } => {
                        out.push_str(&format!("{kind} operator {}", render_type(target)));
                    }
                }
                if let Some(list) = &member.parameters {
                    let parameters: Vec<String> = list
                        .parameters
                        .iter()
                        .map(|parameter| {
                            let ty = render_type(&parameter.ty);
                            match parameter.ref_kind.to_string() {
                                kind if kind.is_empty() => ty,
                                kind => format!("{kind} {ty}"),
                            }
                        })
                        .collect();
                    out.push_str(&format!("({})", parameters.join(", ")));
                }
                out
            }
        }
    }

    fn render(text: &str, options: ParseOptions) -> String {
        let output = parse_reference(text, options);
        let mut out = output
            .tree
            .as_ref()
            .map_or_else(|| "<none>".to_string(), render_tree);
        for err in &output.errors {
            let span = err.span();
            out.push_str(&format!("\nerror: {err} @ {}..{}", span.start, span.end));
        }
        out
    }

    fn check(text: &str, expect: &Expect) {
        expect.assert_eq(&render(text, ParseOptions::default()));
    }

    #[test]
    fn test_generic_member_declares_placeholders() {
        check("List{T}.Add(T)", &expect!["member List{$T}.Add(T)"]);
        check("A{T, T}.M(T)", &expect!["member A{$T, $T}.M(T)"]);
        check("M{U}(U[])", &expect!["member M{$U}(array1(U))"]);
    }

    #[test]
    fn test_angle_brackets_are_accepted() {
        check("List&lt;T&gt;.Add(T)", &expect!["member List{$T}.Add(T)"]);
    }

    #[test]
    fn test_plain_paths() {
        check("System.String", &expect!["path System.String"]);
        check("int.MaxValue", &expect!["path int.MaxValue"]);
        check("@int", &expect!["path @int"]);
        check("&#64;class", &expect!["path @class"]);
    }

    #[test]
    fn test_alias_qualifiers() {
        check("global::C()", &expect!["member global::C()"]);
        check("lib::N.C", &expect!["path lib::N.C"]);
    }

    #[test]
    fn test_special_members() {
        check("this[int]", &expect!["member this(int)"]);
        check("C.this[int, string]", &expect!["member C.this(int, string)"]);
        check("operator +(C, C)", &expect!["member operator Plus(C, C)"]);
        check("operator {=", &expect!["member operator LessThanOrEqual"]);
        check("operator &gt;&gt;&gt;", &expect!["member operator UnsignedRightShift"]);
        check("operator true", &expect!["member operator True"]);
        check("explicit operator int", &expect!["member explicit operator int"]);
        check(
            "C.implicit operator C{int}(int)",
            &expect!["member C.implicit operator C{int}(int)"],
        );
    }

    #[test]
    fn test_parameter_types() {
        check("string(char[])", &expect!["member string(array1(char))"]);
        check("M(Q[][,])", &expect!["member M(array1(array2(Q)))"]);
        check("M(int*, int?)", &expect!["member M(ptr(int), opt(int))"]);
        check("M(dynamic, dynamic.X)", &expect!["member M(dynamic, dynamic.X)"]);
        check(
            "M(ref int, out int, in int)",
            &expect!["member M(ref int, out int, in int)"],
        );
        check("M()", &expect!["member M()"]);
    }

    #[test]
    fn test_ref_readonly_depends_on_host() {
        check(
            "M(ref readonly int)",
            &expect![[r#"
                path M
                error: Feature 'ref readonly parameters' is not available @ 2..14"#]],
        );
        let options = ParseOptions {
            ref_readonly_parameters: true,
        };
        assert_eq!(
            render("M(readonly ref int)", options),
            "member M(ref readonly int)"
        );
    }

    #[test]
    fn test_recoverable_errors_keep_tree() {
        check(
            "G{int}",
            &expect![[r#"
                path G{int}
                error: Type parameter declaration must be an identifier not a type @ 2..5"#]],
        );
        check(
            "C[]",
            &expect![[r#"
                path C
                error: Unexpected text '[]' after the reference @ 1..3"#]],
        );
        check(
            "Cat:-)",
            &expect![[r#"
                path Cat
                error: Unexpected text ':-)' after the reference @ 3..6"#]],
        );
    }

    #[test]
    fn test_fatal_errors() {
        check(
            "",
            &expect![[r#"
                <none>
                error: Identifier expected @ 0..0"#]],
        );
        check(
            "::X",
            &expect![[r#"
                <none>
                error: Identifier expected @ 0..1"#]],
        );
        check(
            "&#64;5",
            &expect![[r#"
                <none>
                error: Keyword, identifier, or string expected after verbatim specifier: @ @ 0..5"#]],
        );
        check(
            "operator q",
            &expect![[r#"
                <none>
                error: Overloadable operator expected @ 9..10"#]],
        );
        check(
            "M(,,)",
            &expect![[r#"
                <none>
                error: Type expected @ 2..3"#]],
        );
        check(
            "C{}",
            &expect![[r#"
                <none>
                error: Identifier expected @ 2..3"#]],
        );
        check(
            "A.int",
            &expect![[r#"
                <none>
                error: Identifier expected; 'int' is a keyword @ 2..5"#]],
        );
    }

    #[test]
    fn test_first_error_decides() {
        let output = parse_reference("M(", ParseOptions::default());
        assert!(output.tree.is_none());
        assert!(matches!(
            output.first_error(),
            Some(ParseError::TypeExpected { .. })
        ));
        assert!(parse_reference("M(int)", ParseOptions::default()).is_clean());
    }
}
