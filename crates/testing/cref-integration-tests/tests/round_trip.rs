//! Rendered reference text resolves back to its declaration
//!
//! For every declaration, `render_cref` produces text that resolves to that same
//! declaration from any anchor, and resolving it again is stable.

use anyhow::Result;
use cref_integration_tests::Fixture;
use cref_parser::{ParseOptions, parse_reference};
use cref_resolve::{RawReference, Target, render_cref};
use cref_symbols::{
    MemberDecl, MethodDecl, ProgramBuilder, ProgramModel, SymbolId, SymbolTable as _, TypeDecl,
};
use cref_syntax::{ConversionKind, OverloadableOperator, RefKind};
use expect_test::expect;

struct Library {
    program: ProgramModel,
    declarations: Vec<SymbolId>,
}

fn library() -> Result<Library> {
    let mut builder = ProgramBuilder::new();
    builder.add_platform_types();
    let namespace = builder.namespace("N.Sub");
    let mut declarations = vec![namespace];

    let generic = builder.add_type(namespace, TypeDecl::class("A").generic(["T", "U"]));
    let inner = builder.add_type(generic, TypeDecl::class("Inner"));
    declarations.extend([generic, inner]);
    declarations.push(builder.add_method(
        generic,
        MethodDecl::method("M")
            .generic(["V"])
            .param("T")
            .param_ref(RefKind::Out, "int[][,]")
            .param("Inner")
            .param("V?"),
    )?);
    declarations.push(builder.add_method(generic, MethodDecl::constructor().param("string"))?);
    declarations.push(builder.add_method(generic, MethodDecl::destructor())?);
    declarations.push(builder.add_method(
        generic,
        MethodDecl::operator(OverloadableOperator::Plus)
            .param("A<T, U>")
            .param("A<T, U>")
            .returns("A<T, U>"),
    )?);
    declarations.push(builder.add_method(
        generic,
        MethodDecl::conversion(ConversionKind::Explicit, "int").param("A<T, U>"),
    )?);
    declarations.push(builder.add_member(generic, MemberDecl::indexer("U").param("string"))?);
    declarations.push(builder.add_member(generic, MemberDecl::field("F", "T[]"))?);
    declarations.push(builder.add_member(generic, MemberDecl::property("P", "U"))?);

    let plain = builder.add_type(namespace, TypeDecl::structure("B"));
    declarations.push(plain);
    declarations.push(builder.add_method(plain, MethodDecl::method("M").param("int"))?);
    declarations.push(builder.add_method(plain, MethodDecl::method("M").param("string"))?);
    declarations.push(builder.add_method(plain, MethodDecl::method("M"))?);
    declarations.push(builder.add_method(plain, MethodDecl::method("G").generic(["X"]).param("X*"))?);
    declarations.push(builder.add_method(plain, MethodDecl::method("P").params_array("object[]"))?);
    declarations.push(builder.add_method(plain, MethodDecl::method("V").vararg())?);
    declarations.push(builder.add_member(plain, MemberDecl::event("Changed", "A<int, B>"))?);

    Ok(Library {
        program: builder.finish(),
        declarations,
    })
}

#[test]
fn test_rendered_text() -> Result<()> {
    let Library {
        program,
        declarations,
    } = library()?;
    let rendered: Vec<String> = declarations
        .iter()
        .map(|declaration| render_cref(&program, *declaration))
        .collect();
    expect![[r#"
        global::N.Sub
        global::N.Sub.A{T, U}
        global::N.Sub.A{T, U}.Inner
        global::N.Sub.A{T, U}.M{V}(T, out int[][,], global::N.Sub.A{T, U}.Inner, V?)
        global::N.Sub.A{T, U}.A(string)
        global::N.Sub.A{T, U}.Finalize()
        global::N.Sub.A{T, U}.operator +(global::N.Sub.A{T, U}, global::N.Sub.A{T, U})
        global::N.Sub.A{T, U}.explicit operator int(global::N.Sub.A{T, U})
        global::N.Sub.A{T, U}.this[string]
        global::N.Sub.A{T, U}.F
        global::N.Sub.A{T, U}.P
        global::N.Sub.B
        global::N.Sub.B.M(int)
        global::N.Sub.B.M(string)
        global::N.Sub.B.M()
        global::N.Sub.B.G{X}(X*)
        global::N.Sub.B.P(object[])
        global::N.Sub.B.V()
        global::N.Sub.B.Changed"#]]
    .assert_eq(&rendered.join("\n"));
    Ok(())
}

#[test]
fn test_render_then_resolve_is_identity() -> Result<()> {
    let Library {
        program,
        declarations,
    } = library()?;
    let fixture = Fixture::new(program);
    let anchors = [
        fixture.symbol("")?,
        fixture.symbol("N.Sub.B")?,
        fixture.symbol("N.Sub.A.Inner")?,
    ];
    let resolver = fixture.resolver();

    for declaration in declarations {
        let text = render_cref(fixture.program(), declaration);
        assert!(
            parse_reference(&text, ParseOptions::default()).is_clean(),
            "`{text}` should parse without errors"
        );
        for anchor in anchors {
            let resolution = resolver.resolve(&RawReference::new(text.clone(), anchor));
            let resolved = resolution.result.target().and_then(Target::definition);
            assert_eq!(
                resolved,
                Some(declaration),
                "`{text}` from `{}`: {}",
                fixture.program().name(anchor),
                fixture.summarize(&resolution)
            );

            // Resolving the same text again gives the same answer.
            let again = resolver.resolve(&RawReference::new(text.clone(), anchor));
            assert_eq!(again, resolution);
        }
    }
    Ok(())
}
