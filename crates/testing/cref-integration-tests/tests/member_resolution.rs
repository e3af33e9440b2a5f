//! Member resolution end to end
//!
//! Overload selection by exact signature, ambiguity reporting, constructors, operators,
//! conversions, ref kinds, variable argument lists and the lookup restrictions that set
//! reference resolution apart from ordinary member lookup.

use anyhow::Result;
use cref_integration_tests::Fixture;
use cref_resolve::{AmbiguityKind, ResolutionResult, ResolverOptions, UnresolvedReason};
use cref_symbols::{
    Capability, MemberDecl, MethodDecl, ProgramBuilder, ProgramModel, SymbolTable as _, TypeDecl,
    TypeExpr, TypeSpec,
};
use cref_syntax::{ConversionKind, OverloadableOperator, RefKind};
use expect_test::expect;

fn library(capabilities: &[Capability]) -> Result<ProgramModel> {
    let mut builder = ProgramBuilder::new();
    let system = builder.add_platform_types();
    for capability in capabilities {
        builder.enable(*capability);
    }
    let TypeExpr::Named { def: string, .. } =
        builder.resolve_type(system, &TypeSpec::from("string"))?
    else {
        anyhow::bail!("string is a named type");
    };
    builder.add_method(string, MethodDecl::constructor().param("char[]"))?;

    let namespace = builder.namespace("N");
    let class = builder.add_type(namespace, TypeDecl::class("C"));
    builder.add_method(class, MethodDecl::method("M").param("int"))?;
    builder.add_method(class, MethodDecl::method("M").param("string"))?;
    builder.add_method(class, MethodDecl::method("R").param_ref(RefKind::Ref, "int"))?;
    builder.add_method(class, MethodDecl::method("O").param_ref(RefKind::Out, "int"))?;
    builder.add_method(
        class,
        MethodDecl::method("RR").param_ref(RefKind::RefReadonly, "int"),
    )?;
    builder.add_method(class, MethodDecl::method("P").params_array("object[]"))?;
    builder.add_method(class, MethodDecl::method("V").vararg())?;
    builder.add_method(class, MethodDecl::method("W").vararg())?;
    builder.add_method(class, MethodDecl::method("W"))?;
    builder.add_method(
        class,
        MethodDecl::operator(OverloadableOperator::Plus)
            .param("C")
            .param("C")
            .returns("C"),
    )?;
    builder.add_method(
        class,
        MethodDecl::operator(OverloadableOperator::Minus)
            .param("C")
            .returns("C"),
    )?;
    builder.add_method(
        class,
        MethodDecl::conversion(ConversionKind::Explicit, "int").param("C"),
    )?;
    builder.add_member(class, MemberDecl::indexer("int").param("string"))?;
    builder.add_member(class, MemberDecl::field("Item", "int"))?;
    builder.add_member(class, MemberDecl::field("Mixed", "int"))?;
    builder.add_method(class, MethodDecl::method("Mixed"))?;

    let base = builder.add_type(namespace, TypeDecl::class("Base"));
    builder.add_method(base, MethodDecl::method("Inherited"))?;
    let derived = builder.add_type(namespace, TypeDecl::class("Derived"));
    builder.add_base_type(derived, base)?;

    builder.add_type(namespace, TypeDecl::class("NoCtor"));
    let with_ctor = builder.add_type(namespace, TypeDecl::class("WithCtor"));
    builder.add_method(with_ctor, MethodDecl::constructor())?;
    builder.add_method(with_ctor, MethodDecl::constructor().param("int"))?;

    let extensions = builder.add_type(namespace, TypeDecl::class("Ext").static_type());
    builder.add_method(
        extensions,
        MethodDecl::method("Extend")
            .static_method()
            .extension()
            .param("C"),
    )?;

    builder.add_type(namespace, TypeDecl::class("Pair").generic(["K", "V"]));
    Ok(builder.finish())
}

fn fixture() -> Result<Fixture> {
    Ok(Fixture::new(library(&[])?))
}

#[test]
fn test_exact_signature_picks_one_overload() -> Result<()> {
    let fixture = fixture()?;
    fixture.check("N.C", "M(int)", &expect!["resolved N.C.M(int)"])?;
    fixture.check("N.C", "M(string)", &expect!["resolved N.C.M(string)"])?;
    fixture.check(
        "N.C",
        "M(long)",
        &expect![[r#"
            unresolved: no matching signature
            cref::unresolved @ 0..7: Documentation reference 'M(long)' could not be resolved"#]],
    )?;
    Ok(())
}

#[test]
fn test_missing_parameter_list_is_ambiguous() -> Result<()> {
    let fixture = fixture()?;
    let resolution = fixture.resolve("N.C", "M")?;
    let ResolutionResult::Ambiguous { candidates, .. } = &resolution.result else {
        panic!("expected ambiguity, got {:?}", resolution.result);
    };
    assert_eq!(candidates.len(), 2);

    fixture.check(
        "N.C",
        "M",
        &expect![[r#"
            ambiguous (overloads) among 2, assuming N.C.M(int)
            cref::ambiguous @ 0..1: Ambiguous documentation reference 'M'. Assuming 'N.C.M(int)', but it could also have matched other overloads including 'N.C.M(string)'"#]],
    )?;
    Ok(())
}

#[test]
fn test_empty_parameter_list_is_not_a_wildcard() -> Result<()> {
    let fixture = fixture()?;
    let resolution = fixture.resolve("N.C", "M()")?;
    assert_eq!(
        resolution.result,
        ResolutionResult::Unresolved(UnresolvedReason::NoMatchingSignature)
    );
    Ok(())
}

#[test]
fn test_same_name_different_kinds() -> Result<()> {
    let fixture = fixture()?;
    let resolution = fixture.resolve("N.C", "Mixed")?;
    let ResolutionResult::Ambiguous { kind, .. } = resolution.result else {
        panic!("a field and a method share the name");
    };
    assert_eq!(kind, AmbiguityKind::DifferentKinds);
    fixture.check("N.C", "Mixed()", &expect!["resolved N.C.Mixed()"])?;
    Ok(())
}

#[test]
fn test_inherited_members_are_not_visible() -> Result<()> {
    let fixture = fixture()?;
    let derived = fixture.symbol("N.Derived")?;
    let base = fixture.symbol("N.Base")?;
    assert_eq!(
        fixture.program().symbol(derived).base_types,
        vec![TypeExpr::named(base)]
    );

    // Unqualified, from the derived type's own documentation.
    fixture.check(
        "N.Derived",
        "Inherited",
        &expect![[r#"
            unresolved: not found
            cref::unresolved @ 0..9: Documentation reference 'Inherited' could not be resolved"#]],
    )?;
    // Qualified through the derived type, from an unrelated type.
    fixture.check(
        "N.C",
        "Derived.Inherited",
        &expect![[r#"
            unresolved: not found
            cref::unresolved @ 8..17: Documentation reference 'Inherited' could not be resolved"#]],
    )?;
    fixture.check("N.Base", "Inherited", &expect!["resolved N.Base.Inherited()"])?;
    fixture.check("N.C", "Base.Inherited", &expect!["resolved N.Base.Inherited()"])?;
    Ok(())
}

#[test]
fn test_operators() -> Result<()> {
    let fixture = fixture()?;
    fixture.check(
        "N.C",
        "operator +",
        &expect!["resolved N.C.operator +(N.C, N.C)"],
    )?;
    fixture.check(
        "N.C",
        "operator +(C, C)",
        &expect!["resolved N.C.operator +(N.C, N.C)"],
    )?;
    fixture.check("N.C", "operator -(C)", &expect!["resolved N.C.operator -(N.C)"])?;
    fixture.check(
        "N.C",
        "operator =",
        &expect![[r#"
            syntax error @ 9..10: Overloadable operator expected
            cref::bad_syntax @ 9..10: Documentation reference 'operator =' has incorrect syntax: Overloadable operator expected"#]],
    )?;
    Ok(())
}

#[test]
fn test_conversion_operators_match_their_target() -> Result<()> {
    let fixture = fixture()?;
    fixture.check(
        "N.C",
        "explicit operator int(C)",
        &expect!["resolved N.C.explicit operator int(N.C)"],
    )?;
    fixture.check(
        "N.C",
        "implicit operator int(C)",
        &expect![[r#"
            unresolved: not found
            cref::unresolved @ 0..24: Documentation reference 'implicit operator int(C)' could not be resolved"#]],
    )?;
    fixture.check(
        "N.C",
        "explicit operator Missing(C)",
        &expect![[r#"
            unresolved: invalid return type
            cref::unresolved @ 0..28: Documentation reference 'explicit operator Missing(C)' could not be resolved
            cref::invalid_return_type @ 18..25: Invalid return type in documentation reference: 'Missing'"#]],
    )?;
    Ok(())
}

#[test]
fn test_indexer_is_not_found_by_name() -> Result<()> {
    let fixture = fixture()?;
    fixture.check("N.C", "this[string]", &expect!["resolved N.C.this[string]"])?;
    fixture.check("N.C", "Item", &expect!["resolved N.C.Item"])?;
    Ok(())
}

#[test]
fn test_constructors() -> Result<()> {
    let fixture = fixture()?;
    fixture.check("N.C", "WithCtor", &expect!["resolved N.WithCtor"])?;
    fixture.check(
        "N.C",
        "WithCtor(int)",
        &expect!["resolved N.WithCtor.WithCtor(int)"],
    )?;
    fixture.check(
        "N.C",
        "WithCtor.WithCtor(int)",
        &expect!["resolved N.WithCtor.WithCtor(int)"],
    )?;
    fixture.check(
        "N.C",
        "WithCtor.WithCtor",
        &expect![[r#"
            ambiguous (overloads) among 2, assuming N.WithCtor.WithCtor()
            cref::ambiguous @ 0..17: Ambiguous documentation reference 'WithCtor.WithCtor'. Assuming 'N.WithCtor.WithCtor()', but it could also have matched other overloads including 'N.WithCtor.WithCtor(int)'"#]],
    )?;
    fixture.check(
        "N.C",
        "NoCtor()",
        &expect![[r#"
            unresolved: no constructor
            cref::unresolved @ 0..8: Documentation reference 'NoCtor()' could not be resolved"#]],
    )?;
    fixture.check(
        "N.C",
        "string(char[])",
        &expect!["resolved System.String.String(char[])"],
    )?;
    Ok(())
}

#[test]
fn test_ref_kinds_must_be_written() -> Result<()> {
    let fixture = fixture()?;
    fixture.check("N.C", "R(ref int)", &expect!["resolved N.C.R(ref int)"])?;
    fixture.check("N.C", "O(out int)", &expect!["resolved N.C.O(out int)"])?;
    for text in ["R(int)", "R(out int)", "O(int)", "O(ref int)"] {
        let resolution = fixture.resolve("N.C", text)?;
        assert_eq!(
            resolution.result,
            ResolutionResult::Unresolved(UnresolvedReason::NoMatchingSignature),
            "{text}"
        );
    }
    Ok(())
}

#[test]
fn test_ref_readonly_needs_host_capability() -> Result<()> {
    let without = fixture()?;
    without.check(
        "N.C",
        "RR(ref readonly int)",
        &expect![[r#"
            syntax error @ 3..15: Feature 'ref readonly parameters' is not available; salvaged resolved N.C.RR(ref readonly int)
            cref::bad_syntax @ 3..15: Documentation reference 'RR(ref readonly int)' has incorrect syntax: Feature 'ref readonly parameters' is not available"#]],
    )?;

    let with = Fixture::new(library(&[Capability::RefReadonlyParameters])?);
    with.check(
        "N.C",
        "RR(ref readonly int)",
        &expect!["resolved N.C.RR(ref readonly int)"],
    )?;
    with.check(
        "N.C",
        "RR(readonly ref int)",
        &expect!["resolved N.C.RR(ref readonly int)"],
    )?;
    let plain = with.resolve("N.C", "RR(ref int)")?;
    assert!(!plain.result.is_resolved());
    Ok(())
}

#[test]
fn test_params_array_matches_its_array_type() -> Result<()> {
    let fixture = fixture()?;
    fixture.check("N.C", "P(object[])", &expect!["resolved N.C.P(params object[])"])?;
    fixture.check("N.C", "P(dynamic[])", &expect!["resolved N.C.P(params object[])"])?;
    let resolution = fixture.resolve("N.C", "P(object)")?;
    assert!(!resolution.result.is_resolved());
    Ok(())
}

#[test]
fn test_variable_argument_lists() -> Result<()> {
    let fixture = fixture()?;
    fixture.check("N.C", "V()", &expect!["resolved N.C.V(__arglist)"])?;
    let resolution = fixture.resolve("N.C", "V(int)")?;
    assert!(!resolution.result.is_resolved());

    let both = fixture.resolve("N.C", "W()")?;
    let ResolutionResult::Ambiguous { kind, .. } = &both.result else {
        panic!("expected ambiguity, got {:?}", both.result);
    };
    assert_eq!(*kind, AmbiguityKind::Signature);
    assert_eq!(fixture.describe(&both.result), "ambiguous (signature) among 2, assuming N.C.W()");
    Ok(())
}

#[test]
fn test_extension_methods_belong_to_their_declaring_type() -> Result<()> {
    let fixture = fixture()?;
    fixture.check("N.Ext", "Extend(C)", &expect!["resolved N.Ext.Extend(N.C)"])?;
    fixture.check("N.C", "Ext.Extend(C)", &expect!["resolved N.Ext.Extend(N.C)"])?;
    fixture.check(
        "N.C",
        "C.Extend(C)",
        &expect![[r#"
            unresolved: not found
            cref::unresolved @ 2..11: Documentation reference 'Extend(C)' could not be resolved"#]],
    )?;
    Ok(())
}

#[test]
fn test_explicit_arity_is_strict() -> Result<()> {
    let fixture = fixture()?;
    fixture.check("N.C", "Pair{A, B}", &expect!["resolved N.Pair<A, B>"])?;
    fixture.check(
        "N.C",
        "Pair{A}",
        &expect![[r#"
            unresolved: not found
            cref::unresolved @ 0..7: Documentation reference 'Pair{A}' could not be resolved"#]],
    )?;
    Ok(())
}

#[test]
fn test_standalone_generic_type() -> Result<()> {
    let fixture = fixture()?;
    fixture.check("N.C", "Pair", &expect!["resolved N.Pair<K, V>"])?;

    let strict = Fixture::new(library(&[])?).with_options(ResolverOptions {
        standalone_generic_types: false,
        ..ResolverOptions::default()
    });
    let resolution = strict.resolve("N.C", "Pair")?;
    assert_eq!(
        resolution.result,
        ResolutionResult::Unresolved(UnresolvedReason::NotFound)
    );
    Ok(())
}

#[test]
fn test_bad_parameter_type_is_reported_twice() -> Result<()> {
    let fixture = fixture()?;
    fixture.check(
        "N.C",
        "N.C.M(Missing)",
        &expect![[r#"
            unresolved: invalid type for parameter 0
            cref::unresolved @ 4..14: Documentation reference 'M(Missing)' could not be resolved
            cref::invalid_parameter_type @ 6..13: Invalid type for parameter 1 in documentation reference: 'Missing'"#]],
    )?;
    Ok(())
}
