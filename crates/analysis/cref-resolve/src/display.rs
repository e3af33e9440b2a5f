//! Rendering declarations as text
//!
//! Two forms are produced. [`display`] is what diagnostics show (`N.C.M(int)`,
//! `N.A<T, U>.M(T)`). [`render_cref`] is reference text naming the declaration from the
//! global namespace (`global::N.C{T}.M(int)`), which resolves back to the same
//! declaration from any anchor.

use crate::result::Target;
use cref_symbols::{MethodKind, SymbolId, SymbolKind, SymbolTable, TypeExpr};
use cref_syntax::{ConversionKind, OverloadableOperator, RefKind};

/// Bracket and qualification conventions for one of the two forms
#[derive(Copy, Clone)]
struct Style {
    open: char,
    close: char,
    reference_text: bool,
}

const DISPLAY: Style = Style {
    open: '<',
    close: '>',
    reference_text: false,
};

const CREF: Style = Style {
    open: '{',
    close: '}',
    reference_text: true,
};

/// Render a declaration the way diagnostics show it
pub fn display(table: &dyn SymbolTable, symbol: SymbolId) -> String {
    let data = table.symbol(symbol);
    match data.kind {
        SymbolKind::Namespace => {
            namespace_path(table, symbol).unwrap_or_else(|| "global".to_string())
        }
        SymbolKind::Type(_) => type_path(table, symbol, &[], DISPLAY),
        SymbolKind::TypeParameter { .. } => table.name(symbol).to_string(),
        SymbolKind::Method(_)
        | SymbolKind::Property
        | SymbolKind::Indexer
        | SymbolKind::Field
        | SymbolKind::Event => member(table, symbol, DISPLAY),
    }
}

/// Render a type the way diagnostics show it
pub fn display_type(table: &dyn SymbolTable, ty: &TypeExpr) -> String {
    type_text(table, ty, DISPLAY)
}

/// Render a resolution target the way diagnostics show it
pub fn display_target(table: &dyn SymbolTable, target: &Target) -> String {
    match target {
        Target::Symbol(symbol) if symbol.is_constructed() => {
            let data = table.symbol(symbol.def);
            if data.kind.is_type() {
                type_path(table, symbol.def, &symbol.type_arguments, DISPLAY)
            } else {
                display(table, symbol.def)
            }
        }
        Target::Symbol(symbol) => display(table, symbol.def),
        Target::Type(ty) => display_type(table, ty),
    }
}

/// Render reference text that names `symbol` from the global namespace
///
/// Members of generic types declare the type's own parameter names as placeholders, and
/// methods always carry a parameter list so overloads stay apart. Type parameters render
/// as their bare name, which only resolves inside their owner.
pub fn render_cref(table: &dyn SymbolTable, symbol: SymbolId) -> String {
    let data = table.symbol(symbol);
    match data.kind {
        SymbolKind::Namespace => format!(
            "global::{}",
            namespace_path(table, symbol).unwrap_or_default()
        ),
        SymbolKind::Type(_) => type_path(table, symbol, &[], CREF),
        SymbolKind::TypeParameter { .. } => table.name(symbol).to_string(),
        SymbolKind::Method(_)
        | SymbolKind::Property
        | SymbolKind::Indexer
        | SymbolKind::Field
        | SymbolKind::Event => member(table, symbol, CREF),
    }
}

/// Dotted namespace path without the global namespace; `None` for the global namespace
fn namespace_path(table: &dyn SymbolTable, namespace: SymbolId) -> Option<String> {
    let global = table.global_namespace();
    if namespace == global {
        return None;
    }
    let mut names: Vec<&str> = table
        .ancestors(namespace)
        .into_iter()
        .filter(|ancestor| *ancestor != global)
        .map(|ancestor| table.name(ancestor))
        .collect();
    names.reverse();
    names.push(table.name(namespace));
    Some(names.join("."))
}

/// The qualified name of a type, with either the given flattened arguments or the
/// type's own parameter names
fn type_path(table: &dyn SymbolTable, def: SymbolId, args: &[TypeExpr], style: Style) -> String {
    let mut chain: Vec<SymbolId> = table
        .ancestors(def)
        .into_iter()
        .take_while(|ancestor| table.symbol(*ancestor).kind.is_type())
        .collect();
    chain.reverse();
    chain.push(def);

    let namespace = chain
        .first()
        .and_then(|outermost| table.symbol(*outermost).container)
        .and_then(|container| namespace_path(table, container));

    let mut out = String::new();
    if style.reference_text {
        // Rooted so the text means the same from every anchor.
        out.push_str("global::");
    }
    if let Some(namespace) = namespace {
        out.push_str(&namespace);
        out.push('.');
    }

    let mut remaining = args;
    for (position, ty) in chain.iter().enumerate() {
        if position > 0 {
            out.push('.');
        }
        out.push_str(table.name(*ty));
        let own = &table.symbol(*ty).type_parameters;
        if own.is_empty() {
            continue;
        }
        let names: Vec<String> = if remaining.len() >= own.len() {
            let (taken, rest) = remaining.split_at(own.len());
            remaining = rest;
            taken.iter().map(|arg| type_text(table, arg, style)).collect()
        } else {
            own.iter().map(|param| table.name(*param).to_string()).collect()
        };
        out.push(style.open);
        out.push_str(&names.join(", "));
        out.push(style.close);
    }
    out
}

fn type_text(table: &dyn SymbolTable, ty: &TypeExpr, style: Style) -> String {
    match ty {
        TypeExpr::Named { def, args } => match table.symbol(*def).special {
            Some(special) => special.keyword().to_string(),
            None => type_path(table, *def, args, style),
        },
        TypeExpr::TypeParameter(param) => table.name(*param).to_string(),
        TypeExpr::Placeholder(placeholder) => placeholder.name.clone(),
        TypeExpr::Array { .. } => {
            // Specifiers are written outermost first.
            let mut ranks = Vec::new();
            let mut element = ty;
            while let TypeExpr::Array {
                element: inner,
                rank,
            } = element
            {
                ranks.push(*rank);
                element = inner;
            }
            let mut out = type_text(table, element, style);
            for rank in ranks {
                out.push('[');
                out.push_str(&",".repeat(rank.saturating_sub(1) as usize));
                out.push(']');
            }
            out
        }
        TypeExpr::Pointer(inner) => format!("{}*", type_text(table, inner, style)),
        TypeExpr::Nullable(inner) => format!("{}?", type_text(table, inner, style)),
        TypeExpr::Dynamic => "dynamic".to_string(),
    }
}

fn member(table: &dyn SymbolTable, symbol: SymbolId, style: Style) -> String {
    let data = table.symbol(symbol);
    let container = data.container.unwrap_or_else(|| table.global_namespace());
    let mut out = if table.symbol(container).kind.is_type() {
        type_path(table, container, &[], style)
    } else {
        namespace_path(table, container).unwrap_or_default()
    };
    if !out.is_empty() {
        out.push('.');
    }

    let name = table.name(symbol);
    match data.kind {
        SymbolKind::Method(MethodKind::Constructor | MethodKind::StaticConstructor) => {
            out.push_str(table.name(container));
        }
        SymbolKind::Method(MethodKind::Destructor) if !style.reference_text => {
            out.push('~');
            out.push_str(table.name(container));
        }
        SymbolKind::Method(MethodKind::Operator) => {
            out.push_str("operator ");
            let token: &str =
                OverloadableOperator::from_member_name(name).map_or(name, |op| op.token());
            out.push_str(token);
        }
        SymbolKind::Method(MethodKind::Conversion) => {
            let kind = ConversionKind::from_member_name(name).unwrap_or(ConversionKind::Implicit);
            let target = data
                .return_type
                .as_ref()
                .map(|ty| type_text(table, ty, style))
                .unwrap_or_default();
            out.push_str(&format!("{kind} operator {target}"));
        }
        SymbolKind::Indexer => out.push_str("this"),
        _ => {
            out.push_str(name);
            if data.kind.is_method() && !data.type_parameters.is_empty() {
                let names: Vec<&str> = data
                    .type_parameters
                    .iter()
                    .map(|param| table.name(*param))
                    .collect();
                out.push(style.open);
                out.push_str(&names.join(", "));
                out.push(style.close);
            }
        }
    }

    if data.kind.has_parameters() {
        let (open, close) = if data.kind == SymbolKind::Indexer {
            ('[', ']')
        } else {
            ('(', ')')
        };
        let mut params: Vec<String> = data
            .parameters
            .iter()
            .map(|param| {
                let ty = type_text(table, &param.ty, style);
                let with_ref = if param.ref_kind == RefKind::None {
                    ty
                } else {
                    format!("{} {ty}", param.ref_kind)
                };
                if param.is_params && !style.reference_text {
                    format!("params {with_ref}")
                } else {
                    with_ref
                }
            })
            .collect();
        if data.is_vararg && !style.reference_text {
            params.push("__arglist".to_string());
        }
        out.push(open);
        out.push_str(&params.join(", "));
        out.push(close);
    }
    out
}
