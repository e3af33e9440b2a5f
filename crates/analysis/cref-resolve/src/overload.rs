//! Narrowing same-named candidates to the one a reference means
//!
//! Matching is exact: parameter counts, ref kinds and types must be identical after
//! substituting the reference's type arguments into the declared signature. The only
//! equivalence is between `dynamic` and `object`.

use crate::result::AmbiguityKind;
use cref_symbols::{SymbolId, SymbolRef, SymbolTable, TypeExpr};
use cref_syntax::RefKind;
use rustc_hash::FxHashMap;
use std::mem;

/// A parameter list as written in the reference, already bound
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Signature {
    pub(crate) parameters: Vec<(RefKind, TypeExpr)>,
}

/// What remained after narrowing
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Selection {
    /// Nothing matched
    Empty,
    /// Exactly one candidate
    Single(SymbolRef),
    /// Several candidates; `best` indexes the pick
    Ambiguous {
        candidates: Vec<SymbolRef>,
        best: usize,
        kind: AmbiguityKind,
    },
}

/// Pick among candidates when no parameter list was written
///
/// Several candidates are ambiguous; the pick is the first parameterless method that
/// does not take a variable argument list, or else the first candidate.
pub(crate) fn select_by_name(table: &dyn SymbolTable, candidates: Vec<SymbolRef>) -> Selection {
    if candidates.len() <= 1 {
        return candidates
            .into_iter()
            .next()
            .map_or(Selection::Empty, Selection::Single);
    }

    let best = candidates
        .iter()
        .position(|candidate| {
            let data = table.symbol(candidate.def);
            data.kind.is_method() && data.parameters.is_empty() && !data.is_vararg
        })
        .unwrap_or(0);
    let first_kind = mem::discriminant(&table.symbol(candidates[0].def).kind);
    let kind = if candidates
        .iter()
        .all(|candidate| mem::discriminant(&table.symbol(candidate.def).kind) == first_kind)
    {
        AmbiguityKind::Overloads
    } else {
        AmbiguityKind::DifferentKinds
    };
    Selection::Ambiguous {
        candidates,
        best,
        kind,
    }
}

/// Keep candidates whose signature is exactly the written one
///
/// A method taking a variable argument list only matches an empty list, and loses to a
/// parameterless method that matches too.
pub(crate) fn select_by_signature(
    table: &dyn SymbolTable,
    candidates: Vec<SymbolRef>,
    signature: &Signature,
) -> Selection {
    let written: Vec<(RefKind, TypeExpr)> = signature
        .parameters
        .iter()
        .map(|(ref_kind, ty)| (*ref_kind, normalize(table, ty)))
        .collect();

    let survivors: Vec<SymbolRef> = candidates
        .into_iter()
        .filter(|candidate| {
            let matched = signature_matches(table, candidate, &written);
            if !matched {
                tracing::trace!(candidate = ?candidate.def, "signature mismatch");
            }
            matched
        })
        .collect();

    match survivors.len() {
        0 => Selection::Empty,
        1 => survivors
            .into_iter()
            .next()
            .map_or(Selection::Empty, Selection::Single),
        _ => {
            let best = survivors
                .iter()
                .position(|candidate| !table.symbol(candidate.def).is_vararg)
                .unwrap_or(0);
            Selection::Ambiguous {
                candidates: survivors,
                best,
                kind: AmbiguityKind::Signature,
            }
        }
    }
}

/// Keep conversion operators whose declared result is `target`
pub(crate) fn filter_by_return(
    table: &dyn SymbolTable,
    candidates: Vec<SymbolRef>,
    target: &TypeExpr,
) -> Vec<SymbolRef> {
    let target = normalize(table, target);
    candidates
        .into_iter()
        .filter(|candidate| {
            table
                .symbol(candidate.def)
                .return_type
                .as_ref()
                .is_some_and(|declared| {
                    normalize(table, &substitute(table, candidate, declared)) == target
                })
        })
        .collect()
}

fn signature_matches(
    table: &dyn SymbolTable,
    candidate: &SymbolRef,
    written: &[(RefKind, TypeExpr)],
) -> bool {
    let data = table.symbol(candidate.def);
    if !data.kind.has_parameters() {
        return false;
    }
    if data.is_vararg && !(written.is_empty() && data.parameters.is_empty()) {
        return false;
    }
    if data.parameters.len() != written.len() {
        return false;
    }
    data.parameters
        .iter()
        .zip(written)
        .all(|(declared, (ref_kind, ty))| {
            declared.ref_kind == *ref_kind
                && normalize(table, &substitute(table, candidate, &declared.ty)) == *ty
        })
}

/// Replace the candidate's type parameters with the type arguments it was named with
pub(crate) fn substitute(table: &dyn SymbolTable, candidate: &SymbolRef, ty: &TypeExpr) -> TypeExpr {
    if candidate.type_arguments.is_empty() {
        return ty.clone();
    }
    let map: FxHashMap<SymbolId, TypeExpr> = table
        .type_parameter_chain(candidate.def)
        .into_iter()
        .zip(candidate.type_arguments.iter().cloned())
        .collect();
    ty.substitute(&|param| map.get(&param).cloned())
}

/// Rewrite `object` as `dynamic`, everywhere in the type
pub(crate) fn normalize(table: &dyn SymbolTable, ty: &TypeExpr) -> TypeExpr {
    match ty {
        TypeExpr::Named { def, .. } if table.symbol(*def).is_object() => TypeExpr::Dynamic,
        TypeExpr::Named { def, args } => TypeExpr::Named {
            def: *def,
            args: args.iter().map(|arg| normalize(table, arg)).collect(),
        },
        TypeExpr::Array { element, rank } => TypeExpr::Array {
            element: Box::new(normalize(table, element)),
            rank: *rank,
        },
        TypeExpr::Pointer(inner) => TypeExpr::Pointer(Box::new(normalize(table, inner))),
        TypeExpr::Nullable(inner) => TypeExpr::Nullable(Box::new(normalize(table, inner))),
        TypeExpr::TypeParameter(_) | TypeExpr::Placeholder(_) | TypeExpr::Dynamic => ty.clone(),
    }
}
