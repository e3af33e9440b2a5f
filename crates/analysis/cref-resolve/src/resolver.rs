//! Resolution entry points
//!
//! A [`Resolver`] borrows a [`SymbolTable`] and resolves any number of references
//! against it. Each call parses the text, declares the reference's placeholders, binds
//! the qualifier and parameter types, gathers candidates, narrows them, and reports.
//! Calls share nothing but the table, so references can be resolved from many threads
//! at once.

use crate::binder::{Binder, PathValue};
use crate::diagnostics::CrefDiagnostic;
use crate::display;
use crate::options::ResolverOptions;
use crate::overload::{self, Selection, Signature};
use crate::placeholders::PlaceholderTable;
use crate::result::{Resolution, ResolutionResult, Target, UnresolvedReason};
use crate::scope::ScopeChain;
use cref_parser::{ParseOptions, parse_reference};
use cref_span::Span;
use cref_symbols::{
    Arity, Capability, CandidateSet, ContainerRef, ImportScopeId, LookupScope, SymbolId,
    SymbolKind, SymbolRef, SymbolTable, TypeExpr,
};
use cref_syntax::{
    CONSTRUCTOR_NAME, INDEXER_NAME, MemberName, MemberReference, ReferencePart, ReferenceTree,
    Segment, SegmentName, TypeArgument,
};
use std::sync::atomic::{AtomicBool, Ordering};

/// A reference as found in a documentation annotation
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawReference {
    /// The attribute value exactly as written
    pub text: String,
    /// The declaration the annotation is attached to
    pub anchor: SymbolId,
    /// The innermost import scope in effect at the anchor
    pub imports: Option<ImportScopeId>,
}

impl RawReference {
    /// A reference with no imports in effect
    pub fn new(text: impl Into<String>, anchor: SymbolId) -> Self {
        Self {
            text: text.into(),
            anchor,
            imports: None,
        }
    }

    /// Set the innermost import scope
    #[must_use]
    pub fn with_imports(mut self, imports: ImportScopeId) -> Self {
        self.imports = Some(imports);
        self
    }
}

/// The results of a batch, in input order
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BatchResolution {
    /// One resolution per reference processed
    pub resolutions: Vec<Resolution>,
    /// Whether the batch stopped early; the unprocessed references have no entry
    pub cancelled: bool,
}

/// Resolves references against one symbol table
#[derive(Clone, Copy)]
pub struct Resolver<'table> {
    table: &'table dyn SymbolTable,
    options: ResolverOptions,
}

impl<'table> Resolver<'table> {
    /// Create a resolver with default options
    pub fn new(table: &'table dyn SymbolTable) -> Self {
        Self::with_options(table, ResolverOptions::default())
    }

    /// Create a resolver with explicit options
    pub fn with_options(table: &'table dyn SymbolTable, options: ResolverOptions) -> Self {
        Self { table, options }
    }

    /// The options in effect
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// The table references are resolved against
    pub fn table(&self) -> &'table dyn SymbolTable {
        self.table
    }

    /// Resolve a whole reference
    #[tracing::instrument(level = "debug", skip_all, fields(text = %raw.text))]
    pub fn resolve(&self, raw: &RawReference) -> Resolution {
        self.run(raw, |session, tree| session.resolve_tree(tree))
    }

    /// Resolve one part of a reference on its own
    ///
    /// Placeholders declared anywhere in the reference are in scope, exactly as when the
    /// whole reference is resolved.
    #[tracing::instrument(level = "debug", skip_all, fields(text = %raw.text, ?part))]
    pub fn resolve_part(&self, raw: &RawReference, part: ReferencePart) -> Resolution {
        self.run(raw, |session, tree| session.resolve_part(tree, part))
    }

    /// Resolve references in order until done or until `cancellation` is set
    ///
    /// The flag is only checked between references.
    #[tracing::instrument(level = "debug", skip_all, fields(count = references.len()))]
    pub fn resolve_batch(
        &self,
        references: &[RawReference],
        cancellation: &AtomicBool,
    ) -> BatchResolution {
        let mut batch = BatchResolution::default();
        for raw in references {
            if cancellation.load(Ordering::Acquire) {
                tracing::debug!(done = batch.resolutions.len(), "batch cancelled");
                batch.cancelled = true;
                break;
            }
            batch.resolutions.push(self.resolve(raw));
        }
        batch
    }

    fn run(
        &self,
        raw: &RawReference,
        body: impl FnOnce(&Session<'_>, &ReferenceTree) -> Outcome,
    ) -> Resolution {
        let parse_options = ParseOptions {
            ref_readonly_parameters: self.table.capability(Capability::RefReadonlyParameters),
        };
        let parsed = parse_reference(&raw.text, parse_options);
        let outcome = parsed.tree.as_ref().map(|tree| {
            let session = Session::new(self, raw, tree);
            body(&session, tree)
        });

        if let Some(error) = parsed.first_error() {
            let span = error.span();
            let message = error.to_string();
            tracing::debug!(%message, salvaged = outcome.is_some(), "syntax error");
            return Resolution {
                diagnostics: vec![CrefDiagnostic::BadSyntax {
                    text: raw.text.clone(),
                    message: message.clone(),
                    span: span.into(),
                }],
                result: ResolutionResult::SyntaxError {
                    span,
                    message,
                    salvaged: outcome.map(|salvaged| Box::new(salvaged.result)),
                },
            };
        }

        let Some(finished) = outcome else {
            // A parse without errors always has a tree.
            return unresolved(raw, Span::new(0, raw.text.len() as u32), UnresolvedReason::NotFound);
        };
        tracing::debug!(result = ?finished.result, "resolved");
        finished.into_resolution()
    }
}

/// A terminal result with its diagnostics, primary first
struct Outcome {
    result: ResolutionResult,
    diagnostics: Vec<CrefDiagnostic>,
}

impl Outcome {
    fn into_resolution(self) -> Resolution {
        Resolution {
            result: self.result,
            diagnostics: self.diagnostics,
        }
    }
}

fn unresolved(raw: &RawReference, span: Span, reason: UnresolvedReason) -> Resolution {
    Resolution {
        result: ResolutionResult::Unresolved(reason),
        diagnostics: vec![CrefDiagnostic::Unresolved {
            text: span.slice(&raw.text).to_string(),
            span: span.into(),
        }],
    }
}

/// Per-call state: the raw reference and its binder
struct Session<'res> {
    table: &'res dyn SymbolTable,
    options: ResolverOptions,
    raw: &'res RawReference,
    binder: Binder<'res>,
}

impl<'res> Session<'res> {
    fn new(resolver: &Resolver<'res>, raw: &'res RawReference, tree: &ReferenceTree) -> Self {
        let table = resolver.table;
        let scopes = ScopeChain::at(table, raw.anchor, raw.imports, &resolver.options);
        tracing::trace!(levels = scopes.depth(), "scope chain");
        let placeholders = PlaceholderTable::declare_all(tree);
        Self {
            table,
            options: resolver.options,
            raw,
            binder: Binder::new(table, raw.imports, scopes, placeholders),
        }
    }

    fn text(&self, span: Span) -> String {
        span.slice(&self.raw.text).to_string()
    }

    fn resolve_tree(&self, tree: &ReferenceTree) -> Outcome {
        let member = tree.as_member();
        let whole = tree.span();
        let report_span = if member.is_dotted() {
            member.member_span()
        } else {
            whole
        };
        let fail = |reason: UnresolvedReason, secondary: Vec<CrefDiagnostic>| {
            let mut diagnostics = vec![CrefDiagnostic::Unresolved {
                text: self.text(report_span),
                span: report_span.into(),
            }];
            diagnostics.extend(secondary);
            Outcome {
                result: ResolutionResult::Unresolved(reason),
                diagnostics,
            }
        };

        let qualifier = match &member.qualifier {
            Some(path) => match self.binder.resolve_path(path, Some(0)) {
                Ok(value) => Some(value),
                Err(reason) => return fail(reason, Vec::new()),
            },
            None => None,
        };

        // Signature types bind before lookup so that a bad type is always reported.
        let mut secondary = Vec::new();
        let mut first_failure = None;
        let signature = member.parameters.as_ref().map(|list| {
            let mut parameters = Vec::with_capacity(list.parameters.len());
            for (index, parameter) in list.parameters.iter().enumerate() {
                match self.binder.bind_type(&parameter.ty) {
                    Ok(ty) => parameters.push((parameter.ref_kind, ty)),
                    Err(reason) => {
                        tracing::trace!(index, %reason, "invalid parameter type");
                        if first_failure.is_none() {
                            first_failure = Some(UnresolvedReason::InvalidParameterType { index });
                        }
                        let span = parameter.ty.span();
                        secondary.push(CrefDiagnostic::InvalidParameterType {
                            position: index + 1,
                            text: self.text(span),
                            span: span.into(),
                        });
                    }
                }
            }
            Signature { parameters }
        });
        let return_type = match &member.member {
            MemberName::Conversion { target, .. } => match self.binder.bind_type(target) {
                Ok(ty) => Some(ty),
                Err(reason) => {
                    tracing::trace!(%reason, "invalid return type");
                    if first_failure.is_none() {
                        first_failure = Some(UnresolvedReason::InvalidReturnType);
                    }
                    let span = target.span();
                    secondary.push(CrefDiagnostic::InvalidReturnType {
                        text: self.text(span),
                        span: span.into(),
                    });
                    None
                }
            },
            MemberName::Named(_) | MemberName::Indexer { .. } | MemberName::Operator { .. } => None,
        };
        if let Some(reason) = first_failure {
            return fail(reason, secondary);
        }

        let mut candidates = match self.candidates(tree, &member, qualifier.as_ref()) {
            Ok(candidates) => candidates,
            Err(reason) => return fail(reason, Vec::new()),
        };
        if signature.is_some() && candidates.iter().any(|candidate| self.is_type(candidate.def)) {
            candidates = self.constructors_of(candidates);
            if candidates.is_empty() {
                return fail(UnresolvedReason::NoConstructor, Vec::new());
            }
        }
        if let Some(target) = &return_type {
            candidates = overload::filter_by_return(self.table, candidates, target);
            if candidates.is_empty() {
                return fail(UnresolvedReason::NoMatchingSignature, Vec::new());
            }
        }

        let selection = match &signature {
            Some(signature) => overload::select_by_signature(self.table, candidates, signature),
            None => overload::select_by_name(self.table, candidates),
        };
        match selection {
            Selection::Empty => fail(UnresolvedReason::NoMatchingSignature, Vec::new()),
            Selection::Single(symbol) => self.resolved(symbol, whole),
            Selection::Ambiguous {
                candidates,
                best,
                kind,
            } => {
                let best_symbol = candidates[best].clone();
                let other = candidates
                    .iter()
                    .enumerate()
                    .find(|(position, _)| *position != best)
                    .map(|(_, candidate)| display::display(self.table, candidate.def))
                    .unwrap_or_default();
                let best_text = display::display(self.table, best_symbol.def);
                tracing::debug!(count = candidates.len(), %kind, "ambiguous");
                Outcome {
                    diagnostics: vec![CrefDiagnostic::Ambiguous {
                        text: self.text(whole),
                        best: best_text,
                        other,
                        span: whole.into(),
                    }],
                    result: ResolutionResult::Ambiguous {
                        candidates: candidates.iter().map(|candidate| candidate.def).collect(),
                        best: Target::Symbol(best_symbol),
                        kind,
                    },
                }
            }
        }
    }

    fn resolved(&self, symbol: SymbolRef, whole: Span) -> Outcome {
        let diagnostics = if matches!(
            self.table.symbol(symbol.def).kind,
            SymbolKind::TypeParameter { .. }
        ) {
            vec![CrefDiagnostic::TypeVariable {
                text: self.text(whole),
                span: whole.into(),
            }]
        } else {
            Vec::new()
        };
        Outcome {
            result: ResolutionResult::Resolved(Target::Symbol(symbol)),
            diagnostics,
        }
    }

    fn is_type(&self, symbol: SymbolId) -> bool {
        self.table.symbol(symbol).kind.is_type()
    }

    /// Same-named declarations for the member name, with their type arguments
    fn candidates(
        &self,
        tree: &ReferenceTree,
        member: &MemberReference,
        qualifier: Option<&PathValue>,
    ) -> Result<Vec<SymbolRef>, UnresolvedReason> {
        let container = qualifier
            .map(|value| value.container(self.table).ok_or(UnresolvedReason::NotAContainer))
            .transpose()?;
        let parameter_count = member
            .parameters
            .as_ref()
            .map(|list| list.parameters.len());

        let (name, arity, own_args) = match &member.member {
            MemberName::Named(segment) => {
                let list = declaring_list_index(tree, segment);
                let own_args = self.binder.segment_args(segment, list)?;
                if let SegmentName::Predefined { ty, .. } = &segment.name {
                    let def = self
                        .table
                        .special_type(*ty)
                        .ok_or(UnresolvedReason::NotFound)?;
                    return Ok(vec![SymbolRef {
                        def,
                        type_arguments: own_args,
                    }]);
                }
                if let (Some(value), Some(container)) = (qualifier, container)
                    && value.is_type(self.table)
                    && segment.type_arguments.is_none()
                    && self.table.name(value.symbol.def) == segment.name.text()
                {
                    return self.constructors_by_name(value, container);
                }
                let arity = segment.arity().map_or(Arity::Omitted, Arity::Exact);
                (segment.name.text(), arity, own_args)
            }
            MemberName::Indexer { .. } => (INDEXER_NAME, Arity::Omitted, Vec::new()),
            MemberName::Operator { operator, .. } => {
                (operator.member_name(parameter_count), Arity::Omitted, Vec::new())
            }
            MemberName::Conversion { kind, .. } => (kind.member_name(), Arity::Omitted, Vec::new()),
        };

        let found = match container {
            Some(container) => self
                .table
                .lookup(LookupScope::Members(container), name, arity),
            None => {
                let visible = self.binder.lookup_unqualified(name, arity);
                if visible.is_empty() && self.standalone(member) {
                    tracing::trace!(name, "standalone generic type lookup");
                    self.binder.lookup_unqualified_types(name, Arity::Any)
                } else {
                    visible
                }
            }
        };
        if found.is_empty() {
            return Err(UnresolvedReason::NotFound);
        }

        let context = qualifier.filter(|value| value.is_type(self.table));
        Ok(self.with_arguments(&found, context, &own_args))
    }

    /// Whether a bare name may find a generic type without its `{...}`
    fn standalone(&self, member: &MemberReference) -> bool {
        self.options.standalone_generic_types
            && member.qualifier.is_none()
            && member.parameters.is_none()
            && matches!(
                &member.member,
                MemberName::Named(Segment {
                    type_arguments: None,
                    ..
                })
            )
    }

    /// Give each candidate the type arguments of the type it was found in, then its own
    fn with_arguments(
        &self,
        found: &CandidateSet,
        context: Option<&PathValue>,
        own_args: &[TypeExpr],
    ) -> Vec<SymbolRef> {
        found
            .iter()
            .map(|def| {
                let mut type_arguments = match context {
                    Some(value) => value.symbol.type_arguments.clone(),
                    None => self.binder.outer_identity(def),
                };
                type_arguments.extend_from_slice(own_args);
                SymbolRef {
                    def,
                    type_arguments,
                }
            })
            .collect()
    }

    /// `C.C`: the instance constructors of `C`
    fn constructors_by_name(
        &self,
        value: &PathValue,
        container: ContainerRef,
    ) -> Result<Vec<SymbolRef>, UnresolvedReason> {
        let found = self.table.lookup(
            LookupScope::Members(container),
            CONSTRUCTOR_NAME,
            Arity::Omitted,
        );
        if found.is_empty() {
            return Err(UnresolvedReason::NoConstructor);
        }
        Ok(self.with_arguments(&found, Some(value), &[]))
    }

    /// Replace every type among the candidates with its instance constructors
    fn constructors_of(&self, candidates: Vec<SymbolRef>) -> Vec<SymbolRef> {
        candidates
            .into_iter()
            .flat_map(|candidate| {
                if !self.is_type(candidate.def) {
                    return vec![candidate];
                }
                self.table
                    .lookup(
                        LookupScope::Members(ContainerRef::unfiltered(candidate.def)),
                        CONSTRUCTOR_NAME,
                        Arity::Omitted,
                    )
                    .iter()
                    .map(|ctor| SymbolRef {
                        def: ctor,
                        type_arguments: candidate.type_arguments.clone(),
                    })
                    .collect()
            })
            .collect()
    }

    fn resolve_part(&self, tree: &ReferenceTree, part: ReferencePart) -> Outcome {
        let member = tree.as_member();
        let located = match part {
            ReferencePart::Qualifier => member.qualifier.as_ref().map(|path| {
                (
                    path.span,
                    self.binder
                        .resolve_path(path, Some(0))
                        .map(|value| Target::Symbol(value.symbol)),
                )
            }),
            ReferencePart::Parameter(index) => tree
                .parameters()
                .and_then(|list| list.parameters.get(index))
                .map(|parameter| {
                    (
                        parameter.ty.span(),
                        self.binder.bind_type(&parameter.ty).map(Target::from_type),
                    )
                }),
            ReferencePart::ReturnType => match &member.member {
                MemberName::Conversion { target, .. } => Some((
                    target.span(),
                    self.binder.bind_type(target).map(Target::from_type),
                )),
                MemberName::Named(_) | MemberName::Indexer { .. } | MemberName::Operator { .. } => {
                    None
                }
            },
            ReferencePart::TypeArgument { segment, index } => {
                let segments = tree.segments();
                segments
                    .get(segment)
                    .and_then(|found| {
                        let arguments = found.type_arguments.as_ref()?;
                        Some((*found, arguments.arguments.get(index)?))
                    })
                    .map(|(found, argument)| match argument {
                        TypeArgument::Placeholder(ident) => (
                            ident.span,
                            declaring_list_index(tree, found)
                                .and_then(|list| self.binder.placeholders().at(list, index as u32))
                                .map(Target::Type)
                                .ok_or(UnresolvedReason::NotFound),
                        ),
                        TypeArgument::Type(ty) => {
                            (ty.span(), self.binder.bind_type(ty).map(Target::from_type))
                        }
                    })
            }
        };
        let (span, bound) =
            located.unwrap_or_else(|| (tree.span(), Err(UnresolvedReason::NoSuchPart)));

        match bound {
            Ok(target) => Outcome {
                result: ResolutionResult::Resolved(target),
                diagnostics: Vec::new(),
            },
            Err(reason) => Outcome {
                result: ResolutionResult::Unresolved(reason),
                diagnostics: vec![CrefDiagnostic::Unresolved {
                    text: self.text(span),
                    span: span.into(),
                }],
            },
        }
    }
}

/// The declaring-list number of a segment's `{...}`, counting lists in textual order
fn declaring_list_index(tree: &ReferenceTree, segment: &Segment) -> Option<u32> {
    segment.type_arguments.as_ref()?;
    let segments = tree.segments();
    let position = segments
        .iter()
        .position(|candidate| candidate.span == segment.span)?;
    let before = segments[..position]
        .iter()
        .filter(|earlier| earlier.type_arguments.is_some())
        .count();
    Some(before as u32)
}
