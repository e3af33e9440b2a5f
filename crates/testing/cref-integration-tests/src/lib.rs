//! End-to-end test utilities for the reference resolver
//!
//! A [`Fixture`] owns a program model and resolves reference text against declarations
//! addressed by dotted path, so suites can describe a program once and check many
//! references against it.

use anyhow::{Context as _, Result};
use cref_resolve::{
    RawReference, Resolution, ResolutionResult, Resolver, ResolverOptions, display_target,
};
use cref_symbols::{ImportScopeId, ProgramModel, SymbolId, SymbolTable as _};
use expect_test::Expect;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber filtered by `RUST_LOG`, once per test binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// A program under test
pub struct Fixture {
    program: ProgramModel,
    options: ResolverOptions,
}

impl Fixture {
    /// Wrap a finished program, with default resolver options
    pub fn new(program: ProgramModel) -> Self {
        init_tracing();
        Self {
            program,
            options: ResolverOptions::default(),
        }
    }

    /// Resolve with these options instead
    #[must_use]
    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// The program
    pub fn program(&self) -> &ProgramModel {
        &self.program
    }

    /// A resolver over the program
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::with_options(&self.program, self.options)
    }

    /// The declaration at a dotted path; the empty path is the global namespace
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is declared at `path`.
    pub fn symbol(&self, path: &str) -> Result<SymbolId> {
        if path.is_empty() {
            return Ok(self.program.global_namespace());
        }
        self.program
            .find(path)
            .with_context(|| format!("no declaration at `{path}`"))
    }

    /// Resolve `text` as written in the documentation of `anchor`
    ///
    /// # Errors
    ///
    /// Returns an error if `anchor` names no declaration.
    pub fn resolve(&self, anchor: &str, text: &str) -> Result<Resolution> {
        let anchor = self.symbol(anchor)?;
        Ok(self
            .resolver()
            .resolve(&RawReference::new(text, anchor)))
    }

    /// Resolve `text` with an import scope in effect
    ///
    /// # Errors
    ///
    /// Returns an error if `anchor` names no declaration.
    pub fn resolve_with_imports(
        &self,
        anchor: &str,
        imports: ImportScopeId,
        text: &str,
    ) -> Result<Resolution> {
        let raw = RawReference::new(text, self.symbol(anchor)?).with_imports(imports);
        Ok(self.resolver().resolve(&raw))
    }

    /// Resolve and compare the summary with a snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if `anchor` names no declaration.
    pub fn check(&self, anchor: &str, text: &str, expect: &Expect) -> Result<()> {
        let resolution = self.resolve(anchor, text)?;
        expect.assert_eq(&self.summarize(&resolution));
        Ok(())
    }

    /// One line for the result, then one per diagnostic
    pub fn summarize(&self, resolution: &Resolution) -> String {
        let mut out = self.describe(&resolution.result);
        for diagnostic in &resolution.diagnostics {
            let report = diagnostic.report();
            out.push_str(&format!(
                "\n{} @ {}..{}: {}",
                report.code, report.start, report.end, report.message
            ));
        }
        out
    }

    /// A one-line description of a result
    pub fn describe(&self, result: &ResolutionResult) -> String {
        match result {
            ResolutionResult::Resolved(target) => {
                format!("resolved {}", display_target(&self.program, target))
            }
            ResolutionResult::Ambiguous {
                candidates,
                best,
                kind,
            } => format!(
                "ambiguous ({kind}) among {}, assuming {}",
                candidates.len(),
                display_target(&self.program, best)
            ),
            ResolutionResult::Unresolved(reason) => format!("unresolved: {reason}"),
            ResolutionResult::SyntaxError {
                span,
                message,
                salvaged,
            } => {
                let mut out = format!("syntax error @ {}..{}: {message}", span.start, span.end);
                if let Some(inner) = salvaged {
                    out.push_str("; salvaged ");
                    out.push_str(&self.describe(inner));
                }
                out
            }
        }
    }
}
