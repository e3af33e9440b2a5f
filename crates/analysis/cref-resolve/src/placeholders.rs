//! Type parameters declared by the reference text
//!
//! `List{T}.Add(T)` declares a placeholder `T` in its first `{...}` list; the `T` inside
//! the parameter list refers back to it. Each resolution builds its own table, so
//! placeholders never leak between references.

use cref_arena::{Arena, Idx};
use cref_symbols::{Placeholder, TypeExpr};
use cref_syntax::{ReferenceTree, TypeArgument};
use rustc_hash::FxHashMap;

/// The placeholders of one reference
#[derive(Debug, Default)]
pub(crate) struct PlaceholderTable {
    arena: Arena<Placeholder>,
    by_name: FxHashMap<String, Idx<Placeholder>>,
    by_position: FxHashMap<(u32, u32), Idx<Placeholder>>,
}

impl PlaceholderTable {
    /// Declare every placeholder in the tree's declaring lists
    ///
    /// Arguments recovered as ordinary types (`List{int}`) declare nothing, but still
    /// occupy their position.
    pub(crate) fn declare_all(tree: &ReferenceTree) -> Self {
        let mut table = Self::default();
        for (list, arguments) in tree.declaring_lists().into_iter().enumerate() {
            let arity = arguments.arguments.len() as u32;
            for (ordinal, argument) in arguments.arguments.iter().enumerate() {
                if let TypeArgument::Placeholder(ident) = argument {
                    table.declare(&ident.text, list as u32, ordinal as u32, arity);
                }
            }
        }
        tracing::trace!(declared = table.arena.len(), "placeholders");
        table
    }

    /// Declare one placeholder; a later declaration of the same name wins name lookups
    pub(crate) fn declare(&mut self, name: &str, list: u32, ordinal: u32, arity: u32) {
        let idx = self.arena.alloc(Placeholder {
            name: name.to_string(),
            list,
            ordinal,
            arity,
        });
        self.by_name.insert(name.to_string(), idx);
        self.by_position.insert((list, ordinal), idx);
    }

    /// The placeholder a bare name in a parameter or type argument refers to
    pub(crate) fn by_name(&self, name: &str) -> Option<TypeExpr> {
        self.by_name
            .get(name)
            .map(|idx| TypeExpr::Placeholder(self.arena[*idx].clone()))
    }

    /// The placeholder a position of a declaring list binds to
    ///
    /// A name repeated within the reference binds every one of its positions to the same
    /// instance, the one `by_name` finds.
    pub(crate) fn at(&self, list: u32, ordinal: u32) -> Option<TypeExpr> {
        let idx = self.by_position.get(&(list, ordinal))?;
        self.by_name(&self.arena[*idx].name)
    }

    /// Whether `name` is a declared placeholder
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }
}
