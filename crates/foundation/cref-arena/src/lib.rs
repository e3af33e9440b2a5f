//! Indexed arena storage for declarations and placeholders
//!
//! This is a re-export of `la-arena`: the program model allocates every declaration in
//! one arena and hands out `Idx` handles, and each resolution call owns a private arena
//! of type-parameter placeholders.

pub use la_arena::{Arena, ArenaMap, Idx, RawIdx};

/// The raw position of a handle, used wherever a stable total order is needed
pub fn ordinal<T>(idx: Idx<T>) -> u32 {
    u32::from(idx.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_follows_allocation_order() {
        let mut arena: Arena<&str> = Arena::new();
        let first = arena.alloc("first");
        let second = arena.alloc("second");
        assert!(ordinal(first) < ordinal(second));
        assert_eq!(arena[second], "second");
    }
}
