//! Reserved words

use crate::PredefinedType;

const RESERVED: &[&str] = &[
    "abstract",
    "as",
    "base",
    "break",
    "case",
    "catch",
    "checked",
    "class",
    "const",
    "continue",
    "default",
    "delegate",
    "do",
    "else",
    "enum",
    "event",
    "explicit",
    "extern",
    "false",
    "finally",
    "fixed",
    "for",
    "foreach",
    "goto",
    "if",
    "implicit",
    "in",
    "interface",
    "internal",
    "is",
    "lock",
    "namespace",
    "new",
    "null",
    "operator",
    "out",
    "override",
    "params",
    "private",
    "protected",
    "public",
    "readonly",
    "ref",
    "return",
    "sealed",
    "sizeof",
    "stackalloc",
    "static",
    "struct",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "unchecked",
    "unsafe",
    "using",
    "virtual",
    "volatile",
    "while",
];

/// Whether `word` is reserved and can only be used as an identifier when written
/// verbatim (`@class`)
///
/// Predefined type keywords count as reserved.
pub fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word) || PredefinedType::from_keyword(word).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved("class"));
        assert!(is_reserved("int"));
        assert!(is_reserved("this"));
        assert!(!is_reserved("dynamic"));
        assert!(!is_reserved("Class"));
    }
}
