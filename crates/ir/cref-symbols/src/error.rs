//! Errors raised while building a program model

use thiserror::Error;

/// A declaration that could not be added
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Type text that does not follow the signature type syntax
    #[error("malformed type `{text}`")]
    MalformedType {
        /// The text as given
        text: String,
    },

    /// A type name that names no declared type or type parameter
    #[error("cannot find type `{name}` from `{context}`")]
    UnknownType {
        /// The name as given
        name: String,
        /// The declaration being built
        context: String,
    },

    /// A predefined keyword used before the platform types were declared
    #[error("platform type `{keyword}` has not been declared")]
    MissingPlatformType {
        /// The keyword
        keyword: &'static str,
    },
}
