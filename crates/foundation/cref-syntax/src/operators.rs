//! Special member names
//!
//! Operators, conversions, indexers and constructors are spelled with dedicated syntax in
//! reference text but stored under canonical member names in the program model. This
//! module is the single translation table between the two.

use derive_more::Display;

/// Canonical name of instance constructors
pub const CONSTRUCTOR_NAME: &str = ".ctor";

/// Canonical name of static constructors
pub const STATIC_CONSTRUCTOR_NAME: &str = ".cctor";

/// Canonical name of destructors
pub const DESTRUCTOR_NAME: &str = "Finalize";

/// Canonical name of indexers
///
/// Deliberately not a valid identifier, so the plain name `Item` never finds an indexer.
pub const INDEXER_NAME: &str = "this[]";

/// `implicit` or `explicit` conversion operator
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub enum ConversionKind {
    /// `implicit operator T`
    #[display("implicit")]
    Implicit,
    /// `explicit operator T`
    #[display("explicit")]
    Explicit,
}

impl ConversionKind {
    /// Canonical member name of conversions of this kind
    pub fn member_name(self) -> &'static str {
        match self {
            Self::Implicit => "op_Implicit",
            Self::Explicit => "op_Explicit",
        }
    }

    /// The conversion kind stored under `name`, if any
    pub fn from_member_name(name: &str) -> Option<Self> {
        match name {
            "op_Implicit" => Some(Self::Implicit),
            "op_Explicit" => Some(Self::Explicit),
            _ => None,
        }
    }
}

/// An operator token that can be overloaded
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub enum OverloadableOperator {
    /// `+`
    #[display("+")]
    Plus,
    /// `-`
    #[display("-")]
    Minus,
    /// `!`
    #[display("!")]
    Not,
    /// `~`
    #[display("~")]
    Complement,
    /// `++`
    #[display("++")]
    Increment,
    /// `--`
    #[display("--")]
    Decrement,
    /// `true`
    #[display("true")]
    True,
    /// `false`
    #[display("false")]
    False,
    /// `*`
    #[display("*")]
    Multiply,
    /// `/`
    #[display("/")]
    Divide,
    /// `%`
    #[display("%")]
    Modulo,
    /// `&`
    #[display("&")]
    BitwiseAnd,
    /// `|`
    #[display("|")]
    BitwiseOr,
    /// `^`
    #[display("^")]
    ExclusiveOr,
    /// `<<`
    #[display("<<")]
    LeftShift,
    /// `>>`
    #[display(">>")]
    RightShift,
    /// `>>>`
    #[display(">>>")]
    UnsignedRightShift,
    /// `==`
    #[display("==")]
    Equality,
    /// `!=`
    #[display("!=")]
    Inequality,
    /// `<`
    #[display("<")]
    LessThan,
    /// `>`
    #[display(">")]
    GreaterThan,
    /// `<=`
    #[display("<=")]
    LessThanOrEqual,
    /// `>=`
    #[display(">=")]
    GreaterThanOrEqual,
}

impl OverloadableOperator {
    /// Every overloadable operator
    pub const ALL: [Self; 23] = [
        Self::Plus,
        Self::Minus,
        Self::Not,
        Self::Complement,
        Self::Increment,
        Self::Decrement,
        Self::True,
        Self::False,
        Self::Multiply,
        Self::Divide,
        Self::Modulo,
        Self::BitwiseAnd,
        Self::BitwiseOr,
        Self::ExclusiveOr,
        Self::LeftShift,
        Self::RightShift,
        Self::UnsignedRightShift,
        Self::Equality,
        Self::Inequality,
        Self::LessThan,
        Self::GreaterThan,
        Self::LessThanOrEqual,
        Self::GreaterThanOrEqual,
    ];

    /// Look up the operator spelled by `token`, after `{`/`}` have been read as `<`/`>`
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.token() == token)
    }

    /// The operator as it is written
    pub fn token(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Not => "!",
            Self::Complement => "~",
            Self::Increment => "++",
            Self::Decrement => "--",
            Self::True => "true",
            Self::False => "false",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::BitwiseAnd => "&",
            Self::BitwiseOr => "|",
            Self::ExclusiveOr => "^",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
            Self::UnsignedRightShift => ">>>",
            Self::Equality => "==",
            Self::Inequality => "!=",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThanOrEqual => ">=",
        }
    }

    /// Canonical name of the unary form, if the operator has one
    pub fn unary_name(self) -> Option<&'static str> {
        match self {
            Self::Plus => Some("op_UnaryPlus"),
            Self::Minus => Some("op_UnaryNegation"),
            Self::Not => Some("op_LogicalNot"),
            Self::Complement => Some("op_OnesComplement"),
            Self::Increment => Some("op_Increment"),
            Self::Decrement => Some("op_Decrement"),
            Self::True => Some("op_True"),
            Self::False => Some("op_False"),
            _ => None,
        }
    }

    /// Canonical name of the binary form, if the operator has one
    pub fn binary_name(self) -> Option<&'static str> {
        match self {
            Self::Plus => Some("op_Addition"),
            Self::Minus => Some("op_Subtraction"),
            Self::Multiply => Some("op_Multiply"),
            Self::Divide => Some("op_Division"),
            Self::Modulo => Some("op_Modulus"),
            Self::BitwiseAnd => Some("op_BitwiseAnd"),
            Self::BitwiseOr => Some("op_BitwiseOr"),
            Self::ExclusiveOr => Some("op_ExclusiveOr"),
            Self::LeftShift => Some("op_LeftShift"),
            Self::RightShift => Some("op_RightShift"),
            Self::UnsignedRightShift => Some("op_UnsignedRightShift"),
            Self::Equality => Some("op_Equality"),
            Self::Inequality => Some("op_Inequality"),
            Self::LessThan => Some("op_LessThan"),
            Self::GreaterThan => Some("op_GreaterThan"),
            Self::LessThanOrEqual => Some("op_LessThanOrEqual"),
            Self::GreaterThanOrEqual => Some("op_GreaterThanOrEqual"),
            _ => None,
        }
    }

    /// The member name a reference to this operator looks up
    ///
    /// One parameter selects the unary form; any other count, or no parameter list at
    /// all, selects the binary form. Either falls back to the other form when the
    /// operator only has one.
    pub fn member_name(self, parameter_count: Option<usize>) -> &'static str {
        let (preferred, fallback) = if parameter_count == Some(1) {
            (self.unary_name(), self.binary_name())
        } else {
            (self.binary_name(), self.unary_name())
        };
        preferred.or(fallback).unwrap_or_default()
    }

    /// The operator stored under the canonical member name `name`
    pub fn from_member_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.unary_name() == Some(name) || op.binary_name() == Some(name))
    }
}
