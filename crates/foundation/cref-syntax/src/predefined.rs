//! Predefined type keywords

use derive_more::Display;

/// A built-in type spelled with a keyword
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub enum PredefinedType {
    /// `bool`
    #[display("bool")]
    Bool,
    /// `byte`
    #[display("byte")]
    Byte,
    /// `sbyte`
    #[display("sbyte")]
    SByte,
    /// `short`
    #[display("short")]
    Short,
    /// `ushort`
    #[display("ushort")]
    UShort,
    /// `int`
    #[display("int")]
    Int,
    /// `uint`
    #[display("uint")]
    UInt,
    /// `long`
    #[display("long")]
    Long,
    /// `ulong`
    #[display("ulong")]
    ULong,
    /// `nint`
    #[display("nint")]
    NInt,
    /// `nuint`
    #[display("nuint")]
    NUInt,
    /// `char`
    #[display("char")]
    Char,
    /// `float`
    #[display("float")]
    Float,
    /// `double`
    #[display("double")]
    Double,
    /// `decimal`
    #[display("decimal")]
    Decimal,
    /// `string`
    #[display("string")]
    String,
    /// `object`
    #[display("object")]
    Object,
    /// `void`
    #[display("void")]
    Void,
}

impl PredefinedType {
    /// Every predefined type, in keyword-table order
    pub const ALL: [Self; 18] = [
        Self::Bool,
        Self::Byte,
        Self::SByte,
        Self::Short,
        Self::UShort,
        Self::Int,
        Self::UInt,
        Self::Long,
        Self::ULong,
        Self::NInt,
        Self::NUInt,
        Self::Char,
        Self::Float,
        Self::Double,
        Self::Decimal,
        Self::String,
        Self::Object,
        Self::Void,
    ];

    /// Look up the predefined type spelled by `keyword`
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|predefined| predefined.keyword() == keyword)
    }

    /// The keyword spelling
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::SByte => "sbyte",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::NInt => "nint",
            Self::NUInt => "nuint",
            Self::Char => "char",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Object => "object",
            Self::Void => "void",
        }
    }

    /// The simple name of the platform type, inside the `System` namespace
    pub fn metadata_name(self) -> &'static str {
        match self {
            Self::Bool => "Boolean",
            Self::Byte => "Byte",
            Self::SByte => "SByte",
            Self::Short => "Int16",
            Self::UShort => "UInt16",
            Self::Int => "Int32",
            Self::UInt => "UInt32",
            Self::Long => "Int64",
            Self::ULong => "UInt64",
            Self::NInt => "IntPtr",
            Self::NUInt => "UIntPtr",
            Self::Char => "Char",
            Self::Float => "Single",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::String => "String",
            Self::Object => "Object",
            Self::Void => "Void",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for predefined in PredefinedType::ALL {
            assert_eq!(
                PredefinedType::from_keyword(predefined.keyword()),
                Some(predefined)
            );
            assert_eq!(predefined.to_string(), predefined.keyword());
        }
    }

    #[test]
    fn test_non_keywords_are_rejected() {
        assert_eq!(PredefinedType::from_keyword("Int32"), None);
        assert_eq!(PredefinedType::from_keyword("dynamic"), None);
    }
}
