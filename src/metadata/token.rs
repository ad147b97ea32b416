//! Arena indices for the metadata graph and their ECMA-335 token form.
//!
//! Tables of the in-memory graph are plain vectors. Entries are addressed by typed indices so
//! that a reference into the type definition table can never be confused with a reference into
//! the type reference table. For diagnostics every index can be rendered as the metadata
//! token it corresponds to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the 1-based row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub u32);

impl Token {
    /// Creates a token from a table id and a 0-based arena index
    #[must_use]
    pub fn from_index(table: u8, index: usize) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let row = (index as u32).wrapping_add(1) & 0x00FF_FFFF;
        Token((u32::from(table) << 24) | row)
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $table:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// Metadata table this index points into
            pub const TABLE: u8 = $table;

            /// The metadata token equivalent of this index
            #[must_use]
            pub fn token(self) -> Token {
                Token::from_index(Self::TABLE, self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.token(), f)
            }
        }
    };
}

arena_id!(
    /// Index into [`crate::metadata::module::ModuleDef::types`]
    TypeDefId,
    0x02
);
arena_id!(
    /// Index into [`crate::metadata::module::References::type_refs`]
    TypeRefId,
    0x01
);
arena_id!(
    /// Index into [`crate::metadata::module::References::member_refs`]
    MemberRefId,
    0x0A
);
arena_id!(
    /// Index into [`crate::metadata::module::References::method_specs`]
    MethodSpecId,
    0x2B
);
arena_id!(
    /// Index into [`crate::metadata::module::References::assembly_refs`]
    AssemblyRefId,
    0x23
);

/// A `TypeDefOrRef` coded reference as it appears inside signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeToken {
    /// A type defined in this module
    Def(TypeDefId),
    /// A type defined elsewhere, resolved through an assembly reference
    Ref(TypeRefId),
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeToken::Def(id) => fmt::Display::fmt(id, f),
            TypeToken::Ref(id) => fmt::Display::fmt(id, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_index() {
        let token = TypeDefId(0).token();
        assert_eq!(token.0, 0x02000001);
        assert_eq!(token.table(), 0x02);
        assert_eq!(token.row(), 1);
    }

    #[test]
    fn test_token_display() {
        assert_eq!(MemberRefId(4).to_string(), "0x0a000005");
        assert_eq!(TypeToken::Ref(TypeRefId(1)).to_string(), "0x01000002");
    }
}
