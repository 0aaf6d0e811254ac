//! One-byte type tags.

use std::fmt;

use crate::error::AetherError;

/// The wire tag that opens every encoded value.
///
/// Booleans have no payload byte: `true` and `false` are distinct tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Null = 0,
    Int8 = 1,
    Int16 = 2,
    Int32 = 3,
    Int64 = 4,
    UInt8 = 5,
    UInt16 = 6,
    UInt32 = 7,
    UInt64 = 8,
    Float32 = 9,
    Float64 = 10,
    True = 11,
    False = 12,
    String = 13,
    Bytes = 14,
    Dict = 15,
    List = 16,
}

impl Tag {
    /// Every tag, in wire-code order.
    pub const ALL: [Tag; 17] = [
        Tag::Null,
        Tag::Int8,
        Tag::Int16,
        Tag::Int32,
        Tag::Int64,
        Tag::UInt8,
        Tag::UInt16,
        Tag::UInt32,
        Tag::UInt64,
        Tag::Float32,
        Tag::Float64,
        Tag::True,
        Tag::False,
        Tag::String,
        Tag::Bytes,
        Tag::Dict,
        Tag::List,
    ];

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Number of payload bytes after the tag for fixed-width kinds.
    ///
    /// Returns `None` for the size-prefixed kinds (string, bytes, dict, list).
    pub const fn payload_width(self) -> Option<usize> {
        match self {
            Tag::Null | Tag::True | Tag::False => Some(0),
            Tag::Int8 | Tag::UInt8 => Some(1),
            Tag::Int16 | Tag::UInt16 => Some(2),
            Tag::Int32 | Tag::UInt32 | Tag::Float32 => Some(4),
            Tag::Int64 | Tag::UInt64 | Tag::Float64 => Some(8),
            Tag::String | Tag::Bytes | Tag::Dict | Tag::List => None,
        }
    }

    /// Returns `true` if a varint size follows the tag.
    pub const fn is_sized(self) -> bool {
        self.payload_width().is_none()
    }

    /// Lowercase kind name, as used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Tag::Null => "null",
            Tag::Int8 => "int8",
            Tag::Int16 => "int16",
            Tag::Int32 => "int32",
            Tag::Int64 => "int64",
            Tag::UInt8 => "uint8",
            Tag::UInt16 => "uint16",
            Tag::UInt32 => "uint32",
            Tag::UInt64 => "uint64",
            Tag::Float32 => "float32",
            Tag::Float64 => "float64",
            Tag::True => "true",
            Tag::False => "false",
            Tag::String => "string",
            Tag::Bytes => "bytes",
            Tag::Dict => "dict",
            Tag::List => "list",
        }
    }
}

impl TryFrom<u8> for Tag {
    type Error = AetherError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Tag::ALL
            .get(usize::from(byte))
            .copied()
            .ok_or_else(|| AetherError::Format(format!("unknown type tag: 0x{byte:02X}")))
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> Self {
        tag.as_u8()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
