//! Aether value types.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::codec::Tag;
use crate::error::{AetherError, Result};

/// Type alias for Aether dictionaries.
///
/// Keys may be any value. Iteration follows insertion order, which is also
/// the order pairs are written in.
pub type Dict = IndexMap<Value, Value>;

/// A self-describing value: one variant per wire kind.
///
/// Equality and hashing compare floats by bit pattern, so NaN payloads are
/// equal to themselves and `0.0` differs from `-0.0`. This makes every value
/// usable as a dictionary key and lets decoded floats be checked exactly.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Dict(Dict),
}

impl Value {
    /// The tag this value is written with.
    pub fn tag(&self) -> Tag {
        match self {
            Self::Null => Tag::Null,
            Self::Int8(_) => Tag::Int8,
            Self::Int16(_) => Tag::Int16,
            Self::Int32(_) => Tag::Int32,
            Self::Int64(_) => Tag::Int64,
            Self::UInt8(_) => Tag::UInt8,
            Self::UInt16(_) => Tag::UInt16,
            Self::UInt32(_) => Tag::UInt32,
            Self::UInt64(_) => Tag::UInt64,
            Self::Float32(_) => Tag::Float32,
            Self::Float64(_) => Tag::Float64,
            Self::Bool(true) => Tag::True,
            Self::Bool(false) => Tag::False,
            Self::String(_) => Tag::String,
            Self::Bytes(_) => Tag::Bytes,
            Self::List(_) => Tag::List,
            Self::Dict(_) => Tag::Dict,
        }
    }

    /// Classifies a runtime value of any type into a `Value`.
    ///
    /// Accepts the numeric primitives, `bool`, `String`, `&'static str`,
    /// `Vec<u8>` (as bytes), `Vec<Value>`, [`Dict`], `()` (as null), and
    /// `Value` itself. Anything else is an [`AetherError::UnsupportedValue`].
    pub fn from_any<T: Any>(value: &T) -> Result<Self> {
        let any = value as &dyn Any;

        if let Some(v) = any.downcast_ref::<Value>() {
            return Ok(v.clone());
        }
        if any.is::<()>() {
            return Ok(Self::Null);
        }

        macro_rules! downcast {
            ($($ty:ty),* $(,)?) => {$(
                if let Some(v) = any.downcast_ref::<$ty>() {
                    return Ok(Self::from(v.clone()));
                }
            )*};
        }
        downcast!(
            bool,
            i8,
            i16,
            i32,
            i64,
            u8,
            u16,
            u32,
            u64,
            f32,
            f64,
            String,
            &'static str,
            Vec<u8>,
            Vec<Value>,
            Dict,
        );

        Err(AetherError::UnsupportedValue {
            type_name: std::any::type_name::<T>(),
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns any signed integer variant widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int8(v) => Some(i64::from(*v)),
            Self::Int16(v) => Some(i64::from(*v)),
            Self::Int32(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns any unsigned integer variant widened to `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt8(v) => Some(u64::from(*v)),
            Self::UInt16(v) => Some(u64::from(*v)),
            Self::UInt32(v) => Some(u64::from(*v)),
            Self::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(v) => Some(f64::from(*v)),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(dict) => Some(dict),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Int8(a), Self::Int8(b)) => a == b,
            (Self::Int16(a), Self::Int16(b)) => a == b,
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::UInt8(a), Self::UInt8(b)) => a == b,
            (Self::UInt16(a), Self::UInt16(b)) => a == b,
            (Self::UInt32(a), Self::UInt32(b)) => a == b,
            (Self::UInt64(a), Self::UInt64(b)) => a == b,
            (Self::Float32(a), Self::Float32(b)) => a.to_bits() == b.to_bits(),
            (Self::Float64(a), Self::Float64(b)) => a.to_bits() == b.to_bits(),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Int8(v) => v.hash(state),
            Self::Int16(v) => v.hash(state),
            Self::Int32(v) => v.hash(state),
            Self::Int64(v) => v.hash(state),
            Self::UInt8(v) => v.hash(state),
            Self::UInt16(v) => v.hash(state),
            Self::UInt32(v) => v.hash(state),
            Self::UInt64(v) => v.hash(state),
            Self::Float32(v) => v.to_bits().hash(state),
            Self::Float64(v) => v.to_bits().hash(state),
            Self::Bool(b) => b.hash(state),
            Self::String(s) => s.hash(state),
            Self::Bytes(b) => b.hash(state),
            Self::List(items) => items.hash(state),
            // Dict equality ignores order, so only the length is hashed.
            Self::Dict(dict) => dict.len().hash(state),
        }
    }
}

// -- Convenience conversions --

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }
    )*};
}

impl_from_scalar!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    bool => Bool,
    String => String,
    Vec<u8> => Bytes,
    Vec<Value> => List,
    Dict => Dict,
);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl From<bytes::Bytes> for Value {
    fn from(b: bytes::Bytes) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int8(v) => write!(f, "{v}i8"),
            Self::Int16(v) => write!(f, "{v}i16"),
            Self::Int32(v) => write!(f, "{v}i32"),
            Self::Int64(v) => write!(f, "{v}i64"),
            Self::UInt8(v) => write!(f, "{v}u8"),
            Self::UInt16(v) => write!(f, "{v}u16"),
            Self::UInt32(v) => write!(f, "{v}u32"),
            Self::UInt64(v) => write!(f, "{v}u64"),
            Self::Float32(v) => write!(f, "{v}f32"),
            Self::Float64(v) => write!(f, "{v}f64"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Dict(dict) => {
                write!(f, "{{")?;
                for (i, (k, v)) in dict.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
