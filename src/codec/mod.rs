//! The Aether wire format.
//!
//! Every value is one tag byte followed by its payload. Fixed-width numbers
//! are little-endian; strings, byte blobs, lists and dictionaries carry a
//! varint size after the tag.

pub mod decode;
pub mod encode;
pub mod limits;
pub mod tag;
pub mod varint;

pub use decode::{decode_value, from_slice, read_as, read_value};
pub use encode::{encode_value, encoded_len, to_bytes, write_value};
pub use limits::Limits;
pub use tag::Tag;
