//! Aether: a self-describing binary value codec.
//!
//! Values are written as a one-byte type tag followed by their payload, with
//! no external schema. Sizes of strings, byte blobs, lists and dictionaries
//! are base-128 varints, and containers nest freely.
//!
//! # Architecture
//!
//! - **`codec`**: Tag registry, varint sizes, and value encode/decode
//! - **`types`**: The `Value` sum type and typed projections
//! - **`channel`**: Reader/writer wrappers over blocking and tokio streams
//!
//! # Example
//!
//! ```
//! use aether::{from_slice, to_bytes, Value};
//!
//! let value = Value::List(vec![Value::Null, Value::from("héllo"), Value::UInt32(7)]);
//! let bytes = to_bytes(&value);
//! assert_eq!(from_slice(&bytes).unwrap(), value);
//! ```

pub mod channel;
pub mod codec;
pub mod error;
pub mod types;

pub use channel::{ValueReader, ValueWriter};
pub use codec::{from_slice, to_bytes, Limits, Tag};
pub use error::{AetherError, Result};
pub use types::{Dict, FromValue, Value};
