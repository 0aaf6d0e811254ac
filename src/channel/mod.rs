//! Reader and writer wrappers over byte channels.
//!
//! The codec never seeks and never frames: a reader pulls exactly the bytes
//! one value needs, and a writer appends encoded values back to back.

mod reader;
mod writer;

#[cfg(feature = "tokio")]
mod async_io;

pub use reader::ValueReader;
pub use writer::ValueWriter;

#[cfg(feature = "tokio")]
pub use async_io::{AsyncValueReader, AsyncValueWriter};
