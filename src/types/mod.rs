//! Aether value types and typed projections.

mod convert;
mod value;

pub use convert::FromValue;
pub use value::{Dict, Value};
