//! Helpers for interpreting property values.
pub mod value;

pub use value::{is_printable_string, PropValue};
#[cfg(feature = "alloc")]
pub use value::format_value;
