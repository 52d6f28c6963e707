//! Module exporting the types most users of this library need.
pub(crate) use crate::priv_util::SliceRead;

pub use crate::base::{DevTree, DevTreeWalker, WalkEvent};
pub use crate::dump::{decode_into, DecodeOptions};
pub use crate::error::DecodeError;
pub use crate::fdt_util::value::PropValue;
