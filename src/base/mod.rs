//! In-order decoding of a flattened device tree blob.
//!
//! * [`header`] validates and reads the fixed header
//! * [`locate()`] finds a blob embedded in a larger buffer
//! * [`DevTree`] is a validated view over one blob
//! * [`iters`] walks the memory reservation block
//! * [`parse`] decodes single structure block tokens, [`walk`] turns them into depth-tracked
//!   events
pub mod header;
pub mod iters;
pub mod locate;
pub mod parse;
pub mod tree;
pub mod walk;

pub use header::{is_valid_header, validate_header, FdtHeader, MIN_HEADER_SIZE};
pub use iters::{DevTreeReserveEntryIter, ReserveEntry};
pub use locate::locate;
pub use tree::*;
pub use walk::{DevTreeWalker, WalkEvent, WalkProp};
