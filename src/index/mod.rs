//! An in-memory index over a decoded device tree.
//!
//! This module is only enabled with the `alloc` feature.
//!
//! The streaming printer never needs more than the current token. When random access is
//! wanted instead (look a node up by path, find its parent, read a cell out of a property) the
//! tree can be walked once into a [`DevTreeIndex`]: an arena of nodes, each holding index-based
//! lists of its children and properties.
//!
//! ```
//! # use fdt_dump::base::DevTree;
//! # use fdt_dump::index::DevTreeIndex;
//! # let blob = fdt_dump::doctest::FDT;
//! let fdt = DevTree::new(blob)?;
//! let index = DevTreeIndex::new(&fdt, false)?;
//! if let Some(ap) = index.find_path("/wifi/ap") {
//!     for prop in ap.props() {
//!         println!("{} = {}", prop.name(), prop.value());
//!     }
//!     # assert_eq!(ap.prop("ssid").unwrap().value().to_string(), "\"BL60x_Camera03\"");
//! }
//! # Ok::<(), fdt_dump::DecodeError>(())
//! ```

#[doc(hidden)]
pub mod node;
#[doc(hidden)]
pub mod prop;
#[doc(hidden)]
pub mod tree;

#[doc(inline)]
pub use node::DevTreeIndexNode;
#[doc(inline)]
pub use prop::DevTreeIndexProp;
#[doc(inline)]
pub use tree::{DevTreeIndex, NodeId};
