//! A flattened device tree (FDT) blob locator, validator and dumper for embedded, low memory
//! no-std environments.
//!
//! Turns a raw byte buffer holding a device tree blob into device tree source text in a single
//! pass, without building a tree:
//!
//! * [Header validation and blob location](base)
//! * [Low-level FDT token parsing and a depth-tracking walker](base::walk)
//! * [Classification of untyped property values](fdt_util::value)
//! * [Streaming DTS output](dump)
//! * [An optional in-memory index](index) when random access is wanted
//!
//! ## Features
//!
//! This crate can be used without the standard library (`#![no_std]`) by disabling
//! the default `std` feature. [`decode_into`] then writes into any [`core::fmt::Write`] sink.
//! The `alloc` feature adds the `String` returning entry points and the [`index`] module.
//!
//! ```toml
//! [dependencies.fdt-dump]
//! version = "x"
//! default-features = false
//! ```
//!
//! ## Examples
//!
//! ```
//! use fdt_dump::{decode_into, DecodeOptions};
//!
//! # let buf = fdt_dump::doctest::FDT;
//! let mut text = String::new();
//! let opts = DecodeOptions::new().scan(true);
//! match decode_into(buf, &opts, &mut text) {
//!     Ok(origin) => println!("blob at {:#x}:\n{}", origin, text),
//!     Err(e) => println!("{}", e),
//! }
//! # assert!(text.contains("ssid = \"BL60x_Camera03\";\n"));
//! ```
#![deny(
     clippy::all,
     //clippy::cargo,
 )]
#![allow(clippy::as_conversions)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate core;
extern crate endian_type_rs as endian_type;
#[macro_use]
extern crate memoffset;
#[macro_use]
extern crate static_assertions;

pub mod error;
pub mod base;
pub mod dump;
pub mod fdt_util;
#[cfg(feature = "alloc")]
pub mod index;
pub mod prelude;
pub mod spec;

pub(crate) mod priv_util;

#[cfg(test)]
pub(crate) mod test_util;

pub use base::DevTree;
pub use dump::{decode_into, dump_blob, DecodeOptions};
#[cfg(feature = "alloc")]
pub use dump::{decode, decode_with, Dump, DumpError};
pub use error::{DecodeError, HeaderFault};

// Fixtures for the documentation examples. Part of the default features so that
// `cargo test` runs them.
#[cfg(feature = "doctest")]
pub mod doctest {
    /// The BL602 Wi-Fi device tree, followed by 4 bytes of slack.
    pub const FDT: &[u8] = include_bytes!("../tests/bl602-wifi.dtb");
}
