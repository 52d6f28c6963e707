//! Classification and rendering of raw property values.
//!
//! Device Tree properties are not typed, so the rendering is a guess made from the bytes alone.
//! The guesses are tried in a fixed order:
//!
//! 1. no bytes at all: the property is a bare flag
//! 2. one or more NUL-terminated runs of printable ASCII: a string list
//! 3. a multiple of four bytes: big-endian 32-bit cells
//! 4. anything else: raw bytes
//!
//! The order matters. `b"foo\0"` is both a string and one cell; it renders as a string.
//!
//! ```
//! use fdt_dump::fdt_util::value::PropValue;
//!
//! assert_eq!(format!("{}", PropValue::classify(b"okay\0")), "\"okay\"");
//! assert_eq!(format!("{}", PropValue::classify(&[0, 0, 0x10, 0])), "<0x00001000>");
//! assert_eq!(format!("{}", PropValue::classify(&[1, 2, 3])), "[01 02 03]");
//! ```
use core::fmt;
use core::str::from_utf8;

#[cfg(feature = "alloc")]
use alloc::string::{String, ToString};

/// A property value, tagged with how it will be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropValue<'a> {
    Empty,
    Strings(&'a [u8]),
    Cells(&'a [u8]),
    Bytes(&'a [u8]),
}

#[inline]
fn is_print(b: u8) -> bool {
    b == b' ' || b.is_ascii_graphic()
}

/// True when `data` is one or more NUL-terminated runs of printable ASCII.
///
/// Every run must hold at least one character, so a lone `0x00` or a doubled terminator is not
/// a string list.
#[must_use]
pub fn is_printable_string(data: &[u8]) -> bool {
    match data.split_last() {
        Some((&0, body)) => body
            .split(|&b| b == 0)
            .all(|run| !run.is_empty() && run.iter().all(|&b| is_print(b))),
        _ => false,
    }
}

impl<'a> PropValue<'a> {
    #[must_use]
    pub fn classify(value: &'a [u8]) -> Self {
        if value.is_empty() {
            PropValue::Empty
        } else if is_printable_string(value) {
            PropValue::Strings(value)
        } else if value.len() % 4 == 0 {
            PropValue::Cells(value)
        } else {
            PropValue::Bytes(value)
        }
    }

    #[must_use]
    pub fn raw(&self) -> &'a [u8] {
        match *self {
            PropValue::Empty => &[],
            PropValue::Strings(b) | PropValue::Cells(b) | PropValue::Bytes(b) => b,
        }
    }

    /// Iterate the runs of a string list, without their terminators.
    ///
    /// Yields nothing for values which were not classified as strings.
    pub fn strings(&self) -> impl Iterator<Item = &'a [u8]> {
        let body = match *self {
            PropValue::Strings(b) => b.split_last().map_or(&[][..], |(_, body)| body),
            _ => &[][..],
        };
        body.split(|&b| b == 0).filter(|run| !run.is_empty())
    }

    /// Iterate the big-endian cells of a value classified as cells.
    pub fn cells(&self) -> impl Iterator<Item = u32> + 'a {
        let body = match *self {
            PropValue::Cells(b) => b,
            _ => &[][..],
        };
        body.chunks_exact(4)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
    }
}

impl fmt::Display for PropValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PropValue::Empty => Ok(()),
            PropValue::Strings(_) => {
                for (i, run) in self.strings().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{}\"", from_utf8(run).map_err(|_| fmt::Error)?)?;
                }
                Ok(())
            }
            PropValue::Cells(_) => {
                f.write_str("<")?;
                for (i, cell) in self.cells().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "0x{:08x}", cell)?;
                }
                f.write_str(">")
            }
            PropValue::Bytes(b) => {
                f.write_str("[")?;
                for (i, byte) in b.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{:02x}", byte)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Render a property value as text. An empty value renders as an empty string.
#[cfg(feature = "alloc")]
#[must_use]
pub fn format_value(value: &[u8]) -> String {
    PropValue::classify(value).to_string()
}
