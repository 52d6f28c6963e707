//! Rendering a blob as device tree source text.
//!
//! The printer streams: every line is written to the sink as soon as the token behind it has
//! been decoded, so a failing blob still leaves everything decoded before the failure in the
//! sink.
//!
//! ```
//! use fdt_dump::{decode, DecodeError};
//!
//! // Not a device tree.
//! assert!(matches!(decode(&[0u8; 64], false, false), Err(DecodeError::InvalidHeader { .. })));
//! // Nor is there one to be found inside it.
//! assert_eq!(decode(&[0u8; 64], true, false), Err(DecodeError::NotFound));
//! ```
use core::fmt::Write;

use log::error;

use crate::base::{locate, validate_header, DevTree, FdtHeader, WalkEvent};
use crate::error::DecodeError;
use crate::fdt_util::value::PropValue;
use crate::priv_util::SliceRead;
use crate::spec::{tag_name, FdtTok};

#[cfg(feature = "alloc")]
use alloc::string::String;
#[cfg(feature = "alloc")]
use thiserror_no_std::Error;

/// Run-time options for a decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Search the buffer for an embedded blob instead of expecting one at offset 0.
    pub scan: bool,
    /// Emit per-token offset and tag comments.
    pub verbose: bool,
    /// Fail when the structure block ends with nodes still open.
    pub strict: bool,
    /// Spaces of indentation per nesting level.
    pub indent: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scan: false,
            verbose: false,
            strict: false,
            indent: 4,
        }
    }

    #[must_use]
    pub const fn scan(self, scan: bool) -> Self {
        Self { scan, ..self }
    }

    #[must_use]
    pub const fn verbose(self, verbose: bool) -> Self {
        Self { verbose, ..self }
    }

    #[must_use]
    pub const fn strict(self, strict: bool) -> Self {
        Self { strict, ..self }
    }

    #[must_use]
    pub const fn indent(self, indent: usize) -> Self {
        Self { indent, ..self }
    }
}

/// Writes indentation for `depth` nesting levels.
struct Indent(usize);

impl core::fmt::Display for Indent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:width$}", "", width = self.0)
    }
}

fn write_header<W: Write>(h: &FdtHeader, out: &mut W) -> Result<(), DecodeError> {
    writeln!(out, "/dts-v1/;")?;
    writeln!(out, "// magic:\t\t{:#x}", h.magic)?;
    writeln!(out, "// totalsize:\t\t{:#x} ({})", h.total_size, h.total_size)?;
    writeln!(out, "// off_dt_struct:\t{:#x}", h.off_dt_struct)?;
    writeln!(out, "// off_dt_strings:\t{:#x}", h.off_dt_strings)?;
    writeln!(out, "// off_mem_rsvmap:\t{:#x}", h.off_mem_rsvmap)?;
    writeln!(out, "// version:\t\t{}", h.version)?;
    writeln!(out, "// last_comp_version:\t{}", h.last_comp_version)?;
    if let Some(cpu) = h.boot_cpuid_phys {
        writeln!(out, "// boot_cpuid_phys:\t{:#x}", cpu)?;
    }
    if let Some(size) = h.size_dt_strings {
        writeln!(out, "// size_dt_strings:\t{:#x}", size)?;
    }
    if let Some(size) = h.size_dt_struct {
        writeln!(out, "// size_dt_struct:\t{:#x}", size)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Write the node/property body of one walk event.
pub(crate) fn write_event<W: Write>(
    event: &WalkEvent<'_>,
    indent: usize,
    verbose: bool,
    out: &mut W,
) -> Result<(), DecodeError> {
    if verbose {
        let tag = event.tag();
        writeln!(
            out,
            "// {:04x}: tag: 0x{:08x} ({})",
            event.offset(),
            tag as u32,
            tag.name()
        )?;
    }
    match *event {
        WalkEvent::BeginNode { name, depth, .. } => {
            writeln!(out, "{}{} {{", Indent(depth * indent), name)?;
        }
        WalkEvent::EndNode { depth, .. } => {
            writeln!(out, "{}}};", Indent(depth * indent))?;
        }
        WalkEvent::Nop { depth, .. } => {
            writeln!(out, "{}// [NOP]", Indent(depth * indent))?;
        }
        WalkEvent::Prop(ref p) => {
            if verbose {
                writeln!(out, "// {:04x}: string: {}", p.name_offset, p.name)?;
                writeln!(out, "// {:04x}: value", p.value_offset)?;
            }
            write!(out, "{}{}", Indent(p.depth * indent), p.name)?;
            match PropValue::classify(p.value) {
                PropValue::Empty => writeln!(out, ";")?,
                value => writeln!(out, " = {};", value)?,
            }
        }
    }
    Ok(())
}

/// Render an already validated blob: the header comment block, `/memreserve/` lines and the
/// structure block.
pub fn dump_blob<W: Write>(
    fdt: &DevTree<'_>,
    opts: &DecodeOptions,
    out: &mut W,
) -> Result<(), DecodeError> {
    write_header(fdt.header(), out)?;

    for entry in fdt.reserved_entries() {
        let entry = entry?;
        writeln!(out, "/memreserve/ {:#x} {:#x};", entry.address, entry.size)?;
    }

    let mut walker = fdt.walk(opts.strict);
    loop {
        let offset = walker.offset();
        match walker.next() {
            None => return Ok(()),
            Some(Ok(event)) => write_event(&event, opts.indent, opts.verbose, out)?,
            Some(Err(e)) => {
                if opts.verbose {
                    write_failed_tag(fdt, offset, out)?;
                }
                error!("decode halted: {}", e);
                return Err(e);
            }
        }
    }
}

/// Trace the tag of a token whose body failed to decode. The end token is never traced.
fn write_failed_tag<W: Write>(
    fdt: &DevTree<'_>,
    offset: usize,
    out: &mut W,
) -> Result<(), DecodeError> {
    match fdt.buf().read_be_u32(offset) {
        Ok(tag) if tag != FdtTok::End as u32 => {
            writeln!(out, "// {:04x}: tag: 0x{:08x} ({})", offset, tag, tag_name(tag))?;
        }
        _ => {}
    }
    Ok(())
}

/// Locate (when scanning) and validate a blob in `buf`, then stream its rendering into `out`.
///
/// Returns the offset of the blob within `buf`. Offsets inside a returned error are relative to
/// that origin. On error, whatever was rendered before the failure remains in `out`.
pub fn decode_into<W: Write>(
    buf: &[u8],
    opts: &DecodeOptions,
    out: &mut W,
) -> Result<usize, DecodeError> {
    let origin = if opts.scan {
        locate(buf)?
    } else {
        validate_header(buf).map_err(|fault| {
            error!("header is not valid: {}", fault);
            DecodeError::InvalidHeader { offset: 0, fault }
        })?;
        0
    };
    let blob = buf.get(origin..).ok_or(DecodeError::NotFound)?;
    let fdt = DevTree::new(blob)?;
    dump_blob(&fdt, opts, out)?;
    Ok(origin)
}

/// Decode `buf` into device tree source text.
///
/// `scan_for_embedded` searches the buffer for the first validly-headed blob;
/// `verbose_trace` adds per-token offset comments.
#[cfg(feature = "alloc")]
pub fn decode(
    buf: &[u8],
    scan_for_embedded: bool,
    verbose_trace: bool,
) -> Result<String, DecodeError> {
    let opts = DecodeOptions::new()
        .scan(scan_for_embedded)
        .verbose(verbose_trace);
    decode_with(buf, &opts)
        .map(|dump| dump.text)
        .map_err(|e| e.error)
}

/// The text of a successful decode.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dump {
    /// Offset of the blob within the decoded buffer.
    pub origin: usize,
    pub text: String,
}

/// A failed decode, together with the text rendered before the failure.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct DumpError {
    pub error: DecodeError,
    pub partial: String,
}

#[cfg(feature = "alloc")]
pub fn decode_with(buf: &[u8], opts: &DecodeOptions) -> Result<Dump, DumpError> {
    let mut text = String::new();
    match decode_into(buf, opts, &mut text) {
        Ok(origin) => Ok(Dump { origin, text }),
        Err(error) => Err(DumpError {
            error,
            partial: text,
        }),
    }
}
