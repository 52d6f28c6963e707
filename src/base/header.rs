//! Parsing and validation of the fixed blob header.
use core::mem::size_of;

use crate::error::{DecodeError, HeaderFault};
use crate::prelude::*;
use crate::priv_util::SliceReadError;
use crate::spec::{fdt_header, FDT_MAGIC, MAX_VERSION};

/// Size of the fixed header, regardless of the version it declares.
pub const MIN_HEADER_SIZE: usize = size_of::<fdt_header>();

macro_rules! get_be32_field {
    ( $f:ident, $s:ident , $buf:expr ) => {
        $buf.read_be_u32(offset_of!($s, $f))
    };
}

/// The decoded header of a device tree blob.
///
/// Fields which only exist in newer versions of the format are `None` when the blob's version
/// predates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdtHeader {
    pub magic: u32,
    pub total_size: u32,
    pub off_dt_struct: u32,
    pub off_dt_strings: u32,
    pub off_mem_rsvmap: u32,
    pub version: u32,
    pub last_comp_version: u32,
    /// Present since version 2.
    pub boot_cpuid_phys: Option<u32>,
    /// Present since version 3.
    pub size_dt_strings: Option<u32>,
    /// Present since version 17.
    pub size_dt_struct: Option<u32>,
}

/// Check that `buf` starts with a header this library will decode.
///
/// A header is accepted when all of the following hold, checked in this order:
///
/// 1. `buf` holds at least [`MIN_HEADER_SIZE`] bytes
/// 2. the magic is [`FDT_MAGIC`]
/// 3. `version` and `last_comp_version` are at most [`MAX_VERSION`]
/// 4. `totalsize` is strictly smaller than `buf.len()`
/// 5. the structure and strings block offsets are smaller than `buf.len()`
///
/// The memory reservation offset is not checked here; reads from it are bounds-checked later.
pub fn validate_header(buf: &[u8]) -> Result<(), HeaderFault> {
    let len = buf.len();
    if len < MIN_HEADER_SIZE {
        return Err(HeaderFault::TooShort { len });
    }
    let field = |r: Result<u32, SliceReadError>| r.map_err(|_| HeaderFault::TooShort { len });

    let magic = field(get_be32_field!(magic, fdt_header, buf))?;
    if magic != FDT_MAGIC {
        return Err(HeaderFault::BadMagic(magic));
    }
    let version = field(get_be32_field!(version, fdt_header, buf))?;
    if version > MAX_VERSION {
        return Err(HeaderFault::VersionTooNew(version));
    }
    let last_comp_version = field(get_be32_field!(last_comp_version, fdt_header, buf))?;
    if last_comp_version > MAX_VERSION {
        return Err(HeaderFault::LastCompVersionTooNew(last_comp_version));
    }
    let totalsize = field(get_be32_field!(totalsize, fdt_header, buf))?;
    if totalsize as usize >= len {
        return Err(HeaderFault::TotalSizeOutOfRange(totalsize));
    }
    let off_dt_struct = field(get_be32_field!(off_dt_struct, fdt_header, buf))?;
    if off_dt_struct as usize >= len {
        return Err(HeaderFault::StructOffsetOutOfRange(off_dt_struct));
    }
    let off_dt_strings = field(get_be32_field!(off_dt_strings, fdt_header, buf))?;
    if off_dt_strings as usize >= len {
        return Err(HeaderFault::StringsOffsetOutOfRange(off_dt_strings));
    }
    Ok(())
}

/// Predicate form of [`validate_header`].
#[inline]
#[must_use]
pub fn is_valid_header(buf: &[u8]) -> bool {
    validate_header(buf).is_ok()
}

impl FdtHeader {
    /// Read every header field from the start of `buf`.
    ///
    /// This performs no validation beyond bounds checks, see [`validate_header`].
    pub fn read(buf: &[u8]) -> Result<Self, DecodeError> {
        let version = get_be32_field!(version, fdt_header, buf)?;
        let optional = |since: u32, r: Result<u32, SliceReadError>| -> Result<Option<u32>, DecodeError> {
            if version >= since {
                Ok(Some(r?))
            } else {
                Ok(None)
            }
        };

        Ok(Self {
            magic: get_be32_field!(magic, fdt_header, buf)?,
            total_size: get_be32_field!(totalsize, fdt_header, buf)?,
            off_dt_struct: get_be32_field!(off_dt_struct, fdt_header, buf)?,
            off_dt_strings: get_be32_field!(off_dt_strings, fdt_header, buf)?,
            off_mem_rsvmap: get_be32_field!(off_mem_rsvmap, fdt_header, buf)?,
            version,
            last_comp_version: get_be32_field!(last_comp_version, fdt_header, buf)?,
            boot_cpuid_phys: optional(2, get_be32_field!(boot_cpuid_phys, fdt_header, buf))?,
            size_dt_strings: optional(3, get_be32_field!(size_dt_strings, fdt_header, buf))?,
            size_dt_struct: optional(17, get_be32_field!(size_dt_struct, fdt_header, buf))?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn raw_header(fields: [u32; 10], len: usize) -> std::vec::Vec<u8> {
        let mut buf = std::vec![0u8; len];
        for (i, f) in fields.iter().enumerate() {
            buf[i * 4..i * 4 + 4].copy_from_slice(&f.to_be_bytes());
        }
        buf
    }

    const GOOD: [u32; 10] = [FDT_MAGIC, 0x60, 0x38, 0x58, 0x28, 17, 16, 0, 0x8, 0x20];

    #[test]
    fn accepts_well_formed_header() {
        assert_eq!(validate_header(&raw_header(GOOD, 0x64)), Ok(()));
        assert!(is_valid_header(&raw_header(GOOD, 0x64)));
    }

    #[test]
    fn rejects_short_buffer() {
        let buf = raw_header(GOOD, 0x64);
        assert_eq!(
            validate_header(&buf[..MIN_HEADER_SIZE - 1]),
            Err(HeaderFault::TooShort { len: 39 })
        );
    }

    #[test]
    fn rejects_bad_magic() {
        let mut fields = GOOD;
        fields[0] = 0xedfe_0dd0;
        assert_eq!(
            validate_header(&raw_header(fields, 0x64)),
            Err(HeaderFault::BadMagic(0xedfe_0dd0))
        );
    }

    #[test]
    fn rejects_version_18() {
        let mut fields = GOOD;
        fields[5] = 18;
        assert_eq!(
            validate_header(&raw_header(fields, 0x64)),
            Err(HeaderFault::VersionTooNew(18))
        );

        let mut fields = GOOD;
        fields[6] = 18;
        assert_eq!(
            validate_header(&raw_header(fields, 0x64)),
            Err(HeaderFault::LastCompVersionTooNew(18))
        );
    }

    #[test]
    fn rejects_totalsize_not_below_buffer_length() {
        assert_eq!(
            validate_header(&raw_header(GOOD, 0x60)),
            Err(HeaderFault::TotalSizeOutOfRange(0x60))
        );
        assert_eq!(
            validate_header(&raw_header(GOOD, 0x50)),
            Err(HeaderFault::TotalSizeOutOfRange(0x60))
        );
        assert!(is_valid_header(&raw_header(GOOD, 0x61)));
    }

    #[test]
    fn rejects_block_offsets_outside_buffer() {
        let mut fields = GOOD;
        fields[1] = 0x10;
        fields[2] = 0x64;
        assert_eq!(
            validate_header(&raw_header(fields, 0x64)),
            Err(HeaderFault::StructOffsetOutOfRange(0x64))
        );

        let mut fields = GOOD;
        fields[1] = 0x10;
        fields[3] = 0x70;
        assert_eq!(
            validate_header(&raw_header(fields, 0x64)),
            Err(HeaderFault::StringsOffsetOutOfRange(0x70))
        );
    }

    #[test]
    fn optional_fields_follow_version() {
        let header = FdtHeader::read(&raw_header(GOOD, 0x64)).unwrap();
        assert_eq!(header.boot_cpuid_phys, Some(0));
        assert_eq!(header.size_dt_strings, Some(0x8));
        assert_eq!(header.size_dt_struct, Some(0x20));

        let mut fields = GOOD;
        fields[5] = 2;
        let header = FdtHeader::read(&raw_header(fields, 0x64)).unwrap();
        assert_eq!(header.boot_cpuid_phys, Some(0));
        assert_eq!(header.size_dt_strings, None);
        assert_eq!(header.size_dt_struct, None);

        fields[5] = 16;
        let header = FdtHeader::read(&raw_header(fields, 0x64)).unwrap();
        assert_eq!(header.size_dt_strings, Some(0x8));
        assert_eq!(header.size_dt_struct, None);

        fields[5] = 1;
        let header = FdtHeader::read(&raw_header(fields, 0x64)).unwrap();
        assert_eq!(header.boot_cpuid_phys, None);
    }
}
