//! Locating a blob embedded somewhere inside a larger buffer.
use log::{debug, info};

use crate::base::header::validate_header;
use crate::error::DecodeError;
use crate::spec::{FDT_MAGIC, FDT_MAGIC_SIZE};

/// Find the offset of the first validly-headed blob within `buf`.
///
/// Every occurrence of the magic is a candidate. A candidate whose header fails
/// [`validate_header`] against the remaining tail is skipped and the scan resumes one byte
/// later, so the result is the first *valid* header, not necessarily the first magic. The scan
/// never moves backwards.
///
/// ```
/// # use fdt_dump::base::locate;
/// # use fdt_dump::DecodeError;
/// let junk = [0xd0u8, 0x0d, 0xfe, 0xed, 0, 0, 0, 0];
/// assert_eq!(locate(&junk), Err(DecodeError::NotFound));
/// ```
pub fn locate(buf: &[u8]) -> Result<usize, DecodeError> {
    let magic = FDT_MAGIC.to_be_bytes();
    let mut pos = 0;

    while buf.len().saturating_sub(pos) >= FDT_MAGIC_SIZE {
        // Only look where a whole magic still fits after the anchor byte.
        let window = match buf.get(pos..buf.len() - FDT_MAGIC_SIZE) {
            Some(w) => w,
            None => break,
        };
        let candidate = match window.iter().position(|&b| b == magic[0]) {
            Some(i) => pos + i,
            None => break,
        };

        if buf.get(candidate..candidate + FDT_MAGIC_SIZE) == Some(&magic[..]) {
            match validate_header(&buf[candidate..]) {
                Ok(()) => {
                    info!("found fdt at offset {:#x}", candidate);
                    return Ok(candidate);
                }
                Err(fault) => debug!("skipping fdt magic at offset {:#x}: {}", candidate, fault),
            }
        }
        pos = candidate + 1;
    }

    Err(DecodeError::NotFound)
}
