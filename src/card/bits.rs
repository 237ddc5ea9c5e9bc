//! Helper for extracting bit fields from card records.
//!
//! Card records pack their fields without regard for byte boundaries. Offsets
//! count from the most significant bit of the first byte of a record.

use thiserror::Error;

/// A bit field reaching past the end of its record, or wider than 32 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Bit field {offset}+{len} does not fit a {size}-byte record.")]
pub struct FieldError {
    pub offset: usize,
    pub len: usize,
    pub size: usize,
}

/// Extract `len` bits starting at bit `offset`.
pub fn get_bits(r: &[u8], offset: usize, len: usize) -> Result<u32, FieldError> {
    let fits = offset
        .checked_add(len)
        .is_some_and(|end| len <= 32 && end <= r.len() * 8);

    if !fits {
        Err(FieldError {
            offset,
            len,
            size: r.len(),
        })?;
    }

    Ok((offset..offset + len).fold(0, |acc, i| (acc << 1) | bit(r, i)))
}

/// Extract a single bit as a flag.
pub fn get_flag(r: &[u8], offset: usize) -> Result<bool, FieldError> {
    get_bits(r, offset, 1).map(|b| b == 1)
}

fn bit(r: &[u8], i: usize) -> u32 {
    u32::from((r[i / 8] >> (7 - i % 8)) & 1)
}
