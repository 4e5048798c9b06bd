//! Helper functions for reading binary data

use std::io::{Cursor, Read};

use crate::error::CinError;

/// Fail with `TruncatedInput` unless `need` bytes remain at the cursor
pub(crate) fn ensure(
    cursor: &Cursor<&[u8]>,
    need: usize,
    what: &'static str,
) -> Result<(), CinError> {
    let offset = cursor.position() as usize;
    let available = cursor.get_ref().len().saturating_sub(offset);
    if available < need {
        return Err(CinError::TruncatedInput {
            what,
            offset,
            need,
            available,
        });
    }
    Ok(())
}

/// Read a fixed number of raw bytes
pub(crate) fn read_bytes<const N: usize>(
    cursor: &mut Cursor<&[u8]>,
    what: &'static str,
) -> Result<[u8; N], CinError> {
    ensure(cursor, N, what)?;
    let mut buf = [0u8; N];
    cursor.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read a signed byte
pub(crate) fn read_i8(cursor: &mut Cursor<&[u8]>, what: &'static str) -> Result<i8, CinError> {
    Ok(i8::from_le_bytes(read_bytes::<1>(cursor, what)?))
}

/// Read a 16-bit little-endian unsigned integer
pub(crate) fn read_u16(cursor: &mut Cursor<&[u8]>, what: &'static str) -> Result<u16, CinError> {
    Ok(u16::from_le_bytes(read_bytes::<2>(cursor, what)?))
}

/// Read a 16-bit little-endian signed integer
pub(crate) fn read_i16(cursor: &mut Cursor<&[u8]>, what: &'static str) -> Result<i16, CinError> {
    Ok(i16::from_le_bytes(read_bytes::<2>(cursor, what)?))
}

/// Read a 32-bit little-endian unsigned integer
pub(crate) fn read_u32(cursor: &mut Cursor<&[u8]>, what: &'static str) -> Result<u32, CinError> {
    Ok(u32::from_le_bytes(read_bytes::<4>(cursor, what)?))
}

/// Read a 16-bit little-endian signed integer without advancing
pub(crate) fn peek_i16(cursor: &mut Cursor<&[u8]>, what: &'static str) -> Result<i16, CinError> {
    let start = cursor.position();
    let value = read_i16(cursor, what)?;
    cursor.set_position(start);
    Ok(value)
}

/// Read a NUL-padded fixed-length tag, dropping trailing NULs
pub(crate) fn read_tag(bytes: &[u8]) -> String {
    let len = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&bytes[..len]).into_owned()
}
