//! CIN file parser

use std::io::Cursor;

use tracing::{debug, warn};

use crate::chunk::{Chunk, ChunkType, Colour};
use crate::document::{CinDocument, CinObject, Frame};
use crate::error::CinError;
use crate::header::read_header;
use crate::{CHUNK_SIZE, FRAME_END, OBJECT_END, TRAILER_LEN};

pub(crate) mod helpers;

use helpers::{ensure, peek_i16, read_bytes, read_i8, read_i16, read_u16};

/// Parse a CIN file into a CinDocument
///
/// Objects are read until `ObjectCount` of them have been seen. Anything after
/// the last object is ignored.
///
/// # Arguments
/// * `data` - Raw CIN file bytes
///
/// # Returns
/// * `Ok(CinDocument)` - Parsed document
/// * `Err(CinError)` - `TruncatedInput` if the buffer ends inside a record
pub fn parse_cin(data: &[u8]) -> Result<CinDocument, CinError> {
    let mut cursor = Cursor::new(data);

    let header = read_header(&mut cursor)?;
    let unknown = read_bytes::<TRAILER_LEN>(&mut cursor, "header trailer")?;
    debug_assert_eq!(cursor.position() as usize, header.stream_offset());

    let mut objects = Vec::with_capacity(header.object_count as usize);
    for obj_idx in 0..header.object_count {
        let object = read_object(&mut cursor)?;
        debug!(
            object = obj_idx,
            frames = object.frames.len(),
            chunks = object.chunk_count(),
            "decoded object"
        );
        objects.push(object);
    }

    let trailing = data.len() - cursor.position() as usize;
    if trailing > 0 {
        warn!(
            trailing,
            offset = cursor.position(),
            "ignoring bytes after the last object"
        );
    }

    Ok(CinDocument {
        header,
        unknown,
        objects,
    })
}

/// Read one object: frames until the end chunk
///
/// Both boundaries live in the leading i16 of ordinary chunks. Before each frame
/// the next chunk is checked for [`OBJECT_END`]; inside a frame every chunk is
/// kept and the one leading with [`FRAME_END`] closes it.
fn read_object(cursor: &mut Cursor<&[u8]>) -> Result<CinObject, CinError> {
    let mut frames = Vec::new();

    loop {
        if peek_i16(cursor, "object boundary")? == OBJECT_END {
            let end_chunk = read_chunk(cursor)?;
            return Ok(CinObject::new(frames, end_chunk));
        }

        let mut chunks = Vec::new();
        loop {
            let lead = peek_i16(cursor, "chunk")?;
            chunks.push(read_chunk(cursor)?);
            if lead == FRAME_END {
                break;
            }
        }
        frames.push(Frame::new(chunks)?);
    }
}

/// Read one 18-byte chunk record
pub(crate) fn read_chunk(cursor: &mut Cursor<&[u8]>) -> Result<Chunk, CinError> {
    ensure(cursor, CHUNK_SIZE, "chunk")?;

    let chunk_type = ChunkType::from_code(read_i8(cursor, "chunk type")?);
    let prop = read_i8(cursor, "chunk prop")?;
    let colour = Colour {
        red: read_u16(cursor, "chunk red")?,
        green: read_u16(cursor, "chunk green")?,
        blue: read_u16(cursor, "chunk blue")?,
        alpha: read_u16(cursor, "chunk alpha")?,
    };
    let start_x = read_i16(cursor, "chunk startX")?;
    let start_y = read_i16(cursor, "chunk startY")?;
    let end_x = read_i16(cursor, "chunk endX")?;
    let end_y = read_i16(cursor, "chunk endY")?;

    Ok(Chunk {
        chunk_type,
        prop,
        colour,
        start_x,
        start_y,
        end_x,
        end_y,
    })
}
