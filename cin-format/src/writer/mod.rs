//! CIN file writer
//!
//! Emits the header, trailer and chunk stream exactly as stored in the
//! document. Sentinels are not synthesized: the chunks closing frames and
//! objects must already carry them.

use tracing::{debug, warn};

use crate::CHUNK_SIZE;
use crate::chunk::Chunk;
use crate::document::{CinDocument, CinObject};
use crate::error::CinError;
use crate::header::write_header;


/// Encode a document into CIN bytes
///
/// `ObjectCount` is written as found in the header, even when it disagrees with
/// the number of objects.
pub fn write_cin(document: &CinDocument) -> Result<Vec<u8>, CinError> {
    let header = &document.header;
    let chunk_count: usize = document.objects.iter().map(CinObject::chunk_count).sum();
    let mut output = Vec::with_capacity(header.stream_offset() + chunk_count * CHUNK_SIZE);

    if usize::from(header.object_count) != document.objects.len() {
        warn!(
            object_count = header.object_count,
            objects = document.objects.len(),
            "header ObjectCount does not match the number of objects"
        );
    }

    write_header(&mut output, header)?;
    output.extend_from_slice(&document.unknown);
    write_objects(&mut output, &document.objects);

    debug!(bytes = output.len(), "encoded CIN document");
    Ok(output)
}

/// Append the chunk stream for `objects`: each frame's chunks, then the end chunk
pub fn write_objects(output: &mut Vec<u8>, objects: &[CinObject]) {
    for object in objects {
        for frame in &object.frames {
            for chunk in frame.chunks() {
                write_chunk(output, chunk);
            }
        }
        write_chunk(output, &object.end_chunk);
    }
}

fn write_chunk(output: &mut Vec<u8>, chunk: &Chunk) {
    output.extend_from_slice(&chunk.to_bytes());
}
