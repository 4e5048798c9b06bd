//! cin-format: CIN animation overlay format decoder and encoder
//!
//! This crate provides a pure Rust decoder and encoder for CIN files, the binary
//! resource format a legacy application uses to describe layered mask, shape and
//! texture overlays driven by frame sequences.
//!
//! # Key Features
//!
//! - **Byte-exact**: `write_cin(&parse_cin(data)?)` reproduces the input, up to
//!   the end of the last object
//! - **Both header variants**: magic-tagged (`"CIN\0"`) and legacy headers
//! - **JSON mapping**: the document maps onto an editable JSON tree via serde
//!
//! # CIN Format Overview
//!
//! CIN files contain:
//! - Header (0x20 bytes with magic, 0x1A bytes without)
//! - 10-byte opaque trailer
//! - Objects, each a run of frames followed by an end chunk
//! - Frames, each a run of 18-byte chunks
//!
//! There are no length fields below the header. Frame and object boundaries are
//! carried by the first two bytes of an ordinary chunk: a chunk whose leading
//! i16 is [`FRAME_END`] closes its frame, and a chunk leading with
//! [`OBJECT_END`] is the object's end chunk. These are regular chunk fields
//! (type and prop) that double as sentinels, so a real chunk with those values
//! cannot be told apart from a boundary marker.
//!
//! # Usage
//!
//! ```ignore
//! use cin_format::{parse_cin, write_cin};
//!
//! let data = std::fs::read("overlay.cin").unwrap();
//! let document = parse_cin(&data).unwrap();
//!
//! println!("Objects: {}", document.objects.len());
//! assert_eq!(write_cin(&document).unwrap(), data);
//! ```

mod chunk;
mod convert;
mod document;
mod error;
mod header;
mod parser;
mod writer;

pub use chunk::{Chunk, ChunkType, Colour};
pub use convert::{Format, convert, decode, encode, output_path};
pub use document::{CinDocument, CinObject, Frame, frame_key};
pub use error::CinError;
pub use header::{Header, HeaderVariant, decode_header, encode_header};
pub use parser::parse_cin;
pub use writer::{write_cin, write_objects};

// =============================================================================
// Constants
// =============================================================================

/// Magic value of the leading u32 ("CIN\0" read little-endian)
pub const CIN_MAGIC: u32 = 0x004E_4943;

/// Header length with the magic tag
pub const MAGIC_HEADER_LEN: usize = 0x20;

/// Header length without the magic tag
pub const LEGACY_HEADER_LEN: usize = 0x1A;

/// Width of the opaque trailer after the header
pub const TRAILER_LEN: usize = 10;

/// Width of the opaque `unkColours` header field
pub const UNK_COLOURS_LEN: usize = 22;

/// Size of one chunk record
pub const CHUNK_SIZE: usize = 0x12;

/// Leading i16 of the chunk that closes a frame
pub const FRAME_END: i16 = -256;

/// Leading i16 of an object's end chunk
pub const OBJECT_END: i16 = -512;

// =============================================================================
// Tests
// =============================================================================
