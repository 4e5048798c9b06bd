//! CIN header: variant detection, decoding and encoding

use std::io::Cursor;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CinError;
use crate::parser::helpers::{ensure, read_bytes, read_tag, read_u16, read_u32};
use crate::{CIN_MAGIC, LEGACY_HEADER_LEN, MAGIC_HEADER_LEN, TRAILER_LEN, UNK_COLOURS_LEN};

/// Width of the magic tag field
const MAGIC_TAG_LEN: usize = 4;

/// Which of the two header layouts a file uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderVariant {
    /// Header starts with a 4-byte tag and an unknown u16 (0x20 bytes)
    Magic { magic: String, unknown1: u16 },
    /// Header without tag (0x1A bytes)
    Legacy,
}

/// Decoded CIN header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHeader", into = "RawHeader")]
pub struct Header {
    pub variant: HeaderVariant,
    /// Frame the animation holds on
    pub hold_frame: u16,
    /// Number of objects in the chunk stream
    pub object_count: u16,
    /// Opaque bytes, presumably a palette
    pub unk_colours: [u8; UNK_COLOURS_LEN],
}

impl Header {
    /// Legacy header with zeroed opaque bytes
    pub fn legacy(hold_frame: u16, object_count: u16) -> Self {
        Self {
            variant: HeaderVariant::Legacy,
            hold_frame,
            object_count,
            unk_colours: [0; UNK_COLOURS_LEN],
        }
    }

    /// Magic-tagged header (`"CIN"`) with zeroed opaque bytes
    pub fn with_magic(unknown1: u16, hold_frame: u16, object_count: u16) -> Self {
        Self {
            variant: HeaderVariant::Magic {
                magic: "CIN".to_string(),
                unknown1,
            },
            ..Self::legacy(hold_frame, object_count)
        }
    }

    /// Encoded size of this header, excluding the trailer
    pub fn encoded_len(&self) -> usize {
        match self.variant {
            HeaderVariant::Magic { .. } => MAGIC_HEADER_LEN,
            HeaderVariant::Legacy => LEGACY_HEADER_LEN,
        }
    }

    /// Absolute offset where the trailer ends and the chunk stream begins
    pub fn stream_offset(&self) -> usize {
        self.encoded_len() + TRAILER_LEN
    }

    /// Check that the header decodes back as written
    ///
    /// Only `"CIN\0"` selects the magic layout on decode. Any other tag is
    /// read back as a legacy header, shifting every later field.
    pub fn validate(&self) -> Result<(), CinError> {
        let HeaderVariant::Magic { magic, .. } = &self.variant else {
            return Ok(());
        };

        let expected = CIN_MAGIC.to_le_bytes();
        if read_tag(&expected) != *magic {
            return Err(CinError::malformed(format!(
                "header magic {magic:?} does not read back, only \"CIN\" selects the magic layout"
            )));
        }
        Ok(())
    }
}

/// Decode the header at the start of `data`
///
/// The layout is chosen by the first four bytes alone: `"CIN\0"` selects the
/// magic variant, anything else the legacy one.
pub fn decode_header(data: &[u8]) -> Result<Header, CinError> {
    read_header(&mut Cursor::new(data))
}

/// Encode a header into its variant's byte layout
pub fn encode_header(header: &Header) -> Result<Vec<u8>, CinError> {
    let mut output = Vec::with_capacity(header.encoded_len());
    write_header(&mut output, header)?;
    Ok(output)
}

pub(crate) fn read_header(cursor: &mut Cursor<&[u8]>) -> Result<Header, CinError> {
    let lead = read_u32(cursor, "header magic")?;
    cursor.set_position(0);

    let variant = if lead == CIN_MAGIC {
        ensure(cursor, MAGIC_HEADER_LEN, "magic header")?;
        let tag = read_bytes::<MAGIC_TAG_LEN>(cursor, "magic")?;
        let unknown1 = read_u16(cursor, "unknown1")?;
        HeaderVariant::Magic {
            magic: read_tag(&tag),
            unknown1,
        }
    } else {
        ensure(cursor, LEGACY_HEADER_LEN, "legacy header")?;
        HeaderVariant::Legacy
    };

    let hold_frame = read_u16(cursor, "holdFrame")?;
    let object_count = read_u16(cursor, "objectCount")?;
    let unk_colours = read_bytes::<UNK_COLOURS_LEN>(cursor, "unkColours")?;

    let header = Header {
        variant,
        hold_frame,
        object_count,
        unk_colours,
    };
    debug_assert_eq!(cursor.position() as usize, header.encoded_len());
    debug!(
        magic = matches!(header.variant, HeaderVariant::Magic { .. }),
        hold_frame, object_count, "decoded CIN header"
    );
    Ok(header)
}

pub(crate) fn write_header(output: &mut Vec<u8>, header: &Header) -> Result<(), CinError> {
    if let HeaderVariant::Magic { magic, unknown1 } = &header.variant {
        let bytes = magic.as_bytes();
        if bytes.len() > MAGIC_TAG_LEN {
            return Err(CinError::malformed(format!(
                "header magic {magic:?} is longer than {MAGIC_TAG_LEN} bytes"
            )));
        }
        // Tag is NUL-padded to 4 bytes
        output.extend_from_slice(bytes);
        output.resize(output.len() + MAGIC_TAG_LEN - bytes.len(), 0);
        output.extend_from_slice(&unknown1.to_le_bytes());
    }

    output.extend_from_slice(&header.hold_frame.to_le_bytes());
    output.extend_from_slice(&header.object_count.to_le_bytes());
    output.extend_from_slice(&header.unk_colours);
    Ok(())
}

// =============================================================================
// JSON shape
// =============================================================================

/// Flat JSON form of the header; `Magic` and `u16_Unknown1` travel together
#[derive(Serialize, Deserialize)]
struct RawHeader {
    #[serde(rename = "Magic", default, skip_serializing_if = "Option::is_none")]
    magic: Option<String>,
    #[serde(rename = "u16_Unknown1", default, skip_serializing_if = "Option::is_none")]
    unknown1: Option<u16>,
    #[serde(rename = "HoldFrame")]
    hold_frame: u16,
    #[serde(rename = "ObjectCount")]
    object_count: u16,
    #[serde(rename = "u8_UnkColours")]
    unk_colours: [u8; UNK_COLOURS_LEN],
}

impl TryFrom<RawHeader> for Header {
    type Error = CinError;

    fn try_from(raw: RawHeader) -> Result<Self, Self::Error> {
        let variant = match (raw.magic, raw.unknown1) {
            (Some(magic), Some(unknown1)) => HeaderVariant::Magic { magic, unknown1 },
            (None, None) => HeaderVariant::Legacy,
            (Some(_), None) => {
                return Err(CinError::malformed("header has Magic but no u16_Unknown1"));
            }
            (None, Some(_)) => {
                return Err(CinError::malformed("header has u16_Unknown1 but no Magic"));
            }
        };
        Ok(Self {
            variant,
            hold_frame: raw.hold_frame,
            object_count: raw.object_count,
            unk_colours: raw.unk_colours,
        })
    }
}

impl From<Header> for RawHeader {
    fn from(header: Header) -> Self {
        let (magic, unknown1) = match header.variant {
            HeaderVariant::Magic { magic, unknown1 } => (Some(magic), Some(unknown1)),
            HeaderVariant::Legacy => (None, None),
        };
        Self {
            magic,
            unknown1,
            hold_frame: header.hold_frame,
            object_count: header.object_count,
            unk_colours: header.unk_colours,
        }
    }
}
