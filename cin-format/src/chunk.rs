//! Chunk records and the chunk type table

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CinError;
use crate::parser::read_chunk;
use crate::{CHUNK_SIZE, FRAME_END, OBJECT_END};

/// Overlay kind stored in the first byte of a chunk
///
/// Codes 0-2 have names. Every other code is kept as `Unknown` and written back
/// unchanged, tagged `UNK_XX` in JSON.
///
/// Types compare by code: `Unknown(1)` equals `Shape` and prints as `CIN_SHAPE`.
#[derive(Debug, Clone, Copy, Default)]
pub enum ChunkType {
    #[default]
    Mask,
    Shape,
    Texture,
    Unknown(i8),
}

impl ChunkType {
    pub const MASK_TAG: &'static str = "CIN_MASK";
    pub const SHAPE_TAG: &'static str = "CIN_SHAPE";
    pub const TEXTURE_TAG: &'static str = "CIN_TEXTURE";
    const UNKNOWN_PREFIX: &'static str = "UNK_";

    /// Map a raw type byte to its chunk type
    pub fn from_code(code: i8) -> Self {
        match code {
            0 => Self::Mask,
            1 => Self::Shape,
            2 => Self::Texture,
            other => Self::Unknown(other),
        }
    }

    /// Raw type byte
    pub fn code(self) -> i8 {
        match self {
            Self::Mask => 0,
            Self::Shape => 1,
            Self::Texture => 2,
            Self::Unknown(code) => code,
        }
    }

    /// Same code, named when it has a name
    pub fn canonical(self) -> Self {
        Self::from_code(self.code())
    }

    /// Parse the hex suffix of an `UNK_XX` tag
    ///
    /// Accepts the two's-complement byte (`UNK_80`) and the negative form older
    /// tools produced for codes below zero (`UNK_-80`).
    fn parse_unknown(suffix: &str) -> Option<i8> {
        let (negative, digits) = match suffix.strip_prefix('-') {
            Some(digits) => (true, digits),
            None => (false, suffix),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        if negative {
            let magnitude = i16::from_str_radix(digits, 16).ok()?;
            i8::try_from(-magnitude).ok()
        } else {
            u8::from_str_radix(digits, 16).ok().map(|b| b as i8)
        }
    }
}

impl PartialEq for ChunkType {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code()
    }
}

impl Eq for ChunkType {}

impl Hash for ChunkType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code().hash(state);
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.canonical() {
            Self::Mask => f.write_str(Self::MASK_TAG),
            Self::Shape => f.write_str(Self::SHAPE_TAG),
            Self::Texture => f.write_str(Self::TEXTURE_TAG),
            Self::Unknown(code) => write!(f, "{}{:02X}", Self::UNKNOWN_PREFIX, code as u8),
        }
    }
}

impl FromStr for ChunkType {
    type Err = CinError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            Self::MASK_TAG => Ok(Self::Mask),
            Self::SHAPE_TAG => Ok(Self::Shape),
            Self::TEXTURE_TAG => Ok(Self::Texture),
            _ => tag
                .strip_prefix(Self::UNKNOWN_PREFIX)
                .and_then(Self::parse_unknown)
                .map(Self::from_code)
                .ok_or_else(|| CinError::malformed(format!("invalid chunk type tag {tag:?}"))),
        }
    }
}

impl Serialize for ChunkType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChunkType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

/// RGBA colour of a chunk, one u16 per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Colour {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub alpha: u16,
}

/// One 18-byte overlay record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Chunk {
    #[serde(rename = "Type")]
    pub chunk_type: ChunkType,
    pub prop: i8,
    pub colour: Colour,
    pub start_x: i16,
    pub start_y: i16,
    pub end_x: i16,
    pub end_y: i16,
}

impl Chunk {
    /// Decode a chunk from the first 18 bytes of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CinError> {
        read_chunk(&mut Cursor::new(bytes))
    }

    /// Encode the chunk into its 18-byte record
    pub fn to_bytes(&self) -> [u8; CHUNK_SIZE] {
        // 0x02.. colour then coordinates, one little-endian word each
        let words = [
            self.colour.red,
            self.colour.green,
            self.colour.blue,
            self.colour.alpha,
            self.start_x as u16,
            self.start_y as u16,
            self.end_x as u16,
            self.end_y as u16,
        ];

        let mut out = [0u8; CHUNK_SIZE];
        out[0] = self.chunk_type.code() as u8;
        out[1] = self.prop as u8;
        for (slot, word) in out[2..].chunks_exact_mut(2).zip(words) {
            slot.copy_from_slice(&word.to_le_bytes());
        }
        out
    }

    /// The first two bytes of the record read as a little-endian i16
    ///
    /// This is the value the stream decoder compares against the sentinels.
    pub fn leading_word(&self) -> i16 {
        i16::from_le_bytes([self.chunk_type.code() as u8, self.prop as u8])
    }

    /// Chunk closes its frame
    pub fn is_frame_end(&self) -> bool {
        self.leading_word() == FRAME_END
    }

    /// Chunk is an object's end chunk
    pub fn is_object_end(&self) -> bool {
        self.leading_word() == OBJECT_END
    }

    /// Zeroed chunk whose leading word is `word`
    pub fn with_leading_word(word: i16) -> Self {
        let [code, prop] = word.to_le_bytes();
        Self {
            chunk_type: ChunkType::from_code(code as i8),
            prop: prop as i8,
            ..Default::default()
        }
    }

    /// Zeroed chunk that closes a frame
    pub fn frame_end() -> Self {
        Self::with_leading_word(FRAME_END)
    }

    /// Zeroed end chunk for an object
    pub fn object_end() -> Self {
        Self::with_leading_word(OBJECT_END)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bytes() -> [u8; CHUNK_SIZE] {
        [
            0x01, 0x05, // type Shape, prop 5
            0x10, 0x00, 0x20, 0x00, 0x30, 0x00, 0xFF, 0xFF, // colour
            0xF6, 0xFF, 0x14, 0x00, 0x00, 0x80, 0xFF, 0x7F, // -10, 20, i16::MIN, i16::MAX
        ]
    }

    #[test]
    fn test_chunk_type_named_codes() {
        assert_eq!(ChunkType::from_code(0), ChunkType::Mask);
        assert_eq!(ChunkType::from_code(1), ChunkType::Shape);
        assert_eq!(ChunkType::from_code(2), ChunkType::Texture);
        assert_eq!(ChunkType::Mask.to_string(), "CIN_MASK");
        assert_eq!(ChunkType::Shape.to_string(), "CIN_SHAPE");
        assert_eq!(ChunkType::Texture.to_string(), "CIN_TEXTURE");
        assert_eq!("CIN_TEXTURE".parse::<ChunkType>().unwrap(), ChunkType::Texture);
    }

    #[test]
    fn test_chunk_type_unknown_1f() {
        let ty = ChunkType::from_code(0x1F);
        assert_eq!(ty, ChunkType::Unknown(0x1F));
        assert_eq!(ty.to_string(), "UNK_1F");
        assert_eq!("UNK_1F".parse::<ChunkType>().unwrap().code(), 0x1F);
    }

    #[test]
    fn test_chunk_type_every_code_round_trips() {
        for code in i8::MIN..=i8::MAX {
            let ty = ChunkType::from_code(code);
            let tag = ty.to_string();
            let parsed: ChunkType = tag.parse().unwrap();
            assert_eq!(parsed.code(), code, "tag {tag}");
            if !(0..=2).contains(&code) {
                assert!(tag.starts_with("UNK_") && tag.len() == 6, "tag {tag}");
            }
        }
    }

    #[test]
    fn test_unknown_with_named_code_is_that_type() {
        assert_eq!(ChunkType::Unknown(1), ChunkType::Shape);
        assert_eq!(ChunkType::Unknown(1).canonical(), ChunkType::Shape);
        assert!(matches!(ChunkType::Unknown(2).canonical(), ChunkType::Texture));
        assert_eq!(ChunkType::Unknown(0).to_string(), "CIN_MASK");
        assert_ne!(ChunkType::Unknown(3), ChunkType::Texture);

        let chunk = Chunk {
            chunk_type: ChunkType::Unknown(1),
            prop: 7,
            ..Default::default()
        };
        let decoded = Chunk::from_bytes(&chunk.to_bytes()).unwrap();
        assert_eq!(decoded, chunk);
        assert!(matches!(decoded.chunk_type, ChunkType::Shape));
        assert_eq!(serde_json::to_value(chunk).unwrap()["Type"], "CIN_SHAPE");
    }

    #[test]
    fn test_chunk_type_negative_legacy_tag() {
        assert_eq!(ChunkType::from_code(-128).to_string(), "UNK_80");
        assert_eq!("UNK_-80".parse::<ChunkType>().unwrap().code(), -128);
        assert_eq!("UNK_-1".parse::<ChunkType>().unwrap().code(), -1);
        assert_eq!("UNK_FF".parse::<ChunkType>().unwrap().code(), -1);
    }

    #[test]
    fn test_chunk_type_bad_tags() {
        let tags = [
            "", "CIN_BLOB", "UNK_", "UNK_XYZ", "UNK_100", "UNK_-81", "UNK_+1", "UNK_--5", "cin_mask",
        ];
        for tag in tags {
            assert!(
                matches!(tag.parse::<ChunkType>(), Err(CinError::MalformedDocument(_))),
                "tag {tag:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_decode_chunk_fields() {
        let chunk = Chunk::from_bytes(&sample_bytes()).unwrap();
        assert_eq!(chunk.chunk_type, ChunkType::Shape);
        assert_eq!(chunk.prop, 5);
        assert_eq!(
            chunk.colour,
            Colour {
                red: 0x10,
                green: 0x20,
                blue: 0x30,
                alpha: 0xFFFF,
            }
        );
        assert_eq!(chunk.start_x, -10);
        assert_eq!(chunk.start_y, 20);
        assert_eq!(chunk.end_x, i16::MIN);
        assert_eq!(chunk.end_y, i16::MAX);
    }

    #[test]
    fn test_chunk_bytes_identity() {
        let bytes = sample_bytes();
        assert_eq!(Chunk::from_bytes(&bytes).unwrap().to_bytes(), bytes);
    }

    #[test]
    fn test_encode_field_offsets() {
        let chunk = Chunk {
            chunk_type: ChunkType::Unknown(-3),
            prop: -2,
            colour: Colour {
                red: 0x0102,
                green: 0x0304,
                blue: 0x0506,
                alpha: 0x0708,
            },
            start_x: -1,
            start_y: 0x0A0B,
            end_x: i16::MIN,
            end_y: 0x0C0D,
        };
        assert_eq!(
            chunk.to_bytes(),
            [
                0xFD, 0xFE, 0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07, 0xFF, 0xFF, 0x0B,
                0x0A, 0x00, 0x80, 0x0D, 0x0C,
            ]
        );
    }

    #[test]
    fn test_unknown_type_survives_bytes() {
        let mut bytes = sample_bytes();
        bytes[0] = 0x9C;
        let chunk = Chunk::from_bytes(&bytes).unwrap();
        assert_eq!(chunk.chunk_type, ChunkType::Unknown(0x9Cu8 as i8));
        assert_eq!(chunk.chunk_type.to_string(), "UNK_9C");
        assert_eq!(chunk.to_bytes(), bytes);
    }

    #[test]
    fn test_17_bytes_is_truncated() {
        let bytes = sample_bytes();
        let err = Chunk::from_bytes(&bytes[..17]).unwrap_err();
        assert!(matches!(
            err,
            CinError::TruncatedInput {
                need: CHUNK_SIZE,
                available: 17,
                offset: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_sentinel_chunks() {
        let frame_end = Chunk::frame_end();
        assert_eq!(frame_end.to_bytes()[..2], [0x00, 0xFF]);
        assert!(frame_end.is_frame_end());
        assert!(!frame_end.is_object_end());
        assert_eq!(frame_end.chunk_type, ChunkType::Mask);
        assert_eq!(frame_end.prop, -1);

        let object_end = Chunk::object_end();
        assert_eq!(object_end.to_bytes()[..2], [0x00, 0xFE]);
        assert!(object_end.is_object_end());
        assert_eq!(object_end.leading_word(), OBJECT_END);
    }

    #[test]
    fn test_chunk_json_keys() {
        let chunk = Chunk::from_bytes(&sample_bytes()).unwrap();
        let value = serde_json::to_value(chunk).unwrap();
        assert_eq!(value["Type"], "CIN_SHAPE");
        assert_eq!(value["Prop"], 5);
        assert_eq!(value["Colour"]["Alpha"], 0xFFFF);
        assert_eq!(value["StartX"], -10);
        assert_eq!(value["EndY"], i16::MAX);

        let back: Chunk = serde_json::from_value(value).unwrap();
        assert_eq!(back, chunk);
    }

    #[test]
    fn test_chunk_json_rejects_bad_values() {
        let json = r#"{"Type":"CIN_MASK","Prop":300,"Colour":{"Red":0,"Green":0,"Blue":0,"Alpha":0},
                       "StartX":0,"StartY":0,"EndX":0,"EndY":0}"#;
        assert!(serde_json::from_str::<Chunk>(json).is_err());

        let json = r#"{"Type":"UNK_ZZ","Prop":0,"Colour":{"Red":0,"Green":0,"Blue":0,"Alpha":0},
                       "StartX":0,"StartY":0,"EndX":0,"EndY":0}"#;
        assert!(serde_json::from_str::<Chunk>(json).is_err());

        let json = r#"{"Type":"CIN_MASK","Prop":0,"StartX":0,"StartY":0,"EndX":0,"EndY":0}"#;
        assert!(serde_json::from_str::<Chunk>(json).is_err());
    }
}
