//! CIN document model and its JSON mapping

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::chunk::Chunk;
use crate::error::CinError;
use crate::header::Header;
use crate::parser::parse_cin;
use crate::writer::write_cin;
use crate::{FRAME_END, OBJECT_END, TRAILER_LEN};

/// JSON key of an object's end chunk
const END_CHUNK_KEY: &str = "EndChunk";

/// JSON key prefix of an object's frames
const FRAME_KEY_PREFIX: &str = "Frame_";

/// JSON key for the frame at `index` (`Frame_00`, `Frame_01`, ...)
pub fn frame_key(index: usize) -> String {
    format!("{FRAME_KEY_PREFIX}{index:02}")
}

fn parse_frame_key(key: &str) -> Option<usize> {
    let digits = key.strip_prefix(FRAME_KEY_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Non-empty run of chunks making up one animation step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Chunk>", into = "Vec<Chunk>")]
pub struct Frame(Vec<Chunk>);

impl Frame {
    /// Create a frame; fails if `chunks` is empty
    pub fn new(chunks: Vec<Chunk>) -> Result<Self, CinError> {
        if chunks.is_empty() {
            return Err(CinError::malformed("frame has no chunks"));
        }
        Ok(Self(chunks))
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.0
    }

    pub fn into_chunks(self) -> Vec<Chunk> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; frames hold at least one chunk
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<Chunk>> for Frame {
    type Error = CinError;

    fn try_from(chunks: Vec<Chunk>) -> Result<Self, Self::Error> {
        Self::new(chunks)
    }
}

impl From<Frame> for Vec<Chunk> {
    fn from(frame: Frame) -> Self {
        frame.0
    }
}

/// Frames of one overlay object, followed by its end chunk
///
/// In JSON an object is a map: `Frame_00`, `Frame_01`, ... in index order,
/// then `EndChunk`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CinObject {
    pub frames: Vec<Frame>,
    pub end_chunk: Chunk,
}

impl CinObject {
    pub fn new(frames: Vec<Frame>, end_chunk: Chunk) -> Self {
        Self { frames, end_chunk }
    }

    /// All chunks in file order, end chunk last
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.frames
            .iter()
            .flat_map(|frame| frame.chunks())
            .chain(std::iter::once(&self.end_chunk))
    }

    /// Number of chunk records the object occupies, end chunk included
    pub fn chunk_count(&self) -> usize {
        self.frames.iter().map(Frame::len).sum::<usize>() + 1
    }
}

impl Serialize for CinObject {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.frames.len() + 1))?;
        for (index, frame) in self.frames.iter().enumerate() {
            map.serialize_entry(&frame_key(index), frame)?;
        }
        map.serialize_entry(END_CHUNK_KEY, &self.end_chunk)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for CinObject {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ObjectVisitor)
    }
}

struct ObjectVisitor;

impl<'de> Visitor<'de> for ObjectVisitor {
    type Value = CinObject;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of Frame_NN chunk lists and an EndChunk")
    }

    fn visit_map<A>(self, mut map: A) -> Result<CinObject, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut frames = BTreeMap::new();
        let mut end_chunk = None;

        while let Some(key) = map.next_key::<String>()? {
            if key == END_CHUNK_KEY {
                if end_chunk.is_some() {
                    return Err(de::Error::duplicate_field(END_CHUNK_KEY));
                }
                end_chunk = Some(map.next_value::<Chunk>()?);
            } else if let Some(index) = parse_frame_key(&key) {
                let frame = map.next_value::<Frame>()?;
                if frames.insert(index, frame).is_some() {
                    return Err(de::Error::custom(format!("duplicate frame index in {key:?}")));
                }
            } else {
                return Err(de::Error::custom(format!("unexpected object key {key:?}")));
            }
        }

        let end_chunk = end_chunk.ok_or_else(|| de::Error::missing_field(END_CHUNK_KEY))?;

        // Frame indices must run 0..n with no gaps
        if let Some((expected, _)) = frames
            .keys()
            .enumerate()
            .find(|&(position, &index)| position != index)
        {
            return Err(de::Error::custom(format!(
                "object is missing {}",
                frame_key(expected)
            )));
        }

        Ok(CinObject {
            frames: frames.into_values().collect(),
            end_chunk,
        })
    }
}

/// A whole CIN file: header, opaque trailer and objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CinDocument {
    #[serde(rename = "Header")]
    pub header: Header,
    /// Opaque bytes between the header and the first object
    #[serde(rename = "u8_Unknown")]
    pub unknown: [u8; TRAILER_LEN],
    #[serde(rename = "Objects")]
    pub objects: Vec<CinObject>,
}

impl CinDocument {
    pub fn new(header: Header, unknown: [u8; TRAILER_LEN], objects: Vec<CinObject>) -> Self {
        Self {
            header,
            unknown,
            objects,
        }
    }

    /// Decode a CIN file
    pub fn from_cin(data: &[u8]) -> Result<Self, CinError> {
        parse_cin(data)
    }

    /// Encode to CIN bytes
    pub fn to_cin(&self) -> Result<Vec<u8>, CinError> {
        write_cin(self)
    }

    /// Read the JSON form of a document
    pub fn from_json(json: &str) -> Result<Self, CinError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the JSON form of a document, indented by two spaces
    pub fn to_json(&self) -> Result<String, CinError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the header tag and the frame and object boundaries decode back
    /// as stored
    ///
    /// Encoding never calls this; a document that fails here still encodes, but
    /// decoding the result will not give the same objects back.
    pub fn validate(&self) -> Result<(), CinError> {
        self.header.validate()?;

        let declared = usize::from(self.header.object_count);
        if declared != self.objects.len() {
            return Err(CinError::malformed(format!(
                "header ObjectCount is {declared} but document has {} objects",
                self.objects.len()
            )));
        }

        for (obj_idx, object) in self.objects.iter().enumerate() {
            for (frame_idx, frame) in object.frames.iter().enumerate() {
                let chunks = frame.chunks();
                if chunks[0].is_object_end() {
                    return Err(CinError::malformed(format!(
                        "object {obj_idx} {} starts with the object end value {OBJECT_END}",
                        frame_key(frame_idx)
                    )));
                }

                let last = chunks.len() - 1;
                for (chunk_idx, chunk) in chunks.iter().enumerate() {
                    if chunk_idx < last && chunk.is_frame_end() {
                        return Err(CinError::malformed(format!(
                            "object {obj_idx} {} chunk {chunk_idx} ends the frame early",
                            frame_key(frame_idx)
                        )));
                    }
                }
                if !chunks[last].is_frame_end() {
                    return Err(CinError::malformed(format!(
                        "object {obj_idx} {} does not end with frame end value {FRAME_END}",
                        frame_key(frame_idx)
                    )));
                }
            }

            if !object.end_chunk.is_object_end() {
                return Err(CinError::malformed(format!(
                    "object {obj_idx} EndChunk leads with {} instead of {OBJECT_END}",
                    object.end_chunk.leading_word()
                )));
            }
        }

        Ok(())
    }
}
