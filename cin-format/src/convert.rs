//! Conversion between CIN bytes and their JSON form

use std::fmt;
use std::path::{Path, PathBuf};

use crate::document::CinDocument;
use crate::error::CinError;

/// File formats the converter reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Cin,
    Json,
}

impl Format {
    /// File extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Cin => "cin",
            Self::Json => "json",
        }
    }

    /// Detect the format of a file from its extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, CinError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "cin" => Ok(Self::Cin),
            "json" => Ok(Self::Json),
            _ => Err(CinError::UnsupportedInputKind(format!(
                "{} (use .cin or .json)",
                path.display()
            ))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Read a document from `data` stored in `format`
pub fn decode(data: &[u8], format: Format) -> Result<CinDocument, CinError> {
    match format {
        Format::Cin => CinDocument::from_cin(data),
        Format::Json => Ok(serde_json::from_slice(data)?),
    }
}

/// Serialize a document as `format`; JSON output is pretty-printed
pub fn encode(document: &CinDocument, format: Format) -> Result<Vec<u8>, CinError> {
    match format {
        Format::Cin => document.to_cin(),
        Format::Json => Ok(document.to_json()?.into_bytes()),
    }
}

/// Convert `data` from one format to the other
pub fn convert(data: &[u8], from: Format, to: Format) -> Result<Vec<u8>, CinError> {
    if from == to {
        return Err(CinError::SameFormat(from));
    }
    encode(&decode(data, from)?, to)
}

/// Output path for converting `input` to `target`: the extension is appended
///
/// `anim.cin` becomes `anim.cin.json`, keeping the source name visible.
pub fn output_path(input: &Path, target: Format) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(target.extension());
    PathBuf::from(name)
}
