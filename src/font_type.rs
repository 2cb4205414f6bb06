//! Classify a WOFF font by its flavor without decoding any tables

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Result, WoffError};
use crate::header::WoffHeader;

/// `sfntVersion` of fonts with TrueType outlines
pub const OPENTYPE_TRUETYPE: u32 = 0x00010000;
/// `true`, used by older Apple TrueType fonts
pub const OPENTYPE_TRUETYPE_MAC: u32 = 0x74727565;
/// `OTTO`, fonts with CFF outlines
pub const OPENTYPE_CFF: u32 = 0x4F54544F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontType {
    TrueType,
    TrueTypeMac,
    Cff,
    Unknown,
}

impl FontType {
    pub fn from_flavor(flavor: u32) -> Self {
        match flavor {
            OPENTYPE_TRUETYPE => FontType::TrueType,
            OPENTYPE_TRUETYPE_MAC => FontType::TrueTypeMac,
            OPENTYPE_CFF => FontType::Cff,
            _ => FontType::Unknown,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FontType::TrueType => "OpenType TrueType (.TTF)",
            FontType::TrueTypeMac => "OpenType TrueType for Mac (.TTF)",
            FontType::Cff => "OpenType PostScript (.OTF)",
            FontType::Unknown => "unknown or not a WOFF font",
        }
    }

    /// File extension conventionally used for this kind of font
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            FontType::TrueType | FontType::TrueTypeMac => Some("ttf"),
            FontType::Cff => Some("otf"),
            FontType::Unknown => None,
        }
    }
}

/// Read the flavor from the header of the WOFF file at `path`
pub fn read_flavor(path: impl AsRef<Path>) -> Result<u32> {
    let file = File::open(path).map_err(WoffError::InputUnreadable)?;
    let header = WoffHeader::read(&mut BufReader::new(file))?;
    Ok(header.flavor_u32())
}

/// The flavor of the WOFF file at `path`, or 0 if it cannot be read.
pub fn detect_type(path: impl AsRef<Path>) -> u32 {
    let path = path.as_ref();
    match read_flavor(path) {
        Ok(flavor) => flavor,
        Err(err) => {
            log::debug!("cannot read flavor of {}: {err}", path.display());
            0
        }
    }
}

pub fn font_type(path: impl AsRef<Path>) -> FontType {
    FontType::from_flavor(detect_type(path))
}
