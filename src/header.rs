//! Parsing of the WOFF header and table directory
//!
//! <https://www.w3.org/TR/WOFF/#WOFFHeader>

use std::io::Read;
use std::ops::Deref;

use bytes::Buf;
use font_types::Tag;

use crate::Round4;
use crate::error::{Result, WoffError, bail_if, u32_will_overflow};

pub const WOFF1_SIG: Tag = Tag::new(b"wOFF");

/// Size of the WOFF 1.0 header in bytes
pub const WOFF_HEADER_SIZE: usize = 44;
/// Size of a single WOFF 1.0 table directory entry in bytes
pub const WOFF_TABLE_ENTRY_SIZE: usize = 20;

/// WOFF 1.0 header
///
/// All numeric fields are in host order. `signature` and `flavor` are kept as opaque tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WoffHeader {
    /// `wOFF` for a well-formed file (only checked when asked to)
    pub signature: Tag,
    /// The "sfnt version" of the input font.
    pub flavor: Tag,
    /// Total size of the WOFF file.
    pub length: u32,
    /// Number of entries in directory of font tables.
    pub num_tables: u16,
    /// Reserved; set to 0.
    pub reserved: u16,
    /// Total size needed for the uncompressed font data, including the sfnt header, directory, and font tables (including padding).
    pub total_sfnt_size: u32,
    /// Major version of the WOFF file.
    pub major_version: u16,
    /// Minor version of the WOFF file.
    pub minor_version: u16,
    /// Offset to metadata block, from beginning of WOFF file.
    pub meta_offset: u32,
    /// Length of compressed metadata block.
    pub meta_length: u32,
    /// Uncompressed size of metadata block.
    pub meta_orig_length: u32,
    /// Offset to private data block, from beginning of WOFF file.
    pub priv_offset: u32,
    /// Length of private data block.
    pub priv_length: u32,
}

impl WoffHeader {
    pub fn parse(input: &mut impl Buf) -> Result<Self> {
        Ok(Self {
            signature: Tag::from_u32(input.try_get_u32()?),
            flavor: Tag::from_u32(input.try_get_u32()?),
            length: input.try_get_u32()?,
            num_tables: input.try_get_u16()?,
            reserved: input.try_get_u16()?,
            total_sfnt_size: input.try_get_u32()?,
            major_version: input.try_get_u16()?,
            minor_version: input.try_get_u16()?,
            meta_offset: input.try_get_u32()?,
            meta_length: input.try_get_u32()?,
            meta_orig_length: input.try_get_u32()?,
            priv_offset: input.try_get_u32()?,
            priv_length: input.try_get_u32()?,
        })
    }

    /// Read exactly [`WOFF_HEADER_SIZE`] bytes from the start of `input` and parse them.
    pub fn read(input: &mut impl Read) -> Result<Self> {
        let mut raw = [0u8; WOFF_HEADER_SIZE];
        input
            .read_exact(&mut raw)
            .map_err(WoffError::reading("the WOFF header"))?;
        Self::parse(&mut &raw[..])
    }

    pub fn has_woff1_signature(&self) -> bool {
        self.signature == WOFF1_SIG
    }

    /// The flavor as a (host order) integer, e.g. `0x00010000` for TrueType outlines
    pub fn flavor_u32(&self) -> u32 {
        u32::from_be_bytes(self.flavor.to_be_bytes())
    }
}

/// A single entry of the WOFF table directory, exactly as it was parsed.
///
/// <https://www.w3.org/TR/WOFF/#TableDirectory>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDirectoryEntry {
    /// 4-byte sfnt table identifier.
    pub tag: Tag,
    /// Offset to the data, from beginning of WOFF file.
    pub woff_offset: u32,
    /// Length of the compressed data, excluding padding.
    pub woff_length: u32,
    /// Length of the uncompressed table, excluding padding.
    pub orig_length: u32,
    /// Checksum of the uncompressed table.
    pub orig_checksum: u32,
}

impl TableDirectoryEntry {
    pub fn parse(input: &mut impl Buf) -> Result<Self> {
        let entry = Self {
            tag: Tag::from_u32(input.try_get_u32()?),
            woff_offset: input.try_get_u32()?,
            woff_length: input.try_get_u32()?,
            orig_length: input.try_get_u32()?,
            orig_checksum: input.try_get_u32()?,
        };

        // Data that ends past 4GiB cannot be inside the file
        bail_if!(
            u32_will_overflow(entry.woff_offset, entry.stored_length()),
            WoffError::TruncatedInput { what: "table data" }
        );

        Ok(entry)
    }

    /// Whether the table was stored zlib-compressed.
    ///
    /// A table whose compressed length is not smaller than its original length is stored as-is.
    pub fn is_compressed(&self) -> bool {
        self.woff_length < self.orig_length
    }

    /// Number of bytes to read from the WOFF for this table
    pub fn stored_length(&self) -> u32 {
        if self.is_compressed() {
            self.woff_length
        } else {
            self.orig_length
        }
    }

    /// Length of the decompressed table once padded to a 4-byte boundary
    pub fn padded_orig_length(&self) -> u64 {
        Round4!(self.orig_length as u64)
    }
}

/// The WOFF table directory, in file order
#[derive(Debug, Clone)]
pub struct TableDirectory {
    pub tables: Vec<TableDirectoryEntry>,
}

impl Deref for TableDirectory {
    type Target = Vec<TableDirectoryEntry>;
    fn deref(&self) -> &Self::Target {
        &self.tables
    }
}

impl TableDirectory {
    pub fn parse(input: &mut impl Buf, num_tables: usize) -> Result<Self> {
        bail_if!(num_tables == 0, WoffError::EmptyDirectory);

        let mut tables = Vec::with_capacity(num_tables);
        for _ in 0..num_tables {
            tables.push(TableDirectoryEntry::parse(input)?);
        }
        Ok(Self { tables })
    }

    /// Read `num_tables` entries from `input`, which must be positioned directly after the header.
    pub fn read(input: &mut impl Read, num_tables: usize) -> Result<Self> {
        bail_if!(num_tables == 0, WoffError::EmptyDirectory);

        let mut raw = vec![0u8; num_tables * WOFF_TABLE_ENTRY_SIZE];
        input
            .read_exact(&mut raw)
            .map_err(WoffError::reading("the table directory"))?;
        Self::parse(&mut raw.as_slice(), num_tables)
    }

    /// Indices of the tables ordered by where their data lives in the WOFF.
    ///
    /// The sort is stable so tables sharing an offset keep their directory order.
    pub fn indices_by_offset(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.tables.len()).collect();
        indices.sort_by_key(|&idx| self.tables[idx].woff_offset);
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BufMut;

    fn header_bytes(num_tables: u16) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();
        out.put_slice(b"wOFF");
        out.put_slice(b"OTTO");
        out.put_u32(1234); // length
        out.put_u16(num_tables);
        out.put_u16(0); // reserved
        out.put_u32(5678); // totalSfntSize
        out.put_u16(1);
        out.put_u16(0);
        out.put_u32(0);
        out.put_u32(0);
        out.put_u32(0);
        out.put_u32(0);
        out.put_u32(0);
        out
    }

    #[test]
    fn parse_header() {
        let raw = header_bytes(3);
        assert_eq!(raw.len(), WOFF_HEADER_SIZE);
        let header = WoffHeader::read(&mut raw.as_slice()).unwrap();
        assert!(header.has_woff1_signature());
        assert_eq!(header.flavor, Tag::new(b"OTTO"));
        assert_eq!(header.flavor_u32(), 0x4F54544F);
        assert_eq!(header.length, 1234);
        assert_eq!(header.num_tables, 3);
        assert_eq!(header.total_sfnt_size, 5678);
        assert_eq!(header.major_version, 1);
    }

    #[test]
    fn short_header() {
        let raw = header_bytes(3);
        let err = WoffHeader::read(&mut &raw[..40]).unwrap_err();
        assert!(matches!(err, WoffError::TruncatedInput { .. }));
    }

    #[test]
    fn parse_directory() {
        let mut raw: Vec<u8> = Vec::new();
        for (tag, offset) in [(b"head", 200u32), (b"glyf", 100)] {
            raw.put_slice(tag);
            raw.put_u32(offset);
            raw.put_u32(40);
            raw.put_u32(54);
            raw.put_u32(0xDEADBEEF);
        }
        let directory = TableDirectory::read(&mut raw.as_slice(), 2).unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory[0].tag, Tag::new(b"head"));
        assert_eq!(directory[1].woff_offset, 100);
        assert!(directory[0].is_compressed());
        assert_eq!(directory[0].stored_length(), 40);
        assert_eq!(directory[0].padded_orig_length(), 56);
        assert_eq!(directory[0].orig_checksum, 0xDEADBEEF);
        assert_eq!(directory.indices_by_offset(), vec![1, 0]);
    }

    #[test]
    fn empty_directory() {
        let err = TableDirectory::read(&mut &[0u8; 0][..], 0).unwrap_err();
        assert!(matches!(err, WoffError::EmptyDirectory));
    }

    #[test]
    fn short_directory() {
        let raw = [0u8; WOFF_TABLE_ENTRY_SIZE + 3];
        let err = TableDirectory::read(&mut &raw[..], 2).unwrap_err();
        assert!(matches!(err, WoffError::TruncatedInput { .. }));
    }

    #[test]
    fn uncompressed_entry() {
        let entry = TableDirectoryEntry {
            tag: Tag::new(b"head"),
            woff_offset: 64,
            woff_length: 54,
            orig_length: 54,
            orig_checksum: 0,
        };
        assert!(!entry.is_compressed());
        assert_eq!(entry.stored_length(), 54);
    }
}
