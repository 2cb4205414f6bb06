//! Builds small WOFF files for tests

#![allow(dead_code)]

use std::io::Write;

use bytes::BufMut;
use flate2::{Compression, write::ZlibEncoder};
use font_types::Tag;
use unwoff::sfnt::{sfnt_size, table_checksum};
use unwoff::header::TableDirectoryEntry;

pub struct TestTable {
    pub tag: Tag,
    /// Length of the table once decompressed
    pub orig_length: u32,
    /// The bytes stored in the WOFF, compressed or not
    pub stored: Vec<u8>,
    pub checksum: u32,
}

impl TestTable {
    /// A table stored without compression
    pub fn raw(tag: &[u8; 4], data: &[u8]) -> Self {
        let tag = Tag::new(tag);
        Self {
            tag,
            orig_length: data.len() as u32,
            stored: data.to_vec(),
            checksum: table_checksum(tag, data),
        }
    }

    /// A zlib compressed table
    pub fn compressed(tag: &[u8; 4], data: &[u8]) -> Self {
        let stored = zlib(data);
        assert!(stored.len() < data.len(), "test data must be compressible");
        Self {
            stored,
            ..Self::raw(tag, data)
        }
    }
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Data that compresses well
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i % 7) as u8 + seed).collect()
}

pub struct WoffBuilder {
    pub signature: [u8; 4],
    pub flavor: Tag,
    /// Stored in the WOFF in this order
    pub tables: Vec<TestTable>,
    pub total_sfnt_size: Option<u32>,
}

impl WoffBuilder {
    pub fn new(flavor: &[u8; 4]) -> Self {
        Self {
            signature: *b"wOFF",
            flavor: Tag::new(flavor),
            tables: Vec::new(),
            total_sfnt_size: None,
        }
    }

    pub fn table(mut self, table: TestTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let num_tables = self.tables.len();
        let mut offset = 44 + 20 * num_tables as u32;
        let mut entries = Vec::new();
        for table in &self.tables {
            entries.push(TableDirectoryEntry {
                tag: table.tag,
                woff_offset: offset,
                woff_length: table.stored.len() as u32,
                orig_length: table.orig_length,
                orig_checksum: table.checksum,
            });
            offset += (table.stored.len() as u32 + 3) & !3;
        }
        let total_sfnt_size = self
            .total_sfnt_size
            .unwrap_or_else(|| sfnt_size(&entries) as u32);

        let mut out: Vec<u8> = Vec::new();
        out.put_slice(&self.signature);
        out.put_slice(&self.flavor.to_be_bytes());
        out.put_u32(offset); // length
        out.put_u16(num_tables as u16);
        out.put_u16(0); // reserved
        out.put_u32(total_sfnt_size);
        out.put_u16(1); // majorVersion
        out.put_u16(0); // minorVersion
        out.put_u32(0); // metaOffset
        out.put_u32(0); // metaLength
        out.put_u32(0); // metaOrigLength
        out.put_u32(0); // privOffset
        out.put_u32(0); // privLength

        for entry in &entries {
            out.put_slice(&entry.tag.to_be_bytes());
            out.put_u32(entry.woff_offset);
            out.put_u32(entry.woff_length);
            out.put_u32(entry.orig_length);
            out.put_u32(entry.orig_checksum);
        }
        for table in &self.tables {
            out.put_slice(&table.stored);
            out.resize((out.len() + 3) & !3, 0);
        }
        out
    }
}

/// A table record read back from a converted font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputRecord {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

fn be_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_be_bytes([data[pos], data[pos + 1]])
}

fn be_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_be_bytes(data[pos..pos + 4].try_into().unwrap())
}

/// Read the table directory of an sfnt font
pub fn read_records(font: &[u8]) -> Vec<OutputRecord> {
    let num_tables = be_u16(font, 4) as usize;
    (0..num_tables)
        .map(|i| {
            let pos = 12 + 16 * i;
            OutputRecord {
                tag: Tag::new(font[pos..pos + 4].try_into().unwrap()),
                checksum: be_u32(font, pos + 4),
                offset: be_u32(font, pos + 8),
                length: be_u32(font, pos + 12),
            }
        })
        .collect()
}

/// searchRange, entrySelector and rangeShift of an sfnt font
pub fn read_search_fields(font: &[u8]) -> (u16, u16, u16) {
    (be_u16(font, 6), be_u16(font, 8), be_u16(font, 10))
}

pub fn table_data<'a>(font: &'a [u8], record: &OutputRecord) -> &'a [u8] {
    &font[record.offset as usize..(record.offset + record.length) as usize]
}
