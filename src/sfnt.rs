//! Output side: the OpenType table directory
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory>

use bytes::BufMut;
use font_types::Tag;

use crate::error::{Result, SizeContext, WoffError, bail_if};
use crate::header::{TableDirectoryEntry, WoffHeader};

/// Size of the sfnt header (sfntVersion through rangeShift)
pub const SFNT_HEADER_SIZE: usize = 12;
/// Size of a single table record in the sfnt table directory
pub const SFNT_ENTRY_SIZE: usize = 16;

const HEAD: Tag = Tag::new(b"head");

/// The binary search helper fields of the sfnt header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRange {
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
}

impl SearchRange {
    pub fn compute(num_tables: u16) -> Self {
        let mut max_pow2: u16 = 0;
        while 1u32 << (max_pow2 + 1) <= (num_tables as u32) {
            max_pow2 += 1;
        }
        let search_range = ((1u32 << max_pow2) << 4) as u16;
        let range_shift = ((num_tables as u32) << 4).saturating_sub(search_range as u32) as u16;
        Self {
            search_range,
            entry_selector: max_pow2,
            range_shift,
        }
    }
}

/// Writes the header of an OpenType table directory
pub fn write_table_directory_header(output: &mut impl BufMut, flavor: Tag, num_tables: u16) {
    let computed = SearchRange::compute(num_tables);
    output.put_slice(&flavor.to_be_bytes()); // sfnt version
    output.put_u16(num_tables);
    output.put_u16(computed.search_range);
    output.put_u16(computed.entry_selector);
    output.put_u16(computed.range_shift);
}

/// A table record as it is emitted into the OpenType table directory.
///
/// Built from a [`TableDirectoryEntry`] once the table has been written to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    pub tag: Tag,
    /// Carried over from the WOFF table directory unchanged
    pub checksum: u32,
    /// Where the table starts in the output, always a multiple of 4
    pub offset: u32,
    /// Unpadded length of the table
    pub length: u32,
}

impl TableRecord {
    pub fn write_into(&self, output: &mut impl BufMut) {
        output.put_slice(&self.tag.to_be_bytes());
        output.put_u32(self.checksum);
        output.put_u32(self.offset);
        output.put_u32(self.length);
    }
}

/// Serialize the table records sorted by tag.
///
/// Tags compare as raw bytes, so uppercase tags sort before lowercase ones.
pub fn encode_table_records(records: &mut [TableRecord]) -> Vec<u8> {
    records.sort_by_key(|record| record.tag);
    let mut out: Vec<u8> = Vec::with_capacity(records.len() * SFNT_ENTRY_SIZE);
    for record in records.iter() {
        record.write_into(&mut out);
    }
    out
}

/// The size of the decompressed font implied by the table directory:
/// header, table records and every table padded to 4 bytes.
pub fn sfnt_size(tables: &[TableDirectoryEntry]) -> u64 {
    let table_data: u64 = tables.iter().map(|t| t.padded_orig_length()).sum();
    (SFNT_HEADER_SIZE + tables.len() * SFNT_ENTRY_SIZE) as u64 + table_data
}

/// Check the header's `totalSfntSize` against the table directory
pub fn validate_sfnt_size(header: &WoffHeader, tables: &[TableDirectoryEntry]) -> Result<()> {
    let computed = sfnt_size(tables);
    bail_if!(
        computed != header.total_sfnt_size as u64,
        WoffError::SizeMismatch {
            context: SizeContext::TotalSfntSize,
            expected: header.total_sfnt_size as u64,
            actual: computed,
        }
    );
    Ok(())
}

/// OpenType table checksum: the wrapping sum of the data as big-endian u32s,
/// with the final partial word zero-padded.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(4);
    let mut sum = chunks
        .by_ref()
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .fold(0u32, u32::wrapping_add);
    let rem = chunks.remainder();
    if !rem.is_empty() {
        let mut last = [0u8; 4];
        last[..rem.len()].copy_from_slice(rem);
        sum = sum.wrapping_add(u32::from_be_bytes(last));
    }
    sum
}

/// Checksum of a table as it should appear in the table directory.
///
/// For `head` the `checkSumAdjustment` field is treated as zero.
pub fn table_checksum(tag: Tag, data: &[u8]) -> u32 {
    let checksum = compute_checksum(data);
    if tag == HEAD && data.len() >= 12 {
        let adjustment = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);
        checksum.wrapping_sub(adjustment)
    } else {
        checksum
    }
}
