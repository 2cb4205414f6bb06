use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use font_types::Tag;

use crate::{
    Round4,
    error::{BoxError, Result, SizeContext, WoffError, bail_if},
    header::{TableDirectory, TableDirectoryEntry, WOFF1_SIG, WoffHeader},
    options::{ChecksumPolicy, Options},
    sfnt::{
        SFNT_ENTRY_SIZE, SFNT_HEADER_SIZE, TableRecord, encode_table_records, table_checksum,
        validate_sfnt_size, write_table_directory_header,
    },
};

type DecompressZ<'a> = dyn FnMut(&[u8], usize) -> Result<Vec<u8>, BoxError> + 'a;

#[cfg(feature = "z")]
fn decompress_z(compressed_data: &[u8], size_hint: usize) -> Result<Vec<u8>, BoxError> {
    use flate2::{Decompress, FlushDecompress, Status};
    // One spare byte so that a stream which inflates past `size_hint` is seen as too long
    let mut output: Vec<u8> = Vec::with_capacity(size_hint + 1);
    let mut decompressor = Decompress::new(true);
    let status =
        decompressor.decompress_vec(compressed_data, &mut output, FlushDecompress::Finish)?;
    match status {
        Status::StreamEnd => Ok(output),
        _ if output.len() > size_hint => Ok(output),
        _ => Err("zlib stream ended early".into()),
    }
}

#[cfg(feature = "z")]
/// Decompress a WOFF1 file held in memory using the built-in zlib decompressor
pub fn decompress_woff1(raw_woff_data: &[u8]) -> Result<Vec<u8>> {
    Converter::new(Options::default()).decompress(raw_woff_data)
}

#[allow(clippy::type_complexity)]
/// Decompress a WOFF1 file held in memory using a custom zlib decompressor passed as a closure
pub fn decompress_woff1_with_custom_z(
    raw_woff_data: &[u8],
    decompress_z: &mut dyn FnMut(&[u8], usize) -> Result<Vec<u8>, BoxError>,
) -> Result<Vec<u8>> {
    Converter::with_custom_z(Options::default(), decompress_z).decompress(raw_woff_data)
}

#[cfg(feature = "z")]
/// Convert the WOFF file at `input_path` into an OpenType file at `output_path`
pub fn convert(input_path: impl AsRef<Path>, output_path: impl AsRef<Path>) -> Result<Conversion> {
    Converter::new(Options::default()).convert(input_path, output_path)
}

/// Summary of a finished conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub flavor: Tag,
    /// The table directory of the output, in tag order
    pub tables: Vec<TableRecord>,
    /// Total size of the OpenType font in bytes
    pub length: u64,
}

/// Converts WOFF 1.0 fonts to OpenType.
///
/// The output is written in two passes. The sfnt header is written first, followed by a
/// zeroed table directory and then the tables themselves in the order their data appears in the
/// WOFF. Once every table's final offset and length is known, the table directory is rewritten
/// in tag order.
pub struct Converter<'a> {
    options: Options,
    decompress_z: Box<DecompressZ<'a>>,
}

#[cfg(feature = "z")]
impl Default for Converter<'_> {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl<'a> Converter<'a> {
    #[cfg(feature = "z")]
    pub fn new(options: Options) -> Self {
        Self::with_custom_z(options, decompress_z)
    }

    /// Use `decompress_z` to inflate tables.
    ///
    /// It is called with the compressed bytes of a table (a zlib stream, header included) and
    /// the expected decompressed length.
    pub fn with_custom_z(
        options: Options,
        decompress_z: impl FnMut(&[u8], usize) -> Result<Vec<u8>, BoxError> + 'a,
    ) -> Self {
        Self {
            options,
            decompress_z: Box::new(decompress_z),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Convert the WOFF file at `input_path` into an OpenType file at `output_path`.
    ///
    /// The output file is only created once the WOFF header and table directory have been read
    /// and validated. If a later step fails a partially written file is left behind.
    pub fn convert(
        &mut self,
        input_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<Conversion> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        let input = File::open(input_path).map_err(WoffError::InputUnreadable)?;
        let mut input = BufReader::new(input);
        let (header, table_directory) = self.read_directory(&mut input)?;

        let output = File::create(output_path).map_err(WoffError::OutputUnwritable)?;
        let mut output = BufWriter::new(output);
        let conversion = self.write_sfnt(&header, &table_directory, &mut input, &mut output)?;
        output.flush().map_err(WoffError::OutputUnwritable)?;

        log::info!(
            "converted {} to {} ({} tables, {} bytes)",
            input_path.display(),
            output_path.display(),
            conversion.tables.len(),
            conversion.length
        );
        Ok(conversion)
    }

    /// Convert a WOFF file held in memory
    pub fn decompress(&mut self, raw_woff_data: &[u8]) -> Result<Vec<u8>> {
        let mut input = Cursor::new(raw_woff_data);
        let (header, table_directory) = self.read_directory(&mut input)?;

        let mut output = Cursor::new(Vec::with_capacity(header.total_sfnt_size as usize));
        self.write_sfnt(&header, &table_directory, &mut input, &mut output)?;
        Ok(output.into_inner())
    }

    /// Convert from any seekable source into any seekable sink
    pub fn convert_stream<R, W>(&mut self, input: &mut R, output: &mut W) -> Result<Conversion>
    where
        R: Read + Seek,
        W: Write + Seek,
    {
        let (header, table_directory) = self.read_directory(input)?;
        self.write_sfnt(&header, &table_directory, input, output)
    }

    /// Parse the header and table directory and check that they describe a font of the declared size
    fn read_directory(&self, input: &mut (impl Read + Seek)) -> Result<(WoffHeader, TableDirectory)> {
        input
            .seek(SeekFrom::Start(0))
            .map_err(WoffError::InputUnreadable)?;
        let header = WoffHeader::read(input)?;

        if !header.has_woff1_signature() {
            bail_if!(
                self.options.verify_signature,
                WoffError::InvalidSignature(header.signature)
            );
            log::warn!(
                "signature is '{}' rather than '{WOFF1_SIG}', converting anyway",
                header.signature
            );
        }
        if header.reserved != 0 {
            log::warn!("reserved header field is {}, expected 0", header.reserved);
        }

        let table_directory = TableDirectory::read(input, header.num_tables as usize)?;
        validate_sfnt_size(&header, &table_directory)?;

        Ok((header, table_directory))
    }

    fn write_sfnt(
        &mut self,
        header: &WoffHeader,
        table_directory: &TableDirectory,
        input: &mut (impl Read + Seek),
        output: &mut (impl Write + Seek),
    ) -> Result<Conversion> {
        // Write the sfnt header followed by space for the table directory
        let table_directory_size = table_directory.len() * SFNT_ENTRY_SIZE;
        let mut out_header: Vec<u8> = Vec::with_capacity(SFNT_HEADER_SIZE + table_directory_size);
        write_table_directory_header(&mut out_header, header.flavor, header.num_tables);
        let table_directory_start = out_header.len() as u64;
        out_header.resize(out_header.len() + table_directory_size, 0);

        output
            .seek(SeekFrom::Start(0))
            .map_err(WoffError::OutputUnwritable)?;
        let mut position = write_all(output, &out_header, 0)?;

        // Tables are written in the order their data appears in the WOFF
        let mut records = Vec::with_capacity(table_directory.len());
        for idx in table_directory.indices_by_offset() {
            let table = &table_directory[idx];
            let mut data = self.read_table(input, table)?;
            self.check_checksum(table, &data)?;

            let offset = to_u32_offset(position, header)?;
            let length = data.len() as u32;
            log::debug!(
                "'{}': {} bytes at {} -> {} bytes at {}",
                table.tag,
                table.stored_length(),
                table.woff_offset,
                length,
                offset
            );

            // Pad table to 4 bytes
            data.resize(Round4!(data.len()), 0);
            position = write_all(output, &data, position)?;

            records.push(TableRecord {
                tag: table.tag,
                checksum: table.orig_checksum,
                offset,
                length,
            });
        }
        debug_assert_eq!(position, header.total_sfnt_size as u64);

        // Go back and fill in the table directory, now in tag order
        let directory_data = encode_table_records(&mut records);
        output
            .seek(SeekFrom::Start(table_directory_start))
            .map_err(WoffError::OutputUnwritable)?;
        write_all(output, &directory_data, table_directory_start)?;
        output.flush().map_err(WoffError::OutputUnwritable)?;

        Ok(Conversion {
            flavor: header.flavor,
            tables: records,
            length: position,
        })
    }

    /// Read a table's data from the WOFF, inflating it if it was compressed
    fn read_table(
        &mut self,
        input: &mut (impl Read + Seek),
        table: &TableDirectoryEntry,
    ) -> Result<Vec<u8>> {
        input
            .seek(SeekFrom::Start(table.woff_offset as u64))
            .map_err(WoffError::InputUnreadable)?;
        let mut stored_data = vec![0u8; table.stored_length() as usize];
        input
            .read_exact(&mut stored_data)
            .map_err(WoffError::reading("table data"))?;

        if !table.is_compressed() {
            if table.woff_length > table.orig_length {
                log::warn!(
                    "'{}' is stored in {} bytes but is only {} bytes long",
                    table.tag,
                    table.woff_length,
                    table.orig_length
                );
            }
            return Ok(stored_data);
        }

        let decompressed_data = (self.decompress_z)(&stored_data, table.orig_length as usize)
            .map_err(|source| WoffError::DecompressionFailed {
                tag: table.tag,
                source,
            })?;
        bail_if!(
            decompressed_data.len() != table.orig_length as usize,
            WoffError::SizeMismatch {
                context: SizeContext::Table(table.tag),
                expected: table.orig_length as u64,
                actual: decompressed_data.len() as u64,
            }
        );
        Ok(decompressed_data)
    }

    fn check_checksum(&self, table: &TableDirectoryEntry, data: &[u8]) -> Result<()> {
        if self.options.checksums == ChecksumPolicy::Trust {
            return Ok(());
        }
        let actual = table_checksum(table.tag, data);
        if actual == table.orig_checksum {
            return Ok(());
        }
        let err = WoffError::ChecksumMismatch {
            tag: table.tag,
            expected: table.orig_checksum,
            actual,
        };
        bail_if!(self.options.checksums == ChecksumPolicy::Reject, err);
        log::warn!("{err}");
        Ok(())
    }
}

/// Write `data` at `position`, returning the position just past it
fn write_all(output: &mut impl Write, data: &[u8], position: u64) -> Result<u64> {
    output
        .write_all(data)
        .map_err(WoffError::OutputUnwritable)?;
    Ok(position + data.len() as u64)
}

// Offsets are bounded by the validated `totalSfntSize`, which is itself a u32
fn to_u32_offset(position: u64, header: &WoffHeader) -> Result<u32> {
    u32::try_from(position).map_err(|_| WoffError::SizeMismatch {
        context: SizeContext::TotalSfntSize,
        expected: header.total_sfnt_size as u64,
        actual: position,
    })
}
