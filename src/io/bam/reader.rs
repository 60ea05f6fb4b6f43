//! BAM streaming reader.
//!
//! Provides a streaming interface for reading BAM files with constant memory.
//!
//! # Design
//!
//! - Iterator-based interface (one record in memory at a time)
//! - Header read separately from records
//! - Records are not accumulated
//!
//! # Usage
//!
//! ```no_run
//! use bamcmp::io::bam::BamReader;
//!
//! # fn main() -> bamcmp::Result<()> {
//! let mut bam = BamReader::from_path("alignments.bam")?;
//!
//! println!("Header: {} references", bam.header().reference_count());
//!
//! for result in bam.records() {
//!     let record = result?;
//!     println!("{} at {}", record.name, record.position.unwrap_or(-1));
//! }
//! # Ok(())
//! # }
//! ```

use super::header::{read_header, Header};
use super::record::{parse_record, Record};
use crate::io::compression::CompressedReader;
use std::io::{self, BufRead};
use std::path::Path;

/// BAM file reader with streaming interface.
///
/// The header is read once during construction, then records are streamed.
///
/// # Buffer Reuse
///
/// Maintains an internal buffer that's reused across record reads to avoid
/// repeated allocations. This buffer grows to accommodate the largest record
/// seen, then stays at that size for subsequent reads.
pub struct BamReader<R> {
    /// Underlying decompressed reader
    reader: R,
    /// BAM header (read during construction)
    header: Header,
    /// Reusable buffer for reading record data
    buffer: Vec<u8>,
}

impl<R: BufRead> BamReader<R> {
    /// Create a new BAM reader over a decompressed stream.
    ///
    /// Reads and validates the BAM header immediately.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Cannot read header
    /// - Invalid magic bytes
    /// - Header is malformed
    pub fn new(mut reader: R) -> io::Result<Self> {
        let header = read_header(&mut reader)?;
        Ok(Self {
            reader,
            header,
            buffer: Vec::with_capacity(512),
        })
    }

    /// Get a reference to the BAM header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Create a borrowing iterator over BAM records.
    pub fn records(&mut self) -> Records<'_, R> {
        Records { reader: self }
    }

    /// Read a single record.
    ///
    /// Returns `Ok(None)` when EOF is reached at a record boundary. EOF inside
    /// a record is an error.
    pub fn read_record(&mut self) -> io::Result<Option<Record>> {
        // Read block size (4 bytes, little-endian)
        let mut size_buf = [0u8; 4];
        let mut filled = 0;
        while filled < size_buf.len() {
            match self.reader.read(&mut size_buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "Truncated BAM record block size",
                    ))
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        let block_size = i32::from_le_bytes(size_buf);
        if block_size < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid block size: {}", block_size),
            ));
        }
        let block_size = block_size as usize;

        // parse_record expects the block size at the start of the buffer
        self.buffer.clear();
        self.buffer.extend_from_slice(&size_buf);
        self.buffer.resize(4 + block_size, 0);
        self.reader.read_exact(&mut self.buffer[4..])?;

        parse_record(&self.buffer, &self.header).map(Some)
    }
}

impl BamReader<CompressedReader> {
    /// Open a BGZF-compressed BAM file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let reader = CompressedReader::from_path(path)?;
        Self::new(reader).map_err(crate::BamcmpError::from_bam)
    }
}

/// Iterator over BAM records.
///
/// Created by [`BamReader::records()`].
pub struct Records<'a, R> {
    reader: &'a mut BamReader<R>,
}

impl<'a, R: BufRead> Iterator for Records<'a, R> {
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}

/// Owning iterator over BAM records.
pub struct IntoRecords<R> {
    reader: BamReader<R>,
}

impl<R: BufRead> Iterator for IntoRecords<R> {
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}

impl<R: BufRead> IntoIterator for BamReader<R> {
    type Item = io::Result<Record>;
    type IntoIter = IntoRecords<R>;

    fn into_iter(self) -> Self::IntoIter {
        IntoRecords { reader: self }
    }
}
