//! SAM format reader (text alignment files).
//!
//! Provides streaming reading of SAM (Sequence Alignment/Map) text files.
//! SAM is the text representation of BAM - same data, different encoding.
//!
//! # Design
//!
//! - Streaming reader (one line in memory at a time)
//! - Text parsing → the shared [`Record`] structure
//! - Header lines are collected up front; blank lines are skipped
//!
//! # Example
//!
//! ```no_run
//! use bamcmp::io::bam::SamReader;
//!
//! # fn main() -> bamcmp::Result<()> {
//! let mut sam = SamReader::from_path("input.sam")?;
//! println!("References: {}", sam.header().references.len());
//!
//! for record in sam.records() {
//!     let record = record?;
//!     println!("{}: {} bp", record.name, record.sequence.len());
//! }
//! # Ok(())
//! # }
//! ```

use super::cigar::parse_cigar;
use super::tags::parse_sam_tag;
use super::{Header, Record, Reference};
use crate::error::{BamcmpError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// SAM format reader.
pub struct SamReader<R: Read> {
    reader: BufReader<R>,
    header: Header,
    line_buffer: String,
    pending_line: Option<String>,
    /// 1-based number of the last line read
    line_number: usize,
}

impl SamReader<File> {
    /// Open a SAM file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(file)
    }
}

impl<R: Read> SamReader<R> {
    /// Create a new SAM reader from any Read source.
    ///
    /// # Example
    ///
    /// ```
    /// use bamcmp::io::bam::SamReader;
    /// use std::io::Cursor;
    ///
    /// # fn main() -> bamcmp::Result<()> {
    /// let data = b"@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:1000\n";
    /// let sam = SamReader::new(Cursor::new(data))?;
    /// assert_eq!(sam.header().reference_count(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(reader: R) -> Result<Self> {
        let mut sam_reader = SamReader {
            reader: BufReader::new(reader),
            header: Header::default(),
            line_buffer: String::new(),
            pending_line: None,
            line_number: 0,
        };

        sam_reader.parse_header()?;

        Ok(sam_reader)
    }

    /// Get a reference to the SAM header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Read the next record from the SAM file.
    ///
    /// Returns `Ok(Some(record))` if a record was read,
    /// `Ok(None)` if EOF was reached,
    /// or `Err` if an error occurred.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        // The first alignment line was consumed while parsing the header
        if let Some(line) = self.pending_line.take() {
            return parse_sam_record(&line, self.line_number).map(Some);
        }

        loop {
            self.line_buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.line_buffer)?;

            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.line_buffer.trim_end_matches(['\n', '\r']);

            // Skip empty lines and stray header lines
            if line.is_empty() || line.starts_with('@') {
                continue;
            }

            return parse_sam_record(line, self.line_number).map(Some);
        }
    }

    /// Parse SAM header lines (@HD, @SQ, etc.)
    fn parse_header(&mut self) -> Result<()> {
        let mut header_text = String::new();
        let mut references = Vec::new();

        loop {
            self.line_buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.line_buffer)?;

            if bytes_read == 0 {
                break;
            }
            self.line_number += 1;

            let line = self.line_buffer.trim_end_matches(['\n', '\r']);

            if line.starts_with('@') {
                header_text.push_str(line);
                header_text.push('\n');

                if line.starts_with("@SQ") {
                    if let Some(reference) = parse_sq_line(line) {
                        references.push(reference);
                    }
                }
            } else if !line.is_empty() {
                // First alignment line - save it for read_record
                self.pending_line = Some(line.to_string());
                break;
            }
        }

        self.header = Header {
            text: header_text,
            references,
        };

        Ok(())
    }

    /// Create a borrowing iterator over SAM records.
    pub fn records(&mut self) -> SamRecordIterator<'_, R> {
        SamRecordIterator { reader: self }
    }
}

/// Iterator over SAM records.
pub struct SamRecordIterator<'a, R: Read> {
    reader: &'a mut SamReader<R>,
}

impl<'a, R: Read> Iterator for SamRecordIterator<'a, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}

/// Owning iterator over SAM records.
pub struct SamIntoRecords<R: Read> {
    reader: SamReader<R>,
}

impl<R: Read> Iterator for SamIntoRecords<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}

impl<R: Read> IntoIterator for SamReader<R> {
    type Item = Result<Record>;
    type IntoIter = SamIntoRecords<R>;

    fn into_iter(self) -> Self::IntoIter {
        SamIntoRecords { reader: self }
    }
}

/// Parse a @SQ header line to extract reference information.
///
/// Format: @SQ\tSN:chr1\tLN:248956422
fn parse_sq_line(line: &str) -> Option<Reference> {
    let mut name = None;
    let mut length = None;

    for field in line.split('\t').skip(1) {
        if let Some((key, value)) = field.split_once(':') {
            match key {
                "SN" => name = Some(value.to_string()),
                "LN" => length = value.parse::<u32>().ok(),
                _ => {}
            }
        }
    }

    match (name, length) {
        (Some(name), Some(length)) => Some(Reference { name, length }),
        _ => None,
    }
}

fn parse_position(field: &str, what: &str, line: usize) -> Result<Option<i32>> {
    let position: i32 = field.parse().map_err(|_| BamcmpError::InvalidSamFormat {
        line,
        msg: format!("Invalid {}: {}", what, field),
    })?;
    // 1-based in SAM, 0 means unavailable
    Ok((position > 0).then(|| position - 1))
}

/// Parse a SAM alignment line into a [`Record`].
///
/// Format: QNAME FLAG RNAME POS MAPQ CIGAR RNEXT PNEXT TLEN SEQ QUAL [TAGS]
pub fn parse_sam_record(line: &str, line_number: usize) -> Result<Record> {
    let invalid = |msg: String| BamcmpError::InvalidSamFormat {
        line: line_number,
        msg,
    };

    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() < 11 {
        return Err(invalid(format!(
            "Expected at least 11 fields, found {}",
            fields.len()
        )));
    }

    // 1. QNAME
    let name = fields[0].to_string();

    // 2. FLAG
    let flags: u16 = fields[1]
        .parse()
        .map_err(|_| invalid(format!("Invalid FLAG: {}", fields[1])))?;

    // 3. RNAME
    let reference_name = (fields[2] != "*").then(|| fields[2].to_string());

    // 4. POS
    let position = parse_position(fields[3], "POS", line_number)?;

    // 5. MAPQ
    let mapq: u8 = fields[4]
        .parse()
        .map_err(|_| invalid(format!("Invalid MAPQ: {}", fields[4])))?;
    let mapq = (mapq != 255).then_some(mapq);

    // 6. CIGAR
    let cigar = parse_cigar(fields[5]).map_err(invalid)?;

    // 7. RNEXT ("=" means same as RNAME)
    let mate_reference_name = match fields[6] {
        "*" => None,
        "=" => reference_name.clone(),
        other => Some(other.to_string()),
    };

    // 8. PNEXT
    let mate_position = parse_position(fields[7], "PNEXT", line_number)?;

    // 9. TLEN
    let template_length: i32 = fields[8]
        .parse()
        .map_err(|_| invalid(format!("Invalid TLEN: {}", fields[8])))?;

    // 10. SEQ
    let sequence = if fields[9] == "*" {
        Vec::new()
    } else {
        fields[9].as_bytes().to_vec()
    };

    // 11. QUAL (ASCII Phred+33)
    let quality = if fields[10] == "*" {
        Vec::new()
    } else {
        fields[10].bytes().map(|b| b.saturating_sub(33)).collect()
    };

    // 12. Optional tags
    let tags = fields[11..]
        .iter()
        .map(|field| parse_sam_tag(field))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(invalid)?;

    Ok(Record {
        name,
        flags,
        reference_name,
        position,
        mapq,
        cigar,
        mate_reference_name,
        mate_position,
        template_length,
        sequence,
        quality,
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::bam::{CigarOp, TagValue};
    use std::io::Cursor;

    #[test]
    fn test_parse_sq_line() {
        let reference = parse_sq_line("@SQ\tSN:chr1\tLN:248956422").unwrap();
        assert_eq!(reference.name, "chr1");
        assert_eq!(reference.length, 248956422);
    }

    #[test]
    fn test_sam_reader_basic() {
        let sam_data = b"@HD\tVN:1.6\tSO:unsorted\n\
                         @SQ\tSN:chr1\tLN:1000\n\
                         read1\t0\tchr1\t100\t60\t10M\t=\t150\t60\tACGTACGTAC\t**********\tNM:i:0\tRG:Z:grp1\n";

        let mut reader = SamReader::new(Cursor::new(sam_data)).unwrap();

        assert_eq!(reader.header().references.len(), 1);
        assert_eq!(reader.header().references[0].name, "chr1");

        let records: Vec<_> = reader.records().collect();
        assert_eq!(records.len(), 1);

        let record = records[0].as_ref().unwrap();
        assert_eq!(record.name, "read1");
        assert_eq!(record.position, Some(99)); // 0-based
        assert_eq!(record.cigar, vec![CigarOp::Match(10)]);
        assert_eq!(record.sequence, b"ACGTACGTAC");
        assert_eq!(record.quality, vec![9; 10]);
        assert_eq!(record.mate_reference_name.as_deref(), Some("chr1"));
        assert_eq!(record.mate_position, Some(149));
        assert_eq!(record.tags.len(), 2);
        assert_eq!(record.tags[0].value, TagValue::Int(0));
        assert_eq!(record.tags[1].name_str(), "RG");
    }

    #[test]
    fn test_sam_reader_unmapped() {
        let sam_data = b"@HD\tVN:1.6\n\
                         read1\t4\t*\t0\t255\t*\t*\t0\t0\tACGT\t*\n";

        let mut reader = SamReader::new(Cursor::new(sam_data)).unwrap();

        let record = reader.read_record().unwrap().unwrap();
        assert_eq!(record.name, "read1");
        assert_eq!(record.flags, 4);
        assert_eq!(record.reference_name, None);
        assert_eq!(record.position, None);
        assert_eq!(record.mapq, None);
        assert!(record.cigar.is_empty());
        assert!(record.quality.is_empty());

        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_sam_reader_without_header() {
        let sam_data = b"r1\t0\t*\t0\t0\t*\t*\t0\t0\tA\tI\nr2\t0\t*\t0\t0\t*\t*\t0\t0\tC\tI\n";
        let reader = SamReader::new(Cursor::new(sam_data)).unwrap();
        let names: Vec<String> = reader.into_iter().map(|r| r.unwrap().name).collect();
        assert_eq!(names, vec!["r1", "r2"]);
    }

    #[test]
    fn test_error_reports_line_number() {
        let sam_data = b"@HD\tVN:1.6\n\
                         r1\t0\t*\t0\t0\t*\t*\t0\t0\tA\tI\n\
                         r2\tX\t*\t0\t0\t*\t*\t0\t0\tA\tI\n";
        let mut reader = SamReader::new(Cursor::new(sam_data)).unwrap();
        assert!(reader.read_record().is_ok());

        match reader.read_record() {
            Err(BamcmpError::InvalidSamFormat { line, msg }) => {
                assert_eq!(line, 3);
                assert!(msg.contains("FLAG"));
            }
            other => panic!("expected InvalidSamFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_too_few_fields() {
        let err = parse_sam_record("r1\t0\t*", 1).unwrap_err();
        assert!(err.to_string().contains("Expected at least 11 fields"));
    }

    #[test]
    fn test_bad_tag() {
        let err = parse_sam_record("r1\t0\t*\t0\t0\t*\t*\t0\t0\tA\tI\tNM:x:1", 4).unwrap_err();
        assert!(err.to_string().contains("line 4"));
    }
}
