//! I/O module: streaming alignment readers
//!
//! Every format decodes into the shared [`bam::Record`] so the comparison
//! layer never sees format differences. Readers stream one record at a time.

pub mod bam;
pub mod compression;
pub mod cram;

pub use bam::{BamReader, Record, SamReader};
pub use compression::CompressedReader;
pub use cram::CramReader;

use crate::error::{BamcmpError, Result};
use std::fs::File;
use std::path::Path;

/// On-disk alignment format, chosen by file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentFormat {
    /// BGZF-compressed binary (`.bam`)
    Bam,
    /// Reference-compressed (`.cram`)
    Cram,
    /// Text (anything else)
    Sam,
}

impl AlignmentFormat {
    /// Pick the format from the path's final suffix.
    ///
    /// Matching is exact and lowercase: `reads.BAM` is read as SAM.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("bam") => AlignmentFormat::Bam,
            Some("cram") => AlignmentFormat::Cram,
            _ => AlignmentFormat::Sam,
        }
    }
}

/// Any supported alignment file, iterated as records in file order.
pub enum AlignmentSource {
    Bam(bam::IntoRecords<CompressedReader>),
    Sam(bam::SamIntoRecords<File>),
    Cram(CramReader),
}

impl AlignmentSource {
    /// Open `path`, dispatching on its suffix.
    ///
    /// `reference` is only consulted for CRAM input, where it is required.
    ///
    /// # Errors
    ///
    /// Returns [`BamcmpError::MissingReference`](crate::BamcmpError::MissingReference)
    /// for CRAM without a reference, and I/O or format errors if the file or
    /// its header cannot be read.
    pub fn open<P: AsRef<Path>>(path: P, reference: Option<&Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = AlignmentFormat::from_path(path);
        log::debug!("Opening {} as {:?}", path.display(), format);

        Ok(match format {
            AlignmentFormat::Bam => AlignmentSource::Bam(BamReader::from_path(path)?.into_iter()),
            AlignmentFormat::Sam => AlignmentSource::Sam(SamReader::from_path(path)?.into_iter()),
            AlignmentFormat::Cram => AlignmentSource::Cram(CramReader::from_path(path, reference)?),
        })
    }

    /// Format this source was opened as.
    pub fn format(&self) -> AlignmentFormat {
        match self {
            AlignmentSource::Bam(_) => AlignmentFormat::Bam,
            AlignmentSource::Sam(_) => AlignmentFormat::Sam,
            AlignmentSource::Cram(_) => AlignmentFormat::Cram,
        }
    }
}

impl Iterator for AlignmentSource {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            AlignmentSource::Bam(records) => {
                records.next().map(|r| r.map_err(BamcmpError::from_bam))
            }
            AlignmentSource::Sam(records) => records.next(),
            AlignmentSource::Cram(records) => records.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_from_suffix() {
        assert_eq!(AlignmentFormat::from_path("a.bam"), AlignmentFormat::Bam);
        assert_eq!(AlignmentFormat::from_path("dir/a.cram"), AlignmentFormat::Cram);
        assert_eq!(AlignmentFormat::from_path("a.sam"), AlignmentFormat::Sam);
        assert_eq!(AlignmentFormat::from_path("a.txt"), AlignmentFormat::Sam);
        assert_eq!(AlignmentFormat::from_path("alignments"), AlignmentFormat::Sam);
        assert_eq!(AlignmentFormat::from_path("a.BAM"), AlignmentFormat::Sam);
        assert_eq!(AlignmentFormat::from_path("a.bam.sam"), AlignmentFormat::Sam);
    }

    #[test]
    fn test_open_cram_without_reference() {
        let result = AlignmentSource::open("reads.cram", None);
        assert!(matches!(result, Err(BamcmpError::MissingReference { .. })));
    }

    #[test]
    fn test_open_missing_file() {
        let result = AlignmentSource::open("/nonexistent/reads.bam", None);
        assert!(matches!(result, Err(BamcmpError::Io(_))));
    }

    #[test]
    fn test_open_sam() {
        let mut file = tempfile::Builder::new().suffix(".sam").tempfile().unwrap();
        writeln!(file, "@SQ\tSN:chr1\tLN:100").unwrap();
        writeln!(file, "r1\t0\tchr1\t5\t60\t4M\t*\t0\t0\tACGT\tIIII\tNM:i:0").unwrap();
        file.flush().unwrap();

        let source = AlignmentSource::open(file.path(), None).unwrap();
        assert_eq!(source.format(), AlignmentFormat::Sam);
        let records: Vec<Record> = source.collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].position, Some(4));
    }

    #[test]
    fn test_malformed_bam_is_format_error() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut data = Vec::new();
        data.extend_from_slice(b"BAM\x01");
        data.extend_from_slice(&0i32.to_le_bytes()); // l_text
        data.extend_from_slice(&0i32.to_le_bytes()); // n_ref
        data.extend_from_slice(&(-1i32).to_le_bytes()); // block_size

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data).unwrap();

        let mut file = tempfile::Builder::new().suffix(".bam").tempfile().unwrap();
        file.write_all(&encoder.finish().unwrap()).unwrap();
        file.flush().unwrap();

        let mut source = AlignmentSource::open(file.path(), None).unwrap();
        match source.next() {
            Some(Err(BamcmpError::InvalidBamFormat { msg })) => {
                assert!(msg.contains("block size"), "{}", msg);
            }
            other => panic!("expected InvalidBamFormat, got {:?}", other.map(|r| r.is_ok())),
        }
    }

    #[test]
    fn test_bad_bam_magic_is_format_error() {
        let mut file = tempfile::Builder::new().suffix(".bam").tempfile().unwrap();
        file.write_all(b"not a bam file").unwrap();
        file.flush().unwrap();

        let result = AlignmentSource::open(file.path(), None);
        assert!(matches!(result, Err(BamcmpError::InvalidBamFormat { .. })));
    }
}
