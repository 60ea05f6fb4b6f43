//! Streaming decompression for BGZF input.
//!
//! BGZF is a series of concatenated gzip members, so a multi-member gzip
//! decoder reads it front to back without buffering the whole file. Input
//! that does not start with the gzip magic bytes (31, 139) is passed through
//! unchanged, which also accepts uncompressed BAM streams.

use crate::error::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// gzip member magic bytes
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Buffer size for decompressed reads (one BGZF block)
const BUFFER_SIZE: usize = 64 * 1024;

/// Buffered reader that transparently inflates gzip/BGZF input.
pub struct CompressedReader {
    inner: Box<dyn BufRead + Send>,
}

impl CompressedReader {
    /// Wrap a reader, detecting compression from its first bytes.
    pub fn new<R: Read + Send + 'static>(reader: R) -> io::Result<Self> {
        let mut buffered = BufReader::with_capacity(BUFFER_SIZE, reader);
        let is_gzip = buffered.fill_buf()?.starts_with(&GZIP_MAGIC);

        let inner: Box<dyn BufRead + Send> = if is_gzip {
            Box::new(BufReader::with_capacity(
                BUFFER_SIZE,
                MultiGzDecoder::new(buffered),
            ))
        } else {
            Box::new(buffered)
        };

        Ok(Self { inner })
    }

    /// Open a local file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file)?)
    }
}

impl Read for CompressedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for CompressedReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_multi_member_stream() {
        // Two members, like two BGZF blocks
        let mut data = gzip(b"hello ");
        data.extend(gzip(b"world"));

        let mut reader = CompressedReader::new(Cursor::new(data)).unwrap();
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello world");
    }

    #[test]
    fn test_uncompressed_passthrough() {
        let mut reader = CompressedReader::new(Cursor::new(b"BAM\x01plain".to_vec())).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"BAM\x01plain");
    }

    #[test]
    fn test_empty_input() {
        let mut reader = CompressedReader::new(Cursor::new(Vec::new())).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert!(out.is_empty());
    }
}
