//! BAM header parsing.
//!
//! Format:
//! - Magic: "BAM\1" (4 bytes)
//! - l_text: SAM header text length (4 bytes, little-endian)
//! - text: SAM header text (l_text bytes)
//! - n_ref: Number of references (4 bytes, little-endian)
//! - For each reference:
//!   - l_name: Reference name length including null (4 bytes)
//!   - name: Reference name (null-terminated)
//!   - l_ref: Reference length (4 bytes)

use std::io::{self, Read};

const BAM_MAGIC: &[u8; 4] = b"BAM\x01";

/// Reference sequence declared in a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Reference name (e.g., "chr1")
    pub name: String,
    /// Reference length in bases
    pub length: u32,
}

impl Reference {
    /// Create a new reference entry.
    pub fn new(name: String, length: u32) -> Self {
        Self { name, length }
    }
}

/// Alignment file header: raw SAM header text plus the reference dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// SAM header text (@HD, @SQ, @RG, ... lines)
    pub text: String,
    /// Reference sequences, indexed by reference ID
    pub references: Vec<Reference>,
}

impl Header {
    /// Create a header.
    pub fn new(text: String, references: Vec<Reference>) -> Self {
        Self { text, references }
    }

    /// Number of reference sequences.
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Name of the reference with the given ID.
    pub fn reference_name(&self, id: usize) -> Option<&str> {
        self.references.get(id).map(|r| r.name.as_str())
    }
}

fn invalid_data(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

fn read_i32<R: Read>(reader: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_length<R: Read>(reader: &mut R, what: &str) -> io::Result<usize> {
    let value = read_i32(reader)?;
    usize::try_from(value).map_err(|_| invalid_data(format!("Invalid {}: {}", what, value)))
}

/// Read and validate a BAM header from a decompressed stream.
pub fn read_header<R: Read>(reader: &mut R) -> io::Result<Header> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != BAM_MAGIC {
        return Err(invalid_data(format!(
            "Invalid BAM magic: expected {:?}, got {:?}",
            BAM_MAGIC, magic
        )));
    }

    let l_text = read_length(reader, "header text length")?;
    let mut text = vec![0u8; l_text];
    reader.read_exact(&mut text)?;
    // Header text may be NUL-padded
    while text.last() == Some(&0) {
        text.pop();
    }
    let text = String::from_utf8(text)
        .map_err(|_| invalid_data("Header text is not valid UTF-8".to_string()))?;

    let n_ref = read_length(reader, "reference count")?;
    let mut references = Vec::with_capacity(n_ref.min(1 << 16));
    for _ in 0..n_ref {
        let l_name = read_length(reader, "reference name length")?;
        let mut name = vec![0u8; l_name];
        reader.read_exact(&mut name)?;
        if name.last() == Some(&0) {
            name.pop();
        }
        let name = String::from_utf8(name)
            .map_err(|_| invalid_data("Reference name is not valid UTF-8".to_string()))?;

        let mut length = [0u8; 4];
        reader.read_exact(&mut length)?;
        references.push(Reference {
            name,
            length: u32::from_le_bytes(length),
        });
    }

    Ok(Header { text, references })
}
