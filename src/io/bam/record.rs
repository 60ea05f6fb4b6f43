//! Alignment record data model and BAM record decoding.
//!
//! Every input format decodes into the same [`Record`]: reference IDs are
//! resolved to names, positions are 0-based, a missing MAPQ (255) is `None`
//! and a missing quality string is empty.

use super::cigar::CigarOp;
use super::header::Header;
use super::tags::{parse_tags, Tag};
use std::io;

/// One read's alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Read name (QNAME)
    pub name: String,
    /// Bitwise FLAG
    pub flags: u16,
    /// Reference sequence name (RNAME), `None` for `*`
    pub reference_name: Option<String>,
    /// 0-based leftmost position, `None` if unmapped
    pub position: Option<i32>,
    /// Mapping quality, `None` when unavailable (255)
    pub mapq: Option<u8>,
    /// CIGAR operations
    pub cigar: Vec<CigarOp>,
    /// Mate reference sequence name (RNEXT, resolved)
    pub mate_reference_name: Option<String>,
    /// 0-based mate position
    pub mate_position: Option<i32>,
    /// Observed template length (TLEN)
    pub template_length: i32,
    /// Bases as ASCII
    pub sequence: Vec<u8>,
    /// Phred quality scores (not ASCII-offset), empty when absent
    pub quality: Vec<u8>,
    /// Optional tags in file order
    pub tags: Vec<Tag>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }
}

/// BAM 4-bit base codes.
const BASES: &[u8; 16] = b"=ACMGRSVTWYHKDBN";

/// Fixed-size portion of a BAM record after block_size.
const FIXED_LEN: usize = 32;

fn invalid_data(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

fn le_i32(data: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn le_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn resolve_reference(header: &Header, id: i32, what: &str) -> io::Result<Option<String>> {
    if id < 0 {
        return Ok(None);
    }
    header
        .reference_name(id as usize)
        .map(|name| Some(name.to_string()))
        .ok_or_else(|| {
            invalid_data(format!(
                "{} ID {} not present in header ({} references)",
                what,
                id,
                header.reference_count()
            ))
        })
}

/// Decode one BAM record.
///
/// `data` starts with the 4-byte block_size field.
pub fn parse_record(data: &[u8], header: &Header) -> io::Result<Record> {
    if data.len() < 4 + FIXED_LEN {
        return Err(invalid_data(format!(
            "Record too short: {} bytes",
            data.len()
        )));
    }

    let block_size = le_i32(data, 0);
    if block_size < 0 || block_size as usize != data.len() - 4 {
        return Err(invalid_data(format!(
            "Block size {} does not match record length {}",
            block_size,
            data.len() - 4
        )));
    }

    let body = &data[4..];
    let ref_id = le_i32(body, 0);
    let pos = le_i32(body, 4);
    let l_read_name = body[8] as usize;
    let mapq = body[9];
    let n_cigar_op = le_u16(body, 12) as usize;
    let flags = le_u16(body, 14);
    let l_seq = le_i32(body, 16);
    let next_ref_id = le_i32(body, 20);
    let next_pos = le_i32(body, 24);
    let template_length = le_i32(body, 28);

    let l_seq = usize::try_from(l_seq)
        .map_err(|_| invalid_data(format!("Invalid sequence length: {}", l_seq)))?;

    let mut offset = FIXED_LEN;
    let needed = offset + l_read_name + n_cigar_op * 4 + l_seq.div_ceil(2) + l_seq;
    if body.len() < needed {
        return Err(invalid_data(format!(
            "Record truncated: need {} bytes, have {}",
            needed,
            body.len()
        )));
    }

    // Read name (null-terminated)
    let name_bytes = &body[offset..offset + l_read_name];
    let name_bytes = name_bytes.strip_suffix(&[0]).unwrap_or(name_bytes);
    let name = String::from_utf8(name_bytes.to_vec())
        .map_err(|_| invalid_data("Read name is not valid UTF-8".to_string()))?;
    offset += l_read_name;

    let mut cigar = Vec::with_capacity(n_cigar_op);
    for i in 0..n_cigar_op {
        let encoded = le_i32(body, offset + i * 4) as u32;
        let op = CigarOp::from_bam(encoded)
            .ok_or_else(|| invalid_data(format!("Invalid CIGAR op code: {}", encoded & 0xF)))?;
        cigar.push(op);
    }
    offset += n_cigar_op * 4;

    // Sequence (4-bit encoding, 2 bases per byte)
    let packed = &body[offset..offset + l_seq.div_ceil(2)];
    let sequence: Vec<u8> = (0..l_seq)
        .map(|i| {
            let byte = packed[i / 2];
            let code = if i % 2 == 0 { byte >> 4 } else { byte & 0xF };
            BASES[code as usize]
        })
        .collect();
    offset += l_seq.div_ceil(2);

    // Quality scores, all 0xFF when absent
    let quality = &body[offset..offset + l_seq];
    let quality = if quality.iter().all(|&q| q == 0xFF) {
        Vec::new()
    } else {
        quality.to_vec()
    };
    offset += l_seq;

    let tags = parse_tags(&body[offset..])?;

    Ok(Record {
        name,
        flags,
        reference_name: resolve_reference(header, ref_id, "Reference")?,
        position: (pos >= 0).then_some(pos),
        mapq: (mapq != 255).then_some(mapq),
        cigar,
        mate_reference_name: resolve_reference(header, next_ref_id, "Mate reference")?,
        mate_position: (next_pos >= 0).then_some(next_pos),
        template_length,
        sequence,
        quality,
        tags,
    })
}
