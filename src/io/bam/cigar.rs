//! CIGAR operations.

use std::fmt;

/// A single CIGAR operation with its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CigarOp {
    /// M: alignment match (can be sequence match or mismatch)
    Match(u32),
    /// I: insertion to the reference
    Insertion(u32),
    /// D: deletion from the reference
    Deletion(u32),
    /// N: skipped region from the reference
    RefSkip(u32),
    /// S: soft clipping (clipped sequence present in SEQ)
    SoftClip(u32),
    /// H: hard clipping (clipped sequence not present in SEQ)
    HardClip(u32),
    /// P: padding (silent deletion from padded reference)
    Padding(u32),
    /// =: sequence match
    SeqMatch(u32),
    /// X: sequence mismatch
    SeqMismatch(u32),
}

impl CigarOp {
    /// Decode a BAM-encoded operation (length << 4 | op code).
    pub fn from_bam(encoded: u32) -> Option<Self> {
        let length = encoded >> 4;
        let op = match encoded & 0xF {
            0 => CigarOp::Match(length),
            1 => CigarOp::Insertion(length),
            2 => CigarOp::Deletion(length),
            3 => CigarOp::RefSkip(length),
            4 => CigarOp::SoftClip(length),
            5 => CigarOp::HardClip(length),
            6 => CigarOp::Padding(length),
            7 => CigarOp::SeqMatch(length),
            8 => CigarOp::SeqMismatch(length),
            _ => return None,
        };
        Some(op)
    }

    /// Build an operation from its SAM character.
    pub fn from_char(op: char, length: u32) -> Option<Self> {
        let op = match op {
            'M' => CigarOp::Match(length),
            'I' => CigarOp::Insertion(length),
            'D' => CigarOp::Deletion(length),
            'N' => CigarOp::RefSkip(length),
            'S' => CigarOp::SoftClip(length),
            'H' => CigarOp::HardClip(length),
            'P' => CigarOp::Padding(length),
            '=' => CigarOp::SeqMatch(length),
            'X' => CigarOp::SeqMismatch(length),
            _ => return None,
        };
        Some(op)
    }

    /// SAM character for this operation.
    pub fn as_char(&self) -> char {
        match self {
            CigarOp::Match(_) => 'M',
            CigarOp::Insertion(_) => 'I',
            CigarOp::Deletion(_) => 'D',
            CigarOp::RefSkip(_) => 'N',
            CigarOp::SoftClip(_) => 'S',
            CigarOp::HardClip(_) => 'H',
            CigarOp::Padding(_) => 'P',
            CigarOp::SeqMatch(_) => '=',
            CigarOp::SeqMismatch(_) => 'X',
        }
    }

    /// Operation length.
    pub fn len(&self) -> u32 {
        match *self {
            CigarOp::Match(n)
            | CigarOp::Insertion(n)
            | CigarOp::Deletion(n)
            | CigarOp::RefSkip(n)
            | CigarOp::SoftClip(n)
            | CigarOp::HardClip(n)
            | CigarOp::Padding(n)
            | CigarOp::SeqMatch(n)
            | CigarOp::SeqMismatch(n) => n,
        }
    }

    /// Whether the operation has zero length.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of reference bases this operation consumes.
    pub fn reference_length(&self) -> i32 {
        match self {
            CigarOp::Match(n)
            | CigarOp::Deletion(n)
            | CigarOp::RefSkip(n)
            | CigarOp::SeqMatch(n)
            | CigarOp::SeqMismatch(n) => *n as i32,
            _ => 0,
        }
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len(), self.as_char())
    }
}

/// Render a CIGAR as SAM text, `*` when empty.
pub fn format_cigar(ops: &[CigarOp]) -> String {
    if ops.is_empty() {
        return "*".to_string();
    }
    ops.iter().map(|op| op.to_string()).collect()
}

/// Parse a SAM CIGAR string (e.g., "10M2I5M"). `*` yields an empty CIGAR.
pub fn parse_cigar(cigar_str: &str) -> Result<Vec<CigarOp>, String> {
    if cigar_str == "*" {
        return Ok(Vec::new());
    }

    let mut cigar = Vec::new();
    let mut num_str = String::new();

    for ch in cigar_str.chars() {
        if ch.is_ascii_digit() {
            num_str.push(ch);
            continue;
        }

        let length: u32 = num_str
            .parse()
            .map_err(|_| format!("Invalid CIGAR length before '{}' in {}", ch, cigar_str))?;
        let op = CigarOp::from_char(ch, length)
            .ok_or_else(|| format!("Unknown CIGAR op: {}", ch))?;

        cigar.push(op);
        num_str.clear();
    }

    if !num_str.is_empty() {
        return Err(format!("CIGAR ends without an operation: {}", cigar_str));
    }

    Ok(cigar)
}
