//! Error types for bamcmp.
//!
//! Content mismatches are never errors: they are returned as
//! [`ComparisonResult`](crate::compare::ComparisonResult) values. Everything
//! here is fatal for a comparison run.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bamcmp operations
pub type Result<T> = std::result::Result<T, BamcmpError>;

/// Which of the two inputs an error or record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// First positional input
    First,
    /// Second positional input
    Second,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => write!(f, "first"),
            Side::Second => write!(f, "second"),
        }
    }
}

/// Error types that can occur in bamcmp
#[derive(Debug, Error)]
pub enum BamcmpError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed SAM text line
    #[error("Invalid SAM format at line {line}: {msg}")]
    InvalidSamFormat {
        /// Line number where error occurred (1-based)
        line: usize,
        /// Error message
        msg: String,
    },

    /// Malformed BAM header or record
    #[error("Invalid BAM format: {msg}")]
    InvalidBamFormat {
        /// Error message
        msg: String,
    },

    /// CRAM input given without a reference sequence file
    #[error("{} is CRAM and requires a reference sequence file (--reference)", .path.display())]
    MissingReference {
        /// The CRAM input
        path: PathBuf,
    },

    /// CRAM decoding failure reported by noodles
    #[error("CRAM decoding error: {msg}")]
    Cram {
        /// Error message
        msg: String,
    },

    /// A record could not be read from one of the inputs
    #[error("failed to read record {record} from {side} input: {source}")]
    Source {
        /// Input that failed
        side: Side,
        /// 1-based index of the record being read
        record: u64,
        /// Underlying decode error
        #[source]
        source: Box<BamcmpError>,
    },

    /// Inputs hold a different number of records and the policy is `Error`
    #[error("{exhausted} input ended after {compared} records but {longer} input has more", longer = other_side(.exhausted))]
    LengthMismatch {
        /// Input that ran out first
        exhausted: Side,
        /// Number of record pairs compared before it ran out
        compared: u64,
    },
}

fn other_side(side: &Side) -> Side {
    match side {
        Side::First => Side::Second,
        Side::Second => Side::First,
    }
}

impl BamcmpError {
    /// Attach the input side and record index to a decode error.
    pub fn in_source(self, side: Side, record: u64) -> Self {
        BamcmpError::Source {
            side,
            record,
            source: Box::new(self),
        }
    }

    /// Classify an error from the binary BAM decoder.
    ///
    /// Malformed or truncated data becomes [`BamcmpError::InvalidBamFormat`];
    /// anything else stays an I/O error.
    pub fn from_bam(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                BamcmpError::InvalidBamFormat { msg: e.to_string() }
            }
            _ => BamcmpError::Io(e),
        }
    }
}
