//! Alignment comparison engine
//!
//! Pipeline per record pair, in file order:
//!
//! ```text
//! AlignmentSource ─→ normalize ─→ equal ─(unequal)─→ diff ─→ ComparisonResult
//! ```
//!
//! - [`normalize`]: sort and/or drop tags, producing a fresh value
//! - [`equal`]: exact structural equality over every field
//! - [`diff`]: typed explanation of an inequality already detected by [`equal`]
//! - [`Comparisons`] / [`compare`]: lockstep driver over two sources

mod diff;
mod driver;
mod equality;
mod normalize;
pub mod report;

pub use diff::{diff, Change, Diff, DiffEntry, DiffValue, FieldPath, TagPart};
pub use driver::{compare, ComparisonResult, Comparisons, Summary};
pub use equality::equal;
pub use normalize::{normalize, NormalizedRecord};

/// What to do when one input runs out of records before the other.
///
/// Records past the end of the shorter input are never compared under any
/// policy; the policy only decides whether that is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LengthMismatchPolicy {
    /// Stop silently at the shorter input
    Ignore,
    /// Stop at the shorter input and log a warning
    #[default]
    Warn,
    /// Fail with [`BamcmpError::LengthMismatch`](crate::BamcmpError::LengthMismatch)
    Error,
}

/// Comparison settings.
#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    /// Drop all tags before comparing
    pub ignore_tags: bool,
    /// Put tags in canonical order before comparing
    pub sort_tags: bool,
    /// Reporting of unequal record counts
    pub length_mismatch: LengthMismatchPolicy,
}
