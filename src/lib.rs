//! # bamcmp
//!
//! Record-by-record comparison of alignment files (BAM, SAM, CRAM).
//!
//! Two inputs are read in lockstep. Each record pair is optionally normalized
//! (tags sorted and/or dropped), checked for exact equality, and explained
//! with a typed [`Diff`](compare::Diff) when it differs.
//!
//! ## Example
//!
//! ```no_run
//! use bamcmp::compare::{compare, CompareOptions};
//! use bamcmp::io::AlignmentSource;
//!
//! # fn main() -> bamcmp::Result<()> {
//! let a = AlignmentSource::open("before.bam", None)?;
//! let b = AlignmentSource::open("after.bam", None)?;
//!
//! let options = CompareOptions {
//!     sort_tags: true,
//!     ..Default::default()
//! };
//!
//! for result in compare(a, b, &options)? {
//!     println!("{}", result);
//! }
//! # Ok(())
//! # }
//! ```

pub mod compare;
pub mod error;
pub mod io;

pub use error::{BamcmpError, Result, Side};
