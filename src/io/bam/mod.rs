//! BAM and SAM decoding into a shared alignment record model.
//!
//! - [`BamReader`]: binary BAM over a BGZF stream
//! - [`SamReader`]: plain-text SAM
//!
//! Both produce [`Record`] values with reference names resolved, so records
//! from different encodings of the same data compare equal.

mod cigar;
mod header;
mod reader;
mod record;
mod sam_reader;
mod tags;

pub use cigar::{format_cigar, parse_cigar, CigarOp};
pub use header::{read_header, Header, Reference};
pub use reader::{BamReader, IntoRecords, Records};
pub use record::{parse_record, Record};
pub use sam_reader::{parse_sam_record, SamIntoRecords, SamReader, SamRecordIterator};
pub use tags::{parse_sam_tag, parse_tags, ArrayType, ArrayValue, Tag, TagType, TagValue};
