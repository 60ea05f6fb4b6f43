//! Tag normalization applied before comparison.

use crate::io::bam::{Record, Tag};
use std::ops::Deref;

/// A record whose tag collection has been through [`normalize`].
///
/// Only [`normalize`] constructs one, so equality and diffing always see
/// records prepared under the same policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord(Record);

impl NormalizedRecord {
    /// Borrow the underlying record.
    pub fn record(&self) -> &Record {
        &self.0
    }

    /// Take the underlying record.
    pub fn into_inner(self) -> Record {
        self.0
    }
}

impl Deref for NormalizedRecord {
    type Target = Record;

    fn deref(&self) -> &Record {
        &self.0
    }
}

/// Apply the tag policy to `record`.
///
/// Sorting happens first, then ignoring: with `sort_tags` the tags are put in
/// canonical order (key, then type, then value; equal tags keep their file
/// order), and with `ignore_tags` the collection is emptied. All other fields
/// pass through unchanged.
///
/// # Example
///
/// ```
/// use bamcmp::compare::normalize;
/// use bamcmp::io::bam::{Record, Tag, TagValue};
///
/// let mut record = Record::new();
/// record.tags = vec![
///     Tag::new(*b"NM", TagValue::Int(1)),
///     Tag::new(*b"AS", TagValue::Int(50)),
/// ];
///
/// let sorted = normalize(record.clone(), true, false);
/// assert_eq!(sorted.tags[0].name, *b"AS");
///
/// let stripped = normalize(record, true, true);
/// assert!(stripped.tags.is_empty());
/// ```
pub fn normalize(mut record: Record, sort_tags: bool, ignore_tags: bool) -> NormalizedRecord {
    if sort_tags {
        record.tags.sort_by(Tag::canonical_cmp);
    }
    if ignore_tags {
        record.tags.clear();
    }
    NormalizedRecord(record)
}
