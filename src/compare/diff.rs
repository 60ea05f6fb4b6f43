//! Structured differences between two records.
//!
//! A [`Diff`] is an ordered list of [`DiffEntry`] values, one per located
//! difference. Fields are visited in a fixed order:
//!
//! `name, flag, reference_name, position, mapq, cigar, mate_reference_name,
//! mate_position, template_length, sequence, quality, tags`
//!
//! so the same pair of records always yields the same entries.
//!
//! # Tags
//!
//! Tags are walked by position up to the shorter collection:
//!
//! - different keys: `Changed` at `tags[i].key`
//! - different declared types: `TypeChanged` at `tags[i].value`
//! - same type, different values: `Changed` at `tags[i].value`
//!
//! Trailing tags on the longer side are `Removed` (left only) or `Added`
//! (right only) at `tags[i]`.

use super::normalize::NormalizedRecord;
use crate::io::bam::{format_cigar, Tag, TagType, TagValue};
use serde::{Serialize, Serializer};
use std::fmt;

fn display<T: fmt::Display, S: Serializer>(
    value: &T,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Which part of a tag an entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagPart {
    /// The whole `(key, type, value)` triple
    Whole,
    /// The two-character key
    Key,
    /// The typed value
    Value,
}

/// Location of a difference within a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Name,
    Flag,
    ReferenceName,
    Position,
    Mapq,
    Cigar,
    MateReferenceName,
    MatePosition,
    TemplateLength,
    Sequence,
    Quality,
    /// Tag at `index` in the normalized tag collection
    Tag { index: usize, part: TagPart },
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldPath::Name => "name",
            FieldPath::Flag => "flag",
            FieldPath::ReferenceName => "reference_name",
            FieldPath::Position => "position",
            FieldPath::Mapq => "mapq",
            FieldPath::Cigar => "cigar",
            FieldPath::MateReferenceName => "mate_reference_name",
            FieldPath::MatePosition => "mate_position",
            FieldPath::TemplateLength => "template_length",
            FieldPath::Sequence => "sequence",
            FieldPath::Quality => "quality",
            FieldPath::Tag { index, part } => {
                return match part {
                    TagPart::Whole => write!(f, "tags[{}]", index),
                    TagPart::Key => write!(f, "tags[{}].key", index),
                    TagPart::Value => write!(f, "tags[{}].value", index),
                };
            }
        };
        f.write_str(name)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        display(self, serializer)
    }
}

/// Payload of a diff entry.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffValue {
    /// Field absent (`*` in SAM)
    Missing,
    Int(i64),
    Text(String),
    Tag(Tag),
    TagValue(TagValue),
}

impl fmt::Display for DiffValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffValue::Missing => f.write_str("*"),
            DiffValue::Int(value) => write!(f, "{}", value),
            DiffValue::Text(value) => f.write_str(value),
            DiffValue::Tag(tag) => write!(f, "{}", tag),
            DiffValue::TagValue(value) => write!(f, "{}", value),
        }
    }
}

impl Serialize for DiffValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DiffValue::Missing => serializer.serialize_none(),
            DiffValue::Int(value) => serializer.serialize_i64(*value),
            other => display(other, serializer),
        }
    }
}

/// What changed at a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    /// Present on both sides with different values
    Changed { left: DiffValue, right: DiffValue },
    /// Present only on the right
    Added { value: DiffValue },
    /// Present only on the left
    Removed { value: DiffValue },
    /// Tag declared with a different type on each side
    TypeChanged {
        #[serde(serialize_with = "display")]
        left: TagType,
        #[serde(serialize_with = "display")]
        right: TagType,
    },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Changed { left, right } => write!(f, "{} -> {}", left, right),
            Change::Added { value } => write!(f, "added {}", value),
            Change::Removed { value } => write!(f, "removed {}", value),
            Change::TypeChanged { left, right } => write!(f, "type {} -> {}", left, right),
        }
    }
}

/// One located difference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    pub path: FieldPath,
    #[serde(flatten)]
    pub change: Change,
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.change)
    }
}

/// Ordered differences between two records, never empty when produced by
/// [`diff`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diff(Vec<DiffEntry>);

impl Diff {
    /// Entries in field order.
    pub fn entries(&self) -> &[DiffEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffEntry> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Diff {
    type Item = &'a DiffEntry;
    type IntoIter = std::slice::Iter<'a, DiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", entry)?;
        }
        f.write_str("}")
    }
}

fn text(value: &Option<String>) -> DiffValue {
    match value {
        Some(value) => DiffValue::Text(value.clone()),
        None => DiffValue::Missing,
    }
}

/// 0-based position rendered 1-based, as in SAM text.
fn position(value: &Option<i32>) -> DiffValue {
    match value {
        Some(value) => DiffValue::Int(i64::from(*value) + 1),
        None => DiffValue::Missing,
    }
}

fn bytes(value: &[u8], offset: u8) -> DiffValue {
    if value.is_empty() {
        DiffValue::Missing
    } else {
        DiffValue::Text(value.iter().map(|&b| char::from(b.wrapping_add(offset))).collect())
    }
}

struct Collector {
    entries: Vec<DiffEntry>,
}

impl Collector {
    fn push(&mut self, path: FieldPath, change: Change) {
        self.entries.push(DiffEntry { path, change });
    }

    fn field<T, F>(&mut self, path: FieldPath, left: &T, right: &T, render: F)
    where
        T: PartialEq + ?Sized,
        F: Fn(&T) -> DiffValue,
    {
        if left != right {
            self.push(
                path,
                Change::Changed {
                    left: render(left),
                    right: render(right),
                },
            );
        }
    }

    fn tags(&mut self, left: &[Tag], right: &[Tag]) {
        for (index, (l, r)) in left.iter().zip(right).enumerate() {
            if l.name != r.name {
                self.push(
                    FieldPath::Tag { index, part: TagPart::Key },
                    Change::Changed {
                        left: DiffValue::Text(l.name_str().to_string()),
                        right: DiffValue::Text(r.name_str().to_string()),
                    },
                );
            }

            let path = FieldPath::Tag { index, part: TagPart::Value };
            if l.tag_type() != r.tag_type() {
                self.push(
                    path,
                    Change::TypeChanged {
                        left: l.tag_type(),
                        right: r.tag_type(),
                    },
                );
            } else if l.value != r.value {
                self.push(
                    path,
                    Change::Changed {
                        left: DiffValue::TagValue(l.value.clone()),
                        right: DiffValue::TagValue(r.value.clone()),
                    },
                );
            }
        }

        let shared = left.len().min(right.len());
        for (index, tag) in left.iter().enumerate().skip(shared) {
            self.push(
                FieldPath::Tag { index, part: TagPart::Whole },
                Change::Removed { value: DiffValue::Tag(tag.clone()) },
            );
        }
        for (index, tag) in right.iter().enumerate().skip(shared) {
            self.push(
                FieldPath::Tag { index, part: TagPart::Whole },
                Change::Added { value: DiffValue::Tag(tag.clone()) },
            );
        }
    }
}

/// Explain how `a` and `b` differ.
///
/// Only call this on a pair that [`equal`](super::equal) rejected; every
/// returned entry names a field that differs between the two records.
pub fn diff(a: &NormalizedRecord, b: &NormalizedRecord) -> Diff {
    let mut out = Collector { entries: Vec::new() };

    out.field(FieldPath::Name, &a.name, &b.name, |v: &String| {
        DiffValue::Text(v.clone())
    });
    out.field(FieldPath::Flag, &a.flags, &b.flags, |v| DiffValue::Int(i64::from(*v)));
    out.field(FieldPath::ReferenceName, &a.reference_name, &b.reference_name, text);
    out.field(FieldPath::Position, &a.position, &b.position, position);
    out.field(FieldPath::Mapq, &a.mapq, &b.mapq, |v| match v {
        Some(mapq) => DiffValue::Int(i64::from(*mapq)),
        None => DiffValue::Missing,
    });
    out.field(FieldPath::Cigar, a.cigar.as_slice(), b.cigar.as_slice(), |ops| {
        if ops.is_empty() {
            DiffValue::Missing
        } else {
            DiffValue::Text(format_cigar(ops))
        }
    });
    out.field(
        FieldPath::MateReferenceName,
        &a.mate_reference_name,
        &b.mate_reference_name,
        text,
    );
    out.field(FieldPath::MatePosition, &a.mate_position, &b.mate_position, position);
    out.field(
        FieldPath::TemplateLength,
        &a.template_length,
        &b.template_length,
        |v| DiffValue::Int(i64::from(*v)),
    );
    out.field(FieldPath::Sequence, a.sequence.as_slice(), b.sequence.as_slice(), |v| {
        bytes(v, 0)
    });
    // Phred+33
    out.field(FieldPath::Quality, a.quality.as_slice(), b.quality.as_slice(), |v| {
        bytes(v, 33)
    });
    out.tags(&a.tags, &b.tags);

    debug_assert!(!out.entries.is_empty(), "diff called on equal records");
    Diff(out.entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::normalize;
    use crate::io::bam::{ArrayType, ArrayValue, CigarOp, Record};

    fn record() -> Record {
        Record {
            name: "read1".to_string(),
            flags: 0,
            reference_name: Some("chr1".to_string()),
            position: Some(99),
            mapq: Some(60),
            cigar: vec![CigarOp::Match(4)],
            sequence: b"ACGT".to_vec(),
            quality: vec![40, 40, 40, 40],
            ..Record::new()
        }
    }

    fn run(a: Record, b: Record) -> Diff {
        diff(&normalize(a, false, false), &normalize(b, false, false))
    }

    fn int(name: &[u8; 2], value: i64) -> Tag {
        Tag::new(*name, TagValue::Int(value))
    }

    #[test]
    fn test_scalar_fields() {
        let mut b = record();
        b.flags = 16;
        b.position = None;
        b.cigar = vec![CigarOp::SoftClip(1), CigarOp::Match(3)];

        let d = run(record(), b);
        assert_eq!(d.len(), 3);
        assert_eq!(d.to_string(), "{flag: 0 -> 16, position: 100 -> *, cigar: 4M -> 1S3M}");
    }

    #[test]
    fn test_quality_rendered_phred33() {
        let mut b = record();
        b.quality = vec![40, 40, 40, 2];
        let d = run(record(), b);
        assert_eq!(d.to_string(), "{quality: IIII -> III#}");
    }

    #[test]
    fn test_added_tags() {
        let mut b = record();
        b.tags = vec![int(b"NM", 3), Tag::new(*b"RG", TagValue::String("g1".to_string()))];

        let d = run(record(), b);
        assert_eq!(d.len(), 2);
        assert_eq!(d.entries()[0].path, FieldPath::Tag { index: 0, part: TagPart::Whole });
        assert!(matches!(d.entries()[1].change, Change::Added { .. }));
        assert_eq!(d.to_string(), "{tags[0]: added NM:i:3, tags[1]: added RG:Z:g1}");
    }

    #[test]
    fn test_removed_tags() {
        let mut a = record();
        a.tags = vec![int(b"NM", 0), int(b"AS", 4)];
        let mut b = record();
        b.tags = vec![int(b"NM", 0)];

        let d = run(a, b);
        assert_eq!(d.to_string(), "{tags[1]: removed AS:i:4}");
    }

    #[test]
    fn test_tag_key_and_value() {
        let mut a = record();
        a.tags = vec![int(b"NM", 1), int(b"AS", 4)];
        let mut b = record();
        b.tags = vec![int(b"AS", 4), int(b"NM", 1)];

        let d = run(a, b);
        assert_eq!(
            d.to_string(),
            "{tags[0].key: NM -> AS, tags[0].value: i:1 -> i:4, \
             tags[1].key: AS -> NM, tags[1].value: i:4 -> i:1}"
        );
    }

    #[test]
    fn test_tag_type_changed() {
        let mut a = record();
        a.tags = vec![int(b"XN", 5)];
        let mut b = record();
        b.tags = vec![Tag::new(*b"XN", TagValue::String("5".to_string()))];

        let d = run(a, b);
        assert_eq!(
            d.entries(),
            &[DiffEntry {
                path: FieldPath::Tag { index: 0, part: TagPart::Value },
                change: Change::TypeChanged {
                    left: TagType::Int,
                    right: TagType::String,
                },
            }]
        );
    }

    #[test]
    fn test_array_subtype_is_type_change() {
        let mut a = record();
        a.tags = vec![Tag::new(*b"XB", TagValue::Array(ArrayValue::UInt8(vec![1])))];
        let mut b = record();
        b.tags = vec![Tag::new(*b"XB", TagValue::Array(ArrayValue::Int8(vec![1])))];

        let d = run(a, b);
        assert_eq!(
            d.entries()[0].change,
            Change::TypeChanged {
                left: TagType::Array(ArrayType::UInt8),
                right: TagType::Array(ArrayType::Int8),
            }
        );
    }

    #[test]
    fn test_json_shape() {
        let mut b = record();
        b.mapq = None;
        b.tags = vec![int(b"NM", 2)];

        let json = serde_json::to_value(run(record(), b)).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"path": "mapq", "kind": "changed", "left": 60, "right": null},
                {"path": "tags[0]", "kind": "added", "value": "NM:i:2"},
            ])
        );
    }

    #[test]
    fn test_deterministic() {
        let mut b = record();
        b.name = "read2".to_string();
        b.tags = vec![int(b"NM", 1)];
        assert_eq!(run(record(), b.clone()), run(record(), b));
    }
}
