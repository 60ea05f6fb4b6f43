//! Exact record equality.

use super::normalize::NormalizedRecord;
use crate::io::bam::{Record, Tag};

/// `true` if every field of `a` and `b` matches exactly.
///
/// Tags are compared as an ordered sequence of `(key, type, value)` triples;
/// there is no coercion between types, so `NM:i:5` and `NM:Z:5` differ.
pub fn equal(a: &NormalizedRecord, b: &NormalizedRecord) -> bool {
    // Destructured so a new field cannot be silently left out
    let Record {
        name,
        flags,
        reference_name,
        position,
        mapq,
        cigar,
        mate_reference_name,
        mate_position,
        template_length,
        sequence,
        quality,
        tags,
    } = a.record();
    let b = b.record();

    *name == b.name
        && *flags == b.flags
        && *reference_name == b.reference_name
        && *position == b.position
        && *mapq == b.mapq
        && *cigar == b.cigar
        && *mate_reference_name == b.mate_reference_name
        && *mate_position == b.mate_position
        && *template_length == b.template_length
        && *sequence == b.sequence
        && *quality == b.quality
        && tags_equal(tags, &b.tags)
}

fn tags_equal(a: &[Tag], b: &[Tag]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            x.name == y.name && x.tag_type() == y.tag_type() && x.value == y.value
        })
}
