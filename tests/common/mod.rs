//! Shared fixtures for integration tests.

#![allow(dead_code)]

use bamcmp::io::bam::{ArrayValue, Header, Record, SamReader, Tag, TagValue};
use flate2::write::GzEncoder;
use flate2::Compression;
use noodles::sam::alignment::io::Write as _;
use noodles::{cram, fasta, sam};
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Read a SAM fixture into its header and records.
pub fn read_sam(path: &Path) -> (Header, Vec<Record>) {
    let reader = SamReader::from_path(path).unwrap();
    let header = reader.header().clone();
    let records = reader.into_iter().collect::<bamcmp::Result<Vec<_>>>().unwrap();
    (header, records)
}

/// Write a SAM file with a single reference.
pub fn write_sam(path: &Path, lines: &[&str]) {
    let mut out = String::from("@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:1000\n");
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    std::fs::write(path, out).unwrap();
}

/// Encode records as a gzip-compressed BAM file.
pub fn write_bam(path: &Path, header: &Header, records: &[Record]) {
    let mut data = Vec::new();
    data.extend_from_slice(b"BAM\x01");
    data.extend_from_slice(&(header.text.len() as i32).to_le_bytes());
    data.extend_from_slice(header.text.as_bytes());
    data.extend_from_slice(&(header.references.len() as i32).to_le_bytes());
    for reference in &header.references {
        data.extend_from_slice(&(reference.name.len() as i32 + 1).to_le_bytes());
        data.extend_from_slice(reference.name.as_bytes());
        data.push(0);
        data.extend_from_slice(&reference.length.to_le_bytes());
    }

    for record in records {
        let body = encode_record(header, record);
        data.extend_from_slice(&(body.len() as i32).to_le_bytes());
        data.extend_from_slice(&body);
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&data).unwrap();
    std::fs::write(path, encoder.finish().unwrap()).unwrap();
}

fn reference_id(header: &Header, name: &Option<String>) -> i32 {
    match name {
        Some(name) => header
            .references
            .iter()
            .position(|r| &r.name == name)
            .unwrap() as i32,
        None => -1,
    }
}

fn encode_record(header: &Header, record: &Record) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&reference_id(header, &record.reference_name).to_le_bytes());
    body.extend_from_slice(&record.position.unwrap_or(-1).to_le_bytes());
    body.push(record.name.len() as u8 + 1);
    body.push(record.mapq.unwrap_or(255));
    body.extend_from_slice(&0u16.to_le_bytes()); // bin
    body.extend_from_slice(&(record.cigar.len() as u16).to_le_bytes());
    body.extend_from_slice(&record.flags.to_le_bytes());
    body.extend_from_slice(&(record.sequence.len() as i32).to_le_bytes());
    body.extend_from_slice(&reference_id(header, &record.mate_reference_name).to_le_bytes());
    body.extend_from_slice(&record.mate_position.unwrap_or(-1).to_le_bytes());
    body.extend_from_slice(&record.template_length.to_le_bytes());
    body.extend_from_slice(record.name.as_bytes());
    body.push(0);

    for op in &record.cigar {
        let code = "MIDNSHP=X".find(op.as_char()).unwrap() as u32;
        body.extend_from_slice(&((op.len() << 4) | code).to_le_bytes());
    }

    const BASES: &[u8] = b"=ACMGRSVTWYHKDBN";
    let code = |b: u8| BASES.iter().position(|&x| x == b).unwrap_or(15) as u8;
    for pair in record.sequence.chunks(2) {
        let hi = code(pair[0]) << 4;
        let lo = pair.get(1).map(|&b| code(b)).unwrap_or(0);
        body.push(hi | lo);
    }

    if record.quality.is_empty() {
        body.extend(std::iter::repeat(0xFF).take(record.sequence.len()));
    } else {
        body.extend_from_slice(&record.quality);
    }

    for tag in &record.tags {
        encode_tag(&mut body, tag);
    }
    body
}

/// Integers use the narrowest BAM width, as samtools does.
fn encode_tag(out: &mut Vec<u8>, tag: &Tag) {
    out.extend_from_slice(&tag.name);
    match &tag.value {
        TagValue::Char(c) => out.extend_from_slice(&[b'A', *c]),
        TagValue::Int(v) => {
            let v = *v;
            if (0..=u8::MAX as i64).contains(&v) {
                out.extend_from_slice(&[b'C', v as u8]);
            } else if (i8::MIN as i64..0).contains(&v) {
                out.extend_from_slice(&[b'c', v as i8 as u8]);
            } else if (0..=u16::MAX as i64).contains(&v) {
                out.push(b'S');
                out.extend_from_slice(&(v as u16).to_le_bytes());
            } else if (i16::MIN as i64..0).contains(&v) {
                out.push(b's');
                out.extend_from_slice(&(v as i16).to_le_bytes());
            } else if (0..=u32::MAX as i64).contains(&v) {
                out.push(b'I');
                out.extend_from_slice(&(v as u32).to_le_bytes());
            } else {
                out.push(b'i');
                out.extend_from_slice(&(v as i32).to_le_bytes());
            }
        }
        TagValue::Float(v) => {
            out.push(b'f');
            out.extend_from_slice(&v.to_le_bytes());
        }
        TagValue::String(s) => {
            out.push(b'Z');
            out.extend_from_slice(s.as_bytes());
            out.push(0);
        }
        TagValue::Hex(s) => {
            out.push(b'H');
            out.extend_from_slice(s.as_bytes());
            out.push(0);
        }
        TagValue::Array(array) => {
            out.push(b'B');
            out.push(array.array_type().code());
            match array {
                ArrayValue::Int8(v) => push_array(out, v, |x| vec![*x as u8]),
                ArrayValue::UInt8(v) => push_array(out, v, |x| vec![*x]),
                ArrayValue::Int16(v) => push_array(out, v, |x| x.to_le_bytes().to_vec()),
                ArrayValue::UInt16(v) => push_array(out, v, |x| x.to_le_bytes().to_vec()),
                ArrayValue::Int32(v) => push_array(out, v, |x| x.to_le_bytes().to_vec()),
                ArrayValue::UInt32(v) => push_array(out, v, |x| x.to_le_bytes().to_vec()),
                ArrayValue::Float(v) => push_array(out, v, |x| x.to_le_bytes().to_vec()),
            }
        }
    }
}

fn push_array<T>(out: &mut Vec<u8>, values: &[T], encode: impl Fn(&T) -> Vec<u8>) {
    out.extend_from_slice(&(values.len() as u32).to_le_bytes());
    for value in values {
        out.extend(encode(value));
    }
}

/// Sequences for the `@SQ` lines shared by the fixtures.
fn reference_sequences() -> Vec<(&'static str, Vec<u8>)> {
    vec![("chr1", b"ACGT".repeat(250)), ("chr2", b"TTGCA".repeat(100))]
}

/// Write the fixture reference as single-line FASTA plus its `.fai` index.
pub fn write_reference(path: &Path) {
    let mut fasta = Vec::new();
    let mut index = String::new();
    for (name, sequence) in reference_sequences() {
        fasta.extend_from_slice(format!(">{}\n", name).as_bytes());
        let offset = fasta.len();
        fasta.extend_from_slice(&sequence);
        fasta.push(b'\n');
        index.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            name,
            sequence.len(),
            offset,
            sequence.len(),
            sequence.len() + 1
        ));
    }
    std::fs::write(path, fasta).unwrap();

    let mut index_path = path.as_os_str().to_owned();
    index_path.push(".fai");
    std::fs::write(index_path, index).unwrap();
}

/// Re-encode a SAM fixture as CRAM against the fixture reference.
pub fn write_cram(sam_path: &Path, cram_path: &Path) {
    let mut reader = sam::io::reader::Builder::default()
        .build_from_path(sam_path)
        .unwrap();
    let header = reader.read_header().unwrap();

    let records: Vec<fasta::Record> = reference_sequences()
        .into_iter()
        .map(|(name, sequence)| {
            fasta::Record::new(
                fasta::record::Definition::new(name, None),
                fasta::record::Sequence::from(sequence),
            )
        })
        .collect();

    let mut writer = cram::io::writer::Builder::default()
        .set_reference_sequence_repository(fasta::Repository::new(records))
        .build_from_path(cram_path)
        .unwrap();
    writer.write_header(&header).unwrap();

    for result in reader.record_bufs(&header) {
        let record = result.unwrap();
        writer.write_alignment_record(&header, &record).unwrap();
    }
    writer.try_finish(&header).unwrap();
}
