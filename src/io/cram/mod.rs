//! CRAM reader.
//!
//! Reference-based compressed alignment format. Decoding uses noodles-cram
//! with an indexed FASTA reference (`.fai` next to the FASTA).
//!
//! # Design
//!
//! noodles' record iterator borrows the SAM header, so decoding runs on a
//! dedicated thread that owns both the reader and the header. Each record is
//! resolved against the reference, rendered to SAM text and parsed into the
//! shared [`Record`] model, then passed back over a single-slot channel.
//! The consumer pulls one record at a time in file order.

use crate::error::{BamcmpError, Result};
use crate::io::bam::{parse_sam_record, Record};
use crossbeam_channel::{bounded, Receiver, Sender};
use noodles::sam::alignment::io::Write as _;
use noodles::{cram, fasta, sam};
use std::io;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

/// Decoded records buffered between the decoder thread and the consumer.
///
/// One slot keeps the decoder at most a record ahead of the comparison.
const CHANNEL_CAPACITY: usize = 1;

/// Streaming CRAM reader.
pub struct CramReader {
    records: Receiver<Result<Record>>,
    worker: Option<JoinHandle<()>>,
}

impl CramReader {
    /// Open a CRAM file.
    ///
    /// The reference and the CRAM header are opened before this returns, so
    /// configuration problems surface here rather than on the first record.
    ///
    /// # Errors
    ///
    /// - [`BamcmpError::MissingReference`] if `reference` is `None`
    /// - [`BamcmpError::Cram`] if the reference or the CRAM header cannot be read
    pub fn from_path<P: AsRef<Path>>(path: P, reference: Option<&Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reference = match reference {
            Some(reference) => reference.to_path_buf(),
            None => return Err(BamcmpError::MissingReference { path }),
        };

        let (ready_tx, ready_rx) = bounded(1);
        let (record_tx, record_rx) = bounded(CHANNEL_CAPACITY);

        let worker = thread::Builder::new()
            .name("cram-decoder".to_string())
            .spawn(move || decode(path, reference, ready_tx, record_tx))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                records: record_rx,
                worker: Some(worker),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(BamcmpError::Cram {
                msg: "decoder thread exited before opening input".to_string(),
            }),
        }
    }
}

impl Iterator for CramReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.records.recv() {
            Ok(item) => Some(item),
            Err(_) => {
                // Channel closed: either the decoder finished or it panicked
                let worker = self.worker.take()?;
                match worker.join() {
                    Ok(()) => None,
                    Err(_) => Some(Err(BamcmpError::Cram {
                        msg: "decoder thread panicked".to_string(),
                    })),
                }
            }
        }
    }
}

fn cram_error(context: &Path, e: io::Error) -> BamcmpError {
    BamcmpError::Cram {
        msg: format!("{}: {}", context.display(), e),
    }
}

fn decode(
    path: PathBuf,
    reference: PathBuf,
    ready: Sender<Result<()>>,
    records: Sender<Result<Record>>,
) {
    let repository = match fasta::io::indexed_reader::Builder::default()
        .build_from_path(&reference)
        .map(fasta::repository::adapters::IndexedReader::new)
        .map(fasta::Repository::new)
    {
        Ok(repository) => repository,
        Err(e) => {
            let _ = ready.send(Err(cram_error(&reference, e)));
            return;
        }
    };

    let opened = cram::io::reader::Builder::default()
        .set_reference_sequence_repository(repository)
        .build_from_path(&path)
        .and_then(|mut reader| {
            let header = reader.read_header()?;
            Ok((reader, header))
        });

    let (mut reader, header) = match opened {
        Ok(opened) => opened,
        Err(e) => {
            let _ = ready.send(Err(cram_error(&path, e)));
            return;
        }
    };

    if ready.send(Ok(())).is_err() {
        return;
    }
    log::debug!("Decoding CRAM {}", path.display());

    let mut writer = sam::io::Writer::new(Vec::new());

    for (index, result) in reader.records(&header).enumerate() {
        let item = result
            .and_then(|record| record.try_into_alignment_record(&header))
            .and_then(|record| {
                writer.get_mut().clear();
                writer.write_alignment_record(&header, &record)
            })
            .map_err(|e| cram_error(&path, e))
            .and_then(|()| {
                let line = String::from_utf8_lossy(writer.get_ref());
                parse_sam_record(line.trim_end_matches('\n'), index + 1)
            });

        let failed = item.is_err();
        if records.send(item).is_err() || failed {
            return;
        }
    }
}
