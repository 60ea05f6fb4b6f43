//! Lockstep comparison of two record streams.
//!
//! One record is pulled from each input per step, so memory holds a single
//! record pair plus whatever results the caller keeps. Iteration stops as soon
//! as either input is exhausted; [`LengthMismatchPolicy`] decides whether that
//! is reported.

use super::diff::{diff, Diff};
use super::equality::equal;
use super::normalize::normalize;
use super::{CompareOptions, LengthMismatchPolicy};
use crate::error::{BamcmpError, Result, Side};
use crate::io::bam::Record;
use serde::Serialize;
use std::fmt;
use std::iter::FusedIterator;

/// A record pair that did not compare equal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Read name of the first input's record
    pub left_id: String,
    /// Read name of the second input's record
    pub right_id: String,
    /// Located differences, never empty
    pub diff: Diff,
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} differs from {}. Difference: {}",
            self.left_id, self.right_id, self.diff
        )
    }
}

/// Running totals for a comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Record pairs compared
    pub compared: u64,
    /// Record pairs that differed
    pub differing: u64,
}

impl Summary {
    pub fn is_identical(&self) -> bool {
        self.differing == 0
    }
}

/// Lazy comparison of two record streams.
///
/// Yields one [`ComparisonResult`] per differing pair, in file order. The
/// first decode error is yielded once and ends iteration.
pub struct Comparisons<A, B> {
    left: A,
    right: B,
    options: CompareOptions,
    summary: Summary,
    finished: bool,
}

impl<A, B> Comparisons<A, B>
where
    A: Iterator<Item = Result<Record>>,
    B: Iterator<Item = Result<Record>>,
{
    pub fn new(left: A, right: B, options: &CompareOptions) -> Self {
        Self {
            left,
            right,
            options: options.clone(),
            summary: Summary::default(),
            finished: false,
        }
    }

    /// Totals so far; final once the iterator has returned `None`.
    pub fn summary(&self) -> Summary {
        self.summary
    }

    fn next_pair(&mut self) -> Result<Option<(Record, Record)>> {
        let index = self.summary.compared + 1;

        let left = match self.left.next() {
            Some(record) => record.map_err(|e| e.in_source(Side::First, index))?,
            None => {
                self.check_lengths(Side::First)?;
                return Ok(None);
            }
        };

        let right = match self.right.next() {
            Some(record) => record.map_err(|e| e.in_source(Side::Second, index))?,
            None => {
                self.check_lengths(Side::Second)?;
                return Ok(None);
            }
        };

        Ok(Some((left, right)))
    }

    fn check_lengths(&mut self, exhausted: Side) -> Result<()> {
        let policy = self.options.length_mismatch;
        if policy == LengthMismatchPolicy::Ignore {
            return Ok(());
        }

        // When the second input runs out, the first has already produced
        // the unmatched record
        let longer_has_more = match exhausted {
            Side::First => self.right.next().is_some(),
            Side::Second => true,
        };
        if !longer_has_more {
            return Ok(());
        }

        let mismatch = BamcmpError::LengthMismatch {
            exhausted,
            compared: self.summary.compared,
        };
        match policy {
            LengthMismatchPolicy::Error => Err(mismatch),
            _ => {
                log::warn!("{}; remaining records were not compared", mismatch);
                Ok(())
            }
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        log::info!(
            "Compared {} record pairs, {} differ",
            self.summary.compared,
            self.summary.differing
        );
    }
}

impl<A, B> Iterator for Comparisons<A, B>
where
    A: Iterator<Item = Result<Record>>,
    B: Iterator<Item = Result<Record>>,
{
    type Item = Result<ComparisonResult>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let (left, right) = match self.next_pair() {
                Ok(Some(pair)) => pair,
                Ok(None) => {
                    self.finish();
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            };
            self.summary.compared += 1;

            let CompareOptions {
                sort_tags,
                ignore_tags,
                ..
            } = self.options;
            let left = normalize(left, sort_tags, ignore_tags);
            let right = normalize(right, sort_tags, ignore_tags);

            if equal(&left, &right) {
                continue;
            }

            self.summary.differing += 1;
            let diff = diff(&left, &right);
            log::debug!(
                "Pair {} ({} / {}): {} difference(s)",
                self.summary.compared,
                left.name,
                right.name,
                diff.len()
            );

            return Some(Ok(ComparisonResult {
                left_id: left.into_inner().name,
                right_id: right.into_inner().name,
                diff,
            }));
        }
        None
    }
}

impl<A, B> FusedIterator for Comparisons<A, B>
where
    A: Iterator<Item = Result<Record>>,
    B: Iterator<Item = Result<Record>>,
{
}

/// Compare two record streams and collect every differing pair.
///
/// # Errors
///
/// The first decode error from either input, wrapped in
/// [`BamcmpError::Source`], or [`BamcmpError::LengthMismatch`] under
/// [`LengthMismatchPolicy::Error`].
pub fn compare<A, B>(left: A, right: B, options: &CompareOptions) -> Result<Vec<ComparisonResult>>
where
    A: IntoIterator<Item = Result<Record>>,
    B: IntoIterator<Item = Result<Record>>,
{
    Comparisons::new(left.into_iter(), right.into_iter(), options).collect()
}
