//! Realignment of many entries against one start sequence.
//!
//! Entries share nothing, so they are processed in parallel. A failure in
//! one entry (invalid input, start not found) never affects the others.

use std::fmt;

use log::info;
use rayon::prelude::*;

use crate::model::{Entry, RealignmentStatus};
use crate::start::StartSequence;

/// Counts from one realignment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    /// Start found on the forward strand
    pub forward: usize,
    /// Start found on the reverse strand only
    pub reversed: usize,
    /// Total matched entries (`forward + reversed`)
    pub matched: usize,
    /// Valid entries where the start was absent from both strands
    pub not_found: usize,
    /// Invalid or pending entries
    pub skipped: usize,
}

impl Summary {
    /// Tallies the realignment state of `entries`.
    pub fn of(entries: &[Entry]) -> Self {
        let mut summary = Summary::default();
        for entry in entries {
            match &entry.realignment {
                RealignmentStatus::Matched(r) if r.is_reversed() => summary.reversed += 1,
                RealignmentStatus::Matched(_) => summary.forward += 1,
                RealignmentStatus::NotFound => summary.not_found += 1,
                RealignmentStatus::NotAttempted => summary.skipped += 1,
            }
        }
        summary.matched = summary.forward + summary.reversed;
        summary
    }

    /// True if every valid entry was realigned.
    pub fn all_matched(&self) -> bool {
        self.not_found == 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} realigned ({} reverse complemented), {} not found, {} skipped",
            self.matched, self.reversed, self.not_found, self.skipped
        )
    }
}

/// Realigns every entry against `start`.
pub fn realign_all(entries: &mut [Entry], start: &StartSequence) -> Summary {
    entries
        .par_iter_mut()
        .for_each(|entry| entry.realign(start.as_str()));

    let summary = Summary::of(entries);
    info!("realignment against {} bp start: {}", start.len(), summary);
    summary
}
