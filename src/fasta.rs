//! FASTA parsing and serialization for single-record genome files.
//!
//! ## FASTA Format
//!
//! ```text
//! >NZ_CP022077.1 Campylobacter jejuni chromosome, complete genome
//! TTTTTCATCTACCAAAGAGTAAGCTCCGATTAAATCCCCAATTTCTATTGCTTCATATTTAGGAGTTTTT
//! AAACCTTTTAAAAGAGTATTTTCAAGTTCATTTCTACCTATGATCATTTTAGC
//! ```
//!
//! A file holds exactly one record: the first line is the description and
//! every following line is sequence data. Validation is strict, since the
//! records are rotated and written back: any character outside `ACGT`
//! (either case) rejects the whole file.

use thiserror::Error;

use crate::alphabet::is_nucleotide;
use crate::model::SequenceRecord;

/// Width of sequence lines in serialized output.
pub const LINE_WIDTH: usize = 70;

/// Number of characters of an offending line kept in error messages.
const PREVIEW_LEN: usize = 40;

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FastaError {
    #[error("Not a FASTA file: first line {} does not start with '>'", preview(.0))]
    MissingHeader(String),

    #[error("Invalid characters at line {line_number}: {}", preview(.line))]
    InvalidCharacters { line_number: usize, line: String },
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// Shortens a line for display. The error itself keeps the full text.
fn preview(line: &str) -> String {
    if line.chars().count() <= PREVIEW_LEN {
        format!("{:?}", line)
    } else {
        let head: String = line.chars().take(PREVIEW_LEN).collect();
        format!("{:?}…", head)
    }
}

/// Parses a single FASTA record from a string.
///
/// Lines are split on `\n`; a `\r` right before it is treated as part of
/// the line terminator. The description is the first line exactly as
/// written. Sequence lines are uppercased and concatenated, and blank
/// lines are ignored.
///
/// # Examples
///
/// ```
/// use seqrealign::fasta::parse_fasta_str;
///
/// let record = parse_fasta_str(">file 2\nAAAAAAAAAC\ncgtaaaa").unwrap();
/// assert_eq!(record.description(), ">file 2");
/// assert_eq!(record.sequence(), "AAAAAAAAACCGTAAAA");
/// ```
pub fn parse_fasta_str(content: &str) -> FastaResult<SequenceRecord> {
    let mut lines = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line));

    // split() always yields at least one item
    let header = lines.next().unwrap_or_default();
    if !header.starts_with('>') {
        return Err(FastaError::MissingHeader(header.to_string()));
    }

    let mut sequence = String::with_capacity(content.len().saturating_sub(header.len()));
    for (idx, line) in lines.enumerate() {
        if !is_nucleotide(line) {
            return Err(FastaError::InvalidCharacters {
                line_number: idx + 2,
                line: line.to_string(),
            });
        }
        sequence.extend(line.chars().map(|c| c.to_ascii_uppercase()));
    }

    Ok(SequenceRecord::new(header, sequence))
}

/// Renders a record as FASTA text.
///
/// The sequence is wrapped at [`LINE_WIDTH`] characters. There is no
/// newline after the last line, so an empty sequence gives the description
/// followed by a single `\n`.
pub fn to_fasta_string(record: &SequenceRecord) -> String {
    let sequence = record.sequence().as_bytes();
    let line_count = sequence.len().div_ceil(LINE_WIDTH);
    let mut out =
        String::with_capacity(record.description().len() + 1 + sequence.len() + line_count);

    out.push_str(record.description());
    out.push('\n');
    for (i, chunk) in sequence.chunks(LINE_WIDTH).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        // Records only hold ASCII nucleotides
        out.extend(chunk.iter().map(|&b| char::from(b)));
    }
    out
}
