//! Start sequence input.
//!
//! The engine itself accepts any start string. This module applies the
//! policy used when a person types or loads one: whitespace is dropped,
//! case is folded, and sequences that are too short or contain anything
//! but `ACGT` are refused.

use std::path::Path;

use thiserror::Error;

use crate::alphabet::is_nucleotide;
use crate::fasta::parse_fasta_str;
use crate::loader::{FileSource, LoadError, TextSource};

/// Shortest start sequence accepted by default.
pub const DEFAULT_MIN_START_LENGTH: usize = 50;

/// Errors that can occur while preparing a start sequence.
#[derive(Error, Debug)]
pub enum StartError {
    #[error("Sequence must have a minimum length of {minimum} characters (got {length})")]
    TooShort { length: usize, minimum: usize },

    #[error("Sequence contains invalid characters")]
    InvalidCharacters,

    #[error("Error while reading file: {0}")]
    Load(#[from] LoadError),
}

/// Result type for start sequence operations.
pub type StartResult<T> = Result<T, StartError>;

/// A validated, uppercase start sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSequence {
    /// Where the sequence came from: `text` or a file name
    id: String,
    sequence: String,
}

impl StartSequence {
    /// Prepares a start sequence typed by the user.
    pub fn from_text(text: &str, min_length: usize) -> StartResult<Self> {
        Self::build("text", prepare(text), min_length)
    }

    /// Prepares a start sequence from file contents.
    ///
    /// A valid FASTA record contributes its sequence; any other content is
    /// treated as a bare sequence.
    pub fn from_file_contents(name: &str, content: &str, min_length: usize) -> StartResult<Self> {
        let sequence = match parse_fasta_str(content) {
            Ok(record) => record.sequence().to_string(),
            Err(_) => prepare(content),
        };
        Self::build(name, sequence, min_length)
    }

    /// Reads and prepares a start sequence from a file.
    pub fn from_file<P: AsRef<Path>>(path: P, min_length: usize) -> StartResult<Self> {
        let path = path.as_ref();
        let content = FileSource.fetch_text(&path.to_string_lossy())?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_file_contents(&name, &content, min_length)
    }

    fn build(id: &str, sequence: String, min_length: usize) -> StartResult<Self> {
        if sequence.len() < min_length {
            return Err(StartError::TooShort {
                length: sequence.len(),
                minimum: min_length,
            });
        }
        if !is_nucleotide(&sequence) {
            return Err(StartError::InvalidCharacters);
        }
        Ok(Self {
            id: id.to_string(),
            sequence,
        })
    }

    /// Where the sequence came from.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn as_str(&self) -> &str {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Drops whitespace and uppercases.
fn prepare(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_60: &str = "TTTTTCATCTACCAAAGAGTAAGCTCCGATTAAATCCCCAATTTCTATTGCTTCATATTT";

    #[test]
    fn test_from_text() {
        let start = StartSequence::from_text(START_60, DEFAULT_MIN_START_LENGTH).unwrap();
        assert_eq!(start.as_str(), START_60);
        assert_eq!(start.id(), "text");
        assert_eq!(start.len(), 60);
    }

    #[test]
    fn test_whitespace_and_case() {
        let typed = format!(" {}\n\t{} \r\n", &START_60[..30].to_lowercase(), &START_60[30..]);
        let start = StartSequence::from_text(&typed, DEFAULT_MIN_START_LENGTH).unwrap();
        assert_eq!(start.as_str(), START_60);
    }

    #[test]
    fn test_too_short() {
        let err = StartSequence::from_text("ACGT", DEFAULT_MIN_START_LENGTH).unwrap_err();
        assert!(matches!(err, StartError::TooShort { length: 4, minimum: 50 }));
        assert!(err.to_string().starts_with("Sequence must have a minimum length of 50"));
    }

    #[test]
    fn test_length_checked_before_alphabet() {
        let err = StartSequence::from_text("XYZ", DEFAULT_MIN_START_LENGTH).unwrap_err();
        assert!(matches!(err, StartError::TooShort { .. }));
    }

    #[test]
    fn test_invalid_characters() {
        let text = format!("{}N", START_60);
        let err = StartSequence::from_text(&text, DEFAULT_MIN_START_LENGTH).unwrap_err();
        assert!(matches!(err, StartError::InvalidCharacters));
    }

    #[test]
    fn test_policy_can_be_disabled() {
        let start = StartSequence::from_text("cgt", 0).unwrap();
        assert_eq!(start.as_str(), "CGT");
    }

    #[test]
    fn test_from_fasta_contents() {
        let content = format!(">origin\n{}\n{}\n", &START_60[..40], &START_60[40..]);
        let start = StartSequence::from_file_contents("origin.fasta", &content, 50).unwrap();
        assert_eq!(start.as_str(), START_60);
        assert_eq!(start.id(), "origin.fasta");
    }

    #[test]
    fn test_from_raw_contents() {
        let content = format!("{}\n{}\n", &START_60[..40], &START_60[40..].to_lowercase());
        let start = StartSequence::from_file_contents("origin.txt", &content, 50).unwrap();
        assert_eq!(start.as_str(), START_60);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dnaA.txt");
        std::fs::write(&path, START_60).unwrap();

        let start = StartSequence::from_file(&path, 50).unwrap();
        assert_eq!(start.id(), "dnaA.txt");
        assert_eq!(start.as_str(), START_60);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StartSequence::from_file(dir.path().join("nope.txt"), 50).unwrap_err();
        assert!(matches!(err, StartError::Load(_)));
        assert!(err.to_string().starts_with("Error while reading file"));
    }
}
