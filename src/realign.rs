//! Rotation of circular genomes to a chosen start sequence.
//!
//! The genome is searched for the start sequence on the forward strand
//! first, then for its reverse complement. The first (leftmost) hit wins;
//! no attempt is made to pick a "better" origin among repeats.
//!
//! When only the reverse complement is found, the output is the reverse
//! complement of the genome, rotated so it reads `start` from position 0.

use crate::alphabet::is_nucleotide;
use crate::complement::reverse_complement;
use crate::model::{Realigned, SequenceRecord, Strand};

/// Rotates `sequence` so that `index` becomes position 0.
///
/// `index` must be a char boundary no greater than `sequence.len()`.
pub fn rotate(sequence: &str, index: usize) -> String {
    let (head, tail) = sequence.split_at(index);
    let mut rotated = String::with_capacity(sequence.len());
    rotated.push_str(tail);
    rotated.push_str(head);
    rotated
}

/// Realigns `genome` so it begins with `start`.
///
/// `start` is matched case-insensitively. Returns `None` when neither the
/// start sequence nor its reverse complement occurs in the genome; a start
/// containing non-nucleotide characters can never match.
///
/// # Examples
///
/// ```
/// use seqrealign::fasta::parse_fasta_str;
/// use seqrealign::realign::realign;
///
/// let genome = parse_fasta_str(">file 2\nAAAAAAAAACCGTAAAA").unwrap();
///
/// let forward = realign(&genome, "CGT").unwrap();
/// assert_eq!(forward.record.sequence(), "CGTAAAAAAAAAAAAAC");
/// assert!(!forward.is_reversed());
///
/// let reverse = realign(&genome, "ACG").unwrap();
/// assert_eq!(reverse.record.sequence(), "ACGGTTTTTTTTTTTTT");
/// assert!(reverse.is_reversed());
/// ```
pub fn realign(genome: &SequenceRecord, start: &str) -> Option<Realigned> {
    if !is_nucleotide(start) {
        return None;
    }
    let start = start.to_ascii_uppercase();
    let sequence = genome.sequence();

    let (strand, rotated) = if let Some(index) = sequence.find(&start) {
        (Strand::Forward, rotate(sequence, index))
    } else {
        let index = sequence.find(&reverse_complement(&start))?;
        // Position of `start` once the whole genome is read on the other strand
        let index = sequence.len() - index - start.len();
        (
            Strand::ReverseComplement,
            rotate(&reverse_complement(sequence), index),
        )
    };

    debug_assert_eq!(rotated.len(), sequence.len());
    Some(Realigned {
        record: SequenceRecord::new(genome.description(), rotated),
        strand,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fasta::parse_fasta_str;

    fn genome(sequence: &str) -> SequenceRecord {
        parse_fasta_str(&format!(">file 2\n{}", sequence)).unwrap()
    }

    #[test]
    fn test_rotate() {
        assert_eq!(rotate("ABCDE", 0), "ABCDE");
        assert_eq!(rotate("ABCDE", 2), "CDEAB");
        assert_eq!(rotate("ABCDE", 5), "ABCDE");
        assert_eq!(rotate("", 0), "");
    }

    #[test]
    fn test_forward_match() {
        let g = genome("AAAAAAAAACCGTAAAA");
        let result = realign(&g, "CGT").unwrap();
        assert_eq!(result.record.description(), ">file 2");
        assert_eq!(result.record.sequence(), "CGTAAAAAAAAAAAAAC");
        assert_eq!(result.strand, Strand::Forward);
    }

    #[test]
    fn test_reverse_complement_fallback() {
        let g = genome("AAAAAAAAACCGTAAAA");
        let result = realign(&g, "ACG").unwrap();
        assert_eq!(result.record.sequence(), "ACGGTTTTTTTTTTTTT");
        assert_eq!(result.strand, Strand::ReverseComplement);
    }

    #[test]
    fn test_start_is_case_insensitive() {
        let g = genome("AAAAAAAAACCGTAAAA");
        assert_eq!(realign(&g, "cgt").unwrap().record.sequence(), "CGTAAAAAAAAAAAAAC");
        assert!(realign(&g, "acg").unwrap().is_reversed());
    }

    #[test]
    fn test_not_found() {
        let g = genome("AAAAAAAAACCGTAAAA");
        assert!(realign(&g, "GGG").is_none());
        assert!(realign(&g, "TTTTTTTTTTTTTTTTTTTTTTTTT").is_none());
    }

    #[test]
    fn test_invalid_start_never_matches() {
        let g = genome("AAAAAAAAACCGTAAAA");
        assert!(realign(&g, "CGN").is_none());
        assert!(realign(&g, "C G").is_none());
    }

    #[test]
    fn test_empty_genome() {
        let g = genome("");
        assert!(realign(&g, "A").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let g = genome("TTACGTTTACGAAA");
        let result = realign(&g, "ACG").unwrap();
        assert_eq!(result.record.sequence(), "ACGTTTACGAAATT");
    }

    #[test]
    fn test_forward_preferred_over_reverse() {
        // CCC occurs forward, and so does its reverse complement GGG (earlier)
        let g = genome("GGGTTTTCCCAA");
        let result = realign(&g, "CCC").unwrap();
        assert_eq!(result.strand, Strand::Forward);
        assert_eq!(result.record.sequence(), "CCCAAGGGTTTT");
    }

    #[test]
    fn test_match_at_origin_is_identity() {
        let g = genome("CGTAAAAAAAAAAAAAC");
        let result = realign(&g, "CGT").unwrap();
        assert_eq!(result.record.sequence(), g.sequence());
    }

    #[test]
    fn test_reverse_match_at_end() {
        // Reverse complement of the start sits at the very end of the genome
        let g = genome("AAAAACCG");
        let result = realign(&g, "CGG").unwrap();
        assert!(result.is_reversed());
        assert_eq!(result.record.sequence(), "CGGTTTTT");
    }

    #[test]
    fn test_realigned_starts_with_start_and_keeps_length() {
        let g = genome("TTTTTCATCTACCAAAGAGTAAGCTCCGATTAAATCCCCAATTTCTATTGCTTCATATTTAGG");
        for start in ["GAGTAAGC", "CCCCAATT", "TAGG", "GCTTACTC", "AATTGGGG"] {
            let result = realign(&g, start).unwrap();
            assert_eq!(result.record.len(), g.len());
            assert!(result.record.sequence().starts_with(start), "start {}", start);
        }
    }

    #[test]
    fn test_reversed_output_is_rotation_of_reverse_complement() {
        let g = genome("TTTTTCATCTACCAAAGAGTAAGCTCCGATT");
        let result = realign(&g, "GCTTACTC").unwrap();
        assert!(result.is_reversed());

        let doubled = reverse_complement(g.sequence()).repeat(2);
        assert!(doubled.contains(result.record.sequence()));
    }

    #[test]
    fn test_input_is_not_modified() {
        let g = genome("AAAAAAAAACCGTAAAA");
        let before = g.clone();
        let _ = realign(&g, "ACG");
        assert_eq!(g, before);
    }
}
