//! Reverse complement of nucleotide sequences.
//!
//! Pairing: `A`↔`T`, `C`↔`G`. Input is expected to be uppercase and already
//! validated; anything else is a bug in the caller.

/// Complements a single uppercase base.
///
/// # Panics
///
/// Panics on any byte outside `ACGT`. Sequences reach this function only
/// after validation, so this indicates a broken invariant upstream.
#[inline]
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        other => unreachable!(
            "complement of non-nucleotide byte {:?} (sequence was not validated)",
            other as char
        ),
    }
}

/// Returns the reverse complement of an uppercase `ACGT` sequence.
///
/// # Panics
///
/// Panics if `sequence` contains anything but `A`, `C`, `G` or `T`.
///
/// # Examples
///
/// ```
/// use seqrealign::complement::reverse_complement;
///
/// assert_eq!(reverse_complement("ACG"), "CGT");
/// assert_eq!(reverse_complement("AACC"), "GGTT");
/// ```
pub fn reverse_complement(sequence: &str) -> String {
    sequence
        .bytes()
        .rev()
        .map(|b| char::from(complement(b)))
        .collect()
}
