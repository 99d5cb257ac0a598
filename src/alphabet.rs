//! Nucleotide alphabet checks.
//!
//! Only the four unambiguous bases are accepted (`A`, `C`, `G`, `T`, in
//! either case). IUPAC ambiguity codes, gaps and `U` are rejected.

/// Returns true if the byte is one of `AaCcGgTt`.
#[inline]
pub fn is_nucleotide_byte(b: u8) -> bool {
    matches!(b, b'A' | b'a' | b'C' | b'c' | b'G' | b'g' | b'T' | b't')
}

/// Returns true if every character of `text` is a nucleotide.
///
/// The empty string is accepted. Callers that need a non-empty sequence
/// must check the length themselves.
pub fn is_nucleotide(text: &str) -> bool {
    text.bytes().all(is_nucleotide_byte)
}
