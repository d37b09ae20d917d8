// Prefer reading these over literals
pub const U8_CHAR_COMMENT: u8 = b'#';

/// Gap symbol in an aligned FASTA
pub const U8_CHAR_GAP: u8 = b'-';

/// Symbols that count as an observed nucleotide at a significant offset
pub const NUCLEOTIDES: [u8; 4] = [b'A', b'C', b'G', b'T'];

#[inline(always)]
pub fn is_nucleotide(base: u8) -> bool {
    NUCLEOTIDES.contains(&base)
}
