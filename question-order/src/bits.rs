//! Fixed-width random value space.
//!
//! The width depends only on [`MAX_QUESTIONS`], never on the size of the
//! current run, so a question text keeps drawing from the same range as the
//! question list grows.

/// Upper bound (exclusive) on the number of questions in one run.
pub const MAX_QUESTIONS: usize = 500;

/// Bits per random value: `max(16, floor(log2(MAX_QUESTIONS^2)) + 10)`.
///
/// For 500 questions this is 27, leaving about 2^10 of headroom over
/// `MAX_QUESTIONS^2`.
pub const BITS: u32 = bits_for(MAX_QUESTIONS);

/// Bit width for a given question capacity.
pub const fn bits_for(max_questions: usize) -> u32 {
    let n = max_questions as u64;
    let sq = n * n;
    let log = if sq == 0 { 0 } else { sq.ilog2() };
    let b = log + 10;
    if b < 16 { 16 } else { b }
}

/// Largest value representable in `bits` bits.
pub const fn max_value(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Whether `value` lies in `[0, 2^bits)`.
pub const fn fits(value: u64, bits: u32) -> bool {
    value <= max_value(bits)
}

/// Zero-padded binary representation `bits` digits wide.
pub fn to_binary(value: u64, bits: u32) -> String {
    format!("{:0width$b}", value, width = bits as usize)
}
