//! Cuts a byte buffer into fixed-width unsigned values.
//!
//! Bytes are read as one big-endian bit string; value `i` is the bit range
//! `[i * bits, (i + 1) * bits)`. Trailing bits past the last value are ignored.

/// Bytes required to hold `count` values of `bits` bits.
pub fn bytes_needed(count: usize, bits: u32) -> usize {
    (count * bits as usize).div_ceil(8)
}

/// Splits `bytes` into `count` values of `bits` bits each.
///
/// Returns `None` when `bytes` is too short or `bits` is outside `1..=64`.
pub fn split_values(bytes: &[u8], count: usize, bits: u32) -> Option<Vec<u64>> {
    if !(1..=64).contains(&bits) || bytes.len() < bytes_needed(count, bits) {
        return None;
    }

    let mask: u128 = (1u128 << bits) - 1;
    let mut out = Vec::with_capacity(count);
    let mut acc: u128 = 0;
    let mut acc_bits: u32 = 0;
    let mut next = bytes.iter();

    for _ in 0..count {
        while acc_bits < bits {
            acc = (acc << 8) | u128::from(*next.next()?);
            acc_bits += 8;
        }
        let shift = acc_bits - bits;
        out.push(((acc >> shift) & mask) as u64);
        acc_bits = shift;
        acc &= (1u128 << acc_bits) - 1;
    }
    Some(out)
}
