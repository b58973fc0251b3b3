//! The 16-bit one's complement Internet checksum (RFC 1071).
//!
//! The buffer is summed as big-endian 16-bit words, an odd trailing byte is
//! padded with zero, carries are folded back into the low 16 bits and the one's
//! complement of the folded sum is the checksum.

/// Return a copy of `data` with the checksum patched in at `offset`.
///
/// The two bytes at `offset` are treated as zero while summing and are then
/// overwritten with the checksum in network byte order.
///
/// # Panics
///
/// Panics if `offset + 2 > data.len()`.
#[must_use]
pub fn checksum(data: &[u8], offset: usize) -> Vec<u8> {
    let mut buf = data.to_vec();
    set_checksum(&mut buf, offset);
    buf
}

/// Patch the checksum of `data` in place at `offset`.
///
/// # Panics
///
/// Panics if `offset + 2 > data.len()`.
pub fn set_checksum(data: &mut [u8], offset: usize) {
    data[offset..offset + 2].fill(0);
    let value = finalize_checksum(sum_be_words(data));
    data[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

/// Does the buffer, including its checksum field, fold to `0xFFFF`?
#[must_use]
pub fn is_valid(data: &[u8]) -> bool {
    fold(sum_be_words(data)) == 0xFFFF
}

fn sum_be_words(data: &[u8]) -> u32 {
    data.chunks(2)
        .map(|word| match *word {
            [hi, lo] => u32::from(u16::from_be_bytes([hi, lo])),
            [hi] => u32::from(hi) << 8,
            _ => 0,
        })
        .sum()
}

const fn fold(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }
    sum as u16
}

const fn finalize_checksum(sum: u32) -> u16 {
    !fold(sum)
}
