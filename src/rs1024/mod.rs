//! RS1024 checksum over 10-bit symbols.
//!
//! A BCH-style code in GF(1024) that appends three checksum symbols to
//! a share's word sequence and detects transcription errors (mistyped,
//! dropped or swapped words). This is independent of the secret-sharing
//! integrity digest: the checksum guards the transcription, the digest
//! guards the reconstruction.

use crate::CUSTOMIZATION_STRING;

/// Number of checksum symbols appended to every share.
pub const CHECKSUM_LENGTH_WORDS: usize = 3;

/// Generator constants of the degree-3 BCH code over GF(1024).
const GENERATOR: [u32; 10] = [
    0x00E0_E040,
    0x01C1_C080,
    0x0383_8100,
    0x0707_0200,
    0x0E0E_0009,
    0x1C0C_2412,
    0x3808_6C24,
    0x3090_FC48,
    0x21B1_F890,
    0x03F3_F120,
];

/// Residue a valid checksummed sequence must reduce to.
const CHECKSUM_TARGET: u32 = 1;

fn polymod(values: impl Iterator<Item = u16>) -> u32 {
    let mut chk: u32 = 1;
    for value in values {
        let b = chk >> 20;
        chk = ((chk & 0xFFFFF) << 10) ^ u32::from(value);
        for (i, generator) in GENERATOR.iter().enumerate() {
            if (b >> i) & 1 != 0 {
                chk ^= generator;
            }
        }
    }
    chk
}

fn customization_values() -> impl Iterator<Item = u16> {
    CUSTOMIZATION_STRING.iter().map(|&b| u16::from(b))
}

/// Compute the three checksum symbols for a symbol sequence.
///
/// # Arguments
/// * `data` - The share's 10-bit symbols, without the checksum.
///
/// # Returns
/// Three symbols which, appended to `data`, satisfy `verify_checksum`.
pub fn create_checksum(data: &[u16]) -> [u16; CHECKSUM_LENGTH_WORDS] {
    let values = customization_values()
        .chain(data.iter().copied())
        .chain(std::iter::repeat(0).take(CHECKSUM_LENGTH_WORDS));
    let polymod = polymod(values) ^ CHECKSUM_TARGET;
    let mut checksum = [0u16; CHECKSUM_LENGTH_WORDS];
    for (i, symbol) in checksum.iter_mut().enumerate() {
        let shift = 10 * (CHECKSUM_LENGTH_WORDS - 1 - i);
        *symbol = ((polymod >> shift) & 1023) as u16;
    }
    checksum
}

/// Verify the checksum of a full symbol sequence (checksum included).
///
/// # Arguments
/// * `data` - The share's 10-bit symbols including the trailing checksum.
///
/// # Returns
/// `true` if the sequence reduces to the fixed residue target.
pub fn verify_checksum(data: &[u16]) -> bool {
    polymod(customization_values().chain(data.iter().copied())) == CHECKSUM_TARGET
}
