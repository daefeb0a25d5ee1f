//! Share entity and its mnemonic word encoding.
//!
//! A share packs the set identifier, iteration exponent, group and
//! member coordinates and the polynomial y-value into 10-bit symbols,
//! appends the RS1024 checksum and maps the symbols to vocabulary
//! words. Decoding reverses the packing and refuses to surface any
//! field before the checksum and shape checks pass.

use crate::rs1024;
use crate::util::{BitReader, BitWriter, RADIX_BITS};
use crate::wordlist::Wordlist;
use crate::MnemonicError;

/// Bits of the share set identifier.
pub const ID_LENGTH_BITS: usize = 15;

/// Bits of the iteration exponent.
pub const ITERATION_EXP_LENGTH_BITS: usize = 5;

/// Words occupied by identifier and iteration exponent.
const ID_EXP_LENGTH_WORDS: usize = 2;

/// Words occupied by the group/member coordinate nibbles.
const COORDINATE_LENGTH_WORDS: usize = 2;

/// Header plus checksum words framing the share value.
const METADATA_LENGTH_WORDS: usize =
    ID_EXP_LENGTH_WORDS + COORDINATE_LENGTH_WORDS + rs1024::CHECKSUM_LENGTH_WORDS;

/// Minimum strength of a master secret in bits.
pub const MIN_STRENGTH_BITS: usize = 128;

/// Shortest well-formed mnemonic: metadata plus a 128-bit value.
pub const MIN_MNEMONIC_LENGTH_WORDS: usize =
    METADATA_LENGTH_WORDS + (MIN_STRENGTH_BITS + RADIX_BITS - 1) / RADIX_BITS;

/// Words of the human-comparable group fingerprint: the longest prefix
/// that is identical for every member of one group.
pub const GROUP_PREFIX_LENGTH_WORDS: usize = ID_EXP_LENGTH_WORDS + 1;

/// One mnemonic share of a split master secret.
///
/// Equality and hashing are structural over every field, including
/// `member_index`, so two shares at the same position with different
/// payloads never merge silently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Share {
    /// 15-bit value common to all shares of one split.
    pub identifier: u16,
    /// Key-stretching cost exponent of the passphrase cipher.
    pub iteration_exponent: u8,
    /// 0-based index of this share's group.
    pub group_index: u8,
    /// Groups required to reconstruct the secret, 1..=16.
    pub group_threshold: u8,
    /// Total number of groups, 1..=16.
    pub group_count: u8,
    /// 0-based index of this share within its group.
    pub member_index: u8,
    /// Shares required to reconstruct this group's fragment, 1..=16.
    pub member_threshold: u8,
    /// The polynomial y-value at `member_index`.
    pub value: Vec<u8>,
}

/// The fields every share of one recovery attempt must agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommonParameters {
    pub identifier: u16,
    pub iteration_exponent: u8,
    pub group_threshold: u8,
    pub group_count: u8,
}

impl Share {
    /// Return the parameters shared by every mnemonic of one split.
    pub fn common_parameters(&self) -> CommonParameters {
        CommonParameters {
            identifier: self.identifier,
            iteration_exponent: self.iteration_exponent,
            group_threshold: self.group_threshold,
            group_count: self.group_count,
        }
    }

    fn word_indices(&self) -> Vec<u16> {
        let value_word_count = (8 * self.value.len() + RADIX_BITS - 1) / RADIX_BITS;
        let padding_bits = value_word_count * RADIX_BITS - 8 * self.value.len();

        let mut writer = BitWriter::new();
        writer.write(u32::from(self.identifier), ID_LENGTH_BITS);
        writer.write(u32::from(self.iteration_exponent), ITERATION_EXP_LENGTH_BITS);
        writer.write(u32::from(self.group_index), 4);
        writer.write(u32::from(self.group_threshold - 1), 4);
        writer.write(u32::from(self.group_count - 1), 4);
        writer.write(u32::from(self.member_index), 4);
        writer.write(u32::from(self.member_threshold - 1), 4);
        writer.write(0, padding_bits);
        for &byte in &self.value {
            writer.write(u32::from(byte), 8);
        }

        let mut symbols = writer.finish();
        let checksum = rs1024::create_checksum(&symbols);
        symbols.extend_from_slice(&checksum);
        symbols
    }

    /// Encode this share as a space-separated mnemonic string.
    ///
    /// # Arguments
    /// * `wordlist` - The vocabulary to map symbols through.
    ///
    /// # Returns
    /// The mnemonic; 4 header words, the padded value words, and 3
    /// checksum words.
    pub fn to_mnemonic(&self, wordlist: &Wordlist) -> String {
        wordlist.mnemonic_from_indices(&self.word_indices())
    }

    /// Return the group fingerprint words of this share.
    ///
    /// Every member of one group shares this prefix; members of a
    /// different group under the same identifier differ in it.
    pub fn group_prefix(&self, wordlist: &Wordlist) -> String {
        let indices = self.word_indices();
        wordlist.mnemonic_from_indices(&indices[..GROUP_PREFIX_LENGTH_WORDS])
    }

    /// Decode a mnemonic string into a share.
    ///
    /// Fails before any field is surfaced: unknown words, a short or
    /// malformed word count, a checksum mismatch and nonzero padding
    /// are all rejected.
    ///
    /// # Arguments
    /// * `mnemonic` - Whitespace-separated vocabulary words.
    /// * `wordlist` - The vocabulary to map words through.
    ///
    /// # Returns
    /// The decoded `Share`, or the first decode error encountered.
    pub fn from_mnemonic(mnemonic: &str, wordlist: &Wordlist) -> Result<Self, MnemonicError> {
        let indices = wordlist.indices_from_mnemonic(mnemonic)?;
        if indices.len() < MIN_MNEMONIC_LENGTH_WORDS {
            return Err(MnemonicError::InvalidWordCount {
                expected: MIN_MNEMONIC_LENGTH_WORDS,
                got: indices.len(),
            });
        }

        let value_word_count = indices.len() - METADATA_LENGTH_WORDS;
        let padding_bits = (RADIX_BITS * value_word_count) % 16;
        if padding_bits > 8 {
            return Err(MnemonicError::InvalidPadding);
        }

        if !rs1024::verify_checksum(&indices) {
            return Err(MnemonicError::InvalidChecksum);
        }

        let data = &indices[..indices.len() - rs1024::CHECKSUM_LENGTH_WORDS];
        let mut reader = BitReader::new(data);
        let identifier = reader.read(ID_LENGTH_BITS) as u16;
        let iteration_exponent = reader.read(ITERATION_EXP_LENGTH_BITS) as u8;
        let group_index = reader.read(4) as u8;
        let group_threshold = reader.read(4) as u8 + 1;
        let group_count = reader.read(4) as u8 + 1;
        let member_index = reader.read(4) as u8;
        let member_threshold = reader.read(4) as u8 + 1;

        if group_count < group_threshold {
            return Err(MnemonicError::InvalidParameters(format!(
                "group threshold {} exceeds group count {}",
                group_threshold, group_count
            )));
        }

        if reader.read(padding_bits) != 0 {
            return Err(MnemonicError::InvalidPadding);
        }
        let value_byte_count = (RADIX_BITS * value_word_count - padding_bits) / 8;
        let mut value = Vec::with_capacity(value_byte_count);
        for _ in 0..value_byte_count {
            value.push(reader.read(8) as u8);
        }

        Ok(Share {
            identifier,
            iteration_exponent,
            group_index,
            group_threshold,
            group_count,
            member_index,
            member_threshold,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wordlist() -> Wordlist {
        Wordlist::new().unwrap()
    }

    fn sample_share() -> Share {
        Share {
            identifier: 0x1234,
            iteration_exponent: 1,
            group_index: 2,
            group_threshold: 2,
            group_count: 3,
            member_index: 4,
            member_threshold: 3,
            value: (0..16).collect(),
        }
    }

    // -- encode --

    #[test]
    fn test_known_encoding() {
        let wordlist = wordlist();
        let share = sample_share();
        let indices = share.word_indices();
        assert_eq!(
            indices,
            vec![
                145, 641, 132, 578, 0, 4, 32, 193, 5, 24, 112, 514, 266, 44,
                192, 835, 527, 875, 503, 153
            ]
        );
        let mnemonic = share.to_mnemonic(&wordlist);
        assert_eq!(mnemonic.split_whitespace().count(), 20);
    }

    #[test]
    fn test_mnemonic_word_count_formula() {
        let wordlist = wordlist();
        for secret_len in [16usize, 20, 32] {
            let mut share = sample_share();
            share.value = vec![0u8; secret_len];
            let words = share.to_mnemonic(&wordlist).split_whitespace().count();
            assert_eq!(words, 4 + (8 * secret_len + 9) / 10 + 3);
        }
    }

    // -- decode --

    #[test]
    fn test_roundtrip() {
        let wordlist = wordlist();
        let share = sample_share();
        let decoded = Share::from_mnemonic(&share.to_mnemonic(&wordlist), &wordlist).unwrap();
        assert_eq!(decoded, share);
    }

    #[test]
    fn test_roundtrip_32_byte_value() {
        let wordlist = wordlist();
        let mut share = sample_share();
        share.value = (0..32).map(|i| 255 - i).collect();
        let decoded = Share::from_mnemonic(&share.to_mnemonic(&wordlist), &wordlist).unwrap();
        assert_eq!(decoded, share);
    }

    #[test]
    fn test_unknown_word_rejected() {
        let wordlist = wordlist();
        let mut mnemonic = sample_share().to_mnemonic(&wordlist);
        mnemonic.push_str(" notaword");
        assert!(matches!(
            Share::from_mnemonic(&mnemonic, &wordlist),
            Err(MnemonicError::UnknownWord(_))
        ));
    }

    #[test]
    fn test_short_mnemonic_rejected() {
        let wordlist = wordlist();
        let mnemonic = sample_share().to_mnemonic(&wordlist);
        let truncated: Vec<&str> = mnemonic.split_whitespace().take(10).collect();
        assert!(matches!(
            Share::from_mnemonic(&truncated.join(" "), &wordlist),
            Err(MnemonicError::InvalidWordCount { .. })
        ));
    }

    #[test]
    fn test_flipped_word_fails_checksum() {
        let wordlist = wordlist();
        let mnemonic = sample_share().to_mnemonic(&wordlist);
        let words: Vec<&str> = mnemonic.split_whitespace().collect();

        // Exhaustively substitute every position with a different word.
        for position in 0..words.len() {
            let replacement = if words[position] == wordlist.word(0) {
                wordlist.word(1)
            } else {
                wordlist.word(0)
            };
            let mut tampered = words.clone();
            tampered[position] = replacement;
            assert!(
                matches!(
                    Share::from_mnemonic(&tampered.join(" "), &wordlist),
                    Err(MnemonicError::InvalidChecksum)
                ),
                "substitution at {} not caught",
                position
            );
        }
    }

    #[test]
    fn test_group_prefix_is_member_independent() {
        let wordlist = wordlist();
        let mut first = sample_share();
        let mut second = sample_share();
        second.member_index = 9;
        second.member_threshold = 5;
        second.value = vec![0xFF; 16];
        assert_eq!(first.group_prefix(&wordlist), second.group_prefix(&wordlist));

        // A different group index changes the prefix.
        first.group_index = 3;
        assert_ne!(first.group_prefix(&wordlist), second.group_prefix(&wordlist));
    }

    #[test]
    fn test_common_parameters_ignore_member_fields() {
        let mut first = sample_share();
        let mut second = sample_share();
        second.group_index = 0;
        second.member_index = 11;
        assert_eq!(first.common_parameters(), second.common_parameters());

        first.identifier ^= 1;
        assert_ne!(first.common_parameters(), second.common_parameters());
    }

    #[test]
    fn test_inconsistent_group_threshold_rejected() {
        let wordlist = wordlist();
        let mut share = sample_share();
        share.group_threshold = 3;
        share.group_count = 2;
        let mnemonic = share.to_mnemonic(&wordlist);
        assert!(matches!(
            Share::from_mnemonic(&mnemonic, &wordlist),
            Err(MnemonicError::InvalidParameters(_))
        ));
    }
}
