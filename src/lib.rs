/// Hierarchical Shamir secret sharing with mnemonic shares.
///
/// This crate splits a master secret into human-transcribable word
/// sequences using a two-level threshold scheme and reconstructs the
/// secret from any sufficient subset of them:
/// - GF(256) field arithmetic and polynomial split/recombine with an
///   integrity digest
/// - RS1024 checksumming and 10-bit word packing of share fields
/// - Passphrase-based Feistel encryption of the secret prior to splitting
/// - A two-level group/member orchestration layer
/// - A pure, I/O-free recovery session for interactive collection

pub mod cipher;
pub mod field;
pub mod hash;
pub mod recovery;
pub mod rs1024;
pub mod scheme;
pub mod shamir;
pub mod share;
mod util;
pub mod wordlist;

mod error;
pub use error::MnemonicError;

/// Domain-separation string mixed into the checksum and the cipher salt.
pub(crate) const CUSTOMIZATION_STRING: &[u8] = b"shamir";
