/// Unified error type for all mnemonic share operations.
///
/// Covers scheme validation, mnemonic decoding, share-set consistency,
/// secret reconstruction, and passphrase cipher errors.
#[derive(Debug, thiserror::Error)]
pub enum MnemonicError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("unknown mnemonic word: {0}")]
    UnknownWord(String),

    #[error("invalid mnemonic length: expected at least {expected} words, got {got}")]
    InvalidWordCount { expected: usize, got: usize },

    #[error("invalid mnemonic checksum")]
    InvalidChecksum,

    #[error("invalid mnemonic padding")]
    InvalidPadding,

    #[error("mnemonic is not part of the current share set")]
    MnemonicSetMismatch,

    #[error("conflicting shares with member index {member_index} in group {group_index}")]
    DuplicateMemberIndex { group_index: u8, member_index: u8 },

    #[error("duplicate share index {0}")]
    DuplicateShareIndex(u8),

    #[error("insufficient shares for recovery: need {threshold}, got {got}")]
    NotEnoughShares { threshold: usize, got: usize },

    #[error("insufficient groups for recovery: need {threshold}, got {got}")]
    NotEnoughGroups { threshold: usize, got: usize },

    #[error("digest verification failed")]
    DigestMismatch,

    #[error("division by zero in GF(256)")]
    DivisionByZero,

    #[error("invalid master secret length: {0}")]
    InvalidSecretLength(String),

    #[error("passphrase must contain only printable ASCII characters")]
    InvalidPassphraseEncoding,

    #[error("invalid wordlist: {0}")]
    InvalidWordlist(String),
}
