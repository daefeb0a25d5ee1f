//! The 1024-word mnemonic vocabulary.
//!
//! Each word encodes one 10-bit symbol. The vocabulary is an embedded
//! static resource, parsed and validated once into a `Wordlist` that is
//! passed by reference to the share codec; there is no lazily
//! initialized global.

use std::collections::HashMap;

use crate::MnemonicError;

/// Number of words in the vocabulary; one per 10-bit symbol value.
pub const WORD_COUNT: usize = 1024;

static WORDLIST_RAW: &str = include_str!("english.txt");

/// A validated vocabulary with lookups in both directions.
pub struct Wordlist {
    words: Vec<&'static str>,
    indices: HashMap<&'static str, u16>,
}

impl Wordlist {
    /// Load and validate the embedded vocabulary.
    ///
    /// # Returns
    /// `Ok(Wordlist)`, or `InvalidWordlist` if the resource does not
    /// contain exactly 1024 unique words.
    pub fn new() -> Result<Self, MnemonicError> {
        Self::parse(WORDLIST_RAW)
    }

    fn parse(raw: &'static str) -> Result<Self, MnemonicError> {
        let words: Vec<&'static str> = raw.split_whitespace().collect();
        if words.len() != WORD_COUNT {
            return Err(MnemonicError::InvalidWordlist(format!(
                "expected {} words, got {}",
                WORD_COUNT,
                words.len()
            )));
        }
        let mut indices = HashMap::with_capacity(WORD_COUNT);
        for (i, &word) in words.iter().enumerate() {
            if indices.insert(word, i as u16).is_some() {
                return Err(MnemonicError::InvalidWordlist(format!(
                    "duplicate word: {}",
                    word
                )));
            }
        }
        Ok(Wordlist { words, indices })
    }

    /// Return the word for a 10-bit symbol value.
    ///
    /// The codec only ever produces indices below 1024; anything larger
    /// is a programming error and panics.
    pub fn word(&self, index: u16) -> &'static str {
        self.words[usize::from(index)]
    }

    /// Return the symbol value of a word.
    ///
    /// # Returns
    /// The index, or `UnknownWord` if the token is not in the vocabulary.
    pub fn index(&self, word: &str) -> Result<u16, MnemonicError> {
        self.indices
            .get(word)
            .copied()
            .ok_or_else(|| MnemonicError::UnknownWord(word.to_string()))
    }

    /// Map a symbol sequence to its space-separated mnemonic string.
    pub fn mnemonic_from_indices(&self, indices: &[u16]) -> String {
        indices
            .iter()
            .map(|&i| self.word(i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Map a whitespace-separated mnemonic string to its symbol sequence.
    ///
    /// # Returns
    /// The symbol values, or `UnknownWord` on the first unrecognized token.
    pub fn indices_from_mnemonic(&self, mnemonic: &str) -> Result<Vec<u16>, MnemonicError> {
        mnemonic.split_whitespace().map(|w| self.index(w)).collect()
    }
}
