//! Passphrase encryption of the master secret.
//!
//! A four-round Feistel network over the two halves of the secret. The
//! round function is PBKDF2-HMAC-SHA256 keyed by the round number and
//! passphrase and salted with the share set identifier, so the same
//! passphrase decrypts to a different result under a different
//! identifier. The cipher is always applied; an empty passphrase is the
//! normal no-passphrase case, not a bypass.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::{MnemonicError, CUSTOMIZATION_STRING};

/// Feistel rounds per encryption.
const ROUND_COUNT: u8 = 4;

/// Total PBKDF2 iterations across all rounds at iteration exponent 0.
const BASE_ITERATION_COUNT: u64 = 10_000;

fn check_secret_length(master_secret: &[u8]) -> Result<(), MnemonicError> {
    if master_secret.len() % 2 != 0 {
        return Err(MnemonicError::InvalidSecretLength(
            "length in bytes must be even".to_string(),
        ));
    }
    Ok(())
}

fn check_passphrase(passphrase: &[u8]) -> Result<(), MnemonicError> {
    if !passphrase.iter().all(|&c| (32..=126).contains(&c)) {
        return Err(MnemonicError::InvalidPassphraseEncoding);
    }
    Ok(())
}

fn get_salt(identifier: u16) -> Vec<u8> {
    let mut salt = CUSTOMIZATION_STRING.to_vec();
    salt.extend_from_slice(&identifier.to_be_bytes());
    salt
}

fn round_function(
    round: u8,
    passphrase: &[u8],
    iteration_exponent: u8,
    salt: &[u8],
    right: &[u8],
) -> Result<Vec<u8>, MnemonicError> {
    let cost_error = || {
        MnemonicError::InvalidParameters(format!(
            "iteration exponent {} stretches beyond the supported cost",
            iteration_exponent
        ))
    };
    if iteration_exponent >= 32 {
        return Err(cost_error());
    }
    let iterations = (BASE_ITERATION_COUNT << iteration_exponent)
        / u64::from(ROUND_COUNT);
    let iterations = u32::try_from(iterations).map_err(|_| cost_error())?;

    let mut password = Vec::with_capacity(1 + passphrase.len());
    password.push(round);
    password.extend_from_slice(passphrase);

    let mut stretch_salt = Vec::with_capacity(salt.len() + right.len());
    stretch_salt.extend_from_slice(salt);
    stretch_salt.extend_from_slice(right);

    let mut output = vec![0u8; right.len()];
    pbkdf2_hmac::<Sha256>(&password, &stretch_salt, iterations, &mut output);

    password.zeroize();
    stretch_salt.zeroize();
    Ok(output)
}

fn feistel(
    rounds: impl Iterator<Item = u8>,
    data: &[u8],
    passphrase: &[u8],
    iteration_exponent: u8,
    identifier: u16,
) -> Result<Vec<u8>, MnemonicError> {
    check_secret_length(data)?;
    check_passphrase(passphrase)?;

    let half = data.len() / 2;
    let mut left = data[..half].to_vec();
    let mut right = data[half..].to_vec();
    let salt = get_salt(identifier);

    for round in rounds {
        let mut f = round_function(round, passphrase, iteration_exponent, &salt, &right)?;
        let new_right: Vec<u8> = left.iter().zip(&f).map(|(l, x)| l ^ x).collect();
        f.zeroize();
        let mut old_right = std::mem::replace(&mut right, new_right);
        std::mem::swap(&mut left, &mut old_right);
        old_right.zeroize();
    }

    let mut output = Vec::with_capacity(data.len());
    output.extend_from_slice(&right);
    output.extend_from_slice(&left);
    left.zeroize();
    right.zeroize();
    Ok(output)
}

/// Encrypt a master secret under a passphrase and identifier.
///
/// # Arguments
/// * `master_secret` - The secret; its byte length must be even.
/// * `passphrase` - Printable ASCII bytes; empty means no passphrase.
/// * `iteration_exponent` - Doubles the key-stretching cost per step.
/// * `identifier` - The 15-bit share set identifier bound into the salt.
///
/// # Returns
/// The encrypted secret, same length as the input.
pub fn encrypt(
    master_secret: &[u8],
    passphrase: &[u8],
    iteration_exponent: u8,
    identifier: u16,
) -> Result<Vec<u8>, MnemonicError> {
    feistel(0..ROUND_COUNT, master_secret, passphrase, iteration_exponent, identifier)
}

/// Decrypt an encrypted master secret.
///
/// Runs the same rounds in reverse order. A wrong passphrase or a
/// foreign identifier yields a wrong secret rather than an error.
///
/// # Arguments
/// * `encrypted_secret` - Output of `encrypt`; byte length must be even.
/// * `passphrase` - Printable ASCII bytes; empty means no passphrase.
/// * `iteration_exponent` - Must match the value used to encrypt.
/// * `identifier` - Must match the value used to encrypt.
///
/// # Returns
/// The decrypted secret, same length as the input.
pub fn decrypt(
    encrypted_secret: &[u8],
    passphrase: &[u8],
    iteration_exponent: u8,
    identifier: u16,
) -> Result<Vec<u8>, MnemonicError> {
    feistel(
        (0..ROUND_COUNT).rev(),
        encrypted_secret,
        passphrase,
        iteration_exponent,
        identifier,
    )
}
