//! Polynomial secret splitting and recombination over GF(256).
//!
//! A secret of N bytes is treated as N independent byte positions, each
//! shared with its own degree-(threshold - 1) polynomial. Two reserved
//! x-coordinates anchor every polynomial: 255 carries the secret itself
//! and 254 carries an HMAC digest of the secret keyed by a random salt,
//! so that recombination can detect fragments that do not belong to the
//! same split.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::field::Gf256;
use crate::hash::sha256_hmac;
use crate::MnemonicError;

/// Maximum number of fragments a single split may produce.
pub const MAX_SHARE_COUNT: usize = 16;

/// Reserved x-coordinate of the digest fragment.
pub const DIGEST_INDEX: u8 = 254;

/// Reserved x-coordinate of the secret itself.
pub const SECRET_INDEX: u8 = 255;

/// Length of the truncated integrity digest in bytes.
const DIGEST_LENGTH_BYTES: usize = 4;

/// One (x, y) point of the sharing polynomials.
///
/// `index` is the x-coordinate; `value` holds one y-byte per byte of
/// the shared secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareFragment {
    pub index: u8,
    pub value: Vec<u8>,
}

fn create_digest(random_data: &[u8], shared_secret: &[u8]) -> [u8; DIGEST_LENGTH_BYTES] {
    let mac = sha256_hmac(random_data, shared_secret);
    let mut digest = [0u8; DIGEST_LENGTH_BYTES];
    digest.copy_from_slice(&mac[..DIGEST_LENGTH_BYTES]);
    digest
}

/// Evaluate the interpolation polynomial through `fragments` at `x`.
///
/// Works per byte position with Lagrange's formula. Fragment indices
/// must be pairwise distinct and the values equally long.
fn interpolate(
    gf: &Gf256,
    fragments: &[ShareFragment],
    x: u8,
) -> Result<Vec<u8>, MnemonicError> {
    let mut seen = [false; 256];
    let value_length = fragments[0].value.len();
    for fragment in fragments {
        if seen[usize::from(fragment.index)] {
            return Err(MnemonicError::DuplicateShareIndex(fragment.index));
        }
        seen[usize::from(fragment.index)] = true;
        if fragment.value.len() != value_length {
            return Err(MnemonicError::InvalidParameters(
                "fragments must have values of equal length".to_string(),
            ));
        }
    }

    if let Some(exact) = fragments.iter().find(|f| f.index == x) {
        return Ok(exact.value.clone());
    }

    let mut result = vec![0u8; value_length];
    for fragment in fragments {
        // Lagrange basis polynomial of this fragment, evaluated at x.
        let mut basis = 1u8;
        for other in fragments {
            if other.index == fragment.index {
                continue;
            }
            let numerator = gf.add(x, other.index);
            let denominator = gf.add(fragment.index, other.index);
            basis = gf.mul(basis, gf.div(numerator, denominator)?);
        }
        for (accumulated, &y) in result.iter_mut().zip(&fragment.value) {
            *accumulated = gf.add(*accumulated, gf.mul(basis, y));
        }
    }
    Ok(result)
}

/// Split a secret into `share_count` fragments, `threshold` of which
/// reconstruct it.
///
/// With `threshold == 1` every fragment carries the secret verbatim.
/// Otherwise `threshold - 2` fragments are random, one reserved
/// fragment carries `digest || salt`, the secret sits at the reserved
/// index 255, and all remaining fragments are interpolated from that
/// basis.
///
/// # Arguments
/// * `gf` - Field tables.
/// * `threshold` - Fragments required for recombination, 1..=share_count.
/// * `share_count` - Fragments to produce, at most 16.
/// * `secret` - The byte string to share.
///
/// # Returns
/// `share_count` fragments with indices 0..share_count.
pub fn split_secret(
    gf: &Gf256,
    threshold: u8,
    share_count: u8,
    secret: &[u8],
) -> Result<Vec<ShareFragment>, MnemonicError> {
    if threshold == 0 {
        return Err(MnemonicError::InvalidParameters(
            "threshold must be at least 1".to_string(),
        ));
    }
    if threshold > share_count {
        return Err(MnemonicError::InvalidParameters(format!(
            "threshold {} exceeds share count {}",
            threshold, share_count
        )));
    }
    if usize::from(share_count) > MAX_SHARE_COUNT {
        return Err(MnemonicError::InvalidParameters(format!(
            "share count {} exceeds the maximum of {}",
            share_count, MAX_SHARE_COUNT
        )));
    }

    if threshold == 1 {
        return Ok((0..share_count)
            .map(|index| ShareFragment { index, value: secret.to_vec() })
            .collect());
    }

    if secret.len() < DIGEST_LENGTH_BYTES {
        return Err(MnemonicError::InvalidParameters(format!(
            "secret must be at least {} bytes to carry a digest",
            DIGEST_LENGTH_BYTES
        )));
    }

    let random_fragment_count = threshold - 2;
    let mut fragments: Vec<ShareFragment> = (0..random_fragment_count)
        .map(|index| {
            let mut value = vec![0u8; secret.len()];
            OsRng.fill_bytes(&mut value);
            ShareFragment { index, value }
        })
        .collect();

    let mut salt = vec![0u8; secret.len() - DIGEST_LENGTH_BYTES];
    OsRng.fill_bytes(&mut salt);
    let mut digest_value = create_digest(&salt, secret).to_vec();
    digest_value.append(&mut salt);

    let mut basis = fragments.clone();
    basis.push(ShareFragment { index: DIGEST_INDEX, value: digest_value });
    basis.push(ShareFragment { index: SECRET_INDEX, value: secret.to_vec() });

    for index in random_fragment_count..share_count {
        let value = interpolate(gf, &basis, index)?;
        fragments.push(ShareFragment { index, value });
    }

    for fragment in &mut basis {
        fragment.value.zeroize();
    }
    Ok(fragments)
}

/// Recombine exactly `threshold` fragments into the shared secret.
///
/// Interpolates the secret at index 255 and the digest fragment at
/// index 254, then recomputes and compares the digest; a mismatch means
/// the fragments do not all come from the same split.
///
/// # Arguments
/// * `gf` - Field tables.
/// * `threshold` - The threshold the fragments were split with.
/// * `fragments` - Exactly `threshold` fragments with distinct indices.
///
/// # Returns
/// The original shared secret, or `DigestMismatch` / `NotEnoughShares`.
pub fn recover_secret(
    gf: &Gf256,
    threshold: u8,
    fragments: &[ShareFragment],
) -> Result<Vec<u8>, MnemonicError> {
    let Some(first) = fragments.first() else {
        return Err(MnemonicError::NotEnoughShares {
            threshold: usize::from(threshold),
            got: 0,
        });
    };

    if threshold == 1 {
        return Ok(first.value.clone());
    }

    // A re-submitted threshold-1 set collapses to one index; its value
    // is the secret verbatim. Conflicting payloads at that index are a
    // usage error, not a secret.
    if fragments.iter().all(|f| f.index == first.index) {
        if fragments.iter().any(|f| f.value != first.value) {
            return Err(MnemonicError::DuplicateShareIndex(first.index));
        }
        return Ok(first.value.clone());
    }

    if fragments.len() < usize::from(threshold) {
        return Err(MnemonicError::NotEnoughShares {
            threshold: usize::from(threshold),
            got: fragments.len(),
        });
    }
    if fragments.len() > usize::from(threshold) {
        return Err(MnemonicError::InvalidParameters(format!(
            "expected exactly {} fragments, got {}",
            threshold,
            fragments.len()
        )));
    }
    if first.value.len() < DIGEST_LENGTH_BYTES {
        return Err(MnemonicError::InvalidParameters(format!(
            "fragment values must be at least {} bytes",
            DIGEST_LENGTH_BYTES
        )));
    }

    let secret = interpolate(gf, fragments, SECRET_INDEX)?;
    let mut digest_fragment = interpolate(gf, fragments, DIGEST_INDEX)?;
    let (digest, salt) = digest_fragment.split_at(DIGEST_LENGTH_BYTES);
    if digest != create_digest(salt, &secret) {
        return Err(MnemonicError::DigestMismatch);
    }
    digest_fragment.zeroize();
    Ok(secret)
}
