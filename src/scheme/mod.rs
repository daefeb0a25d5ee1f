//! Two-level split/combine orchestration.
//!
//! `generate_mnemonics` encrypts the master secret under the
//! passphrase, splits the result across groups, splits every group
//! fragment across its members and encodes each member fragment as a
//! mnemonic. `combine_mnemonics` reverses the process from any
//! sufficient subset of mnemonics.

use std::collections::BTreeMap;

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::field::Gf256;
use crate::shamir::{self, ShareFragment, MAX_SHARE_COUNT};
use crate::share::{Share, ID_LENGTH_BITS, MIN_STRENGTH_BITS};
use crate::wordlist::Wordlist;
use crate::{cipher, MnemonicError};

/// Largest iteration exponent the share format can carry.
const MAX_ITERATION_EXPONENT: u8 = 31;

fn check_master_secret(master_secret: &[u8]) -> Result<(), MnemonicError> {
    if master_secret.len() * 8 < MIN_STRENGTH_BITS {
        return Err(MnemonicError::InvalidSecretLength(format!(
            "must be at least {} bytes",
            MIN_STRENGTH_BITS / 8
        )));
    }
    if master_secret.len() % 2 != 0 {
        return Err(MnemonicError::InvalidSecretLength(
            "length in bytes must be even".to_string(),
        ));
    }
    Ok(())
}

fn check_scheme(group_threshold: u8, groups: &[(u8, u8)]) -> Result<(), MnemonicError> {
    if group_threshold == 0 {
        return Err(MnemonicError::InvalidParameters(
            "group threshold must be at least 1".to_string(),
        ));
    }
    if usize::from(group_threshold) > groups.len() {
        return Err(MnemonicError::InvalidParameters(format!(
            "group threshold {} exceeds the number of groups {}",
            group_threshold,
            groups.len()
        )));
    }
    if groups.len() > MAX_SHARE_COUNT {
        return Err(MnemonicError::InvalidParameters(format!(
            "at most {} groups are supported",
            MAX_SHARE_COUNT
        )));
    }
    for &(member_threshold, member_count) in groups {
        if member_threshold == 0 {
            return Err(MnemonicError::InvalidParameters(
                "member threshold must be at least 1".to_string(),
            ));
        }
        if member_threshold > member_count {
            return Err(MnemonicError::InvalidParameters(format!(
                "member threshold {} exceeds member count {}",
                member_threshold, member_count
            )));
        }
        if usize::from(member_count) > MAX_SHARE_COUNT {
            return Err(MnemonicError::InvalidParameters(format!(
                "at most {} members per group are supported",
                MAX_SHARE_COUNT
            )));
        }
        if member_threshold == 1 && member_count > 1 {
            return Err(MnemonicError::InvalidParameters(
                "1-of-n groups are not allowed; use a 1-of-1 group and \
                 distribute identical copies instead"
                    .to_string(),
            ));
        }
    }
    Ok(())
}

fn random_identifier() -> u16 {
    let mut bytes = [0u8; 2];
    OsRng.fill_bytes(&mut bytes);
    u16::from_be_bytes(bytes) & ((1 << ID_LENGTH_BITS) - 1)
}

/// Generate a fresh random master secret of the given strength.
///
/// # Arguments
/// * `strength_bits` - Secret size in bits; at least 128 and a
///   multiple of 16.
///
/// # Returns
/// Uniformly random secret bytes suitable for `generate_mnemonics`.
pub fn random_master_secret(strength_bits: usize) -> Result<Vec<u8>, MnemonicError> {
    if strength_bits < MIN_STRENGTH_BITS {
        return Err(MnemonicError::InvalidParameters(format!(
            "strength must be at least {} bits",
            MIN_STRENGTH_BITS
        )));
    }
    if strength_bits % 16 != 0 {
        return Err(MnemonicError::InvalidParameters(
            "strength must be a multiple of 16 bits".to_string(),
        ));
    }
    let mut secret = vec![0u8; strength_bits / 8];
    OsRng.fill_bytes(&mut secret);
    Ok(secret)
}

/// Split a master secret into groups of mnemonic shares.
///
/// # Arguments
/// * `gf` - Field tables.
/// * `wordlist` - The vocabulary for encoding.
/// * `group_threshold` - Groups required for recovery, 1..=len(groups).
/// * `groups` - One `(member_threshold, member_count)` pair per group.
/// * `master_secret` - At least 16 bytes, even length.
/// * `passphrase` - Printable ASCII bytes; empty for none.
/// * `iteration_exponent` - Key-stretching cost exponent, 0..=31.
///
/// # Returns
/// One list of mnemonics per group, in input group order.
pub fn generate_mnemonics(
    gf: &Gf256,
    wordlist: &Wordlist,
    group_threshold: u8,
    groups: &[(u8, u8)],
    master_secret: &[u8],
    passphrase: &[u8],
    iteration_exponent: u8,
) -> Result<Vec<Vec<String>>, MnemonicError> {
    check_master_secret(master_secret)?;
    check_scheme(group_threshold, groups)?;
    if iteration_exponent > MAX_ITERATION_EXPONENT {
        return Err(MnemonicError::InvalidParameters(format!(
            "iteration exponent must be at most {}",
            MAX_ITERATION_EXPONENT
        )));
    }

    let identifier = random_identifier();
    let mut encrypted =
        cipher::encrypt(master_secret, passphrase, iteration_exponent, identifier)?;
    let mut group_fragments =
        shamir::split_secret(gf, group_threshold, groups.len() as u8, &encrypted)?;

    let mut mnemonics = Vec::with_capacity(groups.len());
    for (fragment, &(member_threshold, member_count)) in
        group_fragments.iter_mut().zip(groups)
    {
        let member_fragments =
            shamir::split_secret(gf, member_threshold, member_count, &fragment.value)?;
        let group_mnemonics = member_fragments
            .into_iter()
            .map(|member| {
                Share {
                    identifier,
                    iteration_exponent,
                    group_index: fragment.index,
                    group_threshold,
                    group_count: groups.len() as u8,
                    member_index: member.index,
                    member_threshold,
                    value: member.value,
                }
                .to_mnemonic(wordlist)
            })
            .collect();
        mnemonics.push(group_mnemonics);
        fragment.value.zeroize();
    }
    encrypted.zeroize();
    Ok(mnemonics)
}

/// Decode mnemonics into shares and group them, enforcing set
/// consistency along the way.
fn decode_and_group(
    mnemonics: &[String],
    wordlist: &Wordlist,
) -> Result<(crate::share::CommonParameters, BTreeMap<u8, Vec<Share>>), MnemonicError> {
    let mut shares = Vec::with_capacity(mnemonics.len());
    for mnemonic in mnemonics {
        shares.push(Share::from_mnemonic(mnemonic, wordlist)?);
    }
    let Some(first) = shares.first() else {
        return Err(MnemonicError::InvalidParameters(
            "no mnemonics were provided".to_string(),
        ));
    };

    let params = first.common_parameters();
    if shares.iter().any(|s| s.common_parameters() != params) {
        return Err(MnemonicError::MnemonicSetMismatch);
    }

    let mut groups: BTreeMap<u8, Vec<Share>> = BTreeMap::new();
    for share in shares {
        let group = groups.entry(share.group_index).or_default();
        if group.iter().any(|existing| *existing == share) {
            continue;
        }
        if group
            .iter()
            .any(|existing| existing.member_threshold != share.member_threshold)
        {
            return Err(MnemonicError::MnemonicSetMismatch);
        }
        if let Some(conflict) = group
            .iter()
            .find(|existing| existing.member_index == share.member_index)
        {
            return Err(MnemonicError::DuplicateMemberIndex {
                group_index: conflict.group_index,
                member_index: conflict.member_index,
            });
        }
        group.push(share);
    }
    Ok((params, groups))
}

/// Reconstruct a master secret from mnemonic shares.
///
/// Every group with at least its own member threshold of shares is
/// recombined into a group fragment; `group_threshold` recombined
/// groups then yield the encrypted secret, which is decrypted under
/// the passphrase. Shares beyond a threshold are dropped, lowest
/// indices first.
///
/// # Arguments
/// * `gf` - Field tables.
/// * `wordlist` - The vocabulary for decoding.
/// * `mnemonics` - The collected mnemonic strings.
/// * `passphrase` - Printable ASCII bytes; must match the one used at
///   generation for the result to equal the original secret.
///
/// # Returns
/// The master secret, or the first decode, consistency or
/// reconstruction error.
pub fn combine_mnemonics(
    gf: &Gf256,
    wordlist: &Wordlist,
    mnemonics: &[String],
    passphrase: &[u8],
) -> Result<Vec<u8>, MnemonicError> {
    let (params, groups) = decode_and_group(mnemonics, wordlist)?;

    let mut group_fragments: Vec<ShareFragment> = Vec::new();
    for (group_index, mut members) in groups {
        let threshold = match members.first() {
            Some(share) => share.member_threshold,
            None => continue,
        };
        if members.len() < usize::from(threshold) {
            continue;
        }
        members.sort_by_key(|share| share.member_index);
        members.truncate(usize::from(threshold));
        let member_fragments: Vec<ShareFragment> = members
            .into_iter()
            .map(|share| ShareFragment {
                index: share.member_index,
                value: share.value,
            })
            .collect();
        let value = shamir::recover_secret(gf, threshold, &member_fragments)?;
        group_fragments.push(ShareFragment { index: group_index, value });
    }

    if group_fragments.len() < usize::from(params.group_threshold) {
        return Err(MnemonicError::NotEnoughGroups {
            threshold: usize::from(params.group_threshold),
            got: group_fragments.len(),
        });
    }
    group_fragments.truncate(usize::from(params.group_threshold));

    let mut encrypted =
        shamir::recover_secret(gf, params.group_threshold, &group_fragments)?;
    for fragment in &mut group_fragments {
        fragment.value.zeroize();
    }
    let master_secret = cipher::decrypt(
        &encrypted,
        passphrase,
        params.iteration_exponent,
        params.identifier,
    )?;
    encrypted.zeroize();
    Ok(master_secret)
}
