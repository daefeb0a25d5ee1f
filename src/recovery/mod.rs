//! Interactive recovery session state.
//!
//! A `RecoverySession` accumulates mnemonic shares one at a time and
//! decides when reconstruction is legal. It performs no I/O of its
//! own: prompting and progress display belong to the caller, which
//! reads the session's pure status methods between `accept` calls.
//! A failed `accept` leaves the session unchanged, so the caller can
//! simply ask for the share again.

use std::collections::{BTreeMap, HashSet};

use crate::field::Gf256;
use crate::scheme;
use crate::share::Share;
use crate::wordlist::Wordlist;
use crate::MnemonicError;

/// Lifecycle of a recovery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No share accepted yet; the scheme layout is still unknown.
    Empty,
    /// At least one share accepted, not yet enough to reconstruct.
    Collecting,
    /// Enough complete groups collected; `recover` may be called.
    Complete,
}

/// Collection progress of a single group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStatus {
    pub group_index: u8,
    /// Distinct shares collected for this group so far.
    pub share_count: usize,
    /// The group's member threshold, once a share has revealed it.
    pub member_threshold: Option<u8>,
    pub complete: bool,
}

/// A snapshot of overall session progress, safe to render directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: SessionState,
    /// Groups required for recovery, once known.
    pub group_threshold: Option<u8>,
    pub groups_complete: usize,
    /// One entry per group of the layout, in group order.
    pub groups: Vec<GroupStatus>,
}

/// Stateful accumulator for one recovery attempt.
///
/// The first accepted share fixes the common parameters and the group
/// layout; later shares must agree with them. Dropping the session
/// aborts the attempt with no side effects.
pub struct RecoverySession<'a> {
    gf: &'a Gf256,
    wordlist: &'a Wordlist,
    last_share: Option<Share>,
    groups: BTreeMap<u8, HashSet<Share>>,
    mnemonics: Vec<String>,
}

impl<'a> RecoverySession<'a> {
    /// Create an empty session borrowing the process-wide tables.
    pub fn new(gf: &'a Gf256, wordlist: &'a Wordlist) -> Self {
        RecoverySession {
            gf,
            wordlist,
            last_share: None,
            groups: BTreeMap::new(),
            mnemonics: Vec::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        if self.last_share.is_none() {
            SessionState::Empty
        } else if self.is_complete() {
            SessionState::Complete
        } else {
            SessionState::Collecting
        }
    }

    /// Accept one mnemonic into the session.
    ///
    /// Decodes the mnemonic, checks it against the session's common
    /// parameters and inserts it into its group. Resubmitting an
    /// already accepted mnemonic is a no-op; a different share at an
    /// occupied member position is rejected. On any error the session
    /// state is exactly what it was before the call.
    ///
    /// # Arguments
    /// * `mnemonic` - Whitespace-separated vocabulary words.
    pub fn accept(&mut self, mnemonic: &str) -> Result<(), MnemonicError> {
        let share = Share::from_mnemonic(mnemonic, self.wordlist)?;

        if let Some(last) = &self.last_share {
            if last.common_parameters() != share.common_parameters() {
                return Err(MnemonicError::MnemonicSetMismatch);
            }
        }

        let group = self.groups.entry(share.group_index).or_default();
        if group.contains(&share) {
            self.last_share = Some(share);
            return Ok(());
        }
        if group
            .iter()
            .any(|existing| existing.member_threshold != share.member_threshold)
        {
            return Err(MnemonicError::MnemonicSetMismatch);
        }
        if group
            .iter()
            .any(|existing| existing.member_index == share.member_index)
        {
            return Err(MnemonicError::DuplicateMemberIndex {
                group_index: share.group_index,
                member_index: share.member_index,
            });
        }

        group.insert(share.clone());
        self.mnemonics.push(mnemonic.to_string());
        self.last_share = Some(share);
        Ok(())
    }

    /// Whether a group has collected at least its member threshold.
    pub fn group_is_complete(&self, group_index: u8) -> bool {
        match self.groups.get(&group_index) {
            Some(group) => group
                .iter()
                .next()
                .map_or(false, |share| group.len() >= usize::from(share.member_threshold)),
            None => false,
        }
    }

    /// Whether enough groups are complete to reconstruct the secret.
    pub fn is_complete(&self) -> bool {
        match &self.last_share {
            Some(last) => {
                let complete = (0..last.group_count)
                    .filter(|&index| self.group_is_complete(index))
                    .count();
                complete >= usize::from(last.group_threshold)
            }
            None => false,
        }
    }

    /// The fingerprint words identifying a group of the current set.
    ///
    /// # Returns
    /// The prefix words a share of that group starts with, or `None`
    /// while the session is empty.
    pub fn group_prefix(&self, group_index: u8) -> Option<String> {
        self.last_share.as_ref().map(|share| {
            let mut probe = share.clone();
            probe.group_index = group_index;
            probe.group_prefix(self.wordlist)
        })
    }

    /// Snapshot the collection progress across all groups.
    pub fn status(&self) -> SessionStatus {
        let (group_threshold, group_count) = match &self.last_share {
            Some(last) => (Some(last.group_threshold), last.group_count),
            None => (None, 0),
        };
        let groups: Vec<GroupStatus> = (0..group_count)
            .map(|index| {
                let shares = self.groups.get(&index);
                GroupStatus {
                    group_index: index,
                    share_count: shares.map_or(0, HashSet::len),
                    member_threshold: shares
                        .and_then(|g| g.iter().next())
                        .map(|share| share.member_threshold),
                    complete: self.group_is_complete(index),
                }
            })
            .collect();
        SessionStatus {
            state: self.state(),
            group_threshold,
            groups_complete: groups.iter().filter(|g| g.complete).count(),
            groups,
        }
    }

    /// The mnemonics accepted so far, in acceptance order.
    pub fn accepted_mnemonics(&self) -> &[String] {
        &self.mnemonics
    }

    /// Reconstruct the master secret from the accepted mnemonics.
    ///
    /// Delegates to the combine path; calling this before the session
    /// is complete fails with the corresponding reconstruction error.
    ///
    /// # Arguments
    /// * `passphrase` - Printable ASCII bytes; empty for none.
    pub fn recover(&self, passphrase: &[u8]) -> Result<Vec<u8>, MnemonicError> {
        scheme::combine_mnemonics(self.gf, self.wordlist, &self.mnemonics, passphrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::generate_mnemonics;

    const SECRET: &[u8] = b"ABCDEFGHIJKLMNOP";

    fn context() -> (Gf256, Wordlist) {
        (Gf256::new(), Wordlist::new().unwrap())
    }

    #[test]
    fn test_walkthrough_3_of_5() {
        let (gf, wordlist) = context();
        let mnemonics =
            generate_mnemonics(&gf, &wordlist, 1, &[(3, 5)], SECRET, b"", 0).unwrap();
        let group = &mnemonics[0];

        let mut session = RecoverySession::new(&gf, &wordlist);
        assert_eq!(session.state(), SessionState::Empty);
        assert!(!session.is_complete());

        session.accept(&group[0]).unwrap();
        assert_eq!(session.state(), SessionState::Collecting);
        let status = session.status();
        assert_eq!(status.group_threshold, Some(1));
        assert_eq!(status.groups.len(), 1);
        assert_eq!(status.groups[0].share_count, 1);
        assert_eq!(status.groups[0].member_threshold, Some(3));
        assert!(!status.groups[0].complete);

        session.accept(&group[2]).unwrap();
        assert_eq!(session.state(), SessionState::Collecting);

        session.accept(&group[4]).unwrap();
        assert_eq!(session.state(), SessionState::Complete);
        assert!(session.group_is_complete(0));
        assert_eq!(session.recover(b"").unwrap(), SECRET);
    }

    #[test]
    fn test_foreign_share_rejected_without_state_change() {
        let (gf, wordlist) = context();
        let own =
            generate_mnemonics(&gf, &wordlist, 1, &[(2, 3)], SECRET, b"", 0).unwrap();
        let foreign =
            generate_mnemonics(&gf, &wordlist, 1, &[(2, 3)], SECRET, b"", 0).unwrap();

        let mut session = RecoverySession::new(&gf, &wordlist);
        session.accept(&own[0][0]).unwrap();
        let before = session.status();

        assert!(matches!(
            session.accept(&foreign[0][1]),
            Err(MnemonicError::MnemonicSetMismatch)
        ));
        assert_eq!(session.status(), before);

        // The session still completes with its own set.
        session.accept(&own[0][2]).unwrap();
        assert_eq!(session.recover(b"").unwrap(), SECRET);
    }

    #[test]
    fn test_resubmission_is_noop() {
        let (gf, wordlist) = context();
        let mnemonics =
            generate_mnemonics(&gf, &wordlist, 1, &[(2, 3)], SECRET, b"", 0).unwrap();

        let mut session = RecoverySession::new(&gf, &wordlist);
        session.accept(&mnemonics[0][0]).unwrap();
        session.accept(&mnemonics[0][0]).unwrap();
        let status = session.status();
        assert_eq!(status.groups[0].share_count, 1);
        assert_eq!(session.accepted_mnemonics().len(), 1);
        assert!(!session.is_complete());
    }

    #[test]
    fn test_conflicting_member_index_rejected() {
        let (gf, wordlist) = context();
        let mnemonics =
            generate_mnemonics(&gf, &wordlist, 1, &[(2, 3)], SECRET, b"", 0).unwrap();

        // A different payload at an already occupied member position.
        let mut conflicting =
            Share::from_mnemonic(&mnemonics[0][0], &wordlist).unwrap();
        conflicting.value[0] ^= 0xFF;
        let conflicting = conflicting.to_mnemonic(&wordlist);

        let mut session = RecoverySession::new(&gf, &wordlist);
        session.accept(&mnemonics[0][0]).unwrap();
        assert!(matches!(
            session.accept(&conflicting),
            Err(MnemonicError::DuplicateMemberIndex { group_index: 0, member_index: 0 })
        ));
        assert_eq!(session.accepted_mnemonics().len(), 1);
    }

    #[test]
    fn test_undecodable_mnemonic_reported() {
        let (gf, wordlist) = context();
        let mut session = RecoverySession::new(&gf, &wordlist);
        assert!(matches!(
            session.accept("definitely not a mnemonic"),
            Err(MnemonicError::UnknownWord(_))
        ));
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_multi_group_status_and_prefixes() {
        let (gf, wordlist) = context();
        let mnemonics = generate_mnemonics(
            &gf, &wordlist, 2, &[(2, 2), (1, 1), (2, 3)], SECRET, b"", 0,
        )
        .unwrap();

        let mut session = RecoverySession::new(&gf, &wordlist);
        assert_eq!(session.group_prefix(0), None);

        session.accept(&mnemonics[0][0]).unwrap();
        let status = session.status();
        assert_eq!(status.groups.len(), 3);
        assert_eq!(status.groups_complete, 0);

        // Prefixes are derivable for groups without any accepted share.
        let prefix_1 = session.group_prefix(1).unwrap();
        assert_eq!(
            prefix_1,
            Share::from_mnemonic(&mnemonics[1][0], &wordlist)
                .unwrap()
                .group_prefix(&wordlist)
        );

        session.accept(&mnemonics[0][1]).unwrap();
        session.accept(&mnemonics[1][0]).unwrap();
        assert_eq!(session.state(), SessionState::Complete);
        assert_eq!(session.status().groups_complete, 2);
        assert_eq!(session.recover(b"").unwrap(), SECRET);
    }

    #[test]
    fn test_premature_recover_fails() {
        let (gf, wordlist) = context();
        let mnemonics =
            generate_mnemonics(&gf, &wordlist, 1, &[(3, 5)], SECRET, b"", 0).unwrap();

        let mut session = RecoverySession::new(&gf, &wordlist);
        session.accept(&mnemonics[0][0]).unwrap();
        session.accept(&mnemonics[0][1]).unwrap();
        assert!(matches!(
            session.recover(b""),
            Err(MnemonicError::NotEnoughGroups { .. })
        ));
    }
}
