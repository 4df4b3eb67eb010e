//! In-memory account cache.
//!
//! The cache never fetches. It is fed whole records by the caller and hands
//! out borrowed views. Records are replaced wholesale, never patched.

use std::collections::HashMap;

use solana_program::pubkey::Pubkey;

use crate::error::RouterError;

/// A fetched account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountRecord {
    /// Account address
    pub pubkey: Pubkey,
    /// Raw account data
    pub data: Vec<u8>,
    /// Owning program
    pub owner: Pubkey,
    /// Lamport balance
    pub lamports: u64,
}

impl AccountRecord {
    /// Create a record.
    pub fn new(pubkey: Pubkey, data: Vec<u8>, owner: Pubkey, lamports: u64) -> Self {
        Self {
            pubkey,
            data,
            owner,
            lamports,
        }
    }
}

/// Map of address to the last record seen for it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountCache {
    accounts: HashMap<Pubkey, AccountRecord>,
}

impl AccountCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a record.
    ///
    /// # Errors
    /// `NotFound` if the account was never put.
    pub fn get(&self, pubkey: &Pubkey) -> Result<&AccountRecord, RouterError> {
        self.accounts
            .get(pubkey)
            .ok_or_else(|| RouterError::account_missing(pubkey))
    }

    /// Look up a record's data.
    ///
    /// # Errors
    /// `NotFound` if the account was never put.
    pub fn data(&self, pubkey: &Pubkey) -> Result<&[u8], RouterError> {
        self.get(pubkey).map(|a| a.data.as_slice())
    }

    /// Whether a record exists.
    pub fn contains(&self, pubkey: &Pubkey) -> bool {
        self.accounts.contains_key(pubkey)
    }

    /// Insert or replace records. Later records for the same address win.
    pub fn put_all(&mut self, records: impl IntoIterator<Item = AccountRecord>) {
        for record in records {
            log::trace!("cache put {} ({} bytes)", record.pubkey, record.data.len());
            self.accounts.insert(record.pubkey, record);
        }
    }

    /// Number of cached accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
