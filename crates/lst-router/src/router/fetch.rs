//! Fetch collaborator seam.
//!
//! The router never does I/O. Callers either feed [`StakeRouter::apply_fetched`]
//! themselves or hand an [`AccountFetcher`] to the `refresh_*` helpers, which
//! run one fetch-and-apply cycle.

use core::fmt::Display;

use solana_program::pubkey::Pubkey;

use super::StakeRouter;
use crate::{
    cache::AccountRecord,
    error::{RouterError, RouterErrorCode},
    registry::InitMint,
    update::SwapMints,
};

/// Batched account source, e.g. an RPC client.
pub trait AccountFetcher {
    /// Transport error
    type Error: Display;

    /// Fetch `pubkeys`, returning one entry per key in the same order,
    /// `None` for accounts that do not exist.
    ///
    /// # Errors
    /// Transport failure. The whole batch is discarded.
    fn fetch(&mut self, pubkeys: &[Pubkey]) -> Result<Vec<Option<AccountRecord>>, Self::Error>;
}

/// Fetch `pubkeys` and require every one of them to exist.
fn fetch_all<F: AccountFetcher>(
    fetcher: &mut F,
    pubkeys: &[Pubkey],
) -> Result<Vec<AccountRecord>, RouterError> {
    let fetched = fetcher.fetch(pubkeys).map_err(|e| {
        RouterError::new(RouterErrorCode::NotFound, format!("fetch failed: {e}"))
    })?;
    if fetched.len() != pubkeys.len() {
        return Err(RouterError::new(
            RouterErrorCode::NotFound,
            format!("fetched {} accounts, expected {}", fetched.len(), pubkeys.len()),
        ));
    }
    pubkeys
        .iter()
        .zip(fetched)
        .map(|(pk, record)| record.ok_or_else(|| RouterError::account_missing(pk)))
        .collect()
}

impl StakeRouter {
    /// Register `mints`, then fetch and apply everything needed to decode them.
    /// Registration is kept if the fetch fails.
    ///
    /// # Errors
    /// As [`StakeRouter::init`], `NotFound` if the fetch fails or any account
    /// is absent, else as [`StakeRouter::apply_fetched`].
    pub fn refresh_init<F: AccountFetcher>(
        &mut self,
        fetcher: &mut F,
        mints: &[InitMint],
    ) -> Result<(), RouterError> {
        self.init(mints)?;
        let accounts = self.accounts_to_fetch_for_init(mints)?;
        log::debug!("fetching {} init accounts", accounts.len());
        let records = fetch_all(fetcher, &accounts)?;
        self.apply_fetched(records)
    }

    /// Fetch and apply the update set of `swaps`.
    ///
    /// # Errors
    /// As [`StakeRouter::accounts_to_fetch_for_update`], `NotFound` if the
    /// fetch fails or any account is absent.
    pub fn refresh_update<F: AccountFetcher>(
        &mut self,
        fetcher: &mut F,
        swaps: &[SwapMints],
    ) -> Result<(), RouterError> {
        let accounts = self.accounts_to_fetch_for_update(swaps)?;
        log::debug!("fetching {} update accounts", accounts.len());
        let records = fetch_all(fetcher, &accounts)?;
        self.apply_update(swaps, records)
    }
}
