//! The router: owns the registry and the account cache, drives the
//! init/update fetch cycle and dispatches quotes to adapters.
//!
//! ```text
//!                init()           apply_fetched()           apply_fetched()
//!   Uninitialized ─────► (same) ──────────────► Initializing ──────────────► Ready
//!                                  no pool decoded              pool decoded    │ ▲
//!                                                                  mark_stale() │ │ apply_*()
//!                                                                               ▼ │
//!                                                                           ReadyStale
//! ```
//!
//! Every mutation is all-or-nothing: a failed apply leaves the cache, the
//! registry and the phase as they were.

mod build;
mod fetch;
mod quoting;

use std::collections::HashSet;

use solana_program::pubkey::Pubkey;

pub use fetch::AccountFetcher;

use crate::{
    accounts::{decode_clock_epoch, StakeAccountView},
    cache::{AccountCache, AccountRecord},
    config::{FeeSchedule, RouterConfig},
    consts::SYSVAR_CLOCK,
    error::{RouterError, RouterErrorCode},
    quote::ActiveStakeParams,
    registry::{InitMint, MintRegistry, PoolBinding},
    update::SwapMints,
};

/// Router lifecycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
pub enum RouterPhase {
    /// Nothing fetched yet
    Uninitialized,
    /// Accounts fetched but no pool decoded
    Initializing,
    /// At least one pool decoded
    Ready,
    /// Ready, but the caller has not run an update cycle since marking stale
    ReadyStale,
}

/// Quotes and builds swaps across the registered pools.
#[derive(Clone, Debug)]
pub struct StakeRouter {
    registry: MintRegistry,
    cache: AccountCache,
    fees: FeeSchedule,
    phase: RouterPhase,
    curr_epoch: Option<u64>,
}

impl Default for StakeRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl StakeRouter {
    /// Create a router with the default fee schedule.
    pub fn new() -> Self {
        Self {
            registry: MintRegistry::new(),
            cache: AccountCache::new(),
            fees: FeeSchedule::default(),
            phase: RouterPhase::Uninitialized,
            curr_epoch: None,
        }
    }

    /// Create a router with fees from `config`.
    ///
    /// # Errors
    /// `Decode` if the config is invalid.
    pub fn with_config(config: &RouterConfig) -> Result<Self, RouterError> {
        Ok(Self {
            fees: config.resolve()?,
            ..Self::new()
        })
    }

    /// Current phase.
    pub fn phase(&self) -> RouterPhase {
        self.phase
    }

    /// Epoch of the last clock sysvar applied.
    pub fn curr_epoch(&self) -> Option<u64> {
        self.curr_epoch
    }

    /// Registered mints and their adapters.
    pub fn registry(&self) -> &MintRegistry {
        &self.registry
    }

    /// Cached accounts.
    pub fn cache(&self) -> &AccountCache {
        &self.cache
    }

    /// Router fee schedule.
    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    // ===== Init / update =====

    /// Register `mints` without fetching anything. Registering the same
    /// binding twice is a no-op. Nothing is registered if any mint fails.
    ///
    /// # Errors
    /// `Conflict` or `UninitializedMint` per [`PoolBinding::resolve`].
    pub fn init(&mut self, mints: &[InitMint]) -> Result<(), RouterError> {
        let mut registry = self.registry.clone();
        for m in mints {
            registry.register(m.mint, PoolBinding::resolve(m)?)?;
        }
        self.registry = registry;
        Ok(())
    }

    /// Accounts to fetch to decode `mints` from scratch, sorted and
    /// deduplicated. Does not require the mints to be registered.
    ///
    /// # Errors
    /// `Conflict` or `UninitializedMint` per [`PoolBinding::resolve`].
    pub fn accounts_to_fetch_for_init(&self, mints: &[InitMint]) -> Result<Vec<Pubkey>, RouterError> {
        let mut accounts = Vec::new();
        for m in mints {
            accounts.extend(PoolBinding::resolve(m)?.init_accounts());
        }
        accounts.sort();
        accounts.dedup();
        Ok(accounts)
    }

    /// Accounts to refetch before quoting `swaps`, sorted and deduplicated.
    ///
    /// # Errors
    /// `UninitializedMint` if a mint is not registered, `Unsupported` if a pool
    /// does not support its part of a swap.
    pub fn accounts_to_fetch_for_update(&self, swaps: &[SwapMints]) -> Result<Vec<Pubkey>, RouterError> {
        let updates: Vec<_> = swaps.iter().flat_map(SwapMints::pool_updates).collect();
        self.registry.accounts_required_for_update(&updates)
    }

    /// Put `records` into the cache and decode every pool whose init accounts
    /// are all present and of which at least one was just fetched.
    ///
    /// # Errors
    /// `Decode` if a pool or the clock fails to decode. Nothing is applied.
    pub fn apply_fetched(&mut self, records: Vec<AccountRecord>) -> Result<(), RouterError> {
        let fetched: HashSet<Pubkey> = records.iter().map(|r| r.pubkey).collect();
        log::debug!("applying {} fetched accounts", fetched.len());

        let mut cache = self.cache.clone();
        cache.put_all(records);
        let mut registry = self.registry.clone();
        for (mint, entry) in registry.entries_mut() {
            let accounts = entry.adapter.init_accounts();
            if !accounts.iter().all(|a| cache.contains(a)) {
                log::trace!("mint {mint} still missing accounts");
                continue;
            }
            if entry.adapter.is_decoded() && !accounts.iter().any(|a| fetched.contains(a)) {
                continue;
            }
            entry.adapter.refresh(&cache)?;
            log::debug!("decoded pool of mint {mint}");
        }
        let curr_epoch = if fetched.contains(&SYSVAR_CLOCK) {
            Some(decode_clock_epoch(cache.get(&SYSVAR_CLOCK)?)?)
        } else {
            self.curr_epoch
        };

        self.cache = cache;
        self.registry = registry;
        self.curr_epoch = curr_epoch;
        self.phase = if self.registry.any_decoded() {
            RouterPhase::Ready
        } else {
            RouterPhase::Initializing
        };
        Ok(())
    }

    /// Apply an update batch for `swaps`, after checking it contains every
    /// account [`Self::accounts_to_fetch_for_update`] asks for.
    ///
    /// # Errors
    /// `NotFound` if the batch is incomplete, else as [`Self::apply_fetched`].
    pub fn apply_update(
        &mut self,
        swaps: &[SwapMints],
        records: Vec<AccountRecord>,
    ) -> Result<(), RouterError> {
        let fetched: HashSet<Pubkey> = records.iter().map(|r| r.pubkey).collect();
        if let Some(missing) = self
            .accounts_to_fetch_for_update(swaps)?
            .iter()
            .find(|a| !fetched.contains(a))
        {
            return Err(RouterError::account_missing(missing));
        }
        self.apply_fetched(records)
    }

    /// Mark the decoded state as possibly outdated. Quotes keep working but
    /// log a warning until the next apply.
    pub fn mark_stale(&mut self) {
        if self.phase == RouterPhase::Ready {
            self.phase = RouterPhase::ReadyStale;
        }
    }

    /// Deposit parameters of the stake account in `record`, as of the epoch
    /// of the last applied clock.
    ///
    /// # Errors
    /// `NotReady` if no clock has been applied, `Decode` if the account is not
    /// a delegated stake account.
    pub fn deposit_stake_params(&self, record: &AccountRecord) -> Result<ActiveStakeParams, RouterError> {
        let epoch = self.curr_epoch.ok_or_else(|| {
            RouterError::new(RouterErrorCode::NotReady, "clock sysvar has not been fetched")
        })?;
        StakeAccountView::decode(record)?.active_stake_params(epoch)
    }

    fn check_ready(&self) -> Result<(), RouterError> {
        match self.phase {
            RouterPhase::Ready => Ok(()),
            RouterPhase::ReadyStale => {
                log::warn!("quoting against stale pool state");
                Ok(())
            }
            RouterPhase::Uninitialized | RouterPhase::Initializing => Err(RouterError::new(
                RouterErrorCode::NotReady,
                format!("router is {}", <&str>::from(self.phase)),
            )),
        }
    }
}
