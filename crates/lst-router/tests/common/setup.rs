//! Router setup helpers: an in-memory chain and a fully initialized router.

use std::collections::HashMap;

use lst_router::{
    adapters::spl::SplPoolInit,
    consts::{MSOL_MINT, NATIVE_MINT, STSOL_MINT},
    AccountFetcher, AccountRecord, InitMint, RouterPhase, StakeRouter,
};
use solana_program::pubkey::Pubkey;

use super::{mock_accounts::*, pda::*};

/// Initialize logging once per test binary. `RUST_LOG=debug` shows the
/// router's decode and routing decisions.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// In-memory account store standing in for an RPC node.
#[derive(Clone, Debug, Default)]
pub struct MockChain {
    accounts: HashMap<Pubkey, AccountRecord>,
    /// Number of `fetch` calls served
    pub fetches: usize,
}

impl MockChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace accounts
    pub fn put_all(&mut self, records: impl IntoIterator<Item = AccountRecord>) {
        for record in records {
            self.accounts.insert(record.pubkey, record);
        }
    }

    /// Drop an account
    pub fn remove(&mut self, pubkey: &Pubkey) {
        self.accounts.remove(pubkey);
    }

    /// Current records of `pubkeys`, skipping absent ones
    pub fn records(&self, pubkeys: &[Pubkey]) -> Vec<AccountRecord> {
        pubkeys
            .iter()
            .filter_map(|pk| self.accounts.get(pk).cloned())
            .collect()
    }
}

impl AccountFetcher for MockChain {
    type Error = String;

    fn fetch(&mut self, pubkeys: &[Pubkey]) -> Result<Vec<Option<AccountRecord>>, String> {
        self.fetches += 1;
        Ok(pubkeys.iter().map(|pk| self.accounts.get(pk).cloned()).collect())
    }
}

/// Validator shared by SPL pools A and B, Marinade and Lido
pub fn v1() -> Pubkey {
    key(1)
}

/// Validator only in SPL pool A
pub fn v2() -> Pubkey {
    key(2)
}

/// Validator only in SPL pool C
pub fn v3() -> Pubkey {
    key(3)
}

/// A chain holding every pool the router knows, all current as of [`EPOCH`]:
///
/// ```text
///   spl A    validators v1 (50 SOL), v2 (20 SOL)
///   spl B    validators v1 (50 SOL)
///   spl C    validators v3 (50 SOL)
///   reserve  flat 0.1% fee, 100 SOL liquid
///   marinade validators v1
///   lido     validators v1 (100 SOL effective)
/// ```
pub struct Fixture {
    /// The chain
    pub chain: MockChain,
}

impl Fixture {
    /// Build the default world
    pub fn new() -> Self {
        let mut chain = MockChain::new();
        chain.put_all([clock_account(EPOCH)]);
        chain.put_all(reserve_accounts(1, 1000, 100_000_000_000));
        for (n, validators) in [
            (0u8, vec![(v1(), 50_000_000_000u64), (v2(), 20_000_000_000)]),
            (1, vec![(v1(), 50_000_000_000)]),
            (2, vec![(v3(), 50_000_000_000)]),
        ] {
            let init = spl_pool_init(n);
            let pool = spl_stake_pool(&init, &spl_mint(n));
            chain.put_all(spl_pool_accounts(&init, &pool, &validators, 10_000_000_000));
        }
        chain.put_all(marinade_accounts(&marinade_state(1), &[v1()], 0));
        chain.put_all(lido_accounts(&[(v1(), 100_000_000_000)]));
        Self { chain }
    }

    /// SPL pool `n`'s init data
    pub fn spl(&self, n: u8) -> SplPoolInit {
        spl_pool_init(n)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Mint of SPL pool A
pub fn spl_a() -> Pubkey {
    spl_mint(0)
}

/// Mint of SPL pool B
pub fn spl_b() -> Pubkey {
    spl_mint(1)
}

/// Mint of SPL pool C
pub fn spl_c() -> Pubkey {
    spl_mint(2)
}

/// Every mint of the default world
pub fn all_mints() -> Vec<InitMint> {
    vec![
        InitMint::well_known(NATIVE_MINT),
        InitMint::well_known(MSOL_MINT),
        InitMint::well_known(STSOL_MINT),
        InitMint::spl(spl_a(), spl_pool_init(0)),
        InitMint::spl(spl_b(), spl_pool_init(1)),
        InitMint::spl(spl_c(), spl_pool_init(2)),
    ]
}

/// A router initialized against `fixture` with the default fees.
pub fn ready_router(fixture: &mut Fixture) -> StakeRouter {
    init_logger();
    let mut router = StakeRouter::new();
    router
        .refresh_init(&mut fixture.chain, &all_mints())
        .expect("init against the default world");
    assert_eq!(router.phase(), RouterPhase::Ready);
    router
}
