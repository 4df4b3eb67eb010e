//! Deterministic addresses for router tests.

use lst_router::{
    adapters::spl::SplPoolInit,
    consts::SPL_STAKE_POOL_PROGRAM,
    pda::find_spl_deposit_auth_pda,
};
use solana_program::pubkey::Pubkey;

/// A fixed, recognizable address
pub fn key(n: u8) -> Pubkey {
    Pubkey::new_from_array([n; 32])
}

/// Addresses of SPL stake pool number `n`. Pools are spaced so their
/// accounts never collide with each other or with [`key`] votes below 100.
pub fn spl_pool_init(n: u8) -> SplPoolInit {
    SplPoolInit {
        stake_pool: key(100 + n * 4),
        program: SPL_STAKE_POOL_PROGRAM,
        validator_list: key(101 + n * 4),
        reserve_stake: key(102 + n * 4),
    }
}

/// Mint of SPL stake pool number `n`
pub fn spl_mint(n: u8) -> Pubkey {
    key(103 + n * 4)
}

/// Default deposit authority of an SPL stake pool
pub fn spl_deposit_auth(init: &SplPoolInit) -> Pubkey {
    find_spl_deposit_auth_pda(&init.program, &init.stake_pool)
        .unwrap()
        .0
}
