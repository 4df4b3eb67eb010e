//! Program-derived address helpers.
//!
//! ```text
//!   fee token account   = PDA(["fee", mint], router)
//!   bridge stake        = PDA(["bridge_stake", user, seed_le], router)
//!   slumdog stake       = create_with_seed(bridge stake, "slumdog", stake program)
//!   slumdog acc record  = PDA([reserve pool, slumdog stake], unstake program)
//! ```

use core::num::NonZeroU32;

use solana_program::pubkey::Pubkey;

use crate::{
    consts::{
        BRIDGE_STAKE_SEED, FEE_SEED, LIDO_PROGRAM, LIDO_STATE, MARINADE_PROGRAM, MARINADE_STATE,
        RESERVE_POOL, ROUTER_PROGRAM, SLUMDOG_SEED, STAKE_PROGRAM, UNSTAKE_PROGRAM,
    },
    error::RouterError,
};

fn find_pda(seeds: &[&[u8]], program_id: &Pubkey, what: &str) -> Result<(Pubkey, u8), RouterError> {
    Pubkey::try_find_program_address(seeds, program_id).ok_or_else(|| RouterError::invalid_pda(what))
}

/// Router fee token account of `mint`.
///
/// # Errors
/// `Build` if no bump yields an off-curve address.
pub fn find_fee_token_account_pda(mint: &Pubkey) -> Result<(Pubkey, u8), RouterError> {
    find_pda(&[FEE_SEED, mint.as_ref()], &ROUTER_PROGRAM, "fee token account")
}

/// Bridge stake account of `user` at `seed`.
///
/// # Errors
/// `Build` if no bump yields an off-curve address.
pub fn find_bridge_stake_pda(user: &Pubkey, seed: u32) -> Result<(Pubkey, u8), RouterError> {
    find_pda(
        &[BRIDGE_STAKE_SEED, user.as_ref(), &seed.to_le_bytes()],
        &ROUTER_PROGRAM,
        "bridge stake",
    )
}

/// Slumdog stake account split off `bridge_stake`.
///
/// # Errors
/// `Build` if the derived address is rejected by the runtime rules.
pub fn create_slumdog_stake(bridge_stake: &Pubkey) -> Result<Pubkey, RouterError> {
    Pubkey::create_with_seed(bridge_stake, SLUMDOG_SEED, &STAKE_PROGRAM)
        .map_err(|_| RouterError::invalid_pda("slumdog stake"))
}

/// Reserve pool stake account record of `stake_account`.
///
/// # Errors
/// `Build` if no bump yields an off-curve address.
pub fn find_reserve_stake_acc_record_pda(
    stake_account: &Pubkey,
) -> Result<(Pubkey, u8), RouterError> {
    find_pda(
        &[RESERVE_POOL.as_ref(), stake_account.as_ref()],
        &UNSTAKE_PROGRAM,
        "stake account record",
    )
}

/// Marinade validator duplication flag of `vote`.
///
/// # Errors
/// `Build` if no bump yields an off-curve address.
pub fn find_marinade_duplication_flag_pda(vote: &Pubkey) -> Result<(Pubkey, u8), RouterError> {
    find_pda(
        &[MARINADE_STATE.as_ref(), b"unique_validator", vote.as_ref()],
        &MARINADE_PROGRAM,
        "duplication flag",
    )
}

/// SPL stake pool withdraw authority.
///
/// # Errors
/// `Build` if no bump yields an off-curve address.
pub fn find_spl_withdraw_auth_pda(
    program: &Pubkey,
    stake_pool: &Pubkey,
) -> Result<(Pubkey, u8), RouterError> {
    find_pda(&[stake_pool.as_ref(), b"withdraw"], program, "withdraw authority")
}

/// SPL stake pool default deposit authority.
///
/// # Errors
/// `Build` if no bump yields an off-curve address.
pub fn find_spl_deposit_auth_pda(
    program: &Pubkey,
    stake_pool: &Pubkey,
) -> Result<(Pubkey, u8), RouterError> {
    find_pda(&[stake_pool.as_ref(), b"deposit"], program, "deposit authority")
}

/// SPL stake pool validator stake account. A zero seed suffix means no suffix.
///
/// # Errors
/// `Build` if no bump yields an off-curve address.
pub fn find_spl_validator_stake_pda(
    program: &Pubkey,
    vote: &Pubkey,
    stake_pool: &Pubkey,
    seed: Option<NonZeroU32>,
) -> Result<(Pubkey, u8), RouterError> {
    let suffix = seed.map(|s| s.get().to_le_bytes());
    match &suffix {
        Some(s) => find_pda(
            &[vote.as_ref(), stake_pool.as_ref(), s],
            program,
            "validator stake",
        ),
        None => find_pda(&[vote.as_ref(), stake_pool.as_ref()], program, "validator stake"),
    }
}

/// Solido validator stake account at `seed`.
///
/// # Errors
/// `Build` if no bump yields an off-curve address.
pub fn find_lido_validator_stake_pda(vote: &Pubkey, seed: u64) -> Result<(Pubkey, u8), RouterError> {
    find_pda(
        &[
            LIDO_STATE.as_ref(),
            vote.as_ref(),
            b"validator_stake_account",
            &seed.to_le_bytes(),
        ],
        &LIDO_PROGRAM,
        "lido validator stake",
    )
}

/// The ephemeral accounts of one prefund flow, derived from the user and the
/// bridge stake seed. Plain values; nothing here is owned or needs cleanup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EphemeralStakeAccounts {
    /// Seed the bridge stake was derived with
    pub bridge_stake_seed: u32,
    /// Bridge stake PDA
    pub bridge_stake: Pubkey,
    /// Slumdog stake, seeded off the bridge stake
    pub slumdog_stake: Pubkey,
    /// Reserve pool record of the slumdog stake
    pub slumdog_stake_acc_record: Pubkey,
}

impl EphemeralStakeAccounts {
    /// Derive all ephemeral accounts for `user` at `bridge_stake_seed`.
    ///
    /// # Errors
    /// `Build` if any derivation fails.
    pub fn derive(user: &Pubkey, bridge_stake_seed: u32) -> Result<Self, RouterError> {
        let (bridge_stake, _bump) = find_bridge_stake_pda(user, bridge_stake_seed)?;
        let slumdog_stake = create_slumdog_stake(&bridge_stake)?;
        let (slumdog_stake_acc_record, _bump) = find_reserve_stake_acc_record_pda(&slumdog_stake)?;
        Ok(Self {
            bridge_stake_seed,
            bridge_stake,
            slumdog_stake,
            slumdog_stake_acc_record,
        })
    }
}
