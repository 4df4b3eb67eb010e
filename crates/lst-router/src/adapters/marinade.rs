//! Marinade adapter.
//!
//! SOL deposits first buy mSOL out of the liquidity pool's mSOL leg and mint
//! the remainder. Stake deposits mint against the delegated stake; the
//! account's undelegated lamports go the way of a SOL deposit.

use borsh::{BorshDeserialize, BorshSerialize};
use bytemuck::{Pod, Zeroable};
use solana_program::{instruction::AccountMeta, pubkey::Pubkey};

use super::{account_discriminator, anchor_deserialize, DepositSolQuoter, DepositStakeQuoter};
use crate::{
    accounts::TokenAccountView,
    cache::{AccountCache, AccountRecord},
    consts::{
        MARINADE_LIQ_POOL_MSOL_LEG, MARINADE_LIQ_POOL_MSOL_LEG_AUTHORITY,
        MARINADE_LIQ_POOL_SOL_LEG, MARINADE_PROGRAM, MARINADE_RESERVE, MARINADE_STAKE_LIST,
        MARINADE_STATE, MARINADE_VALIDATOR_LIST, MSOL_MINT_AUTHORITY, STAKE_PROGRAM,
        SYSTEM_PROGRAM, SYSVAR_CLOCK, SYSVAR_RENT, TOKEN_PROGRAM,
    },
    error::{MarinadeError, RouterError},
    pda::find_marinade_duplication_flag_pda,
    quote::{ActiveStakeParams, DepositStakeQuote, TokenQuote},
    update::PoolUpdateType,
};

const STATE_DISCM: [u8; 8] = account_discriminator("State");
const LIST_HEADER_LEN: usize = 8;

/// Fee in basis points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct FeeBps {
    /// Basis points
    pub basis_points: u32,
}

/// Fee in hundredths of a basis point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct FeeCents {
    /// Hundredths of a basis point
    pub bp_cents: u32,
}

/// Header of an account-backed list.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct List {
    pub account: [u8; 32],
    pub item_size: u32,
    pub count: u32,
    pub reserved1: [u8; 32],
    pub reserved2: u32,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StakeSystem {
    pub stake_list: List,
    pub delayed_unstake_cooling_down: u64,
    pub stake_deposit_bump_seed: u8,
    pub stake_withdraw_bump_seed: u8,
    pub slots_for_stake_delta: u64,
    pub last_stake_delta_epoch: u64,
    pub min_stake: u64,
    pub extra_stake_delta_runs: u32,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ValidatorSystem {
    pub validator_list: List,
    pub manager_authority: [u8; 32],
    pub total_validator_score: u32,
    pub total_active_balance: u64,
    pub auto_add_validator_enabled: u8,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct LiqPool {
    pub lp_mint: [u8; 32],
    pub lp_mint_authority_bump_seed: u8,
    pub sol_leg_bump_seed: u8,
    pub msol_leg_authority_bump_seed: u8,
    pub msol_leg: [u8; 32],
    pub lp_liquidity_target: u64,
    pub lp_max_fee: FeeBps,
    pub lp_min_fee: FeeBps,
    pub treasury_cut: FeeBps,
    pub lp_supply: u64,
    pub lent_from_sol_leg: u64,
    pub liquidity_sol_cap: u64,
}

/// Marinade state account.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct MarinadeState {
    pub msol_mint: [u8; 32],
    pub admin_authority: [u8; 32],
    pub operational_sol_account: [u8; 32],
    pub treasury_msol_account: [u8; 32],
    pub reserve_bump_seed: u8,
    pub msol_mint_authority_bump_seed: u8,
    pub rent_exempt_for_token_acc: u64,
    pub reward_fee: FeeBps,
    pub stake_system: StakeSystem,
    pub validator_system: ValidatorSystem,
    pub liq_pool: LiqPool,
    pub available_reserve_balance: u64,
    pub msol_supply: u64,
    pub msol_price: u64,
    pub circulating_ticket_count: u64,
    pub circulating_ticket_balance: u64,
    pub lent_from_reserve: u64,
    pub min_deposit: u64,
    pub min_withdraw: u64,
    pub staking_sol_cap: u64,
    pub emergency_cooling_down: u64,
    pub pause_authority: [u8; 32],
    pub paused: bool,
    pub delayed_unstake_fee: FeeCents,
    pub withdraw_stake_account_fee: FeeCents,
    pub withdraw_stake_account_enabled: bool,
    pub last_stake_move_epoch: u64,
    pub stake_moved: u64,
    pub max_stake_moved_per_epoch: FeeBps,
}

impl MarinadeState {
    fn total_cooling_down(&self) -> Option<u64> {
        self.stake_system
            .delayed_unstake_cooling_down
            .checked_add(self.emergency_cooling_down)
    }

    fn total_lamports_under_control(&self) -> Option<u64> {
        self.validator_system
            .total_active_balance
            .checked_add(self.total_cooling_down()?)?
            .checked_add(self.available_reserve_balance)
    }

    fn total_virtual_staked_lamports(&self) -> Option<u64> {
        self.total_lamports_under_control()?
            .checked_sub(self.circulating_ticket_balance)
    }

    fn msol_from_lamports(&self, lamports: u64) -> Result<u64, MarinadeError> {
        let total = self
            .total_virtual_staked_lamports()
            .ok_or(MarinadeError::CalculationFailure)?;
        proportional(lamports, self.msol_supply, total)
    }

    fn lamports_from_msol(&self, msol: u64) -> Result<u64, MarinadeError> {
        let total = self
            .total_virtual_staked_lamports()
            .ok_or(MarinadeError::CalculationFailure)?;
        proportional(msol, total, self.msol_supply)
    }

    fn check_staking_cap(&self, lamports: u64) -> Result<(), MarinadeError> {
        let after = self
            .total_lamports_under_control()
            .and_then(|t| t.checked_add(lamports))
            .ok_or(MarinadeError::CalculationFailure)?;
        if after > self.staking_sol_cap {
            return Err(MarinadeError::StakingIsCapped);
        }
        Ok(())
    }
}

/// `amount * num / den`, 1:1 when nothing has been issued yet.
fn proportional(amount: u64, num: u64, den: u64) -> Result<u64, MarinadeError> {
    if num == 0 || den == 0 {
        return Ok(amount);
    }
    let r = amount as u128 * num as u128 / den as u128;
    u64::try_from(r).map_err(|_| MarinadeError::CalculationFailure)
}

/// Validator list entry.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct ValidatorRecord {
    validator_account: [u8; 32],
    active_balance: [u8; 8],
    score: [u8; 4],
    last_stake_delta_epoch: [u8; 8],
    duplication_flag_bump_seed: u8,
}

/// Size of a [`ValidatorRecord`].
pub const VALIDATOR_RECORD_LEN: usize = core::mem::size_of::<ValidatorRecord>();

impl ValidatorRecord {
    /// Vote account.
    pub fn vote(&self) -> Pubkey {
        Pubkey::new_from_array(self.validator_account)
    }

    /// Lamports delegated to the validator.
    pub fn active_balance(&self) -> u64 {
        u64::from_le_bytes(self.active_balance)
    }
}

fn decode_validator_records(
    record: &AccountRecord,
    list: &List,
) -> Result<Vec<ValidatorRecord>, RouterError> {
    let invalid = || RouterError::decode(&record.pubkey, "marinade validator list");
    let item_size = list.item_size as usize;
    if item_size < VALIDATOR_RECORD_LEN {
        return Err(invalid());
    }
    (0..list.count as usize)
        .map(|i| {
            let start = LIST_HEADER_LEN + i * item_size;
            record
                .data
                .get(start..start + VALIDATOR_RECORD_LEN)
                .map(bytemuck::pod_read_unaligned)
                .ok_or_else(invalid)
        })
        .collect()
}

/// Decoded Marinade state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarinadePool {
    /// State account
    pub state: MarinadeState,
    /// Validator list entries
    pub validator_records: Vec<ValidatorRecord>,
    /// mSOL held by the liquidity pool's mSOL leg
    pub msol_leg_balance: u64,
}

impl MarinadePool {
    /// mSOL for `lamports` of SOL: bought from the liquidity pool's mSOL leg
    /// first, the rest minted. `staking` lamports already entering the pool in
    /// the same deposit count against the staking cap.
    fn msol_for_sol(&self, lamports: u64, staking: u64) -> Result<u64, MarinadeError> {
        let state = &self.state;
        let buy_order = state.msol_from_lamports(lamports)?;
        let swapped = buy_order.min(self.msol_leg_balance);
        let mut remaining_lamports = lamports;
        if swapped > 0 {
            let paid = if swapped == buy_order {
                lamports
            } else {
                state.lamports_from_msol(swapped)?
            };
            remaining_lamports = remaining_lamports
                .checked_sub(paid)
                .ok_or(MarinadeError::CalculationFailure)?;
        }
        let minted = if remaining_lamports > 0 {
            state.check_staking_cap(
                remaining_lamports
                    .checked_add(staking)
                    .ok_or(MarinadeError::CalculationFailure)?,
            )?;
            state.msol_from_lamports(remaining_lamports)?
        } else {
            0
        };
        swapped
            .checked_add(minted)
            .ok_or(MarinadeError::CalculationFailure)
    }
}

impl DepositSolQuoter for MarinadePool {
    type Error = MarinadeError;

    fn quote_deposit_sol(&self, lamports: u64) -> Result<TokenQuote, MarinadeError> {
        let state = &self.state;
        if state.paused {
            return Err(MarinadeError::ProgramIsPaused);
        }
        if lamports < state.min_deposit {
            return Err(MarinadeError::DepositAmountIsTooLow);
        }
        Ok(TokenQuote {
            inp: lamports,
            out: self.msol_for_sol(lamports, 0)?,
            fee: 0,
        })
    }
}

impl DepositStakeQuoter for MarinadePool {
    type Error = MarinadeError;

    fn quote_deposit_stake(
        &self,
        stake: ActiveStakeParams,
    ) -> Result<DepositStakeQuote, MarinadeError> {
        let state = &self.state;
        if state.paused {
            return Err(MarinadeError::ProgramIsPaused);
        }
        let staked = stake.lamports.staked;
        if staked < state.stake_system.min_stake {
            return Err(MarinadeError::TooLowDelegationInDepositingStake);
        }
        let known = self
            .validator_records
            .iter()
            .any(|v| v.vote() == stake.vote);
        if !known && state.validator_system.auto_add_validator_enabled == 0 {
            return Err(MarinadeError::WrongValidatorAccountOrIndex);
        }
        state.check_staking_cap(staked)?;
        let minted = state.msol_from_lamports(staked)?;
        let unstaked = stake.lamports.unstaked;
        let from_unstaked = if unstaked > 0 {
            self.msol_for_sol(unstaked, staked)?
        } else {
            0
        };
        Ok(DepositStakeQuote {
            inp: stake,
            out: minted
                .checked_add(from_unstaked)
                .ok_or(MarinadeError::CalculationFailure)?,
            fee: 0,
        })
    }
}

/// Marinade adapter. Marinade is a singleton, so only its state varies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarinadeAdapter {
    /// Decoded state, `None` until the init accounts are fetched
    pub state: Option<MarinadePool>,
}

impl MarinadeAdapter {
    pub(crate) const fn init_accounts() -> [Pubkey; 3] {
        [
            MARINADE_STATE,
            MARINADE_VALIDATOR_LIST,
            MARINADE_LIQ_POOL_MSOL_LEG,
        ]
    }

    pub(crate) fn update_accounts(ty: PoolUpdateType) -> Option<Vec<Pubkey>> {
        match ty {
            PoolUpdateType::DepositSol => Some(vec![MARINADE_STATE, MARINADE_LIQ_POOL_MSOL_LEG]),
            PoolUpdateType::DepositStake => Some(Self::init_accounts().to_vec()),
            PoolUpdateType::WithdrawSol | PoolUpdateType::WithdrawStake => None,
        }
    }

    pub(crate) fn refresh(&mut self, cache: &AccountCache) -> Result<(), RouterError> {
        let state: MarinadeState =
            anchor_deserialize(cache.get(&MARINADE_STATE)?, &STATE_DISCM, "marinade state")?;
        let validator_records = decode_validator_records(
            cache.get(&MARINADE_VALIDATOR_LIST)?,
            &state.validator_system.validator_list,
        )?;
        let msol_leg = TokenAccountView::decode(cache.get(&MARINADE_LIQ_POOL_MSOL_LEG)?)?;
        self.state = Some(MarinadePool {
            state,
            validator_records,
            msol_leg_balance: msol_leg.amount,
        });
        Ok(())
    }

    /// Suffix of a SOL deposit.
    pub fn deposit_sol_suffix(pool: &MarinadePool) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new_readonly(MARINADE_PROGRAM, false),
            AccountMeta::new(MARINADE_STATE, false),
            AccountMeta::new(MARINADE_LIQ_POOL_SOL_LEG, false),
            AccountMeta::new(Pubkey::new_from_array(pool.state.liq_pool.msol_leg), false),
            AccountMeta::new_readonly(MARINADE_LIQ_POOL_MSOL_LEG_AUTHORITY, false),
            AccountMeta::new(MARINADE_RESERVE, false),
            AccountMeta::new_readonly(MSOL_MINT_AUTHORITY, false),
        ]
    }

    /// Suffix of a stake deposit delegated to `vote`.
    ///
    /// # Errors
    /// `Build` if the duplication flag cannot be derived.
    pub fn deposit_stake_suffix(vote: &Pubkey) -> Result<Vec<AccountMeta>, RouterError> {
        let (duplication_flag, _bump) = find_marinade_duplication_flag_pda(vote)?;
        Ok(vec![
            AccountMeta::new_readonly(MARINADE_PROGRAM, false),
            AccountMeta::new(MARINADE_STATE, false),
            AccountMeta::new(MARINADE_VALIDATOR_LIST, false),
            AccountMeta::new(MARINADE_STAKE_LIST, false),
            AccountMeta::new(duplication_flag, false),
            AccountMeta::new_readonly(MSOL_MINT_AUTHORITY, false),
            AccountMeta::new_readonly(SYSVAR_CLOCK, false),
            AccountMeta::new_readonly(SYSVAR_RENT, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM, false),
            AccountMeta::new_readonly(STAKE_PROGRAM, false),
        ])
    }
}
