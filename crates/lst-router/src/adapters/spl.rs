//! SPL stake pool adapter.
//!
//! One adapter instance per pool. The pool account is borsh, the validator
//! list is a fixed-stride array read with bytemuck:
//!
//! ```text
//!   validator list = [account_type u8][max_validators u32][len u32][entry; len]
//!   entry          = 73 bytes, see ValidatorStakeInfo
//! ```

use core::num::NonZeroU32;

use borsh::{BorshDeserialize, BorshSerialize};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use solana_program::{instruction::AccountMeta, pubkey::Pubkey};

use super::{
    borsh_deserialize, DepositSolQuoter, DepositStakeQuoter, WithdrawSolQuoter,
    WithdrawStakeQuoter,
};
use crate::{
    accounts::decode_clock_epoch,
    cache::{AccountCache, AccountRecord},
    consts::{
        SPL_MIN_ACTIVE_STAKE, STAKE_ACCOUNT_RENT_EXEMPT_LAMPORTS, STAKE_PROGRAM, SYSTEM_PROGRAM,
        SYSVAR_CLOCK, SYSVAR_STAKE_HISTORY, TOKEN_PROGRAM,
    },
    error::{RouterError, SplPoolError},
    pda::{find_spl_deposit_auth_pda, find_spl_validator_stake_pda, find_spl_withdraw_auth_pda},
    quote::{ActiveStakeParams, DepositStakeQuote, StakeAccountLamports, TokenQuote, WithdrawStakeQuote},
    update::PoolUpdateType,
};

const ACCOUNT_TYPE_STAKE_POOL: u8 = 1;
const ACCOUNT_TYPE_VALIDATOR_LIST: u8 = 2;
const VALIDATOR_LIST_HEADER_LEN: usize = 9;

// ===== Layouts =====

/// `numerator / denominator` fee.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Fee {
    /// Denominator
    pub denominator: u64,
    /// Numerator
    pub numerator: u64,
}

impl Fee {
    /// Fee on `amt`, rounded up. A zero denominator means no fee.
    pub fn apply(&self, amt: u64) -> Option<u64> {
        if self.denominator == 0 {
            return Some(0);
        }
        let fee = (amt as u128)
            .checked_mul(self.numerator as u128)?
            .div_ceil(self.denominator as u128);
        u64::try_from(fee).ok()
    }
}

/// A fee change scheduled for a later epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum FutureEpochFee {
    /// No change
    #[default]
    None,
    /// Takes effect next epoch
    One(Fee),
    /// Takes effect in two epochs
    Two(Fee),
}

/// Stake lockup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Lockup {
    /// Unix timestamp the lockup ends at
    pub unix_timestamp: i64,
    /// Epoch the lockup ends at
    pub epoch: u64,
    /// Custodian allowed to bypass the lockup
    pub custodian: [u8; 32],
}

/// Stake pool account.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StakePool {
    pub account_type: u8,
    pub manager: [u8; 32],
    pub staker: [u8; 32],
    pub stake_deposit_authority: [u8; 32],
    pub stake_withdraw_bump_seed: u8,
    pub validator_list: [u8; 32],
    pub reserve_stake: [u8; 32],
    pub pool_mint: [u8; 32],
    pub manager_fee_account: [u8; 32],
    pub token_program_id: [u8; 32],
    pub total_lamports: u64,
    pub pool_token_supply: u64,
    pub last_update_epoch: u64,
    pub lockup: Lockup,
    pub epoch_fee: Fee,
    pub next_epoch_fee: FutureEpochFee,
    pub preferred_deposit_validator_vote_address: Option<[u8; 32]>,
    pub preferred_withdraw_validator_vote_address: Option<[u8; 32]>,
    pub stake_deposit_fee: Fee,
    pub stake_withdrawal_fee: Fee,
    pub next_stake_withdrawal_fee: FutureEpochFee,
    pub stake_referral_fee: u8,
    pub sol_deposit_authority: Option<[u8; 32]>,
    pub sol_deposit_fee: Fee,
    pub sol_referral_fee: u8,
    pub sol_withdraw_authority: Option<[u8; 32]>,
    pub sol_withdrawal_fee: Fee,
    pub next_sol_withdrawal_fee: FutureEpochFee,
    pub last_epoch_pool_token_supply: u64,
    pub last_epoch_total_lamports: u64,
}

impl StakePool {
    fn pool_tokens_for_deposit(&self, lamports: u64) -> Option<u64> {
        if self.total_lamports == 0 || self.pool_token_supply == 0 {
            return Some(lamports);
        }
        let tokens = (lamports as u128).checked_mul(self.pool_token_supply as u128)?
            / self.total_lamports as u128;
        u64::try_from(tokens).ok()
    }

    fn lamports_for_withdraw(&self, pool_tokens: u64) -> Option<u64> {
        let numerator = (pool_tokens as u128).checked_mul(self.total_lamports as u128)?;
        let denominator = self.pool_token_supply as u128;
        if numerator < denominator || denominator == 0 {
            return Some(0);
        }
        u64::try_from(numerator / denominator).ok()
    }

    fn check_updated(&self, curr_epoch: u64) -> Result<(), SplPoolError> {
        if self.last_update_epoch < curr_epoch {
            return Err(SplPoolError::StakeListAndPoolOutOfDate);
        }
        Ok(())
    }

    fn preferred_deposit_validator(&self) -> Option<Pubkey> {
        self.preferred_deposit_validator_vote_address
            .map(Pubkey::new_from_array)
    }

    fn preferred_withdraw_validator(&self) -> Option<Pubkey> {
        self.preferred_withdraw_validator_vote_address
            .map(Pubkey::new_from_array)
    }
}

/// Validator list entry.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct ValidatorStakeInfo {
    active_stake_lamports: [u8; 8],
    transient_stake_lamports: [u8; 8],
    last_update_epoch: [u8; 8],
    transient_seed_suffix: [u8; 8],
    unused: [u8; 4],
    validator_seed_suffix: [u8; 4],
    status: u8,
    vote_account_address: [u8; 32],
}

/// Size of a [`ValidatorStakeInfo`].
pub const VALIDATOR_STAKE_INFO_LEN: usize = core::mem::size_of::<ValidatorStakeInfo>();

impl ValidatorStakeInfo {
    /// Lamports in the validator stake account.
    pub fn active_stake_lamports(&self) -> u64 {
        u64::from_le_bytes(self.active_stake_lamports)
    }

    /// Lamports in transient stake accounts.
    pub fn transient_stake_lamports(&self) -> u64 {
        u64::from_le_bytes(self.transient_stake_lamports)
    }

    /// Seed suffix of the validator stake account, `None` for no suffix.
    pub fn validator_seed_suffix(&self) -> Option<NonZeroU32> {
        NonZeroU32::new(u32::from_le_bytes(self.validator_seed_suffix))
    }

    /// Vote account.
    pub fn vote(&self) -> Pubkey {
        Pubkey::new_from_array(self.vote_account_address)
    }

    /// Whether no more stake can be withdrawn from this validator.
    pub fn is_exhausted(&self) -> bool {
        self.active_stake_lamports() <= SPL_MIN_ACTIVE_STAKE
    }
}

fn decode_validator_list(record: &AccountRecord) -> Result<Vec<ValidatorStakeInfo>, RouterError> {
    let invalid = || RouterError::decode(&record.pubkey, "validator list");
    let header = record
        .data
        .get(..VALIDATOR_LIST_HEADER_LEN)
        .ok_or_else(invalid)?;
    if header[0] != ACCOUNT_TYPE_VALIDATOR_LIST {
        return Err(invalid());
    }
    let len = u32::from_le_bytes([header[5], header[6], header[7], header[8]]) as usize;
    let end = len
        .checked_mul(VALIDATOR_STAKE_INFO_LEN)
        .and_then(|n| n.checked_add(VALIDATOR_LIST_HEADER_LEN))
        .ok_or_else(invalid)?;
    let entries = record
        .data
        .get(VALIDATOR_LIST_HEADER_LEN..end)
        .ok_or_else(invalid)?;
    Ok(entries
        .chunks_exact(VALIDATOR_STAKE_INFO_LEN)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}

// ===== Binding =====

/// Addresses identifying an SPL stake pool instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplPoolInit {
    /// Stake pool account
    pub stake_pool: Pubkey,
    /// Stake pool program the pool is deployed under
    pub program: Pubkey,
    /// Validator list account
    pub validator_list: Pubkey,
    /// Reserve stake account
    pub reserve_stake: Pubkey,
}

impl SplPoolInit {
    pub(crate) fn init_accounts(&self) -> [Pubkey; 4] {
        [
            SYSVAR_CLOCK,
            self.stake_pool,
            self.validator_list,
            self.reserve_stake,
        ]
    }
}

/// Decoded state of an SPL stake pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplPool {
    /// Derived default deposit authority
    pub deposit_auth: Pubkey,
    /// Stake pool account
    pub stake_pool: StakePool,
    /// Validator list entries
    pub validator_list: Vec<ValidatorStakeInfo>,
    /// Lamports of the reserve stake account
    pub reserve_stake_lamports: u64,
    /// Epoch of the clock the state was decoded with
    pub curr_epoch: u64,
}

impl SplPool {
    fn validator(&self, vote: &Pubkey) -> Option<&ValidatorStakeInfo> {
        self.validator_list.iter().find(|v| v.vote() == *vote)
    }

    fn withdraw_validator(&self, vote: Option<&Pubkey>) -> Result<&ValidatorStakeInfo, SplPoolError> {
        let preferred = self
            .stake_pool
            .preferred_withdraw_validator()
            .and_then(|p| self.validator(&p))
            .filter(|v| !v.is_exhausted());
        match (vote, preferred) {
            (Some(vote), Some(p)) if p.vote() != *vote => {
                Err(SplPoolError::IncorrectWithdrawVoteAddress)
            }
            (Some(vote), _) => self.validator(vote).ok_or(SplPoolError::ValidatorNotFound),
            (None, Some(p)) => Ok(p),
            (None, None) => self
                .validator_list
                .iter()
                .max_by_key(|v| v.active_stake_lamports())
                .ok_or(SplPoolError::ValidatorNotFound),
        }
    }

    /// Validators a stake withdrawal may come from: the preferred withdraw
    /// validator alone, or every validator if there is none or it is exhausted.
    pub fn withdraw_candidates(&self) -> Vec<Pubkey> {
        let preferred = self.stake_pool.preferred_withdraw_validator();
        if let Some(p) = preferred.and_then(|p| self.validator(&p)) {
            if !p.is_exhausted() {
                return vec![p.vote()];
            }
        }
        self.validator_list
            .iter()
            .map(ValidatorStakeInfo::vote)
            .filter(|v| Some(*v) != preferred)
            .collect()
    }
}

/// Referral part of `fee` at `percent`. `None` above 100%.
fn referral_share(fee: u64, percent: u8) -> Option<u64> {
    if percent > 100 {
        return None;
    }
    let share = u128::from(fee).checked_mul(u128::from(percent))? / 100;
    u64::try_from(share).ok()
}

impl DepositSolQuoter for SplPool {
    type Error = SplPoolError;

    fn quote_deposit_sol(&self, lamports: u64) -> Result<TokenQuote, SplPoolError> {
        self.stake_pool.check_updated(self.curr_epoch)?;
        if self.stake_pool.sol_deposit_authority.is_some() {
            return Err(SplPoolError::InvalidSolDepositAuthority);
        }
        let pool = &self.stake_pool;
        let new_pool_tokens = pool
            .pool_tokens_for_deposit(lamports)
            .ok_or(SplPoolError::CalculationFailure)?;
        let fee = pool
            .sol_deposit_fee
            .apply(new_pool_tokens)
            .ok_or(SplPoolError::CalculationFailure)?;
        let out = new_pool_tokens
            .checked_sub(fee)
            .ok_or(SplPoolError::CalculationFailure)?;
        if out == 0 {
            return Err(SplPoolError::DepositTooSmall);
        }
        Ok(TokenQuote {
            inp: lamports,
            out,
            fee,
        })
    }
}

impl WithdrawSolQuoter for SplPool {
    type Error = SplPoolError;

    fn quote_withdraw_sol(&self, tokens: u64) -> Result<TokenQuote, SplPoolError> {
        self.stake_pool.check_updated(self.curr_epoch)?;
        if self.stake_pool.sol_withdraw_authority.is_some() {
            return Err(SplPoolError::InvalidSolWithdrawAuthority);
        }
        let pool = &self.stake_pool;
        let fee_tokens = pool
            .sol_withdrawal_fee
            .apply(tokens)
            .ok_or(SplPoolError::CalculationFailure)?;
        let burnt = tokens
            .checked_sub(fee_tokens)
            .ok_or(SplPoolError::CalculationFailure)?;
        let out = pool
            .lamports_for_withdraw(burnt)
            .ok_or(SplPoolError::CalculationFailure)?;
        if out == 0 {
            return Err(SplPoolError::WithdrawalTooSmall);
        }
        // reserve must stay rent-exempt after paying out
        let required = (out as u128) + STAKE_ACCOUNT_RENT_EXEMPT_LAMPORTS as u128;
        if required > self.reserve_stake_lamports as u128 {
            return Err(SplPoolError::SolWithdrawalTooLarge);
        }
        // fee in lamports, consistent with `out`
        let fee = pool
            .lamports_for_withdraw(fee_tokens)
            .ok_or(SplPoolError::CalculationFailure)?;
        Ok(TokenQuote {
            inp: tokens,
            out,
            fee,
        })
    }
}

impl DepositStakeQuoter for SplPool {
    type Error = SplPoolError;

    fn quote_deposit_stake(
        &self,
        stake: ActiveStakeParams,
    ) -> Result<DepositStakeQuote, SplPoolError> {
        let pool = &self.stake_pool;
        pool.check_updated(self.curr_epoch)?;
        if Pubkey::new_from_array(pool.stake_deposit_authority) != self.deposit_auth {
            return Err(SplPoolError::InvalidStakeDepositAuthority);
        }
        if self.validator(&stake.vote).is_none() {
            return Err(SplPoolError::ValidatorNotFound);
        }
        if pool
            .preferred_deposit_validator()
            .is_some_and(|p| p != stake.vote)
        {
            return Err(SplPoolError::IncorrectDepositVoteAddress);
        }
        let StakeAccountLamports { staked, .. } = stake.lamports;
        let total = stake
            .lamports
            .total()
            .ok_or(SplPoolError::CalculationFailure)?;
        let new_pool_tokens = pool
            .pool_tokens_for_deposit(total)
            .ok_or(SplPoolError::CalculationFailure)?;
        let from_stake = pool
            .pool_tokens_for_deposit(staked)
            .ok_or(SplPoolError::CalculationFailure)?;
        let from_sol = new_pool_tokens
            .checked_sub(from_stake)
            .ok_or(SplPoolError::CalculationFailure)?;
        let stake_fee = pool
            .stake_deposit_fee
            .apply(from_stake)
            .ok_or(SplPoolError::CalculationFailure)?;
        let sol_fee = pool
            .sol_deposit_fee
            .apply(from_sol)
            .ok_or(SplPoolError::CalculationFailure)?;
        let total_fee = stake_fee
            .checked_add(sol_fee)
            .ok_or(SplPoolError::CalculationFailure)?;
        let user = new_pool_tokens
            .checked_sub(total_fee)
            .ok_or(SplPoolError::CalculationFailure)?;
        if user == 0 {
            return Err(SplPoolError::DepositTooSmall);
        }
        let referral = referral_share(total_fee, pool.stake_referral_fee)
            .ok_or(SplPoolError::CalculationFailure)?;
        Ok(DepositStakeQuote {
            inp: stake,
            // referral fee is paid back to the router's own token account
            out: user
                .checked_add(referral)
                .ok_or(SplPoolError::CalculationFailure)?,
            fee: total_fee
                .checked_sub(referral)
                .ok_or(SplPoolError::CalculationFailure)?,
        })
    }
}

impl WithdrawStakeQuoter for SplPool {
    type Error = SplPoolError;

    fn quote_withdraw_stake(
        &self,
        tokens: u64,
        vote: Option<&Pubkey>,
    ) -> Result<WithdrawStakeQuote, SplPoolError> {
        let pool = &self.stake_pool;
        pool.check_updated(self.curr_epoch)?;
        let validator = self.withdraw_validator(vote)?;
        let fee = pool
            .stake_withdrawal_fee
            .apply(tokens)
            .ok_or(SplPoolError::CalculationFailure)?;
        let burnt = tokens
            .checked_sub(fee)
            .ok_or(SplPoolError::CalculationFailure)?;
        let lamports = pool
            .lamports_for_withdraw(burnt)
            .ok_or(SplPoolError::CalculationFailure)?;
        if lamports == 0 {
            return Err(SplPoolError::WithdrawalTooSmall);
        }
        if lamports > validator.active_stake_lamports() {
            return Err(SplPoolError::StakeLamportsNotEqualToMinimum);
        }
        Ok(WithdrawStakeQuote {
            inp: tokens,
            out: ActiveStakeParams {
                vote: validator.vote(),
                lamports: StakeAccountLamports {
                    staked: lamports,
                    unstaked: 0,
                },
            },
            fee,
        })
    }
}

// ===== Adapter =====

/// SPL stake pool adapter.
#[derive(Clone, Debug, PartialEq)]
pub struct SplAdapter {
    /// Pool addresses
    pub init: SplPoolInit,
    /// Withdraw authority PDA
    pub withdraw_auth: Pubkey,
    /// Default deposit authority PDA
    pub deposit_auth: Pubkey,
    /// Decoded state, `None` until the init accounts are fetched
    pub state: Option<SplPool>,
}

impl SplAdapter {
    /// Create an adapter for the pool at `init`.
    ///
    /// # Errors
    /// `Build` if the pool authorities cannot be derived.
    pub fn new(init: SplPoolInit) -> Result<Self, RouterError> {
        let (withdraw_auth, _bump) = find_spl_withdraw_auth_pda(&init.program, &init.stake_pool)?;
        let (deposit_auth, _bump) = find_spl_deposit_auth_pda(&init.program, &init.stake_pool)?;
        Ok(Self {
            init,
            withdraw_auth,
            deposit_auth,
            state: None,
        })
    }

    pub(crate) fn init_accounts(&self) -> [Pubkey; 4] {
        self.init.init_accounts()
    }

    pub(crate) fn update_accounts(&self, ty: PoolUpdateType) -> Vec<Pubkey> {
        match ty {
            PoolUpdateType::DepositSol => vec![SYSVAR_CLOCK, self.init.stake_pool],
            PoolUpdateType::WithdrawSol => {
                vec![SYSVAR_CLOCK, self.init.stake_pool, self.init.reserve_stake]
            }
            PoolUpdateType::DepositStake | PoolUpdateType::WithdrawStake => {
                vec![SYSVAR_CLOCK, self.init.stake_pool, self.init.validator_list]
            }
        }
    }

    pub(crate) fn refresh(&mut self, cache: &AccountCache) -> Result<(), RouterError> {
        let pool_record = cache.get(&self.init.stake_pool)?;
        let stake_pool: StakePool = borsh_deserialize(pool_record, "stake pool")?;
        if stake_pool.account_type != ACCOUNT_TYPE_STAKE_POOL {
            return Err(RouterError::decode(&pool_record.pubkey, "stake pool"));
        }
        let validator_list = decode_validator_list(cache.get(&self.init.validator_list)?)?;
        log::trace!(
            "stake pool {} has {} validators",
            self.init.stake_pool,
            validator_list.len()
        );
        self.state = Some(SplPool {
            deposit_auth: self.deposit_auth,
            stake_pool,
            validator_list,
            reserve_stake_lamports: cache.get(&self.init.reserve_stake)?.lamports,
            curr_epoch: decode_clock_epoch(cache.get(&SYSVAR_CLOCK)?)?,
        });
        Ok(())
    }

    fn token_program(state: &SplPool) -> Pubkey {
        match state.stake_pool.token_program_id {
            id if id == [0u8; 32] => TOKEN_PROGRAM,
            id => Pubkey::new_from_array(id),
        }
    }

    /// Suffix of a SOL deposit.
    pub fn deposit_sol_suffix(&self, state: &SplPool) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new_readonly(self.init.program, false),
            AccountMeta::new(self.init.stake_pool, false),
            AccountMeta::new_readonly(self.withdraw_auth, false),
            AccountMeta::new(self.init.reserve_stake, false),
            AccountMeta::new(
                Pubkey::new_from_array(state.stake_pool.manager_fee_account),
                false,
            ),
        ]
    }

    /// Suffix of a SOL withdrawal.
    pub fn withdraw_sol_suffix(&self, state: &SplPool) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new_readonly(self.init.program, false),
            AccountMeta::new(self.init.stake_pool, false),
            AccountMeta::new_readonly(self.withdraw_auth, false),
            AccountMeta::new(self.init.reserve_stake, false),
            AccountMeta::new(
                Pubkey::new_from_array(state.stake_pool.manager_fee_account),
                false,
            ),
            AccountMeta::new_readonly(SYSVAR_CLOCK, false),
            AccountMeta::new_readonly(SYSVAR_STAKE_HISTORY, false),
            AccountMeta::new_readonly(STAKE_PROGRAM, false),
            AccountMeta::new_readonly(Self::token_program(state), false),
        ]
    }

    /// Suffix of a stake deposit to `vote`'s validator stake account.
    ///
    /// # Errors
    /// `Pool` if `vote` is not on the validator list, `Build` if the validator
    /// stake account cannot be derived.
    pub fn deposit_stake_suffix(
        &self,
        state: &SplPool,
        vote: &Pubkey,
    ) -> Result<Vec<AccountMeta>, RouterError> {
        let validator_stake = self.validator_stake(state, vote)?;
        Ok(vec![
            AccountMeta::new_readonly(self.init.program, false),
            AccountMeta::new(self.init.stake_pool, false),
            AccountMeta::new(self.init.validator_list, false),
            AccountMeta::new_readonly(self.deposit_auth, false),
            AccountMeta::new_readonly(self.withdraw_auth, false),
            AccountMeta::new(validator_stake, false),
            AccountMeta::new(self.init.reserve_stake, false),
            AccountMeta::new(
                Pubkey::new_from_array(state.stake_pool.manager_fee_account),
                false,
            ),
            AccountMeta::new_readonly(SYSVAR_CLOCK, false),
            AccountMeta::new_readonly(SYSVAR_STAKE_HISTORY, false),
            AccountMeta::new_readonly(Self::token_program(state), false),
            AccountMeta::new_readonly(STAKE_PROGRAM, false),
        ])
    }

    /// Suffix of a stake withdrawal split off `vote`'s validator stake account.
    ///
    /// # Errors
    /// `Pool` if `vote` is not on the validator list, `Build` if the validator
    /// stake account cannot be derived.
    pub fn withdraw_stake_suffix(
        &self,
        state: &SplPool,
        vote: &Pubkey,
    ) -> Result<Vec<AccountMeta>, RouterError> {
        let stake_to_split = self.validator_stake(state, vote)?;
        Ok(vec![
            AccountMeta::new_readonly(self.init.program, false),
            AccountMeta::new(self.init.stake_pool, false),
            AccountMeta::new(self.init.validator_list, false),
            AccountMeta::new_readonly(self.withdraw_auth, false),
            AccountMeta::new(stake_to_split, false),
            AccountMeta::new(
                Pubkey::new_from_array(state.stake_pool.manager_fee_account),
                false,
            ),
            AccountMeta::new_readonly(SYSVAR_CLOCK, false),
            AccountMeta::new_readonly(Self::token_program(state), false),
            AccountMeta::new_readonly(STAKE_PROGRAM, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM, false),
        ])
    }

    fn validator_stake(&self, state: &SplPool, vote: &Pubkey) -> Result<Pubkey, RouterError> {
        let info = state
            .validator(vote)
            .ok_or(SplPoolError::ValidatorNotFound)?;
        let (pda, _bump) = find_spl_validator_stake_pda(
            &self.init.program,
            vote,
            &self.init.stake_pool,
            info.validator_seed_suffix(),
        )?;
        Ok(pda)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SPL_STAKE_POOL_PROGRAM;

    fn validator(vote: Pubkey, active: u64) -> ValidatorStakeInfo {
        let mut v = ValidatorStakeInfo::zeroed();
        v.active_stake_lamports = active.to_le_bytes();
        v.vote_account_address = vote.to_bytes();
        v
    }

    fn pool(deposit_auth: Pubkey, validators: Vec<ValidatorStakeInfo>) -> SplPool {
        SplPool {
            deposit_auth,
            stake_pool: StakePool {
                account_type: ACCOUNT_TYPE_STAKE_POOL,
                stake_deposit_authority: deposit_auth.to_bytes(),
                total_lamports: 1_000_000_000_000,
                pool_token_supply: 1_000_000_000_000,
                last_update_epoch: 100,
                sol_deposit_fee: Fee {
                    denominator: 1000,
                    numerator: 3,
                },
                stake_deposit_fee: Fee {
                    denominator: 1000,
                    numerator: 1,
                },
                stake_withdrawal_fee: Fee {
                    denominator: 1000,
                    numerator: 1,
                },
                ..Default::default()
            },
            validator_list: validators,
            reserve_stake_lamports: 10_000_000_000,
            curr_epoch: 100,
        }
    }

    #[test]
    fn test_validator_stake_info_len() {
        assert_eq!(VALIDATOR_STAKE_INFO_LEN, 73);
    }

    #[test]
    fn test_fee_apply_rounds_up() {
        let fee = Fee {
            denominator: 1000,
            numerator: 3,
        };
        assert_eq!(fee.apply(1_000_000), Some(3_000));
        assert_eq!(fee.apply(1), Some(1));
        assert_eq!(Fee::default().apply(1_000), Some(0));
    }

    #[test]
    fn test_deposit_sol_one_to_one() {
        let q = pool(Pubkey::new_unique(), vec![])
            .quote_deposit_sol(1_000_000)
            .unwrap();
        assert_eq!(q.out, 997_000);
        assert_eq!(q.fee, 3_000);
        assert_eq!(q.inp, 1_000_000);
    }

    #[test]
    fn test_out_of_date_pool_rejected() {
        let mut p = pool(Pubkey::new_unique(), vec![]);
        p.curr_epoch = 101;
        assert_eq!(
            p.quote_deposit_sol(1_000_000),
            Err(SplPoolError::StakeListAndPoolOutOfDate)
        );
    }

    #[test]
    fn test_withdraw_sol_too_large() {
        let p = pool(Pubkey::new_unique(), vec![]);
        assert_eq!(
            p.quote_withdraw_sol(1_000_000_000_000_000_000),
            Err(SplPoolError::SolWithdrawalTooLarge)
        );
        let q = p.quote_withdraw_sol(1_000_000_000).unwrap();
        assert_eq!(q.out, 1_000_000_000);
        assert_eq!(q.fee, 0);
    }

    #[test]
    fn test_deposit_stake_splits_stake_and_sol_fees() {
        let auth = Pubkey::new_unique();
        let vote = Pubkey::new_unique();
        let p = pool(auth, vec![validator(vote, 5_000_000_000)]);
        let q = p
            .quote_deposit_stake(ActiveStakeParams {
                vote,
                lamports: StakeAccountLamports {
                    staked: 1_000_000_000,
                    unstaked: 2_282_880,
                },
            })
            .unwrap();
        // 0.1% of stake tokens + 0.3% of sol tokens, each rounded up
        assert_eq!(q.fee, 1_000_000 + 6_849);
        assert_eq!(q.out, 1_002_282_880 - 1_006_849);
    }

    #[test]
    fn test_deposit_stake_referral_fee() {
        let auth = Pubkey::new_unique();
        let vote = Pubkey::new_unique();
        let mut p = pool(auth, vec![validator(vote, 5_000_000_000)]);
        let stake = ActiveStakeParams {
            vote,
            lamports: StakeAccountLamports {
                staked: 1_000_000_000,
                unstaked: 2_282_880,
            },
        };
        p.stake_pool.stake_referral_fee = 50;
        let q = p.quote_deposit_stake(stake).unwrap();
        assert_eq!(q.fee, 1_006_849 - 503_424);
        assert_eq!(q.out + q.fee, 1_002_282_880);

        p.stake_pool.stake_referral_fee = 101;
        assert_eq!(
            p.quote_deposit_stake(stake),
            Err(SplPoolError::CalculationFailure)
        );
        p.stake_pool.stake_referral_fee = u8::MAX;
        assert_eq!(
            p.quote_deposit_stake(stake),
            Err(SplPoolError::CalculationFailure)
        );
    }

    #[test]
    fn test_deposit_stake_rejects_unknown_validator() {
        let auth = Pubkey::new_unique();
        let p = pool(auth, vec![validator(Pubkey::new_unique(), 5_000_000_000)]);
        let err = p
            .quote_deposit_stake(ActiveStakeParams {
                vote: Pubkey::new_unique(),
                lamports: StakeAccountLamports {
                    staked: 1_000_000_000,
                    unstaked: 0,
                },
            })
            .unwrap_err();
        assert_eq!(err, SplPoolError::ValidatorNotFound);
    }

    #[test]
    fn test_withdraw_stake_picks_largest_validator() {
        let small = Pubkey::new_unique();
        let large = Pubkey::new_unique();
        let p = pool(
            Pubkey::new_unique(),
            vec![validator(small, 2_000_000_000), validator(large, 9_000_000_000)],
        );
        let q = p.quote_withdraw_stake(1_000_000_000, None).unwrap();
        assert_eq!(q.out.vote, large);
        assert_eq!(q.fee, 1_000_000);
        assert_eq!(q.out.lamports.staked, 999_000_000);
        assert_eq!(q.out.lamports.unstaked, 0);

        let err = p.quote_withdraw_stake(3_000_000_000, Some(&small)).unwrap_err();
        assert_eq!(err, SplPoolError::StakeLamportsNotEqualToMinimum);
    }

    #[test]
    fn test_withdraw_candidates_respect_preferred() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let mut p = pool(
            Pubkey::new_unique(),
            vec![validator(a, 5_000_000_000), validator(b, SPL_MIN_ACTIVE_STAKE)],
        );
        assert_eq!(p.withdraw_candidates(), vec![a, b]);

        p.stake_pool.preferred_withdraw_validator_vote_address = Some(a.to_bytes());
        assert_eq!(p.withdraw_candidates(), vec![a]);
        assert_eq!(
            p.quote_withdraw_stake(1_000, Some(&b)),
            Err(SplPoolError::IncorrectWithdrawVoteAddress)
        );

        // exhausted preferred validator opens up the rest
        p.stake_pool.preferred_withdraw_validator_vote_address = Some(b.to_bytes());
        assert_eq!(p.withdraw_candidates(), vec![a]);
    }

    #[test]
    fn test_refresh_decodes_from_cache() {
        let init = SplPoolInit {
            stake_pool: Pubkey::new_unique(),
            program: SPL_STAKE_POOL_PROGRAM,
            validator_list: Pubkey::new_unique(),
            reserve_stake: Pubkey::new_unique(),
        };
        let mut adapter = SplAdapter::new(init).unwrap();
        let vote = Pubkey::new_unique();
        let expected = pool(adapter.deposit_auth, vec![validator(vote, 7)]);

        let mut list = vec![ACCOUNT_TYPE_VALIDATOR_LIST, 10, 0, 0, 0, 1, 0, 0, 0];
        list.extend_from_slice(bytemuck::bytes_of(&expected.validator_list[0]));
        let mut clock = vec![0u8; crate::accounts::CLOCK_LEN];
        clock[16..24].copy_from_slice(&100u64.to_le_bytes());

        let mut cache = AccountCache::new();
        cache.put_all([
            AccountRecord::new(
                init.stake_pool,
                borsh::to_vec(&expected.stake_pool).unwrap(),
                init.program,
                1,
            ),
            AccountRecord::new(init.validator_list, list, init.program, 1),
            AccountRecord::new(init.reserve_stake, vec![], STAKE_PROGRAM, 10_000_000_000),
            AccountRecord::new(SYSVAR_CLOCK, clock, Pubkey::default(), 1),
        ]);
        adapter.refresh(&cache).unwrap();
        assert_eq!(adapter.state, Some(expected));
    }
}
