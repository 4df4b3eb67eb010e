//! Lido (Solido) adapter. Only stake withdrawals are supported, and only from
//! the validator with the most effective stake.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{instruction::AccountMeta, pubkey::Pubkey};

use super::{borsh_deserialize, WithdrawStakeQuoter};
use crate::{
    accounts::decode_clock_epoch,
    cache::AccountCache,
    consts::{
        LIDO_MIN_WITHDRAW_LAMPORTS, LIDO_PROGRAM, LIDO_STAKE_AUTHORITY, LIDO_STATE,
        LIDO_VALIDATOR_LIST, STAKE_PROGRAM, SYSTEM_PROGRAM, SYSVAR_CLOCK, TOKEN_PROGRAM,
    },
    error::{LidoError, RouterError},
    pda::find_lido_validator_stake_pda,
    quote::{ActiveStakeParams, StakeAccountLamports, WithdrawStakeQuote},
    update::PoolUpdateType,
};

/// stSOL/SOL exchange rate, valid for the epoch it was computed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ExchangeRate {
    /// Epoch the rate was computed in
    pub computed_in_epoch: u64,
    /// stSOL supply at that time
    pub st_sol_supply: u64,
    /// SOL managed at that time
    pub sol_balance: u64,
}

impl ExchangeRate {
    fn lamports_for(&self, st_sol: u64) -> Result<u64, LidoError> {
        if self.st_sol_supply == 0 {
            return Err(LidoError::CalculationFailure);
        }
        let lamports = st_sol as u128 * self.sol_balance as u128 / self.st_sol_supply as u128;
        u64::try_from(lamports).map_err(|_| LidoError::CalculationFailure)
    }
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RewardDistribution {
    pub treasury_fee: u32,
    pub developer_fee: u32,
    pub st_sol_appreciation: u32,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct FeeRecipients {
    pub treasury_account: [u8; 32],
    pub developer_account: [u8; 32],
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct LamportsHistogram {
    pub counts: [u64; 12],
    pub total: u64,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct WithdrawMetric {
    pub total_st_sol_amount: u64,
    pub total_sol_amount: u64,
    pub count: u64,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Metrics {
    pub fee_treasury_sol_total: u64,
    pub fee_validation_sol_total: u64,
    pub fee_developer_sol_total: u64,
    pub st_sol_appreciation_sol_total: u64,
    pub fee_treasury_st_sol_total: u64,
    pub fee_validation_st_sol_total: u64,
    pub fee_developer_st_sol_total: u64,
    pub deposit_amount: LamportsHistogram,
    pub withdraw_amount: WithdrawMetric,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Criteria {
    pub max_commission: u8,
    pub min_block_production_rate: u64,
    pub min_vote_success_rate: u64,
    pub min_uptime: u64,
}

/// Solido state account.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct LidoState {
    pub lido_version: u8,
    pub account_type: u8,
    pub manager: [u8; 32],
    pub st_sol_mint: [u8; 32],
    pub exchange_rate: ExchangeRate,
    pub sol_reserve_account_bump_seed: u8,
    pub stake_authority_bump_seed: u8,
    pub mint_authority_bump_seed: u8,
    pub reward_distribution: RewardDistribution,
    pub fee_recipients: FeeRecipients,
    pub metrics: Metrics,
    pub validator_list: [u8; 32],
    pub validator_perf_list: [u8; 32],
    pub maintainer_list: [u8; 32],
    pub criteria: Criteria,
}

/// Range of stake account seeds in use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SeedRange {
    /// First seed in use
    pub begin: u64,
    /// One past the last seed in use
    pub end: u64,
}

/// Validator list entry.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct LidoValidator {
    pub vote_account_address: [u8; 32],
    pub stake_seeds: SeedRange,
    pub unstake_seeds: SeedRange,
    pub stake_accounts_balance: u64,
    pub unstake_accounts_balance: u64,
    pub effective_stake_balance: u64,
    pub active: bool,
}

impl LidoValidator {
    /// Vote account.
    pub fn vote(&self) -> Pubkey {
        Pubkey::new_from_array(self.vote_account_address)
    }
}

/// Validator list header.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ListHeader {
    pub account_type: u8,
    pub lido_version: u8,
    pub max_entries: u32,
}

/// Validator list account.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct LidoValidatorList {
    /// Header
    pub header: ListHeader,
    /// Entries
    pub entries: Vec<LidoValidator>,
}

/// Decoded Solido state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LidoPool {
    /// State account
    pub state: LidoState,
    /// Validators
    pub validators: Vec<LidoValidator>,
    /// Epoch of the clock the state was decoded with
    pub curr_epoch: u64,
}

impl LidoPool {
    /// The only validator stake can be withdrawn from.
    pub fn max_validator(&self) -> Option<&LidoValidator> {
        self.validators
            .iter()
            .max_by_key(|v| v.effective_stake_balance)
    }
}

impl WithdrawStakeQuoter for LidoPool {
    type Error = LidoError;

    fn quote_withdraw_stake(
        &self,
        tokens: u64,
        vote: Option<&Pubkey>,
    ) -> Result<WithdrawStakeQuote, LidoError> {
        let rate = &self.state.exchange_rate;
        if self.curr_epoch > rate.computed_in_epoch {
            return Err(LidoError::ExchangeRateNotUpdatedInThisEpoch);
        }
        let validator = self.max_validator().ok_or(LidoError::NoActiveValidators)?;
        if vote.is_some_and(|v| *v != validator.vote()) {
            return Err(LidoError::ValidatorWithMoreStakeExists);
        }
        let lamports = rate.lamports_for(tokens)?;
        let max_withdraw = (validator.effective_stake_balance / 10)
            .checked_add(LIDO_MIN_WITHDRAW_LAMPORTS)
            .ok_or(LidoError::CalculationFailure)?;
        if lamports > max_withdraw {
            return Err(LidoError::NotEnoughLiquidity);
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
            fee: 0,
        })
    }
}

/// Lido adapter. Solido is a singleton, so only its state varies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LidoAdapter {
    /// Decoded state, `None` until the init accounts are fetched
    pub state: Option<LidoPool>,
}

impl LidoAdapter {
    pub(crate) const fn init_accounts() -> [Pubkey; 3] {
        [SYSVAR_CLOCK, LIDO_STATE, LIDO_VALIDATOR_LIST]
    }

    pub(crate) fn update_accounts(ty: PoolUpdateType) -> Option<Vec<Pubkey>> {
        match ty {
            PoolUpdateType::WithdrawStake => Some(Self::init_accounts().to_vec()),
            _ => None,
        }
    }

    pub(crate) fn refresh(&mut self, cache: &AccountCache) -> Result<(), RouterError> {
        let state: LidoState = borsh_deserialize(cache.get(&LIDO_STATE)?, "lido state")?;
        let list: LidoValidatorList =
            borsh_deserialize(cache.get(&LIDO_VALIDATOR_LIST)?, "lido validator list")?;
        self.state = Some(LidoPool {
            state,
            validators: list.entries,
            curr_epoch: decode_clock_epoch(cache.get(&SYSVAR_CLOCK)?)?,
        });
        Ok(())
    }

    /// Suffix of a stake withdrawal from `vote`.
    ///
    /// # Errors
    /// `Pool` if `vote` is not a Solido validator, `Build` if its stake account
    /// cannot be derived.
    pub fn withdraw_stake_suffix(
        pool: &LidoPool,
        vote: &Pubkey,
    ) -> Result<Vec<AccountMeta>, RouterError> {
        let validator = pool
            .validators
            .iter()
            .find(|v| v.vote() == *vote)
            .ok_or(LidoError::ValidatorWithMoreStakeExists)?;
        let (stake_to_split, _bump) =
            find_lido_validator_stake_pda(vote, validator.stake_seeds.begin)?;
        Ok(vec![
            AccountMeta::new_readonly(LIDO_PROGRAM, false),
            AccountMeta::new(LIDO_STATE, false),
            AccountMeta::new_readonly(*vote, false),
            AccountMeta::new(stake_to_split, false),
            AccountMeta::new_readonly(LIDO_STAKE_AUTHORITY, false),
            AccountMeta::new(LIDO_VALIDATOR_LIST, false),
            AccountMeta::new_readonly(SYSVAR_CLOCK, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM, false),
            AccountMeta::new_readonly(STAKE_PROGRAM, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM, false),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::AccountRecord;

    fn validator(vote: Pubkey, effective: u64) -> LidoValidator {
        LidoValidator {
            vote_account_address: vote.to_bytes(),
            effective_stake_balance: effective,
            active: true,
            ..Default::default()
        }
    }

    fn pool(validators: Vec<LidoValidator>) -> LidoPool {
        LidoPool {
            state: LidoState {
                exchange_rate: ExchangeRate {
                    computed_in_epoch: 500,
                    st_sol_supply: 1_000_000_000_000,
                    sol_balance: 1_100_000_000_000,
                },
                ..Default::default()
            },
            validators,
            curr_epoch: 500,
        }
    }

    #[test]
    fn test_withdraw_from_largest_validator() {
        let small = Pubkey::new_unique();
        let large = Pubkey::new_unique();
        let p = pool(vec![
            validator(small, 1_000_000_000_000),
            validator(large, 5_000_000_000_000),
        ]);
        let q = p.quote_withdraw_stake(1_000_000_000, None).unwrap();
        assert_eq!(q.out.vote, large);
        assert_eq!(q.out.lamports.staked, 1_100_000_000);
        assert_eq!(q.fee, 0);
        assert_eq!(
            p.quote_withdraw_stake(1_000_000_000, Some(&small)),
            Err(LidoError::ValidatorWithMoreStakeExists)
        );
    }

    #[test]
    fn test_withdraw_cap() {
        let p = pool(vec![validator(Pubkey::new_unique(), 100_000_000_000)]);
        // max = 10 SOL + 10 SOL
        assert!(p.quote_withdraw_stake(18_000_000_000, None).is_ok());
        assert_eq!(
            p.quote_withdraw_stake(19_000_000_000, None),
            Err(LidoError::NotEnoughLiquidity)
        );
    }

    #[test]
    fn test_stale_rate_and_empty_list() {
        let mut p = pool(vec![]);
        assert_eq!(
            p.quote_withdraw_stake(1, None),
            Err(LidoError::NoActiveValidators)
        );
        p.curr_epoch = 501;
        assert_eq!(
            p.quote_withdraw_stake(1, None),
            Err(LidoError::ExchangeRateNotUpdatedInThisEpoch)
        );
    }

    #[test]
    fn test_validator_entry_len() {
        let v = borsh::to_vec(&LidoValidator::default()).unwrap();
        assert_eq!(v.len(), 89);
    }

    #[test]
    fn test_refresh_decodes_state_and_list() {
        let expected = pool(vec![validator(Pubkey::new_unique(), 7)]);
        let list = LidoValidatorList {
            header: ListHeader {
                account_type: 2,
                lido_version: 1,
                max_entries: 100,
            },
            entries: expected.validators.clone(),
        };
        let mut clock = vec![0u8; crate::accounts::CLOCK_LEN];
        clock[16..24].copy_from_slice(&500u64.to_le_bytes());
        let mut cache = AccountCache::new();
        cache.put_all([
            AccountRecord::new(
                LIDO_STATE,
                borsh::to_vec(&expected.state).unwrap(),
                LIDO_PROGRAM,
                1,
            ),
            AccountRecord::new(
                LIDO_VALIDATOR_LIST,
                borsh::to_vec(&list).unwrap(),
                LIDO_PROGRAM,
                1,
            ),
            AccountRecord::new(SYSVAR_CLOCK, clock, Pubkey::default(), 1),
        ]);
        let mut adapter = LidoAdapter::default();
        adapter.refresh(&cache).unwrap();
        assert_eq!(adapter.state, Some(expected));
    }
}
