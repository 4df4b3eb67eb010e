//! Instant-unstake SOL reserve.
//!
//! The reserve buys active stake accounts for SOL at a fee. It is both the
//! wSOL leg of stake deposits and the lender of last resort for the prefund
//! flash loan: the slumdog stake split off a withdrawn stake account is sold
//! to it to repay the loan.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{instruction::AccountMeta, pubkey::Pubkey};

use super::{account_discriminator, anchor_deserialize, DepositStakeQuoter};
use crate::{
    cache::AccountCache,
    consts::{
        PREFUND_FLASH_LOAN_LAMPORTS, RESERVE_FEE, RESERVE_POOL, RESERVE_POOL_SOL_RESERVES,
        RESERVE_PROTOCOL_FEE, RESERVE_PROTOCOL_FEE_VAULT, STAKE_PROGRAM, SYSTEM_PROGRAM,
        SYSVAR_CLOCK, TOKEN_PROGRAM, UNSTAKE_PROGRAM, ZERO_DATA_ACC_RENT_EXEMPT_LAMPORTS,
    },
    error::{ReserveError, RouterError},
    pda::find_reserve_stake_acc_record_pda,
    quote::{ActiveStakeParams, DepositStakeQuote},
    update::PoolUpdateType,
};

const POOL_DISCM: [u8; 8] = account_discriminator("Pool");
const FEE_DISCM: [u8; 8] = account_discriminator("Fee");
const PROTOCOL_FEE_DISCM: [u8; 8] = account_discriminator("ProtocolFee");

/// 1.0 in the fixed-point representation used for fee ratios.
const ONE: u128 = 1_000_000_000_000_000_000;

/// `num / denom`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Rational {
    /// Numerator
    pub num: u64,
    /// Denominator
    pub denom: u64,
}

impl Rational {
    fn to_fixed(self) -> Option<u128> {
        if self.denom == 0 {
            return None;
        }
        (self.num as u128)
            .checked_mul(ONE)
            .map(|n| n / self.denom as u128)
    }
}

/// Reserve pool account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ReservePool {
    /// Authority allowed to change fees
    pub fee_authority: [u8; 32],
    /// LP token mint
    pub lp_mint: [u8; 32],
    /// Lamports of stake bought and not yet reclaimed
    pub incoming_stake: u64,
}

/// Parameters of [`ReserveFeeEnum::LiquidityLinear`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct LiquidityLinearParams {
    /// Fee ratio with all liquidity remaining
    pub max_liq_remaining: Rational,
    /// Fee ratio with no liquidity remaining
    pub zero_liq_remaining: Rational,
}

/// Unstake fee curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum ReserveFeeEnum {
    /// Constant ratio
    Flat {
        /// Fee ratio
        ratio: Rational,
    },
    /// Ratio growing linearly as reserves are consumed
    LiquidityLinear {
        /// Curve endpoints
        params: LiquidityLinearParams,
    },
}

/// Reserve fee account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ReserveFee {
    /// Fee curve
    pub fee: ReserveFeeEnum,
}

/// Reserve protocol fee account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ReserveProtocolFee {
    /// Token account protocol fees are paid to. Instructions always pay the
    /// router's fixed vault.
    pub destination: [u8; 32],
    /// Authority allowed to change the protocol fee
    pub authority: [u8; 32],
    /// Share of the unstake fee taken by the protocol
    pub fee_ratio: Rational,
    /// Share of the protocol fee paid to referrers
    pub referrer_fee_ratio: Rational,
}

/// Decoded reserve state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReserveState {
    /// Pool account
    pub pool: ReservePool,
    /// Fee account
    pub fee: ReserveFee,
    /// Protocol fee account
    pub protocol_fee: ReserveProtocolFee,
    /// Lamports held by the SOL reserves account
    pub sol_reserves: u64,
}

impl ReserveState {
    /// Decode from the reserve's four init accounts.
    ///
    /// # Errors
    /// `NotFound` if an account is missing, `Decode` on malformed data.
    pub fn decode(cache: &AccountCache) -> Result<Self, RouterError> {
        Ok(Self {
            pool: anchor_deserialize(cache.get(&RESERVE_POOL)?, &POOL_DISCM, "reserve pool")?,
            fee: anchor_deserialize(cache.get(&RESERVE_FEE)?, &FEE_DISCM, "reserve fee")?,
            protocol_fee: anchor_deserialize(
                cache.get(&RESERVE_PROTOCOL_FEE)?,
                &PROTOCOL_FEE_DISCM,
                "reserve protocol fee",
            )?,
            sol_reserves: cache.get(&RESERVE_POOL_SOL_RESERVES)?.lamports,
        })
    }

    /// Unstake fee on `lamports` of stake.
    ///
    /// # Errors
    /// `InternalError` on a zero denominator or overflow.
    pub fn fee_lamports(&self, lamports: u64) -> Result<u64, ReserveError> {
        let l = lamports as u128;
        let fee = match self.fee.fee {
            ReserveFeeEnum::Flat { ratio } => {
                if ratio.denom == 0 {
                    return Err(ReserveError::InternalError);
                }
                (l * ratio.num as u128).div_ceil(ratio.denom as u128)
            }
            ReserveFeeEnum::LiquidityLinear { params } => {
                let max = params
                    .max_liq_remaining
                    .to_fixed()
                    .ok_or(ReserveError::InternalError)?;
                let zero = params
                    .zero_liq_remaining
                    .to_fixed()
                    .ok_or(ReserveError::InternalError)?;
                let owned = (self.pool.incoming_stake as u128) + self.sol_reserves as u128;
                if owned == 0 {
                    return Err(ReserveError::InternalError);
                }
                let consumed = self.pool.incoming_stake as u128 + l;
                let ratio = zero
                    .saturating_sub(max)
                    .checked_mul(consumed)
                    .ok_or(ReserveError::InternalError)?
                    / owned
                    + max;
                let ratio = ratio.min(zero.max(max)).min(ONE);
                (l * ratio).div_ceil(ONE)
            }
        };
        u64::try_from(fee).map_err(|_| ReserveError::InternalError)
    }

    /// Lamports paid out for `lamports` of stake, ignoring available liquidity.
    fn out_lamports(&self, lamports: u64) -> Result<u64, ReserveError> {
        let fee = self.fee_lamports(lamports)?;
        lamports.checked_sub(fee).ok_or(ReserveError::InternalError)
    }

    /// Smallest stake amount that unstakes to at least `rem` lamports.
    /// Available liquidity is not considered.
    pub fn reverse_from_rem(&self, rem: u64) -> Option<u64> {
        if rem == 0 {
            return Some(0);
        }
        let reaches = |l: u64| self.out_lamports(l).is_ok_and(|out| out >= rem);
        let mut hi = rem;
        while !reaches(hi) {
            hi = hi.checked_mul(2)?;
        }
        // out(l) <= l, so the answer is never below rem
        let mut lo = rem;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if reaches(mid) {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        Some(hi)
    }

    /// Whether the reserves can lend the flash loan and stay rent-exempt.
    pub fn has_enough_for_slumdog(&self) -> bool {
        self.sol_reserves >= PREFUND_FLASH_LOAN_LAMPORTS + ZERO_DATA_ACC_RENT_EXEMPT_LAMPORTS
    }

    /// Lamports the slumdog stake must hold to repay the flash loan.
    pub fn slumdog_target_lamports(&self) -> Option<u64> {
        self.reverse_from_rem(PREFUND_FLASH_LOAN_LAMPORTS)
    }

    /// The state after the flash loan is lent and the slumdog stake is
    /// sold back to the reserve.
    ///
    /// # Errors
    /// `NotEnoughLiquidity` if the reserves cannot lend the loan.
    pub fn after_prefund(&self) -> Result<Self, ReserveError> {
        let slumdog = self
            .slumdog_target_lamports()
            .ok_or(ReserveError::InternalError)?;
        let sol_reserves = self
            .sol_reserves
            .checked_sub(PREFUND_FLASH_LOAN_LAMPORTS)
            .ok_or(ReserveError::NotEnoughLiquidity)?;
        let incoming_stake = self
            .pool
            .incoming_stake
            .checked_add(slumdog)
            .ok_or(ReserveError::InternalError)?;
        Ok(Self {
            pool: ReservePool {
                incoming_stake,
                ..self.pool
            },
            sol_reserves,
            ..*self
        })
    }

    /// Accounts following the router prefix of a deposit of `stake_account`.
    ///
    /// # Errors
    /// `Build` if the stake account record PDA cannot be derived.
    pub fn deposit_stake_suffix(&self, stake_account: &Pubkey) -> Result<Vec<AccountMeta>, RouterError> {
        let (stake_acc_record, _bump) = find_reserve_stake_acc_record_pda(stake_account)?;
        Ok(vec![
            AccountMeta::new_readonly(UNSTAKE_PROGRAM, false),
            AccountMeta::new(RESERVE_POOL, false),
            AccountMeta::new(RESERVE_POOL_SOL_RESERVES, false),
            AccountMeta::new_readonly(RESERVE_FEE, false),
            AccountMeta::new(stake_acc_record, false),
            AccountMeta::new_readonly(RESERVE_PROTOCOL_FEE, false),
            AccountMeta::new(RESERVE_PROTOCOL_FEE_VAULT, false),
            AccountMeta::new_readonly(SYSVAR_CLOCK, false),
            AccountMeta::new_readonly(STAKE_PROGRAM, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM, false),
        ])
    }
}

impl DepositStakeQuoter for ReserveState {
    type Error = ReserveError;

    fn quote_deposit_stake(
        &self,
        stake: ActiveStakeParams,
    ) -> Result<DepositStakeQuote, ReserveError> {
        let lamports = stake
            .lamports
            .total()
            .ok_or(ReserveError::InternalError)?;
        let fee = self.fee_lamports(lamports)?;
        let out = lamports.checked_sub(fee).ok_or(ReserveError::InternalError)?;
        let required = out
            .checked_add(ZERO_DATA_ACC_RENT_EXEMPT_LAMPORTS)
            .ok_or(ReserveError::InternalError)?;
        if required > self.sol_reserves {
            return Err(ReserveError::NotEnoughLiquidity);
        }
        Ok(DepositStakeQuote {
            inp: stake,
            out,
            fee,
        })
    }
}

/// Reserve adapter. The reserve is a singleton, so only its state varies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReserveAdapter {
    /// Decoded state, `None` until the init accounts are fetched
    pub state: Option<ReserveState>,
}

impl ReserveAdapter {
    pub(crate) const fn init_accounts() -> [Pubkey; 4] {
        [
            RESERVE_POOL,
            RESERVE_FEE,
            RESERVE_PROTOCOL_FEE,
            RESERVE_POOL_SOL_RESERVES,
        ]
    }

    pub(crate) fn update_accounts(ty: PoolUpdateType) -> Option<Vec<Pubkey>> {
        match ty {
            PoolUpdateType::DepositStake => Some(Self::init_accounts().to_vec()),
            _ => None,
        }
    }
}
