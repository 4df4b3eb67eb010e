//! Protocol adapters.
//!
//! Each adapter decodes its protocol's account layouts out of the
//! [`AccountCache`] and exposes pure quote functions over the decoded state.
//! Adapters only implement the capabilities their protocol supports:
//!
//! ```text
//!              deposit sol   withdraw sol   deposit stake   withdraw stake
//!   reserve                                      x
//!   marinade        x                            x
//!   lido                                                          x
//!   spl             x             x              x                x
//! ```
//!
//! The router dispatches over [`PoolAdapter`] and reports anything outside
//! this table as `Unsupported`.

pub mod lido;
pub mod marinade;
pub mod reserve;
pub mod spl;

use borsh::BorshDeserialize;
use solana_program::pubkey::Pubkey;

use crate::{
    cache::{AccountCache, AccountRecord},
    consts::STAKE_ACCOUNT_RENT_EXEMPT_LAMPORTS,
    error::{PoolError, ReserveError, RouterError, StakeQuoteError},
    quote::{
        ActiveStakeParams, DepositStakeQuote, Prefund, StakeAccountLamports, TokenQuote,
        WithdrawStakeQuote,
    },
    update::PoolUpdateType,
};

pub use lido::LidoAdapter;
pub use marinade::MarinadeAdapter;
pub use reserve::{ReserveAdapter, ReserveState};
pub use spl::SplAdapter;

// ===== Capabilities =====

/// Quotes SOL deposits.
pub trait DepositSolQuoter {
    /// Protocol error
    type Error: Into<PoolError>;

    /// Quote depositing `lamports`.
    ///
    /// # Errors
    /// Protocol rejection.
    fn quote_deposit_sol(&self, lamports: u64) -> Result<TokenQuote, Self::Error>;
}

/// Quotes SOL withdrawals.
pub trait WithdrawSolQuoter {
    /// Protocol error
    type Error: Into<PoolError>;

    /// Quote redeeming `tokens` for SOL.
    ///
    /// # Errors
    /// Protocol rejection.
    fn quote_withdraw_sol(&self, tokens: u64) -> Result<TokenQuote, Self::Error>;
}

/// Quotes stake account deposits.
pub trait DepositStakeQuoter {
    /// Protocol error
    type Error: Into<PoolError> + StakeQuoteError;

    /// Quote depositing `stake`.
    ///
    /// # Errors
    /// Protocol rejection.
    fn quote_deposit_stake(&self, stake: ActiveStakeParams)
    -> Result<DepositStakeQuote, Self::Error>;
}

/// Quotes stake account withdrawals.
pub trait WithdrawStakeQuoter {
    /// Protocol error
    type Error: Into<PoolError> + StakeQuoteError;

    /// Quote redeeming `tokens` for a stake account delegated to `vote`, or
    /// to a validator of the pool's choosing if `vote` is `None`.
    ///
    /// # Errors
    /// Protocol rejection.
    fn quote_withdraw_stake(
        &self,
        tokens: u64,
        vote: Option<&Pubkey>,
    ) -> Result<WithdrawStakeQuote, Self::Error>;

    /// Quote a withdrawal whose destination stake account is made rent-exempt
    /// by the router's flash loan. The loan is repaid by splitting off part of
    /// the withdrawn stake into the slumdog account and instant-unstaking it
    /// through the reserve.
    ///
    /// Assumes the protocol does not fund rent-exemption of the split
    /// destination, so `quote.out.unstaked` of the plain withdrawal is zero.
    ///
    /// # Errors
    /// `Pool` on protocol rejection, `Reserve` if the reserve cannot fund the loan.
    fn quote_prefund_withdraw_stake(
        &self,
        tokens: u64,
        vote: Option<&Pubkey>,
        reserve: &ReserveState,
    ) -> Result<Prefund<WithdrawStakeQuote>, PrefundError<Self::Error>> {
        let WithdrawStakeQuote {
            inp,
            out: ActiveStakeParams { vote, lamports },
            fee,
        } = self
            .quote_withdraw_stake(tokens, vote)
            .map_err(PrefundError::Pool)?;
        if !reserve.has_enough_for_slumdog() {
            return Err(PrefundError::Reserve(ReserveError::NotEnoughLiquidity));
        }
        let prefund_fee = reserve
            .slumdog_target_lamports()
            .ok_or(PrefundError::Reserve(ReserveError::InternalError))?
            .saturating_sub(STAKE_ACCOUNT_RENT_EXEMPT_LAMPORTS);
        let total = lamports
            .total()
            .ok_or(PrefundError::Reserve(ReserveError::InternalError))?;
        // withdrawal too small to repay the flash loan
        let staked = total
            .checked_sub(prefund_fee)
            .ok_or(PrefundError::Reserve(ReserveError::InternalError))?;
        Ok(Prefund {
            quote: WithdrawStakeQuote {
                inp,
                out: ActiveStakeParams {
                    vote,
                    lamports: StakeAccountLamports {
                        staked,
                        unstaked: STAKE_ACCOUNT_RENT_EXEMPT_LAMPORTS,
                    },
                },
                fee,
            },
            prefund_fee,
        })
    }
}

/// Failure of a prefunded withdrawal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefundError<E> {
    /// The reserve cannot fund or repay the flash loan
    Reserve(ReserveError),
    /// The withdrawing pool rejected the withdrawal
    Pool(E),
}

impl<E: Into<PoolError>> From<PrefundError<E>> for PoolError {
    fn from(e: PrefundError<E>) -> Self {
        match e {
            PrefundError::Reserve(e) => Self::Reserve(e),
            PrefundError::Pool(e) => e.into(),
        }
    }
}

impl<E: Into<PoolError>> From<PrefundError<E>> for RouterError {
    fn from(e: PrefundError<E>) -> Self {
        PoolError::from(e).into()
    }
}

// ===== Decoding helpers =====

/// First 8 bytes of `sha256("account:<name>")`.
pub(crate) const fn account_discriminator(name: &str) -> [u8; 8] {
    let h = const_crypto::sha2::Sha256::new()
        .update(b"account:")
        .update(name.as_bytes())
        .finalize();
    [h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7]]
}

/// Borsh-decode an account prefixed by an 8-byte discriminator.
pub(crate) fn anchor_deserialize<T: BorshDeserialize>(
    record: &AccountRecord,
    discriminator: &[u8; 8],
    what: &str,
) -> Result<T, RouterError> {
    let mut rest = record
        .data
        .strip_prefix(discriminator.as_slice())
        .ok_or_else(|| RouterError::decode(&record.pubkey, what))?;
    T::deserialize(&mut rest).map_err(|_| RouterError::decode(&record.pubkey, what))
}

/// Borsh-decode an account, tolerating trailing bytes.
pub(crate) fn borsh_deserialize<T: BorshDeserialize>(
    record: &AccountRecord,
    what: &str,
) -> Result<T, RouterError> {
    T::deserialize(&mut record.data.as_slice())
        .map_err(|_| RouterError::decode(&record.pubkey, what))
}

// ===== Dispatch =====

/// Protocol family of an adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
pub enum PoolKind {
    /// Instant-unstake SOL reserve
    Reserve,
    /// Marinade
    Marinade,
    /// Lido (Solido)
    Lido,
    /// SPL stake pool
    Spl,
}

/// An adapter instance, tagged by protocol.
#[derive(Clone, Debug, PartialEq)]
pub enum PoolAdapter {
    /// Reserve pool
    Reserve(ReserveAdapter),
    /// Marinade
    Marinade(MarinadeAdapter),
    /// Lido
    Lido(LidoAdapter),
    /// SPL stake pool
    Spl(SplAdapter),
}

impl PoolAdapter {
    /// Protocol family.
    pub fn kind(&self) -> PoolKind {
        match self {
            Self::Reserve(_) => PoolKind::Reserve,
            Self::Marinade(_) => PoolKind::Marinade,
            Self::Lido(_) => PoolKind::Lido,
            Self::Spl(_) => PoolKind::Spl,
        }
    }

    /// Every account needed to decode this pool from scratch.
    pub fn init_accounts(&self) -> Vec<Pubkey> {
        match self {
            Self::Reserve(_) => ReserveAdapter::init_accounts().to_vec(),
            Self::Marinade(_) => MarinadeAdapter::init_accounts().to_vec(),
            Self::Lido(_) => LidoAdapter::init_accounts().to_vec(),
            Self::Spl(a) => a.init_accounts().to_vec(),
        }
    }

    /// Accounts whose state may drift between quotes of `ty`.
    ///
    /// # Errors
    /// `Unsupported` if the pool does not support `ty`.
    pub fn update_accounts(
        &self,
        mint: &Pubkey,
        ty: PoolUpdateType,
    ) -> Result<Vec<Pubkey>, RouterError> {
        let accounts = match self {
            Self::Reserve(_) => ReserveAdapter::update_accounts(ty),
            Self::Marinade(_) => MarinadeAdapter::update_accounts(ty),
            Self::Lido(_) => LidoAdapter::update_accounts(ty),
            Self::Spl(a) => Some(a.update_accounts(ty)),
        };
        accounts.ok_or_else(|| RouterError::unsupported(ty.into(), mint))
    }

    /// Whether the pool state has been decoded.
    pub fn is_decoded(&self) -> bool {
        match self {
            Self::Reserve(a) => a.state.is_some(),
            Self::Marinade(a) => a.state.is_some(),
            Self::Lido(a) => a.state.is_some(),
            Self::Spl(a) => a.state.is_some(),
        }
    }

    /// Decode the whole pool state from `cache`. On error the previous state
    /// is left untouched.
    ///
    /// # Errors
    /// `NotFound` if an init account is missing, `Decode` on malformed data.
    pub fn refresh(&mut self, cache: &AccountCache) -> Result<(), RouterError> {
        match self {
            Self::Reserve(a) => a.state = Some(ReserveState::decode(cache)?),
            Self::Marinade(a) => a.refresh(cache)?,
            Self::Lido(a) => a.refresh(cache)?,
            Self::Spl(a) => a.refresh(cache)?,
        }
        log::debug!("decoded {:?} pool state", self.kind());
        Ok(())
    }
}
