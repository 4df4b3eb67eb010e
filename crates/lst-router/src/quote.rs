//! Quote value types.
//!
//! Quotes are plain values computed from decoded pool state. Fees are always
//! stated in the tokens they are charged in:
//!
//! ```text
//!   TokenQuote            fee in output tokens
//!   DepositStakeQuote     fee in output tokens
//!   WithdrawStakeQuote    fee in input tokens
//!   WithRouterFee<Q>      router_fee in Q's output tokens
//!   Prefund<Q>            prefund_fee in lamports
//! ```

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::consts::BPS_DENOMINATOR;

/// Balances of a stake account split by whether they earn yield.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeAccountLamports {
    /// Actively staked lamports
    pub staked: u64,
    /// Everything else: rent-exemption, tips, inactive stake
    pub unstaked: u64,
}

impl StakeAccountLamports {
    /// `staked + unstaked`, `None` on overflow.
    pub const fn total(&self) -> Option<u64> {
        self.staked.checked_add(self.unstaked)
    }
}

/// A stake account going into or coming out of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveStakeParams {
    /// Vote account the stake is delegated to
    pub vote: Pubkey,
    /// Balances
    pub lamports: StakeAccountLamports,
}

/// SOL or token swap quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenQuote {
    /// Input tokens leaving the user's wallet
    pub inp: u64,
    /// Tokens received, after fees
    pub out: u64,
    /// In terms of output tokens
    pub fee: u64,
}

/// Quote for depositing a stake account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepositStakeQuote {
    /// The stake account deposited
    pub inp: ActiveStakeParams,
    /// Output tokens, after fees
    pub out: u64,
    /// In terms of output tokens
    pub fee: u64,
}

/// Quote for withdrawing a stake account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WithdrawStakeQuote {
    /// Input pool tokens
    pub inp: u64,
    /// The stake account withdrawn
    pub out: ActiveStakeParams,
    /// In terms of input tokens
    pub fee: u64,
}

/// Quote for a prefunded stake-to-stake swap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapViaStakeQuote {
    /// Input tokens leaving the user's wallet
    pub inp: u64,
    /// Output tokens received, after fees
    pub out: u64,
    /// Withdraw leg fee, in input tokens
    pub inp_fee: u64,
    /// Deposit leg fee, in output tokens
    pub out_fee: u64,
    /// Validator the bridge stake is delegated to
    pub bridge_vote: Pubkey,
}

/// A quote with the router fee taken on top.
///
/// Total fee is `quote.fee + router_fee`, both in output tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithRouterFee<Q> {
    /// The quote, with `out` already net of the router fee
    pub quote: Q,
    /// Router fee in output tokens
    pub router_fee: u64,
}

impl<Q> WithRouterFee<Q> {
    /// `quote` unchanged with zero router fee.
    pub const fn zero(quote: Q) -> Self {
        Self {
            quote,
            router_fee: 0,
        }
    }
}

/// A quote whose flow borrows the prefund flash loan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prefund<Q> {
    /// The quote
    pub quote: Q,
    /// Lamports of the withdrawn stake instant-unstaked to repay the flash loan
    pub prefund_fee: u64,
}

/// `max(min, floor(out * bps / 10_000))`, capped at `out`; zero when `out` is.
pub fn bps_fee(out: u64, bps: u64, min: u64) -> u64 {
    if out == 0 {
        return 0;
    }
    let fee = u128::from(out) * u128::from(bps) / u128::from(BPS_DENOMINATOR);
    // cast-safety: fee <= out when bps <= 10_000, and the min() below caps it regardless
    let fee = u64::try_from(fee).unwrap_or(u64::MAX);
    fee.max(min).min(out)
}

impl TokenQuote {
    /// Take `router_fee` out of `out`.
    pub fn with_router_fee(self, router_fee: u64) -> WithRouterFee<Self> {
        let router_fee = router_fee.min(self.out);
        WithRouterFee {
            quote: Self {
                out: self.out - router_fee,
                ..self
            },
            router_fee,
        }
    }
}

impl DepositStakeQuote {
    /// Take `router_fee` out of `out`.
    pub fn with_router_fee(self, router_fee: u64) -> WithRouterFee<Self> {
        let router_fee = router_fee.min(self.out);
        WithRouterFee {
            quote: Self {
                out: self.out - router_fee,
                ..self
            },
            router_fee,
        }
    }
}
