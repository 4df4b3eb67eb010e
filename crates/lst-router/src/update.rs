//! Update descriptors: which pools a swap touches and how.
//!
//! ```text
//!   SwapMints::PrefundSwapViaStake { inp, out }
//!     -> (inp, WithdrawStake), (out, DepositStake), (wSOL, DepositStake)
//! ```
//!
//! The wrapped SOL entry is the reserve, which lends and is repaid the
//! prefund flash loan.

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::consts::NATIVE_MINT;

/// Pool operation an update is for.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
pub enum PoolUpdateType {
    /// SOL deposit
    DepositSol,
    /// SOL withdrawal
    WithdrawSol,
    /// Stake account deposit
    DepositStake,
    /// Stake account withdrawal
    WithdrawStake,
}

/// A pool that must be refreshed before quoting a swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolUpdate {
    /// Mint of the pool
    pub mint: Pubkey,
    /// Operation the pool is used for
    pub ty: PoolUpdateType,
}

/// The mints of a swap, by swap type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SwapMints {
    /// SOL in, LST out
    DepositSol {
        /// Output mint
        out: Pubkey,
    },
    /// Stake account in, LST out
    DepositStake {
        /// Output mint
        out: Pubkey,
    },
    /// LST in, SOL out
    WithdrawSol {
        /// Input mint
        inp: Pubkey,
    },
    /// LST in, stake account out
    PrefundWithdrawStake {
        /// Input mint
        inp: Pubkey,
    },
    /// LST in, LST out via a stake account
    PrefundSwapViaStake {
        /// Input mint
        inp: Pubkey,
        /// Output mint
        out: Pubkey,
    },
}

impl SwapMints {
    /// Pools touched by the swap.
    pub fn pool_updates(&self) -> Vec<PoolUpdate> {
        let upd = |mint, ty| PoolUpdate { mint, ty };
        match *self {
            Self::DepositSol { out } => vec![upd(out, PoolUpdateType::DepositSol)],
            Self::DepositStake { out } => vec![upd(out, PoolUpdateType::DepositStake)],
            Self::WithdrawSol { inp } => vec![upd(inp, PoolUpdateType::WithdrawSol)],
            Self::PrefundWithdrawStake { inp } => vec![
                upd(inp, PoolUpdateType::WithdrawStake),
                upd(NATIVE_MINT, PoolUpdateType::DepositStake),
            ],
            Self::PrefundSwapViaStake { inp, out } => vec![
                upd(inp, PoolUpdateType::WithdrawStake),
                upd(out, PoolUpdateType::DepositStake),
                upd(NATIVE_MINT, PoolUpdateType::DepositStake),
            ],
        }
    }

    /// Every mint the swap involves, without the reserve.
    pub fn mints(&self) -> Vec<Pubkey> {
        match *self {
            Self::DepositSol { out } | Self::DepositStake { out } => vec![out],
            Self::WithdrawSol { inp } | Self::PrefundWithdrawStake { inp } => vec![inp],
            Self::PrefundSwapViaStake { inp, out } => vec![inp, out],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefund_updates_include_reserve() {
        let inp = Pubkey::new_unique();
        let out = Pubkey::new_unique();
        let updates = SwapMints::PrefundSwapViaStake { inp, out }.pool_updates();
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].ty, PoolUpdateType::WithdrawStake);
        assert_eq!(updates[1].mint, out);
        assert_eq!(updates[2].mint, NATIVE_MINT);
        assert_eq!(updates[2].ty, PoolUpdateType::DepositStake);

        let updates = SwapMints::PrefundWithdrawStake { inp }.pool_updates();
        assert_eq!(updates.len(), 2);
    }

    #[test]
    fn test_swap_mints_json() {
        let inp = Pubkey::new_unique();
        let json = serde_json::to_value(SwapMints::WithdrawSol { inp }).unwrap();
        assert_eq!(json["type"], "withdrawSol");
        let back: SwapMints = serde_json::from_value(json).unwrap();
        assert_eq!(back, SwapMints::WithdrawSol { inp });
    }
}
