//! Router fee configuration.
//!
//! The defaults mirror the fees the router program charges on chain. A
//! config can be loaded from JSON:
//!
//! ```json
//! {
//!   "withdrawSolFeeBps": 1,
//!   "depositStakeFeeBps": 10,
//!   "minRouterFee": 1,
//!   "depositStakeFeeFreeMints": ["So11111111111111111111111111111111111111112"]
//! }
//! ```

use std::{collections::HashSet, str::FromStr};

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::{
    consts::{DEPOSIT_STAKE_GLOBAL_FEE_BPS, NATIVE_MINT, WITHDRAW_WRAPPED_SOL_GLOBAL_FEE_BPS},
    error::{RouterError, RouterErrorCode},
    quote::bps_fee,
};

/// Router fee settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouterConfig {
    /// Fee on SOL withdrawals, in bps of output
    pub withdraw_sol_fee_bps: u64,
    /// Fee on stake deposits and prefunded swaps, in bps of output
    pub deposit_stake_fee_bps: u64,
    /// Floor of any non-zero router fee
    pub min_router_fee: u64,
    /// Output mints on which stake deposits carry no router fee
    pub deposit_stake_fee_free_mints: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            withdraw_sol_fee_bps: WITHDRAW_WRAPPED_SOL_GLOBAL_FEE_BPS,
            deposit_stake_fee_bps: DEPOSIT_STAKE_GLOBAL_FEE_BPS,
            min_router_fee: 1,
            deposit_stake_fee_free_mints: vec![NATIVE_MINT.to_string()],
        }
    }
}

impl RouterConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    /// `Decode` on malformed JSON, bps above 10 000 or invalid mint strings.
    pub fn from_json(s: &str) -> Result<Self, RouterError> {
        let config: Self = serde_json::from_str(s).map_err(|e| {
            RouterError::new(RouterErrorCode::Decode, format!("invalid router config: {e}"))
        })?;
        config.resolve()?;
        Ok(config)
    }

    /// Validate and resolve into the form quoting uses.
    ///
    /// # Errors
    /// `Decode` on bps above 10 000 or invalid mint strings.
    pub fn resolve(&self) -> Result<FeeSchedule, RouterError> {
        for bps in [self.withdraw_sol_fee_bps, self.deposit_stake_fee_bps] {
            if bps > 10_000 {
                return Err(RouterError::new(
                    RouterErrorCode::Decode,
                    format!("fee of {bps} bps exceeds 100%"),
                ));
            }
        }
        let fee_free = self
            .deposit_stake_fee_free_mints
            .iter()
            .map(|s| {
                Pubkey::from_str(s).map_err(|_| {
                    RouterError::new(RouterErrorCode::Decode, format!("invalid mint {s}"))
                })
            })
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(FeeSchedule {
            withdraw_sol_fee_bps: self.withdraw_sol_fee_bps,
            deposit_stake_fee_bps: self.deposit_stake_fee_bps,
            min_router_fee: self.min_router_fee,
            deposit_stake_fee_free: fee_free,
        })
    }
}

/// Validated [`RouterConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeSchedule {
    withdraw_sol_fee_bps: u64,
    deposit_stake_fee_bps: u64,
    min_router_fee: u64,
    deposit_stake_fee_free: HashSet<Pubkey>,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            withdraw_sol_fee_bps: WITHDRAW_WRAPPED_SOL_GLOBAL_FEE_BPS,
            deposit_stake_fee_bps: DEPOSIT_STAKE_GLOBAL_FEE_BPS,
            min_router_fee: 1,
            deposit_stake_fee_free: HashSet::from([NATIVE_MINT]),
        }
    }
}

impl FeeSchedule {
    /// Router fee on a SOL withdrawal that produced `out` lamports.
    pub fn withdraw_sol_fee(&self, out: u64) -> u64 {
        bps_fee(out, self.withdraw_sol_fee_bps, self.min_router_fee)
    }

    /// Router fee on a stake deposit that produced `out` tokens of `out_mint`.
    pub fn deposit_stake_fee(&self, out_mint: &Pubkey, out: u64) -> u64 {
        if self.deposit_stake_fee_free.contains(out_mint) {
            return 0;
        }
        bps_fee(out, self.deposit_stake_fee_bps, self.min_router_fee)
    }
}
