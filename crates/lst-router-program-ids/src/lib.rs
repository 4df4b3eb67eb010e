//! Single source of truth for every on-chain address the LST router touches.
//!
//! Addresses are `&'static str` base58 constants so they can be decoded at
//! compile time (`five8_const::decode_32_const`) by the router library and by
//! test harnesses without pulling in any Solana crates.
//!
//! All addresses are the mainnet deployments. Local validators clone these
//! accounts from mainnet, so the same constants are used there.
//!
//! # Usage
//!
//! ```rust,ignore
//! use solana_program::pubkey::Pubkey;
//!
//! pub const ROUTER_PROGRAM: Pubkey =
//!     Pubkey::new_from_array(five8_const::decode_32_const(lst_router_program_ids::ROUTER_PROGRAM_ID));
//! ```

#![no_std]

// =============================================================================
// Router Program
// =============================================================================

/// Router program ID.
///
/// Owns the fee token account PDAs and the bridge stake account PDAs.
pub const ROUTER_PROGRAM_ID: &str = "stkitrT1Uoy18Dk1fTrgPw8W6MVzoCfYoAFT4MLsmhq";

/// System account PDA holding the SOL that prefunds the bridge and slumdog
/// stake accounts during prefund flows.
pub const PREFUNDER: &str = "ALpzvhALRr35nH8mw9SXk2WvmwEYjfw1dvmpFG9Kosu6";

/// wSOL token account the router unwraps user wSOL into.
pub const WSOL_BRIDGE_IN: &str = "7UWZDKjBT1dTvAzdjoSCYKnML3SPt9tfFkANGarEq5r3";

/// System account the router pays SOL out of when staking wSOL.
pub const SOL_BRIDGE_OUT: &str = "75jTZDE78xpBJokeB2BcimRNY5BZ7U45bWhpgUrTzWZC";

/// Router fee token account for wSOL.
pub const WSOL_FEE_TOKEN_ACCOUNT: &str = "D3DxbHp7YvgdD2iH8GfsGWdFE5gp37aoYjp4jW5jNMjH";

// =============================================================================
// SPL Stake Pool
// =============================================================================

/// The reference SPL stake pool program. Branded pools may run their own
/// deployment; the program is supplied per pool at init time.
pub const SPL_STAKE_POOL_PROGRAM_ID: &str = "SPoo1Ku8WFXoNDMHPsrGSTSG1Y47rzgn41SLUNakuHy";

// =============================================================================
// Reserve (instant unstake) Pool
// =============================================================================

/// Unstake program ID.
pub const UNSTAKE_PROGRAM_ID: &str = "unpXTU2Ndrc7WWNyEhQWe4udTzSibLPi25SXv2xbCHQ";

/// Reserve pool state account.
pub const RESERVE_POOL: &str = "FypPtwbY3FUfzJUtXHSyVRokVKG2jKtH29FmK4ebxRSd";

/// Reserve pool fee account.
pub const RESERVE_FEE: &str = "5Pcu8WeQa3VbBz2vdBT49Rj4gbS4hsnfzuL1LmuRaKFY";

/// Unstake program global protocol fee account.
pub const RESERVE_PROTOCOL_FEE: &str = "2hN9UhvRFVfPYKL6rZJ5YiLEPCLTpN755pgwDJHWgFbU";

/// System account holding the reserve pool's SOL liquidity.
pub const RESERVE_POOL_SOL_RESERVES: &str = "3rBnnH9TTgd3xwu48rnzGsaQkSr1hR64nY71DrDt6VrQ";

/// Destination of protocol fees.
pub const RESERVE_PROTOCOL_FEE_VAULT: &str = "EeQmNqm1RcQnee8LTyx6ccVG9FnR8TezQuw2JXq2LC1T";

// =============================================================================
// Marinade
// =============================================================================

/// Marinade liquid staking program ID.
pub const MARINADE_PROGRAM_ID: &str = "MarBmsSgKXdrN1egZf5sqe1TMai9K1rChYNDJgjq7aD";

/// Marinade state account.
pub const MARINADE_STATE: &str = "8szGkuLTAux9XMgZ2vtY39jVSowEcpBfFfD8hXSEqdGC";

/// mSOL mint.
pub const MSOL_MINT: &str = "mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So";

/// Marinade validator list.
pub const MARINADE_VALIDATOR_LIST: &str = "DwFYJNnhLmw19FBTrVaLWZ8SZJpxdPoSYVSJaio9tjbY";

/// Marinade stake list.
pub const MARINADE_STAKE_LIST: &str = "Anv3XE7e5saNdm16MU6bniYS59Mpv7DzQXHAhxJUmAKW";

/// Liquidity pool mSOL leg token account.
pub const MARINADE_LIQ_POOL_MSOL_LEG: &str = "7GgPYjS5Dza89wV6FpZ23kUJRG5vbQ1GM25ezspYFSoE";

/// Liquidity pool SOL leg system account.
pub const MARINADE_LIQ_POOL_SOL_LEG: &str = "UefNb6z6yvArqe4cJHTXCqStRsKmWhGxnZzuHbikP5Q";

/// Authority of the liquidity pool mSOL leg.
pub const MARINADE_LIQ_POOL_MSOL_LEG_AUTHORITY: &str =
    "EyaSjUtSgo9aRD1f8LWXwdvkpDTmXAW54yoSHZRF14WL";

/// Marinade reserve system account.
pub const MARINADE_RESERVE: &str = "Du3Ysj1wKbxPKkuPPnvzQLQh8oMSVifs3jGZjJWXFmHN";

/// mSOL mint authority PDA.
pub const MSOL_MINT_AUTHORITY: &str = "3JLPCS1qM2zRw3Dp6V4hZnYHd4toMNPkNesXdX9tg6KM";

// =============================================================================
// Lido (Solido)
// =============================================================================

/// Solido program ID.
pub const LIDO_PROGRAM_ID: &str = "CrX7kMhLC3cSsXJdT7JDgqrRVWGnUpX3gfEfxxU2NVLi";

/// Solido state account.
pub const LIDO_STATE: &str = "49Yi1TKkNyYjPAFdR9LBvoHcUjuPX4Df5T5yv39w2XTn";

/// stSOL mint.
pub const STSOL_MINT: &str = "7dHbWXmci3dT8UFYWYZweBLXgycu7Y3iL6trKn1Y7ARj";

/// Solido validator list.
pub const LIDO_VALIDATOR_LIST: &str = "GL9kqRNUTUosW3RsDoXHCuXUZn73SgQQmBvtp1ng2co4";

// =============================================================================
// Native programs and sysvars
// =============================================================================

/// System program.
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// Native stake program.
pub const STAKE_PROGRAM_ID: &str = "Stake11111111111111111111111111111111111111";

/// SPL token program.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Associated token account program.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// Wrapped SOL mint.
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

/// Clock sysvar.
pub const SYSVAR_CLOCK: &str = "SysvarC1ock11111111111111111111111111111111";

/// Rent sysvar.
pub const SYSVAR_RENT: &str = "SysvarRent111111111111111111111111111111111";

/// Stake history sysvar.
pub const SYSVAR_STAKE_HISTORY: &str = "SysvarStakeHistory1111111111111111111111111";

/// Stake config account.
pub const SYSVAR_STAKE_CONFIG: &str = "StakeConfig11111111111111111111111111111111";
