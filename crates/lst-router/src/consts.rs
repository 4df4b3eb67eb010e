//! Addresses, seeds and protocol constants.
//!
//! Addresses come from `lst-router-program-ids` and are decoded at compile
//! time. PDAs with fixed seeds are derived at compile time as well.

use lst_router_program_ids as ids;
use solana_program::pubkey::Pubkey;

const fn pk(s: &str) -> Pubkey {
    Pubkey::new_from_array(five8_const::decode_32_const(s))
}

// ===== Router =====

/// Router program.
pub const ROUTER_PROGRAM: Pubkey = pk(ids::ROUTER_PROGRAM_ID);

/// SOL prefunder PDA of the router program.
pub const PREFUNDER: Pubkey = pk(ids::PREFUNDER);

/// wSOL account the router unwraps into.
pub const WSOL_BRIDGE_IN: Pubkey = pk(ids::WSOL_BRIDGE_IN);

/// SOL account the router pays out of.
pub const SOL_BRIDGE_OUT: Pubkey = pk(ids::SOL_BRIDGE_OUT);

/// Fee token account of the wSOL mint.
pub const WSOL_FEE_TOKEN_ACCOUNT: Pubkey = pk(ids::WSOL_FEE_TOKEN_ACCOUNT);

/// Router fee on WithdrawWrappedSol, in bps of output.
pub const WITHDRAW_WRAPPED_SOL_GLOBAL_FEE_BPS: u64 = 1;

/// Router fee on DepositStake and PrefundSwapViaStake, in bps of output.
pub const DEPOSIT_STAKE_GLOBAL_FEE_BPS: u64 = 10;

/// Denominator of bps fees.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Seed prefix of router fee token accounts: `["fee", mint]`.
pub const FEE_SEED: &[u8] = b"fee";

/// Seed prefix of bridge stake accounts: `["bridge_stake", user, seed_le]`.
pub const BRIDGE_STAKE_SEED: &[u8] = b"bridge_stake";

/// `create_with_seed` seed of the slumdog stake account, based on the bridge stake.
pub const SLUMDOG_SEED: &str = "slumdog";

// ===== Rent =====

/// Rent-exempt minimum of a 200-byte stake account.
pub const STAKE_ACCOUNT_RENT_EXEMPT_LAMPORTS: u64 = 2_282_880;

/// Rent-exempt minimum of a 0-byte account.
pub const ZERO_DATA_ACC_RENT_EXEMPT_LAMPORTS: u64 = 890_880;

/// Flash loan the router advances so that both the slumdog stake and the
/// withdrawn stake are rent-exempt. Repaid by instant-unstaking the slumdog.
pub const PREFUND_FLASH_LOAN_LAMPORTS: u64 = 2 * STAKE_ACCOUNT_RENT_EXEMPT_LAMPORTS;

// ===== Native =====

/// System program.
pub const SYSTEM_PROGRAM: Pubkey = pk(ids::SYSTEM_PROGRAM_ID);

/// Stake program.
pub const STAKE_PROGRAM: Pubkey = pk(ids::STAKE_PROGRAM_ID);

/// SPL token program.
pub const TOKEN_PROGRAM: Pubkey = pk(ids::TOKEN_PROGRAM_ID);

/// Associated token account program.
pub const ASSOCIATED_TOKEN_PROGRAM: Pubkey = pk(ids::ASSOCIATED_TOKEN_PROGRAM_ID);

/// wSOL mint.
pub const NATIVE_MINT: Pubkey = pk(ids::NATIVE_MINT);

/// Clock sysvar.
pub const SYSVAR_CLOCK: Pubkey = pk(ids::SYSVAR_CLOCK);

/// Rent sysvar.
pub const SYSVAR_RENT: Pubkey = pk(ids::SYSVAR_RENT);

/// Stake history sysvar.
pub const SYSVAR_STAKE_HISTORY: Pubkey = pk(ids::SYSVAR_STAKE_HISTORY);

/// Stake config.
pub const SYSVAR_STAKE_CONFIG: Pubkey = pk(ids::SYSVAR_STAKE_CONFIG);

// ===== SPL stake pool =====

/// Reference SPL stake pool program.
pub const SPL_STAKE_POOL_PROGRAM: Pubkey = pk(ids::SPL_STAKE_POOL_PROGRAM_ID);

/// A validator whose active stake is at or below this is considered exhausted
/// for preferred-validator purposes.
pub const SPL_MIN_ACTIVE_STAKE: u64 = 1_000_000;

// ===== Reserve =====

/// Unstake program.
pub const UNSTAKE_PROGRAM: Pubkey = pk(ids::UNSTAKE_PROGRAM_ID);

/// Reserve pool.
pub const RESERVE_POOL: Pubkey = pk(ids::RESERVE_POOL);

/// Reserve pool fee account.
pub const RESERVE_FEE: Pubkey = pk(ids::RESERVE_FEE);

/// Unstake protocol fee account.
pub const RESERVE_PROTOCOL_FEE: Pubkey = pk(ids::RESERVE_PROTOCOL_FEE);

/// Reserve pool SOL reserves.
pub const RESERVE_POOL_SOL_RESERVES: Pubkey = pk(ids::RESERVE_POOL_SOL_RESERVES);

/// Protocol fee destination.
pub const RESERVE_PROTOCOL_FEE_VAULT: Pubkey = pk(ids::RESERVE_PROTOCOL_FEE_VAULT);

// ===== Marinade =====

/// Marinade program.
pub const MARINADE_PROGRAM: Pubkey = pk(ids::MARINADE_PROGRAM_ID);

/// Marinade state.
pub const MARINADE_STATE: Pubkey = pk(ids::MARINADE_STATE);

/// mSOL mint.
pub const MSOL_MINT: Pubkey = pk(ids::MSOL_MINT);

/// Marinade validator list.
pub const MARINADE_VALIDATOR_LIST: Pubkey = pk(ids::MARINADE_VALIDATOR_LIST);

/// Marinade stake list.
pub const MARINADE_STAKE_LIST: Pubkey = pk(ids::MARINADE_STAKE_LIST);

/// Liquidity pool mSOL leg.
pub const MARINADE_LIQ_POOL_MSOL_LEG: Pubkey = pk(ids::MARINADE_LIQ_POOL_MSOL_LEG);

/// Liquidity pool SOL leg.
pub const MARINADE_LIQ_POOL_SOL_LEG: Pubkey = pk(ids::MARINADE_LIQ_POOL_SOL_LEG);

/// Liquidity pool mSOL leg authority.
pub const MARINADE_LIQ_POOL_MSOL_LEG_AUTHORITY: Pubkey =
    pk(ids::MARINADE_LIQ_POOL_MSOL_LEG_AUTHORITY);

/// Marinade reserve.
pub const MARINADE_RESERVE: Pubkey = pk(ids::MARINADE_RESERVE);

/// mSOL mint authority.
pub const MSOL_MINT_AUTHORITY: Pubkey = pk(ids::MSOL_MINT_AUTHORITY);

// ===== Lido =====

/// Solido program.
pub const LIDO_PROGRAM: Pubkey = pk(ids::LIDO_PROGRAM_ID);

/// Solido state.
pub const LIDO_STATE: Pubkey = pk(ids::LIDO_STATE);

/// stSOL mint.
pub const STSOL_MINT: Pubkey = pk(ids::STSOL_MINT);

/// Solido validator list.
pub const LIDO_VALIDATOR_LIST: Pubkey = pk(ids::LIDO_VALIDATOR_LIST);

/// Solido stake authority PDA: `[state, "stake_authority"]`.
pub const LIDO_STAKE_AUTHORITY: Pubkey = Pubkey::new_from_array(
    const_crypto::ed25519::derive_program_address(
        &[
            &five8_const::decode_32_const(ids::LIDO_STATE),
            b"stake_authority",
        ],
        &five8_const::decode_32_const(ids::LIDO_PROGRAM_ID),
    )
    .0,
);

/// Minimum lamports Solido always lets a withdrawal take from a validator.
pub const LIDO_MIN_WITHDRAW_LAMPORTS: u64 = 10_000_000_000;
