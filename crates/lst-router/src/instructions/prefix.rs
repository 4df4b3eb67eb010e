//! Router prefix accounts of each swap instruction.

use serde::{Deserialize, Serialize};
use solana_program::{instruction::AccountMeta, pubkey::Pubkey};

use super::{required, AccountRole};
use crate::{
    consts::{
        NATIVE_MINT, PREFUNDER, RESERVE_FEE, RESERVE_POOL, RESERVE_POOL_SOL_RESERVES,
        RESERVE_PROTOCOL_FEE, RESERVE_PROTOCOL_FEE_VAULT, SOL_BRIDGE_OUT, STAKE_PROGRAM,
        SYSTEM_PROGRAM, SYSVAR_CLOCK, TOKEN_PROGRAM, UNSTAKE_PROGRAM, WSOL_BRIDGE_IN,
        WSOL_FEE_TOKEN_ACCOUNT,
    },
    error::RouterError,
    pda::{find_fee_token_account_pda, EphemeralStakeAccounts},
};

use crate::instructions::AccountRole::{
    Readonly as R, ReadonlySigner as RS, Writable as W, WritableSigner as WS,
};

/// Caller-supplied accounts and amount of a swap. Every builder checks the
/// fields it needs and fails with `Build` on the first missing one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapParams {
    /// Input amount: lamports, input tokens, or unused for stake deposits
    pub amount: u64,
    /// Input mint
    pub inp: Option<Pubkey>,
    /// Output mint
    pub out: Option<Pubkey>,
    /// User signing the swap
    pub signer: Option<Pubkey>,
    /// Account the input leaves from: a token account, or the stake account
    /// of a stake deposit
    pub signer_inp: Option<Pubkey>,
    /// Token account receiving the output
    pub signer_out: Option<Pubkey>,
    /// Seed of the bridge stake account of prefund flows
    pub bridge_stake_seed: Option<u32>,
}

fn metas(accounts: &[(Pubkey, AccountRole)]) -> Vec<AccountMeta> {
    accounts.iter().map(|(pk, role)| role.meta(*pk)).collect()
}

/// The output mint is written when minting, but wrapped SOL is never minted.
fn out_mint_role(out_mint: &Pubkey) -> AccountRole {
    if *out_mint == NATIVE_MINT { R } else { W }
}

/// ```text
///   user S, inp_wsol W, out_token W, wsol_bridge_in W, sol_bridge_out W,
///   out_fee_token W, out_mint W, wsol_mint, token_program, system_program
/// ```
///
/// # Errors
/// `Build` if `signer`, `signer_inp`, `signer_out` or `out` is missing.
pub fn stake_wrapped_sol_prefix(params: &SwapParams) -> Result<Vec<AccountMeta>, RouterError> {
    let out_mint = required(params.out, "out mint")?;
    let (out_fee_token, _bump) = find_fee_token_account_pda(&out_mint)?;
    Ok(metas(&[
        (required(params.signer, "signer")?, RS),
        (required(params.signer_inp, "input wrapped SOL account")?, W),
        (required(params.signer_out, "output token account")?, W),
        (WSOL_BRIDGE_IN, W),
        (SOL_BRIDGE_OUT, W),
        (out_fee_token, W),
        (out_mint, W),
        (NATIVE_MINT, R),
        (TOKEN_PROGRAM, R),
        (SYSTEM_PROGRAM, R),
    ]))
}

/// ```text
///   user S, inp_token W, out_wsol W, wsol_fee_token W, inp_mint W,
///   wsol_mint, token_program
/// ```
///
/// # Errors
/// `Build` if `signer`, `signer_inp`, `signer_out` or `inp` is missing.
pub fn withdraw_wrapped_sol_prefix(params: &SwapParams) -> Result<Vec<AccountMeta>, RouterError> {
    Ok(metas(&[
        (required(params.signer, "signer")?, RS),
        (required(params.signer_inp, "input token account")?, W),
        (required(params.signer_out, "output wrapped SOL account")?, W),
        (WSOL_FEE_TOKEN_ACCOUNT, W),
        (required(params.inp, "input mint")?, W),
        (NATIVE_MINT, R),
        (TOKEN_PROGRAM, R),
    ]))
}

/// ```text
///   user WS, stake_account W, out_token W, out_fee_token W, out_mint W
/// ```
///
/// `user` is writable because Marinade refunds the stake account's rent to it.
///
/// # Errors
/// `Build` if `signer`, `signer_inp` (the stake account), `signer_out` or
/// `out` is missing.
pub fn deposit_stake_prefix(params: &SwapParams) -> Result<Vec<AccountMeta>, RouterError> {
    let out_mint = required(params.out, "out mint")?;
    let (out_fee_token, _bump) = find_fee_token_account_pda(&out_mint)?;
    Ok(metas(&[
        (required(params.signer, "signer")?, WS),
        (required(params.signer_inp, "stake account")?, W),
        (required(params.signer_out, "output token account")?, W),
        (out_fee_token, W),
        (out_mint, out_mint_role(&out_mint)),
    ]))
}

/// Accounts of the flash loan repayment, shared by both prefund prefixes.
fn prefund_tail(eph: &EphemeralStakeAccounts) -> [(Pubkey, AccountRole); 12] {
    [
        (PREFUNDER, W),
        (eph.slumdog_stake, W),
        (UNSTAKE_PROGRAM, R),
        (RESERVE_POOL, W),
        (RESERVE_POOL_SOL_RESERVES, W),
        (RESERVE_FEE, R),
        (eph.slumdog_stake_acc_record, W),
        (RESERVE_PROTOCOL_FEE, R),
        (RESERVE_PROTOCOL_FEE_VAULT, W),
        (SYSVAR_CLOCK, R),
        (STAKE_PROGRAM, R),
        (SYSTEM_PROGRAM, R),
    ]
}

/// ```text
///   user WS, inp_token W, bridge_stake W, inp_mint W, prefunder W,
///   slumdog_stake W, unstake_program, unstake_pool W, sol_reserves W,
///   unstake_fee, slumdog_acc_record W, protocol_fee, protocol_fee_dest W,
///   clock, stake_program, system_program
/// ```
///
/// # Errors
/// `Build` if `signer`, `signer_inp` or `inp` is missing.
pub fn prefund_withdraw_stake_prefix(
    params: &SwapParams,
    eph: &EphemeralStakeAccounts,
) -> Result<Vec<AccountMeta>, RouterError> {
    let mut accounts = vec![
        (required(params.signer, "signer")?, WS),
        (required(params.signer_inp, "input token account")?, W),
        (eph.bridge_stake, W),
        (required(params.inp, "input mint")?, W),
    ];
    accounts.extend(prefund_tail(eph));
    Ok(metas(&accounts))
}

/// ```text
///   user WS, inp_token W, out_token W, bridge_stake W, out_fee_token W,
///   inp_mint W, out_mint W, prefunder W, slumdog_stake W, unstake_program,
///   unstake_pool W, sol_reserves W, unstake_fee, slumdog_acc_record W,
///   protocol_fee, protocol_fee_dest W, clock, stake_program, system_program
/// ```
///
/// # Errors
/// `Build` if `signer`, `signer_inp`, `signer_out`, `inp` or `out` is missing.
pub fn prefund_swap_via_stake_prefix(
    params: &SwapParams,
    eph: &EphemeralStakeAccounts,
) -> Result<Vec<AccountMeta>, RouterError> {
    let out_mint = required(params.out, "out mint")?;
    let (out_fee_token, _bump) = find_fee_token_account_pda(&out_mint)?;
    let mut accounts = vec![
        (required(params.signer, "signer")?, WS),
        (required(params.signer_inp, "input token account")?, W),
        (required(params.signer_out, "output token account")?, W),
        (eph.bridge_stake, W),
        (out_fee_token, W),
        (required(params.inp, "input mint")?, W),
        (out_mint, out_mint_role(&out_mint)),
    ];
    accounts.extend(prefund_tail(eph));
    Ok(metas(&accounts))
}
