//! Instruction assembly tests: router prefix plus pool suffixes.

mod common;

use common::*;
use lst_router::{
    consts::{
        LIDO_PROGRAM, MARINADE_PROGRAM, MSOL_MINT, NATIVE_MINT, RESERVE_POOL,
        RESERVE_PROTOCOL_FEE_VAULT, ROUTER_PROGRAM, SPL_STAKE_POOL_PROGRAM, STSOL_MINT,
        SYSTEM_PROGRAM, UNSTAKE_PROGRAM,
    },
    instructions::RouterInstruction,
    pda::{
        find_fee_token_account_pda, find_reserve_stake_acc_record_pda,
        find_spl_validator_stake_pda, find_spl_withdraw_auth_pda, EphemeralStakeAccounts,
    },
    RouterErrorCode, SwapParams,
};
use solana_program::pubkey::Pubkey;

const SEED: u32 = 42;

fn params(inp: Pubkey, out: Pubkey, amount: u64) -> SwapParams {
    SwapParams {
        amount,
        inp: Some(inp),
        out: Some(out),
        signer: Some(key(50)),
        signer_inp: Some(key(51)),
        signer_out: Some(key(52)),
        bridge_stake_seed: Some(SEED),
    }
}

fn validator_stake(n: u8, vote: &Pubkey) -> Pubkey {
    let init = spl_pool_init(n);
    find_spl_validator_stake_pda(&init.program, vote, &init.stake_pool, None)
        .unwrap()
        .0
}

#[test]
fn test_deposit_sol_ix() {
    let mut fixture = Fixture::new();
    let router = ready_router(&mut fixture);

    let ix = router
        .deposit_sol_ix(&params(NATIVE_MINT, spl_a(), 1_000_000))
        .unwrap();
    assert_eq!(ix.program_id, ROUTER_PROGRAM);
    assert_eq!(ix.data[0], RouterInstruction::StakeWrappedSol.to_u8());
    assert_eq!(&ix.data[1..], &1_000_000u64.to_le_bytes());
    assert_eq!(ix.accounts.len(), 10 + 5);

    let init = spl_pool_init(0);
    assert_eq!(ix.accounts[0].pubkey, key(50));
    assert!(ix.accounts[0].is_signer);
    assert_eq!(ix.accounts[5].pubkey, find_fee_token_account_pda(&spl_a()).unwrap().0);
    assert_eq!(ix.accounts[6].pubkey, spl_a());
    assert!(ix.accounts[6].is_writable);
    assert_eq!(ix.accounts[10].pubkey, SPL_STAKE_POOL_PROGRAM);
    assert_eq!(ix.accounts[11].pubkey, init.stake_pool);
    assert_eq!(
        ix.accounts[12].pubkey,
        find_spl_withdraw_auth_pda(&init.program, &init.stake_pool).unwrap().0
    );
    assert_eq!(ix.accounts[14].pubkey, key(92));

    let ix = router
        .deposit_sol_ix(&params(NATIVE_MINT, MSOL_MINT, 1_000_000))
        .unwrap();
    assert_eq!(ix.accounts.len(), 10 + 7);
    assert_eq!(ix.accounts[10].pubkey, MARINADE_PROGRAM);
}

#[test]
fn test_withdraw_sol_ix() {
    let mut fixture = Fixture::new();
    let router = ready_router(&mut fixture);

    let ix = router
        .withdraw_sol_ix(&params(spl_b(), NATIVE_MINT, 5_000))
        .unwrap();
    assert_eq!(ix.data.len(), 9);
    assert_eq!(ix.data[0], RouterInstruction::WithdrawWrappedSol.to_u8());
    assert_eq!(ix.accounts.len(), 7 + 9);
    assert_eq!(ix.accounts[4].pubkey, spl_b());
    assert_eq!(ix.accounts[8].pubkey, spl_pool_init(1).stake_pool);

    let err = router
        .withdraw_sol_ix(&params(MSOL_MINT, NATIVE_MINT, 5_000))
        .unwrap_err();
    assert_eq!(err.code, RouterErrorCode::Unsupported);
}

#[test]
fn test_deposit_stake_ix() {
    let mut fixture = Fixture::new();
    let router = ready_router(&mut fixture);
    let stake_account = key(51);

    let ix = router
        .deposit_stake_ix(&params(stake_account, NATIVE_MINT, 0), &v1())
        .unwrap();
    assert_eq!(ix.data, vec![RouterInstruction::DepositStake.to_u8()]);
    assert_eq!(ix.accounts.len(), 5 + 11);
    assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
    assert_eq!(ix.accounts[1].pubkey, stake_account);
    assert_eq!(ix.accounts[4].pubkey, NATIVE_MINT);
    assert!(!ix.accounts[4].is_writable);
    assert_eq!(ix.accounts[5].pubkey, UNSTAKE_PROGRAM);
    assert_eq!(ix.accounts[6].pubkey, RESERVE_POOL);
    assert_eq!(
        ix.accounts[9].pubkey,
        find_reserve_stake_acc_record_pda(&stake_account).unwrap().0
    );
    // the fixed vault, not whatever the protocol fee account names
    assert_eq!(ix.accounts[11].pubkey, RESERVE_PROTOCOL_FEE_VAULT);
    assert_ne!(ix.accounts[11].pubkey, key(91));

    let ix = router
        .deposit_stake_ix(&params(stake_account, spl_a(), 0), &v1())
        .unwrap();
    assert_eq!(ix.accounts.len(), 5 + 12);
    assert!(ix.accounts[4].is_writable);
    assert_eq!(ix.accounts[10].pubkey, validator_stake(0, &v1()));

    let ix = router
        .deposit_stake_ix(&params(stake_account, MSOL_MINT, 0), &v1())
        .unwrap();
    assert_eq!(ix.accounts.len(), 5 + 11);

    let err = router
        .deposit_stake_ix(&params(stake_account, STSOL_MINT, 0), &v1())
        .unwrap_err();
    assert_eq!(err.code, RouterErrorCode::Unsupported);
}

#[test]
fn test_prefund_withdraw_stake_ix() {
    let mut fixture = Fixture::new();
    let router = ready_router(&mut fixture);
    let eph = EphemeralStakeAccounts::derive(&key(50), SEED).unwrap();

    let ix = router
        .prefund_withdraw_stake_ix(&params(spl_a(), Pubkey::default(), 1_000_000_000), None)
        .unwrap();
    assert_eq!(ix.data.len(), 13);
    assert_eq!(ix.data[0], RouterInstruction::PrefundWithdrawStake.to_u8());
    assert_eq!(&ix.data[1..9], &1_000_000_000u64.to_le_bytes());
    assert_eq!(&ix.data[9..13], &SEED.to_le_bytes());
    assert_eq!(ix.accounts.len(), 16 + 10);
    assert_eq!(ix.accounts[2].pubkey, eph.bridge_stake);
    assert_eq!(ix.accounts[5].pubkey, eph.slumdog_stake);
    assert_eq!(ix.accounts[15].pubkey, SYSTEM_PROGRAM);
    assert_eq!(ix.accounts[16].pubkey, SPL_STAKE_POOL_PROGRAM);
    // split off the validator the quote picked
    assert_eq!(ix.accounts[20].pubkey, validator_stake(0, &v1()));

    let ix = router
        .prefund_withdraw_stake_ix(&params(spl_a(), Pubkey::default(), 1_000_000_000), Some(&v2()))
        .unwrap();
    assert_eq!(ix.accounts[20].pubkey, validator_stake(0, &v2()));

    let ix = router
        .prefund_withdraw_stake_ix(&params(STSOL_MINT, Pubkey::default(), 1_000_000_000), None)
        .unwrap();
    assert_eq!(ix.accounts.len(), 16 + 10);
    assert_eq!(ix.accounts[16].pubkey, LIDO_PROGRAM);
    assert_eq!(ix.accounts[18].pubkey, v1());
}

#[test]
fn test_prefund_swap_via_stake_ix() {
    let mut fixture = Fixture::new();
    let router = ready_router(&mut fixture);
    let eph = EphemeralStakeAccounts::derive(&key(50), SEED).unwrap();

    let ix = router
        .prefund_swap_via_stake_ix(&params(spl_a(), spl_b(), 1_000_000_000), None)
        .unwrap();
    assert_eq!(ix.data[0], RouterInstruction::PrefundSwapViaStake.to_u8());
    assert_eq!(&ix.data[9..13], &SEED.to_le_bytes());
    assert_eq!(ix.accounts.len(), 19 + 10 + 12);
    assert_eq!(ix.accounts[3].pubkey, eph.bridge_stake);
    assert!(ix.accounts[6].is_writable);
    assert_eq!(ix.accounts[19].pubkey, SPL_STAKE_POOL_PROGRAM);
    assert_eq!(ix.accounts[23].pubkey, validator_stake(0, &v1()));
    assert_eq!(ix.accounts[30].pubkey, spl_pool_init(1).stake_pool);
    assert_eq!(ix.accounts[34].pubkey, validator_stake(1, &v1()));

    let ix = router
        .prefund_swap_via_stake_ix(&params(spl_a(), NATIVE_MINT, 1_000_000_000), None)
        .unwrap();
    assert_eq!(ix.accounts.len(), 19 + 10 + 11);
    assert_eq!(ix.accounts[6].pubkey, NATIVE_MINT);
    assert!(!ix.accounts[6].is_writable);
    assert_eq!(ix.accounts[29].pubkey, UNSTAKE_PROGRAM);
    // the reserve buys the bridge stake
    assert_eq!(
        ix.accounts[33].pubkey,
        find_reserve_stake_acc_record_pda(&eph.bridge_stake).unwrap().0
    );
    assert_ne!(ix.accounts[33].pubkey, eph.slumdog_stake_acc_record);
    // prefix and reserve suffix pay protocol fees to the same vault
    assert_eq!(ix.accounts[15].pubkey, RESERVE_PROTOCOL_FEE_VAULT);
    assert_eq!(ix.accounts[35].pubkey, RESERVE_PROTOCOL_FEE_VAULT);
}

#[test]
fn test_build_errors() {
    let mut fixture = Fixture::new();
    let router = ready_router(&mut fixture);

    let err = router
        .prefund_swap_via_stake_ix(
            &SwapParams {
                bridge_stake_seed: None,
                ..params(spl_a(), spl_b(), 1_000_000_000)
            },
            None,
        )
        .unwrap_err();
    assert_eq!(err.code, RouterErrorCode::Build);

    let err = router
        .deposit_sol_ix(&SwapParams {
            signer_out: None,
            ..params(NATIVE_MINT, spl_a(), 1_000_000)
        })
        .unwrap_err();
    assert_eq!(err.code, RouterErrorCode::Build);

    let err = router
        .prefund_swap_via_stake_ix(&params(spl_a(), spl_c(), 1_000_000_000), None)
        .unwrap_err();
    assert_eq!(err.code, RouterErrorCode::NoRoute);

    let idle = lst_router::StakeRouter::new();
    let err = idle
        .deposit_sol_ix(&params(NATIVE_MINT, spl_a(), 1_000_000))
        .unwrap_err();
    assert_eq!(err.code, RouterErrorCode::NotReady);
}
