//! Mock account creation helpers for router tests.
//!
//! Every helper returns [`AccountRecord`]s laid out byte-for-byte the way the
//! owning program stores them on chain.

use lst_router::{
    accounts::{CLOCK_LEN, STAKE_ACCOUNT_LEN, TOKEN_ACCOUNT_LEN},
    adapters::{
        lido::{ExchangeRate, LidoState, LidoValidator, LidoValidatorList, ListHeader},
        marinade::{MarinadeState, VALIDATOR_RECORD_LEN},
        reserve::{Rational, ReserveFee, ReserveFeeEnum, ReservePool, ReserveProtocolFee},
        spl::{Fee, SplPoolInit, StakePool, VALIDATOR_STAKE_INFO_LEN},
    },
    consts::{
        LIDO_PROGRAM, LIDO_STATE, LIDO_VALIDATOR_LIST, MARINADE_LIQ_POOL_MSOL_LEG,
        MARINADE_PROGRAM, MARINADE_STATE, MARINADE_VALIDATOR_LIST, MSOL_MINT, RESERVE_FEE,
        RESERVE_POOL, RESERVE_POOL_SOL_RESERVES, RESERVE_PROTOCOL_FEE, STAKE_PROGRAM,
        SYSTEM_PROGRAM, SYSVAR_CLOCK, TOKEN_PROGRAM, UNSTAKE_PROGRAM,
    },
    AccountRecord,
};
use solana_program::pubkey::Pubkey;

use super::pda::{key, spl_deposit_auth};

/// Epoch every fixture is current as of
pub const EPOCH: u64 = 100;

/// Prepend the 8-byte anchor discriminator of `name` to a borsh body
fn anchor_account(name: &str, body: Vec<u8>) -> Vec<u8> {
    let hash = const_crypto::sha2::Sha256::new()
        .update(b"account:")
        .update(name.as_bytes())
        .finalize();
    let mut data = hash[..8].to_vec();
    data.extend(body);
    data
}

// ===== Sysvars and native accounts =====

/// Clock sysvar at `epoch`
pub fn clock_account(epoch: u64) -> AccountRecord {
    let mut data = vec![0u8; CLOCK_LEN];
    data[0..8].copy_from_slice(&(epoch * 432_000).to_le_bytes());
    data[16..24].copy_from_slice(&epoch.to_le_bytes());
    AccountRecord::new(SYSVAR_CLOCK, data, Pubkey::default(), 1_169_280)
}

/// Stake account delegated to `vote`
pub fn stake_account(
    pubkey: Pubkey,
    vote: &Pubkey,
    stake: u64,
    activation_epoch: u64,
    lamports: u64,
) -> AccountRecord {
    let mut data = vec![0u8; STAKE_ACCOUNT_LEN];
    // StakeStateV2::Stake
    data[0..4].copy_from_slice(&2u32.to_le_bytes());
    data[124..156].copy_from_slice(vote.as_ref());
    data[156..164].copy_from_slice(&stake.to_le_bytes());
    data[164..172].copy_from_slice(&activation_epoch.to_le_bytes());
    data[172..180].copy_from_slice(&u64::MAX.to_le_bytes());
    AccountRecord::new(pubkey, data, STAKE_PROGRAM, lamports)
}

/// Token account of `mint` holding `amount`
pub fn token_account(pubkey: Pubkey, mint: &Pubkey, amount: u64) -> AccountRecord {
    let mut data = vec![0u8; TOKEN_ACCOUNT_LEN];
    data[0..32].copy_from_slice(mint.as_ref());
    data[64..72].copy_from_slice(&amount.to_le_bytes());
    AccountRecord::new(pubkey, data, TOKEN_PROGRAM, 2_039_280)
}

// ===== Reserve =====

/// Reserve charging a flat `num / denom` unstake fee, holding `sol_reserves`
pub fn reserve_accounts(num: u64, denom: u64, sol_reserves: u64) -> Vec<AccountRecord> {
    let pool = ReservePool {
        lp_mint: key(90).to_bytes(),
        ..Default::default()
    };
    let fee = ReserveFee {
        fee: ReserveFeeEnum::Flat {
            ratio: Rational { num, denom },
        },
    };
    let protocol_fee = ReserveProtocolFee {
        destination: key(91).to_bytes(),
        fee_ratio: Rational { num: 1, denom: 10 },
        ..Default::default()
    };
    vec![
        AccountRecord::new(
            RESERVE_POOL,
            anchor_account("Pool", borsh::to_vec(&pool).unwrap()),
            UNSTAKE_PROGRAM,
            1_000_000,
        ),
        AccountRecord::new(
            RESERVE_FEE,
            anchor_account("Fee", borsh::to_vec(&fee).unwrap()),
            UNSTAKE_PROGRAM,
            1_000_000,
        ),
        AccountRecord::new(
            RESERVE_PROTOCOL_FEE,
            anchor_account("ProtocolFee", borsh::to_vec(&protocol_fee).unwrap()),
            UNSTAKE_PROGRAM,
            1_000_000,
        ),
        AccountRecord::new(RESERVE_POOL_SOL_RESERVES, vec![], SYSTEM_PROGRAM, sol_reserves),
    ]
}

// ===== SPL stake pool =====

/// 1:1 SPL stake pool charging 0.3% on SOL deposits and 0.1% on stake
/// deposits and withdrawals, updated for [`EPOCH`].
pub fn spl_stake_pool(init: &SplPoolInit, mint: &Pubkey) -> StakePool {
    StakePool {
        account_type: 1,
        stake_deposit_authority: spl_deposit_auth(init).to_bytes(),
        validator_list: init.validator_list.to_bytes(),
        reserve_stake: init.reserve_stake.to_bytes(),
        pool_mint: mint.to_bytes(),
        manager_fee_account: key(92).to_bytes(),
        total_lamports: 1_000_000_000_000,
        pool_token_supply: 1_000_000_000_000,
        last_update_epoch: EPOCH,
        sol_deposit_fee: Fee {
            denominator: 1000,
            numerator: 3,
        },
        stake_deposit_fee: Fee {
            denominator: 1000,
            numerator: 1,
        },
        stake_withdrawal_fee: Fee {
            denominator: 1000,
            numerator: 1,
        },
        ..Default::default()
    }
}

/// Validator list with one entry per `(vote, active_stake_lamports)`
pub fn spl_validator_list(pubkey: Pubkey, validators: &[(Pubkey, u64)]) -> AccountRecord {
    let mut data = vec![2u8];
    data.extend_from_slice(&(validators.len() as u32 + 10).to_le_bytes());
    data.extend_from_slice(&(validators.len() as u32).to_le_bytes());
    for (vote, active) in validators {
        let mut entry = [0u8; VALIDATOR_STAKE_INFO_LEN];
        entry[0..8].copy_from_slice(&active.to_le_bytes());
        entry[16..24].copy_from_slice(&EPOCH.to_le_bytes());
        // status: active
        entry[40] = 0;
        entry[41..73].copy_from_slice(vote.as_ref());
        data.extend_from_slice(&entry);
    }
    AccountRecord::new(pubkey, data, lst_router::consts::SPL_STAKE_POOL_PROGRAM, 1_000_000)
}

/// Every init account of an SPL stake pool, except the clock
pub fn spl_pool_accounts(
    init: &SplPoolInit,
    pool: &StakePool,
    validators: &[(Pubkey, u64)],
    reserve_lamports: u64,
) -> Vec<AccountRecord> {
    vec![
        AccountRecord::new(
            init.stake_pool,
            borsh::to_vec(pool).unwrap(),
            init.program,
            1_000_000,
        ),
        spl_validator_list(init.validator_list, validators),
        AccountRecord::new(init.reserve_stake, vec![0u8; STAKE_ACCOUNT_LEN], STAKE_PROGRAM, reserve_lamports),
    ]
}

// ===== Marinade =====

/// Marinade at 1 mSOL = 1.25 SOL with an empty liquidity pool mSOL leg
pub fn marinade_state(validator_count: u32) -> MarinadeState {
    let mut state = MarinadeState {
        msol_mint: MSOL_MINT.to_bytes(),
        msol_supply: 1_000_000_000_000,
        min_deposit: 1_000,
        staking_sol_cap: u64::MAX,
        ..Default::default()
    };
    state.liq_pool.msol_leg = MARINADE_LIQ_POOL_MSOL_LEG.to_bytes();
    state.validator_system.total_active_balance = 1_250_000_000_000;
    state.validator_system.validator_list.account = MARINADE_VALIDATOR_LIST.to_bytes();
    state.validator_system.validator_list.item_size = VALIDATOR_RECORD_LEN as u32;
    state.validator_system.validator_list.count = validator_count;
    state.stake_system.min_stake = 500_000_000;
    state
}

/// Marinade state, validator list and liquidity pool mSOL leg
pub fn marinade_accounts(
    state: &MarinadeState,
    validators: &[Pubkey],
    msol_leg_balance: u64,
) -> Vec<AccountRecord> {
    let mut list = b"validatr".to_vec();
    for vote in validators {
        let mut record = [0u8; VALIDATOR_RECORD_LEN];
        record[0..32].copy_from_slice(vote.as_ref());
        record[32..40].copy_from_slice(&10_000_000_000u64.to_le_bytes());
        list.extend_from_slice(&record);
    }
    vec![
        AccountRecord::new(
            MARINADE_STATE,
            anchor_account("State", borsh::to_vec(state).unwrap()),
            MARINADE_PROGRAM,
            1_000_000,
        ),
        AccountRecord::new(MARINADE_VALIDATOR_LIST, list, MARINADE_PROGRAM, 1_000_000),
        token_account(MARINADE_LIQ_POOL_MSOL_LEG, &MSOL_MINT, msol_leg_balance),
    ]
}

// ===== Lido =====

/// Solido at 1 stSOL = 1.1 SOL, rate computed in [`EPOCH`]
pub fn lido_accounts(validators: &[(Pubkey, u64)]) -> Vec<AccountRecord> {
    let state = LidoState {
        lido_version: 1,
        account_type: 1,
        exchange_rate: ExchangeRate {
            computed_in_epoch: EPOCH,
            st_sol_supply: 1_000_000_000_000,
            sol_balance: 1_100_000_000_000,
        },
        validator_list: LIDO_VALIDATOR_LIST.to_bytes(),
        ..Default::default()
    };
    let list = LidoValidatorList {
        header: ListHeader {
            account_type: 2,
            lido_version: 1,
            max_entries: 60,
        },
        entries: validators
            .iter()
            .map(|(vote, effective)| LidoValidator {
                vote_account_address: vote.to_bytes(),
                effective_stake_balance: *effective,
                stake_accounts_balance: *effective,
                active: true,
                ..Default::default()
            })
            .collect(),
    };
    vec![
        AccountRecord::new(LIDO_STATE, borsh::to_vec(&state).unwrap(), LIDO_PROGRAM, 1_000_000),
        AccountRecord::new(
            LIDO_VALIDATOR_LIST,
            borsh::to_vec(&list).unwrap(),
            LIDO_PROGRAM,
            1_000_000,
        ),
    ]
}
