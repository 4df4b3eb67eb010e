//! Router program instructions.
//!
//! Every swap instruction is a fixed router prefix followed by the suffix of
//! the pool(s) it routes through. Account order is part of the on-chain ABI.
//!
//! # Data layouts
//! ```text
//!   StakeWrappedSol, WithdrawWrappedSol      [op: u8, amount: u64 LE]                     9 bytes
//!   PrefundWithdrawStake, PrefundSwapViaStake [op: u8, amount: u64 LE, seed: u32 LE]      13 bytes
//!   DepositStake                              [op: u8]                                    1 byte
//! ```

mod prefix;

pub use prefix::*;

use serde::{Deserialize, Serialize};
use solana_program::{instruction::AccountMeta, pubkey::Pubkey};

use crate::error::{RouterError, RouterErrorCode};

// ============================================================================
// Opcodes
// ============================================================================

/// Router program instruction discriminators.
#[repr(u8)]
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    num_enum::IntoPrimitive,
    num_enum::TryFromPrimitive,
    strum::IntoStaticStr,
)]
pub enum RouterInstruction {
    /// Wrapped SOL in, LST out via a SOL deposit
    StakeWrappedSol = 0,
    /// Unprefunded stake swap, not built by this crate
    SwapViaStake = 1,
    /// Admin: create a router fee token account
    CreateFeeTokenAccount = 2,
    /// Admin: close a router fee token account
    CloseFeeTokenAccount = 3,
    /// Admin: sweep collected fees
    WithdrawFees = 4,
    /// Stake account in, LST out
    DepositStake = 5,
    /// LST in, prefunded stake account out
    PrefundWithdrawStake = 6,
    /// LST in, LST out via a prefunded bridge stake account
    PrefundSwapViaStake = 7,
    /// LST in, wrapped SOL out via a SOL withdrawal
    WithdrawWrappedSol = 8,
}

impl RouterInstruction {
    /// Convert to u8 discriminator
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse the discriminator of raw instruction data.
    pub fn parse(data: &[u8]) -> Option<Self> {
        data.first().and_then(|b| Self::try_from(*b).ok())
    }
}

// ============================================================================
// Instruction data
// ============================================================================

/// `[op, amount]` data of the amount-only instructions.
pub fn build_amount_instruction_data(ix: RouterInstruction, amount: u64) -> [u8; 9] {
    let mut data = [0u8; 9];
    data[0] = ix.to_u8();
    data[1..9].copy_from_slice(&amount.to_le_bytes());
    data
}

/// `[op, amount, bridge_stake_seed]` data of the prefund instructions.
pub fn build_prefund_instruction_data(
    ix: RouterInstruction,
    amount: u64,
    bridge_stake_seed: u32,
) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0] = ix.to_u8();
    data[1..9].copy_from_slice(&amount.to_le_bytes());
    data[9..13].copy_from_slice(&bridge_stake_seed.to_le_bytes());
    data
}

/// Data of [`RouterInstruction::DepositStake`], which takes no arguments.
pub const fn build_deposit_stake_instruction_data() -> [u8; 1] {
    [RouterInstruction::DepositStake.to_u8()]
}

// ============================================================================
// Account roles
// ============================================================================

/// Signer/writable flags of an instruction account.
#[repr(u8)]
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    num_enum::IntoPrimitive,
    num_enum::TryFromPrimitive,
)]
#[serde(rename_all = "camelCase")]
pub enum AccountRole {
    /// Neither signer nor writable
    Readonly = 0,
    /// Writable, not signer
    Writable = 1,
    /// Signer, not writable
    ReadonlySigner = 2,
    /// Signer and writable
    WritableSigner = 3,
}

impl AccountRole {
    /// Role with the given flags.
    pub const fn new(is_signer: bool, is_writable: bool) -> Self {
        match (is_signer, is_writable) {
            (false, false) => Self::Readonly,
            (false, true) => Self::Writable,
            (true, false) => Self::ReadonlySigner,
            (true, true) => Self::WritableSigner,
        }
    }

    /// Whether the account signs.
    pub const fn is_signer(self) -> bool {
        matches!(self, Self::ReadonlySigner | Self::WritableSigner)
    }

    /// Whether the account is written.
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::Writable | Self::WritableSigner)
    }

    /// `pubkey` with this role.
    pub fn meta(self, pubkey: Pubkey) -> AccountMeta {
        AccountMeta {
            pubkey,
            is_signer: self.is_signer(),
            is_writable: self.is_writable(),
        }
    }
}

impl From<&AccountMeta> for AccountRole {
    fn from(meta: &AccountMeta) -> Self {
        Self::new(meta.is_signer, meta.is_writable)
    }
}

/// Require a caller-supplied account.
pub(crate) fn required<T>(value: Option<T>, name: &str) -> Result<T, RouterError> {
    value.ok_or_else(|| {
        RouterError::new(RouterErrorCode::Build, format!("missing account {name}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcodes() {
        assert_eq!(RouterInstruction::StakeWrappedSol.to_u8(), 0);
        assert_eq!(RouterInstruction::DepositStake.to_u8(), 5);
        assert_eq!(RouterInstruction::WithdrawWrappedSol.to_u8(), 8);
        assert_eq!(
            RouterInstruction::parse(&[7, 1, 2]),
            Some(RouterInstruction::PrefundSwapViaStake)
        );
        assert_eq!(RouterInstruction::parse(&[9]), None);
        assert_eq!(RouterInstruction::parse(&[]), None);
    }

    #[test]
    fn test_instruction_data_layouts() {
        let data = build_amount_instruction_data(RouterInstruction::WithdrawWrappedSol, 0x0102);
        assert_eq!(data, [8, 2, 1, 0, 0, 0, 0, 0, 0]);

        let data =
            build_prefund_instruction_data(RouterInstruction::PrefundWithdrawStake, 1, 0xAABB);
        assert_eq!(data[0], 6);
        assert_eq!(&data[1..9], &1u64.to_le_bytes());
        assert_eq!(&data[9..13], &[0xBB, 0xAA, 0, 0]);

        assert_eq!(build_deposit_stake_instruction_data(), [5]);
    }

    #[test]
    fn test_account_roles() {
        let pk = Pubkey::new_unique();
        for role in [
            AccountRole::Readonly,
            AccountRole::Writable,
            AccountRole::ReadonlySigner,
            AccountRole::WritableSigner,
        ] {
            assert_eq!(AccountRole::from(&role.meta(pk)), role);
        }
        assert_eq!(AccountRole::from(&AccountMeta::new(pk, true)), AccountRole::WritableSigner);
        assert_eq!(
            AccountRole::from(&AccountMeta::new_readonly(pk, false)),
            AccountRole::Readonly
        );
        assert_eq!(u8::from(AccountRole::ReadonlySigner), 2);
        assert_eq!(AccountRole::try_from(3u8).unwrap(), AccountRole::WritableSigner);
    }
}
