//! Read-only views over native account layouts: stake accounts, token
//! accounts and the clock sysvar.

use bytemuck::{Pod, Zeroable};
use solana_program::pubkey::Pubkey;

use crate::{
    cache::AccountRecord,
    error::{RouterError, RouterErrorCode},
    quote::{ActiveStakeParams, StakeAccountLamports},
};

fn u64_le(b: [u8; 8]) -> u64 {
    u64::from_le_bytes(b)
}

fn prefix<T: Pod>(record: &AccountRecord, what: &str) -> Result<T, RouterError> {
    record
        .data
        .get(..core::mem::size_of::<T>())
        .and_then(|b| bytemuck::try_pod_read_unaligned(b).ok())
        .ok_or_else(|| RouterError::decode(&record.pubkey, what))
}

// ===== Stake account =====

/// `StakeStateV2` as laid out by the stake program (bincode, 200 bytes).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct StakeAccountLayout {
    tag: [u8; 4],
    rent_exempt_reserve: [u8; 8],
    staker: [u8; 32],
    withdrawer: [u8; 32],
    lockup_unix_timestamp: [u8; 8],
    lockup_epoch: [u8; 8],
    custodian: [u8; 32],
    voter: [u8; 32],
    stake: [u8; 8],
    activation_epoch: [u8; 8],
    deactivation_epoch: [u8; 8],
    warmup_cooldown_rate: [u8; 8],
    credits_observed: [u8; 8],
    stake_flags: u8,
    _padding: [u8; 3],
}

const STAKE_STATE_INITIALIZED: u32 = 1;
const STAKE_STATE_STAKE: u32 = 2;

/// Stake account size.
pub const STAKE_ACCOUNT_LEN: usize = core::mem::size_of::<StakeAccountLayout>();

/// Decoded subset of a stake account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakeAccountView {
    /// Stake authority
    pub staker: Pubkey,
    /// Withdraw authority
    pub withdrawer: Pubkey,
    /// Delegation target, `None` if the account is not delegated
    pub voter: Option<Pubkey>,
    /// Delegated lamports
    pub stake: u64,
    /// Epoch the delegation was activated in
    pub activation_epoch: u64,
    /// Epoch the delegation was deactivated in, `u64::MAX` if never
    pub deactivation_epoch: u64,
    /// Total lamports of the account
    pub lamports: u64,
}

impl StakeAccountView {
    /// Decode a stake account record.
    ///
    /// # Errors
    /// `Decode` if the data is too short or the account is uninitialized.
    pub fn decode(record: &AccountRecord) -> Result<Self, RouterError> {
        let raw: StakeAccountLayout = prefix(record, "stake account")?;
        let tag = u32::from_le_bytes(raw.tag);
        let delegated = match tag {
            STAKE_STATE_INITIALIZED => false,
            STAKE_STATE_STAKE => true,
            _ => return Err(RouterError::decode(&record.pubkey, "stake account")),
        };
        Ok(Self {
            staker: Pubkey::new_from_array(raw.staker),
            withdrawer: Pubkey::new_from_array(raw.withdrawer),
            voter: delegated.then(|| Pubkey::new_from_array(raw.voter)),
            stake: if delegated { u64_le(raw.stake) } else { 0 },
            activation_epoch: if delegated {
                u64_le(raw.activation_epoch)
            } else {
                u64::MAX
            },
            deactivation_epoch: if delegated {
                u64_le(raw.deactivation_epoch)
            } else {
                u64::MAX
            },
            lamports: record.lamports,
        })
    }

    /// Whether the delegation earns yield in `epoch`. Stake activated in
    /// `epoch` itself is still activating and does not count.
    pub fn is_active(&self, epoch: u64) -> bool {
        self.voter.is_some() && self.activation_epoch < epoch && self.deactivation_epoch > epoch
    }

    /// Split the balance into staked and unstaked lamports as of `epoch`.
    ///
    /// # Errors
    /// `Decode` if the delegated stake exceeds the account balance.
    pub fn lamports_at(&self, epoch: u64) -> Result<StakeAccountLamports, RouterError> {
        let staked = if self.is_active(epoch) { self.stake } else { 0 };
        let unstaked = self.lamports.checked_sub(staked).ok_or_else(|| {
            RouterError::new(
                RouterErrorCode::Decode,
                format!(
                    "stake account delegates {staked} lamports but holds {}",
                    self.lamports
                ),
            )
        })?;
        Ok(StakeAccountLamports { staked, unstaked })
    }

    /// Parameters for a stake deposit of this account as of `epoch`.
    ///
    /// # Errors
    /// `Decode` if the account is not delegated or its balances are inconsistent.
    pub fn active_stake_params(&self, epoch: u64) -> Result<ActiveStakeParams, RouterError> {
        let vote = self.voter.ok_or_else(|| {
            RouterError::new(RouterErrorCode::Decode, "stake account is not delegated")
        })?;
        Ok(ActiveStakeParams {
            vote,
            lamports: self.lamports_at(epoch)?,
        })
    }
}

// ===== Token account =====

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct TokenAccountPrefix {
    mint: [u8; 32],
    owner: [u8; 32],
    amount: [u8; 8],
}

/// SPL token account size.
pub const TOKEN_ACCOUNT_LEN: usize = 165;

/// Decoded subset of a token account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenAccountView {
    /// Mint
    pub mint: Pubkey,
    /// Owner
    pub owner: Pubkey,
    /// Balance in atomics
    pub amount: u64,
}

impl TokenAccountView {
    /// Decode a token account record.
    ///
    /// # Errors
    /// `Decode` if the data is shorter than a token account.
    pub fn decode(record: &AccountRecord) -> Result<Self, RouterError> {
        if record.data.len() < TOKEN_ACCOUNT_LEN {
            return Err(RouterError::decode(&record.pubkey, "token account"));
        }
        let raw: TokenAccountPrefix = prefix(record, "token account")?;
        Ok(Self {
            mint: Pubkey::new_from_array(raw.mint),
            owner: Pubkey::new_from_array(raw.owner),
            amount: u64_le(raw.amount),
        })
    }
}

// ===== Clock =====

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ClockLayout {
    slot: [u8; 8],
    epoch_start_timestamp: [u8; 8],
    epoch: [u8; 8],
    leader_schedule_epoch: [u8; 8],
    unix_timestamp: [u8; 8],
}

/// Clock sysvar size.
pub const CLOCK_LEN: usize = core::mem::size_of::<ClockLayout>();

/// Decode the current epoch out of the clock sysvar.
///
/// # Errors
/// `Decode` if the data is too short.
pub fn decode_clock_epoch(record: &AccountRecord) -> Result<u64, RouterError> {
    let raw: ClockLayout = prefix(record, "clock sysvar")?;
    log::trace!("clock slot {} epoch {}", u64_le(raw.slot), u64_le(raw.epoch));
    Ok(u64_le(raw.epoch))
}
