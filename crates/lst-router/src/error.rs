//! Router error types.
//!
//! Every public operation returns a single [`RouterError`] carrying a
//! machine-readable [`RouterErrorCode`] and a human-readable detail string.
//! Protocol-level rejections additionally carry a [`PoolError`] so callers can
//! tell sub-causes apart without parsing the detail text.

use solana_program::pubkey::Pubkey;

/// Router error codes.
#[repr(u32)]
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
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RouterErrorCode {
    /// Account bytes do not match the expected layout
    Decode = 0,
    /// A required account is not in the cache or the fetched batch
    NotFound = 1,
    /// Router has no decoded pool state yet
    NotReady = 2,
    /// Mint was never registered
    UninitializedMint = 3,
    /// Mint is already registered with a different binding
    Conflict = 4,
    /// Protocol rejected the operation
    Pool = 5,
    /// No bridging validator exists for a prefund flow
    NoRoute = 6,
    /// Instruction could not be assembled
    Build = 7,
    /// Pool does not support the requested operation
    Unsupported = 8,
}

impl RouterErrorCode {
    /// Convert to error code
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    /// Create from error code
    pub fn from_u32(code: u32) -> Option<Self> {
        Self::try_from(code).ok()
    }

    /// Stable string name, e.g. `NOT_READY`
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl core::fmt::Display for RouterErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error returned by every router operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {detail}")]
pub struct RouterError {
    /// Machine-readable code
    pub code: RouterErrorCode,
    /// Human-readable detail
    pub detail: String,
    /// Protocol sub-cause, set for [`RouterErrorCode::Pool`]
    pub pool: Option<PoolError>,
}

impl RouterError {
    /// Create an error with the given code and detail.
    pub fn new(code: RouterErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
            pool: None,
        }
    }

    pub(crate) fn decode(account: &Pubkey, what: &str) -> Self {
        Self::new(
            RouterErrorCode::Decode,
            format!("account {account} is not a valid {what}"),
        )
    }

    pub(crate) fn account_missing(account: &Pubkey) -> Self {
        Self::new(
            RouterErrorCode::NotFound,
            format!("account {account} missing"),
        )
    }

    pub(crate) fn uninitialized_mint(mint: &Pubkey) -> Self {
        Self::new(
            RouterErrorCode::UninitializedMint,
            format!("mint {mint} has not been initialized"),
        )
    }

    pub(crate) fn unsupported(op: &str, mint: &Pubkey) -> Self {
        Self::new(
            RouterErrorCode::Unsupported,
            format!("{op} is not supported for mint {mint}"),
        )
    }

    pub(crate) fn invalid_pda(what: &str) -> Self {
        Self::new(RouterErrorCode::Build, format!("no valid PDA for {what}"))
    }
}

impl From<PoolError> for RouterError {
    fn from(e: PoolError) -> Self {
        Self {
            code: RouterErrorCode::Pool,
            detail: e.to_string(),
            pool: Some(e),
        }
    }
}

/// Classification used when searching over several validators: a
/// vote-specific error means another validator of the same pool might still
/// produce a valid quote.
pub trait StakeQuoteError {
    /// Whether the error only concerns the validator involved
    fn is_vote_specific(&self) -> bool;
}

/// Protocol-level rejection, tagged by the protocol that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum PoolError {
    /// SPL stake pool rejection
    #[error("spl stake pool: {0:?}")]
    Spl(SplPoolError),
    /// Marinade rejection
    #[error("marinade: {0:?}")]
    Marinade(MarinadeError),
    /// Lido rejection
    #[error("lido: {0:?}")]
    Lido(LidoError),
    /// Reserve pool rejection
    #[error("reserve: {0:?}")]
    Reserve(ReserveError),
}

impl StakeQuoteError for PoolError {
    fn is_vote_specific(&self) -> bool {
        match self {
            Self::Spl(e) => e.is_vote_specific(),
            Self::Marinade(e) => e.is_vote_specific(),
            Self::Lido(e) => e.is_vote_specific(),
            Self::Reserve(e) => e.is_vote_specific(),
        }
    }
}

/// SPL stake pool error codes, numbered as the on-chain program numbers them.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SplPoolError {
    /// Arithmetic overflow or division by zero
    CalculationFailure = 2,
    /// Stake account withdrawal would leave less than the minimum
    StakeLamportsNotEqualToMinimum = 11,
    /// Pool was not updated this epoch
    StakeListAndPoolOutOfDate = 17,
    /// Vote account is not on the validator list
    ValidatorNotFound = 21,
    /// Pool uses a custom stake deposit authority
    InvalidStakeDepositAuthority = 24,
    /// Deposit does not match the preferred deposit validator
    IncorrectDepositVoteAddress = 26,
    /// Withdrawal does not match the preferred withdraw validator
    IncorrectWithdrawVoteAddress = 27,
    /// Pool uses a custom SOL deposit authority
    InvalidSolDepositAuthority = 29,
    /// Pool uses a custom SOL withdraw authority
    InvalidSolWithdrawAuthority = 30,
    /// Deposit results in zero pool tokens
    DepositTooSmall = 33,
    /// Withdrawal results in zero lamports
    WithdrawalTooSmall = 34,
    /// Reserve cannot cover the SOL withdrawal
    SolWithdrawalTooLarge = 36,
}

impl SplPoolError {
    /// Convert to error code
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    /// Create from error code
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            2 => Some(Self::CalculationFailure),
            11 => Some(Self::StakeLamportsNotEqualToMinimum),
            17 => Some(Self::StakeListAndPoolOutOfDate),
            21 => Some(Self::ValidatorNotFound),
            24 => Some(Self::InvalidStakeDepositAuthority),
            26 => Some(Self::IncorrectDepositVoteAddress),
            27 => Some(Self::IncorrectWithdrawVoteAddress),
            29 => Some(Self::InvalidSolDepositAuthority),
            30 => Some(Self::InvalidSolWithdrawAuthority),
            33 => Some(Self::DepositTooSmall),
            34 => Some(Self::WithdrawalTooSmall),
            36 => Some(Self::SolWithdrawalTooLarge),
            _ => None,
        }
    }
}

impl StakeQuoteError for SplPoolError {
    fn is_vote_specific(&self) -> bool {
        matches!(
            self,
            Self::ValidatorNotFound
                | Self::IncorrectDepositVoteAddress
                | Self::StakeLamportsNotEqualToMinimum
                | Self::IncorrectWithdrawVoteAddress
        )
    }
}

/// Marinade error codes.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarinadeError {
    /// Arithmetic overflow
    CalculationFailure = 0,
    /// Program is paused
    ProgramIsPaused = 1,
    /// Deposit is below the minimum
    DepositAmountIsTooLow = 2,
    /// Deposit would exceed the staking cap
    StakingIsCapped = 3,
    /// Vote account is not a Marinade validator
    WrongValidatorAccountOrIndex = 4,
    /// Delegated stake is below the minimum stake account size
    TooLowDelegationInDepositingStake = 5,
}

impl MarinadeError {
    /// Convert to error code
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    /// Create from error code
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::CalculationFailure),
            1 => Some(Self::ProgramIsPaused),
            2 => Some(Self::DepositAmountIsTooLow),
            3 => Some(Self::StakingIsCapped),
            4 => Some(Self::WrongValidatorAccountOrIndex),
            5 => Some(Self::TooLowDelegationInDepositingStake),
            _ => None,
        }
    }
}

impl StakeQuoteError for MarinadeError {
    fn is_vote_specific(&self) -> bool {
        matches!(self, Self::WrongValidatorAccountOrIndex)
    }
}

/// Lido (Solido) error codes.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LidoError {
    /// Arithmetic overflow or empty supply
    CalculationFailure = 0,
    /// Exchange rate was computed in an older epoch
    ExchangeRateNotUpdatedInThisEpoch = 1,
    /// Withdrawal exceeds the per-validator maximum
    NotEnoughLiquidity = 2,
    /// Withdrawals must come from the validator with the most stake
    ValidatorWithMoreStakeExists = 3,
    /// Validator list is empty
    NoActiveValidators = 4,
}

impl LidoError {
    /// Convert to error code
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    /// Create from error code
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::CalculationFailure),
            1 => Some(Self::ExchangeRateNotUpdatedInThisEpoch),
            2 => Some(Self::NotEnoughLiquidity),
            3 => Some(Self::ValidatorWithMoreStakeExists),
            4 => Some(Self::NoActiveValidators),
            _ => None,
        }
    }
}

impl StakeQuoteError for LidoError {
    fn is_vote_specific(&self) -> bool {
        false
    }
}

/// Reserve pool error codes.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReserveError {
    /// Arithmetic overflow or unsatisfiable search
    InternalError = 0,
    /// Reserves cannot cover the payout
    NotEnoughLiquidity = 1,
}

impl ReserveError {
    /// Convert to error code
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    /// Create from error code
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::InternalError),
            1 => Some(Self::NotEnoughLiquidity),
            _ => None,
        }
    }
}

impl StakeQuoteError for ReserveError {
    fn is_vote_specific(&self) -> bool {
        false
    }
}

impl From<SplPoolError> for PoolError {
    fn from(e: SplPoolError) -> Self {
        Self::Spl(e)
    }
}

impl From<MarinadeError> for PoolError {
    fn from(e: MarinadeError) -> Self {
        Self::Marinade(e)
    }
}

impl From<LidoError> for PoolError {
    fn from(e: LidoError) -> Self {
        Self::Lido(e)
    }
}

impl From<ReserveError> for PoolError {
    fn from(e: ReserveError) -> Self {
        Self::Reserve(e)
    }
}

impl From<SplPoolError> for RouterError {
    fn from(e: SplPoolError) -> Self {
        PoolError::from(e).into()
    }
}

impl From<MarinadeError> for RouterError {
    fn from(e: MarinadeError) -> Self {
        PoolError::from(e).into()
    }
}

impl From<LidoError> for RouterError {
    fn from(e: LidoError) -> Self {
        PoolError::from(e).into()
    }
}

impl From<ReserveError> for RouterError {
    fn from(e: ReserveError) -> Self {
        PoolError::from(e).into()
    }
}
