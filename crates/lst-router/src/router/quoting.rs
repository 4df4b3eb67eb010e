//! Quote dispatch over registered pools.

use solana_program::pubkey::Pubkey;

use super::StakeRouter;
use crate::{
    adapters::{
        lido::LidoPool, marinade::MarinadePool, spl::SplPool, DepositSolQuoter,
        DepositStakeQuoter, PoolAdapter, PrefundError, ReserveState, WithdrawSolQuoter,
        WithdrawStakeQuoter,
    },
    consts::NATIVE_MINT,
    error::{PoolError, RouterError, RouterErrorCode, StakeQuoteError},
    quote::{
        ActiveStakeParams, DepositStakeQuote, Prefund, SwapViaStakeQuote, TokenQuote,
        WithRouterFee, WithdrawStakeQuote,
    },
    update::PoolUpdateType,
};

/// A pool stake can be withdrawn from.
#[derive(Clone, Copy, Debug)]
pub(crate) enum StakeSource<'a> {
    Spl(&'a SplPool),
    Lido(&'a LidoPool),
}

impl StakeSource<'_> {
    /// Validators to try, in order, when the caller does not pick one.
    fn candidates(&self) -> Vec<Pubkey> {
        match self {
            Self::Spl(p) => p.withdraw_candidates(),
            Self::Lido(p) => p.max_validator().map(|v| v.vote()).into_iter().collect(),
        }
    }
}

impl WithdrawStakeQuoter for StakeSource<'_> {
    type Error = PoolError;

    fn quote_withdraw_stake(
        &self,
        tokens: u64,
        vote: Option<&Pubkey>,
    ) -> Result<WithdrawStakeQuote, PoolError> {
        match self {
            Self::Spl(p) => p.quote_withdraw_stake(tokens, vote).map_err(Into::into),
            Self::Lido(p) => p.quote_withdraw_stake(tokens, vote).map_err(Into::into),
        }
    }
}

/// A pool stake can be deposited into.
#[derive(Clone, Copy, Debug)]
pub(crate) enum StakeSink<'a> {
    Spl(&'a SplPool),
    Marinade(&'a MarinadePool),
    Reserve(ReserveState),
}

impl DepositStakeQuoter for StakeSink<'_> {
    type Error = PoolError;

    fn quote_deposit_stake(&self, stake: ActiveStakeParams) -> Result<DepositStakeQuote, PoolError> {
        match self {
            Self::Spl(p) => p.quote_deposit_stake(stake).map_err(Into::into),
            Self::Marinade(p) => p.quote_deposit_stake(stake).map_err(Into::into),
            Self::Reserve(r) => r.quote_deposit_stake(stake).map_err(Into::into),
        }
    }
}

pub(super) fn decoded<'a, T>(state: Option<&'a T>, mint: &Pubkey) -> Result<&'a T, RouterError> {
    state.ok_or_else(|| {
        RouterError::new(
            RouterErrorCode::NotReady,
            format!("pool of mint {mint} has not been fetched"),
        )
    })
}

impl StakeRouter {
    pub(super) fn adapter(&self, mint: &Pubkey) -> Result<&PoolAdapter, RouterError> {
        Ok(&self.registry.resolve(mint)?.adapter)
    }

    pub(crate) fn reserve_state(&self) -> Result<&ReserveState, RouterError> {
        match self.adapter(&NATIVE_MINT)? {
            PoolAdapter::Reserve(a) => decoded(a.state.as_ref(), &NATIVE_MINT),
            _ => Err(RouterError::unsupported("DepositStake", &NATIVE_MINT)),
        }
    }

    pub(crate) fn stake_source(&self, mint: &Pubkey) -> Result<StakeSource<'_>, RouterError> {
        match self.adapter(mint)? {
            PoolAdapter::Spl(a) => Ok(StakeSource::Spl(decoded(a.state.as_ref(), mint)?)),
            PoolAdapter::Lido(a) => Ok(StakeSource::Lido(decoded(a.state.as_ref(), mint)?)),
            PoolAdapter::Reserve(_) | PoolAdapter::Marinade(_) => Err(RouterError::unsupported(
                PoolUpdateType::WithdrawStake.into(),
                mint,
            )),
        }
    }

    /// `after_prefund` selects the reserve as it will be once the prefund
    /// flash loan has been taken out of it.
    pub(crate) fn stake_sink(
        &self,
        mint: &Pubkey,
        after_prefund: bool,
    ) -> Result<StakeSink<'_>, RouterError> {
        match self.adapter(mint)? {
            PoolAdapter::Spl(a) => Ok(StakeSink::Spl(decoded(a.state.as_ref(), mint)?)),
            PoolAdapter::Marinade(a) => Ok(StakeSink::Marinade(decoded(a.state.as_ref(), mint)?)),
            PoolAdapter::Reserve(a) => {
                let reserve = decoded(a.state.as_ref(), mint)?;
                Ok(StakeSink::Reserve(if after_prefund {
                    reserve.after_prefund()?
                } else {
                    *reserve
                }))
            }
            PoolAdapter::Lido(_) => Err(RouterError::unsupported(
                PoolUpdateType::DepositStake.into(),
                mint,
            )),
        }
    }

    // ===== Single hop =====

    /// Quote depositing `lamports` of SOL for `out_mint`. No router fee.
    ///
    /// # Errors
    /// `NotReady`, `UninitializedMint`, `Unsupported` or `Pool`.
    pub fn quote_deposit_sol(&self, out_mint: &Pubkey, lamports: u64) -> Result<TokenQuote, RouterError> {
        self.check_ready()?;
        let quote = match self.adapter(out_mint)? {
            PoolAdapter::Spl(a) => decoded(a.state.as_ref(), out_mint)?.quote_deposit_sol(lamports)?,
            PoolAdapter::Marinade(a) => {
                decoded(a.state.as_ref(), out_mint)?.quote_deposit_sol(lamports)?
            }
            PoolAdapter::Reserve(_) | PoolAdapter::Lido(_) => {
                return Err(RouterError::unsupported(
                    PoolUpdateType::DepositSol.into(),
                    out_mint,
                ));
            }
        };
        log::trace!("deposit sol {lamports} -> {} of {out_mint}", quote.out);
        Ok(quote)
    }

    /// Quote redeeming `tokens` of `inp_mint` for SOL, router fee taken in
    /// lamports.
    ///
    /// # Errors
    /// `NotReady`, `UninitializedMint`, `Unsupported` or `Pool`.
    pub fn quote_withdraw_sol(
        &self,
        inp_mint: &Pubkey,
        tokens: u64,
    ) -> Result<WithRouterFee<TokenQuote>, RouterError> {
        self.check_ready()?;
        let quote = match self.adapter(inp_mint)? {
            PoolAdapter::Spl(a) => decoded(a.state.as_ref(), inp_mint)?.quote_withdraw_sol(tokens)?,
            PoolAdapter::Reserve(_) | PoolAdapter::Marinade(_) | PoolAdapter::Lido(_) => {
                return Err(RouterError::unsupported(
                    PoolUpdateType::WithdrawSol.into(),
                    inp_mint,
                ));
            }
        };
        Ok(quote.with_router_fee(self.fees.withdraw_sol_fee(quote.out)))
    }

    /// Quote depositing the stake account described by `stake` for `out_mint`.
    ///
    /// # Errors
    /// `NotReady`, `UninitializedMint`, `Unsupported` or `Pool`.
    pub fn quote_deposit_stake(
        &self,
        out_mint: &Pubkey,
        stake: ActiveStakeParams,
    ) -> Result<WithRouterFee<DepositStakeQuote>, RouterError> {
        self.check_ready()?;
        let quote = self.stake_sink(out_mint, false)?.quote_deposit_stake(stake)?;
        Ok(quote.with_router_fee(self.fees.deposit_stake_fee(out_mint, quote.out)))
    }

    /// Quote redeeming `tokens` of `inp_mint` for a stake account, from `vote`
    /// or from the validator the pool picks.
    ///
    /// # Errors
    /// `NotReady`, `UninitializedMint`, `Unsupported` or `Pool`.
    pub fn quote_withdraw_stake(
        &self,
        inp_mint: &Pubkey,
        tokens: u64,
        vote: Option<&Pubkey>,
    ) -> Result<WithdrawStakeQuote, RouterError> {
        self.check_ready()?;
        Ok(self
            .stake_source(inp_mint)?
            .quote_withdraw_stake(tokens, vote)?)
    }

    // ===== Prefund flows =====

    /// Quote redeeming `tokens` of `inp_mint` for a rent-exempt stake account
    /// funded by the prefund flash loan.
    ///
    /// # Errors
    /// `NotReady`, `UninitializedMint` (including for wrapped SOL, whose
    /// reserve repays the loan), `Unsupported` or `Pool`.
    pub fn quote_prefund_withdraw_stake(
        &self,
        inp_mint: &Pubkey,
        tokens: u64,
        vote: Option<&Pubkey>,
    ) -> Result<Prefund<WithdrawStakeQuote>, RouterError> {
        self.check_ready()?;
        let reserve = self.reserve_state()?;
        Ok(self
            .stake_source(inp_mint)?
            .quote_prefund_withdraw_stake(tokens, vote, reserve)?)
    }

    /// Quote swapping `tokens` of `inp_mint` for `out_mint` by withdrawing a
    /// prefunded bridge stake account and depositing it into the output pool.
    ///
    /// Without `bridge_vote`, the input pool's withdraw candidates are tried
    /// in order and the first validator both pools accept wins. With
    /// `bridge_vote`, only that validator is tried and its error surfaces.
    ///
    /// # Errors
    /// `NoRoute` if no candidate works, `Pool` on a non-validator-specific
    /// withdrawal failure or any failure against `bridge_vote`, plus the
    /// errors of [`Self::quote_prefund_withdraw_stake`].
    pub fn quote_prefund_swap_via_stake(
        &self,
        inp_mint: &Pubkey,
        out_mint: &Pubkey,
        tokens: u64,
        bridge_vote: Option<&Pubkey>,
    ) -> Result<Prefund<WithRouterFee<SwapViaStakeQuote>>, RouterError> {
        self.check_ready()?;
        let reserve = self.reserve_state()?;
        let source = self.stake_source(inp_mint)?;
        let sink = self.stake_sink(out_mint, *out_mint == NATIVE_MINT)?;

        let candidates = match bridge_vote {
            Some(vote) => vec![*vote],
            None => source.candidates(),
        };
        for vote in &candidates {
            let withdraw = match source.quote_prefund_withdraw_stake(tokens, Some(vote), reserve) {
                Ok(q) => q,
                Err(PrefundError::Pool(e)) if bridge_vote.is_none() && e.is_vote_specific() => {
                    log::warn!("skipping bridge validator {vote}: {e}");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let deposit = match sink.quote_deposit_stake(withdraw.quote.out) {
                Ok(q) => q,
                Err(e) if bridge_vote.is_none() => {
                    log::warn!("skipping bridge validator {vote}: {e}");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let WithRouterFee { quote, router_fee } =
                deposit.with_router_fee(self.fees.deposit_stake_fee(out_mint, deposit.out));
            log::debug!("bridging {inp_mint} -> {out_mint} via {vote}");
            return Ok(Prefund {
                quote: WithRouterFee {
                    quote: SwapViaStakeQuote {
                        inp: withdraw.quote.inp,
                        out: quote.out,
                        inp_fee: withdraw.quote.fee,
                        out_fee: quote.fee,
                        bridge_vote: *vote,
                    },
                    router_fee,
                },
                prefund_fee: withdraw.prefund_fee,
            });
        }
        Err(RouterError::new(
            RouterErrorCode::NoRoute,
            format!(
                "no bridge validator between {inp_mint} and {out_mint} among {} candidates",
                candidates.len()
            ),
        ))
    }
}
