//! Instruction assembly: router prefix, then the pool suffix(es).

use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::{quoting::decoded, StakeRouter};
use crate::{
    adapters::{LidoAdapter, MarinadeAdapter, PoolAdapter},
    consts::ROUTER_PROGRAM,
    error::RouterError,
    instructions::{
        build_amount_instruction_data, build_deposit_stake_instruction_data,
        build_prefund_instruction_data, deposit_stake_prefix, prefund_swap_via_stake_prefix,
        prefund_withdraw_stake_prefix, required, stake_wrapped_sol_prefix,
        withdraw_wrapped_sol_prefix, RouterInstruction, SwapParams,
    },
    pda::EphemeralStakeAccounts,
    update::PoolUpdateType,
};

fn router_ix(accounts: Vec<AccountMeta>, data: &[u8]) -> Instruction {
    Instruction {
        program_id: ROUTER_PROGRAM,
        accounts,
        data: data.to_vec(),
    }
}

impl StakeRouter {
    /// Suffix splitting a stake account delegated to `vote` off `mint`'s pool.
    fn withdraw_stake_suffix(&self, mint: &Pubkey, vote: &Pubkey) -> Result<Vec<AccountMeta>, RouterError> {
        match self.adapter(mint)? {
            PoolAdapter::Spl(a) => a.withdraw_stake_suffix(decoded(a.state.as_ref(), mint)?, vote),
            PoolAdapter::Lido(a) => {
                LidoAdapter::withdraw_stake_suffix(decoded(a.state.as_ref(), mint)?, vote)
            }
            PoolAdapter::Reserve(_) | PoolAdapter::Marinade(_) => Err(RouterError::unsupported(
                PoolUpdateType::WithdrawStake.into(),
                mint,
            )),
        }
    }

    /// Suffix depositing `stake_account`, delegated to `vote`, into `mint`'s pool.
    fn deposit_stake_suffix(
        &self,
        mint: &Pubkey,
        stake_account: &Pubkey,
        vote: &Pubkey,
    ) -> Result<Vec<AccountMeta>, RouterError> {
        match self.adapter(mint)? {
            PoolAdapter::Spl(a) => a.deposit_stake_suffix(decoded(a.state.as_ref(), mint)?, vote),
            PoolAdapter::Marinade(_) => MarinadeAdapter::deposit_stake_suffix(vote),
            PoolAdapter::Reserve(a) => {
                decoded(a.state.as_ref(), mint)?.deposit_stake_suffix(stake_account)
            }
            PoolAdapter::Lido(_) => Err(RouterError::unsupported(
                PoolUpdateType::DepositStake.into(),
                mint,
            )),
        }
    }

    /// Build a wrapped SOL to `params.out` swap through a SOL deposit.
    ///
    /// # Errors
    /// `Build` on missing params, else as [`StakeRouter::quote_deposit_sol`].
    pub fn deposit_sol_ix(&self, params: &SwapParams) -> Result<Instruction, RouterError> {
        self.check_ready()?;
        let out_mint = required(params.out, "out mint")?;
        let mut accounts = stake_wrapped_sol_prefix(params)?;
        match self.adapter(&out_mint)? {
            PoolAdapter::Spl(a) => {
                accounts.extend(a.deposit_sol_suffix(decoded(a.state.as_ref(), &out_mint)?));
            }
            PoolAdapter::Marinade(a) => {
                accounts.extend(MarinadeAdapter::deposit_sol_suffix(decoded(
                    a.state.as_ref(),
                    &out_mint,
                )?));
            }
            PoolAdapter::Reserve(_) | PoolAdapter::Lido(_) => {
                return Err(RouterError::unsupported(
                    PoolUpdateType::DepositSol.into(),
                    &out_mint,
                ));
            }
        }
        let data = build_amount_instruction_data(RouterInstruction::StakeWrappedSol, params.amount);
        Ok(router_ix(accounts, &data))
    }

    /// Build a `params.inp` to wrapped SOL swap through a SOL withdrawal.
    ///
    /// # Errors
    /// `Build` on missing params, else as [`StakeRouter::quote_withdraw_sol`].
    pub fn withdraw_sol_ix(&self, params: &SwapParams) -> Result<Instruction, RouterError> {
        self.check_ready()?;
        let inp_mint = required(params.inp, "input mint")?;
        let mut accounts = withdraw_wrapped_sol_prefix(params)?;
        match self.adapter(&inp_mint)? {
            PoolAdapter::Spl(a) => {
                accounts.extend(a.withdraw_sol_suffix(decoded(a.state.as_ref(), &inp_mint)?));
            }
            PoolAdapter::Reserve(_) | PoolAdapter::Marinade(_) | PoolAdapter::Lido(_) => {
                return Err(RouterError::unsupported(
                    PoolUpdateType::WithdrawSol.into(),
                    &inp_mint,
                ));
            }
        }
        let data =
            build_amount_instruction_data(RouterInstruction::WithdrawWrappedSol, params.amount);
        Ok(router_ix(accounts, &data))
    }

    /// Build a deposit of the stake account `params.signer_inp`, delegated to
    /// `vote`, for `params.out`.
    ///
    /// # Errors
    /// `Build` on missing params or underivable accounts, else as
    /// [`StakeRouter::quote_deposit_stake`].
    pub fn deposit_stake_ix(&self, params: &SwapParams, vote: &Pubkey) -> Result<Instruction, RouterError> {
        self.check_ready()?;
        let out_mint = required(params.out, "out mint")?;
        let stake_account = required(params.signer_inp, "stake account")?;
        let mut accounts = deposit_stake_prefix(params)?;
        accounts.extend(self.deposit_stake_suffix(&out_mint, &stake_account, vote)?);
        Ok(router_ix(accounts, &build_deposit_stake_instruction_data()))
    }

    /// Build a prefunded withdrawal of `params.amount` of `params.inp` into the
    /// bridge stake account of `params.signer`. The validator is the one
    /// [`StakeRouter::quote_prefund_withdraw_stake`] picks for `vote`.
    ///
    /// # Errors
    /// `Build` on missing params or underivable accounts, else as
    /// [`StakeRouter::quote_prefund_withdraw_stake`].
    pub fn prefund_withdraw_stake_ix(
        &self,
        params: &SwapParams,
        vote: Option<&Pubkey>,
    ) -> Result<Instruction, RouterError> {
        let inp_mint = required(params.inp, "input mint")?;
        let seed = required(params.bridge_stake_seed, "bridge stake seed")?;
        let eph = EphemeralStakeAccounts::derive(&required(params.signer, "signer")?, seed)?;
        let quote = self.quote_prefund_withdraw_stake(&inp_mint, params.amount, vote)?;

        let mut accounts = prefund_withdraw_stake_prefix(params, &eph)?;
        accounts.extend(self.withdraw_stake_suffix(&inp_mint, &quote.quote.out.vote)?);
        let data = build_prefund_instruction_data(
            RouterInstruction::PrefundWithdrawStake,
            params.amount,
            seed,
        );
        Ok(router_ix(accounts, &data))
    }

    /// Build a prefunded swap of `params.amount` of `params.inp` for
    /// `params.out` via the bridge stake account of `params.signer`, bridging
    /// through the validator [`StakeRouter::quote_prefund_swap_via_stake`] picks.
    ///
    /// # Errors
    /// `Build` on missing params or underivable accounts, else as
    /// [`StakeRouter::quote_prefund_swap_via_stake`].
    pub fn prefund_swap_via_stake_ix(
        &self,
        params: &SwapParams,
        bridge_vote: Option<&Pubkey>,
    ) -> Result<Instruction, RouterError> {
        let inp_mint = required(params.inp, "input mint")?;
        let out_mint = required(params.out, "out mint")?;
        let seed = required(params.bridge_stake_seed, "bridge stake seed")?;
        let eph = EphemeralStakeAccounts::derive(&required(params.signer, "signer")?, seed)?;
        let quote =
            self.quote_prefund_swap_via_stake(&inp_mint, &out_mint, params.amount, bridge_vote)?;
        let vote = quote.quote.quote.bridge_vote;

        let mut accounts = prefund_swap_via_stake_prefix(params, &eph)?;
        accounts.extend(self.withdraw_stake_suffix(&inp_mint, &vote)?);
        accounts.extend(self.deposit_stake_suffix(&out_mint, &eph.bridge_stake, &vote)?);
        log::debug!("built prefund swap {inp_mint} -> {out_mint} with {} accounts", accounts.len());
        let data =
            build_prefund_instruction_data(RouterInstruction::PrefundSwapViaStake, params.amount, seed);
        Ok(router_ix(accounts, &data))
    }
}
