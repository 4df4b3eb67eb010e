//! Mint registry: which adapter is responsible for which mint.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::{
    adapters::{
        spl::SplPoolInit, LidoAdapter, MarinadeAdapter, PoolAdapter, ReserveAdapter, SplAdapter,
    },
    consts::{MSOL_MINT, NATIVE_MINT, STSOL_MINT},
    error::{RouterError, RouterErrorCode},
    update::PoolUpdate,
};

/// Pool data for a mint that is not one of the well-known mints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PoolInit {
    /// SPL stake pool
    Spl(SplPoolInit),
}

/// A mint to register, with its pool data if it is not well-known.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitMint {
    /// Mint
    pub mint: Pubkey,
    /// Pool data, `None` for well-known mints
    pub init: Option<PoolInit>,
}

impl InitMint {
    /// A well-known mint.
    pub const fn well_known(mint: Pubkey) -> Self {
        Self { mint, init: None }
    }

    /// An SPL stake pool mint.
    pub const fn spl(mint: Pubkey, init: SplPoolInit) -> Self {
        Self {
            mint,
            init: Some(PoolInit::Spl(init)),
        }
    }
}

/// What a mint is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolBinding {
    /// The reserve, for wrapped SOL
    Reserve,
    /// Marinade, for mSOL
    Marinade,
    /// Lido, for stSOL
    Lido,
    /// An SPL stake pool
    Spl(SplPoolInit),
}

impl PoolBinding {
    /// Resolve the binding of `init`.
    ///
    /// # Errors
    /// `Conflict` if a well-known mint comes with pool data,
    /// `UninitializedMint` if any other mint comes without.
    pub fn resolve(init: &InitMint) -> Result<Self, RouterError> {
        let well_known = if init.mint == NATIVE_MINT {
            Some(Self::Reserve)
        } else if init.mint == MSOL_MINT {
            Some(Self::Marinade)
        } else if init.mint == STSOL_MINT {
            Some(Self::Lido)
        } else {
            None
        };
        match (well_known, init.init) {
            (Some(binding), None) => Ok(binding),
            (Some(_), Some(_)) => Err(RouterError::new(
                RouterErrorCode::Conflict,
                format!("mint {} is bound to a built-in pool", init.mint),
            )),
            (None, Some(PoolInit::Spl(spl))) => Ok(Self::Spl(spl)),
            (None, None) => Err(RouterError::uninitialized_mint(&init.mint)),
        }
    }

    /// Every account needed to decode the bound pool from scratch.
    pub fn init_accounts(&self) -> Vec<Pubkey> {
        match self {
            Self::Reserve => ReserveAdapter::init_accounts().to_vec(),
            Self::Marinade => MarinadeAdapter::init_accounts().to_vec(),
            Self::Lido => LidoAdapter::init_accounts().to_vec(),
            Self::Spl(init) => init.init_accounts().to_vec(),
        }
    }

    fn adapter(&self) -> Result<PoolAdapter, RouterError> {
        Ok(match self {
            Self::Reserve => PoolAdapter::Reserve(ReserveAdapter::default()),
            Self::Marinade => PoolAdapter::Marinade(MarinadeAdapter::default()),
            Self::Lido => PoolAdapter::Lido(LidoAdapter::default()),
            Self::Spl(init) => PoolAdapter::Spl(SplAdapter::new(*init)?),
        })
    }
}

/// A registered mint.
#[derive(Clone, Debug, PartialEq)]
pub struct RegistryEntry {
    /// Binding the mint was registered with
    pub binding: PoolBinding,
    /// Adapter, with its decoded state if any
    pub adapter: PoolAdapter,
}

/// Map of mint to adapter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MintRegistry {
    entries: HashMap<Pubkey, RegistryEntry>,
}

impl MintRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `mint`. Registering the same binding again is a no-op and
    /// keeps any decoded state.
    ///
    /// # Errors
    /// `Conflict` if the mint is registered with a different binding, `Build`
    /// if the pool's authorities cannot be derived.
    pub fn register(&mut self, mint: Pubkey, binding: PoolBinding) -> Result<(), RouterError> {
        if let Some(existing) = self.entries.get(&mint) {
            if existing.binding == binding {
                return Ok(());
            }
            return Err(RouterError::new(
                RouterErrorCode::Conflict,
                format!("mint {mint} is already registered with a different pool"),
            ));
        }
        let adapter = binding.adapter()?;
        log::debug!("registered mint {mint} as {:?}", adapter.kind());
        self.entries.insert(mint, RegistryEntry { binding, adapter });
        Ok(())
    }

    /// Look up `mint`.
    ///
    /// # Errors
    /// `UninitializedMint` if it was never registered.
    pub fn resolve(&self, mint: &Pubkey) -> Result<&RegistryEntry, RouterError> {
        self.entries
            .get(mint)
            .ok_or_else(|| RouterError::uninitialized_mint(mint))
    }

    /// Whether `mint` is registered.
    pub fn contains(&self, mint: &Pubkey) -> bool {
        self.entries.contains_key(mint)
    }

    /// Registered mints.
    pub fn mints(&self) -> impl Iterator<Item = &Pubkey> {
        self.entries.keys()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = (&Pubkey, &mut RegistryEntry)> {
        self.entries.iter_mut()
    }

    /// Whether any registered pool has decoded state.
    pub fn any_decoded(&self) -> bool {
        self.entries.values().any(|e| e.adapter.is_decoded())
    }

    /// Accounts needed to decode `mints` from scratch, sorted and deduplicated.
    ///
    /// # Errors
    /// `UninitializedMint` if a mint was never registered.
    pub fn accounts_required_for_init<'a>(
        &self,
        mints: impl IntoIterator<Item = &'a Pubkey>,
    ) -> Result<Vec<Pubkey>, RouterError> {
        let mut accounts = Vec::new();
        for mint in mints {
            accounts.extend(self.resolve(mint)?.adapter.init_accounts());
        }
        accounts.sort();
        accounts.dedup();
        Ok(accounts)
    }

    /// Accounts to refresh before quoting `updates`, sorted and deduplicated.
    ///
    /// # Errors
    /// `UninitializedMint` if a mint was never registered, `Unsupported` if a
    /// pool does not support the operation.
    pub fn accounts_required_for_update(
        &self,
        updates: &[PoolUpdate],
    ) -> Result<Vec<Pubkey>, RouterError> {
        let mut accounts = Vec::new();
        for PoolUpdate { mint, ty } in updates {
            accounts.extend(self.resolve(mint)?.adapter.update_accounts(mint, *ty)?);
        }
        accounts.sort();
        accounts.dedup();
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{consts::SPL_STAKE_POOL_PROGRAM, update::PoolUpdateType};

    fn spl_init() -> SplPoolInit {
        SplPoolInit {
            stake_pool: Pubkey::new_unique(),
            program: SPL_STAKE_POOL_PROGRAM,
            validator_list: Pubkey::new_unique(),
            reserve_stake: Pubkey::new_unique(),
        }
    }

    #[test]
    fn test_well_known_bindings() {
        assert_eq!(
            PoolBinding::resolve(&InitMint::well_known(NATIVE_MINT)).unwrap(),
            PoolBinding::Reserve
        );
        assert_eq!(
            PoolBinding::resolve(&InitMint::well_known(MSOL_MINT)).unwrap(),
            PoolBinding::Marinade
        );
        let err = PoolBinding::resolve(&InitMint::spl(STSOL_MINT, spl_init())).unwrap_err();
        assert_eq!(err.code, RouterErrorCode::Conflict);
        let err = PoolBinding::resolve(&InitMint::well_known(Pubkey::new_unique())).unwrap_err();
        assert_eq!(err.code, RouterErrorCode::UninitializedMint);
    }

    #[test]
    fn test_register_idempotent_and_conflict() {
        let mint = Pubkey::new_unique();
        let init = spl_init();
        let mut registry = MintRegistry::new();
        registry.register(mint, PoolBinding::Spl(init)).unwrap();
        let snapshot = registry.clone();
        registry.register(mint, PoolBinding::Spl(init)).unwrap();
        assert_eq!(registry, snapshot);

        let err = registry
            .register(mint, PoolBinding::Spl(spl_init()))
            .unwrap_err();
        assert_eq!(err.code, RouterErrorCode::Conflict);
    }

    #[test]
    fn test_resolve_unregistered() {
        let registry = MintRegistry::new();
        let err = registry.resolve(&Pubkey::new_unique()).unwrap_err();
        assert_eq!(err.code, RouterErrorCode::UninitializedMint);
    }

    #[test]
    fn test_account_sets_sorted_and_minimal() {
        let mint = Pubkey::new_unique();
        let init = spl_init();
        let mut registry = MintRegistry::new();
        registry.register(mint, PoolBinding::Spl(init)).unwrap();
        registry.register(NATIVE_MINT, PoolBinding::Reserve).unwrap();

        let all = registry
            .accounts_required_for_init([&mint, &NATIVE_MINT])
            .unwrap();
        assert_eq!(all.len(), 8);
        assert!(all.windows(2).all(|w| w[0] < w[1]));

        let upd = registry
            .accounts_required_for_update(&[PoolUpdate {
                mint,
                ty: PoolUpdateType::DepositSol,
            }])
            .unwrap();
        assert_eq!(upd.len(), 2);
        assert!(upd.iter().all(|a| all.contains(a)));

        let err = registry
            .accounts_required_for_update(&[PoolUpdate {
                mint: NATIVE_MINT,
                ty: PoolUpdateType::WithdrawSol,
            }])
            .unwrap_err();
        assert_eq!(err.code, RouterErrorCode::Unsupported);
    }
}
