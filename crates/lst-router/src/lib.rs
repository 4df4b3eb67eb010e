//! LST Router
//!
//! Quotes and builds swap instructions between SOL, wrapped SOL and liquid
//! staking tokens across the SPL stake pool, Marinade, Lido and reserve
//! protocols, routed through a single on-chain router program.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         StakeRouter                            │
//! │  • init / apply_fetched / apply_update state machine           │
//! │  • router fee on top of protocol fees                          │
//! │  • prefund flows (bridge + slumdog stake accounts)             │
//! └───────────────────────────────────────────────────────────────┘
//!          │                    │                     │
//!          ▼                    ▼                     ▼
//! ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────┐
//! │  MintRegistry   │  │  AccountCache   │  │    instructions     │
//! │  mint → adapter │  │  raw accounts   │  │  prefix + suffixes  │
//! └─────────────────┘  └─────────────────┘  └─────────────────────┘
//!          │
//!          ▼
//! ┌────────────┐ ┌────────────┐ ┌────────────┐ ┌────────────┐
//! │  reserve   │ │  marinade  │ │    lido    │ │    spl     │
//! └────────────┘ └────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! The router performs no I/O. A caller asks which accounts to fetch, fetches
//! them however it likes, and feeds the records back:
//!
//! ```text
//! init(mints) → accounts_to_fetch_for_init → fetch → apply_fetched   (once)
//! accounts_to_fetch_for_update(swaps) → fetch → apply_update         (per quote window)
//! quote_* / *_ix                                                      (pure)
//! ```
//!
//! # Fees
//!
//! ```text
//! router_fee = max(min_router_fee, out × bps / 10_000), capped at out
//! ```
//!
//! Protocol fees are charged first. The router fee is charged on the protocol's
//! output. Prefund flows additionally pay `prefund_fee` lamports out of the
//! withdrawn stake to repay the flash loan that funds the bridge account's rent.
//!
//! # Modules
//!
//! - [`router`]: The [`StakeRouter`] state machine, quoting and instruction assembly
//! - [`adapters`]: Per-protocol account decoding and quote math
//! - [`registry`]: Mint to adapter bindings
//! - [`instructions`]: Router program opcodes, data layouts and prefix accounts
//! - [`quote`]: Quote value types
//! - [`error`]: Error codes and protocol sub-errors

pub mod accounts;
pub mod adapters;
pub mod cache;
pub mod config;
pub mod consts;
pub mod error;
pub mod instructions;
pub mod pda;
pub mod quote;
pub mod registry;
pub mod router;
pub mod update;

pub use cache::{AccountCache, AccountRecord};
pub use config::{FeeSchedule, RouterConfig};
pub use error::{PoolError, RouterError, RouterErrorCode};
pub use instructions::SwapParams;
pub use quote::*;
pub use registry::{InitMint, PoolInit};
pub use router::{AccountFetcher, RouterPhase, StakeRouter};
pub use update::{PoolUpdate, PoolUpdateType, SwapMints};

#[cfg(test)]
use env_logger as _;
