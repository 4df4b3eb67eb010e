//! Shared test helpers for lst-router tests.
#![allow(dead_code)]

pub mod mock_accounts;
pub mod pda;
pub mod setup;

pub use mock_accounts::*;
pub use pda::*;
pub use setup::*;
