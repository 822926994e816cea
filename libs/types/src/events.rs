//! Events emitted by the engines on committed state transitions.
//!
//! Consumed by an out-of-scope frontend/indexer; serde-serializable so a
//! transport can be bolted on without touching the engines. Every variant is
//! produced only after the corresponding operation fully commits; a rejected
//! operation emits nothing.

use crate::identifiers::{AccountId, PoolHandle, TokenId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    LiquidityAdded {
        pool: PoolHandle,
        provider: AccountId,
        amount_a: u64,
        amount_b: u64,
        shares_minted: u64,
    },
    LiquidityRemoved {
        pool: PoolHandle,
        provider: AccountId,
        amount_a: u64,
        amount_b: u64,
        shares_burned: u64,
    },
    SwapExecuted {
        pool: PoolHandle,
        trader: AccountId,
        token_in: TokenId,
        token_out: TokenId,
        amount_in: u64,
        amount_out: u64,
    },
    Staked {
        account: AccountId,
        amount: u64,
        timestamp: u64,
    },
    Withdrawn {
        account: AccountId,
        amount: u64,
        timestamp: u64,
    },
    RewardPaid {
        account: AccountId,
        amount: u64,
        timestamp: u64,
    },
}
